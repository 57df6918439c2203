//! Random sample generation.
//!
//! GNSS, IMU and ECG samples are pure per-tick draws within fixed ranges.
//! Heart rate is the only generator with cross-tick state: the caller owns
//! the per-player bpm value and this module steps its bounded random walk.

use crate::samples::{EcgSample, GnssSample, HeartRateSample, ImuSample, Vector3};
use chrono::Utc;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use shared::{HR_MAX, HR_MAX_STEP, HR_MIN};

const RR_SIGMA: f64 = 5.0;
const RR_COUNT: usize = 5;
const IMU_VECTOR_COUNT: usize = 5;
const ECG_SAMPLE_COUNT: usize = 10;

const GNSS_LAT_MIN: f64 = 40.0;
const GNSS_LAT_MAX: f64 = 41.0;
const GNSS_LON_MIN: f64 = -74.0;
const GNSS_LON_MAX: f64 = -73.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn device_tag(player_id: u32) -> String {
    format!("Pico_{}", player_id)
}

fn movesense_series(rng: &mut impl Rng) -> u32 {
    rng.gen_range(1..=10_000)
}

fn vector3(rng: &mut impl Rng) -> Vector3 {
    Vector3 {
        x: round2(rng.gen_range(-3.0..=3.0)),
        y: round2(rng.gen_range(-3.0..=3.0)),
        z: round2(rng.gen_range(-3.0..=3.0)),
    }
}

pub fn gnss(rng: &mut impl Rng, player_id: u32, timestamp_ms: u64) -> GnssSample {
    GnssSample {
        pico_id: device_tag(player_id),
        gnss_id: format!("GNSS_{}", player_id),
        date: Utc::now().format("%-d.%-m.%Y").to_string(),
        latitude: round6(rng.gen_range(GNSS_LAT_MIN..=GNSS_LAT_MAX)),
        longitude: round6(rng.gen_range(GNSS_LON_MIN..=GNSS_LON_MAX)),
        timestamp_utc: timestamp_ms,
        timestamp_ms,
    }
}

/// Steps the player's heart-rate walk and derives a sample from the new
/// value. R-R intervals are drawn from a Gaussian centered on `60000 / bpm`.
pub fn heart_rate(
    rng: &mut impl Rng,
    player_id: u32,
    bpm: &mut f64,
    timestamp_ms: u64,
) -> HeartRateSample {
    *bpm = (*bpm + rng.gen_range(-HR_MAX_STEP..=HR_MAX_STEP)).clamp(HR_MIN, HR_MAX);

    let avg_rr = 60_000.0 / *bpm;
    let rr_data = match Normal::new(avg_rr, RR_SIGMA) {
        Ok(normal) => (0..RR_COUNT).map(|_| normal.sample(rng) as i32).collect(),
        Err(_) => vec![avg_rr as i32; RR_COUNT],
    };

    HeartRateSample {
        rr_data,
        pico_id: device_tag(player_id),
        movesense_series: movesense_series(rng),
        timestamp_ms,
        average_bpm: round2(*bpm),
    }
}

pub fn imu(rng: &mut impl Rng, player_id: u32, timestamp_ms: u64) -> ImuSample {
    ImuSample {
        yaw: round2(rng.gen_range(0.0..=360.0)),
        pico_id: device_tag(player_id),
        movesense_series: movesense_series(rng),
        timestamp_ms,
        array_acc: (0..IMU_VECTOR_COUNT).map(|_| vector3(rng)).collect(),
        array_gyro: (0..IMU_VECTOR_COUNT).map(|_| vector3(rng)).collect(),
        array_magn: (0..IMU_VECTOR_COUNT).map(|_| vector3(rng)).collect(),
    }
}

pub fn ecg(rng: &mut impl Rng, player_id: u32, timestamp_ms: u64) -> EcgSample {
    EcgSample {
        pico_id: device_tag(player_id),
        samples: (0..ECG_SAMPLE_COUNT)
            .map(|_| rng.gen_range(-1000..=1000))
            .collect(),
        movesense_series: movesense_series(rng),
        timestamp_ms,
    }
}
