//! Telemetry sample types and their wire representation.
//!
//! Field names are part of the contract with the downstream client and mimic
//! the hardware payloads they fake (Pico GNSS receivers, Movesense chest
//! straps), hence the non-Rust casing behind serde renames.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four kinds of telemetry the simulator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Gnss,
    HeartRate,
    Imu,
    Ecg,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Gnss,
        DataType::HeartRate,
        DataType::Imu,
        DataType::Ecg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Gnss => "gnss",
            DataType::HeartRate => "heart_rate",
            DataType::Imu => "imu",
            DataType::Ecg => "ecg",
        }
    }
}

/// Error for path segments that name no known data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownDataType;

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gnss" => Ok(DataType::Gnss),
            "heart_rate" => Ok(DataType::HeartRate),
            "imu" => Ok(DataType::Imu),
            "ecg" => Ok(DataType::Ecg),
            _ => Err(UnknownDataType),
        }
    }
}

/// Common view over all sample types used by history filtering.
pub trait Sample {
    fn player_id(&self) -> u32;
    fn timestamp_ms(&self) -> u64;
}

/// Extracts the numeric player id from a `Pico_<n>` device tag.
pub fn pico_player_id(pico_id: &str) -> Option<u32> {
    pico_id.rsplit('_').next()?.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One synthetic GNSS fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnssSample {
    #[serde(rename = "Pico_ID")]
    pub pico_id: String,
    #[serde(rename = "GNSS_ID")]
    pub gnss_id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Timestamp_UTC")]
    pub timestamp_utc: u64,
    #[serde(rename = "Timestamp_ms")]
    pub timestamp_ms: u64,
}

/// One heart-rate reading with derived R-R intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    #[serde(rename = "rrData")]
    pub rr_data: Vec<i32>,
    #[serde(rename = "Pico_ID")]
    pub pico_id: String,
    #[serde(rename = "Movesense_series")]
    pub movesense_series: u32,
    #[serde(rename = "Timestamp_ms")]
    pub timestamp_ms: u64,
    #[serde(rename = "average_bpm")]
    pub average_bpm: f64,
}

/// One IMU frame: yaw plus short acceleration/gyro/magnetometer bursts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub yaw: f64,
    #[serde(rename = "Pico_ID")]
    pub pico_id: String,
    #[serde(rename = "Movesense_series")]
    pub movesense_series: u32,
    #[serde(rename = "Timestamp_ms")]
    pub timestamp_ms: u64,
    #[serde(rename = "ArrayAcc")]
    pub array_acc: Vec<Vector3>,
    #[serde(rename = "ArrayGyro")]
    pub array_gyro: Vec<Vector3>,
    #[serde(rename = "ArrayMagn")]
    pub array_magn: Vec<Vector3>,
}

/// One ECG frame of raw sample values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcgSample {
    #[serde(rename = "Pico_ID")]
    pub pico_id: String,
    #[serde(rename = "Samples")]
    pub samples: Vec<i32>,
    #[serde(rename = "Movesense_series")]
    pub movesense_series: u32,
    #[serde(rename = "Timestamp_ms")]
    pub timestamp_ms: u64,
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(impl Sample for $ty {
            fn player_id(&self) -> u32 {
                pico_player_id(&self.pico_id).unwrap_or(0)
            }

            fn timestamp_ms(&self) -> u64 {
                self.timestamp_ms
            }
        })*
    };
}

impl_sample!(GnssSample, HeartRateSample, ImuSample, EcgSample);

/// One player's full set of samples for a single websocket push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPayload {
    #[serde(rename = "playerId")]
    pub player_id: u32,
    #[serde(rename = "type")]
    pub payload_type: String,
    pub gnss: GnssSample,
    pub heart_rate: HeartRateSample,
    pub imu: ImuSample,
    pub ecg: EcgSample,
}

/// Envelope for one websocket push message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickMessage {
    pub players: Vec<PlayerPayload>,
}
