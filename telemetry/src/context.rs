//! Shared simulation context: the logical tick counter, the per-player
//! heart-rate walks, and the bounded per-type history rings.
//!
//! The context is owned by `main` behind an `Arc<RwLock<..>>`. The generation
//! loop and every websocket push cycle take the write lock for exactly one
//! tick; HTTP handlers take read locks and return owned snapshot copies.

use crate::generator;
use crate::samples::{
    EcgSample, GnssSample, HeartRateSample, ImuSample, PlayerPayload, Sample,
};
use rand::Rng;
use shared::{HR_MAX, HR_MIN, NUM_PLAYERS};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum samples retained per data type.
pub const HISTORY_CAP: usize = 1000;

/// Bounded FIFO of samples for one data type. Oldest entries are evicted
/// once the ring holds [`HISTORY_CAP`] samples.
#[derive(Debug, Clone)]
pub struct History<T> {
    samples: VecDeque<T>,
}

impl<T> History<T> {
    pub fn new() -> Self {
        History {
            samples: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample + Clone> History<T> {
    pub fn push(&mut self, sample: T) {
        self.samples.push_back(sample);
        if self.samples.len() > HISTORY_CAP {
            self.samples.pop_front();
        }
    }

    /// Returns clones of the samples matching the optional inclusive
    /// millisecond range and the optional player-id filter.
    pub fn filtered(&self, range_ms: Option<(i64, i64)>, players: Option<&[i64]>) -> Vec<T> {
        self.samples
            .iter()
            .filter(|sample| {
                let in_range = range_ms.map_or(true, |(start, end)| {
                    let ts = sample.timestamp_ms() as i64;
                    start <= ts && ts <= end
                });
                let id_match =
                    players.map_or(true, |ids| ids.contains(&(sample.player_id() as i64)));
                in_range && id_match
            })
            .cloned()
            .collect()
    }

    /// Returns the most recent matching sample by timestamp.
    pub fn latest(&self, range_ms: Option<(i64, i64)>, players: Option<&[i64]>) -> Option<T> {
        self.filtered(range_ms, players)
            .into_iter()
            .max_by_key(|sample| sample.timestamp_ms())
    }
}

/// All mutable simulation state of the telemetry server.
#[derive(Debug)]
pub struct SimContext {
    tick: u64,
    heart_rates: HashMap<u32, f64>,
    pub gnss: History<GnssSample>,
    pub heart_rate: History<HeartRateSample>,
    pub imu: History<ImuSample>,
    pub ecg: History<EcgSample>,
}

pub type SharedContext = Arc<RwLock<SimContext>>;

impl SimContext {
    /// Creates the context with every player's heart-rate walk seeded to a
    /// random starting point.
    pub fn new(rng: &mut impl Rng) -> Self {
        let heart_rates = (1..=NUM_PLAYERS)
            .map(|id| (id, rng.gen_range(HR_MIN..=HR_MAX)))
            .collect();

        SimContext {
            tick: 0,
            heart_rates,
            gnss: History::new(),
            heart_rate: History::new(),
            imu: History::new(),
            ecg: History::new(),
        }
    }

    /// Current logical timestamp, in ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the logical clock one tick and appends one sample of every
    /// type for every player. Returns the freshly generated batch so
    /// websocket pushes can reuse it without a second pass.
    pub fn advance_tick(&mut self, rng: &mut impl Rng) -> Vec<PlayerPayload> {
        self.tick += 1;
        let timestamp_ms = self.tick * 1000;

        let mut players = Vec::with_capacity(NUM_PLAYERS as usize);
        for player_id in 1..=NUM_PLAYERS {
            let bpm = self
                .heart_rates
                .entry(player_id)
                .or_insert((HR_MIN + HR_MAX) / 2.0);
            let heart_rate = generator::heart_rate(rng, player_id, bpm, timestamp_ms);
            let gnss = generator::gnss(rng, player_id, timestamp_ms);
            let imu = generator::imu(rng, player_id, timestamp_ms);
            let ecg = generator::ecg(rng, player_id, timestamp_ms);

            self.gnss.push(gnss.clone());
            self.heart_rate.push(heart_rate.clone());
            self.imu.push(imu.clone());
            self.ecg.push(ecg.clone());

            players.push(PlayerPayload {
                player_id,
                payload_type: "full_payload".to_string(),
                gnss,
                heart_rate,
                imu,
                ecg,
            });
        }

        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context() -> (SimContext, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let ctx = SimContext::new(&mut rng);
        (ctx, rng)
    }

    #[test]
    fn test_advance_tick_appends_one_sample_per_player() {
        let (mut ctx, mut rng) = context();

        let players = ctx.advance_tick(&mut rng);

        assert_eq!(players.len(), NUM_PLAYERS as usize);
        assert_eq!(ctx.gnss.len(), NUM_PLAYERS as usize);
        assert_eq!(ctx.heart_rate.len(), NUM_PLAYERS as usize);
        assert_eq!(ctx.imu.len(), NUM_PLAYERS as usize);
        assert_eq!(ctx.ecg.len(), NUM_PLAYERS as usize);
        assert_eq!(ctx.tick(), 1);
    }

    #[test]
    fn test_timestamps_increase_per_tick() {
        let (mut ctx, mut rng) = context();

        let first = ctx.advance_tick(&mut rng);
        let second = ctx.advance_tick(&mut rng);

        assert_eq!(first[0].gnss.timestamp_ms, 1000);
        assert_eq!(second[0].gnss.timestamp_ms, 2000);
        assert!(second
            .iter()
            .all(|p| p.heart_rate.timestamp_ms == 2000 && p.ecg.timestamp_ms == 2000));
    }

    #[test]
    fn test_history_eviction_keeps_cap() {
        let mut history: History<EcgSample> = History::new();
        for tick in 1..=(HISTORY_CAP as u64 + 200) {
            history.push(EcgSample {
                pico_id: "Pico_1".to_string(),
                samples: vec![],
                movesense_series: 1,
                timestamp_ms: tick * 1000,
            });
        }

        assert_eq!(history.len(), HISTORY_CAP);
        // Oldest entries were the ones evicted.
        let oldest = history.filtered(None, None)[0].timestamp_ms;
        assert_eq!(oldest, 201_000);
    }

    #[test]
    fn test_filtered_by_range_is_inclusive() {
        let mut history: History<EcgSample> = History::new();
        for tick in 1..=30u64 {
            history.push(EcgSample {
                pico_id: "Pico_1".to_string(),
                samples: vec![],
                movesense_series: 1,
                timestamp_ms: tick * 1000,
            });
        }

        let matched = history.filtered(Some((10_000, 20_000)), None);
        assert_eq!(matched.len(), 11);
        assert!(matched
            .iter()
            .all(|s| (10_000..=20_000).contains(&s.timestamp_ms)));
    }

    #[test]
    fn test_filtered_by_player() {
        let (mut ctx, mut rng) = context();
        ctx.advance_tick(&mut rng);
        ctx.advance_tick(&mut rng);

        let matched = ctx.imu.filtered(None, Some(&[2, 5]));
        assert_eq!(matched.len(), 4);
        assert!(matched
            .iter()
            .all(|s| s.pico_id == "Pico_2" || s.pico_id == "Pico_5"));
    }

    #[test]
    fn test_latest_picks_newest_match() {
        let (mut ctx, mut rng) = context();
        for _ in 0..5 {
            ctx.advance_tick(&mut rng);
        }

        let latest = ctx.gnss.latest(None, Some(&[4])).unwrap();
        assert_eq!(latest.timestamp_ms, 5000);
        assert_eq!(latest.pico_id, "Pico_4");
    }

    #[test]
    fn test_no_match_yields_empty() {
        let (mut ctx, mut rng) = context();
        ctx.advance_tick(&mut rng);

        assert!(ctx.gnss.latest(None, Some(&[99])).is_none());
        assert!(ctx.ecg.filtered(Some((50_000, 60_000)), None).is_empty());
    }
}
