//! Wire types pushed to websocket clients each tick.
//!
//! Planar rink meters are serialized as latitude/longitude offsets from the
//! shared GPS origin, matching what the downstream client converts back.

use crate::state::{GameState, Player, Puck};
use serde::{Deserialize, Serialize};
use shared::meters_to_gps;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "ecgSample")]
    pub ecg_sample: Vec<i32>,
    #[serde(rename = "hrValue")]
    pub hr_value: i32,
    pub timestamp: u64,
}

impl PlayerUpdate {
    fn from_player(player: &Player, timestamp: u64) -> Self {
        let (latitude, longitude) = meters_to_gps(player.position);
        PlayerUpdate {
            player_id: player.id.to_string(),
            latitude,
            longitude,
            ecg_sample: player.ecg_samples.clone(),
            hr_value: player.heart_rate.round() as i32,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuckUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f32,
}

impl PuckUpdate {
    fn from_puck(puck: &Puck) -> Self {
        let (latitude, longitude) = meters_to_gps(puck.position);
        PuckUpdate {
            latitude,
            longitude,
            speed: puck.speed,
        }
    }
}

/// One broadcast frame: every player plus the puck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerUpdate>,
    pub puck: PuckUpdate,
}

impl GameSnapshot {
    pub fn from_state(state: &GameState, timestamp: u64) -> Self {
        GameSnapshot {
            players: state
                .players
                .iter()
                .map(|player| PlayerUpdate::from_player(player, timestamp))
                .collect(),
            puck: PuckUpdate::from_puck(&state.puck),
        }
    }
}

/// Current wall-clock timestamp in milliseconds.
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{gps_to_meters, NUM_PLAYERS};

    #[test]
    fn test_snapshot_wire_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = GameState::new(&mut rng);
        state.update(1.0 / 30.0, &mut rng);

        let snapshot = GameSnapshot::from_state(&state, 123_456);
        let value = serde_json::to_value(&snapshot).unwrap();

        let players = value["players"].as_array().unwrap();
        assert_eq!(players.len(), NUM_PLAYERS as usize);
        for key in ["playerId", "latitude", "longitude", "ecgSample", "hrValue", "timestamp"] {
            assert!(players[0].get(key).is_some(), "missing key {}", key);
        }
        for key in ["latitude", "longitude", "speed"] {
            assert!(value["puck"].get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(players[0]["timestamp"], 123_456);
    }

    #[test]
    fn test_positions_roundtrip_through_gps() {
        let mut rng = StdRng::seed_from_u64(6);
        let state = GameState::new(&mut rng);
        let snapshot = GameSnapshot::from_state(&state, 0);

        for (player, update) in state.players.iter().zip(&snapshot.players) {
            let back = gps_to_meters(update.latitude, update.longitude);
            assert_approx_eq!(back.x, player.position.x, 0.01);
            assert_approx_eq!(back.y, player.position.y, 0.01);
        }
    }

    #[test]
    fn test_timestamp_is_plausible() {
        // Any date after 2020 in milliseconds.
        assert!(get_timestamp() > 1_577_836_800_000);
    }
}
