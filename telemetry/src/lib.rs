//! # Telemetry Simulator
//!
//! Mock sensor-telemetry server for downstream client testing. Once per tick
//! it fabricates one GNSS fix, heart-rate reading, IMU frame and ECG frame
//! per simulated player, keeps the last 1000 samples of each type in a
//! bounded history ring, and serves them two ways:
//!
//! - **HTTP polling** (`/api/{data_type}`): range and player-id filtered
//!   queries over the history. GNSS and heart rate collapse to the single
//!   most recent match; IMU and ECG return the full filtered list.
//! - **WebSocket push**: one JSON message per cycle carrying every player's
//!   full sample set, generated on demand for each connection.
//!
//! ## Concurrency
//!
//! All mutable state lives in a single [`context::SimContext`] behind an
//! `Arc<RwLock<..>>` owned by `main`. The background generation loop and
//! each websocket push cycle take the write lock for exactly one tick, so
//! the logical timestamp counter and the history appends stay serialized.
//! HTTP handlers only take read locks and hand back owned snapshot copies.
//!
//! ## Module Organization
//!
//! - [`samples`]: sample types, wire field names, the [`samples::Sample`]
//!   filtering trait.
//! - [`generator`]: the random draws and the heart-rate walk.
//! - [`context`]: tick counter, walk state, bounded history rings.
//! - [`api`]: axum router, query parsing, error-to-status mapping.
//! - [`push`]: websocket accept and per-connection push loops.

pub mod api;
pub mod context;
pub mod generator;
pub mod push;
pub mod samples;
