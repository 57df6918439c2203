//! # Game Simulator
//!
//! Mock rink-state server for downstream client testing. A fixed-tick loop
//! (default 30 Hz) advances ten simulated players and a puck:
//!
//! - players steer toward the puck or their patrol target depending on role,
//!   repel each other at close range, turn no faster than a fixed rate, and
//!   bounce off the boards;
//! - the puck is hit to a fixed speed by the nearest player in collision
//!   range, decays while free, and bounces off the boards.
//!
//! Every tick is serialized once and broadcast to all connected websocket
//! clients; there is no HTTP surface and no client-to-server traffic.
//!
//! ## Module Organization
//!
//! - [`state`]: roster, puck, and the per-tick update rules.
//! - [`physics`]: avoidance and wall-bouncing integration primitives.
//! - [`payload`]: the JSON frame pushed to clients.
//! - [`push`]: the tick loop, broadcast channel, and websocket accept loop.

pub mod payload;
pub mod physics;
pub mod push;
pub mod state;
