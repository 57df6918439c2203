//! Authoritative rink state and the per-tick update rules.

use crate::physics::{
    advance_with_walls, avoidance, DEFENDER_CHASE_RADIUS, MAX_TURN_PER_TICK,
    MIDFIELDER_CHASE_RADIUS, PATROL_ARRIVE_RADIUS, PUCK_COLLISION_RADIUS, PUCK_DECAY,
    PUCK_HIT_SPEED, PUCK_STOP_EPSILON, WANDER_JITTER,
};
use rand::Rng;
use shared::{
    steer_toward, wrap_angle, Vec2, HR_MAX, HR_MAX_STEP, HR_MIN, NUM_PLAYERS, RINK_MAX_X,
    RINK_MAX_Y, RINK_MIN_X, RINK_MIN_Y,
};
use std::f32::consts::PI;

/// Players and puck spawn at least this far from the boards.
const SPAWN_MARGIN: f32 = 3.0;
const PLAYER_SPEED_MIN: f32 = 2.5;
const PLAYER_SPEED_MAX: f32 = 4.0;
const ECG_BURST_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Defender,
    Midfielder,
    Attacker,
}

impl Role {
    /// Fixed 4/3/3 split by player id.
    fn for_player(id: u32) -> Role {
        match id {
            1..=4 => Role::Defender,
            5..=7 => Role::Midfielder,
            _ => Role::Attacker,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub position: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub role: Role,
    pub patrol_target: Vec2,
    pub heart_rate: f64,
    pub ecg_samples: Vec<i32>,
}

impl Player {
    fn spawn(id: u32, rng: &mut impl Rng) -> Self {
        Player {
            id,
            position: random_point(rng),
            heading: rng.gen_range(-PI..=PI),
            speed: rng.gen_range(PLAYER_SPEED_MIN..=PLAYER_SPEED_MAX),
            role: Role::for_player(id),
            patrol_target: random_point(rng),
            heart_rate: rng.gen_range(HR_MIN..=HR_MAX),
            ecg_samples: Vec::new(),
        }
    }

    /// Whether this player chases the puck this tick. Attackers always do;
    /// midfielders and defenders only while the puck is moving and inside
    /// their chase radius.
    pub fn wants_puck(&self, puck: &Puck) -> bool {
        let distance = self.position.distance(&puck.position);
        match self.role {
            Role::Attacker => true,
            Role::Midfielder => puck.speed > 0.0 && distance <= MIDFIELDER_CHASE_RADIUS,
            Role::Defender => puck.speed > 0.0 && distance <= DEFENDER_CHASE_RADIUS,
        }
    }

    /// Steps the heart-rate walk and redraws the ECG burst carried in the
    /// push payload.
    fn step_vitals(&mut self, rng: &mut impl Rng) {
        self.heart_rate =
            (self.heart_rate + rng.gen_range(-HR_MAX_STEP..=HR_MAX_STEP)).clamp(HR_MIN, HR_MAX);
        self.ecg_samples = (0..ECG_BURST_LEN)
            .map(|_| rng.gen_range(-1000..=1000))
            .collect();
    }
}

#[derive(Debug, Clone)]
pub struct Puck {
    pub position: Vec2,
    pub heading: f32,
    pub speed: f32,
}

impl Puck {
    fn new() -> Self {
        // Face-off at center ice.
        Puck {
            position: Vec2::default(),
            heading: 0.0,
            speed: 0.0,
        }
    }
}

/// All mutable simulation state of the game server.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub players: Vec<Player>,
    pub puck: Puck,
}

impl GameState {
    /// Spawns the fixed set of players and the puck.
    pub fn new(rng: &mut impl Rng) -> Self {
        GameState {
            tick: 0,
            players: (1..=NUM_PLAYERS).map(|id| Player::spawn(id, rng)).collect(),
            puck: Puck::new(),
        }
    }

    /// Advances all player and puck state by one fixed tick.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        self.tick += 1;
        self.update_players(dt, rng);
        self.update_puck(dt, rng);
    }

    fn update_players(&mut self, dt: f32, rng: &mut impl Rng) {
        // Positions snapshot for pairwise avoidance; a player's own entry is
        // harmless since coincident points repel nothing.
        let positions: Vec<Vec2> = self.players.iter().map(|p| p.position).collect();

        for player in self.players.iter_mut() {
            let goal = if player.wants_puck(&self.puck) {
                Some(self.puck.position)
            } else if player.position.distance(&player.patrol_target) > PATROL_ARRIVE_RADIUS {
                Some(player.patrol_target)
            } else {
                None
            };

            match goal {
                Some(goal) => {
                    let desired = goal
                        .sub(&player.position)
                        .normalize()
                        .add(&avoidance(player.position, &positions))
                        .normalize();
                    if desired.magnitude() > 0.0 {
                        player.heading =
                            steer_toward(player.heading, desired.angle(), MAX_TURN_PER_TICK);
                    }
                }
                None => {
                    // At the patrol target with nothing to chase: wander.
                    player.heading =
                        wrap_angle(player.heading + rng.gen_range(-WANDER_JITTER..=WANDER_JITTER));
                }
            }

            let (position, heading) =
                advance_with_walls(player.position, player.heading, player.speed, dt, rng);
            player.position = position;
            player.heading = heading;

            player.step_vitals(rng);
        }
    }

    fn update_puck(&mut self, dt: f32, rng: &mut impl Rng) {
        // Nearest player inside the collision radius wins the hit.
        let hit = self
            .players
            .iter()
            .map(|p| (p.position.distance(&self.puck.position), p))
            .filter(|(distance, _)| *distance <= PUCK_COLLISION_RADIUS)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((_, player)) = hit {
            let away = self.puck.position.sub(&player.position);
            self.puck.heading = if away.magnitude() > 0.0 {
                away.angle()
            } else {
                rng.gen_range(-PI..=PI)
            };
            self.puck.speed = PUCK_HIT_SPEED;
        } else {
            self.puck.speed *= PUCK_DECAY;
            if self.puck.speed < PUCK_STOP_EPSILON {
                self.puck.speed = 0.0;
            }
        }

        let (position, heading) = advance_with_walls(
            self.puck.position,
            self.puck.heading,
            self.puck.speed,
            dt,
            rng,
        );
        self.puck.position = position;
        self.puck.heading = heading;
    }
}

/// Random point inside the rink, respecting the spawn margin.
fn random_point(rng: &mut impl Rng) -> Vec2 {
    Vec2 {
        x: rng.gen_range(RINK_MIN_X + SPAWN_MARGIN..=RINK_MAX_X - SPAWN_MARGIN),
        y: rng.gen_range(RINK_MIN_Y + SPAWN_MARGIN..=RINK_MAX_Y - SPAWN_MARGIN),
    }
}
