//! Movement primitives for the fixed-tick rink simulation: pairwise
//! avoidance and wall-bouncing integration shared by players and puck.

use rand::Rng;
use shared::{clamp_to_rink, wrap_angle, Vec2};
use std::f32::consts::PI;

/// Chase radii per role, in meters. Attackers chase unconditionally.
pub const MIDFIELDER_CHASE_RADIUS: f32 = 15.0;
pub const DEFENDER_CHASE_RADIUS: f32 = 10.0;

/// Distance at which a patrol target counts as reached.
pub const PATROL_ARRIVE_RADIUS: f32 = 1.0;
/// Pairwise repulsion kicks in below this separation.
pub const AVOID_RADIUS: f32 = 1.5;
/// Largest heading change per tick, in radians.
pub const MAX_TURN_PER_TICK: f32 = 0.3;
/// Heading perturbation while wandering, in radians.
pub const WANDER_JITTER: f32 = 0.25;
/// Heading perturbation added to a wall bounce, in radians.
pub const BOUNCE_JITTER: f32 = 0.3;

pub const PUCK_COLLISION_RADIUS: f32 = 1.0;
pub const PUCK_HIT_SPEED: f32 = 8.0;
pub const PUCK_DECAY: f32 = 0.9;
pub const PUCK_STOP_EPSILON: f32 = 0.05;

/// Sums the repulsion away from every other position within
/// [`AVOID_RADIUS`]. Magnitude is inversely proportional to the distance;
/// coincident positions contribute nothing (there is no away direction).
pub fn avoidance(position: Vec2, others: &[Vec2]) -> Vec2 {
    let mut push = Vec2::default();
    for other in others {
        let away = position.sub(other);
        let distance = away.magnitude();
        if distance > 0.0 && distance < AVOID_RADIUS {
            push = push.add(&away.normalize().scale(1.0 / distance));
        }
    }
    push
}

/// Integrates one tick of movement along `heading`, clamping to the rink.
/// Touching a wall reflects the heading (+PI with a little jitter) to
/// simulate a bounce. Returns the new position and heading.
pub fn advance_with_walls(
    position: Vec2,
    heading: f32,
    speed: f32,
    dt: f32,
    rng: &mut impl Rng,
) -> (Vec2, f32) {
    let moved = position.add(&Vec2::from_angle(heading).scale(speed * dt));
    let (clamped, hit_wall) = clamp_to_rink(moved);

    if hit_wall {
        let jitter = rng.gen_range(-BOUNCE_JITTER..=BOUNCE_JITTER);
        (clamped, wrap_angle(heading + PI + jitter))
    } else {
        (clamped, heading)
    }
}
