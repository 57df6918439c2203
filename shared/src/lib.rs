use serde::{Deserialize, Serialize};

/// Number of simulated players in both servers.
pub const NUM_PLAYERS: u32 = 10;

/// Rink bounds in planar meters, origin at center ice.
pub const RINK_MIN_X: f32 = -30.0;
pub const RINK_MAX_X: f32 = 30.0;
pub const RINK_MIN_Y: f32 = -15.0;
pub const RINK_MAX_Y: f32 = 15.0;

/// GPS origin the planar rink coordinates are anchored to. Chosen as the
/// center of the synthetic GNSS ranges so both servers report positions in
/// the same neighborhood.
pub const BASE_LATITUDE: f64 = 40.5;
pub const BASE_LONGITUDE: f64 = -73.5;

/// Bounds of the heart-rate random walk, in bpm.
pub const HR_MIN: f64 = 125.0;
pub const HR_MAX: f64 = 180.0;
/// Largest per-tick change of the heart-rate walk, in bpm.
pub const HR_MAX_STEP: f64 = 3.0;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_000.0;

/// Represents a vector in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec2 {
    /// Value along the x-axis. Positive direction is to the right.
    pub x: f32,
    /// Value along the y-axis. Positive direction is up.
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the normalized vector, or the zero vector if the magnitude is zero.
    pub fn normalize(&self) -> Vec2 {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vec2 { x: 0.0, y: 0.0 }
        } else {
            Vec2 {
                x: self.x / mag,
                y: self.y / mag,
            }
        }
    }

    /// Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Returns the sum of two vectors.
    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Returns the difference of two vectors.
    pub fn sub(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the distance to another point.
    pub fn distance(&self, other: &Vec2) -> f32 {
        self.sub(other).magnitude()
    }

    /// Returns the unit vector pointing along `angle` radians.
    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2 {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Returns the direction of the vector in radians.
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }
}

/// Wraps an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % std::f32::consts::TAU;
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    } else if a <= -std::f32::consts::PI {
        a += std::f32::consts::TAU;
    }
    a
}

/// Rotates `current` toward `target`, moving at most `max_delta` radians.
pub fn steer_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = wrap_angle(target - current);
    wrap_angle(current + diff.clamp(-max_delta, max_delta))
}

/// Clamps a point to the rink bounds. Returns the clamped point and whether
/// any wall was touched.
pub fn clamp_to_rink(pos: Vec2) -> (Vec2, bool) {
    let clamped = Vec2 {
        x: pos.x.clamp(RINK_MIN_X, RINK_MAX_X),
        y: pos.y.clamp(RINK_MIN_Y, RINK_MAX_Y),
    };
    let hit_wall = clamped.x != pos.x || clamped.y != pos.y;
    (clamped, hit_wall)
}

/// Converts planar rink meters to a latitude/longitude pair relative to the
/// GPS origin. Flat-earth approximation, valid for rink-sized offsets.
pub fn meters_to_gps(pos: Vec2) -> (f64, f64) {
    let meters_per_degree_lon =
        EARTH_CIRCUMFERENCE_M * (BASE_LATITUDE.to_radians()).cos() / 360.0;
    let latitude = BASE_LATITUDE + pos.y as f64 / METERS_PER_DEGREE_LAT;
    let longitude = BASE_LONGITUDE + pos.x as f64 / meters_per_degree_lon;
    (latitude, longitude)
}

/// Converts a latitude/longitude pair back to planar meters relative to the
/// GPS origin. Inverse of [`meters_to_gps`].
pub fn gps_to_meters(latitude: f64, longitude: f64) -> Vec2 {
    let meters_per_degree_lon =
        EARTH_CIRCUMFERENCE_M * (BASE_LATITUDE.to_radians()).cos() / 360.0;
    Vec2 {
        x: ((longitude - BASE_LONGITUDE) * meters_per_degree_lon) as f32,
        y: ((latitude - BASE_LATITUDE) * METERS_PER_DEGREE_LAT) as f32,
    }
}
