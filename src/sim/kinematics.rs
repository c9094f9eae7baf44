/*
Copyright 2020 Timo Saarinen

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Vessel kinematics: spherical position advancement and movement patterns

use rand::Rng;
use serde::Deserialize;

use super::Position;

/// Nautical miles per degree of latitude.
pub const NM_PER_DEGREE: f64 = 60.0;

/// Advance a position along a course. Distance is `sog · dt / 3600` nautical miles,
/// projected with the equirectangular approximation at the current latitude.
pub fn advance(position: &Position, sog_knots: f64, cog: f64, dt: f64) -> Position {
    let distance_nm = sog_knots * dt / 3600.0;
    let course_rad = cog.to_radians();
    let delta_lat = distance_nm * course_rad.cos() / NM_PER_DEGREE;
    let cos_lat = position.latitude.to_radians().cos().max(1e-6);
    let delta_lon = distance_nm * course_rad.sin() / (NM_PER_DEGREE * cos_lat);
    Position {
        latitude: (position.latitude + delta_lat).clamp(-90.0, 90.0),
        longitude: wrap_longitude(position.longitude + delta_lon),
    }
}

/// Initial bearing from one position to another in degrees, using the same
/// equirectangular approximation as `advance`.
pub fn bearing(from: &Position, to: &Position) -> f64 {
    let cos_lat = from.latitude.to_radians().cos().max(1e-6);
    let delta_lat = to.latitude - from.latitude;
    let delta_lon = (to.longitude - from.longitude) * cos_lat;
    normalize_course(delta_lon.atan2(delta_lat).to_degrees())
}

/// Distance between two positions in nautical miles (equirectangular).
pub fn distance_nm(a: &Position, b: &Position) -> f64 {
    let cos_lat = a.latitude.to_radians().cos().max(1e-6);
    let delta_lat = (b.latitude - a.latitude) * NM_PER_DEGREE;
    let delta_lon = (b.longitude - a.longitude) * NM_PER_DEGREE * cos_lat;
    (delta_lat * delta_lat + delta_lon * delta_lon).sqrt()
}

/// Shortest signed angular difference `a - b` in degrees, in [-180, 180).
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let mut delta = (a - b) % 360.0;
    if delta < -180.0 {
        delta += 360.0;
    } else if delta >= 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Normalize a course into [0, 360).
pub fn normalize_course(course: f64) -> f64 {
    let course = course % 360.0;
    if course < 0.0 {
        course + 360.0
    } else {
        course
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        longitude - 360.0
    } else if longitude < -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

// -------------------------------------------------------------------------------------------------

fn default_tolerance_nm() -> f64 {
    0.05
}

/// Movement pattern steering a vessel's course each tick.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum MovementPattern {
    /// Hold the current course; only the configured course noise applies.
    Linear,

    /// Run a circle around a center point: the course is held perpendicular to the
    /// bearing from the center, so the radius stays where the vessel starts.
    Circular { center: Position },

    /// Keep the course until a bounding box edge is reached, then reflect off it.
    RandomWalk {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    /// Steer toward the next waypoint; advance to the following one when within
    /// tolerance, wrapping around at the end of the list.
    Waypoint {
        waypoints: Vec<Position>,
        #[serde(default = "default_tolerance_nm")]
        tolerance_nm: f64,
        #[serde(skip, default)]
        next: usize,
    },
}

impl Default for MovementPattern {
    fn default() -> MovementPattern {
        MovementPattern::Linear
    }
}

impl MovementPattern {
    /// Return the course the pattern steers to from the given position, updating any
    /// internal pattern state.
    pub fn steer(&mut self, position: &Position, cog: f64) -> f64 {
        match self {
            MovementPattern::Linear => cog,
            MovementPattern::Circular { center } => {
                normalize_course(bearing(center, position) + 90.0)
            }
            MovementPattern::RandomWalk {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                let mut course = cog;
                let northbound = !(90.0..270.0).contains(&course);
                let eastbound = course < 180.0;
                if (position.latitude >= *max_lat && northbound)
                    || (position.latitude <= *min_lat && !northbound)
                {
                    course = normalize_course(180.0 - course);
                }
                if (position.longitude >= *max_lon && eastbound)
                    || (position.longitude <= *min_lon && !eastbound)
                {
                    course = normalize_course(360.0 - course);
                }
                course
            }
            MovementPattern::Waypoint {
                waypoints,
                tolerance_nm,
                next,
            } => {
                if waypoints.is_empty() {
                    return cog;
                }
                if distance_nm(position, &waypoints[*next]) <= *tolerance_nm {
                    *next = (*next + 1) % waypoints.len();
                }
                bearing(position, &waypoints[*next])
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Apply bounded uniform noise to a speed value, clamping the result to the reportable
/// range. The window scales with the tick duration.
pub fn perturb_speed<R: Rng>(rng: &mut R, sog_knots: f64, variation: f64, dt: f64) -> f64 {
    if variation <= 0.0 {
        return sog_knots;
    }
    let bound = variation * dt;
    (sog_knots + rng.gen_range(-bound..=bound)).clamp(0.0, 102.2)
}

/// Apply bounded uniform noise to a course value, normalized into [0, 360).
pub fn perturb_course<R: Rng>(rng: &mut R, cog: f64, variation: f64, dt: f64) -> f64 {
    if variation <= 0.0 {
        return cog;
    }
    let bound = variation * dt;
    normalize_course(cog + rng.gen_range(-bound..=bound))
}

// -------------------------------------------------------------------------------------------------
