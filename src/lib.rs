//! Planets - A merge-the-planets drop game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, merging, scoring, loss detection)
//! - `settings`: Tunable gravity, drop cursor and seeding parameters
//! - `highscores`: Top-10 leaderboard
//! - `persistence`: Save/load snapshot of the body array

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use persistence::{PersistError, SaveState};
pub use settings::Settings;
pub use sim::{Fruit, FruitSim, Lcg48, NextPlacement, RadiusTable};

/// Game configuration constants
pub mod consts {
    /// Logical world width
    pub const WORLD_SIZE_X: f32 = 12.0;
    /// Logical world height (floor is at this y, there is no ceiling)
    pub const WORLD_SIZE_Y: f32 = 16.0;
    /// Bodies are never allowed above this y
    pub const WORLD_SANITY_TOP: f32 = -4096.0;

    /// Fixed body capacity of a simulation
    pub const FRUIT_CAP: usize = 1024;

    /// Number of size tiers
    pub const NUM_RADII: usize = 11;
    /// Only the smaller half of the tiers may be spawned
    pub const NUM_RANDOM_RADII: usize = NUM_RADII / 2;
    /// Radius of tier 0
    pub const BASE_RADIUS: f32 = 1.0 / 3.0;
    /// Growth factor between consecutive tiers
    pub const RADIUS_GROWTH: f32 = 1.296_839_6;

    /// Per-frame downward acceleration set by `init`
    pub const DEFAULT_GRAVITY: f32 = 0.007_812_5;
    /// Velocity retained per frame
    pub const DRAG: f32 = 0.999;
    /// Constraint passes per simulated frame
    pub const RELAXATION_ITERATIONS: u32 = 16;

    /// Fraction of the penetration resolved per contact per pass
    pub const NUDGE_FRACTION: f32 = 1.0 / 16.0;
    /// Scale of a nudge fed into the rolling accumulator
    pub const ROLL_GAIN: f32 = 4.0;
    /// Squared speed below which a body does not roll
    pub const ROLL_MIN_SPEED_SQ: f32 = 1.0e-3;

    /// y at which the drop cursor spawns bodies (just above the visible field)
    pub const DROP_Y: f32 = -1.0;
}

/// Triangular score for a merge at the given tier: `(t + 1)(t + 2) / 2`
#[inline]
pub fn merge_score(tier: u32) -> u32 {
    ((tier + 1) * (tier + 2)) >> 1
}
