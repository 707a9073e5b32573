//! Drop cursor
//!
//! The player steers a pending body along the top of the well and drops it
//! when the preview does not overlap anything.

use serde::{Deserialize, Serialize};

use super::state::FruitSim;
use crate::consts::DROP_Y;
use crate::settings::Settings;

/// The next body to drop; y is always `DROP_Y`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NextPlacement {
    pub x: f32,
    pub xv: f32,
    pub rad_index: u32,
    pub seed: u64,
    /// Preview fits without touching a live body
    #[serde(skip)]
    pub valid: bool,
}

impl NextPlacement {
    /// Cursor at `x` holding a body chosen from `seed`
    pub fn new(sim: &FruitSim, x: f32, seed: u64) -> Self {
        let mut next = Self {
            x,
            ..Self::default()
        };
        next.reset(sim, seed);
        next.constrain_inside(sim);
        next
    }

    /// Pick the next tier (spawnable tiers only) from a fresh seed
    pub fn reset(&mut self, sim: &FruitSim, new_seed: u64) {
        self.seed = new_seed;
        self.rad_index = ((new_seed >> 4) % sim.num_random_radii() as u64) as u32;
    }

    /// Keep the pending body between the walls, stopping motion into them
    pub fn constrain_inside(&mut self, sim: &FruitSim) {
        let r = sim.radius(self.rad_index);
        if self.x < r {
            self.x = r;
            self.xv = self.xv.max(0.0);
        }
        if self.x > sim.world_width() - r {
            self.x = sim.world_width() - r;
            self.xv = self.xv.min(0.0);
        }
    }

    /// Accelerate left (`dir < 0`) or right (`dir > 0`)
    pub fn nudge(&mut self, dir: f32, settings: &Settings) {
        self.xv += dir.signum() * settings.cursor_accel;
    }

    /// Move the cursor by its velocity and apply damping
    pub fn step(&mut self, sim: &FruitSim, settings: &Settings) {
        self.x += self.xv;
        self.xv *= settings.cursor_damping;
        self.constrain_inside(sim);
    }

    /// Refresh `valid` from a preview at the cursor
    pub fn setup_preview(&mut self, sim: &mut FruitSim) {
        self.valid = sim
            .preview_fruit(self.x, DROP_Y, self.rad_index, self.seed)
            .is_some_and(|f| !sim.touches_any(&f));
    }

    /// Drop the pending body if the last preview was valid
    pub fn place(&mut self, sim: &mut FruitSim, new_seed: u64) -> bool {
        if !self.valid {
            return false;
        }
        if !sim.add_fruit(self.x, DROP_Y, self.rad_index, self.seed) {
            return false;
        }
        self.reset(sim, new_seed);
        self.valid = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NUM_RANDOM_RADII;

    fn fresh() -> FruitSim {
        let mut sim = FruitSim::new();
        sim.init(7);
        sim
    }

    #[test]
    fn test_reset_picks_small_tier() {
        let sim = fresh();
        let mut next = NextPlacement::default();
        for seed in 0..200 {
            next.reset(&sim, seed);
            assert!((next.rad_index as usize) < NUM_RANDOM_RADII);
        }
        next.reset(&sim, 0x30);
        assert_eq!(next.rad_index, 3);
    }

    #[test]
    fn test_step_damps_and_clamps() {
        let sim = fresh();
        let settings = Settings::default();
        let mut next = NextPlacement::new(&sim, 6.0, 0);
        next.nudge(1.0, &settings);
        next.step(&sim, &settings);
        assert!(next.x > 6.0);
        assert!(next.xv < settings.cursor_accel);

        next.xv = -100.0;
        next.step(&sim, &settings);
        assert_eq!(next.x, sim.radius(next.rad_index));
        assert_eq!(next.xv, 0.0);
    }

    #[test]
    fn test_place_requires_valid_preview() {
        let mut sim = fresh();
        let mut next = NextPlacement::new(&sim, 6.0, 0);
        assert!(!next.place(&mut sim, 1), "no preview yet");

        next.setup_preview(&mut sim);
        assert!(next.valid);
        assert!(next.place(&mut sim, 0x10));
        assert_eq!(sim.num_fruits(), 1);
        assert_eq!(next.seed, 0x10);
        assert_eq!(next.rad_index, 1);

        // Same spot is now occupied
        next.setup_preview(&mut sim);
        assert!(!next.valid);
        assert!(!next.place(&mut sim, 2));
        assert_eq!(sim.num_fruits(), 1);
    }
}
