//! Fixed-step simulation tick
//!
//! One call advances the world by one frame: integrate every body, then run a
//! fixed number of constraint passes (pairwise contacts, walls, rolling).

use super::fruit::Fruit;
use super::state::FruitSim;
use crate::consts::*;

impl FruitSim {
    /// Advance the world by one frame
    ///
    /// `frame_index` stamps floor contacts for loss detection and should start
    /// at 1 (0 marks a body that was never grounded).
    pub fn simulate(&mut self, frame_seed: u64, frame_index: u32) -> &[Fruit] {
        log::trace!(
            "frame {frame_index} (seed {frame_seed}): {} bodies",
            self.num_fruits
        );
        self.last_pop_count = 0;

        let gravity = self.gravity;
        for fruit in &mut self.fruits[..self.num_fruits] {
            fruit.integrate(gravity);
        }

        for _ in 0..RELAXATION_ITERATIONS {
            self.resolve_contacts(frame_index);

            for fruit in &mut self.fruits[..self.num_fruits] {
                fruit.constrain_inside(frame_index);
            }
            for fruit in &mut self.fruits[..self.num_fruits] {
                fruit.roll();
            }
        }

        self.fruits()
    }

    /// One pass over every unordered live pair `(j, i)`, `j < i`
    ///
    /// Merged-away bodies are swap-removed on the spot and the cursor of each
    /// removed slot steps back by one, so the body swapped into that slot is
    /// still paired with everything before it.
    fn resolve_contacts(&mut self, frame_index: u32) {
        let mut i: isize = 1;
        while (i as usize) < self.num_fruits {
            let mut j: isize = 0;
            while j < i && (i as usize) < self.num_fruits {
                let (ju, iu) = (j as usize, i as usize);
                let (head, tail) = self.fruits.split_at_mut(iu);
                let score = head[ju].keep_distance(&mut tail[0], &self.radii, frame_index);
                if score != 0 {
                    self.score += u64::from(score);
                    self.pop_count += 1;
                    self.last_pop_count += 1;

                    let remove_j = self.fruits[ju].is_deletable();
                    let remove_i = self.fruits[iu].is_deletable();
                    if remove_j {
                        log::debug!("Top-tier pair annihilated (+{score})");
                    } else {
                        log::debug!("Merged into tier {} (+{score})", self.fruits[ju].r_index);
                    }

                    // Higher slot first, so removing j never pulls the dead
                    // body at i back into the live range
                    if remove_i {
                        self.swap_remove(iu);
                        i -= 1;
                    }
                    if remove_j {
                        self.swap_remove(ju);
                        j -= 1;
                    }
                }
                j += 1;
            }
            i += 1;
        }
    }

    /// Swap the last live body into `index` and shrink the live set
    fn swap_remove(&mut self, index: usize) {
        let last = self.num_fruits - 1;
        if index < last {
            self.fruits[index] = self.fruits[last];
        }
        self.num_fruits = last;
    }

    /// Index of the grounded body protruding above the field, if any
    ///
    /// Not judged on frames with a merge, since merges can briefly violate the
    /// bounds. Among candidates, the one with the largest `pos.y` (the most
    /// marginal violator) is returned.
    pub fn find_grounded_outside(&self, frame_index: u32) -> Option<usize> {
        if self.last_pop_count > 0 {
            return None;
        }
        let mut max_y = -WORLD_SIZE_Y;
        let mut found = None;
        for (i, f) in self.fruits().iter().enumerate() {
            if f.bottom_touch_frame == frame_index && f.pos.y < f.r && max_y < f.pos.y {
                found = Some(i);
                max_y = f.pos.y;
            }
        }
        if let Some(i) = found {
            log::debug!("Grounded body {i} outside the field at y={max_y}");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::merge_score;
    use crate::settings::Settings;

    fn fresh() -> FruitSim {
        let mut sim = FruitSim::new();
        sim.init(7);
        sim
    }

    fn assert_contained(sim: &FruitSim) {
        for f in sim.fruits() {
            assert!(f.pos.x >= f.r && f.pos.x <= WORLD_SIZE_X - f.r, "x out of bounds: {f:?}");
            assert!(f.pos.y <= WORLD_SIZE_Y - f.r && f.pos.y >= WORLD_SANITY_TOP, "y out of bounds: {f:?}");
        }
    }

    #[test]
    fn test_two_equal_drops_merge() {
        let mut sim = fresh();
        assert!(sim.add_fruit(6.0, 0.0, 0, 1));
        assert!(sim.add_fruit(6.0, 0.0, 0, 1));
        sim.simulate(1, 1);

        assert_eq!(sim.num_fruits(), 1);
        let f = sim.fruits()[0];
        assert_eq!(f.r_index, 1);
        assert_eq!(f.r, sim.radius(1));
        assert_eq!(sim.score(), u64::from(merge_score(0)));
        assert_eq!(sim.pop_count(), 1);
        assert_eq!(sim.last_pop_count(), 1);
    }

    #[test]
    fn test_top_tier_pair_annihilates() {
        let mut sim = fresh();
        let top = NUM_RADII as u32 - 1;
        sim.add_fruit(6.0, 8.0, top, 1);
        sim.add_fruit(6.0, 8.0, top, 2);
        sim.simulate(1, 1);

        assert_eq!(sim.num_fruits(), 0);
        assert_eq!(sim.score(), u64::from(merge_score(top)));
        assert_eq!(sim.pop_count(), 1);
    }

    #[test]
    fn test_annihilation_keeps_third_body() {
        let mut sim = fresh();
        let top = NUM_RADII as u32 - 1;
        for seed in 0..3 {
            sim.add_fruit(6.0, 8.0, top, seed);
        }
        sim.simulate(1, 1);

        assert_eq!(sim.num_fruits(), 1);
        let survivor = sim.fruits()[0];
        assert!(!survivor.is_deletable());
        assert_eq!(survivor.r_index, top);
        assert_eq!(sim.score(), u64::from(merge_score(top)));
    }

    #[test]
    fn test_merge_does_not_skip_swapped_body() {
        let mut sim = fresh();
        for seed in 0..3 {
            sim.add_fruit(6.0, 8.0, 0, seed);
        }
        sim.simulate(1, 1);

        // First pair merges; the body swapped into slot 1 meets the tier-1
        // survivor but cannot merge with it
        assert_eq!(sim.num_fruits(), 2);
        let mut tiers: Vec<u32> = sim.fruits().iter().map(|f| f.r_index).collect();
        tiers.sort_unstable();
        assert_eq!(tiers, vec![0, 1]);
        assert_eq!(sim.score(), u64::from(merge_score(0)));
        assert!(sim.fruits().iter().all(|f| !f.is_deletable()));
    }

    #[test]
    fn test_four_equal_drops_cascade() {
        let mut sim = fresh();
        for seed in 0..4 {
            sim.add_fruit(6.0, 8.0, 0, seed);
        }
        sim.simulate(1, 1);

        // 0+0 -> 1 twice, then 1+1 -> 2
        assert_eq!(sim.num_fruits(), 1);
        assert_eq!(sim.fruits()[0].r_index, 2);
        assert_eq!(
            sim.score(),
            u64::from(2 * merge_score(0) + merge_score(1))
        );
        assert_eq!(sim.pop_count(), 3);
    }

    #[test]
    fn test_body_falls_and_rests_on_floor() {
        let mut sim = fresh();
        sim.add_fruit(6.0, 0.0, 2, 1);
        for frame in 1..=600 {
            sim.simulate(frame as u64, frame);
        }
        let f = sim.fruits()[0];
        assert!((f.pos.y - (WORLD_SIZE_Y - f.r)).abs() < 1e-4);
        assert_eq!(f.bottom_touch_frame, 600);
        assert!(f.velocity().length() < 0.02);
    }

    #[test]
    fn test_grounded_propagates_up_a_stack() {
        let mut sim = fresh();
        let big_r = sim.radius(4);
        let small_r = sim.radius(0);
        sim.add_fruit(6.0, WORLD_SIZE_Y - big_r, 4, 1);
        sim.add_fruit(6.0, WORLD_SIZE_Y - 2.0 * big_r - small_r, 0, 2);
        for frame in 1..=120 {
            sim.simulate(frame as u64, frame);
        }
        assert_eq!(sim.num_fruits(), 2);
        for f in sim.fruits() {
            assert_eq!(f.bottom_touch_frame, 120, "{f:?}");
        }
    }

    #[test]
    fn test_different_tiers_separate() {
        let mut sim = fresh();
        sim.add_fruit(6.0, 14.0, 1, 1);
        sim.add_fruit(6.1, 14.0, 3, 2);
        for frame in 1..=240 {
            sim.simulate(frame as u64, frame);
        }
        assert_eq!(sim.num_fruits(), 2);
        assert_eq!(sim.score(), 0);
        let (a, b) = (sim.fruits()[0], sim.fruits()[1]);
        let gap = (a.pos - b.pos).length();
        assert!(gap > (a.r + b.r) * 0.95, "gap {gap} too small");
        assert_contained(&sim);
    }

    fn place_outlier(sim: &mut FruitSim, x: f32, y: f32, frame: u32) {
        let radii = *sim.radii();
        let n = sim.num_fruits();
        let mut f = crate::sim::Fruit::new(Vec2::new(x, y), 0, &radii, 0);
        f.bottom_touch_frame = frame;
        sim.slots_mut()[n] = f;
        sim.set_num_fruits(n + 1);
    }

    #[test]
    fn test_find_grounded_outside_picks_most_marginal() {
        let mut sim = fresh();
        sim.add_fruit(6.0, 15.0, 0, 1);
        place_outlier(&mut sim, 2.0, -3.0, 5);
        place_outlier(&mut sim, 4.0, -1.0, 5);
        place_outlier(&mut sim, 8.0, -0.5, 4);
        assert_eq!(sim.find_grounded_outside(5), Some(2));
        assert_eq!(sim.find_grounded_outside(4), Some(3));
        assert_eq!(sim.find_grounded_outside(6), None);
    }

    #[test]
    fn test_find_grounded_outside_none_when_inside() {
        let mut sim = fresh();
        place_outlier(&mut sim, 6.0, 2.0, 5);
        assert_eq!(sim.find_grounded_outside(5), None);
    }

    #[test]
    fn test_find_grounded_outside_suppressed_by_merge() {
        let build = |with_merge: bool| {
            let mut sim = fresh();
            sim.set_gravity(0.0);
            place_outlier(&mut sim, 1.0, -2.0, 3);
            if with_merge {
                sim.add_fruit(9.0, 12.0, 1, 1);
                sim.add_fruit(9.0, 12.0, 1, 2);
            }
            sim.simulate(3, 3);
            sim
        };

        let calm = build(false);
        assert_eq!(calm.last_pop_count(), 0);
        assert_eq!(calm.find_grounded_outside(3), Some(0));

        let merged = build(true);
        assert_eq!(merged.last_pop_count(), 1);
        assert_eq!(merged.find_grounded_outside(3), None);
    }

    #[test]
    fn test_determinism_bit_identical() {
        let settings = Settings {
            initial_fruits: 64,
            ..Settings::default()
        };
        let mut a = FruitSim::with_settings(&settings);
        let mut b = FruitSim::with_settings(&settings);
        a.init(7);
        b.init(7);
        for frame in 1..=30 {
            a.simulate(frame as u64, frame);
            b.simulate(frame as u64, frame);
        }
        assert_eq!(a.num_fruits(), b.num_fruits());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.fruit_bytes(), b.fruit_bytes());
    }

    #[test]
    fn test_crowded_world_stays_contained() {
        let settings = Settings {
            initial_fruits: 128,
            ..Settings::default()
        };
        let mut sim = FruitSim::with_settings(&settings);
        sim.init(7);
        for frame in 1..=20 {
            sim.simulate(frame as u64, frame);
            assert!(sim.num_fruits() <= FRUIT_CAP);
            assert_contained(&sim);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_invariants_hold_under_random_drops(
            drops in prop::collection::vec((0.0f32..12.0, 0u32..5, -4.0f32..14.0), 1..40),
            frames in 1u32..30,
        ) {
            let mut sim = fresh();
            for (seed, &(x, tier, y)) in drops.iter().enumerate() {
                prop_assert!(sim.add_fruit(x, y, tier, seed as u64));
            }
            let mut last_score = 0;
            for frame in 1..=frames {
                sim.simulate(u64::from(frame), frame);
                prop_assert!(sim.num_fruits() <= FRUIT_CAP);
                prop_assert!(sim.score() >= last_score);
                last_score = sim.score();
                for f in sim.fruits() {
                    prop_assert!((f.r_index as usize) < NUM_RADII);
                    prop_assert_eq!(f.r, sim.radius(f.r_index));
                    prop_assert_eq!(f.r2, f.r * f.r);
                    prop_assert!(f.pos.x >= f.r && f.pos.x <= WORLD_SIZE_X - f.r);
                    prop_assert!(f.pos.y <= WORLD_SIZE_Y - f.r);
                    prop_assert!(f.rotation < 65536);
                    prop_assert!(!f.is_deletable() && !f.is_sensor());
                }
            }
        }

        #[test]
        fn prop_merges_conserve_area_order(
            tiers in prop::collection::vec(0u32..5, 2..20),
        ) {
            // Every merge removes exactly one body (top tier is never reached here)
            let mut sim = fresh();
            for (seed, &tier) in tiers.iter().enumerate() {
                sim.add_fruit(6.0, 8.0, tier, seed as u64);
            }
            sim.simulate(1, 1);
            prop_assert_eq!(
                sim.num_fruits() + sim.pop_count() as usize,
                tiers.len()
            );
        }

        #[test]
        fn prop_preview_never_persists(
            x in 0.0f32..12.0,
            tier in 0u32..20,
            existing in 0usize..10,
        ) {
            let mut sim = fresh();
            for i in 0..existing {
                sim.add_fruit(i as f32, 15.0, 0, i as u64);
            }
            let before = sim.fruit_bytes().to_vec();
            let preview = sim.preview_fruit(x, DROP_Y, tier, 9);
            prop_assert!(preview.is_some_and(|f| f.is_sensor()));
            prop_assert_eq!(sim.num_fruits(), existing);
            prop_assert_eq!(sim.fruit_bytes(), &before[..]);
        }

        #[test]
        fn prop_same_inputs_same_frame(seed in 0u64..10_000, frame in 1u32..1000) {
            let settings = Settings {
                initial_fruits: 24,
                ..Settings::default()
            };
            let mut a = FruitSim::with_settings(&settings);
            a.init(seed);
            let mut b = a.clone();
            a.simulate(seed, frame);
            b.simulate(seed, frame);
            prop_assert_eq!(a.fruit_bytes(), b.fruit_bytes());
            prop_assert_eq!(a.score(), b.score());
        }
    }
}
