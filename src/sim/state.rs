//! Simulation world and its lifecycle
//!
//! The body array is dense and order-irrelevant: removal swaps the last live
//! body into the freed slot, so indices are only valid until the next
//! `simulate` call.

use glam::Vec2;

use super::fruit::Fruit;
use super::radii::RadiusTable;
use super::rng::Lcg48;
use crate::consts::*;
use crate::settings::Settings;

/// The world: a fixed-capacity body array plus scoring counters
#[derive(Debug, Clone)]
pub struct FruitSim {
    /// Backing storage, always `FRUIT_CAP` slots; only `..num_fruits` are live
    pub(crate) fruits: Vec<Fruit>,
    pub(crate) num_fruits: usize,
    /// Successful merges since `init`
    pub(crate) pop_count: u32,
    /// Merges during the most recent `simulate` call
    pub(crate) last_pop_count: u32,
    pub(crate) score: u64,
    pub(crate) gravity: f32,
    pub(crate) radii: RadiusTable,
    /// Bodies bulk-seeded by `init`
    initial_fruits: usize,
}

impl Default for FruitSim {
    fn default() -> Self {
        Self::new()
    }
}

impl FruitSim {
    /// Create an empty world; call `init` to start a game
    pub fn new() -> Self {
        Self {
            fruits: vec![Fruit::default(); FRUIT_CAP],
            num_fruits: 0,
            pop_count: 0,
            last_pop_count: 0,
            score: 0,
            gravity: DEFAULT_GRAVITY,
            radii: RadiusTable::geometric(),
            initial_fruits: 0,
        }
    }

    /// Create a world that seeds `settings.initial_fruits` bodies on `init`
    pub fn with_settings(settings: &Settings) -> Self {
        let mut sim = Self::new();
        sim.initial_fruits = settings.initial_fruits.min(FRUIT_CAP);
        sim
    }

    /// Push runtime settings into an initialized world
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.initial_fruits = settings.initial_fruits.min(FRUIT_CAP);
        self.gravity = settings.gravity;
    }

    /// Reset for a new game
    ///
    /// Clears the body set and counters, rebuilds the radius table, restores
    /// the default gravity and scatters the configured number of initial
    /// bodies (small tiers only) using `world_seed`.
    pub fn init(&mut self, world_seed: u64) -> &[Fruit] {
        let mut rng = Lcg48::new(world_seed);
        self.radii = RadiusTable::geometric();
        self.gravity = DEFAULT_GRAVITY;
        self.pop_count = 0;
        self.last_pop_count = 0;
        self.score = 0;
        self.num_fruits = self.initial_fruits.min(FRUIT_CAP);

        for i in 0..self.num_fruits {
            let tier = rng.below(self.radii.num_random() as u64) as u32;
            let rotation = (rng.next_raw() >> 16) as u32;
            let r = self.radii.get(tier);
            let d = r * 2.0;
            let x = rng.fraction() * (WORLD_SIZE_X - d) + r;
            let y = rng.fraction() * (WORLD_SIZE_Y - d) + r;
            self.fruits[i] = Fruit::new(Vec2::new(x, y), tier, &self.radii, rotation);
        }

        log::info!(
            "Initialized world (seed {world_seed}, {} initial bodies)",
            self.num_fruits
        );
        self.fruits()
    }

    /// Spawn a body; returns false when the world is full
    ///
    /// The tier is clamped to the table, `x` to the side walls and `y` only
    /// against the floor, since drops start above the visible field.
    pub fn add_fruit(&mut self, x: f32, y: f32, radius_index: u32, seed: u64) -> bool {
        if self.num_fruits >= FRUIT_CAP {
            log::warn!("Body capacity ({FRUIT_CAP}) reached, drop ignored");
            return false;
        }
        let mut rng = Lcg48::new(seed);
        let tier = RadiusTable::clamp_tier(radius_index);
        let r = self.radii.get(tier);
        let x = x.clamp(r, WORLD_SIZE_X - r);
        let y = y.min(WORLD_SIZE_Y - r);
        let rotation = (rng.next_raw() >> 16) as u32;

        self.fruits[self.num_fruits] = Fruit::new(Vec2::new(x, y), tier, &self.radii, rotation);
        self.num_fruits += 1;
        true
    }

    /// Build the body `add_fruit` would create, without keeping it
    ///
    /// The returned copy carries the `SENSOR` flag; the live count is left
    /// unchanged. `None` when the world is full.
    pub fn preview_fruit(&mut self, x: f32, y: f32, radius_index: u32, seed: u64) -> Option<Fruit> {
        let before = self.num_fruits;
        let preview = if self.add_fruit(x, y, radius_index, seed) {
            let slot = &mut self.fruits[self.num_fruits - 1];
            slot.flags |= Fruit::SENSOR;
            Some(*slot)
        } else {
            None
        };
        self.num_fruits = before;
        preview
    }

    /// Whether `fruit` overlaps any live body
    pub fn touches_any(&self, fruit: &Fruit) -> bool {
        self.fruits().iter().any(|f| f.touches(fruit))
    }

    /// Live bodies
    #[inline]
    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits[..self.num_fruits]
    }

    /// All `FRUIT_CAP` slots, for restoring a saved body array
    pub fn slots_mut(&mut self) -> &mut [Fruit] {
        &mut self.fruits
    }

    /// Live bodies as raw bytes (bit-exact comparison and hashing)
    pub fn fruit_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.fruits())
    }

    #[inline]
    pub fn num_fruits(&self) -> usize {
        self.num_fruits
    }

    /// Set the live count (clamped to capacity)
    pub fn set_num_fruits(&mut self, n: usize) {
        self.num_fruits = n.min(FRUIT_CAP);
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    pub fn pop_count(&self) -> u32 {
        self.pop_count
    }

    pub fn set_pop_count(&mut self, pop_count: u32) {
        self.pop_count = pop_count;
    }

    /// Merges during the most recent frame
    pub fn last_pop_count(&self) -> u32 {
        self.last_pop_count
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn world_width(&self) -> f32 {
        WORLD_SIZE_X
    }

    pub fn world_height(&self) -> f32 {
        WORLD_SIZE_Y
    }

    pub fn num_radii(&self) -> usize {
        self.radii.len()
    }

    pub fn num_random_radii(&self) -> usize {
        self.radii.num_random()
    }

    /// Radius of a tier (clamped)
    pub fn radius(&self, index: u32) -> f32 {
        self.radii.get(index)
    }

    pub fn radii(&self) -> &RadiusTable {
        &self.radii
    }
}
