//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Fixed step, fixed iteration count
//! - Seeded RNG only, rebuilt from a seed at every draw site
//! - Index-based iteration over the dense body array
//! - No rendering, audio or platform dependencies

pub mod fruit;
pub mod math;
pub mod placement;
pub mod radii;
pub mod rng;
pub mod state;
pub mod tick;

pub use fruit::Fruit;
pub use math::{rotate90, rsqrt};
pub use placement::NextPlacement;
pub use radii::RadiusTable;
pub use rng::Lcg48;
pub use state::FruitSim;
