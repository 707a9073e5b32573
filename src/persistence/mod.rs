//! Save/load of a running game
//!
//! Features:
//! - Versioned JSON envelope with a magic tag
//! - Validation before anything is written into the simulation
//! - Tier radii recomputed on load, so a hand-edited save cannot break the
//!   radius invariant

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FRUIT_CAP, NUM_RADII};
use crate::sim::{Fruit, FruitSim, NextPlacement};

/// Tag identifying a planets save
pub const SAVE_MAGIC: u32 = 0x504c_4e54;
/// Current save layout version
pub const SAVE_VERSION: u32 = 1;

/// Errors from loading or storing game data
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Json(serde_json::Error),
    BadMagic { found: u32 },
    UnsupportedVersion { found: u32 },
    TooManyFruits { count: usize, cap: usize },
    TierOutOfRange { index: usize, tier: u32 },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "malformed save data: {err}"),
            Self::BadMagic { found } => write!(f, "not a planets save (magic 0x{found:08x})"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported save version: {found}"),
            Self::TooManyFruits { count, cap } => {
                write!(f, "save holds {count} bodies, capacity is {cap}")
            }
            Self::TierOutOfRange { index, tier } => {
                write!(f, "body {index} has tier {tier} (max {})", NUM_RADII - 1)
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Everything needed to resume a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub magic: u32,
    pub version: u32,
    /// Pending drop
    pub next: NextPlacement,
    /// Body flagged by loss detection, if the game was already lost
    pub outlier_index: Option<usize>,
    /// Frame counter of the game loop
    pub simulation_frame: u32,
    pub score: u64,
    pub pop_count: u32,
    pub fruits: Vec<Fruit>,
}

impl SaveState {
    /// Snapshot a simulation and the loop state around it
    pub fn capture(
        sim: &FruitSim,
        next: NextPlacement,
        outlier_index: Option<usize>,
        simulation_frame: u32,
    ) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: SAVE_VERSION,
            next,
            outlier_index,
            simulation_frame,
            score: sim.score(),
            pop_count: sim.pop_count(),
            fruits: sim.fruits().to_vec(),
        }
    }

    /// Check the snapshot can be restored
    pub fn validate(&self) -> Result<(), PersistError> {
        if self.magic != SAVE_MAGIC {
            return Err(PersistError::BadMagic { found: self.magic });
        }
        if self.version != SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.fruits.len() > FRUIT_CAP {
            return Err(PersistError::TooManyFruits {
                count: self.fruits.len(),
                cap: FRUIT_CAP,
            });
        }
        if let Some((index, f)) = self
            .fruits
            .iter()
            .enumerate()
            .find(|(_, f)| f.r_index as usize >= NUM_RADII)
        {
            return Err(PersistError::TierOutOfRange {
                index,
                tier: f.r_index,
            });
        }
        Ok(())
    }

    /// Write the snapshot into `sim`; nothing is touched if validation fails
    pub fn restore(&self, sim: &mut FruitSim) -> Result<(), PersistError> {
        self.validate()?;
        let radii = *sim.radii();
        let slots = sim.slots_mut();
        for (slot, saved) in slots.iter_mut().zip(&self.fruits) {
            *slot = *saved;
            slot.set_tier(saved.r_index, &radii);
            slot.flags &= !(Fruit::SENSOR | Fruit::DELETABLE);
        }
        sim.set_num_fruits(self.fruits.len());
        sim.set_score(self.score);
        sim.set_pop_count(self.pop_count);
        log::info!(
            "Restored game at frame {} ({} bodies, score {})",
            self.simulation_frame,
            self.fruits.len(),
            self.score
        );
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        Self::from_json(&std::fs::read_to_string(path.as_ref())?)
    }
}
