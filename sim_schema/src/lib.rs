//! Shared data contracts for the Steelgauge transport simulation.
//!
//! This crate holds the vocabulary types every other member speaks: entity
//! identifiers, map coordinates, currency, expenditure categories, the
//! localizable string table and the deterministic state digest. It contains
//! no simulation logic.

mod digest;
mod ids;
mod money;
mod pos;
pub mod string_ids;

pub use digest::{digest_bytes, FnvHasher};
pub use ids::{CompanyId, IndustryId, StationId, TownId};
pub use money::Money;
pub use pos::{Pos3, TilePos, TILE_SIZE};
pub use string_ids::StringId;

use serde::{Deserialize, Serialize};

/// Spending categories a command can post against.
///
/// The wire and the expenditure table index by the discriminant, so values
/// are stable and never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExpenditureType {
    Construction = 0,
    VehiclePurchases = 1,
    VehicleRunningCosts = 2,
    LoanInterest = 3,
    Miscellaneous = 4,
}

impl ExpenditureType {
    pub const COUNT: usize = 5;

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ExpenditureType::Construction),
            1 => Some(ExpenditureType::VehiclePurchases),
            2 => Some(ExpenditureType::VehicleRunningCosts),
            3 => Some(ExpenditureType::LoanInterest),
            4 => Some(ExpenditureType::Miscellaneous),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Simulation speed selected by the set-game-speed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameSpeed {
    Normal = 0,
    FastForward = 1,
    ExtremeSpeed = 2,
}

impl GameSpeed {
    pub const MAX: GameSpeed = GameSpeed::ExtremeSpeed;

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(GameSpeed::Normal),
            1 => Some(GameSpeed::FastForward),
            2 => Some(GameSpeed::ExtremeSpeed),
            _ => None,
        }
    }
}
