use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a company participating in the game.
///
/// Companies occupy a small fixed id space; [`CompanyId::NEUTRAL`] marks
/// terrain and entities that belong to nobody and is exempt from ownership
/// checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub u8);

impl CompanyId {
    pub const NEUTRAL: CompanyId = CompanyId(0xFF);

    pub fn is_neutral(self) -> bool {
        self == Self::NEUTRAL
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neutral() {
            write!(f, "neutral")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident($inner:ty)) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a town.
    TownId(u16)
);
entity_id!(
    /// Identifier of an industry.
    IndustryId(u16)
);
entity_id!(
    /// Identifier of a station.
    StationId(u16)
);
