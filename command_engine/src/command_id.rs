use serde::{Deserialize, Serialize};

use crate::args::ArgDecodeError;

/// Identifier of a game command.
///
/// Discriminants are stable across sessions and across the network wire;
/// gaps come from the historical command table and are never reassigned
/// while save or replay files referencing them exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandId {
    ChangeLoan = 9,
    RenameStation = 11,
    PauseGame = 20,
    RemoveTree = 22,
    CreateTree = 23,
    RaiseLand = 25,
    LowerLand = 26,
    ChangeCompanyName = 30,
    CreateWall = 32,
    RemoveWall = 33,
    RenameTown = 46,
    CreateIndustry = 47,
    RemoveIndustry = 48,
    CreateTown = 49,
    RemoveTown = 50,
    BuildCompanyHeadquarters = 54,
    RemoveCompanyHeadquarters = 55,
    ClearLand = 66,
    Cheat = 81,
    SetGameSpeed = 82,
}

impl CommandId {
    pub const ALL: &'static [CommandId] = &[
        CommandId::ChangeLoan,
        CommandId::RenameStation,
        CommandId::PauseGame,
        CommandId::RemoveTree,
        CommandId::CreateTree,
        CommandId::RaiseLand,
        CommandId::LowerLand,
        CommandId::ChangeCompanyName,
        CommandId::CreateWall,
        CommandId::RemoveWall,
        CommandId::RenameTown,
        CommandId::CreateIndustry,
        CommandId::RemoveIndustry,
        CommandId::CreateTown,
        CommandId::RemoveTown,
        CommandId::BuildCompanyHeadquarters,
        CommandId::RemoveCompanyHeadquarters,
        CommandId::ClearLand,
        CommandId::Cheat,
        CommandId::SetGameSpeed,
    ];

    /// Decode a wire identifier. Unknown values are a decode error, not a
    /// domain failure; a malformed frame must be rejected before any
    /// handler logic runs.
    pub fn try_from_wire(value: u32) -> Result<Self, ArgDecodeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| *id as u32 == value)
            .ok_or(ArgDecodeError::UnknownCommand { value })
    }

    pub fn to_wire(self) -> u32 {
        self as u32
    }

    /// Commands whose string argument travels as name fragments on the wire.
    pub fn carries_name(self) -> bool {
        matches!(
            self,
            CommandId::RenameStation | CommandId::ChangeCompanyName | CommandId::RenameTown
        )
    }
}
