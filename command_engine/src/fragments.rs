//! Re-assembly of name fragments arriving one block at a time.
//!
//! Renames travel as three fixed-size fragments. Callers that receive whole
//! frames decode them directly through [`GameCommandArg::decode`]; callers
//! fed individual blocks (interactive consoles, replays of block streams)
//! park partial names here until the final fragment lands.

use std::collections::BTreeMap;

use crate::args::{
    self, ArgDecodeError, GameCommandArg, FRAGMENT_BYTES, NAME_FRAGMENTS,
};
use crate::block::ParameterBlock;
use crate::command_id::CommandId;

#[derive(Debug, Default)]
struct PartialName {
    parts: [[u8; FRAGMENT_BYTES]; NAME_FRAGMENTS],
    seen: [bool; NAME_FRAGMENTS],
}

impl PartialName {
    fn complete(&self) -> bool {
        self.seen.iter().all(|present| *present)
    }
}

/// Collects name fragments per (command, entity) until a full name exists.
///
/// Keyed storage is ordered so iteration order never depends on hash state.
#[derive(Debug, Default)]
pub struct NameAssembler {
    pending: BTreeMap<(CommandId, u32), PartialName>,
}

impl NameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment block. Returns the typed argument once all three
    /// fragments for the target entity have arrived, `None` while the name
    /// is still partial.
    pub fn push(
        &mut self,
        id: CommandId,
        block: &ParameterBlock,
    ) -> Result<Option<GameCommandArg>, ArgDecodeError> {
        debug_assert!(id.carries_name());
        let (entity, index, bytes) = args::decode_fragment(block)?;

        let partial = self.pending.entry((id, entity)).or_default();
        partial.parts[index as usize] = bytes;
        partial.seen[index as usize] = true;
        if !partial.complete() {
            return Ok(None);
        }

        let partial = self
            .pending
            .remove(&(id, entity))
            .unwrap_or_default();
        let name = args::assemble_name(&partial.parts)?;
        args::name_command_arg(id, entity, name).map(Some)
    }

    /// Drop partial names, e.g. when the issuing session goes away.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
