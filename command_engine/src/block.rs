use serde::{Deserialize, Serialize};

/// Number of 32-bit words in one parameter block.
pub const BLOCK_WORDS: usize = 8;

/// The legacy fixed-size parameter envelope.
///
/// Every command argument value packs into one or more of these blocks using
/// a fixed, documented word layout (see the `args` module), so the same
/// bytes decode identically on every network participant. In-process callers
/// should prefer the typed [`GameCommandArg`](crate::GameCommandArg); the
/// block survives as the wire and replay representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBlock(pub [u32; BLOCK_WORDS]);

impl ParameterBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self, index: usize) -> u32 {
        self.0[index]
    }

    pub fn set_word(&mut self, index: usize, value: u32) -> &mut Self {
        self.0[index] = value;
        self
    }

    /// Signed view of a word; negative quantities are stored two's-complement.
    pub fn signed_word(&self, index: usize) -> i32 {
        self.0[index] as i32
    }

    pub fn words(&self) -> &[u32; BLOCK_WORDS] {
        &self.0
    }
}
