use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Execution flags carried alongside every command.
    ///
    /// Bit positions are part of the wire format and match the legacy
    /// encoding; unused legacy bits stay reserved.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CommandFlags: u8 {
        /// Commit the command. Unset means query: validate and cost only.
        const APPLY = 1 << 0;
        /// Do not open an error window on failure; the structured error is
        /// still produced.
        const NO_ERROR_WINDOW = 1 << 3;
        /// AI-placed invisible ghost that still blocks player construction.
        const AI_ALLOCATED = 1 << 4;
        /// Calculate the cost but do not post the payment.
        const NO_PAYMENT = 1 << 5;
        /// Place or modify a non-authoritative preview instance.
        const GHOST = 1 << 6;
    }
}

impl CommandFlags {
    /// True when this dispatch must not touch company finances.
    pub fn suppresses_payment(self) -> bool {
        self.intersects(CommandFlags::GHOST | CommandFlags::NO_PAYMENT)
    }

    pub fn is_apply(self) -> bool {
        self.contains(CommandFlags::APPLY)
    }

    pub fn is_ghost(self) -> bool {
        self.contains(CommandFlags::GHOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_bit_positions_are_stable() {
        assert_eq!(CommandFlags::APPLY.bits(), 0x01);
        assert_eq!(CommandFlags::NO_ERROR_WINDOW.bits(), 0x08);
        assert_eq!(CommandFlags::AI_ALLOCATED.bits(), 0x10);
        assert_eq!(CommandFlags::NO_PAYMENT.bits(), 0x20);
        assert_eq!(CommandFlags::GHOST.bits(), 0x40);
    }

    #[test]
    fn ghost_and_no_payment_suppress_payment() {
        assert!(CommandFlags::GHOST.suppresses_payment());
        assert!(CommandFlags::NO_PAYMENT.suppresses_payment());
        assert!(!(CommandFlags::APPLY | CommandFlags::NO_ERROR_WINDOW).suppresses_payment());
    }
}
