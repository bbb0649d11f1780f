//! Command handlers, grouped by the part of the world they touch.
//!
//! Every handler has the same shape: it validates against the current state,
//! fills in the execution context, and mutates only when the apply flag is
//! set. The registry guarantees a handler is called at most twice per
//! dispatch, first without and then with the apply flag.

pub mod cheats;
pub mod company;
pub mod general;
pub mod industry;
pub mod scenery;
pub mod station;
pub mod terraform;
pub mod town;
