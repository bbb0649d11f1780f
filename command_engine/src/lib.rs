//! The transactional game command engine.
//!
//! Every player-initiated change to the simulation goes through one
//! dispatcher as a command: a typed argument, an issuing company and a set
//! of execution flags. Commands run in two passes over the same handler,
//! a validation pass that must not mutate anything and a commit pass, with
//! the economy charge posted once at the end. Committed commands replicate
//! to session participants in strict sequence order and carry a state
//! digest so divergence is detected immediately.

pub mod args;
pub mod block;
pub mod command_id;
pub mod command_text;
pub mod context;
pub mod flags;
pub mod fragments;
mod handlers;
pub mod outcome;
pub mod registry;
pub mod replication;

pub use args::{ArgDecodeError, CheatCommand, GameCommandArg, MAX_NAME_BYTES};
pub use block::{ParameterBlock, BLOCK_WORDS};
pub use command_id::CommandId;
pub use command_text::{parse_line, CommandParseError};
pub use context::{ContextSnapshot, ExecutionContext};
pub use flags::CommandFlags;
pub use fragments::NameAssembler;
pub use outcome::{Failed, Outcome, FAILURE_SENTINEL};
pub use registry::{
    command_info, dispatch, dispatch_blocks, CommandInfo, DispatchError, DispatchResult, PauseGate,
};
pub use replication::{
    CommandPacket, CommandRelay, CommandRequest, FrameDecodeError, ReceiveQueue, SessionError,
    SessionHost,
};
