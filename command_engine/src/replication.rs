//! Multiplayer command replication.
//!
//! A session has exactly one sequencer, the host. Issuers validate a
//! command locally and submit it as an unsequenced request; the host
//! commits it against the authoritative world, stamps the next
//! session-wide index and its post-apply state digest, and broadcasts the
//! packet. Every participant, the originator included, commits through its
//! receive queue in strict index order and compares digests after each
//! command. Ghost commands are previews and never enter the stream.

use std::collections::BTreeMap;

use prost::Message;
use thiserror::Error;
use tracing::{debug, warn};

use core_sim::{state_digest, GameState};
use sim_schema::CompanyId;

use crate::args::GameCommandArg;
use crate::block::{ParameterBlock, BLOCK_WORDS};
use crate::command_id::CommandId;
use crate::flags::CommandFlags;
use crate::registry::{dispatch, dispatch_blocks, DispatchError, DispatchResult};

mod proto {
    include!(concat!(env!("OUT_DIR"), "/steelgauge.commands.rs"));
}

/// A command its issuer validated but the session has not ordered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub company: CompanyId,
    pub id: CommandId,
    pub flags: CommandFlags,
    pub blocks: Vec<ParameterBlock>,
}

/// One sequenced command, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPacket {
    /// Session-wide sequence number assigned by the host.
    pub index: u64,
    /// Tick the host committed the command on.
    pub tick: u32,
    pub company: CompanyId,
    pub id: CommandId,
    pub flags: CommandFlags,
    pub blocks: Vec<ParameterBlock>,
    /// Host's state digest after committing this command.
    pub state_digest: u64,
}

/// Frame rejected before reaching the dispatcher.
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error(transparent)]
    Transport(#[from] prost::DecodeError),
    #[error(transparent)]
    Arg(#[from] crate::args::ArgDecodeError),
    #[error("frame carries unknown flag bits {value:#04x}")]
    InvalidFlags { value: u32 },
    #[error("frame carries out-of-range company {value}")]
    InvalidCompany { value: u32 },
    #[error("frame word count {count} is not a whole number of blocks")]
    BadWordCount { count: usize },
}

impl CommandPacket {
    pub fn encode_frame(&self) -> Vec<u8> {
        let frame = proto::CommandFrame {
            command: self.id.to_wire(),
            flags: self.flags.bits() as u32,
            company: self.company.0 as u32,
            words: self
                .blocks
                .iter()
                .flat_map(|block| block.words().iter().copied())
                .collect(),
            index: self.index,
            tick: self.tick,
            state_digest: self.state_digest,
        };
        frame.encode_to_vec()
    }

    pub fn decode_frame(bytes: &[u8]) -> Result<Self, FrameDecodeError> {
        let frame = proto::CommandFrame::decode(bytes)?;
        let id = CommandId::try_from_wire(frame.command)?;
        let flag_bits = u8::try_from(frame.flags)
            .map_err(|_| FrameDecodeError::InvalidFlags { value: frame.flags })?;
        let flags = CommandFlags::from_bits(flag_bits)
            .ok_or(FrameDecodeError::InvalidFlags { value: frame.flags })?;
        let company = u8::try_from(frame.company).map_err(|_| FrameDecodeError::InvalidCompany {
            value: frame.company,
        })?;
        if frame.words.is_empty() || frame.words.len() % BLOCK_WORDS != 0 {
            return Err(FrameDecodeError::BadWordCount {
                count: frame.words.len(),
            });
        }
        let blocks = frame
            .words
            .chunks_exact(BLOCK_WORDS)
            .map(|chunk| {
                let mut words = [0u32; BLOCK_WORDS];
                words.copy_from_slice(chunk);
                ParameterBlock(words)
            })
            .collect();
        Ok(CommandPacket {
            index: frame.index,
            tick: frame.tick,
            company: CompanyId(company),
            id,
            flags,
            blocks,
            state_digest: frame.state_digest,
        })
    }
}

/// The issuing side: resolves queries and ghost previews on this machine
/// and hands everything else to the session sequencer.
#[derive(Debug, Default)]
pub struct CommandRelay {
    outgoing: Vec<CommandRequest>,
}

impl CommandRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a command. Queries and ghost previews resolve entirely locally.
    /// An apply request is only validated here; if it passes, it is queued
    /// for the host, and the commit happens when the sequenced packet
    /// comes back through this participant's own [`ReceiveQueue`]. Until
    /// then the local world is untouched.
    pub fn issue(
        &mut self,
        world: &mut GameState,
        company: CompanyId,
        arg: &GameCommandArg,
        flags: CommandFlags,
    ) -> Result<DispatchResult, DispatchError> {
        if !flags.is_apply() || flags.is_ghost() {
            return dispatch(world, company, arg, flags);
        }
        let result = dispatch(world, company, arg, flags - CommandFlags::APPLY)?;
        if result.succeeded() {
            debug!(command = ?arg.id(), "queued request for the session");
            self.outgoing.push(CommandRequest {
                company,
                id: arg.id(),
                flags,
                blocks: arg.encode(),
            });
        }
        Ok(result)
    }

    /// Requests validated since the last call, in issue order.
    pub fn take_outgoing(&mut self) -> Vec<CommandRequest> {
        std::mem::take(&mut self.outgoing)
    }
}

/// The session sequencer. One per session; every request passes through it
/// and receives its index from the one counter, so two issuers can never
/// collide on a sequence number.
#[derive(Debug, Default)]
pub struct SessionHost {
    next_index: u64,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `request` against the authoritative world and stamp it with
    /// the next session index. `Ok(None)` means the request was refused
    /// here and dropped without consuming an index; requests race, and a
    /// refusal at sequencing is a normal outcome, not a session fault.
    pub fn sequence(
        &mut self,
        world: &mut GameState,
        request: CommandRequest,
    ) -> Result<Option<CommandPacket>, DispatchError> {
        let flags = request.flags | CommandFlags::APPLY;
        let result = dispatch_blocks(world, request.company, request.id, &request.blocks, flags)?;
        if !result.succeeded() {
            warn!(command = ?request.id, "request refused at sequencing");
            return Ok(None);
        }
        let packet = CommandPacket {
            index: self.next_index,
            tick: world.tick,
            company: request.company,
            id: request.id,
            flags: request.flags,
            blocks: request.blocks,
            state_digest: state_digest(world),
        };
        debug!(index = packet.index, command = ?packet.id, "sequenced command");
        self.next_index += 1;
        Ok(Some(packet))
    }

    /// How many commands the session has ordered so far.
    pub fn sequenced(&self) -> u64 {
        self.next_index
    }
}

/// Why a receiving session must stop.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("packet index {index} was already applied")]
    StaleIndex { index: u64 },
    #[error("packet index {index} is already buffered")]
    DuplicateIndex { index: u64 },
    #[error("ghost command in the replication stream at index {index}")]
    GhostInStream { index: u64 },
    #[error("replicated command at index {index} is malformed: {source}")]
    Malformed {
        index: u64,
        source: DispatchError,
    },
    #[error("replicated command at index {index} was refused locally")]
    CommandRefused { index: u64 },
    #[error("state digest mismatch after index {index}: expected {expected:#018x}, got {actual:#018x}")]
    Divergence {
        index: u64,
        expected: u64,
        actual: u64,
    },
}

/// The receiving side: orders incoming packets and applies them without
/// gaps.
#[derive(Debug, Default)]
pub struct ReceiveQueue {
    next_index: u64,
    pending: BTreeMap<u64, CommandPacket>,
}

impl ReceiveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one packet. Out-of-order arrival is fine; going backwards is
    /// not.
    pub fn insert(&mut self, packet: CommandPacket) -> Result<(), SessionError> {
        if packet.index < self.next_index {
            return Err(SessionError::StaleIndex {
                index: packet.index,
            });
        }
        if packet.flags.is_ghost() {
            return Err(SessionError::GhostInStream {
                index: packet.index,
            });
        }
        if self.pending.contains_key(&packet.index) {
            return Err(SessionError::DuplicateIndex {
                index: packet.index,
            });
        }
        self.pending.insert(packet.index, packet);
        Ok(())
    }

    /// Apply every consecutively numbered packet, stopping at the first
    /// gap. Returns how many were applied.
    ///
    /// Any error here is fatal for the session: the local world no longer
    /// matches the host's and the only recovery is a state resync.
    pub fn run_pending(&mut self, world: &mut GameState) -> Result<usize, SessionError> {
        let mut applied = 0;
        while let Some(packet) = self.pending.remove(&self.next_index) {
            let index = packet.index;
            // The host already committed this; receivers force the apply
            // flag.
            let flags = packet.flags | CommandFlags::APPLY;
            let result =
                dispatch_blocks(world, packet.company, packet.id, &packet.blocks, flags)
                    .map_err(|source| SessionError::Malformed { index, source })?;
            if !result.succeeded() {
                warn!(index, command = ?packet.id, "replicated command refused");
                return Err(SessionError::CommandRefused { index });
            }
            let actual = state_digest(world);
            if actual != packet.state_digest {
                return Err(SessionError::Divergence {
                    index,
                    expected: packet.state_digest,
                    actual,
                });
            }
            self.next_index += 1;
            applied += 1;
        }
        Ok(applied)
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::TreePlacementArgs;
    use core_sim::scenario;
    use sim_schema::TilePos;

    const PLAYER: CompanyId = CompanyId(0);

    fn tree_at(x: u16, y: u16) -> GameCommandArg {
        GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(x, y),
            object: 0,
        })
    }

    fn sequenced(
        host: &mut SessionHost,
        world: &mut GameState,
        relay: &mut CommandRelay,
    ) -> Vec<CommandPacket> {
        relay
            .take_outgoing()
            .into_iter()
            .map(|request| {
                host.sequence(world, request)
                    .expect("well-formed request")
                    .expect("request accepted")
            })
            .collect()
    }

    #[test]
    fn packets_survive_the_wire() {
        let packet = CommandPacket {
            index: 3,
            tick: 960,
            company: PLAYER,
            id: CommandId::CreateTree,
            flags: CommandFlags::APPLY,
            blocks: tree_at(9, 9).encode(),
            state_digest: 0xDEAD_BEEF_0000_1111,
        };
        let decoded = CommandPacket::decode_frame(&packet.encode_frame()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let packet = CommandPacket {
            index: 0,
            tick: 0,
            company: PLAYER,
            id: CommandId::PauseGame,
            flags: CommandFlags::APPLY,
            blocks: vec![ParameterBlock::new()],
            state_digest: 1,
        };
        let mut bytes = packet.encode_frame();
        bytes.truncate(bytes.len() - 1);
        assert!(CommandPacket::decode_frame(&bytes).is_err());
    }

    #[test]
    fn issue_validates_without_committing() {
        let mut client = scenario::build(11, 64, 64);
        let mut relay = CommandRelay::new();
        let digest = state_digest(&client);

        let result = relay
            .issue(&mut client, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        assert!(result.outcome.is_ok());
        // The local world waits for the sequenced packet.
        assert_eq!(state_digest(&client), digest);
        assert_eq!(relay.take_outgoing().len(), 1);
    }

    #[test]
    fn out_of_order_packets_apply_in_index_order() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client = host_world.clone();
        let mut relay = CommandRelay::new();
        let mut host = SessionHost::new();

        for x in [8u16, 9, 10] {
            relay
                .issue(&mut client, PLAYER, &tree_at(x, 8), CommandFlags::APPLY)
                .unwrap();
        }
        let mut packets = sequenced(&mut host, &mut host_world, &mut relay);
        assert_eq!(packets.len(), 3);

        // Deliver in reverse.
        packets.reverse();
        let mut queue = ReceiveQueue::new();
        queue.insert(packets[0].clone()).unwrap();
        queue.insert(packets[1].clone()).unwrap();
        assert_eq!(queue.run_pending(&mut client).unwrap(), 0);
        queue.insert(packets[2].clone()).unwrap();
        assert_eq!(queue.run_pending(&mut client).unwrap(), 3);

        assert_eq!(state_digest(&host_world), state_digest(&client));
    }

    #[test]
    fn gap_stalls_until_the_missing_packet_arrives() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client = host_world.clone();
        let mut relay = CommandRelay::new();
        let mut host = SessionHost::new();

        relay
            .issue(&mut client, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        relay
            .issue(&mut client, PLAYER, &tree_at(9, 8), CommandFlags::APPLY)
            .unwrap();
        let packets = sequenced(&mut host, &mut host_world, &mut relay);

        let mut queue = ReceiveQueue::new();
        queue.insert(packets[1].clone()).unwrap();
        assert_eq!(queue.run_pending(&mut client).unwrap(), 0);
        assert_eq!(queue.buffered(), 1);

        queue.insert(packets[0].clone()).unwrap();
        assert_eq!(queue.run_pending(&mut client).unwrap(), 2);
        assert_eq!(state_digest(&host_world), state_digest(&client));
    }

    #[test]
    fn issuers_on_both_sides_share_one_sequence() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client_a = host_world.clone();
        let mut client_b = host_world.clone();
        let mut relay_a = CommandRelay::new();
        let mut relay_b = CommandRelay::new();
        let mut host = SessionHost::new();

        // Both participants issue before either has seen the other's
        // command; the host's counter keeps the indices distinct.
        relay_a
            .issue(&mut client_a, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        relay_b
            .issue(&mut client_b, PLAYER, &tree_at(9, 8), CommandFlags::APPLY)
            .unwrap();

        let mut packets = sequenced(&mut host, &mut host_world, &mut relay_a);
        packets.extend(sequenced(&mut host, &mut host_world, &mut relay_b));
        assert_eq!(packets[0].index, 0);
        assert_eq!(packets[1].index, 1);

        for client in [&mut client_a, &mut client_b] {
            let mut queue = ReceiveQueue::new();
            for packet in &packets {
                queue.insert(packet.clone()).unwrap();
            }
            assert_eq!(queue.run_pending(client).unwrap(), 2);
            assert_eq!(state_digest(client), state_digest(&host_world));
        }
    }

    #[test]
    fn host_drops_requests_that_lost_the_race() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client_a = host_world.clone();
        let mut client_b = host_world.clone();
        let mut relay_a = CommandRelay::new();
        let mut relay_b = CommandRelay::new();
        let mut host = SessionHost::new();

        // Both validate against their own unchanged worlds, so both pass.
        relay_a
            .issue(&mut client_a, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        relay_b
            .issue(&mut client_b, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();

        let first = host
            .sequence(&mut host_world, relay_a.take_outgoing().remove(0))
            .unwrap();
        assert!(first.is_some());
        let second = host
            .sequence(&mut host_world, relay_b.take_outgoing().remove(0))
            .unwrap();
        assert!(second.is_none());
        assert_eq!(host.sequenced(), 1);
    }

    #[test]
    fn ghosts_and_queries_never_leave_the_machine() {
        let mut client = scenario::build(11, 64, 64);
        let mut relay = CommandRelay::new();

        relay
            .issue(&mut client, PLAYER, &tree_at(8, 8), CommandFlags::empty())
            .unwrap();
        relay
            .issue(
                &mut client,
                PLAYER,
                &tree_at(9, 8),
                CommandFlags::APPLY | CommandFlags::GHOST,
            )
            .unwrap();
        assert!(relay.take_outgoing().is_empty());

        // A request that fails validation is not submitted either: the
        // ghost preview still blocks its own tile locally.
        let refused = relay
            .issue(&mut client, PLAYER, &tree_at(9, 8), CommandFlags::APPLY)
            .unwrap();
        assert!(refused.outcome.is_err());
        assert!(relay.take_outgoing().is_empty());
    }

    #[test]
    fn divergence_is_fatal() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client = host_world.clone();
        let mut relay = CommandRelay::new();
        let mut host = SessionHost::new();

        relay
            .issue(&mut client, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        let mut packets = sequenced(&mut host, &mut host_world, &mut relay);
        // A corrupted digest no longer matches what the client computes.
        packets[0].state_digest ^= 1;

        let mut queue = ReceiveQueue::new();
        queue.insert(packets[0].clone()).unwrap();
        assert!(matches!(
            queue.run_pending(&mut client),
            Err(SessionError::Divergence { index: 0, .. })
        ));
    }

    #[test]
    fn stale_and_duplicate_packets_are_rejected() {
        let mut host_world = scenario::build(11, 64, 64);
        let mut client = host_world.clone();
        let mut relay = CommandRelay::new();
        let mut host = SessionHost::new();

        relay
            .issue(&mut client, PLAYER, &tree_at(8, 8), CommandFlags::APPLY)
            .unwrap();
        let packets = sequenced(&mut host, &mut host_world, &mut relay);

        let mut queue = ReceiveQueue::new();
        queue.insert(packets[0].clone()).unwrap();
        assert!(matches!(
            queue.insert(packets[0].clone()),
            Err(SessionError::DuplicateIndex { index: 0 })
        ));
        queue.run_pending(&mut client).unwrap();
        assert!(matches!(
            queue.insert(packets[0].clone()),
            Err(SessionError::StaleIndex { index: 0 })
        ));
    }
}
