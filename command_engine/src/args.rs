//! Typed command arguments and their parameter-block codec.
//!
//! Every command identifier has exactly one argument shape. The word layout
//! of each shape inside the [`ParameterBlock`] is fixed and documented on
//! the struct, so the same bytes decode identically on every participant.
//! Rename commands are the historical exception: their string travels as
//! three 12-byte fragments, one block each, re-assembled here before any
//! handler sees the value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sim_schema::{CompanyId, GameSpeed, IndustryId, Money, StationId, TilePos, TownId};

use crate::block::ParameterBlock;
use crate::command_id::CommandId;

/// Maximum encoded length of an entity name, bounded by the three-fragment
/// wire format.
pub const MAX_NAME_BYTES: usize = 36;

/// Bytes carried per name fragment (words 2..5 of the block).
pub const FRAGMENT_BYTES: usize = 12;

/// Number of fragments a full name spans.
pub const NAME_FRAGMENTS: usize = 3;

/// Errors raised while decoding a parameter block sequence.
///
/// These are hard errors: a frame that fails here is rejected before any
/// handler logic runs and never turns into a domain failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgDecodeError {
    #[error("unknown command identifier {value}")]
    UnknownCommand { value: u32 },
    #[error("command {command:?} expects {expected} parameter block(s), got {actual}")]
    WrongBlockCount {
        command: CommandId,
        expected: usize,
        actual: usize,
    },
    #[error("invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: u32 },
    #[error("name fragment index {index} out of range")]
    FragmentIndex { index: u32 },
    #[error("name fragments disagree on the target entity")]
    FragmentEntityMismatch,
    #[error("missing name fragment {index}")]
    MissingFragment { index: u32 },
    #[error("name bytes are not valid UTF-8")]
    InvalidNameBytes,
}

/// Layout: w0 = new loan (signed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLoanArgs {
    pub new_loan: Money,
}

/// Layout: three fragment blocks, w0 = station id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameStationArgs {
    pub station: StationId,
    pub name: String,
}

/// Layout: empty block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseGameArgs;

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRemovalArgs {
    pub pos: TilePos,
}

/// Layout: w0 = x, w1 = y, w2 = tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePlacementArgs {
    pub pos: TilePos,
    pub object: u8,
}

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseLandArgs {
    pub pos: TilePos,
}

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerLandArgs {
    pub pos: TilePos,
}

/// Layout: three fragment blocks, w0 = company id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCompanyNameArgs {
    pub company: CompanyId,
    pub name: String,
}

/// Layout: w0 = x, w1 = y, w2 = wall object, w3 = rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallPlacementArgs {
    pub pos: TilePos,
    pub object: u8,
    pub rotation: u8,
}

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRemovalArgs {
    pub pos: TilePos,
}

/// Layout: three fragment blocks, w0 = town id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTownArgs {
    pub town: TownId,
    pub name: String,
}

/// Layout: w0 = x, w1 = y, w2 = industry object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryPlacementArgs {
    pub pos: TilePos,
    pub kind: u8,
}

/// Layout: w0 = industry id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryRemovalArgs {
    pub industry: IndustryId,
}

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownPlacementArgs {
    pub pos: TilePos,
}

/// Layout: w0 = town id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownRemovalArgs {
    pub town: TownId,
}

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadquarterPlacementArgs {
    pub pos: TilePos,
}

/// Layout: empty block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadquarterRemovalArgs;

/// Layout: w0 = x, w1 = y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearLandArgs {
    pub pos: TilePos,
}

/// Sub-operations of the cheat command.
/// Layout: w0 = selector, w1/w2 = parameters (signed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheatCommand {
    AddCash(Money),
    ClearLoan,
    SwitchCompany(CompanyId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatArgs {
    pub command: CheatCommand,
}

/// Layout: w0 = speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGameSpeedArgs {
    pub speed: GameSpeed,
}

/// One typed argument value per command identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCommandArg {
    ChangeLoan(ChangeLoanArgs),
    RenameStation(RenameStationArgs),
    PauseGame(PauseGameArgs),
    RemoveTree(TreeRemovalArgs),
    CreateTree(TreePlacementArgs),
    RaiseLand(RaiseLandArgs),
    LowerLand(LowerLandArgs),
    ChangeCompanyName(ChangeCompanyNameArgs),
    CreateWall(WallPlacementArgs),
    RemoveWall(WallRemovalArgs),
    RenameTown(RenameTownArgs),
    CreateIndustry(IndustryPlacementArgs),
    RemoveIndustry(IndustryRemovalArgs),
    CreateTown(TownPlacementArgs),
    RemoveTown(TownRemovalArgs),
    BuildCompanyHeadquarters(HeadquarterPlacementArgs),
    RemoveCompanyHeadquarters(HeadquarterRemovalArgs),
    ClearLand(ClearLandArgs),
    Cheat(CheatArgs),
    SetGameSpeed(SetGameSpeedArgs),
}

impl GameCommandArg {
    pub fn id(&self) -> CommandId {
        match self {
            GameCommandArg::ChangeLoan(_) => CommandId::ChangeLoan,
            GameCommandArg::RenameStation(_) => CommandId::RenameStation,
            GameCommandArg::PauseGame(_) => CommandId::PauseGame,
            GameCommandArg::RemoveTree(_) => CommandId::RemoveTree,
            GameCommandArg::CreateTree(_) => CommandId::CreateTree,
            GameCommandArg::RaiseLand(_) => CommandId::RaiseLand,
            GameCommandArg::LowerLand(_) => CommandId::LowerLand,
            GameCommandArg::ChangeCompanyName(_) => CommandId::ChangeCompanyName,
            GameCommandArg::CreateWall(_) => CommandId::CreateWall,
            GameCommandArg::RemoveWall(_) => CommandId::RemoveWall,
            GameCommandArg::RenameTown(_) => CommandId::RenameTown,
            GameCommandArg::CreateIndustry(_) => CommandId::CreateIndustry,
            GameCommandArg::RemoveIndustry(_) => CommandId::RemoveIndustry,
            GameCommandArg::CreateTown(_) => CommandId::CreateTown,
            GameCommandArg::RemoveTown(_) => CommandId::RemoveTown,
            GameCommandArg::BuildCompanyHeadquarters(_) => CommandId::BuildCompanyHeadquarters,
            GameCommandArg::RemoveCompanyHeadquarters(_) => CommandId::RemoveCompanyHeadquarters,
            GameCommandArg::ClearLand(_) => CommandId::ClearLand,
            GameCommandArg::Cheat(_) => CommandId::Cheat,
            GameCommandArg::SetGameSpeed(_) => CommandId::SetGameSpeed,
        }
    }

    /// Encode into the wire block sequence: one block for fixed-shape
    /// commands, three fragment blocks for renames.
    pub fn encode(&self) -> Vec<ParameterBlock> {
        match self {
            GameCommandArg::ChangeLoan(args) => {
                let mut block = ParameterBlock::new();
                block.set_word(0, money_word(args.new_loan));
                vec![block]
            }
            GameCommandArg::RenameStation(args) => {
                encode_name_blocks(args.station.0 as u32, &args.name)
            }
            GameCommandArg::PauseGame(_) => vec![ParameterBlock::new()],
            GameCommandArg::RemoveTree(args) => vec![pos_block(args.pos)],
            GameCommandArg::CreateTree(args) => {
                let mut block = pos_block(args.pos);
                block.set_word(2, args.object as u32);
                vec![block]
            }
            GameCommandArg::RaiseLand(args) => vec![pos_block(args.pos)],
            GameCommandArg::LowerLand(args) => vec![pos_block(args.pos)],
            GameCommandArg::ChangeCompanyName(args) => {
                encode_name_blocks(args.company.0 as u32, &args.name)
            }
            GameCommandArg::CreateWall(args) => {
                let mut block = pos_block(args.pos);
                block
                    .set_word(2, args.object as u32)
                    .set_word(3, args.rotation as u32);
                vec![block]
            }
            GameCommandArg::RemoveWall(args) => vec![pos_block(args.pos)],
            GameCommandArg::RenameTown(args) => encode_name_blocks(args.town.0 as u32, &args.name),
            GameCommandArg::CreateIndustry(args) => {
                let mut block = pos_block(args.pos);
                block.set_word(2, args.kind as u32);
                vec![block]
            }
            GameCommandArg::RemoveIndustry(args) => {
                let mut block = ParameterBlock::new();
                block.set_word(0, args.industry.0 as u32);
                vec![block]
            }
            GameCommandArg::CreateTown(args) => vec![pos_block(args.pos)],
            GameCommandArg::RemoveTown(args) => {
                let mut block = ParameterBlock::new();
                block.set_word(0, args.town.0 as u32);
                vec![block]
            }
            GameCommandArg::BuildCompanyHeadquarters(args) => vec![pos_block(args.pos)],
            GameCommandArg::RemoveCompanyHeadquarters(_) => vec![ParameterBlock::new()],
            GameCommandArg::ClearLand(args) => vec![pos_block(args.pos)],
            GameCommandArg::Cheat(args) => {
                let mut block = ParameterBlock::new();
                match &args.command {
                    CheatCommand::AddCash(amount) => {
                        block.set_word(0, 0).set_word(1, money_word(*amount));
                    }
                    CheatCommand::ClearLoan => {
                        block.set_word(0, 1);
                    }
                    CheatCommand::SwitchCompany(company) => {
                        block.set_word(0, 2).set_word(1, company.0 as u32);
                    }
                }
                vec![block]
            }
            GameCommandArg::SetGameSpeed(args) => {
                let mut block = ParameterBlock::new();
                block.set_word(0, args.speed as u32);
                vec![block]
            }
        }
    }

    /// Decode a complete block sequence for `id`.
    pub fn decode(id: CommandId, blocks: &[ParameterBlock]) -> Result<Self, ArgDecodeError> {
        if id.carries_name() {
            return decode_name_command(id, blocks);
        }
        let block = expect_single(id, blocks)?;
        let arg = match id {
            CommandId::ChangeLoan => GameCommandArg::ChangeLoan(ChangeLoanArgs {
                new_loan: Money(block.signed_word(0) as i64),
            }),
            CommandId::PauseGame => GameCommandArg::PauseGame(PauseGameArgs),
            CommandId::RemoveTree => GameCommandArg::RemoveTree(TreeRemovalArgs {
                pos: block_pos(block)?,
            }),
            CommandId::CreateTree => GameCommandArg::CreateTree(TreePlacementArgs {
                pos: block_pos(block)?,
                object: narrow_u8(block.word(2), "tree object")?,
            }),
            CommandId::RaiseLand => GameCommandArg::RaiseLand(RaiseLandArgs {
                pos: block_pos(block)?,
            }),
            CommandId::LowerLand => GameCommandArg::LowerLand(LowerLandArgs {
                pos: block_pos(block)?,
            }),
            CommandId::CreateWall => GameCommandArg::CreateWall(WallPlacementArgs {
                pos: block_pos(block)?,
                object: narrow_u8(block.word(2), "wall object")?,
                rotation: narrow_u8(block.word(3), "wall rotation")?,
            }),
            CommandId::RemoveWall => GameCommandArg::RemoveWall(WallRemovalArgs {
                pos: block_pos(block)?,
            }),
            CommandId::CreateIndustry => GameCommandArg::CreateIndustry(IndustryPlacementArgs {
                pos: block_pos(block)?,
                kind: narrow_u8(block.word(2), "industry object")?,
            }),
            CommandId::RemoveIndustry => GameCommandArg::RemoveIndustry(IndustryRemovalArgs {
                industry: IndustryId(narrow_u16(block.word(0), "industry id")?),
            }),
            CommandId::CreateTown => GameCommandArg::CreateTown(TownPlacementArgs {
                pos: block_pos(block)?,
            }),
            CommandId::RemoveTown => GameCommandArg::RemoveTown(TownRemovalArgs {
                town: TownId(narrow_u16(block.word(0), "town id")?),
            }),
            CommandId::BuildCompanyHeadquarters => {
                GameCommandArg::BuildCompanyHeadquarters(HeadquarterPlacementArgs {
                    pos: block_pos(block)?,
                })
            }
            CommandId::RemoveCompanyHeadquarters => {
                GameCommandArg::RemoveCompanyHeadquarters(HeadquarterRemovalArgs)
            }
            CommandId::ClearLand => GameCommandArg::ClearLand(ClearLandArgs {
                pos: block_pos(block)?,
            }),
            CommandId::Cheat => {
                let command = match block.word(0) {
                    0 => CheatCommand::AddCash(Money(block.signed_word(1) as i64)),
                    1 => CheatCommand::ClearLoan,
                    2 => CheatCommand::SwitchCompany(CompanyId(narrow_u8(
                        block.word(1),
                        "company id",
                    )?)),
                    value => {
                        return Err(ArgDecodeError::InvalidValue {
                            field: "cheat selector",
                            value,
                        })
                    }
                };
                GameCommandArg::Cheat(CheatArgs { command })
            }
            CommandId::SetGameSpeed => {
                let raw = block.word(0);
                let speed = u8::try_from(raw)
                    .ok()
                    .and_then(GameSpeed::from_index)
                    .ok_or(ArgDecodeError::InvalidValue {
                        field: "game speed",
                        value: raw,
                    })?;
                GameCommandArg::SetGameSpeed(SetGameSpeedArgs { speed })
            }
            CommandId::RenameStation | CommandId::ChangeCompanyName | CommandId::RenameTown => {
                unreachable!("name commands decode through the fragment path")
            }
        };
        Ok(arg)
    }
}

/// Currency on the wire is a signed 32-bit word; amounts outside that
/// range clamp to the nearest representable value.
fn money_word(amount: Money) -> u32 {
    amount.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32 as u32
}

fn pos_block(pos: TilePos) -> ParameterBlock {
    let mut block = ParameterBlock::new();
    block.set_word(0, pos.x as u32).set_word(1, pos.y as u32);
    block
}

fn block_pos(block: &ParameterBlock) -> Result<TilePos, ArgDecodeError> {
    Ok(TilePos {
        x: narrow_u16(block.word(0), "tile x")?,
        y: narrow_u16(block.word(1), "tile y")?,
    })
}

fn narrow_u16(value: u32, field: &'static str) -> Result<u16, ArgDecodeError> {
    u16::try_from(value).map_err(|_| ArgDecodeError::InvalidValue { field, value })
}

fn narrow_u8(value: u32, field: &'static str) -> Result<u8, ArgDecodeError> {
    u8::try_from(value).map_err(|_| ArgDecodeError::InvalidValue { field, value })
}

fn expect_single(
    id: CommandId,
    blocks: &[ParameterBlock],
) -> Result<&ParameterBlock, ArgDecodeError> {
    match blocks {
        [block] => Ok(block),
        _ => Err(ArgDecodeError::WrongBlockCount {
            command: id,
            expected: 1,
            actual: blocks.len(),
        }),
    }
}

/// Split a name into its three wire fragments. Names longer than
/// [`MAX_NAME_BYTES`] are truncated at a character boundary.
pub fn encode_name_blocks(entity: u32, name: &str) -> Vec<ParameterBlock> {
    let mut bytes = [0u8; MAX_NAME_BYTES];
    let take = truncated_len(name, MAX_NAME_BYTES);
    bytes[..take].copy_from_slice(&name.as_bytes()[..take]);

    (0..NAME_FRAGMENTS)
        .map(|fragment| {
            let mut block = ParameterBlock::new();
            block.set_word(0, entity).set_word(1, fragment as u32);
            for word in 0..FRAGMENT_BYTES / 4 {
                let offset = fragment * FRAGMENT_BYTES + word * 4;
                let value = u32::from_le_bytes([
                    bytes[offset],
                    bytes[offset + 1],
                    bytes[offset + 2],
                    bytes[offset + 3],
                ]);
                block.set_word(2 + word, value);
            }
            block
        })
        .collect()
}

fn truncated_len(name: &str, max: usize) -> usize {
    if name.len() <= max {
        return name.len();
    }
    let mut len = max;
    while len > 0 && !name.is_char_boundary(len) {
        len -= 1;
    }
    len
}

/// Extract (entity, fragment index, bytes) from one fragment block.
pub fn decode_fragment(
    block: &ParameterBlock,
) -> Result<(u32, u32, [u8; FRAGMENT_BYTES]), ArgDecodeError> {
    let entity = block.word(0);
    let index = block.word(1);
    if index as usize >= NAME_FRAGMENTS {
        return Err(ArgDecodeError::FragmentIndex { index });
    }
    let mut bytes = [0u8; FRAGMENT_BYTES];
    for word in 0..FRAGMENT_BYTES / 4 {
        bytes[word * 4..word * 4 + 4].copy_from_slice(&block.word(2 + word).to_le_bytes());
    }
    Ok((entity, index, bytes))
}

/// Build the typed name-command argument once all fragments are available.
pub fn name_command_arg(
    id: CommandId,
    entity: u32,
    name: String,
) -> Result<GameCommandArg, ArgDecodeError> {
    match id {
        CommandId::RenameStation => Ok(GameCommandArg::RenameStation(RenameStationArgs {
            station: StationId(narrow_u16(entity, "station id")?),
            name,
        })),
        CommandId::ChangeCompanyName => Ok(GameCommandArg::ChangeCompanyName(
            ChangeCompanyNameArgs {
                company: CompanyId(narrow_u8(entity, "company id")?),
                name,
            },
        )),
        CommandId::RenameTown => Ok(GameCommandArg::RenameTown(RenameTownArgs {
            town: TownId(narrow_u16(entity, "town id")?),
            name,
        })),
        _ => unreachable!("{id:?} does not carry a name"),
    }
}

/// Assemble fragment byte runs into the final string, trimming the zero
/// padding.
pub fn assemble_name(parts: &[[u8; FRAGMENT_BYTES]; NAME_FRAGMENTS]) -> Result<String, ArgDecodeError> {
    let mut bytes = Vec::with_capacity(MAX_NAME_BYTES);
    for part in parts {
        bytes.extend_from_slice(part);
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|_| ArgDecodeError::InvalidNameBytes)
}

fn decode_name_command(
    id: CommandId,
    blocks: &[ParameterBlock],
) -> Result<GameCommandArg, ArgDecodeError> {
    if blocks.len() != NAME_FRAGMENTS {
        return Err(ArgDecodeError::WrongBlockCount {
            command: id,
            expected: NAME_FRAGMENTS,
            actual: blocks.len(),
        });
    }
    let mut entity = None;
    let mut parts = [[0u8; FRAGMENT_BYTES]; NAME_FRAGMENTS];
    let mut seen = [false; NAME_FRAGMENTS];
    for block in blocks {
        let (block_entity, index, bytes) = decode_fragment(block)?;
        match entity {
            None => entity = Some(block_entity),
            Some(existing) if existing != block_entity => {
                return Err(ArgDecodeError::FragmentEntityMismatch)
            }
            Some(_) => {}
        }
        parts[index as usize] = bytes;
        seen[index as usize] = true;
    }
    if let Some(index) = seen.iter().position(|present| !present) {
        return Err(ArgDecodeError::MissingFragment {
            index: index as u32,
        });
    }
    let name = assemble_name(&parts)?;
    name_command_arg(id, entity.unwrap_or_default(), name)
}
