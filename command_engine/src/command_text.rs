//! Text form of game commands, used by the replay harness and test scripts.
//!
//! One command per line, whitespace separated. Rename verbs take the rest of
//! the line as the name so multi-word names need no quoting.

use thiserror::Error;

use sim_schema::{CompanyId, GameSpeed, IndustryId, Money, StationId, TilePos, TownId};

use crate::args::{
    ChangeCompanyNameArgs, ChangeLoanArgs, CheatArgs, CheatCommand, ClearLandArgs,
    HeadquarterPlacementArgs, HeadquarterRemovalArgs, IndustryPlacementArgs, IndustryRemovalArgs,
    LowerLandArgs, PauseGameArgs, RaiseLandArgs, RenameStationArgs, RenameTownArgs,
    SetGameSpeedArgs, TownPlacementArgs, TownRemovalArgs, TreePlacementArgs, TreeRemovalArgs,
    WallPlacementArgs, WallRemovalArgs,
};
use crate::GameCommandArg;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command verb '{0}'")]
    UnknownVerb(String),
    #[error("'{verb}' is missing its {what} argument")]
    MissingArgument { verb: &'static str, what: &'static str },
    #[error("'{value}' is not a valid {what}")]
    InvalidNumber { what: &'static str, value: String },
    #[error("unknown keyword '{value}' for {what}")]
    UnknownKeyword { what: &'static str, value: String },
}

/// Parse one command line into its typed argument.
pub fn parse_line(line: &str) -> Result<GameCommandArg, CommandParseError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(CommandParseError::Empty)?;

    match verb {
        "loan" => Ok(GameCommandArg::ChangeLoan(ChangeLoanArgs {
            new_loan: Money(number(&mut tokens, "loan", "amount")?),
        })),
        "pause" => Ok(GameCommandArg::PauseGame(PauseGameArgs)),
        "speed" => {
            let value = word(&mut tokens, "speed", "speed keyword")?;
            let speed = match value {
                "normal" => GameSpeed::Normal,
                "fast" => GameSpeed::FastForward,
                "extreme" => GameSpeed::ExtremeSpeed,
                other => {
                    return Err(CommandParseError::UnknownKeyword {
                        what: "game speed",
                        value: other.to_string(),
                    })
                }
            };
            Ok(GameCommandArg::SetGameSpeed(SetGameSpeedArgs { speed }))
        }
        "tree" => Ok(GameCommandArg::CreateTree(TreePlacementArgs {
            pos: pos(&mut tokens, "tree")?,
            object: number(&mut tokens, "tree", "tree kind")? as u8,
        })),
        "rmtree" => Ok(GameCommandArg::RemoveTree(TreeRemovalArgs {
            pos: pos(&mut tokens, "rmtree")?,
        })),
        "raise" => Ok(GameCommandArg::RaiseLand(RaiseLandArgs {
            pos: pos(&mut tokens, "raise")?,
        })),
        "lower" => Ok(GameCommandArg::LowerLand(LowerLandArgs {
            pos: pos(&mut tokens, "lower")?,
        })),
        "clear" => Ok(GameCommandArg::ClearLand(ClearLandArgs {
            pos: pos(&mut tokens, "clear")?,
        })),
        "wall" => Ok(GameCommandArg::CreateWall(WallPlacementArgs {
            pos: pos(&mut tokens, "wall")?,
            object: number(&mut tokens, "wall", "wall kind")? as u8,
            rotation: number(&mut tokens, "wall", "rotation")? as u8,
        })),
        "rmwall" => Ok(GameCommandArg::RemoveWall(WallRemovalArgs {
            pos: pos(&mut tokens, "rmwall")?,
        })),
        "industry" => Ok(GameCommandArg::CreateIndustry(IndustryPlacementArgs {
            pos: pos(&mut tokens, "industry")?,
            kind: number(&mut tokens, "industry", "industry kind")? as u8,
        })),
        "rmindustry" => Ok(GameCommandArg::RemoveIndustry(IndustryRemovalArgs {
            industry: IndustryId(number(&mut tokens, "rmindustry", "industry id")? as u16),
        })),
        "town" => Ok(GameCommandArg::CreateTown(TownPlacementArgs {
            pos: pos(&mut tokens, "town")?,
        })),
        "rmtown" => Ok(GameCommandArg::RemoveTown(TownRemovalArgs {
            town: TownId(number(&mut tokens, "rmtown", "town id")? as u16),
        })),
        "hq" => Ok(GameCommandArg::BuildCompanyHeadquarters(
            HeadquarterPlacementArgs {
                pos: pos(&mut tokens, "hq")?,
            },
        )),
        "rmhq" => Ok(GameCommandArg::RemoveCompanyHeadquarters(
            HeadquarterRemovalArgs,
        )),
        "name-town" => {
            let town = TownId(number(&mut tokens, "name-town", "town id")? as u16);
            let name = rest(tokens, "name-town")?;
            Ok(GameCommandArg::RenameTown(RenameTownArgs { town, name }))
        }
        "name-station" => {
            let station = StationId(number(&mut tokens, "name-station", "station id")? as u16);
            let name = rest(tokens, "name-station")?;
            Ok(GameCommandArg::RenameStation(RenameStationArgs {
                station,
                name,
            }))
        }
        "name-company" => {
            let company = CompanyId(number(&mut tokens, "name-company", "company id")? as u8);
            let name = rest(tokens, "name-company")?;
            Ok(GameCommandArg::ChangeCompanyName(ChangeCompanyNameArgs {
                company,
                name,
            }))
        }
        "cheat" => {
            let which = word(&mut tokens, "cheat", "cheat keyword")?;
            let command = match which {
                "cash" => CheatCommand::AddCash(Money(number(&mut tokens, "cheat", "amount")?)),
                "clearloan" => CheatCommand::ClearLoan,
                "company" => CheatCommand::SwitchCompany(CompanyId(
                    number(&mut tokens, "cheat", "company id")? as u8,
                )),
                other => {
                    return Err(CommandParseError::UnknownKeyword {
                        what: "cheat",
                        value: other.to_string(),
                    })
                }
            };
            Ok(GameCommandArg::Cheat(CheatArgs { command }))
        }
        other => Err(CommandParseError::UnknownVerb(other.to_string())),
    }
}

fn word<'line>(
    tokens: &mut impl Iterator<Item = &'line str>,
    verb: &'static str,
    what: &'static str,
) -> Result<&'line str, CommandParseError> {
    tokens
        .next()
        .ok_or(CommandParseError::MissingArgument { verb, what })
}

fn number<'line>(
    tokens: &mut impl Iterator<Item = &'line str>,
    verb: &'static str,
    what: &'static str,
) -> Result<i64, CommandParseError> {
    let token = word(tokens, verb, what)?;
    token.parse().map_err(|_| CommandParseError::InvalidNumber {
        what,
        value: token.to_string(),
    })
}

fn pos<'line>(
    tokens: &mut impl Iterator<Item = &'line str>,
    verb: &'static str,
) -> Result<TilePos, CommandParseError> {
    let x = number(tokens, verb, "x coordinate")? as u16;
    let y = number(tokens, verb, "y coordinate")? as u16;
    Ok(TilePos::new(x, y))
}

fn rest<'line>(
    tokens: impl Iterator<Item = &'line str>,
    verb: &'static str,
) -> Result<String, CommandParseError> {
    let name = tokens.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(CommandParseError::MissingArgument { verb, what: "name" });
    }
    Ok(name)
}
