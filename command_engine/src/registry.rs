//! The command table and the two-pass dispatcher.
//!
//! Dispatch runs every command twice: a validation pass with the apply flag
//! cleared, then, for apply requests that validated, the mutation pass. The
//! charged amount is the smaller of the two reported costs, and payment is
//! posted exactly once, after the mutation pass.

use std::cmp;

use thiserror::Error;
use tracing::{debug, trace};

use core_sim::{FundingError, GameState};
use sim_schema::{string_ids, CompanyId, Money};

use crate::args::{ArgDecodeError, GameCommandArg};
use crate::block::ParameterBlock;
use crate::command_id::CommandId;
use crate::context::{ContextSnapshot, ExecutionContext};
use crate::flags::CommandFlags;
use crate::handlers;
use crate::outcome::Outcome;

/// How a command interacts with the pause gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseGate {
    /// Runs while the game is paused. Session-level commands must, or the
    /// pause could never be lifted.
    Exempt,
    /// Blocked while paused; if the scenario allows it, the command lifts
    /// the pause instead and proceeds.
    Unpauses,
}

/// Static per-command metadata.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub id: CommandId,
    pub pause: PauseGate,
    /// Flags a caller may legally pass for this command.
    pub allowed: CommandFlags,
}

const UI: CommandFlags = CommandFlags::APPLY.union(CommandFlags::NO_ERROR_WINDOW);
const TERRAFORM: CommandFlags = UI
    .union(CommandFlags::AI_ALLOCATED)
    .union(CommandFlags::NO_PAYMENT);
const BUILD: CommandFlags = TERRAFORM.union(CommandFlags::GHOST);

pub const COMMAND_TABLE: &[CommandInfo] = &[
    CommandInfo {
        id: CommandId::ChangeLoan,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::RenameStation,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::PauseGame,
        pause: PauseGate::Exempt,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::RemoveTree,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::CreateTree,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::RaiseLand,
        pause: PauseGate::Unpauses,
        allowed: TERRAFORM,
    },
    CommandInfo {
        id: CommandId::LowerLand,
        pause: PauseGate::Unpauses,
        allowed: TERRAFORM,
    },
    CommandInfo {
        id: CommandId::ChangeCompanyName,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::CreateWall,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::RemoveWall,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::RenameTown,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::CreateIndustry,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::RemoveIndustry,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::CreateTown,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::RemoveTown,
        pause: PauseGate::Unpauses,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::BuildCompanyHeadquarters,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::RemoveCompanyHeadquarters,
        pause: PauseGate::Unpauses,
        allowed: BUILD,
    },
    CommandInfo {
        id: CommandId::ClearLand,
        pause: PauseGate::Unpauses,
        allowed: TERRAFORM,
    },
    CommandInfo {
        id: CommandId::Cheat,
        pause: PauseGate::Exempt,
        allowed: UI,
    },
    CommandInfo {
        id: CommandId::SetGameSpeed,
        pause: PauseGate::Exempt,
        allowed: UI,
    },
];

/// Look up the static metadata for a command. Every identifier is present;
/// a missing entry is a programming error.
pub fn command_info(id: CommandId) -> &'static CommandInfo {
    COMMAND_TABLE
        .iter()
        .find(|info| info.id == id)
        .expect("every command identifier is registered")
}

/// Dispatch rejected before any handler ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Decode(#[from] ArgDecodeError),
    #[error("flags {flags:?} are not permitted for {command:?}")]
    IllegalFlags {
        command: CommandId,
        flags: CommandFlags,
    },
}

/// What a dispatch produced: the outcome plus the context side channel.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub outcome: Outcome,
    pub context: ContextSnapshot,
}

impl DispatchResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Decode a block sequence and dispatch it.
pub fn dispatch_blocks(
    world: &mut GameState,
    company: CompanyId,
    id: CommandId,
    blocks: &[ParameterBlock],
    flags: CommandFlags,
) -> Result<DispatchResult, DispatchError> {
    let arg = GameCommandArg::decode(id, blocks)?;
    dispatch(world, company, &arg, flags)
}

/// Run one command through the full protocol.
///
/// `Err` means the request itself was malformed and nothing ran. `Ok` with
/// a failed outcome means the command ran and was refused; the context
/// snapshot carries the error record.
pub fn dispatch(
    world: &mut GameState,
    company: CompanyId,
    arg: &GameCommandArg,
    flags: CommandFlags,
) -> Result<DispatchResult, DispatchError> {
    let id = arg.id();
    let info = command_info(id);
    if !info.allowed.contains(flags) {
        return Err(DispatchError::IllegalFlags { command: id, flags });
    }

    let mut ctx = ExecutionContext::new(company);

    // Pause gate, checked in both modes so a query predicts the commit.
    // Machine-issued commands pass through; a blocked player command is
    // refused, or under the scenario override proceeds, lifting the pause
    // only on commit.
    if world.paused
        && info.pause == PauseGate::Unpauses
        && !flags.intersects(CommandFlags::GHOST | CommandFlags::AI_ALLOCATED)
    {
        if !world.pause_override {
            let failed = ctx.failure(string_ids::GAME_IS_PAUSED);
            return Ok(DispatchResult {
                outcome: Err(failed),
                context: ctx.snapshot(),
            });
        }
        if flags.is_apply() {
            world.paused = false;
            debug!(command = ?id, "command lifted the pause");
        }
    }

    // Validation pass, always with the apply flag cleared.
    let query_flags = flags - CommandFlags::APPLY;
    let query_cost = match run_handler(world, &mut ctx, query_flags, arg) {
        Ok(cost) => cost,
        Err(failed) => {
            trace!(command = ?id, error = ctx.snapshot().error_text.0, "command refused");
            return Ok(DispatchResult {
                outcome: Err(failed),
                context: ctx.snapshot(),
            });
        }
    };

    if !flags.is_apply() {
        // Pure query: additionally report affordability, without touching
        // any loan.
        if !flags.suppresses_payment() && query_cost > Money::ZERO {
            if let Err(error) = world.can_fund(company, query_cost) {
                let failed = ctx.failure(funding_text(error));
                return Ok(DispatchResult {
                    outcome: Err(failed),
                    context: ctx.snapshot(),
                });
            }
        }
        return Ok(DispatchResult {
            outcome: Ok(query_cost),
            context: ctx.snapshot(),
        });
    }

    // Funding check between the passes; AI companies may extend their loan
    // here. Ghost and no-payment dispatches never touch finances.
    if !flags.suppresses_payment() && query_cost > Money::ZERO {
        if let Err(error) = world.ensure_funding(company, query_cost) {
            let failed = ctx.failure(funding_text(error));
            return Ok(DispatchResult {
                outcome: Err(failed),
                context: ctx.snapshot(),
            });
        }
    }

    let apply_cost = match run_handler(world, &mut ctx, flags, arg) {
        Ok(cost) => cost,
        Err(failed) => {
            return Ok(DispatchResult {
                outcome: Err(failed),
                context: ctx.snapshot(),
            })
        }
    };

    let cost = cmp::min(query_cost, apply_cost);
    if !flags.suppresses_payment() && cost != Money::ZERO {
        world.apply_payment(company, cost, ctx.expenditure());
    }
    debug!(command = ?id, %cost, "command applied");
    Ok(DispatchResult {
        outcome: Ok(cost),
        context: ctx.snapshot(),
    })
}

fn funding_text(error: FundingError) -> sim_schema::StringId {
    match error {
        FundingError::Bankrupt => string_ids::COMPANY_IS_BANKRUPT,
        FundingError::NotEnoughCash(_) => string_ids::NOT_ENOUGH_CASH,
    }
}

fn run_handler(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    arg: &GameCommandArg,
) -> Outcome {
    match arg {
        GameCommandArg::ChangeLoan(args) => handlers::company::change_loan(world, ctx, flags, args),
        GameCommandArg::RenameStation(args) => {
            handlers::station::rename_station(world, ctx, flags, args)
        }
        GameCommandArg::PauseGame(args) => handlers::general::pause_game(world, ctx, flags, args),
        GameCommandArg::RemoveTree(args) => handlers::scenery::remove_tree(world, ctx, flags, args),
        GameCommandArg::CreateTree(args) => handlers::scenery::create_tree(world, ctx, flags, args),
        GameCommandArg::RaiseLand(args) => handlers::terraform::raise_land(world, ctx, flags, args),
        GameCommandArg::LowerLand(args) => handlers::terraform::lower_land(world, ctx, flags, args),
        GameCommandArg::ChangeCompanyName(args) => {
            handlers::company::change_company_name(world, ctx, flags, args)
        }
        GameCommandArg::CreateWall(args) => handlers::scenery::create_wall(world, ctx, flags, args),
        GameCommandArg::RemoveWall(args) => handlers::scenery::remove_wall(world, ctx, flags, args),
        GameCommandArg::RenameTown(args) => handlers::town::rename_town(world, ctx, flags, args),
        GameCommandArg::CreateIndustry(args) => {
            handlers::industry::create_industry(world, ctx, flags, args)
        }
        GameCommandArg::RemoveIndustry(args) => {
            handlers::industry::remove_industry(world, ctx, flags, args)
        }
        GameCommandArg::CreateTown(args) => handlers::town::create_town(world, ctx, flags, args),
        GameCommandArg::RemoveTown(args) => handlers::town::remove_town(world, ctx, flags, args),
        GameCommandArg::BuildCompanyHeadquarters(args) => {
            handlers::company::build_headquarters(world, ctx, flags, args)
        }
        GameCommandArg::RemoveCompanyHeadquarters(args) => {
            handlers::company::remove_headquarters(world, ctx, flags, args)
        }
        GameCommandArg::ClearLand(args) => handlers::terraform::clear_land(world, ctx, flags, args),
        GameCommandArg::Cheat(args) => handlers::cheats::cheat(world, ctx, flags, args),
        GameCommandArg::SetGameSpeed(args) => {
            handlers::general::set_game_speed(world, ctx, flags, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{
        ChangeLoanArgs, PauseGameArgs, TreePlacementArgs, TreeRemovalArgs,
    };
    use core_sim::scenario;
    use sim_schema::TilePos;

    fn world() -> GameState {
        scenario::build(7, 64, 64)
    }

    const PLAYER: CompanyId = CompanyId(0);

    #[test]
    fn every_command_has_table_metadata() {
        for id in CommandId::ALL {
            let info = command_info(*id);
            assert_eq!(info.id, *id);
            assert!(info.allowed.contains(CommandFlags::APPLY));
        }
    }

    #[test]
    fn illegal_flags_are_rejected_before_execution() {
        let mut state = world();
        let digest = core_sim::state_digest(&state);
        let arg = GameCommandArg::PauseGame(PauseGameArgs);
        let result = dispatch(
            &mut state,
            PLAYER,
            &arg,
            CommandFlags::APPLY | CommandFlags::GHOST,
        );
        assert!(matches!(result, Err(DispatchError::IllegalFlags { .. })));
        assert_eq!(core_sim::state_digest(&state), digest);
    }

    #[test]
    fn query_reports_cost_without_mutating() {
        let mut state = world();
        let digest = core_sim::state_digest(&state);
        let arg = GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(10, 10),
            object: 0,
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::empty()).unwrap();
        assert_eq!(result.outcome, Ok(Money(40)));
        assert_eq!(core_sim::state_digest(&state), digest);
    }

    #[test]
    fn apply_after_clean_query_posts_payment_once() {
        let mut state = world();
        let cash_before = state.company(PLAYER).unwrap().cash;
        let arg = GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(10, 10),
            object: 0,
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert_eq!(result.outcome, Ok(Money(40)));
        let company = state.company(PLAYER).unwrap();
        assert_eq!(company.cash, cash_before - Money(40));
        assert!(state
            .map
            .tile(TilePos::new(10, 10))
            .unwrap()
            .live_tree()
            .is_some());
    }

    #[test]
    fn failed_apply_leaves_state_untouched() {
        let mut state = world();
        let digest = core_sim::state_digest(&state);
        let arg = GameCommandArg::RemoveTree(TreeRemovalArgs {
            pos: TilePos::new(10, 10),
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(result.outcome.is_err());
        assert_eq!(
            result.context.error_text,
            string_ids::NOTHING_TO_REMOVE_HERE
        );
        assert_eq!(core_sim::state_digest(&state), digest);
    }

    #[test]
    fn ghost_apply_never_touches_finances() {
        let mut state = world();
        let cash_before = state.company(PLAYER).unwrap().cash;
        let arg = GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(12, 12),
            object: 1,
        });
        let result = dispatch(
            &mut state,
            PLAYER,
            &arg,
            CommandFlags::APPLY | CommandFlags::GHOST,
        )
        .unwrap();
        // Cost is still reported so the interface can show a price tag.
        assert_eq!(result.outcome, Ok(Money(64)));
        assert_eq!(state.company(PLAYER).unwrap().cash, cash_before);
        let tile = state.map.tile(TilePos::new(12, 12)).unwrap();
        assert!(tile.live_tree().is_none());
        assert!(!tile.is_clear());
    }

    #[test]
    fn pure_query_reports_unaffordable_commands() {
        let mut state = world();
        state.company_mut(PLAYER).unwrap().cash = Money(10);
        let arg = GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(10, 10),
            object: 0,
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::empty()).unwrap();
        assert!(result.outcome.is_err());
        assert_eq!(result.context.error_text, string_ids::NOT_ENOUGH_CASH);
    }

    #[test]
    fn loan_changes_move_cash_at_no_cost() {
        let mut state = world();
        let company = state.company(PLAYER).unwrap();
        let cash_before = company.cash;
        let loan_before = company.current_loan;

        let arg = GameCommandArg::ChangeLoan(ChangeLoanArgs {
            new_loan: loan_before + Money(3_000),
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert_eq!(result.outcome, Ok(Money::ZERO));
        let company = state.company(PLAYER).unwrap();
        assert_eq!(company.cash, cash_before + Money(3_000));
        assert_eq!(company.current_loan, loan_before + Money(3_000));
    }

    #[test]
    fn loan_above_ceiling_is_refused() {
        let mut state = world();
        let ceiling = state.economy.max_loan();
        let arg = GameCommandArg::ChangeLoan(ChangeLoanArgs {
            new_loan: ceiling + Money(100),
        });
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(result.outcome.is_err());
        assert_eq!(result.context.error_text, string_ids::BANK_REFUSES_TO_LEND);
        assert_eq!(
            result.context.error_title,
            string_ids::ERROR_CANT_CHANGE_LOAN
        );
    }

    #[test]
    fn paused_world_refuses_construction_without_override() {
        let mut state = world();
        state.paused = true;
        state.pause_override = false;
        let arg = GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(10, 10),
            object: 0,
        });
        // The gate is part of validation: the query is refused the same
        // way the commit would be.
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::empty()).unwrap();
        assert!(result.outcome.is_err());
        assert_eq!(result.context.error_text, string_ids::GAME_IS_PAUSED);
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(result.outcome.is_err());
        assert_eq!(result.context.error_text, string_ids::GAME_IS_PAUSED);
        assert!(state.paused);

        // With the override, query and commit both proceed; only the
        // commit lifts the pause.
        state.pause_override = true;
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::empty()).unwrap();
        assert!(result.outcome.is_ok());
        assert!(state.paused);
        let result = dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(result.outcome.is_ok());
        assert!(!state.paused);
    }

    #[test]
    fn pause_toggles_while_paused() {
        let mut state = world();
        let arg = GameCommandArg::PauseGame(PauseGameArgs);
        dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(state.paused);
        dispatch(&mut state, PLAYER, &arg, CommandFlags::APPLY).unwrap();
        assert!(!state.paused);
    }
}
