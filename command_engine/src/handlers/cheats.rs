//! Sandbox cheats. Replicated like any other command so every participant
//! applies the same adjustment.

use core_sim::GameState;
use sim_schema::{string_ids, Money};

use crate::args::{CheatArgs, CheatCommand};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

pub fn cheat(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &CheatArgs,
) -> Outcome {
    match &args.command {
        CheatCommand::AddCash(amount) => {
            let company_id = ctx.company();
            if world.company(company_id).is_none() {
                return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
            }
            if flags.is_apply() {
                if let Some(company) = world.company_mut(company_id) {
                    company.cash += *amount;
                }
            }
        }
        CheatCommand::ClearLoan => {
            let company_id = ctx.company();
            if world.company(company_id).is_none() {
                return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
            }
            if flags.is_apply() {
                if let Some(company) = world.company_mut(company_id) {
                    company.current_loan = Money::ZERO;
                }
            }
        }
        CheatCommand::SwitchCompany(target) => {
            if world.company(*target).is_none() {
                return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
            }
            if flags.is_apply() {
                world.controlling_company = *target;
            }
        }
    }
    Ok(Money::ZERO)
}
