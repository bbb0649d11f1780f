//! Company commands: loan changes, renaming, headquarters.

use core_sim::{objects, GameState, Occupant, TileOccupant, COST_SHIFT};
use sim_schema::{string_ids, CompanyId, ExpenditureType, Money, TilePos};

use crate::args::{
    ChangeCompanyNameArgs, ChangeLoanArgs, HeadquarterPlacementArgs, HeadquarterRemovalArgs,
};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

pub fn change_loan(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &ChangeLoanArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_CHANGE_LOAN);
    ctx.set_expenditure(ExpenditureType::LoanInterest);

    if args.new_loan < Money::ZERO {
        return Err(ctx.failure(string_ids::CANNOT_PERFORM_ACTION));
    }
    let max_loan = world.economy.max_loan();
    let company_id = ctx.company();
    let Some(company) = world.company(company_id) else {
        return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
    };
    if args.new_loan > max_loan {
        return Err(ctx.failure(string_ids::BANK_REFUSES_TO_LEND));
    }
    let delta = args.new_loan - company.current_loan;
    if delta < Money::ZERO && company.cash < -delta {
        return Err(ctx.failure(string_ids::NOT_ENOUGH_CASH));
    }

    if flags.is_apply() {
        let company = world
            .company_mut(company_id)
            .ok_or_else(|| ctx.failure(string_ids::COMPANY_NOT_FOUND))?;
        company.cash += delta;
        company.current_loan = args.new_loan;
    }
    // Loan movements transfer cash directly; the command itself is free.
    Ok(Money::ZERO)
}

pub fn change_company_name(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &ChangeCompanyNameArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_RENAME);

    if world.company(args.company).is_none() {
        return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
    }
    ctx.check_authority(args.company)?;
    if args.name.trim().is_empty() {
        return Err(ctx.failure(string_ids::INVALID_NAME));
    }
    let taken = world
        .companies
        .iter()
        .any(|(id, company)| *id != args.company && company.name == args.name);
    if taken {
        return Err(ctx.failure(string_ids::NAME_ALREADY_IN_USE));
    }

    if flags.is_apply() {
        if let Some(company) = world.company_mut(args.company) {
            company.name = args.name.clone();
        }
    }
    Ok(Money::ZERO)
}

pub fn build_headquarters(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &HeadquarterPlacementArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_BUILD_THIS_HERE);
    ctx.set_expenditure(ExpenditureType::Construction);

    let company_id = ctx.company();
    if world.company(company_id).is_none() {
        return Err(ctx.failure(string_ids::COMPANY_NOT_FOUND));
    }
    if !world.map.is_buildable(args.pos) {
        return Err(ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP));
    }
    let tile = world
        .map
        .tile(args.pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    if !tile.is_clear() {
        return Err(ctx.failure(string_ids::ALREADY_SOMETHING_HERE));
    }
    ctx.set_position(args.pos.world_centre(tile.base_height as i16 * 4));

    let object = objects::HEADQUARTERS_OBJECT;
    let cost = world
        .economy
        .cost(object.build_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        if flags.is_ghost() {
            place_hq_tile(world, args.pos, company_id, true);
        } else {
            // Relocation tears down the previous building first.
            if let Some(previous) = world.company(company_id).and_then(|c| c.headquarters) {
                clear_hq_tile(world, previous);
            }
            place_hq_tile(world, args.pos, company_id, false);
            if let Some(company) = world.company_mut(company_id) {
                company.headquarters = Some(args.pos);
            }
        }
    }
    Ok(cost)
}

pub fn remove_headquarters(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    _args: &HeadquarterRemovalArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);
    ctx.set_expenditure(ExpenditureType::Construction);

    let company_id = ctx.company();
    if flags.is_ghost() {
        // Reverse a preview placement; the company record never knew about it.
        let Some(pos) = find_ghost_hq(world, company_id) else {
            return Err(ctx.failure(string_ids::NOTHING_TO_REMOVE_HERE));
        };
        if flags.is_apply() {
            clear_hq_tile(world, pos);
        }
        return Ok(Money::ZERO);
    }

    let Some(pos) = world.company(company_id).and_then(|c| c.headquarters) else {
        return Err(ctx.failure(string_ids::COMPANY_HAS_NO_HEADQUARTERS));
    };
    if let Some(tile) = world.map.tile(pos) {
        ctx.set_position(pos.world_centre(tile.base_height as i16 * 4));
    }

    let object = objects::HEADQUARTERS_OBJECT;
    let cost = world
        .economy
        .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        clear_hq_tile(world, pos);
        if let Some(company) = world.company_mut(company_id) {
            company.headquarters = None;
        }
    }
    Ok(cost)
}

fn place_hq_tile(world: &mut GameState, pos: TilePos, company: CompanyId, ghost: bool) {
    if let Some(tile) = world.map.tile_mut(pos) {
        tile.occupant = Some(TileOccupant {
            occupant: Occupant::Headquarters(company),
            ghost,
        });
    }
}

fn clear_hq_tile(world: &mut GameState, pos: TilePos) {
    if let Some(tile) = world.map.tile_mut(pos) {
        if matches!(
            tile.occupant,
            Some(TileOccupant {
                occupant: Occupant::Headquarters(_),
                ..
            })
        ) {
            tile.occupant = None;
        }
    }
}

fn find_ghost_hq(world: &GameState, company: CompanyId) -> Option<TilePos> {
    for y in 0..world.map.height() {
        for x in 0..world.map.width() {
            let pos = TilePos::new(x, y);
            if let Some(tile) = world.map.tile(pos) {
                if let Some(TileOccupant {
                    occupant: Occupant::Headquarters(owner),
                    ghost: true,
                }) = tile.occupant
                {
                    if owner == company {
                        return Some(pos);
                    }
                }
            }
        }
    }
    None
}
