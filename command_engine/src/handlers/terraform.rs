//! Land commands: raising, lowering and clearing tiles.

use core_sim::{objects, GameState, COST_SHIFT, MAX_BASE_HEIGHT, MIN_BASE_HEIGHT};
use sim_schema::{string_ids, ExpenditureType, Money, TilePos};

use crate::args::{ClearLandArgs, LowerLandArgs, RaiseLandArgs};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::{Failed, Outcome};

pub fn raise_land(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &RaiseLandArgs,
) -> Outcome {
    let tile = terraform_target(world, ctx, args.pos)?;
    if tile.base_height >= MAX_BASE_HEIGHT {
        return Err(ctx.failure(string_ids::LAND_AT_MAXIMUM_HEIGHT));
    }
    let cost = terraform_cost(world);
    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.base_height += 1;
        }
    }
    Ok(cost)
}

pub fn lower_land(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &LowerLandArgs,
) -> Outcome {
    let tile = terraform_target(world, ctx, args.pos)?;
    if tile.base_height <= MIN_BASE_HEIGHT {
        return Err(ctx.failure(string_ids::LAND_AT_MINIMUM_HEIGHT));
    }
    let cost = terraform_cost(world);
    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.base_height -= 1;
        }
    }
    Ok(cost)
}

pub fn clear_land(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &ClearLandArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);
    ctx.set_expenditure(ExpenditureType::Construction);

    if !world.map.is_buildable(args.pos) {
        return Err(ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP));
    }
    let tile = world
        .map
        .tile(args.pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    ctx.set_position(args.pos.world_centre(tile.base_height as i16 * 4));

    // Buildings are removed by their own commands, not by area clearing.
    if tile.occupant.is_some() {
        return Err(ctx.failure(string_ids::ALREADY_SOMETHING_HERE));
    }

    let mut cost = Money::ZERO;
    let mut anything = false;
    if let Some(tree) = tile.live_tree() {
        if let Some(object) = objects::tree(tree.object) {
            cost += world
                .economy
                .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);
        }
        anything = true;
    }
    if let Some(wall) = tile.live_wall() {
        if let Some(object) = objects::wall(wall.object) {
            cost += world
                .economy
                .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);
        }
        anything = true;
    }
    if !anything {
        return Err(ctx.failure(string_ids::NOTHING_TO_REMOVE_HERE));
    }

    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            if tile.live_tree().is_some() {
                tile.tree = None;
            }
            if tile.live_wall().is_some() {
                tile.wall = None;
            }
        }
    }
    Ok(cost)
}

fn terraform_target<'world>(
    world: &'world GameState,
    ctx: &mut ExecutionContext,
    pos: TilePos,
) -> Result<&'world core_sim::Tile, Failed> {
    ctx.set_error_title(string_ids::ERROR_CANT_BUILD_THIS_HERE);
    ctx.set_expenditure(ExpenditureType::Construction);
    if !world.map.is_buildable(pos) {
        return Err(ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP));
    }
    let tile = world
        .map
        .tile(pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    if !tile.is_clear() {
        return Err(ctx.failure(string_ids::ALREADY_SOMETHING_HERE));
    }
    ctx.set_position(pos.world_centre(tile.base_height as i16 * 4));
    Ok(tile)
}

fn terraform_cost(world: &GameState) -> Money {
    world.economy.cost(
        objects::TERRAFORM_COST_FACTOR,
        objects::TERRAFORM_COST_INDEX,
        COST_SHIFT,
    )
}
