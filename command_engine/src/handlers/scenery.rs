//! Scenery commands: trees and free-standing walls.

use core_sim::{objects, GameState, TreeElement, WallElement, COST_SHIFT};
use sim_schema::{string_ids, ExpenditureType, TilePos};

use crate::args::{TreePlacementArgs, TreeRemovalArgs, WallPlacementArgs, WallRemovalArgs};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::{Failed, Outcome};

/// Exclusive bound for the randomized starting growth stage of a tree.
const GROWTH_STAGES: u32 = 8;

pub fn create_tree(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &TreePlacementArgs,
) -> Outcome {
    let Some(object) = objects::tree(args.object) else {
        ctx.set_error_title(string_ids::ERROR_CANT_BUILD_THIS_HERE);
        return Err(ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE));
    };
    placement_target(world, ctx, args.pos)?;

    let cost = world
        .economy
        .cost(object.build_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        let ghost = flags.is_ghost();
        // Ghost previews stay off the shared PRNG stream.
        let growth = if ghost {
            0
        } else {
            world.prng.next_bound(GROWTH_STAGES) as u8
        };
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.tree = Some(TreeElement {
                object: args.object,
                growth,
                ghost,
            });
        }
    }
    Ok(cost)
}

pub fn remove_tree(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &TreeRemovalArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);
    ctx.set_expenditure(ExpenditureType::Construction);

    let tile = world
        .map
        .tile(args.pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    ctx.set_position(args.pos.world_centre(tile.base_height as i16 * 4));
    let Some(tree) = tile.tree.filter(|tree| tree.ghost == flags.is_ghost()) else {
        return Err(ctx.failure(string_ids::NOTHING_TO_REMOVE_HERE));
    };
    let object = objects::tree(tree.object)
        .ok_or_else(|| ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE))?;
    let cost = world
        .economy
        .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.tree = None;
        }
    }
    Ok(cost)
}

pub fn create_wall(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &WallPlacementArgs,
) -> Outcome {
    let Some(object) = objects::wall(args.object) else {
        ctx.set_error_title(string_ids::ERROR_CANT_BUILD_THIS_HERE);
        return Err(ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE));
    };
    if args.rotation >= 4 {
        ctx.set_error_title(string_ids::ERROR_CANT_BUILD_THIS_HERE);
        return Err(ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE));
    }
    placement_target(world, ctx, args.pos)?;

    let cost = world
        .economy
        .cost(object.build_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.wall = Some(WallElement {
                object: args.object,
                rotation: args.rotation,
                ghost: flags.is_ghost(),
            });
        }
    }
    Ok(cost)
}

pub fn remove_wall(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &WallRemovalArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);
    ctx.set_expenditure(ExpenditureType::Construction);

    let tile = world
        .map
        .tile(args.pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    ctx.set_position(args.pos.world_centre(tile.base_height as i16 * 4));
    let Some(wall) = tile.wall.filter(|wall| wall.ghost == flags.is_ghost()) else {
        return Err(ctx.failure(string_ids::NOTHING_TO_REMOVE_HERE));
    };
    let object = objects::wall(wall.object)
        .ok_or_else(|| ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE))?;
    let cost = world
        .economy
        .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.wall = None;
        }
    }
    Ok(cost)
}

fn placement_target(
    world: &GameState,
    ctx: &mut ExecutionContext,
    pos: TilePos,
) -> Result<(), Failed> {
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
    Ok(())
}
