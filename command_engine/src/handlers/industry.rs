//! Industry commands: founding and demolition.

use core_sim::{objects, GameState, Industry, Occupant, TileOccupant, COST_SHIFT};
use sim_schema::{string_ids, ExpenditureType};

use crate::args::{IndustryPlacementArgs, IndustryRemovalArgs};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

/// Baseline production level before the randomized component.
const BASE_PRODUCTION: u16 = 4;

pub fn create_industry(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &IndustryPlacementArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_FOUND_INDUSTRY);
    ctx.set_expenditure(ExpenditureType::Miscellaneous);

    let Some(object) = objects::industry(args.kind) else {
        return Err(ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE));
    };
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
    let Some(id) = world.allocate_industry_id() else {
        return Err(ctx.failure(string_ids::TOO_MANY_INDUSTRIES));
    };

    let cost = world
        .economy
        .cost(object.build_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        let ghost = flags.is_ghost();
        // Previews must not advance the shared PRNG: they exist on one
        // machine only and would desynchronize every other participant.
        let production = if ghost {
            0
        } else {
            BASE_PRODUCTION + world.prng.next_bound(object.production_range) as u16
        };
        let town = world.nearest_town(args.pos);
        let name = match town.and_then(|id| world.towns.get(&id)) {
            Some(home) => format!("{} {}", home.name, object.label),
            None => object.label.to_string(),
        };
        world.industries.insert(
            id,
            Industry {
                kind: args.kind,
                name,
                pos: args.pos,
                town,
                production,
                ghost,
            },
        );
        if let Some(tile) = world.map.tile_mut(args.pos) {
            tile.occupant = Some(TileOccupant {
                occupant: Occupant::Industry(id),
                ghost,
            });
        }
    }
    Ok(cost)
}

pub fn remove_industry(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &IndustryRemovalArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);
    ctx.set_expenditure(ExpenditureType::Miscellaneous);

    let Some(industry) = world.industries.get(&args.industry) else {
        return Err(ctx.failure(string_ids::INDUSTRY_NOT_FOUND));
    };
    // A ghost removal targets the preview instance; live gameplay never
    // sees ghosts, so the mismatched case reads as "not there".
    if industry.ghost != flags.is_ghost() {
        return Err(ctx.failure(string_ids::INDUSTRY_NOT_FOUND));
    }
    let pos = industry.pos;
    let kind = industry.kind;
    if let Some(tile) = world.map.tile(pos) {
        ctx.set_position(pos.world_centre(tile.base_height as i16 * 4));
    }
    let object = objects::industry(kind)
        .ok_or_else(|| ctx.failure(string_ids::UNSUITABLE_OBJECT_TYPE))?;
    let cost = world
        .economy
        .cost(object.clear_cost_factor, object.cost_index, COST_SHIFT);

    if flags.is_apply() {
        world.industries.remove(&args.industry);
        if let Some(tile) = world.map.tile_mut(pos) {
            if matches!(
                tile.occupant,
                Some(TileOccupant {
                    occupant: Occupant::Industry(id),
                    ..
                }) if id == args.industry
            ) {
                tile.occupant = None;
            }
        }
    }
    Ok(cost)
}
