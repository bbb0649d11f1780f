//! Town commands: founding, demolition, renaming.

use core_sim::{objects, GameState, Town};
use sim_schema::{string_ids, Money};

use crate::args::{RenameTownArgs, TownPlacementArgs, TownRemovalArgs};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

/// Minimum spacing between town centres, in tiles.
const TOWN_SPACING: u32 = 12;

/// Population a freshly founded town starts with.
const INITIAL_POPULATION: u32 = 150;

pub fn create_town(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &TownPlacementArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_FOUND_TOWN);

    if !world.map.is_buildable(args.pos) {
        return Err(ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP));
    }
    let tile = world
        .map
        .tile(args.pos)
        .ok_or_else(|| ctx.failure(string_ids::TOO_CLOSE_TO_EDGE_OF_MAP))?;
    ctx.set_position(args.pos.world_centre(tile.base_height as i16 * 4));

    let too_close = world
        .towns
        .values()
        .any(|town| town.pos.manhattan_distance(args.pos) < TOWN_SPACING);
    if too_close {
        return Err(ctx.failure(string_ids::TOO_CLOSE_TO_ANOTHER_TOWN));
    }
    let Some(id) = world.allocate_town_id() else {
        return Err(ctx.failure(string_ids::TOO_MANY_TOWNS));
    };

    if flags.is_apply() {
        // Name variant comes from the shared PRNG stream, so every session
        // participant founds the same town.
        let pick = world.prng.next_bound(objects::TOWN_NAMES.len() as u32) as usize;
        let name = unused_town_name(world, pick);
        world.towns.insert(
            id,
            Town {
                name,
                pos: args.pos,
                population: INITIAL_POPULATION,
            },
        );
    }
    Ok(Money::ZERO)
}

fn unused_town_name(world: &GameState, pick: usize) -> String {
    let base = objects::TOWN_NAMES[pick % objects::TOWN_NAMES.len()];
    if !world.towns.values().any(|town| town.name == base) {
        return base.to_string();
    }
    let mut serial = 2u32;
    loop {
        let candidate = format!("{base} {serial}");
        if !world.towns.values().any(|town| town.name == candidate) {
            return candidate;
        }
        serial += 1;
    }
}

pub fn remove_town(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &TownRemovalArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_REMOVE_THIS);

    let Some(town) = world.towns.get(&args.town) else {
        return Err(ctx.failure(string_ids::TOWN_NOT_FOUND));
    };
    if let Some(tile) = world.map.tile(town.pos) {
        ctx.set_position(town.pos.world_centre(tile.base_height as i16 * 4));
    }

    if flags.is_apply() {
        world.towns.remove(&args.town);
        // Entities keep working after their home town disappears.
        for industry in world.industries.values_mut() {
            if industry.town == Some(args.town) {
                industry.town = None;
            }
        }
        for station in world.stations.values_mut() {
            if station.town == Some(args.town) {
                station.town = None;
            }
        }
    }
    Ok(Money::ZERO)
}

pub fn rename_town(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &RenameTownArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_RENAME);

    if !world.towns.contains_key(&args.town) {
        return Err(ctx.failure(string_ids::TOWN_NOT_FOUND));
    }
    if args.name.trim().is_empty() {
        return Err(ctx.failure(string_ids::INVALID_NAME));
    }
    let taken = world
        .towns
        .iter()
        .any(|(id, town)| *id != args.town && town.name == args.name);
    if taken {
        return Err(ctx.failure(string_ids::NAME_ALREADY_IN_USE));
    }

    if flags.is_apply() {
        if let Some(town) = world.towns.get_mut(&args.town) {
            town.name = args.name.clone();
        }
    }
    Ok(Money::ZERO)
}
