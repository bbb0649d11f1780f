//! Station commands. Construction itself lives outside this engine; only
//! renaming is replicated here.

use core_sim::GameState;
use sim_schema::{string_ids, Money};

use crate::args::RenameStationArgs;
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

pub fn rename_station(
    world: &mut GameState,
    ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &RenameStationArgs,
) -> Outcome {
    ctx.set_error_title(string_ids::ERROR_CANT_RENAME);

    let Some(station) = world.stations.get(&args.station) else {
        return Err(ctx.failure(string_ids::STATION_NOT_FOUND));
    };
    ctx.check_authority(station.owner)?;
    if args.name.trim().is_empty() {
        return Err(ctx.failure(string_ids::INVALID_NAME));
    }
    let taken = world
        .stations
        .iter()
        .any(|(id, station)| *id != args.station && station.name == args.name);
    if taken {
        return Err(ctx.failure(string_ids::NAME_ALREADY_IN_USE));
    }

    if flags.is_apply() {
        if let Some(station) = world.stations.get_mut(&args.station) {
            station.name = args.name.clone();
        }
    }
    Ok(Money::ZERO)
}
