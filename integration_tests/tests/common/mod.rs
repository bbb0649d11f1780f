#![allow(dead_code)]

use command_engine::{dispatch, CommandFlags, DispatchResult, GameCommandArg};
use core_sim::{scenario, GameState};
use sim_schema::CompanyId;

pub const PLAYER: CompanyId = CompanyId(0);

/// The shared starting world: flat 64x64 map, one funded player company,
/// one town at the centre.
pub fn world() -> GameState {
    scenario::build(0xA11CE, 64, 64)
}

pub fn query(world: &mut GameState, arg: &GameCommandArg) -> DispatchResult {
    dispatch(world, PLAYER, arg, CommandFlags::empty()).expect("well-formed command")
}

pub fn apply(world: &mut GameState, arg: &GameCommandArg) -> DispatchResult {
    dispatch(world, PLAYER, arg, CommandFlags::APPLY).expect("well-formed command")
}

pub fn apply_as(
    world: &mut GameState,
    company: CompanyId,
    arg: &GameCommandArg,
    flags: CommandFlags,
) -> DispatchResult {
    dispatch(world, company, arg, flags).expect("well-formed command")
}
