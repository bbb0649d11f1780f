//! Session-level commands: pause toggling and simulation speed.

use core_sim::GameState;
use sim_schema::Money;

use crate::args::{PauseGameArgs, SetGameSpeedArgs};
use crate::context::ExecutionContext;
use crate::flags::CommandFlags;
use crate::outcome::Outcome;

pub fn pause_game(
    world: &mut GameState,
    _ctx: &mut ExecutionContext,
    flags: CommandFlags,
    _args: &PauseGameArgs,
) -> Outcome {
    if flags.is_apply() {
        world.paused = !world.paused;
    }
    Ok(Money::ZERO)
}

pub fn set_game_speed(
    world: &mut GameState,
    _ctx: &mut ExecutionContext,
    flags: CommandFlags,
    args: &SetGameSpeedArgs,
) -> Outcome {
    if flags.is_apply() {
        world.game_speed = args.speed;
    }
    Ok(Money::ZERO)
}
