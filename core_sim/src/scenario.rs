//! Deterministic starting worlds for tests and the replay harness.

use sim_schema::{CompanyId, Money, TilePos, TownId};

use crate::state::{Company, GameState, Town};

/// Build a small deterministic world: flat map, one player company with the
/// starting loan already drawn, and one town near the centre.
pub fn build(seed: u64, map_width: u16, map_height: u16) -> GameState {
    let mut state = GameState::new(seed, map_width, map_height);

    let starting_loan = state.economy.starting_loan();
    let mut company = Company::new("Steelgauge Transport", "E. Brunel", starting_loan, starting_loan);
    company.cash += Money(20_000);
    state.companies.insert(CompanyId(0), company);
    state.controlling_company = CompanyId(0);

    state.towns.insert(
        TownId(0),
        Town {
            name: "Drumnadrochit".to_string(),
            pos: TilePos::new(map_width / 2, map_height / 2),
            population: 1_250,
        },
    );

    state
}
