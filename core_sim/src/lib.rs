//! Simulation state for the Steelgauge transport-economy prototype.
//!
//! Holds the authoritative [`GameState`] that game commands validate against
//! and mutate, the economy ledger that turns abstract cost factors into
//! currency, the deterministic PRNG stream shared by every participant, and
//! the static object tables construction commands price against.

mod economy;
mod map;
pub mod objects;
mod prng;
pub mod scenario;
mod state;

pub use economy::{Economy, FundingError, COST_SHIFT};
pub use map::{
    Occupant, Tile, TileMap, TileOccupant, TreeElement, WallElement, MAX_BASE_HEIGHT,
    MIN_BASE_HEIGHT,
};
pub use prng::GamePrng;
pub use state::{
    state_digest, Company, CompanyFlags, GameState, Industry, Station, Town, MAX_INDUSTRIES,
    MAX_TOWNS,
};
