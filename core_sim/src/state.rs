use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sim_schema::{
    digest_bytes, CompanyId, ExpenditureType, GameSpeed, IndustryId, Money, StationId, TilePos,
    TownId,
};

use crate::economy::{Economy, FundingError};
use crate::map::TileMap;
use crate::prng::GamePrng;

/// Entity caps; id allocation scans these fixed pools for the lowest free
/// slot.
pub const MAX_INDUSTRIES: usize = 128;
pub const MAX_TOWNS: usize = 80;

bitflags! {
    /// Persistent per-company status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CompanyFlags: u32 {
        const BANKRUPT = 1 << 0;
        const AI = 1 << 1;
    }
}

/// A transport company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub owner_name: String,
    pub cash: Money,
    pub current_loan: Money,
    /// Current-period spending per category; payments are recorded negative.
    pub expenditures: [Money; ExpenditureType::COUNT],
    pub flags: CompanyFlags,
    pub headquarters: Option<TilePos>,
}

impl Company {
    pub fn new(name: &str, owner_name: &str, cash: Money, loan: Money) -> Self {
        Self {
            name: name.to_string(),
            owner_name: owner_name.to_string(),
            cash,
            current_loan: loan,
            expenditures: [Money::ZERO; ExpenditureType::COUNT],
            flags: CompanyFlags::empty(),
            headquarters: None,
        }
    }

    pub fn is_bankrupt(&self) -> bool {
        self.flags.contains(CompanyFlags::BANKRUPT)
    }
}

/// A town on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub name: String,
    pub pos: TilePos,
    pub population: u32,
}

/// An industry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub kind: u8,
    pub name: String,
    pub pos: TilePos,
    pub town: Option<TownId>,
    pub production: u16,
    /// Preview instance placed by a ghost command.
    pub ghost: bool,
}

/// A station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub owner: CompanyId,
    pub pos: TilePos,
    pub town: Option<TownId>,
}

/// Complete simulation state.
///
/// Everything a command may read or mutate lives here; the struct is fully
/// serializable and uses only deterministically ordered containers so that
/// [`state_digest`] matches across session participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub tick: u32,
    pub prng: GamePrng,
    pub paused: bool,
    /// Scenario setting that lets apply-mode commands unpause the game.
    pub pause_override: bool,
    pub game_speed: GameSpeed,
    pub economy: Economy,
    pub map: TileMap,
    pub companies: BTreeMap<CompanyId, Company>,
    pub towns: BTreeMap<TownId, Town>,
    pub industries: BTreeMap<IndustryId, Industry>,
    pub stations: BTreeMap<StationId, Station>,
    /// The company the local player controls.
    pub controlling_company: CompanyId,
}

impl GameState {
    pub fn new(seed: u64, map_width: u16, map_height: u16) -> Self {
        Self {
            tick: 0,
            prng: GamePrng::from_seed(seed),
            paused: false,
            pause_override: true,
            game_speed: GameSpeed::Normal,
            economy: Economy::default(),
            map: TileMap::flat(map_width, map_height, 4),
            companies: BTreeMap::new(),
            towns: BTreeMap::new(),
            industries: BTreeMap::new(),
            stations: BTreeMap::new(),
            controlling_company: CompanyId(0),
        }
    }

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.get(&id)
    }

    pub fn company_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.get_mut(&id)
    }

    pub fn is_player_company(&self, id: CompanyId) -> bool {
        id == self.controlling_company
    }

    /// Industries visible to gameplay; ghost previews are excluded.
    pub fn live_industries(&self) -> impl Iterator<Item = (&IndustryId, &Industry)> {
        self.industries.iter().filter(|(_, industry)| !industry.ghost)
    }

    /// Lowest unused industry id, if the pool has room.
    pub fn allocate_industry_id(&self) -> Option<IndustryId> {
        (0..MAX_INDUSTRIES as u16)
            .map(IndustryId)
            .find(|id| !self.industries.contains_key(id))
    }

    /// Lowest unused town id, if the pool has room.
    pub fn allocate_town_id(&self) -> Option<TownId> {
        (0..MAX_TOWNS as u16)
            .map(TownId)
            .find(|id| !self.towns.contains_key(id))
    }

    /// Town closest to `pos`, used to attach founded industries.
    pub fn nearest_town(&self, pos: TilePos) -> Option<TownId> {
        self.towns
            .iter()
            .min_by_key(|(id, town)| (town.pos.manhattan_distance(pos), **id))
            .map(|(id, _)| *id)
    }

    /// Subtract a payment from a company's balance and record it against the
    /// expenditure category.
    pub fn apply_payment(&mut self, id: CompanyId, payment: Money, category: ExpenditureType) {
        let Some(company) = self.companies.get_mut(&id) else {
            return;
        };
        company.cash -= payment;
        company.expenditures[category.index()] -= payment;
        debug!(company = %id, %payment, ?category, "posted payment");
    }

    /// Read-only version of [`ensure_funding`](Self::ensure_funding), for the
    /// validation pass. Answers whether funding WOULD succeed without
    /// extending any AI loan.
    pub fn can_fund(&self, id: CompanyId, payment: Money) -> Result<(), FundingError> {
        if payment <= Money::ZERO || id.is_neutral() {
            return Ok(());
        }
        let Some(company) = self.companies.get(&id) else {
            return Ok(());
        };

        if self.is_player_company(id) {
            if company.is_bankrupt() {
                return Err(FundingError::Bankrupt);
            }
            if company.cash < payment {
                return Err(FundingError::NotEnoughCash(payment));
            }
            return Ok(());
        }

        if company.cash < payment {
            let shortfall = payment - company.cash;
            let extra_loan = Economy::ai_loan_for(shortfall);
            if company.current_loan + extra_loan > self.economy.max_loan() {
                return Err(FundingError::NotEnoughCash(payment));
            }
        }
        Ok(())
    }

    /// Check that a company can cover `payment` before an irreversible
    /// mutation. AI companies quietly extend their loan in fixed steps as
    /// long as the bank's inflation-adjusted ceiling allows it.
    pub fn ensure_funding(&mut self, id: CompanyId, payment: Money) -> Result<(), FundingError> {
        if payment <= Money::ZERO || id.is_neutral() {
            return Ok(());
        }
        let max_loan = self.economy.max_loan();
        let is_player = self.is_player_company(id);
        let Some(company) = self.companies.get_mut(&id) else {
            return Ok(());
        };

        if is_player {
            if company.is_bankrupt() {
                return Err(FundingError::Bankrupt);
            }
            if company.cash < payment {
                return Err(FundingError::NotEnoughCash(payment));
            }
            return Ok(());
        }

        if company.cash < payment {
            let shortfall = payment - company.cash;
            let extra_loan = Economy::ai_loan_for(shortfall);
            if company.current_loan + extra_loan > max_loan {
                return Err(FundingError::NotEnoughCash(payment));
            }
            company.current_loan += extra_loan;
            company.cash += extra_loan;
        }
        Ok(())
    }
}

/// Deterministic digest over the entire simulation state.
///
/// Two participants that applied the same command sequence from the same
/// starting state must produce identical digests; a mismatch means the
/// session has diverged.
pub fn state_digest(state: &GameState) -> u64 {
    let encoded = bincode::serialize(state).expect("game state serializes for digest");
    digest_bytes(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_company(cash: i64) -> GameState {
        let mut state = GameState::new(1, 16, 16);
        state
            .companies
            .insert(CompanyId(0), Company::new("Test Co", "A. Driver", Money(cash), Money(0)));
        state
    }

    #[test]
    fn payment_moves_cash_and_expenditure() {
        let mut state = state_with_company(10_000);
        state.apply_payment(CompanyId(0), Money(1_500), ExpenditureType::Construction);
        let company = state.company(CompanyId(0)).unwrap();
        assert_eq!(company.cash, Money(8_500));
        assert_eq!(
            company.expenditures[ExpenditureType::Construction.index()],
            Money(-1_500)
        );
    }

    #[test]
    fn player_funding_requires_cash_on_hand() {
        let mut state = state_with_company(100);
        assert_eq!(
            state.ensure_funding(CompanyId(0), Money(500)),
            Err(FundingError::NotEnoughCash(Money(500)))
        );
        assert_eq!(state.ensure_funding(CompanyId(0), Money(100)), Ok(()));
        // Refunds and neutral parties always pass.
        assert_eq!(state.ensure_funding(CompanyId(0), Money(-10)), Ok(()));
        assert_eq!(state.ensure_funding(CompanyId::NEUTRAL, Money(500)), Ok(()));
    }

    #[test]
    fn bankrupt_player_cannot_pay() {
        let mut state = state_with_company(10_000);
        state.company_mut(CompanyId(0)).unwrap().flags |= CompanyFlags::BANKRUPT;
        assert_eq!(
            state.ensure_funding(CompanyId(0), Money(1)),
            Err(FundingError::Bankrupt)
        );
    }

    #[test]
    fn can_fund_never_mutates() {
        let mut state = state_with_company(100);
        state.controlling_company = CompanyId(9);
        state.company_mut(CompanyId(0)).unwrap().flags |= CompanyFlags::AI;
        let before = state_digest(&state);
        assert_eq!(state.can_fund(CompanyId(0), Money(2_500)), Ok(()));
        assert_eq!(state_digest(&state), before);
        let company = state.company(CompanyId(0)).unwrap();
        assert_eq!(company.current_loan, Money(0));
    }

    #[test]
    fn ai_company_extends_loan_in_steps() {
        let mut state = state_with_company(100);
        state.controlling_company = CompanyId(9);
        state.company_mut(CompanyId(0)).unwrap().flags |= CompanyFlags::AI;
        assert_eq!(state.ensure_funding(CompanyId(0), Money(2_500)), Ok(()));
        let company = state.company(CompanyId(0)).unwrap();
        assert_eq!(company.current_loan, Money(3_000));
        assert_eq!(company.cash, Money(3_100));
    }

    #[test]
    fn digest_tracks_state_changes() {
        let state_a = state_with_company(10_000);
        let state_b = state_with_company(10_000);
        assert_eq!(state_digest(&state_a), state_digest(&state_b));

        let mut state_c = state_with_company(10_000);
        state_c.apply_payment(CompanyId(0), Money(1), ExpenditureType::Miscellaneous);
        assert_ne!(state_digest(&state_a), state_digest(&state_c));
    }

    #[test]
    fn id_allocation_reuses_lowest_free_slot() {
        let mut state = GameState::new(1, 16, 16);
        assert_eq!(state.allocate_town_id(), Some(TownId(0)));
        state.towns.insert(
            TownId(0),
            Town {
                name: "A".into(),
                pos: TilePos::new(2, 2),
                population: 100,
            },
        );
        state.towns.insert(
            TownId(2),
            Town {
                name: "B".into(),
                pos: TilePos::new(8, 8),
                population: 100,
            },
        );
        assert_eq!(state.allocate_town_id(), Some(TownId(1)));
    }
}
