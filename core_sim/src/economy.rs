use serde::{Deserialize, Serialize};
use thiserror::Error;

use sim_schema::Money;

/// Number of cost indices in the inflation table. Each index inflates at its
/// own monthly rate so construction, vehicle and land prices drift apart
/// over a long game.
pub const COST_INDEX_COUNT: usize = 8;

/// Default shift applied when converting a cost factor into currency.
/// With a fresh factor table (multiplier `1 << COST_SHIFT`) the conversion
/// is the identity, which keeps early-game prices equal to their factors.
pub const COST_SHIFT: u8 = 8;

/// Per-mille-of-1024 monthly inflation for each cost index.
const INFLATION_RATES: [u32; COST_INDEX_COUNT] = [10, 10, 12, 8, 10, 14, 10, 10];

/// Nominal loan ceiling before inflation adjustment.
const MAX_LOAN_SIZE: i64 = 800_000;

/// Nominal starting loan before inflation adjustment.
const STARTING_LOAN_SIZE: i64 = 100_000;

/// Loan increments used when an AI company auto-extends its loan to cover a
/// payment.
const AI_LOAN_STEP: i64 = 1_000;

/// The economy ledger: converts abstract cost factors into currency amounts
/// under the current inflation state.
///
/// Cost computation is pure with respect to committed state; only the
/// monthly tick mutates the factor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    /// Fixed-point currency multipliers, one per cost index.
    factors: [u64; COST_INDEX_COUNT],
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            factors: [1 << COST_SHIFT; COST_INDEX_COUNT],
        }
    }
}

impl Economy {
    /// Inflation-adjusted cost of `factor` units under `cost_index`.
    ///
    /// Mirrors the original `getInflationAdjustedCost(factor, costIndex,
    /// divisor)`: the factor is scaled by the index's current multiplier and
    /// shifted back down by `shift`.
    pub fn cost(&self, factor: i32, cost_index: u8, shift: u8) -> Money {
        let multiplier = self.factors[cost_index as usize % COST_INDEX_COUNT] as i64;
        Money((factor as i64 * multiplier) >> shift)
    }

    /// Largest loan the bank will extend right now.
    pub fn max_loan(&self) -> Money {
        self.cost(MAX_LOAN_SIZE as i32, 0, COST_SHIFT)
    }

    /// Loan a freshly founded company starts with, rounded down to 100.
    pub fn starting_loan(&self) -> Money {
        Money(self.cost(STARTING_LOAN_SIZE as i32, 0, COST_SHIFT).0 / 100 * 100)
    }

    /// Advance the factor table by one game month.
    pub fn update_monthly(&mut self) {
        for (factor, rate) in self.factors.iter_mut().zip(INFLATION_RATES) {
            *factor += *factor * rate as u64 / 1024;
        }
    }

    /// Round a shortfall up to the next AI loan step.
    pub fn ai_loan_for(shortfall: Money) -> Money {
        Money((shortfall.0 + AI_LOAN_STEP - 1) / AI_LOAN_STEP * AI_LOAN_STEP)
    }
}

/// Why a company cannot cover a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FundingError {
    #[error("company is bankrupt")]
    Bankrupt,
    #[error("not enough cash for payment of {0}")]
    NotEnoughCash(Money),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_prices_at_face_value() {
        let economy = Economy::default();
        assert_eq!(economy.cost(1_500, 0, COST_SHIFT), Money(1_500));
        assert_eq!(economy.cost(-320, 3, COST_SHIFT), Money(-320));
        assert_eq!(economy.max_loan(), Money(800_000));
        assert_eq!(economy.starting_loan(), Money(100_000));
    }

    #[test]
    fn monthly_update_inflates_each_index() {
        let mut economy = Economy::default();
        economy.update_monthly();
        for index in 0..COST_INDEX_COUNT as u8 {
            assert!(economy.cost(10_000, index, COST_SHIFT) > Money(10_000));
        }
        // Indices inflate at different rates.
        assert_ne!(
            economy.cost(1 << 20, 2, COST_SHIFT),
            economy.cost(1 << 20, 3, COST_SHIFT)
        );
    }

    #[test]
    fn ai_loan_rounds_up_to_step() {
        assert_eq!(Economy::ai_loan_for(Money(1)), Money(1_000));
        assert_eq!(Economy::ai_loan_for(Money(1_000)), Money(1_000));
        assert_eq!(Economy::ai_loan_for(Money(1_001)), Money(2_000));
    }
}
