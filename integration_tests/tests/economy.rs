//! Funding checks and cost inflation as seen through the dispatcher.

mod common;

use command_engine::{CommandFlags, GameCommandArg};
use command_engine::args::{IndustryPlacementArgs, TreePlacementArgs};
use core_sim::{Company, CompanyFlags};
use sim_schema::{string_ids, CompanyId, ExpenditureType, Money, TilePos};

use common::{apply, apply_as, query, world, PLAYER};

#[test]
fn player_cannot_commit_beyond_cash_on_hand() {
    let mut state = world();
    state.company_mut(PLAYER).unwrap().cash = Money(5_000);

    let arg = GameCommandArg::CreateIndustry(IndustryPlacementArgs {
        pos: TilePos::new(12, 12),
        kind: 2,
    });
    let result = apply(&mut state, &arg);
    assert!(result.outcome.is_err());
    assert_eq!(result.context.error_text, string_ids::NOT_ENOUGH_CASH);
    // The refused commit changed nothing.
    assert!(state.industries.is_empty());
    assert_eq!(state.company(PLAYER).unwrap().cash, Money(5_000));
}

#[test]
fn bankrupt_player_is_refused_outright() {
    let mut state = world();
    let company = state.company_mut(PLAYER).unwrap();
    company.flags |= CompanyFlags::BANKRUPT;

    let arg = GameCommandArg::CreateTree(TreePlacementArgs {
        pos: TilePos::new(12, 12),
        object: 0,
    });
    let result = apply(&mut state, &arg);
    assert!(result.outcome.is_err());
    assert_eq!(result.context.error_text, string_ids::COMPANY_IS_BANKRUPT);
}

#[test]
fn ai_company_quietly_extends_its_loan_to_commit() {
    let mut state = world();
    let rival = CompanyId(1);
    let mut company = Company::new("Rival Haulage", "I. K. Brunel", Money(500), Money(0));
    company.flags |= CompanyFlags::AI;
    state.companies.insert(rival, company);

    let arg = GameCommandArg::CreateIndustry(IndustryPlacementArgs {
        pos: TilePos::new(12, 12),
        kind: 0,
    });
    let result = apply_as(&mut state, rival, &arg, CommandFlags::APPLY);
    assert_eq!(result.outcome, Ok(Money(12_000)));

    let company = state.company(rival).unwrap();
    // 11_500 short, rounded up to the next thousand.
    assert_eq!(company.current_loan, Money(12_000));
    assert_eq!(company.cash, Money(500));
    assert_eq!(
        company.expenditures[ExpenditureType::Miscellaneous.index()],
        Money(-12_000)
    );
}

#[test]
fn query_affordability_does_not_move_the_ai_loan() {
    let mut state = world();
    let rival = CompanyId(1);
    let mut company = Company::new("Rival Haulage", "I. K. Brunel", Money(500), Money(0));
    company.flags |= CompanyFlags::AI;
    state.companies.insert(rival, company);

    let arg = GameCommandArg::CreateIndustry(IndustryPlacementArgs {
        pos: TilePos::new(12, 12),
        kind: 0,
    });
    let result = apply_as(&mut state, rival, &arg, CommandFlags::empty());
    assert_eq!(result.outcome, Ok(Money(12_000)));
    assert_eq!(state.company(rival).unwrap().current_loan, Money(0));
}

#[test]
fn inflation_raises_reported_costs() {
    let mut state = world();
    let arg = GameCommandArg::CreateIndustry(IndustryPlacementArgs {
        pos: TilePos::new(12, 12),
        kind: 0,
    });
    let before = query(&mut state, &arg).outcome.unwrap();
    for _ in 0..12 {
        state.economy.update_monthly();
    }
    let after = query(&mut state, &arg).outcome.unwrap();
    assert!(after > before);
}

#[test]
fn payment_is_posted_against_the_handler_chosen_category() {
    let mut state = world();
    apply(
        &mut state,
        &GameCommandArg::CreateTree(TreePlacementArgs {
            pos: TilePos::new(12, 12),
            object: 0,
        }),
    );
    let company = state.company(PLAYER).unwrap();
    assert_eq!(
        company.expenditures[ExpenditureType::Construction.index()],
        Money(-40)
    );
    assert_eq!(
        company.expenditures[ExpenditureType::Miscellaneous.index()],
        Money::ZERO
    );
}
