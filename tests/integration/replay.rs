//! Offline replay of recorded spin sequences.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use spinwise::backtest::runner::Replayer;
use spinwise::config::Configuration;
use spinwise::engine::Engine;
use spinwise::types::{BettingMode, ScenarioKind, SpinOutcome, Strategy};
use SpinOutcome::*;

/// A deterministic 120-spin sequence cycling through every outcome.
fn recorded_session() -> Vec<SpinOutcome> {
    let pattern = [D1, D3, D2Half1, D1, Zero, D3, D3, D2Half2, D1, D2Half1, D3, D1];
    pattern.iter().cycle().take(120).copied().collect()
}

#[test]
fn test_replay_matches_live_engine() {
    let spins = recorded_session();
    let cfg = Configuration {
        active: true,
        active_strategies: BTreeSet::from([Strategy::Hybrid, Strategy::Follower]),
        ..Configuration::default()
    };

    let report = Replayer::new(cfg.clone(), BettingMode::Dozens)
        .unwrap()
        .run(&spins)
        .unwrap();

    let mut engine = Engine::new(cfg, BettingMode::Dozens).unwrap();
    engine.set_betting_active(true);
    for spin in &spins {
        engine.add_outcome(*spin);
    }

    assert_eq!(report.spins, 120);
    assert_eq!(report.final_analysis, engine.analysis());
    for scenario in &report.scenarios {
        let live = engine
            .scenario_report(scenario.strategy, scenario.scenario)
            .unwrap();
        assert_eq!(live.total_bets, scenario.total_bets);
        assert_eq!(live.final_balance, scenario.final_balance);
    }
}

#[test]
fn test_replay_scenario_accounting() {
    let spins = recorded_session();
    let report = Replayer::new(Configuration::default(), BettingMode::Dozens)
        .unwrap()
        .run(&spins)
        .unwrap();

    for scenario in &report.scenarios {
        // Every spin after the minimum window settles one hybrid bet.
        assert_eq!(scenario.total_bets, spins.len() - 5);
        assert_eq!(scenario.wins + scenario.losses, scenario.total_bets);
        assert_eq!(scenario.final_balance, Decimal::from(100) + scenario.total_profit);
        assert!(scenario.total_invested > Decimal::ZERO);
        assert!(scenario.max_drawdown >= Decimal::ZERO);
    }
    assert!(report.best().is_some());
}

#[test]
fn test_replay_half_strategies() {
    let spins = recorded_session();
    let cfg = Configuration {
        active_strategies: BTreeSet::from([Strategy::ColdHalf, Strategy::HotHalf]),
        ..Configuration::default()
    };
    let report = Replayer::new(cfg, BettingMode::Halves)
        .unwrap()
        .run(&spins)
        .unwrap();

    assert_eq!(report.scenarios.len(), 2);
    assert!(report
        .scenarios
        .iter()
        .all(|r| r.scenario == ScenarioKind::HalvesStandard && r.total_bets > 0));
}
