//! Session flow: configure, start betting, record spins, undo and reset
//! through the same calls the interactive binary makes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use spinwise::config::{ConfigPatch, Configuration};
use spinwise::engine::Engine;
use spinwise::types::{BetResult, BettingMode, Dozen, DozenStakeMode, Play, ScenarioKind, Signal, SpinOutcome, Strategy};
use SpinOutcome::*;

/// Oldest first. Newest first it reads D1 D3 D1 D2a D3 D1 0 D2b D1 D3.
const OPENING: [SpinOutcome; 10] = [D3, D1, D2Half2, Zero, D1, D3, D2Half1, D1, D3, D1];

fn started_engine(config: Configuration) -> Engine {
    let mut engine = Engine::new(config, BettingMode::Dozens).unwrap();
    engine
        .set_configuration(ConfigPatch {
            active: Some(true),
            ..ConfigPatch::default()
        })
        .unwrap();
    engine.set_betting_active(true);
    engine
}

fn feed(engine: &mut Engine, spins: &[SpinOutcome]) {
    for spin in spins {
        engine.add_outcome(*spin);
    }
}

#[test]
fn test_cold_correction_example() {
    let mut engine = started_engine(Configuration {
        active_strategies: BTreeSet::from([Strategy::ColdCorrection]),
        ..Configuration::default()
    });
    feed(&mut engine, &OPENING);

    let analysis = engine.analysis();
    assert_eq!(analysis.frequencies.cold, vec![Dozen::D2]);
    assert_eq!(analysis.play(), Some(&Play::against(Dozen::D2)));
    assert_eq!(analysis.play().unwrap().to_string(), "D1 and D3");
    assert!(analysis.is_opportunity());
}

#[test]
fn test_first_loss_drives_recovery_stake() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);

    // Hybrid double bets against D2; a D2 spin loses it.
    let before = engine.session(Strategy::Hybrid).unwrap().clone();
    assert_eq!(before.bets(), 0);
    assert_eq!(before.accumulated_loss, Decimal::ZERO);
    engine.add_outcome(D2Half1);
    let session = engine.session(Strategy::Hybrid).unwrap();
    let bet = session.latest().unwrap();
    assert_eq!(bet.result, BetResult::Loss);
    assert_eq!(session.balance, before.balance - bet.total_risk);
    assert_eq!(session.accumulated_loss, bet.total_risk);

    let plan = engine.stake_plan().unwrap();
    let cfg = engine.config();
    assert!(plan.main_stake >= session.accumulated_loss / cfg.odds_double_dozen);
    assert_eq!(plan.main_stake % cfg.min_chip, Decimal::ZERO);
    assert_eq!(plan.per_unit_stake.unwrap() * dec!(2), plan.main_stake);
}

#[test]
fn test_consecutive_losses_escalate() {
    let mut engine = started_engine(Configuration {
        active_strategies: BTreeSet::from([Strategy::ColdCorrection]),
        ..Configuration::default()
    });
    feed(&mut engine, &OPENING);

    // Zero loses every uncovered bet.
    let mut last_loss = Decimal::ZERO;
    let mut last_stake = engine.stake_plan().unwrap().main_stake;
    for _ in 0..4 {
        engine.add_outcome(Zero);
        let session = engine.session(Strategy::ColdCorrection).unwrap();
        assert!(session.accumulated_loss > last_loss);
        last_loss = session.accumulated_loss;

        let stake = engine.stake_plan().unwrap().main_stake;
        assert!(stake > last_stake);
        last_stake = stake;
    }
}

#[test]
fn test_win_clears_accumulated_loss() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);
    engine.add_outcome(Zero);
    assert!(engine.session(Strategy::Hybrid).unwrap().accumulated_loss > Decimal::ZERO);

    // Still betting against D2, so D1 wins.
    engine.add_outcome(D1);
    let session = engine.session(Strategy::Hybrid).unwrap();
    assert_eq!(session.latest().unwrap().result, BetResult::Win);
    assert_eq!(session.accumulated_loss, Decimal::ZERO);
    assert_eq!(
        session.next_zero_coverage_threshold,
        session.balance - engine.config().zero_threshold_amount
    );
}

#[test]
fn test_zero_cover_pays_on_zero() {
    let mut engine = started_engine(Configuration {
        cover_zero_enabled: true,
        ..Configuration::default()
    });
    feed(&mut engine, &OPENING);

    let plan = engine.stake_plan().unwrap();
    assert!(plan.zero_stake > Decimal::ZERO);
    engine.add_outcome(Zero);
    let bet = engine.session(Strategy::Hybrid).unwrap().latest().cloned().unwrap();
    assert_eq!(bet.zero_stake, plan.zero_stake);
    assert_eq!(bet.result, BetResult::Win);
    assert_eq!(bet.profit, plan.zero_stake * dec!(36) - plan.total_risk);
}

#[test]
fn test_undo_then_replay_is_stable() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);
    engine.add_outcome(D3);
    let first = engine.session(Strategy::Hybrid).unwrap().latest().cloned().unwrap();

    engine.undo();
    engine.add_outcome(D3);
    let again = engine.session(Strategy::Hybrid).unwrap().latest().cloned().unwrap();
    assert_eq!(first.profit, again.profit);
    assert_eq!(first.round, again.round);
    assert_eq!(first.spin_index, again.spin_index);
}

#[test]
fn test_undo_all_returns_to_start() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);
    while engine.undo().is_some() {}

    assert!(engine.outcome_history().is_empty());
    for kind in [ScenarioKind::DozensSingle, ScenarioKind::DozensDouble] {
        let s = engine.session_for(Strategy::Hybrid, kind).unwrap();
        assert!(s.history.is_empty());
        assert_eq!(s.balance, dec!(100));
        assert_eq!(s.total_profit, Decimal::ZERO);
        assert_eq!(s.round_counter, 1);
    }
}

#[test]
fn test_pause_keeps_recording_spins() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING[..6]);
    engine.set_betting_active(false);
    feed(&mut engine, &OPENING[6..]);

    assert_eq!(engine.outcome_history().len(), 10);
    assert_eq!(engine.session(Strategy::Hybrid).unwrap().bets(), 1);
    // Undoing a spin recorded while paused leaves the ledger alone.
    engine.undo();
    assert_eq!(engine.session(Strategy::Hybrid).unwrap().bets(), 1);
}

#[test]
fn test_reset_then_restart() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);
    engine.reset_session();
    assert!(!engine.is_betting_active());

    engine.add_outcome(D1);
    assert!(engine.session(Strategy::Hybrid).unwrap().history.is_empty());

    engine.set_betting_active(true);
    engine.add_outcome(D1);
    let s = engine.session(Strategy::Hybrid).unwrap();
    assert_eq!(s.bets(), 1);
    assert_eq!(s.latest().unwrap().round, 1);
}

#[test]
fn test_stake_mode_switch_changes_view() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING);
    engine
        .set_configuration(ConfigPatch {
            dozen_stake_mode: Some(DozenStakeMode::Single),
            ..ConfigPatch::default()
        })
        .unwrap();

    assert_eq!(engine.viewed_scenario(Strategy::Hybrid), ScenarioKind::DozensSingle);
    assert_eq!(engine.analysis().play(), Some(&Play::single(Dozen::D2)));
    let plan = engine.stake_plan().unwrap();
    assert_eq!(plan.per_unit_stake, None);
}

#[test]
fn test_halves_mode_with_advanced_regime() {
    let mut engine = started_engine(Configuration {
        advanced_halves_enabled: true,
        ..Configuration::default()
    });
    engine
        .set_configuration(ConfigPatch {
            betting_mode: Some(BettingMode::Halves),
            ..ConfigPatch::default()
        })
        .unwrap();
    // Advanced regime keeps dozen strategies active in halves mode.
    assert!(engine.config().active_strategies.contains(&Strategy::Hybrid));

    feed(&mut engine, &OPENING);
    assert!(matches!(engine.analysis().play(), Some(Play::Half(_))));
    let s = engine.session(Strategy::Hybrid).unwrap();
    assert_eq!(engine.viewed_scenario(Strategy::Hybrid), ScenarioKind::HalvesAdvanced);
    assert!(s.bets() > 0);
}

#[test]
fn test_awaiting_data_then_signal() {
    let mut engine = started_engine(Configuration::default());
    feed(&mut engine, &OPENING[..4]);
    assert_eq!(engine.analysis().signal, Signal::AwaitingData);
    assert!(engine.stake_plan().is_none());
    engine.add_outcome(D1);
    assert!(engine.analysis().is_opportunity());
}

#[test]
fn test_long_zero_run_stops_recovery_without_panicking() {
    let mut engine = started_engine(Configuration::default());
    for _ in 0..120 {
        engine.add_outcome(Zero);
    }
    assert_eq!(engine.spin_count(), 120);
    assert!(engine.outcome_history().iter().all(|o| *o == Zero));

    let start = engine.config().start_balance;
    let mut longest = 0;
    for strategy in Strategy::ALL {
        for session in engine.ledger(strategy).sessions.values() {
            longest = longest.max(session.bets());
            assert!(session.accumulated_loss >= Decimal::ZERO);
            assert_eq!(session.round_counter as usize, session.bets() + 1);
            assert_eq!(session.balance, start + session.total_profit);
            let spins: Vec<usize> = session.history.iter().map(|b| b.spin_index).collect();
            assert!(spins.windows(2).all(|w| w[0] > w[1]));
            assert!(spins.iter().all(|i| *i < 120));
        }
    }
    // Recovery ran far enough to exhaust the Decimal range.
    assert!(longest >= 50);

    // Queries and undo still work on the saturated sessions.
    let _ = engine.recommendation();
    assert!(!engine.reports().is_empty());
    while engine.undo().is_some() {}
    for strategy in Strategy::ALL {
        for session in engine.ledger(strategy).sessions.values() {
            assert_eq!(session.bets(), 0);
            assert_eq!(session.balance, start);
            assert_eq!(session.accumulated_loss, Decimal::ZERO);
        }
    }
}
