//! Property tests over arbitrary spin sequences.

use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;

use spinwise::config::{ConfigPatch, Configuration};
use spinwise::engine::Engine;
use spinwise::strategy::consensus;
use spinwise::types::{self, BettingMode, Signal, SpinOutcome};

fn spins(max: usize) -> impl Strategy<Value = Vec<SpinOutcome>> {
    prop::collection::vec(select(SpinOutcome::ALL), 0..max)
}

fn live_engine(cover_zero: bool) -> Engine {
    let cfg = Configuration {
        active: true,
        cover_zero_enabled: cover_zero,
        active_strategies: types::Strategy::ALL
            .into_iter()
            .filter(|s| !s.is_half_native())
            .collect(),
        ..Configuration::default()
    };
    let mut engine = Engine::new(cfg, BettingMode::Dozens).unwrap();
    engine.set_betting_active(true);
    engine
}

proptest! {
    #[test]
    fn test_short_windows_never_signal(history in spins(5)) {
        let cfg = Configuration {
            active_strategies: types::Strategy::ALL.into_iter().collect(),
            ..Configuration::default()
        };
        let result = consensus::run(&history, &cfg, BettingMode::Dozens);
        prop_assert!(!result.is_opportunity());
        prop_assert_eq!(result.signal, Signal::AwaitingData);
    }

    #[test]
    fn test_stake_is_chip_multiple(history in spins(80), cover_zero in any::<bool>()) {
        let mut engine = live_engine(cover_zero);
        for spin in &history {
            engine.add_outcome(*spin);
            if let Some(plan) = engine.stake_plan() {
                let chip = engine.config().min_chip;
                prop_assert!(plan.main_stake >= Decimal::ZERO);
                prop_assert_eq!(plan.main_stake % chip, Decimal::ZERO);
                prop_assert_eq!(plan.zero_stake % chip, Decimal::ZERO);
                prop_assert_eq!(plan.total_risk, plan.main_stake + plan.zero_stake);
            }
        }
    }

    #[test]
    fn test_accumulated_loss_never_negative(history in spins(80)) {
        let mut engine = live_engine(true);
        for spin in &history {
            engine.add_outcome(*spin);
        }
        while engine.undo().is_some() {
            for strategy in types::Strategy::ALL {
                for session in engine.ledger(strategy).sessions.values() {
                    prop_assert!(session.accumulated_loss >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_undo_round_trip(history in spins(40), last in select(SpinOutcome::ALL)) {
        let mut engine = live_engine(false);
        for spin in &history {
            engine.add_outcome(*spin);
        }
        let log = engine.outcome_history();
        let before: Vec<_> = types::Strategy::ALL
            .iter()
            .map(|s| engine.ledger(*s).clone())
            .collect();

        engine.add_outcome(last);
        prop_assert_eq!(engine.undo(), Some(last));
        prop_assert_eq!(engine.outcome_history(), log);

        for (strategy, old) in types::Strategy::ALL.iter().zip(&before) {
            for (kind, session) in &engine.ledger(*strategy).sessions {
                let prior = &old.sessions[kind];
                prop_assert_eq!(&session.history, &prior.history);
                prop_assert_eq!(session.balance, prior.balance);
                prop_assert_eq!(session.total_profit, prior.total_profit);
                prop_assert_eq!(session.round_counter, prior.round_counter);
            }
        }
    }

    #[test]
    fn test_balance_tracks_history(history in spins(80)) {
        let mut engine = live_engine(true);
        engine
            .set_configuration(ConfigPatch {
                advanced_halves_enabled: Some(true),
                ..ConfigPatch::default()
            })
            .unwrap();
        for spin in &history {
            engine.add_outcome(*spin);
        }
        let start = engine.config().start_balance;
        for strategy in types::Strategy::ALL {
            for session in engine.ledger(strategy).sessions.values() {
                let sum: Decimal = session.history.iter().map(|b| b.profit).sum();
                prop_assert_eq!(session.total_profit, sum);
                prop_assert_eq!(session.balance, start + sum);
                prop_assert_eq!(session.round_counter as usize, session.history.len() + 1);
            }
        }
    }
}
