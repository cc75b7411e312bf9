//! Offline replay.
//!
//! Feeds a recorded spin sequence through a fresh engine with simulation
//! switched on, then collects the final consensus and every scenario's
//! performance.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::metrics::ScenarioReport;
use crate::config::Configuration;
use crate::engine::Engine;
use crate::strategy::AnalysisResult;
use crate::types::{BettingMode, EngineError, SpinOutcome};

// ---------------------------------------------------------------------------
// Replay results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub spins: usize,
    /// Consensus over the full sequence, as it would be shown next.
    pub final_analysis: AnalysisResult,
    pub scenarios: Vec<ScenarioReport>,
}

impl ReplayReport {
    /// The scenario with the highest total profit.
    pub fn best(&self) -> Option<&ScenarioReport> {
        self.scenarios.iter().max_by_key(|r| r.total_profit)
    }

    pub fn total_bets(&self) -> usize {
        self.scenarios.iter().map(|r| r.total_bets).sum()
    }
}

// ---------------------------------------------------------------------------
// Replayer
// ---------------------------------------------------------------------------

pub struct Replayer {
    config: Configuration,
    mode: BettingMode,
}

impl Replayer {
    /// Risk management is forced on; everything else is taken as given.
    pub fn new(config: Configuration, mode: BettingMode) -> Result<Self, EngineError> {
        let config = Configuration {
            active: true,
            ..config
        };
        config.validate()?;
        Ok(Self { config, mode })
    }

    /// Replay `spins`, given oldest first.
    pub fn run(&self, spins: &[SpinOutcome]) -> Result<ReplayReport, EngineError> {
        let mut engine = Engine::new(self.config.clone(), self.mode)?;
        engine.set_betting_active(true);
        for spin in spins {
            engine.add_outcome(*spin);
        }

        let report = ReplayReport {
            spins: spins.len(),
            final_analysis: engine.analysis(),
            scenarios: engine.reports(),
        };
        info!(
            spins = report.spins,
            scenarios = report.scenarios.len(),
            bets = report.total_bets(),
            signal = %report.final_analysis.signal,
            "Replay complete"
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dozen, Play, ScenarioKind, Strategy};
    use std::collections::BTreeSet;
    use SpinOutcome::*;

    const SPINS: [SpinOutcome; 10] = [D3, D1, D2Half2, Zero, D1, D3, D2Half1, D1, D3, D1];

    #[test]
    fn test_replay_forces_active() {
        let replayer = Replayer::new(Configuration::default(), BettingMode::Dozens).unwrap();
        let report = replayer.run(&SPINS).unwrap();
        assert_eq!(report.spins, 10);
        assert_eq!(report.final_analysis.play(), Some(&Play::against(Dozen::D2)));
        assert_eq!(report.scenarios.len(), 2);
        assert!(report.total_bets() > 0);
    }

    #[test]
    fn test_replay_short_sequence_has_no_bets() {
        let replayer = Replayer::new(Configuration::default(), BettingMode::Dozens).unwrap();
        let report = replayer.run(&SPINS[..5]).unwrap();
        assert_eq!(report.total_bets(), 0);
        assert!(report.best().is_some());
    }

    #[test]
    fn test_replay_all_strategies() {
        let cfg = Configuration {
            active_strategies: Strategy::ALL.into_iter().collect::<BTreeSet<_>>(),
            advanced_halves_enabled: true,
            ..Configuration::default()
        };
        let report = Replayer::new(cfg, BettingMode::Halves).unwrap().run(&SPINS).unwrap();
        // Five dozen strategies with three scenarios, two half strategies with one.
        assert_eq!(report.scenarios.len(), 17);
        assert!(report
            .scenarios
            .iter()
            .any(|r| r.scenario == ScenarioKind::HalvesAdvanced && r.total_bets > 0));
    }

    #[test]
    fn test_replay_rejects_invalid_config() {
        let cfg = Configuration {
            analysis_window_size: 0,
            ..Configuration::default()
        };
        assert!(Replayer::new(cfg, BettingMode::Dozens).is_err());
    }
}
