//! Strategy engine: frequency analysis, rule evaluation, consensus voting
//! and stake sizing.

pub mod consensus;
pub mod frequency;
pub mod rules;
pub mod sizing;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Configuration;
use crate::engine::ledger::BettingSession;
use crate::types::{BettingMode, Play, Signal, SpinOutcome};
use frequency::Frequencies;
use sizing::{StakePlan, StakeSizer};

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// Output of a single strategy or of the consensus vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub signal: Signal,
    /// Which rule fired and why. Advisory text.
    pub rationale: String,
    pub frequencies: Frequencies,
    pub window_size_used: usize,
}

impl AnalysisResult {
    pub fn is_opportunity(&self) -> bool {
        self.signal.is_opportunity()
    }

    pub fn play(&self) -> Option<&Play> {
        self.signal.play()
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// What the display layer shows after every committed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub analysis: AnalysisResult,
    pub stake: Option<StakePlan>,
}

/// Pipelines consensus voting → stake sizing for the current state.
///
/// Pure: it reads the log, configuration and one session, and never
/// mutates ledgers, so it can be re-run any number of times.
pub struct Advisor<'a> {
    config: &'a Configuration,
    mode: BettingMode,
}

impl<'a> Advisor<'a> {
    pub fn new(config: &'a Configuration, mode: BettingMode) -> Self {
        Self { config, mode }
    }

    pub fn analyze(&self, history: &[SpinOutcome]) -> AnalysisResult {
        consensus::run(history, self.config, self.mode)
    }

    pub fn plan(&self, analysis: &AnalysisResult, session: &BettingSession) -> Option<StakePlan> {
        StakeSizer::new(self.config).size(analysis, session, self.mode, self.config.dozen_stake_mode)
    }

    /// Run the full pipeline.
    pub fn recommend(&self, history: &[SpinOutcome], session: &BettingSession) -> Recommendation {
        let analysis = self.analyze(history);
        let stake = self.plan(&analysis, session);
        debug!(
            signal = %analysis.signal,
            staked = stake.is_some(),
            "Recommendation computed"
        );
        Recommendation { analysis, stake }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
