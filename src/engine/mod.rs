//! Core engine: the command/query facade over the outcome log and every
//! strategy's simulated ledgers.
//!
//! Commands take `&mut self`, so each one is applied as a whole before any
//! query can observe the state.

pub mod ledger;
pub mod outcome_log;

use rayon::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backtest::metrics::ScenarioReport;
use crate::config::{ConfigPatch, Configuration};
use crate::strategy::sizing::StakePlan;
use crate::strategy::{Advisor, AnalysisResult, Recommendation};
use crate::types::{BettingMode, EngineError, ScenarioKind, SpinOutcome, Strategy};
use ledger::{BettingSession, StrategyLedger};
use outcome_log::OutcomeLog;

pub struct Engine {
    config: Configuration,
    mode: BettingMode,
    log: OutcomeLog,
    /// One ledger per strategy, indexed by `Strategy::index()`.
    ledgers: Vec<StrategyLedger>,
    betting_active: bool,
    session_id: Uuid,
}

impl Engine {
    pub fn new(config: Configuration, mode: BettingMode) -> Result<Self, EngineError> {
        config.validate()?;
        let ledgers = Strategy::ALL
            .iter()
            .map(|s| StrategyLedger::new(*s, &config))
            .collect();
        let session_id = Uuid::new_v4();
        info!(
            session_id = %session_id,
            mode = %mode,
            active = config.active,
            strategies = config.active_strategies.len(),
            "Engine created"
        );
        Ok(Self {
            config,
            mode,
            log: OutcomeLog::new(),
            ledgers,
            betting_active: false,
            session_id,
        })
    }

    // -- Commands ----------------------------------------------------------

    /// Record a spin. When simulation is live, every strategy also settles
    /// the bet it would have placed on the preceding window.
    pub fn add_outcome(&mut self, outcome: SpinOutcome) {
        let window = self.log.window(self.config.analysis_window_size);
        let spin_index = self.log.push(outcome);
        let mut settled: usize = 0;

        if self.is_simulating() {
            let config = &self.config;
            settled = self
                .ledgers
                .par_iter_mut()
                .map(|ledger| ledger.settle_spin(&window, outcome, spin_index, config))
                .sum();
        }

        info!(
            session_id = %self.session_id,
            outcome = %outcome,
            spin = spin_index,
            bets_settled = settled,
            "Outcome added"
        );
    }

    /// Remove the newest spin and reverse the bets it settled.
    /// Returns the removed spin, or `None` when the log is empty.
    pub fn undo(&mut self) -> Option<SpinOutcome> {
        let Some(outcome) = self.log.pop() else {
            warn!(session_id = %self.session_id, "Nothing to undo");
            return None;
        };
        let spin_index = self.log.len();
        let reversed: usize = self
            .ledgers
            .iter_mut()
            .map(|ledger| ledger.undo_spin(outcome, spin_index))
            .sum();
        info!(
            session_id = %self.session_id,
            outcome = %outcome,
            spin = spin_index,
            bets_reversed = reversed,
            "Outcome undone"
        );
        Some(outcome)
    }

    /// Reset every ledger and pause betting. The outcome log is kept.
    pub fn reset_session(&mut self) {
        for ledger in &mut self.ledgers {
            ledger.reset(&self.config);
        }
        self.betting_active = false;
        let previous = std::mem::replace(&mut self.session_id, Uuid::new_v4());
        info!(
            session_id = %self.session_id,
            previous = %previous,
            start_balance = %self.config.start_balance,
            "Session reset"
        );
    }

    /// Merge a partial configuration. On a validation error nothing changes.
    pub fn set_configuration(&mut self, patch: ConfigPatch) -> Result<(), EngineError> {
        let next = patch.apply(&self.config);
        next.validate()?;

        self.config = next;
        if let Some(mode) = patch.betting_mode {
            self.mode = mode;
        }
        if patch.touches_bankroll() && self.config.active {
            for ledger in &mut self.ledgers {
                ledger.reseed(&self.config);
            }
        }
        info!(
            session_id = %self.session_id,
            mode = %self.mode,
            active = self.config.active,
            dozen_mode = %self.config.dozen_stake_mode,
            strategies = self.config.active_strategies.len(),
            "Configuration updated"
        );
        Ok(())
    }

    /// Start or pause the simulated betting.
    pub fn set_betting_active(&mut self, on: bool) {
        self.betting_active = on;
        info!(session_id = %self.session_id, betting = on, "Betting switched");
    }

    // -- Queries -----------------------------------------------------------

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn betting_mode(&self) -> BettingMode {
        self.mode
    }

    pub fn is_betting_active(&self) -> bool {
        self.betting_active
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether committed spins currently settle simulated bets.
    pub fn is_simulating(&self) -> bool {
        self.config.active && self.betting_active
    }

    /// The shared outcome log, newest first.
    pub fn outcome_history(&self) -> Vec<SpinOutcome> {
        self.log.newest_first()
    }

    /// The latest `count` spins, newest first.
    pub fn recent_outcomes(&self, count: usize) -> Vec<SpinOutcome> {
        self.log.window(count)
    }

    pub fn spin_count(&self) -> usize {
        self.log.len()
    }

    pub fn ledger(&self, strategy: Strategy) -> &StrategyLedger {
        &self.ledgers[strategy.index()]
    }

    /// The session shown for a strategy under the current display settings.
    pub fn session(&self, strategy: Strategy) -> Option<&BettingSession> {
        self.session_for(strategy, self.viewed_scenario(strategy))
    }

    pub fn session_for(&self, strategy: Strategy, kind: ScenarioKind) -> Option<&BettingSession> {
        self.ledger(strategy).session(kind)
    }

    pub fn viewed_scenario(&self, strategy: Strategy) -> ScenarioKind {
        ScenarioKind::select(strategy, self.mode, self.config.dozen_stake_mode)
    }

    /// The strategy whose bankroll drives the displayed stake plan.
    pub fn primary_strategy(&self) -> Strategy {
        self.config
            .active_strategies
            .iter()
            .next()
            .copied()
            .unwrap_or(Strategy::Hybrid)
    }

    pub fn analysis(&self) -> AnalysisResult {
        self.advisor().analyze(&self.window())
    }

    pub fn stake_plan(&self) -> Option<StakePlan> {
        self.recommendation().stake
    }

    pub fn recommendation(&self) -> Recommendation {
        let advisor = self.advisor();
        let window = self.window();
        match self.session(self.primary_strategy()) {
            Some(session) => advisor.recommend(&window, session),
            None => Recommendation {
                analysis: advisor.analyze(&window),
                stake: None,
            },
        }
    }

    pub fn scenario_report(&self, strategy: Strategy, kind: ScenarioKind) -> Option<ScenarioReport> {
        self.session_for(strategy, kind)
            .map(|s| ScenarioReport::from_session(strategy, kind, s, self.config.start_balance))
    }

    /// Reports for every active strategy and every scenario it simulates.
    pub fn reports(&self) -> Vec<ScenarioReport> {
        let mut reports = Vec::new();
        for strategy in &self.config.active_strategies {
            for (kind, session) in &self.ledger(*strategy).sessions {
                if ledger::simulates(*kind, &self.config) {
                    reports.push(ScenarioReport::from_session(
                        *strategy,
                        *kind,
                        session,
                        self.config.start_balance,
                    ));
                }
            }
        }
        reports
    }

    fn window(&self) -> Vec<SpinOutcome> {
        self.log.window(self.config.analysis_window_size)
    }

    fn advisor(&self) -> Advisor<'_> {
        Advisor::new(&self.config, self.mode)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
