//! Ledger: simulated bankroll per strategy and scenario.
//!
//! Every strategy keeps one [`BettingSession`] per scenario it owns. Each
//! committed spin settles the bet the strategy would have placed on the
//! window that preceded it, and undo reverses that settlement.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Configuration;
use crate::strategy::rules;
use crate::strategy::sizing::{StakePlan, StakeSizer};
use crate::types::{BetResult, BettingMode, DozenStakeMode, Play, ScenarioKind, SpinOutcome, Strategy};

// ---------------------------------------------------------------------------
// Bet record
// ---------------------------------------------------------------------------

/// One settled simulated bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    pub round: u32,
    pub play: Play,
    pub main_stake: Decimal,
    pub zero_stake: Decimal,
    pub total_risk: Decimal,
    pub outcome: SpinOutcome,
    pub result: BetResult,
    pub profit: Decimal,
    /// Session balance after settlement.
    pub balance: Decimal,
    pub betting_mode: BettingMode,
    pub dozen_stake_mode: Option<DozenStakeMode>,
    /// Chronological position of the settling spin in the outcome log.
    pub spin_index: usize,
    pub settled_at: DateTime<Utc>,
}

/// Profit and result of a wager against the spin that settles it.
/// `None` when the zero payout overflows.
pub fn settle_amount(
    play: &Play,
    plan: &StakePlan,
    outcome: SpinOutcome,
    zero_payout_multiplier: Decimal,
) -> Option<(BetResult, Decimal)> {
    if outcome.is_zero() {
        if plan.zero_stake > Decimal::ZERO {
            let profit = plan
                .zero_stake
                .checked_mul(zero_payout_multiplier + Decimal::ONE)?
                .checked_sub(plan.total_risk)?;
            if profit > Decimal::ZERO {
                return Some((BetResult::Win, profit));
            }
        }
        return Some((BetResult::Loss, -plan.total_risk));
    }
    if play.covers(outcome) {
        Some((BetResult::Win, plan.potential_profit))
    } else {
        Some((BetResult::Loss, -plan.total_risk))
    }
}

// ---------------------------------------------------------------------------
// Betting session
// ---------------------------------------------------------------------------

/// Simulated bankroll state of one strategy under one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingSession {
    /// Number of the next bet, starting at 1.
    pub round_counter: u32,
    /// Sum of total risk lost since the last win.
    pub accumulated_loss: Decimal,
    pub total_profit: Decimal,
    pub balance: Decimal,
    /// Zero coverage is armed while the balance stays at or above this.
    pub next_zero_coverage_threshold: Decimal,
    /// Settled bets, newest first.
    pub history: VecDeque<BetRecord>,
}

impl BettingSession {
    pub fn new(config: &Configuration) -> Self {
        Self {
            round_counter: 1,
            accumulated_loss: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            balance: config.start_balance,
            next_zero_coverage_threshold: config.start_balance,
            history: VecDeque::new(),
        }
    }

    /// Re-seed the bankroll from a new configuration. Sessions that have
    /// already settled a bet are left alone.
    pub fn reseed(&mut self, config: &Configuration) {
        if !self.history.is_empty() {
            return;
        }
        self.balance = config.start_balance;
        self.next_zero_coverage_threshold = config.start_balance - config.zero_threshold_amount;
    }

    pub fn latest(&self) -> Option<&BetRecord> {
        self.history.front()
    }

    pub fn bets(&self) -> usize {
        self.history.len()
    }

    /// Record a settled wager and update the bankroll.
    ///
    /// Returns `None` and leaves the session untouched when any bankroll
    /// figure would overflow.
    pub fn settle(
        &mut self,
        play: &Play,
        plan: &StakePlan,
        outcome: SpinOutcome,
        kind: ScenarioKind,
        spin_index: usize,
        config: &Configuration,
    ) -> Option<&BetRecord> {
        let (result, profit) = settle_amount(play, plan, outcome, config.zero_payout_multiplier)?;

        let balance = self.balance.checked_add(profit)?;
        let total_profit = self.total_profit.checked_add(profit)?;
        let (accumulated_loss, threshold) = match result {
            BetResult::Loss => (
                self.accumulated_loss.checked_add(plan.total_risk)?,
                self.next_zero_coverage_threshold,
            ),
            BetResult::Win => (
                Decimal::ZERO,
                balance.checked_sub(config.zero_threshold_amount)?,
            ),
        };

        self.balance = balance;
        self.total_profit = total_profit;
        self.accumulated_loss = accumulated_loss;
        self.next_zero_coverage_threshold = threshold;

        let record = BetRecord {
            round: self.round_counter,
            play: play.clone(),
            main_stake: plan.main_stake,
            zero_stake: plan.zero_stake,
            total_risk: plan.total_risk,
            outcome,
            result,
            profit,
            balance,
            betting_mode: kind.betting_mode(),
            dozen_stake_mode: kind.dozen_stake_mode(),
            spin_index,
            settled_at: Utc::now(),
        };
        self.round_counter += 1;
        self.history.push_front(record);
        self.history.front()
    }

    /// Reverse the newest bet if it was settled by `outcome` at `spin_index`.
    ///
    /// The loss accumulator is restored approximately: a reversed loss is
    /// subtracted, a reversed win leaves it at zero. The zero coverage
    /// threshold is not restored.
    pub fn reverse(&mut self, outcome: SpinOutcome, spin_index: usize) -> Option<BetRecord> {
        let matches = self
            .latest()
            .is_some_and(|bet| bet.outcome == outcome && bet.spin_index == spin_index);
        if !matches {
            return None;
        }
        let bet = self.history.pop_front()?;

        self.balance -= bet.profit;
        self.total_profit -= bet.profit;
        self.round_counter = self.round_counter.saturating_sub(1).max(1);
        self.accumulated_loss = match bet.result {
            BetResult::Loss => (self.accumulated_loss - bet.total_risk).max(Decimal::ZERO),
            BetResult::Win => Decimal::ZERO,
        };
        Some(bet)
    }
}

// ---------------------------------------------------------------------------
// Strategy ledger
// ---------------------------------------------------------------------------

/// Whether a scenario is simulated under the current configuration.
pub fn simulates(kind: ScenarioKind, config: &Configuration) -> bool {
    kind != ScenarioKind::HalvesAdvanced || config.advanced_halves_enabled
}

/// All scenario sessions of one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyLedger {
    pub strategy: Strategy,
    pub sessions: BTreeMap<ScenarioKind, BettingSession>,
}

impl StrategyLedger {
    pub fn new(strategy: Strategy, config: &Configuration) -> Self {
        let sessions = ScenarioKind::for_strategy(strategy)
            .iter()
            .map(|kind| (*kind, BettingSession::new(config)))
            .collect();
        Self { strategy, sessions }
    }

    pub fn session(&self, kind: ScenarioKind) -> Option<&BettingSession> {
        self.sessions.get(&kind)
    }

    /// Settle every simulated scenario against `outcome`.
    ///
    /// `window` is the analysis window that preceded the spin, newest first.
    /// Returns the number of bets settled.
    pub fn settle_spin(
        &mut self,
        window: &[SpinOutcome],
        outcome: SpinOutcome,
        spin_index: usize,
        config: &Configuration,
    ) -> usize {
        let sizer = StakeSizer::new(config);
        let mut settled = 0;

        for (kind, session) in self.sessions.iter_mut() {
            if !simulates(*kind, config) {
                continue;
            }
            // A bet for this spin already exists.
            if session.latest().is_some_and(|bet| bet.spin_index >= spin_index) {
                continue;
            }

            let mode = kind.betting_mode();
            let dozen_mode = kind.dozen_stake_mode().unwrap_or(config.dozen_stake_mode);
            let analysis = rules::evaluate(
                window,
                self.strategy,
                mode,
                *kind == ScenarioKind::HalvesAdvanced,
                dozen_mode,
            );
            let Some(play) = analysis.play().cloned() else {
                continue;
            };
            let Some(plan) = sizer.size(&analysis, session, mode, dozen_mode) else {
                continue;
            };

            let Some(bet) = session.settle(&play, &plan, outcome, *kind, spin_index, config) else {
                warn!(
                    strategy = %self.strategy,
                    scenario = %kind,
                    main = %plan.main_stake,
                    "Settlement overflowed, bet skipped"
                );
                continue;
            };
            debug!(
                strategy = %self.strategy,
                scenario = %kind,
                round = bet.round,
                play = %bet.play,
                outcome = %outcome,
                result = %bet.result,
                profit = %bet.profit,
                balance = %bet.balance,
                "Bet settled"
            );
            settled += 1;
        }
        settled
    }

    /// Reverse bets settled by the removed spin. Returns how many were undone.
    pub fn undo_spin(&mut self, outcome: SpinOutcome, spin_index: usize) -> usize {
        self.sessions
            .values_mut()
            .filter_map(|session| session.reverse(outcome, spin_index))
            .count()
    }

    pub fn reset(&mut self, config: &Configuration) {
        for session in self.sessions.values_mut() {
            *session = BettingSession::new(config);
        }
    }

    pub fn reseed(&mut self, config: &Configuration) {
        for session in self.sessions.values_mut() {
            session.reseed(config);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
