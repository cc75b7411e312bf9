//! Performance metrics for a simulated betting session.
//!
//! Computes win rate, P&L, ROI, profit factor, maximum drawdown and
//! streaks from a session's settled bets.

use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::ledger::{BetRecord, BettingSession};
use crate::types::{BetResult, ScenarioKind, Strategy};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Statistics of one strategy under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub strategy: Strategy,
    pub scenario: ScenarioKind,
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage of bets won.
    pub win_rate: f64,
    pub total_profit: Decimal,
    /// Profit as a percentage of the start balance.
    pub profit_pct: f64,
    pub final_balance: Decimal,
    /// Sum of total risk over all bets.
    pub total_invested: Decimal,
    pub roi_pct: f64,
    /// Gross winnings over gross losses; `None` without any losing bet.
    pub profit_factor: Option<f64>,
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: f64,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
}

impl ScenarioReport {
    pub fn from_session(
        strategy: Strategy,
        scenario: ScenarioKind,
        session: &BettingSession,
        start_balance: Decimal,
    ) -> Self {
        // Session history is newest first.
        let bets: Vec<&BetRecord> = session.history.iter().rev().collect();

        let wins = bets.iter().filter(|b| b.result == BetResult::Win).count();
        let losses = bets.len() - wins;
        let total_invested = saturating_sum(bets.iter().map(|b| b.total_risk));
        let gross_win = saturating_sum(
            bets.iter()
                .filter(|b| b.profit > Decimal::ZERO)
                .map(|b| b.profit),
        );
        let gross_loss = saturating_sum(
            bets.iter()
                .filter(|b| b.profit < Decimal::ZERO)
                .map(|b| -b.profit),
        );

        let (longest_win_streak, longest_loss_streak) = streaks(bets.iter().map(|b| b.result));
        let (max_drawdown, max_drawdown_pct) =
            max_drawdown(bets.iter().map(|b| b.balance), start_balance);

        Self {
            strategy,
            scenario,
            total_bets: bets.len(),
            wins,
            losses,
            win_rate: if bets.is_empty() {
                0.0
            } else {
                wins as f64 / bets.len() as f64 * 100.0
            },
            total_profit: session.total_profit,
            profit_pct: percent(session.total_profit, start_balance),
            final_balance: session.balance,
            total_invested,
            roi_pct: percent(session.total_profit, total_invested),
            profit_factor: (gross_loss > Decimal::ZERO).then(|| ratio(gross_win, gross_loss)),
            max_drawdown,
            max_drawdown_pct,
            longest_win_streak,
            longest_loss_streak,
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pf = self
            .profit_factor
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        write!(
            f,
            "{:<16} {:<16} bets={:<4} win={:>5.1}% profit={:>9} ({:+.1}%) balance={:>9} roi={:+.1}% pf={} dd={} ({:.1}%) streaks={}W/{}L",
            self.strategy.to_string(),
            self.scenario.to_string(),
            self.total_bets,
            self.win_rate,
            self.total_profit.round_dp(2),
            self.profit_pct,
            self.final_balance.round_dp(2),
            self.roi_pct,
            pf,
            self.max_drawdown.round_dp(2),
            self.max_drawdown_pct,
            self.longest_win_streak,
            self.longest_loss_streak,
        )
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Totals can run past `Decimal::MAX` across many recovery cycles.
fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn ratio(value: Decimal, base: Decimal) -> f64 {
    match value.checked_div(base) {
        Some(r) => r.to_f64().unwrap_or(0.0),
        None => value.to_f64().unwrap_or(0.0) / base.to_f64().unwrap_or(1.0),
    }
}

fn percent(value: Decimal, base: Decimal) -> f64 {
    if base > Decimal::ZERO {
        ratio(value, base) * 100.0
    } else {
        0.0
    }
}

/// Longest runs of wins and losses, in chronological order.
pub fn streaks(results: impl IntoIterator<Item = BetResult>) -> (usize, usize) {
    let (mut best_win, mut best_loss) = (0, 0);
    let (mut win, mut loss) = (0, 0);
    for result in results {
        match result {
            BetResult::Win => {
                win += 1;
                loss = 0;
                best_win = best_win.max(win);
            }
            BetResult::Loss => {
                loss += 1;
                win = 0;
                best_loss = best_loss.max(loss);
            }
        }
    }
    (best_win, best_loss)
}

/// Largest peak-to-trough fall in balance, and that fall as a percentage
/// of its peak. The peak starts at `start_balance`.
pub fn max_drawdown(
    balances: impl IntoIterator<Item = Decimal>,
    start_balance: Decimal,
) -> (Decimal, f64) {
    let mut peak = start_balance;
    let mut max_dd = Decimal::ZERO;
    let mut max_dd_pct = 0.0;
    for balance in balances {
        if balance > peak {
            peak = balance;
        }
        let dd = peak.saturating_sub(balance);
        if dd > max_dd {
            max_dd = dd;
            max_dd_pct = percent(dd, peak);
        }
    }
    (max_dd, max_dd_pct)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
