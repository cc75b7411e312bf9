//! Stake sizing.
//!
//! Turns a recommendation plus the simulated bankroll state into concrete
//! wager amounts: a loss-recovery main stake, an optional zero side stake,
//! and the projected profit on a win.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AnalysisResult;
use crate::config::Configuration;
use crate::engine::ledger::BettingSession;
use crate::types::{BettingMode, DozenStakeMode};

// ---------------------------------------------------------------------------
// Stake plan
// ---------------------------------------------------------------------------

/// Concrete wager amounts for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePlan {
    /// Total on the main wager, a whole number of chips per position.
    pub main_stake: Decimal,
    /// Amount on each dozen when the wager covers two dozens.
    pub per_unit_stake: Option<Decimal>,
    /// Side stake on zero, or zero when coverage is off or not armed.
    pub zero_stake: Decimal,
    pub total_risk: Decimal,
    pub potential_profit: Decimal,
}

/// Round up to the nearest multiple of `chip`. `None` on overflow.
pub fn round_up_to_chip(amount: Decimal, chip: Decimal) -> Option<Decimal> {
    amount.checked_div(chip)?.ceil().checked_mul(chip)
}

// ---------------------------------------------------------------------------
// Sizer
// ---------------------------------------------------------------------------

pub struct StakeSizer<'a> {
    config: &'a Configuration,
}

impl<'a> StakeSizer<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Size the wager for an analysis against a session's bankroll.
    ///
    /// Returns `None` when risk management is off, the analysis carries
    /// no play (wait, awaiting data, conflict, no active strategies), or
    /// the recovery stake no longer fits in a `Decimal`.
    ///
    /// After a loss the base stake must recover everything lost since the
    /// last win plus either the configured gain or one initial stake; it is
    /// then scaled by the mode's odds and rounded up to whole chips.
    pub fn size(
        &self,
        analysis: &AnalysisResult,
        session: &BettingSession,
        mode: BettingMode,
        dozen_mode: DozenStakeMode,
    ) -> Option<StakePlan> {
        if !self.config.active {
            return None;
        }
        analysis.play()?;

        let plan = self.plan(session, mode, dozen_mode);
        match &plan {
            Some(plan) => debug!(
                mode = %mode,
                dozen_mode = %dozen_mode,
                accumulated_loss = %session.accumulated_loss,
                main = %plan.main_stake,
                zero = %plan.zero_stake,
                profit = %plan.potential_profit,
                "Stake sized"
            ),
            None => warn!(
                mode = %mode,
                dozen_mode = %dozen_mode,
                accumulated_loss = %session.accumulated_loss,
                "Stake overflowed, skipping round"
            ),
        }
        plan
    }

    fn plan(
        &self,
        session: &BettingSession,
        mode: BettingMode,
        dozen_mode: DozenStakeMode,
    ) -> Option<StakePlan> {
        let cfg = self.config;
        let base = if session.accumulated_loss > Decimal::ZERO {
            let target = if cfg.secure_gain_enabled {
                cfg.desired_gain
            } else {
                cfg.initial_stake
            };
            session.accumulated_loss.checked_add(target)?
        } else {
            cfg.initial_stake
        };

        let units = match mode {
            BettingMode::Halves => 1,
            BettingMode::Dozens => dozen_mode.unit_count(),
        };
        let odds = cfg.odds_for(mode, dozen_mode);

        let stake = base.checked_div(odds)?.max(cfg.initial_stake);
        let raw_per_unit = if units > 1 {
            Some(stake.checked_div(Decimal::from(units))?)
        } else {
            None
        };

        let (main_stake, per_unit_stake) = match raw_per_unit {
            Some(per_unit) => {
                let chips = round_up_to_chip(per_unit, cfg.min_chip)?;
                (chips.checked_mul(Decimal::from(units))?, Some(chips))
            }
            None => (round_up_to_chip(stake, cfg.min_chip)?, None),
        };

        let zero_stake = if cfg.cover_zero_enabled
            && session.balance >= session.next_zero_coverage_threshold
        {
            round_up_to_chip(main_stake.checked_div(cfg.zero_threshold_amount)?, cfg.min_chip)?
        } else {
            Decimal::ZERO
        };

        let total_risk = main_stake.checked_add(zero_stake)?;
        // Projection always pays at single-dozen odds, whatever the mode.
        let unit_stake = raw_per_unit.unwrap_or(main_stake);
        let potential_profit = unit_stake
            .checked_mul(cfg.odds_single_dozen + Decimal::ONE)?
            .checked_sub(total_risk)?;

        Some(StakePlan {
            main_stake,
            per_unit_stake,
            zero_stake,
            total_risk,
            potential_profit,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
