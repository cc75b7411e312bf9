//! Configuration loading from TOML and runtime configuration patches.
//!
//! `config.toml` deserializes into strongly-typed structs. Every engine
//! field has a default, so a partial (or empty) file is valid. Values are
//! checked by [`Configuration::validate`] before the engine ever sees them.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;

use crate::types::{BettingMode, DozenStakeMode, EngineError, Strategy};

/// Minimum number of outcomes any analysis needs.
pub const MIN_WINDOW: usize = 5;

// ---------------------------------------------------------------------------
// File-level configuration
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: Configuration,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub betting_mode: BettingMode,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {path}"))?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Staking and analysis settings shared by every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Risk management on/off. No stake plans are produced while off.
    pub active: bool,
    pub initial_stake: Decimal,
    /// Smallest stake increment; every stake rounds up to a multiple of it.
    pub min_chip: Decimal,
    /// Recover losses plus `desired_gain` instead of plus `initial_stake`.
    pub secure_gain_enabled: bool,
    pub desired_gain: Decimal,
    pub cover_zero_enabled: bool,
    /// Divisor for the zero side stake, and the balance step that re-arms it.
    pub zero_threshold_amount: Decimal,
    pub zero_payout_multiplier: Decimal,
    pub start_balance: Decimal,
    pub odds_single_dozen: Decimal,
    pub odds_double_dozen: Decimal,
    pub odds_half: Decimal,
    pub advanced_halves_enabled: bool,
    pub analysis_window_size: usize,
    pub active_strategies: BTreeSet<Strategy>,
    pub dozen_stake_mode: DozenStakeMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            active: false,
            initial_stake: dec!(1),
            min_chip: dec!(0.1),
            secure_gain_enabled: false,
            desired_gain: dec!(5),
            cover_zero_enabled: false,
            zero_threshold_amount: dec!(10),
            zero_payout_multiplier: dec!(35),
            start_balance: dec!(100),
            odds_single_dozen: dec!(2),
            odds_double_dozen: dec!(0.5),
            odds_half: dec!(1),
            advanced_halves_enabled: false,
            analysis_window_size: 60,
            active_strategies: BTreeSet::from([Strategy::Hybrid]),
            dozen_stake_mode: DozenStakeMode::Double,
        }
    }
}

impl Configuration {
    /// Reject settings the staking arithmetic cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("initial_stake", self.initial_stake),
            ("min_chip", self.min_chip),
            ("zero_threshold_amount", self.zero_threshold_amount),
            ("odds_single_dozen", self.odds_single_dozen),
            ("odds_double_dozen", self.odds_double_dozen),
            ("odds_half", self.odds_half),
        ];
        for (field, value) in positive {
            if value <= Decimal::ZERO {
                return Err(EngineError::Config {
                    field,
                    reason: "must be positive",
                });
            }
        }

        let non_negative = [
            ("desired_gain", self.desired_gain),
            ("zero_payout_multiplier", self.zero_payout_multiplier),
            ("start_balance", self.start_balance),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EngineError::Config {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        if self.analysis_window_size == 0 {
            return Err(EngineError::Config {
                field: "analysis_window_size",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Odds paid on the main wager for a betting mode / submode.
    pub fn odds_for(&self, mode: BettingMode, dozen_mode: DozenStakeMode) -> Decimal {
        match (mode, dozen_mode) {
            (BettingMode::Halves, _) => self.odds_half,
            (BettingMode::Dozens, DozenStakeMode::Single) => self.odds_single_dozen,
            (BettingMode::Dozens, DozenStakeMode::Double) => self.odds_double_dozen,
        }
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// A partial update to the configuration. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub active: Option<bool>,
    pub initial_stake: Option<Decimal>,
    pub min_chip: Option<Decimal>,
    pub secure_gain_enabled: Option<bool>,
    pub desired_gain: Option<Decimal>,
    pub cover_zero_enabled: Option<bool>,
    pub zero_threshold_amount: Option<Decimal>,
    pub zero_payout_multiplier: Option<Decimal>,
    pub start_balance: Option<Decimal>,
    pub odds_single_dozen: Option<Decimal>,
    pub odds_double_dozen: Option<Decimal>,
    pub odds_half: Option<Decimal>,
    pub advanced_halves_enabled: Option<bool>,
    pub analysis_window_size: Option<usize>,
    pub active_strategies: Option<BTreeSet<Strategy>>,
    pub dozen_stake_mode: Option<DozenStakeMode>,
    /// Switching mode also prunes `active_strategies`.
    pub betting_mode: Option<BettingMode>,
}

impl ConfigPatch {
    /// Merge the patch over `base`, returning the new configuration.
    pub fn apply(&self, base: &Configuration) -> Configuration {
        let mut cfg = base.clone();
        if let Some(v) = self.active {
            cfg.active = v;
        }
        if let Some(v) = self.initial_stake {
            cfg.initial_stake = v;
        }
        if let Some(v) = self.min_chip {
            cfg.min_chip = v;
        }
        if let Some(v) = self.secure_gain_enabled {
            cfg.secure_gain_enabled = v;
        }
        if let Some(v) = self.desired_gain {
            cfg.desired_gain = v;
        }
        if let Some(v) = self.cover_zero_enabled {
            cfg.cover_zero_enabled = v;
        }
        if let Some(v) = self.zero_threshold_amount {
            cfg.zero_threshold_amount = v;
        }
        if let Some(v) = self.zero_payout_multiplier {
            cfg.zero_payout_multiplier = v;
        }
        if let Some(v) = self.start_balance {
            cfg.start_balance = v;
        }
        if let Some(v) = self.odds_single_dozen {
            cfg.odds_single_dozen = v;
        }
        if let Some(v) = self.odds_double_dozen {
            cfg.odds_double_dozen = v;
        }
        if let Some(v) = self.odds_half {
            cfg.odds_half = v;
        }
        if let Some(v) = self.advanced_halves_enabled {
            cfg.advanced_halves_enabled = v;
        }
        if let Some(v) = self.analysis_window_size {
            cfg.analysis_window_size = v;
        }
        if let Some(v) = &self.active_strategies {
            cfg.active_strategies = v.clone();
        }
        if let Some(v) = self.dozen_stake_mode {
            cfg.dozen_stake_mode = v;
        }
        if let Some(mode) = self.betting_mode {
            prune_strategies(&mut cfg.active_strategies, mode, cfg.advanced_halves_enabled);
        }
        cfg
    }

    /// Whether applying this patch can change an unplayed session's bankroll.
    pub fn touches_bankroll(&self) -> bool {
        self.active.is_some() || self.start_balance.is_some() || self.zero_threshold_amount.is_some()
    }
}

/// Keep only strategies that make sense in `mode`, never leaving the set empty.
pub fn prune_strategies(active: &mut BTreeSet<Strategy>, mode: BettingMode, advanced_halves: bool) {
    match mode {
        BettingMode::Dozens => {
            active.retain(|s| !s.is_half_native());
            if active.is_empty() {
                active.insert(Strategy::Hybrid);
            }
        }
        BettingMode::Halves if !advanced_halves => {
            active.retain(|s| s.is_half_native());
            if active.is_empty() {
                active.insert(Strategy::ColdHalf);
            }
        }
        BettingMode::Halves => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
