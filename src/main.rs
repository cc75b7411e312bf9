//! SPINWISE: Roulette dozens/halves analysis and bankroll simulation
//!
//! Entry point. Loads configuration, initialises structured logging and
//! runs an interactive command loop over stdin with graceful shutdown.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use spinwise::config::{self, ConfigPatch};
use spinwise::engine::Engine;
use spinwise::types::{BettingMode, DozenStakeMode, SpinOutcome};

const BANNER: &str = r#"
 ____  ____ ___ _   _ _      _ ___ ____  _____
/ ___||  _ \_ _| \ | \ \    / |_ _/ ___|| ____|
\___ \| |_) | ||  \| |\ \/\/ / | |\___ \|  _|
 ___) |  __/| || |\  | \    /  | | ___) | |___
|____/|_|  |___|_| \_|  \/\/  |___|____/|_____|

  Dozens / halves signal engine
  v0.1.0
"#;

const HELP: &str = "\
commands:
  d1 d2a d2b d3 0          add a spin
  undo                     remove the last spin
  reset                    reset every simulated bankroll
  start | pause            switch simulated betting on or off
  mode dozens|halves       change the betting mode
  stake single|double      change the dozen stake mode
  stats                    per-scenario statistics
  export                   per-scenario statistics as JSON
  help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let path = std::env::var("SPINWISE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = if Path::new(&path).exists() {
        config::AppConfig::load(&path)?
    } else {
        config::AppConfig::default()
    };

    init_logging();

    println!("{BANNER}");
    println!("{HELP}\n");
    info!(
        config = %path,
        mode = %cfg.session.betting_mode,
        active = cfg.engine.active,
        window = cfg.engine.analysis_window_size,
        "SPINWISE starting up"
    );

    let mut engine = Engine::new(cfg.engine, cfg.session.betting_mode)
        .context("Invalid engine configuration")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    print_recommendation(&engine);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match handle_command(&mut engine, line.trim()) {
                    Ok(Flow::Continue) => print_recommendation(&engine),
                    Ok(Flow::Quiet) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => warn!(error = %e, "Command rejected"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(
        session_id = %engine.session_id(),
        spins = engine.spin_count(),
        "SPINWISE shut down cleanly."
    );
    Ok(())
}

enum Flow {
    Continue,
    Quiet,
    Quit,
}

fn handle_command(engine: &mut Engine, line: &str) -> Result<Flow> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Flow::Quiet);
    };
    let arg = parts.next();

    match cmd.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        "help" | "?" => {
            println!("{HELP}");
            return Ok(Flow::Quiet);
        }
        "undo" => {
            engine.undo();
        }
        "reset" => engine.reset_session(),
        "start" => {
            if !engine.config().active {
                engine.set_configuration(ConfigPatch {
                    active: Some(true),
                    ..ConfigPatch::default()
                })?;
            }
            engine.set_betting_active(true);
        }
        "pause" => engine.set_betting_active(false),
        "mode" => {
            let mode = match arg {
                Some("dozens") => BettingMode::Dozens,
                Some("halves") => BettingMode::Halves,
                other => anyhow::bail!("expected `mode dozens|halves`, got {other:?}"),
            };
            engine.set_configuration(ConfigPatch {
                betting_mode: Some(mode),
                ..ConfigPatch::default()
            })?;
        }
        "stake" => {
            let dozen_mode = match arg {
                Some("single") => DozenStakeMode::Single,
                Some("double") => DozenStakeMode::Double,
                other => anyhow::bail!("expected `stake single|double`, got {other:?}"),
            };
            engine.set_configuration(ConfigPatch {
                dozen_stake_mode: Some(dozen_mode),
                ..ConfigPatch::default()
            })?;
        }
        "stats" => {
            print_stats(engine);
            return Ok(Flow::Quiet);
        }
        "export" => {
            let json = serde_json::to_string_pretty(&engine.reports())
                .context("Failed to serialize statistics")?;
            println!("{json}");
            return Ok(Flow::Quiet);
        }
        spin => {
            let outcome: SpinOutcome = spin.parse()?;
            engine.add_outcome(outcome);
        }
    }
    Ok(Flow::Continue)
}

/// Print the consensus signal and, when sized, the stake plan.
fn print_recommendation(engine: &Engine) {
    let rec = engine.recommendation();
    let history: Vec<String> = engine
        .recent_outcomes(12)
        .iter()
        .map(|o| o.to_string())
        .collect();

    println!(
        "[{} | {} | betting {}] last: {}",
        engine.betting_mode(),
        engine.config().dozen_stake_mode,
        if engine.is_betting_active() { "on" } else { "off" },
        if history.is_empty() { "-".to_string() } else { history.join(" ") }
    );
    println!("  {}: {}", rec.analysis.signal, rec.analysis.rationale);

    if let Some(plan) = rec.stake {
        let per_unit = plan
            .per_unit_stake
            .map(|u| format!(" ({u} each)"))
            .unwrap_or_default();
        println!(
            "  stake {}{} + zero {} = {} at risk, profit on win {}",
            plan.main_stake, per_unit, plan.zero_stake, plan.total_risk, plan.potential_profit
        );
    }

    if let Some(session) = engine.session(engine.primary_strategy()) {
        println!(
            "  {} balance {} (profit {}, round {})",
            engine.primary_strategy(),
            session.balance,
            session.total_profit,
            session.round_counter
        );
    }
}

fn print_stats(engine: &Engine) {
    let reports = engine.reports();
    if reports.is_empty() {
        println!("  no active strategies");
        return;
    }
    for report in reports {
        println!("  {report}");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spinwise=info"));

    let json_logging = std::env::var("SPINWISE_LOG_JSON").is_ok();

    // stdout is reserved for the command loop.
    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
