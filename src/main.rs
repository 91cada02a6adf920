use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use metacard_panel::PanelConfig;
use metacard_panel::replay::{Replay, Scenario};
use tracing_subscriber::EnvFilter;

/// Replay a selection/search scenario against the metacard panel and print
/// how its status flags evolve.
#[derive(Parser, Debug)]
#[command(name = "metacard-replay", version, about)]
struct Cli {
    /// Scenario file (JSON).
    scenario: PathBuf,

    /// Panel config file (TOML). Defaults to the user config location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the lifecycle throttle window.
    #[arg(long, value_name = "MS")]
    throttle_ms: Option<u64>,

    /// Print only the final summary instead of the flag timeline.
    #[arg(long)]
    summary: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("METACARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<PanelConfig> {
    let mut config = match &cli.config {
        Some(path) => PanelConfig::load_with_overrides(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PanelConfig::load().context("loading panel config")?,
    };
    // Command-line flags win over file and environment.
    if let Some(ms) = cli.throttle_ms {
        config.throttle_ms = ms;
        config.validate()?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;

    tracing::info!(
        scenario = ?scenario.name,
        steps = scenario.steps.len(),
        throttle_ms = config.throttle_ms,
        "replaying scenario"
    );
    let outcome = Replay::run(config, &scenario)?;

    if cli.summary {
        println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    } else {
        for entry in &outcome.timeline {
            println!("{}", serde_json::to_string(entry)?);
        }
    }
    Ok(())
}
