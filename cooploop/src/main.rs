//! cooploop - run task scenarios on a cooperative scheduler

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use cooploop::cli::{Cli, Command, OutputFormat};
use cooploop::{ClockMode, Comparison, Config, RunSummary, Scenario, Scheduler};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cooploop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("cooploop.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.virtual_time {
        config.scheduler.clock = ClockMode::Virtual;
    }
    if let Some(unit_ms) = cli.unit_ms {
        config.scenario.time_unit_ms = unit_ms;
    }

    info!(clock = %config.scheduler.clock, unit_ms = config.scenario.time_unit_ms, "cooploop starting");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { path } => {
            let scenario = Scenario::load(&path).context(format!("Failed to load scenario {}", path.display()))?;
            cmd_run(&config, &scenario, cli.format)
        }
        Command::Demo { name } => {
            let scenario = Scenario::builtin(&name)?;
            cmd_run(&config, &scenario, cli.format)
        }
        Command::Compare { target } => {
            let scenario = Scenario::resolve(&target)?;
            cmd_compare(&config, &scenario, cli.format)
        }
        Command::List => cmd_list(),
    }
}

fn run_scenario(config: &Config, scenario: &Scenario) -> Result<RunSummary> {
    let unit = config.scenario.time_unit();
    let tasks = scenario.tasks(unit)?;

    let scheduler = Scheduler::from_config(config.scheduler.clone());
    let report = scheduler
        .run(tasks)
        .context(format!("Scenario '{}' failed", scenario.name))?;

    Ok(RunSummary::new(
        scenario,
        config.scheduler.clock,
        &report,
        unit,
        config.scenario.tolerance(),
    ))
}

fn cmd_run(config: &Config, scenario: &Scenario, format: OutputFormat) -> Result<()> {
    let summary = run_scenario(config, scenario)?;

    match format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if !summary.is_ok() {
        return Err(eyre::eyre!(
            "Scenario '{}' took {:.3}ms, outside tolerance of {}ms",
            scenario.name,
            summary.elapsed_ms,
            config.scenario.tolerance_ms
        ));
    }
    Ok(())
}

fn cmd_compare(config: &Config, scenario: &Scenario, format: OutputFormat) -> Result<()> {
    let cooperative = run_scenario(config, scenario)?;
    let blocking = run_scenario(config, &scenario.blocking())?;
    let comparison = Comparison::new(cooperative, blocking);

    match format {
        OutputFormat::Text => print!("{}", comparison.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
    }
    Ok(())
}

fn cmd_list() -> Result<()> {
    for name in Scenario::builtin_names() {
        let scenario = Scenario::builtin(name)?;
        println!(
            "{:<10} {}",
            name.cyan(),
            scenario.description.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}
