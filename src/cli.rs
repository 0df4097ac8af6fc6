//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::build_strategy_config;
use crate::domain::error::SigtraderError;
use crate::domain::presets;
use crate::domain::rule_parser;
use crate::domain::signal::SignalFrame;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::signal_sink::SignalSink;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Indicator-driven entry/exit signal generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and signals for one pair
    Run {
        /// Preset name or path to a strategy INI file
        #[arg(short, long)]
        strategy: String,
        /// Directory holding <PAIR>.csv files
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        pair: String,
        /// Write the populated frame as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List the built-in strategy presets
    List,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Dispatch a parsed command line.
pub fn execute(cli: Cli) -> Result<(), SigtraderError> {
    match cli.command {
        Command::Run {
            strategy,
            data,
            pair,
            output,
        } => run_signals(&strategy, &data, &pair, output.as_deref()),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::List => run_list(),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SigtraderError> {
    info!(path = %path.display(), "loading strategy file");
    FileConfigAdapter::from_file(path)
}

/// Build a strategy from an INI adapter, printing the offending rule text
/// with a caret when a rule fails to parse.
pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<StrategyConfig, SigtraderError> {
    for section in adapter.sections() {
        if let Some(id) = section.strip_prefix("indicator.") {
            let listed = adapter
                .get_string("strategy", "indicators")
                .is_some_and(|list| list.split(',').any(|s| s.trim() == id));
            if !listed {
                warn!(section = %section, "indicator section is not listed in [strategy] indicators");
            }
        }
    }

    build_strategy_config(adapter).inspect_err(|e| {
        if matches!(e, SigtraderError::RuleParse(_)) {
            for key in ["entry_long", "exit_long"] {
                let text = adapter.get_string("strategy", key).unwrap_or_default();
                if let Err(parse_err) = rule_parser::parse(&text) {
                    eprintln!(
                        "failed to parse {}:\n{}",
                        key,
                        parse_err.display_with_context(&text)
                    );
                }
            }
        }
    })
}

/// A built-in preset name, or else a path to an INI file.
pub fn resolve_strategy(spec: &str) -> Result<StrategyConfig, SigtraderError> {
    if let Some(preset) = presets::by_name(spec) {
        info!(preset = spec, "using built-in strategy");
        return preset;
    }
    let adapter = load_config(Path::new(spec))?;
    build_strategy(&adapter)
}

fn run_signals(
    strategy: &str,
    data_dir: &Path,
    pair: &str,
    output_path: Option<&Path>,
) -> Result<(), SigtraderError> {
    let config = resolve_strategy(strategy)?;
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let bars = adapter.fetch_bars(pair)?;
    info!(pair, bars = bars.len(), strategy = config.name(), "computing signals");

    let frame = SignalFrame::populate(&bars, pair, &config)?;
    print_summary(&frame, &config);

    if let Some(path) = output_path {
        adapter.write_frame(&frame, path)?;
        println!("Signals written to {}", path.display());
    }
    Ok(())
}

fn print_summary(frame: &SignalFrame, config: &StrategyConfig) {
    println!("Strategy:  {} ({})", config.name(), config.timeframe());
    println!("Pair:      {}", frame.pair());
    println!("Bars:      {}", frame.len());
    println!("Columns:   {}", frame.table().column_names().join(", "));
    println!("Entries:   {}", frame.entry_indices().len());
    println!("Exits:     {}", frame.exit_indices().len());
    if let Some(&i) = frame.entry_indices().last() {
        println!("Last entry at {}", frame.bars()[i].timestamp);
    }
    if let Some(&i) = frame.exit_indices().last() {
        println!("Last exit at  {}", frame.bars()[i].timestamp);
    }
}

fn run_validate(strategy_path: &Path) -> Result<(), SigtraderError> {
    let adapter = load_config(strategy_path)?;
    let config = build_strategy(&adapter)?;
    print_strategy(&config);
    println!("\nStrategy is valid.");
    Ok(())
}

fn print_strategy(config: &StrategyConfig) {
    println!("Strategy:    {}", config.name());
    if !config.description().is_empty() {
        println!("Description: {}", config.description());
    }
    println!("Timeframe:   {}", config.timeframe());
    println!("Stoploss:    {}", config.stoploss());
    println!("Minimal ROI: {}", config.minimal_roi());
    println!("\nIndicators:");
    for spec in config.indicators() {
        println!("  {:<40} -> {}", spec.algorithm.to_string(), spec.columns.join(", "));
    }
    println!("\nEntry Long Rule:\n  {}", config.entry_long());
    println!("\nExit Long Rule:\n  {}", config.exit_long());
}

fn run_list() -> Result<(), SigtraderError> {
    for name in presets::PRESET_NAMES {
        if let Some(preset) = presets::by_name(name) {
            let config = preset?;
            println!(
                "{:<16} {:>4}  stoploss {:>6}  roi {}",
                config.name(),
                config.timeframe().to_string(),
                config.stoploss(),
                config.minimal_roi()
            );
        }
    }
    Ok(())
}
