//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::recording_broker::{BrokerCall, RecordingBroker};
use crate::domain::bar::Bar;
use crate::domain::config::{load_strategy_config, EntryStyle, StrategyConfig};
use crate::domain::engine::StrategyEngine;
use crate::domain::error::StrategyError;
use crate::domain::order::{FillEvent, Intent, OrderAction, OrderRole};

#[derive(Parser, Debug)]
#[command(name = "renkotrader", about = "Bar-driven strategy engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a strategy configuration and print the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run a configuration over a bar file, filling entries and exits at the close
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        bars: PathBuf,
        #[arg(long, default_value_t = 0.25)]
        tick_size: f64,
        #[arg(long, default_value_t = 1.0)]
        point_value: f64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Replay {
            config,
            bars,
            tick_size,
            point_value,
        } => run_replay(&config, &bars, tick_size, point_value),
    }
}

pub fn load_config(path: &PathBuf) -> Result<StrategyConfig, ExitCode> {
    FileConfigAdapter::from_file(path)
        .and_then(|adapter| load_strategy_config(&adapter))
        .map_err(|err| {
            eprintln!("error: {}: {err}", path.display());
            ExitCode::from(&err)
        })
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("\nStrategy:     {} ({})", config.name, config.variant);
    match config.entry_style {
        EntryStyle::Momentum => {
            eprintln!(
                "Entry:        Williams %R({}) above {} / below {}",
                config.williams_period, config.overbought, config.oversold
            );
            if config.wma_filter {
                eprintln!("  filter:     close vs WMA({})", config.wma_period);
            }
            if config.bar_color_confirmation {
                eprintln!("  filter:     bar colour confirmation");
            }
        }
        EntryStyle::Supertrend => eprintln!(
            "Entry:        Supertrend(ATR {}, x{})",
            config.atr_period, config.supertrend_multiplier
        ),
    }
    eprintln!("Renko exit:   {}", on_off(config.renko_color_exit));
    eprintln!("Quantity:     {}", config.quantity);
    eprintln!("Trail stop:   {}", ticks(config.trailing_stop_ticks));
    eprintln!("Target:       {}", ticks(config.profit_target_ticks));
    eprintln!("Daily goal:   {}", amount(config.risk.daily_goal));
    eprintln!("Loss limit:   {}", amount(config.risk.daily_loss_limit));
    eprintln!("Flatten:      {}", on_off(config.risk.flatten_on_limit));
    if let Some(bars) = config.risk.cooldown_bars {
        eprintln!("Cooldown:     {bars} bars");
    }
    eprintln!("P&L source:   {:?}", config.risk.pnl_source);
    eprintln!("Session:      {} - {}", config.window.start, config.window.end);
    eprintln!("Warm-up:      {} bars", config.bars_required_to_trade);
    eprintln!("\nConfig is valid");
    ExitCode::SUCCESS
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn ticks(value: Option<u32>) -> String {
    value.map_or_else(|| "none".to_string(), |t| format!("{t} ticks"))
}

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "none".to_string(), |a| format!("{a:.2}"))
}

/// One executed intent during a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEvent {
    pub bar: Bar,
    pub intent: Intent,
}

#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub events: Vec<ReplayEvent>,
    /// Realized P&L at the end of each date seen in the bar stream.
    pub daily_pnl: BTreeMap<NaiveDate, f64>,
    pub round_trips: usize,
}

/// Drive a fresh engine over `bars`. Entry and exit requests fill in full at
/// the bar's close; trailing stops and targets are recorded but never fill.
pub fn replay_bars(
    config: StrategyConfig,
    bars: &[Bar],
    broker: &mut RecordingBroker,
) -> Result<ReplaySummary, StrategyError> {
    let mut engine = StrategyEngine::configure(config)?;
    let mut summary = ReplaySummary::default();

    for bar in bars {
        if let Some(intent) = engine.on_bar(bar, broker) {
            summary.events.push(ReplayEvent {
                bar: bar.clone(),
                intent,
            });
        }

        for call in broker.take_calls() {
            let fill = match call {
                BrokerCall::EnterLong(quantity) => close_fill(bar, quantity, OrderAction::Buy, OrderRole::Entry),
                BrokerCall::EnterShort(quantity) => close_fill(bar, quantity, OrderAction::Sell, OrderRole::Entry),
                BrokerCall::ExitLong => {
                    close_fill(bar, engine.position().quantity, OrderAction::Sell, OrderRole::Exit)
                }
                BrokerCall::ExitShort => {
                    close_fill(bar, engine.position().quantity, OrderAction::Buy, OrderRole::Exit)
                }
                BrokerCall::TrailingStop(_) | BrokerCall::ProfitTarget(_) => continue,
            };
            engine.on_fill(&fill)?;
            if fill.role == OrderRole::Exit {
                summary.round_trips += 1;
            }
        }

        summary
            .daily_pnl
            .insert(bar.date(), engine.daily_state().cumulative_realized_pnl);
    }

    Ok(summary)
}

fn close_fill(bar: &Bar, quantity: u32, action: OrderAction, role: OrderRole) -> FillEvent {
    FillEvent {
        price: bar.close,
        quantity,
        action,
        role,
        timestamp: bar.timestamp,
    }
}

fn run_replay(config_path: &PathBuf, bars_path: &PathBuf, tick_size: f64, point_value: f64) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("Loading bars from {}", bars_path.display());
    let bars = match CsvBarAdapter::new(bars_path, tick_size).read_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Replaying {} bars with {} ({})", bars.len(), config.name, config.variant);

    let mut broker = RecordingBroker::new(tick_size, point_value);
    let summary = match replay_bars(config, &bars, &mut broker) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for event in &summary.events {
        println!("{}  {:?}  @ {}", event.bar.timestamp, event.intent, event.bar.close);
    }

    eprintln!("\n=== Replay Summary ===");
    eprintln!("Intents:      {}", summary.events.len());
    eprintln!("Round trips:  {}", summary.round_trips);
    for (date, pnl) in &summary.daily_pnl {
        let sign = if *pnl >= 0.0 { "+" } else { "" };
        eprintln!("  {date}:  {sign}{pnl:.2}");
    }
    ExitCode::SUCCESS
}
