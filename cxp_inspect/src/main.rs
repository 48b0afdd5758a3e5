//! # CXP Register Inspector
//!
//! Lists register maps and converts between typed values and raw spans
//! without touching a device.
//!
//! # Usage
//!
//! ```bash
//! # Device summary and registers of the built-in Phantom S991 model
//! cxp_inspect info
//! cxp_inspect list
//!
//! # One register with its enum table, as JSON
//! cxp_inspect show PixelFormatReg --json
//!
//! # Decode a raw span
//! cxp_inspect decode PixelFormatReg "01 08 00 01"
//!
//! # Encode into a shared word
//! cxp_inspect encode TriggerModeReg TriggerModeOn --current 0x00050100
//!
//! # Custom model, verbose logging
//! cxp_inspect --model camera.toml -v list
//! ```

mod hex;
mod report;

use clap::{Parser, Subcommand};
use cxp_regmap::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::hex::{format_hex, parse_hex_bytes};
use crate::report::{DeviceSummary, RegisterRow, render_detail, render_table};

/// CXP Inspect - register map introspection and raw codec
#[derive(Parser, Debug)]
#[command(name = "cxp_inspect")]
#[command(version)]
#[command(about = "Inspect CoaXPress register maps and encode/decode raw register spans")]
#[command(long_about = None)]
struct Args {
    /// Device-model TOML file. Defaults to the built-in Phantom S991 model.
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show device name, description, base address and register count
    Info {
        #[arg(long)]
        json: bool,
    },
    /// List registers in registration order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one register with its enum table
    Show {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Decode a raw span given as hex
    Decode { name: String, hex: String },
    /// Encode a value into a raw span
    Encode {
        name: String,
        value: String,
        /// Current span contents, required for fields sharing a word
        #[arg(long, value_name = "HEX")]
        current: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("cxp_inspect failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    let map = load_map(args.model.as_deref())?;
    let output = execute(&map, &args.command)?;
    println!("{output}");
    Ok(())
}

fn load_map(model: Option<&Path>) -> Result<RegisterMap, ConfigError> {
    match model {
        Some(path) => {
            info!("Loading device model from {}", path.display());
            RegisterMap::load(path)
        }
        None => {
            debug!("Using built-in Phantom S991 model");
            phantom_s991()
        }
    }
}

/// Run a subcommand against `map` and return the text to print.
fn execute(map: &RegisterMap, command: &Command) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        Command::Info { json } => {
            let summary = DeviceSummary::new(map);
            if *json {
                Ok(serde_json::to_string_pretty(&summary)?)
            } else {
                Ok(summary.render())
            }
        }
        Command::List { json } => {
            let rows = map
                .enumerate()
                .map(|d| map.address_of(&d.name).map(|addr| RegisterRow::new(addr, d, false)))
                .collect::<Result<Vec<_>, RegisterError>>()?;
            if *json {
                Ok(serde_json::to_string_pretty(&rows)?)
            } else {
                Ok(render_table(&rows))
            }
        }
        Command::Show { name, json } => {
            let row = RegisterRow::new(map.address_of(name)?, map.lookup(name)?, true);
            if *json {
                Ok(serde_json::to_string_pretty(&row)?)
            } else {
                Ok(render_detail(&row))
            }
        }
        Command::Decode { name, hex } => {
            let raw = parse_hex_bytes(hex)?;
            let value = map.decode(name, &raw)?;
            let units = map.lookup(name)?.units.as_deref();
            Ok(match (units, &value) {
                (Some(units), RegisterValue::UInt(_) | RegisterValue::Float(_)) => {
                    format!("{name} = {value} {units}")
                }
                _ => format!("{name} = {value}"),
            })
        }
        Command::Encode {
            name,
            value,
            current,
        } => {
            let value = map.lookup(name)?.parse_value(value)?;
            let current = current.as_deref().map(parse_hex_bytes).transpose()?;
            let raw = map.encode(name, &value, current.as_deref())?;
            debug!("{} @ {:#010x} <- {}", name, map.address_of(name)?, value);
            Ok(format_hex(&raw))
        }
    }
}

/// Setup tracing subscriber based on CLI arguments. Logs go to stderr so
/// command output stays clean on stdout.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
