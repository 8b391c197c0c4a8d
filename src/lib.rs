pub mod config;
pub mod serial;
pub mod device;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use device::MuxController;
use serial::LinkSettings;

/// Routing sent when no mapping is given on the command line
pub const EXAMPLE_CONFIGURATION: [(i32, i32); 8] = [
  (6, 2),
  (3, 7),
  (4, 8),
  (5, 9),
  (10, 14),
  (11, 15),
  (12, 16),
  (17, 13),
];

/// Send a MUX configuration to the device on the default port and print
/// the outcome to stdout.
pub fn set_mux_configuration(config: &[(i32, i32)]) {
  let controller = MuxController::new(LinkSettings::default());
  let stdout = std::io::stdout();
  controller.set_mux_configuration(config, &mut stdout.lock());
}

/// Send a pin-mapping configuration to the Pico MUX
#[derive(Parser, Debug)]
#[command(name = "pico-mux", version, about, long_about = None)]
struct Args {
  /// Serial port of the device
  #[arg(short, long, default_value = serial::DEFAULT_PORT)]
  port: String,

  /// Baud rate
  #[arg(short, long, default_value_t = serial::BAUD_RATE)]
  baud: u32,

  /// Delay before reading the device response, in milliseconds
  #[arg(long, default_value_t = serial::SETTLE_DELAY.as_millis() as u64)]
  settle_ms: u64,

  /// Mapping as JSON pairs, e.g. '[[6,2],[3,7],...]'
  #[arg(short, long)]
  mapping: Option<String>,

  /// Enable debug messages
  #[arg(short, long)]
  verbose: bool,
}

pub fn run() -> anyhow::Result<()> {
  let args = Args::parse();

  env_logger::Builder::new()
    .filter_level(if args.verbose {
      log::LevelFilter::Debug
    } else {
      log::LevelFilter::Info
    })
    .init();

  let pairs: Vec<(i32, i32)> = match &args.mapping {
    Some(json) => serde_json::from_str(json)
      .context("--mapping must be a JSON array of [input, output] pairs")?,
    None => EXAMPLE_CONFIGURATION.to_vec(),
  };

  let settings = LinkSettings {
    port_name: args.port,
    baud_rate: args.baud,
    settle_delay: Duration::from_millis(args.settle_ms),
    ..LinkSettings::default()
  };

  log::info!("pico-mux sending {} mappings to {}", pairs.len(), settings.port_name);

  let controller = MuxController::new(settings);
  let stdout = std::io::stdout();
  controller.set_mux_configuration(&pairs, &mut stdout.lock());
  Ok(())
}
