//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Simulation command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "parallax", about = "Client prediction / server reconciliation simulation")]
pub struct CliArgs {
    /// Enable or disable error correction.
    #[arg(long)]
    pub error_correction: Option<bool>,

    /// Enable or disable correction smoothing.
    #[arg(long)]
    pub correction_smoothing: Option<bool>,

    /// Enable or disable redundant input resending.
    #[arg(long)]
    pub redundant_input: Option<bool>,

    /// Packet loss probability in [0, 1].
    #[arg(long)]
    pub packet_loss: Option<f32>,

    /// One-way simulated latency in seconds.
    #[arg(long)]
    pub network_latency: Option<f64>,

    /// Snapshot emission cadence (power of two; 1 = every tick).
    #[arg(long)]
    pub snapshot_rate: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ec) = args.error_correction {
            self.simulation.error_correction = ec;
        }
        if let Some(cs) = args.correction_smoothing {
            self.simulation.correction_smoothing = cs;
        }
        if let Some(ri) = args.redundant_input {
            self.simulation.redundant_input = ri;
        }
        if let Some(loss) = args.packet_loss {
            self.simulation.packet_loss = loss;
        }
        if let Some(latency) = args.network_latency {
            self.simulation.network_latency = latency;
        }
        if let Some(rate) = args.snapshot_rate {
            self.simulation.snapshot_rate = rate;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
