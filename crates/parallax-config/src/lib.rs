//! Configuration for the prediction simulation.
//!
//! Runtime-tunable parameters persist to disk as RON files, with CLI
//! overrides via clap and hot-reload detection. The simulation itself never
//! holds these as ambient mutable state: a validated [`SimulationConfig`] is
//! passed by reference into each update call.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SimulationConfig};
pub use error::ConfigError;
