//! Headless demo: runs the client/server pair over the simulated link with
//! a wandering scripted player and reports per-second statistics.

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Quat;
use parallax_config::{CliArgs, Config};
use parallax_net::{TickInput, UserInput, ViewFrame};
use parallax_physics::{PhysicsBody, RigidBody};
use parallax_sim::{InputSource, NetSim};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "parallax-demo",
    about = "Client prediction / server reconciliation over a simulated lossy link"
)]
struct DemoArgs {
    #[command(flatten)]
    shared: CliArgs,

    /// Simulated run duration in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Nominal frame rate driving the fixed-timestep scheduler.
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f64,

    /// Seed for packet loss, frame jitter, and the wandering player.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// A player that wanders: holds a random movement combination for a stretch
/// of ticks, occasionally jumps, and slowly pans its view so the recorded
/// frame axes actually vary between ticks.
struct WanderInput {
    rng: Xoshiro256PlusPlus,
    flags: UserInput,
    hold_until: u64,
    yaw: f32,
}

impl WanderInput {
    fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            flags: UserInput::default(),
            hold_until: 0,
            yaw: 0.0,
        }
    }
}

impl InputSource for WanderInput {
    fn poll(&mut self, tick: u64) -> TickInput {
        if tick >= self.hold_until {
            self.flags = UserInput {
                forward: self.rng.random::<f32>() < 0.6,
                backward: self.rng.random::<f32>() < 0.1,
                left: self.rng.random::<f32>() < 0.25,
                right: self.rng.random::<f32>() < 0.25,
                jump: self.rng.random::<f32>() < 0.15,
            };
            self.hold_until = tick + self.rng.random_range(8..48);
        }
        self.yaw += 0.002;
        TickInput {
            flags: self.flags,
            frame: ViewFrame::rotated(Quat::from_rotation_y(self.yaw)),
        }
    }
}

fn run(args: &DemoArgs, config: &Config) {
    let mut sim = NetSim::new(RigidBody::default(), RigidBody::default(), args.seed);
    let mut input = WanderInput::new(args.seed ^ 0x5DEE_CE66);
    let mut frame_rng = Xoshiro256PlusPlus::seed_from_u64(args.seed ^ 0xB504_F333);

    let nominal_dt = 1.0 / args.frame_rate.max(1.0);
    let mut next_report = 1.0;

    while sim.now() < args.duration {
        // Frames never land exactly on the tick boundary; jitter keeps the
        // accumulator honest.
        let frame_dt = nominal_dt * frame_rng.random_range(0.5..1.5);
        sim.update(frame_dt, &config.simulation, &mut input);

        if sim.now() >= next_report {
            next_report += 1.0;
            let client = sim.client();
            let server = sim.server();
            let (offset, _) = client.smoothing_offset();
            info!(
                time = format!("{:.2}", sim.now()),
                client_tick = client.tick(),
                server_tick = server.tick(),
                ack_tick = client.latest_ack_tick(),
                inputs_in_flight = sim.inputs_in_flight(),
                snapshots_in_flight = sim.snapshots_in_flight(),
                client_pos = ?client.body().position(),
                server_pos = ?server.body().position(),
                smoothing_offset = offset.length(),
                "status"
            );
        }
    }

    let lag = (sim.client().body().position() - sim.server().body().position()).length();
    info!(
        client_tick = sim.client().tick(),
        server_tick = sim.server().tick(),
        divergence = lag,
        "simulation finished"
    );
}

fn main() {
    let args = DemoArgs::parse();

    let config_dir = args
        .shared
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config"));
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args.shared);
    if let Err(e) = config.simulation.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    parallax_log::init_logging(
        Some(Path::new("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    info!(
        packet_loss = config.simulation.packet_loss,
        network_latency = config.simulation.network_latency,
        snapshot_rate = config.simulation.snapshot_rate,
        error_correction = config.simulation.error_correction,
        correction_smoothing = config.simulation.correction_smoothing,
        redundant_input = config.simulation.redundant_input,
        duration = args.duration,
        seed = args.seed,
        "starting"
    );
    run(&args, &config);
}
