//! The unified prediction/reconciliation engine: one parametrized struct
//! wiring scheduler, predictor, links, authoritative server, and
//! reconciler around two injected physics actors.

use parallax_config::SimulationConfig;
use parallax_net::{InputMessage, SimulatedLink, StateMessage};
use parallax_physics::PhysicsBody;

use crate::client::ClientSim;
use crate::clock::{FixedTimestep, TICK_DT};
use crate::input::InputSource;
use crate::server::ServerSim;

/// Seed offset decorrelating the two links' loss draws.
const STATE_LINK_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// A complete client/server pair over a simulated unreliable network.
///
/// Owns both roles and both directions of the link; everything advances
/// from [`update`](Self::update) on one thread. Per tick the pipeline is:
/// sample input → predict locally → authoritative replay → reconcile.
pub struct NetSim<B> {
    timestep: FixedTimestep,
    now: f64,
    tick_dt: f32,
    client: ClientSim<B>,
    server: ServerSim<B>,
    input_link: SimulatedLink<InputMessage>,
    state_link: SimulatedLink<StateMessage>,
}

impl<B: PhysicsBody> NetSim<B> {
    /// Builds the pair from two independently steppable actors. Both should
    /// start from the same state or the first snapshots will correct the
    /// difference away. `seed` drives packet-loss sampling.
    pub fn new(client_body: B, server_body: B, seed: u64) -> Self {
        Self {
            timestep: FixedTimestep::default(),
            now: 0.0,
            tick_dt: TICK_DT,
            client: ClientSim::new(client_body),
            server: ServerSim::new(server_body),
            input_link: SimulatedLink::new(seed),
            state_link: SimulatedLink::new(seed.wrapping_add(STATE_LINK_SEED_OFFSET)),
        }
    }

    /// Advances simulated time by `frame_dt` seconds, running however many
    /// fixed ticks fall due. `config` is read-only for the whole call.
    pub fn update(
        &mut self,
        frame_dt: f64,
        config: &SimulationConfig,
        input: &mut dyn InputSource,
    ) {
        self.now += frame_dt;
        let ticks = self.timestep.advance(frame_dt);
        for _ in 0..ticks {
            let tick_input = input.poll(self.client.tick());
            self.client.predict_tick(
                tick_input,
                config,
                &mut self.input_link,
                self.now,
                self.tick_dt,
            );
            self.server.process(
                config,
                &mut self.input_link,
                &mut self.state_link,
                self.now,
                self.tick_dt,
            );
            self.client
                .reconcile(config, &mut self.state_link, self.now, self.tick_dt);
        }
    }

    /// Current simulated time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// The predicted client half.
    pub fn client(&self) -> &ClientSim<B> {
        &self.client
    }

    /// The authoritative server half.
    pub fn server(&self) -> &ServerSim<B> {
        &self.server
    }

    /// Input reports currently in flight toward the server.
    pub fn inputs_in_flight(&self) -> usize {
        self.input_link.in_flight()
    }

    /// Snapshots currently in flight toward the client.
    pub fn snapshots_in_flight(&self) -> usize {
        self.state_link.in_flight()
    }
}
