//! The authoritative server: replays delivered input reports tick-by-tick
//! and emits state snapshots.

use parallax_config::SimulationConfig;
use parallax_net::{InputMessage, SimulatedLink, StateMessage};
use parallax_physics::PhysicsBody;
use tracing::{debug, trace};

use crate::movement::apply_movement;

/// Server-side simulation for one authoritative actor.
///
/// `tick` is the next tick whose input has not been applied yet. Overlapping
/// redundant reports are deduplicated by skipping the already-applied
/// prefix, so each unique tick advances the simulation exactly once.
pub struct ServerSim<B> {
    body: B,
    tick: u64,
}

impl<B: PhysicsBody> ServerSim<B> {
    /// Wraps an injected physics actor.
    pub fn new(body: B) -> Self {
        Self { body, tick: 0 }
    }

    /// Next tick awaiting input (equivalently, ticks applied so far).
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The underlying physics actor.
    pub fn body(&self) -> &B {
        &self.body
    }

    /// Consumes every currently deliverable input report in FIFO order and
    /// replays each.
    pub fn process(
        &mut self,
        config: &SimulationConfig,
        input_link: &mut SimulatedLink<InputMessage>,
        state_link: &mut SimulatedLink<StateMessage>,
        now: f64,
        dt: f32,
    ) {
        while let Some(message) = input_link.recv(now) {
            self.replay(&message, config, state_link, now, dt);
        }
    }

    /// Applies the not-yet-applied suffix of one report, advancing the
    /// authoritative simulation one tick per input and emitting snapshots.
    fn replay(
        &mut self,
        message: &InputMessage,
        config: &SimulationConfig,
        state_link: &mut SimulatedLink<StateMessage>,
        now: f64,
        dt: f32,
    ) {
        let Some(max_tick) = message.max_tick() else {
            return;
        };
        if max_tick < self.tick {
            // Every covered tick was already applied via an earlier report.
            trace!(
                start_tick = message.start_tick,
                max_tick,
                server_tick = self.tick,
                "discarding fully redundant input message"
            );
            return;
        }

        let skip = self.tick.saturating_sub(message.start_tick) as usize;
        for input in &message.inputs[skip..] {
            apply_movement(&mut self.body, input);
            self.body.step(dt);
            self.tick += 1;

            // Cadence first, then an independent loss draw per snapshot.
            let cadence = u64::from(config.snapshot_rate.max(1));
            if self.tick % cadence != 0 {
                continue;
            }
            let tick = self.tick;
            let body = &self.body;
            state_link.send_with(config.packet_loss, || {
                let message = StateMessage {
                    delivery_time: now + config.network_latency,
                    tick,
                    position: body.position(),
                    rotation: body.rotation(),
                    velocity: body.velocity(),
                    angular_velocity: body.angular_velocity(),
                };
                debug!(
                    delivery_time = message.delivery_time,
                    tick = message.tick,
                    "state message queued"
                );
                message
            });
        }
    }
}
