//! The predicted client: immediate local advance, input reporting, and
//! rewind-resimulate-smooth reconciliation against authoritative snapshots.

use glam::{Quat, Vec3};
use parallax_config::SimulationConfig;
use parallax_net::{InputMessage, SimulatedLink, StateMessage, TickInput};
use parallax_physics::PhysicsBody;
use tracing::{debug, warn};

use crate::history::{ClientState, DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
use crate::movement::apply_movement;

/// Squared positional divergence above which a correction fires.
pub const POSITION_ERROR_THRESHOLD_SQ: f32 = 1e-7;

/// Rotational divergence (`1 - dot`) above which a correction fires.
pub const ROTATION_ERROR_THRESHOLD: f32 = 1e-5;

/// Squared displayed-vs-corrected distance at or beyond which the jump is
/// considered unsmoothable and the offset is cleared instead.
pub const SNAP_THRESHOLD_SQ: f32 = 4.0;

/// Per-tick multiplicative decay of the positional smoothing offset.
pub const OFFSET_DECAY: f32 = 0.9;

/// Per-tick slerp fraction pulling the rotational offset toward identity.
pub const OFFSET_SLERP: f32 = 0.1;

/// Client-side simulation: predictor, history, and reconciliation state for
/// one locally controlled actor.
pub struct ClientSim<B> {
    body: B,
    tick: u64,
    latest_ack_tick: u64,
    inputs: HistoryBuffer<TickInput>,
    states: HistoryBuffer<ClientState>,
    position_offset: Vec3,
    rotation_offset: Quat,
}

impl<B: PhysicsBody> ClientSim<B> {
    /// Wraps an injected physics actor with default history capacity.
    pub fn new(body: B) -> Self {
        Self::with_capacity(body, DEFAULT_HISTORY_CAPACITY)
    }

    /// Wraps an injected physics actor with a custom history capacity
    /// (nonzero power of two).
    pub fn with_capacity(body: B, capacity: usize) -> Self {
        Self {
            body,
            tick: 0,
            latest_ack_tick: 0,
            inputs: HistoryBuffer::new(capacity),
            states: HistoryBuffer::new(capacity),
            position_offset: Vec3::ZERO,
            rotation_offset: Quat::IDENTITY,
        }
    }

    /// Next tick to be predicted (equivalently, ticks completed so far).
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Tick of the freshest authoritative snapshot consumed so far. This is
    /// the resend horizon for redundant input reports.
    pub fn latest_ack_tick(&self) -> u64 {
        self.latest_ack_tick
    }

    /// The underlying physics actor.
    pub fn body(&self) -> &B {
        &self.body
    }

    /// Current smoothing offsets (positional, rotational).
    pub fn smoothing_offset(&self) -> (Vec3, Quat) {
        (self.position_offset, self.rotation_offset)
    }

    /// The pose to display: physics pose composed with the visual-only
    /// smoothing offset. The offset never feeds back into physics.
    pub fn displayed_pose(&self) -> (Vec3, Quat) {
        (
            self.body.position() + self.position_offset,
            self.body.rotation() * self.rotation_offset,
        )
    }

    /// Runs one predicted tick: record input and pre-step state, apply the
    /// movement model, step physics, report the input, advance the counter.
    pub fn predict_tick(
        &mut self,
        input: TickInput,
        config: &SimulationConfig,
        link: &mut SimulatedLink<InputMessage>,
        now: f64,
        dt: f32,
    ) {
        let tick = self.tick;
        self.inputs.set(tick, input);
        self.states.set(
            tick,
            ClientState {
                position: self.body.position(),
                rotation: self.body.rotation(),
            },
        );

        apply_movement(&mut self.body, &input);
        self.body.step(dt);

        self.send_input(config, link, now);
        self.tick += 1;
    }

    /// Builds and offers this tick's input report to the link. In redundant
    /// mode the report covers every unacknowledged tick; otherwise only the
    /// current one.
    fn send_input(
        &mut self,
        config: &SimulationConfig,
        link: &mut SimulatedLink<InputMessage>,
        now: f64,
    ) {
        let current_tick = self.tick;
        let start_tick = if config.redundant_input {
            self.latest_ack_tick
        } else {
            current_tick
        };

        let inputs = &self.inputs;
        link.send_with(config.packet_loss, || {
            let payload: Vec<TickInput> = (start_tick..=current_tick)
                .map(|tick| *inputs.get(tick))
                .collect();
            let message = InputMessage {
                delivery_time: now + config.network_latency,
                start_tick,
                inputs: payload,
            };
            debug!(
                delivery_time = message.delivery_time,
                start_tick = message.start_tick,
                inputs = message.inputs.len(),
                "input message queued"
            );
            message
        });
    }

    /// Consumes the freshest eligible snapshot (discarding older ones
    /// unread), corrects divergence if enabled, and decays the smoothing
    /// offset. Call once per tick.
    pub fn reconcile(
        &mut self,
        config: &SimulationConfig,
        link: &mut SimulatedLink<StateMessage>,
        now: f64,
        dt: f32,
    ) {
        if let Some(message) = link.recv_latest(now) {
            self.latest_ack_tick = message.tick;
            if config.error_correction {
                self.correct(&message, dt);
            }
        }

        if config.correction_smoothing {
            self.position_offset *= OFFSET_DECAY;
            self.rotation_offset = self.rotation_offset.slerp(Quat::IDENTITY, OFFSET_SLERP);
        } else {
            self.position_offset = Vec3::ZERO;
            self.rotation_offset = Quat::IDENTITY;
        }
    }

    /// Compares the snapshot against recorded history and, on divergence,
    /// rewinds to the authoritative state, resimulates to the present tick,
    /// and refreshes the smoothing offset.
    fn correct(&mut self, message: &StateMessage, dt: f32) {
        if let Err(error) = self.states.check_lag(message.tick, self.tick) {
            // Operating constraint violated (latency outgrew the history
            // ring). The slot no longer holds this tick; skip correction.
            warn!(snapshot_tick = message.tick, current_tick = self.tick, %error,
                "snapshot older than history ring, skipping correction");
            return;
        }

        // A zero-latency snapshot can describe the tick that is about to be
        // predicted; its pre-step state is the current pose, which has not
        // been recorded yet.
        let recorded = if message.tick == self.tick {
            ClientState {
                position: self.body.position(),
                rotation: self.body.rotation(),
            }
        } else {
            *self.states.get(message.tick)
        };

        let position_error = message.position - recorded.position;
        let rotation_error = 1.0 - message.rotation.dot(recorded.rotation);
        if position_error.length_squared() <= POSITION_ERROR_THRESHOLD_SQ
            && rotation_error <= ROTATION_ERROR_THRESHOLD
        {
            return;
        }

        debug!(
            snapshot_tick = message.tick,
            rewind_ticks = self.tick - message.tick,
            position_error_sq = position_error.length_squared(),
            rotation_error,
            "correcting prediction error"
        );

        // The pose currently on screen, before any correction.
        let previous_position = self.body.position() + self.position_offset;
        let previous_rotation = self.body.rotation() * self.rotation_offset;

        // Hard-set to the authoritative state at the snapshot's tick...
        self.body.set_position(message.position);
        self.body.set_rotation(message.rotation);
        self.body.set_velocity(message.velocity);
        self.body.set_angular_velocity(message.angular_velocity);

        // ...then deterministically resimulate forward to the present tick,
        // refreshing the recorded pre-step states along the way.
        let mut rewind_tick = message.tick;
        while rewind_tick < self.tick {
            self.states.set(
                rewind_tick,
                ClientState {
                    position: self.body.position(),
                    rotation: self.body.rotation(),
                },
            );
            let input = *self.inputs.get(rewind_tick);
            apply_movement(&mut self.body, &input);
            self.body.step(dt);
            rewind_tick += 1;
        }

        let delta = previous_position - self.body.position();
        if delta.length_squared() >= SNAP_THRESHOLD_SQ {
            // Too far to hide: snap, showing the correction outright.
            self.position_offset = Vec3::ZERO;
            self.rotation_offset = Quat::IDENTITY;
        } else {
            self.position_offset = delta;
            self.rotation_offset = self.body.rotation().inverse() * previous_rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_net::{UserInput, ViewFrame};
    use parallax_physics::RigidBody;

    const DT: f32 = 1.0 / 64.0;

    fn config() -> SimulationConfig {
        SimulationConfig {
            packet_loss: 0.0,
            network_latency: 0.0,
            ..SimulationConfig::default()
        }
    }

    fn forward_input() -> TickInput {
        TickInput {
            flags: UserInput {
                forward: true,
                ..UserInput::default()
            },
            frame: ViewFrame::WORLD,
        }
    }

    fn snapshot(tick: u64, position: Vec3) -> StateMessage {
        StateMessage {
            delivery_time: 0.0,
            tick,
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Drives `ticks` predicted ticks, discarding the outgoing reports.
    fn predict_ticks(client: &mut ClientSim<RigidBody>, input: TickInput, ticks: u64) {
        let mut link = SimulatedLink::new(1);
        let cfg = config();
        for _ in 0..ticks {
            client.predict_tick(input, &cfg, &mut link, 0.0, DT);
        }
    }

    #[test]
    fn test_prediction_advances_immediately() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, forward_input(), 5);
        assert_eq!(client.tick(), 5);
        assert!(
            client.body().position().z < 0.0,
            "forward input moves along -Z without waiting for the server"
        );
    }

    #[test]
    fn test_redundant_report_covers_unacknowledged_ticks() {
        let mut client = ClientSim::new(RigidBody::default());
        let mut link = SimulatedLink::new(1);
        let cfg = config();
        for _ in 0..4 {
            client.predict_tick(forward_input(), &cfg, &mut link, 0.0, DT);
        }
        // Four reports; the last covers ticks 0..=3 since nothing is acked.
        let mut last = None;
        while let Some(message) = link.recv(0.0) {
            last = Some(message);
        }
        let last = last.unwrap();
        assert_eq!(last.start_tick, 0);
        assert_eq!(last.inputs.len(), 4);
    }

    #[test]
    fn test_non_redundant_report_is_single_tick() {
        let mut client = ClientSim::new(RigidBody::default());
        let mut link = SimulatedLink::new(1);
        let cfg = SimulationConfig {
            redundant_input: false,
            ..config()
        };
        for _ in 0..4 {
            client.predict_tick(forward_input(), &cfg, &mut link, 0.0, DT);
        }
        let mut last = None;
        while let Some(message) = link.recv(0.0) {
            last = Some(message);
        }
        let last = last.unwrap();
        assert_eq!(last.start_tick, 3);
        assert_eq!(last.inputs.len(), 1);
    }

    #[test]
    fn test_snapshot_updates_ack_horizon() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::ZERO));
        client.reconcile(&config(), &mut link, 0.0, DT);
        assert_eq!(client.latest_ack_tick(), 4);
    }

    #[test]
    fn test_error_below_threshold_does_not_correct() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);
        let before = client.body().position();

        // Neutral prediction recorded zeros; 2e-4 off gives error² = 4e-8,
        // below the 1e-7 trigger.
        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(2e-4, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);

        assert_eq!(client.body().position(), before);
        assert_eq!(client.smoothing_offset().0, Vec3::ZERO);
    }

    #[test]
    fn test_error_above_threshold_corrects() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        // 5e-4 off gives error² = 2.5e-7, above the 1e-7 trigger.
        let authoritative = Vec3::new(5e-4, 0.0, 0.0);
        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, authoritative));
        client.reconcile(&config(), &mut link, 0.0, DT);

        // Neutral input resimulated from the authoritative state keeps its
        // horizontal displacement (friction only shrinks it).
        assert!(client.body().position().x > 0.0);
        assert!(
            client.smoothing_offset().0.length() > 0.0,
            "small correction should arm the smoothing offset"
        );
    }

    #[test]
    fn test_rewind_resimulates_exactly_to_current_tick() {
        // Predict 10 ticks of forward input, then hand the client an
        // authoritative state for tick 5 that differs. The corrected pose
        // must equal an independent replay of recorded ticks 5..10 from
        // that authoritative state.
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, forward_input(), 10);
        assert_eq!(client.tick(), 10);

        let authoritative = snapshot(5, Vec3::new(1.0, 0.0, 0.0));

        let mut reference = RigidBody::default();
        reference.set_position(authoritative.position);
        reference.set_rotation(authoritative.rotation);
        reference.set_velocity(authoritative.velocity);
        reference.set_angular_velocity(authoritative.angular_velocity);
        for _ in 5..10 {
            apply_movement(&mut reference, &forward_input());
            reference.step(DT);
        }

        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || authoritative);
        client.reconcile(&config(), &mut link, 0.0, DT);

        assert_eq!(client.tick(), 10, "rewind must not move the tick counter");
        assert_eq!(client.body().position(), reference.position());
        assert_eq!(client.body().velocity(), reference.velocity());
    }

    #[test]
    fn test_large_jump_snaps_instead_of_smoothing() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        // 10 units away: far beyond the 2-unit snap distance.
        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(10.0, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);

        assert_eq!(client.smoothing_offset().0, Vec3::ZERO);
        assert_eq!(client.smoothing_offset().1, Quat::IDENTITY);
        assert!(client.body().position().x > 5.0, "pose snapped to authority");
    }

    #[test]
    fn test_offset_decays_geometrically() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(0.5, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);
        let initial = client.smoothing_offset().0.length();
        assert!(initial > 0.0);

        let mut empty = SimulatedLink::new(2);
        for n in 1..=20u32 {
            client.reconcile(&config(), &mut empty, 0.0, DT);
            let expected = initial * OFFSET_DECAY.powi(n as i32);
            let actual = client.smoothing_offset().0.length();
            assert!(
                (actual - expected).abs() < 1e-6,
                "tick {n}: offset {actual} != {expected}"
            );
        }
    }

    #[test]
    fn test_smoothing_disabled_clears_offsets() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(0.5, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);
        assert!(client.smoothing_offset().0.length() > 0.0);

        let cfg = SimulationConfig {
            correction_smoothing: false,
            ..config()
        };
        let mut empty = SimulatedLink::new(2);
        client.reconcile(&cfg, &mut empty, 0.0, DT);
        assert_eq!(client.smoothing_offset().0, Vec3::ZERO);
        assert_eq!(client.smoothing_offset().1, Quat::IDENTITY);
    }

    #[test]
    fn test_correction_disabled_still_tracks_acks() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);
        let before = client.body().position();

        let cfg = SimulationConfig {
            error_correction: false,
            ..config()
        };
        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(10.0, 0.0, 0.0)));
        client.reconcile(&cfg, &mut link, 0.0, DT);

        assert_eq!(client.latest_ack_tick(), 4);
        assert_eq!(client.body().position(), before, "no correction applied");
    }

    #[test]
    fn test_stale_snapshot_beyond_history_is_skipped() {
        let mut client = ClientSim::with_capacity(RigidBody::default(), 8);
        predict_ticks(&mut client, TickInput::default(), 20);
        let before = client.body().position();

        // Tick 2 lags the current tick 20 by more than the 8-slot ring.
        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(2, Vec3::new(10.0, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);

        assert_eq!(client.body().position(), before);
        assert_eq!(client.latest_ack_tick(), 2, "ack still advances");
    }

    #[test]
    fn test_displayed_pose_composes_offset() {
        let mut client = ClientSim::new(RigidBody::default());
        predict_ticks(&mut client, TickInput::default(), 6);

        let mut link = SimulatedLink::new(1);
        link.send_with(0.0, || snapshot(4, Vec3::new(0.5, 0.0, 0.0)));
        client.reconcile(&config(), &mut link, 0.0, DT);

        let (offset, _) = client.smoothing_offset();
        let (displayed, _) = client.displayed_pose();
        assert_eq!(displayed, client.body().position() + offset);
    }
}
