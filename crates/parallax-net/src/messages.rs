//! Message types exchanged between the predicted client and the
//! authoritative server.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::channel::Timed;

/// The five boolean action flags sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Move along the view frame's forward axis.
    pub forward: bool,
    /// Move against the view frame's forward axis.
    pub backward: bool,
    /// Strafe along the view frame's right axis.
    pub right: bool,
    /// Strafe against the view frame's right axis.
    pub left: bool,
    /// Jump (applied only near the ground).
    pub jump: bool,
}

impl UserInput {
    /// Returns `true` if no action flag is set.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Movement-reference axes captured at input-sampling time.
///
/// Forces are applied along these axes, and the *recorded* frame is what
/// both the server replay and client resimulation use. Capturing the frame
/// per tick keeps replay deterministic even if the viewpoint turns between
/// prediction and resimulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    /// Forward axis (unit length).
    pub forward: Vec3,
    /// Right axis (unit length).
    pub right: Vec3,
    /// Up axis (unit length).
    pub up: Vec3,
}

impl ViewFrame {
    /// World-space reference frame: forward = -Z, right = +X, up = +Y.
    pub const WORLD: Self = Self {
        forward: Vec3::NEG_Z,
        right: Vec3::X,
        up: Vec3::Y,
    };

    /// Frame with all three axes rotated by `rotation`.
    pub fn rotated(rotation: Quat) -> Self {
        Self {
            forward: rotation * Self::WORLD.forward,
            right: rotation * Self::WORLD.right,
            up: rotation * Self::WORLD.up,
        }
    }
}

impl Default for ViewFrame {
    fn default() -> Self {
        Self::WORLD
    }
}

/// One tick's recorded input: the action flags plus the frame they were
/// sampled against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Action flags for the tick.
    pub flags: UserInput,
    /// Movement-reference axes captured when the flags were sampled.
    pub frame: ViewFrame,
}

/// Client → server report of everything produced and not yet confirmed.
///
/// The payload covers ticks `start_tick .. start_tick + inputs.len() - 1`
/// in order. In redundant mode `start_tick` is the oldest unacknowledged
/// tick, so the message grows with round-trip time; in non-redundant mode
/// it holds exactly the newest tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Simulated time at which the message becomes consumable.
    pub delivery_time: f64,
    /// First tick covered by `inputs`.
    pub start_tick: u64,
    /// Recorded inputs, one per covered tick, in tick order.
    pub inputs: Vec<TickInput>,
}

impl InputMessage {
    /// Last tick covered by this message, or `None` for an empty payload.
    pub fn max_tick(&self) -> Option<u64> {
        let len = self.inputs.len() as u64;
        (len > 0).then(|| self.start_tick + len - 1)
    }
}

/// Server → client authoritative snapshot for exactly one tick.
///
/// `tick` is the tick whose *pre-step* state this snapshot represents: the
/// state after the server has applied inputs for all ticks before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    /// Simulated time at which the message becomes consumable.
    pub delivery_time: f64,
    /// Tick the snapshot is authoritative for.
    pub tick: u64,
    /// Authoritative position.
    pub position: Vec3,
    /// Authoritative orientation.
    pub rotation: Quat,
    /// Authoritative linear velocity.
    pub velocity: Vec3,
    /// Authoritative angular velocity.
    pub angular_velocity: Vec3,
}

impl Timed for InputMessage {
    fn delivery_time(&self) -> f64 {
        self.delivery_time
    }
}

impl Timed for StateMessage {
    fn delivery_time(&self) -> f64 {
        self.delivery_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_input() {
        assert!(UserInput::default().is_neutral());
        let held = UserInput {
            forward: true,
            ..UserInput::default()
        };
        assert!(!held.is_neutral());
    }

    #[test]
    fn test_view_frame_rotated_stays_orthonormal() {
        let frame = ViewFrame::rotated(Quat::from_rotation_y(1.2));
        assert!((frame.forward.length() - 1.0).abs() < 1e-6);
        assert!(frame.forward.dot(frame.right).abs() < 1e-6);
        assert!(frame.forward.dot(frame.up).abs() < 1e-6);
    }

    #[test]
    fn test_input_message_max_tick() {
        let message = InputMessage {
            delivery_time: 0.0,
            start_tick: 10,
            inputs: vec![TickInput::default(); 4],
        };
        assert_eq!(message.max_tick(), Some(13));

        let empty = InputMessage {
            delivery_time: 0.0,
            start_tick: 10,
            inputs: Vec::new(),
        };
        assert_eq!(empty.max_tick(), None);
    }
}
