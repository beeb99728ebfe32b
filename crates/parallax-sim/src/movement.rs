//! The shared movement model applied on both sides of the link.
//!
//! Must be identical for prediction, authoritative replay, and
//! resimulation: each active directional flag contributes one fixed
//! impulse along the *recorded* frame axis for that tick.

use parallax_net::TickInput;
use parallax_physics::PhysicsBody;

/// Impulse magnitude contributed by each active directional flag.
pub const MOVE_IMPULSE: f32 = 0.5;

/// Maximum height at which the jump flag still applies an impulse.
pub const JUMP_HEIGHT_MAX: f32 = 0.75;

/// Applies one tick's input to a body as impulses. Does not step physics.
pub fn apply_movement(body: &mut impl PhysicsBody, input: &TickInput) {
    let flags = &input.flags;
    let frame = &input.frame;

    if flags.forward {
        body.apply_impulse(frame.forward * MOVE_IMPULSE);
    }
    if flags.backward {
        body.apply_impulse(-frame.forward * MOVE_IMPULSE);
    }
    if flags.right {
        body.apply_impulse(frame.right * MOVE_IMPULSE);
    }
    if flags.left {
        body.apply_impulse(-frame.right * MOVE_IMPULSE);
    }
    if flags.jump && body.position().y <= JUMP_HEIGHT_MAX {
        body.apply_impulse(frame.up * MOVE_IMPULSE);
    }
}
