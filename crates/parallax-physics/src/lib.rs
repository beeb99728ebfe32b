//! Deterministic rigid-body backend for the prediction simulation.
//!
//! The prediction core needs two independently steppable actors (client and
//! server) whose state can be read, overwritten wholesale, and re-stepped to
//! reproduce a past trajectory bit-for-bit. [`PhysicsBody`] is that
//! capability; [`RigidBody`] is a small impulse integrator implementing it.

mod body;

pub use body::{GRAVITY_Y, GROUND_FRICTION, GROUND_Y, PhysicsBody, RigidBody};
