//! [`PhysicsBody`] capability trait and the [`RigidBody`] integrator.

use glam::{Quat, Vec3};

/// Downward gravitational acceleration in units/s² (negative = down).
pub const GRAVITY_Y: f32 = -9.81;

/// Height of the ground plane. Bodies never sink below it.
pub const GROUND_Y: f32 = 0.0;

/// Horizontal velocity damping coefficient (per second) while grounded.
pub const GROUND_FRICTION: f32 = 4.0;

/// Tolerance for deciding a body is resting on the ground plane.
const GROUND_EPSILON: f32 = 1e-4;

/// The physics capability the prediction core consumes.
///
/// Two independent implementors are stepped side by side: the client's
/// predicted actor and the server's authoritative actor. Reconciliation
/// hard-sets the full kinematic state through the setters, then replays
/// ticks through [`apply_impulse`](Self::apply_impulse) and
/// [`step`](Self::step). Implementations must be deterministic: identical
/// state and identical call sequences must produce identical results.
pub trait PhysicsBody {
    /// Current position.
    fn position(&self) -> Vec3;
    /// Overwrites the position.
    fn set_position(&mut self, position: Vec3);
    /// Current orientation.
    fn rotation(&self) -> Quat;
    /// Overwrites the orientation.
    fn set_rotation(&mut self, rotation: Quat);
    /// Current linear velocity.
    fn velocity(&self) -> Vec3;
    /// Overwrites the linear velocity.
    fn set_velocity(&mut self, velocity: Vec3);
    /// Current angular velocity (scaled-axis, radians/s).
    fn angular_velocity(&self) -> Vec3;
    /// Overwrites the angular velocity.
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
    /// Applies an instantaneous impulse (unit mass: impulse = velocity delta).
    fn apply_impulse(&mut self, impulse: Vec3);
    /// Integrates one fixed step of `dt` seconds.
    fn step(&mut self, dt: f32);
}

/// Unit-mass rigid body integrated against gravity and a flat ground plane.
///
/// Deliberately minimal: semi-implicit Euler, ground friction on the
/// horizontal plane, no collision shapes. What matters for the prediction
/// core is that setters restore the *complete* simulation state, so a
/// rewound body replays the exact trajectory the original stepping produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    angular_velocity: Vec3,
}

impl RigidBody {
    /// Creates a body at rest at `position` with identity orientation.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Returns `true` if the body is resting on the ground plane.
    pub fn grounded(&self) -> bool {
        self.position.y <= GROUND_Y + GROUND_EPSILON
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl PhysicsBody for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse;
    }

    fn step(&mut self, dt: f32) {
        let grounded = self.grounded();

        self.velocity.y += GRAVITY_Y * dt;
        if grounded {
            // Horizontal friction keeps held inputs from accumulating
            // velocity without bound.
            let damping = (1.0 - GROUND_FRICTION * dt).max(0.0);
            self.velocity.x *= damping;
            self.velocity.z *= damping;
        }

        self.position += self.velocity * dt;
        if self.position.y <= GROUND_Y {
            self.position.y = GROUND_Y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }

        let rotation_delta = self.angular_velocity * dt;
        if rotation_delta != Vec3::ZERO {
            self.rotation = (Quat::from_scaled_axis(rotation_delta) * self.rotation).normalize();
        }
    }
}
