use glam::Vec2;
use theseus_core::PhysicsBody;

/// Frictionless point mass with optional linear damping.
///
/// Stands in for the game's rigid bodies: it accumulates impulses into its
/// velocity and moves only when [`PointMass::integrate`] is called.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMass {
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    linear_damping: f32,
}

impl PointMass {
    /// Creates a body at rest.
    #[must_use]
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            mass,
            linear_damping: 0.0,
        }
    }

    /// Overrides the starting velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Overrides the linear damping coefficient.
    #[must_use]
    pub fn with_damping(mut self, linear_damping: f32) -> Self {
        self.linear_damping = linear_damping.max(0.0);
        self
    }

    /// Teleports the body.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Overwrites the body's velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Mutable access to the position, for collaborators that displace bodies.
    pub fn position_mut(&mut self) -> &mut Vec2 {
        &mut self.position
    }

    /// Advances the body by `dt` seconds of free motion.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity /= 1.0 + self.linear_damping * dt;
    }
}

impl PhysicsBody for PointMass {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn linear_velocity(&self) -> Vec2 {
        self.velocity
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn apply_linear_impulse(&mut self, impulse: Vec2) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }
}
