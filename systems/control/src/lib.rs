#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-enemy tick driver.
//!
//! An [`EnemyController`] advances one enemy's state machine, turns the
//! resulting steering into a desired velocity (consulting the path search
//! for navigating states) and hands the physics collaborator exactly one
//! linear impulse per tick.

mod enemy;
mod squad;

use glam::Vec2;
use theseus_core::{
    ConfigError, ControllerTuning, EnemyId, Intent, ObstacleGrid, Perception, PhysicsBody,
    SpeedProfile,
};
use theseus_system_behavior::{Behavior, StateMachine, Steering, Transition};
use theseus_system_pathfinding::{Navigator, SearchRequest};
use theseus_world::CurrentField;

pub use enemy::{Enemy, EnemyReport, EnemyState};
pub use squad::{Member, Squad};

/// Impulse that moves the velocity component along `direction` toward `target_speed`.
///
/// `smoothing` in `0.0..1.0` keeps that fraction of the gap for later
/// ticks; zero closes it at once. Velocity across `direction` is left to
/// the physics collaborator. A zero direction yields no impulse.
#[must_use]
pub fn impulse_toward(
    direction: Vec2,
    target_speed: f32,
    velocity: Vec2,
    mass: f32,
    smoothing: f32,
) -> Vec2 {
    let direction = direction.normalize_or_zero();
    let along = velocity.dot(direction);
    direction * (target_speed - along) * mass * (1.0 - smoothing)
}

/// Impulse that bleeds off the body's velocity.
#[must_use]
pub fn braking_impulse(velocity: Vec2, mass: f32, smoothing: f32) -> Vec2 {
    -velocity * mass * (1.0 - smoothing)
}

/// What happened to one enemy during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport<S> {
    /// State after the tick.
    pub state: S,
    /// Transition taken this tick, if any.
    pub transition: Option<Transition<S>>,
    /// Whether range and sight checks ran this tick.
    pub perceived: bool,
    /// Whether the path search ran this tick.
    pub searched: bool,
    /// Velocity the enemy is steering toward.
    pub desired_velocity: Vec2,
    /// Impulse handed to the physics collaborator.
    pub impulse: Vec2,
    /// Attack requested this tick.
    pub intent: Option<Intent>,
}

/// Drives one enemy's state machine against its physics body.
#[derive(Debug)]
pub struct EnemyController<B: Behavior> {
    machine: StateMachine<B>,
    tuning: ControllerTuning,
    ticks: u64,
    desired_velocity: Vec2,
    navigating: bool,
}

impl<B: Behavior> EnemyController<B> {
    /// Creates a controller after validating its tuning.
    pub fn new(id: EnemyId, behavior: B, tuning: ControllerTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            machine: StateMachine::new(id, behavior),
            tuning,
            ticks: 0,
            desired_velocity: Vec2::ZERO,
            navigating: false,
        })
    }

    /// Identifier of the driven enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.machine.id()
    }

    /// Active state, for animation and audio collaborators.
    #[must_use]
    pub fn state(&self) -> B::State {
        self.machine.state()
    }

    /// Velocity the enemy steered toward on its latest tick.
    #[must_use]
    pub fn desired_velocity(&self) -> Vec2 {
        self.desired_velocity
    }

    /// Underlying state machine.
    #[must_use]
    pub fn machine(&self) -> &StateMachine<B> {
        &self.machine
    }

    /// Species rules and tuning.
    #[must_use]
    pub fn behavior(&self) -> &B {
        self.machine.behavior()
    }

    /// Number of ticks driven so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Signals a spear hit; the next tick starts with the stun.
    pub fn on_hit(&mut self) {
        self.machine.on_hit();
    }

    /// Signals that the enemy's health reached zero.
    pub fn on_death(&mut self) {
        self.machine.kill();
        self.desired_velocity = Vec2::ZERO;
        self.navigating = false;
    }

    /// Whether the enemy has died.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.machine.is_terminal()
    }

    /// Whether the next call to [`tick`](Self::tick) runs range and sight checks.
    #[must_use]
    pub fn perceives_next_tick(&self) -> bool {
        self.eligible_at(self.ticks + 1)
    }

    /// Advances the enemy by `dt` seconds and applies one impulse to `body`.
    ///
    /// Range and sight checks, and path searches, only run when
    /// `(id + ticks) % stagger_period == 0`; in between the enemy keeps
    /// steering along its last planned heading. Timers and hits are
    /// handled every tick.
    pub fn tick<G>(
        &mut self,
        dt: f32,
        body: &mut impl PhysicsBody,
        perception: Perception,
        grid: &G,
        currents: &CurrentField,
    ) -> TickReport<B::State>
    where
        G: ObstacleGrid,
    {
        self.ticks += 1;
        let perceived = self.eligible_at(self.ticks);
        let position = body.position();
        let step = self.machine.step(dt, position, perception, perceived);

        let mut searched = false;
        self.desired_velocity = match step.action.steering {
            Steering::Hold => {
                self.navigating = false;
                Vec2::ZERO
            }
            Steering::Direct(velocity) => {
                self.navigating = false;
                velocity
            }
            Steering::Navigate {
                goal,
                profile,
                speed,
            } => {
                let replan = perceived || step.transition.is_some() || !self.navigating;
                self.navigating = true;
                if replan {
                    searched = true;
                    self.plan(position, goal, profile, speed, grid, currents)
                } else {
                    self.desired_velocity
                }
            }
        };

        let smoothing = self.tuning.smoothing;
        let velocity = body.linear_velocity();
        let impulse = if self.desired_velocity == Vec2::ZERO {
            braking_impulse(velocity, body.mass(), smoothing)
        } else {
            impulse_toward(
                self.desired_velocity,
                self.desired_velocity.length(),
                velocity,
                body.mass(),
                smoothing,
            )
        };
        body.apply_linear_impulse(impulse);

        TickReport {
            state: step.state,
            transition: step.transition,
            perceived,
            searched,
            desired_velocity: self.desired_velocity,
            impulse,
            intent: step.action.intent,
        }
    }

    fn eligible_at(&self, ticks: u64) -> bool {
        let period = u64::from(self.tuning.stagger_period.max(1));
        (u64::from(self.id().get()) + ticks) % period == 0
    }

    fn plan<G>(
        &self,
        position: Vec2,
        goal: Vec2,
        profile: SpeedProfile,
        speed: f32,
        grid: &G,
        currents: &CurrentField,
    ) -> Vec2
    where
        G: ObstacleGrid,
    {
        let Some(origin) = grid.tile_at(position) else {
            return Vec2::ZERO;
        };
        let direct = (goal - position).normalize_or_zero() * speed;
        let Some(destination) = grid.tile_at(goal) else {
            return direct;
        };
        if origin == destination {
            return direct;
        }

        let navigator = Navigator::new(grid, currents, self.tuning.speeds);
        let request =
            SearchRequest::new(origin, destination, profile).with_depth(self.tuning.search_depth);
        let outcome = navigator.search(self.tuning.search, request);
        outcome.direction.heading() * speed
    }
}
