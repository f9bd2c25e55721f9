use std::fmt;

use glam::Vec2;
use theseus_core::{
    ConfigError, ControllerTuning, EnemyId, EnemyKind, Intent, ObstacleGrid, Perception,
    PhysicsBody,
};
use theseus_system_behavior::{Hydra, HydraState, Shark, SharkState, Siren, SirenState};
use theseus_world::CurrentField;

use crate::{EnemyController, TickReport};

/// State of an enemy of any species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// State of a shark.
    Shark(SharkState),
    /// State of a siren.
    Siren(SirenState),
    /// State of a hydra.
    Hydra(HydraState),
}

impl fmt::Display for EnemyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnemyState::Shark(state) => write!(f, "{state:?}"),
            EnemyState::Siren(state) => write!(f, "{state:?}"),
            EnemyState::Hydra(state) => write!(f, "{state:?}"),
        }
    }
}

/// Species-agnostic summary of one enemy's tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyReport {
    /// Enemy that ticked.
    pub id: EnemyId,
    /// Species of the enemy.
    pub kind: EnemyKind,
    /// State after the tick.
    pub state: EnemyState,
    /// State before the tick, when it changed.
    pub previous: Option<EnemyState>,
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

impl EnemyReport {
    fn from_tick<S: Copy>(
        id: EnemyId,
        kind: EnemyKind,
        report: TickReport<S>,
        wrap: impl Fn(S) -> EnemyState,
    ) -> Self {
        Self {
            id,
            kind,
            state: wrap(report.state),
            previous: report.transition.map(|transition| wrap(transition.from)),
            perceived: report.perceived,
            searched: report.searched,
            desired_velocity: report.desired_velocity,
            impulse: report.impulse,
            intent: report.intent,
        }
    }
}

/// An enemy of any species, driven by its own controller.
#[derive(Debug)]
pub enum Enemy {
    /// A shark.
    Shark(EnemyController<Shark>),
    /// A siren.
    Siren(EnemyController<Siren>),
    /// A hydra.
    Hydra(EnemyController<Hydra>),
}

impl Enemy {
    /// Creates a shark controller.
    pub fn shark(id: EnemyId, shark: Shark, tuning: ControllerTuning) -> Result<Self, ConfigError> {
        EnemyController::new(id, shark, tuning).map(Enemy::Shark)
    }

    /// Creates a siren controller.
    pub fn siren(id: EnemyId, siren: Siren, tuning: ControllerTuning) -> Result<Self, ConfigError> {
        EnemyController::new(id, siren, tuning).map(Enemy::Siren)
    }

    /// Creates a hydra controller.
    pub fn hydra(id: EnemyId, hydra: Hydra, tuning: ControllerTuning) -> Result<Self, ConfigError> {
        EnemyController::new(id, hydra, tuning).map(Enemy::Hydra)
    }

    /// Identifier of the enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        match self {
            Enemy::Shark(controller) => controller.id(),
            Enemy::Siren(controller) => controller.id(),
            Enemy::Hydra(controller) => controller.id(),
        }
    }

    /// Species of the enemy.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        match self {
            Enemy::Shark(_) => EnemyKind::Shark,
            Enemy::Siren(_) => EnemyKind::Siren,
            Enemy::Hydra(_) => EnemyKind::Hydra,
        }
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> EnemyState {
        match self {
            Enemy::Shark(controller) => EnemyState::Shark(controller.state()),
            Enemy::Siren(controller) => EnemyState::Siren(controller.state()),
            Enemy::Hydra(controller) => EnemyState::Hydra(controller.state()),
        }
    }

    /// Velocity the enemy steered toward on its latest tick.
    #[must_use]
    pub fn desired_velocity(&self) -> Vec2 {
        match self {
            Enemy::Shark(controller) => controller.desired_velocity(),
            Enemy::Siren(controller) => controller.desired_velocity(),
            Enemy::Hydra(controller) => controller.desired_velocity(),
        }
    }

    /// Whether the enemy is currently engaged with its target.
    #[must_use]
    pub fn is_aggressive(&self) -> bool {
        match self {
            Enemy::Shark(controller) => controller.behavior().is_aggressive(controller.state()),
            Enemy::Siren(controller) => controller.state() == SirenState::Singing,
            Enemy::Hydra(controller) => !matches!(
                controller.state(),
                HydraState::Idle | HydraState::Stunned | HydraState::Dying
            ),
        }
    }

    /// Whether the enemy has died.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Enemy::Shark(controller) => controller.is_terminal(),
            Enemy::Siren(controller) => controller.is_terminal(),
            Enemy::Hydra(controller) => controller.is_terminal(),
        }
    }

    /// Whether the next tick runs range and sight checks.
    #[must_use]
    pub fn perceives_next_tick(&self) -> bool {
        match self {
            Enemy::Shark(controller) => controller.perceives_next_tick(),
            Enemy::Siren(controller) => controller.perceives_next_tick(),
            Enemy::Hydra(controller) => controller.perceives_next_tick(),
        }
    }

    /// Signals a spear hit.
    pub fn on_hit(&mut self) {
        match self {
            Enemy::Shark(controller) => controller.on_hit(),
            Enemy::Siren(controller) => controller.on_hit(),
            Enemy::Hydra(controller) => controller.on_hit(),
        }
    }

    /// Signals that the enemy's health reached zero.
    pub fn on_death(&mut self) {
        match self {
            Enemy::Shark(controller) => controller.on_death(),
            Enemy::Siren(controller) => controller.on_death(),
            Enemy::Hydra(controller) => controller.on_death(),
        }
    }

    /// Advances the enemy by one tick.
    pub fn tick<G>(
        &mut self,
        dt: f32,
        body: &mut impl PhysicsBody,
        perception: Perception,
        grid: &G,
        currents: &CurrentField,
    ) -> EnemyReport
    where
        G: ObstacleGrid,
    {
        let id = self.id();
        let kind = self.kind();
        match self {
            Enemy::Shark(controller) => {
                let report = controller.tick(dt, body, perception, grid, currents);
                EnemyReport::from_tick(id, kind, report, EnemyState::Shark)
            }
            Enemy::Siren(controller) => {
                let report = controller.tick(dt, body, perception, grid, currents);
                EnemyReport::from_tick(id, kind, report, EnemyState::Siren)
            }
            Enemy::Hydra(controller) => {
                let report = controller.tick(dt, body, perception, grid, currents);
                EnemyReport::from_tick(id, kind, report, EnemyState::Hydra)
            }
        }
    }
}
