#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Raft of Theseus enemy AI.
//!
//! This crate defines the vocabulary that connects the level collaborator,
//! the physics collaborator, and the pure AI systems. The level exposes an
//! [`ObstacleGrid`] describing what occupies each tile, physics bodies are
//! reached only through the [`PhysicsBody`] capability, and systems respond
//! with desired velocities, impulses and [`Intent`] values. Nothing in this
//! crate performs I/O or reads the wall clock.

pub mod config;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{
    ConfigError, ControllerTuning, HydraConfig, SearchVariant, SharkConfig, SirenConfig,
    SpeedTable,
};

/// Location of a single grid tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Number of 8-connected steps separating two tiles on an open grid.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// Tile reached by taking one step, or `None` when the step leaves the grid.
    #[must_use]
    pub fn offset(self, step: StepDirection, columns: u32, rows: u32) -> Option<TileCoord> {
        let column = self.column.checked_add_signed(i32::from(step.dx()))?;
        let row = self.row.checked_add_signed(i32::from(step.dy()))?;
        if column >= columns || row >= rows {
            return None;
        }
        Some(TileCoord::new(column, row))
    }
}

/// One of the eight unit moves between neighbouring tiles, or no move at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepDirection {
    dx: i8,
    dy: i8,
}

impl StepDirection {
    /// The zero step, reported when no move should be made.
    pub const NONE: StepDirection = StepDirection { dx: 0, dy: 0 };

    /// All eight neighbour steps in the order the search expands them.
    pub const NEIGHBORS: [StepDirection; 8] = [
        StepDirection { dx: -1, dy: -1 },
        StepDirection { dx: -1, dy: 0 },
        StepDirection { dx: -1, dy: 1 },
        StepDirection { dx: 0, dy: -1 },
        StepDirection { dx: 0, dy: 1 },
        StepDirection { dx: 1, dy: -1 },
        StepDirection { dx: 1, dy: 0 },
        StepDirection { dx: 1, dy: 1 },
    ];

    /// Creates a step, clamping each component into `-1..=1`.
    #[must_use]
    pub fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.clamp(-1, 1),
            dy: dy.clamp(-1, 1),
        }
    }

    /// Column delta of the step.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Row delta of the step.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Whether this is the zero step.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Whether the step moves along both axes.
    #[must_use]
    pub const fn is_diagonal(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }

    /// Raw step as a world-space vector with components in `-1.0..=1.0`.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(f32::from(self.dx), f32::from(self.dy))
    }

    /// Unit-length heading of the step, or zero for [`StepDirection::NONE`].
    #[must_use]
    pub fn heading(self) -> Vec2 {
        self.to_vec2().normalize_or_zero()
    }
}

/// Classification of whatever occupies a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellKind {
    /// Open water.
    #[default]
    Empty,
    /// Open water carrying a directional current.
    Current {
        /// Direction of the flow; need not be normalised.
        direction: Vec2,
        /// Flow speed in world units per second.
        magnitude: f32,
    },
    /// Rock or shore that blocks movement and sight.
    Terrain,
    /// Passable tile holding a point of interest.
    Treasure,
}

impl CellKind {
    /// Whether enemies may enter the tile.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        !matches!(self, CellKind::Terrain)
    }

    /// Flow velocity carried by the tile, zero for anything but a current.
    #[must_use]
    pub fn flow(&self) -> Vec2 {
        match self {
            CellKind::Current {
                direction,
                magnitude,
            } => direction.normalize_or_zero() * *magnitude,
            _ => Vec2::ZERO,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Species of enemy driven by the AI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Melee charger that hunts the raft through the water.
    Shark,
    /// Flying singer that patrols between waypoints and fires notes.
    Siren,
    /// Stationary multi-headed turret that splashes the raft.
    Hydra,
}

/// Movement regime used to estimate traversal costs during path search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedProfile {
    /// Leisurely movement with no target in sight.
    Wander,
    /// Pursuit of a visible target.
    Chase,
    /// Maximum-speed pursuit.
    Enrage,
}

/// Read-only view of the level's obstacle grid.
///
/// Implementors only need to describe dimensions, tile size and the
/// occupant of each in-bounds tile; the coordinate conversions have
/// defaults that match a grid anchored at the world origin.
pub trait ObstacleGrid {
    /// Number of columns and rows in the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Occupant of an in-bounds tile. Callers must check bounds first.
    fn obstacle_at(&self, tile: TileCoord) -> CellKind;

    /// Side length of a single square tile expressed in world units.
    fn tile_size(&self) -> f32;

    /// Whether the signed tile indices fall inside the grid.
    fn in_bounds(&self, column: i32, row: i32) -> bool {
        let (columns, rows) = self.dimensions();
        match (u32::try_from(column), u32::try_from(row)) {
            (Ok(column), Ok(row)) => column < columns && row < rows,
            _ => false,
        }
    }

    /// Converts a single world-space coordinate into a tile index.
    fn screen_to_board(&self, coordinate: f32) -> i32 {
        (coordinate / self.tile_size()).floor() as i32
    }

    /// Converts a tile index into the world-space coordinate of its centre.
    fn board_to_screen(&self, index: i32) -> f32 {
        (index as f32 + 0.5) * self.tile_size()
    }

    /// Tile containing the provided world position, if it lies on the grid.
    fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        let column = self.screen_to_board(position.x);
        let row = self.screen_to_board(position.y);
        if !self.in_bounds(column, row) {
            return None;
        }
        Some(TileCoord::new(column.unsigned_abs(), row.unsigned_abs()))
    }

    /// World-space centre of the provided tile.
    fn tile_center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            self.board_to_screen(tile.column() as i32),
            self.board_to_screen(tile.row() as i32),
        )
    }
}

/// Minimal rigid-body capability the AI needs from the physics engine.
pub trait PhysicsBody {
    /// Current world-space position of the body's centre.
    fn position(&self) -> Vec2;

    /// Current linear velocity in world units per second.
    fn linear_velocity(&self) -> Vec2;

    /// Mass of the body.
    fn mass(&self) -> f32;

    /// Applies an instantaneous change in momentum at the body's centre.
    fn apply_linear_impulse(&mut self, impulse: Vec2);
}

/// Position and velocity of the entity an enemy is hunting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    /// World-space position of the target.
    pub position: Vec2,
    /// Linear velocity of the target.
    pub velocity: Vec2,
}

impl TargetSnapshot {
    /// Creates a snapshot from a position and velocity.
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Captures the target's state from a physics body.
    #[must_use]
    pub fn of(body: &impl PhysicsBody) -> Self {
        Self::new(body.position(), body.linear_velocity())
    }

    /// Position the target will occupy after `seconds` at constant velocity.
    #[must_use]
    pub fn led_by(&self, seconds: f32) -> Vec2 {
        self.position + self.velocity * seconds
    }
}

/// What an enemy knows about its surroundings on a given tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Perception {
    /// The hunted target, or `None` once it has been destroyed.
    pub target: Option<TargetSnapshot>,
    /// Whether an unobstructed line runs from the enemy to the target.
    pub line_of_sight: bool,
}

impl Perception {
    /// Perception of a visible target.
    #[must_use]
    pub const fn visible(target: TargetSnapshot) -> Self {
        Self {
            target: Some(target),
            line_of_sight: true,
        }
    }

    /// Perception of a target hidden behind terrain.
    #[must_use]
    pub const fn hidden(target: TargetSnapshot) -> Self {
        Self {
            target: Some(target),
            line_of_sight: false,
        }
    }

    /// Perception with nothing to hunt.
    #[must_use]
    pub const fn alone() -> Self {
        Self {
            target: None,
            line_of_sight: false,
        }
    }
}

/// Attack requests emitted by enemies for the combat collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Launch a projectile along the provided unit direction.
    Fire {
        /// Unit direction of the projectile.
        direction: Vec2,
    },
    /// Deal contact damage to a target in reach.
    Strike,
}
