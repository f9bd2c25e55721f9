//! Scenario files describing a level, its enemies and a scripted player.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::Deserialize;
use theseus_core::{
    CellKind, ControllerTuning, EnemyId, HydraConfig, ObstacleGrid, SharkConfig, SirenConfig,
    TileCoord,
};
use theseus_system_behavior::{Hydra, Shark, Siren};
use theseus_system_control::{Enemy, Squad};
use theseus_system_pathfinding::nearest_treasure;
use theseus_world::{CurrentField, LevelGrid, PointMass};

/// Parsed scenario, before any simulation state is built.
#[derive(Debug, Deserialize)]
pub(crate) struct Scenario {
    grid: GridSpec,
    #[serde(default)]
    tuning: ControllerTuning,
    player: PlayerSpec,
    #[serde(default)]
    enemies: Vec<EnemySpec>,
    #[serde(default)]
    events: Vec<EventSpec>,
}

#[derive(Debug, Deserialize)]
struct GridSpec {
    columns: u32,
    rows: u32,
    #[serde(default = "unit_tile")]
    tile_size: f32,
    #[serde(default)]
    terrain: Vec<[u32; 2]>,
    #[serde(default)]
    treasures: Vec<[u32; 2]>,
    #[serde(default)]
    currents: Vec<CurrentSpec>,
}

fn unit_tile() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct CurrentSpec {
    tile: [u32; 2],
    direction: Vec2,
    magnitude: f32,
}

/// Scripted target the enemies hunt.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PlayerSpec {
    /// Starting position.
    pub(crate) position: Vec2,
    /// Mass of the player's body.
    #[serde(default = "unit_mass")]
    pub(crate) mass: f32,
    /// Points visited in order, looping back to the first.
    #[serde(default)]
    pub(crate) waypoints: Vec<Vec2>,
    /// Cruising speed between waypoints.
    #[serde(default = "player_speed")]
    pub(crate) speed: f32,
    /// Largest random velocity offset added on each axis every tick.
    #[serde(default)]
    pub(crate) jitter: f32,
}

fn unit_mass() -> f32 {
    1.0
}

fn player_speed() -> f32 {
    2.0
}

#[derive(Debug, Deserialize)]
struct BodySpec {
    id: u32,
    position: Vec2,
    #[serde(default = "unit_mass")]
    mass: f32,
    #[serde(default)]
    damping: f32,
}

impl BodySpec {
    fn point_mass(&self) -> PointMass {
        PointMass::new(self.position, self.mass).with_damping(self.damping)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EnemySpec {
    Shark {
        body: BodySpec,
        #[serde(default)]
        config: SharkConfig,
        #[serde(default)]
        guard: bool,
    },
    Siren {
        body: BodySpec,
        #[serde(default)]
        config: SirenConfig,
        waypoints: Vec<Vec2>,
    },
    Hydra {
        body: BodySpec,
        #[serde(default)]
        config: HydraConfig,
    },
}

impl EnemySpec {
    fn body(&self) -> &BodySpec {
        match self {
            EnemySpec::Shark { body, .. }
            | EnemySpec::Siren { body, .. }
            | EnemySpec::Hydra { body, .. } => body,
        }
    }
}

/// Something that happens to an enemy at a fixed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct EventSpec {
    /// Tick before which the event is delivered.
    pub(crate) tick: u32,
    /// Enemy receiving the event.
    pub(crate) enemy: u32,
    /// What happens.
    pub(crate) action: EventAction,
}

/// Events the harness can deliver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EventAction {
    /// A spear hit.
    Hit,
    /// Health reached zero.
    Kill,
}

/// Everything the simulation needs, built from a validated scenario.
#[derive(Debug)]
pub(crate) struct Level {
    pub(crate) grid: LevelGrid,
    pub(crate) currents: CurrentField,
    pub(crate) squad: Squad<PointMass>,
    pub(crate) player: PlayerSpec,
    pub(crate) events: Vec<EventSpec>,
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario in {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Scenario =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        Ok(scenario)
    }

    /// Builds the grid, current field and squad described by the scenario.
    pub(crate) fn build(self) -> Result<Level> {
        let grid = self.grid.build()?;
        let currents = CurrentField::from_grid(&grid).context("failed to build current field")?;
        if grid.tile_at(self.player.position).is_none() {
            bail!(
                "player starts off the grid at {:?}",
                self.player.position
            );
        }
        if !self.player.speed.is_finite() || self.player.speed < 0.0 {
            bail!("player speed must be finite and non-negative");
        }

        let mut ids = HashSet::with_capacity(self.enemies.len());
        let mut squad = Squad::new();
        for spec in self.enemies {
            let body = spec.body();
            if !ids.insert(body.id) {
                bail!("scenario contains duplicate enemy id {}", body.id);
            }
            if grid.tile_at(body.position).is_none() {
                bail!("enemy {} starts off the grid at {:?}", body.id, body.position);
            }
            let point_mass = body.point_mass();
            let enemy = build_enemy(spec, &grid, self.tuning)?;
            squad.push(enemy, point_mass);
        }

        for event in &self.events {
            if !ids.contains(&event.enemy) {
                bail!(
                    "event at tick {} targets unknown enemy {}",
                    event.tick,
                    event.enemy
                );
            }
        }
        let mut events = self.events;
        events.sort_by_key(|event| event.tick);

        Ok(Level {
            grid,
            currents,
            squad,
            player: self.player,
            events,
        })
    }
}

impl GridSpec {
    fn build(&self) -> Result<LevelGrid> {
        let mut grid = LevelGrid::new(self.columns, self.rows, self.tile_size)
            .context("failed to create level grid")?;
        for &[column, row] in &self.terrain {
            grid.set(TileCoord::new(column, row), CellKind::Terrain)
                .context("terrain tile lies outside the grid")?;
        }
        for &[column, row] in &self.treasures {
            grid.set(TileCoord::new(column, row), CellKind::Treasure)
                .context("treasure tile lies outside the grid")?;
        }
        for current in &self.currents {
            let [column, row] = current.tile;
            let kind = CellKind::Current {
                direction: current.direction,
                magnitude: current.magnitude,
            };
            grid.set(TileCoord::new(column, row), kind)
                .context("current tile lies outside the grid")?;
        }
        Ok(grid)
    }
}

fn build_enemy(spec: EnemySpec, grid: &LevelGrid, tuning: ControllerTuning) -> Result<Enemy> {
    let id = EnemyId::new(spec.body().id);
    let enemy = match spec {
        EnemySpec::Shark {
            body,
            config,
            guard,
        } => {
            let mut shark = Shark::new(config)
                .with_context(|| format!("invalid shark tuning for enemy {}", body.id))?;
            if guard {
                match guard_post(grid, body.position, tuning.search_depth) {
                    Some(post) => shark = shark.guarding(post),
                    None => tracing::warn!(enemy = body.id, "no treasure within reach to guard"),
                }
            }
            Enemy::shark(id, shark, tuning)
        }
        EnemySpec::Siren {
            body,
            config,
            waypoints,
        } => {
            let siren = Siren::new(config, waypoints)
                .with_context(|| format!("invalid siren tuning for enemy {}", body.id))?;
            Enemy::siren(id, siren, tuning)
        }
        EnemySpec::Hydra { body, config } => {
            let hydra = Hydra::new(config)
                .with_context(|| format!("invalid hydra tuning for enemy {}", body.id))?;
            Enemy::hydra(id, hydra, tuning)
        }
    };
    enemy.with_context(|| format!("invalid controller tuning for enemy {}", id.get()))
}

fn guard_post(grid: &LevelGrid, position: Vec2, max_depth: u32) -> Option<Vec2> {
    let origin = grid.tile_at(position)?;
    nearest_treasure(grid, origin, max_depth).map(|tile| grid.tile_center(tile))
}
