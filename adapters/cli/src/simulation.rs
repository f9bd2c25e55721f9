//! Fixed-step simulation loop driving the squad against a scripted player.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use theseus_core::{EnemyId, Intent, ObstacleGrid, PhysicsBody, TargetSnapshot};
use theseus_system_control::EnemyReport;
use theseus_world::{CurrentField, LevelGrid, PointMass};

use crate::scenario::{EventAction, Level, PlayerSpec};

const ARRIVAL_RADIUS: f32 = 0.5;

/// Scripted player that loops over its waypoints with seeded jitter.
#[derive(Debug)]
struct Player {
    body: PointMass,
    waypoints: Vec<Vec2>,
    next: usize,
    speed: f32,
    jitter: f32,
    rng: ChaCha8Rng,
}

impl Player {
    fn new(spec: PlayerSpec, seed: u64) -> Self {
        Self {
            body: PointMass::new(spec.position, spec.mass),
            waypoints: spec.waypoints,
            next: 0,
            speed: spec.speed,
            jitter: spec.jitter.max(0.0),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn steer(&mut self) {
        let position = self.body.position();
        let mut heading = Vec2::ZERO;
        if let Some(&waypoint) = self.waypoints.get(self.next) {
            if position.distance(waypoint) <= ARRIVAL_RADIUS {
                self.next = (self.next + 1) % self.waypoints.len();
            }
            heading = (self.waypoints[self.next] - position).normalize_or_zero();
        }

        let mut velocity = heading * self.speed;
        if self.jitter > 0.0 {
            velocity += Vec2::new(
                self.rng.gen_range(-self.jitter..=self.jitter),
                self.rng.gen_range(-self.jitter..=self.jitter),
            );
        }
        self.body.set_velocity(velocity);
    }
}

/// Totals gathered over a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Summary {
    /// Ticks simulated.
    pub(crate) ticks: u32,
    /// State changes across the squad.
    pub(crate) transitions: usize,
    /// Projectiles requested.
    pub(crate) shots: usize,
    /// Melee strikes requested.
    pub(crate) strikes: usize,
    /// Path searches run.
    pub(crate) searches: usize,
    /// Final player position.
    pub(crate) player: Vec2,
}

/// Owns a built level and advances it tick by tick.
#[derive(Debug)]
pub(crate) struct Simulation {
    level: Level,
    player: Player,
    tick: u32,
    next_event: usize,
    reports: Vec<EnemyReport>,
}

impl Simulation {
    /// Prepares a simulation whose player jitter is drawn from `seed`.
    pub(crate) fn new(level: Level, seed: u64) -> Self {
        let player = Player::new(level.player.clone(), seed);
        Self {
            level,
            player,
            tick: 0,
            next_event: 0,
            reports: Vec::new(),
        }
    }

    /// Runs `ticks` steps of `dt` seconds, handing each step's reports to `observe`.
    pub(crate) fn run(
        &mut self,
        ticks: u32,
        dt: f32,
        mut observe: impl FnMut(u32, &[EnemyReport]),
    ) -> Summary {
        let mut summary = Summary::default();
        for _ in 0..ticks {
            self.step(dt);
            observe(self.tick, &self.reports);
            for report in &self.reports {
                summary.transitions += usize::from(report.previous.is_some());
                summary.searches += usize::from(report.searched);
                match report.intent {
                    Some(Intent::Fire { .. }) => summary.shots += 1,
                    Some(Intent::Strike) => summary.strikes += 1,
                    None => {}
                }
            }
        }
        summary.ticks = self.tick;
        summary.player = self.player.body.position();
        summary
    }

    /// Enemies and their bodies in tick order.
    pub(crate) fn level(&self) -> &Level {
        &self.level
    }

    fn step(&mut self, dt: f32) {
        self.tick += 1;
        self.deliver_events();

        self.player.steer();
        let target = TargetSnapshot::of(&self.player.body);
        self.reports.clear();
        let Level {
            grid,
            currents,
            squad,
            ..
        } = &mut self.level;
        squad.tick_all(dt, Some(target), &*grid, &*currents, &mut self.reports);

        advance(&mut self.player.body, dt, grid, currents);
        for member in squad.members_mut() {
            advance(&mut member.body, dt, grid, currents);
        }
    }

    fn deliver_events(&mut self) {
        while let Some(event) = self.level.events.get(self.next_event).copied() {
            if event.tick > self.tick {
                break;
            }
            self.next_event += 1;

            let id = EnemyId::new(event.enemy);
            let Some(member) = self.level.squad.get_mut(id) else {
                continue;
            };
            tracing::info!(tick = self.tick, enemy = event.enemy, action = ?event.action, "event");
            match event.action {
                EventAction::Hit => member.enemy.on_hit(),
                EventAction::Kill => member.enemy.on_death(),
            }
        }
    }
}

/// Integrates a body and lets the currents carry it, refusing moves into rock.
fn advance(body: &mut PointMass, dt: f32, grid: &LevelGrid, currents: &CurrentField) {
    let before = body.position();
    body.integrate(dt);
    currents.apply_to(body.position_mut(), dt);

    let blocked = grid
        .tile_at(body.position())
        .map_or(true, |tile| !grid.obstacle_at(tile).is_passable());
    if blocked {
        body.set_position(before);
        body.set_velocity(Vec2::ZERO);
    }
}
