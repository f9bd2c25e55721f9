use glam::Vec2;
use theseus_core::{ConfigError, EnemyKind, Intent, SirenConfig};

use crate::{Action, Behavior, Context, Steering};

/// States of the siren's patrol-and-ambush cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SirenState {
    /// Perched and silent.
    Idle,
    /// Perched and firing at targets in range.
    Singing,
    /// Lifting off toward the next waypoint.
    Takeoff,
    /// Flying to the next waypoint.
    Flying,
    /// Settling onto the reached waypoint.
    Landing,
    /// Reeling from a hit.
    Stunned,
    /// Dead; no further updates.
    Dying,
}

/// Data the siren captures on state entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SirenMemory {
    /// Index of the waypoint the siren is perched on or flying to.
    pub waypoint: usize,
}

/// Ranged ambusher that sings from perches and flies between them.
///
/// A siren with a single waypoint never leaves it.
#[derive(Clone, Debug, PartialEq)]
pub struct Siren {
    config: SirenConfig,
    waypoints: Vec<Vec2>,
}

impl Siren {
    /// Creates a siren that visits `waypoints` in order, starting at the first.
    pub fn new(config: SirenConfig, waypoints: Vec<Vec2>) -> Result<Self, ConfigError> {
        config.validate()?;
        if waypoints.is_empty() {
            return Err(ConfigError::ZeroCount { field: "waypoints" });
        }
        Ok(Self { config, waypoints })
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &SirenConfig {
        &self.config
    }

    /// Perches in visiting order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Whether the siren never leaves its only perch.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.waypoints.len() == 1
    }

    /// Whether a listener `distance` away should hear the song.
    #[must_use]
    pub fn audible(&self, state: SirenState, distance: f32) -> bool {
        state == SirenState::Singing && distance <= self.config.hear_range
    }

    fn waypoint(&self, index: usize) -> Vec2 {
        self.waypoints
            .get(index % self.waypoints.len().max(1))
            .copied()
            .unwrap_or_default()
    }

    fn heading(&self, memory: &SirenMemory, context: &Context) -> Vec2 {
        context.heading_to(self.waypoint(memory.waypoint))
    }
}

impl Behavior for Siren {
    type State = SirenState;
    type Memory = SirenMemory;

    const KIND: EnemyKind = EnemyKind::Siren;

    fn initial_state(&self) -> SirenState {
        SirenState::Idle
    }

    fn initial_memory(&self) -> SirenMemory {
        SirenMemory::default()
    }

    fn stunned_state(&self) -> SirenState {
        SirenState::Stunned
    }

    fn dying_state(&self) -> SirenState {
        SirenState::Dying
    }

    fn stun_time(&self) -> f32 {
        self.config.stun_time
    }

    fn admits(&self, state: SirenState) -> bool {
        !(self.is_stationary()
            && matches!(
                state,
                SirenState::Takeoff | SirenState::Flying | SirenState::Landing
            ))
    }

    fn transition(
        &self,
        state: SirenState,
        memory: &SirenMemory,
        context: &Context,
    ) -> SirenState {
        let config = &self.config;
        let elapsed = context.elapsed_in_state;
        match state {
            SirenState::Idle if elapsed >= config.idle_time => SirenState::Singing,
            SirenState::Singing if elapsed >= config.singing_time => {
                if self.is_stationary() {
                    SirenState::Idle
                } else {
                    SirenState::Takeoff
                }
            }
            SirenState::Takeoff if elapsed >= config.takeoff_time => SirenState::Flying,
            SirenState::Flying
                if context.position.distance(self.waypoint(memory.waypoint))
                    <= config.proximity =>
            {
                SirenState::Landing
            }
            SirenState::Landing if elapsed >= config.landing_time => SirenState::Idle,
            _ => state,
        }
    }

    fn enter(
        &self,
        state: SirenState,
        memory: &mut SirenMemory,
        _context: &Context,
    ) -> Option<Intent> {
        if state == SirenState::Takeoff {
            memory.waypoint = (memory.waypoint + 1) % self.waypoints.len().max(1);
        }
        None
    }

    fn action(&self, state: SirenState, memory: &SirenMemory, context: &Context) -> Action {
        let config = &self.config;
        match state {
            SirenState::Singing => {
                let Some(target) = context.target() else {
                    return Action::HOLD;
                };
                let in_range = context
                    .distance_to_target()
                    .is_some_and(|distance| distance <= config.attack_range);
                let direction = context.heading_to(target.led_by(config.lead_time));
                if in_range
                    && context.since_last_attack >= config.attack_cooldown_time
                    && direction != Vec2::ZERO
                {
                    Action::HOLD.with_intent(Intent::Fire { direction })
                } else {
                    Action::HOLD
                }
            }
            SirenState::Takeoff => Action::steer(Steering::Direct(
                self.heading(memory, context) * config.takeoff_speed,
            )),
            SirenState::Flying => Action::steer(Steering::Direct(
                self.heading(memory, context) * config.fly_speed,
            )),
            SirenState::Idle | SirenState::Landing | SirenState::Stunned | SirenState::Dying => {
                Action::HOLD
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theseus_core::{Perception, TargetSnapshot};

    fn context(position: Vec2, perception: Perception, elapsed_in_state: f32) -> Context {
        Context {
            position,
            perception,
            perceive: true,
            elapsed_in_state,
            since_last_attack: f32::INFINITY,
            now: 0.0,
        }
    }

    fn patrolling() -> Siren {
        Siren::new(
            SirenConfig::default(),
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
        )
        .expect("valid siren")
    }

    #[test]
    fn sirens_need_a_perch() {
        let error = Siren::new(SirenConfig::default(), Vec::new()).expect_err("no waypoints");
        assert_eq!(error, ConfigError::ZeroCount { field: "waypoints" });
    }

    #[test]
    fn takeoff_targets_the_next_waypoint_and_wraps() {
        let siren = patrolling();
        let mut memory = siren.initial_memory();
        let still = context(Vec2::ZERO, Perception::alone(), 0.0);

        let _ = siren.enter(SirenState::Takeoff, &mut memory, &still);
        assert_eq!(memory.waypoint, 1);
        let _ = siren.enter(SirenState::Takeoff, &mut memory, &still);
        assert_eq!(memory.waypoint, 0);
    }

    #[test]
    fn flying_lands_within_proximity_of_the_waypoint() {
        let siren = patrolling();
        let memory = SirenMemory { waypoint: 1 };

        let en_route = context(Vec2::new(5.0, 0.0), Perception::alone(), 0.1);
        assert_eq!(
            siren.transition(SirenState::Flying, &memory, &en_route),
            SirenState::Flying
        );
        match siren.action(SirenState::Flying, &memory, &en_route).steering {
            Steering::Direct(velocity) => {
                assert_eq!(velocity, Vec2::new(siren.config().fly_speed, 0.0));
            }
            other => panic!("expected direct steering, got {other:?}"),
        }

        let arrived = context(Vec2::new(9.8, 0.0), Perception::alone(), 0.1);
        assert_eq!(
            siren.transition(SirenState::Flying, &memory, &arrived),
            SirenState::Landing
        );
    }

    #[test]
    fn singing_fires_at_the_led_target_once_the_cooldown_elapses() {
        let siren = patrolling();
        let memory = siren.initial_memory();
        let target = TargetSnapshot::new(Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0));
        let mut ready = context(Vec2::ZERO, Perception::visible(target), 0.0);

        let action = siren.action(SirenState::Singing, &memory, &ready);
        let expected = Vec2::new(1.0, 1.0).normalize();
        match action.intent {
            Some(Intent::Fire { direction }) => {
                assert!((direction - expected).length() < 1e-6, "got {direction:?}");
            }
            other => panic!("expected a shot, got {other:?}"),
        }
        assert_eq!(action.steering, Steering::Hold);

        ready.since_last_attack = siren.config().attack_cooldown_time * 0.5;
        assert_eq!(siren.action(SirenState::Singing, &memory, &ready).intent, None);
    }

    #[test]
    fn stationary_sirens_alternate_between_idle_and_singing() {
        let siren = Siren::new(SirenConfig::default(), vec![Vec2::ZERO]).expect("valid siren");
        let memory = siren.initial_memory();
        let done = context(Vec2::ZERO, Perception::alone(), 100.0);

        assert_eq!(
            siren.transition(SirenState::Idle, &memory, &done),
            SirenState::Singing
        );
        assert_eq!(
            siren.transition(SirenState::Singing, &memory, &done),
            SirenState::Idle
        );
        assert!(!siren.admits(SirenState::Flying));
        assert!(siren.admits(SirenState::Stunned));
    }
}
