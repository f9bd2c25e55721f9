use glam::Vec2;
use theseus_core::{ConfigError, EnemyKind, HydraConfig, Intent};

use crate::{Action, Behavior, Context};

/// States of the hydra's ranged-attack cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HydraState {
    /// Submerged, waiting for a target.
    Idle,
    /// Tracking a target in firing range.
    Active,
    /// Winding up a splash.
    Priming,
    /// Releasing a splash.
    Splashing,
    /// Reeling from a hit.
    Stunned,
    /// Dead; no further updates.
    Dying,
}

/// Stationary turret that splashes distant targets and strikes close ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hydra {
    config: HydraConfig,
}

impl Hydra {
    /// Creates a hydra after validating its tuning.
    pub fn new(config: HydraConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &HydraConfig {
        &self.config
    }

    fn in_reach(&self, context: &Context) -> bool {
        context
            .distance_to_target()
            .is_some_and(|distance| distance <= self.config.hitting_range)
    }
}

impl Behavior for Hydra {
    type State = HydraState;
    type Memory = ();

    const KIND: EnemyKind = EnemyKind::Hydra;

    fn initial_state(&self) -> HydraState {
        HydraState::Idle
    }

    fn initial_memory(&self) {}

    fn stunned_state(&self) -> HydraState {
        HydraState::Stunned
    }

    fn dying_state(&self) -> HydraState {
        HydraState::Dying
    }

    fn stun_time(&self) -> f32 {
        self.config.stun_time
    }

    fn transition(&self, state: HydraState, _memory: &(), context: &Context) -> HydraState {
        let config = &self.config;
        let engaged = context.sees_target_within(config.firing_range);
        match state {
            HydraState::Idle if context.perceive && engaged => HydraState::Active,
            HydraState::Active if context.perceive && !engaged => HydraState::Idle,
            // A target within reach is struck, never splashed.
            HydraState::Active
                if !self.in_reach(context)
                    && context.since_last_attack >= config.attack_cooldown_time =>
            {
                HydraState::Priming
            }
            HydraState::Priming if context.elapsed_in_state >= config.priming_time => {
                HydraState::Splashing
            }
            HydraState::Splashing if context.elapsed_in_state >= config.splash_time => {
                HydraState::Active
            }
            _ => state,
        }
    }

    fn enter(&self, state: HydraState, _memory: &mut (), context: &Context) -> Option<Intent> {
        if state != HydraState::Splashing {
            return None;
        }
        let direction = context.heading_to(context.target()?.position);
        (direction != Vec2::ZERO).then_some(Intent::Fire { direction })
    }

    fn action(&self, state: HydraState, _memory: &(), context: &Context) -> Action {
        if state == HydraState::Active
            && self.in_reach(context)
            && context.since_last_attack >= self.config.strike_cooldown_time
        {
            Action::HOLD.with_intent(Intent::Strike)
        } else {
            Action::HOLD
        }
    }
}
