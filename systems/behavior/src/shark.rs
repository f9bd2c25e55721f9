use glam::Vec2;
use theseus_core::{ConfigError, EnemyKind, Intent, SharkConfig, SpeedProfile};

use crate::{Action, Behavior, Context, Steering};

/// States of the shark's hunt-and-charge cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SharkState {
    /// Drifting in place.
    Idle,
    /// Swimming back toward the guarded treasure.
    Patrol,
    /// Closing in on a visible target.
    Approach,
    /// Chasing a close target at full speed for a limited time.
    Enraged,
    /// Holding still before a charge.
    PauseBeforeAttack,
    /// Charging along the aim captured on entry.
    Attack,
    /// Recovering after a charge.
    PauseAfterAttack,
    /// Reeling from a hit.
    Stunned,
    /// Dead; no further updates.
    Dying,
}

/// Data the shark captures on state entry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SharkMemory {
    /// Unit direction of the current or most recent charge.
    pub aim: Vec2,
    /// Whether the shark is in a rage.
    pub enraged: bool,
    /// Machine time at which the last rage ended.
    pub calmed_at: f32,
}

/// Melee hunter that charges the target in straight, readable lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shark {
    config: SharkConfig,
    guard_post: Option<Vec2>,
}

impl Shark {
    /// Creates a shark after validating its tuning.
    pub fn new(config: SharkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            guard_post: None,
        })
    }

    /// Assigns the treasure the shark returns to while idle.
    ///
    /// Has no effect unless the tuning sets a guard radius.
    #[must_use]
    pub fn guarding(mut self, post: Vec2) -> Self {
        self.guard_post = Some(post);
        self
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &SharkConfig {
        &self.config
    }

    /// Whether the shark is engaged with its target.
    #[must_use]
    pub fn is_aggressive(&self, state: SharkState) -> bool {
        matches!(
            state,
            SharkState::Approach
                | SharkState::Enraged
                | SharkState::PauseBeforeAttack
                | SharkState::Attack
                | SharkState::PauseAfterAttack
        )
    }

    /// Whether touching the target deals damage in `state`.
    #[must_use]
    pub fn can_hurt_target(&self, state: SharkState) -> bool {
        matches!(state, SharkState::Attack | SharkState::PauseAfterAttack)
    }

    /// Whether a listener `distance` away should hear the hunt.
    #[must_use]
    pub fn audible(&self, state: SharkState, distance: f32) -> bool {
        self.is_aggressive(state) && distance <= self.config.hear_range
    }

    /// Damage dealt on contact in `state`.
    #[must_use]
    pub fn contact_damage(&self, state: SharkState) -> f32 {
        if self.can_hurt_target(state) {
            self.config.contact_damage
        } else {
            0.0
        }
    }

    fn guard(&self) -> Option<(Vec2, f32)> {
        Some((self.guard_post?, self.config.guard_radius?))
    }

    fn strayed(&self, position: Vec2) -> bool {
        self.guard()
            .is_some_and(|(post, radius)| post.distance(position) > radius)
    }

    fn sees_within_enrage_range(&self, context: &Context) -> bool {
        self.config
            .enrage_range
            .is_some_and(|range| context.sees_target_within(range))
    }

    fn enrages(&self, memory: &SharkMemory, context: &Context) -> bool {
        self.sees_within_enrage_range(context)
            && context.now - memory.calmed_at >= self.config.enrage_interval
    }
}

impl Behavior for Shark {
    type State = SharkState;
    type Memory = SharkMemory;

    const KIND: EnemyKind = EnemyKind::Shark;

    fn initial_state(&self) -> SharkState {
        SharkState::Idle
    }

    fn initial_memory(&self) -> SharkMemory {
        SharkMemory::default()
    }

    fn stunned_state(&self) -> SharkState {
        SharkState::Stunned
    }

    fn dying_state(&self) -> SharkState {
        SharkState::Dying
    }

    fn stun_time(&self) -> f32 {
        self.config.stun_time
    }

    fn admits(&self, state: SharkState) -> bool {
        match state {
            SharkState::Patrol => self.guard().is_some(),
            SharkState::Enraged => self.config.enrage_range.is_some(),
            _ => true,
        }
    }

    fn transition(
        &self,
        state: SharkState,
        memory: &SharkMemory,
        context: &Context,
    ) -> SharkState {
        let config = &self.config;
        match state {
            SharkState::Idle | SharkState::Patrol if context.perceive => {
                if self.enrages(memory, context) {
                    SharkState::Enraged
                } else if context.sees_target_within(config.approach_range) {
                    SharkState::Approach
                } else if self.strayed(context.position) {
                    SharkState::Patrol
                } else {
                    SharkState::Idle
                }
            }
            SharkState::Approach if context.perceive => {
                if !context.sees_target_within(config.approach_range) {
                    SharkState::Idle
                } else if self.enrages(memory, context) {
                    SharkState::Enraged
                } else if context.sees_target_within(config.attack_range) {
                    SharkState::PauseBeforeAttack
                } else {
                    SharkState::Approach
                }
            }
            SharkState::Enraged if context.elapsed_in_state >= config.enrage_duration => {
                SharkState::Idle
            }
            SharkState::Enraged if context.perceive => {
                if !self.sees_within_enrage_range(context) {
                    SharkState::Idle
                } else if context.sees_target_within(config.attack_range) {
                    SharkState::PauseBeforeAttack
                } else {
                    SharkState::Enraged
                }
            }
            SharkState::PauseBeforeAttack
                if context.elapsed_in_state >= config.attack_windup_time =>
            {
                SharkState::Attack
            }
            SharkState::Attack if context.elapsed_in_state >= config.attack_duration => {
                SharkState::PauseAfterAttack
            }
            SharkState::PauseAfterAttack
                if context.elapsed_in_state >= config.attack_cooldown_time =>
            {
                SharkState::Idle
            }
            _ => state,
        }
    }

    fn enter(
        &self,
        state: SharkState,
        memory: &mut SharkMemory,
        context: &Context,
    ) -> Option<Intent> {
        if state == SharkState::Enraged {
            memory.enraged = true;
        } else if memory.enraged {
            memory.enraged = false;
            memory.calmed_at = context.now;
        }
        if state == SharkState::Attack {
            // A vanished target leaves the charge with no heading at all.
            memory.aim = context
                .target()
                .map(|target| context.heading_to(target.led_by(self.config.lead_time)))
                .unwrap_or(Vec2::ZERO);
        }
        None
    }

    fn action(&self, state: SharkState, memory: &SharkMemory, context: &Context) -> Action {
        match state {
            SharkState::Approach => match context.target() {
                Some(target) => Action::steer(Steering::Navigate {
                    goal: target.position,
                    profile: SpeedProfile::Chase,
                    speed: self.config.approach_speed,
                }),
                None => Action::HOLD,
            },
            SharkState::Enraged => match context.target() {
                Some(target) => Action::steer(Steering::Navigate {
                    goal: target.position,
                    profile: SpeedProfile::Enrage,
                    speed: self.config.enrage_speed,
                }),
                None => Action::HOLD,
            },
            SharkState::Patrol => match self.guard() {
                Some((post, _)) => Action::steer(Steering::Navigate {
                    goal: post,
                    profile: SpeedProfile::Wander,
                    speed: self.config.patrol_speed,
                }),
                None => Action::HOLD,
            },
            SharkState::Attack => {
                Action::steer(Steering::Direct(memory.aim * self.config.attack_speed))
            }
            SharkState::Idle
            | SharkState::PauseBeforeAttack
            | SharkState::PauseAfterAttack
            | SharkState::Stunned
            | SharkState::Dying => Action::HOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theseus_core::{Perception, TargetSnapshot};

    fn context(position: Vec2, perception: Perception, perceive: bool) -> Context {
        Context {
            position,
            perception,
            perceive,
            elapsed_in_state: 0.0,
            since_last_attack: f32::INFINITY,
            now: 0.0,
        }
    }

    fn target_at(x: f32, y: f32) -> TargetSnapshot {
        TargetSnapshot::new(Vec2::new(x, y), Vec2::ZERO)
    }

    #[test]
    fn idle_ignores_targets_between_eligible_ticks() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let memory = shark.initial_memory();
        let near = Perception::visible(target_at(3.0, 0.0));

        let skipped = shark.transition(
            SharkState::Idle,
            &memory,
            &context(Vec2::ZERO, near, false),
        );
        let evaluated = shark.transition(
            SharkState::Idle,
            &memory,
            &context(Vec2::ZERO, near, true),
        );

        assert_eq!(skipped, SharkState::Idle);
        assert_eq!(evaluated, SharkState::Approach);
    }

    #[test]
    fn hidden_targets_do_not_draw_the_shark() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let hidden = Perception::hidden(target_at(3.0, 0.0));
        let next = shark.transition(
            SharkState::Idle,
            &shark.initial_memory(),
            &context(Vec2::ZERO, hidden, true),
        );
        assert_eq!(next, SharkState::Idle);
    }

    #[test]
    fn losing_the_target_ends_the_approach() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let next = shark.transition(
            SharkState::Approach,
            &shark.initial_memory(),
            &context(Vec2::ZERO, Perception::alone(), true),
        );
        assert_eq!(next, SharkState::Idle);
    }

    #[test]
    fn charge_aim_leads_a_moving_target() {
        let shark = Shark::new(SharkConfig {
            lead_time: 1.0,
            ..SharkConfig::default()
        })
        .expect("valid tuning");
        let mut memory = shark.initial_memory();
        let target = TargetSnapshot::new(Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0));

        let intent = shark.enter(
            SharkState::Attack,
            &mut memory,
            &context(Vec2::ZERO, Perception::visible(target), false),
        );

        assert_eq!(intent, None);
        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!((memory.aim - expected).length() < 1e-6, "got {:?}", memory.aim);
    }

    #[test]
    fn vanished_target_clears_a_stale_aim() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let mut memory = SharkMemory {
            aim: Vec2::X,
            ..shark.initial_memory()
        };
        let alone = context(Vec2::ZERO, Perception::alone(), false);

        let _ = shark.enter(SharkState::Attack, &mut memory, &alone);

        assert_eq!(memory.aim, Vec2::ZERO);
        assert_eq!(
            shark.action(SharkState::Attack, &memory, &alone).steering,
            Steering::Direct(Vec2::ZERO)
        );
    }

    fn enraging() -> Shark {
        Shark::new(SharkConfig {
            enrage_range: Some(8.0),
            ..SharkConfig::default()
        })
        .expect("valid tuning")
    }

    #[test]
    fn close_targets_enrage_once_the_interval_has_passed() {
        let shark = enraging();
        let memory = shark.initial_memory();
        let close = Perception::visible(target_at(7.0, 0.0));
        let rested = Context {
            now: shark.config().enrage_interval,
            ..context(Vec2::ZERO, close, true)
        };
        let early = Context {
            now: shark.config().enrage_interval / 2.0,
            ..rested
        };

        assert_eq!(shark.transition(SharkState::Idle, &memory, &rested), SharkState::Enraged);
        assert_eq!(shark.transition(SharkState::Approach, &memory, &rested), SharkState::Enraged);
        assert_eq!(shark.transition(SharkState::Idle, &memory, &early), SharkState::Approach);

        let far = Context {
            perception: Perception::visible(target_at(12.0, 0.0)),
            ..rested
        };
        assert_eq!(shark.transition(SharkState::Idle, &memory, &far), SharkState::Approach);
    }

    #[test]
    fn sharks_without_an_enrage_range_never_enrage() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let rested = Context {
            now: 100.0,
            ..context(Vec2::ZERO, Perception::visible(target_at(3.0, 0.0)), true)
        };

        assert!(!shark.admits(SharkState::Enraged));
        assert!(enraging().admits(SharkState::Enraged));
        assert_eq!(
            shark.transition(SharkState::Idle, &shark.initial_memory(), &rested),
            SharkState::Approach
        );
    }

    #[test]
    fn rage_ends_on_timeout_or_when_the_target_slips_away() {
        let shark = enraging();
        let config = *shark.config();
        let memory = SharkMemory {
            enraged: true,
            ..shark.initial_memory()
        };
        let chasing = context(Vec2::ZERO, Perception::visible(target_at(7.0, 0.0)), true);
        let spent = Context {
            elapsed_in_state: config.enrage_duration,
            perceive: false,
            ..chasing
        };
        let escaped = context(Vec2::ZERO, Perception::visible(target_at(9.0, 0.0)), true);
        let striking = context(Vec2::ZERO, Perception::visible(target_at(4.0, 0.0)), true);

        assert_eq!(shark.transition(SharkState::Enraged, &memory, &chasing), SharkState::Enraged);
        assert_eq!(shark.transition(SharkState::Enraged, &memory, &spent), SharkState::Idle);
        assert_eq!(shark.transition(SharkState::Enraged, &memory, &escaped), SharkState::Idle);
        assert_eq!(
            shark.transition(SharkState::Enraged, &memory, &striking),
            SharkState::PauseBeforeAttack
        );
        match shark.action(SharkState::Enraged, &memory, &chasing).steering {
            Steering::Navigate { profile, speed, .. } => {
                assert_eq!(profile, SpeedProfile::Enrage);
                assert_eq!(speed, config.enrage_speed);
            }
            other => panic!("expected navigation, got {other:?}"),
        }
    }

    #[test]
    fn leaving_a_rage_records_when_it_calmed() {
        let shark = enraging();
        let mut memory = shark.initial_memory();
        let at = |now| Context {
            now,
            ..context(Vec2::ZERO, Perception::alone(), false)
        };

        let _ = shark.enter(SharkState::Enraged, &mut memory, &at(6.0));
        assert!(memory.enraged);
        assert_eq!(memory.calmed_at, 0.0);

        let _ = shark.enter(SharkState::Stunned, &mut memory, &at(7.5));
        assert!(!memory.enraged);
        assert_eq!(memory.calmed_at, 7.5);

        let _ = shark.enter(SharkState::Idle, &mut memory, &at(9.0));
        assert_eq!(memory.calmed_at, 7.5);
    }

    #[test]
    fn guarding_shark_patrols_home_when_it_strays() {
        let shark = Shark::new(SharkConfig {
            guard_radius: Some(2.0),
            ..SharkConfig::default()
        })
        .expect("valid tuning")
        .guarding(Vec2::new(10.0, 10.0));
        let memory = shark.initial_memory();
        let alone = Perception::alone();

        let far = context(Vec2::ZERO, alone, true);
        assert_eq!(
            shark.transition(SharkState::Idle, &memory, &far),
            SharkState::Patrol
        );
        match shark.action(SharkState::Patrol, &memory, &far).steering {
            Steering::Navigate { goal, profile, .. } => {
                assert_eq!(goal, Vec2::new(10.0, 10.0));
                assert_eq!(profile, SpeedProfile::Wander);
            }
            other => panic!("expected navigation, got {other:?}"),
        }

        let home = context(Vec2::new(9.0, 10.0), alone, true);
        assert_eq!(
            shark.transition(SharkState::Patrol, &memory, &home),
            SharkState::Idle
        );
    }

    #[test]
    fn patrol_is_only_admitted_with_a_guard_radius() {
        let roaming = Shark::new(SharkConfig::default()).expect("valid tuning");
        assert!(!roaming.admits(SharkState::Patrol));
        assert!(!roaming.guarding(Vec2::ZERO).admits(SharkState::Patrol));

        let guarding = Shark::new(SharkConfig {
            guard_radius: Some(1.0),
            ..SharkConfig::default()
        })
        .expect("valid tuning")
        .guarding(Vec2::ZERO);
        assert!(guarding.admits(SharkState::Patrol));
    }

    #[test]
    fn aggression_queries_follow_the_charge_cycle() {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        assert!(!shark.is_aggressive(SharkState::Idle));
        assert!(shark.is_aggressive(SharkState::Approach));
        assert!(shark.is_aggressive(SharkState::Enraged));
        assert!(!shark.can_hurt_target(SharkState::PauseBeforeAttack));
        assert!(shark.can_hurt_target(SharkState::Attack));
        assert_eq!(shark.contact_damage(SharkState::Stunned), 0.0);
        assert_eq!(
            shark.contact_damage(SharkState::PauseAfterAttack),
            shark.config().contact_damage
        );
        assert!(shark.audible(SharkState::Attack, shark.config().hear_range));
        assert!(!shark.audible(SharkState::Attack, shark.config().hear_range + 1.0));
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let error = Shark::new(SharkConfig {
            attack_range: 30.0,
            ..SharkConfig::default()
        })
        .expect_err("attack range outside approach range");
        assert!(matches!(error, ConfigError::RangeOrder { .. }));
    }
}
