#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behavior state machines.
//!
//! Each enemy species is a [`Behavior`]: a closed state enum with a pure
//! `transition` function and a pure `action` function. [`StateMachine`]
//! wraps a behavior with the parts every species shares: simulation clocks,
//! latched hits, stun pre-emption, the terminal dying state and recovery
//! from states the behavior does not admit.

mod hydra;
mod shark;
mod siren;

use std::fmt;

use glam::Vec2;
use theseus_core::{EnemyId, EnemyKind, Intent, Perception, SpeedProfile, TargetSnapshot};

pub use hydra::{Hydra, HydraState};
pub use shark::{Shark, SharkMemory, SharkState};
pub use siren::{Siren, SirenMemory, SirenState};

/// How an enemy wants to move on the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Steering {
    /// Come to rest.
    Hold,
    /// Match the provided velocity without consulting the path search.
    Direct(Vec2),
    /// Follow the path search toward `goal` at `speed`.
    Navigate {
        /// World-space position to reach.
        goal: Vec2,
        /// Profile used to weigh path costs.
        profile: SpeedProfile,
        /// Cruising speed along the chosen first step.
        speed: f32,
    },
}

/// Output of a behavior for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Action {
    /// Requested movement.
    pub steering: Steering,
    /// Attack request, if any.
    pub intent: Option<Intent>,
}

impl Action {
    /// Stand still and do nothing.
    pub const HOLD: Action = Action {
        steering: Steering::Hold,
        intent: None,
    };

    /// Moves without attacking.
    #[must_use]
    pub const fn steer(steering: Steering) -> Self {
        Self {
            steering,
            intent: None,
        }
    }

    /// Attaches an attack request.
    #[must_use]
    pub const fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }
}

/// Everything a behavior may consult while deciding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Context {
    /// World position of the enemy.
    pub position: Vec2,
    /// Target and visibility as sensed this tick.
    pub perception: Perception,
    /// Whether range and sight checks may drive transitions this tick.
    pub perceive: bool,
    /// Seconds spent in the current state.
    pub elapsed_in_state: f32,
    /// Seconds since the last emitted intent, infinite before the first one.
    pub since_last_attack: f32,
    /// Seconds the machine has run, stuns included.
    pub now: f32,
}

impl Context {
    /// The hunted target, if it still exists.
    #[must_use]
    pub fn target(&self) -> Option<TargetSnapshot> {
        self.perception.target
    }

    /// Distance to the target, if it still exists.
    #[must_use]
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target()
            .map(|target| target.position.distance(self.position))
    }

    /// Whether the target is visible and no farther than `range`.
    #[must_use]
    pub fn sees_target_within(&self, range: f32) -> bool {
        self.perception.line_of_sight
            && self
                .distance_to_target()
                .is_some_and(|distance| distance <= range)
    }

    /// Unit vector from the enemy toward `point`, zero when already there.
    #[must_use]
    pub fn heading_to(&self, point: Vec2) -> Vec2 {
        (point - self.position).normalize_or_zero()
    }
}

/// Species-specific rules driven by a [`StateMachine`].
///
/// `transition` and `action` must be pure; anything that has to survive
/// between ticks lives in `Memory` and is only written by `enter`.
pub trait Behavior {
    /// Closed set of states.
    type State: Copy + Eq + fmt::Debug;
    /// Per-enemy data captured on state entry.
    type Memory: fmt::Debug;

    /// Species tag reported in logs.
    const KIND: EnemyKind;

    /// State an enemy starts in and falls back to.
    fn initial_state(&self) -> Self::State;

    /// Fresh memory for a newly spawned enemy.
    fn initial_memory(&self) -> Self::Memory;

    /// State entered when a hit lands.
    fn stunned_state(&self) -> Self::State;

    /// Terminal state entered on death.
    fn dying_state(&self) -> Self::State;

    /// Seconds a hit keeps the enemy stunned.
    fn stun_time(&self) -> f32;

    /// Whether this particular configuration can ever reach `state`.
    fn admits(&self, _state: Self::State) -> bool {
        true
    }

    /// Next state given the current one. Returning `state` means no change.
    ///
    /// Never called for the stunned or dying states.
    fn transition(
        &self,
        state: Self::State,
        memory: &Self::Memory,
        context: &Context,
    ) -> Self::State;

    /// Entry hook for `state`, run once per transition.
    fn enter(
        &self,
        _state: Self::State,
        _memory: &mut Self::Memory,
        _context: &Context,
    ) -> Option<Intent> {
        None
    }

    /// Desired steering and attack for `state`.
    fn action(&self, state: Self::State, memory: &Self::Memory, context: &Context) -> Action;
}

/// A state change observed during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S> {
    /// State that was left.
    pub from: S,
    /// State that was entered.
    pub to: S,
}

/// Result of advancing a state machine by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step<S> {
    /// State active after the step.
    pub state: S,
    /// The transition taken this tick, if any.
    pub transition: Option<Transition<S>>,
    /// What the enemy wants to do this tick.
    pub action: Action,
}

/// One enemy's behavior together with its clocks and latched signals.
#[derive(Debug)]
pub struct StateMachine<B: Behavior> {
    id: EnemyId,
    behavior: B,
    state: B::State,
    memory: B::Memory,
    clock: f32,
    entered_at: f32,
    last_attack_at: Option<f32>,
    pending_hit: bool,
}

impl<B: Behavior> StateMachine<B> {
    /// Creates a machine in the behavior's initial state.
    #[must_use]
    pub fn new(id: EnemyId, behavior: B) -> Self {
        let state = behavior.initial_state();
        let memory = behavior.initial_memory();
        Self {
            id,
            behavior,
            state,
            memory,
            clock: 0.0,
            entered_at: 0.0,
            last_attack_at: None,
            pending_hit: false,
        }
    }

    /// Identifier of the enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> B::State {
        self.state
    }

    /// Data captured on state entry.
    #[must_use]
    pub fn memory(&self) -> &B::Memory {
        &self.memory
    }

    /// Species rules and tuning.
    #[must_use]
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Whether the enemy has died.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state == self.behavior.dying_state()
    }

    /// Latches a hit; the next step enters the stunned state before anything else.
    pub fn on_hit(&mut self) {
        if self.is_terminal() {
            tracing::warn!(
                enemy = self.id.get(),
                kind = ?B::KIND,
                "hit ignored by dead enemy"
            );
            return;
        }
        self.pending_hit = true;
    }

    /// Moves the enemy into its terminal state immediately.
    pub fn kill(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.pending_hit = false;
        let dying = self.behavior.dying_state();
        self.log_transition(self.state, dying);
        self.state = dying;
        self.entered_at = self.clock;
    }

    /// Forces the active state, bypassing transition rules and entry hooks.
    ///
    /// Used by loaders resuming a saved encounter.
    pub fn restore(&mut self, state: B::State) {
        self.state = state;
        self.entered_at = self.clock;
    }

    /// Advances the machine by `dt` seconds.
    ///
    /// A latched hit pre-empts every other transition, and a hit while
    /// already stunned restarts the stun. Otherwise the stun timer is
    /// checked, then the behavior's own rules; at most one transition
    /// happens per step.
    pub fn step(
        &mut self,
        dt: f32,
        position: Vec2,
        perception: Perception,
        perceive: bool,
    ) -> Step<B::State> {
        if self.is_terminal() {
            return Step {
                state: self.state,
                transition: None,
                action: Action::HOLD,
            };
        }

        self.clock += dt.max(0.0);

        let next = if !self.behavior.admits(self.state) {
            debug_assert!(
                false,
                "{:?} enemy {} reached unreachable state {:?}",
                B::KIND,
                self.id.get(),
                self.state
            );
            tracing::error!(
                enemy = self.id.get(),
                kind = ?B::KIND,
                state = ?self.state,
                "illegal state, falling back to initial state"
            );
            Some(self.behavior.initial_state())
        } else if self.pending_hit {
            self.pending_hit = false;
            Some(self.behavior.stunned_state())
        } else if self.state == self.behavior.stunned_state() {
            let context = self.context(position, perception, perceive);
            (context.elapsed_in_state >= self.behavior.stun_time())
                .then(|| self.behavior.initial_state())
        } else {
            let context = self.context(position, perception, perceive);
            let next = self.behavior.transition(self.state, &self.memory, &context);
            (next != self.state).then_some(next)
        };

        let mut transition = None;
        let mut entry_intent = None;
        if let Some(next) = next {
            let (taken, intent) = self.change_state(next, position, perception, perceive);
            transition = Some(taken);
            entry_intent = intent;
        }

        let context = self.context(position, perception, perceive);
        let mut action = self.behavior.action(self.state, &self.memory, &context);
        if entry_intent.is_some() {
            action.intent = entry_intent;
        }
        if action.intent.is_some() {
            self.last_attack_at = Some(self.clock);
        }

        Step {
            state: self.state,
            transition,
            action,
        }
    }

    fn context(&self, position: Vec2, perception: Perception, perceive: bool) -> Context {
        Context {
            position,
            perception,
            perceive,
            elapsed_in_state: self.clock - self.entered_at,
            since_last_attack: self
                .last_attack_at
                .map_or(f32::INFINITY, |at| self.clock - at),
            now: self.clock,
        }
    }

    fn change_state(
        &mut self,
        next: B::State,
        position: Vec2,
        perception: Perception,
        perceive: bool,
    ) -> (Transition<B::State>, Option<Intent>) {
        let from = self.state;
        self.log_transition(from, next);
        self.state = next;
        self.entered_at = self.clock;
        let context = self.context(position, perception, perceive);
        let intent = self.behavior.enter(next, &mut self.memory, &context);
        (Transition { from, to: next }, intent)
    }

    fn log_transition(&self, from: B::State, to: B::State) {
        tracing::debug!(
            enemy = self.id.get(),
            kind = ?B::KIND,
            from = ?from,
            to = ?to,
            "state transition"
        );
    }
}
