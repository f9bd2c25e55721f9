//! Per-enemy tuning tables injected by the level loader before the first tick.
//!
//! Durations are expressed in seconds of simulation time, ranges and speeds in
//! world units. Every table deserializes with defaults for missing fields so a
//! level file only needs to mention what it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a tuning table is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A field holds a negative, infinite or NaN value.
    #[error("`{field}` must be a finite, non-negative number (got {value})")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A range that must nest inside another range does not.
    #[error("`{inner}` ({inner_value}) must not exceed `{outer}` ({outer_value})")]
    RangeOrder {
        /// Field expected to be the smaller range.
        inner: &'static str,
        /// Value of the smaller range.
        inner_value: f32,
        /// Field expected to be the larger range.
        outer: &'static str,
        /// Value of the larger range.
        outer_value: f32,
    },
    /// A count that must be positive is zero.
    #[error("`{field}` must be at least 1")]
    ZeroCount {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A smoothing factor falls outside `0.0..1.0`.
    #[error("`smoothing` must lie in 0.0..1.0 (got {0})")]
    Smoothing(f32),
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn nested(
    inner: &'static str,
    inner_value: f32,
    outer: &'static str,
    outer_value: f32,
) -> Result<(), ConfigError> {
    if inner_value <= outer_value {
        Ok(())
    } else {
        Err(ConfigError::RangeOrder {
            inner,
            inner_value,
            outer,
            outer_value,
        })
    }
}

/// Tuning for the shark's hunt-and-charge cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharkConfig {
    /// Distance at which a visible target draws the shark out of idling.
    pub approach_range: f32,
    /// Distance at which the shark stops to wind up a charge.
    pub attack_range: f32,
    /// Cruising speed while approaching.
    pub approach_speed: f32,
    /// Speed of the committed charge.
    pub attack_speed: f32,
    /// Pause before the charge starts.
    pub attack_windup_time: f32,
    /// Length of the charge itself.
    pub attack_duration: f32,
    /// Pause after the charge before the shark hunts again.
    pub attack_cooldown_time: f32,
    /// Time spent stunned after a spear hit.
    pub stun_time: f32,
    /// Distance within which an aggressive shark can be heard.
    pub hear_range: f32,
    /// Seconds of target velocity added when aiming a charge.
    pub lead_time: f32,
    /// Contact damage dealt while charging.
    pub contact_damage: f32,
    /// Radius around a guarded treasure the shark stays within while idle.
    pub guard_radius: Option<f32>,
    /// Cruising speed while patrolling back to a guarded treasure.
    pub patrol_speed: f32,
    /// Distance within which a visible target enrages the shark; unset sharks never enrage.
    pub enrage_range: Option<f32>,
    /// Longest a single rage lasts.
    pub enrage_duration: f32,
    /// Calm time required between two rages.
    pub enrage_interval: f32,
    /// Pursuit speed while enraged.
    pub enrage_speed: f32,
}

impl Default for SharkConfig {
    fn default() -> Self {
        Self {
            approach_range: 15.0,
            attack_range: 5.0,
            approach_speed: 4.0,
            attack_speed: 10.0,
            attack_windup_time: 0.5,
            attack_duration: 0.6,
            attack_cooldown_time: 1.0,
            stun_time: 2.0,
            hear_range: 20.0,
            lead_time: 0.25,
            contact_damage: 2.0,
            guard_radius: None,
            patrol_speed: 2.5,
            enrage_range: None,
            enrage_duration: 5.0,
            enrage_interval: 5.0,
            enrage_speed: 8.0,
        }
    }
}

impl SharkConfig {
    /// Checks every field and the nesting of the attack range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("approach_range", self.approach_range)?;
        non_negative("attack_range", self.attack_range)?;
        non_negative("approach_speed", self.approach_speed)?;
        non_negative("attack_speed", self.attack_speed)?;
        non_negative("attack_windup_time", self.attack_windup_time)?;
        non_negative("attack_duration", self.attack_duration)?;
        non_negative("attack_cooldown_time", self.attack_cooldown_time)?;
        non_negative("stun_time", self.stun_time)?;
        non_negative("hear_range", self.hear_range)?;
        non_negative("lead_time", self.lead_time)?;
        non_negative("contact_damage", self.contact_damage)?;
        non_negative("patrol_speed", self.patrol_speed)?;
        non_negative("enrage_duration", self.enrage_duration)?;
        non_negative("enrage_interval", self.enrage_interval)?;
        non_negative("enrage_speed", self.enrage_speed)?;
        if let Some(radius) = self.guard_radius {
            non_negative("guard_radius", radius)?;
        }
        if let Some(range) = self.enrage_range {
            non_negative("enrage_range", range)?;
        }
        nested(
            "attack_range",
            self.attack_range,
            "approach_range",
            self.approach_range,
        )
    }
}

/// Tuning for the siren's patrol-and-ambush cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SirenConfig {
    /// Time spent resting on a waypoint before singing.
    pub idle_time: f32,
    /// Time spent singing before taking off again.
    pub singing_time: f32,
    /// Time the take-off manoeuvre lasts before full flight.
    pub takeoff_time: f32,
    /// Time the landing manoeuvre lasts.
    pub landing_time: f32,
    /// Distance within which a singing siren fires at the target.
    pub attack_range: f32,
    /// Distance within which a singing siren can be heard.
    pub hear_range: f32,
    /// Distance to a waypoint that counts as arrival.
    pub proximity: f32,
    /// Cruising speed between waypoints.
    pub fly_speed: f32,
    /// Speed during take-off.
    pub takeoff_speed: f32,
    /// Minimum time between two shots.
    pub attack_cooldown_time: f32,
    /// Time spent stunned after a spear hit.
    pub stun_time: f32,
    /// Seconds of target velocity added when aiming a note.
    pub lead_time: f32,
}

impl Default for SirenConfig {
    fn default() -> Self {
        Self {
            idle_time: 2.0,
            singing_time: 3.0,
            takeoff_time: 0.5,
            landing_time: 0.5,
            attack_range: 8.0,
            hear_range: 12.0,
            proximity: 0.5,
            fly_speed: 6.0,
            takeoff_speed: 2.0,
            attack_cooldown_time: 1.0,
            stun_time: 2.0,
            lead_time: 1.0,
        }
    }
}

impl SirenConfig {
    /// Checks every field for finite, non-negative values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("idle_time", self.idle_time)?;
        non_negative("singing_time", self.singing_time)?;
        non_negative("takeoff_time", self.takeoff_time)?;
        non_negative("landing_time", self.landing_time)?;
        non_negative("attack_range", self.attack_range)?;
        non_negative("hear_range", self.hear_range)?;
        non_negative("proximity", self.proximity)?;
        non_negative("fly_speed", self.fly_speed)?;
        non_negative("takeoff_speed", self.takeoff_speed)?;
        non_negative("attack_cooldown_time", self.attack_cooldown_time)?;
        non_negative("stun_time", self.stun_time)?;
        non_negative("lead_time", self.lead_time)
    }
}

/// Tuning for the hydra's ranged-attack cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraConfig {
    /// Distance within which a visible target wakes the hydra.
    pub firing_range: f32,
    /// Distance within which the hydra strikes in melee.
    pub hitting_range: f32,
    /// Minimum time between two splashes.
    pub attack_cooldown_time: f32,
    /// Minimum time between two melee strikes.
    pub strike_cooldown_time: f32,
    /// Wind-up before a splash.
    pub priming_time: f32,
    /// Length of the splash animation.
    pub splash_time: f32,
    /// Time spent stunned after a spear hit.
    pub stun_time: f32,
}

impl Default for HydraConfig {
    fn default() -> Self {
        Self {
            firing_range: 15.0,
            hitting_range: 2.0,
            attack_cooldown_time: 1.5,
            strike_cooldown_time: 0.5,
            priming_time: 0.5,
            splash_time: 0.4,
            stun_time: 0.5,
        }
    }
}

impl HydraConfig {
    /// Checks every field and the nesting of the melee range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("firing_range", self.firing_range)?;
        non_negative("hitting_range", self.hitting_range)?;
        non_negative("attack_cooldown_time", self.attack_cooldown_time)?;
        non_negative("strike_cooldown_time", self.strike_cooldown_time)?;
        non_negative("priming_time", self.priming_time)?;
        non_negative("splash_time", self.splash_time)?;
        non_negative("stun_time", self.stun_time)?;
        nested(
            "hitting_range",
            self.hitting_range,
            "firing_range",
            self.firing_range,
        )
    }
}

/// Movement speeds the path search assumes for each [`SpeedProfile`](crate::SpeedProfile).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTable {
    /// Speed assumed while wandering.
    pub wander: f32,
    /// Speed assumed while chasing.
    pub chase: f32,
    /// Speed assumed while enraged.
    pub enrage: f32,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            wander: 2.5,
            chase: 4.0,
            enrage: 8.0,
        }
    }
}

impl SpeedTable {
    /// Speed associated with the provided profile.
    #[must_use]
    pub fn speed(&self, profile: crate::SpeedProfile) -> f32 {
        match profile {
            crate::SpeedProfile::Wander => self.wander,
            crate::SpeedProfile::Chase => self.chase,
            crate::SpeedProfile::Enrage => self.enrage,
        }
    }

    /// Checks every speed for finite, non-negative values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("wander", self.wander)?;
        non_negative("chase", self.chase)?;
        non_negative("enrage", self.enrage)
    }
}

/// Which path search implementation the controller consults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchVariant {
    /// Plain breadth-first expansion in neighbour order.
    #[default]
    BreadthFirst,
    /// Expansion ordered by current-aware traversal cost.
    CostPriority,
}

/// Scheduling and steering parameters shared by every enemy controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    /// Number of ticks between two perception-driven re-evaluations.
    pub stagger_period: u32,
    /// Fraction of each corrective impulse withheld; 0 corrects instantly.
    pub smoothing: f32,
    /// Maximum number of steps the path search explores.
    pub search_depth: u32,
    /// Search implementation consulted by navigating states.
    pub search: SearchVariant,
    /// Speeds assumed by the cost-priority search.
    pub speeds: SpeedTable,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            stagger_period: 10,
            smoothing: 0.0,
            search_depth: 30,
            search: SearchVariant::BreadthFirst,
            speeds: SpeedTable::default(),
        }
    }
}

impl ControllerTuning {
    /// Checks the scheduling parameters and the speed table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stagger_period == 0 {
            return Err(ConfigError::ZeroCount {
                field: "stagger_period",
            });
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        self.speeds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SharkConfig::default().validate(), Ok(()));
        assert_eq!(SirenConfig::default().validate(), Ok(()));
        assert_eq!(HydraConfig::default().validate(), Ok(()));
        assert_eq!(ControllerTuning::default().validate(), Ok(()));
    }

    #[test]
    fn attack_range_must_nest_inside_approach_range() {
        let config = SharkConfig {
            approach_range: 4.0,
            attack_range: 6.0,
            ..SharkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeOrder {
                inner: "attack_range",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let config = HydraConfig {
            stun_time: f32::NAN,
            ..HydraConfig::default()
        };
        let error = config.validate().expect_err("NaN stun time is rejected");
        assert!(error.to_string().contains("stun_time"));
    }

    #[test]
    fn smoothing_of_one_would_freeze_steering() {
        let tuning = ControllerTuning {
            smoothing: 1.0,
            ..ControllerTuning::default()
        };
        assert_eq!(tuning.validate(), Err(ConfigError::Smoothing(1.0)));
    }

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let config: SharkConfig =
            toml::from_str("approach_range = 20.0\nguard_radius = 3.0\n").expect("table parses");
        assert_eq!(config.approach_range, 20.0);
        assert_eq!(config.guard_radius, Some(3.0));
        assert_eq!(config.stun_time, SharkConfig::default().stun_time);
        assert_eq!(config.enrage_range, None);
    }

    #[test]
    fn negative_enrage_range_is_rejected() {
        let config = SharkConfig {
            enrage_range: Some(-1.0),
            ..SharkConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "enrage_range",
                value: -1.0
            })
        );
    }
}
