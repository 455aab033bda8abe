//! Tuning configuration for the resource simulation.
//!
//! Every balance knob the simulation uses lives here as a strongly-typed,
//! serde-defaulted field, loadable from a YAML file so designers can retune
//! rates without recompiling. Defaults match the observed production values
//! (10% core regeneration per day, 90% passive cap, ~10% capacity growth
//! per breakthrough).

use std::path::Path;

use ascension_types::{DangerLevel, TimeOfDay};
use serde::Deserialize;

use crate::error::SimError;

/// Errors that can occur when loading tuning configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level tuning configuration for the simulation layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TuningConfig {
    /// Qi generation, caps, and dissipation.
    #[serde(default)]
    pub qi: QiConfig,

    /// Fatigue recovery and accrual rates.
    #[serde(default)]
    pub fatigue: FatigueConfig,

    /// Meditation interruption probabilities and category weights.
    #[serde(default)]
    pub interruption: InterruptionConfig,

    /// Breakthrough thresholds and growth.
    #[serde(default)]
    pub breakthrough: BreakthroughConfig,
}

impl TuningConfig {
    /// Load tuning configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse tuning configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate that every rate and table is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.qi.seconds_per_day <= 0.0 {
            return Err(SimError::invalid("qi.seconds_per_day must be positive"));
        }
        if !(0.0..=1.0).contains(&self.qi.passive_cap_fraction) {
            return Err(SimError::invalid(
                "qi.passive_cap_fraction must be within [0, 1]",
            ));
        }
        if self.breakthrough.growth_multiplier <= 1.0 {
            return Err(SimError::invalid(
                "breakthrough.growth_multiplier must exceed 1.0",
            ));
        }
        if self.fatigue.level_recovery_multipliers.is_empty() {
            return Err(SimError::invalid(
                "fatigue.level_recovery_multipliers must not be empty",
            ));
        }
        Ok(())
    }
}

/// Qi generation, cap, and dissipation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QiConfig {
    /// In-world seconds per day (the rate denominator).
    #[serde(default = "default_seconds_per_day")]
    pub seconds_per_day: f64,

    /// Fraction of core capacity regenerated passively per in-world day.
    #[serde(default = "default_core_regen_fraction")]
    pub core_regen_fraction_per_day: f64,

    /// Passive (non-meditative) accumulation cap as a fraction of capacity.
    #[serde(default = "default_passive_cap_fraction")]
    pub passive_cap_fraction: f64,

    /// Ambient qi density assumed when no location snapshot is available.
    #[serde(default = "default_ambient_qi_density")]
    pub default_qi_density: f64,

    /// Fraction of the above-cap excess that dissipates per in-world day.
    #[serde(default = "default_dissipation_fraction")]
    pub dissipation_fraction_per_day: f64,

    /// Multiplier applied to the generation rate while meditating.
    #[serde(default = "default_meditation_rate_multiplier")]
    pub meditation_rate_multiplier: f64,
}

impl Default for QiConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: default_seconds_per_day(),
            core_regen_fraction_per_day: default_core_regen_fraction(),
            passive_cap_fraction: default_passive_cap_fraction(),
            default_qi_density: default_ambient_qi_density(),
            dissipation_fraction_per_day: default_dissipation_fraction(),
            meditation_rate_multiplier: default_meditation_rate_multiplier(),
        }
    }
}

/// Fatigue recovery and accrual parameters.
///
/// Recovery rates are per in-world minute and are multiplied by the
/// cultivation-level recovery table. Meditation is asymmetric: it restores
/// the body while taxing the mind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FatigueConfig {
    /// Physical fatigue recovered per minute of light rest.
    #[serde(default = "default_rest_light_physical")]
    pub rest_light_physical_per_minute: f64,

    /// Mental fatigue recovered per minute of light rest.
    #[serde(default = "default_rest_light_mental")]
    pub rest_light_mental_per_minute: f64,

    /// Physical fatigue recovered per minute of sleep.
    #[serde(default = "default_sleep_physical")]
    pub sleep_physical_per_minute: f64,

    /// Mental fatigue recovered per minute of sleep.
    #[serde(default = "default_sleep_mental")]
    pub sleep_mental_per_minute: f64,

    /// Physical fatigue recovered per minute of meditation.
    #[serde(default = "default_meditation_physical")]
    pub meditation_physical_per_minute: f64,

    /// Mental fatigue *accrued* per minute of meditation.
    #[serde(default = "default_meditation_mental_cost")]
    pub meditation_mental_cost_per_minute: f64,

    /// Physical fatigue accrued per minute of travel.
    #[serde(default = "default_travel_physical_cost")]
    pub travel_physical_cost_per_minute: f64,

    /// Recovery multiplier per cultivation level (index 0 = level 1).
    ///
    /// Higher realms recover faster; out-of-table levels use the last entry.
    #[serde(default = "default_level_recovery_multipliers")]
    pub level_recovery_multipliers: Vec<f64>,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            rest_light_physical_per_minute: default_rest_light_physical(),
            rest_light_mental_per_minute: default_rest_light_mental(),
            sleep_physical_per_minute: default_sleep_physical(),
            sleep_mental_per_minute: default_sleep_mental(),
            meditation_physical_per_minute: default_meditation_physical(),
            meditation_mental_cost_per_minute: default_meditation_mental_cost(),
            travel_physical_cost_per_minute: default_travel_physical_cost(),
            level_recovery_multipliers: default_level_recovery_multipliers(),
        }
    }
}

/// Meditation interruption probabilities and event category weights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterruptionConfig {
    /// Base interruption chance per minute on safe ground.
    #[serde(default = "default_chance_safe")]
    pub chance_safe: f64,

    /// Base interruption chance per minute in low-danger areas.
    #[serde(default = "default_chance_low")]
    pub chance_low: f64,

    /// Base interruption chance per minute in moderate-danger areas.
    #[serde(default = "default_chance_moderate")]
    pub chance_moderate: f64,

    /// Base interruption chance per minute in high-danger areas.
    #[serde(default = "default_chance_high")]
    pub chance_high: f64,

    /// Base interruption chance per minute in deadly areas.
    #[serde(default = "default_chance_deadly")]
    pub chance_deadly: f64,

    /// Chance multiplier at night.
    #[serde(default = "default_night_multiplier")]
    pub night_multiplier: f64,

    /// Chance multiplier at dawn and dusk.
    #[serde(default = "default_twilight_multiplier")]
    pub twilight_multiplier: f64,

    /// Perception scaling: chance is divided by `1 + perception / scale`.
    #[serde(default = "default_perception_scale")]
    pub perception_scale: f64,

    /// Draw weight for creature events.
    #[serde(default = "default_creature_weight")]
    pub creature_weight: u32,

    /// Draw weight for person events.
    #[serde(default = "default_person_weight")]
    pub person_weight: u32,

    /// Draw weight for spirit events.
    #[serde(default = "default_spirit_weight")]
    pub spirit_weight: u32,

    /// Draw weight for phenomenon events.
    #[serde(default = "default_phenomenon_weight")]
    pub phenomenon_weight: u32,
}

impl InterruptionConfig {
    /// Base interruption chance per minute for a danger level.
    pub const fn base_chance(&self, danger: DangerLevel) -> f64 {
        match danger {
            DangerLevel::Safe => self.chance_safe,
            DangerLevel::Low => self.chance_low,
            DangerLevel::Moderate => self.chance_moderate,
            DangerLevel::High => self.chance_high,
            DangerLevel::Deadly => self.chance_deadly,
        }
    }

    /// Chance multiplier for a time-of-day phase.
    pub const fn time_multiplier(&self, phase: TimeOfDay) -> f64 {
        match phase {
            TimeOfDay::Night => self.night_multiplier,
            TimeOfDay::Dawn | TimeOfDay::Dusk => self.twilight_multiplier,
            TimeOfDay::Morning | TimeOfDay::Afternoon => 1.0,
        }
    }
}

impl Default for InterruptionConfig {
    fn default() -> Self {
        Self {
            chance_safe: default_chance_safe(),
            chance_low: default_chance_low(),
            chance_moderate: default_chance_moderate(),
            chance_high: default_chance_high(),
            chance_deadly: default_chance_deadly(),
            night_multiplier: default_night_multiplier(),
            twilight_multiplier: default_twilight_multiplier(),
            perception_scale: default_perception_scale(),
            creature_weight: default_creature_weight(),
            person_weight: default_person_weight(),
            spirit_weight: default_spirit_weight(),
            phenomenon_weight: default_phenomenon_weight(),
        }
    }
}

/// Breakthrough growth and cost parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BreakthroughConfig {
    /// Core capacity multiplier applied on a successful breakthrough.
    #[serde(default = "default_growth_multiplier")]
    pub growth_multiplier: f64,

    /// Fill fraction the core settles at after a breakthrough.
    #[serde(default = "default_post_breakthrough_fill")]
    pub post_breakthrough_fill: f64,

    /// Mental fatigue charged by a successful breakthrough.
    #[serde(default = "default_breakthrough_mental_cost")]
    pub mental_fatigue_cost: f64,
}

impl Default for BreakthroughConfig {
    fn default() -> Self {
        Self {
            growth_multiplier: default_growth_multiplier(),
            post_breakthrough_fill: default_post_breakthrough_fill(),
            mental_fatigue_cost: default_breakthrough_mental_cost(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seconds_per_day() -> f64 {
    86_400.0
}

const fn default_core_regen_fraction() -> f64 {
    0.10
}

const fn default_passive_cap_fraction() -> f64 {
    0.90
}

const fn default_ambient_qi_density() -> f64 {
    10.0
}

const fn default_dissipation_fraction() -> f64 {
    0.25
}

const fn default_meditation_rate_multiplier() -> f64 {
    4.0
}

const fn default_rest_light_physical() -> f64 {
    0.20
}

const fn default_rest_light_mental() -> f64 {
    0.15
}

const fn default_sleep_physical() -> f64 {
    0.50
}

const fn default_sleep_mental() -> f64 {
    0.40
}

const fn default_meditation_physical() -> f64 {
    0.25
}

const fn default_meditation_mental_cost() -> f64 {
    0.10
}

const fn default_travel_physical_cost() -> f64 {
    0.30
}

fn default_level_recovery_multipliers() -> Vec<f64> {
    vec![1.0, 1.15, 1.30, 1.45, 1.60, 1.75, 1.90, 2.05, 2.20, 2.35]
}

const fn default_chance_safe() -> f64 {
    0.0002
}

const fn default_chance_low() -> f64 {
    0.001
}

const fn default_chance_moderate() -> f64 {
    0.003
}

const fn default_chance_high() -> f64 {
    0.008
}

const fn default_chance_deadly() -> f64 {
    0.02
}

const fn default_night_multiplier() -> f64 {
    1.5
}

const fn default_twilight_multiplier() -> f64 {
    1.2
}

const fn default_perception_scale() -> f64 {
    100.0
}

const fn default_creature_weight() -> u32 {
    40
}

const fn default_person_weight() -> u32 {
    30
}

const fn default_spirit_weight() -> u32 {
    15
}

const fn default_phenomenon_weight() -> u32 {
    15
}

const fn default_growth_multiplier() -> f64 {
    1.10
}

const fn default_post_breakthrough_fill() -> f64 {
    0.10
}

const fn default_breakthrough_mental_cost() -> f64 {
    25.0
}
