//! Game tuning configuration.
//!
//! Every constant the simulation uses lives in [`GameConfig`]. The defaults
//! reproduce the stock game; a TOML file can override any subset of fields.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "RECOVERY_ARCADE_CONFIG";

/// Config file looked up in the working directory when the variable is unset.
pub const CONFIG_FILE: &str = "recovery_arcade.toml";

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    /// Session length in seconds.
    pub total_duration: f64,
    /// Seconds removed from the clock by one fixed step.
    pub frame_interval: f64,
    /// Seconds of elapsed play per difficulty level.
    pub level_duration: f64,

    // === Difficulty curve ===
    /// Spawn probability per tick before any level scaling.
    pub base_spawn_rate: f64,
    /// Extra spawn probability per difficulty level.
    pub spawn_rate_step: f64,
    /// Hard ceiling on spawn probability per tick.
    pub spawn_rate_cap: f64,
    /// Extra fall speed multiplier per difficulty level.
    pub speed_step: f32,

    // === Spawning ===
    /// Probability that a spawned entity is a hazard rather than a benefit.
    pub hazard_probability: f64,
    pub entity_radius: f32,
    /// Fall speed range in pixels per tick.
    pub min_fall_speed: f32,
    pub max_fall_speed: f32,
    /// Maximum lateral drift (either way) in pixels per tick.
    pub max_drift: f32,

    // === Scoring ===
    pub hazard_bonus_per_level: u32,
    pub benefit_bonus_per_level: u32,
    pub session_bonus_per_level: u32,

    // === Player & projectiles ===
    pub player_width: f32,
    pub player_height: f32,
    /// Distance covered by a single `move` nudge.
    pub move_step: f32,
    /// Distance covered per tick while a direction is held.
    pub player_speed: f32,
    /// Upward projectile speed in pixels per tick.
    pub projectile_speed: f32,
    /// Extra reach added to the entity radius for projectile hits.
    pub hit_margin: f32,
    /// Extra reach added to radius + half player width for pickups.
    pub pickup_margin: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_duration: 60.0,
            frame_interval: 1.0 / 60.0,
            level_duration: 10.0,

            base_spawn_rate: 0.02,
            spawn_rate_step: 0.01,
            spawn_rate_cap: 0.08,
            speed_step: 0.15,

            hazard_probability: 0.7,
            entity_radius: 20.0,
            min_fall_speed: 1.0,
            max_fall_speed: 2.5,
            max_drift: 0.5,

            hazard_bonus_per_level: 10,
            benefit_bonus_per_level: 5,
            session_bonus_per_level: 100,

            player_width: 40.0,
            player_height: 40.0,
            move_step: 20.0,
            player_speed: 5.0,
            projectile_speed: 8.0,
            hit_margin: 10.0,
            pickup_margin: 5.0,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)?;
                info!("Loaded game config from {:?}", path);
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `$RECOVERY_ARCADE_CONFIG`, or `recovery_arcade.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| CONFIG_FILE.to_string());
        Self::load_from(path)
    }

    pub fn to_toml_string(&self) -> String {
        // Every field is a plain number, so serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, v) in [
            ("total_duration", self.total_duration),
            ("frame_interval", self.frame_interval),
            ("level_duration", self.level_duration),
            ("base_spawn_rate", self.base_spawn_rate),
            ("spawn_rate_step", self.spawn_rate_step),
            ("spawn_rate_cap", self.spawn_rate_cap),
            ("hazard_probability", self.hazard_probability),
        ] {
            if !v.is_finite() {
                return Err(invalid(field, format!("{v} is not a finite number")));
            }
        }
        for (field, v) in [
            ("speed_step", self.speed_step),
            ("entity_radius", self.entity_radius),
            ("min_fall_speed", self.min_fall_speed),
            ("max_fall_speed", self.max_fall_speed),
            ("max_drift", self.max_drift),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("move_step", self.move_step),
            ("player_speed", self.player_speed),
            ("projectile_speed", self.projectile_speed),
            ("hit_margin", self.hit_margin),
            ("pickup_margin", self.pickup_margin),
        ] {
            if !v.is_finite() {
                return Err(invalid(field, format!("{v} is not a finite number")));
            }
        }

        if !(self.total_duration > 0.0) {
            return Err(invalid("total_duration", "must be positive"));
        }
        if !(self.frame_interval > 0.0) || self.frame_interval > self.total_duration {
            return Err(invalid(
                "frame_interval",
                "must be positive and no longer than the session",
            ));
        }
        if self.level_duration < self.frame_interval {
            return Err(invalid(
                "level_duration",
                "must be at least one frame interval",
            ));
        }
        for (field, p) in [
            ("base_spawn_rate", self.base_spawn_rate),
            ("spawn_rate_cap", self.spawn_rate_cap),
            ("hazard_probability", self.hazard_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, format!("{p} is not a probability")));
            }
        }
        if self.spawn_rate_step < 0.0 {
            return Err(invalid("spawn_rate_step", "must not be negative"));
        }
        if self.speed_step < 0.0 {
            return Err(invalid("speed_step", "must not be negative"));
        }
        if !(self.min_fall_speed > 0.0) || self.min_fall_speed > self.max_fall_speed {
            return Err(invalid(
                "min_fall_speed",
                "must be positive and not exceed max_fall_speed",
            ));
        }
        if self.max_drift < 0.0 || !(self.max_drift * 2.0).is_finite() {
            return Err(invalid("max_drift", "must not be negative or unbounded"));
        }
        for (field, v) in [
            ("entity_radius", self.entity_radius),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("projectile_speed", self.projectile_speed),
        ] {
            if !(v > 0.0) {
                return Err(invalid(field, "must be positive"));
            }
        }
        for (field, v) in [
            ("move_step", self.move_step),
            ("player_speed", self.player_speed),
            ("hit_margin", self.hit_margin),
            ("pickup_margin", self.pickup_margin),
        ] {
            if v < 0.0 {
                return Err(invalid(field, "must not be negative"));
            }
        }
        Ok(())
    }
}
