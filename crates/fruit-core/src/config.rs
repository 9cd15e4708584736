//! Session configuration.
//!
//! All values are fixed when a session starts. Every section falls back to
//! the classic defaults, so a partial JSON document only needs the fields it
//! wants to change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{FruitCatalog, FruitKind};
use crate::error::FruitError;

/// Ground strip at the bottom of the arena.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroundConfig {
    /// Thickness of the ground rectangle in pixels.
    pub height: f32,
    /// Fill color used by the renderer.
    pub color: String,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            height: 45.0,
            color: "#29A5BB".to_string(),
        }
    }
}

/// Arena bounds and static boundary bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Background color used by the renderer.
    pub background: String,
    pub ground: GroundConfig,
    /// Install static side walls at x = 0 and x = width.
    pub walls: bool,
    pub wall_thickness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 600.0,
            background: "#FFD59D".to_string(),
            ground: GroundConfig::default(),
            walls: true,
            wall_thickness: 10.0,
        }
    }
}

/// Delays between a drop gesture and its follow-up work.
///
/// Both delays start at drop time and are independent of each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Time the dropped fruit stays static at its drop origin.
    pub drop_delay_ms: u64,
    /// Time until the next pointer fruit is armed.
    pub rearm_delay_ms: u64,
}

impl TimingConfig {
    pub fn drop_delay(&self) -> Duration {
        Duration::from_millis(self.drop_delay_ms)
    }

    pub fn rearm_delay(&self) -> Duration {
        Duration::from_millis(self.rearm_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            drop_delay_ms: 100,
            rearm_delay_ms: 500,
        }
    }
}

/// Physical material applied to every fruit body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FruitMaterial {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Linear damping standing in for air friction.
    pub air_friction: f32,
}

impl Default for FruitMaterial {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.01,
            restitution: 0.8,
            air_friction: 0.00005,
        }
    }
}

/// What happens when two fruits of the largest kind collide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopTierPolicy {
    /// Both fruits are removed and nothing replaces them.
    #[default]
    Vanish,
    /// The collision is inert and both fruits stay.
    Ignore,
}

/// Complete session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub timing: TimingConfig,
    /// Fraction of the catalog (from the smallest kind up) offered as new drops.
    pub spawnable_fraction: f32,
    pub top_tier_policy: TopTierPolicy,
    pub material: FruitMaterial,
    pub fruits: Vec<FruitKind>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            timing: TimingConfig::default(),
            spawnable_fraction: 0.5,
            top_tier_policy: TopTierPolicy::default(),
            material: FruitMaterial::default(),
            fruits: FruitCatalog::classic().kinds().to_vec(),
        }
    }
}

impl GameConfig {
    /// Loads a configuration from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, FruitError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, FruitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the fruit catalog described by this configuration.
    pub fn catalog(&self) -> Result<FruitCatalog, FruitError> {
        FruitCatalog::new(self.fruits.clone())
    }

    /// Checks every constraint the session relies on.
    pub fn validate(&self) -> Result<(), FruitError> {
        let arena = &self.arena;
        if !(arena.width > 0.0 && arena.height > 0.0) {
            return Err(FruitError::InvalidConfig(format!(
                "arena must have a positive size, got {}x{}",
                arena.width, arena.height
            )));
        }
        if !(arena.ground.height >= 0.0 && arena.ground.height < arena.height) {
            return Err(FruitError::InvalidConfig(format!(
                "ground height {} does not fit an arena of height {}",
                arena.ground.height, arena.height
            )));
        }
        if arena.walls && arena.wall_thickness <= 0.0 {
            return Err(FruitError::InvalidConfig(
                "wall thickness must be positive when walls are enabled".to_string(),
            ));
        }
        if !(self.spawnable_fraction > 0.0 && self.spawnable_fraction <= 1.0) {
            return Err(FruitError::InvalidConfig(format!(
                "spawnable fraction must be in (0, 1], got {}",
                self.spawnable_fraction
            )));
        }

        let catalog = self.catalog()?;
        let widest = catalog
            .spawnable_kinds(self.spawnable_fraction)
            .iter()
            .map(|kind| kind.radius)
            .fold(0.0_f32, f32::max);
        if widest * 2.0 > arena.width {
            return Err(FruitError::InvalidConfig(format!(
                "spawnable fruit of radius {widest} does not fit an arena of width {}",
                arena.width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arena.width, 300.0);
        assert_eq!(config.arena.height, 600.0);
        assert_eq!(config.arena.ground.height, 45.0);
        assert_eq!(config.timing.drop_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(
            r#"{ "arena": { "walls": false }, "timing": { "rearm_delay_ms": 250 } }"#,
        )
        .unwrap();

        assert!(!config.arena.walls);
        assert_eq!(config.arena.width, 300.0);
        assert_eq!(config.timing.drop_delay_ms, 100);
        assert_eq!(config.timing.rearm_delay_ms, 250);
        assert_eq!(config.fruits.len(), FruitCatalog::classic().len());
    }

    #[test]
    fn test_json_serialization_roundtrip() {
        let config = GameConfig {
            top_tier_policy: TopTierPolicy::Ignore,
            ..GameConfig::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"ignore\""));

        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_spawn_fraction() {
        let config = GameConfig {
            spawnable_fraction: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(FruitError::InvalidConfig(_))));

        let config = GameConfig {
            spawnable_fraction: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(FruitError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_arena_narrower_than_spawnable_fruit() {
        let mut config = GameConfig::default();
        config.arena.width = 20.0;
        assert!(matches!(config.validate(), Err(FruitError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = GameConfig::from_json("{ not json");
        assert!(matches!(result, Err(FruitError::Json(_))));
    }
}
