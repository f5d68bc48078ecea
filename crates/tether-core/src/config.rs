use bevy::prelude::{Resource, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_gravity() -> [f32; 3] {
    [0.0, 0.0, -980.0]
}
const fn default_physics_dt() -> f32 {
    1.0 / 60.0
}
const fn default_substeps() -> u32 {
    4
}

// ---------------------------------------------------------------------------
// PhysicsConfig
// ---------------------------------------------------------------------------

/// Settings for the physics host that simulates chains.
///
/// Units follow the profiles: the default gravity is in centimeters per
/// second squared to match the default 500-unit chain length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct PhysicsConfig {
    /// Gravity vector [x, y, z].
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],

    /// Frame timestep in seconds (default: 1/60).
    #[serde(default = "default_physics_dt")]
    pub physics_dt: f32,

    /// Solver substeps per frame.
    #[serde(default = "default_substeps")]
    pub substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            physics_dt: default_physics_dt(),
            substeps: default_substeps(),
        }
    }
}

impl PhysicsConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_dt.is_nan() || self.physics_dt <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "physics_dt".into(),
                message: format!("{} (must be > 0)", self.physics_dt),
            });
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "substeps".into(),
                message: "must be >= 1".into(),
            });
        }
        Ok(())
    }

    pub fn gravity_vec(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    /// Duration of one solver substep.
    #[allow(clippy::cast_precision_loss)]
    pub fn substep_dt(&self) -> f32 {
        self.physics_dt / self.substeps.max(1) as f32
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physics_config_default_values() {
        let cfg = PhysicsConfig::default();
        assert!((cfg.gravity[2] - (-980.0)).abs() < f32::EPSILON);
        assert!((cfg.physics_dt - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(cfg.substeps, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn physics_config_validate_invalid_dt() {
        let cfg = PhysicsConfig {
            physics_dt: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn physics_config_validate_zero_substeps() {
        let cfg = PhysicsConfig {
            substeps: 0,
            ..PhysicsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn substep_dt_divides_frame() {
        let cfg = PhysicsConfig {
            physics_dt: 0.02,
            substeps: 4,
            ..PhysicsConfig::default()
        };
        assert!((cfg.substep_dt() - 0.005).abs() < 1e-6);
    }

    #[test]
    fn physics_config_toml_defaults() {
        let cfg: PhysicsConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, PhysicsConfig::default());
    }

    #[test]
    fn physics_config_from_file() {
        let dir = std::env::temp_dir().join("tether_test_physics_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("physics.toml");
        std::fs::write(
            &path,
            r"
            gravity = [0.0, -9.81, 0.0]
            physics_dt = 0.01
            substeps = 2
        ",
        )
        .unwrap();

        let cfg = PhysicsConfig::from_file(&path).unwrap();
        assert_eq!(cfg.gravity_vec(), Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(cfg.substeps, 2);

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn physics_config_from_file_not_found() {
        let result = PhysicsConfig::from_file("/nonexistent/path/physics.toml");
        assert!(result.is_err());
    }
}
