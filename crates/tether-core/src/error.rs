use thiserror::Error;

/// Top-level error type for tether-core.
#[derive(Debug, Error)]
pub enum TetherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or validating a chain profile or physics
/// configuration.
///
/// Runtime chain operations never produce these: a missing profile, an
/// out-of-range link index or a disallowed length change are all no-ops.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid segment count: {0} (must be in [2, 256])")]
    InvalidSegmentCount(i32),

    #[error("Invalid LOD range at level {index}: [{min}, {max}]")]
    InvalidLodRange { index: usize, min: f32, max: f32 },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tether_error_from_config_error() {
        let err = ConfigError::InvalidSegmentCount(1);
        let tether_err: TetherError = err.into();
        assert!(matches!(tether_err, TetherError::Config(_)));
        assert!(tether_err.to_string().contains("must be in [2, 256]"));
    }

    #[test]
    fn tether_error_from_json_error() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let tether_err: TetherError = err.into();
        assert!(matches!(tether_err, TetherError::Json(_)));
        assert!(tether_err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidSegmentCount(0).to_string(),
            "Invalid segment count: 0 (must be in [2, 256])"
        );
        assert_eq!(
            ConfigError::InvalidLodRange {
                index: 2,
                min: 50.0,
                max: 10.0
            }
            .to_string(),
            "Invalid LOD range at level 2: [50, 10]"
        );
        assert_eq!(
            ConfigError::invalid("physics.link_mass", "must be > 0").to_string(),
            "Invalid value for physics.link_mass: must be > 0"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<TetherError>();
        assert_send_sync::<ConfigError>();
    }
}
