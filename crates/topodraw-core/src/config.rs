//! Editor configuration.

use crate::connection::{DrawingMode, SnapSettings};
use crate::error::{EditorError, EditorResult};
use crate::viewport::ZoomConstraints;
use serde::{Deserialize, Serialize};

/// Default number of commands kept in the undo history.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 100;
/// Default cap on devices in a project.
pub const DEFAULT_MAX_DEVICES: usize = 500;
/// Default cap on connections in a project.
pub const DEFAULT_MAX_CONNECTIONS: usize = 1000;
/// Default number of connections a single anchor accepts.
pub const DEFAULT_MAX_CONNECTIONS_PER_ANCHOR: usize = 4;

/// Recognised configuration options.
///
/// Every field has a default, so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub zoom: ZoomConstraints,
    pub snap: SnapSettings,
    pub max_history_size: usize,
    pub max_devices: usize,
    pub max_connections: usize,
    pub max_connections_per_anchor: usize,
    pub default_drawing_mode: DrawingMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomConstraints::default(),
            snap: SnapSettings::default(),
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            max_devices: DEFAULT_MAX_DEVICES,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_connections_per_anchor: DEFAULT_MAX_CONNECTIONS_PER_ANCHOR,
            default_drawing_mode: DrawingMode::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> EditorResult<()> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0) || !zoom.max.is_finite() {
            return Err(EditorError::InvalidConfig(format!(
                "zoom bounds must be positive and finite (min {}, max {})",
                zoom.min, zoom.max
            )));
        }
        if zoom.min > zoom.max {
            return Err(EditorError::InvalidConfig(format!(
                "zoom min {} exceeds max {}",
                zoom.min, zoom.max
            )));
        }
        if !(zoom.wheel_sensitivity > 1.0) {
            return Err(EditorError::InvalidConfig(format!(
                "wheel sensitivity must be greater than 1 (got {})",
                zoom.wheel_sensitivity
            )));
        }
        if self.max_history_size == 0 {
            return Err(EditorError::InvalidConfig(
                "max_history_size must be at least 1".to_string(),
            ));
        }
        if self.max_connections_per_anchor == 0 {
            return Err(EditorError::InvalidConfig(
                "max_connections_per_anchor must be at least 1".to_string(),
            ));
        }
        if self.snap.snap_distance < 0.0 || self.snap.grid_size <= 0.0 {
            return Err(EditorError::InvalidConfig(
                "snap distance and grid size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history_size, DEFAULT_MAX_HISTORY_SIZE);
        assert!((config.zoom.wheel_sensitivity - 1.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "max_history_size": 10, "zoom": { "max": 8.0 } }"#)
            .unwrap();
        assert_eq!(config.max_history_size, 10);
        assert!((config.zoom.max - 8.0).abs() < f64::EPSILON);
        assert!((config.zoom.min - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.max_devices, DEFAULT_MAX_DEVICES);
        assert!(config.snap.snap_to_devices);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EditorConfig::default();
        config.default_drawing_mode = DrawingMode::Orthogonal;
        config.snap.enabled = false;
        let json = config.to_json().unwrap();
        let back = EditorConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_rejects_inverted_zoom() {
        let err = EditorConfig::from_json(r#"{ "zoom": { "min": 4.0, "max": 2.0 } }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_bad_sensitivity() {
        let mut config = EditorConfig::default();
        config.zoom.wheel_sensitivity = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            EditorConfig::from_json("{ not json"),
            Err(EditorError::InvalidConfig(_))
        ));
    }
}
