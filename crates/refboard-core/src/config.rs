//! Tunables for a board session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of history snapshots kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Offset applied to duplicated elements, in world units.
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 20.0;

/// Settings for a [`BoardSession`](crate::BoardSession).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum number of history snapshots (including the initial one).
    pub history_capacity: usize,
    /// Offset applied on both axes when duplicating elements.
    pub duplicate_offset: f64,
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Increment used by zoom in/out.
    pub zoom_step: f64,
    /// Screen-space padding kept around content by zoom-to-fit.
    pub fit_padding: f64,
    /// Initial viewport width in screen pixels.
    pub viewport_width: f64,
    /// Initial viewport height in screen pixels.
    pub viewport_height: f64,
    /// Largest display width/height for inserted media.
    pub media_max_size: f64,
    /// Nominal insertion point for media.
    pub media_origin: (f64, f64),
    /// Maximum random offset from `media_origin` on each axis.
    pub media_jitter: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 0.1,
            fit_padding: 50.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            media_max_size: 400.0,
            media_origin: (100.0, 100.0),
            media_jitter: 20.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid zoom range: min {min}, max {max}")]
    ZoomRange { min: f64, max: f64 },
    #[error("Invalid zoom step: {0}")]
    ZoomStep(f64),
}

impl BoardConfig {
    /// Parse and validate a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the zoom settings.
    ///
    /// Zoom bounds must be finite with `0 < min_zoom <= max_zoom`, and the
    /// zoom step must be finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ConfigError::ZoomRange { min, max });
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        Ok(())
    }

    /// This config with invalid zoom settings replaced by the defaults.
    pub fn normalized(mut self) -> Self {
        if let Err(e) = self.validate() {
            log::warn!("{}, falling back to default zoom settings", e);
            let defaults = Self::default();
            if matches!(e, ConfigError::ZoomRange { .. }) {
                self.min_zoom = defaults.min_zoom;
                self.max_zoom = defaults.max_zoom;
            }
            if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
                self.zoom_step = defaults.zoom_step;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json(r#"{ "history_capacity": 10 }"#).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.max_zoom, 5.0);
        assert_eq!(config.media_origin, (100.0, 100.0));
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = BoardConfig::from_json("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let err = BoardConfig::from_json(r#"{ "min_zoom": 6.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZoomRange { min, max } if min == 6.0 && max == 5.0));
    }

    #[test]
    fn test_non_positive_zoom_step_rejected() {
        let err = BoardConfig::from_json(r#"{ "zoom_step": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZoomStep(_)));
        let err = BoardConfig::from_json(r#"{ "zoom_step": -0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZoomStep(_)));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let err = BoardConfig::from_json(r#"{ "min_zoom": "tiny" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_normalized_restores_zoom_defaults() {
        let config = BoardConfig {
            min_zoom: 6.0,
            zoom_step: 0.0,
            history_capacity: 10,
            ..BoardConfig::default()
        }
        .normalized();
        assert!(config.validate().is_ok());
        assert_eq!((config.min_zoom, config.max_zoom), (0.1, 5.0));
        assert_eq!(config.zoom_step, 0.1);
        assert_eq!(config.history_capacity, 10);

        let good = BoardConfig {
            min_zoom: 0.5,
            ..BoardConfig::default()
        };
        assert_eq!(good.clone().normalized(), good);
    }
}
