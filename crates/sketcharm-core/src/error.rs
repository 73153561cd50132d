//! Error handling for SketchArm
//!
//! Provides the shared error types used across the workspace:
//! - Configuration errors (parsing/validation)
//! - Geometry errors (degenerate rasters and segments)
//! - State errors (illegal arm state transitions)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::RobotState;

/// Configuration error type
///
/// Raised while parsing or validating a [`crate::config::SketchConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its valid range
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// Dotted path of the offending key
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// I/O error while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::InvalidSetting`]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Geometry error type
///
/// Degenerate inputs that cannot produce a toolpath at all. Empty or short
/// segments are not errors; they are skipped silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A raster has a zero dimension
    #[error("Raster has invalid dimensions {width}x{height}")]
    EmptyRaster {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// Workspace bounds have no area
    #[error("Workspace bounds are degenerate: {reason}")]
    DegenerateWorkspace {
        /// Which extent collapsed
        reason: String,
    },

    /// Raw pixel buffer does not match the declared dimensions
    #[error("Mask data length {actual} does not match {width}x{height}")]
    MaskSizeMismatch {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Length of the supplied buffer
        actual: usize,
    },
}

/// State error type
///
/// Raised when the arm state machine rejects a transition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Transition not in the legal table
    #[error("Invalid state transition from {current} to {requested}")]
    InvalidTransition {
        /// State before the request
        current: RobotState,
        /// Requested state
        requested: RobotState,
    },

    /// Docking requested by a move that did not start at the centred pose
    #[error("Docking requires a move that started from the centred pose (started from {origin})")]
    DockWithoutCentre {
        /// State the finishing move started from
        origin: RobotState,
    },
}

/// Main error type for SketchArm core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// State error
    #[error(transparent)]
    State(#[from] StateError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is a state error
    pub fn is_state_error(&self) -> bool {
        matches!(self, Error::State(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_display() {
        let err = StateError::InvalidTransition {
            current: RobotState::Docked,
            requested: RobotState::Moving,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition from docked to moving"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("planner.eraser_width", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'planner.eraser_width': must be at least 1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GeometryError::EmptyRaster {
            width: 0,
            height: 4,
        }
        .into();
        assert!(matches!(err, Error::Geometry(_)));
        assert_eq!(err.to_string(), "Raster has invalid dimensions 0x4");

        let err: Error = StateError::DockWithoutCentre {
            origin: RobotState::Paused,
        }
        .into();
        assert!(err.is_state_error());
        assert!(!err.is_config_error());
    }
}
