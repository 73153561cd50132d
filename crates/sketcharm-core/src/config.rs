//! Configuration for SketchArm
//!
//! A single immutable [`SketchConfig`] value is built once and shared (by
//! reference or `Arc`) with every component. Mutable session state such as
//! the mounted attachment or the arm state lives elsewhere.
//!
//! Configuration is organized into logical sections:
//! - Robot settings (address, orientation, speeds, poses, attachment heights)
//! - Canvas bounds (the workspace the tool may occupy)
//! - Planner settings (simplification, nearest-neighbour breaks, eraser footprint)
//! - Recovery settings (retry ceiling, history depth, remediation pauses)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::data::{AttachmentType, Bounds, Orientation, Pose, SpeedType, ZHeights};
use crate::error::ConfigError;

/// Numeric speeds for each [`SpeedType`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedPresets {
    /// Fast travel
    pub fast: f64,
    /// Regular drawing speed
    pub normal: f64,
    /// Careful approach speed
    pub slow: f64,
}

impl SpeedPresets {
    /// Resolve a speed class
    pub fn get(&self, speed: SpeedType) -> f64 {
        match speed {
            SpeedType::Fast => self.fast,
            SpeedType::Normal => self.normal,
            SpeedType::Slow => self.slow,
        }
    }
}

impl Default for SpeedPresets {
    fn default() -> Self {
        Self {
            fast: 300.0,
            normal: 100.0,
            slow: 50.0,
        }
    }
}

/// Raised/lowered heights for every attachment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachmentHeights {
    /// Marker heights
    pub marker: ZHeights,
    /// Eraser heights
    pub eraser: ZHeights,
    /// Pen heights
    pub pen: ZHeights,
    /// Heights with no tool mounted
    pub empty: ZHeights,
}

impl AttachmentHeights {
    /// Heights for an attachment
    pub fn get(&self, attachment: AttachmentType) -> ZHeights {
        match attachment {
            AttachmentType::Marker => self.marker,
            AttachmentType::Eraser => self.eraser,
            AttachmentType::Pen => self.pen,
            AttachmentType::Empty => self.empty,
        }
    }
}

impl Default for AttachmentHeights {
    fn default() -> Self {
        Self {
            marker: ZHeights::new(118.0, 125.0),
            eraser: ZHeights::new(59.0, 80.0),
            pen: ZHeights::new(120.0, 127.0),
            empty: ZHeights::new(158.0, 170.0),
        }
    }
}

/// Arm and controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Controller network address
    pub address: String,
    /// Tool orientation used for every move
    pub orientation: Orientation,
    /// Motion acceleration
    pub acceleration: f64,
    /// Controller mode selected at start-up and after a restart
    pub motion_mode: i32,
    /// Speed presets
    pub speeds: SpeedPresets,
    /// Per-attachment heights
    pub attachments: AttachmentHeights,
    /// Attachment assumed mounted when the session starts
    pub initial_attachment: AttachmentType,
    /// Resting pose in front of the canvas
    pub centred_pose: Pose,
    /// Pose where the operator swaps tools
    pub tool_change_pose: Pose,
    /// Parked pose out of the camera's view
    pub docked_pose: Pose,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            address: "192.168.1.239".to_string(),
            orientation: Orientation::default(),
            acceleration: 100.0,
            motion_mode: 0,
            speeds: SpeedPresets::default(),
            attachments: AttachmentHeights::default(),
            initial_attachment: AttachmentType::Marker,
            centred_pose: Pose::planar(200.0, 0.0),
            tool_change_pose: Pose::with_z(350.0, 0.0, 300.0),
            docked_pose: Pose::planar(100.0, 250.0),
        }
    }
}

/// Toolpath planning settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum deviation allowed when simplifying strokes (pixels)
    pub simplify_tolerance: f64,
    /// Largest squared pixel distance that keeps a stroke connected
    pub break_distance_sq: i64,
    /// Eraser footprint width (pixels)
    pub eraser_width: u32,
    /// Eraser footprint height (pixels)
    pub eraser_height: u32,
    /// Grey level at or below which a pixel counts as ink
    pub ink_threshold: u8,
    /// Gaussian blur sigma applied before thresholding and edge detection
    pub blur_sigma: f32,
    /// Gradient magnitude above which a pixel may extend an edge
    pub edge_low: f32,
    /// Gradient magnitude above which a pixel starts an edge
    pub edge_high: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: 2.0,
            break_distance_sq: 5,
            eraser_width: 80,
            eraser_height: 40,
            ink_threshold: 128,
            blur_sigma: 1.0,
            edge_low: 50.0,
            edge_high: 100.0,
        }
    }
}

/// Fault recovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Automatic attempts allowed per (fault code, action) pair
    pub max_retries: u32,
    /// Number of faults listed in the operator summary
    pub history_depth: usize,
    /// Pause after clearing faults (milliseconds)
    pub settle_pause_ms: u64,
    /// Pause after a controller restart (milliseconds)
    pub restart_pause_ms: u64,
}

impl RecoveryConfig {
    /// Pause after clearing faults
    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }

    /// Pause after a controller restart
    pub fn restart_pause(&self) -> Duration {
        Duration::from_millis(self.restart_pause_ms)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            history_depth: 5,
            settle_pause_ms: 1000,
            restart_pause_ms: 2000,
        }
    }
}

/// Complete SketchArm configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Robot settings
    pub robot: RobotConfig,
    /// Canvas bounds
    pub canvas: Bounds,
    /// Planner settings
    pub planner: PlannerConfig,
    /// Recovery settings
    pub recovery: RecoveryConfig,
}

impl SketchConfig {
    /// Parse and validate a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SketchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the planner and executor cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canvas = &self.canvas;
        if !(canvas.width() > 0.0) {
            return Err(ConfigError::invalid(
                "canvas.max_x",
                format!("must exceed min_x ({} <= {})", canvas.max_x, canvas.min_x),
            ));
        }
        if !(canvas.height() > 0.0) {
            return Err(ConfigError::invalid(
                "canvas.max_y",
                format!("must exceed min_y ({} <= {})", canvas.max_y, canvas.min_y),
            ));
        }

        let speeds = &self.robot.speeds;
        for (key, value) in [
            ("robot.speeds.fast", speeds.fast),
            ("robot.speeds.normal", speeds.normal),
            ("robot.speeds.slow", speeds.slow),
            ("robot.acceleration", self.robot.acceleration),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(key, "must be positive"));
            }
        }

        for attachment in AttachmentType::all() {
            let z = self.robot.attachments.get(*attachment);
            if z.raised < z.lowered {
                return Err(ConfigError::invalid(
                    format!("robot.attachments.{attachment}"),
                    format!("raised {} is below lowered {}", z.raised, z.lowered),
                ));
            }
        }

        let planner = &self.planner;
        if !(planner.simplify_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "planner.simplify_tolerance",
                "must be positive",
            ));
        }
        if planner.break_distance_sq < 1 {
            return Err(ConfigError::invalid(
                "planner.break_distance_sq",
                "must be at least 1",
            ));
        }
        if planner.eraser_width == 0 || planner.eraser_height == 0 {
            return Err(ConfigError::invalid(
                "planner.eraser_width",
                "eraser footprint must be at least 1x1",
            ));
        }
        if !(planner.edge_low >= 0.0 && planner.edge_low <= planner.edge_high) {
            return Err(ConfigError::invalid(
                "planner.edge_low",
                format!(
                    "must be non-negative and at most edge_high ({}), got {}",
                    planner.edge_high, planner.edge_low
                ),
            ));
        }

        if self.recovery.max_retries == 0 {
            return Err(ConfigError::invalid(
                "recovery.max_retries",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}
