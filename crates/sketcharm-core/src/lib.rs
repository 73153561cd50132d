//! # SketchArm Core
//!
//! Core types, configuration, and errors shared by the SketchArm crates.
//! Provides the pixel and physical geometry model, the arm state table,
//! workspace presets, and the immutable configuration value.

pub mod config;
pub mod data;
pub mod error;

pub use config::{
    AttachmentHeights, PlannerConfig, RecoveryConfig, RobotConfig, SketchConfig, SpeedPresets,
};

pub use data::{
    AttachmentType, Bounds, Orientation, PhysicalPoint, PhysicalVector, PixelPoint, PixelSegment,
    Pose, RobotState, SpeedType, ZHeights,
};

pub use error::{ConfigError, Error, GeometryError, Result, StateError};
