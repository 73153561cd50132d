//! Data models for pixel-space and physical-space geometry and arm state
//!
//! This module provides:
//! - Integer pixel points and ordered pixel segments (raster space)
//! - Floating-point physical points and vectors (workspace space)
//! - The logical pose/activity state of the arm with its transition table
//! - Workspace bounds, preset poses, attachments and speed presets

pub mod workspace;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use workspace::{AttachmentType, Bounds, Orientation, Pose, SpeedType, ZHeights};

/// A pixel coordinate in raster space (x = column, y = row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another pixel
    pub fn distance_squared(&self, other: &PixelPoint) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

impl From<(i32, i32)> for PixelPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An ordered run of pixels forming one stroke
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSegment(Vec<PixelPoint>);

impl PixelSegment {
    /// Create a segment from an ordered list of pixels
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self(points)
    }

    /// Number of points in the segment
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the segment has no points
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All points in order
    pub fn points(&self) -> &[PixelPoint] {
        &self.0
    }

    /// First point, if any
    pub fn first(&self) -> Option<&PixelPoint> {
        self.0.first()
    }

    /// Last point, if any
    pub fn last(&self) -> Option<&PixelPoint> {
        self.0.last()
    }

    /// Consume the segment, returning its points
    pub fn into_points(self) -> Vec<PixelPoint> {
        self.0
    }
}

impl From<Vec<PixelPoint>> for PixelSegment {
    fn from(points: Vec<PixelPoint>) -> Self {
        Self(points)
    }
}

impl FromIterator<PixelPoint> for PixelSegment {
    fn from_iter<I: IntoIterator<Item = PixelPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A coordinate in physical workspace units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPoint {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
}

impl PhysicalPoint {
    /// Create a new physical point
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite(),
            "PhysicalPoint must be finite: x={x}, y={y}"
        );
        Self { x, y }
    }
}

impl fmt::Display for PhysicalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.2} Y:{:.2}", self.x, self.y)
    }
}

/// An ordered run of physical points traced with the tool in contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalVector(Vec<PhysicalPoint>);

impl PhysicalVector {
    /// Create a vector from ordered physical points
    pub fn new(points: Vec<PhysicalPoint>) -> Self {
        Self(points)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the vector has no points
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All points in order
    pub fn points(&self) -> &[PhysicalPoint] {
        &self.0
    }

    /// First point, if any
    pub fn first(&self) -> Option<&PhysicalPoint> {
        self.0.first()
    }

    /// Last point, if any
    pub fn last(&self) -> Option<&PhysicalPoint> {
        self.0.last()
    }
}

impl FromIterator<PhysicalPoint> for PhysicalVector {
    fn from_iter<I: IntoIterator<Item = PhysicalPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Logical pose/activity state of the arm
///
/// There is no terminal state; the machine lives for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotState {
    /// No known pose (initial)
    Unknown,
    /// Re-centring in progress
    Calculating,
    /// A positional command is in flight
    Moving,
    /// Last positional command completed, arm idle
    Paused,
    /// Resting at the centred pose
    Centred,
    /// Parked at the docked pose, away from the camera
    Docked,
    /// Waiting at the tool-change pose
    ToolChange,
}

impl RobotState {
    /// States from which a positional command may be dispatched directly
    pub fn accepts_motion(&self) -> bool {
        matches!(
            self,
            RobotState::Paused | RobotState::Centred | RobotState::ToolChange
        )
    }

    /// States that must be re-centred before any positional command
    pub fn requires_recentre(&self) -> bool {
        matches!(self, RobotState::Unknown | RobotState::Docked)
    }

    /// Check if a transition from this state to `target` is valid.
    ///
    /// - Any state may start re-centring (Calculating) or lose its pose (Unknown)
    /// - Calculating lands in Centred
    /// - Moving is entered only from Paused, Centred or ToolChange
    /// - Moving always completes to Paused
    /// - Paused settles into a named pose once an explicit move finishes
    ///
    /// Docking additionally requires the move to have started from Centred,
    /// which is tracked by the state machine rather than this table.
    pub fn can_transition_to(&self, target: RobotState) -> bool {
        use RobotState::*;
        match (self, target) {
            (_, Calculating | Unknown) => true,
            (Calculating, Centred) => true,
            (Paused | Centred | ToolChange, Moving) => true,
            (Moving, Paused) => true,
            (Paused, Centred | ToolChange | Docked) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Calculating => write!(f, "calculating"),
            Self::Moving => write!(f, "moving"),
            Self::Paused => write!(f, "paused"),
            Self::Centred => write!(f, "centred"),
            Self::Docked => write!(f, "docked"),
            Self::ToolChange => write!(f, "tool_change"),
        }
    }
}
