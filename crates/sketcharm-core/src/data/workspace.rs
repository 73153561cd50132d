//! Workspace geometry, preset poses, attachments and speed classes

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PhysicalPoint;

/// Rectangular region the tool may legally occupy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum X
    pub min_x: f64,
    /// Maximum X
    pub max_x: f64,
    /// Minimum Y
    pub min_y: f64,
    /// Maximum Y
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from explicit extents
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Physical width (X extent)
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Physical height (Y extent)
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre of the region
    pub fn center(&self) -> PhysicalPoint {
        PhysicalPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if a point lies inside the bounds (inclusive)
    pub fn contains(&self, point: &PhysicalPoint) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }

    /// Clamp each axis independently into the bounds
    pub fn clamp(&self, point: PhysicalPoint) -> PhysicalPoint {
        PhysicalPoint::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }

    /// The four corners in calibration order:
    /// (min_x, max_y), (min_x, min_y), (max_x, min_y), (max_x, max_y)
    pub fn corners(&self) -> [PhysicalPoint; 4] {
        [
            PhysicalPoint::new(self.min_x, self.max_y),
            PhysicalPoint::new(self.min_x, self.min_y),
            PhysicalPoint::new(self.max_x, self.min_y),
            PhysicalPoint::new(self.max_x, self.max_y),
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(235.0, 415.0, -190.0, 190.0)
    }
}

/// A named arm pose; `z` of `None` means "raised height of the active attachment"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Explicit Z height, if the pose fixes one
    #[serde(default)]
    pub z: Option<f64>,
}

impl Pose {
    /// Pose at the given XY that travels at the raised height
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Pose with an explicit Z height
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Tool orientation held constant for every move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Roll in degrees
    pub roll: f64,
    /// Pitch in degrees
    pub pitch: f64,
    /// Yaw in degrees
    pub yaw: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            roll: 180.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

/// Currently mounted tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    /// Whiteboard marker
    Marker,
    /// Rectangular eraser pad
    Eraser,
    /// Pen
    Pen,
    /// Nothing mounted
    Empty,
}

impl AttachmentType {
    /// Get all attachment types
    pub fn all() -> &'static [AttachmentType] {
        &[
            AttachmentType::Marker,
            AttachmentType::Eraser,
            AttachmentType::Pen,
            AttachmentType::Empty,
        ]
    }
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker => write!(f, "marker"),
            Self::Eraser => write!(f, "eraser"),
            Self::Pen => write!(f, "pen"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Contact and non-contact heights for one attachment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZHeights {
    /// Tool touches the surface
    pub lowered: f64,
    /// Tool clears the surface
    pub raised: f64,
}

impl ZHeights {
    /// Create a height pair
    pub const fn new(lowered: f64, raised: f64) -> Self {
        Self { lowered, raised }
    }

    /// Height for the requested contact state
    pub fn height(&self, raised: bool) -> f64 {
        if raised {
            self.raised
        } else {
            self.lowered
        }
    }
}

/// Named speed class resolved to a numeric speed through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedType {
    /// Long travel moves
    Fast,
    /// Drawing and regular travel
    Normal,
    /// Approaches to parked poses and recovery moves
    Slow,
}

impl fmt::Display for SpeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Normal => write!(f, "normal"),
            Self::Slow => write!(f, "slow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_dimensions() {
        let bounds = Bounds::default();
        assert_eq!(bounds.width(), 180.0);
        assert_eq!(bounds.height(), 380.0);
        assert_eq!(bounds.center(), PhysicalPoint::new(325.0, 0.0));
    }

    #[test]
    fn test_clamp_each_axis_independently() {
        let bounds = Bounds::new(0.0, 10.0, -5.0, 5.0);
        assert_eq!(
            bounds.clamp(PhysicalPoint::new(12.0, 1.0)),
            PhysicalPoint::new(10.0, 1.0)
        );
        assert_eq!(
            bounds.clamp(PhysicalPoint::new(3.0, -9.0)),
            PhysicalPoint::new(3.0, -5.0)
        );
        assert!(bounds.contains(&PhysicalPoint::new(10.0, 5.0)));
        assert!(!bounds.contains(&PhysicalPoint::new(10.1, 5.0)));
    }

    #[test]
    fn test_corner_order() {
        let corners = Bounds::new(0.0, 1.0, 0.0, 2.0).corners();
        assert_eq!(corners[0], PhysicalPoint::new(0.0, 2.0));
        assert_eq!(corners[3], PhysicalPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_z_heights() {
        let z = ZHeights::new(59.0, 80.0);
        assert_eq!(z.height(true), 80.0);
        assert_eq!(z.height(false), 59.0);
    }
}
