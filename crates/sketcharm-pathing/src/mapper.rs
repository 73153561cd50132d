//! Pixel to workspace coordinate mapping
//!
//! One uniform scale factor is computed per job so the drawing keeps its
//! aspect ratio. Mapped points are clamped into the workspace bounds.

use sketcharm_core::{
    Bounds, GeometryError, PhysicalPoint, PhysicalVector, PixelPoint, PixelSegment,
};

/// Maps raster pixels onto the physical canvas
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    bounds: Bounds,
    scale: f64,
}

impl CoordinateMapper {
    /// Compute the job scale for a raster of `pixel_width` x `pixel_height`
    pub fn new(pixel_width: u32, pixel_height: u32, bounds: Bounds) -> Result<Self, GeometryError> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(GeometryError::EmptyRaster {
                width: pixel_width,
                height: pixel_height,
            });
        }
        if !(bounds.width() > 0.0) || !(bounds.height() > 0.0) {
            return Err(GeometryError::DegenerateWorkspace {
                reason: format!("{}x{}", bounds.width(), bounds.height()),
            });
        }

        let scale = (bounds.width() / f64::from(pixel_width))
            .min(bounds.height() / f64::from(pixel_height));
        tracing::debug!(
            "Mapping {}x{} px onto {:.1}x{:.1} at scale {:.4}",
            pixel_width,
            pixel_height,
            bounds.width(),
            bounds.height(),
            scale
        );
        Ok(Self { bounds, scale })
    }

    /// Physical units per pixel
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Workspace bounds used for clamping
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Map one pixel and clamp it into the workspace
    pub fn map_point(&self, pixel: PixelPoint) -> PhysicalPoint {
        self.bounds.clamp(PhysicalPoint::new(
            self.bounds.min_x + f64::from(pixel.x) * self.scale,
            self.bounds.min_y + f64::from(pixel.y) * self.scale,
        ))
    }

    /// Map a whole stroke point by point
    pub fn map_segment(&self, segment: &PixelSegment) -> PhysicalVector {
        segment.points().iter().map(|p| self.map_point(*p)).collect()
    }

    /// Map every non-empty stroke, preserving order
    pub fn map_all(&self, segments: &[PixelSegment]) -> Vec<PhysicalVector> {
        segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| self.map_segment(s))
            .collect()
    }
}
