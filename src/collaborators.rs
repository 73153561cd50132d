//! External services the drawing session depends on
//!
//! Both are blocking: a call returns only once the raster is fully
//! available, and the session applies no state change while one is
//! outstanding.

use image::DynamicImage;

/// Generative image service
pub trait ImageGenerator {
    /// Create an image from a text prompt
    fn generate(&self, prompt: &str) -> anyhow::Result<DynamicImage>;

    /// Produce an edited version of `image` following `prompt`
    fn edit(&self, image: &DynamicImage, prompt: &str) -> anyhow::Result<DynamicImage>;
}

/// Camera looking at the canvas
pub trait CanvasCamera {
    /// Grab a single frame
    fn capture_frame(&mut self) -> anyhow::Result<DynamicImage>;

    /// Rectify a frame to the canvas area marked by fiducials
    fn crop_to_markers(&self, frame: &DynamicImage) -> anyhow::Result<DynamicImage>;
}
