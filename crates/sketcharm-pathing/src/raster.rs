//! Raster preparation
//!
//! Turns colour images into binary masks for the planners:
//! - line masks for drawing (resize to the canvas, greyscale, blur, edge detection)
//! - ink masks for erasing (greyscale, blur, inverse threshold)

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use sketcharm_core::{Bounds, GeometryError, PlannerConfig};

use crate::error::{PathingError, PathingResult};
use crate::mask::Mask;

/// Extracts thin edge lines from a raster
#[derive(Debug, Clone, Copy)]
pub struct EdgeExtractor {
    target_width: f64,
    target_height: f64,
    blur_sigma: f32,
    low: f32,
    high: f32,
}

impl EdgeExtractor {
    /// Extractor that fits images onto `bounds` at one pixel per physical unit
    pub fn new(bounds: &Bounds, config: &PlannerConfig) -> Self {
        Self {
            target_width: bounds.width(),
            target_height: bounds.height(),
            blur_sigma: config.blur_sigma,
            low: config.edge_low,
            high: config.edge_high,
        }
    }

    /// Produce a one-pixel-wide edge mask
    pub fn extract(&self, image: &DynamicImage) -> PathingResult<Mask> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyRaster { width, height }.into());
        }

        let scale = (self.target_width / f64::from(width)).min(self.target_height / f64::from(height));
        let new_width = ((f64::from(width) * scale) as u32).max(1);
        let new_height = ((f64::from(height) * scale) as u32).max(1);

        let gray = image.to_luma8();
        let resized = imageops::resize(&gray, new_width, new_height, FilterType::Triangle);
        let smoothed = smooth(&resized, self.blur_sigma)?;
        let mask = detect_edges(&smoothed, self.low, self.high);

        tracing::debug!(
            "Extracted {} edge pixels from {}x{} raster (resized to {}x{})",
            mask.foreground_count(),
            width,
            height,
            new_width,
            new_height
        );
        Ok(mask)
    }
}

impl Mask {
    /// Binarize a drawing: pixels at or below `threshold` after blurring are ink
    pub fn ink_from_image(image: &DynamicImage, threshold: u8, blur_sigma: f32) -> PathingResult<Mask> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyRaster { width, height }.into());
        }
        let smoothed = smooth(&image.to_luma8(), blur_sigma)?;
        Ok(Mask::from_gray_with(&smoothed, |v| v <= threshold))
    }
}

/// Decode a raster file from disk
pub fn open_raster(path: impl AsRef<Path>) -> PathingResult<DynamicImage> {
    Ok(image::open(path)?)
}

fn smooth(image: &GrayImage, sigma: f32) -> PathingResult<GrayImage> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(PathingError::InvalidParameters(format!(
            "blur sigma must be finite and non-negative, got {sigma}"
        )));
    }
    if sigma == 0.0 {
        return Ok(image.clone());
    }
    Ok(imageops::blur(image, sigma))
}

/// Sobel gradient, non-maximum suppression along the gradient direction,
/// then hysteresis.
///
/// Pixels above `high` start edges; pixels above `low` are kept only when
/// 8-connected to one of those. Magnitude uses the L1 norm; border pixels
/// are never edges.
fn detect_edges(image: &GrayImage, low: f32, high: f32) -> Mask {
    let (width, height) = image.dimensions();
    let mut mask = Mask::new(width, height);
    if width < 3 || height < 3 {
        return mask;
    }

    let px = |x: u32, y: u32| i32::from(image.get_pixel(x, y).0[0]);
    let (w, h) = (width as usize, height as usize);
    let mut magnitude = vec![0f32; w * h];
    let mut direction = vec![0u8; w * h];

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2 * px(x - 1, y)
                - px(x - 1, y + 1);
            let gy = px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2 * px(x, y - 1)
                - px(x + 1, y - 1);
            let idx = y as usize * w + x as usize;
            magnitude[idx] = (gx.abs() + gy.abs()) as f32;
            direction[idx] = quantize_direction(gx as f32, gy as f32);
        }
    }

    let mut candidate = vec![false; w * h];
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = magnitude[idx];
            if m <= low {
                continue;
            }
            let (a, b) = match direction[idx] {
                0 => (idx - 1, idx + 1),
                1 => (idx - w + 1, idx + w - 1),
                2 => (idx - w, idx + w),
                _ => (idx - w - 1, idx + w + 1),
            };
            if m >= magnitude[a] && m >= magnitude[b] {
                candidate[idx] = true;
                if m > high {
                    stack.push(idx);
                }
            }
        }
    }

    while let Some(idx) = stack.pop() {
        if !candidate[idx] {
            continue;
        }
        candidate[idx] = false;
        let (x, y) = (idx % w, idx / w);
        mask.set(x as u32, y as u32, true);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let next = ny * w + nx;
                if candidate[next] {
                    stack.push(next);
                }
            }
        }
    }

    mask
}

/// Gradient direction bucket: 0 horizontal, 1 rising diagonal, 2 vertical, 3 falling diagonal
fn quantize_direction(gx: f32, gy: f32) -> u8 {
    let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&angle) {
        0
    } else if angle < 67.5 {
        3
    } else if angle < 112.5 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn white_with_black_square(size: u32, from: u32, to: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(size, size, Rgb([255, 255, 255]));
        for y in from..to {
            for x in from..to {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_ink_mask_inverse_threshold() {
        let mut gray = GrayImage::from_pixel(3, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([0]));
        gray.put_pixel(1, 0, Luma([128]));
        let mask = Mask::ink_from_image(&DynamicImage::ImageLuma8(gray), 128, 0.0).unwrap();
        assert!(mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
    }

    #[test]
    fn test_blank_image_has_no_ink() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([255, 255, 255])));
        let mask = Mask::ink_from_image(&img, 128, 1.0).unwrap();
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_edges_outline_square() {
        let bounds = Bounds::new(0.0, 40.0, 0.0, 40.0);
        let config = PlannerConfig {
            blur_sigma: 0.0,
            ..PlannerConfig::default()
        };
        let extractor = EdgeExtractor::new(&bounds, &config);
        let mask = extractor
            .extract(&white_with_black_square(40, 10, 30))
            .unwrap();

        assert_eq!((mask.width(), mask.height()), (40, 40));
        assert!(mask.foreground_count() > 0);
        // Flat regions carry no edges
        assert!(!mask.get(20, 20));
        assert!(!mask.get(2, 2));
    }

    /// Vertical step at column 10 between black and `left_of_20`, then a
    /// second step at column 20 up to `right`
    fn steps(rows: impl Fn(u32) -> (u8, u8)) -> GrayImage {
        GrayImage::from_fn(30, 20, |x, y| {
            let (middle, right) = rows(y);
            match x {
                0..=9 => Luma([0]),
                10..=19 => Luma([middle]),
                _ => Luma([right]),
            }
        })
    }

    #[test]
    fn test_weak_edge_follows_strong_edge() {
        // Step of 40 in the top rows, 20 in the bottom rows, one continuous line
        let image = steps(|y| if y < 10 { (40, 40) } else { (20, 20) });
        let mask = detect_edges(&image, 50.0, 100.0);

        assert!(mask.get(9, 5) && mask.get(10, 5));
        assert!(mask.get(9, 15) && mask.get(10, 15));
        // A single threshold at the high level loses the faint half
        assert!(!detect_edges(&image, 100.0, 100.0).get(9, 15));
    }

    #[test]
    fn test_isolated_weak_edge_dropped() {
        // Faint step at column 10, strong step at column 20, not touching
        let image = steps(|_| (20, 60));
        let mask = detect_edges(&image, 50.0, 100.0);

        assert!(mask.get(19, 10) && mask.get(20, 10));
        assert!(!mask.get(9, 10) && !mask.get(10, 10));
        // Without hysteresis the faint step would survive
        assert!(detect_edges(&image, 50.0, 50.0).get(9, 10));
    }

    #[test]
    fn test_extract_fits_canvas_aspect() {
        let bounds = Bounds::new(0.0, 50.0, 0.0, 100.0);
        let extractor = EdgeExtractor::new(&bounds, &PlannerConfig::default());
        let mask = extractor
            .extract(&white_with_black_square(200, 50, 150))
            .unwrap();
        assert_eq!((mask.width(), mask.height()), (50, 50));
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        assert!(matches!(
            Mask::ink_from_image(&img, 128, -1.0),
            Err(PathingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_missing_file_is_image_error() {
        assert!(matches!(
            open_raster("/nonexistent/canvas.png"),
            Err(PathingError::Image(_))
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 5));
        assert!(Mask::ink_from_image(&img, 128, 1.0).is_err());
    }
}
