//! Binary foreground/background rasters

use image::GrayImage;
use sketcharm_core::{GeometryError, PixelPoint};

/// A 2D foreground/background mask stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Create an all-background mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Wrap a row-major buffer of `width * height` flags
    pub fn from_vec(width: u32, height: u32, data: Vec<bool>) -> Result<Self, GeometryError> {
        if data.len() != width as usize * height as usize {
            return Err(GeometryError::MaskSizeMismatch {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a mask from text rows where `#` marks foreground.
    ///
    /// Short rows are padded with background.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut mask = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x as u32, y as u32, true);
                }
            }
        }
        mask
    }

    /// Every non-zero pixel of a greyscale image is foreground
    pub fn from_gray_nonzero(image: &GrayImage) -> Self {
        Self::from_gray_with(image, |v| v != 0)
    }

    /// Classify each grey level with `is_foreground`
    pub fn from_gray_with(image: &GrayImage, is_foreground: impl Fn(u8) -> bool) -> Self {
        let (width, height) = image.dimensions();
        let data = image.pixels().map(|p| is_foreground(p.0[0])).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if the mask has no pixels at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Foreground test; out-of-range coordinates read as background
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.data[self.index(x as u32, y as u32)]
    }

    /// Set a pixel; out-of-range writes are ignored
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = foreground;
        }
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|v| **v).count()
    }

    /// Foreground pixels in raster scan order (row by row, left to right)
    pub fn foreground(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        let width = self.width.max(1) as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(i, _)| PixelPoint::new((i % width) as i32, (i / width) as i32))
    }
}
