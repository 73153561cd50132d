//! Raster vectorization
//!
//! Groups foreground pixels into 8-connected components with a depth-first
//! walk, then reorders each component into strokes with a greedy
//! nearest-neighbour chain. A chain is broken whenever the closest remaining
//! pixel lies further than the break distance, so strokes never contain long
//! synthesized jumps. Single-pixel strokes are dropped.
//!
//! The nearest-neighbour search is a direct scan and is quadratic in the
//! component size.

use sketcharm_core::{PixelPoint, PixelSegment, PlannerConfig};

use crate::mask::Mask;

/// Squared distance just over one diagonal pixel step
pub const DEFAULT_BREAK_DISTANCE_SQ: i64 = 5;

/// 8-connected neighbour offsets as (row, column) deltas, in push order
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Converts a mask into ordered pixel strokes
#[derive(Debug, Clone, Copy)]
pub struct RasterVectorizer {
    break_distance_sq: i64,
}

impl RasterVectorizer {
    /// Create a vectorizer with an explicit break distance (squared pixels)
    pub fn new(break_distance_sq: i64) -> Self {
        Self { break_distance_sq }
    }

    /// Create a vectorizer from planner settings
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.break_distance_sq)
    }

    /// Squared distance above which a stroke is split
    pub fn break_distance_sq(&self) -> i64 {
        self.break_distance_sq
    }

    /// Vectorize every connected component of the mask.
    ///
    /// Components are discovered in raster scan order. An empty mask yields
    /// no strokes.
    pub fn vectorize(&self, mask: &Mask) -> Vec<PixelSegment> {
        let width = mask.width() as usize;
        let mut visited = vec![false; width * mask.height() as usize];
        let mut segments = Vec::new();
        let mut components = 0usize;

        for seed in mask.foreground() {
            if visited[seed.y as usize * width + seed.x as usize] {
                continue;
            }
            let component = collect_component(mask, &mut visited, seed);
            components += 1;
            if component.len() < 2 {
                continue;
            }
            segments.extend(self.chain(component));
        }

        tracing::debug!(
            "Vectorized {} components into {} strokes",
            components,
            segments.len()
        );
        segments
    }

    /// Reorder an unordered pixel set into strokes.
    ///
    /// Each stroke starts at the first remaining pixel and repeatedly steps
    /// to the closest remaining pixel (the earliest one on ties). Strokes of a
    /// single pixel are discarded.
    pub fn chain(&self, mut points: Vec<PixelPoint>) -> Vec<PixelSegment> {
        let mut segments = Vec::new();

        while !points.is_empty() {
            let mut current = points.remove(0);
            let mut stroke = vec![current];

            while let Some((index, distance_sq)) = nearest(&points, &current) {
                if distance_sq > self.break_distance_sq {
                    break;
                }
                current = points.remove(index);
                stroke.push(current);
            }

            if stroke.len() > 1 {
                segments.push(PixelSegment::new(stroke));
            }
        }

        segments
    }
}

impl Default for RasterVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_BREAK_DISTANCE_SQ)
    }
}

/// Index and squared distance of the first closest point
fn nearest(points: &[PixelPoint], from: &PixelPoint) -> Option<(usize, i64)> {
    let mut best: Option<(usize, i64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = from.distance_squared(p);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best
}

/// Depth-first flood over 8-connected foreground pixels, in visit order
fn collect_component(mask: &Mask, visited: &mut [bool], seed: PixelPoint) -> Vec<PixelPoint> {
    let width = mask.width() as usize;
    let mut component = Vec::new();
    let mut stack = vec![(i64::from(seed.y), i64::from(seed.x))];

    while let Some((row, col)) = stack.pop() {
        let idx = row as usize * width + col as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        component.push(PixelPoint::new(col as i32, row as i32));

        for (dr, dc) in NEIGHBOR_OFFSETS {
            let (nr, nc) = (row + dr, col + dc);
            if mask.get(nc, nr) && !visited[nr as usize * width + nc as usize] {
                stack.push((nr, nc));
            }
        }
    }

    component
}
