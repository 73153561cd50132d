//! Stroke simplification (Ramer-Douglas-Peucker)
//!
//! Endpoints are always kept. An intermediate point survives only if
//! dropping it would move the polyline further than the tolerance.

use sketcharm_core::{PixelPoint, PixelSegment, PlannerConfig};

/// Default deviation tolerance in pixels
pub const DEFAULT_TOLERANCE: f64 = 2.0;

/// Reduces the point count of pixel strokes within a deviation bound
#[derive(Debug, Clone, Copy)]
pub struct PathSimplifier {
    tolerance: f64,
}

impl PathSimplifier {
    /// Create a simplifier with the given tolerance (pixels)
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Create a simplifier from planner settings
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.simplify_tolerance)
    }

    /// Deviation tolerance in pixels
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Simplify one stroke. Strokes shorter than three points are returned unchanged.
    pub fn simplify(&self, segment: &PixelSegment) -> PixelSegment {
        let points = segment.points();
        if points.len() < 3 {
            return segment.clone();
        }

        let mut keep = vec![false; points.len()];
        keep[0] = true;
        keep[points.len() - 1] = true;

        let mut spans = vec![(0usize, points.len() - 1)];
        while let Some((start, end)) = spans.pop() {
            if end <= start + 1 {
                continue;
            }

            let mut worst = (start, 0.0f64);
            for i in start + 1..end {
                let d = deviation(&points[i], &points[start], &points[end]);
                if d > worst.1 {
                    worst = (i, d);
                }
            }

            if worst.1 > self.tolerance {
                keep[worst.0] = true;
                spans.push((worst.0, end));
                spans.push((start, worst.0));
            }
        }

        points
            .iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(*p))
            .collect()
    }

    /// Simplify every stroke, preserving order
    pub fn simplify_all(&self, segments: &[PixelSegment]) -> Vec<PixelSegment> {
        segments.iter().map(|s| self.simplify(s)).collect()
    }
}

impl Default for PathSimplifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// Distance from `p` to the line through `a` and `b`; to `a` itself if they coincide
fn deviation(p: &PixelPoint, a: &PixelPoint, b: &PixelPoint) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (px, py) = (f64::from(p.x) - ax, f64::from(p.y) - ay);

    let length = dx.hypot(dy);
    if length == 0.0 {
        return px.hypot(py);
    }
    (dx * py - dy * px).abs() / length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(raw: &[(i32, i32)]) -> PixelSegment {
        raw.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    #[test]
    fn test_short_segments_unchanged() {
        let simplifier = PathSimplifier::default();
        let two = seg(&[(0, 0), (9, 9)]);
        assert_eq!(simplifier.simplify(&two), two);
        let empty = PixelSegment::default();
        assert_eq!(simplifier.simplify(&empty), empty);
    }

    #[test]
    fn test_straight_line_collapses_to_endpoints() {
        let line: PixelSegment = (0..20).map(|x| PixelPoint::new(x, 3)).collect();
        let simplified = PathSimplifier::default().simplify(&line);
        assert_eq!(simplified, seg(&[(0, 3), (19, 3)]));
    }

    #[test]
    fn test_corner_is_kept() {
        let mut raw: Vec<(i32, i32)> = (0..=10).map(|x| (x, 0)).collect();
        raw.extend((1..=10).map(|y| (10, y)));
        let simplified = PathSimplifier::default().simplify(&seg(&raw));
        assert_eq!(simplified, seg(&[(0, 0), (10, 0), (10, 10)]));
    }

    #[test]
    fn test_small_wobble_within_tolerance_dropped() {
        let wobble = seg(&[(0, 0), (5, 1), (10, 0), (15, 1), (20, 0)]);
        let simplified = PathSimplifier::default().simplify(&wobble);
        assert_eq!(simplified, seg(&[(0, 0), (20, 0)]));

        let tight = PathSimplifier::new(0.5).simplify(&wobble);
        assert_eq!(tight, wobble);
    }

    #[test]
    fn test_closed_loop_keeps_far_point() {
        let closed = seg(&[(0, 0), (5, 0), (5, 5), (0, 5), (0, 0)]);
        let simplified = PathSimplifier::default().simplify(&closed);
        assert_eq!(simplified.first(), Some(&PixelPoint::new(0, 0)));
        assert_eq!(simplified.last(), Some(&PixelPoint::new(0, 0)));
        assert!(simplified.len() >= 3);
    }
}
