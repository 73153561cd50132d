//! Erase coverage planning
//!
//! Greedy, deterministic coverage of every ink pixel with a rectangular
//! eraser footprint. The walk starts at the top-left-most ink pixel, wipes
//! the footprint centred there, and then jumps to the nearest ink pixel that
//! is still uncovered until nothing is left.

use sketcharm_core::{PixelPoint, PixelSegment, PlannerConfig};

use crate::mask::Mask;

/// One eraser placement in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Centre of the footprint
    pub center: PixelPoint,
    /// Left edge (inclusive)
    pub left: i32,
    /// Top edge (inclusive)
    pub top: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Footprint {
    fn centred_at(center: PixelPoint, width: u32, height: u32) -> Self {
        Self {
            center,
            left: center.x - (width / 2) as i32,
            top: center.y - (height / 2) as i32,
            width,
            height,
        }
    }

    /// Check if a pixel lies under the footprint
    pub fn covers(&self, p: &PixelPoint) -> bool {
        let dx = i64::from(p.x) - i64::from(self.left);
        let dy = i64::from(p.y) - i64::from(self.top);
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }
}

/// Result of a coverage plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoveragePlan {
    /// Footprint placements in visiting order
    pub footprints: Vec<Footprint>,
}

impl CoveragePlan {
    /// Footprint centres in visiting order, as one stroke
    pub fn centers(&self) -> PixelSegment {
        self.footprints.iter().map(|f| f.center).collect()
    }

    /// Returns `true` if no eraser placement is needed
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

/// Plans eraser placements that cover all ink in a mask
#[derive(Debug, Clone, Copy)]
pub struct EraseCoveragePlanner {
    footprint_width: u32,
    footprint_height: u32,
}

impl EraseCoveragePlanner {
    /// Create a planner for a footprint of `width` x `height` pixels (minimum 1x1)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            footprint_width: width.max(1),
            footprint_height: height.max(1),
        }
    }

    /// Create a planner from planner settings
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.eraser_width, config.eraser_height)
    }

    /// Plan a coverage walk; a mask without ink yields an empty plan
    pub fn plan(&self, ink: &Mask) -> CoveragePlan {
        let mut remaining: Vec<PixelPoint> = ink.foreground().collect();
        let mut plan = CoveragePlan::default();

        let Some(mut current) = top_left_most(&remaining) else {
            return plan;
        };
        let total = remaining.len();

        loop {
            let footprint =
                Footprint::centred_at(current, self.footprint_width, self.footprint_height);
            plan.footprints.push(footprint);
            remaining.retain(|p| !footprint.covers(p));

            match nearest(&remaining, &current) {
                Some(next) => current = next,
                None => break,
            }
        }

        tracing::debug!(
            "Planned {} eraser placements over {} ink pixels",
            plan.footprints.len(),
            total
        );
        plan
    }
}

impl Default for EraseCoveragePlanner {
    fn default() -> Self {
        Self::new(80, 40)
    }
}

/// First pixel minimising row + column
fn top_left_most(points: &[PixelPoint]) -> Option<PixelPoint> {
    let mut best: Option<PixelPoint> = None;
    for p in points {
        match best {
            Some(b) if p.x + p.y >= b.x + b.y => {}
            _ => best = Some(*p),
        }
    }
    best
}

/// First closest pixel by Euclidean distance
fn nearest(points: &[PixelPoint], from: &PixelPoint) -> Option<PixelPoint> {
    let mut best: Option<(PixelPoint, i64)> = None;
    for p in points {
        let d = from.distance_squared(p);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((*p, d)),
        }
    }
    best.map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ink_no_plan() {
        let plan = EraseCoveragePlanner::default().plan(&Mask::new(100, 100));
        assert!(plan.is_empty());
        assert!(plan.centers().is_empty());
    }

    #[test]
    fn test_single_blob_single_placement() {
        let mut mask = Mask::new(200, 100);
        for x in 20..30 {
            for y in 10..15 {
                mask.set(x, y, true);
            }
        }
        let plan = EraseCoveragePlanner::default().plan(&mask);
        assert_eq!(plan.footprints.len(), 1);
        assert_eq!(plan.footprints[0].center, PixelPoint::new(20, 10));
    }

    #[test]
    fn test_seed_is_top_left_most() {
        let mask = Mask::from_rows(&["....#", ".....", ".#..."]);
        let plan = EraseCoveragePlanner::new(1, 1).plan(&mask);
        assert_eq!(plan.centers().first(), Some(&PixelPoint::new(1, 2)));
        assert_eq!(plan.footprints.len(), 2);
    }

    #[test]
    fn test_visits_nearest_remaining() {
        let mask = Mask::from_rows(&["#.........#", "...#......."]);
        let plan = EraseCoveragePlanner::new(1, 1).plan(&mask);
        let centers: Vec<_> = plan.centers().into_points();
        assert_eq!(
            centers,
            vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(3, 1),
                PixelPoint::new(10, 0)
            ]
        );
    }

    #[test]
    fn test_footprint_covers_half_open_extent() {
        let f = Footprint::centred_at(PixelPoint::new(40, 20), 80, 40);
        assert!(f.covers(&PixelPoint::new(0, 0)));
        assert!(f.covers(&PixelPoint::new(79, 39)));
        assert!(!f.covers(&PixelPoint::new(80, 39)));
        assert!(!f.covers(&PixelPoint::new(79, 40)));
    }
}
