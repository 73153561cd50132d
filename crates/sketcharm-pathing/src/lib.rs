//! # SketchArm Pathing
//!
//! Turns raster imagery into physically executable toolpaths.
//!
//! ## Pipeline
//!
//! - **Raster preparation**: Edge extraction for drawings and ink binarization for erasing
//! - **Raster Vectorizer**: 8-connected grouping and nearest-neighbour stroke chaining
//! - **Path Simplifier**: Ramer-Douglas-Peucker reduction with endpoint preservation
//! - **Coordinate Mapper**: Aspect-preserving pixel to workspace mapping with clamping
//! - **Erase Coverage Planner**: Greedy eraser footprint walk over ink pixels
//!
//! [`PathPlanner`] chains these stages for one drawing or erasing job.

pub mod erase_planner;
pub mod error;
pub mod mapper;
pub mod mask;
pub mod planner;
pub mod raster;
pub mod simplifier;
pub mod vectorizer;

pub use erase_planner::{CoveragePlan, EraseCoveragePlanner, Footprint};
pub use error::{PathingError, PathingResult};
pub use mapper::CoordinateMapper;
pub use mask::Mask;
pub use planner::PathPlanner;
pub use raster::{open_raster, EdgeExtractor};
pub use simplifier::{PathSimplifier, DEFAULT_TOLERANCE};
pub use vectorizer::{RasterVectorizer, DEFAULT_BREAK_DISTANCE_SQ};
