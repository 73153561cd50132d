//! Job-level path planning
//!
//! Runs the raster pipelines for one drawing or erasing job and hands back
//! physical vectors ready for the motion executor.

use std::sync::Arc;

use image::DynamicImage;
use sketcharm_core::{PhysicalVector, SketchConfig};

use crate::erase_planner::EraseCoveragePlanner;
use crate::error::PathingResult;
use crate::mapper::CoordinateMapper;
use crate::mask::Mask;
use crate::raster::EdgeExtractor;
use crate::simplifier::PathSimplifier;
use crate::vectorizer::RasterVectorizer;

/// Mask to physical vector pipelines configured from one `SketchConfig`
#[derive(Debug, Clone)]
pub struct PathPlanner {
    config: Arc<SketchConfig>,
    vectorizer: RasterVectorizer,
    simplifier: PathSimplifier,
    eraser: EraseCoveragePlanner,
}

impl PathPlanner {
    pub fn new(config: Arc<SketchConfig>) -> Self {
        let planner = &config.planner;
        Self {
            vectorizer: RasterVectorizer::from_config(planner),
            simplifier: PathSimplifier::from_config(planner),
            eraser: EraseCoveragePlanner::from_config(planner),
            config,
        }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Vectorize, simplify and map a line mask.
    ///
    /// A mask without strokes yields no vectors.
    pub fn plan_drawing(&self, mask: &Mask) -> PathingResult<Vec<PhysicalVector>> {
        let segments = self.vectorizer.vectorize(mask);
        if segments.is_empty() {
            tracing::info!("No strokes found in {}x{} mask", mask.width(), mask.height());
            return Ok(Vec::new());
        }

        let simplified = self.simplifier.simplify_all(&segments);
        let mapper = CoordinateMapper::new(mask.width(), mask.height(), self.config.canvas)?;
        let vectors = mapper.map_all(&simplified);

        let before: usize = segments.iter().map(|s| s.len()).sum();
        let after: usize = vectors.iter().map(|v| v.len()).sum();
        tracing::info!(
            "Planned {} drawing vectors ({} points simplified to {})",
            vectors.len(),
            before,
            after
        );
        Ok(vectors)
    }

    /// Cover every ink pixel with the eraser and map the walk as one vector.
    ///
    /// Coverage centres are not simplified.
    pub fn plan_erasing(&self, ink: &Mask) -> PathingResult<Vec<PhysicalVector>> {
        let plan = self.eraser.plan(ink);
        if plan.is_empty() {
            tracing::info!("No ink to erase");
            return Ok(Vec::new());
        }

        let mapper = CoordinateMapper::new(ink.width(), ink.height(), self.config.canvas)?;
        let vector = mapper.map_segment(&plan.centers());
        tracing::info!("Planned erase path with {} placements", vector.len());
        Ok(vec![vector])
    }

    /// Extract edges from a raster and plan them as a drawing
    pub fn plan_drawing_from_image(&self, image: &DynamicImage) -> PathingResult<Vec<PhysicalVector>> {
        let mask = EdgeExtractor::new(&self.config.canvas, &self.config.planner).extract(image)?;
        self.plan_drawing(&mask)
    }

    /// Binarize a photo of the canvas and plan its erasure
    pub fn plan_erasing_from_image(&self, image: &DynamicImage) -> PathingResult<Vec<PhysicalVector>> {
        let planner = &self.config.planner;
        let ink = Mask::ink_from_image(image, planner.ink_threshold, planner.blur_sigma)?;
        self.plan_erasing(&ink)
    }
}
