//! Drawing session
//!
//! Ties the path planner and the motion executor to the image and camera
//! services. Every operation plans fully before the arm moves, and every
//! external call returns before any arm state changes.

use std::sync::Arc;

use image::DynamicImage;
use sketcharm_core::{AttachmentType, PhysicalVector, RobotState, SketchConfig, SpeedType};
use sketcharm_motion::{
    Actuator, AlwaysConfirm, CancelToken, JobOutcome, JobReport, MotionError, MotionExecutor,
    OperatorPrompt,
};
use sketcharm_pathing::{PathPlanner, PathingError};
use thiserror::Error;

use crate::collaborators::{CanvasCamera, ImageGenerator};

/// Errors surfaced by drawing session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error(transparent)]
    Pathing(#[from] PathingError),

    /// The image service or the camera failed
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One arm, one canvas, and the services around them
pub struct DrawingSession<A: Actuator, G: ImageGenerator, C: CanvasCamera> {
    planner: PathPlanner,
    executor: MotionExecutor<A>,
    generator: G,
    camera: C,
    prompt: Box<dyn OperatorPrompt>,
    cancel: CancelToken,
}

impl<A: Actuator, G: ImageGenerator, C: CanvasCamera> DrawingSession<A, G, C> {
    /// Build a session around an already connected actuator.
    ///
    /// Tool changes are confirmed automatically until [`Self::with_prompt`]
    /// installs an operator prompt.
    pub fn new(actuator: A, config: Arc<SketchConfig>, generator: G, camera: C) -> Self {
        Self {
            planner: PathPlanner::new(config.clone()),
            executor: MotionExecutor::new(actuator, config),
            generator,
            camera,
            prompt: Box::new(AlwaysConfirm),
            cancel: CancelToken::new(),
        }
    }

    /// Connect to the configured controller address
    pub fn connect(config: Arc<SketchConfig>, generator: G, camera: C) -> SessionResult<Self> {
        let executor = MotionExecutor::connect(config.clone())?;
        Ok(Self {
            planner: PathPlanner::new(config),
            executor,
            generator,
            camera,
            prompt: Box::new(AlwaysConfirm),
            cancel: CancelToken::new(),
        })
    }

    pub fn with_prompt(mut self, prompt: Box<dyn OperatorPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    pub fn executor(&self) -> &MotionExecutor<A> {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut MotionExecutor<A> {
        &mut self.executor
    }

    /// Handle for cancelling the running job from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Prepare the controller and centre the arm
    pub fn initialize(&mut self) -> SessionResult<()> {
        self.executor.initialize()?;
        Ok(())
    }

    /// Trace the line art of `image` with the marker, then dock
    pub fn draw_image(&mut self, image: &DynamicImage) -> SessionResult<JobReport> {
        let vectors = self.planner.plan_drawing_from_image(image)?;
        tracing::info!("Drawing {} vectors", vectors.len());
        if !vectors.is_empty() {
            self.executor
                .ensure_attachment(AttachmentType::Marker, &mut *self.prompt)?;
        }
        self.run_job(&vectors)
    }

    /// Generate an image from `prompt` and draw it
    pub fn generate_and_draw(&mut self, prompt: &str) -> SessionResult<JobReport> {
        tracing::info!("Generating image for prompt: {}", prompt);
        let image = self.generator.generate(prompt)?;
        self.draw_image(&image)
    }

    /// Erase the ink visible in `image` with the eraser, then dock
    pub fn erase_canvas(&mut self, image: &DynamicImage) -> SessionResult<JobReport> {
        let vectors = self.planner.plan_erasing_from_image(image)?;
        tracing::info!("Erasing along {} vectors", vectors.len());
        if !vectors.is_empty() {
            self.executor
                .ensure_attachment(AttachmentType::Eraser, &mut *self.prompt)?;
        }
        self.run_job(&vectors)
    }

    /// Photograph the canvas with the arm parked out of view
    pub fn capture_canvas(&mut self) -> SessionResult<DynamicImage> {
        match self.executor.state() {
            RobotState::Docked => {}
            RobotState::Centred => self.executor.move_to_dock()?,
            _ => {
                tracing::info!("Docking before capture");
                self.executor.move_to_centre(SpeedType::Slow)?;
                self.executor.move_to_dock()?;
            }
        }
        let frame = self.camera.capture_frame()?;
        let canvas = self.camera.crop_to_markers(&frame)?;
        Ok(canvas)
    }

    /// Capture the canvas, edit it with `prompt`, erase it and draw the edit.
    ///
    /// Returns the erase report, and the draw report unless the erase was
    /// cancelled.
    pub fn edit_and_draw(
        &mut self,
        prompt: &str,
    ) -> SessionResult<(JobReport, Option<JobReport>)> {
        let canvas = self.capture_canvas()?;
        tracing::info!("Editing canvas for prompt: {}", prompt);
        let edited = self.generator.edit(&canvas, prompt)?;

        let erased = self.erase_canvas(&canvas)?;
        if erased.outcome == JobOutcome::Cancelled {
            tracing::warn!("Erase cancelled, skipping the edited drawing");
            return Ok((erased, None));
        }
        let drawn = self.draw_image(&edited)?;
        Ok((erased, Some(drawn)))
    }

    /// Execute one job; a cancellation request only applies to that job
    fn run_job(&mut self, vectors: &[PhysicalVector]) -> SessionResult<JobReport> {
        let report = self.executor.execute_job(vectors, &self.cancel);
        self.cancel.reset();
        Ok(report?)
    }
}
