//! # SketchArm
//!
//! Draws and erases images on a canvas with a robotic arm.
//!
//! ## Architecture
//!
//! SketchArm is organized as a workspace with multiple crates:
//!
//! 1. **sketcharm-core** - Geometry, arm states, configuration and error types
//! 2. **sketcharm-pathing** - Raster masks, vectorization, simplification, coordinate mapping, erase coverage
//! 3. **sketcharm-motion** - Actuator interface, fault recovery, arm state machine, job execution
//! 4. **sketcharm** - Drawing sessions that tie planning and motion to the image and camera services
//!
//! ## Features
//!
//! - **Line Drawing**: Edge extraction and nearest-neighbour stroke tracing
//! - **Erasing**: Greedy eraser footprint coverage of inked pixels
//! - **Fault Recovery**: Classified controller faults with bounded automatic retries
//! - **Safe Motion**: Forced re-centring from unknown or parked poses, docking through centre
//! - **Cancellation**: Jobs stop between strokes with the tool raised

pub mod collaborators;
pub mod session;

pub use collaborators::{CanvasCamera, ImageGenerator};
pub use session::{DrawingSession, SessionError, SessionResult};

pub use sketcharm_core::{
    AttachmentType, Bounds, Error, PhysicalPoint, PhysicalVector, PixelPoint, PixelSegment,
    RobotState, SketchConfig, SpeedType,
};
pub use sketcharm_motion::{
    Actuator, AlwaysConfirm, CancelToken, JobOutcome, JobReport, MotionError, MotionExecutor,
    OperatorPrompt, SimulatedArm,
};
pub use sketcharm_pathing::{open_raster, Mask, PathPlanner, PathingError};

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
