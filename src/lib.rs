//! Triangle Movie - render a three-point simulation log as an animated triangle.
//!
//! Each line of the input log is one record of comma-separated numbers. The
//! points A, B and C are read from fixed fields of the record, and every
//! record becomes one frame showing the edges A-B (red), A-C (green) and C-B
//! (blue). The frames are encoded into a video with a fixed interval between
//! frames.
//!
//! # Architecture
//!
//! - `schema`: Records, the record layout and movie configuration
//! - `compute`: Frame geometry, viewport, rasterization and the spring simulation
//! - `animation`: Frame sequencing, rendering, video export and frame archives
//!
//! # Example
//!
//! ```rust,no_run
//! use triangle_movie::{
//!     animation::{Animation, export},
//!     schema::{MovieConfig, load_records},
//! };
//!
//! let config = MovieConfig::default();
//! let records = load_records(&config.input)?;
//! let animation = Animation::from_records(&records, config.interval_ms)?;
//! let stats = export(&animation, &config)?;
//!
//! println!("Encoded {}", stats);
//! # Ok::<(), triangle_movie::PipelineError>(())
//! ```

pub mod animation;
pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use animation::{Animation, ExportError, ExportStats};
pub use compute::{Frame, FrameError, Segment, SpringSystem};
pub use schema::{ConfigError, LoadError, MovieConfig, Point, Record};

/// Any failure of the read, build, render and export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Run the whole pipeline described by `config`.
///
/// All records are loaded and all frames built before the output is touched,
/// so malformed input never leaves a video file behind.
pub fn run(config: &MovieConfig) -> Result<ExportStats, PipelineError> {
    config.validate()?;

    let records = schema::load_records(&config.input)?;
    log::info!(
        "Read {} records from {}",
        records.len(),
        config.input.display()
    );

    let animation = Animation::from_records(&records, config.interval_ms)?;
    drop(records);

    Ok(animation::export(&animation, config)?)
}
