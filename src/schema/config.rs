//! Configuration for rendering and exporting a triangle movie.
//!
//! Every field has a default, and the defaults reproduce the fixed behavior:
//! read `results.txt`, draw on a 5x5 inch figure at 100 dpi, advance one
//! frame every 50 ms, and encode `movie.mp4` with ffmpeg.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level movie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieConfig {
    /// Simulation log to read.
    pub input: PathBuf,
    /// Video file to write. Overwritten if it exists.
    pub output: PathBuf,
    /// Figure size in inches (width, height).
    pub figure_size: (f32, f32),
    /// Pixels per inch.
    pub dpi: u32,
    /// Delay between frames in milliseconds.
    pub interval_ms: u32,
    /// Render the static background once and only draw segments per frame.
    pub blit: bool,
    /// Video encoder settings.
    pub encoder: EncoderConfig,
    /// Optional `.tria` archive of the exact per-frame coordinates.
    pub archive: Option<PathBuf>,
}

impl Default for MovieConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("results.txt"),
            output: PathBuf::from("movie.mp4"),
            figure_size: (5.0, 5.0),
            dpi: 100,
            interval_ms: 50,
            blit: true,
            encoder: EncoderConfig::default(),
            archive: None,
        }
    }
}

/// External encoder invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Encoder executable, looked up on `PATH`.
    pub program: String,
    /// Video codec passed to `-vcodec`.
    pub codec: String,
    /// Output pixel format passed to `-pix_fmt`.
    pub pixel_format: String,
    /// Extra arguments inserted before the output path.
    pub extra_args: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl MovieConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MovieConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Canvas size in pixels.
    ///
    /// Both dimensions are rounded down to an even number, which yuv420p
    /// encoding requires.
    pub fn frame_size(&self) -> (u32, u32) {
        let to_px = |inches: f32| {
            let px = (inches * self.dpi as f32).round() as u32;
            px & !1
        };
        (to_px(self.figure_size.0), to_px(self.figure_size.1))
    }

    /// Playback rate implied by the frame interval.
    #[inline]
    pub fn fps(&self) -> f64 {
        1000.0 / self.interval_ms as f64
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = self.figure_size;
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 || self.dpi == 0 {
            return Err(ConfigError::InvalidFigureSize);
        }
        let (pw, ph) = self.frame_size();
        if pw < 2 || ph < 2 {
            return Err(ConfigError::InvalidFigureSize);
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.encoder.program.trim().is_empty() {
            return Err(ConfigError::MissingEncoder);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Figure size and dpi must give a canvas of at least 2x2 pixels")]
    InvalidFigureSize,
    #[error("Frame interval must be positive")]
    InvalidInterval,
    #[error("Encoder program must not be empty")]
    MissingEncoder,
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
