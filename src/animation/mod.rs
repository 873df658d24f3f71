//! Animation assembly, rendering and export.
//!
//! An [`Animation`] owns its frames in playback order. [`export`] renders each
//! frame with a [`FrameRenderer`] and streams the pixels to an external
//! [`FfmpegEncoder`], producing a single video file.
//!
//! # Frame archive
//!
//! Optionally the exact frame geometry is also written to a `.tria` file,
//! which can be read back with [`ArchivePlayer`]:
//!
//! ```text
//! Header (44 bytes):
//!   Magic: "TRIA" (4 bytes)
//!   Version: u16
//!   Flags: u16 (compression in the low 4 bits)
//!   Frame count: u64
//!   Interval (ms): u32
//!   Width: u32
//!   Height: u32
//!   Reserved: 16 bytes
//!
//! Frame data (variable):
//!   3 segments * (x0, y0, x1, y1 as f64 + r, g, b, pad) = 108 bytes
//!   Optionally LZ4 compressed
//!
//! Frame index table (frame_count * 16 bytes):
//!   Offset: u64
//!   Stored size: u64
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

mod encoder;
mod export;
mod format;
mod player;
mod recorder;
mod renderer;
mod sequence;

pub use encoder::FfmpegEncoder;
pub use export::{ExportStats, export, write_archive};
pub use format::{
    ARCHIVE_MAGIC, ARCHIVE_VERSION, ArchiveFlags, ArchiveHeader, CompressionType, FRAME_SIZE,
    FrameIndex,
};
pub use player::{ArchivePlayer, FrameIterator};
pub use recorder::{ArchiveRecorder, ArchiveStats};
pub use renderer::{AXES_LINE_WIDTH_PT, FrameRenderer, LINE_WIDTH_PT};
pub use sequence::Animation;

/// Error type for rendering and encoding.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Animation has no frames to export")]
    EmptyAnimation,

    #[error("Cannot allocate a {width}x{height} canvas")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Video encoder `{program}` could not be started: {source}")]
    EncoderUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Video encoder failed ({status}): {stderr}")]
    EncoderFailed { status: ExitStatus, stderr: String },

    #[error("Cannot write frame archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Export I/O error: {0}")]
    Io(#[from] io::Error),
}
