//! Archive recorder for capturing exact frame geometry.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use super::format::{
    ArchiveFlags, ArchiveHeader, CompressionType, FrameIndex, compress_lz4, encode_frame,
};
use crate::compute::Frame;

/// Recorder that writes frames to a `.tria` archive.
///
/// Usage:
/// ```ignore
/// let mut recorder = ArchiveRecorder::new("movie.tria", 50, (500, 500), CompressionType::None)?;
/// for frame in animation.frames() {
///     recorder.record_frame(frame)?;
/// }
/// recorder.finalize()?;
/// ```
pub struct ArchiveRecorder {
    writer: BufWriter<File>,
    header: ArchiveHeader,
    frame_indices: Vec<FrameIndex>,
}

impl ArchiveRecorder {
    /// Create the archive file and write a placeholder header.
    pub fn new<P: AsRef<Path>>(
        path: P,
        interval_ms: u32,
        (width, height): (u32, u32),
        compression: CompressionType,
    ) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = ArchiveHeader {
            frame_count: 0, // Will be updated on finalize
            interval_ms,
            width,
            height,
            flags: ArchiveFlags { compression },
        };
        header.write_to(&mut writer)?;

        Ok(Self {
            writer,
            header,
            frame_indices: Vec::new(),
        })
    }

    /// Append one frame.
    pub fn record_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let offset = self.writer.stream_position()?;

        let encoded = encode_frame(frame);
        let data = match self.header.flags.compression {
            CompressionType::None => encoded,
            CompressionType::Lz4 => compress_lz4(&encoded),
        };

        self.writer.write_all(&data)?;
        self.frame_indices.push(FrameIndex {
            offset,
            size: data.len() as u64,
        });
        Ok(())
    }

    /// Finalize the archive.
    ///
    /// Writes the frame index table and rewrites the header with the final frame count.
    pub fn finalize(mut self) -> io::Result<ArchiveStats> {
        let index_offset = self.writer.stream_position()?;
        for index in &self.frame_indices {
            index.write_to(&mut self.writer)?;
        }
        let total_bytes = self.writer.stream_position()?;

        self.header.frame_count = self.frame_indices.len() as u64;
        self.writer.seek(SeekFrom::Start(0))?;
        self.header.write_to(&mut self.writer)?;
        self.writer.flush()?;

        Ok(ArchiveStats {
            frame_count: self.header.frame_count,
            total_bytes,
            data_bytes: index_offset - ArchiveHeader::SIZE as u64,
            compression: self.header.flags.compression,
        })
    }

    /// Number of frames recorded so far.
    pub fn frames_written(&self) -> u64 {
        self.frame_indices.len() as u64
    }
}

/// Statistics from a recording session.
#[derive(Debug, Clone)]
pub struct ArchiveStats {
    /// Total frames recorded.
    pub frame_count: u64,
    /// Total file size in bytes.
    pub total_bytes: u64,
    /// Bytes of frame data, excluding header and index.
    pub data_bytes: u64,
    /// Compression used.
    pub compression: CompressionType,
}

impl std::fmt::Display for ArchiveStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} bytes total, {} bytes of frame data ({:?} compression)",
            self.frame_count, self.total_bytes, self.data_bytes, self.compression
        )
    }
}
