//! Ordered frame sequence with a fixed playback interval.

use crate::compute::{Frame, FrameError, build_frame};
use crate::schema::Record;

/// Frames in playback order, shown one every `interval_ms` milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: Vec<Frame>,
    interval_ms: u32,
}

impl Animation {
    /// Create an empty animation.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            frames: Vec::new(),
            interval_ms,
        }
    }

    /// Build one frame per record, in record order.
    ///
    /// Fails on the first record that is too short; no frames are kept in that case.
    pub fn from_records(records: &[Record], interval_ms: u32) -> Result<Self, FrameError> {
        let frames = records
            .iter()
            .enumerate()
            .map(|(i, record)| build_frame(i + 1, record))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Built {} frames", frames.len());
        Ok(Self {
            frames,
            interval_ms,
        })
    }

    /// Append a frame at the end.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Total playback time.
    pub fn duration_ms(&self) -> u64 {
        self.frames.len() as u64 * self.interval_ms as u64
    }
}
