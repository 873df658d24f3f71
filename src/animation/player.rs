//! Archive player for reading back recorded frames.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::format::{ArchiveHeader, CompressionType, FrameIndex, decode_frame, decompress_lz4};
use crate::compute::Frame;

/// Reader for `.tria` archives.
///
/// Usage:
/// ```ignore
/// let mut player = ArchivePlayer::open("movie.tria")?;
/// println!("Archive has {} frames", player.frame_count());
///
/// for frame in player.frames() {
///     let frame = frame?;
///     // Use frame...
/// }
/// ```
pub struct ArchivePlayer {
    reader: BufReader<File>,
    header: ArchiveHeader,
    frame_indices: Vec<FrameIndex>,
}

impl ArchivePlayer {
    /// Open an archive for playback.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let header = ArchiveHeader::read_from(&mut reader)?;

        // Index table sits at the end of the file
        let file_len = reader.seek(SeekFrom::End(0))?;
        let index_start = header
            .frame_count
            .checked_mul(FrameIndex::SIZE as u64)
            .and_then(|index_size| file_len.checked_sub(index_size))
            .filter(|&start| start >= ArchiveHeader::SIZE as u64)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "TRIA file too short for {} frame index entries",
                        header.frame_count
                    ),
                )
            })?;
        reader.seek(SeekFrom::Start(index_start))?;

        let mut frame_indices = Vec::with_capacity(header.frame_count as usize);
        for _ in 0..header.frame_count {
            frame_indices.push(FrameIndex::read_from(&mut reader)?);
        }

        Ok(Self {
            reader,
            header,
            frame_indices,
        })
    }

    /// Get archive header.
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Get total number of frames.
    pub fn frame_count(&self) -> u64 {
        self.header.frame_count
    }

    /// Playback interval in milliseconds.
    pub fn interval_ms(&self) -> u32 {
        self.header.interval_ms
    }

    /// Canvas size the movie was rendered at.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.header.width, self.header.height)
    }

    /// Read a specific frame by index.
    pub fn read_frame(&mut self, frame_index: u64) -> io::Result<Frame> {
        let Some(index) = self.frame_indices.get(frame_index as usize).copied() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Frame index {} out of range ({} frames)",
                    frame_index, self.header.frame_count
                ),
            ));
        };

        self.reader.seek(SeekFrom::Start(index.offset))?;
        let mut data = vec![0u8; index.size as usize];
        self.reader.read_exact(&mut data)?;

        let raw_data = match self.header.flags.compression {
            CompressionType::None => data,
            CompressionType::Lz4 => decompress_lz4(&data)?,
        };

        decode_frame(&raw_data)
    }

    /// Read every frame in order.
    pub fn read_all(&mut self) -> io::Result<Vec<Frame>> {
        self.frames().collect()
    }

    /// Create an iterator over all frames.
    pub fn frames(&mut self) -> FrameIterator<'_> {
        FrameIterator {
            player: self,
            current: 0,
        }
    }
}

/// Iterator over archived frames.
pub struct FrameIterator<'a> {
    player: &'a mut ArchivePlayer,
    current: u64,
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = io::Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.player.frame_count() {
            return None;
        }

        let result = self.player.read_frame(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.player.frame_count() - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for FrameIterator<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{ArchiveFlags, ArchiveRecorder};
    use crate::schema::Point;
    use tempfile::tempdir;

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.25;
                Frame::triangle(
                    Point::new(t, -t),
                    Point::new(1.0 + t, 0.5),
                    Point::new(0.0, 1.0 - t),
                )
            })
            .collect()
    }

    fn record(path: &Path, frames: &[Frame], compression: CompressionType) {
        let mut recorder = ArchiveRecorder::new(path, 50, (500, 500), compression).unwrap();
        for frame in frames {
            recorder.record_frame(frame).unwrap();
        }
        recorder.finalize().unwrap();
    }

    #[test]
    fn test_player_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.tria");
        let original = frames(5);
        record(&path, &original, CompressionType::None);

        let mut player = ArchivePlayer::open(&path).unwrap();
        assert_eq!(player.frame_count(), 5);
        assert_eq!(player.interval_ms(), 50);
        assert_eq!(player.dimensions(), (500, 500));

        assert_eq!(player.read_frame(3).unwrap(), original[3]);
        assert_eq!(player.read_all().unwrap(), original);
    }

    #[test]
    fn test_player_lz4_flag_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lz4.tria");
        let original = frames(4);
        record(&path, &original, CompressionType::Lz4);

        let mut player = ArchivePlayer::open(&path).unwrap();
        assert_eq!(player.header().flags.compression, CompressionType::Lz4);
        assert_eq!(player.read_all().unwrap(), original);
    }

    #[test]
    fn test_player_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("range.tria");
        record(&path, &frames(2), CompressionType::None);

        let mut player = ArchivePlayer::open(&path).unwrap();
        let err = player.read_frame(2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_player_iterator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("iter.tria");
        record(&path, &frames(3), CompressionType::None);

        let mut player = ArchivePlayer::open(&path).unwrap();
        let mut iter = player.frames();
        assert_eq!(iter.len(), 3);
        assert!(iter.all(|f| f.is_ok()));
    }

    #[test]
    fn test_corrupt_frame_count_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.tria");
        let header = ArchiveHeader {
            frame_count: u64::MAX / 4,
            interval_ms: 50,
            width: 500,
            height: 500,
            flags: ArchiveFlags {
                compression: CompressionType::None,
            },
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        std::fs::write(&path, &bytes).unwrap();

        let err = ArchivePlayer::open(&path).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
