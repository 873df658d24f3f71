//! Binary format definitions for triangle frame archives.

use std::io::{self, Read, Write};

use crate::compute::{Frame, Rgb, Segment};
use crate::schema::Point;

/// Magic bytes identifying a triangle frame archive.
pub const ARCHIVE_MAGIC: &[u8; 4] = b"TRIA";

/// Current format version.
pub const ARCHIVE_VERSION: u16 = 1;

/// Bytes per encoded segment: four f64 coordinates, RGB and a pad byte.
pub const SEGMENT_SIZE: usize = 4 * 8 + 4;

/// Bytes per encoded (uncompressed) frame.
pub const FRAME_SIZE: usize = 3 * SEGMENT_SIZE;

/// Compression type for frame data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionType {
    /// No compression.
    #[default]
    None = 0,
    /// LZ4 fast compression.
    Lz4 = 1,
}

impl CompressionType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Lz4),
            _ => None,
        }
    }
}

/// Archive header flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveFlags {
    /// Compression type (lower 4 bits).
    pub compression: CompressionType,
}

impl ArchiveFlags {
    pub fn to_u16(self) -> u16 {
        self.compression as u16
    }

    pub fn from_u16(v: u16) -> io::Result<Self> {
        let compression = CompressionType::from_u8((v & 0x0F) as u8).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unknown TRIA compression type: {}", v & 0x0F),
            )
        })?;
        Ok(Self { compression })
    }
}

/// File header of a triangle frame archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Total number of frames.
    pub frame_count: u64,
    /// Playback interval in milliseconds.
    pub interval_ms: u32,
    /// Canvas width the movie was rendered at.
    pub width: u32,
    /// Canvas height the movie was rendered at.
    pub height: u32,
    /// Archive flags.
    pub flags: ArchiveFlags,
}

impl ArchiveHeader {
    /// Size of header in bytes.
    /// Magic(4) + Version(2) + Flags(2) + FrameCount(8) + Interval(4) +
    /// Width(4) + Height(4) + Reserved(16) = 44
    pub const SIZE: usize = 44;

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(ARCHIVE_MAGIC)?;
        w.write_all(&ARCHIVE_VERSION.to_le_bytes())?;
        w.write_all(&self.flags.to_u16().to_le_bytes())?;
        w.write_all(&self.frame_count.to_le_bytes())?;
        w.write_all(&self.interval_ms.to_le_bytes())?;
        w.write_all(&self.width.to_le_bytes())?;
        w.write_all(&self.height.to_le_bytes())?;
        // Reserved bytes
        w.write_all(&[0u8; 16])?;
        Ok(())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != ARCHIVE_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid TRIA magic bytes",
            ));
        }

        let mut buf2 = [0u8; 2];
        let mut buf4 = [0u8; 4];
        let mut buf8 = [0u8; 8];

        r.read_exact(&mut buf2)?;
        let version = u16::from_le_bytes(buf2);
        if version != ARCHIVE_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported TRIA version: {}", version),
            ));
        }

        r.read_exact(&mut buf2)?;
        let flags = ArchiveFlags::from_u16(u16::from_le_bytes(buf2))?;

        r.read_exact(&mut buf8)?;
        let frame_count = u64::from_le_bytes(buf8);

        r.read_exact(&mut buf4)?;
        let interval_ms = u32::from_le_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let width = u32::from_le_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let height = u32::from_le_bytes(buf4);

        // Skip reserved bytes
        let mut reserved = [0u8; 16];
        r.read_exact(&mut reserved)?;

        Ok(Self {
            frame_count,
            interval_ms,
            width,
            height,
            flags,
        })
    }
}

/// Index entry for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameIndex {
    /// Byte offset from start of file.
    pub offset: u64,
    /// Stored size in bytes (equals [`FRAME_SIZE`] without compression).
    pub size: u64,
}

impl FrameIndex {
    /// Size of one index entry in bytes.
    pub const SIZE: usize = 16;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.offset.to_le_bytes())?;
        w.write_all(&self.size.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf8 = [0u8; 8];

        r.read_exact(&mut buf8)?;
        let offset = u64::from_le_bytes(buf8);

        r.read_exact(&mut buf8)?;
        let size = u64::from_le_bytes(buf8);

        Ok(Self { offset, size })
    }
}

/// Encode a frame's segments to bytes.
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FRAME_SIZE);
    for s in &frame.segments {
        for v in [s.start.x, s.start.y, s.end.x, s.end.y] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&[s.color.r, s.color.g, s.color.b, 0]);
    }
    bytes
}

/// Decode bytes produced by [`encode_frame`].
pub fn decode_frame(bytes: &[u8]) -> io::Result<Frame> {
    if bytes.len() != FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Frame size mismatch: {} bytes, expected {}",
                bytes.len(),
                FRAME_SIZE
            ),
        ));
    }

    let f64_at = |pos: usize| {
        let mut b = [0u8; 8];
        b.copy_from_slice(&bytes[pos..pos + 8]);
        f64::from_le_bytes(b)
    };

    let segment = |i: usize| {
        let base = i * SEGMENT_SIZE;
        Segment {
            start: Point::new(f64_at(base), f64_at(base + 8)),
            end: Point::new(f64_at(base + 16), f64_at(base + 24)),
            color: Rgb::new(bytes[base + 32], bytes[base + 33], bytes[base + 34]),
        }
    };

    Ok(Frame {
        segments: [segment(0), segment(1), segment(2)],
    })
}

/// Compress data using LZ4.
#[cfg(feature = "lz4")]
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

/// Decompress LZ4 data.
#[cfg(feature = "lz4")]
pub fn decompress_lz4(data: &[u8]) -> io::Result<Vec<u8>> {
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Fallback when LZ4 is not available.
#[cfg(not(feature = "lz4"))]
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    data.to_vec()
}

#[cfg(not(feature = "lz4"))]
pub fn decompress_lz4(data: &[u8]) -> io::Result<Vec<u8>> {
    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_roundtrip() {
        let header = ArchiveHeader {
            frame_count: 101,
            interval_ms: 50,
            width: 500,
            height: 500,
            flags: ArchiveFlags {
                compression: CompressionType::Lz4,
            },
        };

        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), ArchiveHeader::SIZE);

        let decoded = ArchiveHeader::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut buf = Vec::new();
        ArchiveHeader {
            frame_count: 0,
            interval_ms: 50,
            width: 2,
            height: 2,
            flags: ArchiveFlags::default(),
        }
        .write_to(&mut buf)
        .unwrap();
        buf[0] = b'X';

        let err = ArchiveHeader::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_frame_encoding_is_exact() {
        let frame = Frame::triangle(
            Point::new(0.1, -2.5),
            Point::new(1e-300, f64::MAX),
            Point::new(-0.0, 3.0),
        );
        let encoded = encode_frame(&frame);
        assert_eq!(encoded.len(), FRAME_SIZE);

        let decoded = decode_frame(&encoded).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.segments[2].color, Rgb::BLUE);
    }

    #[test]
    fn test_decode_wrong_size() {
        assert!(decode_frame(&[0u8; FRAME_SIZE - 1]).is_err());
    }
}
