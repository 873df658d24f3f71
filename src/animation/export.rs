//! Export pipeline - renders an animation and streams it to the encoder.

use std::path::Path;

use super::format::CompressionType;
use super::{Animation, ArchiveRecorder, ArchiveStats, ExportError, FfmpegEncoder, FrameRenderer};
use crate::schema::MovieConfig;

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames encoded.
    pub frame_count: u64,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Playback duration.
    pub duration_ms: u64,
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames at {}x{}, {:.2}s",
            self.frame_count,
            self.width,
            self.height,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// Render every frame of `animation` and encode it to `config.output`.
///
/// An empty animation is rejected before anything is written. When
/// `config.archive` is set, the frame geometry is archived first.
pub fn export(animation: &Animation, config: &MovieConfig) -> Result<ExportStats, ExportError> {
    if animation.is_empty() {
        return Err(ExportError::EmptyAnimation);
    }

    let renderer = FrameRenderer::new(animation.frames(), config)?;
    let size = renderer.size();

    if let Some(path) = &config.archive {
        let stats = write_archive(animation, path, size)?;
        log::info!("Archived {} to {}", stats, path.display());
    }

    let mut encoder = FfmpegEncoder::spawn(
        &config.encoder,
        &config.output,
        size,
        animation.interval_ms(),
    )?;

    let mut canvas = renderer.draw_background();
    for frame in animation.frames() {
        renderer.render_into(frame, &mut canvas);
        encoder.write_frame(&canvas)?;
        log::trace!(
            "Encoded frame {}/{}",
            encoder.frames_written(),
            animation.len()
        );
    }
    let frame_count = encoder.finish()?;

    let stats = ExportStats {
        frame_count,
        width: size.0,
        height: size.1,
        duration_ms: animation.duration_ms(),
    };
    log::info!("Wrote {} ({})", config.output.display(), stats);
    Ok(stats)
}

/// Write the exact frame geometry of `animation` to a `.tria` archive.
pub fn write_archive(
    animation: &Animation,
    path: &Path,
    size: (u32, u32),
) -> Result<ArchiveStats, ExportError> {
    let compression = if cfg!(feature = "lz4") {
        CompressionType::Lz4
    } else {
        CompressionType::None
    };
    let archive_error = |source: std::io::Error| ExportError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let mut recorder = ArchiveRecorder::new(path, animation.interval_ms(), size, compression)
        .map_err(archive_error)?;
    for frame in animation.frames() {
        recorder.record_frame(frame).map_err(archive_error)?;
    }
    recorder.finalize().map_err(archive_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ArchivePlayer;
    use crate::compute::Frame;
    use crate::schema::{EncoderConfig, Point};
    use std::process::{Command, Stdio};
    use tempfile::tempdir;

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn animation(n: usize) -> Animation {
        let mut animation = Animation::new(50);
        for i in 0..n {
            let t = i as f64 * 0.1;
            animation.push(Frame::triangle(
                Point::new(0.0, 0.0),
                Point::new(1.0, t),
                Point::new(t, 1.0),
            ));
        }
        animation
    }

    fn config_in(dir: &Path) -> MovieConfig {
        MovieConfig {
            output: dir.join("movie.mp4"),
            // Native ffmpeg encoder, present in every build
            encoder: EncoderConfig {
                codec: "mpeg4".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_animation_rejected() {
        let dir = tempdir().unwrap();
        let config = MovieConfig {
            archive: Some(dir.path().join("movie.tria")),
            ..config_in(dir.path())
        };

        let err = export(&Animation::new(50), &config).unwrap_err();
        assert!(matches!(err, ExportError::EmptyAnimation));
        assert!(!config.output.exists());
        assert!(!dir.path().join("movie.tria").exists());
    }

    #[test]
    fn test_missing_encoder() {
        let dir = tempdir().unwrap();
        let config = MovieConfig {
            encoder: EncoderConfig {
                program: "no-such-encoder-on-this-machine".into(),
                ..Default::default()
            },
            ..config_in(dir.path())
        };

        let err = export(&animation(3), &config).unwrap_err();
        assert!(matches!(err, ExportError::EncoderUnavailable { .. }));
    }

    #[test]
    fn test_write_archive_is_deterministic() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.tria");
        let second = dir.path().join("second.tria");
        let anim = animation(6);

        write_archive(&anim, &first, (500, 500)).unwrap();
        write_archive(&anim, &second, (500, 500)).unwrap();

        let a = ArchivePlayer::open(&first).unwrap().read_all().unwrap();
        let b = ArchivePlayer::open(&second).unwrap().read_all().unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
        assert_eq!(a, anim.frames());
    }

    #[test]
    fn test_archive_into_missing_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("movie.tria");
        let err = write_archive(&animation(1), &path, (500, 500)).unwrap_err();
        assert!(matches!(err, ExportError::Archive { .. }));
    }

    #[test]
    fn test_export_with_ffmpeg() {
        if !ffmpeg_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let stats = export(&animation(10), &config).unwrap();
        assert_eq!(stats.frame_count, 10);
        assert_eq!(stats.duration_ms, 500);
        assert_eq!((stats.width, stats.height), (500, 500));
        assert!(std::fs::metadata(&config.output).unwrap().len() > 0);
    }

    #[test]
    fn test_unwritable_output_with_ffmpeg() {
        if !ffmpeg_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let config = MovieConfig {
            output: dir.path().join("missing").join("movie.mp4"),
            ..config_in(dir.path())
        };

        let err = export(&animation(3), &config).unwrap_err();
        assert!(matches!(err, ExportError::EncoderFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_export_with_noisy_encoder() {
        let dir = tempdir().unwrap();
        let program = crate::animation::encoder::write_stand_in(
            dir.path(),
            "head -c 300000 /dev/zero | tr '\\0' x >&2\ncat > /dev/null",
        );
        let config = MovieConfig {
            encoder: EncoderConfig {
                program: program.to_string_lossy().into_owned(),
                ..Default::default()
            },
            ..config_in(dir.path())
        };

        // A just-written script can be briefly busy in a sibling test's fork
        let mut result = export(&animation(40), &config);
        for _ in 0..50 {
            match &result {
                Err(ExportError::EncoderUnavailable { source, .. })
                    if source.raw_os_error() == Some(26) =>
                {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    result = export(&animation(40), &config);
                }
                _ => break,
            }
        }
        assert_eq!(result.unwrap().frame_count, 40);
    }
}
