//! Video encoder backed by an external `ffmpeg` process.
//!
//! Frames are streamed to the encoder's stdin as raw `rgb24`. The child
//! process is owned by [`FfmpegEncoder`]; dropping the encoder without calling
//! [`FfmpegEncoder::finish`] kills and reaps it.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use super::ExportError;
use crate::compute::{Canvas, Rgb};
use crate::schema::EncoderConfig;

/// A running encoder accepting frames of a fixed size.
pub struct FfmpegEncoder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    /// Collects the encoder's stderr so a chatty encoder never blocks on a full pipe.
    stderr: Option<JoinHandle<Vec<u8>>>,
    size: (u32, u32),
    pixels: Vec<Rgb>,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Build the encoder command line for `size` pixel frames shown every `interval_ms`.
    pub fn command(
        config: &EncoderConfig,
        output: &Path,
        (width, height): (u32, u32),
        interval_ms: u32,
    ) -> Command {
        let mut cmd = Command::new(&config.program);
        cmd.args(["-y", "-loglevel", "error", "-nostats"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(format!("1000/{interval_ms}"))
            .args(["-i", "-"])
            .arg("-vcodec")
            .arg(&config.codec)
            .arg("-pix_fmt")
            .arg(&config.pixel_format)
            .args(&config.extra_args)
            .arg(output);
        cmd
    }

    /// Start the encoder writing to `output`.
    pub fn spawn(
        config: &EncoderConfig,
        output: &Path,
        size: (u32, u32),
        interval_ms: u32,
    ) -> Result<Self, ExportError> {
        let mut child = Self::command(config, output, size, interval_ms)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExportError::EncoderUnavailable {
                program: config.program.clone(),
                source,
            })?;

        log::debug!(
            "Started {} ({}x{}, {} ms/frame) -> {}",
            config.program,
            size.0,
            size.1,
            interval_ms,
            output.display()
        );

        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut buf) {
                    log::debug!("Encoder stderr closed early: {e}");
                }
                buf
            })
        });

        Ok(Self {
            child: Some(child),
            stdin,
            stderr,
            size,
            pixels: Vec::with_capacity(size.0 as usize * size.1 as usize),
            frames_written: 0,
        })
    }

    /// Send one frame.
    pub fn write_frame(&mut self, canvas: &Canvas) -> Result<(), ExportError> {
        if (canvas.width(), canvas.height()) != self.size {
            return Err(ExportError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Frame is {}x{}, encoder expects {}x{}",
                    canvas.width(),
                    canvas.height(),
                    self.size.0,
                    self.size.1
                ),
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExportError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
        };

        canvas.write_rgb(&mut self.pixels);
        match stdin.write_all(bytemuck::cast_slice(&self.pixels)) {
            Ok(()) => {
                self.frames_written += 1;
                Ok(())
            }
            // The encoder quit early; its exit status and stderr say why
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Err(self.collect_failure(e)),
            Err(e) => Err(ExportError::Io(e)),
        }
    }

    /// Number of frames sent so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Close the input stream and wait for the encoder to finish writing.
    ///
    /// Returns the number of frames sent.
    pub fn finish(mut self) -> Result<u64, ExportError> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(self.frames_written);
        };

        let status = child.wait()?;
        let stderr = self.take_stderr();
        if !status.success() {
            return Err(Self::failure(status, stderr));
        }
        if !stderr.is_empty() {
            log::debug!("Encoder output: {stderr}");
        }
        Ok(self.frames_written)
    }

    fn collect_failure(&mut self, write_error: io::Error) -> ExportError {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return ExportError::Io(write_error);
        };
        match child.wait() {
            Ok(status) => Self::failure(status, self.take_stderr()),
            Err(e) => ExportError::Io(e),
        }
    }

    /// Join the stderr reader. Only call once the child has exited.
    fn take_stderr(&mut self) -> String {
        let Some(reader) = self.stderr.take() else {
            return String::new();
        };
        match reader.join() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Err(_) => {
                log::warn!("Encoder stderr reader panicked");
                String::new()
            }
        }
    }

    fn failure(status: ExitStatus, stderr: String) -> ExportError {
        ExportError::EncoderFailed { status, stderr }
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::debug!("Encoder already exited: {e}");
            }
            if let Err(e) = child.wait() {
                log::warn!("Failed to reap encoder process: {e}");
            }
            self.take_stderr();
        }
    }
}

/// Write an executable shell script that stands in for the encoder.
#[cfg(all(test, unix))]
pub(super) fn write_stand_in(dir: &Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("encoder.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Spawn, retrying while a freshly written script is still busy in a forked sibling.
#[cfg(all(test, unix))]
pub(super) fn spawn_stand_in(
    config: &EncoderConfig,
    output: &Path,
    size: (u32, u32),
) -> FfmpegEncoder {
    const ETXTBSY: i32 = 26;
    for _ in 0..50 {
        match FfmpegEncoder::spawn(config, output, size, 50) {
            Ok(encoder) => return encoder,
            Err(ExportError::EncoderUnavailable { source, .. })
                if source.raw_os_error() == Some(ETXTBSY) =>
            {
                thread::sleep(std::time::Duration::from_millis(20));
            }
            Err(e) => panic!("stand-in encoder failed to start: {e}"),
        }
    }
    panic!("stand-in encoder stayed busy");
}
