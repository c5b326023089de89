//! Session recording and replay.
//!
//! Consoles are deterministic, so a recording only needs the cartridge name,
//! the boot configuration and the per-frame `(delta_time, input)` pairs.
//! Replaying re-runs the whole session from boot; the stored framebuffer
//! checksum confirms the re-run reached the same final frame.

mod render;

pub use render::render_ascii;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::broker::{InputSnapshot, PlayerId};
use crate::console::{Console, ConsoleConfig, FrameReport};
use crate::error::ConsoleError;

/// Errors produced while saving, loading or re-running a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing the recording file failed.
    #[error("recording I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The recording is not valid JSON for this format.
    #[error("malformed recording: {0}")]
    Json(#[from] serde_json::Error),
    /// Booting the console for the re-run failed.
    #[error("console boot failed: {0}")]
    Console(#[from] ConsoleError),
    /// No cartridge with the recorded name is available.
    #[error("unknown cartridge `{0}`")]
    UnknownCartridge(String),
    /// The re-run ended on a different frame than the recorded one.
    #[error("checksum mismatch: recorded {expected:#018x}, replayed {actual:#018x}")]
    ChecksumMismatch {
        /// Checksum stored in the recording.
        expected: u64,
        /// Checksum of the re-run.
        actual: u64,
    },
}

/// Inputs of one recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Delta time passed to every unit.
    pub dt: f64,
    /// External button snapshot.
    pub input: InputSnapshot,
}

/// Everything needed to re-run a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Name of the cartridge that was booted.
    pub cartridge: String,
    /// Console configuration at boot.
    pub config: ConsoleConfig,
    /// Slots that were bound to the cartridge's agent.
    pub agents: Vec<PlayerId>,
    /// Per-frame inputs, in order.
    pub frames: Vec<RecordedFrame>,
    /// Framebuffer checksum after the last frame, if the session finished.
    #[serde(default)]
    pub checksum: Option<u64>,
}

impl Recording {
    /// Start an empty recording.
    #[must_use]
    pub fn new(cartridge: &str, config: ConsoleConfig, agents: Vec<PlayerId>) -> Self {
        Self {
            cartridge: cartridge.to_owned(),
            config,
            agents,
            frames: Vec::new(),
            checksum: None,
        }
    }

    /// Save as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        self.write_to(File::create(path)?)?;
        tracing::debug!(path = %path.display(), frames = self.frames.len(), "recording saved");
        Ok(())
    }

    /// Write pretty-printed JSON to `sink` and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if serializing, writing or flushing fails.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<(), ReplayError> {
        let mut writer = BufWriter::new(sink);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a recording saved by [`Recording::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        let recording: Self = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), frames = recording.frames.len(), "recording loaded");
        Ok(recording)
    }

    /// Boot a console with `boot` and feed it every recorded frame.
    ///
    /// # Errors
    ///
    /// Returns whatever `boot` fails with, or `ChecksumMismatch` if the
    /// recording carries a checksum the re-run does not reproduce.
    pub fn replay<F>(&self, boot: F) -> Result<Console, ReplayError>
    where
        F: FnOnce(&Self) -> Result<Console, ReplayError>,
    {
        let mut console = boot(self)?;
        for frame in &self.frames {
            console.frame(frame.dt, &frame.input);
        }
        let actual = console.checksum();
        match self.checksum {
            Some(expected) if expected != actual => {
                Err(ReplayError::ChecksumMismatch { expected, actual })
            }
            _ => Ok(console),
        }
    }
}

/// A console that records every frame it is fed.
#[derive(Debug)]
pub struct Recorder {
    console: Console,
    recording: Recording,
}

impl Recorder {
    /// Wrap a freshly booted console.
    #[must_use]
    pub fn new(console: Console, cartridge: &str, agents: Vec<PlayerId>) -> Self {
        let recording = Recording::new(cartridge, console.config().clone(), agents);
        Self { console, recording }
    }

    /// Produce and record one frame.
    pub fn frame(&mut self, dt: f64, input: &InputSnapshot) -> FrameReport {
        self.recording.frames.push(RecordedFrame { dt, input: *input });
        self.console.frame(dt, input)
    }

    /// The recorded console.
    #[must_use]
    pub const fn console(&self) -> &Console {
        &self.console
    }

    /// Stop recording, stamping the final checksum.
    #[must_use]
    pub fn finish(self) -> (Console, Recording) {
        let mut recording = self.recording;
        recording.checksum = Some(self.console.checksum());
        (self.console, recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_json_shape() {
        let mut recording = Recording::new("tag", ConsoleConfig::default(), vec![2]);
        recording.frames.push(RecordedFrame {
            dt: 0.5,
            input: InputSnapshot::default(),
        });
        let json = serde_json::to_string(&recording).unwrap();
        let back: Recording = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recording);
        assert!(json.contains("\"cartridge\":\"tag\""));
    }

    /// Sink that accepts nothing.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        // Small enough to sit in the buffer until the flush
        let recording = Recording::new("tag", ConsoleConfig::default(), vec![2]);
        let err = recording.write_to(FullDisk).unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_to_full_device_fails() {
        let recording = Recording::new("tag", ConsoleConfig::default(), vec![2]);
        assert!(recording.save(Path::new("/dev/full")).is_err());
    }

    #[test]
    fn test_checksum_defaults_to_none() {
        let json = r#"{"cartridge":"tag","config":{},"agents":[],"frames":[]}"#;
        let recording: Recording = serde_json::from_str(json).unwrap();
        assert_eq!(recording.checksum, None);
        assert_eq!(recording.config, ConsoleConfig::default());
    }

    #[test]
    fn test_error_display() {
        let err = ReplayError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: recorded 0x0000000000000001, replayed 0x0000000000000002"
        );
    }
}
