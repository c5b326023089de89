//! Run command implementation.

use super::output::print_summary;
use super::{CliError, OutputFormat};
use moroxel::demo::{self, CARTRIDGE};
use moroxel::replay::Recorder;
use moroxel::{ConsoleConfig, DrawMode, InputSnapshot};
use std::path::Path;

/// Fixed delta time of headless runs.
const FRAME_DT: f64 = 1.0 / 60.0;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the console fails to boot or the recording cannot be saved.
pub(crate) fn execute(
    frames: u64,
    agents: &[u8],
    engine: bool,
    format: OutputFormat,
    save: Option<&Path>,
) -> Result<(), CliError> {
    let config = ConsoleConfig {
        draw_mode: if engine { DrawMode::Engine } else { DrawMode::Manual },
        ..ConsoleConfig::default()
    };
    let console = demo::console(config, agents)?;
    tracing::info!(frames, ?agents, "running {CARTRIDGE}");

    let mut recorder = Recorder::new(console, CARTRIDGE, agents.to_vec());
    let mut dropped = 0;
    for _ in 0..frames {
        dropped += recorder.frame(FRAME_DT, &InputSnapshot::default()).dropped_sprites;
    }
    if dropped > 0 {
        tracing::warn!(dropped, "sprites dropped by the draw queue limit");
    }
    let (console, recording) = recorder.finish();

    if let Some(save_path) = save {
        recording.save(save_path).map_err(|e| {
            CliError::new(format!("Failed to save recording: {e}"))
        })?;
        tracing::info!(path = %save_path.display(), "recording saved");
    }

    print_summary(CARTRIDGE, &console, format)
}
