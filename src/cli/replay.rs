//! Replay command implementation.

use super::output::print_summary;
use super::{CliError, OutputFormat};
use moroxel::demo;
use moroxel::replay::Recording;
use std::path::Path;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded, names an unknown
/// cartridge, or does not reproduce its recorded final frame.
pub(crate) fn execute(path: &Path, format: OutputFormat) -> Result<(), CliError> {
    let recording = Recording::load(path).map_err(|e| {
        CliError::new(format!("Failed to load {}: {e}", path.display()))
    })?;
    let console = recording.replay(demo::boot_recording)?;
    if recording.checksum.is_some() {
        tracing::info!(frames = recording.frames.len(), "replay matches recorded checksum");
    }
    print_summary(&recording.cartridge, &console, format)
}
