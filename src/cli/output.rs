//! Output formatting utilities for CLI.

use moroxel::replay::render_ascii;
use moroxel::{Console, P1, P2};
use serde::Serialize;

use super::{CliError, OutputFormat};

/// Column step used for ASCII dumps (64 characters wide).
const ASCII_STEP: usize = 2;

/// JSON-serializable session summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonSummary {
    /// Cartridge name.
    pub(super) cartridge: String,
    /// Frames produced.
    pub(super) frames: u64,
    /// Final framebuffer checksum, hex encoded.
    pub(super) checksum: String,
    /// Per-slot state.
    pub(super) players: Vec<JsonPlayer>,
}

/// JSON-serializable slot state.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayer {
    /// Slot id (1 or 2).
    pub(super) id: u8,
    /// Display label.
    pub(super) label: String,
    /// Whether the slot is agent-driven.
    pub(super) agent: bool,
}

impl JsonSummary {
    /// Create from a finished console.
    pub(super) fn from_console(cartridge: &str, console: &Console) -> Self {
        Self {
            cartridge: cartridge.to_owned(),
            frames: console.frames(),
            checksum: format!("{:#018x}", console.checksum()),
            players: [P1, P2]
                .into_iter()
                .map(|id| JsonPlayer {
                    id,
                    label: console.vm().plabel(id).to_owned(),
                    agent: console.pbound(id),
                })
                .collect(),
        }
    }
}

/// Format a session summary as human-readable text.
pub(super) fn format_text(summary: &JsonSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Cartridge: {}\n", summary.cartridge));
    output.push_str(&format!("  Frames:   {}\n", summary.frames));
    output.push_str(&format!("  Checksum: {}\n", summary.checksum));
    for player in &summary.players {
        let driver = if player.agent { "agent" } else { "human" };
        output.push_str(&format!("  P{}: {} ({driver})\n", player.id, player.label));
    }

    output
}

/// Print the summary of `console` in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(super) fn print_summary(
    cartridge: &str,
    console: &Console,
    format: OutputFormat,
) -> Result<(), CliError> {
    let summary = JsonSummary::from_console(cartridge, console);
    match format {
        OutputFormat::Text => print!("{}", format_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Ascii => {
            print!("{}", format_text(&summary));
            print!(
                "{}",
                render_ascii(console.framebuffer(), console.frames(), ASCII_STEP)
            );
        }
    }
    Ok(())
}
