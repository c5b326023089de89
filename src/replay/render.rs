//! ASCII framebuffer dump for terminal and log viewing.

use crate::render::{Color, Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};

/// One character per palette index, roughly ordered dark to light.
const SHADES: [char; 16] = [
    ' ', '.', ':', '-', '=', '+', '*', '#', '%', '@', 'o', 'x', 'O', 'X', '&', '$',
];

/// Render the framebuffer as text, sampling every `step`-th pixel.
///
/// Output format (step 2 gives a 64×64 character grid):
/// ```text
/// frame 120  checksum 0x1f3a...
/// +----------------------------------------------------------------+
/// |......##........                                                |
/// +----------------------------------------------------------------+
/// ```
#[must_use]
pub fn render_ascii(fb: &Framebuffer, frame: u64, step: usize) -> String {
    let step = step.max(1);
    let width = SCREEN_WIDTH.unsigned_abs() as usize;
    let height = SCREEN_HEIGHT.unsigned_abs() as usize;
    let columns = width.div_ceil(step);
    let border = format!("+{}+\n", "-".repeat(columns));

    let mut output = format!("frame {frame}  checksum {:#018x}\n", fb.checksum());
    output.push_str(&border);
    for row in fb.pixels().chunks(width).step_by(step).take(height) {
        output.push('|');
        output.extend(row.iter().step_by(step).map(|&c| shade(c)));
        output.push_str("|\n");
    }
    output.push_str(&border);
    output
}

fn shade(color: Color) -> char {
    SHADES.get(usize::from(color)).copied().unwrap_or('?')
}
