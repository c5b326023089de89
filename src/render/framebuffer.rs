//! The 128×128 indexed-color framebuffer.

use crate::error::{ConsoleError, ConsoleResult};

/// Screen width in pixels.
pub const SCREEN_WIDTH: i32 = 128;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: i32 = 128;

const PIXEL_COUNT: usize = 128 * 128;

/// A palette index.
pub type Color = u8;

/// Number of palette entries; valid colors are `0..PALETTE_SIZE`.
pub const PALETTE_SIZE: u8 = 16;

/// Reference RGB values for the palette, used by presentation layers.
pub const PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (29, 43, 83),
    (126, 37, 83),
    (0, 135, 81),
    (171, 82, 54),
    (95, 87, 79),
    (194, 195, 199),
    (255, 241, 232),
    (255, 0, 77),
    (255, 163, 0),
    (255, 236, 39),
    (0, 228, 54),
    (41, 173, 255),
    (131, 118, 156),
    (255, 119, 168),
    (255, 204, 170),
];

/// Validate a palette index.
///
/// # Errors
///
/// Returns `InvalidArgument` if `color >= PALETTE_SIZE`.
pub fn check_color(color: Color) -> ConsoleResult<Color> {
    if color < PALETTE_SIZE {
        Ok(color)
    } else {
        Err(ConsoleError::invalid(
            "color",
            format!("palette index {color} is not below {PALETTE_SIZE}"),
        ))
    }
}

/// Fixed-size pixel grid. Every write is clipped to the screen.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<Color>,
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("checksum", &format_args!("{:#018x}", self.checksum()))
            .finish_non_exhaustive()
    }
}

impl Framebuffer {
    /// Create a framebuffer filled with `color`.
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            pixels: vec![color; PIXEL_COUNT],
        }
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(x: i32, y: i32) -> Option<usize> {
        if (0..SCREEN_WIDTH).contains(&x) && (0..SCREEN_HEIGHT).contains(&y) {
            Some(y as usize * 128 + x as usize)
        } else {
            None
        }
    }

    /// Pixel at `(x, y)`, or `None` off-screen.
    #[must_use]
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        Self::index(x, y).map(|i| self.pixels[i])
    }

    /// Write a pixel. Returns `false` if the pixel was clipped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match Self::index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Fill the whole screen.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Fill the on-screen part of a rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x0 = x.clamp(0, SCREEN_WIDTH);
        let y0 = y.clamp(0, SCREEN_HEIGHT);
        let x1 = x.saturating_add(w).clamp(0, SCREEN_WIDTH);
        let y1 = y.saturating_add(h).clamp(0, SCREEN_HEIGHT);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, color);
            }
        }
    }

    /// Row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// FNV-1a hash of the pixel data, used to compare frames.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0100_0000_01b3;
        self.pixels.iter().fold(OFFSET, |hash, &p| {
            (hash ^ u64::from(p)).wrapping_mul(PRIME)
        })
    }
}
