//! Fonts: fixed-cell glyph bitmaps and the font registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::NameTable;
use crate::error::{ConsoleError, ConsoleResult};

/// Stable identifier of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// Name under which the built-in font is registered.
pub const DEFAULT_FONT: &str = "default";

/// One glyph bitmap. Each row is a bitmask with the leftmost pixel in the
/// highest used bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    rows: Vec<u8>,
}

impl Glyph {
    /// Create a glyph from row bitmasks.
    #[must_use]
    pub fn new(rows: &[u8]) -> Self {
        Self {
            rows: rows.to_vec(),
        }
    }

    /// Whether the pixel at `(x, y)` is set, for a glyph `width` pixels wide.
    #[must_use]
    #[inline]
    pub fn is_set(&self, x: u8, y: u8, width: u8) -> bool {
        if x >= width {
            return false;
        }
        self.rows
            .get(usize::from(y))
            .is_some_and(|row| row & (1 << (width - 1 - x)) != 0)
    }
}

/// A fixed-cell bitmap font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    glyph_width: u8,
    glyph_height: u8,
    advance: u8,
    line_height: u8,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    /// Create an empty font with `width`×`height` glyph cells.
    ///
    /// Characters advance by `width + 1` and lines by `height + 1`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `width` is not in `1..=8` or `height` is 0.
    pub fn new(width: u8, height: u8) -> ConsoleResult<Self> {
        if !(1..=8).contains(&width) {
            return Err(ConsoleError::invalid("width", "glyph width must be 1..=8"));
        }
        if height == 0 {
            return Err(ConsoleError::invalid("height", "glyph height must be positive"));
        }
        Ok(Self {
            glyph_width: width,
            glyph_height: height,
            advance: width + 1,
            line_height: height.saturating_add(1),
            glyphs: HashMap::new(),
        })
    }

    /// Add or replace a glyph.
    pub fn insert_glyph(&mut self, ch: char, rows: &[u8]) {
        self.glyphs.insert(ch, Glyph::new(rows));
    }

    /// Builder form of [`Font::insert_glyph`].
    #[must_use]
    pub fn with_glyph(mut self, ch: char, rows: &[u8]) -> Self {
        self.insert_glyph(ch, rows);
        self
    }

    /// Glyph cell width.
    #[must_use]
    pub const fn glyph_width(&self) -> u8 {
        self.glyph_width
    }

    /// Glyph cell height.
    #[must_use]
    pub const fn glyph_height(&self) -> u8 {
        self.glyph_height
    }

    /// Horizontal distance between glyph origins.
    #[must_use]
    pub const fn advance(&self) -> u8 {
        self.advance
    }

    /// Vertical distance between line origins.
    #[must_use]
    pub const fn line_height(&self) -> u8 {
        self.line_height
    }

    /// Glyph for `ch`. Lowercase letters fall back to uppercase; anything
    /// else missing falls back to `?`.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&ch.to_ascii_uppercase()))
            .or_else(|| if ch.is_whitespace() { None } else { self.glyphs.get(&'?') })
    }

    /// Pixel extent of `text`, honoring newlines.
    #[must_use]
    pub fn measure(&self, text: &str) -> (i32, i32) {
        let mut widest = 0usize;
        let mut lines = 0usize;
        for line in text.split('\n') {
            widest = widest.max(line.chars().count());
            lines += 1;
        }
        let width = if widest == 0 {
            0
        } else {
            widest * usize::from(self.advance) - usize::from(self.advance - self.glyph_width)
        };
        let height = lines * usize::from(self.line_height)
            - usize::from(self.line_height - self.glyph_height);
        (
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// The built-in 3×5 font: digits, uppercase letters and common punctuation.
    #[must_use]
    pub fn builtin() -> Self {
        let mut font = Self {
            glyph_width: 3,
            glyph_height: 5,
            advance: 4,
            line_height: 6,
            glyphs: HashMap::new(),
        };
        for (ch, rows) in BUILTIN_GLYPHS {
            font.insert_glyph(*ch, rows);
        }
        font
    }
}

#[rustfmt::skip]
const BUILTIN_GLYPHS: &[(char, [u8; 5])] = &[
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b011, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b011]),
    ('V', [0b101, 0b101, 0b101, 0b010, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b111, 0b001, 0b110]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b111, 0b001, 0b010, 0b000, 0b010]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('(', [0b010, 0b100, 0b100, 0b100, 0b010]),
    (')', [0b010, 0b001, 0b001, 0b001, 0b010]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('<', [0b001, 0b010, 0b100, 0b010, 0b001]),
    ('>', [0b100, 0b010, 0b001, 0b010, 0b100]),
    ('_', [0b000, 0b000, 0b000, 0b000, 0b111]),
    ('*', [0b101, 0b010, 0b101, 0b000, 0b000]),
];

/// Font registry. The built-in font is pre-registered as [`DEFAULT_FONT`]
/// with id 0.
#[derive(Debug, Clone)]
pub struct FontStore {
    names: NameTable,
    fonts: Vec<Option<Font>>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStore {
    /// Create a store holding only the built-in font.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            names: NameTable::default(),
            fonts: Vec::new(),
        };
        store.load(DEFAULT_FONT, Font::builtin());
        store
    }

    /// Resolve `name` to its id, assigning the next sequential id if unseen.
    pub fn resolve(&mut self, name: &str) -> FontId {
        let (id, fresh) = self.names.resolve(name);
        if fresh {
            self.fonts.push(None);
            tracing::debug!(name, id, "font id assigned");
        }
        FontId(id)
    }

    /// Look up a name without assigning.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<FontId> {
        self.names.lookup(name).map(FontId)
    }

    /// Attach a payload to `name`, replacing any previous one.
    pub fn load(&mut self, name: &str, font: Font) -> FontId {
        let id = self.resolve(name);
        self.fonts[id.0 as usize] = Some(font);
        id
    }

    /// Name bound to `id`.
    #[must_use]
    pub fn name(&self, id: FontId) -> Option<&str> {
        self.names.name(id.0)
    }

    /// Payload for `id`, if one was loaded.
    #[must_use]
    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Number of names resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`: the built-in font is registered on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.len() == 0
    }
}
