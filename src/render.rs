//! Render context: framebuffer, camera, draw color and the object stagers.
//!
//! Draw calls either composite immediately ([`DrawMode::Manual`]) or queue the
//! staged object until the frame is finalized ([`DrawMode::Engine`]). In
//! engine mode the finalizer composites the tilemap layer first, then shown
//! sprite table entries by ascending id, then queued sprites in submission
//! order, then queued text. In manual mode it only composites the shown sprite
//! table entries, on top of whatever the game drew.

mod framebuffer;
mod sprite;
mod table;
mod text;

pub use framebuffer::{
    Color, Framebuffer, PALETTE, PALETTE_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, check_color,
};
pub use sprite::{SpriteStager, TileRegion};
pub use table::{SpriteId, SpriteSlot, SpriteTable};
pub use text::{Align, DEFAULT_TEXT_COLOR, TextStager};

use serde::{Deserialize, Serialize};

use crate::store::{FontId, FontStore, TilemapStore};

/// Size of the sprite table, and the maximum number of sprites queued per
/// frame in engine mode.
pub const SNUM: usize = 256;

/// When draw calls reach the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    /// Every draw composites immediately, in call order.
    #[default]
    Manual,
    /// Sprites and text are queued and composited at frame end.
    Engine,
}

#[derive(Debug, Clone)]
struct QueuedSprite {
    sprite: SpriteStager,
    at: (i32, i32),
}

#[derive(Debug, Clone)]
struct QueuedText {
    font: FontId,
    text: String,
    at: (i32, i32),
    align: (Align, Align),
    color: Color,
}

/// Result of finalizing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinalizeStats {
    /// Sprites composited from the queue.
    pub sprites: usize,
    /// Sprite table entries composited.
    pub table_sprites: usize,
    /// Text blocks composited from the queue.
    pub texts: usize,
    /// Sprites dropped because the queue was full.
    pub dropped: usize,
}

/// All mutable render state of one console instance.
#[derive(Debug, Clone)]
pub struct RenderContext {
    fb: Framebuffer,
    camera: (i32, i32),
    color: Color,
    background: Color,
    mode: DrawMode,
    sprite: SpriteStager,
    text: TextStager,
    sprite_queue: Vec<QueuedSprite>,
    text_queue: Vec<QueuedText>,
    dropped: usize,
    table: SpriteTable,
}

impl RenderContext {
    /// Create a context cleared to `background`.
    #[must_use]
    pub fn new(mode: DrawMode, background: Color) -> Self {
        Self {
            fb: Framebuffer::new(background),
            camera: (0, 0),
            color: DEFAULT_TEXT_COLOR,
            background,
            mode,
            sprite: SpriteStager::default(),
            text: TextStager::default(),
            sprite_queue: Vec::new(),
            text_queue: Vec::new(),
            dropped: 0,
            table: SpriteTable::default(),
        }
    }

    /// The framebuffer.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Active draw mode.
    #[must_use]
    pub const fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Camera offset.
    #[must_use]
    pub const fn camera(&self) -> (i32, i32) {
        self.camera
    }

    /// Current draw color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Background color used by argument-less clears.
    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// The staged sprite.
    #[must_use]
    pub const fn sprite(&self) -> &SpriteStager {
        &self.sprite
    }

    /// The staged text attributes.
    #[must_use]
    pub const fn text(&self) -> &TextStager {
        &self.text
    }

    /// The sprite table.
    #[must_use]
    pub const fn table(&self) -> &SpriteTable {
        &self.table
    }

    /// Number of sprites waiting for the finalizer.
    #[must_use]
    pub fn queued_sprites(&self) -> usize {
        self.sprite_queue.len()
    }

    pub(crate) fn set_camera(&mut self, x: i32, y: i32) {
        self.camera = (x, y);
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(crate) fn sprite_mut(&mut self) -> &mut SpriteStager {
        &mut self.sprite
    }

    pub(crate) fn text_mut(&mut self) -> &mut TextStager {
        &mut self.text
    }

    pub(crate) fn table_mut(&mut self) -> &mut SpriteTable {
        &mut self.table
    }

    pub(crate) fn clear(&mut self, color: Color) {
        self.fb.fill(color);
    }

    pub(crate) fn pset(&mut self, x: i32, y: i32, color: Color) {
        self.fb.set(x, y, color);
    }

    pub(crate) fn pget(&self, x: i32, y: i32) -> Color {
        self.fb.get(x, y).unwrap_or(0)
    }

    /// Draw or queue the staged sprite, then reset the stager.
    pub(crate) fn sdraw(&mut self, tiles: &TilemapStore, x: i32, y: i32) {
        let sprite = std::mem::take(&mut self.sprite);
        let at = (
            x.saturating_add(self.camera.0),
            y.saturating_add(self.camera.1),
        );
        match self.mode {
            DrawMode::Manual => Self::composite(&mut self.fb, tiles, &sprite, at),
            DrawMode::Engine => {
                if self.sprite_queue.len() >= SNUM {
                    self.dropped += 1;
                    tracing::warn!(limit = SNUM, "sprite queue full, sprite dropped");
                } else {
                    self.sprite_queue.push(QueuedSprite { sprite, at });
                }
            }
        }
    }

    fn composite(
        fb: &mut Framebuffer,
        tiles: &TilemapStore,
        sprite: &SpriteStager,
        (x, y): (i32, i32),
    ) {
        let Some(map) = sprite.tile().and_then(|id| tiles.get(id)) else {
            tracing::trace!(tile = ?sprite.tile(), "sprite without tile source skipped");
            return;
        };
        sprite::composite_sprite(fb, map, tiles.mode(), sprite, x, y);
    }

    /// Fill a tile-coordinate box with the staged region. Ignores the camera.
    pub(crate) fn sbox(&mut self, tiles: &TilemapStore, x: i32, y: i32, w: i32, h: i32) {
        let source = self.sprite.tile().or_else(|| tiles.selected());
        let Some(map) = source.and_then(|id| tiles.get(id)) else {
            tracing::trace!(tile = ?source, "box without tile source skipped");
            return;
        };
        let ts = tiles.mode().pixels();
        let rect = (
            x.saturating_mul(ts),
            y.saturating_mul(ts),
            w.saturating_mul(ts),
            h.saturating_mul(ts),
        );
        sprite::composite_box(&mut self.fb, map, tiles.mode(), self.sprite.region(), rect);
    }

    /// Composite the selected tilemap's grid at `-scroll + camera`.
    pub(crate) fn mdraw(&mut self, tiles: &TilemapStore) {
        let Some(map) = tiles.selected_map() else {
            return;
        };
        let mode = tiles.mode();
        let ts = mode.pixels();
        let (sx, sy) = tiles.scroll();
        let (ox, oy) = (
            self.camera.0.saturating_sub(sx),
            self.camera.1.saturating_sub(sy),
        );
        for row in 0..i32::from(map.rows()) {
            for col in 0..i32::from(map.cols()) {
                if let Some(tile) = map.cell(col, row) {
                    let at = (ox.saturating_add(col * ts), oy.saturating_add(row * ts));
                    sprite::composite_tile(&mut self.fb, map, mode, tile, at.0, at.1);
                }
            }
        }
    }

    /// Draw or queue `text` with the staged attributes, then reset the stager.
    pub(crate) fn fdraw(&mut self, fonts: &FontStore, font: FontId, text: &str, x: i32, y: i32) {
        let staged = std::mem::take(&mut self.text);
        match self.mode {
            DrawMode::Manual => {
                Self::draw_text(&mut self.fb, fonts, font, text, (x, y), staged.align(), staged.color());
            }
            DrawMode::Engine => self.text_queue.push(QueuedText {
                font,
                text: text.to_owned(),
                at: (x, y),
                align: staged.align(),
                color: staged.color(),
            }),
        }
    }

    fn draw_text(
        fb: &mut Framebuffer,
        fonts: &FontStore,
        font: FontId,
        text: &str,
        at: (i32, i32),
        align: (Align, Align),
        color: Color,
    ) {
        let Some(payload) = fonts.get(font) else {
            tracing::trace!(font = font.0, "text with unknown font skipped");
            return;
        };
        text::draw_text(fb, payload, text, at, align, color);
    }

    /// Composite shown sprite table entries from the selected tilemap.
    fn draw_table(&mut self, tiles: &TilemapStore) -> usize {
        let (Some(source), Some(map)) = (tiles.selected(), tiles.selected_map()) else {
            return 0;
        };
        let staged = self.table.staged(source, map, tiles.mode());
        for (sprite, (x, y)) in &staged {
            let at = (
                x.saturating_add(self.camera.0),
                y.saturating_add(self.camera.1),
            );
            Self::composite(&mut self.fb, tiles, sprite, at);
        }
        staged.len()
    }

    /// Composite the sprite table and flush the engine-mode queues.
    pub(crate) fn finalize(&mut self, tiles: &TilemapStore, fonts: &FontStore) -> FinalizeStats {
        let dropped = std::mem::take(&mut self.dropped);
        if self.mode == DrawMode::Manual {
            return FinalizeStats {
                table_sprites: self.draw_table(tiles),
                dropped,
                ..FinalizeStats::default()
            };
        }
        self.mdraw(tiles);
        let table_sprites = self.draw_table(tiles);
        let sprites = std::mem::take(&mut self.sprite_queue);
        for queued in &sprites {
            Self::composite(&mut self.fb, tiles, &queued.sprite, queued.at);
        }
        let texts = std::mem::take(&mut self.text_queue);
        for queued in &texts {
            Self::draw_text(
                &mut self.fb,
                fonts,
                queued.font,
                &queued.text,
                queued.at,
                queued.align,
                queued.color,
            );
        }
        FinalizeStats {
            sprites: sprites.len(),
            table_sprites,
            texts: texts.len(),
            dropped,
        }
    }
}
