//! The game-facing console API.

use std::fmt::Display;

use crate::broker::{Broker, ButtonId, P1, PlayerId, StateMessage};
use crate::error::ConsoleResult;
use crate::render::{
    Align, Color, Framebuffer, RenderContext, SpriteId, SpriteSlot, TileRegion, check_color,
};
use crate::store::{FontId, FontStore, TileMode, TilemapId, TilemapStore};

/// Everything the game unit can reach during boot and tick.
///
/// Drawing operations never fail on unresolved tilemap or font ids; they
/// simply draw nothing. Argument validation failures leave all state
/// untouched.
#[derive(Debug, Clone)]
pub struct Vm {
    pub(crate) render: RenderContext,
    pub(crate) tiles: TilemapStore,
    pub(crate) fonts: FontStore,
    pub(crate) broker: Broker,
    pub(crate) frame: u64,
}

impl Vm {
    pub(crate) fn new(render: RenderContext, tiles: TilemapStore, fonts: FontStore, broker: Broker) -> Self {
        Self {
            render,
            tiles,
            fonts,
            broker,
            frame: 0,
        }
    }

    /// Index of the frame being produced, starting at 0.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// The framebuffer as composited so far.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        self.render.framebuffer()
    }

    /// Render state.
    #[must_use]
    pub const fn render(&self) -> &RenderContext {
        &self.render
    }

    /// Tilemap store.
    #[must_use]
    pub const fn tiles(&self) -> &TilemapStore {
        &self.tiles
    }

    /// Font store.
    #[must_use]
    pub const fn fonts(&self) -> &FontStore {
        &self.fonts
    }

    /// Player broker.
    #[must_use]
    pub const fn broker(&self) -> &Broker {
        &self.broker
    }

    // --- screen ---

    /// Fill the screen with `color`, or the background color.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a color outside the palette.
    pub fn clear(&mut self, color: Option<Color>) -> ConsoleResult<()> {
        let color = match color {
            Some(c) => check_color(c)?,
            None => self.render.background(),
        };
        self.render.clear(color);
        Ok(())
    }

    /// Fill the screen with the background color.
    pub fn cls(&mut self) {
        let background = self.render.background();
        self.render.clear(background);
    }

    /// Set the camera offset applied to sprites and the tilemap layer.
    pub fn camera(&mut self, x: i32, y: i32) {
        self.render.set_camera(x, y);
    }

    /// Current camera offset.
    #[must_use]
    pub const fn camera_offset(&self) -> (i32, i32) {
        self.render.camera()
    }

    /// Current draw color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.render.color()
    }

    /// Set the draw color.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a color outside the palette.
    pub fn set_color(&mut self, color: Color) -> ConsoleResult<()> {
        self.render.set_color(check_color(color)?);
        Ok(())
    }

    /// Pixel at `(x, y)`; 0 off-screen.
    #[must_use]
    pub fn pget(&self, x: i32, y: i32) -> Color {
        self.render.pget(x, y)
    }

    /// Write one pixel with `color` or the draw color. Off-screen is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a color outside the palette.
    pub fn pset(&mut self, x: i32, y: i32, color: Option<Color>) -> ConsoleResult<()> {
        let color = match color {
            Some(c) => check_color(c)?,
            None => self.render.color(),
        };
        self.render.pset(x, y, color);
        Ok(())
    }

    /// Write a line to the host log.
    pub fn print(&self, message: impl Display) {
        tracing::info!(frame = self.frame, unit = "game", "{message}");
    }

    // --- tilemaps ---

    /// Id of the tilemap named `name`, assigning one if unseen.
    pub fn tmap(&mut self, name: &str) -> TilemapId {
        self.tiles.resolve(name)
    }

    /// Select the tilemap drawn by the tilemap layer and edited by `m*` calls.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` if `id` was never assigned.
    pub fn select_tmap(&mut self, id: TilemapId) -> ConsoleResult<()> {
        self.tiles.select(id)
    }

    /// Selected tilemap.
    #[must_use]
    pub const fn selected_tmap(&self) -> Option<TilemapId> {
        self.tiles.selected()
    }

    /// Set the tile-mode to `size` pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` unless `size` is 8, 16, 32 or 64.
    pub fn tmode(&mut self, size: u32) -> ConsoleResult<()> {
        self.tiles.set_mode(TileMode::from_size(size)?);
        Ok(())
    }

    /// Active tile-mode.
    #[must_use]
    pub const fn tile_mode(&self) -> TileMode {
        self.tiles.mode()
    }

    /// Empty every cell of the selected tilemap.
    pub fn mclear(&mut self) {
        if let Some(map) = self.tiles.selected_map_mut() {
            map.clear_cells();
        }
    }

    /// Set one cell of the selected tilemap. Out-of-grid is a no-op.
    pub fn mtile(&mut self, x: i32, y: i32, tile: Option<u16>) {
        if let Some(map) = self.tiles.selected_map_mut() {
            map.set_cell(x, y, tile);
        }
    }

    /// Read one cell of the selected tilemap.
    #[must_use]
    pub fn mget(&self, x: i32, y: i32) -> Option<u16> {
        self.tiles.selected_map().and_then(|map| map.cell(x, y))
    }

    /// Set the tilemap layer scroll offset in pixels.
    pub fn mscroll(&mut self, x: i32, y: i32) {
        self.tiles.set_scroll(x, y);
    }

    /// Draw the tilemap layer now.
    pub fn mdraw(&mut self) {
        self.render.mdraw(&self.tiles);
    }

    // --- sprites ---

    /// Stage the tile source of the next sprite.
    pub fn stile(&mut self, id: TilemapId) {
        self.render.sprite_mut().set_tile(id);
    }

    /// Stage the tile region of the next sprite, in tiles.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `w` or `h` is not positive.
    pub fn sregion(&mut self, i: i32, j: i32, w: i32, h: i32) -> ConsoleResult<()> {
        self.render
            .sprite_mut()
            .set_region(TileRegion { i, j, w, h })
    }

    /// Stage the origin of the next sprite, in sprite pixels.
    pub fn sorigin(&mut self, x: i32, y: i32) {
        self.render.sprite_mut().set_origin(x, y);
    }

    /// Stage horizontal and vertical flip of the next sprite.
    pub fn sflip(&mut self, h: bool, v: bool) {
        self.render.sprite_mut().set_flip(h, v);
    }

    /// Stage the scale of the next sprite.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero or non-finite factor.
    pub fn sscale(&mut self, x: f64, y: f64) -> ConsoleResult<()> {
        self.render.sprite_mut().set_scale(x, y)
    }

    /// Stage the rotation of the next sprite, in degrees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a non-finite angle.
    pub fn srot(&mut self, degrees: f64) -> ConsoleResult<()> {
        self.render.sprite_mut().set_rotation(degrees)
    }

    /// Discard the staged sprite.
    pub fn sclear(&mut self) {
        *self.render.sprite_mut() = crate::render::SpriteStager::default();
    }

    /// Draw the staged sprite with its origin at `(x, y)` plus the camera.
    pub fn sdraw(&mut self, x: i32, y: i32) {
        self.render.sdraw(&self.tiles, x, y);
    }

    /// Fill the tile-coordinate box `(x, y, w, h)` with the staged region.
    pub fn sbox(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.render.sbox(&self.tiles, x, y, w, h);
    }

    // --- sprite table ---

    /// Show or hide table sprite `id`. Unknown ids are ignored.
    pub fn sshow(&mut self, id: SpriteId, visible: bool) {
        self.render.table_mut().set_visible(id, visible);
    }

    /// Move table sprite `id` to `(x, y)`, before the camera.
    pub fn spos(&mut self, id: SpriteId, x: i32, y: i32) {
        self.render.table_mut().set_position(id, x, y);
    }

    /// Set which tile of the selected tilemap sprite `id` shows.
    pub fn stile_of(&mut self, id: SpriteId, tile: Option<u16>) {
        self.render.table_mut().set_tile(id, tile);
    }

    /// Set the flip of table sprite `id`.
    pub fn sflip_of(&mut self, id: SpriteId, h: bool, v: bool) {
        self.render.table_mut().set_flip(id, h, v);
    }

    /// Set the scale of table sprite `id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero or non-finite factor, whether or
    /// not `id` exists.
    pub fn sscale_of(&mut self, id: SpriteId, x: f64, y: f64) -> ConsoleResult<()> {
        self.render.table_mut().set_scale(id, x, y)
    }

    /// Set the rotation of table sprite `id`, in degrees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a non-finite angle.
    pub fn srot_of(&mut self, id: SpriteId, degrees: f64) -> ConsoleResult<()> {
        self.render.table_mut().set_rotation(id, degrees)
    }

    /// Table sprite `id`; the default entry for unknown ids.
    #[must_use]
    pub fn sprite(&self, id: SpriteId) -> SpriteSlot {
        self.render.table().slot_or_default(id)
    }

    // --- text ---

    /// Id of the font named `name`, assigning one if unseen.
    pub fn fnt(&mut self, name: &str) -> FontId {
        self.fonts.resolve(name)
    }

    /// Stage the font used when `fdraw` is given none.
    pub fn ffont(&mut self, id: FontId) {
        self.render.text_mut().set_font(id);
    }

    /// Stage the alignment of the next text.
    pub fn falign(&mut self, x: Align, y: Align) {
        self.render.text_mut().set_align(x, y);
    }

    /// Stage the color of the next text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a color outside the palette.
    pub fn fcolor(&mut self, color: Color) -> ConsoleResult<()> {
        self.render.text_mut().set_color(check_color(color)?);
        Ok(())
    }

    /// Discard the staged text attributes.
    pub fn fclear(&mut self) {
        *self.render.text_mut() = crate::render::TextStager::default();
    }

    /// Draw `text` at `(x, y)` in screen space.
    ///
    /// Without an explicit font the staged font is used, then the default.
    pub fn fdraw(&mut self, font: Option<FontId>, text: &str, x: i32, y: i32) {
        let font = font
            .or_else(|| self.render.text().font())
            .unwrap_or(FontId(0));
        self.render.fdraw(&self.fonts, font, text, x, y);
    }

    // --- players ---

    /// Whether `button` is held by the first player.
    #[must_use]
    pub fn btn(&self, button: ButtonId) -> bool {
        self.broker.btn(P1, button)
    }

    /// Whether `button` is held by `player`.
    #[must_use]
    pub fn btn_of(&self, player: PlayerId, button: ButtonId) -> bool {
        self.broker.btn(player, button)
    }

    /// Whether `player` is driven by an agent.
    #[must_use]
    pub fn pbound(&self, player: PlayerId) -> bool {
        self.broker.pbound(player)
    }

    /// Label of `player`.
    #[must_use]
    pub fn plabel(&self, player: PlayerId) -> &str {
        self.broker.plabel(player)
    }

    /// Broadcast `message` to both slots this frame.
    pub fn state(&mut self, message: impl Into<StateMessage>) {
        self.broker.broadcast(&message.into());
    }

    /// Send `message` to one slot this frame.
    pub fn state_to(&mut self, player: PlayerId, message: impl Into<StateMessage>) {
        self.broker.send(player, message.into());
    }
}
