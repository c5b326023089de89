//! Tilemaps: tile sources, tile grids and the global tile-mode.

use serde::{Deserialize, Serialize};

use super::NameTable;
use crate::error::{ConsoleError, ConsoleResult, ReferenceKind};
use crate::render::{Color, check_color};

/// Stable identifier of a tilemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilemapId(pub u32);

impl TilemapId {
    /// Returned for names that could not be registered; never resolves.
    pub const NONE: Self = Self(u32::MAX);
}

/// Maximum number of tilemap names per console.
pub const TNUM: usize = 64;

/// Accepted tile-mode sizes, in pixels.
pub const TILE_MODES: [u32; 4] = [8, 16, 32, 64];

/// Pixel size of one logical tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileMode {
    /// 8×8 pixel tiles.
    #[default]
    T8,
    /// 16×16 pixel tiles.
    T16,
    /// 32×32 pixel tiles.
    T32,
    /// 64×64 pixel tiles.
    T64,
}

impl TileMode {
    /// Parse a tile size in pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for sizes outside [`TILE_MODES`].
    pub fn from_size(size: u32) -> ConsoleResult<Self> {
        match size {
            8 => Ok(Self::T8),
            16 => Ok(Self::T16),
            32 => Ok(Self::T32),
            64 => Ok(Self::T64),
            _ => Err(ConsoleError::invalid(
                "size",
                format!("tile mode {size} is not one of 8, 16, 32, 64"),
            )),
        }
    }

    /// Tile edge length in pixels.
    #[must_use]
    pub const fn pixels(self) -> i32 {
        match self {
            Self::T8 => 8,
            Self::T16 => 16,
            Self::T32 => 32,
            Self::T64 => 64,
        }
    }
}

/// Indexed-color pixel sheet that tiles are cut from.
///
/// `None` pixels are transparent and never composited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    width: u32,
    height: u32,
    pixels: Vec<Option<Color>>,
}

impl Atlas {
    /// Create a fully transparent atlas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width as usize * height as usize],
        }
    }

    /// Create an atlas filled with one color.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `color` is not a palette index.
    pub fn solid(width: u32, height: u32, color: Color) -> ConsoleResult<Self> {
        let color = check_color(color)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Some(color); width as usize * height as usize],
        })
    }

    /// Create an atlas from row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the pixel count does not match the
    /// dimensions or a pixel is not a palette index.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Option<Color>>) -> ConsoleResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(ConsoleError::invalid(
                "pixels",
                format!("expected {} pixels, got {}", width * height, pixels.len()),
            ));
        }
        for color in pixels.iter().flatten() {
            check_color(*color)?;
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`; transparent outside the sheet.
    #[must_use]
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return None;
        };
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Overwrite one pixel. Out-of-sheet writes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `color` is not a palette index.
    pub fn set(&mut self, x: u32, y: u32, color: Option<Color>) -> ConsoleResult<()> {
        if let Some(c) = color {
            check_color(c)?;
        }
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
        Ok(())
    }

    /// Fill a rectangle of the sheet. Parts outside the sheet are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `color` is not a palette index.
    pub fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Option<Color>) -> ConsoleResult<()> {
        for py in y..y.saturating_add(h) {
            for px in x..x.saturating_add(w) {
                self.set(px, py, color)?;
            }
        }
        Ok(())
    }
}

/// A tile source plus a grid of tile references into it.
///
/// Tile `n` of the atlas is the `n`-th tile-mode-sized block in row-major
/// order, so the same grid renders at a different scale under another mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    atlas: Atlas,
    cols: u16,
    rows: u16,
    cells: Vec<Option<u16>>,
}

impl Tilemap {
    /// Create a tilemap with an empty `cols`×`rows` grid.
    #[must_use]
    pub fn new(atlas: Atlas, cols: u16, rows: u16) -> Self {
        Self {
            atlas,
            cols,
            rows,
            cells: vec![None; usize::from(cols) * usize::from(rows)],
        }
    }

    /// The tile source.
    #[must_use]
    pub const fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// Mutable access to the tile source.
    pub fn atlas_mut(&mut self) -> &mut Atlas {
        &mut self.atlas
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return None;
        };
        (x < self.cols && y < self.rows)
            .then(|| usize::from(y) * usize::from(self.cols) + usize::from(x))
    }

    /// Tile reference at grid cell `(x, y)`.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<u16> {
        self.cell_index(x, y).and_then(|i| self.cells[i])
    }

    /// Set grid cell `(x, y)`. Returns `false` if the cell is outside the grid.
    pub fn set_cell(&mut self, x: i32, y: i32, tile: Option<u16>) -> bool {
        match self.cell_index(x, y) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Empty every grid cell.
    pub fn clear_cells(&mut self) {
        self.cells.fill(None);
    }

    /// Pixel origin of tile `tile` within the atlas under `mode`.
    ///
    /// `None` if the atlas holds no tile with that index.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn tile_origin(&self, tile: u16, mode: TileMode) -> Option<(i32, i32)> {
        let size = mode.pixels().unsigned_abs();
        let per_row = self.atlas.width / size;
        let per_col = self.atlas.height / size;
        if per_row == 0 || u32::from(tile) >= per_row * per_col {
            return None;
        }
        let tile = u32::from(tile);
        Some((((tile % per_row) * size) as i32, ((tile / per_row) * size) as i32))
    }
}

/// Tilemap registry plus the global tile-mode, selection and scroll.
#[derive(Debug, Clone, Default)]
pub struct TilemapStore {
    names: NameTable,
    maps: Vec<Option<Tilemap>>,
    mode: TileMode,
    selected: Option<TilemapId>,
    scroll: (i32, i32),
}

impl TilemapStore {
    /// Create an empty store in 8-pixel tile mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to its id, assigning the next sequential id if unseen.
    ///
    /// Once [`TNUM`] names are registered, unseen names resolve to
    /// [`TilemapId::NONE`], which draws nothing.
    pub fn resolve(&mut self, name: &str) -> TilemapId {
        self.try_resolve(name).unwrap_or_else(|err| {
            tracing::warn!(name, %err, "tilemap name not registered");
            TilemapId::NONE
        })
    }

    /// [`TilemapStore::resolve`] that reports a full store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is unseen and [`TNUM`] names are
    /// already registered.
    pub fn try_resolve(&mut self, name: &str) -> ConsoleResult<TilemapId> {
        if let Some(id) = self.names.lookup(name) {
            return Ok(TilemapId(id));
        }
        if self.names.len() >= TNUM {
            return Err(ConsoleError::invalid(
                "name",
                format!("tilemap limit of {TNUM} reached"),
            ));
        }
        let (id, _) = self.names.resolve(name);
        self.maps.push(None);
        tracing::debug!(name, id, "tilemap id assigned");
        Ok(TilemapId(id))
    }

    /// Look up a name without assigning.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TilemapId> {
        self.names.lookup(name).map(TilemapId)
    }

    /// Attach a payload to `name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is new and the store is full.
    pub fn load(&mut self, name: &str, tilemap: Tilemap) -> ConsoleResult<TilemapId> {
        let id = self.try_resolve(name)?;
        self.maps[id.0 as usize] = Some(tilemap);
        Ok(id)
    }

    /// Name bound to `id`.
    #[must_use]
    pub fn name(&self, id: TilemapId) -> Option<&str> {
        self.names.name(id.0)
    }

    /// Payload for `id`, if one was loaded.
    #[must_use]
    pub fn get(&self, id: TilemapId) -> Option<&Tilemap> {
        self.maps.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutable payload for `id`.
    pub fn get_mut(&mut self, id: TilemapId) -> Option<&mut Tilemap> {
        self.maps.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Number of names resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name was resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.len() == 0
    }

    /// Active tile-mode.
    #[must_use]
    pub const fn mode(&self) -> TileMode {
        self.mode
    }

    /// Switch the tile-mode.
    pub fn set_mode(&mut self, mode: TileMode) {
        self.mode = mode;
    }

    /// Select the tilemap used by the tilemap layer and `m*` edits.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` if `id` was never assigned.
    pub fn select(&mut self, id: TilemapId) -> ConsoleResult<()> {
        if (id.0 as usize) >= self.names.len() {
            return Err(ConsoleError::UnresolvedReference {
                kind: ReferenceKind::Tilemap,
                id: id.0,
            });
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Currently selected tilemap.
    #[must_use]
    pub const fn selected(&self) -> Option<TilemapId> {
        self.selected
    }

    /// Payload of the selected tilemap.
    #[must_use]
    pub fn selected_map(&self) -> Option<&Tilemap> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Mutable payload of the selected tilemap.
    pub fn selected_map_mut(&mut self) -> Option<&mut Tilemap> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Tilemap layer scroll offset in pixels.
    #[must_use]
    pub const fn scroll(&self) -> (i32, i32) {
        self.scroll
    }

    /// Set the tilemap layer scroll offset.
    pub fn set_scroll(&mut self, x: i32, y: i32) {
        self.scroll = (x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_mode_parse() {
        assert_eq!(TileMode::from_size(16), Ok(TileMode::T16));
        assert_eq!(TileMode::T64.pixels(), 64);
        assert!(TileMode::from_size(12).is_err());
        assert!(TileMode::from_size(0).is_err());
    }

    #[test]
    fn test_resolve_stable() {
        let mut store = TilemapStore::new();
        let a = store.resolve("a");
        let b = store.resolve("b");
        assert_ne!(a, b);
        assert_eq!(store.resolve("a"), a);
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_load_keeps_id() {
        let mut store = TilemapStore::new();
        let id = store.resolve("level");
        let loaded = store.load("level", Tilemap::new(Atlas::new(8, 8), 4, 4)).unwrap();
        assert_eq!(id, loaded);
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_tnum_limit() {
        let mut store = TilemapStore::new();
        let ids: Vec<_> = (0..TNUM).map(|i| store.resolve(&format!("map{i}"))).collect();
        assert_eq!(ids.last(), Some(&TilemapId(63)));

        // Known names still resolve; new ones do not
        assert_eq!(store.resolve("map7"), TilemapId(7));
        assert_eq!(store.resolve("overflow"), TilemapId::NONE);
        assert_eq!(store.resolve("another"), TilemapId::NONE);
        assert_eq!(store.len(), TNUM);
        assert!(store.try_resolve("overflow").is_err());
        assert!(store.load("overflow", Tilemap::new(Atlas::new(8, 8), 1, 1)).is_err());
        assert!(store.load("map0", Tilemap::new(Atlas::new(8, 8), 1, 1)).is_ok());
        assert!(store.get(TilemapId::NONE).is_none());
        assert!(store.select(TilemapId::NONE).is_err());
    }

    #[test]
    fn test_select_unknown_fails() {
        let mut store = TilemapStore::new();
        assert!(store.select(TilemapId(3)).is_err());
        let id = store.resolve("x");
        assert!(store.select(id).is_ok());
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn test_tile_origin() {
        let map = Tilemap::new(Atlas::new(32, 16), 1, 1);
        assert_eq!(map.tile_origin(0, TileMode::T8), Some((0, 0)));
        assert_eq!(map.tile_origin(5, TileMode::T8), Some((8, 8)));
        assert_eq!(map.tile_origin(8, TileMode::T8), None);
        assert_eq!(map.tile_origin(1, TileMode::T16), Some((16, 0)));
        assert_eq!(map.tile_origin(0, TileMode::T64), None);
    }

    #[test]
    fn test_cells() {
        let mut map = Tilemap::new(Atlas::new(8, 8), 3, 2);
        assert!(map.set_cell(2, 1, Some(4)));
        assert!(!map.set_cell(3, 0, Some(1)));
        assert!(!map.set_cell(-1, 0, Some(1)));
        assert_eq!(map.cell(2, 1), Some(4));
        map.clear_cells();
        assert_eq!(map.cell(2, 1), None);
    }

    #[test]
    fn test_atlas_rejects_bad_color() {
        assert!(Atlas::solid(4, 4, 16).is_err());
        assert!(Atlas::from_pixels(2, 1, vec![Some(1)]).is_err());
        let atlas = Atlas::from_pixels(2, 1, vec![Some(1), None]).unwrap();
        assert_eq!(atlas.get(0, 0), Some(1));
        assert_eq!(atlas.get(1, 0), None);
        assert_eq!(atlas.get(-1, 0), None);
    }
}
