//! The sprite table: `SNUM` persistent sprites addressed by id.
//!
//! Unlike the "next sprite" stager, table entries survive across frames and
//! are composited by the frame finalizer while shown.

use serde::{Deserialize, Serialize};

use super::SNUM;
use super::sprite::{SpriteStager, TileRegion};
use crate::error::{ConsoleError, ConsoleResult, ReferenceKind};
use crate::store::{TileMode, Tilemap, TilemapId};

/// Identifier of a sprite table entry. Valid ids are `0..SNUM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(pub u16);

/// One entry of the sprite table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSlot {
    tile: Option<u16>,
    position: (i32, i32),
    visible: bool,
    flip: (bool, bool),
    scale: (f64, f64),
    rotation: f64,
}

impl Default for SpriteSlot {
    fn default() -> Self {
        Self {
            tile: None,
            position: (0, 0),
            visible: false,
            flip: (false, false),
            scale: (1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl SpriteSlot {
    /// Tile of the selected tilemap this sprite shows.
    #[must_use]
    pub const fn tile(&self) -> Option<u16> {
        self.tile
    }

    /// Top-left position, before the camera.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Whether the finalizer draws this sprite.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Horizontal and vertical flip.
    #[must_use]
    pub const fn flip(&self) -> (bool, bool) {
        self.flip
    }

    /// Scale factors.
    #[must_use]
    pub const fn scale(&self) -> (f64, f64) {
        self.scale
    }

    /// Rotation in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The stager equivalent of this entry for `source` under `mode`.
    ///
    /// `None` without a tile, or when the tile is outside the atlas.
    fn staged(&self, source: TilemapId, map: &Tilemap, mode: TileMode) -> Option<SpriteStager> {
        let (x, y) = map.tile_origin(self.tile?, mode)?;
        let ts = mode.pixels();
        let mut sprite = SpriteStager::default();
        sprite.set_tile(source);
        sprite
            .set_region(TileRegion {
                i: x / ts,
                j: y / ts,
                w: 1,
                h: 1,
            })
            .ok()?;
        sprite.set_flip(self.flip.0, self.flip.1);
        sprite.set_scale(self.scale.0, self.scale.1).ok()?;
        sprite.set_rotation(self.rotation).ok()?;
        Some(sprite)
    }
}

/// All `SNUM` sprite entries.
#[derive(Debug, Clone)]
pub struct SpriteTable {
    slots: Vec<SpriteSlot>,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self {
            slots: vec![SpriteSlot::default(); SNUM],
        }
    }
}

impl SpriteTable {
    /// Entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` for ids outside `0..SNUM`.
    pub fn get(&self, id: SpriteId) -> ConsoleResult<&SpriteSlot> {
        self.slots
            .get(usize::from(id.0))
            .ok_or(ConsoleError::UnresolvedReference {
                kind: ReferenceKind::Sprite,
                id: u32::from(id.0),
            })
    }

    /// Entry for `id`, or the default entry for an unknown id.
    #[must_use]
    pub fn slot_or_default(&self, id: SpriteId) -> SpriteSlot {
        self.get(id).copied().unwrap_or_default()
    }

    /// Ids of shown entries, ascending.
    #[must_use]
    pub fn visible(&self) -> impl Iterator<Item = (SpriteId, &SpriteSlot)> {
        self.slots
            .iter()
            .zip(0u16..)
            .filter(|(slot, _)| slot.visible)
            .map(|(slot, id)| (SpriteId(id), slot))
    }

    fn slot_mut(&mut self, id: SpriteId) -> Option<&mut SpriteSlot> {
        let slot = self.slots.get_mut(usize::from(id.0));
        if slot.is_none() {
            tracing::trace!(id = id.0, "unknown sprite id ignored");
        }
        slot
    }

    pub(crate) fn set_tile(&mut self, id: SpriteId, tile: Option<u16>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.tile = tile;
        }
    }

    pub(crate) fn set_position(&mut self, id: SpriteId, x: i32, y: i32) {
        if let Some(slot) = self.slot_mut(id) {
            slot.position = (x, y);
        }
    }

    pub(crate) fn set_visible(&mut self, id: SpriteId, visible: bool) {
        if let Some(slot) = self.slot_mut(id) {
            slot.visible = visible;
        }
    }

    pub(crate) fn set_flip(&mut self, id: SpriteId, h: bool, v: bool) {
        if let Some(slot) = self.slot_mut(id) {
            slot.flip = (h, v);
        }
    }

    /// Validates like [`SpriteStager`] before touching the entry.
    pub(crate) fn set_scale(&mut self, id: SpriteId, x: f64, y: f64) -> ConsoleResult<()> {
        SpriteStager::default().set_scale(x, y)?;
        if let Some(slot) = self.slot_mut(id) {
            slot.scale = (x, y);
        }
        Ok(())
    }

    pub(crate) fn set_rotation(&mut self, id: SpriteId, degrees: f64) -> ConsoleResult<()> {
        SpriteStager::default().set_rotation(degrees)?;
        if let Some(slot) = self.slot_mut(id) {
            slot.rotation = degrees;
        }
        Ok(())
    }

    /// Stagers for every shown entry with a drawable tile, ascending by id,
    /// each paired with its position.
    pub(crate) fn staged(
        &self,
        source: TilemapId,
        map: &Tilemap,
        mode: TileMode,
    ) -> Vec<(SpriteStager, (i32, i32))> {
        self.visible()
            .filter_map(|(_, slot)| Some((slot.staged(source, map, mode)?, slot.position)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Atlas;

    #[test]
    fn test_defaults_and_unknown_ids() {
        let mut table = SpriteTable::default();
        let last = SpriteId(u16::try_from(SNUM - 1).unwrap());
        assert_eq!(table.get(last), Ok(&SpriteSlot::default()));
        assert!(!table.slot_or_default(SpriteId(0)).visible());

        let unknown = SpriteId(u16::try_from(SNUM).unwrap());
        assert_eq!(
            table.get(unknown),
            Err(ConsoleError::UnresolvedReference {
                kind: ReferenceKind::Sprite,
                id: 256,
            })
        );
        table.set_visible(unknown, true);
        table.set_position(unknown, 4, 4);
        assert_eq!(table.slot_or_default(unknown), SpriteSlot::default());
        assert_eq!(table.visible().count(), 0);
    }

    #[test]
    fn test_setters_touch_one_entry() {
        let mut table = SpriteTable::default();
        table.set_tile(SpriteId(3), Some(2));
        table.set_position(SpriteId(3), -5, 9);
        table.set_flip(SpriteId(3), true, false);
        table.set_scale(SpriteId(3), 2.0, 0.5).unwrap();
        table.set_rotation(SpriteId(3), 90.0).unwrap();
        table.set_visible(SpriteId(3), true);

        let slot = table.slot_or_default(SpriteId(3));
        assert_eq!(slot.tile(), Some(2));
        assert_eq!(slot.position(), (-5, 9));
        assert_eq!(slot.flip(), (true, false));
        let (sx, sy) = slot.scale();
        assert!((sx - 2.0).abs() < f64::EPSILON && (sy - 0.5).abs() < f64::EPSILON);
        assert!((slot.rotation() - 90.0).abs() < f64::EPSILON);
        assert_eq!(table.slot_or_default(SpriteId(2)), SpriteSlot::default());
    }

    #[test]
    fn test_invalid_scale_and_rotation_rejected() {
        let mut table = SpriteTable::default();
        assert!(table.set_scale(SpriteId(0), 0.0, 1.0).is_err());
        assert!(table.set_rotation(SpriteId(0), f64::INFINITY).is_err());
        // Validation runs even for unknown ids
        assert!(table.set_scale(SpriteId(9999), f64::NAN, 1.0).is_err());
        assert_eq!(table.slot_or_default(SpriteId(0)), SpriteSlot::default());
    }

    #[test]
    fn test_staged_ascending_and_skips_missing_tiles() {
        let map = Tilemap::new(Atlas::new(16, 8), 1, 1);
        let mut table = SpriteTable::default();
        for (id, tile) in [(7, Some(1)), (2, Some(0)), (4, None), (5, Some(9))] {
            table.set_tile(SpriteId(id), tile);
            table.set_position(SpriteId(id), i32::from(id), 0);
            table.set_visible(SpriteId(id), true);
        }
        let staged = table.staged(TilemapId(0), &map, TileMode::T8);
        let positions: Vec<_> = staged.iter().map(|(_, at)| at.0).collect();
        assert_eq!(positions, vec![2, 7]);
        assert_eq!(staged[1].0.region(), TileRegion { i: 1, j: 0, w: 1, h: 1 });
    }
}
