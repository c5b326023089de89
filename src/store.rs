//! Named asset stores.
//!
//! Tilemaps and fonts are addressed by integer ids that are assigned the first
//! time a name is resolved and never change afterwards. Payloads are attached
//! by the host; a resolved id without a payload is valid but draws nothing.

mod font;
mod tilemap;

pub use font::{DEFAULT_FONT, Font, FontId, FontStore, Glyph};
pub use tilemap::{Atlas, TILE_MODES, TNUM, TileMode, Tilemap, TilemapId, TilemapStore};

use std::collections::HashMap;

/// Bidirectional name/id table with sequential assignment.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameTable {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl NameTable {
    /// Return the id for `name`, assigning the next one if unseen.
    ///
    /// The second element is `true` when the id was freshly assigned.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn resolve(&mut self, name: &str) -> (u32, bool) {
        if let Some(&id) = self.ids.get(name) {
            return (id, false);
        }
        let id = self.names.len() as u32;
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        (id, true)
    }

    /// Look up an already assigned id without assigning.
    pub(crate) fn lookup(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Name bound to `id`, if assigned.
    pub(crate) fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Number of assigned ids.
    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
