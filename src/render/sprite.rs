//! The "next sprite" stager and sprite/box compositing.

// Sprite compositing maps between float transform space and integer pixels
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::many_single_char_names,
    clippy::similar_names
)]

use super::framebuffer::{Color, Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{ConsoleError, ConsoleResult};
use crate::store::{Tilemap, TileMode, TilemapId};

/// A rectangle of tiles within a tile source, in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// Left tile column.
    pub i: i32,
    /// Top tile row.
    pub j: i32,
    /// Width in tiles.
    pub w: i32,
    /// Height in tiles.
    pub h: i32,
}

impl Default for TileRegion {
    fn default() -> Self {
        Self { i: 0, j: 0, w: 1, h: 1 }
    }
}

/// Attributes of the next sprite to draw.
///
/// Always a complete attribute set: setters validate before writing, and
/// [`SpriteStager::default`] is the reset state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteStager {
    tile: Option<TilemapId>,
    region: TileRegion,
    origin: (i32, i32),
    flip: (bool, bool),
    scale: (f64, f64),
    rotation: f64,
}

impl Default for SpriteStager {
    fn default() -> Self {
        Self {
            tile: None,
            region: TileRegion::default(),
            origin: (0, 0),
            flip: (false, false),
            scale: (1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl SpriteStager {
    /// Staged tile source.
    #[must_use]
    pub const fn tile(&self) -> Option<TilemapId> {
        self.tile
    }

    /// Staged tile region.
    #[must_use]
    pub const fn region(&self) -> TileRegion {
        self.region
    }

    /// Staged origin, in sprite pixels.
    #[must_use]
    pub const fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// Staged horizontal and vertical flip.
    #[must_use]
    pub const fn flip(&self) -> (bool, bool) {
        self.flip
    }

    /// Staged scale factors.
    #[must_use]
    pub const fn scale(&self) -> (f64, f64) {
        self.scale
    }

    /// Staged rotation, in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    pub(crate) fn set_tile(&mut self, tile: TilemapId) {
        self.tile = Some(tile);
    }

    pub(crate) fn set_region(&mut self, region: TileRegion) -> ConsoleResult<()> {
        if region.w <= 0 || region.h <= 0 {
            return Err(ConsoleError::invalid("region", "width and height must be positive"));
        }
        self.region = region;
        Ok(())
    }

    pub(crate) fn set_origin(&mut self, x: i32, y: i32) {
        self.origin = (x, y);
    }

    pub(crate) fn set_flip(&mut self, h: bool, v: bool) {
        self.flip = (h, v);
    }

    pub(crate) fn set_scale(&mut self, x: f64, y: f64) -> ConsoleResult<()> {
        if !x.is_finite() || !y.is_finite() || x == 0.0 || y == 0.0 {
            return Err(ConsoleError::invalid("scale", "scale must be finite and non-zero"));
        }
        self.scale = (x, y);
        Ok(())
    }

    pub(crate) fn set_rotation(&mut self, degrees: f64) -> ConsoleResult<()> {
        if !degrees.is_finite() {
            return Err(ConsoleError::invalid("degrees", "rotation must be finite"));
        }
        self.rotation = degrees;
        Ok(())
    }
}

/// Sine and cosine of `degrees`, exact on multiples of 90.
fn rotation_basis(degrees: f64) -> (f64, f64) {
    let turn = degrees.rem_euclid(360.0);
    if turn.abs() < f64::EPSILON {
        (0.0, 1.0)
    } else if (turn - 90.0).abs() < f64::EPSILON {
        (1.0, 0.0)
    } else if (turn - 180.0).abs() < f64::EPSILON {
        (0.0, -1.0)
    } else if (turn - 270.0).abs() < f64::EPSILON {
        (-1.0, 0.0)
    } else {
        let rad = turn.to_radians();
        (rad.sin(), rad.cos())
    }
}

/// Composite `sprite` so its origin lands on `(x, y)` in screen space.
///
/// Destination pixels are inverse-mapped through rotation and scale into the
/// staged region; flips mirror the region in place. Returns the number of
/// pixels written.
pub(crate) fn composite_sprite(
    fb: &mut Framebuffer,
    map: &Tilemap,
    mode: TileMode,
    sprite: &SpriteStager,
    x: i32,
    y: i32,
) -> usize {
    let ts = mode.pixels();
    let region = sprite.region;
    let src_x = region.i.saturating_mul(ts);
    let src_y = region.j.saturating_mul(ts);
    let width = region.w.saturating_mul(ts);
    let height = region.h.saturating_mul(ts);

    let (ox, oy) = (f64::from(sprite.origin.0), f64::from(sprite.origin.1));
    let (sx, sy) = sprite.scale;
    let (sin, cos) = rotation_basis(sprite.rotation);
    let (ax, ay) = (f64::from(x), f64::from(y));

    // Screen-space bounding box of the transformed region
    let corners = [
        (0.0, 0.0),
        (f64::from(width), 0.0),
        (0.0, f64::from(height)),
        (f64::from(width), f64::from(height)),
    ];
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (cx, cy) in corners {
        let qx = (cx - ox) * sx;
        let qy = (cy - oy) * sy;
        let dx = ax + qx * cos - qy * sin;
        let dy = ay + qx * sin + qy * cos;
        min_x = min_x.min(dx);
        min_y = min_y.min(dy);
        max_x = max_x.max(dx);
        max_y = max_y.max(dy);
    }
    let x0 = (min_x.floor() as i32).max(0);
    let y0 = (min_y.floor() as i32).max(0);
    let x1 = (max_x.ceil() as i32).min(SCREEN_WIDTH);
    let y1 = (max_y.ceil() as i32).min(SCREEN_HEIGHT);

    let mut written = 0;
    for py in y0..y1 {
        for px in x0..x1 {
            let cx = f64::from(px) + 0.5 - ax;
            let cy = f64::from(py) + 0.5 - ay;
            let u = (cx * cos + cy * sin) / sx + ox;
            let v = (cy * cos - cx * sin) / sy + oy;
            let (u, v) = (u.floor() as i32, v.floor() as i32);
            if u < 0 || v < 0 || u >= width || v >= height {
                continue;
            }
            let u = if sprite.flip.0 { width - 1 - u } else { u };
            let v = if sprite.flip.1 { height - 1 - v } else { v };
            if let Some(color) = atlas_pixel(map, src_x, src_y, u, v) {
                fb.set(px, py, color);
                written += 1;
            }
        }
    }
    written
}

/// Atlas pixel at `(src_x + u, src_y + v)`; transparent if the sum overflows.
fn atlas_pixel(map: &Tilemap, src_x: i32, src_y: i32, u: i32, v: i32) -> Option<Color> {
    let x = src_x.checked_add(u)?;
    let y = src_y.checked_add(v)?;
    map.atlas().get(x, y)
}

/// Fill the screen box `(x, y, w, h)` (pixels) by repeating the staged region.
///
/// Only the region is honored; origin, flip, scale and rotation are ignored.
pub(crate) fn composite_box(
    fb: &mut Framebuffer,
    map: &Tilemap,
    mode: TileMode,
    region: TileRegion,
    (x, y, w, h): (i32, i32, i32, i32),
) -> usize {
    let ts = mode.pixels();
    let src_x = region.i.saturating_mul(ts);
    let src_y = region.j.saturating_mul(ts);
    let rw = region.w.saturating_mul(ts);
    let rh = region.h.saturating_mul(ts);
    if w <= 0 || h <= 0 || rw <= 0 || rh <= 0 {
        return 0;
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(w).min(SCREEN_WIDTH);
    let y1 = y.saturating_add(h).min(SCREEN_HEIGHT);

    let mut written = 0;
    for py in y0..y1 {
        // Offsets from a far off-screen anchor exceed i32
        let v = (i64::from(py) - i64::from(y)).rem_euclid(i64::from(rh)) as i32;
        for px in x0..x1 {
            let u = (i64::from(px) - i64::from(x)).rem_euclid(i64::from(rw)) as i32;
            if let Some(color) = atlas_pixel(map, src_x, src_y, u, v) {
                fb.set(px, py, color);
                written += 1;
            }
        }
    }
    written
}

/// Blit tile `tile` of `map` with its top-left at `(x, y)`, unscaled.
pub(crate) fn composite_tile(
    fb: &mut Framebuffer,
    map: &Tilemap,
    mode: TileMode,
    tile: u16,
    x: i32,
    y: i32,
) {
    let ts = mode.pixels();
    if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT || x + ts <= 0 || y + ts <= 0 {
        return;
    }
    let Some((src_x, src_y)) = map.tile_origin(tile, mode) else {
        return;
    };
    let atlas = map.atlas();
    for v in 0..ts {
        for u in 0..ts {
            if let Some(color) = atlas.get(src_x + u, src_y + v) {
                fb.set(x + u, y + v, color);
            }
        }
    }
}
