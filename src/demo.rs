//! The bundled "tag" cartridge.
//!
//! P1 chases, P2 runs. Both slots can be human or agent-driven; the game
//! broadcasts a [`Briefing`] every frame, which the bundled agents steer by.
//! A tag is scored when the two sprites overlap, after which the runner
//! respawns in the corner farthest from the chaser.

use serde::{Deserialize, Serialize};

use crate::broker::{BDOWN, BLEFT, BRIGHT, BUP, Buttons, P1, P2, PlayerId, StateMessage};
use crate::console::{Agent, AgentVm, Console, ConsoleBuilder, ConsoleConfig, Game, Vm};
use crate::error::ConsoleResult;
use crate::render::{Align, DrawMode, SCREEN_WIDTH};
use crate::replay::{Recording, ReplayError};
use crate::store::{Atlas, Tilemap, TilemapId};

/// Name recordings use for this cartridge.
pub const CARTRIDGE: &str = "tag";

/// Name of the arena tilemap.
pub const ARENA: &str = "arena";

const FLOOR_DARK: u16 = 0;
const FLOOR_LIGHT: u16 = 1;
const CHASER_TILE: i32 = 2;
const RUNNER_TILE: i32 = 3;
const HUD_TILE: i32 = 4;

const ARENA_COLS: u16 = 16;
const ARENA_ROWS: u16 = 15;
const SPRITE: i32 = 8;
const FIELD_MAX: i32 = 15 * SPRITE - SPRITE;
const ALERT_RADIUS: i32 = 32;

/// Per-frame game state sent to both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    /// Chaser top-left, in pixels.
    pub chaser: (i32, i32),
    /// Runner top-left, in pixels.
    pub runner: (i32, i32),
    /// Whether the chaser is close to the runner.
    pub alert: bool,
    /// Tags scored so far.
    pub tags: u32,
}

/// Build the arena: a checkerboard floor plus the sprite and HUD tiles.
///
/// # Errors
///
/// Never fails for the built-in colors; the `Result` comes from atlas
/// validation.
pub fn arena() -> ConsoleResult<Tilemap> {
    let mut atlas = Atlas::new(40, 8);
    atlas.fill(0, 0, 8, 8, Some(1))?;
    atlas.fill(8, 0, 8, 8, Some(5))?;
    // Chaser: red block with white eyes.
    atlas.fill(17, 1, 6, 6, Some(8))?;
    atlas.set(18, 2, Some(7))?;
    atlas.set(21, 2, Some(7))?;
    // Runner: blue block with a yellow stripe.
    atlas.fill(25, 1, 6, 6, Some(12))?;
    atlas.fill(25, 3, 6, 1, Some(10))?;
    // HUD bar.
    atlas.fill(32, 0, 8, 8, Some(0))?;
    atlas.fill(32, 0, 8, 1, Some(6))?;

    let mut map = Tilemap::new(atlas, ARENA_COLS, ARENA_ROWS);
    for y in 0..i32::from(ARENA_ROWS) {
        for x in 0..i32::from(ARENA_COLS) {
            let tile = if (x + y) % 2 == 0 { FLOOR_DARK } else { FLOOR_LIGHT };
            map.set_cell(x, y, Some(tile));
        }
    }
    Ok(map)
}

fn step(buttons: impl Fn(u8) -> bool, pos: &mut (i32, i32), speed: i32) {
    if buttons(BLEFT) {
        pos.0 -= speed;
    }
    if buttons(BRIGHT) {
        pos.0 += speed;
    }
    if buttons(BUP) {
        pos.1 -= speed;
    }
    if buttons(BDOWN) {
        pos.1 += speed;
    }
    pos.0 = pos.0.clamp(0, SCREEN_WIDTH - SPRITE);
    pos.1 = pos.1.clamp(0, FIELD_MAX);
}

const fn distance((ax, ay): (i32, i32), (bx, by): (i32, i32)) -> i32 {
    let dx = (ax - bx).abs();
    let dy = (ay - by).abs();
    if dx > dy { dx } else { dy }
}

/// The tag game unit.
#[derive(Debug)]
pub struct TagGame {
    arena: TilemapId,
    chaser: (i32, i32),
    runner: (i32, i32),
    tags: u32,
}

impl TagGame {
    /// Boot against `vm`: resolve the arena and select it for the tilemap layer.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` if the arena cannot be selected.
    pub fn boot(vm: &mut Vm) -> ConsoleResult<Self> {
        let arena = vm.tmap(ARENA);
        vm.select_tmap(arena)?;
        vm.tmode(8)?;
        Ok(Self {
            arena,
            chaser: (8, 8),
            runner: (SCREEN_WIDTH - 2 * SPRITE, FIELD_MAX - SPRITE),
            tags: 0,
        })
    }

    fn respawn_runner(&mut self) {
        let x = if self.chaser.0 < SCREEN_WIDTH / 2 { SCREEN_WIDTH - SPRITE } else { 0 };
        let y = if self.chaser.1 < FIELD_MAX / 2 { FIELD_MAX } else { 0 };
        self.runner = (x, y);
    }

    fn draw_sprite(&self, vm: &mut Vm, tile: i32, (x, y): (i32, i32)) {
        vm.stile(self.arena);
        if vm.sregion(tile, 0, 1, 1).is_ok() {
            vm.sdraw(x, y);
        }
    }
}

impl Game for TagGame {
    fn tick(&mut self, vm: &mut Vm, _delta_time: f64) {
        step(|b| vm.btn_of(P1, b), &mut self.chaser, 3);
        step(|b| vm.btn_of(P2, b), &mut self.runner, 2);

        let gap = distance(self.chaser, self.runner);
        if gap < SPRITE {
            self.tags += 1;
            vm.print(format_args!("tag #{} at frame {}", self.tags, vm.frame()));
            self.respawn_runner();
        }

        let briefing = Briefing {
            chaser: self.chaser,
            runner: self.runner,
            alert: gap < ALERT_RADIUS,
            tags: self.tags,
        };
        match StateMessage::json(&briefing) {
            Ok(message) => vm.state(message),
            Err(err) => tracing::warn!(%err, "briefing not encodable"),
        }

        vm.cls();
        if vm.render().mode() == DrawMode::Manual {
            vm.mdraw();
        }
        self.draw_sprite(vm, CHASER_TILE, self.chaser);
        self.draw_sprite(vm, RUNNER_TILE, self.runner);

        vm.stile(self.arena);
        if vm.sregion(HUD_TILE, 0, 1, 1).is_ok() {
            vm.sbox(0, i32::from(ARENA_ROWS), i32::from(ARENA_COLS), 1);
        }
        vm.sclear();

        let label = format!("{} {}", vm.plabel(P1), self.tags);
        if vm.fcolor(7).is_ok() {
            vm.fdraw(None, &label, 2, 122);
        }
        let alert = if briefing.alert { "!" } else { "" };
        let label = format!("{}{alert}", vm.plabel(P2));
        vm.falign(Align::End, Align::Start);
        if vm.fcolor(if briefing.alert { 8 } else { 6 }).is_ok() {
            vm.fdraw(None, &label, SCREEN_WIDTH - 2, 122);
        }
    }
}

fn briefing(vm: &AgentVm<'_>) -> Option<Briefing> {
    vm.state().and_then(StateMessage::decode)
}

fn toward(from: i32, to: i32, less: u8, more: u8, held: &mut Buttons) {
    if to < from {
        held.press(less);
    } else if to > from {
        held.press(more);
    }
}

/// Agent that heads straight for the runner.
#[derive(Debug, Default)]
pub struct ChaserAgent;

impl Agent for ChaserAgent {
    fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
        let Some(b) = briefing(vm) else {
            return;
        };
        let mut held = Buttons::NONE;
        toward(b.chaser.0, b.runner.0, BLEFT, BRIGHT, &mut held);
        toward(b.chaser.1, b.runner.1, BUP, BDOWN, &mut held);
        vm.set_buttons(held);
    }
}

/// Agent that idles toward the center and flees once alerted.
#[derive(Debug, Default)]
pub struct RunnerAgent;

impl Agent for RunnerAgent {
    fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
        let Some(b) = briefing(vm) else {
            return;
        };
        let mut held = Buttons::NONE;
        if b.alert {
            // Away from the chaser on both axes.
            toward(b.chaser.0, b.runner.0, BLEFT, BRIGHT, &mut held);
            toward(b.chaser.1, b.runner.1, BUP, BDOWN, &mut held);
            // Pinned against a wall: slide along it instead.
            let pinned = b.runner.0 == 0 || b.runner.0 == SCREEN_WIDTH - SPRITE;
            if pinned && b.runner.1 == b.chaser.1 {
                held.press(if b.runner.1 < FIELD_MAX / 2 { BDOWN } else { BUP });
            }
        } else {
            let center = ((SCREEN_WIDTH - SPRITE) / 2, FIELD_MAX / 2);
            toward(center.0, b.runner.0, BRIGHT, BLEFT, &mut held);
            toward(center.1, b.runner.1, BDOWN, BUP, &mut held);
        }
        vm.set_buttons(held);
    }
}

/// Console builder with the arena loaded and `agents` bound.
///
/// P1 gets a [`ChaserAgent`], P2 a [`RunnerAgent`].
///
/// # Errors
///
/// Returns an error for an unknown or repeated slot in `agents`.
pub fn builder(config: ConsoleConfig, agents: &[PlayerId]) -> ConsoleResult<ConsoleBuilder> {
    let mut builder = ConsoleBuilder::new(config).load_tilemap(ARENA, arena()?);
    for &player in agents {
        builder = if player == P1 {
            builder.agent(player, |_| Box::new(ChaserAgent))?
        } else {
            builder.agent(player, |_| Box::new(RunnerAgent))?
        };
    }
    Ok(builder)
}

/// Boot the tag cartridge.
///
/// # Errors
///
/// Returns an error for a bad configuration or agent slot list.
pub fn console(config: ConsoleConfig, agents: &[PlayerId]) -> ConsoleResult<Console> {
    builder(config, agents)?.try_boot(|vm| {
        let game: Box<dyn Game> = Box::new(TagGame::boot(vm)?);
        Ok(game)
    })
}

/// Boot the cartridge named by a recording.
///
/// # Errors
///
/// Returns `UnknownCartridge` for any cartridge other than [`CARTRIDGE`].
pub fn boot_recording(recording: &Recording) -> Result<Console, ReplayError> {
    if recording.cartridge != CARTRIDGE {
        return Err(ReplayError::UnknownCartridge(recording.cartridge.clone()));
    }
    Ok(console(recording.config.clone(), &recording.agents)?)
}
