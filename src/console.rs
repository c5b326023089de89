//! Console instance and frame scheduler.
//!
//! A frame runs strictly in this order:
//!
//! 1. human buttons are copied from the input snapshot
//! 2. the game unit ticks
//! 3. pending broadcasts are delivered to the slots
//! 4. agent units tick, P1 before P2
//! 5. engine-mode draw queues are flushed
//!
//! # Determinism
//!
//! Given the same boot routines, configuration and sequence of
//! `(delta_time, input)` pairs, a console always produces the same frames.

mod agent;
mod vm;

pub use agent::AgentVm;
pub use vm::Vm;

use serde::{Deserialize, Serialize};

use crate::broker::{
    Broker, Buttons, DEFAULT_P1_LABEL, DEFAULT_P2_LABEL, InputSnapshot, P1, P2, PlayerId,
};
use crate::error::{ConsoleError, ConsoleResult, ReferenceKind};
use crate::render::{
    Color, DrawMode, Framebuffer, RenderContext, SpriteId, SpriteSlot, check_color,
};
use crate::store::{Font, FontId, FontStore, Tilemap, TilemapId, TilemapStore};

/// The primary unit of a cartridge.
pub trait Game {
    /// Advance the game by one frame.
    fn tick(&mut self, vm: &mut Vm, delta_time: f64);
}

/// A unit driving one player slot.
pub trait Agent {
    /// Decide this slot's buttons for the next frame.
    fn tick(&mut self, vm: &mut AgentVm<'_>, delta_time: f64);
}

/// Boot routine of an agent unit.
pub type AgentBoot = Box<dyn FnOnce(&mut AgentVm<'_>) -> Box<dyn Agent>>;

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Label of the first slot.
    pub p1_label: String,
    /// Label of the second slot.
    pub p2_label: String,
    /// When sprites and text reach the framebuffer.
    pub draw_mode: DrawMode,
    /// Color used by argument-less clears and the initial screen.
    pub background: Color,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            p1_label: DEFAULT_P1_LABEL.to_owned(),
            p2_label: DEFAULT_P2_LABEL.to_owned(),
            draw_mode: DrawMode::Manual,
            background: 0,
        }
    }
}

/// Summary of one completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Index of the completed frame.
    pub frame: u64,
    /// Number of agent units ticked.
    pub agent_ticks: usize,
    /// Sprites dropped by the engine-mode queue limit.
    pub dropped_sprites: usize,
}

/// Assembles a console: configuration, assets and agent bindings.
pub struct ConsoleBuilder {
    config: ConsoleConfig,
    tiles: TilemapStore,
    fonts: FontStore,
    agents: [Option<AgentBoot>; 2],
    load_error: Option<ConsoleError>,
}

impl std::fmt::Debug for ConsoleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleBuilder")
            .field("config", &self.config)
            .field("tilemaps", &self.tiles.len())
            .field("fonts", &self.fonts.len())
            .field("agents", &self.agents.each_ref().map(Option::is_some))
            .field("load_error", &self.load_error)
            .finish()
    }
}

impl ConsoleBuilder {
    /// Start building with `config`.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            tiles: TilemapStore::new(),
            fonts: FontStore::new(),
            agents: [None, None],
            load_error: None,
        }
    }

    /// Register a tilemap payload before boot.
    ///
    /// A failed registration is reported by the boot call.
    #[must_use]
    pub fn load_tilemap(mut self, name: &str, tilemap: Tilemap) -> Self {
        if let Err(err) = self.tiles.load(name, tilemap)
            && self.load_error.is_none()
        {
            self.load_error = Some(err);
        }
        self
    }

    /// Register a font payload before boot.
    #[must_use]
    pub fn load_font(mut self, name: &str, font: Font) -> Self {
        self.fonts.load(name, font);
        self
    }

    /// Bind `player` to the agent produced by `boot`.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` for an unknown player and
    /// `InvalidArgument` if the slot already has an agent.
    pub fn agent<F>(mut self, player: PlayerId, boot: F) -> ConsoleResult<Self>
    where
        F: FnOnce(&mut AgentVm<'_>) -> Box<dyn Agent> + 'static,
    {
        let index = match player {
            P1 => 0,
            P2 => 1,
            _ => {
                return Err(ConsoleError::UnresolvedReference {
                    kind: ReferenceKind::Player,
                    id: u32::from(player),
                });
            }
        };
        if self.agents[index].is_some() {
            return Err(ConsoleError::invalid(
                "player",
                format!("slot {player} is already bound to an agent"),
            ));
        }
        self.agents[index] = Some(Box::new(boot));
        Ok(self)
    }

    /// Boot the game unit, then the agent units in slot order.
    ///
    /// # Errors
    ///
    /// Returns the first failed tilemap registration, or `InvalidArgument` if
    /// the configured background is not a palette index.
    pub fn boot<F>(self, boot: F) -> ConsoleResult<Console>
    where
        F: FnOnce(&mut Vm) -> Box<dyn Game>,
    {
        self.try_boot(|vm| Ok(boot(vm)))
    }

    /// [`ConsoleBuilder::boot`] with a boot routine that can fail.
    ///
    /// # Errors
    ///
    /// Returns the boot routine's error, the first failed tilemap
    /// registration, or `InvalidArgument` for a bad background color.
    pub fn try_boot<F>(self, boot: F) -> ConsoleResult<Console>
    where
        F: FnOnce(&mut Vm) -> ConsoleResult<Box<dyn Game>>,
    {
        if let Some(err) = self.load_error {
            return Err(err);
        }
        let background = check_color(self.config.background)?;
        let mut broker = Broker::new(&self.config.p1_label, &self.config.p2_label);
        for (player, agent_boot) in [P1, P2].into_iter().zip(&self.agents) {
            if agent_boot.is_some() {
                broker.bind_agent(player)?;
            }
        }

        let render = RenderContext::new(self.config.draw_mode, background);
        let mut vm = Vm::new(render, self.tiles, self.fonts, broker);
        let game = boot(&mut vm)?;

        let mut agents: [Option<Box<dyn Agent>>; 2] = [None, None];
        let seen = vm.broker.held();
        for ((player, agent_boot), unit) in [P1, P2].into_iter().zip(self.agents).zip(&mut agents) {
            if let Some(agent_boot) = agent_boot {
                let mut api = AgentVm::new(&mut vm.broker, player, 0, seen);
                *unit = Some(agent_boot(&mut api));
            }
        }

        tracing::debug!(
            p1_agent = agents[0].is_some(),
            p2_agent = agents[1].is_some(),
            mode = ?self.config.draw_mode,
            "console booted"
        );
        Ok(Console {
            config: self.config,
            vm,
            game,
            agents,
        })
    }
}

/// A booted console instance.
pub struct Console {
    config: ConsoleConfig,
    vm: Vm,
    game: Box<dyn Game>,
    agents: [Option<Box<dyn Agent>>; 2],
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .field("frame", &self.vm.frame)
            .field("framebuffer", self.vm.framebuffer())
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Produce one frame.
    pub fn frame(&mut self, delta_time: f64, input: &InputSnapshot) -> FrameReport {
        let frame = self.vm.frame;
        let _span = tracing::debug_span!("frame", frame).entered();

        self.vm.broker.apply_input(input);
        self.game.tick(&mut self.vm, delta_time);
        self.vm.broker.deliver();

        let mut agent_ticks = 0;
        let seen = self.vm.broker.held();
        for (player, unit) in [P1, P2].into_iter().zip(&mut self.agents) {
            let Some(unit) = unit else {
                continue;
            };
            if let Some(slot) = self.vm.broker.slot_mut(player) {
                slot.set_buttons(Buttons::NONE);
            }
            let mut api = AgentVm::new(&mut self.vm.broker, player, frame, seen);
            unit.tick(&mut api, delta_time);
            agent_ticks += 1;
        }

        let stats = self.vm.render.finalize(&self.vm.tiles, &self.vm.fonts);
        tracing::debug!(
            agent_ticks,
            sprites = stats.sprites,
            texts = stats.texts,
            dropped = stats.dropped,
            "frame complete"
        );
        self.vm.frame += 1;

        FrameReport {
            frame,
            agent_ticks,
            dropped_sprites: stats.dropped,
        }
    }

    /// Configuration the console was booted with.
    #[must_use]
    pub const fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Number of completed frames.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.vm.frame
    }

    /// The framebuffer after the last completed frame.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        self.vm.framebuffer()
    }

    /// Hash of the current framebuffer.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        self.vm.framebuffer().checksum()
    }

    /// Read-only view of the game API state.
    #[must_use]
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Attach a tilemap payload to `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is new and [`TNUM`](crate::TNUM) tilemaps are
    /// already registered.
    pub fn load_tilemap(&mut self, name: &str, tilemap: Tilemap) -> ConsoleResult<TilemapId> {
        self.vm.tiles.load(name, tilemap)
    }

    /// Table sprite `id` as of the last frame.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` for ids outside `0..SNUM`.
    pub fn sprite(&self, id: SpriteId) -> ConsoleResult<SpriteSlot> {
        self.vm.render.table().get(id).copied()
    }

    /// Attach a font payload to `name`.
    pub fn load_font(&mut self, name: &str, font: Font) -> FontId {
        self.vm.fonts.load(name, font)
    }

    /// Whether `player` is agent-driven.
    #[must_use]
    pub fn pbound(&self, player: PlayerId) -> bool {
        self.vm.broker.pbound(player)
    }
}
