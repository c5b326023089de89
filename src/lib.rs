// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Moroxel: a deterministic 128×128 fantasy console runtime.
//!
//! A console instance hosts one game unit and up to two agent units, each
//! ticked once per frame:
//! - Indexed-color framebuffer with camera, tilemap, sprite and text drawing
//! - "Next object" stagers that configure a sprite or text before drawing it
//! - Two player slots, driven by a human input snapshot or by an agent
//! - Game-to-agent state broadcasts with one frame of latency
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Console (frame scheduler, replay)  │
//! ├──────────────────┬──────────────────┤
//! │   Vm (game API)  │ AgentVm (agents) │
//! ├──────────────────┼──────────────────┤
//! │ Render │ Stores  │      Broker      │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use moroxel::{ConsoleBuilder, ConsoleConfig, Game, InputSnapshot, Vm};
//!
//! struct Flash;
//!
//! impl Game for Flash {
//!     fn tick(&mut self, vm: &mut Vm, _delta_time: f64) {
//!         let color = u8::try_from(vm.frame() % 16).unwrap_or(0);
//!         let _ = vm.clear(Some(color));
//!     }
//! }
//!
//! let mut console = ConsoleBuilder::new(ConsoleConfig::default())
//!     .boot(|_| Box::new(Flash))?;
//! console.frame(1.0 / 60.0, &InputSnapshot::default());
//! console.frame(1.0 / 60.0, &InputSnapshot::default());
//! assert_eq!(console.framebuffer().get(0, 0), Some(1));
//! # Ok::<(), moroxel::ConsoleError>(())
//! ```

pub mod broker;
pub mod console;
pub mod demo;
pub mod error;
pub mod math;
pub mod render;
pub mod replay;
pub mod store;

pub use error::{ConsoleError, ConsoleResult, ReferenceKind};

// Re-export the console surface at crate root for convenience
pub use broker::{
    BDOWN, BLEFT, BRIGHT, BUP, Binding, ButtonId, Buttons, InputSnapshot, P1, P2, PlayerId,
    StateMessage,
};
pub use console::{
    Agent, AgentVm, Console, ConsoleBuilder, ConsoleConfig, FrameReport, Game, Vm,
};
pub use render::{
    Align, Color, DrawMode, Framebuffer, PALETTE, PALETTE_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, SNUM,
    SpriteId, SpriteSlot,
};
pub use store::{Atlas, Font, FontId, TILE_MODES, TNUM, TileMode, Tilemap, TilemapId};
