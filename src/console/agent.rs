//! The agent-facing console API.

use std::fmt::Display;

use crate::broker::{Broker, ButtonId, Buttons, P1, P2, PlayerId, PlayerSlot, StateMessage};

/// What an agent unit can reach: its own slot's buttons and inbox, and
/// read-only views of the other slot. Agents cannot draw.
///
/// The other slot's buttons are the ones the game read this frame, captured
/// before any agent ticked. With two agents, P2 therefore never sees what P1
/// decided earlier in the same frame.
#[derive(Debug)]
pub struct AgentVm<'a> {
    broker: &'a mut Broker,
    me: PlayerId,
    frame: u64,
    seen: [Buttons; 2],
}

impl<'a> AgentVm<'a> {
    pub(crate) fn new(broker: &'a mut Broker, me: PlayerId, frame: u64, seen: [Buttons; 2]) -> Self {
        Self {
            broker,
            me,
            frame,
            seen,
        }
    }

    /// The slot this agent drives.
    #[must_use]
    pub const fn me(&self) -> PlayerId {
        self.me
    }

    /// Index of the frame being produced.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether this agent currently holds `button`.
    #[must_use]
    pub fn btn(&self, button: ButtonId) -> bool {
        self.broker.btn(self.me, button)
    }

    /// Whether `player` holds `button`.
    ///
    /// For this agent's own slot this is [`AgentVm::btn`]. For the other slot
    /// it is the state the game read this frame.
    #[must_use]
    pub fn btn_of(&self, player: PlayerId, button: ButtonId) -> bool {
        if player == self.me {
            return self.btn(button);
        }
        match player {
            P1 => self.seen[0].is_down(button),
            P2 => self.seen[1].is_down(button),
            _ => false,
        }
    }

    /// Hold `button` until the end of the next game tick.
    pub fn press(&mut self, button: ButtonId) {
        if let Some(slot) = self.broker.slot_mut(self.me) {
            slot.buttons_mut().press(button);
        }
    }

    /// Stop holding `button`.
    pub fn release(&mut self, button: ButtonId) {
        if let Some(slot) = self.broker.slot_mut(self.me) {
            slot.buttons_mut().release(button);
        }
    }

    /// Replace all held buttons at once.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        if let Some(slot) = self.broker.slot_mut(self.me) {
            slot.set_buttons(buttons);
        }
    }

    /// Whether `player` is agent-driven.
    #[must_use]
    pub fn pbound(&self, player: PlayerId) -> bool {
        self.broker.pbound(player)
    }

    /// Label of `player`.
    #[must_use]
    pub fn plabel(&self, player: PlayerId) -> &str {
        self.broker.plabel(player)
    }

    /// Most recent message delivered to this slot.
    #[must_use]
    pub fn state(&self) -> Option<&StateMessage> {
        self.broker.slot(self.me).and_then(PlayerSlot::inbox)
    }

    /// Whether [`AgentVm::state`] arrived during this frame.
    #[must_use]
    pub fn state_is_fresh(&self) -> bool {
        self.broker.slot(self.me).is_some_and(PlayerSlot::is_fresh)
    }

    /// Write a line to the host log.
    pub fn print(&self, message: impl Display) {
        tracing::info!(frame = self.frame, player = self.me, unit = "agent", "{message}");
    }
}
