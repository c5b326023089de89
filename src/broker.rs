//! Player/agent broker.
//!
//! Exactly two slots exist. A human slot reads its buttons from the external
//! snapshot applied at the start of each frame; an agent slot reads the
//! decisions its agent made during the previous frame's tick. Messages posted
//! by the game are held pending and delivered after the game tick, so an
//! agent sees a broadcast in the same frame and the game sees the agent's
//! reaction one frame later.

mod input;
mod message;
mod slot;

pub use input::{
    BDOWN, BLEFT, BRIGHT, BUP, BUTTON_COUNT, ButtonId, Buttons, InputSnapshot, P1, P2, PlayerId,
};
pub use message::StateMessage;
pub use slot::{Binding, PlayerSlot};

use crate::error::{ConsoleError, ConsoleResult, ReferenceKind};

/// Default label of the first slot.
pub const DEFAULT_P1_LABEL: &str = "Player 1";
/// Default label of the second slot.
pub const DEFAULT_P2_LABEL: &str = "Player 2";

/// The two player slots and their message queues.
#[derive(Debug, Clone)]
pub struct Broker {
    slots: [PlayerSlot; 2],
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_P1_LABEL, DEFAULT_P2_LABEL)
    }
}

impl Broker {
    /// Create two human-bound slots.
    #[must_use]
    pub fn new(p1_label: &str, p2_label: &str) -> Self {
        Self {
            slots: [PlayerSlot::new(P1, p1_label), PlayerSlot::new(P2, p2_label)],
        }
    }

    const fn index(player: PlayerId) -> Option<usize> {
        match player {
            P1 => Some(0),
            P2 => Some(1),
            _ => None,
        }
    }

    /// Slot for `player`, or `None` for an unknown id.
    #[must_use]
    pub fn slot(&self, player: PlayerId) -> Option<&PlayerSlot> {
        Self::index(player).map(|i| &self.slots[i])
    }

    pub(crate) fn slot_mut(&mut self, player: PlayerId) -> Option<&mut PlayerSlot> {
        Self::index(player).map(|i| &mut self.slots[i])
    }

    /// Both slots, P1 first.
    #[must_use]
    pub const fn slots(&self) -> &[PlayerSlot; 2] {
        &self.slots
    }

    /// Bind `player` to an agent.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` for an unknown player and
    /// `InvalidArgument` if the slot is already agent-bound.
    pub(crate) fn bind_agent(&mut self, player: PlayerId) -> ConsoleResult<()> {
        let slot = self.slot_mut(player).ok_or(ConsoleError::UnresolvedReference {
            kind: ReferenceKind::Player,
            id: u32::from(player),
        })?;
        if slot.binding() == Binding::Agent {
            return Err(ConsoleError::invalid(
                "player",
                format!("slot {player} is already bound to an agent"),
            ));
        }
        slot.bind_agent();
        tracing::debug!(player, "slot bound to agent");
        Ok(())
    }

    /// Whether `player` is driven by an agent. Unknown ids are unbound.
    #[must_use]
    pub fn pbound(&self, player: PlayerId) -> bool {
        self.slot(player)
            .is_some_and(|s| s.binding() == Binding::Agent)
    }

    /// Label of `player`, or an empty string for an unknown id.
    #[must_use]
    pub fn plabel(&self, player: PlayerId) -> &str {
        self.slot(player).map_or("", PlayerSlot::label)
    }

    /// Whether `button` is held by `player` this frame.
    #[must_use]
    pub fn btn(&self, player: PlayerId, button: ButtonId) -> bool {
        self.slot(player)
            .is_some_and(|s| s.buttons().is_down(button))
    }

    /// Buttons held by both slots right now, P1 first.
    #[must_use]
    pub fn held(&self) -> [Buttons; 2] {
        self.slots.each_ref().map(PlayerSlot::buttons)
    }

    /// Copy human buttons from the external snapshot. Agent slots keep theirs.
    pub(crate) fn apply_input(&mut self, input: &InputSnapshot) {
        for slot in &mut self.slots {
            if slot.binding() == Binding::Human
                && let Some(buttons) = input.get(slot.id())
            {
                slot.set_buttons(buttons);
            }
        }
    }

    /// Queue `message` for every slot, replacing anything pending.
    pub(crate) fn broadcast(&mut self, message: &StateMessage) {
        for slot in &mut self.slots {
            slot.post(message.clone());
        }
    }

    /// Queue `message` for one slot. Unknown players are ignored.
    pub(crate) fn send(&mut self, player: PlayerId, message: StateMessage) {
        if let Some(slot) = self.slot_mut(player) {
            slot.post(message);
        }
    }

    /// Deliver pending messages into each slot's inbox.
    pub(crate) fn deliver(&mut self) {
        for slot in &mut self.slots {
            slot.deliver();
        }
    }
}
