//! Player slots.

use serde::{Deserialize, Serialize};

use super::input::{Buttons, PlayerId};
use super::message::StateMessage;

/// Who drives a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Binding {
    /// Buttons come from the external input snapshot.
    #[default]
    Human,
    /// Buttons come from an agent unit's decisions.
    Agent,
}

/// State of one player slot.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    id: PlayerId,
    label: String,
    binding: Binding,
    buttons: Buttons,
    pending: Option<StateMessage>,
    inbox: Option<StateMessage>,
    fresh: bool,
}

impl PlayerSlot {
    pub(crate) fn new(id: PlayerId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            binding: Binding::Human,
            buttons: Buttons::NONE,
            pending: None,
            inbox: None,
            fresh: false,
        }
    }

    /// Slot id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Binding fixed at boot.
    #[must_use]
    pub const fn binding(&self) -> Binding {
        self.binding
    }

    /// Buttons visible to the game this frame.
    #[must_use]
    pub const fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Last message delivered to this slot.
    #[must_use]
    pub const fn inbox(&self) -> Option<&StateMessage> {
        self.inbox.as_ref()
    }

    /// Whether the inbox was filled during the current frame.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub(crate) fn bind_agent(&mut self) {
        self.binding = Binding::Agent;
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut Buttons {
        &mut self.buttons
    }

    pub(crate) fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    pub(crate) fn post(&mut self, message: StateMessage) {
        self.pending = Some(message);
    }

    /// Move the pending message into the inbox.
    pub(crate) fn deliver(&mut self) {
        self.fresh = false;
        if let Some(message) = self.pending.take() {
            self.inbox = Some(message);
            self.fresh = true;
        }
    }
}
