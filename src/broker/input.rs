//! Player and button identifiers and per-player button state.

use serde::{Deserialize, Serialize};

/// Identifier of a player slot.
pub type PlayerId = u8;

/// Identifier of a button.
pub type ButtonId = u8;

/// First player slot.
pub const P1: PlayerId = 1;
/// Second player slot.
pub const P2: PlayerId = 2;

/// Left direction button.
pub const BLEFT: ButtonId = 0;
/// Right direction button.
pub const BRIGHT: ButtonId = 1;
/// Up direction button.
pub const BUP: ButtonId = 2;
/// Down direction button.
pub const BDOWN: ButtonId = 3;

/// Number of buttons per player.
pub const BUTTON_COUNT: u8 = 4;

/// Held buttons of one player, one bit per [`ButtonId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buttons(u8);

impl Buttons {
    /// No button held.
    pub const NONE: Self = Self(0);

    /// Build from a list of held buttons. Unknown ids are ignored.
    #[must_use]
    pub fn of(held: &[ButtonId]) -> Self {
        let mut buttons = Self::NONE;
        for &b in held {
            buttons.press(b);
        }
        buttons
    }

    /// Whether `button` is held. Unknown ids are never held.
    #[must_use]
    pub const fn is_down(self, button: ButtonId) -> bool {
        button < BUTTON_COUNT && self.0 & (1 << button) != 0
    }

    /// Mark `button` held. Unknown ids are ignored.
    pub fn press(&mut self, button: ButtonId) {
        if button < BUTTON_COUNT {
            self.0 |= 1 << button;
        }
    }

    /// Mark `button` released.
    pub fn release(&mut self, button: ButtonId) {
        if button < BUTTON_COUNT {
            self.0 &= !(1 << button);
        }
    }

    /// Whether nothing is held.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// External button state for both players at the start of a frame.
///
/// Only read for human-bound slots; agent slots ignore their half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Buttons held by the first player.
    pub p1: Buttons,
    /// Buttons held by the second player.
    pub p2: Buttons,
}

impl InputSnapshot {
    /// Snapshot with only the first player's buttons held.
    #[must_use]
    pub const fn p1(buttons: Buttons) -> Self {
        Self {
            p1: buttons,
            p2: Buttons::NONE,
        }
    }

    /// Buttons for `player`, or `None` for an unknown id.
    #[must_use]
    pub const fn get(&self, player: PlayerId) -> Option<Buttons> {
        match player {
            P1 => Some(self.p1),
            P2 => Some(self.p2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_bits() {
        let mut b = Buttons::of(&[BLEFT, BDOWN, 9]);
        assert!(b.is_down(BLEFT));
        assert!(b.is_down(BDOWN));
        assert!(!b.is_down(BUP));
        assert!(!b.is_down(9));
        b.release(BLEFT);
        assert!(!b.is_down(BLEFT));
        b.release(BDOWN);
        assert!(b.is_empty());
    }

    #[test]
    fn test_snapshot_lookup() {
        let snap = InputSnapshot::p1(Buttons::of(&[BUP]));
        assert_eq!(snap.get(P1), Some(Buttons::of(&[BUP])));
        assert_eq!(snap.get(P2), Some(Buttons::NONE));
        assert_eq!(snap.get(0), None);
        assert_eq!(snap.get(3), None);
    }
}
