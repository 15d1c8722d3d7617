//! Status LEDs.
//!
//! The layer LED on the controller and the space-bar LED behind the expander
//! together show which layer is on top. A third LED on the controller is a
//! "ready" light that goes dark while caps lock is engaged.

/// One bit per keymap layer, bit `n` set means layer `n` is active.
pub type LayerState = u32;

#[inline]
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub const fn highest_layer(state: LayerState) -> u8 {
    if state == 0 {
        0
    } else {
        (LayerState::BITS - 1 - state.leading_zeros()) as u8
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LayerIndicators {
    pub local: bool,
    pub expander: bool,
}

#[must_use]
pub const fn layer_indicators(highest_layer: u8) -> LayerIndicators {
    match highest_layer {
        0 => LayerIndicators {
            local: true,
            expander: false,
        },
        1 => LayerIndicators {
            local: false,
            expander: false,
        },
        2 => LayerIndicators {
            local: true,
            expander: true,
        },
        _ => LayerIndicators {
            local: false,
            expander: true,
        },
    }
}

/// Pin level for the ready LED.
#[inline]
#[must_use]
pub const fn ready_indicator(caps_lock: bool) -> bool {
    !caps_lock
}

/// Host lock LED state, caps lock is the one the board shows.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LedState(u8);

impl LedState {
    const CAPS_LOCK: u8 = 0b0000_0010;

    #[inline]
    #[must_use]
    pub const fn with_caps_lock(self, on: bool) -> Self {
        if on {
            Self(self.0 | Self::CAPS_LOCK)
        } else {
            Self(self.0 & !Self::CAPS_LOCK)
        }
    }

    #[inline]
    #[must_use]
    pub const fn caps_lock(self) -> bool {
        self.0 & Self::CAPS_LOCK != 0
    }
}

/// Keymap-level hooks, run after (layers) or before (locks) the board's own.
pub trait UserHooks {
    fn layer_state_set_user(&mut self, state: LayerState) -> LayerState {
        state
    }

    /// Returning `false` keeps the board from touching its lock LED.
    fn led_update_user(&mut self, _leds: LedState) -> bool {
        true
    }
}

pub struct NoUserHooks;

impl UserHooks for NoUserHooks {}
