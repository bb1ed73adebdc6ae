use serde::{Deserialize, Serialize};

macro_rules! device_keys {
    ($($name:ident),+ $(,)?) => {
        /// Addressable light zones. The discriminants are dense so a key can
        /// index straight into per-key arrays.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[allow(non_camel_case_types)]
        #[repr(u16)]
        pub enum DeviceKey {
            $($name),+
        }

        impl DeviceKey {
            /// Every key in index order.
            pub const ALL: &'static [DeviceKey] = &[$(DeviceKey::$name),+];

            /// Number of keys, i.e. the length of any dense per-key array.
            pub const COUNT: usize = Self::ALL.len();

            pub fn name(self) -> &'static str {
                match self {
                    $(DeviceKey::$name => stringify!($name)),+
                }
            }
        }
    };
}

device_keys! {
    ESC, F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    PRINT_SCREEN, SCROLL_LOCK, PAUSE_BREAK,
    TILDE, ONE, TWO, THREE, FOUR, FIVE, SIX, SEVEN, EIGHT, NINE, ZERO,
    MINUS, EQUALS, BACKSPACE, INSERT, HOME, PAGE_UP,
    NUM_LOCK, NUM_SLASH, NUM_ASTERISK, NUM_MINUS,
    TAB, Q, W, E, R, T, Y, U, I, O, P, OPEN_BRACKET, CLOSE_BRACKET, BACKSLASH,
    DELETE, END, PAGE_DOWN, NUM_SEVEN, NUM_EIGHT, NUM_NINE, NUM_PLUS,
    CAPS_LOCK, A, S, D, F, G, H, J, K, L, SEMICOLON, APOSTROPHE, ENTER,
    NUM_FOUR, NUM_FIVE, NUM_SIX,
    LEFT_SHIFT, Z, X, C, V, B, N, M, COMMA, PERIOD, FORWARD_SLASH, RIGHT_SHIFT,
    ARROW_UP, NUM_ONE, NUM_TWO, NUM_THREE, NUM_ENTER,
    LEFT_CONTROL, LEFT_WINDOWS, LEFT_ALT, SPACE, RIGHT_ALT, FN_KEY, APPLICATION_SELECT,
    RIGHT_CONTROL, ARROW_LEFT, ARROW_DOWN, ARROW_RIGHT, NUM_ZERO, NUM_PERIOD,
    LOGO, LOGO2, LOGO3,
    PERIPHERAL, PERIPHERAL_LOGO, PERIPHERAL_SCROLL_WHEEL, PERIPHERAL_FRONT_LIGHT,
    PERIPHERAL_LIGHT1, PERIPHERAL_LIGHT2, PERIPHERAL_LIGHT3, PERIPHERAL_LIGHT4,
    PERIPHERAL_LIGHT5, PERIPHERAL_LIGHT6,
    MOUSEPAD_LIGHT1, MOUSEPAD_LIGHT2, MOUSEPAD_LIGHT3, MOUSEPAD_LIGHT4, MOUSEPAD_LIGHT5,
    HEADSET_LEFT, HEADSET_RIGHT,
}

/// Keys belonging to peripherals rather than the main keyboard; the
/// compositor darkens these with the peripheral brightness factor.
pub const PERIPHERAL_KEYS: &[DeviceKey] = &[
    DeviceKey::PERIPHERAL,
    DeviceKey::PERIPHERAL_LOGO,
    DeviceKey::PERIPHERAL_SCROLL_WHEEL,
    DeviceKey::PERIPHERAL_FRONT_LIGHT,
    DeviceKey::PERIPHERAL_LIGHT1,
    DeviceKey::PERIPHERAL_LIGHT2,
    DeviceKey::PERIPHERAL_LIGHT3,
    DeviceKey::PERIPHERAL_LIGHT4,
    DeviceKey::PERIPHERAL_LIGHT5,
    DeviceKey::PERIPHERAL_LIGHT6,
    DeviceKey::MOUSEPAD_LIGHT1,
    DeviceKey::MOUSEPAD_LIGHT2,
    DeviceKey::MOUSEPAD_LIGHT3,
    DeviceKey::MOUSEPAD_LIGHT4,
    DeviceKey::MOUSEPAD_LIGHT5,
    DeviceKey::HEADSET_LEFT,
    DeviceKey::HEADSET_RIGHT,
];

impl DeviceKey {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key at `index`; `None` plays the role of the "no key" sentinel.
    pub fn from_index(index: usize) -> Option<DeviceKey> {
        Self::ALL.get(index).copied()
    }

    pub fn is_peripheral(self) -> bool {
        PERIPHERAL_KEYS.contains(&self)
    }
}
