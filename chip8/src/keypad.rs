//! Hexadecimal keypad input.
use crate::constants::KEY_COUNT;

/// One of the 16 hexadecimal keys, `0x0` to `0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum KeyCode {
    Key0, Key1, Key2, Key3,
    Key4, Key5, Key6, Key7,
    Key8, Key9, KeyA, KeyB,
    KeyC, KeyD, KeyE, KeyF,
}

impl KeyCode {
    /// Every key, indexed by its value.
    #[rustfmt::skip]
    pub const ALL: [KeyCode; KEY_COUNT as usize] = [
        Self::Key0, Self::Key1, Self::Key2, Self::Key3,
        Self::Key4, Self::Key5, Self::Key6, Self::Key7,
        Self::Key8, Self::Key9, Self::KeyA, Self::KeyB,
        Self::KeyC, Self::KeyD, Self::KeyE, Self::KeyF,
    ];

    #[inline(always)]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "k{:x}", self.as_u8())
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(key_id as usize)
            .copied()
            .ok_or(InvalidKeyCode(key_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyCode(pub u8);

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < 16, got {}", self.0)
    }
}

/// Current level of the 16 keys. Pressed is a 1 bit, released is a 0 bit.
///
/// There is no queue or debouncing; only the current state matters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad(u16);

impl Keypad {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.0 |= 1 << key.as_u8();
        } else {
            self.0 &= !(1 << key.as_u8());
        }
    }

    /// Keys outside of 0x0-0xF are never pressed.
    #[inline]
    pub fn is_pressed(&self, key_id: u8) -> bool {
        key_id < KEY_COUNT && self.0 & (1 << key_id) != 0
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any(&self) -> bool {
        self.0 != 0
    }

    /// Lowest key that is pressed down.
    #[inline]
    pub fn first_pressed(&self) -> Option<u8> {
        if self.any() {
            Some(self.0.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Set all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[inline(always)]
    pub fn bits(&self) -> u16 {
        self.0
    }
}

#[cfg(feature = "serde")]
mod de {
    use std::fmt::Display;

    use serde::de::{Deserialize, Error, Expected, Unexpected, Visitor};

    use super::*;

    impl Expected for InvalidKeyCode {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            <Self as Display>::fmt(self, f)
        }
    }

    impl<'de> Deserialize<'de> for KeyCode {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            // YAML integer type
            deserializer.deserialize_i64(KeyCodeVisitor)
        }
    }

    struct KeyCodeVisitor;

    impl<'de> Visitor<'de> for KeyCodeVisitor {
        type Value = KeyCode;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an integer key between 0 and 15")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            let key_id = u8::try_from(v)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;
            KeyCode::try_from(key_id)
                .map_err(|err| E::invalid_value(Unexpected::Unsigned(v), &err))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            u64::try_from(v)
                .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
                .and_then(|v| self.visit_u64(v))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keypad = Keypad::default();

        keypad.set(KeyCode::Key0, true);
        assert_eq!(keypad.bits(), 0b00000000_00000001);
        assert!(keypad.is_pressed(0));
        assert!(!keypad.is_pressed(1));
        assert!(!keypad.is_pressed(7));

        keypad.set(KeyCode::Key7, true);
        assert_eq!(keypad.bits(), 0b00000000_10000001);
        assert!(keypad.is_pressed(0));
        assert!(keypad.is_pressed(7));

        keypad.set(KeyCode::Key0, false);
        assert_eq!(keypad.bits(), 0b00000000_10000000);
        assert!(!keypad.is_pressed(0));
        assert!(keypad.is_pressed(7));

        keypad.set(KeyCode::KeyF, true);
        assert_eq!(keypad.bits(), 0b10000000_10000000);
        assert!(keypad.is_pressed(15));
        assert!(!keypad.is_pressed(16));
    }

    #[test]
    fn test_first_pressed() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_pressed(), None);

        keypad.set(KeyCode::KeyC, true);
        keypad.set(KeyCode::Key3, true);
        assert_eq!(keypad.first_pressed(), Some(3));

        keypad.clear();
        assert!(!keypad.any());
    }

    #[test]
    fn test_keycode_conversion() {
        assert_eq!(KeyCode::try_from(0xA), Ok(KeyCode::KeyA));
        assert_eq!(KeyCode::try_from(16), Err(InvalidKeyCode(16)));
        assert_eq!(u8::from(KeyCode::KeyF), 15);
        assert_eq!(KeyCode::KeyB.to_string(), "kb");

        for (i, key) in KeyCode::ALL.iter().enumerate() {
            assert_eq!(key.as_u8() as usize, i);
            assert_eq!(KeyCode::try_from(i as u8), Ok(*key));
        }
    }
}
