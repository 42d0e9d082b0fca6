//! Helpers for extracting data from instruction words.
//!
//! An instruction is a big-endian 16-bit word made of four nibbles:
//!
//! ```text
//! [o x y n]
//!    [n n]
//!  [n n n]
//! ```

/// Assemble two bytes into a big-endian instruction word.
#[inline(always)]
pub fn word(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

/// Extract opcode class from the first nibble.
#[inline(always)]
pub fn op_code(word: u16) -> u8 {
    ((word & 0xF000) >> 12) as u8
}

/// Extract register operand VX.
#[inline(always)]
pub fn op_x(word: u16) -> u8 {
    ((word & 0x0F00) >> 8) as u8
}

/// Extract register operand VY.
#[inline(always)]
pub fn op_y(word: u16) -> u8 {
    ((word & 0x00F0) >> 4) as u8
}

/// Extract the 4-bit immediate N.
#[inline(always)]
pub fn op_n(word: u16) -> u8 {
    (word & 0x000F) as u8
}

/// Extract the 8-bit immediate NN.
#[inline(always)]
pub fn op_nn(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

/// Extract the 12-bit address NNN.
#[inline(always)]
pub fn op_nnn(word: u16) -> u16 {
    word & 0x0FFF
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fields() {
        let op: u16 = 0xABCD;
        assert_eq!(op_code(op), 0xA);
        assert_eq!(op_x(op), 0xB);
        assert_eq!(op_y(op), 0xC);
        assert_eq!(op_n(op), 0xD);
        assert_eq!(op_nn(op), 0xCD);
        assert_eq!(op_nnn(op), 0xBCD);
    }

    #[test]
    fn test_word_is_big_endian() {
        assert_eq!(word(0xD0, 0x15), 0xD015);
        assert_eq!(word(0x00, 0xEE), 0x00EE);
    }
}
