//! Main memory.
//!
//! ```text
//! 0x000-0x04F  unused
//! 0x050-0x09F  builtin font set
//! 0x0A0-0x1FF  unused
//! 0x200-0xFFF  program ROM and work RAM
//! ```
use std::fmt::{self, Write};

use crate::{
    bytecode::word,
    constants::*,
    error::{Chip8Error, Chip8Result},
};

#[rustfmt::skip]
pub const FONTSET: [u8; FONTSET_DATA_LENGTH] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat 4096 byte address space.
///
/// Every access is bounds checked and reports
/// [`Chip8Error::MemoryOutOfBounds`] instead of wrapping.
///
/// Writes made by program instructions go through [`Memory::store`],
/// which also refuses to touch the builtin font set.
pub struct Memory {
    ram: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        let mut ram = Box::new([0; MEM_SIZE]);
        ram[FONTSET_START..FONTSET_START + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
        Self { ram }
    }
}

impl Memory {
    /// Creates zeroed memory with the font set loaded.
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn read_byte(&self, address: usize) -> Chip8Result<u8> {
        self.ram
            .get(address)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfBounds { address })
    }

    #[inline]
    pub fn write_byte(&mut self, address: usize, value: u8) -> Chip8Result<()> {
        match self.ram.get_mut(address) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(Chip8Error::MemoryOutOfBounds { address }),
        }
    }

    /// Read the big-endian word at `address` and `address + 1`.
    #[inline]
    pub fn read_word(&self, address: usize) -> Chip8Result<u16> {
        let hi = self.read_byte(address)?;
        let lo = self.read_byte(address + 1)?;
        Ok(word(hi, lo))
    }

    /// Borrow `len` bytes starting at `address`.
    pub fn read_slice(&self, address: usize, len: usize) -> Chip8Result<&[u8]> {
        self.check_range(address, len)?;
        Ok(&self.ram[address..address + len])
    }

    /// Copy `data` into memory starting at `address`.
    ///
    /// The whole range is checked before any byte is written.
    pub fn write_slice(&mut self, address: usize, data: &[u8]) -> Chip8Result<()> {
        self.check_range(address, data.len())?;
        self.ram[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy register data into memory on behalf of a running program.
    ///
    /// Like [`Memory::write_slice`], but the font set is read-only and
    /// any overlap fails with [`Chip8Error::FontOverwrite`]. Both checks
    /// happen before any byte is written.
    pub fn store(&mut self, address: usize, data: &[u8]) -> Chip8Result<()> {
        self.check_range(address, data.len())?;

        let font_end = FONTSET_START + FONTSET_DATA_LENGTH;
        if !data.is_empty() && address < font_end && address + data.len() > FONTSET_START {
            return Err(Chip8Error::FontOverwrite {
                address: address.max(FONTSET_START),
            });
        }

        self.ram[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy a program into memory at `MEM_START`.
    ///
    /// Fails with [`Chip8Error::ProgramTooLarge`] without touching memory
    /// when the program does not fit.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::program_too_large(bytecode.len()));
        }

        self.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        Ok(())
    }

    /// Address of the builtin glyph for a hexadecimal digit.
    ///
    /// Only the low nibble of `digit` is considered.
    #[inline]
    pub fn font_glyph_address(&self, digit: u8) -> Address {
        (FONTSET_START + (digit & 0xF) as usize * FONTSET_HEIGHT) as Address
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }

    /// Returns a range of memory as human readable instruction words.
    pub fn dump(&self, start: usize, count: usize) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for i in (start..(start + count).min(MEM_SIZE - 1)).step_by(2) {
            writeln!(buf, "{:04X}: {:02X}{:02X}", i, self.ram[i], self.ram[i + 1])?;
        }

        Ok(buf)
    }

    fn check_range(&self, address: usize, len: usize) -> Chip8Result<()> {
        match address.checked_add(len) {
            Some(end) if end <= MEM_SIZE => Ok(()),
            // Report the first byte that falls outside.
            _ => Err(Chip8Error::MemoryOutOfBounds {
                address: address.max(MEM_SIZE),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fontset_loaded() {
        let mem = Memory::new();
        assert_eq!(mem.read_byte(0x050).unwrap(), 0xF0);
        assert_eq!(mem.read_byte(0x09F).unwrap(), 0x80);
        assert_eq!(mem.read_byte(0x04F).unwrap(), 0x00);
        assert_eq!(mem.read_byte(0x0A0).unwrap(), 0x00);
    }

    #[test]
    fn test_font_glyph_address() {
        let mem = Memory::new();
        assert_eq!(mem.font_glyph_address(0x0), 0x050);
        assert_eq!(mem.font_glyph_address(0x1), 0x055);
        assert_eq!(mem.font_glyph_address(0xF), 0x09B);
        assert_eq!(mem.font_glyph_address(0x1A), 0x082);
    }

    #[test]
    fn test_read_word() {
        let mut mem = Memory::new();
        mem.write_byte(0x300, 0x12).unwrap();
        mem.write_byte(0x301, 0x34).unwrap();
        assert_eq!(mem.read_word(0x300).unwrap(), 0x1234);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mem = Memory::new();
        assert_eq!(
            mem.read_byte(0x1000),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
        assert!(mem.read_word(0xFFF).is_err());
        assert!(mem.write_byte(0x1234, 1).is_err());
    }

    #[test]
    fn test_write_slice_is_all_or_nothing() {
        let mut mem = Memory::new();
        assert_eq!(
            mem.write_slice(0xFFE, &[1, 2, 3]),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(mem.read_byte(0xFFE).unwrap(), 0);
        assert_eq!(mem.read_byte(0xFFF).unwrap(), 0);

        mem.write_slice(0xFFD, &[1, 2, 3]).unwrap();
        assert_eq!(mem.read_slice(0xFFD, 3).unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_store_protects_fontset() {
        let mut mem = Memory::new();

        // Ends on the first font byte.
        assert_eq!(
            mem.store(0x04E, &[1, 2, 3]),
            Err(Chip8Error::FontOverwrite { address: 0x050 })
        );
        assert_eq!(
            mem.store(0x09F, &[1]),
            Err(Chip8Error::FontOverwrite { address: 0x09F })
        );
        assert_eq!(mem.read_slice(0x04E, 3).unwrap(), &[0, 0, 0xF0]);
        assert_eq!(mem.read_byte(0x09F).unwrap(), 0x80);

        // Neighbours on either side are writable.
        mem.store(0x04D, &[1, 2, 3]).unwrap();
        mem.store(0x0A0, &[4, 5]).unwrap();
        assert_eq!(mem.read_slice(0x04D, 4).unwrap(), &[1, 2, 3, 0xF0]);
        assert_eq!(mem.read_slice(0x09F, 3).unwrap(), &[0x80, 4, 5]);

        assert_eq!(
            mem.store(0xFFF, &[1, 2]),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        mem.load_program(&[0xA2, 0x00, 0x60, 0x05]).unwrap();
        assert_eq!(mem.read_slice(MEM_START, 4).unwrap(), &[0xA2, 0x00, 0x60, 0x05]);

        // Largest possible program fills memory to the last byte.
        let full = vec![0xAB; MAX_PROGRAM_SIZE];
        mem.load_program(&full).unwrap();
        assert_eq!(mem.read_byte(0xFFF).unwrap(), 0xAB);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut mem = Memory::new();
        let program = vec![0xFF; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            mem.load_program(&program),
            Err(Chip8Error::ProgramTooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max: MAX_PROGRAM_SIZE
            })
        );
        // Nothing was written.
        assert_eq!(mem.read_byte(MEM_START).unwrap(), 0);
    }

    #[test]
    fn test_dump() {
        let mut mem = Memory::new();
        mem.load_program(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(mem.dump(MEM_START, 4).unwrap(), "0200: 00E0\n0202: 1200\n");
    }
}
