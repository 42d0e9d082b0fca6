//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::constants::{Address, MAX_PROGRAM_SIZE};

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    /// `RET` executed while the call stack was empty.
    ///
    /// Carries the address of the offending instruction.
    StackUnderflow { address: Address },
    /// Attempt to load a bytecode program that can't fit in memory.
    ProgramTooLarge { size: usize, max: usize },
    /// Key event for a key outside of 0x0-0xF.
    InvalidKeyIndex(u8),
    /// Instruction did not decode to any known operation.
    ///
    /// The machine treats these as no-ops; drivers may choose
    /// to escalate them into this error.
    UnimplementedOpcode { address: Address, opcode: u16 },
    /// Memory access outside of the 4096 byte address space.
    MemoryOutOfBounds { address: usize },
    /// Instruction tried to write over the builtin font set.
    ///
    /// Carries the first font address that would have been overwritten.
    FontOverwrite { address: usize },
}

impl Chip8Error {
    pub(crate) fn program_too_large(size: usize) -> Self {
        Self::ProgramTooLarge {
            size,
            max: MAX_PROGRAM_SIZE,
        }
    }

    /// Whether the error halts the machine.
    ///
    /// Fatal errors stem from a malformed program, while the others
    /// are rejected calls that leave the machine untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StackUnderflow { .. }
                | Self::MemoryOutOfBounds { .. }
                | Self::FontOverwrite { .. }
        )
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackUnderflow { address } => {
                write!(f, "call stack underflow: RET at 0x{address:03X} with empty stack")
            }
            Self::ProgramTooLarge { size, max } => {
                write!(f, "program too large for VM memory: {size} bytes, max is {max}")
            }
            Self::InvalidKeyIndex(key) => {
                write!(f, "invalid key index {key}, must be in range 0 <= key < 16")
            }
            Self::UnimplementedOpcode { address, opcode } => {
                write!(f, "unimplemented opcode {opcode:04X} at 0x{address:03X}")
            }
            Self::MemoryOutOfBounds { address } => {
                write!(f, "memory access out of bounds at 0x{address:04X}")
            }
            Self::FontOverwrite { address } => {
                write!(f, "write to read-only font set at 0x{address:03X}")
            }
        }
    }
}

impl std::error::Error for Chip8Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(Chip8Error::StackUnderflow { address: 0x200 }.is_fatal());
        assert!(Chip8Error::MemoryOutOfBounds { address: 0x1000 }.is_fatal());
        assert!(Chip8Error::FontOverwrite { address: 0x050 }.is_fatal());
        assert!(!Chip8Error::InvalidKeyIndex(16).is_fatal());
        assert!(!Chip8Error::program_too_large(4000).is_fatal());
    }

    #[test]
    fn test_error_message() {
        let err = Chip8Error::UnimplementedOpcode {
            address: 0x204,
            opcode: 0xF0FF,
        };
        assert_eq!(err.to_string(), "unimplemented opcode F0FF at 0x204");
    }
}
