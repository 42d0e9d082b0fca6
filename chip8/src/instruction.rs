//! Decoded instruction representation.
//!
//! Each 16-bit word is parsed once into an [`Instruction`], and the
//! machine dispatches over the enum. Words that match no known operation
//! decode to [`Instruction::Unknown`] rather than failing.
use std::fmt::{self, Formatter};

use crate::{bytecode::*, constants::Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    Jump { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// 3xnn (SE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` equals value `nn`.
    SkipEqByte { vx: u8, nn: u8 },
    /// 4xnn (SNE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` does not equal value `nn`.
    SkipNotEqByte { vx: u8, nn: u8 },
    /// 5xy0 (SE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` equals register `Vy`.
    SkipEq { vx: u8, vy: u8 },
    /// 6xnn (LD Vx, byte)
    LoadByte { vx: u8, nn: u8 },
    /// 7xnn (ADD Vx, byte)
    ///
    /// Add byte to the value in register `Vx`. The carry flag is untouched.
    AddByte { vx: u8, nn: u8 },

    // ------------------------------------------------------------------------
    // Math
    /// 8xy0 (LD Vx, Vy)
    Load { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// Overflow is wrapped. If overflowed, set VF to 1, else 0.
    Add { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    Sub { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx, Vy)
    ///
    /// Shift `Vy` right by one into `Vx`. VF receives the bit shifted out.
    ShiftRight { vx: u8, vy: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    ///
    /// Subtracts `Vx` from `Vy`, and stores the result in `Vx`.
    SubReverse { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx, Vy)
    ///
    /// Shift `Vy` left by one into `Vx`. VF receives the bit shifted out.
    ShiftLeft { vx: u8, vy: u8 },

    /// 9xy0 (SNE Vx, Vy)
    SkipNotEq { vx: u8, vy: u8 },
    /// Annn (LD I, addr)
    ///
    /// Load address into register `I`.
    LoadAddress { address: Address },
    /// Bnnn (JP V0, addr)
    ///
    /// Jump to location `nnn + V0`.
    JumpOffset { address: Address },
    /// Cxnn (RND Vx, byte)
    Random { vx: u8, nn: u8 },
    /// Dxyn (DRW Vx, Vy, nibble)
    ///
    /// Draw an `n` row sprite from memory at `I` to the display buffer.
    Draw { vx: u8, vy: u8, n: u8 },

    // ------------------------------------------------------------------------
    // Keyboard
    /// Ex9E (SKP Vx)
    SkipKey { vx: u8 },
    /// ExA1 (SKNP Vx)
    SkipNotKey { vx: u8 },
    /// Fx0A (LD Vx, K)
    ///
    /// Park the machine until a key is down, then store its value in `Vx`.
    WaitKey { vx: u8 },

    // ------------------------------------------------------------------------
    // Timers and memory
    /// Fx07 (LD Vx, DT)
    LoadDelay { vx: u8 },
    /// Fx15 (LD DT, Vx)
    SetDelay { vx: u8 },
    /// Fx18 (LD ST, Vx)
    SetSound { vx: u8 },
    /// Fx1E (ADD I, Vx)
    AddAddress { vx: u8 },
    /// Fx29 (LD F, Vx)
    LoadFont { vx: u8 },
    /// Fx33 (LD B, Vx)
    StoreBcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    StoreRegisters { vx: u8 },
    /// Fx65 (LD Vx, [I])
    LoadRegisters { vx: u8 },

    /// Word that matches no known operation.
    Unknown(u16),
}

impl Instruction {
    /// Decode an instruction word.
    pub fn decode(word: u16) -> Self {
        use Instruction as I;

        let vx = op_x(word);
        let vy = op_y(word);
        let n = op_n(word);
        let nn = op_nn(word);
        let address = op_nnn(word);

        match op_code(word) {
            0x0 => match word {
                0x00E0 => I::ClearScreen,
                0x00EE => I::Return,
                _ => I::Unknown(word),
            },
            0x1 => I::Jump { address },
            0x2 => I::Call { address },
            0x3 => I::SkipEqByte { vx, nn },
            0x4 => I::SkipNotEqByte { vx, nn },
            0x5 if n == 0 => I::SkipEq { vx, vy },
            0x6 => I::LoadByte { vx, nn },
            0x7 => I::AddByte { vx, nn },
            0x8 => match n {
                0x0 => I::Load { vx, vy },
                0x1 => I::Or { vx, vy },
                0x2 => I::And { vx, vy },
                0x3 => I::Xor { vx, vy },
                0x4 => I::Add { vx, vy },
                0x5 => I::Sub { vx, vy },
                0x6 => I::ShiftRight { vx, vy },
                0x7 => I::SubReverse { vx, vy },
                0xE => I::ShiftLeft { vx, vy },
                _ => I::Unknown(word),
            },
            0x9 if n == 0 => I::SkipNotEq { vx, vy },
            0xA => I::LoadAddress { address },
            0xB => I::JumpOffset { address },
            0xC => I::Random { vx, nn },
            0xD => I::Draw { vx, vy, n },
            0xE => match nn {
                0x9E => I::SkipKey { vx },
                0xA1 => I::SkipNotKey { vx },
                _ => I::Unknown(word),
            },
            0xF => match nn {
                0x07 => I::LoadDelay { vx },
                0x0A => I::WaitKey { vx },
                0x15 => I::SetDelay { vx },
                0x18 => I::SetSound { vx },
                0x1E => I::AddAddress { vx },
                0x29 => I::LoadFont { vx },
                0x33 => I::StoreBcd { vx },
                0x55 => I::StoreRegisters { vx },
                0x65 => I::LoadRegisters { vx },
                _ => I::Unknown(word),
            },
            _ => I::Unknown(word),
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use Instruction as I;

        match *self {
            I::ClearScreen => write!(f, "CLS"),
            I::Return => write!(f, "RET"),
            I::Jump { address } => write!(f, "JP 0x{address:03X}"),
            I::Call { address } => write!(f, "CALL 0x{address:03X}"),
            I::SkipEqByte { vx, nn } => write!(f, "SE v{vx:X}, 0x{nn:02X}"),
            I::SkipNotEqByte { vx, nn } => write!(f, "SNE v{vx:X}, 0x{nn:02X}"),
            I::SkipEq { vx, vy } => write!(f, "SE v{vx:X}, v{vy:X}"),
            I::LoadByte { vx, nn } => write!(f, "LD v{vx:X}, 0x{nn:02X}"),
            I::AddByte { vx, nn } => write!(f, "ADD v{vx:X}, 0x{nn:02X}"),
            // ------
            I::Load { vx, vy } => write!(f, "LD v{vx:X}, v{vy:X}"),
            I::Or { vx, vy } => write!(f, "OR v{vx:X}, v{vy:X}"),
            I::And { vx, vy } => write!(f, "AND v{vx:X}, v{vy:X}"),
            I::Xor { vx, vy } => write!(f, "XOR v{vx:X}, v{vy:X}"),
            I::Add { vx, vy } => write!(f, "ADD v{vx:X}, v{vy:X}"),
            I::Sub { vx, vy } => write!(f, "SUB v{vx:X}, v{vy:X}"),
            I::ShiftRight { vx, vy } => write!(f, "SHR v{vx:X}, v{vy:X}"),
            I::SubReverse { vx, vy } => write!(f, "SUBN v{vx:X}, v{vy:X}"),
            I::ShiftLeft { vx, vy } => write!(f, "SHL v{vx:X}, v{vy:X}"),
            // ------
            I::SkipNotEq { vx, vy } => write!(f, "SNE v{vx:X}, v{vy:X}"),
            I::LoadAddress { address } => write!(f, "LD I, 0x{address:03X}"),
            I::JumpOffset { address } => write!(f, "JP v0, 0x{address:03X}"),
            I::Random { vx, nn } => write!(f, "RND v{vx:X}, 0x{nn:02X}"),
            I::Draw { vx, vy, n } => write!(f, "DRW v{vx:X}, v{vy:X}, {n}"),
            // ------
            I::SkipKey { vx } => write!(f, "SKP v{vx:X}"),
            I::SkipNotKey { vx } => write!(f, "SKNP v{vx:X}"),
            I::WaitKey { vx } => write!(f, "LD v{vx:X}, K"),
            // ------
            I::LoadDelay { vx } => write!(f, "LD v{vx:X}, DT"),
            I::SetDelay { vx } => write!(f, "LD DT, v{vx:X}"),
            I::SetSound { vx } => write!(f, "LD ST, v{vx:X}"),
            I::AddAddress { vx } => write!(f, "ADD I, v{vx:X}"),
            I::LoadFont { vx } => write!(f, "LD F, v{vx:X}"),
            I::StoreBcd { vx } => write!(f, "LD B, v{vx:X}"),
            I::StoreRegisters { vx } => write!(f, "LD [I], v{vx:X}"),
            I::LoadRegisters { vx } => write!(f, "LD v{vx:X}, [I]"),

            I::Unknown(word) => write!(f, "0x{word:04X}"),
        }
    }
}
