//! Constant values of the Chip-8 architecture.

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 0x10; // 16

/// Register VF doubles as the carry, borrow, shift-out and collision flag.
pub const FLAG_REGISTER: usize = 0xF;

/// The lower memory space was historically used for the interpreter itself,
/// but is now used for fonts.
pub const MEM_START: usize = 0x200; // 512
pub const MEM_SIZE: usize = 0x1000; // 4096

/// Largest program that fits between `MEM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - MEM_START; // 3584

/// Builtin hexadecimal font glyphs live at 0x050-0x09F.
pub const FONTSET_START: usize = 0x050;
/// Each glyph is 8 pixels wide and 5 rows high.
pub const FONTSET_HEIGHT: usize = 5;
pub const FONTSET_GLYPH_COUNT: usize = 16;
pub const FONTSET_DATA_LENGTH: usize = FONTSET_HEIGHT * FONTSET_GLYPH_COUNT; // 80

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Sprites are always one byte wide.
pub const SPRITE_WIDTH: usize = 8;

/// Number of clock cycles in a second that delay timers count down.
///
/// The machine itself never paces; this is the cadence a driver
/// is expected to call `step()` at.
pub const DELAY_FREQUENCY: u64 = 60;

/// Number of nanoseconds in a second
#[doc(hidden)]
pub const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Number of keys on the keyboard (0x0-0xF)
pub const KEY_COUNT: u8 = 16;

/// Type for storing the 12-bit memory addresses.
pub type Address = u16;
