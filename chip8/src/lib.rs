//! Chip-8 virtual machine core.
//!
//! The [`Machine`](prelude::Machine) interprets the base instruction set one
//! instruction per [`step`](prelude::Machine::step). Pacing, rendering, sound
//! and host input mapping are left to the driver.
mod bytecode;
pub mod constants;
mod display;
mod error;
mod instruction;
mod keypad;
mod memory;
mod stack;
mod timer;
mod trace;
mod vm;

pub use self::{
    display::Display,
    error::{Chip8Error, Chip8Result},
    instruction::Instruction,
    keypad::{InvalidKeyCode, KeyCode, Keypad},
    memory::{Memory, FONTSET},
    stack::CallStack,
    timer::Timer,
    trace::{LogTracer, TraceRecord, Tracer},
};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        error::{Chip8Error, Chip8Result},
        instruction::Instruction,
        keypad::KeyCode,
        vm::{Flow, Machine, MachineConf},
    };
}
