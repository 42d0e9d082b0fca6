//! Per-instruction tracing.
//!
//! A [`Tracer`] installed on the machine receives a [`TraceRecord`] after
//! every executed instruction. Without a tracer no record is built.
use std::fmt;

use crate::{
    constants::{Address, REGISTER_COUNT},
    instruction::Instruction,
};

/// Machine state captured after an instruction executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Address the instruction was fetched from.
    pub address: Address,
    /// Raw instruction word.
    pub opcode: u16,
    pub instruction: Instruction,
    /// Program counter after execution.
    pub pc: Address,
    /// Index register after execution.
    pub index: Address,
    pub registers: [u8; REGISTER_COUNT],
    pub delay: u8,
    pub sound: u8,
    pub call_depth: usize,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.instruction.to_string();
        write!(
            f,
            "{:04X}: {:04X} {:<18} pc={:04X} i={:04X} dt={:02X} st={:02X} sp={} v=",
            self.address,
            self.opcode,
            mnemonic,
            self.pc,
            self.index,
            self.delay,
            self.sound,
            self.call_depth,
        )?;
        for v in &self.registers {
            write!(f, "{v:02X}")?;
        }
        Ok(())
    }
}

/// Sink for instruction trace records.
pub trait Tracer: Send {
    fn trace(&mut self, record: &TraceRecord);
}

impl<F> Tracer for F
where
    F: FnMut(&TraceRecord) + Send,
{
    fn trace(&mut self, record: &TraceRecord) {
        self(record)
    }
}

/// Forwards trace records to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&mut self, record: &TraceRecord) {
        log::trace!(target: "chip8::trace", "{record}");
    }
}
