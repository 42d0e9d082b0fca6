//! Virtual machine.
use rand::prelude::*;

use crate::{
    constants::*,
    display::Display,
    error::{Chip8Error, Chip8Result},
    instruction::Instruction,
    keypad::{KeyCode, Keypad},
    memory::Memory,
    stack::CallStack,
    timer::Timer,
    trace::{LogTracer, TraceRecord, Tracer},
};

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
pub struct MachineConf {
    /// Forward a trace record of every executed instruction to the log.
    pub trace: bool,
    /// Seed for the random number generator used by `RND`.
    ///
    /// When `None` the generator is seeded from system entropy.
    pub seed: Option<u64>,
}

/// Outcome of a single step, for the driver to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer was modified.
    Draw,
    /// The sound timer was set.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which parks
    /// the machine until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
    /// The instruction word decoded to no known operation and was skipped.
    Unimplemented(u16),
}

/// Chip-8 machine.
///
/// Owns the memory, display, call stack, timers, keypad and registers. All
/// mutation goes through [`Machine::load_program`], the key events and
/// [`Machine::step`].
pub struct Machine {
    memory: Memory,
    display: Display,
    stack: CallStack,
    /// (DT) Delay timer that counts down to 0.
    delay: Timer,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    sound: Timer,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address.
    index: Address,
    /// Program counter pointing to the next instruction.
    pc: Address,
    keypad: Keypad,
    /// Register that will receive the next key press, when parked on `Fx0A`.
    awaiting_key: Option<u8>,
    /// Fatal error that halted the machine.
    fault: Option<Chip8Error>,
    rng: StdRng,
    tracer: Option<Box<dyn Tracer>>,
    conf: MachineConf,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConf::default())
    }
}

impl Machine {
    pub fn new(conf: MachineConf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tracer: Option<Box<dyn Tracer>> = if conf.trace {
            Some(Box::new(LogTracer))
        } else {
            None
        };

        Machine {
            memory: Memory::new(),
            display: Display::new(),
            stack: CallStack::new(),
            delay: Timer::new(),
            sound: Timer::new(),
            registers: [0; REGISTER_COUNT],
            index: 0,
            pc: MEM_START as Address,
            keypad: Keypad::new(),
            awaiting_key: None,
            fault: None,
            rng,
            tracer,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &MachineConf {
        &self.conf
    }

    /// Copy the program into memory at `0x200`.
    ///
    /// Registers, program counter, stack and timers are left as they are.
    /// To start over with a new program, create a new machine.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        self.memory.load_program(bytecode)?;
        log::debug!("loaded program of {} bytes", bytecode.len());
        Ok(())
    }

    /// Install a sink that receives a record for every executed instruction.
    pub fn set_tracer(&mut self, tracer: impl Tracer + 'static) {
        self.tracer = Some(Box::new(tracer));
    }

    pub fn clear_tracer(&mut self) {
        self.tracer = None;
    }
}

/// Keyboard input
impl Machine {
    pub fn key_down(&mut self, key_id: u8) -> Chip8Result<()> {
        let key = Self::key_code(key_id)?;
        self.set_key(key, true);
        Ok(())
    }

    pub fn key_up(&mut self, key_id: u8) -> Chip8Result<()> {
        let key = Self::key_code(key_id)?;
        self.set_key(key, false);
        Ok(())
    }

    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.keypad.clear()
    }

    fn key_code(key_id: u8) -> Chip8Result<KeyCode> {
        KeyCode::try_from(key_id).map_err(|_| Chip8Error::InvalidKeyIndex(key_id))
    }
}

/// State inspection
impl Machine {
    /// Read-only view of the framebuffer for rendering.
    pub fn display_snapshot(&self) -> &Display {
        &self.display
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn index(&self) -> Address {
        self.index
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn register(&self, vx: u8) -> u8 {
        self.registers[vx as usize & 0xF]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound.get()
    }

    /// Whether the buzzer should be sounding.
    pub fn is_sound_active(&self) -> bool {
        self.sound.is_active()
    }

    pub fn call_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Register parked on `Fx0A`, waiting for a key press.
    pub fn awaiting_key(&self) -> Option<u8> {
        self.awaiting_key
    }

    /// Fatal error that halted the machine, if any.
    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }
}

/// Interpreter
impl Machine {
    /// Run a single fetch, decode, execute and timer tick cycle.
    ///
    /// Fatal errors halt the machine. The program counter is left on the
    /// faulting instruction and every following call returns the same error.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }

        if let Some(vx) = self.awaiting_key {
            let flow = self.resume_key_wait(vx);
            self.tick_timers();
            return Ok(flow);
        }

        let address = self.pc;

        let opcode = match self.fetch() {
            Ok(opcode) => opcode,
            Err(err) => return Err(self.halt(address, err)),
        };
        let instr = Instruction::decode(opcode);

        match self.execute(address, instr) {
            Ok(flow) => {
                self.emit_trace(address, opcode, instr);
                self.tick_timers();
                Ok(flow)
            }
            Err(err) => Err(self.halt(address, err)),
        }
    }

    /// Step the machine `step_count` times, returning the last flow.
    ///
    /// Stops at the first error.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;
        for _ in 0..step_count {
            flow = self.step()?;
        }
        Ok(flow)
    }

    /// Read the instruction at the program counter and advance past it.
    #[inline(always)]
    fn fetch(&mut self) -> Chip8Result<u16> {
        let opcode = self.memory.read_word(self.pc as usize)?;
        self.pc = self.pc.wrapping_add(2);
        Ok(opcode)
    }

    #[inline(always)]
    fn tick_timers(&mut self) {
        self.delay.tick();
        self.sound.tick();
    }

    #[inline(always)]
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn halt(&mut self, address: Address, err: Chip8Error) -> Chip8Error {
        log::error!("machine halted at 0x{address:03X}: {err}");
        self.pc = address;
        self.fault = Some(err.clone());
        err
    }

    fn resume_key_wait(&mut self, vx: u8) -> Flow {
        match self.keypad.first_pressed() {
            Some(key) => {
                let address = self.pc;
                self.registers[vx as usize] = key;
                self.awaiting_key = None;
                self.pc = self.pc.wrapping_add(2);

                let opcode = 0xF00A | ((vx as u16) << 8);
                self.emit_trace(address, opcode, Instruction::WaitKey { vx });
                Flow::Ok
            }
            None => Flow::KeyWait,
        }
    }

    fn emit_trace(&mut self, address: Address, opcode: u16, instruction: Instruction) {
        if let Some(tracer) = self.tracer.as_mut() {
            let record = TraceRecord {
                address,
                opcode,
                instruction,
                pc: self.pc,
                index: self.index,
                registers: self.registers,
                delay: self.delay.get(),
                sound: self.sound.get(),
                call_depth: self.stack.len(),
            };
            tracer.trace(&record);
        }
    }

    /// Execute a decoded instruction.
    ///
    /// The program counter already points past the instruction.
    fn execute(&mut self, address: Address, instr: Instruction) -> Chip8Result<Flow> {
        use Instruction as I;

        let mut control_flow = Flow::Ok;

        match instr {
            // 00E0 (CLS)
            I::ClearScreen => {
                self.display.clear();
                control_flow = Flow::Draw;
            }
            // 00EE (RET)
            //
            // Return from a subroutine.
            // Set the program counter to the value at the top of the stack.
            I::Return => {
                self.pc = self.stack.pop(address)?;
                control_flow = Flow::Jump;
            }
            // 1NNN (JP addr)
            I::Jump { address } => {
                self.pc = address;
                control_flow = Flow::Jump;
            }
            // 2NNN (CALL addr)
            //
            // The return address is the instruction after the call.
            I::Call { address } => {
                self.stack.push(self.pc);
                self.pc = address;
                control_flow = Flow::Jump;
            }
            // 3XNN (SE Vx, byte)
            I::SkipEqByte { vx, nn } => self.skip_if(self.registers[vx as usize] == nn),
            // 4XNN (SNE Vx, byte)
            I::SkipNotEqByte { vx, nn } => self.skip_if(self.registers[vx as usize] != nn),
            // 5XY0 (SE Vx, Vy)
            I::SkipEq { vx, vy } => {
                self.skip_if(self.registers[vx as usize] == self.registers[vy as usize])
            }
            // 6XNN (LD Vx, byte)
            I::LoadByte { vx, nn } => self.registers[vx as usize] = nn,
            // 7XNN (ADD Vx, byte)
            //
            // Add value NN to register VX. Overflow wraps and the carry flag is not set.
            I::AddByte { vx, nn } => {
                let x = self.registers[vx as usize];
                self.registers[vx as usize] = x.wrapping_add(nn);
            }
            I::Load { .. }
            | I::Or { .. }
            | I::And { .. }
            | I::Xor { .. }
            | I::Add { .. }
            | I::Sub { .. }
            | I::ShiftRight { .. }
            | I::SubReverse { .. }
            | I::ShiftLeft { .. } => self.exec_math(instr),
            // 9XY0 (SNE Vx, Vy)
            I::SkipNotEq { vx, vy } => {
                self.skip_if(self.registers[vx as usize] != self.registers[vy as usize])
            }
            // ANNN (LD I, addr)
            I::LoadAddress { address } => self.index = address,
            // BNNN (JP V0, addr)
            I::JumpOffset { address } => {
                self.pc = address.wrapping_add(self.registers[0] as Address);
                control_flow = Flow::Jump;
            }
            // CXNN (RND Vx, byte)
            //
            // Set register VX to the result of bitwise AND between a random number and NN.
            I::Random { vx, nn } => {
                self.registers[vx as usize] = self.rng.gen::<u8>() & nn;
            }
            I::Draw { vx, vy, n } => {
                self.exec_draw(vx, vy, n)?;
                control_flow = Flow::Draw;
            }
            // EX9E (SKP Vx)
            I::SkipKey { vx } => {
                let key = self.registers[vx as usize] & 0xF;
                self.skip_if(self.keypad.is_pressed(key));
            }
            // EXA1 (SKNP Vx)
            I::SkipNotKey { vx } => {
                let key = self.registers[vx as usize] & 0xF;
                self.skip_if(!self.keypad.is_pressed(key));
            }
            // FX0A (LD Vx, K)
            //
            // Wait for a key press, store the value of the key in Vx.
            // The machine is parked across steps until a key is down.
            I::WaitKey { vx } => match self.keypad.first_pressed() {
                Some(key) => self.registers[vx as usize] = key,
                None => {
                    // rewind the program counter to stall the machine
                    self.pc = address;
                    self.awaiting_key = Some(vx);
                    control_flow = Flow::KeyWait;
                }
            },
            _ => control_flow = self.exec_misc(address, instr)?,
        }

        Ok(control_flow)
    }

    /// Execute an arithmetic instruction.
    ///
    /// Operands are read before any write, and VF is written before VX,
    /// so `VF` as the destination holds the result rather than the flag.
    #[inline]
    fn exec_math(&mut self, instr: Instruction) {
        use Instruction as I;

        match instr {
            // 8XY0 (LD Vx, Vy)
            I::Load { vx, vy } => self.registers[vx as usize] = self.registers[vy as usize],
            // 8XY1 (OR Vx, Vy)
            I::Or { vx, vy } => self.registers[vx as usize] |= self.registers[vy as usize],
            // 8XY2 (AND Vx, Vy)
            I::And { vx, vy } => self.registers[vx as usize] &= self.registers[vy as usize],
            // 8XY3 (XOR Vx, Vy)
            I::Xor { vx, vy } => self.registers[vx as usize] ^= self.registers[vy as usize],
            // 8XY4 (ADD Vx, Vy)
            //
            // If overflow, set VF to 1, else 0.
            I::Add { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                let (result, carry) = x.overflowing_add(y);
                self.set_flag_then(vx, carry as u8, result);
            }
            // 8XY5 (SUB Vx, Vy)
            //
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            I::Sub { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.set_flag_then(vx, (x >= y) as u8, x.wrapping_sub(y));
            }
            // 8XY6 (SHR Vx, Vy)
            //
            // VF receives the least-significant bit of VY before the shift.
            I::ShiftRight { vx, vy } => {
                let (_, y) = self.operands(vx, vy);
                self.set_flag_then(vx, y & 1, y >> 1);
            }
            // 8XY7 (SUBN Vx, Vy)
            I::SubReverse { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.set_flag_then(vx, (y >= x) as u8, y.wrapping_sub(x));
            }
            // 8XYE (SHL Vx, Vy)
            //
            // VF receives the most-significant bit of VY before the shift.
            I::ShiftLeft { vx, vy } => {
                let (_, y) = self.operands(vx, vy);
                self.set_flag_then(vx, y >> 7, y << 1);
            }
            _ => unreachable!("not an arithmetic instruction: {instr}"),
        }
    }

    #[inline(always)]
    fn operands(&self, vx: u8, vy: u8) -> (u8, u8) {
        (self.registers[vx as usize], self.registers[vy as usize])
    }

    #[inline(always)]
    fn set_flag_then(&mut self, vx: u8, flag: u8, result: u8) {
        self.registers[FLAG_REGISTER] = flag;
        self.registers[vx as usize] = result;
    }

    /// Dxyn (DRW Vx, Vy, nibble)
    ///
    /// Draw sprite to the display buffer, at coordinate as per registers Vx and Vy.
    /// Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
    /// memory pointed to by address register I.
    ///
    /// The origin wraps around the screen, but the sprite itself is clipped
    /// at the right and bottom edges.
    ///
    /// If the drawing operation erases existing pixels in the display buffer, register VF is set to
    /// 1, and set to 0 if no display bits are unset. This is used for collision detection.
    fn exec_draw(&mut self, vx: u8, vy: u8, n: u8) -> Chip8Result<()> {
        let origin_x = self.registers[vx as usize] as usize % DISPLAY_WIDTH;
        let origin_y = self.registers[vy as usize] as usize % DISPLAY_HEIGHT;

        // Sprite rows are read up front so a bad address leaves the display untouched.
        let sprite = self.memory.read_slice(self.index as usize, n as usize)?;
        let mut is_erased = false;

        for (r, row) in sprite.iter().enumerate() {
            let y = origin_y + r;
            if y >= DISPLAY_HEIGHT {
                break;
            }

            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..SPRITE_WIDTH {
                let x = origin_x + c;
                if x >= DISPLAY_WIDTH {
                    break;
                }
                if (row >> (7 - c)) & 1 == 0 {
                    continue;
                }

                // XOR erases a pixel when both the old and new values are both 1.
                let old_px = self.display.pixel_at(x, y);
                is_erased |= old_px;
                self.display.set_pixel(x, y, !old_px);
            }
        }

        // If a pixel was erased, then a collision occurred.
        self.registers[FLAG_REGISTER] = is_erased as u8;

        Ok(())
    }

    /// Execute a timer or memory instruction.
    fn exec_misc(&mut self, address: Address, instr: Instruction) -> Chip8Result<Flow> {
        use Instruction as I;

        let mut control_flow = Flow::Ok;

        match instr {
            // Fx07 (LD Vx, DT)
            I::LoadDelay { vx } => self.registers[vx as usize] = self.delay.get(),
            // Fx15 (LD DT, Vx)
            I::SetDelay { vx } => self.delay.set(self.registers[vx as usize]),
            // Fx18 (LD ST, Vx)
            I::SetSound { vx } => {
                self.sound.set(self.registers[vx as usize]);
                control_flow = Flow::Sound;
            }
            // Fx1E (ADD I, Vx)
            //
            // VF is not affected. I may not leave the address space.
            I::AddAddress { vx } => {
                let x = self.registers[vx as usize] as usize;
                let sum = self.index as usize + x;
                if sum >= MEM_SIZE {
                    return Err(Chip8Error::MemoryOutOfBounds { address: sum });
                }
                self.index = sum as Address;
            }
            // Fx29 (LD F, Vx)
            //
            // Set I = location of sprite for digit Vx.
            I::LoadFont { vx } => {
                self.index = self.memory.font_glyph_address(self.registers[vx as usize]);
            }
            // Fx33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of Vx
            // in the memory locations I, I+1, and I+2.
            #[rustfmt::skip]
            I::StoreBcd { vx } => {
                let x = self.registers[vx as usize];
                let digits = [
                    x / 100 % 10,
                    x / 10  % 10,
                    x       % 10,
                ];
                self.memory.store(self.index as usize, &digits)?;
            }
            // Fx55 (LD [I], Vx)
            //
            // Store registers V0 through Vx in memory starting at location I.
            // I itself is left unchanged.
            I::StoreRegisters { vx } => {
                let registers = &self.registers[0..=vx as usize];
                self.memory.store(self.index as usize, registers)?;
            }
            // Fx65 (LD Vx, [I])
            //
            // Read registers V0 through Vx from memory starting at location I.
            I::LoadRegisters { vx } => {
                let len = vx as usize + 1;
                let data = self.memory.read_slice(self.index as usize, len)?;
                self.registers[0..len].copy_from_slice(data);
            }
            // ----------------------------------------------------------------
            // Unsupported operation.
            I::Unknown(opcode) => {
                log::warn!("unimplemented opcode {opcode:04X} at 0x{address:03X}");
                control_flow = Flow::Unimplemented(opcode);
            }
            _ => unreachable!("instruction dispatched to the wrong handler: {instr}"),
        }

        Ok(control_flow)
    }
}
