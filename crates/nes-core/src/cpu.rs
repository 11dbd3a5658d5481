//! CPU module - 2A03 (6502 variant) implementation
//!
//! The NES uses a modified 6502 CPU without decimal mode. Instructions execute atomically on
//! the first cycle of their slot; the remaining cycles are burned off by `clock` so the rest of
//! the system observes the correct cycle budget.

use std::fmt;

use crate::opcodes::{self, AddressingMode, Instruction};

/// Reset vector address
pub const RESET_VECTOR: u16 = 0xFFFC;
/// NMI vector address
pub const NMI_VECTOR: u16 = 0xFFFA;
/// IRQ/BRK vector address
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles burned before the first instruction after reset
const RESET_CYCLES: u32 = 8;
/// Cycles taken by an interrupt sequence
const INTERRUPT_CYCLES: u32 = 7;

/// 2A03 CPU registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuRegisters {
    pub a: u8,    // Accumulator
    pub x: u8,    // X index register
    pub y: u8,    // Y index register
    pub p: StatusFlags, // Processor status
    pub sp: u8,   // Stack pointer
    pub pc: u16,  // Program counter
}

impl Default for CpuRegisters {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            p: StatusFlags::new(0),
            sp: 0xFD, // Stack starts at $01FD
            pc: 0,    // Will be set by reset vector
        }
    }
}

/// CPU status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const CARRY: u8 = 0b00000001;
    pub const ZERO: u8 = 0b00000010;
    pub const INTERRUPT: u8 = 0b00000100;
    pub const DECIMAL: u8 = 0b00001000;
    pub const BREAK: u8 = 0b00010000;
    pub const UNUSED: u8 = 0b00100000;
    pub const OVERFLOW: u8 = 0b01000000;
    pub const NEGATIVE: u8 = 0b10000000;

    pub fn new(flags: u8) -> Self {
        Self(flags)
    }

    /// Raw status byte
    pub fn bits(&self) -> u8 {
        self.0
    }

    fn set(&mut self, mask: u8, val: bool) {
        self.0 = if val { self.0 | mask } else { self.0 & !mask };
    }

    pub fn carry(&self) -> bool {
        (self.0 & Self::CARRY) != 0
    }

    pub fn zero(&self) -> bool {
        (self.0 & Self::ZERO) != 0
    }

    pub fn interrupt(&self) -> bool {
        (self.0 & Self::INTERRUPT) != 0
    }

    pub fn decimal(&self) -> bool {
        (self.0 & Self::DECIMAL) != 0
    }

    pub fn brk(&self) -> bool {
        (self.0 & Self::BREAK) != 0
    }

    pub fn overflow(&self) -> bool {
        (self.0 & Self::OVERFLOW) != 0
    }

    pub fn negative(&self) -> bool {
        (self.0 & Self::NEGATIVE) != 0
    }

    pub fn set_carry(&mut self, val: bool) {
        self.set(Self::CARRY, val);
    }

    pub fn set_zero(&mut self, val: bool) {
        self.set(Self::ZERO, val);
    }

    pub fn set_interrupt(&mut self, val: bool) {
        self.set(Self::INTERRUPT, val);
    }

    pub fn set_decimal(&mut self, val: bool) {
        self.set(Self::DECIMAL, val);
    }

    pub fn set_brk(&mut self, val: bool) {
        self.set(Self::BREAK, val);
    }

    pub fn set_unused(&mut self, val: bool) {
        self.set(Self::UNUSED, val);
    }

    pub fn set_overflow(&mut self, val: bool) {
        self.set(Self::OVERFLOW, val);
    }

    pub fn set_negative(&mut self, val: bool) {
        self.set(Self::NEGATIVE, val);
    }

    /// Update Zero and Negative from a result byte
    pub fn set_zn(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative(value & 0x80 != 0);
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C:{} Z:{} I:{} D:{} B:{} U:{} V:{} N:{}",
            self.carry() as u8,
            self.zero() as u8,
            self.interrupt() as u8,
            self.decimal() as u8,
            self.brk() as u8,
            (self.0 & Self::UNUSED != 0) as u8,
            self.overflow() as u8,
            self.negative() as u8
        )
    }
}

/// Resolved operand of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    Implied,
    /// Operate on the accumulator
    Accumulator,
    /// Literal value following the opcode
    Immediate(u8),
    /// Effective memory address
    Address(u16),
}

/// CPU emulator state
#[derive(Debug, Clone)]
pub struct Cpu {
    registers: CpuRegisters,
    /// Cycles left before the next instruction is fetched
    delay_cycles: u32,
    /// Cycles the CPU is halted for (OAM DMA)
    suspend_cycles: u32,
    /// Total cycles executed
    cycles: u64,
    /// Opcode byte and address of the instruction being executed
    opcode: u8,
    opcode_pc: u16,
}

impl Cpu {
    /// Create a new CPU instance
    pub fn new() -> Self {
        Self {
            registers: CpuRegisters::default(),
            delay_cycles: 0,
            suspend_cycles: 0,
            cycles: 0,
            opcode: 0,
            opcode_pc: 0,
        }
    }

    /// Reset the CPU to its power-on state and jump through the reset vector
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.registers = CpuRegisters::default();
        self.registers.pc = read_word(bus, RESET_VECTOR);
        self.delay_cycles = RESET_CYCLES;
        self.suspend_cycles = 0;
        self.cycles = 0;
    }

    /// Get CPU registers
    pub fn registers(&self) -> &CpuRegisters {
        &self.registers
    }

    /// Get mutable CPU registers
    pub fn registers_mut(&mut self) -> &mut CpuRegisters {
        &mut self.registers
    }

    /// Get CPU status flags
    pub fn status(&self) -> &StatusFlags {
        &self.registers.p
    }

    /// Get total cycles executed
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles still owed by the current instruction
    pub fn pending_cycles(&self) -> u32 {
        self.delay_cycles
    }

    /// Remaining DMA stall
    pub fn suspended_cycles(&self) -> u32 {
        self.suspend_cycles
    }

    /// Halt the CPU for the given number of cycles
    pub fn suspend(&mut self, cycles: u32) {
        self.suspend_cycles += cycles;
    }

    /// Advance exactly one CPU cycle
    pub fn clock(&mut self, bus: &mut impl Bus) -> Result<(), CpuError> {
        if self.suspend_cycles > 0 {
            self.suspend_cycles -= 1;
            return Ok(());
        }

        if self.delay_cycles == 0 {
            self.step(bus)?;
        }

        self.delay_cycles = self.delay_cycles.saturating_sub(1);
        self.cycles += 1;
        Ok(())
    }

    /// Maskable interrupt, ignored while the I flag is set
    pub fn irq(&mut self, bus: &mut impl Bus) {
        if self.registers.p.interrupt() {
            return;
        }
        self.interrupt(bus, IRQ_VECTOR);
    }

    /// Non-maskable interrupt
    pub fn nmi(&mut self, bus: &mut impl Bus) {
        self.interrupt(bus, NMI_VECTOR);
    }

    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) {
        self.push_word(bus, self.registers.pc);
        let status = (self.registers.p.bits() | StatusFlags::UNUSED) & !StatusFlags::BREAK;
        self.push_byte(bus, status);
        self.registers.p.set_interrupt(true);
        self.registers.pc = read_word(bus, vector);
        self.delay_cycles += INTERRUPT_CYCLES;
    }

    /// Fetch, decode and execute one instruction
    ///
    /// Returns the cycles charged for it, including page-cross and branch penalties.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u32, CpuError> {
        let before = self.delay_cycles;

        self.opcode_pc = self.registers.pc;
        self.opcode = bus.read(self.opcode_pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);

        let entry = opcodes::decode(self.opcode).ok_or(CpuError::InvalidOpcode {
            opcode: self.opcode,
            pc: self.opcode_pc,
        })?;

        let (operand, page_crossed) = self.resolve(bus, entry.mode);
        if page_crossed {
            self.delay_cycles += u32::from(entry.page_cycles);
        }

        self.execute(bus, entry.instruction, operand)?;
        self.delay_cycles += u32::from(entry.cycles);

        Ok(self.delay_cycles - before)
    }

    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    fn fetch_word(&mut self, bus: &mut impl Bus) -> u16 {
        let value = read_word(bus, self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(2);
        value
    }

    /// Resolve the operand for an addressing mode, reporting page crossings
    fn resolve(&mut self, bus: &mut impl Bus, mode: AddressingMode) -> (Operand, bool) {
        let regs = self.registers;
        match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => (Operand::Immediate(self.fetch(bus)), false),
            AddressingMode::ZeroPage => (Operand::Address(u16::from(self.fetch(bus))), false),
            AddressingMode::ZeroPageX => {
                let address = self.fetch(bus).wrapping_add(regs.x);
                (Operand::Address(u16::from(address)), false)
            }
            AddressingMode::ZeroPageY => {
                let address = self.fetch(bus).wrapping_add(regs.y);
                (Operand::Address(u16::from(address)), false)
            }
            AddressingMode::Absolute => (Operand::Address(self.fetch_word(bus)), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let address = base.wrapping_add(u16::from(regs.x));
                (Operand::Address(address), crosses_page(base, address))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let address = base.wrapping_add(u16::from(regs.y));
                (Operand::Address(address), crosses_page(base, address))
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch_word(bus);
                // The high byte never carries into the next page
                let address = if pointer & 0x00FF == 0x00FF {
                    let lo = bus.read(pointer);
                    let hi = bus.read(pointer & 0xFF00);
                    u16::from_le_bytes([lo, hi])
                } else {
                    read_word(bus, pointer)
                };
                (Operand::Address(address), false)
            }
            AddressingMode::IndirectX => {
                let pointer = self.fetch(bus).wrapping_add(regs.x);
                (Operand::Address(read_zero_page_word(bus, pointer)), false)
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch(bus);
                let base = read_zero_page_word(bus, pointer);
                let address = base.wrapping_add(u16::from(regs.y));
                (Operand::Address(address), crosses_page(base, address))
            }
            AddressingMode::Relative => {
                let offset = self.fetch(bus) as i8;
                let address = self.registers.pc.wrapping_add(offset as u16);
                (Operand::Address(address), false)
            }
        }
    }

    fn invalid_operand(&self) -> CpuError {
        CpuError::InvalidOperand {
            opcode: self.opcode,
            pc: self.opcode_pc,
        }
    }

    fn address(&self, operand: Operand) -> Result<u16, CpuError> {
        match operand {
            Operand::Address(address) => Ok(address),
            _ => Err(self.invalid_operand()),
        }
    }

    /// Value an instruction reads
    fn load(&self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        match operand {
            Operand::Immediate(value) => Ok(value),
            Operand::Accumulator => Ok(self.registers.a),
            Operand::Address(address) => Ok(bus.read(address)),
            Operand::Implied => Err(self.invalid_operand()),
        }
    }

    /// Write back a read-modify-write result
    fn store(&mut self, bus: &mut impl Bus, operand: Operand, value: u8) -> Result<(), CpuError> {
        match operand {
            Operand::Accumulator => self.registers.a = value,
            Operand::Address(address) => bus.write(address, value),
            _ => return Err(self.invalid_operand()),
        }
        Ok(())
    }

    fn execute(
        &mut self,
        bus: &mut impl Bus,
        instruction: Instruction,
        operand: Operand,
    ) -> Result<(), CpuError> {
        match instruction {
            Instruction::ADC => {
                let value = self.load(bus, operand)?;
                self.add(value);
            }
            Instruction::SBC => {
                let value = self.load(bus, operand)?;
                self.subtract(value);
            }
            Instruction::AND => {
                self.registers.a &= self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::ORA => {
                self.registers.a |= self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::EOR => {
                self.registers.a ^= self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::ASL => {
                self.shift_left(bus, operand)?;
            }
            Instruction::LSR => {
                self.shift_right(bus, operand)?;
            }
            Instruction::ROL => {
                self.rotate_left(bus, operand)?;
            }
            Instruction::ROR => {
                self.rotate_right(bus, operand)?;
            }
            Instruction::BIT => {
                let value = self.load(bus, operand)?;
                let p = &mut self.registers.p;
                p.set_zero(self.registers.a & value == 0);
                p.set_overflow(value & 0x40 != 0);
                p.set_negative(value & 0x80 != 0);
            }

            Instruction::BCC => self.branch(operand, !self.registers.p.carry())?,
            Instruction::BCS => self.branch(operand, self.registers.p.carry())?,
            Instruction::BEQ => self.branch(operand, self.registers.p.zero())?,
            Instruction::BNE => self.branch(operand, !self.registers.p.zero())?,
            Instruction::BMI => self.branch(operand, self.registers.p.negative())?,
            Instruction::BPL => self.branch(operand, !self.registers.p.negative())?,
            Instruction::BVS => self.branch(operand, self.registers.p.overflow())?,
            Instruction::BVC => self.branch(operand, !self.registers.p.overflow())?,

            Instruction::BRK => {
                self.push_word(bus, self.registers.pc);
                let status = self.registers.p.bits() | StatusFlags::BREAK | StatusFlags::UNUSED;
                self.push_byte(bus, status);
                self.registers.p.set_interrupt(true);
                self.registers.pc = read_word(bus, IRQ_VECTOR);
            }

            Instruction::CLC => self.registers.p.set_carry(false),
            Instruction::CLD => self.registers.p.set_decimal(false),
            Instruction::CLI => self.registers.p.set_interrupt(false),
            Instruction::CLV => self.registers.p.set_overflow(false),
            Instruction::SEC => self.registers.p.set_carry(true),
            Instruction::SED => self.registers.p.set_decimal(true),
            Instruction::SEI => self.registers.p.set_interrupt(true),

            Instruction::CMP => {
                let value = self.load(bus, operand)?;
                self.compare(self.registers.a, value);
            }
            Instruction::CPX => {
                let value = self.load(bus, operand)?;
                self.compare(self.registers.x, value);
            }
            Instruction::CPY => {
                let value = self.load(bus, operand)?;
                self.compare(self.registers.y, value);
            }

            Instruction::DEC => {
                self.decrement(bus, operand)?;
            }
            Instruction::INC => {
                self.increment(bus, operand)?;
            }
            Instruction::DEX => {
                self.registers.x = self.registers.x.wrapping_sub(1);
                self.registers.p.set_zn(self.registers.x);
            }
            Instruction::DEY => {
                self.registers.y = self.registers.y.wrapping_sub(1);
                self.registers.p.set_zn(self.registers.y);
            }
            Instruction::INX => {
                self.registers.x = self.registers.x.wrapping_add(1);
                self.registers.p.set_zn(self.registers.x);
            }
            Instruction::INY => {
                self.registers.y = self.registers.y.wrapping_add(1);
                self.registers.p.set_zn(self.registers.y);
            }

            Instruction::JMP => {
                self.registers.pc = self.address(operand)?;
            }
            Instruction::JSR => {
                let target = self.address(operand)?;
                self.push_word(bus, self.registers.pc.wrapping_sub(1));
                self.registers.pc = target;
            }
            Instruction::RTS => {
                self.registers.pc = self.pop_word(bus).wrapping_add(1);
            }
            Instruction::RTI => {
                self.pull_status(bus);
                self.registers.pc = self.pop_word(bus);
            }

            Instruction::LDA => {
                self.registers.a = self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::LDX => {
                self.registers.x = self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.x);
            }
            Instruction::LDY => {
                self.registers.y = self.load(bus, operand)?;
                self.registers.p.set_zn(self.registers.y);
            }
            Instruction::STA => bus.write(self.address(operand)?, self.registers.a),
            Instruction::STX => bus.write(self.address(operand)?, self.registers.x),
            Instruction::STY => bus.write(self.address(operand)?, self.registers.y),

            Instruction::NOP => {}

            Instruction::PHA => self.push_byte(bus, self.registers.a),
            Instruction::PHP => {
                let status = self.registers.p.bits() | StatusFlags::BREAK | StatusFlags::UNUSED;
                self.push_byte(bus, status);
            }
            Instruction::PLA => {
                self.registers.a = self.pop_byte(bus);
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::PLP => self.pull_status(bus),

            Instruction::TAX => {
                self.registers.x = self.registers.a;
                self.registers.p.set_zn(self.registers.x);
            }
            Instruction::TAY => {
                self.registers.y = self.registers.a;
                self.registers.p.set_zn(self.registers.y);
            }
            Instruction::TSX => {
                self.registers.x = self.registers.sp;
                self.registers.p.set_zn(self.registers.x);
            }
            Instruction::TXA => {
                self.registers.a = self.registers.x;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::TXS => self.registers.sp = self.registers.x,
            Instruction::TYA => {
                self.registers.a = self.registers.y;
                self.registers.p.set_zn(self.registers.a);
            }

            // Undocumented: two legal operations on the same operand
            Instruction::DCP => {
                let value = self.decrement(bus, operand)?;
                self.compare(self.registers.a, value);
            }
            Instruction::ISC => {
                let value = self.increment(bus, operand)?;
                self.subtract(value);
            }
            Instruction::LAX => {
                let value = self.load(bus, operand)?;
                self.registers.a = value;
                self.registers.x = value;
                self.registers.p.set_zn(value);
            }
            Instruction::RLA => {
                let value = self.rotate_left(bus, operand)?;
                self.registers.a &= value;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::RRA => {
                let value = self.rotate_right(bus, operand)?;
                self.add(value);
            }
            Instruction::SAX => {
                bus.write(self.address(operand)?, self.registers.a & self.registers.x);
            }
            Instruction::SLO => {
                let value = self.shift_left(bus, operand)?;
                self.registers.a |= value;
                self.registers.p.set_zn(self.registers.a);
            }
            Instruction::SRE => {
                let value = self.shift_right(bus, operand)?;
                self.registers.a ^= value;
                self.registers.p.set_zn(self.registers.a);
            }
        }
        Ok(())
    }

    fn add(&mut self, value: u8) {
        let a = self.registers.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(self.registers.p.carry());
        let result = sum as u8;

        self.registers.p.set_carry(sum > 0xFF);
        self.registers.p.set_overflow(!(a ^ value) & (a ^ result) & 0x80 != 0);
        self.registers.a = result;
        self.registers.p.set_zn(result);
    }

    fn subtract(&mut self, value: u8) {
        let a = i16::from(self.registers.a);
        let borrow = 1 - i16::from(self.registers.p.carry());
        let difference = a - i16::from(value) - borrow;
        let result = difference as u8;

        self.registers.p.set_carry(difference >= 0);
        self.registers
            .p
            .set_overflow((result ^ self.registers.a) & (result ^ value ^ 0xFF) & 0x80 != 0);
        self.registers.a = result;
        self.registers.p.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.registers.p.set_carry(register >= value);
        self.registers.p.set_zn(register.wrapping_sub(value));
    }

    fn branch(&mut self, operand: Operand, condition: bool) -> Result<(), CpuError> {
        let target = self.address(operand)?;
        if condition {
            self.delay_cycles += 1;
            if crosses_page(self.registers.pc, target) {
                self.delay_cycles += 1;
            }
            self.registers.pc = target;
        }
        Ok(())
    }

    fn shift_left(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = value << 1;
        self.registers.p.set_carry(value & 0x80 != 0);
        self.registers.p.set_zn(result);
        self.store(bus, operand, result)?;
        Ok(result)
    }

    fn shift_right(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = value >> 1;
        self.registers.p.set_carry(value & 0x01 != 0);
        self.registers.p.set_zn(result);
        self.store(bus, operand, result)?;
        Ok(result)
    }

    fn rotate_left(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = (value << 1) | u8::from(self.registers.p.carry());
        self.registers.p.set_carry(value & 0x80 != 0);
        self.registers.p.set_zn(result);
        self.store(bus, operand, result)?;
        Ok(result)
    }

    fn rotate_right(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = (value >> 1) | (u8::from(self.registers.p.carry()) << 7);
        self.registers.p.set_carry(value & 0x01 != 0);
        self.registers.p.set_zn(result);
        self.store(bus, operand, result)?;
        Ok(result)
    }

    fn decrement(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let address = self.address(operand)?;
        let result = bus.read(address).wrapping_sub(1);
        bus.write(address, result);
        self.registers.p.set_zn(result);
        Ok(result)
    }

    fn increment(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        let address = self.address(operand)?;
        let result = bus.read(address).wrapping_add(1);
        bus.write(address, result);
        self.registers.p.set_zn(result);
        Ok(result)
    }

    fn pull_status(&mut self, bus: &mut impl Bus) {
        let mut status = StatusFlags::new(self.pop_byte(bus));
        status.set_brk(false);
        status.set_unused(true);
        self.registers.p = status;
    }

    fn push_byte(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.registers.sp), value);
        self.registers.sp = self.registers.sp.wrapping_sub(1);
    }

    fn push_word(&mut self, bus: &mut impl Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push_byte(bus, hi);
        self.push_byte(bus, lo);
    }

    fn pop_byte(&mut self, bus: &mut impl Bus) -> u8 {
        self.registers.sp = self.registers.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.registers.sp))
    }

    fn pop_word(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pop_byte(bus);
        let hi = self.pop_byte(bus);
        u16::from_le_bytes([lo, hi])
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

fn read_word(bus: &mut impl Bus, address: u16) -> u16 {
    let lo = bus.read(address);
    let hi = bus.read(address.wrapping_add(1));
    u16::from_le_bytes([lo, hi])
}

fn read_zero_page_word(bus: &mut impl Bus, pointer: u8) -> u16 {
    let lo = bus.read(u16::from(pointer));
    let hi = bus.read(u16::from(pointer.wrapping_add(1)));
    u16::from_le_bytes([lo, hi])
}

/// CPU error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// The byte at `pc` has no opcode-table entry
    InvalidOpcode { opcode: u8, pc: u16 },
    /// An instruction was dispatched with an operand it cannot use
    InvalidOperand { opcode: u8, pc: u16 },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::InvalidOpcode { opcode, pc } => {
                write!(f, "Invalid opcode: 0x{:02X} at PC 0x{:04X}", opcode, pc)
            }
            CpuError::InvalidOperand { opcode, pc } => {
                write!(f, "Invalid operand for opcode 0x{:02X} at PC 0x{:04X}", opcode, pc)
            }
        }
    }
}

impl std::error::Error for CpuError {}

/// Bus trait for memory and I/O access
pub trait Bus {
    /// Read a byte from the given address
    fn read(&mut self, address: u16) -> u8;
    /// Write a byte to the given address
    fn write(&mut self, address: u16, value: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat 64KB memory
    struct TestBus {
        memory: Vec<u8>,
    }

    impl TestBus {
        fn with_program(origin: u16, program: &[u8]) -> Self {
            let mut memory = vec![0; 0x10000];
            memory[origin as usize..origin as usize + program.len()].copy_from_slice(program);
            let [lo, hi] = origin.to_le_bytes();
            memory[RESET_VECTOR as usize] = lo;
            memory[RESET_VECTOR as usize + 1] = hi;
            Self { memory }
        }
    }

    impl Bus for TestBus {
        fn read(&mut self, address: u16) -> u8 {
            self.memory[address as usize]
        }

        fn write(&mut self, address: u16, value: u8) {
            self.memory[address as usize] = value;
        }
    }

    fn boot(program: &[u8]) -> (Cpu, TestBus) {
        let mut bus = TestBus::with_program(0x8000, program);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        (cpu, bus)
    }

    #[test]
    fn test_cpu_reset() {
        let (cpu, _) = boot(&[]);
        assert_eq!(cpu.registers().pc, 0x8000);
        assert_eq!(cpu.registers().sp, 0xFD);
        assert_eq!(cpu.status().bits(), 0x00);
        assert_eq!(cpu.pending_cycles(), RESET_CYCLES);
    }

    #[test]
    fn test_status_flags() {
        let mut flags = StatusFlags::new(0xFF);
        assert!(flags.carry());
        assert!(flags.zero());
        assert!(flags.interrupt());
        assert!(flags.overflow());
        assert!(flags.negative());

        flags.set_carry(false);
        assert!(!flags.carry());

        flags.set_zn(0x80);
        assert!(!flags.zero());
        assert!(flags.negative());
    }

    #[test]
    fn test_first_instruction_after_reset_delay() {
        // LDA #$42
        let (mut cpu, mut bus) = boot(&[0xA9, 0x42]);
        for _ in 0..RESET_CYCLES {
            cpu.clock(&mut bus).unwrap();
        }
        assert_eq!(cpu.registers().a, 0);
        cpu.clock(&mut bus).unwrap();
        assert_eq!(cpu.registers().a, 0x42);
        assert_eq!(cpu.cycles(), u64::from(RESET_CYCLES) + 1);
    }

    #[test]
    fn test_branch_cycles() {
        // BNE +2 taken, same page
        let (mut cpu, mut bus) = boot(&[0xD0, 0x02]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 3);
        assert_eq!(cpu.registers().pc, 0x8004);

        // BEQ not taken
        let (mut cpu, mut bus) = boot(&[0xF0, 0x02]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.registers().pc, 0x8002);

        // BNE -4 taken, crossing back into page $7F
        let (mut cpu, mut bus) = boot(&[0xD0, 0xFC]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 4);
        assert_eq!(cpu.registers().pc, 0x7FFE);
    }

    #[test]
    fn test_page_cross_penalty() {
        // LDX #$01; LDA $80FF,X
        let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0xBD, 0xFF, 0x80]);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    }

    #[test]
    fn test_jsr_rts() {
        // JSR $8005; BRK padding; RTS at $8005
        let (mut cpu, mut bus) = boot(&[0x20, 0x05, 0x80, 0xEA, 0xEA, 0x60]);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.registers().pc, 0x8005);
        assert_eq!(cpu.registers().sp, 0xFB);
        assert_eq!(bus.memory[0x01FD], 0x80);
        assert_eq!(bus.memory[0x01FC], 0x02);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.registers().pc, 0x8003);
        assert_eq!(cpu.registers().sp, 0xFD);
    }

    #[test]
    fn test_php_plp_break_bits() {
        // SEC; PHP; PLP
        let (mut cpu, mut bus) = boot(&[0x38, 0x08, 0x28]);
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();
        assert_eq!(bus.memory[0x01FD], 0x31);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.status().bits(), 0x21);
    }

    #[test]
    fn test_irq_respects_interrupt_disable() {
        let (mut cpu, mut bus) = boot(&[]);
        bus.memory[IRQ_VECTOR as usize] = 0x00;
        bus.memory[IRQ_VECTOR as usize + 1] = 0x90;

        cpu.registers_mut().p.set_interrupt(true);
        cpu.irq(&mut bus);
        assert_eq!(cpu.registers().pc, 0x8000);

        cpu.registers_mut().p = StatusFlags::new(StatusFlags::BREAK);
        cpu.irq(&mut bus);
        assert_eq!(cpu.registers().pc, 0x9000);
        assert!(cpu.status().interrupt());
        // Pushed status has B clear and U set
        assert_eq!(bus.memory[0x01FB], StatusFlags::UNUSED);
        assert_eq!(cpu.pending_cycles(), RESET_CYCLES + INTERRUPT_CYCLES);
    }

    #[test]
    fn test_nmi_ignores_interrupt_disable() {
        let (mut cpu, mut bus) = boot(&[]);
        bus.memory[NMI_VECTOR as usize] = 0x34;
        bus.memory[NMI_VECTOR as usize + 1] = 0x12;
        cpu.registers_mut().p.set_interrupt(true);
        cpu.nmi(&mut bus);
        assert_eq!(cpu.registers().pc, 0x1234);
        assert_eq!(bus.memory[0x01FD], 0x80);
        assert_eq!(bus.memory[0x01FC], 0x00);
    }

    #[test]
    fn test_suspend_stalls_clock() {
        let (mut cpu, mut bus) = boot(&[0xEA]);
        cpu.suspend(3);
        for _ in 0..3 {
            cpu.clock(&mut bus).unwrap();
        }
        assert_eq!(cpu.cycles(), 0);
        assert_eq!(cpu.pending_cycles(), RESET_CYCLES);
    }

    #[test]
    fn test_invalid_opcode_is_fatal() {
        let (mut cpu, mut bus) = boot(&[0x02]);
        assert_eq!(
            cpu.step(&mut bus),
            Err(CpuError::InvalidOpcode { opcode: 0x02, pc: 0x8000 })
        );
    }

    #[test]
    fn test_undocumented_combinations() {
        // LDA #$0F; STA $10; DCP $10 -> mem = $0E, A > mem so carry set
        let (mut cpu, mut bus) = boot(&[0xA9, 0x0F, 0x85, 0x10, 0xC7, 0x10]);
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
        }
        assert_eq!(bus.memory[0x10], 0x0E);
        assert!(cpu.status().carry());
        assert!(!cpu.status().zero());

        // LAX $20 loads both A and X
        let (mut cpu, mut bus) = boot(&[0xA7, 0x20]);
        bus.memory[0x20] = 0x99;
        cpu.step(&mut bus).unwrap();
        assert_eq!((cpu.registers().a, cpu.registers().x), (0x99, 0x99));
        assert!(cpu.status().negative());

        // LDA #$F0; LDX #$3C; SAX $30
        let (mut cpu, mut bus) = boot(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x30]);
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
        }
        assert_eq!(bus.memory[0x30], 0x30);
    }
}
