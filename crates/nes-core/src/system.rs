//! NES System Integration
//!
//! [`Emulator`] owns every component and drives them in lockstep: each call to
//! [`Emulator::clock`] advances the CPU and APU by one cycle and the PPU by three dots.
//! Components never hold references to each other. Buses are assembled from borrowed fields
//! for the duration of a single call, and interrupt requests are latched and delivered to the
//! CPU as soon as the component that raised them returns.

use std::fmt;

use crate::apu::Apu;
use crate::bus::{CpuBus, RAM_SIZE};
use crate::cartridge::{Cartridge, CartridgeError, CartridgeInfo};
use crate::controller::{Button, StandardController};
use crate::cpu::{Bus, Cpu, CpuError};
use crate::dma::Dma;
use crate::interrupt::InterruptLines;
use crate::options::{EmulatorOptions, FrameCallback, SampleCallback};
use crate::palette;
use crate::ppu::{Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::ppu_bus::{PpuBus, NAMETABLE_RAM_SIZE, PALETTE_RAM_SIZE};
use crate::ram::Ram;

/// PPU dots per CPU cycle
const PPU_DOTS_PER_CPU_CYCLE: usize = 3;

/// Controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    One,
    Two,
}

/// Everything the CPU can reach through its address space
struct Board {
    ram: Ram,
    ppu: Ppu,
    apu: Apu,
    nametables: Ram,
    palettes: Ram,
    cartridge: Cartridge,
    dma: Dma,
    controllers: [StandardController; 2],
}

impl Board {
    fn cpu_bus(&mut self, cpu_cycles: u64) -> CpuBus<'_> {
        CpuBus {
            ram: &mut self.ram,
            ppu: &mut self.ppu,
            nametables: &mut self.nametables,
            palettes: &mut self.palettes,
            mapper: self.cartridge.mapper_mut(),
            apu: &mut self.apu,
            dma: &mut self.dma,
            controllers: &mut self.controllers,
            cpu_cycles,
        }
    }
}

/// NES System - integrates all components
pub struct Emulator {
    cpu: Cpu,
    board: Board,
    interrupts: InterruptLines,
    /// CPU cycles since power-on, including DMA stalls
    cycles: u64,
    pixels: Vec<u32>,
    on_sample: SampleCallback,
    on_frame: FrameCallback,
    /// Set once the CPU faults; the emulator no longer advances
    halted: Option<CpuError>,
}

impl Emulator {
    /// Load `rom` (an iNES image) and reset the CPU
    pub fn new(rom: &[u8], options: EmulatorOptions) -> Result<Self, EmulatorError> {
        let mut cartridge = Cartridge::from_rom(rom)?;
        if let Some(sram) = &options.sram {
            cartridge.load_sram(sram);
        }

        let mut emulator = Self {
            cpu: Cpu::new(),
            board: Board {
                ram: Ram::new(RAM_SIZE, 0),
                ppu: Ppu::new(),
                apu: Apu::new(options.sample_rate),
                nametables: Ram::new(NAMETABLE_RAM_SIZE, 0x2000),
                palettes: Ram::new(PALETTE_RAM_SIZE, 0x3F00),
                cartridge,
                dma: Dma::new(),
                controllers: Default::default(),
            },
            interrupts: InterruptLines::new(),
            cycles: 0,
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            on_sample: options.on_sample,
            on_frame: options.on_frame,
            halted: None,
        };
        emulator.reset();
        Ok(emulator)
    }

    /// Run the CPU reset sequence
    ///
    /// Clears a previous CPU fault.
    pub fn reset(&mut self) {
        let mut bus = self.board.cpu_bus(self.cycles);
        self.cpu.reset(&mut bus);
        self.halted = None;
        log::debug!("CPU reset, PC = ${:04X}", self.cpu.registers().pc);
    }

    /// Advance one CPU cycle (three PPU dots)
    pub fn clock(&mut self) -> Result<(), EmulatorError> {
        if let Some(error) = self.halted {
            return Err(error.into());
        }

        let result = {
            let mut bus = self.board.cpu_bus(self.cycles);
            self.cpu.clock(&mut bus)
        };
        if let Err(error) = result {
            log::error!("CPU halted: {}", error);
            self.halted = Some(error);
            return Err(error.into());
        }
        if let Some(stall) = self.board.dma.take_stall() {
            self.cpu.suspend(stall);
        }
        self.cycles += 1;
        self.deliver_interrupts();

        let board = &mut self.board;
        board.apu.clock(
            board.cartridge.mapper_mut(),
            &mut self.interrupts,
            &mut self.on_sample,
        );
        self.deliver_interrupts();

        for _ in 0..PPU_DOTS_PER_CPU_CYCLE {
            let board = &mut self.board;
            let mut bus = PpuBus::new(
                board.cartridge.mapper_mut(),
                &mut board.nametables,
                &mut board.palettes,
            );
            let frame_done = board.ppu.clock(&mut bus, &mut self.interrupts);
            self.deliver_interrupts();

            if frame_done {
                palette::convert(self.board.ppu.frame_buffer(), &mut self.pixels);
                (self.on_frame)(&self.pixels[..]);
            }
        }

        Ok(())
    }

    /// Run until the PPU completes the current frame
    pub fn frame(&mut self) -> Result<(), EmulatorError> {
        let frame = self.board.ppu.frame();
        while self.board.ppu.frame() == frame {
            self.clock()?;
        }
        Ok(())
    }

    fn deliver_interrupts(&mut self) {
        if !self.interrupts.is_pending() {
            return;
        }

        let nmi = self.interrupts.take_nmi();
        let irq = self.interrupts.take_irq();
        let mut bus = self.board.cpu_bus(self.cycles);
        if nmi {
            self.cpu.nmi(&mut bus);
        }
        if irq {
            self.cpu.irq(&mut bus);
        }
    }

    /// Battery RAM, for persisting between sessions
    pub fn sram(&self) -> &[u8] {
        self.board.cartridge.sram()
    }

    pub fn controller1_mut(&mut self) -> &mut StandardController {
        &mut self.board.controllers[0]
    }

    pub fn controller2_mut(&mut self) -> &mut StandardController {
        &mut self.board.controllers[1]
    }

    pub fn update_button(&mut self, port: Port, button: Button, pressed: bool) {
        let controller = match port {
            Port::One => self.controller1_mut(),
            Port::Two => self.controller2_mut(),
        };
        controller.update_button(button, pressed);
    }

    /// Read through the CPU bus, with the same side effects a CPU read has
    pub fn read_memory(&mut self, address: u16) -> u8 {
        self.board.cpu_bus(self.cycles).read(address)
    }

    /// Write through the CPU bus
    pub fn write_memory(&mut self, address: u16, value: u8) {
        self.board.cpu_bus(self.cycles).write(address, value);
        if let Some(stall) = self.board.dma.take_stall() {
            self.cpu.suspend(stall);
        }
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.board.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.board.apu
    }

    pub fn cartridge_info(&self) -> &CartridgeInfo {
        self.board.cartridge.info()
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.board.ppu.frame()
    }

    /// CPU cycles since power-on
    pub fn cpu_cycles(&self) -> u64 {
        self.cycles
    }

    /// The last completed frame as `0x00RRGGBB` pixels
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The CPU fault that halted emulation, if any
    pub fn halted(&self) -> Option<&CpuError> {
        self.halted.as_ref()
    }
}

impl fmt::Debug for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emulator")
            .field("cpu", &self.cpu)
            .field("cartridge", &self.board.cartridge)
            .field("cycles", &self.cycles)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}

/// Emulator error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorError {
    Cartridge(CartridgeError),
    Cpu(CpuError),
}

impl From<CartridgeError> for EmulatorError {
    fn from(error: CartridgeError) -> Self {
        EmulatorError::Cartridge(error)
    }
}

impl From<CpuError> for EmulatorError {
    fn from(error: CpuError) -> Self {
        EmulatorError::Cpu(error)
    }
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::Cartridge(error) => write!(f, "Cartridge error: {}", error),
            EmulatorError::Cpu(error) => write!(f, "CPU error: {}", error),
        }
    }
}

impl std::error::Error for EmulatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmulatorError::Cartridge(error) => Some(error),
            EmulatorError::Cpu(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// JMP $8000
    const IDLE: [u8; 3] = [0x4C, 0x00, 0x80];

    /// NROM image whose reset vector points at `program` placed at $8000
    fn rom(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
        rom.resize(16, 0);
        let mut prg = vec![0xEA; 0x4000];
        prg[..program.len()].copy_from_slice(program);
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0x80;
        rom.extend_from_slice(&prg);
        rom.extend(std::iter::repeat(0).take(0x2000));
        rom
    }

    #[test]
    fn test_reset_on_construction() {
        let emulator = Emulator::new(&rom(&IDLE), EmulatorOptions::default()).unwrap();
        assert_eq!(emulator.cpu().registers().pc, 0x8000);
        assert_eq!(emulator.cpu().registers().sp, 0xFD);
        assert_eq!(emulator.cpu_cycles(), 0);
    }

    #[test]
    fn test_bad_rom() {
        let error = Emulator::new(b"NOPE", EmulatorOptions::default()).unwrap_err();
        assert!(matches!(error, EmulatorError::Cartridge(_)));
    }

    #[test]
    fn test_frame_callback() {
        let frames = Rc::new(Cell::new(0));
        let seen = Rc::clone(&frames);
        let options = EmulatorOptions::default().on_frame(move |pixels| {
            assert_eq!(pixels.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
            seen.set(seen.get() + 1);
        });
        let mut emulator = Emulator::new(&rom(&IDLE), options).unwrap();
        emulator.frame().unwrap();
        emulator.frame().unwrap();
        assert_eq!(frames.get(), 2);
        assert_eq!(emulator.frame_count(), 2);
    }

    #[test]
    fn test_halts_on_invalid_opcode() {
        // $02 is a KIL opcode with no table entry
        let mut emulator = Emulator::new(&rom(&[0x02]), EmulatorOptions::default()).unwrap();
        let error = emulator.frame().unwrap_err();
        assert_eq!(
            error,
            EmulatorError::Cpu(CpuError::InvalidOpcode {
                opcode: 0x02,
                pc: 0x8000
            })
        );
        let cycles = emulator.cpu_cycles();
        assert_eq!(emulator.clock().unwrap_err(), error);
        assert_eq!(emulator.cpu_cycles(), cycles);

        emulator.reset();
        assert!(emulator.halted().is_none());
    }

    #[test]
    fn test_update_button() {
        let mut emulator = Emulator::new(&rom(&IDLE), EmulatorOptions::default()).unwrap();
        emulator.update_button(Port::Two, Button::Start, true);
        assert!(emulator.controller2_mut().is_pressed(Button::Start));
        assert!(!emulator.controller1_mut().is_pressed(Button::Start));
    }
}
