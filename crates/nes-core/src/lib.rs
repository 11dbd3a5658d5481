//! NES Core - Pure Rust NES emulator library
//!
//! This crate provides the core emulation logic for a Nintendo Entertainment System (NES):
//! a cycle-stepped 6502 CPU, a dot-stepped PPU, the APU, iNES cartridge loading and the common
//! mappers. It has no windowing or audio-output dependencies; frames and samples are handed
//! to callbacks configured through [`options::EmulatorOptions`].
//!
//! ```no_run
//! use nes_core::options::EmulatorOptions;
//! use nes_core::system::Emulator;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rom = std::fs::read("game.nes")?;
//! let mut emulator = Emulator::new(&rom, EmulatorOptions::default())?;
//! emulator.frame()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

/// CPU module containing the 2A03 (6502 variant) implementation
pub mod cpu;
/// Static opcode table
pub mod opcodes;
/// CPU memory bus
pub mod bus;
/// RAM blocks
pub mod ram;
/// Interrupt lines
pub mod interrupt;
/// PPU (Picture Processing Unit) implementation
pub mod ppu;
/// PPU memory bus
pub mod ppu_bus;
/// NTSC color palette
pub mod palette;
/// APU (Audio Processing Unit)
pub mod apu;
/// OAM DMA unit
pub mod dma;
/// Cartridge loading
pub mod cartridge;
/// Mapper implementations
pub mod mapper;
/// Standard controllers
pub mod controller;
/// Emulator configuration
pub mod options;
/// Integration module for complete NES system
pub mod system;

pub use system::{Emulator, EmulatorError};
