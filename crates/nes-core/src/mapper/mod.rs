//! Cartridge mapper chips
//!
//! Every board sees the same address space: pattern memory below 0x2000 (PPU side), battery
//! RAM at 0x6000-0x7FFF and PRG ROM or bank registers from 0x8000 (CPU side). Everything else
//! reads as 0.

mod cnrom;
mod mapper242;
mod mmc1;
mod mmc3;
mod nrom;
mod uxrom;

pub use cnrom::Cnrom;
pub use mapper242::Mapper242;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use uxrom::Uxrom;

use crate::cartridge::Mirroring;
use crate::cpu::Bus;
use crate::interrupt::InterruptSink;

/// Battery RAM size
pub const SRAM_SIZE: usize = 0x2000;

/// Bank switching chip on the cartridge
///
/// `read`/`write` are shared by the CPU bus (PRG side) and the PPU bus (CHR side).
pub trait Mapper: Bus {
    /// Current nametable mirroring
    fn mirroring(&self) -> Mirroring;

    /// Called on every PPU dot while rendering is enabled
    fn on_ppu_cycle(&mut self, _scanline: u16, _dot: u16, _interrupt: &mut dyn InterruptSink) {}

    /// Battery RAM contents
    fn sram(&self) -> &[u8];

    fn sram_mut(&mut self) -> &mut [u8];
}

/// Build the mapper for an iNES mapper number
pub fn create(number: u8, storage: Storage, mirroring: Mirroring) -> Option<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match number {
        0 => Box::new(Nrom::new(storage, mirroring)),
        1 => Box::new(Mmc1::new(storage, mirroring)),
        2 => Box::new(Uxrom::new(storage, mirroring)),
        3 => Box::new(Cnrom::new(storage, mirroring)),
        4 => Box::new(Mmc3::new(storage, mirroring)),
        74 => Box::new(Mmc3::with_chr_ram_banks(storage, mirroring)),
        242 => Box::new(Mapper242::new(storage, mirroring)),
        _ => return None,
    };
    Some(mapper)
}

/// PRG, CHR and battery memory owned by a mapper
///
/// Offsets wrap modulo the backing size so a bad bank number aliases instead of panicking.
#[derive(Debug, Clone)]
pub struct Storage {
    prg: Vec<u8>,
    chr: Vec<u8>,
    sram: Vec<u8>,
}

impl Storage {
    /// An empty CHR section becomes 8KB of CHR RAM
    pub fn new(prg: Vec<u8>, chr: Vec<u8>) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        Self {
            prg: if prg.is_empty() { vec![0; 0x4000] } else { prg },
            chr,
            sram: vec![0; SRAM_SIZE],
        }
    }

    /// Grow CHR to at least `size` bytes, zero-filling the tail
    fn with_chr_size(mut self, size: usize) -> Self {
        if self.chr.len() < size {
            self.chr.resize(size, 0);
        }
        self
    }

    fn prg_len(&self) -> usize {
        self.prg.len()
    }

    fn read_prg(&self, offset: usize) -> u8 {
        self.prg[offset % self.prg.len()]
    }

    fn read_chr(&self, offset: usize) -> u8 {
        self.chr[offset % self.chr.len()]
    }

    fn write_chr(&mut self, offset: usize, value: u8) {
        let len = self.chr.len();
        self.chr[offset % len] = value;
    }

    fn read_sram(&self, address: u16) -> u8 {
        self.sram[usize::from(address - 0x6000) % SRAM_SIZE]
    }

    fn write_sram(&mut self, address: u16, value: u8) {
        self.sram[usize::from(address - 0x6000) % SRAM_SIZE] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_mappers() {
        for number in [0u8, 1, 2, 3, 4, 74, 242] {
            let storage = Storage::new(vec![0; 0x8000], vec![0; 0x2000]);
            assert!(create(number, storage, Mirroring::Horizontal).is_some());
        }
        let storage = Storage::new(vec![0; 0x8000], vec![]);
        assert!(create(7, storage, Mirroring::Horizontal).is_none());
    }

    #[test]
    fn test_storage_wraps() {
        let mut prg = vec![0; 0x4000];
        prg[0x10] = 0xAB;
        let mut storage = Storage::new(prg, vec![]);
        assert_eq!(storage.read_prg(0x4010), 0xAB);
        storage.write_chr(0x2005, 0x55);
        assert_eq!(storage.read_chr(0x0005), 0x55);
    }
}
