//! NROM (mapper 0): no bank switching

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;

pub struct Nrom {
    storage: Storage,
    mirroring: Mirroring,
}

impl Nrom {
    pub fn new(storage: Storage, mirroring: Mirroring) -> Self {
        Self { storage, mirroring }
    }

    fn prg_offset(&self, address: u16) -> usize {
        // A single 16KB bank appears at both 0x8000 and 0xC000
        let address = if self.storage.prg_len() == 0x4000 {
            address & 0xBFFF
        } else {
            address
        };
        usize::from(address - 0x8000)
    }
}

impl Bus for Nrom {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.storage.read_chr(usize::from(address)),
            0x6000..=0x7FFF => self.storage.read_sram(address),
            0x8000..=0xFFFF => self.storage.read_prg(self.prg_offset(address)),
            _ => 0,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.storage.write_chr(usize::from(address), value),
            0x6000..=0x7FFF => self.storage.write_sram(address, value),
            _ => {}
        }
    }
}

impl Mapper for Nrom {
    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn sram(&self) -> &[u8] {
        &self.storage.sram
    }

    fn sram_mut(&mut self) -> &mut [u8] {
        &mut self.storage.sram
    }
}
