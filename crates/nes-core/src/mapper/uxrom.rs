//! UxROM (mapper 2): switchable 16KB bank at 0x8000, last bank fixed at 0xC000

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;

pub struct Uxrom {
    storage: Storage,
    mirroring: Mirroring,
    bank: u8,
}

impl Uxrom {
    pub fn new(storage: Storage, mirroring: Mirroring) -> Self {
        Self {
            storage: storage.with_chr_size(0x2000),
            mirroring,
            bank: 0,
        }
    }

    fn prg_offset(&self, address: u16) -> usize {
        if address < 0xC000 {
            (usize::from(self.bank) << 14) + usize::from(address - 0x8000)
        } else {
            self.storage.prg_len().saturating_sub(0x4000) + usize::from(address - 0xC000)
        }
    }
}

impl Bus for Uxrom {
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
            0x8000..=0xFFFF => {
                self.bank = value & 0x0F;
                log::trace!("UxROM PRG bank {}", self.bank);
            }
            _ => {}
        }
    }
}

impl Mapper for Uxrom {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_switch_and_fixed_bank() {
        let prg = (0..4u8).flat_map(|bank| vec![bank; 0x4000]).collect();
        let mut mapper = Uxrom::new(Storage::new(prg, vec![]), Mirroring::Vertical);
        assert_eq!(mapper.read(0x8000), 0);
        assert_eq!(mapper.read(0xC000), 3);

        mapper.write(0x8000, 2);
        assert_eq!(mapper.read(0xBFFF), 2);
        assert_eq!(mapper.read(0xFFFF), 3);

        // Bank numbers past the end wrap
        mapper.write(0xFFFF, 5);
        assert_eq!(mapper.read(0x8000), 1);
    }

    #[test]
    fn test_prg_smaller_than_one_bank() {
        let mut prg = vec![0; 0x2000];
        prg[0x10] = 0xAB;
        let mut mapper = Uxrom::new(Storage::new(prg, vec![]), Mirroring::Vertical);
        assert_eq!(mapper.read(0xC010), 0xAB);
        assert_eq!(mapper.read(0xE010), 0xAB);
    }
}
