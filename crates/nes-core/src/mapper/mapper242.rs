//! iNES mapper 242: 32KB PRG bank and mirroring from a single register

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;

pub struct Mapper242 {
    storage: Storage,
    mirroring: Mirroring,
    prg_bank: u8,
}

impl Mapper242 {
    pub fn new(storage: Storage, mirroring: Mirroring) -> Self {
        Self {
            storage: storage.with_chr_size(0x2000),
            mirroring,
            prg_bank: 0,
        }
    }
}

impl Bus for Mapper242 {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.storage.read_chr(usize::from(address)),
            0x6000..=0x7FFF => self.storage.read_sram(address),
            0x8000..=0xFFFF => {
                let offset = (usize::from(self.prg_bank) << 15) + usize::from(address - 0x8000);
                self.storage.read_prg(offset)
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.storage.write_chr(usize::from(address), value),
            0x6000..=0x7FFF => self.storage.write_sram(address, value),
            0x8000..=0xFFFF => {
                self.mirroring = if value & 0x02 != 0 {
                    Mirroring::Vertical
                } else {
                    Mirroring::Horizontal
                };
                self.prg_bank = (value >> 3) & 0x0F;
            }
            _ => {}
        }
    }
}

impl Mapper for Mapper242 {
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
    fn test_register_selects_bank_and_mirroring() {
        let prg = (0..4u8).flat_map(|bank| vec![bank; 0x8000]).collect();
        let mut mapper = Mapper242::new(Storage::new(prg, vec![]), Mirroring::Horizontal);

        mapper.write(0x8000, (2 << 3) | 0x02);
        assert_eq!(mapper.read(0x8000), 2);
        assert_eq!(mapper.read(0xFFFF), 2);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);

        mapper.write(0x8000, 1 << 3);
        assert_eq!(mapper.read(0xC000), 1);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }
}
