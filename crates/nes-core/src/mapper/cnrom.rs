//! CNROM (mapper 3): 8KB CHR bank select, fixed PRG

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;

pub struct Cnrom {
    storage: Storage,
    mirroring: Mirroring,
    chr_bank: u8,
}

impl Cnrom {
    pub fn new(mut storage: Storage, mirroring: Mirroring) -> Self {
        // 16KB boards see the same bank at 0x8000 and 0xC000
        if storage.prg.len() == 0x4000 {
            storage.prg.extend_from_within(..);
        }
        Self {
            storage: storage.with_chr_size(32 * 1024),
            mirroring,
            chr_bank: 0,
        }
    }

    fn chr_offset(&self, address: u16) -> usize {
        (usize::from(self.chr_bank) << 13) + usize::from(address)
    }
}

impl Bus for Cnrom {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.storage.read_chr(self.chr_offset(address)),
            0x6000..=0x7FFF => self.storage.read_sram(address),
            0x8000..=0xFFFF => self.storage.read_prg(usize::from(address - 0x8000)),
            _ => 0,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                let offset = self.chr_offset(address);
                self.storage.write_chr(offset, value);
            }
            0x6000..=0x7FFF => self.storage.write_sram(address, value),
            0x8000..=0xFFFF => {
                self.chr_bank = value & 0x03;
                log::trace!("CNROM CHR bank {}", self.chr_bank);
            }
            _ => {}
        }
    }
}

impl Mapper for Cnrom {
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
    fn test_chr_bank_select() {
        let chr = (0..4u8).flat_map(|bank| vec![0x10 + bank; 0x2000]).collect();
        let mut prg = vec![0; 0x4000];
        prg[0] = 0x99;
        let mut mapper = Cnrom::new(Storage::new(prg, chr), Mirroring::Horizontal);

        assert_eq!(mapper.read(0x0000), 0x10);
        mapper.write(0x8000, 0x02);
        assert_eq!(mapper.read(0x1FFF), 0x12);
        // Only two bits select the bank
        mapper.write(0x8000, 0x07);
        assert_eq!(mapper.read(0x0000), 0x13);

        assert_eq!(mapper.read(0x8000), 0x99);
        assert_eq!(mapper.read(0xC000), 0x99);
    }
}
