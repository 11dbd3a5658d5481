//! MMC1 (mapper 1)
//!
//! Registers are loaded one bit at a time through a 5-bit shift register. The fifth write
//! commits the value to the register selected by the address of that write.

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;

/// Shift register value with only the end-marker bit set
const SHIFT_RESET: u8 = 0x10;

pub struct Mmc1 {
    storage: Storage,
    mirroring: Mirroring,
    shift: u8,
    /// 0/1: 32KB, 2: fix first bank, 3: fix last bank
    prg_mode: u8,
    /// false: one 8KB bank, true: two 4KB banks
    chr_4k: bool,
    chr_banks: [u8; 2],
    prg_bank: u8,
}

impl Mmc1 {
    pub fn new(storage: Storage, mirroring: Mirroring) -> Self {
        Self {
            storage: storage.with_chr_size(128 * 1024),
            mirroring,
            shift: SHIFT_RESET,
            prg_mode: 3,
            chr_4k: false,
            chr_banks: [0, 0],
            prg_bank: 0,
        }
    }

    fn load_register(&mut self, address: u16, value: u8) {
        if value & 0x80 != 0 {
            self.shift = SHIFT_RESET;
            self.prg_mode = 3;
            return;
        }

        let complete = self.shift & 0x01 != 0;
        self.shift = (self.shift >> 1) | ((value & 0x01) << 4);
        if complete {
            self.write_register(address, self.shift);
            self.shift = SHIFT_RESET;
        }
    }

    fn write_register(&mut self, address: u16, value: u8) {
        match address {
            0x8000..=0x9FFF => {
                self.mirroring = match value & 0x03 {
                    0 => Mirroring::SingleScreenLower,
                    1 => Mirroring::SingleScreenUpper,
                    2 => Mirroring::Vertical,
                    _ => Mirroring::Horizontal,
                };
                self.prg_mode = (value >> 2) & 0x03;
                self.chr_4k = value & 0x10 != 0;
            }
            0xA000..=0xBFFF => self.chr_banks[0] = value & 0x1F,
            0xC000..=0xDFFF => self.chr_banks[1] = value & 0x1F,
            _ => self.prg_bank = value & 0x0F,
        }
        log::trace!(
            "MMC1 register {:04X} <- {:02X}: prg mode {}, prg bank {}, chr banks {:?}",
            address,
            value,
            self.prg_mode,
            self.prg_bank,
            self.chr_banks
        );
    }

    fn chr_offset(&self, address: u16) -> usize {
        let address = usize::from(address);
        if self.chr_4k {
            (usize::from(self.chr_banks[address >> 12]) << 12) + (address & 0x0FFF)
        } else {
            (usize::from(self.chr_banks[0] & 0x1E) << 12) + address
        }
    }

    fn prg_offset(&self, address: u16) -> usize {
        let address = usize::from(address - 0x8000);
        let first_half = address < 0x4000;
        let offset = address & 0x3FFF;
        let bank = usize::from(self.prg_bank);
        let last_bank = (self.storage.prg_len() / 0x4000).saturating_sub(1);

        match self.prg_mode {
            0 | 1 => ((bank & 0x0E) << 14) + address,
            2 if first_half => offset,
            2 => (bank << 14) + offset,
            _ if first_half => (bank << 14) + offset,
            _ => (last_bank << 14) + offset,
        }
    }
}

impl Bus for Mmc1 {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.storage.read_chr(self.chr_offset(address)),
            0x6000..=0x7FFF => self.storage.read_sram(address),
            0x8000..=0xFFFF => self.storage.read_prg(self.prg_offset(address)),
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
            0x8000..=0xFFFF => self.load_register(address, value),
            _ => {}
        }
    }
}

impl Mapper for Mmc1 {
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
