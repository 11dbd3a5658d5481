//! MMC3 (mapper 4) and the mapper 74 variant
//!
//! Eight bank registers R0-R7 are routed to 1KB CHR windows and 8KB PRG windows through two
//! lookup tables, one per inversion/mode bit. A scanline counter clocked late in each rendered
//! line drives the IRQ.

use super::{Mapper, Storage};
use crate::cartridge::Mirroring;
use crate::cpu::Bus;
use crate::interrupt::InterruptSink;

/// Register feeding each 1KB CHR window, indexed by [A12 inversion][address >> 10]
const CHR_BANK_TABLE: [[usize; 8]; 2] = [[0, 0, 1, 1, 2, 3, 4, 5], [2, 3, 4, 5, 0, 0, 1, 1]];

/// PRG window source, indexed by [PRG mode][(address - 0x8000) >> 13]
#[derive(Clone, Copy)]
enum PrgBank {
    Register(usize),
    /// Counted from the last bank
    FromEnd(usize),
}

const PRG_BANK_TABLE: [[PrgBank; 4]; 2] = [
    [
        PrgBank::Register(6),
        PrgBank::Register(7),
        PrgBank::FromEnd(2),
        PrgBank::FromEnd(1),
    ],
    [
        PrgBank::FromEnd(2),
        PrgBank::Register(7),
        PrgBank::Register(6),
        PrgBank::FromEnd(1),
    ],
];

/// Dot on which the scanline counter is clocked
const IRQ_DOT: u16 = 260;

pub struct Mmc3 {
    storage: Storage,
    mirroring: Mirroring,
    registers: [u8; 8],
    selected: usize,
    prg_mode: usize,
    chr_inversion: usize,
    irq_enabled: bool,
    irq_latch: u8,
    irq_counter: u8,
    /// Mapper 74 keeps 2KB of CHR RAM behind banks 8 and 9
    chr_ram: Option<Vec<u8>>,
}

impl Mmc3 {
    pub fn new(storage: Storage, mirroring: Mirroring) -> Self {
        Self {
            storage: storage.with_chr_size(256 * 1024),
            mirroring,
            registers: [0; 8],
            selected: 0,
            prg_mode: 0,
            chr_inversion: 0,
            irq_enabled: false,
            irq_latch: 0,
            irq_counter: 0,
            chr_ram: None,
        }
    }

    /// Mapper 74: MMC3 with CHR banks 8 and 9 backed by RAM
    pub fn with_chr_ram_banks(storage: Storage, mirroring: Mirroring) -> Self {
        Self {
            chr_ram: Some(vec![0; 0x800]),
            ..Self::new(storage, mirroring)
        }
    }

    fn prg_offset(&self, address: u16) -> usize {
        let window = usize::from(address - 0x8000) >> 13;
        let offset = usize::from(address & 0x1FFF);
        let banks = self.storage.prg_len() >> 13;

        let bank = match PRG_BANK_TABLE[self.prg_mode][window] {
            PrgBank::Register(r) => usize::from(self.registers[r]),
            PrgBank::FromEnd(n) => banks.saturating_sub(n),
        };
        (bank << 13) + offset
    }

    /// 1KB CHR bank number and offset within it
    fn chr_bank(&self, address: u16) -> (usize, usize) {
        let window = usize::from(address >> 10) & 0x07;
        let register = CHR_BANK_TABLE[self.chr_inversion][window];
        let mut bank = usize::from(self.registers[register]);
        // R0/R1 select 2KB; the odd half uses the next bank
        if register < 2 && window % 2 == 1 {
            bank += 1;
        }
        (bank, usize::from(address & 0x03FF))
    }

    fn chr_ram_index(&self, bank: usize, offset: usize) -> Option<usize> {
        match (&self.chr_ram, bank) {
            (Some(_), 8 | 9) => Some(((bank - 8) << 10) + offset),
            _ => None,
        }
    }

    fn read_chr(&self, address: u16) -> u8 {
        let (bank, offset) = self.chr_bank(address);
        match (self.chr_ram_index(bank, offset), &self.chr_ram) {
            (Some(index), Some(ram)) => ram[index],
            _ => self.storage.read_chr((bank << 10) + offset),
        }
    }

    fn write_chr(&mut self, address: u16, value: u8) {
        let (bank, offset) = self.chr_bank(address);
        match (self.chr_ram_index(bank, offset), &mut self.chr_ram) {
            (Some(index), Some(ram)) => ram[index] = value,
            _ => self.storage.write_chr((bank << 10) + offset, value),
        }
    }

    fn write_register(&mut self, address: u16, value: u8) {
        let odd = address & 0x01 != 0;
        match (address, odd) {
            (0x8000..=0x9FFF, false) => {
                self.selected = usize::from(value & 0x07);
                self.prg_mode = usize::from(value & 0x40 != 0);
                self.chr_inversion = usize::from(value & 0x80 != 0);
            }
            (0x8000..=0x9FFF, true) => {
                let value = match self.selected {
                    6 | 7 => value & 0x3F,
                    0 | 1 => value & 0xFE,
                    _ => value,
                };
                self.registers[self.selected] = value;
                log::trace!("MMC3 R{} <- {:02X}", self.selected, value);
            }
            (0xA000..=0xBFFF, false) => {
                if self.mirroring != Mirroring::FourScreen {
                    self.mirroring = if value & 0x01 != 0 {
                        Mirroring::Horizontal
                    } else {
                        Mirroring::Vertical
                    };
                }
            }
            // PRG RAM protect is not emulated
            (0xA000..=0xBFFF, true) => {}
            (0xC000..=0xDFFF, false) => self.irq_latch = value,
            (0xC000..=0xDFFF, true) => self.irq_counter = 0,
            (_, false) => self.irq_enabled = false,
            (_, true) => self.irq_enabled = true,
        }
    }
}

impl Bus for Mmc3 {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.read_chr(address),
            0x6000..=0x7FFF => self.storage.read_sram(address),
            0x8000..=0xFFFF => self.storage.read_prg(self.prg_offset(address)),
            _ => 0,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.write_chr(address, value),
            0x6000..=0x7FFF => self.storage.write_sram(address, value),
            0x8000..=0xFFFF => self.write_register(address, value),
            _ => {}
        }
    }
}

impl Mapper for Mmc3 {
    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn on_ppu_cycle(&mut self, scanline: u16, dot: u16, interrupt: &mut dyn InterruptSink) {
        if dot != IRQ_DOT || (240..=260).contains(&scanline) {
            return;
        }

        if self.irq_counter == 0 {
            self.irq_counter = self.irq_latch;
        } else {
            self.irq_counter -= 1;
            if self.irq_counter == 0 && self.irq_enabled {
                interrupt.irq();
            }
        }
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
    use crate::interrupt::InterruptLines;

    /// 8 PRG banks of 8KB and 16 CHR banks of 1KB, each filled with its bank number
    fn mmc3() -> Mmc3 {
        let prg = (0..8u8).flat_map(|bank| vec![bank; 0x2000]).collect();
        let chr = (0..16u8).flat_map(|bank| vec![0x40 | bank; 0x400]).collect();
        Mmc3::new(Storage::new(prg, chr), Mirroring::Vertical)
    }

    fn set_register(mapper: &mut Mmc3, register: u8, value: u8) {
        mapper.write(0x8000, register);
        mapper.write(0x8001, value);
    }

    #[test]
    fn test_prg_modes() {
        let mut mapper = mmc3();
        set_register(&mut mapper, 6, 3);
        set_register(&mut mapper, 7, 4);
        assert_eq!(mapper.read(0x8000), 3);
        assert_eq!(mapper.read(0xA000), 4);
        assert_eq!(mapper.read(0xC000), 6);
        assert_eq!(mapper.read(0xE000), 7);

        mapper.write(0x8000, 0x46);
        assert_eq!(mapper.read(0x8000), 6);
        assert_eq!(mapper.read(0xC000), 3);
    }

    #[test]
    fn test_chr_2k_and_inversion() {
        let mut mapper = mmc3();
        // Low bit of R0 is ignored
        set_register(&mut mapper, 0, 5);
        set_register(&mut mapper, 2, 9);
        assert_eq!(mapper.read(0x0000), 0x44);
        assert_eq!(mapper.read(0x0400), 0x45);
        assert_eq!(mapper.read(0x1000), 0x49);

        mapper.write(0x8000, 0x80);
        assert_eq!(mapper.read(0x0000), 0x49);
        assert_eq!(mapper.read(0x1400), 0x45);
    }

    #[test]
    fn test_mirroring_register() {
        let mut mapper = mmc3();
        mapper.write(0xA000, 0x01);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);

        let mut four = Mmc3::new(Storage::new(vec![0; 0x8000], vec![]), Mirroring::FourScreen);
        four.write(0xA000, 0x00);
        assert_eq!(four.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn test_scanline_irq() {
        let mut mapper = mmc3();
        let mut lines = InterruptLines::new();
        mapper.write(0xC000, 2);
        mapper.write(0xC001, 0);
        mapper.write(0xE001, 0);

        // Reload, then count down to zero
        mapper.on_ppu_cycle(0, IRQ_DOT, &mut lines);
        mapper.on_ppu_cycle(1, IRQ_DOT, &mut lines);
        assert!(!lines.take_irq());
        mapper.on_ppu_cycle(2, IRQ_DOT, &mut lines);
        assert!(lines.take_irq());

        // Other dots and the vblank band are ignored
        mapper.on_ppu_cycle(3, IRQ_DOT + 1, &mut lines);
        mapper.on_ppu_cycle(250, IRQ_DOT, &mut lines);
        assert_eq!(mapper.irq_counter, 0);
    }

    #[test]
    fn test_irq_disabled_counts_silently() {
        let mut mapper = mmc3();
        let mut lines = InterruptLines::new();
        mapper.write(0xC000, 1);
        mapper.write(0xE000, 0);
        for scanline in 0..4 {
            mapper.on_ppu_cycle(scanline, IRQ_DOT, &mut lines);
        }
        assert!(!lines.is_pending());
    }

    #[test]
    fn test_mapper74_chr_ram_banks() {
        let chr = vec![0x11; 0x2000];
        let mut mapper = Mmc3::with_chr_ram_banks(Storage::new(vec![0; 0x8000], chr), Mirroring::Vertical);
        set_register(&mut mapper, 2, 8);
        set_register(&mut mapper, 3, 3);
        mapper.write(0x1000, 0x5A);
        assert_eq!(mapper.read(0x1000), 0x5A);
        assert_eq!(mapper.read(0x1400), 0x11);
    }
}
