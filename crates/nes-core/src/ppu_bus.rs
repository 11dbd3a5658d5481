//! PPU address space
//!
//! ```text
//! 0x0000-0x1FFF  pattern tables (cartridge)
//! 0x2000-0x2FFF  nametables, through the cartridge mirroring
//! 0x3000-0x3EFF  mirror of 0x2000-0x2EFF
//! 0x3F00-0x3FFF  palette RAM (32 bytes, mirrored)
//! ```

use crate::cpu::Bus;
use crate::mapper::Mapper;
use crate::ram::Ram;

/// Nametable RAM size; the upper half is only reachable with four-screen mirroring
pub const NAMETABLE_RAM_SIZE: usize = 4096;
/// Palette RAM size
pub const PALETTE_RAM_SIZE: usize = 32;

/// Borrowed view of everything the PPU can address
pub struct PpuBus<'a> {
    pub mapper: &'a mut dyn Mapper,
    pub nametables: &'a mut Ram,
    pub palettes: &'a mut Ram,
}

impl<'a> PpuBus<'a> {
    pub fn new(mapper: &'a mut dyn Mapper, nametables: &'a mut Ram, palettes: &'a mut Ram) -> Self {
        Self {
            mapper,
            nametables,
            palettes,
        }
    }
}

/// Sprite palette entries 0x3F10/14/18/1C share storage with 0x3F00/04/08/0C
fn palette_address(address: u16) -> u16 {
    let address = address & 0x3F1F;
    match address {
        0x3F10 | 0x3F14 | 0x3F18 | 0x3F1C => address - 0x10,
        _ => address,
    }
}

impl Bus for PpuBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        let address = address & 0x3FFF;
        match address {
            0x0000..=0x1FFF => self.mapper.read(address),
            0x2000..=0x2FFF => {
                let address = self.mapper.mirroring().nametable_address(address);
                self.nametables.read(address)
            }
            0x3000..=0x3EFF => self.read(address - 0x1000),
            _ => self.palettes.read(palette_address(address)),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let address = address & 0x3FFF;
        match address {
            0x0000..=0x1FFF => self.mapper.write(address, value),
            0x2000..=0x2FFF => {
                let address = self.mapper.mirroring().nametable_address(address);
                self.nametables.write(address, value);
            }
            0x3000..=0x3EFF => self.write(address - 0x1000, value),
            _ => self.palettes.write(palette_address(address), value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use crate::mapper::{Nrom, Storage};

    struct Fixture {
        mapper: Nrom,
        nametables: Ram,
        palettes: Ram,
    }

    impl Fixture {
        fn new(mirroring: Mirroring) -> Self {
            Self {
                mapper: Nrom::new(Storage::new(vec![0; 0x4000], vec![]), mirroring),
                nametables: Ram::new(NAMETABLE_RAM_SIZE, 0x2000),
                palettes: Ram::new(PALETTE_RAM_SIZE, 0x3F00),
            }
        }

        fn bus(&mut self) -> PpuBus<'_> {
            PpuBus::new(&mut self.mapper, &mut self.nametables, &mut self.palettes)
        }
    }

    #[test]
    fn test_vertical_mirroring() {
        let mut fixture = Fixture::new(Mirroring::Vertical);
        let mut bus = fixture.bus();
        bus.write(0x2005, 0x77);
        assert_eq!(bus.read(0x2805), 0x77);
        assert_eq!(bus.read(0x2405), 0x00);
        // 0x3000 region mirrors the nametables
        assert_eq!(bus.read(0x3005), 0x77);
    }

    #[test]
    fn test_horizontal_mirroring() {
        let mut fixture = Fixture::new(Mirroring::Horizontal);
        let mut bus = fixture.bus();
        bus.write(0x2C01, 0x42);
        assert_eq!(bus.read(0x2801), 0x42);
        assert_eq!(bus.read(0x2001), 0x00);
    }

    #[test]
    fn test_sprite_palette_aliases() {
        let mut fixture = Fixture::new(Mirroring::Horizontal);
        let mut bus = fixture.bus();
        bus.write(0x3F10, 0x0F);
        assert_eq!(bus.read(0x3F00), 0x0F);
        bus.write(0x3F04, 0x21);
        assert_eq!(bus.read(0x3F14), 0x21);
        // 0x3F11 is its own entry
        bus.write(0x3F11, 0x30);
        assert_eq!(bus.read(0x3F01), 0x00);
        // Whole 0x3F00 page repeats every 32 bytes
        assert_eq!(bus.read(0x3F31), 0x30);
    }

    #[test]
    fn test_pattern_tables_reach_cartridge() {
        let mut fixture = Fixture::new(Mirroring::Horizontal);
        fixture.bus().write(0x0123, 0x5C);
        assert_eq!(fixture.mapper.read(0x0123), 0x5C);
        assert_eq!(fixture.bus().read(0x4123), 0x5C);
    }
}
