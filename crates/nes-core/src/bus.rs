//! CPU memory bus
//!
//! The NES memory map:
//! $0000-$07FF - 2KB Internal RAM
//! $0800-$1FFF - RAM mirroring (repeats every $0800 bytes)
//! $2000-$2007 - PPU registers
//! $2008-$3FFF - PPU register mirrors (every 8 bytes)
//! $4000-$4013 - APU channel registers
//! $4014       - OAM DMA
//! $4015       - APU status / channel enable
//! $4016       - Controller strobe (write), controller 1 (read)
//! $4017       - APU frame counter (write), controller 2 (read)
//! $4018-$401F - Unused, reads 0
//! $4020-$FFFF - Cartridge (expansion, battery RAM, PRG ROM)
//!
//! [`CpuBus`] does not own anything. The emulator assembles one from borrowed components for
//! every CPU cycle, which keeps the components free of references to each other.

use crate::apu::Apu;
use crate::controller::StandardController;
use crate::cpu::Bus;
use crate::dma::Dma;
use crate::mapper::Mapper;
use crate::ppu::Ppu;
use crate::ppu_bus::PpuBus;
use crate::ram::Ram;

/// Internal RAM size in bytes
pub const RAM_SIZE: usize = 2048;

/// View of the CPU address space for one cycle
pub struct CpuBus<'a> {
    pub ram: &'a mut Ram,
    pub ppu: &'a mut Ppu,
    pub nametables: &'a mut Ram,
    pub palettes: &'a mut Ram,
    pub mapper: &'a mut dyn Mapper,
    pub apu: &'a mut Apu,
    pub dma: &'a mut Dma,
    pub controllers: &'a mut [StandardController; 2],
    /// CPU cycle count at the start of this cycle, for DMA alignment
    pub cpu_cycles: u64,
}

impl CpuBus<'_> {
    fn ppu_bus(&mut self) -> (&mut Ppu, PpuBus<'_>) {
        (
            &mut *self.ppu,
            PpuBus::new(&mut *self.mapper, &mut *self.nametables, &mut *self.palettes),
        )
    }

    fn oam_dma(&mut self, page: u8) {
        let data = Dma::read_page(&mut *self, page);
        self.ppu.dma_copy(&data);
        self.dma.schedule(self.cpu_cycles);
    }
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.ram.read(address & 0x07FF),
            0x2000..=0x3FFF => {
                let (ppu, mut bus) = self.ppu_bus();
                ppu.read_register(address, &mut bus)
            }
            0x4016 => self.controllers[0].read(),
            0x4017 => self.controllers[1].read(),
            0x4000..=0x4015 => self.apu.read(address),
            0x4018..=0x401F => 0,
            _ => self.mapper.read(address),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.ram.write(address & 0x07FF, value),
            0x2000..=0x3FFF => {
                let (ppu, mut bus) = self.ppu_bus();
                ppu.write_register(address, value, &mut bus);
            }
            0x4014 => self.oam_dma(value),
            0x4016 => {
                for controller in self.controllers.iter_mut() {
                    controller.write(value);
                }
            }
            0x4000..=0x4017 => self.apu.write(address, value),
            0x4018..=0x401F => {}
            _ => self.mapper.write(address, value),
        }
    }
}
