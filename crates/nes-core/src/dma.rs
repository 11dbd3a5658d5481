//! OAM DMA ($4014)
//!
//! Copies one 256-byte CPU page into sprite memory. The CPU is halted for 513 cycles, plus one
//! more when the transfer starts on an odd cycle.

use crate::cpu::Bus;
use crate::ppu::OAM_SIZE;

/// Pending CPU stall from the last transfer
#[derive(Debug, Clone, Copy, Default)]
pub struct Dma {
    stall: Option<u32>,
}

impl Dma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read page `page` (`$XX00-$XXFF`) through the CPU bus
    pub fn read_page(bus: &mut impl Bus, page: u8) -> [u8; OAM_SIZE] {
        let base = u16::from(page) << 8;
        let mut data = [0u8; OAM_SIZE];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = bus.read(base.wrapping_add(i as u16));
        }
        data
    }

    /// Record the stall for a transfer triggered at CPU cycle `cpu_cycles`
    pub fn schedule(&mut self, cpu_cycles: u64) {
        let stall = if cpu_cycles & 0x01 != 0 { 514 } else { 513 };
        log::trace!("OAM DMA at CPU cycle {}, stalling {} cycles", cpu_cycles, stall);
        self.stall = Some(stall);
    }

    /// Take the pending stall, if a transfer happened
    pub fn take_stall(&mut self) -> Option<u32> {
        self.stall.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting;

    impl Bus for Counting {
        fn read(&mut self, address: u16) -> u8 {
            address as u8 ^ (address >> 8) as u8
        }

        fn write(&mut self, _address: u16, _value: u8) {}
    }

    #[test]
    fn test_read_page() {
        let page = Dma::read_page(&mut Counting, 0x02);
        assert_eq!(page[0], 0x02);
        assert_eq!(page[0xFF], 0xFD);
    }

    #[test]
    fn test_stall_parity() {
        let mut dma = Dma::new();
        assert_eq!(dma.take_stall(), None);
        dma.schedule(100);
        assert_eq!(dma.take_stall(), Some(513));
        assert_eq!(dma.take_stall(), None);
        dma.schedule(101);
        assert_eq!(dma.take_stall(), Some(514));
    }
}
