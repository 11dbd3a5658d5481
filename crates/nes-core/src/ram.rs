//! Fixed-size RAM blocks
//!
//! Every block is addressed in the bus address space it is mapped into. The block subtracts
//! its base offset and wraps inside its own size, so an out-of-range address aliases instead
//! of faulting.

use crate::cpu::Bus;

/// A byte array mapped at a base address
#[derive(Debug, Clone)]
pub struct Ram {
    data: Vec<u8>,
    offset: u16,
}

impl Ram {
    /// Create a zero-filled block of `size` bytes mapped at `offset`
    pub fn new(size: usize, offset: u16) -> Self {
        Self {
            data: vec![0; size.max(1)],
            offset,
        }
    }

    fn index(&self, address: u16) -> usize {
        address.wrapping_sub(self.offset) as usize % self.data.len()
    }

    /// Size of the block in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Bus for Ram {
    fn read(&mut self, address: u16) -> u8 {
        self.data[self.index(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        let index = self.index(address);
        self.data[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_offset() {
        let mut ram = Ram::new(16, 0x3F00);
        ram.write(0x3F05, 0x2A);
        assert_eq!(ram.read(0x3F05), 0x2A);
        assert_eq!(ram.as_slice()[5], 0x2A);
    }

    #[test]
    fn test_ram_wraps_inside_block() {
        let mut ram = Ram::new(2048, 0);
        ram.write(0x0001, 0x43);
        assert_eq!(ram.read(0x0801), 0x43);
        // Past the end aliases the start of the block
        let mut ram = Ram::new(0x800, 0x2000);
        ram.write(0x2000, 0x11);
        assert_eq!(ram.read(0x2800), 0x11);
    }
}
