use crate::cpu::Bus;
use crate::interrupt::InterruptSink;

/// Output unit period in CPU cycles, per rate index
const RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// Delta modulation channel ($4010-$4013)
#[derive(Debug, Clone)]
pub struct Dmc {
    enabled: bool,
    /// 7-bit output level
    output: u8,
    irq_enabled: bool,
    irq_flag: bool,
    looping: bool,
    rate: u8,
    clocks: u32,
    silenced: bool,
    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    shift: u8,
    bits_remaining: u8,
}

impl Dmc {
    pub fn new() -> Self {
        Self {
            enabled: false,
            output: 0,
            irq_enabled: false,
            irq_flag: false,
            looping: false,
            rate: 0,
            clocks: 0,
            silenced: true,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            shift: 0,
            bits_remaining: 0,
        }
    }

    /// $4015 bit 4: starts the sample if none is playing, or stops it
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart();
        }
    }

    pub fn bytes_remaining(&self) -> u16 {
        self.bytes_remaining
    }

    pub fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    pub fn output(&self) -> u8 {
        self.output
    }

    pub fn write(&mut self, register: u16, data: u8) {
        match register {
            0 => {
                self.irq_enabled = data & 0x80 != 0;
                self.looping = data & 0x40 != 0;
                self.rate = data & 0x0F;
                self.clocks = 0;
                if !self.irq_enabled {
                    self.irq_flag = false;
                }
            }
            1 => self.output = data & 0x7F,
            // %11AAAAAA.AA000000
            2 => self.sample_address = 0xC000 + u16::from(data) * 64,
            // %LLLL.LLLL0001
            _ => self.sample_length = u16::from(data) * 16 + 1,
        }
    }

    fn restart(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
        self.silenced = false;
    }

    /// CPU clock; sample bytes are fetched from `memory`
    pub fn clock<B: Bus + ?Sized>(&mut self, memory: &mut B, interrupt: &mut dyn InterruptSink) {
        if !self.enabled {
            return;
        }
        if self.clocks % (u32::from(RATE_TABLE[usize::from(self.rate)]) + 1) == 0 {
            self.output_unit(memory, interrupt);
        }
        self.clocks += 1;
    }

    fn output_unit<B: Bus + ?Sized>(&mut self, memory: &mut B, interrupt: &mut dyn InterruptSink) {
        if self.bits_remaining == 0 {
            if self.silenced {
                return;
            }
            self.fetch(memory, interrupt);
            self.bits_remaining = 8;
        }

        // Level moves by 2 and stays inside 0-127
        if self.shift & 0x01 != 0 {
            if self.output <= 125 {
                self.output += 2;
            }
        } else if self.output >= 2 {
            self.output -= 2;
        }
        self.shift >>= 1;
        self.bits_remaining -= 1;
    }

    fn fetch<B: Bus + ?Sized>(&mut self, memory: &mut B, interrupt: &mut dyn InterruptSink) {
        if self.bytes_remaining == 0 {
            return;
        }

        self.shift = memory.read(self.current_address);
        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };

        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.looping {
                self.restart();
            } else {
                self.silenced = true;
                if self.irq_enabled {
                    self.irq_flag = true;
                    interrupt.irq();
                }
            }
        }
    }
}

impl Default for Dmc {
    fn default() -> Self {
        Self::new()
    }
}
