use super::envelope::Envelope;
use super::LENGTH_TABLE;

const PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Noise channel ($400C-$400F)
#[derive(Debug, Clone)]
pub struct Noise {
    enabled: bool,
    output: u8,
    length_counter: u8,
    envelope: Envelope,
    /// Short (93-step) sequence
    short_mode: bool,
    period: u16,
    timer_counter: u16,
    /// 15-bit linear feedback shift register
    shift: u16,
}

impl Noise {
    pub fn new() -> Self {
        Self {
            enabled: false,
            output: 0,
            length_counter: 0,
            envelope: Envelope::default(),
            short_mode: false,
            period: PERIOD_TABLE[0],
            timer_counter: 0,
            shift: 1,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter = 0;
        }
    }

    pub fn length_counter(&self) -> u8 {
        self.length_counter
    }

    pub fn output(&self) -> u8 {
        self.output
    }

    pub fn write(&mut self, register: u16, data: u8) {
        match register {
            0 => self.envelope.write(data),
            1 => {}
            2 => {
                self.short_mode = data & 0x80 != 0;
                self.period = PERIOD_TABLE[usize::from(data & 0x0F)];
                self.timer_counter = 0;
            }
            _ => self.length_counter = LENGTH_TABLE[usize::from(data >> 3)],
        }
    }

    /// Timer clock (every other CPU cycle)
    pub fn clock(&mut self) {
        if !self.enabled {
            return;
        }
        if self.timer_counter == 0 {
            self.timer_counter = self.period;
            self.step();
        } else {
            self.timer_counter -= 1;
        }
    }

    fn step(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let feedback = (self.shift ^ (self.shift >> tap)) & 0x01;
        self.shift = (self.shift >> 1) | (feedback << 14);

        self.output = if self.length_counter == 0 || self.shift & 0x01 != 0 {
            0
        } else {
            self.envelope.output()
        };
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        if !self.envelope.looping() && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}
