use super::envelope::Envelope;
use super::LENGTH_TABLE;

const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

/// Which pulse channel; they differ in how the sweep negates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseChannel {
    One,
    Two,
}

/// Square wave channel ($4000-$4003 / $4004-$4007)
#[derive(Debug, Clone)]
pub struct Pulse {
    channel: PulseChannel,
    enabled: bool,
    output: u8,
    length_counter: u8,
    duty: u8,
    envelope: Envelope,
    sweep_enabled: bool,
    sweep_period: u8,
    sweep_negate: bool,
    sweep_shift: u8,
    sweep_counter: u32,
    /// 11-bit period
    timer: u16,
    timer_counter: u16,
    sequence: u8,
}

impl Pulse {
    pub fn new(channel: PulseChannel) -> Self {
        Self {
            channel,
            enabled: false,
            output: 0,
            length_counter: 0,
            duty: 0,
            envelope: Envelope::default(),
            sweep_enabled: false,
            sweep_period: 0,
            sweep_negate: false,
            sweep_shift: 0,
            sweep_counter: 0,
            timer: 0,
            timer_counter: 0,
            sequence: 0,
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

    /// Current level (0-15)
    pub fn output(&self) -> u8 {
        self.output
    }

    pub fn write(&mut self, register: u16, data: u8) {
        match register {
            0 => {
                self.duty = data >> 6;
                self.envelope.write(data);
            }
            1 => {
                self.sweep_enabled = data & 0x80 != 0;
                self.sweep_period = (data >> 4) & 0x07;
                self.sweep_negate = data & 0x08 != 0;
                self.sweep_shift = data & 0x07;
                self.sweep_counter = 0;
            }
            2 => self.timer = (self.timer & 0xFF00) | u16::from(data),
            _ => {
                self.timer = (self.timer & 0x00FF) | ((u16::from(data) << 8) & 0x0700);
                self.length_counter = LENGTH_TABLE[usize::from(data >> 3)];
                self.timer_counter = 0;
            }
        }
    }

    /// Timer clock (every other CPU cycle)
    pub fn clock(&mut self) {
        if !self.enabled {
            return;
        }
        if self.timer_counter == 0 {
            self.timer_counter = self.timer;
            self.step();
        } else {
            self.timer_counter -= 1;
        }
    }

    fn step(&mut self) {
        self.sequence = self.sequence.wrapping_add(1);
        // The sweep unit mutes periods below 8 or above 0x7FF
        if !self.enabled || self.length_counter == 0 || self.timer < 8 || self.timer > 0x7FF {
            self.output = 0;
        } else {
            let level = DUTY_TABLE[usize::from(self.duty)][usize::from(self.sequence & 0x07)];
            self.output = self.envelope.output() * level;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        if !self.envelope.looping() && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }

    pub fn clock_sweep(&mut self) {
        if !self.sweep_enabled {
            return;
        }
        if self.sweep_counter % (u32::from(self.sweep_period) + 1) == 0 {
            let change = i32::from(self.timer >> self.sweep_shift);
            let mut target = i32::from(self.timer);
            if self.sweep_negate {
                target -= change;
            } else {
                target += change;
            }
            // Pulse 1 negates with ones' complement
            if self.channel == PulseChannel::One && (self.sweep_negate || change == 0) {
                target -= 1;
            }
            self.timer = target.clamp(0, 0xFFFF) as u16;
        }
        self.sweep_counter += 1;
    }

    /// Current 11-bit period
    pub fn period(&self) -> u16 {
        self.timer
    }
}
