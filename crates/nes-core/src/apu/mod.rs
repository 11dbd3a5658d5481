//! APU (Audio Processing Unit) implementation
//!
//! The NES APU has five channels:
//! - Pulse 1 and Pulse 2 (square waves with envelope and sweep)
//! - Triangle (linear counter, 32-step sequence)
//! - Noise (15-bit shift register)
//! - DMC (delta modulation channel reading samples from cartridge space)
//!
//! A 240Hz frame sequencer clocks envelopes, length counters and sweeps, and can raise the
//! frame IRQ. Mixed samples are produced at the configured sample rate.

mod dmc;
mod envelope;
mod noise;
mod pulse;
mod triangle;

pub use dmc::Dmc;
pub use noise::Noise;
pub use pulse::{Pulse, PulseChannel};
pub use triangle::Triangle;

use crate::cpu::Bus;
use crate::interrupt::InterruptSink;

/// NTSC CPU clock in Hz
pub const CPU_FREQUENCY: f64 = 1_789_773.0;
/// Frame sequencer rate in Hz
const FRAME_SEQUENCER_RATE: f64 = 240.0;

pub(crate) const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, //
    12, 16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Frame sequencer mode ($4017 bit 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerMode {
    FourStep,
    FiveStep,
}

/// APU state
#[derive(Debug, Clone)]
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    mode: SequencerMode,
    irq_inhibit: bool,
    frame_irq: bool,
    sample_rate: u32,
    /// CPU cycles since power-on
    clocks: u64,
    /// Samples emitted so far
    samples: u64,
    /// CPU cycles since the last $4017 write
    sequencer_clocks: u64,
    sequencer_step: u64,
}

impl Apu {
    /// Create a new APU producing `sample_rate` samples per second
    pub fn new(sample_rate: u32) -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::One),
            pulse2: Pulse::new(PulseChannel::Two),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dmc: Dmc::new(),
            mode: SequencerMode::FourStep,
            irq_inhibit: false,
            frame_irq: false,
            sample_rate: sample_rate.max(1),
            clocks: 0,
            samples: 0,
            sequencer_clocks: 0,
            sequencer_step: 0,
        }
    }

    /// Advance one CPU cycle
    ///
    /// `memory` is the cartridge space the DMC reads samples from.
    pub fn clock<B: Bus + ?Sized>(
        &mut self,
        memory: &mut B,
        interrupt: &mut dyn InterruptSink,
        on_sample: &mut dyn FnMut(f32),
    ) {
        self.clocks += 1;
        if self.clocks & 0x01 != 0 {
            self.pulse1.clock();
            self.pulse2.clock();
            self.noise.clock();
        }
        self.dmc.clock(memory, interrupt);
        self.triangle.clock();

        let samples = (self.clocks as f64 / (CPU_FREQUENCY / f64::from(self.sample_rate))) as u64;
        if samples != self.samples {
            self.samples = samples;
            on_sample(self.mix());
        }

        self.sequencer_clocks += 1;
        let step = (self.sequencer_clocks as f64 / (CPU_FREQUENCY / FRAME_SEQUENCER_RATE)) as u64;
        if step != self.sequencer_step {
            self.sequencer_step = step;
            self.clock_sequencer(interrupt);
        }
    }

    /// Linear mixer approximation
    pub fn mix(&self) -> f32 {
        let pulse = 0.00752 * f32::from(self.pulse1.output() + self.pulse2.output());
        let tnd = 0.00851 * f32::from(self.triangle.output())
            + 0.00494 * f32::from(self.noise.output())
            + 0.00335 * f32::from(self.dmc.output());
        pulse + tnd
    }

    fn clock_sequencer(&mut self, interrupt: &mut dyn InterruptSink) {
        //  mode 0:    mode 1:      function
        //  ---------  -----------  -----------------------------
        //   - - - f    - - - - -    IRQ (if bit 6 is clear)
        //   - l - l    - l - - l    Length counter and sweep
        //   e e e e    e e e - e    Envelope and linear counter
        // Steps count from 1
        let step = self.sequencer_step - 1;
        match self.mode {
            SequencerMode::FourStep => match step % 4 {
                1 => {
                    self.clock_length_and_sweep();
                    self.clock_envelopes();
                }
                3 => {
                    self.raise_frame_irq(interrupt);
                    self.clock_length_and_sweep();
                    self.clock_envelopes();
                }
                _ => self.clock_envelopes(),
            },
            SequencerMode::FiveStep => match step % 5 {
                1 | 4 => {
                    self.clock_length_and_sweep();
                    self.clock_envelopes();
                }
                3 => {}
                _ => self.clock_envelopes(),
            },
        }
    }

    fn clock_envelopes(&mut self) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    fn clock_length_and_sweep(&mut self) {
        self.pulse1.clock_length_counter();
        self.pulse2.clock_length_counter();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
        self.pulse1.clock_sweep();
        self.pulse2.clock_sweep();
    }

    fn raise_frame_irq(&mut self, interrupt: &mut dyn InterruptSink) {
        if self.irq_inhibit {
            return;
        }
        self.frame_irq = true;
        interrupt.irq();
    }

    /// Read $4015; other addresses read 0
    pub fn read(&mut self, address: u16) -> u8 {
        if address != 0x4015 {
            return 0;
        }

        let value = u8::from(self.pulse1.length_counter() > 0)
            | u8::from(self.pulse2.length_counter() > 0) << 1
            | u8::from(self.triangle.length_counter() > 0) << 2
            | u8::from(self.noise.length_counter() > 0) << 3
            | u8::from(self.dmc.bytes_remaining() > 0) << 4
            | u8::from(self.frame_irq) << 6
            | u8::from(self.dmc.irq_flag()) << 7;
        // Only the frame IRQ flag is acknowledged by reading
        self.frame_irq = false;
        value
    }

    /// Write an APU register ($4000-$4013, $4015, $4017)
    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0x4000..=0x4003 => self.pulse1.write(address - 0x4000, value),
            0x4004..=0x4007 => self.pulse2.write(address - 0x4004, value),
            0x4008..=0x400B => self.triangle.write(address - 0x4008, value),
            0x400C..=0x400F => self.noise.write(address - 0x400C, value),
            0x4010..=0x4013 => self.dmc.write(address - 0x4010, value),
            0x4015 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
                self.dmc.clear_irq();
            }
            0x4017 => {
                self.mode = if value & 0x80 != 0 {
                    SequencerMode::FiveStep
                } else {
                    SequencerMode::FourStep
                };
                self.irq_inhibit = value & 0x40 != 0;
                self.sequencer_clocks = 0;
                self.sequencer_step = 0;
            }
            _ => {}
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn mode(&self) -> SequencerMode {
        self.mode
    }

    /// Frame IRQ flag as seen in $4015 bit 6
    pub fn frame_irq(&self) -> bool {
        self.frame_irq
    }

    pub fn pulse1(&self) -> &Pulse {
        &self.pulse1
    }

    pub fn pulse2(&self) -> &Pulse {
        &self.pulse2
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    pub fn dmc(&self) -> &Dmc {
        &self.dmc
    }
}
