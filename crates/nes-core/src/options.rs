//! Emulator configuration

use std::fmt;

/// Default audio sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Callback receiving one mixed audio sample
pub type SampleCallback = Box<dyn FnMut(f32)>;
/// Callback receiving one completed 256x240 frame of `0x00RRGGBB` pixels
pub type FrameCallback = Box<dyn FnMut(&[u32])>;

/// Options passed to [`Emulator::new`](crate::system::Emulator::new)
///
/// ```
/// use nes_core::options::EmulatorOptions;
///
/// let options = EmulatorOptions::default()
///     .with_sample_rate(44_100)
///     .on_frame(|pixels| assert_eq!(pixels.len(), 256 * 240));
/// assert_eq!(options.sample_rate, 44_100);
/// ```
pub struct EmulatorOptions {
    pub sample_rate: u32,
    pub on_sample: SampleCallback,
    pub on_frame: FrameCallback,
    /// Battery RAM to preload
    pub sram: Option<Vec<u8>>,
}

impl EmulatorOptions {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_sram(mut self, sram: Vec<u8>) -> Self {
        self.sram = Some(sram);
        self
    }

    pub fn on_sample(mut self, callback: impl FnMut(f32) + 'static) -> Self {
        self.on_sample = Box::new(callback);
        self
    }

    pub fn on_frame(mut self, callback: impl FnMut(&[u32]) + 'static) -> Self {
        self.on_frame = Box::new(callback);
        self
    }
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            on_sample: Box::new(|_| {}),
            on_frame: Box::new(|_| {}),
            sram: None,
        }
    }
}

impl fmt::Debug for EmulatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmulatorOptions")
            .field("sample_rate", &self.sample_rate)
            .field("sram", &self.sram.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
