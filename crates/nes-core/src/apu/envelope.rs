/// Volume envelope shared by the pulse and noise channels
#[derive(Debug, Clone, Copy, Default)]
pub struct Envelope {
    /// Restart at 15 after reaching 0; doubles as the length counter halt flag
    looping: bool,
    constant: bool,
    /// Constant volume, or the divider period
    value: u8,
    volume: u8,
    counter: u32,
}

impl Envelope {
    /// Register 0 of the channel: `--LC VVVV`
    pub fn write(&mut self, data: u8) {
        self.looping = data & 0x20 != 0;
        self.constant = data & 0x10 != 0;
        self.value = data & 0x0F;
        self.volume = 15;
        self.counter = 0;
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.constant {
            return;
        }
        if self.counter % (u32::from(self.value) + 1) == 0 {
            self.volume = match self.volume {
                0 if self.looping => 15,
                0 => 0,
                v => v - 1,
            };
        }
        self.counter += 1;
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Current output level (0-15)
    pub fn output(&self) -> u8 {
        if self.constant {
            self.value
        } else {
            self.volume
        }
    }
}
