//! Standard NES controller
//!
//! Writing 1 to $4016 holds the shift register in reload (strobe); writing 0 latches the
//! buttons. Each read then returns one button, A first, in bit 0.

/// Controller buttons, in shift-register order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// All buttons in report order
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Bit in the button state byte
    pub fn mask(self) -> u8 {
        match self {
            Button::A => 0x80,
            Button::B => 0x40,
            Button::Select => 0x20,
            Button::Start => 0x10,
            Button::Up => 0x08,
            Button::Down => 0x04,
            Button::Left => 0x02,
            Button::Right => 0x01,
        }
    }
}

/// Standard controller state
#[derive(Debug, Clone, Default)]
pub struct StandardController {
    buttons: u8,
    strobe: bool,
    offset: u8,
}

impl StandardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    /// $4016 write
    pub fn write(&mut self, data: u8) {
        if data & 0x01 != 0 {
            self.strobe = true;
        } else {
            self.offset = 0;
            self.strobe = false;
        }
    }

    /// $4016/$4017 read
    pub fn read(&mut self) -> u8 {
        let pressed = if self.strobe {
            self.is_pressed(Button::A)
        } else if self.offset < 8 {
            let bit = 0x80 >> self.offset;
            self.offset += 1;
            self.buttons & bit != 0
        } else {
            false
        };
        u8::from(pressed)
    }
}
