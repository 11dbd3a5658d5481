use super::LENGTH_TABLE;

const SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, //
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Triangle channel ($4008-$400B)
#[derive(Debug, Clone, Default)]
pub struct Triangle {
    enabled: bool,
    output: u8,
    length_counter: u8,
    /// Also the linear counter control flag
    halt: bool,
    linear_reload_value: u8,
    linear_reload: bool,
    linear_counter: u8,
    timer: u16,
    timer_counter: u16,
    sequence: u8,
}

impl Triangle {
    pub fn new() -> Self {
        Self::default()
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
            0 => {
                self.halt = data & 0x80 != 0;
                self.linear_reload_value = data & 0x7F;
            }
            1 => {}
            2 => self.timer = (self.timer & 0xFF00) | u16::from(data),
            _ => {
                self.timer = (self.timer & 0x00FF) | ((u16::from(data) << 8) & 0x0700);
                self.length_counter = LENGTH_TABLE[usize::from(data >> 3)];
                self.linear_reload = true;
                self.timer_counter = 0;
            }
        }
    }

    /// Timer clock (every CPU cycle)
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
        // A silenced channel holds its level instead of dropping to 0, avoiding a pop
        if self.length_counter != 0 && self.linear_counter != 0 {
            self.sequence = self.sequence.wrapping_add(1);
        }
        self.output = SEQUENCE[usize::from(self.sequence & 0x1F)];
    }

    pub fn clock_linear_counter(&mut self) {
        if self.linear_reload {
            self.linear_counter = self.linear_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.halt {
            self.linear_reload = false;
        }
    }

    pub fn clock_length_counter(&mut self) {
        if !self.halt && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_needs_linear_counter() {
        let mut triangle = Triangle::new();
        triangle.set_enabled(true);
        triangle.write(0, 0x10);
        triangle.write(2, 0x00);
        triangle.write(3, 0x08);

        // Linear counter not loaded yet
        triangle.clock();
        assert_eq!(triangle.output(), 15);

        triangle.clock_linear_counter();
        triangle.clock();
        assert_eq!(triangle.output(), 14);
        triangle.clock();
        assert_eq!(triangle.output(), 13);
    }

    #[test]
    fn test_linear_counter_counts_down() {
        let mut triangle = Triangle::new();
        triangle.write(0, 0x02);
        triangle.write(3, 0x00);
        triangle.clock_linear_counter();
        assert_eq!(triangle.linear_counter, 2);
        triangle.clock_linear_counter();
        triangle.clock_linear_counter();
        triangle.clock_linear_counter();
        assert_eq!(triangle.linear_counter, 0);
    }
}
