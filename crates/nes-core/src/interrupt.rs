//! Interrupt lines between the PPU, APU, mappers and the CPU

/// Something that accepts interrupt requests
pub trait InterruptSink {
    /// Request a maskable interrupt
    fn irq(&mut self);
    /// Request a non-maskable interrupt
    fn nmi(&mut self);
}

/// Latched interrupt requests waiting to be delivered to the CPU
///
/// Components raise requests into the latch during their tick; the system drains it into the
/// CPU as soon as that tick returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptLines {
    nmi: bool,
    irq: bool,
}

impl InterruptLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending NMI request, clearing it
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Take the pending IRQ request, clearing it
    pub fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.irq)
    }

    pub fn is_pending(&self) -> bool {
        self.nmi || self.irq
    }
}

impl InterruptSink for InterruptLines {
    fn irq(&mut self) {
        self.irq = true;
    }

    fn nmi(&mut self) {
        self.nmi = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_latch_until_taken() {
        let mut lines = InterruptLines::new();
        assert!(!lines.is_pending());

        lines.nmi();
        lines.irq();
        assert!(lines.is_pending());
        assert!(lines.take_nmi());
        assert!(!lines.take_nmi());
        assert!(lines.take_irq());
        assert!(!lines.is_pending());
    }
}
