//! Opcode table for the 2A03
//!
//! One slot per opcode byte. Slots for bytes the CPU cannot execute (the KIL/JAM family and
//! the unstable store/transfer opcodes) are `None`; decoding them is a fatal fault.

/// Instruction kinds, including the undocumented combinations games rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,

    // Undocumented
    DCP, ISC, LAX, RLA, RRA, SAX, SLO, SRE,
}

/// Addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP ($nnnn)
    Indirect,
    /// ($nn,X)
    IndirectX,
    /// ($nn),Y
    IndirectY,
    Relative,
}

/// Decoded opcode metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub instruction: Instruction,
    pub mode: AddressingMode,
    /// Instruction length including the opcode byte
    pub bytes: u8,
    /// Base cycle cost
    pub cycles: u8,
    /// Extra cycles when the effective address crosses a page
    pub page_cycles: u8,
}

const fn op(
    instruction: Instruction,
    mode: AddressingMode,
    bytes: u8,
    cycles: u8,
    page_cycles: u8,
) -> Option<OpcodeEntry> {
    Some(OpcodeEntry { instruction, mode, bytes, cycles, page_cycles })
}

/// Look up an opcode byte
pub fn decode(opcode: u8) -> Option<&'static OpcodeEntry> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

/// The full 256-entry table
///
/// BRK is two bytes long: the second byte is padding skipped on return.
#[rustfmt::skip]
pub static OPCODE_TABLE: [Option<OpcodeEntry>; 256] = {
    use AddressingMode::*;
    use Instruction::*;
    [
        // 0x00
        op(BRK, ZeroPage, 2, 7, 0),  op(ORA, IndirectX, 2, 6, 0), None,                         op(SLO, IndirectX, 2, 8, 0),
        op(NOP, ZeroPage, 2, 3, 0),  op(ORA, ZeroPage, 2, 3, 0),  op(ASL, ZeroPage, 2, 5, 0),   op(SLO, ZeroPage, 2, 5, 0),
        op(PHP, Implied, 1, 3, 0),   op(ORA, Immediate, 2, 2, 0), op(ASL, Accumulator, 1, 2, 0), None,
        op(NOP, Absolute, 3, 4, 0),  op(ORA, Absolute, 3, 4, 0),  op(ASL, Absolute, 3, 6, 0),   op(SLO, Absolute, 3, 6, 0),
        // 0x10
        op(BPL, Relative, 2, 2, 1),  op(ORA, IndirectY, 2, 5, 1), None,                         op(SLO, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(ORA, ZeroPageX, 2, 4, 0), op(ASL, ZeroPageX, 2, 6, 0),  op(SLO, ZeroPageX, 2, 6, 0),
        op(CLC, Implied, 1, 2, 0),   op(ORA, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(SLO, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(ORA, AbsoluteX, 3, 4, 1), op(ASL, AbsoluteX, 3, 7, 0),  op(SLO, AbsoluteX, 3, 7, 0),
        // 0x20
        op(JSR, Absolute, 3, 6, 0),  op(AND, IndirectX, 2, 6, 0), None,                         op(RLA, IndirectX, 2, 8, 0),
        op(BIT, ZeroPage, 2, 3, 0),  op(AND, ZeroPage, 2, 3, 0),  op(ROL, ZeroPage, 2, 5, 0),   op(RLA, ZeroPage, 2, 5, 0),
        op(PLP, Implied, 1, 4, 0),   op(AND, Immediate, 2, 2, 0), op(ROL, Accumulator, 1, 2, 0), None,
        op(BIT, Absolute, 3, 4, 0),  op(AND, Absolute, 3, 4, 0),  op(ROL, Absolute, 3, 6, 0),   op(RLA, Absolute, 3, 6, 0),
        // 0x30
        op(BMI, Relative, 2, 2, 1),  op(AND, IndirectY, 2, 5, 1), None,                         op(RLA, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(AND, ZeroPageX, 2, 4, 0), op(ROL, ZeroPageX, 2, 6, 0),  op(RLA, ZeroPageX, 2, 6, 0),
        op(SEC, Implied, 1, 2, 0),   op(AND, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(RLA, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(AND, AbsoluteX, 3, 4, 1), op(ROL, AbsoluteX, 3, 7, 0),  op(RLA, AbsoluteX, 3, 7, 0),
        // 0x40
        op(RTI, Implied, 1, 6, 0),   op(EOR, IndirectX, 2, 6, 0), None,                         op(SRE, IndirectX, 2, 8, 0),
        op(NOP, ZeroPage, 2, 3, 0),  op(EOR, ZeroPage, 2, 3, 0),  op(LSR, ZeroPage, 2, 5, 0),   op(SRE, ZeroPage, 2, 5, 0),
        op(PHA, Implied, 1, 3, 0),   op(EOR, Immediate, 2, 2, 0), op(LSR, Accumulator, 1, 2, 0), None,
        op(JMP, Absolute, 3, 3, 0),  op(EOR, Absolute, 3, 4, 0),  op(LSR, Absolute, 3, 6, 0),   op(SRE, Absolute, 3, 6, 0),
        // 0x50
        op(BVC, Relative, 2, 2, 1),  op(EOR, IndirectY, 2, 5, 1), None,                         op(SRE, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(EOR, ZeroPageX, 2, 4, 0), op(LSR, ZeroPageX, 2, 6, 0),  op(SRE, ZeroPageX, 2, 6, 0),
        op(CLI, Implied, 1, 2, 0),   op(EOR, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(SRE, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(EOR, AbsoluteX, 3, 4, 1), op(LSR, AbsoluteX, 3, 7, 0),  op(SRE, AbsoluteX, 3, 7, 0),
        // 0x60
        op(RTS, Implied, 1, 6, 0),   op(ADC, IndirectX, 2, 6, 0), None,                         op(RRA, IndirectX, 2, 8, 0),
        op(NOP, ZeroPage, 2, 3, 0),  op(ADC, ZeroPage, 2, 3, 0),  op(ROR, ZeroPage, 2, 5, 0),   op(RRA, ZeroPage, 2, 5, 0),
        op(PLA, Implied, 1, 4, 0),   op(ADC, Immediate, 2, 2, 0), op(ROR, Accumulator, 1, 2, 0), None,
        op(JMP, Indirect, 3, 5, 0),  op(ADC, Absolute, 3, 4, 0),  op(ROR, Absolute, 3, 6, 0),   op(RRA, Absolute, 3, 6, 0),
        // 0x70
        op(BVS, Relative, 2, 2, 1),  op(ADC, IndirectY, 2, 5, 1), None,                         op(RRA, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(ADC, ZeroPageX, 2, 4, 0), op(ROR, ZeroPageX, 2, 6, 0),  op(RRA, ZeroPageX, 2, 6, 0),
        op(SEI, Implied, 1, 2, 0),   op(ADC, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(RRA, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(ADC, AbsoluteX, 3, 4, 1), op(ROR, AbsoluteX, 3, 7, 0),  op(RRA, AbsoluteX, 3, 7, 0),
        // 0x80
        op(NOP, Immediate, 2, 2, 0), op(STA, IndirectX, 2, 6, 0), op(NOP, Immediate, 2, 2, 0),  op(SAX, IndirectX, 2, 6, 0),
        op(STY, ZeroPage, 2, 3, 0),  op(STA, ZeroPage, 2, 3, 0),  op(STX, ZeroPage, 2, 3, 0),   op(SAX, ZeroPage, 2, 3, 0),
        op(DEY, Implied, 1, 2, 0),   None,                        op(TXA, Implied, 1, 2, 0),    None,
        op(STY, Absolute, 3, 4, 0),  op(STA, Absolute, 3, 4, 0),  op(STX, Absolute, 3, 4, 0),   op(SAX, Absolute, 3, 4, 0),
        // 0x90
        op(BCC, Relative, 2, 2, 1),  op(STA, IndirectY, 2, 6, 0), None,                         None,
        op(STY, ZeroPageX, 2, 4, 0), op(STA, ZeroPageX, 2, 4, 0), op(STX, ZeroPageY, 2, 4, 0),  op(SAX, ZeroPageY, 2, 4, 0),
        op(TYA, Implied, 1, 2, 0),   op(STA, AbsoluteY, 3, 5, 0), op(TXS, Implied, 1, 2, 0),    None,
        None,                        op(STA, AbsoluteX, 3, 5, 0), None,                         None,
        // 0xA0
        op(LDY, Immediate, 2, 2, 0), op(LDA, IndirectX, 2, 6, 0), op(LDX, Immediate, 2, 2, 0),  op(LAX, IndirectX, 2, 6, 0),
        op(LDY, ZeroPage, 2, 3, 0),  op(LDA, ZeroPage, 2, 3, 0),  op(LDX, ZeroPage, 2, 3, 0),   op(LAX, ZeroPage, 2, 3, 0),
        op(TAY, Implied, 1, 2, 0),   op(LDA, Immediate, 2, 2, 0), op(TAX, Implied, 1, 2, 0),    None,
        op(LDY, Absolute, 3, 4, 0),  op(LDA, Absolute, 3, 4, 0),  op(LDX, Absolute, 3, 4, 0),   op(LAX, Absolute, 3, 4, 0),
        // 0xB0
        op(BCS, Relative, 2, 2, 1),  op(LDA, IndirectY, 2, 5, 1), None,                         op(LAX, IndirectY, 2, 5, 1),
        op(LDY, ZeroPageX, 2, 4, 0), op(LDA, ZeroPageX, 2, 4, 0), op(LDX, ZeroPageY, 2, 4, 0),  op(LAX, ZeroPageY, 2, 4, 0),
        op(CLV, Implied, 1, 2, 0),   op(LDA, AbsoluteY, 3, 4, 1), op(TSX, Implied, 1, 2, 0),    None,
        op(LDY, AbsoluteX, 3, 4, 1), op(LDA, AbsoluteX, 3, 4, 1), op(LDX, AbsoluteY, 3, 4, 1),  op(LAX, AbsoluteY, 3, 4, 1),
        // 0xC0
        op(CPY, Immediate, 2, 2, 0), op(CMP, IndirectX, 2, 6, 0), None,                         op(DCP, IndirectX, 2, 8, 0),
        op(CPY, ZeroPage, 2, 3, 0),  op(CMP, ZeroPage, 2, 3, 0),  op(DEC, ZeroPage, 2, 5, 0),   op(DCP, ZeroPage, 2, 5, 0),
        op(INY, Implied, 1, 2, 0),   op(CMP, Immediate, 2, 2, 0), op(DEX, Implied, 1, 2, 0),    None,
        op(CPY, Absolute, 3, 4, 0),  op(CMP, Absolute, 3, 4, 0),  op(DEC, Absolute, 3, 6, 0),   op(DCP, Absolute, 3, 6, 0),
        // 0xD0
        op(BNE, Relative, 2, 2, 1),  op(CMP, IndirectY, 2, 5, 1), None,                         op(DCP, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(CMP, ZeroPageX, 2, 4, 0), op(DEC, ZeroPageX, 2, 6, 0),  op(DCP, ZeroPageX, 2, 6, 0),
        op(CLD, Implied, 1, 2, 0),   op(CMP, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(DCP, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(CMP, AbsoluteX, 3, 4, 1), op(DEC, AbsoluteX, 3, 7, 0),  op(DCP, AbsoluteX, 3, 7, 0),
        // 0xE0
        op(CPX, Immediate, 2, 2, 0), op(SBC, IndirectX, 2, 6, 0), None,                         op(ISC, IndirectX, 2, 8, 0),
        op(CPX, ZeroPage, 2, 3, 0),  op(SBC, ZeroPage, 2, 3, 0),  op(INC, ZeroPage, 2, 5, 0),   op(ISC, ZeroPage, 2, 5, 0),
        op(INX, Implied, 1, 2, 0),   op(SBC, Immediate, 2, 2, 0), op(NOP, Implied, 1, 2, 0),    op(SBC, Immediate, 2, 2, 0),
        op(CPX, Absolute, 3, 4, 0),  op(SBC, Absolute, 3, 4, 0),  op(INC, Absolute, 3, 6, 0),   op(ISC, Absolute, 3, 6, 0),
        // 0xF0
        op(BEQ, Relative, 2, 2, 1),  op(SBC, IndirectY, 2, 5, 1), None,                         op(ISC, IndirectY, 2, 8, 0),
        op(NOP, ZeroPageX, 2, 4, 0), op(SBC, ZeroPageX, 2, 4, 0), op(INC, ZeroPageX, 2, 6, 0),  op(ISC, ZeroPageX, 2, 6, 0),
        op(SED, Implied, 1, 2, 0),   op(SBC, AbsoluteY, 3, 4, 1), op(NOP, Implied, 1, 2, 0),    op(ISC, AbsoluteY, 3, 7, 0),
        op(NOP, AbsoluteX, 3, 4, 1), op(SBC, AbsoluteX, 3, 4, 1), op(INC, AbsoluteX, 3, 7, 0),  op(ISC, AbsoluteX, 3, 7, 0),
    ]
};
