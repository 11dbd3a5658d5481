//! Integration tests for the NES system

use std::cell::Cell;
use std::rc::Rc;

use nes_core::cartridge::CartridgeError;
use nes_core::controller::Button;
use nes_core::options::EmulatorOptions;
use nes_core::system::{Emulator, EmulatorError, Port};

const PRG_BANK: usize = 0x4000;
const CHR_BANK: usize = 0x2000;

/// Build an iNES image
fn ines(mapper: u8, flags_6: u8, prg: &[u8], chr: &[u8]) -> Vec<u8> {
    let mut rom = vec![
        b'N',
        b'E',
        b'S',
        0x1A,
        (prg.len() / PRG_BANK) as u8,
        (chr.len() / CHR_BANK) as u8,
        (mapper << 4) | flags_6,
        mapper & 0xF0,
    ];
    rom.resize(16, 0);
    rom.extend_from_slice(prg);
    rom.extend_from_slice(chr);
    rom
}

/// PRG of `size` bytes with `program` at `offset` and the vectors at the end
fn prg(size: usize, offset: usize, program: &[u8], nmi: u16, reset: u16, irq: u16) -> Vec<u8> {
    let mut prg = vec![0xEA; size];
    prg[offset..offset + program.len()].copy_from_slice(program);
    for (i, vector) in [nmi, reset, irq].into_iter().enumerate() {
        let [lo, hi] = vector.to_le_bytes();
        prg[size - 6 + i * 2] = lo;
        prg[size - 5 + i * 2] = hi;
    }
    prg
}

/// NROM-128 image running `program` from $8000
fn nrom(program: &[u8], nmi: u16) -> Vec<u8> {
    ines(0, 0, &prg(PRG_BANK, 0, program, nmi, 0x8000, 0x8000), &[0; CHR_BANK])
}

/// JMP $8000
const IDLE: [u8; 3] = [0x4C, 0x00, 0x80];

fn emulator(rom: &[u8]) -> Emulator {
    Emulator::new(rom, EmulatorOptions::default()).unwrap()
}

#[test]
fn test_nrom_128_is_mirrored() {
    let mut prg = vec![0u8; PRG_BANK];
    prg[0] = 0x11;
    prg[0x3FFC..].copy_from_slice(&[0x00, 0x80, 0x00, 0x80]);
    let mut emulator = emulator(&ines(0, 0, &prg, &[0; CHR_BANK]));
    assert_eq!(emulator.read_memory(0x8000), 0x11);
    assert_eq!(emulator.read_memory(0xC000), emulator.read_memory(0x8000));
}

#[test]
fn test_nrom_256_is_not_mirrored() {
    let mut prg = vec![0u8; 2 * PRG_BANK];
    prg[0] = 0x11;
    prg[PRG_BANK] = 0x22;
    prg[0x7FFC..].copy_from_slice(&[0x00, 0x80, 0x00, 0x80]);
    let mut emulator = emulator(&ines(0, 0, &prg, &[0; CHR_BANK]));
    assert_eq!(emulator.read_memory(0x8000), 0x11);
    assert_eq!(emulator.read_memory(0xC000), 0x22);
}

#[test]
fn test_reset_vector() {
    let rom = ines(0, 0, &prg(PRG_BANK, 0, &IDLE, 0x8000, 0xC000, 0x8000), &[0; CHR_BANK]);
    let emulator = emulator(&rom);
    assert_eq!(emulator.cpu().registers().pc, 0xC000);
    assert_eq!(emulator.cartridge_info().mapper, 0);
}

#[test]
fn test_load_errors() {
    let error = Emulator::new(b"NES\x1A", EmulatorOptions::default()).unwrap_err();
    assert!(matches!(error, EmulatorError::Cartridge(CartridgeError::InvalidHeader(_))));

    let rom = ines(5, 0, &[0; PRG_BANK], &[0; CHR_BANK]);
    let error = Emulator::new(&rom, EmulatorOptions::default()).unwrap_err();
    assert_eq!(error, EmulatorError::Cartridge(CartridgeError::UnsupportedMapper(5)));

    let mut rom = nrom(&IDLE, 0x8000);
    rom[7] = 0x08;
    let error = Emulator::new(&rom, EmulatorOptions::default()).unwrap_err();
    assert_eq!(error, EmulatorError::Cartridge(CartridgeError::UnsupportedFormat));
}

#[test]
fn test_frame_callback_once_per_frame() {
    // LDA #$18; STA $2001; JMP $8005
    let program = [0xA9, 0x18, 0x8D, 0x01, 0x20, 0x4C, 0x05, 0x80];
    let frames = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&frames);
    let options = EmulatorOptions::default().on_frame(move |pixels| {
        assert_eq!(pixels.len(), 256 * 240);
        counter.set(counter.get() + 1);
    });
    let mut emulator = Emulator::new(&nrom(&program, 0x8000), options).unwrap();

    for expected in 1..=4 {
        emulator.frame().unwrap();
        assert_eq!(frames.get(), expected);
        assert_eq!(emulator.frame_count(), u64::from(expected));
    }
}

#[test]
fn test_audio_samples_follow_sample_rate() {
    let samples = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&samples);
    let options = EmulatorOptions::default()
        .with_sample_rate(44_100)
        .on_sample(move |_| counter.set(counter.get() + 1));
    let mut emulator = Emulator::new(&nrom(&IDLE, 0x8000), options).unwrap();
    for _ in 0..60 {
        emulator.frame().unwrap();
    }
    let expected = emulator.cpu_cycles() as f64 * 44_100.0 / 1_789_773.0;
    let count = f64::from(samples.get());
    assert!((count - expected).abs() <= 1.0, "{} vs {}", count, expected);
}

#[test]
fn test_vblank_nmi() {
    // LDA #$80; STA $2000; JMP $8005; NMI: INC $10; RTI
    let program = [0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80, 0xE6, 0x10, 0x40];
    let mut emulator = emulator(&nrom(&program, 0x8008));
    for _ in 0..3 {
        emulator.frame().unwrap();
    }
    let count = emulator.read_memory(0x0010);
    assert!((2..=3).contains(&count), "{}", count);
}

#[test]
fn test_oam_dma_stall_parity() {
    let mut emulator = emulator(&nrom(&IDLE, 0x8000));
    for i in 0..=0xFFu16 {
        emulator.write_memory(0x0200 + i, i as u8 ^ 0xFF);
    }

    assert_eq!(emulator.cpu_cycles() % 2, 0);
    emulator.write_memory(0x4014, 0x02);
    assert_eq!(emulator.cpu().suspended_cycles(), 513);
    assert_eq!(emulator.ppu().oam()[0], 0xFF);
    assert_eq!(emulator.ppu().oam()[0xFF], 0x00);

    emulator.clock().unwrap();
    assert_eq!(emulator.cpu().suspended_cycles(), 512);
    assert_eq!(emulator.cpu_cycles() % 2, 1);
    emulator.write_memory(0x4014, 0x02);
    assert_eq!(emulator.cpu().suspended_cycles(), 512 + 514);
}

#[test]
fn test_dma_from_program_stalls_cpu() {
    // LDA #$02; STA $4014; JMP $8005
    let program = [0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x05, 0x80];
    let mut emulator = emulator(&nrom(&program, 0x8000));
    while emulator.cpu().suspended_cycles() == 0 {
        emulator.clock().unwrap();
    }
    let stall = emulator.cpu().suspended_cycles();
    assert!(stall == 513 || stall == 514);

    let pc = emulator.cpu().registers().pc;
    for _ in 0..stall {
        emulator.clock().unwrap();
    }
    assert_eq!(emulator.cpu().suspended_cycles(), 0);
    assert_eq!(emulator.cpu().registers().pc, pc);
}

#[test]
fn test_controller_read_sequence() {
    let mut emulator = emulator(&nrom(&IDLE, 0x8000));
    emulator.update_button(Port::One, Button::B, true);
    emulator.update_button(Port::One, Button::Down, true);
    emulator.controller2_mut().update_button(Button::Select, true);

    emulator.write_memory(0x4016, 1);
    emulator.write_memory(0x4016, 0);
    let port1: Vec<u8> = (0..8).map(|_| emulator.read_memory(0x4016) & 1).collect();
    let port2: Vec<u8> = (0..8).map(|_| emulator.read_memory(0x4017) & 1).collect();
    assert_eq!(port1, vec![0, 1, 0, 0, 0, 1, 0, 0]);
    assert_eq!(port2, vec![0, 0, 1, 0, 0, 0, 0, 0]);
    assert_eq!(emulator.read_memory(0x4016), 0);
}

#[test]
fn test_battery_ram() {
    let rom = ines(0, 0x02, &prg(PRG_BANK, 0, &IDLE, 0x8000, 0x8000, 0x8000), &[0; CHR_BANK]);
    let options = EmulatorOptions::default().with_sram(vec![1, 2, 3]);
    let mut emulator = Emulator::new(&rom, options).unwrap();
    assert!(emulator.cartridge_info().has_battery);
    assert_eq!(emulator.sram().len(), 0x2000);
    assert_eq!(&emulator.sram()[..4], &[1, 2, 3, 0]);
    assert_eq!(emulator.read_memory(0x6001), 2);

    emulator.write_memory(0x7FFF, 0x55);
    assert_eq!(emulator.sram()[0x1FFF], 0x55);
}

#[test]
fn test_mmc3_scanline_irq() {
    let program = [
        0xA9, 0x18, // LDA #$18
        0x8D, 0x01, 0x20, // STA $2001
        0xA9, 0x10, // LDA #$10
        0x8D, 0x00, 0xC0, // STA $C000 (latch)
        0x8D, 0x01, 0xC0, // STA $C001 (reload)
        0x8D, 0x01, 0xE0, // STA $E001 (enable)
        0x58, // CLI
        0x4C, 0x11, 0xE0, // JMP $E011
        0xE6, 0x10, // IRQ: INC $10
        0x8D, 0x00, 0xE0, // STA $E000 (acknowledge)
        0x8D, 0x01, 0xE0, // STA $E001
        0x40, // RTI
    ];
    let prg = prg(2 * PRG_BANK, 0x6000, &program, 0xE01C, 0xE000, 0xE014);
    let mut emulator = emulator(&ines(4, 0, &prg, &[0; CHR_BANK]));

    emulator.frame().unwrap();
    emulator.frame().unwrap();
    let before = emulator.read_memory(0x0010);
    emulator.frame().unwrap();
    let per_frame = emulator.read_memory(0x0010).wrapping_sub(before);
    // Reload value 16 fires every 17 rendered lines
    assert!((13..=15).contains(&per_frame), "{}", per_frame);
}

#[test]
fn test_halted_emulator_stays_halted() {
    // $22 has no opcode-table entry
    let mut emulator = emulator(&nrom(&[0xEA, 0x22], 0x8000));
    let error = emulator.frame().unwrap_err();
    assert!(matches!(error, EmulatorError::Cpu(_)));
    let cycles = emulator.cpu_cycles();
    assert!(emulator.frame().is_err());
    assert_eq!(emulator.cpu_cycles(), cycles);
}
