use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nes_core::options::EmulatorOptions;
use nes_core::system::Emulator;

/// NROM image that enables both layers, fills the screen with sprites and spins
fn rom() -> Vec<u8> {
    let program = [
        0xA9, 0x1E, // LDA #$1E
        0x8D, 0x01, 0x20, // STA $2001
        0xA9, 0x02, // LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
        0x4C, 0x0A, 0x80, // JMP $800A
    ];
    let mut prg = vec![0xEA; 0x4000];
    prg[..program.len()].copy_from_slice(&program);
    prg[0x3FFA..].copy_from_slice(&[0x0A, 0x80, 0x00, 0x80, 0x0A, 0x80]);

    let mut chr = vec![0u8; 0x2000];
    for (i, byte) in chr.iter_mut().enumerate() {
        *byte = (i * 37) as u8;
    }

    let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
    rom.resize(16, 0);
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&chr);
    rom
}

fn frame(c: &mut Criterion) {
    let mut emulator = match Emulator::new(&rom(), EmulatorOptions::default()) {
        Ok(emulator) => emulator,
        Err(error) => panic!("{}", error),
    };
    c.bench_function("frame", |b| {
        b.iter(|| {
            emulator.frame().ok();
            black_box(emulator.frame_count())
        })
    });
}

criterion_group!(benches, frame);
criterion_main!(benches);
