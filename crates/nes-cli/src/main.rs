//! NES CLI - Command line interface for NES emulator
//!
//! Runs a ROM headless for a number of frames, then optionally dumps CPU/PPU state, writes
//! the battery save and saves the last frame as a PPM image.

use clap::Parser;
use nes_core::options::EmulatorOptions;
use nes_core::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use nes_core::system::Emulator;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

/// NES Emulator CLI
#[derive(Parser, Debug)]
#[command(name = "nes-cli")]
#[command(about = "A NES emulator CLI", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    #[arg(short, long)]
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u64,

    /// Dump CPU state after execution
    #[arg(short = 'c', long)]
    dump_cpu: bool,

    /// Dump PPU state after execution
    #[arg(short = 'p', long)]
    dump_ppu: bool,

    /// Battery save file, loaded if present and written on exit
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Write the last frame to this PPM file
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let rom_data = fs::read(&args.rom)
        .map_err(|e| format!("Failed to read ROM file {}: {}", args.rom.display(), e))?;

    let mut options = EmulatorOptions::default();
    if let Some(save) = &args.save {
        if save.exists() {
            options = options.with_sram(fs::read(save)?);
            log::info!("Loaded battery save from {}", save.display());
        }
    }

    let mut emulator = Emulator::new(&rom_data, options)?;

    let info = emulator.cartridge_info();
    println!("Loaded cartridge:");
    println!("  PRG ROM: {} x 16KB", info.prg_banks);
    println!("  CHR ROM: {} x 8KB", info.chr_banks);
    println!("  Mapper: {}", info.mapper);
    println!("  Mirroring: {:?}", info.mirroring);
    println!("  Battery: {}", info.has_battery);

    println!("\nRunning {} frames...", args.frames);
    for _ in 0..args.frames {
        emulator.frame()?;
    }
    println!("Completed {} frames.", emulator.frame_count());

    if args.dump_cpu {
        dump_cpu_state(&emulator);
    }

    if args.dump_ppu {
        dump_ppu_state(&emulator);
    }

    if let Some(save) = &args.save {
        fs::write(save, emulator.sram())?;
        log::info!("Wrote battery save to {}", save.display());
    }

    if let Some(path) = &args.screenshot {
        write_ppm(path, emulator.pixels())?;
        println!("Saved screenshot to {}", path.display());
    }

    Ok(())
}

fn dump_cpu_state(emulator: &Emulator) {
    let cpu = emulator.cpu();
    let regs = cpu.registers();
    let status = cpu.status();

    println!("\nCPU State:");
    println!("  A:    ${:02X}", regs.a);
    println!("  X:    ${:02X}", regs.x);
    println!("  Y:    ${:02X}", regs.y);
    println!("  PC:   ${:04X}", regs.pc);
    println!("  SP:   ${:02X}", regs.sp);
    println!("  P:    ${:02X} ({})", status.bits(), status);
    println!("  Cycles: {}", emulator.cpu_cycles());
}

fn dump_ppu_state(emulator: &Emulator) {
    let ppu = emulator.ppu();

    println!("\nPPU State:");
    println!("  Scanline: {}", ppu.scanline());
    println!("  Dot: {}", ppu.dot());
    println!("  Frame: {}", ppu.frame());
    println!("  CTRL: ${:02X}", ppu.ctrl().bits());
    println!("  MASK: ${:02X}", ppu.mask().bits());
    println!("  STATUS: ${:02X}", ppu.status().bits());
    println!("  v: ${:04X}  t: ${:04X}  x: {}", ppu.v(), ppu.t(), ppu.fine_x());
}

/// Binary PPM (P6)
fn write_ppm(path: &Path, pixels: &[u32]) -> io::Result<()> {
    let mut out = io::BufWriter::new(fs::File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", SCREEN_WIDTH, SCREEN_HEIGHT)?;
    for &pixel in pixels {
        out.write_all(&[(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8])?;
    }
    out.flush()
}
