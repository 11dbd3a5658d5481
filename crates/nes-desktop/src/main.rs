//! NES Desktop - Desktop NES emulator with minifb rendering
//!
//! Arrow keys move, Z is B, X is A, Right Shift is Select, Enter is Start. Escape quits.

use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};
use nes_core::controller::Button;
use nes_core::options::EmulatorOptions;
use nes_core::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use nes_core::system::{Emulator, Port};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

/// NES Emulator Desktop App
#[derive(Parser, Debug)]
#[command(name = "nes-desktop")]
#[command(about = "A NES emulator desktop app", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    #[arg(short, long)]
    rom: PathBuf,

    /// Screen scale factor (1, 2 or 4)
    #[arg(short, long, default_value = "2")]
    scale: usize,

    /// Battery save file, loaded if present and written on exit
    #[arg(long)]
    save: Option<PathBuf>,
}

const KEY_MAP: [(Key, Button); 8] = [
    (Key::X, Button::A),
    (Key::Z, Button::B),
    (Key::RightShift, Button::Select),
    (Key::Enter, Button::Start),
    (Key::Up, Button::Up),
    (Key::Down, Button::Down),
    (Key::Left, Button::Left),
    (Key::Right, Button::Right),
];

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

    let frame = Rc::new(RefCell::new(vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT]));
    let sink = Rc::clone(&frame);
    let mut options = EmulatorOptions::default()
        .on_frame(move |pixels| sink.borrow_mut().copy_from_slice(pixels));
    if let Some(save) = &args.save {
        if save.exists() {
            options = options.with_sram(fs::read(save)?);
        }
    }

    let mut emulator = Emulator::new(&rom_data, options)?;

    let scale = match args.scale {
        0 | 1 => Scale::X1,
        2 | 3 => Scale::X2,
        _ => Scale::X4,
    };
    let mut window = Window::new(
        "NES Emulator",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            resize: false,
            scale,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    log::info!("Starting emulation; press Escape or close the window to exit");

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for (key, button) in KEY_MAP {
            emulator.update_button(Port::One, button, window.is_key_down(key));
        }

        emulator.frame()?;

        window.update_with_buffer(&frame.borrow(), SCREEN_WIDTH, SCREEN_HEIGHT)?;
    }

    if let Some(save) = &args.save {
        fs::write(save, emulator.sram())?;
        log::info!("Wrote battery save to {}", save.display());
    }

    Ok(())
}
