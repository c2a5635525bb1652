//! Runs a Chip-8 ROM in an SDL2 window, or headless in the terminal.
//!
//! ```text
//! chip8 roms/Maze.ch8                       # window (needs the `sdl` feature)
//! chip8 --headless --frames 120 roms/Maze.ch8
//! chip8 --breakpoint 0x21A roms/Maze.ch8    # j: step, k: continue, l: registers
//! chip8 --disassemble roms/Maze.ch8
//! chip8 --assemble maze.ch8 src/maze.asm    # source in, ROM out
//! ```
//!
//! The keypad is typed as hex digits: `0`..`9` and `a`..`f`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{info, warn};

use emu8::constants::{MAX_ROM_SIZE, SPRITE_SHEET};
use emu8::{
    assemble, disassemble, BorrowFlag, Chip8, Config, DrawEdge, IndexOverflow, STEPS_PER_FRAME,
};

use crate::debugger::Debugger;
use crate::run::Session;

mod debugger;
mod display;
mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "A Chip-8 emulator", long_about = None)]
struct Args {
    /// Path to the ROM file to run, or the source file with --assemble
    rom: PathBuf,

    /// Pause when the program counter reaches this address (hex)
    #[arg(short, long, value_parser = parse_address)]
    breakpoint: Option<u16>,

    /// Run without a window and print the display when done
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode before giving up
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Instructions executed per 60Hz frame
    #[arg(long, default_value_t = STEPS_PER_FRAME)]
    steps_per_frame: u32,

    /// Seed for the RND instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Stop when the program jumps to itself (always on when headless)
    #[arg(long)]
    detect_self_jump: bool,

    /// Clip sprites at the screen edges instead of wrapping them
    #[arg(long)]
    clip: bool,

    /// SUB/SUBN set VF when the operands are equal
    #[arg(long)]
    inclusive_borrow: bool,

    /// Let ADD I, Vx carry I past 0xFFF
    #[arg(long)]
    wide_index: bool,

    /// Print the ROM's instructions and exit
    #[arg(long, conflicts_with = "assemble")]
    disassemble: bool,

    /// Assemble the source file into a ROM at this path and exit
    #[arg(long, value_name = "ROM")]
    assemble: Option<PathBuf>,

    /// Log more (-v debug, -vv trace every instruction)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = match (self.headless, self.seed) {
            (true, seed) => Config::headless(seed.unwrap_or(0)),
            (false, seed) => Config {
                rng_seed: seed,
                ..Config::default()
            },
        };
        config.detect_self_jump |= self.detect_self_jump;
        if self.clip {
            config.draw_edge = DrawEdge::Clip;
        }
        if self.inclusive_borrow {
            config.borrow_flag = BorrowFlag::Inclusive;
        }
        if self.wide_index {
            config.index_overflow = IndexOverflow::Wide16;
        }
        config
    }
}

/// Parses `0x21A`, `21A` or `21a`
fn parse_address(arg: &str) -> Result<u16, String> {
    let digits = arg.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {:?}: {}", arg, e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(output) = &args.assemble {
        let source = fs::read_to_string(&args.rom)
            .with_context(|| format!("couldn't read source {}", args.rom.display()))?;
        let rom = assemble(&source)
            .with_context(|| format!("couldn't assemble {}", args.rom.display()))?;
        fs::write(output, &rom)
            .with_context(|| format!("couldn't write ROM {}", output.display()))?;
        info!("Assembled {} bytes into {}", rom.len(), output.display());
        return Ok(());
    }

    let rom = fs::read(&args.rom)
        .with_context(|| format!("couldn't read ROM {}", args.rom.display()))?;
    info!("Size of ROM: {}", rom.len());

    if args.disassemble {
        if rom.len() > MAX_ROM_SIZE {
            warn!("only the first {} bytes can be loaded; ignoring the rest", MAX_ROM_SIZE);
        }
        for line in disassemble(&rom) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut chip8 = Chip8::new(args.config());
    info!("Loaded {} bytes of font data", SPRITE_SHEET.len());
    chip8
        .load_rom(&rom)
        .with_context(|| format!("couldn't load ROM {}", args.rom.display()))?;
    info!("Loaded ROM");

    let headless = args.headless || !cfg!(feature = "sdl");
    if headless && !args.headless {
        warn!("built without the `sdl` feature; running headless");
    }

    let debugger = Debugger::new(args.breakpoint, !headless);
    let session = Session::new(chip8, debugger, args.steps_per_frame);

    if headless {
        return run::run_headless(session, args.frames);
    }
    run_window(session)
}

#[cfg(feature = "sdl")]
fn run_window(session: Session) -> Result<()> {
    run::run_window(session)
}

#[cfg(not(feature = "sdl"))]
fn run_window(_session: Session) -> Result<()> {
    unreachable!("windowed mode needs the `sdl` feature")
}
