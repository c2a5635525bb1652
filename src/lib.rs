//! # emu8
//!
//! A Chip-8 virtual machine core: machine state, an instruction decoder and a
//! fetch-decode-execute engine. Windowing, input polling, audio and ROM files
//! are left to the host, which feeds the core ROM bytes and key snapshots and
//! reads back a 64x32 monochrome frame buffer and a tone flag.
//!
//! The crate also carries a disassembler (`disassemble`) and an assembler
//! (`assemble`) for the same instruction set.
//!
//! A host typically drives it one frame at a time:
//!
//! ```
//! use emu8::{Chip8, Config};
//!
//! let mut chip8 = Chip8::new(Config::headless(0));
//! // CLS; JP 0x202
//! chip8.load_rom(&[0x00, 0xE0, 0x12, 0x02]).unwrap();
//! chip8.set_keys([false; 16]);
//!
//! let frame = chip8.run_frame(emu8::STEPS_PER_FRAME).unwrap();
//! assert!(frame.draw && frame.self_jump);
//! assert!(chip8.get_frame().is_some());
//! ```

pub use assembler::assemble;
pub use chip8::{Chip8, Frame};
pub use config::{BorrowFlag, Config, DrawEdge, IndexOverflow};
pub use constants::{FRAME_RATE, STEPS_PER_FRAME};
pub use cpu::{Cpu, Mode, StepResult};
pub use error::{AssembleError, ExecutionError, LoadError};
pub use instruction::{disassemble, Instruction, Line};
pub use state::{FrameBuffer, Keys, State};

mod assembler;
mod chip8;
pub mod config;
pub mod constants;
mod cpu;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
