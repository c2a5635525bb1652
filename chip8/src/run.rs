use anyhow::{Context, Result};
use log::{info, warn};

use emu8::{Chip8, ExecutionError, Frame};

use crate::debugger::Debugger;
use crate::display::frame_to_text;

/// A loaded Chip-8 plus everything the driving loop tracks between frames
pub struct Session {
    pub chip8: Chip8,
    pub debugger: Debugger,
    steps_per_frame: u32,
    tone: bool,
}

impl Session {
    pub fn new(chip8: Chip8, debugger: Debugger, steps_per_frame: u32) -> Self {
        Session {
            chip8,
            debugger,
            steps_per_frame,
            tone: false,
        }
    }

    /// Runs one frame's worth of instructions and ticks the timers
    pub fn frame(&mut self) -> Result<Frame, ExecutionError> {
        let frame = if self.debugger.is_armed() {
            self.debug_frame()?
        } else {
            self.chip8.run_frame(self.steps_per_frame)?
        };

        if frame.tone && !self.tone {
            info!("BEEP!");
        }
        self.tone = frame.tone;
        Ok(frame)
    }

    /// Like `Chip8::run_frame`, but checks the breakpoint before every instruction.
    /// Timers stand still while paused.
    fn debug_frame(&mut self) -> Result<Frame, ExecutionError> {
        let mut frame = Frame::default();

        for _ in 0..self.steps_per_frame {
            if !self.debugger.allow(&self.chip8) {
                frame.tone = self.chip8.tone_active();
                return Ok(frame);
            }
            let result = self.chip8.step()?;
            frame.draw |= result.draw;
            if result.self_jump {
                frame.self_jump = true;
                break;
            }
            if result.awaiting_key {
                frame.awaiting_key = true;
                break;
            }
            frame.steps += 1;
        }

        frame.tone_ended = self.chip8.tick_timers();
        frame.tone = self.chip8.tone_active();
        Ok(frame)
    }
}

/// Runs without a window for at most `frames` frames, then prints the display.
///
/// Stops early when the program jumps to itself.
pub fn run_headless(mut session: Session, frames: u32) -> Result<()> {
    let mut waiting_reported = false;

    for count in 1..=frames {
        let frame = session
            .frame()
            .with_context(|| format!("execution failed in frame {}", count))?;
        if frame.self_jump {
            info!("Infinite loop detected after {} frames; stopping VM", count);
            break;
        }
        if frame.awaiting_key && !waiting_reported {
            warn!("program is waiting for a key press, which never comes without a window");
            waiting_reported = true;
        }
    }

    print!("{}", frame_to_text(session.chip8.frame_buffer()));
    Ok(())
}

#[cfg(feature = "sdl")]
pub use window::run_window;

#[cfg(feature = "sdl")]
mod window {
    use std::time::{Duration, Instant};

    use anyhow::{Context, Error, Result};
    use log::info;
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;

    use emu8::FRAME_RATE;

    use super::Session;
    use crate::debugger::Command;
    use crate::display::Display;
    use crate::keymap::keycode;

    /// Runs in an SDL2 window at 60 frames per second until it is closed
    pub fn run_window(mut session: Session) -> Result<()> {
        // Get SDL2 context
        let sdl = sdl2::init().map_err(Error::msg)?;
        let mut display = Display::new(&sdl)?;
        let mut events = sdl.event_pump().map_err(Error::msg)?;

        let frame_time = Duration::from_secs(1) / FRAME_RATE;
        let mut stopped = false;

        'event: loop {
            let frame_start = Instant::now();

            // Handle input
            for event in events.poll_iter() {
                match event {
                    Event::Quit { .. } => break 'event,
                    Event::KeyDown {
                        keycode: Some(key),
                        repeat: false,
                        ..
                    } => match (key, keycode(key)) {
                        (_, Some(kc)) => session.chip8.key_press(kc),
                        (Keycode::J, _) => session.debugger.command(Command::Step, &session.chip8),
                        (Keycode::K, _) => {
                            session.debugger.command(Command::Continue, &session.chip8)
                        }
                        (Keycode::L, _) => {
                            session.debugger.command(Command::Registers, &session.chip8)
                        }
                        (Keycode::Escape, _) => break 'event,
                        _ => continue,
                    },
                    Event::KeyUp {
                        keycode: Some(key), ..
                    } => {
                        if let Some(kc) = keycode(key) {
                            session.chip8.key_release(kc);
                        }
                    }
                    _ => continue,
                };
            }

            // Update state
            let frame = session.frame().context("execution failed")?;
            if frame.self_jump && !stopped {
                info!("Infinite loop detected; stopping VM");
                stopped = true;
            }

            // If the draw flag is set, unset it and render the current frame
            if let Some(frame) = session.chip8.get_frame() {
                display.render(&frame)?;
            }

            // Handle timing
            let elapsed = frame_start.elapsed();
            if let Some(remaining) = frame_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        Ok(())
    }
}
