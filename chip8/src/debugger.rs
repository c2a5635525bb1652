use log::info;

use emu8::Chip8;

/// Debugger commands, bound to `j`, `k` and `l` in the window
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Execute one instruction while paused
    Step,
    /// Leave the breakpoint and run freely
    Continue,
    /// Print the registers
    Registers,
}

/// # Debugger
/// Pauses execution when the pc reaches a breakpoint.
///
/// Non-interactive debuggers (headless runs) never pause; they log the
/// registers on every hit instead.
pub struct Debugger {
    breakpoint: Option<u16>,
    interactive: bool,
    paused: bool,
    pending_steps: u32,
    resume_at: Option<u16>,
}

impl Debugger {
    pub fn new(breakpoint: Option<u16>, interactive: bool) -> Self {
        if let Some(address) = breakpoint {
            info!("breakpoint set at {:#06X}", address);
        }
        Debugger {
            breakpoint,
            interactive,
            paused: false,
            pending_steps: 0,
            resume_at: None,
        }
    }

    /// Whether instructions need to be vetted one at a time
    pub fn is_armed(&self) -> bool {
        self.breakpoint.is_some()
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Decides whether the instruction at the pc may execute
    pub fn allow(&mut self, chip8: &Chip8) -> bool {
        if self.paused {
            if self.pending_steps > 0 {
                self.pending_steps -= 1;
                return true;
            }
            return false;
        }

        let pc = chip8.pc();
        if self.breakpoint != Some(pc) {
            return true;
        }
        if self.resume_at.take() == Some(pc) {
            return true;
        }

        info!("=== Breakpoint triggered at {:#06X} ===", pc);
        if self.interactive {
            self.paused = true;
            false
        } else {
            info!("\n{}", chip8.register_dump());
            true
        }
    }

    #[cfg_attr(not(feature = "sdl"), allow(dead_code))]
    pub fn command(&mut self, command: Command, chip8: &Chip8) {
        match command {
            Command::Step if self.paused => self.pending_steps += 1,
            Command::Continue if self.paused => {
                self.paused = false;
                self.pending_steps = 0;
                self.resume_at = Some(chip8.pc());
            }
            Command::Registers => println!("{}", chip8.register_dump()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu8::Config;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::new(Config::default());
        chip8.load_rom(program).unwrap();
        chip8
    }

    #[test]
    fn test_unarmed_debugger_allows_everything() {
        let chip8 = chip8_with(&[0x00, 0xE0]);
        let mut debugger = Debugger::new(None, true);
        assert!(!debugger.is_armed());
        assert!(debugger.allow(&chip8));
    }

    #[test]
    fn test_pauses_at_breakpoint() {
        // LD V0, 1; LD V1, 2; LD V2, 3
        let mut chip8 = chip8_with(&[0x60, 0x01, 0x61, 0x02, 0x62, 0x03]);
        let mut debugger = Debugger::new(Some(0x202), true);
        assert!(debugger.allow(&chip8));
        chip8.step().unwrap();
        assert!(!debugger.allow(&chip8));
        assert!(debugger.is_paused());
        assert!(!debugger.allow(&chip8));
    }

    #[test]
    fn test_step_executes_one_instruction() {
        let mut chip8 = chip8_with(&[0x60, 0x01, 0x61, 0x02, 0x62, 0x03]);
        let mut debugger = Debugger::new(Some(0x200), true);
        assert!(!debugger.allow(&chip8));
        debugger.command(Command::Step, &chip8);
        assert!(debugger.allow(&chip8));
        chip8.step().unwrap();
        assert!(!debugger.allow(&chip8));
        assert!(debugger.is_paused());
    }

    #[test]
    fn test_continue_runs_past_breakpoint() {
        // LD V0, 1; JP 0x200
        let mut chip8 = chip8_with(&[0x60, 0x01, 0x12, 0x00]);
        let mut debugger = Debugger::new(Some(0x200), true);
        assert!(!debugger.allow(&chip8));
        debugger.command(Command::Continue, &chip8);
        assert!(!debugger.is_paused());
        assert!(debugger.allow(&chip8));
        chip8.step().unwrap();
        assert!(debugger.allow(&chip8));
        chip8.step().unwrap();
        // Back at the breakpoint
        assert!(!debugger.allow(&chip8));
    }

    #[test]
    fn test_headless_debugger_never_pauses() {
        let chip8 = chip8_with(&[0x60, 0x01]);
        let mut debugger = Debugger::new(Some(0x200), false);
        assert!(debugger.allow(&chip8));
        assert!(!debugger.is_paused());
        assert!(debugger.allow(&chip8));
    }

    #[test]
    fn test_step_ignored_while_running() {
        let chip8 = chip8_with(&[0x60, 0x01]);
        let mut debugger = Debugger::new(Some(0x300), true);
        debugger.command(Command::Step, &chip8);
        assert!(debugger.allow(&chip8));
        assert_eq!(debugger.pending_steps, 0);
    }
}
