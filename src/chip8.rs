use crate::config::Config;
use crate::constants::KEY_COUNT;
use crate::cpu::{Cpu, StepResult};
use crate::error::{ExecutionError, LoadError};
use crate::state::{FrameBuffer, Keys, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - the machine `state`
///  - the `cpu` that executes instructions against it
///  - whether the frame buffer changed since it was last handed out
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU by an instruction or a whole frame
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    cpu: Cpu,
    draw_flag: bool,
}

/// What happened during one `run_frame`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Instructions executed (waiting on a key doesn't count)
    pub steps: u32,
    /// The frame buffer changed during the frame
    pub draw: bool,
    /// The sound timer is still running after the timer tick
    pub tone: bool,
    /// The sound timer reached 0 on this frame's tick
    pub tone_ended: bool,
    pub awaiting_key: bool,
    pub self_jump: bool,
}

impl Chip8 {
    pub fn new(config: Config) -> Self {
        Chip8 {
            state: State::new(),
            cpu: Cpu::new(config),
            draw_flag: false,
        }
    }

    /// Power-on state: memory cleared, font installed, pc at 0x200
    pub fn reset(&mut self) {
        self.state.reset();
        self.cpu.reset();
        self.draw_flag = false;
    }

    /// Load a rom image at 0x200
    ///
    /// # Arguments
    /// * `rom` the ROM bytes
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.state.load(rom)
    }

    /// Replace the whole keypad snapshot
    pub fn set_keys(&mut self, keys: Keys) {
        self.state.set_keys(keys);
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF; anything else is ignored
    pub fn key_press(&mut self, key: u8) {
        if (key as usize) < KEY_COUNT {
            self.state.keys[key as usize] = true;
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF; anything else is ignored
    pub fn key_release(&mut self, key: u8) {
        if (key as usize) < KEY_COUNT {
            self.state.keys[key as usize] = false;
        }
    }

    /// Advances the CPU by a single instruction
    pub fn step(&mut self) -> Result<StepResult, ExecutionError> {
        let result = self.cpu.step(&mut self.state)?;
        self.draw_flag |= result.draw;
        Ok(result)
    }

    /// Runs one frame: up to `steps` instructions, then a timer tick.
    ///
    /// The frame ends early when the CPU starts waiting on a key or stops
    /// on a self-jump, since further steps would do nothing.
    pub fn run_frame(&mut self, steps: u32) -> Result<Frame, ExecutionError> {
        let mut frame = Frame::default();

        for _ in 0..steps {
            let result = self.step()?;
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

        frame.tone_ended = self.tick_timers();
        frame.tone = self.state.tone_active();
        Ok(frame)
    }

    /// Decrements the delay and sound timers; true when the tone just ended
    pub fn tick_timers(&mut self) -> bool {
        self.state.tick_timers()
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn get_frame(&mut self) -> Option<FrameBuffer> {
        if self.draw_flag {
            self.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn tone_active(&self) -> bool {
        self.state.tone_active()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// The V0..VF registers followed by I, as printed by the debugger
    pub fn register_dump(&self) -> String {
        let names: Vec<String> = (0..16).map(|r| format!(" V{:X}  ", r)).collect();
        let values: Vec<String> = self.state.v.iter().map(|v| format!("{:04X} ", v)).collect();
        format!(
            "{}  I\n{}[{:04X}]",
            names.concat(),
            values.concat(),
            self.state.i
        )
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Mode;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::new(Config::headless(0));
        chip8.load_rom(program).unwrap();
        chip8
    }

    #[test]
    fn test_cycles_advance_pc() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn test_get_frame_only_after_draw() {
        let mut chip8 = chip8_with(&[0x60, 0x01, 0x00, 0xE0]);
        chip8.step().unwrap();
        assert!(chip8.get_frame().is_none());
        chip8.step().unwrap();
        assert!(chip8.get_frame().is_some());
        // Handing out the frame clears the flag
        assert!(chip8.get_frame().is_none());
    }

    #[test]
    fn test_key_press_and_release() {
        let mut chip8 = Chip8::default();
        chip8.key_press(0xE);
        assert!(chip8.state().keys[0xE]);
        chip8.key_release(0xE);
        assert!(!chip8.state().keys[0xE]);
        // Out of range keys are ignored
        chip8.key_press(0x10);
    }

    #[test]
    fn test_run_frame_counts_steps_and_ticks_timers() {
        // V0 = 5; ST = V0; then a run of LD V1, 1
        let mut program = vec![0x60, 0x05, 0xF0, 0x18];
        for _ in 0..20 {
            program.extend_from_slice(&[0x61, 0x01]);
        }
        let mut chip8 = chip8_with(&program);
        let frame = chip8.run_frame(10).unwrap();
        assert_eq!(frame.steps, 10);
        assert!(frame.tone);
        assert!(!frame.draw);
        assert_eq!(chip8.state().sound_timer, 4);
        assert_eq!(chip8.pc(), 0x200 + 20);
    }

    #[test]
    fn test_run_frame_stops_on_self_jump() {
        let mut chip8 = chip8_with(&[0x00, 0xE0, 0x12, 0x02]);
        let frame = chip8.run_frame(10).unwrap();
        assert!(frame.self_jump);
        assert!(frame.draw);
        assert_eq!(frame.steps, 1);
        assert_eq!(chip8.cpu().mode(), &Mode::SelfJump { pc: 0x202 });
    }

    #[test]
    fn test_run_frame_stops_while_awaiting_key() {
        let mut chip8 = chip8_with(&[0xF2, 0x0A, 0x00, 0xE0]);
        let frame = chip8.run_frame(10).unwrap();
        assert!(frame.awaiting_key);
        assert_eq!(chip8.pc(), 0x200);

        chip8.key_press(0x9);
        let frame = chip8.run_frame(2).unwrap();
        assert!(!frame.awaiting_key);
        assert_eq!(chip8.state().v[0x2], 0x9);
        assert_eq!(chip8.pc(), 0x204);
    }

    #[test]
    fn test_run_frame_propagates_faults() {
        let mut chip8 = chip8_with(&[0xFF, 0xFF]);
        chip8.state.delay_timer = 3;
        assert_eq!(
            chip8.run_frame(10),
            Err(ExecutionError::UnknownOpcode {
                pc: 0x200,
                opcode: 0xFFFF
            })
        );
        assert_eq!(chip8.state().delay_timer, 3);
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut chip8 = chip8_with(&[0x00, 0x00]);
        assert!(chip8.step().is_err());
        chip8.reset();
        assert_eq!(chip8.cpu().mode(), &Mode::Running);
        assert_eq!(chip8.state().memory[0x200], 0x00);
        assert_eq!(chip8.pc(), 0x200);
    }

    #[test]
    fn test_register_dump() {
        let mut chip8 = Chip8::default();
        chip8.state.v[0x1] = 0xAB;
        chip8.state.i = 0x123;
        let dump = chip8.register_dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with(" V0   V1  "));
        assert!(lines[0].ends_with("  I"));
        assert!(lines[1].starts_with("0000 00AB "));
        assert!(lines[1].ends_with("[0123]"));
    }
}
