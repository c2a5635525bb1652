use log::debug;

use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE, ROM_OFFSET,
    SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::LoadError;

/// The FrameBuffer is indexed as [y][x]; each cell is 0 (off) or 1 (on)
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The pressed status of keys 0..F
pub type Keys = [bool; KEY_COUNT];

/// The Chip8 machine state
///
/// ## CPU
/// Registers
/// - (v) 16 8-bit registers (V0..VF)
///     - V0..VE are general purpose
///     - VF is overwritten by carry, borrow, shifted-out bits and sprite collisions
/// - (i) a 16-bit index register, masked to 12 bits whenever it addresses memory
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Stack
/// - (stack) 16 return addresses
/// - (sp) the number of occupied slots
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per frame while non-zero
/// - a tone plays while the sound timer is non-zero
///
/// ## Memory
/// - 4096 bytes; the sprite sheet lives at 0x000 and ROMs at 0x200 upwards
/// - a 64x32 frame buffer
///
/// ## Input
/// - (keys) the latest snapshot of the 16-key keypad, supplied by the host
#[derive(Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub keys: Keys,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: ROM_OFFSET,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            keys: [false; KEY_COUNT],
        }
    }

    /// Returns every field to its power-on value and reinstalls the sprite sheet
    pub fn reset(&mut self) {
        *self = State::new();
    }

    /// Copies a ROM image into memory starting at 0x200
    ///
    /// # Arguments
    /// * `rom` the raw ROM bytes; at most 3584 of them
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = ROM_OFFSET as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} bytes of ROM at {:#05X}", rom.len(), start);
        Ok(())
    }

    /// Replaces the keypad snapshot
    pub fn set_keys(&mut self, keys: Keys) {
        self.keys = keys;
    }

    /// Decrements both timers, stopping at 0.
    ///
    /// Returns true when the sound timer went from 1 to 0 (the tone just ended).
    pub fn tick_timers(&mut self) -> bool {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            return self.sound_timer == 0;
        }
        false
    }

    /// The tone sounds for every frame the sound timer is non-zero
    pub fn tone_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Reads the byte at `addr`, wrapped to 12 bits
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    /// Writes the byte at `addr`, wrapped to 12 bits
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = value;
    }

    /// The big-endian instruction word the pc points at
    pub fn fetch(&self) -> u16 {
        let left = u16::from(self.read(self.pc));
        let right = u16::from(self.read(self.pc.wrapping_add(1)));
        left << 8 | right
    }

    /// Whether the pixel at (x, y) is lit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.frame_buffer[y][x] == 1
    }

    /// The frame buffer flattened row by row
    pub fn pixels(&self) -> Vec<bool> {
        self.frame_buffer
            .iter()
            .flat_map(|row| row.iter())
            .map(|&p| p == 1)
            .collect()
    }

    /// The occupied part of the call stack, oldest return address first
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_installs_sprite_sheet() {
        let state = State::new();
        assert_eq!(state.memory[0..80], SPRITE_SHEET[..]);
        assert!(state.memory[80..].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_reset_clears_everything_but_the_font() {
        let mut state = State::new();
        state.v[0x3] = 0x42;
        state.i = 0x123;
        state.pc = 0x300;
        state.sound_timer = 9;
        state.frame_buffer[4][4] = 1;
        state.memory[0x400] = 0xFF;
        state.memory[0x10] = 0x00;
        state.reset();
        assert_eq!(state.v, [0; 16]);
        assert_eq!(state.i, 0);
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sound_timer, 0);
        assert_eq!(state.frame_buffer[4][4], 0);
        assert_eq!(state.memory[0x400], 0);
        assert_eq!(state.memory[0x10], SPRITE_SHEET[0x10]);
    }

    #[test]
    fn test_load_copies_rom_to_0x200() {
        let mut state = State::new();
        state.load(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(state.pc, 0x200);
    }

    #[test]
    fn test_load_accepts_largest_rom() {
        let mut state = State::new();
        let rom = vec![0xAB; MAX_ROM_SIZE];
        assert!(state.load(&rom).is_ok());
        assert_eq!(state.memory[0xFFF], 0xAB);
    }

    #[test]
    fn test_load_rejects_oversized_rom() {
        let mut state = State::new();
        let rom = vec![0xAB; MAX_ROM_SIZE + 1];
        assert_eq!(
            state.load(&rom),
            Err(LoadError::RomTooLarge {
                size: 3585,
                max: 3584
            })
        );
        assert_eq!(state.memory[0x200], 0);
    }

    #[test]
    fn test_tick_timers_clamps_at_zero() {
        let mut state = State::new();
        state.delay_timer = 1;
        assert!(!state.tick_timers());
        assert_eq!(state.delay_timer, 0);
        assert!(!state.tick_timers());
        assert_eq!(state.delay_timer, 0);
    }

    #[test]
    fn test_tick_timers_reports_tone_end() {
        let mut state = State::new();
        state.sound_timer = 2;
        assert!(state.tone_active());
        assert!(!state.tick_timers());
        assert!(state.tone_active());
        assert!(state.tick_timers());
        assert!(!state.tone_active());
        assert!(!state.tick_timers());
    }

    #[test]
    fn test_memory_access_wraps_to_12_bits() {
        let mut state = State::new();
        state.write(0x1005, 0x77);
        assert_eq!(state.memory[0x005], 0x77);
        assert_eq!(state.read(0xF005), 0x77);
    }

    #[test]
    fn test_fetch_is_big_endian() {
        let mut state = State::new();
        state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(state.fetch(), 0xAABB);
    }

    #[test]
    fn test_fetch_wraps_at_end_of_memory() {
        let mut state = State::new();
        state.pc = 0xFFF;
        state.memory[0xFFF] = 0x12;
        assert_eq!(state.fetch(), 0x12F0);
    }

    #[test]
    fn test_pixels_flatten_rows() {
        let mut state = State::new();
        state.frame_buffer[1][0] = 1;
        let pixels = state.pixels();
        assert_eq!(pixels.len(), DISPLAY_WIDTH * DISPLAY_HEIGHT);
        assert!(pixels[DISPLAY_WIDTH]);
        assert!(state.pixel(0, 1));
        assert!(!state.pixel(1, 0));
    }
}
