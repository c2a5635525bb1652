/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Addresses are 12 bits wide
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// ROMs are loaded here and execution starts here
pub const ROM_OFFSET: u16 = 0x200;

/// Everything from `ROM_OFFSET` to the end of memory is available to a ROM
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_OFFSET as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

/// Keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// Display refresh rate; timers tick once per frame
pub const FRAME_RATE: u32 = 60;

/// Instructions executed per rendered frame (~600Hz at 60fps)
pub const STEPS_PER_FRAME: u32 = 10;

/// Bytes per font glyph
pub const GLYPH_SIZE: u16 = 5;

/// # Sprite Sheet
/// The hexadecimal digits 0..F, 5 bytes each, installed at address 0.
///
/// Each byte is one row of a 4 pixel wide glyph, e.g. `0`:
/// ```text
/// 0xF0 ****
/// 0x90 *  *
/// 0x90 *  *
/// 0x90 *  *
/// 0xF0 ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
