/// # Config
/// Behaviour that differs between Chip-8 interpreters, plus execution options.
///
/// `Config::default()` reproduces the classic interpreter:
/// sprites wrap at the screen edges, SUB/SUBN set VF on strict inequality,
/// `ADD I, Vx` keeps I within 12 bits and self-jumps are not detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Halt when `JP addr` jumps to its own address
    pub detect_self_jump: bool,
    pub draw_edge: DrawEdge,
    pub borrow_flag: BorrowFlag,
    pub index_overflow: IndexOverflow,
    /// Seed for `RND`; `None` draws a seed from the OS
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            detect_self_jump: false,
            draw_edge: DrawEdge::Wrap,
            borrow_flag: BorrowFlag::Strict,
            index_overflow: IndexOverflow::Wrap12,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Settings for unattended runs: reproducible randomness and self-jump detection
    pub fn headless(seed: u64) -> Self {
        Config {
            detect_self_jump: true,
            rng_seed: Some(seed),
            ..Config::default()
        }
    }
}

/// What happens to sprite pixels that land beyond the display
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawEdge {
    /// Wrap around to the opposite edge (modulo 64 / 32)
    Wrap,
    /// Discard the pixel
    Clip,
}

/// When SUB (`8xy5`) and SUBN (`8xy7`) set VF
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorrowFlag {
    /// VF = 1 iff minuend > subtrahend
    Strict,
    /// VF = 1 iff minuend >= subtrahend
    Inclusive,
}

impl BorrowFlag {
    pub fn no_borrow(self, minuend: u8, subtrahend: u8) -> bool {
        match self {
            BorrowFlag::Strict => minuend > subtrahend,
            BorrowFlag::Inclusive => minuend >= subtrahend,
        }
    }
}

/// Width of `ADD I, Vx`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexOverflow {
    /// I stays within 0x000..=0xFFF
    Wrap12,
    /// I wraps at 0xFFFF; memory accesses still mask to 12 bits
    Wide16,
}
