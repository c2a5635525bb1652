use thiserror::Error;

/// Errors raised while installing a ROM image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },
}

/// Faults that halt the running machine.
///
/// Every variant records the address of the instruction that faulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("unknown opcode {opcode:#06X} at {pc:#06X}")]
    UnknownOpcode { pc: u16, opcode: u16 },

    #[error("invalid key index {value:#04X} at {pc:#06X}")]
    InvalidKeyIndex { pc: u16, value: u8 },

    #[error("invalid font digit {value:#04X} at {pc:#06X}")]
    InvalidFontDigit { pc: u16, value: u8 },

    #[error("stack overflow: call at {pc:#06X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },
}

impl ExecutionError {
    /// Address of the faulting instruction
    pub fn pc(&self) -> u16 {
        match *self {
            ExecutionError::UnknownOpcode { pc, .. }
            | ExecutionError::InvalidKeyIndex { pc, .. }
            | ExecutionError::InvalidFontDigit { pc, .. }
            | ExecutionError::StackOverflow { pc }
            | ExecutionError::StackUnderflow { pc } => pc,
        }
    }
}

/// Errors raised while assembling source text; lines count from 1
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("line {line}: unknown mnemonic {mnemonic:?}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: invalid operands for {mnemonic}")]
    InvalidOperands { line: usize, mnemonic: String },

    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: value {value:#X} doesn't fit in {max:#X}")]
    ValueOutOfRange { line: usize, value: u16, max: u16 },

    #[error("line {line}: invalid label {label:?}")]
    InvalidLabel { line: usize, label: String },

    #[error("line {line}: label {label:?} is already defined")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: unknown label {label:?}")]
    UnknownLabel { line: usize, label: String },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },
}
