use std::fmt;

use crate::constants::{ADDRESS_MASK, MAX_ROM_SIZE, ROM_OFFSET};
use crate::opcode::Opcode;

/// A decoded Chip-8 instruction.
///
/// Register operands are indices 0x0..=0xF; `addr` operands are 12 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SeByte { x: u8, kk: u8 },
    /// 4xkk
    SneByte { x: u8, kk: u8 },
    /// 5xy0
    SeReg { x: u8, y: u8 },
    /// 6xkk
    LdByte { x: u8, kk: u8 },
    /// 7xkk
    AddByte { x: u8, kk: u8 },
    /// 8xy0
    LdReg { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    Shr { x: u8, y: u8 },
    /// 8xy7
    Subn { x: u8, y: u8 },
    /// 8xyE
    Shl { x: u8, y: u8 },
    /// 9xy0
    SneReg { x: u8, y: u8 },
    /// Annn
    LdI { addr: u16 },
    /// Bnnn
    JpV0 { addr: u16 },
    /// Cxkk
    Rnd { x: u8, kk: u8 },
    /// Dxyn
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E
    Skp { x: u8 },
    /// ExA1
    Sknp { x: u8 },
    /// Fx07
    LdFromDelay { x: u8 },
    /// Fx0A
    LdKey { x: u8 },
    /// Fx15
    LdDelay { x: u8 },
    /// Fx18
    LdSound { x: u8 },
    /// Fx1E
    AddI { x: u8 },
    /// Fx29
    LdFont { x: u8 },
    /// Fx33
    LdBcd { x: u8 },
    /// Fx55
    Store { x: u8 },
    /// Fx65
    Restore { x: u8 },
}

impl Instruction {
    /// Selects the Instruction for an opcode; `None` if the word isn't one
    pub fn decode(op: u16) -> Option<Instruction> {
        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Cls,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Ret,
            (0x1, ..) => Instruction::Jp { addr },
            (0x2, ..) => Instruction::Call { addr },
            (0x3, ..) => Instruction::SeByte { x, kk },
            (0x4, ..) => Instruction::SneByte { x, kk },
            (0x5, .., 0x0) => Instruction::SeReg { x, y },
            (0x6, ..) => Instruction::LdByte { x, kk },
            (0x7, ..) => Instruction::AddByte { x, kk },
            (0x8, .., 0x0) => Instruction::LdReg { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddReg { x, y },
            (0x8, .., 0x5) => Instruction::Sub { x, y },
            (0x8, .., 0x6) => Instruction::Shr { x, y },
            (0x8, .., 0x7) => Instruction::Subn { x, y },
            (0x8, .., 0xE) => Instruction::Shl { x, y },
            (0x9, .., 0x0) => Instruction::SneReg { x, y },
            (0xA, ..) => Instruction::LdI { addr },
            (0xB, ..) => Instruction::JpV0 { addr },
            (0xC, ..) => Instruction::Rnd { x, kk },
            (0xD, ..) => Instruction::Drw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::Skp { x },
            (0xE, _, 0xA, 0x1) => Instruction::Sknp { x },
            (0xF, _, 0x0, 0x7) => Instruction::LdFromDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::LdKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::LdDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::LdSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddI { x },
            (0xF, _, 0x2, 0x9) => Instruction::LdFont { x },
            (0xF, _, 0x3, 0x3) => Instruction::LdBcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::Store { x },
            (0xF, _, 0x6, 0x5) => Instruction::Restore { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// The opcode for this instruction; the inverse of `decode`
    pub fn encode(&self) -> u16 {
        match *self {
            Instruction::Cls => 0x00E0,
            Instruction::Ret => 0x00EE,
            Instruction::Jp { addr } => nnn(0x1, addr),
            Instruction::Call { addr } => nnn(0x2, addr),
            Instruction::SeByte { x, kk } => xkk(0x3, x, kk),
            Instruction::SneByte { x, kk } => xkk(0x4, x, kk),
            Instruction::SeReg { x, y } => xyn(0x5, x, y, 0x0),
            Instruction::LdByte { x, kk } => xkk(0x6, x, kk),
            Instruction::AddByte { x, kk } => xkk(0x7, x, kk),
            Instruction::LdReg { x, y } => xyn(0x8, x, y, 0x0),
            Instruction::Or { x, y } => xyn(0x8, x, y, 0x1),
            Instruction::And { x, y } => xyn(0x8, x, y, 0x2),
            Instruction::Xor { x, y } => xyn(0x8, x, y, 0x3),
            Instruction::AddReg { x, y } => xyn(0x8, x, y, 0x4),
            Instruction::Sub { x, y } => xyn(0x8, x, y, 0x5),
            Instruction::Shr { x, y } => xyn(0x8, x, y, 0x6),
            Instruction::Subn { x, y } => xyn(0x8, x, y, 0x7),
            Instruction::Shl { x, y } => xyn(0x8, x, y, 0xE),
            Instruction::SneReg { x, y } => xyn(0x9, x, y, 0x0),
            Instruction::LdI { addr } => nnn(0xA, addr),
            Instruction::JpV0 { addr } => nnn(0xB, addr),
            Instruction::Rnd { x, kk } => xkk(0xC, x, kk),
            Instruction::Drw { x, y, n } => xyn(0xD, x, y, n),
            Instruction::Skp { x } => xkk(0xE, x, 0x9E),
            Instruction::Sknp { x } => xkk(0xE, x, 0xA1),
            Instruction::LdFromDelay { x } => xkk(0xF, x, 0x07),
            Instruction::LdKey { x } => xkk(0xF, x, 0x0A),
            Instruction::LdDelay { x } => xkk(0xF, x, 0x15),
            Instruction::LdSound { x } => xkk(0xF, x, 0x18),
            Instruction::AddI { x } => xkk(0xF, x, 0x1E),
            Instruction::LdFont { x } => xkk(0xF, x, 0x29),
            Instruction::LdBcd { x } => xkk(0xF, x, 0x33),
            Instruction::Store { x } => xkk(0xF, x, 0x55),
            Instruction::Restore { x } => xkk(0xF, x, 0x65),
        }
    }
}

/// `[fnnn]`
fn nnn(family: u16, addr: u16) -> u16 {
    family << 12 | addr & ADDRESS_MASK
}

/// `[fxkk]`
fn xkk(family: u16, x: u8, kk: u8) -> u16 {
    family << 12 | u16::from(x & 0xF) << 8 | u16::from(kk)
}

/// `[fxyn]`
fn xyn(family: u16, x: u8, y: u8, n: u8) -> u16 {
    family << 12 | u16::from(x & 0xF) << 8 | u16::from(y & 0xF) << 4 | u16::from(n & 0xF)
}

/// Mnemonics in the assembler's syntax, e.g. `DRW  V1,\tV2,\t5`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Jp { addr } => write!(f, "JP   {:#06X}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#06X}", addr),
            Instruction::SeByte { x, kk } => write!(f, "SE   V{:X},\t{}", x, kk),
            Instruction::SneByte { x, kk } => write!(f, "SNE  V{:X},\t{}", x, kk),
            Instruction::SeReg { x, y } => write!(f, "SE   V{:X},\tV{:X}", x, y),
            Instruction::LdByte { x, kk } => write!(f, "LD   V{:X},\t{}", x, kk),
            Instruction::AddByte { x, kk } => write!(f, "ADD  V{:X},\t{}", x, kk),
            Instruction::LdReg { x, y } => write!(f, "LD   V{:X},\tV{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR   V{:X},\tV{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND  V{:X},\tV{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR  V{:X},\tV{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD  V{:X},\tV{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB  V{:X},\tV{:X}", x, y),
            Instruction::Shr { x, y } => write!(f, "SHR  V{:X},\t{{V{:X}}}", x, y),
            Instruction::Subn { x, y } => write!(f, "SUBN V{:X},\tV{:X}", x, y),
            Instruction::Shl { x, y } => write!(f, "SHL  V{:X},\t{{V{:X}}}", x, y),
            Instruction::SneReg { x, y } => write!(f, "SNE  V{:X},\tV{:X}", x, y),
            Instruction::LdI { addr } => write!(f, "LD   I,\t{:#06X}", addr),
            Instruction::JpV0 { addr } => write!(f, "JP   V0,\t{:#06X}", addr),
            Instruction::Rnd { x, kk } => write!(f, "RND  V{:X},\t{}", x, kk),
            Instruction::Drw { x, y, n } => write!(f, "DRW  V{:X},\tV{:X},\t{}", x, y, n),
            Instruction::Skp { x } => write!(f, "SKP  V{:X}", x),
            Instruction::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LdFromDelay { x } => write!(f, "LD   V{:X},\tDT", x),
            Instruction::LdKey { x } => write!(f, "LD   V{:X},\tK", x),
            Instruction::LdDelay { x } => write!(f, "LD   DT,\tV{:X}", x),
            Instruction::LdSound { x } => write!(f, "LD   ST,\tV{:X}", x),
            Instruction::AddI { x } => write!(f, "ADD  I,\tV{:X}", x),
            Instruction::LdFont { x } => write!(f, "LD   F,\tV{:X}", x),
            Instruction::LdBcd { x } => write!(f, "LD   B,\tV{:X}", x),
            Instruction::Store { x } => write!(f, "LD   [I],\tV{:X}", x),
            Instruction::Restore { x } => write!(f, "LD   V{:X},\t[I]", x),
        }
    }
}

/// One word of a disassembled ROM
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub opcode: u16,
    pub instruction: Option<Instruction>,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}: ({:04X}) ", self.address, self.opcode)?;
        match self.instruction {
            Some(instruction) => write!(f, "{}", instruction),
            None => write!(f, "Unknown opcode"),
        }
    }
}

/// Decodes a ROM image word by word, as if loaded at 0x200.
///
/// A trailing odd byte is read as the high half of a word whose low half is 0.
/// Anything past the largest loadable ROM is ignored.
pub fn disassemble(rom: &[u8]) -> Vec<Line> {
    rom[..rom.len().min(MAX_ROM_SIZE)]
        .chunks(2)
        .enumerate()
        .map(|(index, word)| {
            let right = word.get(1).copied().unwrap_or(0);
            let opcode = u16::from(word[0]) << 8 | u16::from(right);
            Line {
                address: ROM_OFFSET + (index * 2) as u16,
                opcode,
                instruction: Instruction::decode(opcode),
            }
        })
        .collect()
}
