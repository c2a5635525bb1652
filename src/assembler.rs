use std::collections::HashMap;

use log::debug;

use crate::constants::{ADDRESS_MASK, MAX_ROM_SIZE, ROM_OFFSET};
use crate::error::AssembleError;
use crate::instruction::Instruction;

/// Every mnemonic the assembler accepts, plus `DATA` for a raw word
const MNEMONICS: [&str; 20] = [
    "CLS", "RET", "JP", "CALL", "SE", "SNE", "LD", "ADD", "OR", "AND", "XOR", "SUB", "SHR",
    "SUBN", "SHL", "RND", "DRW", "SKP", "SKNP", "DATA",
];

/// Operand words that aren't registers, numbers or labels
const KEYWORDS: [&str; 7] = ["I", "[I]", "DT", "ST", "K", "F", "B"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Operand {
    /// `V0`..`VF`
    Register(u8),
    /// A number or a resolved label
    Value(u16),
    /// `I`
    Index,
    /// `[I]`
    Memory,
    /// `DT`
    Delay,
    /// `ST`
    Sound,
    /// `K`
    Key,
    /// `F`
    Font,
    /// `B`
    Bcd,
}

/// One instruction line, with its operands still unparsed
struct Statement<'a> {
    line: usize,
    mnemonic: String,
    operands: Vec<&'a str>,
}

/// # Assembler
/// Turns Chip-8 assembly into a ROM image to be loaded at 0x200.
///
/// One instruction per line; operands are separated by commas and/or
/// whitespace, and `;` starts a comment. A `name:` prefix defines a label
/// holding the address of the next instruction; labels may be used before
/// they are defined.
///
/// ```text
/// start:  LD   V0, 0x05      ; counter
/// loop:   ADD  V0, 255
///         SE   V0, 0
///         JP   loop
///         DATA 0b1111000011110000
/// ```
///
/// Mnemonics and keywords are case-insensitive, labels aren't. Numbers are
/// decimal, `0x` hex or `0b` binary. The `{Vy}` form printed by the
/// disassembler for shifts is accepted, so its output assembles back.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssembleError> {
    let mut labels: HashMap<&str, u16> = HashMap::new();
    let mut statements = Vec::new();

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let code = text.split(';').next().unwrap_or_default();
        let mut words = code
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|word| !word.is_empty())
            .peekable();

        while let Some(label) = words.peek().copied().and_then(|word| word.strip_suffix(':')) {
            if !is_label(label) {
                return Err(AssembleError::InvalidLabel {
                    line,
                    label: label.to_string(),
                });
            }
            let address = ROM_OFFSET.wrapping_add((statements.len() * 2) as u16);
            if labels.insert(label, address).is_some() {
                return Err(AssembleError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
            words.next();
        }

        if let Some(mnemonic) = words.next() {
            statements.push(Statement {
                line,
                mnemonic: mnemonic.to_ascii_uppercase(),
                operands: words.collect(),
            });
        }
    }

    let size = statements.len() * 2;
    if size > MAX_ROM_SIZE {
        return Err(AssembleError::ProgramTooLarge {
            size,
            max: MAX_ROM_SIZE,
        });
    }

    let mut rom = Vec::with_capacity(size);
    for statement in statements.iter() {
        let operands = statement
            .operands
            .iter()
            .map(|word| operand(statement.line, word, &labels))
            .collect::<Result<Vec<_>, _>>()?;
        let word = match (statement.mnemonic.as_str(), &operands[..]) {
            ("DATA", &[Operand::Value(word)]) => word,
            (mnemonic, operands) => instruction(statement.line, mnemonic, operands)?.encode(),
        };
        rom.extend_from_slice(&word.to_be_bytes());
    }

    debug!(
        "assembled {} instructions and {} labels into {} bytes",
        statements.len(),
        labels.len(),
        rom.len()
    );
    Ok(rom)
}

/// Picks the instruction a mnemonic and its operands stand for
fn instruction(
    line: usize,
    mnemonic: &str,
    operands: &[Operand],
) -> Result<Instruction, AssembleError> {
    use Operand::*;

    let instruction = match (mnemonic, operands) {
        ("CLS", &[]) => Instruction::Cls,
        ("RET", &[]) => Instruction::Ret,
        ("JP", &[Value(addr)]) => Instruction::Jp {
            addr: address(line, addr)?,
        },
        ("JP", &[Register(0x0), Value(addr)]) => Instruction::JpV0 {
            addr: address(line, addr)?,
        },
        ("CALL", &[Value(addr)]) => Instruction::Call {
            addr: address(line, addr)?,
        },
        ("SE", &[Register(x), Value(kk)]) => Instruction::SeByte {
            x,
            kk: byte(line, kk)?,
        },
        ("SE", &[Register(x), Register(y)]) => Instruction::SeReg { x, y },
        ("SNE", &[Register(x), Value(kk)]) => Instruction::SneByte {
            x,
            kk: byte(line, kk)?,
        },
        ("SNE", &[Register(x), Register(y)]) => Instruction::SneReg { x, y },
        ("LD", &[Register(x), Value(kk)]) => Instruction::LdByte {
            x,
            kk: byte(line, kk)?,
        },
        ("LD", &[Register(x), Register(y)]) => Instruction::LdReg { x, y },
        ("LD", &[Index, Value(addr)]) => Instruction::LdI {
            addr: address(line, addr)?,
        },
        ("LD", &[Register(x), Delay]) => Instruction::LdFromDelay { x },
        ("LD", &[Register(x), Key]) => Instruction::LdKey { x },
        ("LD", &[Delay, Register(x)]) => Instruction::LdDelay { x },
        ("LD", &[Sound, Register(x)]) => Instruction::LdSound { x },
        ("LD", &[Font, Register(x)]) => Instruction::LdFont { x },
        ("LD", &[Bcd, Register(x)]) => Instruction::LdBcd { x },
        ("LD", &[Memory, Register(x)]) => Instruction::Store { x },
        ("LD", &[Register(x), Memory]) => Instruction::Restore { x },
        ("ADD", &[Register(x), Value(kk)]) => Instruction::AddByte {
            x,
            kk: byte(line, kk)?,
        },
        ("ADD", &[Register(x), Register(y)]) => Instruction::AddReg { x, y },
        ("ADD", &[Index, Register(x)]) => Instruction::AddI { x },
        ("OR", &[Register(x), Register(y)]) => Instruction::Or { x, y },
        ("AND", &[Register(x), Register(y)]) => Instruction::And { x, y },
        ("XOR", &[Register(x), Register(y)]) => Instruction::Xor { x, y },
        ("SUB", &[Register(x), Register(y)]) => Instruction::Sub { x, y },
        ("SUBN", &[Register(x), Register(y)]) => Instruction::Subn { x, y },
        ("SHR", &[Register(x)]) => Instruction::Shr { x, y: x },
        ("SHR", &[Register(x), Register(y)]) => Instruction::Shr { x, y },
        ("SHL", &[Register(x)]) => Instruction::Shl { x, y: x },
        ("SHL", &[Register(x), Register(y)]) => Instruction::Shl { x, y },
        ("RND", &[Register(x), Value(kk)]) => Instruction::Rnd {
            x,
            kk: byte(line, kk)?,
        },
        ("DRW", &[Register(x), Register(y), Value(n)]) => Instruction::Drw {
            x,
            y,
            n: nibble(line, n)?,
        },
        ("SKP", &[Register(x)]) => Instruction::Skp { x },
        ("SKNP", &[Register(x)]) => Instruction::Sknp { x },
        (mnemonic, _) if MNEMONICS.contains(&mnemonic) => {
            return Err(AssembleError::InvalidOperands {
                line,
                mnemonic: mnemonic.to_string(),
            })
        }
        (mnemonic, _) => {
            return Err(AssembleError::UnknownMnemonic {
                line,
                mnemonic: mnemonic.to_string(),
            })
        }
    };
    Ok(instruction)
}

fn operand(
    line: usize,
    word: &str,
    labels: &HashMap<&str, u16>,
) -> Result<Operand, AssembleError> {
    let word = word.trim_start_matches('{').trim_end_matches('}');
    let keyword = match word.to_ascii_uppercase().as_str() {
        "I" => Some(Operand::Index),
        "[I]" => Some(Operand::Memory),
        "DT" => Some(Operand::Delay),
        "ST" => Some(Operand::Sound),
        "K" => Some(Operand::Key),
        "F" => Some(Operand::Font),
        "B" => Some(Operand::Bcd),
        _ => None,
    };
    if let Some(keyword) = keyword {
        return Ok(keyword);
    }
    if let Some(x) = register(word) {
        return Ok(Operand::Register(x));
    }
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        return number(word)
            .map(Operand::Value)
            .ok_or_else(|| AssembleError::InvalidNumber {
                line,
                token: word.to_string(),
            });
    }
    labels
        .get(word)
        .map(|&address| Operand::Value(address))
        .ok_or_else(|| AssembleError::UnknownLabel {
            line,
            label: word.to_string(),
        })
}

/// `V0`..`VF`, either case
fn register(word: &str) -> Option<u8> {
    let mut chars = word.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('V'), Some(digit), None) | (Some('v'), Some(digit), None) => {
            digit.to_digit(16).map(|x| x as u8)
        }
        _ => None,
    }
}

/// Decimal, `0x` hex or `0b` binary, up to 16 bits
fn number(word: &str) -> Option<u16> {
    let lower = word.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(binary) = lower.strip_prefix("0b") {
        u16::from_str_radix(binary, 2).ok()
    } else {
        lower.parse().ok()
    }
}

fn is_label(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && register(name).is_none()
        && !KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

fn fits(line: usize, value: u16, max: u16) -> Result<u16, AssembleError> {
    if value > max {
        return Err(AssembleError::ValueOutOfRange { line, value, max });
    }
    Ok(value)
}

fn address(line: usize, value: u16) -> Result<u16, AssembleError> {
    fits(line, value, ADDRESS_MASK)
}

fn byte(line: usize, value: u16) -> Result<u8, AssembleError> {
    fits(line, value, 0xFF).map(|value| value as u8)
}

fn nibble(line: usize, value: u16) -> Result<u8, AssembleError> {
    fits(line, value, 0xF).map(|value| value as u8)
}
