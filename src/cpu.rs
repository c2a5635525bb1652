use log::{debug, error, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::constants::KEY_COUNT;
use crate::error::ExecutionError;
use crate::instruction::Instruction;
use crate::operations::*;
use crate::state::State;

/// What the engine is doing between steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Fetching and executing instructions
    Running,
    /// Blocked on `LD Vx, K` until a key goes down
    ///
    /// `held` is a bitmask of keys that were already down and must be
    /// released before they count as a fresh press.
    AwaitingKey { register: u8, held: u16 },
    /// Stopped on a jump to itself
    SelfJump { pc: u16 },
    /// Stopped on a fault; every further step reports it again
    Faulted(ExecutionError),
}

/// Side effects of a single step
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    /// The frame buffer changed
    pub draw: bool,
    /// The engine is waiting for a key press
    pub awaiting_key: bool,
    /// The engine stopped on a jump to itself
    pub self_jump: bool,
}

/// # Chip-8 CPU
/// The fetch-decode-execute engine.
///
/// Each `step` fetches the word at the pc, decodes it into an `Instruction`
/// and applies it to a `State`. The pc then either moved on by 2, was
/// redirected by a jump/call/return, or stayed put while awaiting a key.
pub struct Cpu {
    config: Config,
    mode: Mode,
    rng: StdRng,
}

impl Cpu {
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Cpu {
            config,
            mode: Mode::Running,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Back to `Running`; the random source is reseeded when a seed is configured
    pub fn reset(&mut self) {
        *self = Cpu::new(self.config);
    }

    /// Whether further steps will execute anything
    pub fn is_halted(&self) -> bool {
        matches!(self.mode, Mode::SelfJump { .. } | Mode::Faulted(_))
    }

    /// Advances the CPU by a single instruction
    /// - re-reports a fault or self-jump once stopped
    /// - polls the keypad while awaiting a key
    /// - otherwise fetches, decodes and executes the instruction at the pc
    pub fn step(&mut self, state: &mut State) -> Result<StepResult, ExecutionError> {
        match self.mode {
            Mode::Running => {}
            Mode::AwaitingKey { register, held } => return Ok(self.poll_key(state, register, held)),
            Mode::SelfJump { .. } => {
                return Ok(StepResult {
                    self_jump: true,
                    ..StepResult::default()
                })
            }
            Mode::Faulted(ref fault) => return Err(fault.clone()),
        }

        let pc = state.pc;
        let op = state.fetch();
        let result = match Instruction::decode(op) {
            Some(instruction) => {
                trace!("{:04X}: ({:04X}) {}", pc, op, instruction);
                self.execute(instruction, state)
            }
            None => Err(ExecutionError::UnknownOpcode { pc, opcode: op }),
        };

        result.map_err(|fault| {
            error!("{}; halting", fault);
            self.mode = Mode::Faulted(fault.clone());
            fault
        })
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        state: &mut State,
    ) -> Result<StepResult, ExecutionError> {
        let mut result = StepResult::default();
        let config = self.config;

        match instruction {
            Instruction::Cls => {
                clr(state);
                result.draw = true;
            }
            Instruction::Ret => rts(state)?,
            Instruction::Jp { addr } => {
                if config.detect_self_jump && addr == state.pc {
                    warn!("infinite loop detected at {:#06X}; stopping", addr);
                    self.mode = Mode::SelfJump { pc: addr };
                    result.self_jump = true;
                }
                jump(state, addr);
            }
            Instruction::Call { addr } => call(state, addr)?,
            Instruction::SeByte { x, kk } => ske(state, x, kk),
            Instruction::SneByte { x, kk } => skne(state, x, kk),
            Instruction::SeReg { x, y } => skre(state, x, y),
            Instruction::LdByte { x, kk } => load(state, x, kk),
            Instruction::AddByte { x, kk } => add(state, x, kk),
            Instruction::LdReg { x, y } => mv(state, x, y),
            Instruction::Or { x, y } => or(state, x, y),
            Instruction::And { x, y } => and(state, x, y),
            Instruction::Xor { x, y } => xor(state, x, y),
            Instruction::AddReg { x, y } => addr(state, x, y),
            Instruction::Sub { x, y } => sub(state, x, y, config.borrow_flag),
            Instruction::Shr { x, .. } => shr(state, x),
            Instruction::Subn { x, y } => subn(state, x, y, config.borrow_flag),
            Instruction::Shl { x, .. } => shl(state, x),
            Instruction::SneReg { x, y } => skrne(state, x, y),
            Instruction::LdI { addr } => loadi(state, addr),
            Instruction::JpV0 { addr } => jumpi(state, addr),
            Instruction::Rnd { x, kk } => rand(state, x, kk, &mut self.rng),
            Instruction::Drw { x, y, n } => {
                draw(state, x, y, n, config.draw_edge);
                result.draw = true;
            }
            Instruction::Skp { x } => skpr(state, x)?,
            Instruction::Sknp { x } => skup(state, x)?,
            Instruction::LdFromDelay { x } => moved(state, x),
            Instruction::LdKey { x } => {
                debug!("awaiting key for V{:X}", x);
                self.mode = Mode::AwaitingKey {
                    register: x,
                    held: key_mask(state),
                };
                result.awaiting_key = true;
            }
            Instruction::LdDelay { x } => loads(state, x),
            Instruction::LdSound { x } => ld(state, x),
            Instruction::AddI { x } => addi(state, x, config.index_overflow),
            Instruction::LdFont { x } => ldspr(state, x)?,
            Instruction::LdBcd { x } => bcd(state, x),
            Instruction::Store { x } => stor(state, x),
            Instruction::Restore { x } => read(state, x),
        }

        Ok(result)
    }

    /// Completes `LD Vx, K` once a key that wasn't already held goes down.
    /// The lowest such key wins.
    fn poll_key(&mut self, state: &mut State, register: u8, held: u16) -> StepResult {
        let pressed = key_mask(state);
        let fresh = pressed & !held;
        if fresh == 0 {
            // Released keys may count again on their next press
            self.mode = Mode::AwaitingKey {
                register,
                held: held & pressed,
            };
            return StepResult {
                awaiting_key: true,
                ..StepResult::default()
            };
        }

        let key = fresh.trailing_zeros() as u8;
        debug!("key {:X} pressed; V{:X} = {:X}", key, register, key);
        keyd(state, register, key);
        self.mode = Mode::Running;
        StepResult::default()
    }
}

/// The keypad snapshot as a bitmask, bit n for key n
fn key_mask(state: &State) -> u16 {
    (0..KEY_COUNT)
        .filter(|&key| state.keys[key])
        .fold(0u16, |mask, key| mask | (1u16 << key))
}
