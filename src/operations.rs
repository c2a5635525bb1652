use rand::Rng;

use crate::config::{BorrowFlag, DrawEdge, IndexOverflow};
use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE, KEY_COUNT, STACK_DEPTH,
};
use crate::error::ExecutionError;
use crate::state::State;

/// Moves on to the next instruction
fn next(state: &mut State) {
    state.pc = state.pc.wrapping_add(0x2);
}

/// Skips the next instruction if `condition` holds
fn skip_if(state: &mut State, condition: bool) {
    let step = if condition { 0x4 } else { 0x2 };
    state.pc = state.pc.wrapping_add(step);
}

/// Looks up a register used as a key index
fn key_index(state: &State, x: u8) -> Result<usize, ExecutionError> {
    let value = state.v[x as usize];
    if value as usize >= KEY_COUNT {
        return Err(ExecutionError::InvalidKeyIndex {
            pc: state.pc,
            value,
        });
    }
    Ok(value as usize)
}

/// clear
pub fn clr(state: &mut State) {
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    next(state);
}

/// PC = STACK.pop() + 2
pub fn rts(state: &mut State) -> Result<(), ExecutionError> {
    if state.sp == 0 {
        return Err(ExecutionError::StackUnderflow { pc: state.pc });
    }
    state.sp -= 0x1;
    state.pc = state.stack[state.sp as usize];
    next(state);
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) {
    state.pc = addr;
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<(), ExecutionError> {
    if state.sp as usize == STACK_DEPTH {
        return Err(ExecutionError::StackOverflow { pc: state.pc });
    }
    state.stack[state.sp as usize] = state.pc;
    state.sp += 0x1;
    state.pc = addr;
    Ok(())
}

/// if Vx == kk then pc += 2
pub fn ske(state: &mut State, x: u8, kk: u8) {
    let condition = state.v[x as usize] == kk;
    skip_if(state, condition);
}

/// if Vx != kk then pc += 2
pub fn skne(state: &mut State, x: u8, kk: u8) {
    let condition = state.v[x as usize] != kk;
    skip_if(state, condition);
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: u8, y: u8) {
    let condition = state.v[x as usize] == state.v[y as usize];
    skip_if(state, condition);
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: u8, y: u8) {
    let condition = state.v[x as usize] != state.v[y as usize];
    skip_if(state, condition);
}

/// Vx = kk
pub fn load(state: &mut State, x: u8, kk: u8) {
    state.v[x as usize] = kk;
    next(state);
}

/// Vx += kk
/// Overflow is dropped and VF is left alone
pub fn add(state: &mut State, x: u8, kk: u8) {
    state.v[x as usize] = state.v[x as usize].wrapping_add(kk);
    next(state);
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] = state.v[y as usize];
    next(state);
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] |= state.v[y as usize];
    next(state);
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] &= state.v[y as usize];
    next(state);
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] ^= state.v[y as usize];
    next(state);
}

/// Vx += Vy; VF = carry
pub fn addr(state: &mut State, x: u8, y: u8) {
    let (res, over) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    state.v[x as usize] = res;
    state.v[0xF] = over as u8;
    next(state);
}

/// Vx -= Vy; VF = !borrow
pub fn sub(state: &mut State, x: u8, y: u8, borrow: BorrowFlag) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vx.wrapping_sub(vy);
    state.v[0xF] = borrow.no_borrow(vx, vy) as u8;
    next(state);
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx >> 1;
    state.v[0xF] = vx & 0x1;
    next(state);
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(state: &mut State, x: u8, y: u8, borrow: BorrowFlag) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vy.wrapping_sub(vx);
    state.v[0xF] = borrow.no_borrow(vy, vx) as u8;
    next(state);
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx << 1;
    state.v[0xF] = vx >> 7;
    next(state);
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
    next(state);
}

/// PC = V0 + addr
pub fn jumpi(state: &mut State, addr: u16) {
    state.pc = addr + u16::from(state.v[0x0]);
}

/// Vx = rand_byte & kk
pub fn rand<R: Rng>(state: &mut State, x: u8, kk: u8, rng: &mut R) {
    let rand_byte: u8 = rng.gen();
    state.v[x as usize] = rand_byte & kk;
    next(state);
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at mem[I..I+n] onto the FrameBuffer at (Vx, Vy).
/// Sets VF if any lit pixel was erased.
pub fn draw(state: &mut State, x: u8, y: u8, n: u8, edge: DrawEdge) {
    let origin_x = state.v[x as usize] as usize;
    let origin_y = state.v[y as usize] as usize;
    let mut collision = 0x0;

    for row in 0..n as usize {
        let sprite = state.read(state.i.wrapping_add(row as u16));
        let py = match edge {
            DrawEdge::Wrap => (origin_y + row) % DISPLAY_HEIGHT,
            DrawEdge::Clip if origin_y + row < DISPLAY_HEIGHT => origin_y + row,
            DrawEdge::Clip => break,
        };
        for bit in 0..8 {
            let px = match edge {
                DrawEdge::Wrap => (origin_x + bit) % DISPLAY_WIDTH,
                DrawEdge::Clip if origin_x + bit < DISPLAY_WIDTH => origin_x + bit,
                DrawEdge::Clip => break,
            };
            let pixel_value = (sprite >> (7 - bit)) & 0x1;
            collision |= pixel_value & state.frame_buffer[py][px];
            state.frame_buffer[py][px] ^= pixel_value;
        }
    }

    state.v[0xF] = collision;
    next(state);
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State, x: u8) -> Result<(), ExecutionError> {
    let key = key_index(state, x)?;
    let condition = state.keys[key];
    skip_if(state, condition);
    Ok(())
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State, x: u8) -> Result<(), ExecutionError> {
    let key = key_index(state, x)?;
    let condition = !state.keys[key];
    skip_if(state, condition);
    Ok(())
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) {
    state.v[x as usize] = state.delay_timer;
    next(state);
}

/// Vx = key; completes an await-keypress
pub fn keyd(state: &mut State, x: u8, key: u8) {
    state.v[x as usize] = key;
    next(state);
}

/// DT = Vx
pub fn loads(state: &mut State, x: u8) {
    state.delay_timer = state.v[x as usize];
    next(state);
}

/// ST = Vx
pub fn ld(state: &mut State, x: u8) {
    state.sound_timer = state.v[x as usize];
    next(state);
}

/// I += Vx
pub fn addi(state: &mut State, x: u8, overflow: IndexOverflow) {
    let sum = state.i.wrapping_add(u16::from(state.v[x as usize]));
    state.i = match overflow {
        IndexOverflow::Wrap12 => sum & ADDRESS_MASK,
        IndexOverflow::Wide16 => sum,
    };
    next(state);
}

/// I = Vx * 5
/// Set I to the address of the sprite for the hex digit in Vx
pub fn ldspr(state: &mut State, x: u8) -> Result<(), ExecutionError> {
    let digit = state.v[x as usize];
    if digit > 0xF {
        return Err(ExecutionError::InvalidFontDigit {
            pc: state.pc,
            value: digit,
        });
    }
    state.i = u16::from(digit) * GLYPH_SIZE;
    next(state);
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    for (offset, &digit) in digits.iter().enumerate() {
        let address = state.i.wrapping_add(offset as u16);
        state.write(address, digit);
    }
    next(state);
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State, x: u8) {
    for register in 0..=x as usize {
        let address = state.i.wrapping_add(register as u16);
        let value = state.v[register];
        state.write(address, value);
    }
    next(state);
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State, x: u8) {
    for register in 0..=x as usize {
        state.v[register] = state.read(state.i.wrapping_add(register as u16));
    }
    next(state);
}
