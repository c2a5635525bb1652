use emu8::constants::MAX_ROM_SIZE;
use emu8::{Chip8, Config, ExecutionError, LoadError};

fn run(program: &[u8], steps: usize) -> Chip8 {
    let mut chip8 = Chip8::new(Config::headless(0));
    chip8.load_rom(program).unwrap();
    for _ in 0..steps {
        chip8.step().unwrap();
    }
    chip8
}

#[test]
fn add_byte_wraps_and_leaves_vf() {
    for &(a, b) in [(0x01u8, 0x02u8), (0xFF, 0x01), (0x80, 0x80), (0xF0, 0x20)].iter() {
        // VF = 0x5A; V3 = a; V3 += b
        let chip8 = run(&[0x6F, 0x5A, 0x63, a, 0x73, b], 3);
        assert_eq!(chip8.state().v[0x3], a.wrapping_add(b));
        assert_eq!(chip8.state().v[0xF], 0x5A);
    }
}

#[test]
fn add_registers_sets_carry() {
    // V0 = 0xFF; V1 = 0x01; V0 += V1
    let chip8 = run(&[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14], 3);
    assert_eq!(chip8.state().v[0x0], 0x00);
    assert_eq!(chip8.state().v[0xF], 0x1);

    let chip8 = run(&[0x60, 0x01, 0x61, 0x01, 0x80, 0x14], 3);
    assert_eq!(chip8.state().v[0x0], 0x02);
    assert_eq!(chip8.state().v[0xF], 0x0);
}

#[test]
fn sub_registers_sets_not_borrow() {
    let chip8 = run(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x15], 3);
    assert_eq!(chip8.state().v[0x0], 0x02);
    assert_eq!(chip8.state().v[0xF], 0x1);

    let chip8 = run(&[0x60, 0x03, 0x61, 0x05, 0x80, 0x15], 3);
    assert_eq!(chip8.state().v[0x0], 0xFE);
    assert_eq!(chip8.state().v[0xF], 0x0);
}

#[test]
fn drawing_twice_erases_and_collides() {
    // CLS; V0 = 10; V1 = 7; I = glyph 8; DRW V0, V1, 5; DRW V0, V1, 5
    let program = [
        0x00, 0xE0, 0x60, 0x0A, 0x61, 0x07, 0xA0, 0x28, 0xD0, 0x15, 0xD0, 0x15,
    ];
    let mut chip8 = run(&program, 5);
    assert!(chip8.state().pixels().iter().any(|&p| p));
    assert_eq!(chip8.state().v[0xF], 0x0);

    let result = chip8.step().unwrap();
    assert!(result.draw);
    assert!(chip8.state().pixels().iter().all(|&p| !p));
    assert_eq!(chip8.state().v[0xF], 0x1);
}

#[test]
fn call_and_return_round_trip() {
    // 0x200: CALL 0x206; 0x202: ...; 0x206: RET
    let chip8 = run(&[0x22, 0x06, 0x00, 0xE0, 0x00, 0xE0, 0x00, 0xEE], 2);
    assert_eq!(chip8.pc(), 0x202);
    assert!(chip8.state().call_stack().is_empty());
}

#[test]
fn store_then_restore_registers() {
    // V0..V2 = 1, 2, 3; I = 0x300; LD [I], V2; V0..V2 = 0; LD V2, [I]
    let program = [
        0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0xA3, 0x00, 0xF2, 0x55, 0x60, 0x00, 0x61, 0x00, 0x62,
        0x00, 0xF2, 0x65,
    ];
    let mut chip8 = run(&program, 5);
    assert_eq!(chip8.state().memory[0x300..0x303], [1, 2, 3]);
    for _ in 0..4 {
        chip8.step().unwrap();
    }
    assert_eq!(chip8.state().v[0x0..0x3], [1, 2, 3]);
}

#[test]
fn rom_size_limit() {
    let mut chip8 = Chip8::default();
    assert!(chip8.load_rom(&vec![0; MAX_ROM_SIZE]).is_ok());
    assert_eq!(
        chip8.load_rom(&vec![0; MAX_ROM_SIZE + 1]),
        Err(LoadError::RomTooLarge {
            size: 3585,
            max: 3584
        })
    );
}

#[test]
fn ld_key_blocks_until_press() {
    let mut chip8 = run(&[0xF4, 0x0A], 0);
    for _ in 0..5 {
        assert!(chip8.step().unwrap().awaiting_key);
        assert_eq!(chip8.pc(), 0x200);
    }
    let mut keys = [false; 16];
    keys[0xA] = true;
    chip8.set_keys(keys);
    assert!(!chip8.step().unwrap().awaiting_key);
    assert_eq!(chip8.pc(), 0x202);
    assert_eq!(chip8.state().v[0x4], 0xA);
}

#[test]
fn font_glyph_lookup_and_bcd() {
    // V5 = 0xC; LD F, V5; V6 = 209; I = 0x400; LD B, V6
    let chip8 = run(
        &[0x65, 0x0C, 0xF5, 0x29, 0x66, 0xD1, 0xA4, 0x00, 0xF6, 0x33],
        3,
    );
    assert_eq!(chip8.state().i, 60);
    let chip8 = run(
        &[0x65, 0x0C, 0xF5, 0x29, 0x66, 0xD1, 0xA4, 0x00, 0xF6, 0x33],
        5,
    );
    assert_eq!(chip8.state().memory[0x400..0x403], [2, 0, 9]);
}

#[test]
fn unknown_opcode_reports_pc_and_word() {
    let mut chip8 = run(&[0x00, 0xE0, 0x5A, 0xB1], 1);
    assert_eq!(
        chip8.step(),
        Err(ExecutionError::UnknownOpcode {
            pc: 0x202,
            opcode: 0x5AB1
        })
    );
}

#[test]
fn timers_tick_once_per_frame() {
    // V0 = 3; DT = V0; ST = V0; then spin on JP 0x206
    let mut chip8 = Chip8::new(Config::default());
    chip8
        .load_rom(&[0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18, 0x12, 0x06])
        .unwrap();
    let frame = chip8.run_frame(10).unwrap();
    assert_eq!(frame.steps, 10);
    assert_eq!(chip8.state().delay_timer, 2);
    assert!(frame.tone);
    assert!(!chip8.run_frame(10).unwrap().tone_ended);
    let frame = chip8.run_frame(10).unwrap();
    assert!(frame.tone_ended);
    assert!(!frame.tone);
    assert_eq!(chip8.state().delay_timer, 0);
}

#[test]
fn assembled_program_runs() {
    let source = "
        start:  LD   V0, 3
        loop:   ADD  V1, 2
                ADD  V0, 255     ; V0 -= 1
                SE   V0, 0
                JP   loop
        done:   JP   done
    ";
    let rom = emu8::assemble(source).unwrap();
    let mut chip8 = Chip8::new(Config::headless(0));
    chip8.load_rom(&rom).unwrap();
    let frame = chip8.run_frame(100).unwrap();
    assert!(frame.self_jump);
    assert_eq!(chip8.state().v[0x1], 6);
    assert_eq!(chip8.pc(), 0x20A);
}
