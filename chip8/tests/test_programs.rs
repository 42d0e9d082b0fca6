use chip8_core::prelude::*;

fn run(program: &[u8], steps: usize) -> Machine {
    let mut vm = Machine::new(MachineConf {
        seed: Some(1),
        ..Default::default()
    });
    vm.load_program(program).unwrap();
    vm.run_steps(steps).unwrap();
    vm
}

/// Render a region of the display as ASCII rows.
fn region(vm: &Machine, width: usize, height: usize) -> Vec<String> {
    let display = vm.display_snapshot();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| if display.pixel_at(x, y) { '#' } else { '.' })
                .collect()
        })
        .collect()
}

#[test]
#[rustfmt::skip]
fn test_golden_image() {
    // The sprite is the program's own bytes at 0x200.
    let vm = run(&[
        0xA2, 0x00, // LD I, 0x200
        0x60, 0x05, // LD v0, 5
        0xD0, 0x15, // DRW v0, v1, 5
    ], 3);

    assert_eq!(region(&vm, 16, 5), [
        ".....#.#...#....",
        "................",
        "......##........",
        "..........#.#...",
        ".....##.#.......",
    ]);
    assert_eq!(vm.display_snapshot().lit_count(), 10);
    assert_eq!(vm.registers()[0xF], 0);
    assert_eq!(vm.pc(), 0x206);
}

#[test]
#[rustfmt::skip]
fn test_subroutine_draws_font_glyph() {
    let vm = run(&[
        0x60, 0x0A, // LD v0, 0xA
        0x22, 0x08, // CALL 0x208
        0x12, 0x04, // JP 0x204
        0x00, 0x00,
        0xF0, 0x29, // LD F, v0
        0x61, 0x00, // LD v1, 0
        0xD1, 0x15, // DRW v1, v1, 5
        0x00, 0xEE, // RET
    ], 7);

    assert_eq!(region(&vm, 8, 5), [
        "####....",
        "#..#....",
        "####....",
        "#..#....",
        "#..#....",
    ]);
    assert_eq!(vm.pc(), 0x204);
    assert_eq!(vm.call_depth(), 0);
}

#[test]
#[rustfmt::skip]
fn test_delay_countdown_loop() {
    let vm = run(&[
        0x60, 0x05, // LD v0, 5
        0xF0, 0x15, // LD DT, v0
        0xF1, 0x07, // LD v1, DT
        0x31, 0x00, // SE v1, 0
        0x12, 0x04, // JP 0x204
        0x62, 0x01, // LD v2, 1
        0x12, 0x0C, // JP 0x20C
    ], 20);

    assert_eq!(vm.registers()[1], 0);
    assert_eq!(vm.registers()[2], 1);
    assert_eq!(vm.delay_timer(), 0);
    assert_eq!(vm.pc(), 0x20C);
}

#[test]
fn test_key_wait_driver_loop() {
    let mut vm = run(&[0xF5, 0x0A, 0x12, 0x02], 0);

    for _ in 0..3 {
        assert_eq!(vm.step(), Ok(Flow::KeyWait));
    }
    vm.key_down(0xC).unwrap();
    assert_eq!(vm.step(), Ok(Flow::Ok));
    assert_eq!(vm.registers()[5], 0xC);

    // releasing the key does not undo the result
    vm.key_up(0xC).unwrap();
    assert_eq!(vm.step(), Ok(Flow::Jump));
    assert_eq!(vm.registers()[5], 0xC);
}

#[test]
fn test_stack_underflow_halts() {
    let mut vm = Machine::default();
    vm.load_program(&[0x00, 0xEE]).unwrap();

    let err = vm.run_steps(10).unwrap_err();
    assert_eq!(err, Chip8Error::StackUnderflow { address: 0x200 });
    assert!(err.is_fatal());
    assert_eq!(vm.pc(), 0x200);
    assert_eq!(vm.step(), Err(err));
}
