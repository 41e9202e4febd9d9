use retro8080::{disassemble_image, run, RunConfig, StopReason};
use retro8080_cpu::{NullIo, TraceIo};

const ADD_PROGRAM: [u8; 6] = [0x3e, 0x05, 0x06, 0x03, 0x80, 0x76];

#[test]
fn add_program_halts_with_sum() {
    let config = RunConfig::builder().build();
    let summary = run(&config, &ADD_PROGRAM, &mut NullIo).unwrap();

    assert_eq!(summary.stop, StopReason::Halted);
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.cpu.a, 8);
    let f = summary.cpu.flags;
    assert!(!f.z && !f.s && !f.p && !f.cy);
}

#[test]
fn add_program_agrees_with_reference() {
    let config = RunConfig::builder().cross_check(true).build();
    let summary = run(&config, &ADD_PROGRAM, &mut NullIo).unwrap();
    assert_eq!(summary.cpu.a, 8);
}

#[test]
fn step_limit_bounds_a_tight_loop() {
    // loop: INR A; JMP loop
    let config = RunConfig::builder()
        .max_steps(Some(100))
        .cross_check(true)
        .build();
    let summary = run(&config, &[0x3c, 0xc3, 0x00, 0x00], &mut NullIo).unwrap();
    assert_eq!(summary.stop, StopReason::StepLimit);
    assert_eq!(summary.steps, 100);
    assert_eq!(summary.cpu.a, 50);
}

#[test]
fn halt_can_be_stepped_over() {
    // HLT; MVI A,1; HLT
    let config = RunConfig::builder()
        .stop_on_halt(false)
        .max_steps(Some(3))
        .build();
    let summary = run(&config, &[0x76, 0x3e, 0x01, 0x76], &mut NullIo).unwrap();
    assert_eq!(summary.cpu.a, 1);
    assert_eq!(summary.cpu.pc, 4);
}

#[test]
fn load_offset_and_start_pc() {
    // 0x0200: MVI A,7; OUT 3; HLT
    let config = RunConfig::builder()
        .load_offset(0x0200)
        .start_pc(Some(0x0200))
        .build();
    let mut io = TraceIo::new();
    let summary = run(&config, &[0x3e, 0x07, 0xd3, 0x03, 0x76], &mut io).unwrap();
    assert_eq!(summary.cpu.pc, 0x0205);
    assert_eq!(io.writes, vec![(3, 7)]);
}

#[test]
fn oversized_image_is_rejected() {
    let config = RunConfig::builder().load_offset(0xfff0).build();
    let err = run(&config, &[0u8; 0x20], &mut NullIo).unwrap_err();
    assert!(err.to_string().contains("does not fit"));
}

#[test]
fn missing_file_names_the_path() {
    let err = retro8080::load_image("no/such/program.com").unwrap_err();
    assert!(format!("{:#}", err).contains("no/such/program.com"));
}

#[test]
fn listing_covers_whole_image() {
    let lines = disassemble_image(&[0x21, 0x00, 0x20, 0x36, 0xff, 0xc3, 0x00], 0);
    assert_eq!(
        lines,
        ["0000 LXI    H,#$2000", "0003 MVI    M,#$ff", "0005 JMP    $??00"]
    );
}
