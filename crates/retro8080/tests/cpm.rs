use std::path::PathBuf;

use retro8080::{run, CpmMachine, StopReason};

fn hello_program() -> Vec<u8> {
    let mut program = vec![
        0x0e, 0x09, // MVI C,9
        0x11, 0x12, 0x01, // LXI D,msg
        0xcd, 0x05, 0x00, // CALL BDOS
        0x0e, 0x02, // MVI C,2
        0x1e, b'!', // MVI E,'!'
        0xcd, 0x05, 0x00, // CALL BDOS
        0xc3, 0x00, 0x00, // JMP 0
    ];
    program.extend_from_slice(b"HELLO$");
    program
}

#[test]
fn bdos_console_output() {
    let mut machine = CpmMachine::new();
    let config = CpmMachine::config(Some(1_000), true);
    let summary = run(&config, &hello_program(), &mut machine).unwrap();

    assert_eq!(summary.stop, StopReason::Exited);
    assert_eq!(machine.console(), "HELLO!");
}

/// Run a diagnostic until it jumps back to the warm-boot vector.
///
/// Auxiliary carry is never computed, so the BCD checks in these programs
/// may print failures; what is checked here is that the program runs to its
/// exit without faulting or getting stuck.
fn run_diagnostic(name: &str, max_steps: u64) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../assets/roms/8080_tests");
    path.push(name);
    if !path.exists() {
        eprintln!("skipping {}: {} not found", name, path.display());
        return;
    }

    let image = retro8080::load_image(&path).unwrap();
    let mut machine = CpmMachine::new();
    let config = CpmMachine::config(Some(max_steps), false);
    let summary = run(&config, &image, &mut machine).unwrap();
    eprintln!("{}: {} steps\n{}", name, summary.steps, machine.console());
    assert_eq!(
        summary.stop,
        StopReason::Exited,
        "{} did not finish within {} steps",
        name,
        max_steps
    );
}

// These need the diagnostic ROMs and take a while; run them explicitly with
// `cargo test -p retro8080 -- --ignored`.

#[test]
#[ignore]
fn tst8080() {
    run_diagnostic("TST8080.COM", 10_000_000);
}

#[test]
#[ignore]
fn pre8080() {
    run_diagnostic("8080PRE.COM", 10_000_000);
}

#[test]
#[ignore]
fn cputest() {
    run_diagnostic("CPUTEST.COM", 200_000_000);
}
