use std::path::Path;

use anyhow::{Context, Result};
use typed_builder::TypedBuilder;

use retro8080_cpu::{reference, Cpu8080, CpuError, Instr, IoBus, NullIo, TraceIo};

pub mod cpm;

pub use cpm::CpmMachine;

/// What the command line asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// List the whole image as assembly.
    Disassemble,
    /// Execute the image at 0x0000.
    Run,
    /// Execute with the reference interpreter running in lock-step.
    Check,
    /// Execute a CP/M `.COM` program at 0x0100 with BDOS console output.
    Cpm,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "disasm" | "disassemble" => Some(Mode::Disassemble),
            "run" => Some(Mode::Run),
            "check" => Some(Mode::Check),
            "cpm" => Some(Mode::Cpm),
            _ => None,
        }
    }
}

pub const USAGE: &str =
    "Usage: retro8080 <disasm|run|check|cpm> <path> [max_steps] [--offset <addr>]";

/// Parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub mode: Mode,
    pub path: String,
    pub max_steps: Option<u64>,
    /// Load address for `run`/`check` and the first address of a listing.
    pub offset: u16,
}

/// Parse the arguments after the program name. The error is a message for
/// the user.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut offset = 0;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--offset" {
            let value = args.next().ok_or("--offset needs an address")?;
            offset = parse_address(&value)
                .ok_or_else(|| format!("Invalid offset '{}'", value))?;
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let (Some(mode), Some(path)) = (positional.next(), positional.next()) else {
        return Err("Missing mode or path".to_string());
    };
    let mode = Mode::from_name(&mode).ok_or_else(|| format!("Unknown mode '{}'", mode))?;
    let max_steps = positional
        .next()
        .map(|s| {
            s.parse::<u64>()
                .map_err(|err| format!("Invalid max_steps '{}': {}", s, err))
        })
        .transpose()?;
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument '{}'", extra));
    }

    Ok(CliArgs {
        mode,
        path,
        max_steps,
        offset,
    })
}

/// Hex address, with or without a `0x` or `$` prefix.
pub fn parse_address(s: &str) -> Option<u16> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).ok()
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    /// Where the image is copied in memory.
    #[builder(default = 0x0000)]
    pub load_offset: u16,
    /// Initial PC; the load offset when unset.
    #[builder(default)]
    pub start_pc: Option<u16>,
    /// Upper bound on executed instructions; unbounded when unset.
    #[builder(default)]
    pub max_steps: Option<u64>,
    #[builder(default = false)]
    pub cross_check: bool,
    #[builder(default = true)]
    pub stop_on_halt: bool,
    /// Emit one `trace!` line per instruction.
    #[builder(default = false)]
    pub trace: bool,
}

/// Something the run loop can drive: a port bus plus optional hooks around
/// each instruction.
pub trait Machine: IoBus {
    /// Prepare memory before the first instruction.
    fn attach(&mut self, _cpu: &mut Cpu8080) {}

    /// Called with the CPU about to execute the instruction at `cpu.pc`.
    fn before_step(&mut self, _cpu: &Cpu8080) {}

    /// True once the program has signalled that it is done.
    fn finished(&self) -> bool {
        false
    }
}

impl Machine for NullIo {}
impl Machine for TraceIo {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    StepLimit,
    Exited,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub steps: u64,
    pub stop: StopReason,
    pub cpu: Cpu8080,
}

pub fn load_image(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let image =
        std::fs::read(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    log::info!("Loaded '{}' ({} bytes)", path.display(), image.len());
    Ok(image)
}

/// Disassemble a whole image, one line per instruction, numbering addresses
/// from `base`.
pub fn disassemble_image(image: &[u8], base: u16) -> Vec<String> {
    retro8080_cpu::listing(image)
        .into_iter()
        .map(|mut d| {
            d.pc = d.pc.wrapping_add(base);
            d.to_string()
        })
        .collect()
}

/// Load `image` and step it until it halts, exits, hits the step limit or
/// faults.
pub fn run<M: Machine>(config: &RunConfig, image: &[u8], machine: &mut M) -> Result<RunSummary> {
    let mut cpu = Cpu8080::new();
    cpu.load_image(config.load_offset as usize, image)?;
    cpu.pc = config.start_pc.unwrap_or(config.load_offset);
    machine.attach(&mut cpu);
    log::info!(
        "Running {} bytes at ${:04x}, entry ${:04x}{}",
        image.len(),
        config.load_offset,
        cpu.pc,
        if config.cross_check {
            " (cross-checked)"
        } else {
            ""
        }
    );

    let mut reference = config.cross_check.then(|| cpu.clone());
    let mut steps: u64 = 0;

    let stop = loop {
        if machine.finished() {
            break StopReason::Exited;
        }
        if config.max_steps.is_some_and(|max| steps >= max) {
            break StopReason::StepLimit;
        }

        machine.before_step(&cpu);
        let pc = cpu.pc;
        if config.trace {
            log::trace!(
                "{:<20} {}",
                retro8080_cpu::disassemble_memory(cpu.memory(), pc).to_string(),
                cpu
            );
        }

        let mut tap = Tap::new(machine);
        let step = cpu.step(&mut tap).map_err(report)?;
        let input = tap.last_input;
        steps += 1;

        if let Some(reference_cpu) = reference.as_mut() {
            reference::step(reference_cpu, &mut Replay(input)).map_err(report)?;
            reference::compare(&cpu, reference_cpu, pc, step.opcode.code).map_err(report)?;
        }

        if config.stop_on_halt && step.opcode.instr == Instr::Hlt {
            break StopReason::Halted;
        }
    };

    log::info!("Stopped after {} steps ({:?}): {}", steps, stop, cpu);
    Ok(RunSummary { steps, stop, cpu })
}

fn report(err: CpuError) -> CpuError {
    log::error!("{}", err);
    err
}

/// Forwards to the machine and remembers the last byte read, so the
/// reference interpreter sees the same `IN` result without touching the
/// machine a second time.
struct Tap<'a, M> {
    inner: &'a mut M,
    last_input: u8,
}

impl<'a, M> Tap<'a, M> {
    fn new(inner: &'a mut M) -> Self {
        Self {
            inner,
            last_input: 0,
        }
    }
}

impl<M: IoBus> IoBus for Tap<'_, M> {
    fn input(&mut self, port: u8) -> u8 {
        self.last_input = self.inner.input(port);
        self.last_input
    }

    fn output(&mut self, port: u8, value: u8) {
        self.inner.output(port, value);
    }
}

struct Replay(u8);

impl IoBus for Replay {
    fn input(&mut self, _port: u8) -> u8 {
        self.0
    }

    fn output(&mut self, _port: u8, _value: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names() {
        assert_eq!(Mode::from_name("disasm"), Some(Mode::Disassemble));
        assert_eq!(Mode::from_name("check"), Some(Mode::Check));
        assert_eq!(Mode::from_name("cpm"), Some(Mode::Cpm));
        assert_eq!(Mode::from_name("gb"), None);
    }

    fn args(list: &[&str]) -> std::result::Result<CliArgs, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn cli_offset_is_optional_and_positionless() {
        let plain = args(&["run", "prog.bin"]).unwrap();
        assert_eq!(plain.offset, 0);
        assert_eq!(plain.max_steps, None);

        let parsed = args(&["run", "--offset", "0x0800", "invaders.g", "500"]).unwrap();
        assert_eq!(parsed.mode, Mode::Run);
        assert_eq!(parsed.path, "invaders.g");
        assert_eq!(parsed.max_steps, Some(500));
        assert_eq!(parsed.offset, 0x0800);
    }

    #[test]
    fn cli_rejects_bad_arguments() {
        assert!(args(&["run"]).is_err());
        assert!(args(&["boot", "prog.bin"]).is_err());
        assert!(args(&["run", "prog.bin", "many"]).is_err());
        assert!(args(&["run", "prog.bin", "--offset"]).is_err());
        assert!(args(&["run", "prog.bin", "--offset", "zz"]).is_err());
        assert!(args(&["run", "prog.bin", "1", "2"]).is_err());
    }

    #[test]
    fn addresses_parse_as_hex() {
        assert_eq!(parse_address("1800"), Some(0x1800));
        assert_eq!(parse_address("$1000"), Some(0x1000));
        assert_eq!(parse_address("0xffff"), Some(0xffff));
        assert_eq!(parse_address("10000"), None);
    }

    #[test]
    fn listing_numbers_from_base() {
        assert_eq!(
            disassemble_image(&[0x00, 0xc9], 0x0800),
            ["0800 NOP", "0801 RET"]
        );
    }

    #[test]
    fn config_defaults() {
        let config = RunConfig::builder().build();
        assert_eq!(config.load_offset, 0);
        assert_eq!(config.start_pc, None);
        assert_eq!(config.max_steps, None);
        assert!(!config.cross_check);
        assert!(config.stop_on_halt);
        assert!(!config.trace);
    }

    struct Port7(u8);

    impl IoBus for Port7 {
        fn input(&mut self, port: u8) -> u8 {
            if port == 7 {
                self.0
            } else {
                0
            }
        }

        fn output(&mut self, _port: u8, _value: u8) {}
    }

    impl Machine for Port7 {}

    #[test]
    fn cross_check_replays_input_to_reference() {
        // IN 7; HLT
        let config = RunConfig::builder().cross_check(true).build();
        let summary = run(&config, &[0xdb, 0x07, 0x76], &mut Port7(0x5a)).unwrap();
        assert_eq!(summary.cpu.a, 0x5a);
        assert_eq!(summary.stop, StopReason::Halted);
    }
}
