//! Just enough CP/M to run the classic 8080 diagnostic `.COM` programs.
//!
//! The program is loaded at the TPA base and two stubs are patched into low
//! memory: `OUT 0,A` at the warm-boot vector (a `JMP 0` ends the run) and
//! `OUT 1,A; RET` at the BDOS entry. When PC reaches the BDOS entry the
//! requested console function is serviced from the register file before the
//! stub itself executes.

use retro8080_cpu::{Cpu8080, IoBus};

use crate::{Machine, RunConfig};

/// Where CP/M loads transient programs.
pub const TPA_BASE: u16 = 0x0100;
pub const BDOS_ENTRY: u16 = 0x0005;

const EXIT_PORT: u8 = 0;
const BDOS_PORT: u8 = 1;

/// BDOS function 2: print the character in E.
const C_WRITE: u8 = 2;
/// BDOS function 9: print the `$`-terminated string at DE.
const C_WRITESTR: u8 = 9;

#[derive(Default, Clone, Debug)]
pub struct CpmMachine {
    console: String,
    finished: bool,
}

impl CpmMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the program printed through BDOS so far.
    pub fn console(&self) -> &str {
        &self.console
    }

    /// Run configuration for a `.COM` image: load and start at the TPA base.
    pub fn config(max_steps: Option<u64>, cross_check: bool) -> RunConfig {
        RunConfig::builder()
            .load_offset(TPA_BASE)
            .max_steps(max_steps)
            .cross_check(cross_check)
            .stop_on_halt(false)
            .build()
    }

    fn bdos(&mut self, cpu: &Cpu8080) {
        match cpu.c {
            C_WRITE => self.console.push(cpu.e as char),
            C_WRITESTR => {
                let mut addr = cpu.de();
                for _ in 0..u16::MAX {
                    let ch = cpu.read_byte(addr);
                    if ch == b'$' {
                        break;
                    }
                    self.console.push(ch as char);
                    addr = addr.wrapping_add(1);
                }
            }
            other => log::debug!("BDOS function {} ignored", other),
        }
    }
}

impl IoBus for CpmMachine {
    fn input(&mut self, _port: u8) -> u8 {
        0
    }

    fn output(&mut self, port: u8, _value: u8) {
        match port {
            EXIT_PORT => self.finished = true,
            // Already serviced in `before_step`.
            BDOS_PORT => {}
            _ => log::debug!("OUT to unmapped port 0x{:02x}", port),
        }
    }
}

impl Machine for CpmMachine {
    fn attach(&mut self, cpu: &mut Cpu8080) {
        // OUT 0,A
        cpu.write_byte(0x0000, 0xd3);
        cpu.write_byte(0x0001, EXIT_PORT);
        // OUT 1,A; RET
        cpu.write_byte(BDOS_ENTRY, 0xd3);
        cpu.write_byte(BDOS_ENTRY + 1, BDOS_PORT);
        cpu.write_byte(BDOS_ENTRY + 2, 0xc9);
    }

    fn before_step(&mut self, cpu: &Cpu8080) {
        if cpu.pc == BDOS_ENTRY {
            self.bdos(cpu);
        }
    }

    fn finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_patches_exit_and_bdos_stubs() {
        let mut cpu = Cpu8080::new();
        CpmMachine::new().attach(&mut cpu);
        assert_eq!(&cpu.memory()[..8], &[0xd3, 0x00, 0, 0, 0, 0xd3, 0x01, 0xc9]);
    }

    #[test]
    fn bdos_prints_character_and_string() {
        let mut cpu = Cpu8080::new();
        cpu.load_image(0x0200, b"OK$ignored").unwrap();
        let mut machine = CpmMachine::new();

        cpu.c = C_WRITE;
        cpu.e = b'>';
        machine.bdos(&cpu);

        cpu.c = C_WRITESTR;
        cpu.set_de(0x0200);
        machine.bdos(&cpu);

        assert_eq!(machine.console(), ">OK");
    }

    #[test]
    fn out_zero_finishes() {
        let mut machine = CpmMachine::new();
        machine.output(BDOS_PORT, 0);
        assert!(!machine.finished());
        machine.output(EXIT_PORT, 0);
        assert!(machine.finished());
    }
}
