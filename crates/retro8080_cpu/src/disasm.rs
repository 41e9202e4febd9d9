//! Text disassembly of 8080 machine code.
//!
//! Classification comes straight from [`OPCODES`](crate::opcodes::OPCODES),
//! so the mnemonic and length reported here are the ones the dispatcher acts
//! on. Nothing in this module mutates CPU state.

use std::fmt;

use crate::opcodes::{lookup, Instr};
use crate::MEMORY_SIZE;

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub pc: u16,
    pub opcode: u8,
    /// Bytes consumed; shorter than the instruction length only when the
    /// input ends in the middle of an instruction.
    pub len: usize,
    /// Mnemonic and operands, e.g. `MVI    A,#$05`.
    pub text: String,
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x} {}", self.pc, self.text)
    }
}

/// Decode the instruction at `pc` of a program image.
///
/// Operand bytes past the end of `image` are rendered as `??`.
pub fn disassemble(image: &[u8], pc: u16) -> Disassembly {
    decode_at(pc, |i| image.get(pc as usize + i).copied())
}

/// Decode the instruction at `pc` of a CPU memory store, where operand
/// bytes wrap past the top of memory the way the fetch path does.
pub fn disassemble_memory(memory: &[u8], pc: u16) -> Disassembly {
    decode_at(pc, |i| {
        if memory.is_empty() {
            None
        } else {
            memory.get((pc as usize + i) % memory.len()).copied()
        }
    })
}

fn decode_at(pc: u16, byte_at: impl Fn(usize) -> Option<u8>) -> Disassembly {
    let opcode = byte_at(0).unwrap_or(0);
    let Some(op) = lookup(opcode) else {
        return Disassembly {
            pc,
            opcode,
            len: 1,
            text: format!("{:<7}${:02x}", "DB", opcode),
        };
    };

    let d8 = || format!("#${}", hex(byte_at(1)));
    let a16 = || format!("${}{}", hex(byte_at(2)), hex(byte_at(1)));

    let operands = match op.instr {
        Instr::Mov { dst, src } => format!("{},{}", dst.name(), src.name()),
        Instr::Mvi(dst) => format!("{},{}", dst.name(), d8()),
        Instr::Lxi(rp) => format!("{},#{}", rp.name(), a16()),
        Instr::Lda
        | Instr::Sta
        | Instr::Lhld
        | Instr::Shld
        | Instr::Jmp
        | Instr::Jcc(_)
        | Instr::Call
        | Instr::Ccc(_) => a16(),
        Instr::Ldax(rp) | Instr::Stax(rp) => rp.name().to_string(),
        Instr::Inx(rp) | Instr::Dcx(rp) | Instr::Dad(rp) => rp.name().to_string(),
        Instr::Alu(_, src) => src.name().to_string(),
        Instr::Inr(dst) | Instr::Dcr(dst) => dst.name().to_string(),
        Instr::AluImm(_) | Instr::In | Instr::Out => d8(),
        Instr::Rst(n) => n.to_string(),
        Instr::Push(pair) | Instr::Pop(pair) => pair.name().to_string(),
        _ => String::new(),
    };

    let available = (0..op.len as usize)
        .take_while(|&i| byte_at(i).is_some())
        .count();

    Disassembly {
        pc,
        opcode,
        len: available.max(1),
        text: if operands.is_empty() {
            op.mnemonic.to_string()
        } else {
            format!("{:<7}{}", op.mnemonic, operands)
        },
    }
}

/// Walk a whole program image from offset 0 until its end.
pub fn listing(image: &[u8]) -> Vec<Disassembly> {
    let mut out = Vec::new();
    let mut pc = 0usize;
    while pc < image.len() && pc < MEMORY_SIZE {
        let d = disassemble(image, pc as u16);
        pc += lookup(d.opcode).map_or(1, |op| op.len as usize);
        out.push(d);
    }
    out
}

fn hex(byte: Option<u8>) -> String {
    match byte {
        Some(b) => format!("{:02x}", b),
        None => "??".to_string(),
    }
}
