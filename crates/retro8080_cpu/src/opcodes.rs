//! Opcode descriptor table.
//!
//! Every one of the 256 opcode bytes is classified exactly once, when the
//! table is first touched, into an [`Opcode`] descriptor: the instruction kind
//! with its decoded register/pair/condition fields, the addressing mode and
//! the total byte length. The dispatcher and the disassembler both index this
//! table directly by opcode byte, so they can never disagree about what a byte
//! means or how long the instruction is.

use lazy_static::lazy_static;

use crate::cpu::operand::{Condition, Operand, RegPair, StackPair};

/// Accumulator ALU operation, selected by bits 3 to 5 of `10xxxsss` and
/// `11xxx110`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbb,
            4 => AluOp::Ana,
            5 => AluOp::Xra,
            6 => AluOp::Ora,
            _ => AluOp::Cmp,
        }
    }

    const fn register_mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbb => "SBB",
            AluOp::Ana => "ANA",
            AluOp::Xra => "XRA",
            AluOp::Ora => "ORA",
            AluOp::Cmp => "CMP",
        }
    }

    const fn immediate_mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADI",
            AluOp::Adc => "ACI",
            AluOp::Sub => "SUI",
            AluOp::Sbb => "SBI",
            AluOp::Ana => "ANI",
            AluOp::Xra => "XRI",
            AluOp::Ora => "ORI",
            AluOp::Cmp => "CPI",
        }
    }
}

/// Decoded instruction kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instr {
    // Data transfer
    Mov { dst: Operand, src: Operand },
    Mvi(Operand),
    Lxi(RegPair),
    Lda,
    Sta,
    Lhld,
    Shld,
    Ldax(RegPair),
    Stax(RegPair),
    Xchg,

    // Arithmetic and logical
    Alu(AluOp, Operand),
    AluImm(AluOp),
    Inr(Operand),
    Dcr(Operand),
    Inx(RegPair),
    Dcx(RegPair),
    Dad(RegPair),
    Daa,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Stc,
    Cmc,

    // Branch
    Jmp,
    Jcc(Condition),
    Call,
    Ccc(Condition),
    Ret,
    Rcc(Condition),
    Rst(u8),
    Pchl,

    // Stack, IO and machine control
    Push(StackPair),
    Pop(StackPair),
    Xthl,
    Sphl,
    In,
    Out,
    Ei,
    Di,
    Hlt,
    Nop,
}

/// How an instruction locates its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand, or the operand is implied by the opcode (e.g. `RLC`, `XCHG`).
    Implied,
    /// Register operand(s) only.
    Register,
    /// Memory at HL (`M`) or at another register pair (`LDAX`/`STAX`).
    RegisterIndirect,
    /// One immediate data byte (also the port number of `IN`/`OUT`).
    Immediate,
    /// Two immediate data bytes, little-endian (`LXI`).
    ImmediateWord,
    /// Two-byte little-endian address (`LDA`, `JMP`, `CALL`, ...).
    Direct,
}

/// Descriptor for one opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub code: u8,
    pub instr: Instr,
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    /// Total instruction length in bytes, opcode included.
    pub len: u8,
}

lazy_static! {
    /// All 256 opcodes, indexed by opcode byte.
    ///
    /// An entry is `None` only if [`decode`] has no classification for that
    /// byte; the dispatcher reports such bytes as unimplemented.
    pub static ref OPCODES: [Option<Opcode>; 256] = std::array::from_fn(|i| decode(i as u8));
}

/// Look up the descriptor for `code`.
#[inline]
pub fn lookup(code: u8) -> Option<&'static Opcode> {
    OPCODES[code as usize].as_ref()
}

fn condition_mnemonic(prefix: char, cc: Condition) -> &'static str {
    const J: [&str; 8] = ["JNZ", "JZ", "JNC", "JC", "JPO", "JPE", "JP", "JM"];
    const C: [&str; 8] = ["CNZ", "CZ", "CNC", "CC", "CPO", "CPE", "CP", "CM"];
    const R: [&str; 8] = ["RNZ", "RZ", "RNC", "RC", "RPO", "RPE", "RP", "RM"];
    let index = cc as usize;
    match prefix {
        'J' => J[index],
        'C' => C[index],
        _ => R[index],
    }
}

fn operand_mode(operand: Operand) -> AddressingMode {
    match operand {
        Operand::M => AddressingMode::RegisterIndirect,
        Operand::Reg(_) => AddressingMode::Register,
    }
}

/// Classify one opcode byte.
///
/// Bit-pattern groups are matched first (MOV block, ALU block, then the
/// `00xxx1xx` / `11xxx0xx` column patterns), followed by the singletons. Each
/// byte hits exactly one arm.
pub fn decode(code: u8) -> Option<Opcode> {
    use AddressingMode::*;

    let ddd = (code >> 3) & 0x07;
    let sss = code & 0x07;
    let rp = (code >> 4) & 0x03;

    let (instr, mnemonic, mode, len) = match code {
        // HLT sits where MOV M,M would be.
        0x76 => (Instr::Hlt, "HLT", Implied, 1),
        0x40..=0x7f => {
            let dst = Operand::from_bits(ddd);
            let src = Operand::from_bits(sss);
            let mode = if dst == Operand::M || src == Operand::M {
                RegisterIndirect
            } else {
                Register
            };
            (Instr::Mov { dst, src }, "MOV", mode, 1)
        }
        0x80..=0xbf => {
            let op = AluOp::from_bits(ddd);
            let src = Operand::from_bits(sss);
            (Instr::Alu(op, src), op.register_mnemonic(), operand_mode(src), 1)
        }
        _ if code & 0xc7 == 0xc6 => {
            let op = AluOp::from_bits(ddd);
            (Instr::AluImm(op), op.immediate_mnemonic(), Immediate, 2)
        }
        _ if code & 0xc7 == 0x06 => (Instr::Mvi(Operand::from_bits(ddd)), "MVI", Immediate, 2),
        _ if code & 0xc7 == 0x04 => {
            let dst = Operand::from_bits(ddd);
            (Instr::Inr(dst), "INR", operand_mode(dst), 1)
        }
        _ if code & 0xc7 == 0x05 => {
            let dst = Operand::from_bits(ddd);
            (Instr::Dcr(dst), "DCR", operand_mode(dst), 1)
        }
        _ if code & 0xcf == 0x01 => (Instr::Lxi(RegPair::from_bits(rp)), "LXI", ImmediateWord, 3),
        _ if code & 0xcf == 0x03 => (Instr::Inx(RegPair::from_bits(rp)), "INX", Register, 1),
        _ if code & 0xcf == 0x0b => (Instr::Dcx(RegPair::from_bits(rp)), "DCX", Register, 1),
        _ if code & 0xcf == 0x09 => (Instr::Dad(RegPair::from_bits(rp)), "DAD", Register, 1),
        0x02 | 0x12 => (Instr::Stax(RegPair::from_bits(rp)), "STAX", RegisterIndirect, 1),
        0x0a | 0x1a => (Instr::Ldax(RegPair::from_bits(rp)), "LDAX", RegisterIndirect, 1),
        0x22 => (Instr::Shld, "SHLD", Direct, 3),
        0x2a => (Instr::Lhld, "LHLD", Direct, 3),
        0x32 => (Instr::Sta, "STA", Direct, 3),
        0x3a => (Instr::Lda, "LDA", Direct, 3),
        0x07 => (Instr::Rlc, "RLC", Implied, 1),
        0x0f => (Instr::Rrc, "RRC", Implied, 1),
        0x17 => (Instr::Ral, "RAL", Implied, 1),
        0x1f => (Instr::Rar, "RAR", Implied, 1),
        0x27 => (Instr::Daa, "DAA", Implied, 1),
        0x2f => (Instr::Cma, "CMA", Implied, 1),
        0x37 => (Instr::Stc, "STC", Implied, 1),
        0x3f => (Instr::Cmc, "CMC", Implied, 1),
        // NOP and the unassigned bytes, all one-byte no-ops.
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 | 0xcb | 0xd9 | 0xdd | 0xed
        | 0xfd => (Instr::Nop, "NOP", Implied, 1),
        _ if code & 0xc7 == 0xc0 => {
            let cc = Condition::from_bits(ddd);
            (Instr::Rcc(cc), condition_mnemonic('R', cc), Implied, 1)
        }
        _ if code & 0xc7 == 0xc2 => {
            let cc = Condition::from_bits(ddd);
            (Instr::Jcc(cc), condition_mnemonic('J', cc), Direct, 3)
        }
        _ if code & 0xc7 == 0xc4 => {
            let cc = Condition::from_bits(ddd);
            (Instr::Ccc(cc), condition_mnemonic('C', cc), Direct, 3)
        }
        _ if code & 0xc7 == 0xc7 => (Instr::Rst(ddd), "RST", Implied, 1),
        _ if code & 0xcf == 0xc1 => (Instr::Pop(StackPair::from_bits(rp)), "POP", Register, 1),
        _ if code & 0xcf == 0xc5 => (Instr::Push(StackPair::from_bits(rp)), "PUSH", Register, 1),
        0xc3 => (Instr::Jmp, "JMP", Direct, 3),
        0xc9 => (Instr::Ret, "RET", Implied, 1),
        0xcd => (Instr::Call, "CALL", Direct, 3),
        0xd3 => (Instr::Out, "OUT", Immediate, 2),
        0xdb => (Instr::In, "IN", Immediate, 2),
        0xe3 => (Instr::Xthl, "XTHL", Implied, 1),
        0xe9 => (Instr::Pchl, "PCHL", Implied, 1),
        0xeb => (Instr::Xchg, "XCHG", Implied, 1),
        0xf3 => (Instr::Di, "DI", Implied, 1),
        0xf9 => (Instr::Sphl, "SPHL", Implied, 1),
        0xfb => (Instr::Ei, "EI", Implied, 1),
        _ => return None,
    };

    Some(Opcode {
        code,
        instr,
        mnemonic,
        mode,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::operand::Register;

    #[test]
    fn every_opcode_byte_is_classified() {
        let missing: Vec<u8> = (0..=255u8).filter(|&b| lookup(b).is_none()).collect();
        assert!(missing.is_empty(), "unclassified opcodes: {:02x?}", missing);
    }

    #[test]
    fn table_is_indexed_by_opcode() {
        for b in 0..=255u8 {
            assert_eq!(OPCODES[b as usize].map(|o| o.code), Some(b));
        }
    }

    #[test]
    fn lengths_match_operand_bytes() {
        for op in OPCODES.iter().flatten() {
            let expected = match op.mode {
                AddressingMode::Immediate => 2,
                AddressingMode::ImmediateWord | AddressingMode::Direct => 3,
                _ => 1,
            };
            assert_eq!(op.len, expected, "{} (0x{:02x})", op.mnemonic, op.code);
        }
    }

    #[test]
    fn mov_block_decodes_selectors() {
        let op = lookup(0x78).unwrap();
        assert_eq!(
            op.instr,
            Instr::Mov {
                dst: Operand::Reg(Register::A),
                src: Operand::Reg(Register::B)
            }
        );
        let op = lookup(0x77).unwrap();
        assert_eq!(op.mode, AddressingMode::RegisterIndirect);
        assert_eq!(lookup(0x76).unwrap().instr, Instr::Hlt);
    }

    #[test]
    fn branch_group_decodes_conditions() {
        assert_eq!(lookup(0xc2).unwrap().instr, Instr::Jcc(Condition::NotZero));
        assert_eq!(lookup(0xfa).unwrap().mnemonic, "JM");
        assert_eq!(lookup(0xe4).unwrap().mnemonic, "CPO");
        assert_eq!(lookup(0xe8).unwrap().instr, Instr::Rcc(Condition::ParityEven));
        assert_eq!(lookup(0xef).unwrap().instr, Instr::Rst(5));
    }

    #[test]
    fn push_pop_three_is_psw() {
        assert_eq!(lookup(0xf5).unwrap().instr, Instr::Push(StackPair::Psw));
        assert_eq!(lookup(0xf1).unwrap().instr, Instr::Pop(StackPair::Psw));
        assert_eq!(lookup(0x31).unwrap().instr, Instr::Lxi(RegPair::SP));
    }

    #[test]
    fn unassigned_bytes_are_one_byte_nops() {
        for b in [
            0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xcb, 0xd9, 0xdd, 0xed, 0xfd,
        ] {
            let op = lookup(b).unwrap();
            assert_eq!(op.instr, Instr::Nop, "0x{:02x}", b);
            assert_eq!(op.len, 1);
            assert_eq!(op.mnemonic, "NOP");
        }
    }
}
