mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::Cpu8080;
use crate::io::IoBus;
use crate::opcodes::Instr;

impl Cpu8080 {
    /// Run the handler for an already-fetched instruction.
    ///
    /// PC has been advanced past the opcode byte; handlers consume their own
    /// immediate or address bytes.
    pub(super) fn execute<I: IoBus>(&mut self, io: &mut I, instr: Instr) {
        match instr {
            Instr::Mov { dst, src } => self.exec_mov(dst, src),
            Instr::Mvi(dst) => self.exec_mvi(dst),
            Instr::Lxi(rp) => self.exec_lxi(rp),
            Instr::Lda => self.exec_lda(),
            Instr::Sta => self.exec_sta(),
            Instr::Lhld => self.exec_lhld(),
            Instr::Shld => self.exec_shld(),
            Instr::Ldax(rp) => self.exec_ldax(rp),
            Instr::Stax(rp) => self.exec_stax(rp),
            Instr::Xchg => self.exec_xchg(),

            Instr::Alu(op, src) => {
                let value = self.read_operand(src);
                self.alu(op, value);
            }
            Instr::AluImm(op) => {
                let value = self.fetch_byte();
                self.alu(op, value);
            }
            Instr::Inr(dst) => self.exec_inr(dst),
            Instr::Dcr(dst) => self.exec_dcr(dst),
            Instr::Inx(rp) => self.exec_inx(rp),
            Instr::Dcx(rp) => self.exec_dcx(rp),
            Instr::Dad(rp) => self.exec_dad(rp),
            Instr::Daa => self.exec_daa(),
            Instr::Rlc => self.exec_rlc(),
            Instr::Rrc => self.exec_rrc(),
            Instr::Ral => self.exec_ral(),
            Instr::Rar => self.exec_rar(),
            Instr::Cma => self.a = !self.a,
            Instr::Stc => self.flags.cy = true,
            Instr::Cmc => self.flags.cy = !self.flags.cy,

            Instr::Jmp => self.exec_jmp(),
            Instr::Jcc(cc) => self.exec_jcc(cc),
            Instr::Call => self.exec_call(),
            Instr::Ccc(cc) => self.exec_ccc(cc),
            Instr::Ret => self.exec_ret(),
            Instr::Rcc(cc) => self.exec_rcc(cc),
            Instr::Rst(n) => self.exec_rst(n),
            Instr::Pchl => self.pc = self.hl(),

            Instr::Push(pair) => self.exec_push(pair),
            Instr::Pop(pair) => self.exec_pop(pair),
            Instr::Xthl => self.exec_xthl(),
            Instr::Sphl => self.sp = self.hl(),
            Instr::In => self.exec_in(io),
            Instr::Out => self.exec_out(io),
            Instr::Ei => self.exec_interrupt_enable(true),
            Instr::Di => self.exec_interrupt_enable(false),
            Instr::Hlt | Instr::Nop => {}
        }
    }
}
