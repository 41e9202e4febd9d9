use crate::cpu::operand::{Operand, RegPair};
use crate::cpu::Cpu8080;

impl Cpu8080 {
    pub(super) fn exec_mov(&mut self, dst: Operand, src: Operand) {
        let value = self.read_operand(src);
        self.write_operand(dst, value);
    }

    pub(super) fn exec_mvi(&mut self, dst: Operand) {
        let value = self.fetch_byte();
        self.write_operand(dst, value);
    }

    pub(super) fn exec_lxi(&mut self, rp: RegPair) {
        let value = self.fetch_word();
        self.set_pair(rp, value);
    }

    pub(super) fn exec_lda(&mut self) {
        let addr = self.fetch_word();
        self.a = self.read_byte(addr);
    }

    pub(super) fn exec_sta(&mut self) {
        let addr = self.fetch_word();
        self.write_byte(addr, self.a);
    }

    /// LHLD: L from (addr), H from (addr + 1).
    pub(super) fn exec_lhld(&mut self) {
        let addr = self.fetch_word();
        let value = self.read_word(addr);
        self.set_hl(value);
    }

    pub(super) fn exec_shld(&mut self) {
        let addr = self.fetch_word();
        self.write_word(addr, self.hl());
    }

    pub(super) fn exec_ldax(&mut self, rp: RegPair) {
        let addr = self.pair(rp);
        self.a = self.read_byte(addr);
    }

    pub(super) fn exec_stax(&mut self, rp: RegPair) {
        let addr = self.pair(rp);
        self.write_byte(addr, self.a);
    }

    pub(super) fn exec_xchg(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }
}
