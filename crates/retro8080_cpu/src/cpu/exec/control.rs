use crate::cpu::operand::Condition;
use crate::cpu::Cpu8080;

impl Cpu8080 {
    pub(super) fn exec_jmp(&mut self) {
        self.pc = self.fetch_word();
    }

    /// The address bytes are always consumed, so a false condition leaves PC
    /// on the next instruction.
    pub(super) fn exec_jcc(&mut self, cc: Condition) {
        let addr = self.fetch_word();
        if self.condition(cc) {
            self.pc = addr;
        }
    }

    pub(super) fn exec_call(&mut self) {
        let addr = self.fetch_word();
        self.push(self.pc);
        self.pc = addr;
    }

    pub(super) fn exec_ccc(&mut self, cc: Condition) {
        let addr = self.fetch_word();
        if self.condition(cc) {
            self.push(self.pc);
            self.pc = addr;
        }
    }

    pub(super) fn exec_ret(&mut self) {
        self.pc = self.pop();
    }

    pub(super) fn exec_rcc(&mut self, cc: Condition) {
        if self.condition(cc) {
            self.pc = self.pop();
        }
    }

    /// RST n: call to 8 * n.
    pub(super) fn exec_rst(&mut self, n: u8) {
        self.push(self.pc);
        self.pc = u16::from(n & 0x07) << 3;
    }
}
