use crate::cpu::operand::StackPair;
use crate::cpu::Cpu8080;

impl Cpu8080 {
    pub(super) fn exec_push(&mut self, pair: StackPair) {
        let value = self.stack_pair(pair);
        self.push(value);
    }

    pub(super) fn exec_pop(&mut self, pair: StackPair) {
        let value = self.pop();
        self.set_stack_pair(pair, value);
    }

    /// Exchange HL with the word at the top of the stack. SP is unchanged.
    pub(super) fn exec_xthl(&mut self) {
        let top = self.read_word(self.sp);
        self.write_word(self.sp, self.hl());
        self.set_hl(top);
    }
}
