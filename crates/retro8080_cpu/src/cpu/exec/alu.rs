use crate::cpu::Cpu8080;
use crate::opcodes::AluOp;

impl Cpu8080 {
    /// Accumulator ALU operation shared by the register, `M` and immediate
    /// forms.
    ///
    /// Arithmetic runs at 16-bit width so that Carry can be read off bit 8;
    /// Auxiliary-Carry is not computed here.
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.a as u16;
        let v = value as u16;
        let carry_in = self.flags.cy as u16;
        match op {
            AluOp::Add => self.a = self.arith(a + v),
            AluOp::Adc => self.a = self.arith(a + v + carry_in),
            AluOp::Sub => self.a = self.arith(a.wrapping_sub(v)),
            AluOp::Sbb => self.a = self.arith(a.wrapping_sub(v).wrapping_sub(carry_in)),
            AluOp::Ana => self.a = self.logic(self.a & value),
            AluOp::Xra => self.a = self.logic(self.a ^ value),
            AluOp::Ora => self.a = self.logic(self.a | value),
            // Flags as SUB would set them, A untouched.
            AluOp::Cmp => {
                self.arith(a.wrapping_sub(v));
            }
        }
    }

    fn arith(&mut self, wide: u16) -> u8 {
        self.flags.set_arith(wide);
        wide as u8
    }

    fn logic(&mut self, result: u8) -> u8 {
        self.flags.set_logic(result);
        result
    }

    pub(super) fn exec_rlc(&mut self) {
        self.flags.cy = (self.a & 0x80) != 0;
        self.a = self.a.rotate_left(1);
    }

    pub(super) fn exec_rrc(&mut self) {
        self.flags.cy = (self.a & 0x01) != 0;
        self.a = self.a.rotate_right(1);
    }

    pub(super) fn exec_ral(&mut self) {
        let carry = self.flags.cy as u8;
        self.flags.cy = (self.a & 0x80) != 0;
        self.a = (self.a << 1) | carry;
    }

    pub(super) fn exec_rar(&mut self) {
        let carry = (self.flags.cy as u8) << 7;
        self.flags.cy = (self.a & 0x01) != 0;
        self.a = (self.a >> 1) | carry;
    }

    /// Decimal adjust, driven by the stored Auxiliary-Carry flag.
    ///
    /// AC is only ever loaded by `POP PSW` (arithmetic does not compute it),
    /// so in practice the low-nibble correction keys off `low > 9`.
    pub(super) fn exec_daa(&mut self) {
        let low = self.a & 0x0f;
        let high = self.a >> 4;
        let mut adjust: u8 = 0;
        let mut carry = self.flags.cy;
        if low > 9 || self.flags.ac {
            adjust |= 0x06;
        }
        if high > 9 || self.flags.cy || (high >= 9 && low > 9) {
            adjust |= 0x60;
            carry = true;
        }
        self.a = self.a.wrapping_add(adjust);
        self.flags.set_zsp(self.a);
        self.flags.cy = carry;
    }
}
