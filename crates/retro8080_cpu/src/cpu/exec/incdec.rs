use crate::cpu::operand::{Operand, RegPair};
use crate::cpu::Cpu8080;

impl Cpu8080 {
    /// INR r / INR M. Carry is not affected.
    pub(super) fn exec_inr(&mut self, dst: Operand) {
        let location = self.locate(dst);
        let value = self.load(location).wrapping_add(1);
        self.flags.set_zsp(value);
        self.store(location, value);
    }

    /// DCR r / DCR M. Carry is not affected.
    pub(super) fn exec_dcr(&mut self, dst: Operand) {
        let location = self.locate(dst);
        let value = self.load(location).wrapping_sub(1);
        self.flags.set_zsp(value);
        self.store(location, value);
    }

    pub(super) fn exec_inx(&mut self, rp: RegPair) {
        let value = self.pair(rp).wrapping_add(1);
        self.set_pair(rp, value);
    }

    pub(super) fn exec_dcx(&mut self, rp: RegPair) {
        let value = self.pair(rp).wrapping_sub(1);
        self.set_pair(rp, value);
    }

    /// DAD rp: HL += rp. Only Carry changes.
    pub(super) fn exec_dad(&mut self, rp: RegPair) {
        let sum = self.hl() as u32 + self.pair(rp) as u32;
        self.flags.cy = sum > 0xffff;
        self.set_hl(sum as u16);
    }
}
