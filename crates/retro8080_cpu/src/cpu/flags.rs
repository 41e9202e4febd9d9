use bitflags::bitflags;

bitflags! {
    /// Single-byte layout used when the flags travel through the stack with
    /// `PUSH PSW` / `POP PSW`.
    ///
    /// Bits 5 to 7 are never set on push and are ignored on pop.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Psw: u8 {
        const ZERO = 0x01;
        const SIGN = 0x02;
        const PARITY = 0x04;
        const CARRY = 0x08;
        const AUX_CARRY = 0x10;
    }
}

/// CPU flags for Intel 8080.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flags {
    pub z: bool,  // zero
    pub s: bool,  // sign
    pub p: bool,  // parity (set when even)
    pub cy: bool, // carry
    pub ac: bool, // auxiliary carry
}

impl Flags {
    pub fn to_psw(self) -> u8 {
        let mut psw = Psw::empty();
        psw.set(Psw::ZERO, self.z);
        psw.set(Psw::SIGN, self.s);
        psw.set(Psw::PARITY, self.p);
        psw.set(Psw::CARRY, self.cy);
        psw.set(Psw::AUX_CARRY, self.ac);
        psw.bits()
    }

    pub fn from_psw(v: u8) -> Self {
        let psw = Psw::from_bits_truncate(v);
        Self {
            z: psw.contains(Psw::ZERO),
            s: psw.contains(Psw::SIGN),
            p: psw.contains(Psw::PARITY),
            cy: psw.contains(Psw::CARRY),
            ac: psw.contains(Psw::AUX_CARRY),
        }
    }

    /// Zero, Sign and Parity from the low byte of a result.
    ///
    /// Carry and Auxiliary-Carry are left alone, which is exactly what
    /// `INR`/`DCR` need.
    pub fn set_zsp(&mut self, value: u8) {
        self.z = zero(value);
        self.s = sign(value);
        self.p = parity(value);
    }

    /// Flags for an 8-bit add/subtract computed at 16-bit width.
    ///
    /// Subtractions are done with `wrapping_sub` on `u16`, so an underflow
    /// lands above 0xff just like an add overflow does.
    pub fn set_arith(&mut self, wide: u16) {
        self.set_zsp(wide as u8);
        self.cy = carry(wide);
    }

    /// Flags for AND/XOR/OR: Z/S/P from the result, CY and AC cleared.
    pub fn set_logic(&mut self, value: u8) {
        self.set_zsp(value);
        self.cy = false;
        self.ac = false;
    }

    /// Compact `zspca` rendering, `.` for a clear flag.
    pub fn render(&self) -> String {
        let pick = |set: bool, c: char| if set { c } else { '.' };
        [
            pick(self.z, 'z'),
            pick(self.s, 's'),
            pick(self.p, 'p'),
            pick(self.cy, 'c'),
            pick(self.ac, 'a'),
        ]
        .iter()
        .collect()
    }
}

#[inline]
pub fn zero(value: u8) -> bool {
    value == 0
}

#[inline]
pub fn sign(value: u8) -> bool {
    (value & 0x80) != 0
}

/// Even parity: true when `value` has an even number of set bits.
#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

#[inline]
pub fn carry(wide: u16) -> bool {
    wide > 0xff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_is_even_parity() {
        assert!(parity(0x00));
        assert!(parity(0x0f));
        assert!(parity(0x03));
        assert!(!parity(0x01));
        assert!(!parity(0x08));
        assert!(!parity(0x07));
    }

    #[test]
    fn arith_flags_detect_overflow_and_underflow() {
        let mut f = Flags::default();
        f.set_arith(0xff + 0x01);
        assert!(f.z && !f.s && f.p && f.cy);

        f.set_arith(0x00u16.wrapping_sub(0x01));
        assert!(!f.z && f.s && f.p && f.cy);

        f.set_arith(0x05 + 0x03);
        assert!(!f.z && !f.s && !f.p && !f.cy);
    }

    #[test]
    fn set_zsp_leaves_carry_and_aux_carry() {
        let mut f = Flags {
            cy: true,
            ac: true,
            ..Flags::default()
        };
        f.set_zsp(0);
        assert!(f.z && f.cy && f.ac);
    }

    #[test]
    fn psw_layout_matches_stack_format() {
        let f = Flags {
            z: true,
            s: false,
            p: true,
            cy: true,
            ac: false,
        };
        assert_eq!(f.to_psw(), 0b0000_1101);
        assert_eq!(Flags::from_psw(0b0000_1101), f);
        // Unused high bits are dropped.
        assert_eq!(Flags::from_psw(0xe0), Flags::default());
    }

    #[test]
    fn render_marks_clear_flags_with_dots() {
        let f = Flags {
            z: true,
            cy: true,
            ..Flags::default()
        };
        assert_eq!(f.render(), "z..c.");
    }
}
