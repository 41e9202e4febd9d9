use super::flags::Flags;
use super::Cpu8080;

/// A named 8-bit register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// The 3-bit register-or-memory selector found in most 8080 opcodes.
///
/// Encoding order is fixed by the instruction set: 0..=7 map to
/// B, C, D, E, H, L, memory at HL, A.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(Register),
    /// The byte addressed by the HL pair.
    M,
}

impl Operand {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Operand::Reg(Register::B),
            1 => Operand::Reg(Register::C),
            2 => Operand::Reg(Register::D),
            3 => Operand::Reg(Register::E),
            4 => Operand::Reg(Register::H),
            5 => Operand::Reg(Register::L),
            6 => Operand::M,
            _ => Operand::Reg(Register::A),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Operand::Reg(Register::A) => "A",
            Operand::Reg(Register::B) => "B",
            Operand::Reg(Register::C) => "C",
            Operand::Reg(Register::D) => "D",
            Operand::Reg(Register::E) => "E",
            Operand::Reg(Register::H) => "H",
            Operand::Reg(Register::L) => "L",
            Operand::M => "M",
        }
    }
}

/// Where an operand lives once HL has been read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Register(Register),
    Memory(u16),
}

/// 2-bit register-pair selector for `LXI`, `INX`, `DCX`, `DAD`, `LDAX`, `STAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegPair {
    BC,
    DE,
    HL,
    SP,
}

impl RegPair {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => RegPair::BC,
            1 => RegPair::DE,
            2 => RegPair::HL,
            _ => RegPair::SP,
        }
    }

    /// Assembler spelling: `B`, `D`, `H`, `SP`.
    pub const fn name(self) -> &'static str {
        match self {
            RegPair::BC => "B",
            RegPair::DE => "D",
            RegPair::HL => "H",
            RegPair::SP => "SP",
        }
    }
}

/// 2-bit register-pair selector for `PUSH`/`POP`, where 3 means A + flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPair {
    BC,
    DE,
    HL,
    Psw,
}

impl StackPair {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => StackPair::BC,
            1 => StackPair::DE,
            2 => StackPair::HL,
            _ => StackPair::Psw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StackPair::BC => "B",
            StackPair::DE => "D",
            StackPair::HL => "H",
            StackPair::Psw => "PSW",
        }
    }
}

/// 3-bit condition field of `Jcc`, `Ccc` and `Rcc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }

    /// Mnemonic suffix (`NZ`, `Z`, `NC`, `C`, `PO`, `PE`, `P`, `M`).
    pub const fn suffix(self) -> &'static str {
        match self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        }
    }
}

impl Cpu8080 {
    pub fn locate(&self, operand: Operand) -> Location {
        match operand {
            Operand::Reg(r) => Location::Register(r),
            Operand::M => Location::Memory(self.hl()),
        }
    }

    pub fn load(&self, location: Location) -> u8 {
        match location {
            Location::Register(r) => self.reg(r),
            Location::Memory(addr) => self.read_byte(addr),
        }
    }

    pub fn store(&mut self, location: Location, value: u8) {
        match location {
            Location::Register(r) => *self.reg_mut(r) = value,
            Location::Memory(addr) => self.write_byte(addr, value),
        }
    }

    pub fn read_operand(&self, operand: Operand) -> u8 {
        self.load(self.locate(operand))
    }

    pub fn write_operand(&mut self, operand: Operand, value: u8) {
        let location = self.locate(operand);
        self.store(location, value);
    }

    pub fn reg(&self, r: Register) -> u8 {
        match r {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    fn reg_mut(&mut self, r: Register) -> &mut u8 {
        match r {
            Register::A => &mut self.a,
            Register::B => &mut self.b,
            Register::C => &mut self.c,
            Register::D => &mut self.d,
            Register::E => &mut self.e,
            Register::H => &mut self.h,
            Register::L => &mut self.l,
        }
    }

    pub fn pair(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::BC => self.bc(),
            RegPair::DE => self.de(),
            RegPair::HL => self.hl(),
            RegPair::SP => self.sp,
        }
    }

    pub fn set_pair(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::BC => self.set_bc(value),
            RegPair::DE => self.set_de(value),
            RegPair::HL => self.set_hl(value),
            RegPair::SP => self.sp = value,
        }
    }

    /// Value pushed by `PUSH`; PSW packs A as the high byte, flags low.
    pub fn stack_pair(&self, sp: StackPair) -> u16 {
        match sp {
            StackPair::BC => self.bc(),
            StackPair::DE => self.de(),
            StackPair::HL => self.hl(),
            StackPair::Psw => u16::from_be_bytes([self.a, self.flags.to_psw()]),
        }
    }

    pub fn set_stack_pair(&mut self, sp: StackPair, value: u16) {
        match sp {
            StackPair::BC => self.set_bc(value),
            StackPair::DE => self.set_de(value),
            StackPair::HL => self.set_hl(value),
            StackPair::Psw => {
                let [a, f] = value.to_be_bytes();
                self.a = a;
                self.flags = Flags::from_psw(f);
            }
        }
    }

    pub fn condition(&self, cc: Condition) -> bool {
        match cc {
            Condition::NotZero => !self.flags.z,
            Condition::Zero => self.flags.z,
            Condition::NoCarry => !self.flags.cy,
            Condition::Carry => self.flags.cy,
            Condition::ParityOdd => !self.flags.p,
            Condition::ParityEven => self.flags.p,
            Condition::Plus => !self.flags.s,
            Condition::Minus => self.flags.s,
        }
    }
}
