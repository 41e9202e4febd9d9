pub mod flags;
pub mod operand;

mod exec;

use std::fmt;

use crate::disasm::disassemble_memory;
use crate::error::CpuError;
use crate::io::IoBus;
use crate::opcodes::{self, Opcode};
use crate::MEMORY_SIZE;
use flags::Flags;

/// Intel 8080 register file plus its 64 KiB memory store.
///
/// Register pairs (BC, DE, HL) are not stored; they are built from the 8-bit
/// registers on demand, high byte first.
///
/// Memory is a fixed 65,536-byte buffer indexed by `u16`, so every address
/// the CPU can form is in range. Address arithmetic (PC, SP, HL + 1, an
/// immediate address + 1) wraps modulo 65,536.
#[derive(Clone, PartialEq, Eq)]
pub struct Cpu8080 {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,
    pub interrupts_enabled: bool,
    memory: Box<[u8]>,
}

/// What a single call to [`Cpu8080::step`] executed.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    /// Address the opcode was fetched from.
    pub pc: u16,
    pub opcode: &'static Opcode,
}

impl Default for Cpu8080 {
    fn default() -> Self {
        Self {
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            flags: Flags::default(),
            interrupts_enabled: false,
            memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }
}

impl Cpu8080 {
    /// Create a new CPU with every register, flag and memory byte zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset registers and flags, preserving memory contents.
    pub fn reset(&mut self) {
        let memory = std::mem::take(&mut self.memory);
        *self = Self {
            memory,
            ..Self::default()
        };
    }

    /// Copy a program image into memory at `offset`.
    pub fn load_image(&mut self, offset: usize, image: &[u8]) -> Result<(), CpuError> {
        let end = offset
            .checked_add(image.len())
            .filter(|&end| end <= MEMORY_SIZE)
            .ok_or(CpuError::ImageTooLarge {
                offset,
                len: image.len(),
            })?;
        self.memory[offset..end].copy_from_slice(image);
        Ok(())
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    #[inline]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    #[inline]
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// Little-endian word at `addr`; the high byte wraps past 0xffff.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    fn fetch_byte(&mut self) -> u8 {
        let b = self.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    fn fetch_word(&mut self) -> u16 {
        let w = self.read_word(self.pc);
        self.pc = self.pc.wrapping_add(2);
        w
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    /// Push a word: high byte at SP-1, low byte at SP-2, then SP -= 2.
    fn push(&mut self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(self.sp.wrapping_sub(1), hi);
        self.write_byte(self.sp.wrapping_sub(2), lo);
        self.sp = self.sp.wrapping_sub(2);
    }

    fn pop(&mut self) -> u16 {
        let value = self.read_word(self.sp);
        self.sp = self.sp.wrapping_add(2);
        value
    }

    /// Execute a single instruction.
    ///
    /// Reads the opcode at PC, looks it up in the descriptor table and runs
    /// its handler. On return PC addresses the next instruction (or the
    /// branch target). A byte with no descriptor leaves the CPU untouched and
    /// reports [`CpuError::UnimplementedOpcode`].
    pub fn step<I: IoBus>(&mut self, io: &mut I) -> Result<Step, CpuError> {
        let pc = self.pc;
        let code = self.read_byte(pc);
        let Some(opcode) = opcodes::lookup(code) else {
            return Err(CpuError::UnimplementedOpcode {
                pc,
                opcode: code,
                mnemonic: disassemble_memory(&self.memory, pc).text,
            });
        };
        self.pc = pc.wrapping_add(1);
        self.execute(io, opcode.instr);
        Ok(Step { pc, opcode })
    }

    /// True when every register, flag, SP and PC match `other`.
    ///
    /// Memory and the interrupt-enable latch are not compared.
    pub fn same_registers(&self, other: &Cpu8080) -> bool {
        self.a == other.a
            && self.b == other.b
            && self.c == other.c
            && self.d == other.d
            && self.e == other.e
            && self.h == other.h
            && self.l == other.l
            && self.sp == other.sp
            && self.pc == other.pc
            && self.flags == other.flags
    }
}

impl fmt::Display for Cpu8080 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} A ${:02x} B ${:02x} C ${:02x} D ${:02x} E ${:02x} H ${:02x} L ${:02x} SP ${:04x} PC ${:04x}",
            self.flags.render(),
            self.a,
            self.b,
            self.c,
            self.d,
            self.e,
            self.h,
            self.l,
            self.sp,
            self.pc
        )
    }
}

impl fmt::Debug for Cpu8080 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu8080")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("c", &self.c)
            .field("d", &self.d)
            .field("e", &self.e)
            .field("h", &self.h)
            .field("l", &self.l)
            .field("sp", &self.sp)
            .field("pc", &self.pc)
            .field("flags", &self.flags)
            .field("interrupts_enabled", &self.interrupts_enabled)
            .finish_non_exhaustive()
    }
}
