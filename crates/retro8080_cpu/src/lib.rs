pub mod cpu;
pub mod disasm;
pub mod error;
pub mod io;
pub mod opcodes;
pub mod reference;

pub use cpu::flags::Flags;
pub use cpu::operand::{Condition, Location, Operand, RegPair, Register, StackPair};
pub use cpu::{Cpu8080, Step};
pub use disasm::{disassemble, disassemble_memory, listing, Disassembly};
pub use error::CpuError;
pub use io::{IoBus, NullIo, TraceIo};
pub use opcodes::{AddressingMode, AluOp, Instr, Opcode, OPCODES};

/// Total addressable memory size (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;
