use thiserror::Error;

/// Failures raised by the interpreter core.
///
/// None of these are expected operating conditions: each one points at a gap
/// in the opcode table, a disagreement between the two interpreters, or a
/// program image that does not fit in memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unimplemented opcode 0x{opcode:02x} at ${pc:04x} ({mnemonic})")]
    UnimplementedOpcode {
        pc: u16,
        opcode: u8,
        mnemonic: String,
    },

    #[error(
        "state divergence after opcode 0x{opcode:02x} at ${pc:04x}\n  primary:   {primary}\n  reference: {reference}"
    )]
    StateDivergence {
        pc: u16,
        opcode: u8,
        primary: String,
        reference: String,
    },

    #[error("image of {len} bytes at offset ${offset:04x} does not fit in 64 KiB")]
    ImageTooLarge { offset: usize, len: usize },
}
