/// IO port interface for the 8080 `IN` and `OUT` instructions.
///
/// Memory lives inside [`Cpu8080`](crate::Cpu8080); the only thing the core
/// reaches outside for is this one-byte side channel, so a machine (or a test)
/// decides what a port means without the CPU knowing anything about it.
pub trait IoBus {
    fn input(&mut self, port: u8) -> u8;
    fn output(&mut self, port: u8, value: u8);
}

/// Port bus with nothing attached: reads return 0, writes are dropped.
#[derive(Default, Clone, Copy, Debug)]
pub struct NullIo;

impl IoBus for NullIo {
    fn input(&mut self, _port: u8) -> u8 {
        0
    }

    fn output(&mut self, _port: u8, _value: u8) {}
}

/// Port bus that logs every `OUT` and keeps a record of it.
#[derive(Default, Clone, Debug)]
pub struct TraceIo {
    /// `(port, value)` pairs in the order they were written.
    pub writes: Vec<(u8, u8)>,
}

impl TraceIo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IoBus for TraceIo {
    fn input(&mut self, port: u8) -> u8 {
        log::debug!("IN port 0x{:02x} -> 0x00", port);
        0
    }

    fn output(&mut self, port: u8, value: u8) {
        log::info!("OUT port 0x{:02x} <- 0x{:02x}", port, value);
        self.writes.push((port, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_io_records_writes_in_order() {
        let mut io = TraceIo::new();
        io.output(1, 0x41);
        io.output(0, 0xff);
        assert_eq!(io.writes, vec![(1, 0x41), (0, 0xff)]);
        assert_eq!(io.input(3), 0);
    }
}
