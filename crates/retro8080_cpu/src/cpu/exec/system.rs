use crate::cpu::Cpu8080;
use crate::io::IoBus;

impl Cpu8080 {
    pub(super) fn exec_in<I: IoBus>(&mut self, io: &mut I) {
        let port = self.fetch_byte();
        self.a = io.input(port);
    }

    pub(super) fn exec_out<I: IoBus>(&mut self, io: &mut I) {
        let port = self.fetch_byte();
        io.output(port, self.a);
    }

    /// EI / DI only toggle the latch; no interrupt controller is modeled.
    pub(super) fn exec_interrupt_enable(&mut self, enabled: bool) {
        log::debug!(
            "{} at ${:04x}",
            if enabled { "EI" } else { "DI" },
            self.pc.wrapping_sub(1)
        );
        self.interrupts_enabled = enabled;
    }
}
