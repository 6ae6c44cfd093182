/// The CPU's view of the system: memory plus the two interrupt inputs
///
/// Implemented by `MemController` for the console and by the flat `Memory`
/// used in tests.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);

    /// Read without register side effects, for traces and debuggers
    fn peek(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    /// Level of the NMI input. The CPU detects the rising edge itself.
    fn nmi_line(&self) -> bool {
        false
    }

    /// Level of the shared IRQ input, polled at instruction boundaries
    /// while interrupts are enabled
    fn irq_line(&mut self) -> bool {
        false
    }

    /// Cycles stolen from the CPU since the last call (OAM and DMC DMA)
    fn take_stall_cycles(&mut self) -> u32 {
        0
    }
}
