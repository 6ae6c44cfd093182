use crate::cpu::CpuBus;

/// Flat 64KB address space with settable interrupt lines
///
/// Runs the CPU without a console around it. Accesses can be logged to check
/// dummy reads and write order.
pub struct Memory {
    data: Vec<u8>,
    nmi: bool,
    irq: bool,
    logging: bool,
    reads: Vec<u16>,
    writes: Vec<(u16, u8)>,
    /// Writing this address steals CPU cycles, like $4014
    stall_trigger: Option<(u16, u32)>,
    stall_cycles: u32,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: vec![0; 0x10000],
            nmi: false,
            irq: false,
            logging: false,
            reads: Vec::new(),
            writes: Vec::new(),
            stall_trigger: None,
            stall_cycles: 0,
        }
    }

    /// Copy `bytes` in starting at `addr`, wrapping at $FFFF
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.data[addr.wrapping_add(i as u16) as usize] = *byte;
        }
    }

    pub fn set_nmi(&mut self, level: bool) {
        self.nmi = level;
    }

    pub fn set_irq(&mut self, level: bool) {
        self.irq = level;
    }

    pub fn start_logging(&mut self) {
        self.logging = true;
        self.reads.clear();
        self.writes.clear();
    }

    pub fn take_reads(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.reads)
    }

    pub fn take_writes(&mut self) -> Vec<(u16, u8)> {
        std::mem::take(&mut self.writes)
    }

    pub fn stall_on_write(&mut self, addr: u16, cycles: u32) {
        self.stall_trigger = Some((addr, cycles));
    }
}

impl CpuBus for Memory {
    fn read(&mut self, addr: u16) -> u8 {
        if self.logging {
            self.reads.push(addr);
        }
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        if self.logging {
            self.writes.push((addr, value));
        }
        if let Some((trigger, cycles)) = self.stall_trigger
            && trigger == addr
        {
            self.stall_cycles += cycles;
        }
        self.data[addr as usize] = value;
    }

    fn peek(&mut self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn nmi_line(&self) -> bool {
        self.nmi
    }

    fn irq_line(&mut self) -> bool {
        self.irq
    }

    fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall_cycles)
    }
}
