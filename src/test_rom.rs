//! Status protocol of blargg-style test ROMs
//!
//! These ROMs report through PRG-RAM: a status byte at $6000, the signature
//! `DE B0 61` at $6001-$6003 once the byte is valid, and a NUL-terminated
//! message from $6004.
//!
//! - $80: test still running
//! - $81: the ROM asks for a reset after at least 100 ms
//! - $00-$7F: finished, $00 meaning passed

use log::{debug, info};

use crate::nes::{FrameStatus, Nes};

pub const DEFAULT_STATUS_ADDR: u16 = 0x6000;

const SIGNATURE: [u8; 3] = [0xDE, 0xB0, 0x61];
const MAX_TEXT_LEN: u16 = 0x1000;
/// Frames to wait before honouring a reset request (about 100 ms)
const RESET_DELAY_FRAMES: u32 = 6;

const STATUS_RUNNING: u8 = 0x80;
const STATUS_NEEDS_RESET: u8 = 0x81;

/// What a test ROM currently reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRomStatus {
    Running,
    NeedsReset,
    /// Final result code; 0 is a pass
    Finished(u8),
}

/// How a run of a test ROM ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed { text: String },
    Failed { code: u8, text: String },
    /// The CPU executed a KIL opcode
    Halted,
    /// No final result within the frame limit
    Timeout,
}

impl TestOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestOutcome::Passed { .. })
    }
}

/// Read the status byte at `addr`, or `None` while the signature is absent
pub fn read_status(nes: &mut Nes, addr: u16) -> Option<TestRomStatus> {
    let signature = [
        nes.peek(addr.wrapping_add(1)),
        nes.peek(addr.wrapping_add(2)),
        nes.peek(addr.wrapping_add(3)),
    ];
    if signature != SIGNATURE {
        return None;
    }
    Some(match nes.peek(addr) {
        STATUS_RUNNING => TestRomStatus::Running,
        STATUS_NEEDS_RESET => TestRomStatus::NeedsReset,
        code => TestRomStatus::Finished(code),
    })
}

/// Read the message that follows the status block
pub fn read_text(nes: &mut Nes, addr: u16) -> String {
    let mut text = String::new();
    for offset in 4..MAX_TEXT_LEN {
        let byte = nes.peek(addr.wrapping_add(offset));
        if byte == 0 {
            break;
        }
        text.push(if byte == b'\n' || (0x20..0x7F).contains(&byte) {
            byte as char
        } else {
            '.'
        });
    }
    text
}

/// Runs a test ROM frame by frame until it reports a result
pub struct TestRomRunner {
    status_addr: u16,
    max_frames: u32,
}

impl TestRomRunner {
    pub fn new(status_addr: u16, max_frames: u32) -> Self {
        Self {
            status_addr,
            max_frames,
        }
    }

    pub fn run(&self, nes: &mut Nes) -> TestOutcome {
        let mut reset_countdown: Option<u32> = None;

        for frame in 1..=self.max_frames {
            if nes.run_frame() == FrameStatus::Halted {
                return TestOutcome::Halted;
            }

            match read_status(nes, self.status_addr) {
                Some(TestRomStatus::Finished(code)) => {
                    let text = read_text(nes, self.status_addr);
                    info!("Test ROM finished with code {:#04X} after {} frames", code, frame);
                    return if code == 0 {
                        TestOutcome::Passed { text }
                    } else {
                        TestOutcome::Failed { code, text }
                    };
                }
                Some(TestRomStatus::NeedsReset) if reset_countdown.is_none() => {
                    debug!("Test ROM requested a reset at frame {}", frame);
                    reset_countdown = Some(RESET_DELAY_FRAMES);
                }
                _ => {}
            }

            if let Some(remaining) = reset_countdown {
                if remaining == 0 {
                    nes.reset();
                    reset_countdown = None;
                } else {
                    reset_countdown = Some(remaining - 1);
                }
            }
        }
        TestOutcome::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cpu::CpuBus;

    /// NROM image whose program writes a finished status block and spins
    fn reporting_rom(code: u8, message: &[u8]) -> Vec<u8> {
        let mut program = Vec::new();
        let mut store = |addr: u16, value: u8| {
            // LDA #value ; STA addr
            program.extend_from_slice(&[0xA9, value, 0x8D, addr as u8, (addr >> 8) as u8]);
        };
        store(0x6000, STATUS_RUNNING);
        for (i, byte) in SIGNATURE.iter().enumerate() {
            store(0x6001 + i as u16, *byte);
        }
        for (i, byte) in message.iter().enumerate() {
            store(0x6004 + i as u16, *byte);
        }
        store(0x6004 + message.len() as u16, 0);
        store(0x6000, code);
        let spin = 0x8000 + program.len() as u16;
        program.extend_from_slice(&[0x4C, spin as u8, (spin >> 8) as u8]);

        let mut rom = vec![b'N', b'E', b'S', 0x1A, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut prg = vec![0xEA; 0x8000];
        prg[..program.len()].copy_from_slice(&program);
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        rom.extend_from_slice(&prg);
        rom.extend_from_slice(&[0; 0x2000]);
        rom
    }

    #[test]
    fn test_status_needs_signature() {
        let mut nes = Nes::new(Config::default(), &reporting_rom(0, b"")).unwrap();
        nes.bus_mut().write(0x6000, 0x00);
        assert_eq!(read_status(&mut nes, 0x6000), None);

        nes.bus_mut().write(0x6001, 0xDE);
        nes.bus_mut().write(0x6002, 0xB0);
        nes.bus_mut().write(0x6003, 0x61);
        assert_eq!(read_status(&mut nes, 0x6000), Some(TestRomStatus::Finished(0)));
        nes.bus_mut().write(0x6000, 0x80);
        assert_eq!(read_status(&mut nes, 0x6000), Some(TestRomStatus::Running));
        nes.bus_mut().write(0x6000, 0x81);
        assert_eq!(read_status(&mut nes, 0x6000), Some(TestRomStatus::NeedsReset));
    }

    #[test]
    fn test_text_stops_at_nul() {
        let mut nes = Nes::new(Config::default(), &reporting_rom(0, b"")).unwrap();
        for (i, byte) in b"ok\n\x01".iter().enumerate() {
            nes.bus_mut().write(0x6004 + i as u16, *byte);
        }
        assert_eq!(read_text(&mut nes, 0x6000), "ok\n.");
    }

    #[test]
    fn test_runner_reports_pass() {
        let mut nes = Nes::new(Config::default(), &reporting_rom(0, b"Passed")).unwrap();
        let outcome = TestRomRunner::new(DEFAULT_STATUS_ADDR, 10).run(&mut nes);
        assert_eq!(
            outcome,
            TestOutcome::Passed {
                text: "Passed".to_string()
            }
        );
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_runner_reports_failure_code() {
        let mut nes = Nes::new(Config::default(), &reporting_rom(3, b"#3")).unwrap();
        let outcome = TestRomRunner::new(DEFAULT_STATUS_ADDR, 10).run(&mut nes);
        assert_eq!(
            outcome,
            TestOutcome::Failed {
                code: 3,
                text: "#3".to_string()
            }
        );
    }

    #[test]
    fn test_runner_times_out_without_signature() {
        let mut rom = reporting_rom(0, b"");
        // Replace the program with a bare spin loop at $8000
        rom[16..19].copy_from_slice(&[0x4C, 0x00, 0x80]);
        let mut nes = Nes::new(Config::default(), &rom).unwrap();
        assert_eq!(
            TestRomRunner::new(DEFAULT_STATUS_ADDR, 3).run(&mut nes),
            TestOutcome::Timeout
        );
    }

    #[test]
    fn test_runner_stops_on_halt() {
        let mut rom = reporting_rom(0, b"");
        rom[16] = 0x02;
        let mut nes = Nes::new(Config::default(), &rom).unwrap();
        assert_eq!(
            TestRomRunner::new(DEFAULT_STATUS_ADDR, 3).run(&mut nes),
            TestOutcome::Halted
        );
    }
}
