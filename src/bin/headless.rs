//! Runs a ROM without video or audio.
//!
//! By default it plays `--frames` frames and reports the $6000 status block
//! that blargg test ROMs write. With `--trace` it prints one nestest-style
//! line per instruction instead.

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use cyclenes::config::Config;
use cyclenes::nes::{FrameStatus, Nes};
use cyclenes::test_rom::{self, DEFAULT_STATUS_ADDR, TestOutcome, TestRomRunner};

#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Run a NES ROM without a window", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Frames to run before giving up on a result
    #[arg(short, long, default_value_t = 1800)]
    frames: u32,

    /// Print a CPU trace line before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Stop tracing after this many instructions
    #[arg(long, default_value_t = 10_000)]
    max_instructions: u64,

    /// Address of the test ROM status byte
    #[arg(long, default_value = "0x6000", value_parser = parse_addr)]
    status_addr: u16,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_addr(text: &str) -> Result<u16, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {text:?}: {e}"))
}

fn trace(nes: &mut Nes, max_instructions: u64) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    // Finish the reset sequence so the first line is the first real instruction
    nes.step_instruction();
    for _ in 0..max_instructions {
        writeln!(out, "{}", nes.trace())?;
        if nes.step_instruction() == FrameStatus::Halted {
            writeln!(out, "CPU halted at ${:04X}", nes.cpu().pc)?;
            break;
        }
    }
    out.flush()
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let rom = fs::read(&args.rom)?;
    let mut nes = Nes::new(config, &rom)?;
    info!("Loaded {} ({:?})", args.rom.display(), nes.tv_system());

    if args.trace {
        trace(&mut nes, args.max_instructions)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = TestRomRunner::new(args.status_addr, args.frames).run(&mut nes);
    match &outcome {
        TestOutcome::Passed { text } => {
            println!("Passed");
            print_text(text);
        }
        TestOutcome::Failed { code, text } => {
            println!("Failed with code {code}");
            print_text(text);
        }
        TestOutcome::Halted => println!("CPU halted at ${:04X}", nes.cpu().pc),
        TestOutcome::Timeout => {
            println!("No result after {} frames", args.frames);
            let partial = test_rom::read_text(&mut nes, args.status_addr);
            print_text(&partial);
        }
    }

    Ok(if outcome.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_text(text: &str) {
    for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        println!("  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr_forms() {
        assert_eq!(parse_addr("0x6000"), Ok(0x6000));
        assert_eq!(parse_addr("$6000"), Ok(0x6000));
        assert_eq!(parse_addr("7f00"), Ok(0x7F00));
        assert!(parse_addr("0xZZ").is_err());
    }

    #[test]
    fn test_default_status_addr() {
        let args = Args::parse_from(["headless", "game.nes"]);
        assert_eq!(args.status_addr, DEFAULT_STATUS_ADDR);
        assert_eq!(args.frames, 1800);
        assert!(!args.trace);
    }
}
