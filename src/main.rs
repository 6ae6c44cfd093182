use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use cyclenes::audio::SdlAudio;
use cyclenes::config::Config;
use cyclenes::eventloop::EventLoop;
use cyclenes::nes::{Nes, TvSystem};
use cyclenes::savefile;

#[derive(Parser, Debug)]
#[command(name = "cyclenes")]
#[command(about = "A cycle-stepped NES emulator", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Force PAL timing
    #[arg(long, conflicts_with = "dendy")]
    pal: bool,

    /// Force Dendy timing
    #[arg(long)]
    dendy: bool,

    /// Window scale factor
    #[arg(short, long, default_value_t = 3.0)]
    scale: f32,

    /// Emulation speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if args.pal {
        config.tv_system = Some(TvSystem::Pal);
    } else if args.dendy {
        config.tv_system = Some(TvSystem::Dendy);
    }

    let rom = fs::read(&args.rom)?;
    let mut nes = Nes::new(config, &rom)?;
    info!("Loaded {} ({:?})", args.rom.display(), nes.tv_system());
    if let Err(e) = savefile::restore(&mut nes, &args.rom) {
        warn!("Could not read save file: {}", e);
    }

    let sdl_context = sdl2::init()?;
    let audio = SdlAudio::new(
        &sdl_context,
        nes.config().sample_rate,
        nes.tv_system().frames_per_second() * args.speed,
    )?;
    nes.set_audio_output(Box::new(audio));

    let mut event_loop = EventLoop::new(sdl_context, args.scale, args.speed)?;
    event_loop.run(&mut nes)?;

    savefile::persist(&nes, &args.rom)?;
    Ok(())
}
