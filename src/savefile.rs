use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::nes::Nes;

/// Save file path for a ROM: the same name with a `.sav` extension
pub fn save_path<P: AsRef<Path>>(rom: P) -> PathBuf {
    rom.as_ref().with_extension("sav")
}

/// Dump battery RAM as raw bytes
pub fn write_battery_ram<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
    fs::write(path, data)
}

/// Read a raw battery RAM dump. A missing file is not an error.
pub fn read_battery_ram<P: AsRef<Path>>(path: P) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Restore the session's battery RAM from the save next to `rom`.
///
/// Returns whether anything was loaded. Cartridges without a battery are
/// left alone.
pub fn restore<P: AsRef<Path>>(nes: &mut Nes, rom: P) -> io::Result<bool> {
    if nes.battery_ram().is_none() {
        return Ok(false);
    }
    let path = save_path(rom);
    match read_battery_ram(&path)? {
        Some(data) => {
            info!("Loaded {} bytes of battery RAM from {}", data.len(), path.display());
            nes.load_battery_ram(&data);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Write the session's battery RAM next to `rom`, if it has any
pub fn persist<P: AsRef<Path>>(nes: &Nes, rom: P) -> io::Result<bool> {
    let Some(data) = nes.battery_ram() else {
        return Ok(false);
    };
    let path = save_path(rom);
    if let Err(e) = write_battery_ram(&path, data) {
        warn!("Failed to write {}: {}", path.display(), e);
        return Err(e);
    }
    info!("Saved battery RAM to {}", path.display());
    Ok(true)
}
