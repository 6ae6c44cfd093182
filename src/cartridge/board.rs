use log::warn;

use crate::cartridge::{MirroringMode, RomImage};

// Memory size constants
const BANK_GRANULE: usize = 0x400; // 1KB
const PRG_SLOTS: usize = 32; // $8000-$FFFF in 1KB granules
const CHR_SLOTS: usize = 8; // $0000-$1FFF in 1KB granules
const CHR_RAM_SIZE: usize = 8192; // 8KB
const NAMETABLE_RAM_SIZE: usize = 4096; // enough for four-screen boards

/// Backing memory and bank tables shared by every mapper.
///
/// Both bank tables hold absolute byte offsets in 1KB granules. Every offset
/// is reduced modulo the real backing length, so a bank number past the end
/// of an oddly sized ROM wraps instead of indexing out of bounds.
pub struct Board {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    prg_ram: Vec<u8>,
    prg_ram_enabled: bool,
    prg_ram_writable: bool,
    has_battery: bool,
    prg_map: [usize; PRG_SLOTS],
    chr_map: [usize; CHR_SLOTS],
    vram: [u8; NAMETABLE_RAM_SIZE],
    nt_map: [usize; 4],
    mirroring: MirroringMode,
}

impl Board {
    /// Build the board from a parsed image.
    ///
    /// PRG and CHR are padded to a whole number of 1KB granules; an empty CHR
    /// image becomes 8KB of CHR-RAM. The initial layout maps the first 32KB of
    /// PRG and the first 8KB of CHR.
    pub fn new(image: RomImage) -> Self {
        let RomImage {
            mut prg_rom,
            chr_rom,
            mirroring,
            has_battery,
            prg_ram_size,
            ..
        } = image;

        pad_to_granule(&mut prg_rom);
        let chr_writable = chr_rom.is_empty();
        let mut chr = if chr_writable {
            vec![0; CHR_RAM_SIZE]
        } else {
            chr_rom
        };
        pad_to_granule(&mut chr);

        let mut board = Self {
            prg_rom,
            chr,
            chr_writable,
            prg_ram: vec![0; prg_ram_size],
            prg_ram_enabled: true,
            prg_ram_writable: true,
            has_battery,
            prg_map: [0; PRG_SLOTS],
            chr_map: [0; CHR_SLOTS],
            vram: [0; NAMETABLE_RAM_SIZE],
            nt_map: [0; 4],
            mirroring,
        };
        board.map_prg_32k(0);
        board.map_chr_8k(0);
        board.set_mirroring(mirroring);
        board
    }

    /// Point `size_kb` consecutive PRG granules starting at window `slot`
    /// (counted in `size_kb` units from $8000) at bank `bank`
    fn map_prg(&mut self, size_kb: usize, slot: usize, bank: usize) {
        let len = self.prg_rom.len();
        for i in 0..size_kb {
            let entry = slot * size_kb + i;
            if entry < PRG_SLOTS {
                let granule = bank.wrapping_mul(size_kb).wrapping_add(i);
                self.prg_map[entry] = (granule % (len / BANK_GRANULE).max(1)) * BANK_GRANULE;
            }
        }
    }

    fn map_chr(&mut self, size_kb: usize, slot: usize, bank: usize) {
        let len = self.chr.len();
        for i in 0..size_kb {
            let entry = slot * size_kb + i;
            if entry < CHR_SLOTS {
                let granule = bank.wrapping_mul(size_kb).wrapping_add(i);
                self.chr_map[entry] = (granule % (len / BANK_GRANULE).max(1)) * BANK_GRANULE;
            }
        }
    }

    /// Map an 8KB PRG bank into $8000/$A000/$C000/$E000 (slot 0-3)
    pub fn map_prg_8k(&mut self, slot: usize, bank: usize) {
        self.map_prg(8, slot, bank);
    }

    /// Map a 16KB PRG bank into $8000 (slot 0) or $C000 (slot 1)
    pub fn map_prg_16k(&mut self, slot: usize, bank: usize) {
        self.map_prg(16, slot, bank);
    }

    pub fn map_prg_32k(&mut self, bank: usize) {
        self.map_prg(32, 0, bank);
    }

    pub fn map_chr_1k(&mut self, slot: usize, bank: usize) {
        self.map_chr(1, slot, bank);
    }

    pub fn map_chr_2k(&mut self, slot: usize, bank: usize) {
        self.map_chr(2, slot, bank);
    }

    pub fn map_chr_4k(&mut self, slot: usize, bank: usize) {
        self.map_chr(4, slot, bank);
    }

    pub fn map_chr_8k(&mut self, bank: usize) {
        self.map_chr(8, 0, bank);
    }

    /// Number of PRG banks of the given size (at least 1)
    pub fn prg_bank_count(&self, size_kb: usize) -> usize {
        (self.prg_rom.len() / (size_kb * BANK_GRANULE)).max(1)
    }

    pub fn chr_bank_count(&self, size_kb: usize) -> usize {
        (self.chr.len() / (size_kb * BANK_GRANULE)).max(1)
    }

    /// Index of the last PRG bank of the given size
    pub fn last_prg_bank(&self, size_kb: usize) -> usize {
        self.prg_bank_count(size_kb) - 1
    }

    pub fn prg_len(&self) -> usize {
        self.prg_rom.len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr.len()
    }

    pub fn prg_map(&self) -> &[usize; PRG_SLOTS] {
        &self.prg_map
    }

    pub fn chr_map(&self) -> &[usize; CHR_SLOTS] {
        &self.chr_map
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_writable
    }

    pub fn mirroring(&self) -> MirroringMode {
        self.mirroring
    }

    /// Select the nametable layout. Four-screen boards ignore runtime changes.
    pub fn set_mirroring(&mut self, mode: MirroringMode) {
        if self.mirroring == MirroringMode::FourScreen && mode != MirroringMode::FourScreen {
            warn!("Ignoring mirroring change to {:?} on a four-screen board", mode);
            return;
        }
        self.mirroring = mode;
        self.nt_map = match mode {
            MirroringMode::Horizontal => [0, 0, 1, 1],
            MirroringMode::Vertical => [0, 1, 0, 1],
            MirroringMode::SingleScreenLower => [0, 0, 0, 0],
            MirroringMode::SingleScreenUpper => [1, 1, 1, 1],
            MirroringMode::FourScreen => [0, 1, 2, 3],
        }
        .map(|table| table * BANK_GRANULE);
    }

    pub fn set_prg_ram_enabled(&mut self, enabled: bool) {
        self.prg_ram_enabled = enabled;
    }

    pub fn set_prg_ram_writable(&mut self, writable: bool) {
        self.prg_ram_writable = writable;
    }

    /// CPU read in cartridge space. Unmapped addresses float to `addr >> 8`.
    pub fn cart_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => {
                let offset = self.prg_map[((addr & 0x7FFF) >> 10) as usize] + (addr & 0x3FF) as usize;
                self.prg_rom.get(offset).copied().unwrap_or(0)
            }
            0x6000..=0x7FFF if self.prg_ram_enabled && !self.prg_ram.is_empty() => {
                let offset = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[offset]
            }
            _ => (addr >> 8) as u8,
        }
    }

    /// CPU write to the $6000-$7FFF work RAM window; other addresses are ignored
    pub fn write_prg_ram(&mut self, addr: u16, value: u8) {
        if (0x6000..=0x7FFF).contains(&addr)
            && self.prg_ram_enabled
            && self.prg_ram_writable
            && !self.prg_ram.is_empty()
        {
            let offset = (addr as usize - 0x6000) % self.prg_ram.len();
            self.prg_ram[offset] = value;
        }
    }

    /// PPU read from pattern tables ($0000-$1FFF) or nametables ($2000-$3EFF)
    pub fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            let offset = self.chr_map[(addr >> 10) as usize] + (addr & 0x3FF) as usize;
            self.chr.get(offset).copied().unwrap_or(0)
        } else {
            self.vram[self.nametable_offset(addr)]
        }
    }

    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            if self.chr_writable {
                let offset = self.chr_map[(addr >> 10) as usize] + (addr & 0x3FF) as usize;
                if let Some(cell) = self.chr.get_mut(offset) {
                    *cell = value;
                }
            }
        } else {
            let offset = self.nametable_offset(addr);
            self.vram[offset] = value;
        }
    }

    fn nametable_offset(&self, addr: u16) -> usize {
        let addr = (addr & 0x0FFF) as usize;
        self.nt_map[addr >> 10] + (addr & 0x3FF)
    }

    /// Battery-backed work RAM, if the cartridge keeps one
    pub fn battery_ram(&self) -> Option<&[u8]> {
        if self.has_battery && !self.prg_ram.is_empty() {
            Some(&self.prg_ram)
        } else {
            None
        }
    }

    /// Restore work RAM from a save; only the overlapping prefix is copied
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.prg_ram.len());
        if len != data.len() || len != self.prg_ram.len() {
            warn!(
                "Save size {} does not match PRG-RAM size {}",
                data.len(),
                self.prg_ram.len()
            );
        }
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }
}

fn pad_to_granule(data: &mut Vec<u8>) {
    let rem = data.len() % BANK_GRANULE;
    if rem != 0 || data.is_empty() {
        let target = data.len() + (BANK_GRANULE - rem);
        data.resize(target, 0);
    }
}
