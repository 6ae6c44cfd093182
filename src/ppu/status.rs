const VBLANK: u8 = 0b1000_0000;
const SPRITE_0_HIT: u8 = 0b0100_0000;
const SPRITE_OVERFLOW: u8 = 0b0010_0000;

/// PPUSTATUS ($2002) flags
#[derive(Debug, Default)]
pub struct Status {
    vblank: bool,
    sprite_0_hit: bool,
    sprite_overflow: bool,
    /// Set by a $2002 read one dot before vblank starts; the flag (and NMI)
    /// are then skipped for that frame
    suppress_vblank: bool,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn enter_vblank(&mut self) {
        if !self.suppress_vblank {
            self.vblank = true;
        }
        self.suppress_vblank = false;
    }

    /// Pre-render line: clear VBlank, sprite 0 hit and overflow
    pub fn clear_for_prerender(&mut self) {
        self.vblank = false;
        self.sprite_0_hit = false;
        self.sprite_overflow = false;
    }

    pub fn suppress_next_vblank(&mut self) {
        self.suppress_vblank = true;
    }

    /// Read PPUSTATUS; returns the top three bits and clears VBlank
    pub fn read(&mut self) -> u8 {
        let mut status = 0;
        if self.vblank {
            status |= VBLANK;
        }
        if self.sprite_0_hit {
            status |= SPRITE_0_HIT;
        }
        if self.sprite_overflow {
            status |= SPRITE_OVERFLOW;
        }
        self.vblank = false;
        status
    }

    pub fn is_in_vblank(&self) -> bool {
        self.vblank
    }

    pub fn set_sprite_0_hit(&mut self) {
        self.sprite_0_hit = true;
    }

    pub fn sprite_0_hit(&self) -> bool {
        self.sprite_0_hit
    }

    pub fn set_sprite_overflow(&mut self) {
        self.sprite_overflow = true;
    }

    pub fn sprite_overflow(&self) -> bool {
        self.sprite_overflow
    }
}
