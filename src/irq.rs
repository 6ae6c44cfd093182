/// Hardware units that can pull the CPU's /IRQ line low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqSource {
    FrameCounter,
    Dmc,
    Mapper,
}

impl IrqSource {
    pub const ALL: [IrqSource; 3] = [
        IrqSource::FrameCounter,
        IrqSource::Dmc,
        IrqSource::Mapper,
    ];

    fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// The shared, level-triggered IRQ line.
///
/// Each source owns one bit. Asserting an already asserted source or
/// releasing one that was never asserted is a no-op, so an acknowledge path
/// can never strand or mask another source's request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqLine {
    sources: u8,
}

impl IrqLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the line low on behalf of `source`
    pub fn assert(&mut self, source: IrqSource) {
        self.sources |= source.mask();
    }

    /// Release `source`'s hold on the line
    pub fn deassert(&mut self, source: IrqSource) {
        self.sources &= !source.mask();
    }

    /// Mirror a unit's internal IRQ flag onto the line
    pub fn set(&mut self, source: IrqSource, level: bool) {
        if level {
            self.assert(source);
        } else {
            self.deassert(source);
        }
    }

    /// True while any source holds the line
    pub fn is_asserted(&self) -> bool {
        self.sources != 0
    }

    pub fn is_asserted_by(&self, source: IrqSource) -> bool {
        self.sources & source.mask() != 0
    }

    /// Number of sources currently asserting
    pub fn level(&self) -> u32 {
        self.sources.count_ones()
    }

    pub fn clear(&mut self) {
        self.sources = 0;
    }
}
