/// Upper bits left on the data bus by a controller read
const OPEN_BUS_BITS: u8 = 0x40;

/// Standard controller button, numbered in shift-out order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];
}

/// Standard controller on $4016/$4017
///
/// While strobe is high the shift register keeps reloading, so reads return
/// A. After strobe falls, each read shifts out the next button; once all
/// eight are out the register reads back 1.
#[derive(Debug, Default, Clone)]
pub struct Joypad {
    strobe: bool,
    button_index: u8,
    button_states: u8, // Bitfield: [Right, Left, Down, Up, Start, Select, B, A]
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to the strobe bit ($4016 bit 0)
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 0x01 != 0;
        if self.strobe {
            self.button_index = 0;
        }
    }

    /// Read one bit, with the open-bus upper bits set
    pub fn read(&mut self) -> u8 {
        if self.button_index >= 8 {
            return OPEN_BUS_BITS | 1;
        }

        let bit = (self.button_states >> self.button_index) & 0x01;
        if !self.strobe {
            self.button_index += 1;
        }
        OPEN_BUS_BITS | bit
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = button as u8;
        if pressed {
            self.button_states |= 1 << bit;
        } else {
            self.button_states &= !(1 << bit);
        }
    }

    /// Replace every button at once, bit 0 = A
    pub fn set_buttons(&mut self, states: u8) {
        self.button_states = states;
    }

    pub fn buttons(&self) -> u8 {
        self.button_states
    }
}
