//! Video output control through the SM712 sequencer.
//!
//! The LCD panel and the CRT connector are switched by two sequencer
//! registers, reached through the VGA index/data port pair.

use khal::PlatformIo;

// ── Sequencer ports and registers ─────────────────────────────────

pub(crate) const SEQ_INDEX: u16 = 0x3C4;
pub(crate) const SEQ_DATA: u16 = 0x3C5;

/// Panel control register.
pub(crate) const SR_LCD: u8 = 0x31;
/// CRT control register; bit 7 set means the DAC is powered down.
pub(crate) const SR_CRT: u8 = 0x21;

const LCD_ON: u8 = 0x03;
const LCD_OFF: u8 = 0x02;
const CRT_POWER_DOWN: u8 = 1 << 7;

/// A physical video output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Lcd,
    Crt,
}

/// Switch one output on or off with a read-modify-write of its
/// sequencer register.
pub fn set_output<P: PlatformIo>(io: &mut P, output: Output, on: bool) {
    let index = match output {
        Output::Lcd => SR_LCD,
        Output::Crt => SR_CRT,
    };

    io.outb(SEQ_INDEX, index);
    let mut value = io.inb(SEQ_DATA);

    match output {
        Output::Lcd => value |= if on { LCD_ON } else { LCD_OFF },
        Output::Crt if on => value &= !CRT_POWER_DOWN,
        Output::Crt => value |= CRT_POWER_DOWN,
    }

    io.outb(SEQ_INDEX, index);
    io.outb(SEQ_DATA, value);
}

/// Set both outputs, LCD first.
pub fn set_outputs<P: PlatformIo>(io: &mut P, lcd: bool, crt: bool) {
    set_output(io, Output::Lcd, lcd);
    set_output(io, Output::Crt, crt);
}

// ── Fn+F3 rotation ────────────────────────────────────────────────

/// Position in the Fn+F3 output rotation. The discriminant is the
/// 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VideoMode {
    BothOn = 1,
    CrtOnly = 2,
    BothOff = 3,
    LcdOnly = 4,
}

impl VideoMode {
    /// The mode after `current`. Before the first press there is no mode
    /// (LCD on, CRT off) and the rotation starts at [`VideoMode::BothOn`].
    pub fn advance(current: Option<Self>) -> Self {
        match current {
            None | Some(VideoMode::LcdOnly) => VideoMode::BothOn,
            Some(VideoMode::BothOn) => VideoMode::CrtOnly,
            Some(VideoMode::CrtOnly) => VideoMode::BothOff,
            Some(VideoMode::BothOff) => VideoMode::LcdOnly,
        }
    }

    /// `(lcd, crt)` power for this mode.
    pub const fn outputs(self) -> (bool, bool) {
        match self {
            VideoMode::BothOn => (true, true),
            VideoMode::CrtOnly => (false, true),
            VideoMode::BothOff => (false, false),
            VideoMode::LcdOnly => (true, false),
        }
    }

    #[inline]
    pub const fn position(self) -> i32 {
        self as i32
    }
}
