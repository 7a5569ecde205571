//! SCI event numbers reported by the KB3310B.
//!
//! Event numbers are consecutive starting at [`EVENT_START`]. Anything
//! the EC returns outside `[EVENT_START, EVENT_END]` is noise (seen while
//! the firmware is switching states) and is dropped without comment.

/// A pending EC event, identified by the number the query returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    /// Lid opened or closed.
    Lid = 0x23,
    /// Fn+F3, cycle LCD/CRT outputs.
    SwitchVideoMode,
    /// Fn+F1.
    Sleep,
    /// Over-temperature.
    Overtemp,
    /// A CRT was plugged in or removed.
    CrtDetect,
    /// Fn+ESC, camera on/off.
    Camera,
    /// USB port 2 over-current.
    UsbOc2,
    /// USB port 0 over-current.
    UsbOc0,
    /// Fn+F2, LCD backlight on/off.
    DisplayToggle,
    /// Fn+F4.
    AudioMute,
    /// Fn+Up / Fn+Down.
    DisplayBrightness,
    /// AC plugged/unplugged or battery state changed.
    AcBat,
    /// Fn+Left / Fn+Right.
    AudioVolume,
    /// Fn+F5.
    Wlan,
}

/// First valid event number.
pub const EVENT_START: u8 = Event::Lid as u8;

/// Last event number accepted by the range check.
///
/// This is the firmware's end marker, one past [`Event::Wlan`]. It passes
/// the range check but carries no binding.
pub const EVENT_END: u8 = Event::Wlan as u8 + 1;

impl Event {
    /// Every event, in event-number order.
    pub const ALL: [Event; 14] = [
        Event::Lid,
        Event::SwitchVideoMode,
        Event::Sleep,
        Event::Overtemp,
        Event::CrtDetect,
        Event::Camera,
        Event::UsbOc2,
        Event::UsbOc0,
        Event::DisplayToggle,
        Event::AudioMute,
        Event::DisplayBrightness,
        Event::AcBat,
        Event::AudioVolume,
        Event::Wlan,
    ];

    /// Decode an event number. Returns `None` for the end marker and for
    /// anything out of range.
    pub fn from_code(code: u8) -> Option<Self> {
        let index = code.checked_sub(EVENT_START)? as usize;
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Returns `true` if `code` lies in the inclusive range the SCI handler
/// accepts.
#[inline]
pub const fn in_range(code: u8) -> bool {
    code >= EVENT_START && code <= EVENT_END
}
