//! Embedded controller boundary.
//!
//! The byte-level KB3310B protocol (index ports, query/ack timing) lives
//! outside this crate. The driver only needs named register reads and
//! writes, the SCI query handshake, and the firmware version string.

use core::fmt;

// ── Register map ────────────────────────────────────────────────

/// Address of an EC register in the KB3310B XRAM window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcRegister(pub u16);

impl EcRegister {
    // Hotkey / event sources
    pub const LID_DETECT: Self = Self(0xF4BD);
    pub const CRT_DETECT: Self = Self(0xF4AD);
    pub const CAMERA_STATUS: Self = Self(0xF46A);
    pub const CAMERA_CONTROL: Self = Self(0xF7B7);
    pub const USB0_FLAG: Self = Self(0xF461);
    pub const USB1_FLAG: Self = Self(0xF462);
    pub const USB2_FLAG: Self = Self(0xF463);
    pub const DISPLAY_LCD: Self = Self(0xF79F);
    pub const DISPLAY_BRIGHTNESS: Self = Self(0xF4F5);
    pub const AUDIO_MUTE: Self = Self(0xF4E7);
    pub const AUDIO_VOLUME: Self = Self(0xF46C);
    pub const WLAN: Self = Self(0xF4FA);

    // Power supply
    pub const BAT_POWER: Self = Self(0xF440);
    pub const BAT_STATUS: Self = Self(0xF4B0);
    pub const BAT_CHARGE: Self = Self(0xF4A2);
    pub const BAT_CHARGE_STATUS: Self = Self(0xF4B1);
    pub const BAT_VENDOR: Self = Self(0xF4C4);
    pub const BAT_DESIGN_CAP_HIGH: Self = Self(0xF77D);
    pub const BAT_DESIGN_CAP_LOW: Self = Self(0xF77C);
    pub const BAT_FULLCHG_CAP_HIGH: Self = Self(0xF780);
    pub const BAT_FULLCHG_CAP_LOW: Self = Self(0xF77F);
    pub const BAT_DESIGN_VOL_HIGH: Self = Self(0xF782);
    pub const BAT_DESIGN_VOL_LOW: Self = Self(0xF781);
    pub const BAT_CURRENT_HIGH: Self = Self(0xF784);
    pub const BAT_CURRENT_LOW: Self = Self(0xF783);
    pub const BAT_VOLTAGE_HIGH: Self = Self(0xF786);
    pub const BAT_VOLTAGE_LOW: Self = Self(0xF785);
    pub const BAT_TEMPERATURE_HIGH: Self = Self(0xF788);
    pub const BAT_TEMPERATURE_LOW: Self = Self(0xF787);
    pub const BAT_RELATIVE_CAP_HIGH: Self = Self(0xF492);
    pub const BAT_RELATIVE_CAP_LOW: Self = Self(0xF491);

    // Fan and temperature
    pub const FAN_CONTROL: Self = Self(0xF4D2);
    pub const FAN_AUTO_MAN_SWITCH: Self = Self(0xF459);
    pub const FAN_SPEED_LEVEL: Self = Self(0xF4CC);
    pub const FAN_SPEED_HIGH: Self = Self(0xFE22);
    pub const FAN_SPEED_LOW: Self = Self(0xFE23);
    pub const TEMPERATURE_VALUE: Self = Self(0xF458);
}

/// Value written to [`EcRegister::WLAN`] to power the radio.
pub const WLAN_ON: u8 = 1;
pub const WLAN_OFF: u8 = 0;

// ── Firmware version ────────────────────────────────────────────

/// Only this many bytes of the version strings take part in comparisons.
pub const EC_VERSION_CMP_LEN: usize = 64;

/// From this firmware on the EC blanks the LCD itself on Fn+F2.
pub const EC_VER_DISPLAY_TOGGLE: &str = "EC_VER=PQ1D26";

/// From this firmware on the EC handles the LCD across suspend.
pub const EC_VER_SUSPEND_LCD: &str = "EC_VER=PQ1D27";

/// Returns `true` if firmware `current` sorts strictly before `threshold`.
///
/// Case-insensitive byte comparison over the first
/// [`EC_VERSION_CMP_LEN`] bytes; a string that is a prefix of the other
/// sorts first. Equal versions are *not* "before".
pub fn version_before(current: &str, threshold: &str) -> bool {
    fn folded(s: &str) -> impl Iterator<Item = u8> + '_ {
        s.bytes()
            .take(EC_VERSION_CMP_LEN)
            .map(|b| b.to_ascii_lowercase())
    }
    folded(current).lt(folded(threshold))
}

// ── Transport ───────────────────────────────────────────────────

/// Failures reported by the EC transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcError {
    /// The EC did not answer the query handshake.
    NoResponse,
    /// The EC input buffer never drained.
    Busy,
}

impl fmt::Display for EcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcError::NoResponse => f.write_str("embedded controller did not respond"),
            EcError::Busy => f.write_str("embedded controller busy"),
        }
    }
}

/// Synchronous access to the embedded controller.
///
/// Implementations must be callable from the threaded SCI handler:
/// blocking for microseconds is fine, sleeping is not.
pub trait EcTransport {
    fn read(&mut self, reg: EcRegister) -> u8;
    fn write(&mut self, reg: EcRegister, value: u8);

    /// Ask the EC which event raised the SCI.
    ///
    /// On success the answer is latched and returned by
    /// [`EcTransport::event_num`].
    fn query_event_num(&mut self) -> Result<(), EcError>;

    /// The event number latched by the last successful query.
    fn event_num(&mut self) -> u8;

    /// Firmware version string (e.g. `EC_VER=PQ1D27`), if it was read at
    /// boot.
    fn version(&self) -> Option<&str>;
}

/// Whether the EC runs firmware older than `threshold`. A version that was
/// never read compares as the empty string, i.e. oldest.
pub fn firmware_before<E: EcTransport>(ec: &E, threshold: &str) -> bool {
    version_before(ec.version().unwrap_or(""), threshold)
}
