//! Sparse keymap for the hotkey input device.
//!
//! Events map to Linux input codes. Brightness and volume each own two
//! adjacent entries, "up" first; the dispatcher picks the second one when
//! the EC level went down.

use crate::event::Event;

/// Linux `KEY_*` codes emitted by the hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum KeyCode {
    Mute = 113,
    VolumeDown = 114,
    VolumeUp = 115,
    Sleep = 142,
    Camera = 212,
    BrightnessDown = 224,
    BrightnessUp = 225,
    SwitchVideoMode = 227,
    Wlan = 238,
    DisplayToggle = 431,
}

/// Linux `SW_*` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SwitchCode {
    Lid = 0x00,
}

/// What an entry reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Key(KeyCode),
    Switch(SwitchCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub event: Event,
    pub action: KeyAction,
}

const fn key(event: Event, code: KeyCode) -> KeyEntry {
    KeyEntry { event, action: KeyAction::Key(code) }
}

pub static KEYMAP: [KeyEntry; 11] = [
    KeyEntry { event: Event::Lid, action: KeyAction::Switch(SwitchCode::Lid) },
    // Fn + ESC
    key(Event::Camera, KeyCode::Camera),
    // Fn + F1
    key(Event::Sleep, KeyCode::Sleep),
    // Fn + F2
    key(Event::DisplayToggle, KeyCode::DisplayToggle),
    // Fn + F3
    key(Event::SwitchVideoMode, KeyCode::SwitchVideoMode),
    // Fn + F4
    key(Event::AudioMute, KeyCode::Mute),
    // Fn + F5
    key(Event::Wlan, KeyCode::Wlan),
    // Fn + up / down
    key(Event::DisplayBrightness, KeyCode::BrightnessUp),
    key(Event::DisplayBrightness, KeyCode::BrightnessDown),
    // Fn + right / left
    key(Event::AudioVolume, KeyCode::VolumeUp),
    key(Event::AudioVolume, KeyCode::VolumeDown),
];

/// Index of the first keymap entry for `event`.
pub fn entry_index(event: Event) -> Option<usize> {
    KEYMAP.iter().position(|entry| entry.event == event)
}

/// The entry at `index`, if any.
pub fn entry(index: usize) -> Option<&'static KeyEntry> {
    KEYMAP.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_with_a_key_resolves() {
        assert_eq!(entry_index(Event::Lid), Some(0));
        assert_eq!(
            entry(entry_index(Event::Camera).unwrap()).unwrap().action,
            KeyAction::Key(KeyCode::Camera)
        );
        assert!(entry_index(Event::AcBat).is_none());
        assert!(entry_index(Event::CrtDetect).is_none());
        assert!(entry_index(Event::Overtemp).is_none());
    }

    #[test]
    fn decrease_entry_follows_increase_entry() {
        let up = entry_index(Event::DisplayBrightness).unwrap();
        assert_eq!(KEYMAP[up].action, KeyAction::Key(KeyCode::BrightnessUp));
        assert_eq!(KEYMAP[up + 1].action, KeyAction::Key(KeyCode::BrightnessDown));
        assert_eq!(KEYMAP[up + 1].event, Event::DisplayBrightness);

        let up = entry_index(Event::AudioVolume).unwrap();
        assert_eq!(KEYMAP[up].action, KeyAction::Key(KeyCode::VolumeUp));
        assert_eq!(KEYMAP[up + 1].action, KeyAction::Key(KeyCode::VolumeDown));
    }
}
