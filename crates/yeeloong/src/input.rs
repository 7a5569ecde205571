//! Key/report adapter in front of the input-notification layer.

use crate::keymap::{KeyAction, KeyCode, KeyEntry, SwitchCode};

/// The hotkey input device, as seen by the driver.
///
/// Mirrors the `input_report_*` / `input_sync` trio: nothing reaches user
/// space until [`InputSink::sync`] is called.
pub trait InputSink {
    fn report_key(&mut self, key: KeyCode, pressed: bool);
    fn report_switch(&mut self, switch: SwitchCode, value: bool);
    fn sync(&mut self);
}

/// Report the lid state. The EC sets the detect bit while the lid is
/// open, so the switch value is the inverse of `status`.
pub fn report_lid<I: InputSink>(input: &mut I, status: i32) -> i32 {
    input.report_switch(SwitchCode::Lid, status == 0);
    input.sync();
    status
}

/// Emit a full press/release cycle for `key`.
pub fn report_key_press_release<I: InputSink>(input: &mut I, key: KeyCode) {
    input.report_key(key, true);
    input.sync();
    input.report_key(key, false);
    input.sync();
}

/// Report a resolved keymap entry for an event whose final status is
/// `status`.
pub fn report_entry<I: InputSink>(input: &mut I, entry: &KeyEntry, status: i32) {
    match entry.action {
        KeyAction::Switch(SwitchCode::Lid) => {
            report_lid(input, status);
        }
        KeyAction::Key(key) => report_key_press_release(input, key),
    }
}
