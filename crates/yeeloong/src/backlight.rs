//! LCD backlight.
//!
//! The EC owns the brightness level and changes it on its own when the
//! Fn+Up/Down hotkeys are pressed. We only write a new level when the EC
//! still holds the one we wrote last; otherwise the user is mid-adjust
//! and our write would fight theirs.

use crate::ec::{EcRegister, EcTransport};

pub const MAX_BRIGHTNESS: u8 = 8;

/// Requested backlight state, as the backlight class hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklightProps {
    pub brightness: u32,
    /// Backlight power is "unblank".
    pub powered: bool,
    /// Framebuffer is not blanked.
    pub unblanked: bool,
}

impl BacklightProps {
    pub const fn on(brightness: u32) -> Self {
        Self {
            brightness,
            powered: true,
            unblanked: true,
        }
    }

    /// Level the hardware should show: the requested brightness while
    /// the panel is lit, zero otherwise, clamped to the EC's range.
    pub fn effective_level(&self) -> u8 {
        let level = if self.powered && self.unblanked {
            self.brightness
        } else {
            0
        };
        level.min(u32::from(MAX_BRIGHTNESS)) as u8
    }
}

#[derive(Debug, Default)]
pub struct Backlight {
    old_level: u8,
}

impl Backlight {
    pub const fn new() -> Self {
        Self { old_level: 0 }
    }

    /// Adopt whatever level the EC booted with.
    pub fn init<E: EcTransport>(ec: &mut E) -> Self {
        let mut backlight = Self::new();
        let current = backlight.brightness(ec);
        backlight.update(ec, BacklightProps::on(u32::from(current)));
        backlight
    }

    pub fn brightness<E: EcTransport>(&self, ec: &mut E) -> u8 {
        ec.read(EcRegister::DISPLAY_BRIGHTNESS)
    }

    pub fn update<E: EcTransport>(&mut self, ec: &mut E, props: BacklightProps) {
        let level = props.effective_level();
        if self.old_level == level {
            return;
        }

        let current = ec.read(EcRegister::DISPLAY_BRIGHTNESS);
        if current == self.old_level {
            ec.write(EcRegister::DISPLAY_BRIGHTNESS, level);
        } else {
            log::debug!("backlight: EC is adjusting ({} -> {}), not writing", self.old_level, current);
        }
        self.old_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEc;

    #[test]
    fn level_is_clamped_and_blanking_forces_zero() {
        assert_eq!(BacklightProps::on(20).effective_level(), MAX_BRIGHTNESS);
        let blanked = BacklightProps {
            brightness: 5,
            powered: true,
            unblanked: false,
        };
        assert_eq!(blanked.effective_level(), 0);
    }

    #[test]
    fn writes_only_when_ec_holds_last_level() {
        let mut ec = FakeEc::default();
        ec.set(EcRegister::DISPLAY_BRIGHTNESS, 0);
        let mut bl = Backlight::new();

        bl.update(&mut ec, BacklightProps::on(4));
        assert_eq!(ec.get(EcRegister::DISPLAY_BRIGHTNESS), 4);

        // The EC moved the level behind our back.
        ec.set(EcRegister::DISPLAY_BRIGHTNESS, 6);
        bl.update(&mut ec, BacklightProps::on(2));
        assert_eq!(ec.get(EcRegister::DISPLAY_BRIGHTNESS), 6);
        assert_eq!(bl.old_level, 2);
    }

    #[test]
    fn init_adopts_boot_level() {
        let mut ec = FakeEc::default();
        ec.set(EcRegister::DISPLAY_BRIGHTNESS, 0);
        let bl = Backlight::init(&mut ec);
        assert_eq!(bl.old_level, 0);
        assert!(ec.writes.is_empty());
    }
}
