//! Event dispatch.
//!
//! Each event has a static [`EventBinding`]: an optional EC register to
//! read and an optional [`Handler`] to run on the value. The final status
//! then picks a keymap entry and goes to the input device.
//!
//! Handlers that need memory between events (the Fn+F3 rotation, the
//! last brightness and volume levels) keep it in [`HandlerState`], owned
//! by the [`Dispatcher`]. Dispatch is serialized by the oneshot SCI line,
//! or by the driver mutex when called from elsewhere.

use bitflags::bitflags;
use khal::PlatformIo;

use crate::ec::{self, EcRegister, EcTransport};
use crate::event::{Event, EVENT_START};
use crate::input::{self, InputSink};
use crate::keymap;
use crate::power::{PowerSupplies, Supply};
use crate::video::{self, Output, VideoMode};

// ── Collaborators ───────────────────────────────────────────────

/// Everything outside the driver that event handling touches.
pub struct Devices<E, P, I, S> {
    pub ec: E,
    pub io: P,
    pub input: I,
    pub power: S,
}

// ── Bindings ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbPort {
    Port0,
    Port2,
}

/// Per-event policy run on the raw register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    SwitchVideoMode,
    CrtDetect,
    Camera,
    UsbOvercurrent(UsbPort),
    DisplayToggle,
    AcBat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBinding {
    pub event: Event,
    pub register: Option<EcRegister>,
    pub handler: Option<Handler>,
}

const fn bind(event: Event, register: Option<EcRegister>, handler: Option<Handler>) -> EventBinding {
    EventBinding {
        event,
        register,
        handler,
    }
}

/// Indexed by `event - EVENT_START`.
static BINDINGS: [EventBinding; Event::ALL.len()] = [
    bind(Event::Lid, Some(EcRegister::LID_DETECT), None),
    bind(Event::SwitchVideoMode, None, Some(Handler::SwitchVideoMode)),
    bind(Event::Sleep, None, None),
    bind(Event::Overtemp, None, None),
    bind(Event::CrtDetect, Some(EcRegister::CRT_DETECT), Some(Handler::CrtDetect)),
    bind(Event::Camera, Some(EcRegister::CAMERA_STATUS), Some(Handler::Camera)),
    bind(
        Event::UsbOc2,
        Some(EcRegister::USB2_FLAG),
        Some(Handler::UsbOvercurrent(UsbPort::Port2)),
    ),
    bind(
        Event::UsbOc0,
        Some(EcRegister::USB0_FLAG),
        Some(Handler::UsbOvercurrent(UsbPort::Port0)),
    ),
    bind(Event::DisplayToggle, Some(EcRegister::DISPLAY_LCD), Some(Handler::DisplayToggle)),
    bind(Event::AudioMute, Some(EcRegister::AUDIO_MUTE), None),
    bind(Event::DisplayBrightness, Some(EcRegister::DISPLAY_BRIGHTNESS), None),
    bind(Event::AcBat, None, Some(Handler::AcBat)),
    bind(Event::AudioVolume, Some(EcRegister::AUDIO_VOLUME), None),
    bind(Event::Wlan, None, None),
];

pub fn binding(event: Event) -> &'static EventBinding {
    &BINDINGS[usize::from(event.code() - EVENT_START)]
}

bitflags! {
    /// `CAMERA_CONTROL` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CameraControl: u8 {
        const OFF = 1 << 1;
    }
}

const CRT_DETECTED: u8 = 1;

// ── Handler state ───────────────────────────────────────────────

/// Axis of a level-reporting hotkey pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Brightness,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

/// Memory the handlers carry from one event to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerState {
    last_brightness: i32,
    last_volume: i32,
    video_mode: Option<VideoMode>,
}

impl Default for HandlerState {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerState {
    pub const fn new() -> Self {
        Self {
            last_brightness: -1,
            last_volume: -1,
            video_mode: None,
        }
    }

    pub fn last_sample(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Brightness => self.last_brightness,
            Axis::Volume => self.last_volume,
        }
    }

    pub fn video_mode(&self) -> Option<VideoMode> {
        self.video_mode
    }

    /// Classify a cumulative level reading against the previous one and
    /// remember it.
    ///
    /// A level of zero always counts as a decrease: the EC reports 0 when
    /// the key is held at the bottom of the range.
    pub fn direction(&mut self, axis: Axis, sample: i32) -> Direction {
        let last = match axis {
            Axis::Brightness => &mut self.last_brightness,
            Axis::Volume => &mut self.last_volume,
        };
        let direction = if sample == 0 || sample < *last {
            Direction::Decrease
        } else {
            Direction::Increase
        };
        *last = sample;
        direction
    }

    fn advance_video_mode(&mut self) -> VideoMode {
        let next = VideoMode::advance(self.video_mode);
        self.video_mode = Some(next);
        next
    }
}

// ── Dispatcher ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Dispatcher {
    state: HandlerState,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self {
            state: HandlerState::new(),
        }
    }

    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Run the binding for `event` and report the outcome.
    pub fn dispatch<E, P, I, S>(&mut self, dev: &mut Devices<E, P, I, S>, event: Event)
    where
        E: EcTransport,
        P: PlatformIo,
        I: InputSink,
        S: PowerSupplies,
    {
        let binding = binding(event);

        let raw = binding
            .register
            .map_or(0, |reg| i32::from(dev.ec.read(reg)));

        let status = match binding.handler {
            Some(handler) => self.run_handler(handler, dev, raw),
            None => raw,
        };

        log::debug!("sci: event: {:#04x} status: {}", event.code(), status);

        if let Some(entry) = self.resolve_key(event, status) {
            input::report_entry(&mut dev.input, entry, status);
        }
    }

    /// Pick the keymap entry for `event`. For the level keys the
    /// decrease entry sits right after the increase entry.
    fn resolve_key(&mut self, event: Event, status: i32) -> Option<&'static keymap::KeyEntry> {
        let index = keymap::entry_index(event)?;

        let axis = match event {
            Event::DisplayBrightness => Some(Axis::Brightness),
            Event::AudioVolume => Some(Axis::Volume),
            _ => None,
        };

        let index = match axis.map(|axis| self.state.direction(axis, status)) {
            Some(Direction::Decrease) => index + 1,
            _ => index,
        };

        keymap::entry(index)
    }

    fn run_handler<E, P, I, S>(
        &mut self,
        handler: Handler,
        dev: &mut Devices<E, P, I, S>,
        status: i32,
    ) -> i32
    where
        E: EcTransport,
        P: PlatformIo,
        I: InputSink,
        S: PowerSupplies,
    {
        match handler {
            Handler::SwitchVideoMode => self.switch_video_mode(dev),
            Handler::CrtDetect => {
                video::set_outputs(&mut dev.io, true, status != 0);
                status
            }
            Handler::Camera => {
                let value = dev.ec.read(EcRegister::CAMERA_CONTROL);
                dev.ec
                    .write(EcRegister::CAMERA_CONTROL, value | CameraControl::OFF.bits());
                status
            }
            Handler::UsbOvercurrent(port) => {
                let port = match port {
                    UsbPort::Port0 => 0,
                    UsbPort::Port2 => 2,
                };
                log::error!("USB{} Over Current occurred", port);
                status
            }
            Handler::DisplayToggle => {
                // Newer firmware blanks the panel itself; doing it again
                // leaves the backlight dark on the way back.
                if ec::firmware_before(&dev.ec, ec::EC_VER_DISPLAY_TOGGLE) {
                    video::set_output(&mut dev.io, Output::Lcd, status != 0);
                }
                status
            }
            Handler::AcBat => {
                if dev.power.registered() {
                    dev.power.changed(Supply::Ac);
                    dev.power.changed(Supply::Battery);
                }
                status
            }
        }
    }

    /// Fn+F3 only does something while a CRT is attached.
    fn switch_video_mode<E, P, I, S>(&mut self, dev: &mut Devices<E, P, I, S>) -> i32
    where
        E: EcTransport,
        P: PlatformIo,
    {
        if dev.ec.read(EcRegister::CRT_DETECT) != CRT_DETECTED {
            return 0;
        }

        let mode = self.state.advance_video_mode();
        let (lcd, crt) = mode.outputs();
        video::set_outputs(&mut dev.io, lcd, crt);
        mode.position()
    }
}
