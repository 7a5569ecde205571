//! Driver lifecycle: load, unload, suspend and resume.
//!
//! [`YeeLoong`] owns the hotkey pipeline and the backlight behind one
//! spinlock. The SCI thread, PM callbacks and attribute accessors all go
//! through it, so the handler state never sees two callers at once even
//! when dispatch runs outside the oneshot interrupt thread.

use core::fmt;

use khal::PlatformIo;
use spin::Mutex;

use crate::arming::SCI_FLUSH_DELAY_MS;
use crate::backlight::{Backlight, BacklightProps};
use crate::dispatch::{Devices, HandlerState};
use crate::ec::{self, EcError, EcRegister, EcTransport};
use crate::hwmon::{self, FanMode};
use crate::input::InputSink;
use crate::power::{self, AcProperty, BatteryProperty, PowerSupplies, PropertyValue};
use crate::sci::{Hotkey, IrqReturn};
use crate::video::{self, Output};

const USB_PORTS: [EcRegister; 3] = [
    EcRegister::USB0_FLAG,
    EcRegister::USB1_FLAG,
    EcRegister::USB2_FLAG,
];

/// Load-time knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Power the WLAN radio on load. Resume always powers it back on,
    /// since suspend always switches it off.
    pub wlan_on_load: bool,
    /// Settle time after the flush query when arming the SCI.
    pub flush_delay_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            wlan_on_load: true,
            flush_delay_ms: SCI_FLUSH_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The flush query got no answer.
    NoEmbeddedController(EcError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NoEmbeddedController(err) => {
                write!(f, "cannot arm SCI: {}", err)
            }
        }
    }
}

impl From<EcError> for DriverError {
    fn from(err: EcError) -> Self {
        DriverError::NoEmbeddedController(err)
    }
}

struct Inner<E, P, I, S> {
    hotkey: Hotkey<E, P, I, S>,
    backlight: Backlight,
}

pub struct YeeLoong<E, P, I, S> {
    inner: Mutex<Inner<E, P, I, S>>,
    config: DriverConfig,
}

impl<E, P, I, S> YeeLoong<E, P, I, S>
where
    E: EcTransport,
    P: PlatformIo,
    I: InputSink,
    S: PowerSupplies,
{
    /// Bring the platform up: backlight, fan, WLAN, SCI, initial lid
    /// state. On failure the collaborators are dropped.
    pub fn load(mut devices: Devices<E, P, I, S>, config: DriverConfig) -> Result<Self, DriverError> {
        log::info!("Load YeeLoong Laptop Platform Specific Driver.");

        let backlight = Backlight::init(&mut devices.ec);
        hwmon::init(&mut devices.ec);
        if config.wlan_on_load {
            set_wlan(&mut devices.ec, true);
        }

        let mut hotkey = Hotkey::new(devices);
        if let Err(err) = hotkey.arm(config.flush_delay_ms) {
            log::error!("Fail to register yeeloong hotkey driver: {}", err);
            return Err(err.into());
        }

        // Assume the lid is open until the EC says otherwise.
        hotkey.report_lid(1);

        Ok(Self {
            inner: Mutex::new(Inner { hotkey, backlight }),
            config,
        })
    }

    /// Tear the driver down and hand the collaborators back.
    pub fn unload(self) -> Devices<E, P, I, S> {
        log::info!("Unload YeeLoong Platform Specific Driver.");
        self.inner.into_inner().hotkey.into_devices()
    }

    pub fn handle_irq(&self, irq: u32) -> IrqReturn {
        self.inner.lock().hotkey.handle_irq(irq)
    }

    /// Used by platform PM code to announce the lid state.
    pub fn report_lid_status(&self, status: i32) -> i32 {
        self.inner.lock().hotkey.report_lid(status)
    }

    pub fn suspend(&self) {
        let mut inner = self.inner.lock();
        let Devices { ec, io, .. } = inner.hotkey.devices_mut();

        set_lcd_for_pm(ec, io, false);
        video::set_output(io, Output::Crt, false);
        set_usb_ports(ec, false);
        set_wlan(ec, false);
    }

    pub fn resume(&self) -> Result<(), DriverError> {
        {
            let mut inner = self.inner.lock();
            let Devices { ec, io, .. } = inner.hotkey.devices_mut();

            set_lcd_for_pm(ec, io, true);
            video::set_output(io, Output::Crt, true);
            set_usb_ports(ec, true);
            set_wlan(ec, true);

            inner.hotkey.flush_events().map_err(|err| {
                log::error!("resume: {}", err);
                DriverError::from(err)
            })?;
        }

        // Settle one millisecond at a time so an SCI thread never waits
        // on the lock for the whole delay.
        for _ in 0..self.config.flush_delay_ms {
            self.with_devices(|dev| dev.io.mdelay(1));
        }

        self.inner.lock().hotkey.route_sci();
        Ok(())
    }

    /// Run `f` with exclusive access to the collaborators.
    pub fn with_devices<R>(&self, f: impl FnOnce(&mut Devices<E, P, I, S>) -> R) -> R {
        f(self.inner.lock().hotkey.devices_mut())
    }

    pub fn handler_state(&self) -> HandlerState {
        self.inner.lock().hotkey.dispatcher().state().clone()
    }

    // ── Backlight ───────────────────────────────────────────────

    pub fn brightness(&self) -> u8 {
        let mut inner = self.inner.lock();
        let Inner { hotkey, backlight } = &mut *inner;
        backlight.brightness(&mut hotkey.devices_mut().ec)
    }

    pub fn update_backlight(&self, props: BacklightProps) {
        let mut inner = self.inner.lock();
        let Inner { hotkey, backlight } = &mut *inner;
        backlight.update(&mut hotkey.devices_mut().ec, props);
    }

    // ── Power supply ────────────────────────────────────────────

    pub fn ac_property(&self, prop: AcProperty) -> PropertyValue {
        self.with_devices(|dev| power::ac_property(&mut dev.ec, prop))
    }

    pub fn battery_property(&self, prop: BatteryProperty) -> PropertyValue {
        self.with_devices(|dev| power::battery_property(&mut dev.ec, prop))
    }

    // ── Hwmon ───────────────────────────────────────────────────

    pub fn fan_mode(&self) -> FanMode {
        self.with_devices(|dev| hwmon::pwm_enable(&mut dev.ec))
    }

    /// Store a `pwm1_enable` value.
    pub fn set_fan_mode(&self, mode: u32) -> Result<(), hwmon::HwmonError> {
        let mode = FanMode::try_from(mode).inspect_err(|err| log::warn!("hwmon: {}", err))?;
        self.with_devices(|dev| hwmon::set_pwm_enable(&mut dev.ec, mode));
        Ok(())
    }

    pub fn fan_pwm(&self) -> u8 {
        self.with_devices(|dev| hwmon::pwm(&mut dev.ec))
    }

    pub fn set_fan_pwm(&self, value: u32) {
        self.with_devices(|dev| hwmon::set_pwm(&mut dev.ec, value));
    }

    pub fn fan_rpm(&self) -> u32 {
        self.with_devices(|dev| hwmon::fan_rpm(&mut dev.ec))
    }

    pub fn cpu_temp(&self) -> i32 {
        self.with_devices(|dev| hwmon::cpu_temp(&mut dev.ec))
    }

    /// `temp1_max`, in milli-degrees Celsius.
    pub fn cpu_temp_max(&self) -> i32 {
        hwmon::cpu_temp_max()
    }

    /// `temp2_input`, in milli-degrees Celsius.
    pub fn battery_temp(&self) -> i32 {
        self.with_devices(|dev| power::battery_temp(&mut dev.ec))
    }

    pub fn battery_temp_alarm(&self) -> bool {
        self.with_devices(|dev| hwmon::battery_temp_alarm(&mut dev.ec))
    }

    /// `curr1_input`, in mA.
    pub fn battery_current(&self) -> i32 {
        self.with_devices(|dev| power::battery_current(&mut dev.ec))
    }

    /// `in1_input`, in mV.
    pub fn battery_voltage(&self) -> i32 {
        self.with_devices(|dev| power::battery_voltage(&mut dev.ec))
    }
}

fn set_wlan<E: EcTransport>(ec: &mut E, on: bool) {
    let value = if on { ec::WLAN_ON } else { ec::WLAN_OFF };
    ec.write(EcRegister::WLAN, value);
}

fn set_usb_ports<E: EcTransport>(ec: &mut E, on: bool) {
    for port in USB_PORTS {
        ec.write(port, u8::from(on));
    }
}

/// Older firmware leaves the panel alone across suspend; switch it
/// ourselves.
fn set_lcd_for_pm<E: EcTransport, P: PlatformIo>(ec: &mut E, io: &mut P, on: bool) {
    if ec::firmware_before(&*ec, ec::EC_VER_SUSPEND_LCD) {
        video::set_output(io, Output::Lcd, on);
    }
}
