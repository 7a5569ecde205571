//! Fan and temperature sensors.

use core::fmt;

use crate::ec::{EcRegister, EcTransport};

pub const MAX_FAN_SPEED: u8 = 3;

const FAN_SPEED_DIVIDER: u32 = 480_000;
const CPU_TEMP_MAX: i32 = 60 * 1000;

const FAN_AUTO: u8 = 0;
const FAN_MANUAL: u8 = 1;
const FAN_ON: u8 = 1;

const CHARGE_STATUS_OVERTEMP: u8 = 1 << 2;

/// `pwm1_enable` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FanMode {
    /// Manual at maximum speed.
    FullSpeed = 0,
    Manual = 1,
    Auto = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwmonError {
    InvalidMode(u32),
}

impl fmt::Display for HwmonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HwmonError::InvalidMode(mode) => write!(f, "invalid fan mode {}", mode),
        }
    }
}

impl TryFrom<u32> for FanMode {
    type Error = HwmonError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FanMode::FullSpeed),
            1 => Ok(FanMode::Manual),
            2 => Ok(FanMode::Auto),
            other => Err(HwmonError::InvalidMode(other)),
        }
    }
}

pub fn pwm_enable<E: EcTransport>(ec: &mut E) -> FanMode {
    let level = ec.read(EcRegister::FAN_SPEED_LEVEL);
    let mode = ec.read(EcRegister::FAN_AUTO_MAN_SWITCH);

    match (mode, level) {
        (FAN_MANUAL, MAX_FAN_SPEED) => FanMode::FullSpeed,
        (FAN_MANUAL, _) => FanMode::Manual,
        _ => FanMode::Auto,
    }
}

pub fn set_pwm_enable<E: EcTransport>(ec: &mut E, mode: FanMode) {
    match mode {
        FanMode::FullSpeed => {
            ec.write(EcRegister::FAN_AUTO_MAN_SWITCH, FAN_MANUAL);
            ec.write(EcRegister::FAN_SPEED_LEVEL, MAX_FAN_SPEED);
        }
        FanMode::Manual => ec.write(EcRegister::FAN_AUTO_MAN_SWITCH, FAN_MANUAL),
        FanMode::Auto => ec.write(EcRegister::FAN_AUTO_MAN_SWITCH, FAN_AUTO),
    }
}

pub fn pwm<E: EcTransport>(ec: &mut E) -> u8 {
    ec.read(EcRegister::FAN_SPEED_LEVEL)
}

/// Set the fan level. Ignored unless the fan is in manual mode.
pub fn set_pwm<E: EcTransport>(ec: &mut E, value: u32) {
    if ec.read(EcRegister::FAN_AUTO_MAN_SWITCH) != FAN_MANUAL {
        log::warn!("hwmon: pwm write ignored, fan is not in manual mode");
        return;
    }

    let value = value.min(u32::from(MAX_FAN_SPEED)) as u8;

    // The fan must be running for the level to take effect.
    if value > 0 {
        ec.write(EcRegister::FAN_CONTROL, FAN_ON);
    }
    ec.write(EcRegister::FAN_SPEED_LEVEL, value);
}

pub fn fan_rpm<E: EcTransport>(ec: &mut E) -> u32 {
    let period = (u32::from(ec.read(EcRegister::FAN_SPEED_HIGH) & 0x0F) << 8)
        | u32::from(ec.read(EcRegister::FAN_SPEED_LOW));
    FAN_SPEED_DIVIDER.checked_div(period).unwrap_or(0)
}

/// CPU temperature in milli-degrees Celsius.
pub fn cpu_temp<E: EcTransport>(ec: &mut E) -> i32 {
    i32::from(ec.read(EcRegister::TEMPERATURE_VALUE) as i8) * 1000
}

pub const fn cpu_temp_max() -> i32 {
    CPU_TEMP_MAX
}

pub fn battery_temp_alarm<E: EcTransport>(ec: &mut E) -> bool {
    ec.read(EcRegister::BAT_CHARGE_STATUS) & CHARGE_STATUS_OVERTEMP != 0
}

/// Hand the fan back to the EC.
pub fn init<E: EcTransport>(ec: &mut E) {
    set_pwm_enable(ec, FanMode::Auto);
}
