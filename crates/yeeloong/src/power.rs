//! AC adapter and battery.
//!
//! Property reads for the two power supplies, and the boundary used to
//! tell the power-supply class that they changed.

use bitflags::bitflags;

use crate::ec::{EcRegister, EcTransport};

// ── Power-supply class boundary ─────────────────────────────────

/// The two supplies the driver registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supply {
    Ac,
    Battery,
}

/// The power-supply class, as seen by the event handlers.
pub trait PowerSupplies {
    /// `true` once both supplies are registered. Change notifications
    /// before that point are dropped.
    fn registered(&self) -> bool;

    /// Signal that the properties of `supply` may have changed.
    fn changed(&mut self, supply: Supply);
}

// ── EC status bits ──────────────────────────────────────────────

bitflags! {
    /// `BAT_POWER` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerFlags: u8 {
        const AC_IN = 1 << 0;
    }

    /// `BAT_STATUS` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BatteryStatus: u8 {
        const PRESENT = 1 << 0;
        const FULL = 1 << 1;
        const DESTROYED = 1 << 2;
        const LOW = 1 << 5;
    }

    /// `BAT_CHARGE` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChargeFlags: u8 {
        const DISCHARGE = 0x40;
        const CHARGE = 0x80;
    }

    /// `BAT_CHARGE_STATUS` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChargeStatusFlags: u8 {
        const OVERTEMP = 1 << 2;
    }
}

const VENDOR_SANYO: u8 = 0x01;

const CAPACITY_CRITICAL: i32 = 5;
const CAPACITY_HIGH: i32 = 95;

// ── Property values ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Discharging,
    NotCharging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Good,
    Dead,
    Overheat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityLevel {
    Unknown,
    Critical,
    Low,
    Normal,
    High,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcProperty {
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryProperty {
    Status,
    Present,
    VoltageMaxDesign,
    ChargeFullDesign,
    ChargeFull,
    ChargeNow,
    CurrentNow,
    VoltageNow,
    Health,
    TimeToEmptyNow,
    Capacity,
    CapacityLevel,
    Temp,
    Manufacturer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i32),
    Status(ChargeState),
    Health(Health),
    CapacityLevel(CapacityLevel),
    Text(&'static str),
}

// ── Readers ─────────────────────────────────────────────────────

/// Read a 16-bit battery quantity stored as a high/low register pair.
fn read_u16<E: EcTransport>(ec: &mut E, high: EcRegister, low: EcRegister) -> u16 {
    (u16::from(ec.read(high)) << 8) | u16::from(ec.read(low))
}

fn status<E: EcTransport>(ec: &mut E) -> BatteryStatus {
    BatteryStatus::from_bits_retain(ec.read(EcRegister::BAT_STATUS))
}

pub fn ac_online<E: EcTransport>(ec: &mut E) -> bool {
    PowerFlags::from_bits_retain(ec.read(EcRegister::BAT_POWER)).contains(PowerFlags::AC_IN)
}

pub fn battery_present<E: EcTransport>(ec: &mut E) -> bool {
    status(ec).contains(BatteryStatus::PRESENT)
}

fn relative_capacity<E: EcTransport>(ec: &mut E) -> i32 {
    i32::from(read_u16(
        ec,
        EcRegister::BAT_RELATIVE_CAP_HIGH,
        EcRegister::BAT_RELATIVE_CAP_LOW,
    ))
}

fn full_charge_capacity<E: EcTransport>(ec: &mut E) -> i32 {
    i32::from(read_u16(
        ec,
        EcRegister::BAT_FULLCHG_CAP_HIGH,
        EcRegister::BAT_FULLCHG_CAP_LOW,
    ))
}

/// Battery current in mA; positive while discharging.
pub fn battery_current<E: EcTransport>(ec: &mut E) -> i32 {
    let raw = read_u16(ec, EcRegister::BAT_CURRENT_HIGH, EcRegister::BAT_CURRENT_LOW) as i16;
    -i32::from(raw)
}

/// Battery voltage in mV.
pub fn battery_voltage<E: EcTransport>(ec: &mut E) -> i32 {
    i32::from(read_u16(ec, EcRegister::BAT_VOLTAGE_HIGH, EcRegister::BAT_VOLTAGE_LOW))
}

/// Battery temperature in milli-degrees Celsius.
pub fn battery_temp<E: EcTransport>(ec: &mut E) -> i32 {
    i32::from(read_u16(
        ec,
        EcRegister::BAT_TEMPERATURE_HIGH,
        EcRegister::BAT_TEMPERATURE_LOW,
    )) * 1000
}

pub fn ac_property<E: EcTransport>(ec: &mut E, prop: AcProperty) -> PropertyValue {
    match prop {
        AcProperty::Online => PropertyValue::Int(i32::from(ac_online(ec))),
    }
}

fn capacity_level<E: EcTransport>(ec: &mut E) -> CapacityLevel {
    if !battery_present(ec) {
        return CapacityLevel::Unknown;
    }

    let status = status(ec);
    if status.contains(BatteryStatus::DESTROYED) {
        return CapacityLevel::Unknown;
    }
    if status.contains(BatteryStatus::LOW) {
        return CapacityLevel::Low;
    }
    if status.contains(BatteryStatus::FULL) {
        return CapacityLevel::Full;
    }

    match relative_capacity(ec) {
        cap if cap >= CAPACITY_HIGH => CapacityLevel::High,
        cap if cap <= CAPACITY_CRITICAL => CapacityLevel::Critical,
        _ => CapacityLevel::Normal,
    }
}

fn health<E: EcTransport>(ec: &mut E) -> Health {
    if !battery_present(ec) {
        return Health::Unknown;
    }

    let mut health = Health::Good;
    if status(ec).intersects(BatteryStatus::DESTROYED | BatteryStatus::LOW) {
        health = Health::Dead;
    }
    let charge = ChargeStatusFlags::from_bits_retain(ec.read(EcRegister::BAT_CHARGE_STATUS));
    if charge.contains(ChargeStatusFlags::OVERTEMP) {
        health = Health::Overheat;
    }
    health
}

fn charge_state<E: EcTransport>(ec: &mut E) -> ChargeState {
    let charge = ChargeFlags::from_bits_retain(ec.read(EcRegister::BAT_CHARGE));
    if charge.contains(ChargeFlags::DISCHARGE) {
        ChargeState::Discharging
    } else if charge.contains(ChargeFlags::CHARGE) {
        ChargeState::Charging
    } else {
        ChargeState::NotCharging
    }
}

/// Remaining charge in µAh: percent × mAh / 100 × 1000. Both factors are
/// raw 16-bit EC pairs, so the product can exceed `i32`.
fn charge_now<E: EcTransport>(ec: &mut E) -> i32 {
    let charge = i64::from(relative_capacity(ec)) * i64::from(full_charge_capacity(ec)) * 10;
    i32::try_from(charge).unwrap_or(i32::MAX)
}

/// Read one battery property. Units follow the power-supply class:
/// µV, µA, µAh, seconds, percent.
pub fn battery_property<E: EcTransport>(ec: &mut E, prop: BatteryProperty) -> PropertyValue {
    use PropertyValue::Int;

    // Dynamic values read as zero while no battery is inserted.
    fn present<B: EcTransport>(ec: &mut B, read: impl FnOnce(&mut B) -> i32) -> i32 {
        if battery_present(ec) { read(ec) } else { 0 }
    }

    match prop {
        BatteryProperty::Status => PropertyValue::Status(charge_state(ec)),
        BatteryProperty::Present => Int(i32::from(battery_present(ec))),
        BatteryProperty::VoltageMaxDesign => Int(
            i32::from(read_u16(ec, EcRegister::BAT_DESIGN_VOL_HIGH, EcRegister::BAT_DESIGN_VOL_LOW))
                * 1000,
        ),
        BatteryProperty::ChargeFullDesign => Int(
            i32::from(read_u16(ec, EcRegister::BAT_DESIGN_CAP_HIGH, EcRegister::BAT_DESIGN_CAP_LOW))
                * 1000,
        ),
        BatteryProperty::ChargeFull => Int(full_charge_capacity(ec) * 1000),
        BatteryProperty::ChargeNow => Int(charge_now(ec)),
        BatteryProperty::CurrentNow => Int(present(ec, |ec| battery_current(ec) * 1000)),
        BatteryProperty::VoltageNow => Int(present(ec, |ec| battery_voltage(ec) * 1000)),
        BatteryProperty::Health => PropertyValue::Health(health(ec)),
        BatteryProperty::TimeToEmptyNow => {
            Int(present(ec, |ec| (relative_capacity(ec) - 3) * 54 + 142))
        }
        BatteryProperty::Capacity => Int(present(ec, relative_capacity)),
        BatteryProperty::CapacityLevel => PropertyValue::CapacityLevel(capacity_level(ec)),
        BatteryProperty::Temp => Int(present(ec, battery_temp)),
        BatteryProperty::Manufacturer => {
            let vendor = if ec.read(EcRegister::BAT_VENDOR) == VENDOR_SANYO {
                "SANYO"
            } else {
                "SIMPLO"
            };
            PropertyValue::Text(vendor)
        }
    }
}
