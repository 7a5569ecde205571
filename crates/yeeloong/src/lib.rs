//! YeeLoong laptop platform driver.
//!
//! The embedded controller (a KB3310B) raises a System Control Interrupt
//! whenever a hotkey is pressed, the lid moves, a CRT is plugged in, the
//! battery changes state, and so on. This crate turns those interrupts
//! into input events and platform side effects.
//!
//! # Architecture
//!
//! ```text
//! SCI (GPIO27) → sci::Hotkey::handle_irq → dispatch::Dispatcher
//!                   query + range check       binding → handler
//!                                                 ↓
//!                                  input::report_entry → InputSink
//! ```
//!
//! Around the event core sit the EC-backed sub-drivers the platform
//! exposes: [`backlight`], [`power`], [`hwmon`] and the suspend/resume
//! hooks in [`driver`].
//!
//! # Example
//!
//! ```ignore
//! let devices = Devices { ec, io: unsafe { NativeIo::new() }, input, power };
//! let laptop = YeeLoong::load(devices, DriverConfig::default())?;
//!
//! // From the threaded SCI handler:
//! laptop.handle_irq(irq);
//! ```
#![cfg_attr(not(test), no_std)]

pub mod arming;
pub mod backlight;
pub mod dispatch;
pub mod driver;
pub mod ec;
pub mod event;
pub mod hwmon;
pub mod input;
pub mod keymap;
pub mod power;
pub mod sci;
pub mod video;

#[cfg(test)]
mod testing;

pub use dispatch::{Devices, Dispatcher, HandlerState};
pub use driver::{DriverConfig, DriverError, YeeLoong};
pub use ec::{EcError, EcRegister, EcTransport};
pub use event::{Event, EVENT_END, EVENT_START};
pub use input::InputSink;
pub use power::{PowerSupplies, Supply};
pub use sci::{Hotkey, IrqReturn, SCI_IRQ_NUM};
