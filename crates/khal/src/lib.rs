//! Hardware Abstraction Layer.
//!
//! Raw port I/O and MSR primitives, the busy-wait delay used while the EC
//! settles, and the [`PlatformIo`] trait the driver programs hardware
//! through. [`NativeIo`] is the real implementation; tests substitute a
//! recording one.
#![no_std]

pub mod delay;
pub mod msr;
pub mod platform;
pub mod port;

pub use msr::MsrValue;
pub use platform::{NativeIo, PlatformIo};
