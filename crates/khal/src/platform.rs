//! The platform register boundary.
//!
//! Everything the driver does to the chipset (MSRs, GPIO control ports,
//! the video sequencer, delays and interrupt masking) goes through
//! [`PlatformIo`]. The driver never touches [`crate::port`] or
//! [`crate::msr`] directly.

use crate::msr::{self, MsrValue};
use crate::{delay, port};

/// Raw chipset access used by interrupt arming and video output control.
///
/// Every method is assumed to succeed; the hardware gives us no way to
/// observe a failed port or MSR write.
pub trait PlatformIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, value: u8);
    fn outl(&mut self, port: u16, value: u32);
    fn rdmsr(&mut self, reg: u32) -> MsrValue;
    fn wrmsr(&mut self, reg: u32, value: MsrValue);

    /// Busy-wait for `ms` milliseconds.
    fn mdelay(&mut self, ms: u32);

    /// Run `f` with local interrupts masked, restoring the previous
    /// interrupt state afterwards.
    fn without_interrupts<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R;
}

/// Direct hardware access on the running machine.
pub struct NativeIo {
    _private: (),
}

impl NativeIo {
    /// Create a handle to the real chipset.
    ///
    /// # Safety
    ///
    /// The caller must be running in ring 0 on a CS5536-based board and
    /// must not create a second `NativeIo` that could interleave
    /// read-modify-write sequences with this one.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PlatformIo for NativeIo {
    fn inb(&mut self, port: u16) -> u8 {
        unsafe { port::inb(port) }
    }

    fn outb(&mut self, port: u16, value: u8) {
        unsafe { port::outb(port, value) }
    }

    fn outl(&mut self, port: u16, value: u32) {
        unsafe { port::outl(port, value) }
    }

    fn rdmsr(&mut self, reg: u32) -> MsrValue {
        unsafe { msr::rdmsr(reg) }
    }

    fn wrmsr(&mut self, reg: u32, value: MsrValue) {
        unsafe { msr::wrmsr(reg, value) }
    }

    fn mdelay(&mut self, ms: u32) {
        delay::mdelay(ms);
    }

    fn without_interrupts<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        x86_64::instructions::interrupts::without_interrupts(|| f(self))
    }
}
