//! Busy-wait delays.
//!
//! There is no timer we can rely on while the driver is being (re)armed,
//! so delays are built from writes to the POST diagnostic port. Each
//! write to port 0x80 takes roughly one microsecond on the ISA bus.

use crate::port::outb;

/// Unused diagnostic port; writes are harmless and slow.
const IO_WAIT_PORT: u16 = 0x80;

/// Small I/O delay (~1µs) by writing to an unused port.
#[inline]
pub fn io_wait() {
    unsafe {
        outb(IO_WAIT_PORT, 0);
    }
}

/// Spin for approximately `us` microseconds.
pub fn udelay(us: u32) {
    for _ in 0..us {
        io_wait();
    }
}

/// Spin for approximately `ms` milliseconds.
///
/// Never call this from the SCI dispatch path: the EC re-raises the
/// line within a few milliseconds and a long spin loses events.
pub fn mdelay(ms: u32) {
    for _ in 0..ms {
        udelay(1000);
    }
}
