//! x86 port I/O primitives.
//!
//! Provides byte `in`/`out` and dword `out` wrappers for x86 port-mapped I/O
//! using inline assembly.

/// Write a byte to an x86 I/O port.
///
/// # Safety
///
/// Writing to an arbitrary I/O port can have side effects on hardware.
/// The caller must ensure the port and value are valid.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    core::arch::asm!(
        "out dx, al",
        in("dx") port,
        in("al") value,
        options(nomem, nostack, preserves_flags)
    );
}

/// Read a byte from an x86 I/O port.
///
/// # Safety
///
/// Reading from an arbitrary I/O port can have side effects on hardware.
/// The caller must ensure the port is valid.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    core::arch::asm!(
        "in al, dx",
        in("dx") port,
        out("al") value,
        options(nomem, nostack, preserves_flags)
    );
    value
}

/// Write a dword to an x86 I/O port.
///
/// The CS5536 GPIO bank registers are 32 bits wide: the low half sets
/// a pin's feature bit, the high half clears it.
///
/// # Safety
///
/// Same contract as [`outb`].
#[inline]
pub unsafe fn outl(port: u16, value: u32) {
    core::arch::asm!(
        "out dx, eax",
        in("dx") port,
        in("eax") value,
        options(nomem, nostack, preserves_flags)
    );
}
