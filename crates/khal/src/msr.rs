//! Model-specific register access.
//!
//! The CS5536 companion chip exposes its configuration through MSRs that
//! the GeodeLink bridge forwards from the CPU. The driver always handles
//! them as a `(hi, lo)` pair, so that is the shape we return.

use x86_64::registers::model_specific::Msr;

/// A 64-bit MSR value split into its EDX:EAX halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsrValue {
    pub hi: u32,
    pub lo: u32,
}

impl MsrValue {
    pub const fn new(hi: u32, lo: u32) -> Self {
        Self { hi, lo }
    }

    pub const fn from_u64(raw: u64) -> Self {
        Self {
            hi: (raw >> 32) as u32,
            lo: raw as u32,
        }
    }

    pub const fn as_u64(self) -> u64 {
        ((self.hi as u64) << 32) | self.lo as u64
    }
}

/// Read an MSR.
///
/// # Safety
///
/// Reading a non-existent MSR raises #GP. The caller must know `reg`
/// is implemented on this platform.
#[inline]
pub unsafe fn rdmsr(reg: u32) -> MsrValue {
    MsrValue::from_u64(Msr::new(reg).read())
}

/// Write an MSR.
///
/// # Safety
///
/// Same contract as [`rdmsr`]; additionally the written value must be
/// valid for the register.
#[inline]
pub unsafe fn wrmsr(reg: u32, value: MsrValue) {
    let mut msr = Msr::new(reg);
    msr.write(value.as_u64());
}
