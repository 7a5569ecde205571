//! SCI interrupt arming.
//!
//! The EC signals events on GPIO27 of the CS5536. Before the line can
//! deliver interrupts the pin has to be routed to an interrupt group
//! through the virtual-GPIO MSRs and configured as an inverted,
//! event-enabled input. This runs at load and again on every resume,
//! since the chipset forgets the configuration across suspend.

use bitflags::bitflags;
use khal::{MsrValue, PlatformIo};

use crate::ec::{EcError, EcTransport};

// ── MSRs ────────────────────────────────────────────────────────

/// Diverse-integration-logic MSR block of the CS5536.
const fn divil_msr_reg(offset: u32) -> u32 {
    0x5140_0000 | offset
}

/// GPIO I/O-space base address register.
pub const DIVIL_LBAR_GPIO: u32 = 0x0C;

/// GPIO base lives in bits 8..16 of the LBAR low word.
const GPIO_BASE_MASK: u32 = 0xFF00;

/// Primary routing for the virtual GPIO lines.
pub const MSR_VGPIO_PRIMARY: u32 = 0x8000_0024;
/// LPC routing for the virtual GPIO lines.
pub const MSR_VGPIO_LPC: u32 = 0x8000_0025;
/// Unrestricted-Z input mux.
pub const MSR_VGPIO_ZSEL: u32 = 0x8000_0023;

/// Virtual GPIO 0, which GPIO27 is mapped onto.
const VGPIO0: u32 = 1 << 10;
/// Interrupt group 10.
const ZSEL_IG10: u32 = 0x0A;

// ── GPIO high bank ──────────────────────────────────────────────

const GPIO_HIGH_INPUT_ENABLE: u16 = 0xA0;
const GPIO_HIGH_INPUT_INVERT: u16 = 0xA4;
const GPIO_HIGH_EVENT_ENABLE: u16 = 0xB8;

bitflags! {
    /// Pin bits in a high-bank GPIO feature register. The low half sets
    /// a feature, the high half clears it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GpioPins: u32 {
        /// GPIO27, the SCI pin.
        const SCI = 1 << 11;
    }
}

/// How long to let the EC settle after the flush query. Any event it
/// latched before the handler existed is dropped during this window.
pub const SCI_FLUSH_DELAY_MS: u32 = 20;

/// Read the GPIO I/O base from the LBAR MSR.
pub fn gpio_base<P: PlatformIo>(io: &mut P) -> u16 {
    let lbar = io.rdmsr(divil_msr_reg(DIVIL_LBAR_GPIO));
    (lbar.lo & GPIO_BASE_MASK) as u16
}

/// Arm GPIO27 as the SCI source.
///
/// Fails only when the flush query gets no answer, which means there is
/// no EC to drive the line.
pub fn sci_irq_init<E, P>(ec: &mut E, io: &mut P, flush_delay_ms: u32) -> Result<(), EcError>
where
    E: EcTransport,
    P: PlatformIo,
{
    let gpio_base = gpio_base(io);

    flush_events(ec)?;
    io.mdelay(flush_delay_ms);
    route_sci(io, gpio_base);
    Ok(())
}

/// Drain whatever the EC queued before we were listening. The caller
/// lets the EC settle for [`SCI_FLUSH_DELAY_MS`] before routing the line.
pub fn flush_events<E: EcTransport>(ec: &mut E) -> Result<(), EcError> {
    ec.query_event_num()
}

/// Route VGPIO0 to the SCI interrupt and enable GPIO27 events.
pub fn route_sci<P: PlatformIo>(io: &mut P, gpio_base: u16) {
    // No primary or LPC routing for VGPIO0; route it to IG10. These are
    // read-modify-writes shared with the rest of the chipset code.
    io.without_interrupts(|io| {
        clear_msr_bits(io, MSR_VGPIO_PRIMARY, VGPIO0);
        clear_msr_bits(io, MSR_VGPIO_LPC, VGPIO0);
        let zsel = io.rdmsr(MSR_VGPIO_ZSEL);
        io.wrmsr(MSR_VGPIO_ZSEL, MsrValue::new(zsel.hi, zsel.lo | ZSEL_IG10));
    });

    // Input, inverted (the SCI pulse is active low, ~120µs), event
    // interrupt enabled.
    let pin = GpioPins::SCI.bits();
    io.outl(gpio_base | GPIO_HIGH_INPUT_ENABLE, pin);
    io.outl(gpio_base | GPIO_HIGH_INPUT_INVERT, pin);
    io.outl(gpio_base | GPIO_HIGH_EVENT_ENABLE, pin);

    log::debug!("sci: GPIO27 armed, gpio base {:#06x}", gpio_base);
}

fn clear_msr_bits<P: PlatformIo>(io: &mut P, reg: u32, bits: u32) {
    let value = io.rdmsr(reg);
    io.wrmsr(reg, MsrValue::new(value.hi, value.lo & !bits));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEc, FakeIo, IoOp};

    const LBAR: u32 = 0x5140_000C;

    fn io_with_base(lo: u32) -> FakeIo {
        let mut io = FakeIo::default();
        io.msrs.insert(LBAR, MsrValue::new(0xF001, lo));
        io.msrs.insert(MSR_VGPIO_PRIMARY, MsrValue::new(0x1, 0xFFFF_FFFF));
        io.msrs.insert(MSR_VGPIO_LPC, MsrValue::new(0x2, 0x0000_0400));
        io.msrs.insert(MSR_VGPIO_ZSEL, MsrValue::new(0x3, 0x0000_0100));
        io
    }

    #[test]
    fn gpio_base_masks_lbar() {
        let mut io = io_with_base(0x0000_6123);
        assert_eq!(gpio_base(&mut io), 0x6100);
    }

    #[test]
    fn arming_sequence() {
        let mut ec = FakeEc::default();
        let mut io = io_with_base(0x0000_6100);

        sci_irq_init(&mut ec, &mut io, SCI_FLUSH_DELAY_MS).unwrap();

        assert_eq!(ec.queries, 1);
        assert_eq!(io.msrs[&MSR_VGPIO_PRIMARY], MsrValue::new(0x1, 0xFFFF_FBFF));
        assert_eq!(io.msrs[&MSR_VGPIO_LPC], MsrValue::new(0x2, 0));
        assert_eq!(io.msrs[&MSR_VGPIO_ZSEL], MsrValue::new(0x3, 0x0000_010A));

        let outs: Vec<_> = io
            .ops
            .iter()
            .filter(|op| matches!(op, IoOp::Outl(..)))
            .cloned()
            .collect();
        assert_eq!(
            outs,
            vec![
                IoOp::Outl(0x61A0, 0x0800),
                IoOp::Outl(0x61A4, 0x0800),
                IoOp::Outl(0x61B8, 0x0800),
            ]
        );
    }

    #[test]
    fn msr_writes_happen_with_interrupts_masked() {
        let mut ec = FakeEc::default();
        let mut io = io_with_base(0x0000_6100);
        sci_irq_init(&mut ec, &mut io, SCI_FLUSH_DELAY_MS).unwrap();

        let off = io.ops.iter().position(|op| *op == IoOp::IrqOff).unwrap();
        let on = io.ops.iter().position(|op| *op == IoOp::IrqOn).unwrap();
        for (i, op) in io.ops.iter().enumerate() {
            if matches!(op, IoOp::Wrmsr(..)) {
                assert!(off < i && i < on, "wrmsr outside critical section");
            }
        }
    }

    #[test]
    fn flush_delay_follows_query() {
        let mut ec = FakeEc::default();
        let mut io = io_with_base(0x0000_6100);
        sci_irq_init(&mut ec, &mut io, 35).unwrap();

        let delay = io.ops.iter().position(|op| *op == IoOp::Delay(35)).unwrap();
        let off = io.ops.iter().position(|op| *op == IoOp::IrqOff).unwrap();
        assert!(delay < off);
    }

    #[test]
    fn missing_ec_aborts_before_touching_gpio() {
        let mut ec = FakeEc::default();
        ec.query_error = Some(EcError::NoResponse);
        let mut io = io_with_base(0x0000_6100);

        assert_eq!(
            sci_irq_init(&mut ec, &mut io, SCI_FLUSH_DELAY_MS),
            Err(EcError::NoResponse)
        );
        assert!(!io.ops.iter().any(|op| matches!(op, IoOp::Outl(..) | IoOp::Wrmsr(..))));
    }
}
