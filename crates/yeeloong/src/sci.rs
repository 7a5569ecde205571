//! SCI interrupt entry point.
//!
//! Runs as a threaded, oneshot interrupt handler: the SCI line stays
//! masked until [`Hotkey::handle_irq`] returns, so invocations never
//! overlap. The query plus dispatch has to finish within a few
//! milliseconds or the next event is lost, which is why nothing on this
//! path sleeps or retries.

use khal::PlatformIo;

use crate::arming;
use crate::dispatch::{Devices, Dispatcher};
use crate::ec::{EcError, EcTransport};
use crate::event::{self, Event};
use crate::input::{self, InputSink};
use crate::power::PowerSupplies;

/// Interrupt line the SCI is wired to.
pub const SCI_IRQ_NUM: u32 = 0x0A;

/// Verdict handed back to the interrupt core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Not ours (foreign line, glitch, or noise); let other handlers try.
    None,
    Handled,
}

/// The hotkey pipeline: collaborators plus dispatcher state.
pub struct Hotkey<E, P, I, S> {
    devices: Devices<E, P, I, S>,
    dispatcher: Dispatcher,
}

impl<E, P, I, S> Hotkey<E, P, I, S>
where
    E: EcTransport,
    P: PlatformIo,
    I: InputSink,
    S: PowerSupplies,
{
    pub fn new(devices: Devices<E, P, I, S>) -> Self {
        Self {
            devices,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn devices(&self) -> &Devices<E, P, I, S> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<E, P, I, S> {
        &mut self.devices
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn into_devices(self) -> Devices<E, P, I, S> {
        self.devices
    }

    /// SCI interrupt routine.
    pub fn handle_irq(&mut self, irq: u32) -> IrqReturn {
        if irq != SCI_IRQ_NUM {
            return IrqReturn::None;
        }

        // A failed query is a glitch on the line, not an error.
        if self.devices.ec.query_event_num().is_err() {
            log::trace!("sci: query failed, ignoring interrupt");
            return IrqReturn::None;
        }

        let code = self.devices.ec.event_num();
        if !event::in_range(code) {
            log::trace!("sci: event {:#04x} out of range", code);
            return IrqReturn::None;
        }

        match Event::from_code(code) {
            Some(event) => self.dispatcher.dispatch(&mut self.devices, event),
            None => log::trace!("sci: event {:#04x} has no binding", code),
        }

        IrqReturn::Handled
    }

    /// (Re)arm the SCI line. See [`arming::sci_irq_init`].
    pub fn arm(&mut self, flush_delay_ms: u32) -> Result<(), EcError> {
        let Devices { ec, io, .. } = &mut self.devices;
        arming::sci_irq_init(ec, io, flush_delay_ms)
    }

    /// First half of [`Hotkey::arm`]: the flush query.
    pub fn flush_events(&mut self) -> Result<(), EcError> {
        arming::flush_events(&mut self.devices.ec)
    }

    /// Second half of [`Hotkey::arm`], run once the EC has settled.
    pub fn route_sci(&mut self) {
        let io = &mut self.devices.io;
        let gpio_base = arming::gpio_base(io);
        arming::route_sci(io, gpio_base);
    }

    /// Push a lid state to user space outside of an SCI, e.g. on resume.
    pub fn report_lid(&mut self, status: i32) -> i32 {
        input::report_lid(&mut self.devices.input, status)
    }
}
