//! Recording stand-ins for the driver's collaborators.

use std::collections::{HashMap, VecDeque};

use khal::{MsrValue, PlatformIo};

use crate::dispatch::Devices;
use crate::ec::{EcError, EcRegister, EcTransport};
use crate::input::InputSink;
use crate::keymap::{KeyCode, SwitchCode};
use crate::power::{PowerSupplies, Supply};
use crate::video::{SEQ_DATA, SEQ_INDEX, SR_CRT, SR_LCD};

pub type TestDevices = Devices<FakeEc, FakeIo, RecordingInput, RecordingPower>;

pub fn devices() -> TestDevices {
    Devices {
        ec: FakeEc::default(),
        io: FakeIo::default(),
        input: RecordingInput::default(),
        power: RecordingPower {
            registered: true,
            changes: Vec::new(),
        },
    }
}

// ── EC ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeEc {
    pub regs: HashMap<EcRegister, u8>,
    pub reads: Vec<EcRegister>,
    pub writes: Vec<(EcRegister, u8)>,
    /// Event numbers returned by successive queries.
    pub pending: VecDeque<u8>,
    pub latched: u8,
    pub queries: usize,
    pub query_error: Option<EcError>,
    pub version: Option<String>,
}

impl FakeEc {
    /// Preset a register without recording a write.
    pub fn set(&mut self, reg: EcRegister, value: u8) {
        self.regs.insert(reg, value);
    }

    pub fn get(&self, reg: EcRegister) -> u8 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }
}

impl EcTransport for FakeEc {
    fn read(&mut self, reg: EcRegister) -> u8 {
        self.reads.push(reg);
        self.get(reg)
    }

    fn write(&mut self, reg: EcRegister, value: u8) {
        self.writes.push((reg, value));
        self.regs.insert(reg, value);
    }

    fn query_event_num(&mut self) -> Result<(), EcError> {
        self.queries += 1;
        if let Some(err) = self.query_error {
            return Err(err);
        }
        if let Some(code) = self.pending.pop_front() {
            self.latched = code;
        }
        Ok(())
    }

    fn event_num(&mut self) -> u8 {
        self.latched
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

// ── Platform I/O ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Inb(u16),
    Outb(u16, u8),
    Outl(u16, u32),
    Rdmsr(u32),
    Wrmsr(u32, MsrValue),
    Delay(u32),
    IrqOff,
    IrqOn,
}

#[derive(Debug, Default)]
pub struct FakeIo {
    pub ops: Vec<IoOp>,
    pub msrs: HashMap<u32, MsrValue>,
    /// Values the sequencer reads back, per index. Writes do not change
    /// them.
    pub sequencer: HashMap<u8, u8>,
    /// Last value written, per sequencer index.
    pub written: HashMap<u8, u8>,
    seq_index: u8,
}

impl FakeIo {
    /// `(lcd, crt)` power as last programmed.
    pub fn outputs(&self) -> (bool, bool) {
        let lcd = self.written.get(&SR_LCD).is_some_and(|v| v & 0x01 != 0);
        let crt = self.written.get(&SR_CRT).is_some_and(|v| v & 0x80 == 0);
        (lcd, crt)
    }
}

impl PlatformIo for FakeIo {
    fn inb(&mut self, port: u16) -> u8 {
        self.ops.push(IoOp::Inb(port));
        if port == SEQ_DATA {
            self.sequencer.get(&self.seq_index).copied().unwrap_or(0)
        } else {
            0
        }
    }

    fn outb(&mut self, port: u16, value: u8) {
        self.ops.push(IoOp::Outb(port, value));
        match port {
            SEQ_INDEX => self.seq_index = value,
            SEQ_DATA => {
                self.written.insert(self.seq_index, value);
            }
            _ => {}
        }
    }

    fn outl(&mut self, port: u16, value: u32) {
        self.ops.push(IoOp::Outl(port, value));
    }

    fn rdmsr(&mut self, reg: u32) -> MsrValue {
        self.ops.push(IoOp::Rdmsr(reg));
        self.msrs.get(&reg).copied().unwrap_or_default()
    }

    fn wrmsr(&mut self, reg: u32, value: MsrValue) {
        self.ops.push(IoOp::Wrmsr(reg, value));
        self.msrs.insert(reg, value);
    }

    fn mdelay(&mut self, ms: u32) {
        self.ops.push(IoOp::Delay(ms));
    }

    fn without_interrupts<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.ops.push(IoOp::IrqOff);
        let result = f(self);
        self.ops.push(IoOp::IrqOn);
        result
    }
}

// ── Input ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    Key(KeyCode, bool),
    Switch(SwitchCode, bool),
    Sync,
}

#[derive(Debug, Default)]
pub struct RecordingInput {
    pub log: Vec<InputRecord>,
}

impl InputSink for RecordingInput {
    fn report_key(&mut self, key: KeyCode, pressed: bool) {
        self.log.push(InputRecord::Key(key, pressed));
    }

    fn report_switch(&mut self, switch: SwitchCode, value: bool) {
        self.log.push(InputRecord::Switch(switch, value));
    }

    fn sync(&mut self) {
        self.log.push(InputRecord::Sync);
    }
}

// ── Power supply ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingPower {
    pub registered: bool,
    pub changes: Vec<Supply>,
}

impl PowerSupplies for RecordingPower {
    fn registered(&self) -> bool {
        self.registered
    }

    fn changed(&mut self, supply: Supply) {
        self.changes.push(supply);
    }
}
