#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use khal::{MsrValue, PlatformIo};
use yeeloong::keymap::{KeyCode, SwitchCode};
use yeeloong::{Devices, EcError, EcRegister, EcTransport, InputSink, PowerSupplies, Supply};

pub type Board = Devices<Ec, Io, Input, Power>;

pub fn board() -> Board {
    Devices {
        ec: Ec {
            version: Some("EC_VER=PQ1D27".to_string()),
            ..Ec::default()
        },
        io: Io::default(),
        input: Input::default(),
        power: Power {
            registered: true,
            changes: Vec::new(),
        },
    }
}

#[derive(Debug, Default)]
pub struct Ec {
    pub regs: HashMap<EcRegister, u8>,
    pub writes: Vec<(EcRegister, u8)>,
    pub pending: VecDeque<Result<u8, EcError>>,
    pub latched: u8,
    pub queries: usize,
    pub version: Option<String>,
}

impl Ec {
    pub fn set(&mut self, reg: EcRegister, value: u8) {
        self.regs.insert(reg, value);
    }

    pub fn get(&self, reg: EcRegister) -> u8 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Queue the answer to the next query.
    pub fn raise(&mut self, event: u8) {
        self.pending.push_back(Ok(event));
    }
}

impl EcTransport for Ec {
    fn read(&mut self, reg: EcRegister) -> u8 {
        self.get(reg)
    }

    fn write(&mut self, reg: EcRegister, value: u8) {
        self.writes.push((reg, value));
        self.regs.insert(reg, value);
    }

    fn query_event_num(&mut self) -> Result<(), EcError> {
        self.queries += 1;
        match self.pending.pop_front() {
            Some(Ok(code)) => {
                self.latched = code;
                Ok(())
            }
            Some(Err(err)) => Err(err),
            None => Ok(()),
        }
    }

    fn event_num(&mut self) -> u8 {
        self.latched
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Out8(u16, u8),
    Out32(u16, u32),
    WriteMsr(u32, MsrValue),
    Delay(u32),
    Masked(bool),
}

#[derive(Debug, Default)]
pub struct Io {
    pub ops: Vec<Op>,
    pub msrs: HashMap<u32, MsrValue>,
    pub masked: bool,
}

impl Io {
    pub fn sequencer_writes(&self) -> Vec<(u8, u8)> {
        let mut index = 0;
        let mut writes = Vec::new();
        for op in &self.ops {
            match *op {
                Op::Out8(0x3C4, value) => index = value,
                Op::Out8(0x3C5, value) => writes.push((index, value)),
                _ => {}
            }
        }
        writes
    }
}

impl PlatformIo for Io {
    fn inb(&mut self, _port: u16) -> u8 {
        0
    }

    fn outb(&mut self, port: u16, value: u8) {
        self.ops.push(Op::Out8(port, value));
    }

    fn outl(&mut self, port: u16, value: u32) {
        self.ops.push(Op::Out32(port, value));
    }

    fn rdmsr(&mut self, reg: u32) -> MsrValue {
        self.msrs.get(&reg).copied().unwrap_or_default()
    }

    fn wrmsr(&mut self, reg: u32, value: MsrValue) {
        assert!(self.masked, "MSR {:#x} written with interrupts enabled", reg);
        self.ops.push(Op::WriteMsr(reg, value));
        self.msrs.insert(reg, value);
    }

    fn mdelay(&mut self, ms: u32) {
        self.ops.push(Op::Delay(ms));
    }

    fn without_interrupts<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.masked = true;
        self.ops.push(Op::Masked(true));
        let result = f(self);
        self.ops.push(Op::Masked(false));
        self.masked = false;
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Key(KeyCode, bool),
    Switch(SwitchCode, bool),
    Sync,
}

#[derive(Debug, Default)]
pub struct Input {
    pub reports: Vec<Report>,
}

impl Input {
    /// Keys that completed a press/release cycle.
    pub fn presses(&self) -> Vec<KeyCode> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Key(key, true) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn switches(&self) -> Vec<bool> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Switch(SwitchCode::Lid, value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl InputSink for Input {
    fn report_key(&mut self, key: KeyCode, pressed: bool) {
        self.reports.push(Report::Key(key, pressed));
    }

    fn report_switch(&mut self, switch: SwitchCode, value: bool) {
        self.reports.push(Report::Switch(switch, value));
    }

    fn sync(&mut self) {
        self.reports.push(Report::Sync);
    }
}

#[derive(Debug, Default)]
pub struct Power {
    pub registered: bool,
    pub changes: Vec<Supply>,
}

impl PowerSupplies for Power {
    fn registered(&self) -> bool {
        self.registered
    }

    fn changed(&mut self, supply: Supply) {
        self.changes.push(supply);
    }
}
