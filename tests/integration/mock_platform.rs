//! Mock process table and session helpers for integration tests.
//!
//! `RecordingTable` records every notification as `(pid, event)` in one
//! shared log, so tests can assert on delivery order across subscribers.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gpioled::adapters::sim::SimPins;
use gpioled::app::events::NotificationEvent;
use gpioled::app::ports::{Pid, ProcessTable, SignalTarget};
use gpioled::app::session::DriverSession;
use gpioled::config::DriverConfig;

pub type Delivery = (Pid, NotificationEvent);

// ── RecordingTable ────────────────────────────────────────────

pub struct RecordingTarget {
    pid: Pid,
    log: Arc<Mutex<Vec<Delivery>>>,
}

impl SignalTarget for RecordingTarget {
    fn signal(&self, event: NotificationEvent) {
        self.log.lock().unwrap().push((self.pid, event));
    }
}

#[derive(Default)]
pub struct RecordingTable {
    live: Mutex<BTreeSet<Pid>>,
    log: Arc<Mutex<Vec<Delivery>>>,
}

#[allow(dead_code)]
impl RecordingTable {
    pub fn with(pids: &[Pid]) -> Self {
        let table = Self::default();
        table.live.lock().unwrap().extend(pids.iter().copied());
        table
    }

    pub fn kill(&self, pid: Pid) {
        self.live.lock().unwrap().remove(&pid);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().unwrap().clone()
    }
}

impl ProcessTable for RecordingTable {
    type Task = RecordingTarget;

    fn find(&self, pid: Pid) -> Option<RecordingTarget> {
        self.live.lock().unwrap().contains(&pid).then(|| RecordingTarget {
            pid,
            log: Arc::clone(&self.log),
        })
    }
}

// ── Session helpers ───────────────────────────────────────────

pub type SimSession = DriverSession<SimPins, Arc<RecordingTable>>;

pub struct Rig {
    pub pins: Arc<SimPins>,
    pub table: Arc<RecordingTable>,
    pub session: SimSession,
    pub config: DriverConfig,
}

pub fn open_with(config: DriverConfig, pids: &[Pid]) -> Rig {
    let pins = Arc::new(SimPins::new());
    let table = Arc::new(RecordingTable::with(pids));
    let session =
        DriverSession::open(config.clone(), Arc::clone(&pins), Arc::clone(&table)).unwrap();
    Rig { pins, table, session, config }
}

pub fn open(pids: &[Pid]) -> Rig {
    open_with(DriverConfig::default(), pids)
}

#[allow(dead_code)]
impl Rig {
    pub fn raise(&self) -> usize {
        self.pins.pulse(self.config.raise_pin)
    }

    pub fn lower(&self) -> usize {
        self.pins.pulse(self.config.lower_pin)
    }

    pub fn led_level(&self) -> Option<bool> {
        self.pins.level(self.config.actuator_pin)
    }

    pub fn led_writes(&self) -> usize {
        self.pins.write_count(self.config.actuator_pin)
    }
}

/// Poll `cond` until it holds or five seconds pass.
#[allow(dead_code)]
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while !cond() {
        if start.elapsed() > Duration::from_secs(5) {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    true
}
