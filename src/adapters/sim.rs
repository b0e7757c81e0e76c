//! Simulated GPIO controller for host builds and tests.
//!
//! Implements [`PinPort`] in memory.  Output lines record their level and
//! every write; input lines keep a simulated level and the installed edge
//! handler.  [`SimPins::drive`] plays the role of the interrupt controller:
//! it applies a level change and, when the change matches the registered
//! edge, runs the handler on the calling thread.
//!
//! Handler invocation and [`PinPort::release`] take the same lock, so a
//! release waits for an in-flight handler exactly like `free_irq` does.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::app::ports::{Edge, EdgeHandler, LineId, PinPort};
use crate::error::HwError;

struct OutputLine {
    level: bool,
    writes: usize,
}

struct InputLine {
    level: bool,
    edge: Edge,
    handler: EdgeHandler,
}

/// In-memory [`PinPort`].
#[derive(Default)]
pub struct SimPins {
    outputs: Mutex<BTreeMap<LineId, OutputLine>>,
    inputs: Mutex<BTreeMap<LineId, InputLine>>,
    unavailable: Mutex<BTreeSet<LineId>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later claim of `line` fail, as if another driver owned it.
    pub fn mark_unavailable(&self, line: LineId) {
        lock(&self.unavailable).insert(line);
    }

    /// Current level of an output line, or `None` if it is not claimed.
    pub fn level(&self, line: LineId) -> Option<bool> {
        lock(&self.outputs).get(&line).map(|l| l.level)
    }

    /// Number of writes to an output line since it was claimed
    /// (including the initial level).
    pub fn write_count(&self, line: LineId) -> usize {
        lock(&self.outputs).get(&line).map_or(0, |l| l.writes)
    }

    /// Whether `line` is currently claimed as an output or an input.
    pub fn is_claimed(&self, line: LineId) -> bool {
        let is_output = lock(&self.outputs).contains_key(&line);
        is_output || lock(&self.inputs).contains_key(&line)
    }

    /// Apply a level change on an input line.  Returns `true` if the change
    /// matched the line's edge and the handler ran.
    pub fn drive(&self, line: LineId, level: bool) -> bool {
        let mut inputs = lock(&self.inputs);
        let Some(input) = inputs.get_mut(&line) else {
            return false;
        };
        let from = input.level;
        input.level = level;
        if input.edge.matches(from, level) {
            (input.handler)();
            true
        } else {
            false
        }
    }

    /// Press and release a switch: drive the line away from its idle level
    /// and back.  Returns how many times the handler ran.
    pub fn pulse(&self, line: LineId) -> usize {
        let idle = match lock(&self.inputs).get(&line) {
            Some(input) => input.edge.idle_level(),
            None => return 0,
        };
        usize::from(self.drive(line, !idle)) + usize::from(self.drive(line, idle))
    }

    fn check_free(&self, line: LineId) -> Result<(), HwError> {
        if lock(&self.unavailable).contains(&line) || self.is_claimed(line) {
            return Err(HwError::LineUnavailable(line));
        }
        Ok(())
    }
}

impl PinPort for SimPins {
    fn claim_output(
        &self,
        line: LineId,
        label: &'static str,
        initial: bool,
    ) -> Result<(), HwError> {
        self.check_free(line)?;
        lock(&self.outputs).insert(line, OutputLine { level: initial, writes: 1 });
        log::debug!("sim: GPIO {} claimed as output '{}'", line, label);
        Ok(())
    }

    fn claim_edge_irq(
        &self,
        line: LineId,
        label: &'static str,
        edge: Edge,
        handler: EdgeHandler,
    ) -> Result<(), HwError> {
        self.check_free(line)?;
        lock(&self.inputs).insert(
            line,
            InputLine {
                level: edge.idle_level(),
                edge,
                handler,
            },
        );
        log::debug!("sim: GPIO {} claimed as {:?}-edge IRQ '{}'", line, edge, label);
        Ok(())
    }

    fn write(&self, line: LineId, high: bool) {
        if let Some(out) = lock(&self.outputs).get_mut(&line) {
            out.level = high;
            out.writes += 1;
        }
    }

    fn read(&self, line: LineId) -> bool {
        if let Some(out) = lock(&self.outputs).get(&line) {
            return out.level;
        }
        lock(&self.inputs).get(&line).is_some_and(|i| i.level)
    }

    fn release(&self, line: LineId) {
        lock(&self.outputs).remove(&line);
        lock(&self.inputs).remove(&line);
    }
}
