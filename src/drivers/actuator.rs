//! LED actuator driver.
//!
//! Holds the single authoritative on/off flag and mirrors it onto the
//! output line.  The flag and the line are updated inside one critical
//! section, so the blink timer, the switch ISRs and the request path never
//! interleave a read-modify-write and the line level always matches
//! [`Actuator::is_on`].
//!
//! ## Execution contexts
//!
//! Every method except [`Actuator::claim`] and [`Actuator::release`] is
//! restricted-context safe: the lock is a critical section (never a
//! sleeping acquire) and the only work done under it is a GPIO write.

use core::cell::Cell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::{LineId, PinPort};
use crate::error::HwError;

pub struct Actuator<P: PinPort> {
    port: Arc<P>,
    line: LineId,
    on: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl<P: PinPort> Actuator<P> {
    /// Claim `line` as the LED output, initially off.
    pub fn claim(port: Arc<P>, line: LineId) -> Result<Self, HwError> {
        port.claim_output(line, "LED", false)?;
        Ok(Self {
            port,
            line,
            on: Mutex::new(Cell::new(false)),
        })
    }

    pub fn is_on(&self) -> bool {
        self.on.lock(Cell::get)
    }

    /// Drive the LED to `on` unconditionally.  Returns the previous state.
    pub fn set(&self, on: bool) -> bool {
        self.on.lock(|flag| {
            self.port.write(self.line, on);
            flag.replace(on)
        })
    }

    /// Invert the LED.  Returns the new state.
    pub fn toggle(&self) -> bool {
        self.on.lock(|flag| {
            let next = !flag.get();
            self.port.write(self.line, next);
            flag.set(next);
            next
        })
    }

    /// Move to `on` only if the LED is not already there.  Returns `true`
    /// when a transition happened; a self-loop writes nothing.
    pub fn transition_to(&self, on: bool) -> bool {
        self.transition_then(on, || {})
    }

    /// Like [`transition_to`](Self::transition_to), running `on_change`
    /// inside the same critical section when the transition happens, so
    /// observers see changes in the order they were applied.
    pub fn transition_then(&self, on: bool, on_change: impl FnOnce()) -> bool {
        self.on.lock(|flag| {
            if flag.get() == on {
                return false;
            }
            self.port.write(self.line, on);
            flag.set(on);
            on_change();
            true
        })
    }

    /// Give the output line back to the platform.
    pub fn release(&self) {
        self.port.release(self.line);
    }
}
