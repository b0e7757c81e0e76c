//! Driver session: the device-file surface.
//!
//! [`DriverSession`] owns every component and translates the four device
//! calls into operations on them:
//!
//! ```text
//!  write "<cmd>:<pid>" ──▶ parse ──▶ BlinkScheduler ──▶ SubscriberRegistry
//!  read                ──▶ status line
//!  control <n>         ──▶ log only
//!
//!  PinPort edges ──▶ InterruptDispatcher ──▶ Actuator ──▶ SubscriberRegistry
//! ```
//!
//! Components shared with restricted-context callbacks (the actuator and
//! the registry) are held behind `Arc` and handed to the dispatcher and the
//! blink job at open time.

use core::fmt::Write as _;
use std::sync::Arc;

use log::{debug, error, info, warn};

use super::commands::{self, ControlCode, Directive};
use super::ports::{Pid, PinPort, ProcessTable};
use crate::blink::BlinkScheduler;
use crate::config::DriverConfig;
use crate::drivers::actuator::Actuator;
use crate::drivers::switches::{InterruptDispatcher, SwitchLine};
use crate::error::{Error, Result};
use crate::registry::SubscriberRegistry;

/// Capacity of the status line returned by [`DriverSession::read`].
pub const STATUS_CAPACITY: usize = 64;

pub type Status = heapless::String<STATUS_CAPACITY>;

pub struct DriverSession<P: PinPort, T: ProcessTable> {
    config: DriverConfig,
    processes: T,
    actuator: Arc<Actuator<P>>,
    registry: Arc<SubscriberRegistry<T::Task>>,
    blink: BlinkScheduler<P>,
    switches: InterruptDispatcher<P>,
    closed: bool,
}

impl<P: PinPort, T: ProcessTable> DriverSession<P, T> {
    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate `config`, claim the LED output (low) and attach both
    /// switches.  On failure everything claimed so far is released.
    pub fn open(config: DriverConfig, pins: Arc<P>, processes: T) -> Result<Self> {
        config.validate().inspect_err(|e| error!("Session: {}", e))?;

        let actuator = Actuator::claim(Arc::clone(&pins), config.actuator_pin)
            .map(Arc::new)
            .map_err(|e| {
                error!("Session: LED GPIO{} claim failed: {}", config.actuator_pin, e);
                Error::from(e)
            })?;

        let registry = Arc::new(SubscriberRegistry::new());
        let switches = match InterruptDispatcher::attach(pins, &config, &actuator, &registry) {
            Ok(d) => d,
            Err(e) => {
                error!("Session: switch attach failed: {}", e);
                actuator.release();
                return Err(e.into());
            }
        };

        info!(
            "Session: opened (LED GPIO{}, blink {} ms)",
            config.actuator_pin, config.blink_interval_ms
        );
        Ok(Self {
            blink: BlinkScheduler::new(Arc::clone(&actuator)),
            config,
            processes,
            actuator,
            registry,
            switches,
            closed: false,
        })
    }

    /// Tear the session down: stop blinking, detach the switches, forget
    /// the subscriber, drive the LED low and release it.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.blink.stop();
        self.switches.detach();
        self.registry.clear();
        self.actuator.set(false);
        self.actuator.release();
        info!("Session: closed");
    }

    // ── Device calls ──────────────────────────────────────────

    /// Handle a write payload `"<cmd>:<pid>"`.  Returns the number of bytes
    /// consumed.
    ///
    /// A malformed payload changes nothing.  Otherwise the directive is
    /// applied first and the subscriber registered second; a pid that does
    /// not resolve yields [`Error::LookupFailed`] with the directive already
    /// in effect and the previous subscriber kept.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let command = commands::parse(payload)
            .inspect_err(|e| warn!("write: rejected payload ({} bytes): {}", payload.len(), e))?;

        match command.directive {
            Directive::Start => {
                self.blink.start(self.config.blink_interval())?;
                info!("write: start blinking, subscriber {}", command.pid);
            }
            Directive::Stop => {
                self.blink.stop();
                self.actuator.set(false);
                info!("write: stop blinking, subscriber {}", command.pid);
            }
        }

        self.registry
            .register(&self.processes, command.pid)
            .inspect_err(|_| warn!("write: no process {}, subscriber unchanged", command.pid))?;

        Ok(payload.len())
    }

    /// Human-readable status, e.g. `LED on, blink 125ms, subscriber 4242`.
    pub fn read(&self) -> Status {
        let mut out = Status::new();
        let led = if self.actuator.is_on() { "on" } else { "off" };
        // Worst case is well under STATUS_CAPACITY.
        let _ = write!(out, "LED {led}, ");
        let _ = match self.blink.interval() {
            Some(every) => write!(out, "blink {}ms, ", every.as_millis()),
            None => write!(out, "blink off, "),
        };
        let _ = match self.registry.current() {
            Some(pid) => write!(out, "subscriber {pid}"),
            None => write!(out, "no subscriber"),
        };
        out
    }

    /// Secondary control channel.  Codes 0-3 are acknowledged with a log
    /// line; anything else is ignored.
    pub fn control(&self, code: u32) -> Option<ControlCode> {
        let Some(decoded) = ControlCode::from_raw(code) else {
            debug!("control: ignoring code {}", code);
            return None;
        };
        info!("control: test {}", decoded.ordinal());
        Some(decoded)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn is_on(&self) -> bool {
        self.actuator.is_on()
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_active()
    }

    pub fn subscriber(&self) -> Option<Pid> {
        self.registry.current()
    }

    pub fn edge_count(&self, line: SwitchLine) -> u32 {
        self.switches.edge_count(line)
    }
}

impl<P: PinPort, T: ProcessTable> Drop for DriverSession<P, T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
