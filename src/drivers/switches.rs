//! Raise / lower switch interrupt dispatcher.
//!
//! ## Hardware
//!
//! Two momentary switches on edge-triggered input lines.  The platform
//! calls the installed handler once per qualifying edge; no debouncing is
//! done here, so every bounce edge reaches the state machine.
//!
//! ## State machine
//!
//! | State | `raise` edge          | `lower` edge           |
//! |-------|-----------------------|------------------------|
//! | Off   | → On, notify `Raised` | no-op                  |
//! | On    | no-op                 | → Off, notify `Lowered`|
//!
//! Self-loops write nothing and notify nobody, which makes both switches
//! idempotent under bounce.  The transition and the notification happen in
//! one critical section with the blink timer's toggle.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use log::info;

use crate::app::events::NotificationEvent;
use crate::app::ports::{EdgeHandler, LineId, PinPort, SignalTarget};
use crate::config::DriverConfig;
use crate::drivers::actuator::Actuator;
use crate::error::HwError;
use crate::registry::SubscriberRegistry;

/// Logical switch identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchLine {
    Raise,
    Lower,
}

impl SwitchLine {
    /// LED state this switch drives towards.
    pub const fn target(self) -> bool {
        matches!(self, Self::Raise)
    }

    pub const fn event(self) -> NotificationEvent {
        match self {
            Self::Raise => NotificationEvent::Raised,
            Self::Lower => NotificationEvent::Lowered,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Raise => "switch raise",
            Self::Lower => "switch lower",
        }
    }
}

/// Raw edges seen per line, transitions or not.
#[derive(Default)]
struct EdgeCounters {
    raise: AtomicU32,
    lower: AtomicU32,
}

impl EdgeCounters {
    fn slot(&self, line: SwitchLine) -> &AtomicU32 {
        match line {
            SwitchLine::Raise => &self.raise,
            SwitchLine::Lower => &self.lower,
        }
    }
}

/// Apply one switch edge.  Returns the notification sent, if the edge
/// changed the LED.
///
/// Restricted-context safe.
pub fn handle_edge<P: PinPort, T: SignalTarget>(
    line: SwitchLine,
    actuator: &Actuator<P>,
    registry: &SubscriberRegistry<T>,
) -> Option<NotificationEvent> {
    let event = line.event();
    actuator
        .transition_then(line.target(), || registry.notify(event))
        .then_some(event)
}

pub struct InterruptDispatcher<P: PinPort> {
    port: Arc<P>,
    raise_line: LineId,
    lower_line: LineId,
    counters: Arc<EdgeCounters>,
    attached: AtomicBool,
}

impl<P: PinPort> InterruptDispatcher<P> {
    /// Claim both switch lines and install their handlers.  Either both
    /// lines end up attached or neither does.
    pub fn attach<T: SignalTarget>(
        port: Arc<P>,
        config: &DriverConfig,
        actuator: &Arc<Actuator<P>>,
        registry: &Arc<SubscriberRegistry<T>>,
    ) -> Result<Self, HwError> {
        let counters = Arc::new(EdgeCounters::default());
        let handler = |line: SwitchLine| -> EdgeHandler {
            let actuator = Arc::clone(actuator);
            let registry = Arc::clone(registry);
            let counters = Arc::clone(&counters);
            Box::new(move || {
                counters.slot(line).fetch_add(1, Ordering::Relaxed);
                handle_edge(line, &actuator, &registry);
            })
        };

        port.claim_edge_irq(
            config.raise_pin,
            SwitchLine::Raise.label(),
            config.raise_edge,
            handler(SwitchLine::Raise),
        )?;
        if let Err(e) = port.claim_edge_irq(
            config.lower_pin,
            SwitchLine::Lower.label(),
            config.lower_edge,
            handler(SwitchLine::Lower),
        ) {
            port.release(config.raise_pin);
            return Err(e);
        }

        info!(
            "Switches: raise=GPIO{} ({:?}) lower=GPIO{} ({:?})",
            config.raise_pin, config.raise_edge, config.lower_pin, config.lower_edge
        );
        Ok(Self {
            port,
            raise_line: config.raise_pin,
            lower_line: config.lower_pin,
            counters,
            attached: AtomicBool::new(true),
        })
    }

    /// Release both lines.  Once this returns neither handler runs again.
    /// Idempotent.
    pub fn detach(&self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            self.port.release(self.raise_line);
            self.port.release(self.lower_line);
            info!("Switches: detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Raw edges delivered on `line` since attach.
    pub fn edge_count(&self, line: SwitchLine) -> u32 {
        self.counters.slot(line).load(Ordering::Relaxed)
    }
}

impl<P: PinPort> Drop for InterruptDispatcher<P> {
    fn drop(&mut self) {
        self.detach();
    }
}
