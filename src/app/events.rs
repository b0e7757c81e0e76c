//! Outbound notifications.
//!
//! The [`InterruptDispatcher`](crate::drivers::switches::InterruptDispatcher)
//! emits these to the registered subscriber through the
//! [`SignalTarget`](super::ports::SignalTarget) port whenever a switch edge
//! changes the LED state.

use core::fmt;

/// Signal-style event delivered to the subscriber.  No payload beyond the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    /// The raise switch turned the LED on.
    Raised,
    /// The lower switch turned the LED off.
    Lowered,
}

impl NotificationEvent {
    /// POSIX signal number used by signal-based delivery
    /// (`SIGUSR2` for raised, `SIGUSR1` for lowered).
    pub const fn signal_number(self) -> i32 {
        match self {
            Self::Raised => 12,
            Self::Lowered => 10,
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raised => write!(f, "raised"),
            Self::Lowered => write!(f, "lowered"),
        }
    }
}
