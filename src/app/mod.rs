//! Application core: the device-session surface and its ports.
//!
//! The session shell translates read / write / control calls into
//! operations on the blink scheduler, subscriber registry and interrupt
//! dispatcher.  All interaction with hardware happens through the **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod session;
