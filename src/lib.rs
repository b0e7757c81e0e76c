//! gpioled driver library.
//!
//! LED output driven by a blink timer and two edge-triggered switches, with
//! a single subscriber notified of switch-driven changes.  All platform
//! access goes through the port traits in [`app::ports`]; ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod blink;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod registry;
