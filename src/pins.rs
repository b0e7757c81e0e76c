//! Default GPIO line assignments for the LED board.
//!
//! Single source of truth for the defaults used by
//! [`DriverConfig`](crate::config::DriverConfig).  Deployments override
//! them through configuration rather than by editing drivers.

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// Digital output driving the LED (active HIGH).
pub const LED_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// Start / stop switch board (rising-edge, pull-down)
// ---------------------------------------------------------------------------

/// Momentary switch that turns the LED on.
pub const START_SWITCH_GPIO: i32 = 17;
/// Momentary switch that turns the LED off.
pub const STOP_SWITCH_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// On / off switch board (falling-edge, pull-up)
// ---------------------------------------------------------------------------

pub const ON_SWITCH_GPIO: i32 = 24;
pub const OFF_SWITCH_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Blink timing
// ---------------------------------------------------------------------------

/// Slow blink: 1/8 s per phase.
pub const BLINK_SLOW_MS: u32 = 125;
/// Fast blink: 1/100 s per phase.
pub const BLINK_FAST_MS: u32 = 10;
