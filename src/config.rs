//! Driver configuration parameters
//!
//! Line assignments, trigger edges and the blink period.  Defaults come
//! from [`pins`](crate::pins); deployments override them with a JSON
//! document or a persisted postcard blob.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::{Edge, LineId};
use crate::error::{Error, Result};
use crate::pins;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    // --- Timing ---
    /// Blink half-period in milliseconds (time between toggles)
    pub blink_interval_ms: u32,

    // --- Lines ---
    /// Output line driving the LED
    pub actuator_pin: LineId,
    /// Input line whose edge turns the LED on
    pub raise_pin: LineId,
    /// Input line whose edge turns the LED off
    pub lower_pin: LineId,

    // --- Triggers ---
    pub raise_edge: Edge,
    pub lower_edge: Edge,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            blink_interval_ms: pins::BLINK_SLOW_MS, // 8 Hz toggle

            actuator_pin: pins::LED_GPIO,
            raise_pin: pins::START_SWITCH_GPIO,
            lower_pin: pins::STOP_SWITCH_GPIO,

            raise_edge: Edge::Rising,
            lower_edge: Edge::Rising,
        }
    }
}

impl DriverConfig {
    /// On/off switch board with pull-ups and the fast blink period.
    pub fn signal_variant() -> Self {
        Self {
            blink_interval_ms: pins::BLINK_FAST_MS,
            actuator_pin: pins::LED_GPIO,
            raise_pin: pins::ON_SWITCH_GPIO,
            lower_pin: pins::OFF_SWITCH_GPIO,
            raise_edge: Edge::Falling,
            lower_edge: Edge::Falling,
        }
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.blink_interval_ms))
    }

    /// Reject values the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.blink_interval_ms == 0 {
            return Err(Error::Config("blink_interval_ms must be > 0"));
        }
        if self.actuator_pin < 0 || self.raise_pin < 0 || self.lower_pin < 0 {
            return Err(Error::Config("GPIO line numbers must be non-negative"));
        }
        if self.actuator_pin == self.raise_pin
            || self.actuator_pin == self.lower_pin
            || self.raise_pin == self.lower_pin
        {
            return Err(Error::Config("GPIO lines must be distinct"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("invalid JSON config"))?;
        config.validate()?;
        Ok(config)
    }

    /// Encode to the compact persisted form.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("config encode failed"))
    }

    /// Decode and validate the compact persisted form.
    pub fn from_blob(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("corrupted config blob"))?;
        config.validate()?;
        Ok(config)
    }
}
