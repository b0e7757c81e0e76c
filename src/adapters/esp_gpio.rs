//! ESP-IDF GPIO adapter.
//!
//! Implements [`PinPort`] with raw `esp_idf_svc::sys` calls.  Edge handlers
//! go through the per-pin ISR service: each claimed input line gets the
//! shared [`edge_trampoline`] with a pointer to its boxed [`IsrSlot`] as the
//! argument.  The slot stays in `handlers` until the line is released.
//! Release unhooks the interrupt, then drains the slot so a handler still
//! running on the other core finishes before the box drops.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use esp_idf_svc::sys::*;
use log::{debug, info};

use super::isr_slot::IsrSlot;
use crate::app::ports::{Edge, EdgeHandler, LineId, PinPort};
use crate::error::HwError;

#[derive(Default)]
pub struct EspPins {
    claimed: Mutex<BTreeSet<LineId>>,
    handlers: Mutex<BTreeMap<LineId, Box<IsrSlot>>>,
}

/// Longer than the ISR dispatch latency on either core.
const ISR_SETTLE: Duration = Duration::from_millis(1);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

unsafe extern "C" fn edge_trampoline(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` was produced from a `Box<IsrSlot>` held in
    // `EspPins::handlers`; release removes the interrupt and drains the slot
    // before that box drops.
    let slot = unsafe { &*(arg as *const IsrSlot) };
    slot.enter();
}

fn intr_type(edge: Edge) -> gpio_int_type_t {
    match edge {
        Edge::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
        Edge::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
        Edge::Both => gpio_int_type_t_GPIO_INTR_ANYEDGE,
    }
}

impl EspPins {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(&self, line: LineId) -> Result<(), HwError> {
        if line < 0 || line >= gpio_num_t_GPIO_NUM_MAX as LineId {
            return Err(HwError::LineUnavailable(line));
        }
        if !lock(&self.claimed).insert(line) {
            return Err(HwError::LineUnavailable(line));
        }
        Ok(())
    }

    fn unreserve(&self, line: LineId) {
        lock(&self.claimed).remove(&line);
    }
}

impl PinPort for EspPins {
    fn claim_output(
        &self,
        line: LineId,
        label: &'static str,
        initial: bool,
    ) -> Result<(), HwError> {
        self.reserve(line)?;
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << line,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: `line` is in range and reserved for this adapter.
        let rc = unsafe { gpio_config(&cfg) };
        if rc != ESP_OK as i32 {
            self.unreserve(line);
            return Err(HwError::LineConfigFailed { line, rc });
        }
        self.write(line, initial);
        info!("esp_gpio: GPIO{} output '{}'", line, label);
        Ok(())
    }

    fn claim_edge_irq(
        &self,
        line: LineId,
        label: &'static str,
        edge: Edge,
        handler: EdgeHandler,
    ) -> Result<(), HwError> {
        self.reserve(line)?;
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << line,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if edge == Edge::Falling {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: if edge == Edge::Rising {
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            } else {
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            },
            intr_type: intr_type(edge),
        };

        let boxed = IsrSlot::new(handler);
        let arg = &*boxed as *const IsrSlot as *mut core::ffi::c_void;

        // SAFETY: ESP_ERR_INVALID_STATE from the ISR service install means it
        // is already installed.  `arg` stays valid until `release` removes
        // the handler.
        let rc = unsafe {
            let rc = gpio_config(&cfg);
            if rc != ESP_OK as i32 {
                rc
            } else {
                let rc = gpio_install_isr_service(0);
                if rc != ESP_OK as i32 && rc != ESP_ERR_INVALID_STATE as i32 {
                    rc
                } else {
                    gpio_isr_handler_add(line, Some(edge_trampoline), arg)
                }
            }
        };
        if rc != ESP_OK as i32 {
            self.unreserve(line);
            return Err(HwError::IrqRequestFailed { line, rc });
        }

        lock(&self.handlers).insert(line, boxed);
        // SAFETY: handler registered above.
        unsafe { gpio_intr_enable(line) };
        info!("esp_gpio: GPIO{} {:?}-edge IRQ '{}'", line, edge, label);
        Ok(())
    }

    fn write(&self, line: LineId, high: bool) {
        // SAFETY: register write on a configured output.
        unsafe { gpio_set_level(line, u32::from(high)) };
    }

    fn read(&self, line: LineId) -> bool {
        // SAFETY: register read.
        (unsafe { gpio_get_level(line) }) != 0
    }

    fn release(&self, line: LineId) {
        let slot = lock(&self.handlers).remove(&line);
        if let Some(slot) = slot {
            // SAFETY: disables and unhooks the interrupt before the slot it
            // points to is drained and dropped below.
            unsafe {
                gpio_intr_disable(line);
                gpio_isr_handler_remove(line);
            }
            slot.drain(ISR_SETTLE);
        }
        // SAFETY: returns the pin to its reset state.
        unsafe { gpio_reset_pin(line) };
        self.unreserve(line);
        debug!("esp_gpio: GPIO{} released", line);
    }
}
