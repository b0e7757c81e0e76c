//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to                  |
//! |------------|--------------|------------------------------|
//! | `esp_gpio` | PinPort      | ESP-IDF GPIO + ISR service   |
//! | `sim`      | PinPort      | In-memory lines (host/tests) |
//! | `mailbox`  | ProcessTable | In-firmware listener tasks   |
//! | `isr_slot` | (helper)     | ESP-IDF ISR handler lifetime |

#[cfg(target_os = "espidf")]
pub mod esp_gpio;
#[cfg(any(target_os = "espidf", test))]
pub mod isr_slot;
pub mod mailbox;
pub mod sim;
