//! LED actuator, switch interrupts and the periodic timer primitive.

pub mod actuator;
pub mod periodic;
pub mod switches;
