//! Peripheral drivers: servo, USB power switch, button and periodic timer.

pub mod button;
pub mod hw_timer;
pub mod servo;
pub mod usb_switch;
