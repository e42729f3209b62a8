//! GPIO / peripheral pin assignments for the M5 Atom Lite carrier.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers.  `main` takes the matching `Gpio` peripherals.

// ---------------------------------------------------------------------------
// Servo (SG90 class, 50 Hz PWM on LEDC timer 0 / channel 0)
// ---------------------------------------------------------------------------

pub const SERVO_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// USB power switch (high-side load switch, active HIGH)
// ---------------------------------------------------------------------------

pub const USB_SWITCH_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// User button (front button, active-low, external pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 39;

// ---------------------------------------------------------------------------
// Local console (UART1 on the Grove port)
// ---------------------------------------------------------------------------

pub const SERIAL_RX_GPIO: i32 = 32;
pub const SERIAL_TX_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
