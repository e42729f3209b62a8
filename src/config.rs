//! System configuration parameters
//!
//! [`PushConfig`] holds the operator-tunable actuation parameters.
//! [`BoardConfig`] holds the fixed wiring and console settings.
//! Nothing here is persisted: a restart always comes back with the defaults.

use core::fmt;

/// A settable [`PushConfig`] field, as named on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    InitAngle,
    PushAngle,
    PulseWidth,
    Interval,
}

impl Field {
    /// Console keyword that proposes a new value for this field.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::InitAngle => "init",
            Self::PushAngle => "push",
            Self::PulseWidth => "width",
            Self::Interval => "interval",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Actuation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConfig {
    /// Rest position of the arm (degrees).
    pub init_angle: u32,
    /// Pressed position of the arm (degrees).
    pub push_angle: u32,
    /// Full push-and-return cycle time (milliseconds).
    pub pulse_width_ms: u32,
    /// Idle gap between automatic cycles (milliseconds).
    pub interval_ms: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            init_angle: 85,
            push_angle: 65,
            pulse_width_ms: 800,
            interval_ms: 0,
        }
    }
}

impl PushConfig {
    /// Periodic timer period: one pulse plus the idle interval.
    pub fn period_ms(&self) -> u32 {
        self.pulse_width_ms.saturating_add(self.interval_ms)
    }

    /// Time spent at each end of a pulse cycle.
    pub fn half_width_ms(&self) -> u32 {
        self.pulse_width_ms / 2
    }

    /// Current value of `field`.
    pub fn get(&self, field: Field) -> u32 {
        match field {
            Field::InitAngle => self.init_angle,
            Field::PushAngle => self.push_angle,
            Field::PulseWidth => self.pulse_width_ms,
            Field::Interval => self.interval_ms,
        }
    }

    /// Commit an already-validated value.
    pub fn apply(&mut self, field: Field, value: u32) {
        match field {
            Field::InitAngle => self.init_angle = value,
            Field::PushAngle => self.push_angle = value,
            Field::PulseWidth => self.pulse_width_ms = value,
            Field::Interval => self.interval_ms = value,
        }
    }
}

/// Board wiring and console settings (M5 Atom Lite).
#[derive(Debug, Clone)]
pub struct BoardConfig {
    // --- Local serial console ---
    pub serial_baud: u32,
    pub serial_rx_gpio: i32,
    pub serial_tx_gpio: i32,

    // --- Network console ---
    pub telnet_port: u16,

    // --- Timing ---
    /// Settle time after the servo is first positioned at boot.
    pub boot_settle_ms: u32,
    /// Idle delay at the end of every main-loop iteration.
    pub loop_delay_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            serial_baud: 115_200,
            serial_rx_gpio: crate::pins::SERIAL_RX_GPIO,
            serial_tx_gpio: crate::pins::SERIAL_TX_GPIO,
            telnet_port: 23,
            boot_settle_ms: 500,
            loop_delay_ms: 1,
        }
    }
}

/// Station credentials baked in at build time.
///
/// Returns `None` when the firmware was built without them.
pub fn wifi_credentials() -> Option<(&'static str, &'static str)> {
    let ssid = option_env!("AUTOPUSH_WIFI_SSID")?;
    let pass = option_env!("AUTOPUSH_WIFI_PASS").unwrap_or("");
    Some((ssid, pass))
}
