//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the servo, the USB power switch and the blocking delay provider,
//! exposing them through [`ActuatorPort`], [`HoldPort`] and [`SystemPort`].
//! Generic over the `embedded-hal` traits: LEDC / GPIO / FreeRTOS delay on
//! the device, mocks in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::{error, warn};

use crate::app::ports::{ActuatorPort, HoldPort, SystemPort};
use crate::drivers::servo::ServoDriver;
use crate::drivers::usb_switch::UsbSwitch;

/// Concrete adapter that combines all actuators behind port traits.
pub struct HardwareAdapter<S: SetDutyCycle, U: OutputPin, D: DelayNs> {
    servo: ServoDriver<S>,
    usb: UsbSwitch<U>,
    delay: D,
    /// Host builds: restarts requested so far.
    restart_requests: u32,
}

impl<S: SetDutyCycle, U: OutputPin, D: DelayNs> HardwareAdapter<S, U, D> {
    pub fn new(servo: ServoDriver<S>, usb: UsbSwitch<U>, delay: D) -> Self {
        Self {
            servo,
            usb,
            delay,
            restart_requests: 0,
        }
    }

    pub fn servo(&self) -> &ServoDriver<S> {
        &self.servo
    }

    pub fn usb(&self) -> &UsbSwitch<U> {
        &self.usb
    }

    pub fn restart_requests(&self) -> u32 {
        self.restart_requests
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S: SetDutyCycle, U: OutputPin, D: DelayNs> ActuatorPort for HardwareAdapter<S, U, D> {
    fn move_servo(&mut self, angle_deg: u32) {
        if let Err(e) = self.servo.set_angle(angle_deg) {
            warn!("servo: set_angle({angle_deg}) failed: {e:?}");
        }
    }

    fn set_usb_power(&mut self, on: bool) {
        if let Err(e) = self.usb.set(on) {
            warn!("usb switch: set({on}) failed: {e:?}");
        }
    }
}

// ── HoldPort implementation ───────────────────────────────────

impl<S: SetDutyCycle, U: OutputPin, D: DelayNs> HoldPort for HardwareAdapter<S, U, D> {
    fn hold_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

// ── SystemPort implementation ─────────────────────────────────

impl<S: SetDutyCycle, U: OutputPin, D: DelayNs> SystemPort for HardwareAdapter<S, U, D> {
    fn restart(&mut self) {
        self.restart_requests = self.restart_requests.saturating_add(1);
        error!("Restarting");
        #[cfg(target_os = "espidf")]
        esp_idf_hal::reset::restart();
    }
}
