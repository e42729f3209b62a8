//! Hobby-servo driver on a PWM channel.
//!
//! 50 Hz frame (20 ms).  The pulse width maps linearly from 544 µs at 0°
//! to 2400 µs at 180°.  On the device the channel is an LEDC driver with
//! 14-bit resolution; anything implementing `SetDutyCycle` works.

use embedded_hal::pwm::SetDutyCycle;

pub const MIN_PULSE_US: u32 = 544;
pub const MAX_PULSE_US: u32 = 2400;
pub const MAX_ANGLE_DEG: u32 = 180;
const PERIOD_US: u32 = 1_000_000 / crate::pins::SERVO_PWM_FREQ_HZ;

/// Pulse width for `angle_deg` (clamped to 0–180).
pub fn angle_to_pulse_us(angle_deg: u32) -> u32 {
    let angle = angle_deg.min(MAX_ANGLE_DEG);
    MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / MAX_ANGLE_DEG
}

pub struct ServoDriver<P: SetDutyCycle> {
    pwm: P,
    angle: Option<u32>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, angle: None }
    }

    /// Command the arm to `angle_deg`.  Out-of-range angles are clamped.
    pub fn set_angle(&mut self, angle_deg: u32) -> Result<(), P::Error> {
        let duty = self.angle_to_duty(angle_deg);
        self.pwm.set_duty_cycle(duty)?;
        self.angle = Some(angle_deg.min(MAX_ANGLE_DEG));
        Ok(())
    }

    /// Last commanded angle, if any.
    pub fn angle(&self) -> Option<u32> {
        self.angle
    }

    fn angle_to_duty(&self, angle_deg: u32) -> u16 {
        let max = u32::from(self.pwm.max_duty_cycle());
        (angle_to_pulse_us(angle_deg) * max / PERIOD_US) as u16
    }
}
