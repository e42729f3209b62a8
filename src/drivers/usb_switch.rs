//! USB power switch on a single GPIO (high = on).

use embedded_hal::digital::OutputPin;

pub struct UsbSwitch<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> UsbSwitch<P> {
    /// Take the pin and drive it low.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
