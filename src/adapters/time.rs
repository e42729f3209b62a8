//! Millisecond uptime clock for the button classifier.
//!
//! The device reads the ESP-IDF high-resolution timer; host builds measure
//! from construction with `Instant`.  Either way the value is monotonic and
//! wraps as a `u32` after ~49 days, which the classifier tolerates
//! (it only ever subtracts with `wrapping_sub`).

pub struct UptimeClock {
    #[cfg(not(target_os = "espidf"))]
    origin: std::time::Instant,
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn micros(&self) -> u64 {
        // SAFETY: reads a free-running hardware counter; no preconditions.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        us.max(0) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot (device) or construction (host).
    pub fn now_ms(&self) -> u32 {
        (self.micros() / 1000) as u32
    }
}
