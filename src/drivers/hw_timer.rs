//! Periodic actuation timer.
//!
//! While armed, posts `TimerTick` into the mailbox once per period.
//!
//! - **espidf**: an `esp_timer` periodic timer.  The callback runs in the
//!   ESP timer task (not an ISR) and receives the mailbox through `arg`.
//! - **host**: a background thread that sleeps for the period and posts.
//!
//! Either way the callback only ever writes the mailbox.

use log::info;

use crate::app::ports::PeriodicTimerPort;
use crate::events::{Mailbox, PendingAction};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static Mailbox` passed in `PeriodicTimer::new`.
    let mailbox = unsafe { &*(arg as *const Mailbox) };
    mailbox.post(PendingAction::TimerTick);
}

/// Host stand-in for the hardware timer.
#[cfg(not(target_os = "espidf"))]
struct Worker {
    stop: std::sync::Arc<core::sync::atomic::AtomicBool>,
    handle: std::thread::JoinHandle<()>,
}

/// The periodic timer.  Owned exclusively by the controller side.
pub struct PeriodicTimer {
    mailbox: &'static Mailbox,
    period_ms: Option<u32>,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(not(target_os = "espidf"))]
    worker: Option<Worker>,
}

impl PeriodicTimer {
    /// Create the timer (disarmed).
    #[cfg(target_os = "espidf")]
    pub fn new(mailbox: &'static Mailbox) -> Result<Self, EspError> {
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::from_ref(mailbox).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"autopush".as_ptr(),
            skip_unhandled_events: true,
        };
        // SAFETY: `args` outlives the call; the mailbox is 'static.
        esp!(unsafe { esp_timer_create(&args, &mut handle) })?;
        Ok(Self {
            mailbox,
            period_ms: None,
            handle,
        })
    }

    /// Create the timer (disarmed).
    #[cfg(not(target_os = "espidf"))]
    pub fn new(mailbox: &'static Mailbox) -> Result<Self, core::convert::Infallible> {
        Ok(Self {
            mailbox,
            period_ms: None,
            worker: None,
        })
    }

    /// Current period, if armed.
    pub fn period_ms(&self) -> Option<u32> {
        self.period_ms
    }

    pub fn mailbox(&self) -> &'static Mailbox {
        self.mailbox
    }

    #[cfg(target_os = "espidf")]
    fn start(&mut self, period_ms: u32) {
        // SAFETY: handle was created in `new` and is only used from the main task.
        let rc = unsafe { esp_timer_start_periodic(self.handle, u64::from(period_ms) * 1000) };
        if rc != ESP_OK {
            log::error!("hw_timer: start failed (rc={rc})");
        }
    }

    #[cfg(target_os = "espidf")]
    fn stop(&mut self) {
        // SAFETY: as above.  Stopping an idle timer returns an error we ignore.
        unsafe {
            esp_timer_stop(self.handle);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self, period_ms: u32) {
        use core::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::{Duration, Instant};

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let mailbox = self.mailbox;
        let period = Duration::from_millis(u64::from(period_ms.max(1)));
        let handle = std::thread::spawn(move || {
            let mut next = Instant::now() + period;
            while !flag.load(Ordering::Acquire) {
                let now = Instant::now();
                if now >= next {
                    mailbox.post(PendingAction::TimerTick);
                    next += period;
                } else {
                    std::thread::sleep((next - now).min(Duration::from_millis(5)));
                }
            }
        });
        self.worker = Some(Worker { stop, handle });
    }

    #[cfg(not(target_os = "espidf"))]
    fn stop(&mut self) {
        if let Some(w) = self.worker.take() {
            w.stop.store(true, core::sync::atomic::Ordering::Release);
            let _ = w.handle.join();
        }
    }
}

impl PeriodicTimerPort for PeriodicTimer {
    fn arm(&mut self, period_ms: u32) {
        if self.period_ms.is_some() {
            self.stop();
        }
        self.start(period_ms);
        self.period_ms = Some(period_ms);
        info!("hw_timer: armed @ {period_ms}ms");
    }

    fn disarm(&mut self) {
        if self.period_ms.take().is_some() {
            self.stop();
            info!("hw_timer: disarmed");
        }
    }

    fn is_armed(&self) -> bool {
        self.period_ms.is_some()
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.disarm();
        #[cfg(target_os = "espidf")]
        self.delete();
    }
}

#[cfg(target_os = "espidf")]
impl PeriodicTimer {
    fn delete(&mut self) {
        // SAFETY: stopped by `disarm`; the handle is not used again.
        unsafe {
            esp_timer_delete(self.handle);
        }
    }
}
