//! Polled, debounced push-button with single, multi and long click detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch (GPIO39 on the Atom Lite, external pull-up).
//! The main loop samples the level once per iteration and feeds it to
//! [`ClickClassifier::tick`], which runs the debounce + gesture state machine.
//!
//! ## Gesture detection
//!
//! | Gesture      | Condition                                    | Event                |
//! |--------------|----------------------------------------------|----------------------|
//! | Click        | Press/release, no new press within 300 ms    | `Single` (1 click)   |
//! | Double click | Two clicks, each gap < 300 ms                | `Double` (2 clicks)  |
//! | Triple click | Three or more clicks, each gap < 300 ms      | `Triple` (N clicks)  |
//! | Long click   | Held ≥ 1 s (fires while still held)          | `Long`               |
//!
//! Presses or releases shorter than 50 ms are treated as contact bounce.

use core::fmt;

use embedded_hal::digital::InputPin;

use crate::events::PendingAction;

const DEBOUNCE_MS: u32 = 50;
const MULTI_CLICK_WINDOW_MS: u32 = 300;
const LONG_CLICK_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
    Triple,
    Long,
}

/// A classified gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub kind: ClickKind,
    /// Number of presses that made up the gesture.
    pub clicks: u8,
}

impl ClickEvent {
    fn from_clicks(clicks: u8) -> Self {
        let kind = match clicks {
            0 | 1 => ClickKind::Single,
            2 => ClickKind::Double,
            _ => ClickKind::Triple,
        };
        Self {
            kind,
            clicks: clicks.max(1),
        }
    }

    fn long() -> Self {
        Self {
            kind: ClickKind::Long,
            clicks: 1,
        }
    }

    /// Mailbox action this gesture requests.
    pub fn action(&self) -> PendingAction {
        match self.kind {
            ClickKind::Single => PendingAction::SingleClick,
            ClickKind::Double => PendingAction::DoubleClick,
            ClickKind::Triple => PendingAction::TripleClick,
            ClickKind::Long => PendingAction::LongClickStart,
        }
    }
}

impl fmt::Display for ClickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ClickKind::Single => "click",
            ClickKind::Double => "double click",
            ClickKind::Triple => "triple click",
            ClickKind::Long => "long click",
        };
        write!(f, "{label} ({})", self.clicks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    /// Button down since `since_ms`; `clicks` completed presses before this one.
    Pressed { since_ms: u32, clicks: u8 },
    /// Button up since `since_ms` after `clicks` completed presses.
    Released { since_ms: u32, clicks: u8 },
    /// Long click already reported; wait for release.
    HeldLong,
}

/// Level-driven gesture classifier.  Pure: time and level are inputs.
#[derive(Debug, Clone)]
pub struct ClickClassifier {
    state: GestureState,
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickClassifier {
    pub const fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Feed one sample.  `now_ms` is monotonic milliseconds since boot.
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ClickEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::Pressed {
                        since_ms: now_ms,
                        clicks: 0,
                    };
                }
                None
            }

            GestureState::Pressed { since_ms, clicks } => {
                let held_ms = now_ms.wrapping_sub(since_ms);
                if pressed {
                    if held_ms >= LONG_CLICK_MS {
                        self.state = GestureState::HeldLong;
                        return Some(ClickEvent::long());
                    }
                    return None;
                }

                if held_ms < DEBOUNCE_MS {
                    // Bounce: forget this press.
                    self.state = if clicks == 0 {
                        GestureState::Idle
                    } else {
                        GestureState::Released {
                            since_ms: now_ms,
                            clicks,
                        }
                    };
                } else {
                    self.state = GestureState::Released {
                        since_ms: now_ms,
                        clicks: clicks.saturating_add(1),
                    };
                }
                None
            }

            GestureState::Released { since_ms, clicks } => {
                let gap_ms = now_ms.wrapping_sub(since_ms);
                if pressed && gap_ms >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed {
                        since_ms: now_ms,
                        clicks,
                    };
                    return None;
                }
                if gap_ms > MULTI_CLICK_WINDOW_MS {
                    self.state = GestureState::Idle;
                    return Some(ClickEvent::from_clicks(clicks));
                }
                None
            }

            GestureState::HeldLong => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }
}

/// Button on a digital input, active low.
pub struct ButtonDriver<I: InputPin> {
    pin: I,
    classifier: ClickClassifier,
}

impl<I: InputPin> ButtonDriver<I> {
    pub fn new(pin: I) -> Self {
        Self {
            pin,
            classifier: ClickClassifier::new(),
        }
    }

    /// Sample the pin and advance the classifier.
    pub fn poll(&mut self, now_ms: u32) -> Option<ClickEvent> {
        // A read error is treated as "not pressed".
        let pressed = self.pin.is_low().unwrap_or(false);
        self.classifier.tick(now_ms, pressed)
    }
}
