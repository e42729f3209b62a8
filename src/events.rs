//! Interrupt-safe single-slot action mailbox.
//!
//! Actions are produced by:
//! - the periodic hardware timer callback (`TimerTick`)
//! - the button click classifier (`SingleClick` … `LongClickStart`)
//! - the console interpreter (everything else, plus a numeric argument)
//!
//! and consumed by [`PushService::tick`](crate::app::service::PushService::tick),
//! which drains the slot once per main-loop iteration.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer cb    │────▶│              │     │              │
//! │ Button      │────▶│   Mailbox    │────▶│ PushService  │
//! │ Console     │────▶│  (1 slot)    │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The slot holds at most one action.  A post always overwrites; there is
//! no queue and no backpressure.  If two posts land before the next drain
//! only the second is ever executed.  Such overwrites are counted so the
//! race stays visible instead of silent.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// The single unit of work the controller may execute next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PendingAction {
    NoAction = 0,
    SingleClick = 1,
    DoubleClick = 2,
    TripleClick = 3,
    LongClickStart = 4,
    TimerTick = 5,
    TimerOnce = 6,
    UsbOn = 7,
    UsbOff = 8,
    SetInitAngle = 9,
    SetPushAngle = 10,
    SetWidth = 11,
    SetInterval = 12,
    Reset = 13,
    PrintSettings = 14,
    PrintHelp = 15,
}

impl PendingAction {
    /// Number of variants, used to size the dispatch table.
    pub const COUNT: usize = 16;

    /// Every action in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NoAction,
        Self::SingleClick,
        Self::DoubleClick,
        Self::TripleClick,
        Self::LongClickStart,
        Self::TimerTick,
        Self::TimerOnce,
        Self::UsbOn,
        Self::UsbOff,
        Self::SetInitAngle,
        Self::SetPushAngle,
        Self::SetWidth,
        Self::SetInterval,
        Self::Reset,
        Self::PrintSettings,
        Self::PrintHelp,
    ];

    /// Convert a table index back to an action.  Out-of-range indices map
    /// to `NoAction` (debug builds assert).
    pub fn from_index(idx: usize) -> Self {
        if let Some(action) = Self::ALL.get(idx) {
            *action
        } else {
            debug_assert!(false, "invalid action index: {idx}");
            Self::NoAction
        }
    }
}

/// One drained slot: the action plus the scratch argument at drain time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub action: PendingAction,
    pub argument: i32,
}

#[derive(Clone, Copy)]
struct SlotState {
    action: PendingAction,
    /// Numeric scratch register shared by the four setter actions.
    argument: i32,
    overwrites: u32,
}

/// Single-slot, overwrite-on-post, drain-on-read channel.
///
/// Every access is one short critical section, so posting is safe from
/// timer callbacks and ISRs as well as from the main loop.
pub struct Mailbox {
    slot: Mutex<CriticalSectionRawMutex, Cell<SlotState>>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(SlotState {
                action: PendingAction::NoAction,
                argument: 0,
                overwrites: 0,
            })),
        }
    }

    /// Replace whatever is pending with `action`.
    pub fn post(&self, action: PendingAction) {
        self.slot.lock(|cell| {
            let mut s = cell.get();
            if s.action != PendingAction::NoAction {
                s.overwrites = s.overwrites.wrapping_add(1);
            }
            s.action = action;
            cell.set(s);
        });
    }

    /// Write the scratch argument and post `action` in one critical section.
    pub fn post_with_argument(&self, action: PendingAction, argument: i32) {
        self.slot.lock(|cell| {
            let mut s = cell.get();
            if s.action != PendingAction::NoAction {
                s.overwrites = s.overwrites.wrapping_add(1);
            }
            s.action = action;
            s.argument = argument;
            cell.set(s);
        });
    }

    /// Read and clear the pending action.  `NoAction` when empty.
    pub fn drain(&self) -> PendingAction {
        self.drain_with_argument().action
    }

    /// Read and clear the pending action, together with the scratch
    /// argument.  The argument itself is never cleared.
    pub fn drain_with_argument(&self) -> Delivery {
        self.slot.lock(|cell| {
            let mut s = cell.get();
            let delivery = Delivery {
                action: s.action,
                argument: s.argument,
            };
            s.action = PendingAction::NoAction;
            cell.set(s);
            delivery
        })
    }

    /// Look at the pending action without consuming it.
    pub fn peek(&self) -> PendingAction {
        self.slot.lock(|cell| cell.get().action)
    }

    /// Current scratch argument.
    pub fn argument(&self) -> i32 {
        self.slot.lock(|cell| cell.get().argument)
    }

    /// Number of posts that replaced an undrained action.
    pub fn overwrites(&self) -> u32 {
        self.slot.lock(|cell| cell.get().overwrites)
    }
}
