//! Function-pointer action dispatcher.
//!
//! Classic embedded dispatch-table pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ActionTable (indexed by PendingAction)      │
//! │  ┌────────────────┬─────────────────────────┐│
//! │  │ PendingAction  │ handler                 ││
//! │  ├────────────────┼─────────────────────────┤│
//! │  │ NoAction       │ fn(ctx) -> Option<next> ││
//! │  │ SingleClick    │ fn(ctx) -> Option<next> ││
//! │  │ …              │ …                       ││
//! │  │ PrintHelp      │ fn(ctx) -> Option<next> ││
//! │  └────────────────┴─────────────────────────┘│
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The externally visible "state" is simply the action being executed.
//! Between ticks the dispatcher is idle (`NoAction`).  A handler fills the
//! context's plan with side effects and may return a follow-up action to
//! be posted back into the mailbox.

pub mod actions;
pub mod context;

use context::FsmContext;
use log::debug;

use crate::events::PendingAction;

// ---------------------------------------------------------------------------
// Function-pointer type alias
// ---------------------------------------------------------------------------

/// Handler signature.  Returns `Some(next)` to re-post an action.
pub type ActionHandlerFn = fn(&mut FsmContext) -> Option<PendingAction>;

// ---------------------------------------------------------------------------
// Action descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single action.
/// Stored in a fixed-size array, no heap, no `dyn`.
pub struct ActionDescriptor {
    pub action: PendingAction,
    pub name: &'static str,
    pub handler: ActionHandlerFn,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `PendingAction as usize`.
    table: [ActionDescriptor; PendingAction::COUNT],
    /// Action currently being executed; `NoAction` between ticks.
    current: PendingAction,
    /// Non-idle actions dispatched since boot.
    dispatched: u64,
}

impl Fsm {
    pub fn new(table: [ActionDescriptor; PendingAction::COUNT]) -> Self {
        debug_assert!(
            table
                .iter()
                .enumerate()
                .all(|(i, d)| d.action as usize == i),
            "action table out of order"
        );
        Self {
            table,
            current: PendingAction::NoAction,
            dispatched: 0,
        }
    }

    /// Run the handler for `action` against `ctx`.
    ///
    /// Clears the previous plan first.  The dispatcher stays in `action`
    /// until [`finish`](Self::finish) is called, i.e. until the plan has
    /// been applied.
    pub fn dispatch(&mut self, action: PendingAction, ctx: &mut FsmContext) -> Option<PendingAction> {
        ctx.plan.clear();
        self.current = action;
        let descriptor = &self.table[action as usize];
        if action != PendingAction::NoAction {
            self.dispatched += 1;
            debug!("FSM: executing {} (arg={})", descriptor.name, ctx.pending_value);
        }
        (descriptor.handler)(ctx)
    }

    /// Return to idle after the plan has run.
    pub fn finish(&mut self) {
        self.current = PendingAction::NoAction;
    }

    pub fn current_action(&self) -> PendingAction {
        self.current
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Human-readable name of `action`.
    pub fn name_of(&self, action: PendingAction) -> &'static str {
        self.table[action as usize].name
    }
}
