//! Action handlers and the dispatch table builder.
//!
//! Every handler is a plain `fn(&mut FsmContext) -> Option<PendingAction>`.
//! Handlers only mutate the context and append [`Step`]s to its plan; the
//! service applies the plan against real (or mock) hardware afterwards.

use log::{info, warn};

use super::ActionDescriptor;
use super::context::{FsmContext, Step};
use crate::app::events::Report;
use crate::config::Field;
use crate::events::PendingAction;
use crate::validator;

// ---------------------------------------------------------------------------
// Table builder
// ---------------------------------------------------------------------------

/// Build the dispatch table, indexed by `PendingAction as usize`.
pub fn build_action_table() -> [ActionDescriptor; PendingAction::COUNT] {
    use PendingAction::*;
    let row = |action, name, handler| ActionDescriptor {
        action,
        name,
        handler,
    };
    [
        row(NoAction, "NoAction", no_action),
        row(SingleClick, "SingleClick", stop),
        row(DoubleClick, "DoubleClick", stop),
        row(TripleClick, "TripleClick", stop),
        row(LongClickStart, "LongClickStart", start_periodic),
        row(TimerTick, "TimerTick", timer_tick),
        row(TimerOnce, "TimerOnce", timer_once),
        row(UsbOn, "UsbOn", usb_on),
        row(UsbOff, "UsbOff", usb_off),
        row(SetInitAngle, "SetInitAngle", set_init_angle),
        row(SetPushAngle, "SetPushAngle", set_push_angle),
        row(SetWidth, "SetWidth", set_width),
        row(SetInterval, "SetInterval", set_interval),
        row(Reset, "Reset", reset),
        row(PrintSettings, "PrintSettings", print_settings),
        row(PrintHelp, "PrintHelp", print_help),
    ]
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn no_action(_ctx: &mut FsmContext) -> Option<PendingAction> {
    None
}

/// Single, double and triple click all mean "stop".
fn stop(ctx: &mut FsmContext) -> Option<PendingAction> {
    let total = ctx.counters.total;
    ctx.push_step(Step::DisarmTimer);
    ctx.emit(Report::Stopped { total });
    ctx.counters.reset();
    ctx.timer_armed = false;
    info!("Stopped after {total} cycles");
    None
}

fn start_periodic(ctx: &mut FsmContext) -> Option<PendingAction> {
    let period = ctx.config.period_ms();
    ctx.counters.reset();
    ctx.push_step(Step::ArmTimer(period));
    ctx.emit(Report::Starting);
    ctx.timer_armed = true;
    info!("Periodic actuation armed: period={period}ms");
    None
}

fn timer_tick(ctx: &mut FsmContext) -> Option<PendingAction> {
    ctx.push_pulse_cycle();
    // Counts the pulse just made, so the first tick reports 1.
    ctx.counters.total = ctx.counters.total.saturating_add(1);
    ctx.emit(Report::PulseCount(ctx.counters.total));
    None
}

fn timer_once(ctx: &mut FsmContext) -> Option<PendingAction> {
    ctx.push_pulse_cycle();
    None
}

fn switch_usb(ctx: &mut FsmContext, on: bool) -> Option<PendingAction> {
    ctx.push_step(Step::UsbPower(on));
    ctx.emit(Report::UsbPower(on));
    ctx.usb_on = on;
    None
}

fn usb_on(ctx: &mut FsmContext) -> Option<PendingAction> {
    switch_usb(ctx, true)
}

fn usb_off(ctx: &mut FsmContext) -> Option<PendingAction> {
    switch_usb(ctx, false)
}

/// Validate `pending_value` for `field`; commit and acknowledge, or reject.
fn apply_setting(ctx: &mut FsmContext, field: Field) -> Option<PendingAction> {
    match validator::validate(field, &ctx.config, ctx.pending_value) {
        Ok(value) => {
            ctx.config.apply(field, value);
            ctx.emit(Report::Accepted(field));
            info!("{field} = {value}");
            // The arm rests at the init angle, so move it there now.
            if field == Field::InitAngle {
                ctx.push_step(Step::MoveServo(value));
            }
        }
        Err(e) => {
            warn!("Rejected: {e}");
            ctx.emit(Report::Rejected(e));
        }
    }
    None
}

fn set_init_angle(ctx: &mut FsmContext) -> Option<PendingAction> {
    apply_setting(ctx, Field::InitAngle)
}

fn set_push_angle(ctx: &mut FsmContext) -> Option<PendingAction> {
    apply_setting(ctx, Field::PushAngle)
}

fn set_width(ctx: &mut FsmContext) -> Option<PendingAction> {
    apply_setting(ctx, Field::PulseWidth)
}

fn set_interval(ctx: &mut FsmContext) -> Option<PendingAction> {
    apply_setting(ctx, Field::Interval)
}

/// Restart, and keep `Reset` pending in case the restart returns.
fn reset(ctx: &mut FsmContext) -> Option<PendingAction> {
    warn!("Reset requested");
    ctx.push_step(Step::Restart);
    Some(PendingAction::Reset)
}

fn print_settings(ctx: &mut FsmContext) -> Option<PendingAction> {
    ctx.emit(Report::Settings(ctx.config));
    None
}

fn print_help(ctx: &mut FsmContext) -> Option<PendingAction> {
    ctx.emit(Report::Help);
    None
}
