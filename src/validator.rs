//! Configuration change validator.
//!
//! One pure check per settable field.  Each takes the *current*
//! configuration (some rules are relative to another field) and the
//! proposed integer, and returns the value to commit or a
//! [`ValidationError`].  Nothing is mutated here; committing and reporting
//! are the controller's job.
//!
//! | Field     | Accepted when                         |
//! |-----------|---------------------------------------|
//! | init      | `90 ≤ v ≤ 120`                        |
//! | push      | `5 < init − v < 30`                   |
//! | width     | `v > 700`                             |
//! | interval  | `v ≥ width`                           |

use crate::config::{Field, PushConfig};
use crate::error::ValidationError;

pub const INIT_ANGLE_MIN: i32 = 90;
pub const INIT_ANGLE_MAX: i32 = 120;
/// Exclusive bounds on `init − push`.
pub const PUSH_TRAVEL_MIN: i64 = 5;
pub const PUSH_TRAVEL_MAX: i64 = 30;
/// Exclusive lower bound on the pulse width.
pub const PULSE_WIDTH_MIN_MS: i32 = 700;

pub type Verdict = Result<u32, ValidationError>;

fn reject(field: Field, value: i32) -> Verdict {
    Err(ValidationError { field, value })
}

pub fn init_angle(_current: &PushConfig, value: i32) -> Verdict {
    if (INIT_ANGLE_MIN..=INIT_ANGLE_MAX).contains(&value) {
        Ok(value as u32)
    } else {
        reject(Field::InitAngle, value)
    }
}

pub fn push_angle(current: &PushConfig, value: i32) -> Verdict {
    let travel = i64::from(current.init_angle) - i64::from(value);
    if PUSH_TRAVEL_MIN < travel && travel < PUSH_TRAVEL_MAX && value >= 0 {
        Ok(value as u32)
    } else {
        reject(Field::PushAngle, value)
    }
}

pub fn pulse_width(_current: &PushConfig, value: i32) -> Verdict {
    if value > PULSE_WIDTH_MIN_MS {
        Ok(value as u32)
    } else {
        reject(Field::PulseWidth, value)
    }
}

pub fn interval(current: &PushConfig, value: i32) -> Verdict {
    if value >= 0 && value as u32 >= current.pulse_width_ms {
        Ok(value as u32)
    } else {
        reject(Field::Interval, value)
    }
}

/// Dispatch to the rule for `field`.
pub fn validate(field: Field, current: &PushConfig, value: i32) -> Verdict {
    match field {
        Field::InitAngle => init_angle(current, value),
        Field::PushAngle => push_angle(current, value),
        Field::PulseWidth => pulse_width(current, value),
        Field::Interval => interval(current, value),
    }
}
