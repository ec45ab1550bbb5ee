//! Standardized pitch reference frame.
//!
//! All canonical coordinates live in a `FIELD_LENGTH` × `FIELD_WIDTH` metre
//! rectangle with the origin at the bottom-left corner. In the canonical
//! frame the home team attacks from left to right in every period.

/// Length of the standardized pitch in metres (x axis).
pub const FIELD_LENGTH: f64 = 105.0;

/// Width of the standardized pitch in metres (y axis).
pub const FIELD_WIDTH: f64 = 68.0;

/// Centre of the goal attacked by a team playing left to right.
pub const GOAL_X: f64 = FIELD_LENGTH;
pub const GOAL_Y: f64 = FIELD_WIDTH / 2.0;

/// Duration of a regular period, used to place actions on a single game clock.
pub const PERIOD_SECONDS: f64 = 45.0 * 60.0;

/// Highest valid `period_id` (two halves, two extra-time halves, shoot-out).
pub const MAX_PERIOD: u8 = 5;

#[must_use]
pub fn mirror_x(x: f64) -> f64 {
    FIELD_LENGTH - x
}

#[must_use]
pub fn mirror_y(y: f64) -> f64 {
    FIELD_WIDTH - y
}

#[must_use]
pub fn contains_x(x: f64) -> bool {
    (0.0..=FIELD_LENGTH).contains(&x)
}

#[must_use]
pub fn contains_y(y: f64) -> bool {
    (0.0..=FIELD_WIDTH).contains(&y)
}
