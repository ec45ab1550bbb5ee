//! Schema validation of canonical action tables.

use crate::{
    action::{Action, Game},
    pitch::{self, FIELD_LENGTH, FIELD_WIDTH, MAX_PERIOD},
};

/// A raw event or action that does not satisfy the SPADL schema.
///
/// `index` is the position of the offending record in the sequence that was
/// being processed: the raw event index during conversion, the action index
/// when revalidating an action table.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("schema violation in game {game_id} at index {index}: {kind}")]
pub struct SchemaViolation {
    pub game_id: u64,
    pub index: usize,
    pub kind: ViolationKind,
}

impl SchemaViolation {
    #[must_use]
    pub fn new(game_id: u64, index: usize, kind: ViolationKind) -> Self {
        Self {
            game_id,
            index,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ViolationKind {
    #[display("unknown action type '{value}'")]
    UnknownActionType { value: String },
    #[display("unknown result '{value}'")]
    UnknownResult { value: String },
    #[display("unknown body part '{value}'")]
    UnknownBodyPart { value: String },
    #[display("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[display("field '{field}' is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[display("field '{field}' = {value} outside [0, {max}]")]
    OutOfBounds {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[display("invalid period_id {period_id}")]
    InvalidPeriod { period_id: u8 },
    #[display("negative time_seconds {time_seconds}")]
    NegativeTime { time_seconds: f64 },
    #[display("team {team_id} does not play in this game")]
    UnknownTeam { team_id: u64 },
    #[display("belongs to game {found}, expected {expected}")]
    GameMismatch { expected: u64, found: u64 },
    #[display("action_id {found}, expected {expected}")]
    ActionIdNotDense { expected: usize, found: usize },
    #[display("period {period_id} at {time_seconds}s precedes the previous action")]
    OutOfOrder { period_id: u8, time_seconds: f64 },
    #[display("{field} name '{name}' does not match code {code}")]
    NameMismatch {
        field: &'static str,
        code: u8,
        name: String,
    },
}

pub(crate) fn check_period(period_id: u8) -> Result<u8, ViolationKind> {
    if (1..=MAX_PERIOD).contains(&period_id) {
        Ok(period_id)
    } else {
        Err(ViolationKind::InvalidPeriod { period_id })
    }
}

pub(crate) fn check_time(time_seconds: f64) -> Result<f64, ViolationKind> {
    let time_seconds = check_finite("time_seconds", time_seconds)?;
    if time_seconds < 0.0 {
        return Err(ViolationKind::NegativeTime { time_seconds });
    }
    Ok(time_seconds)
}

pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<f64, ViolationKind> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ViolationKind::NonFinite { field, value })
    }
}

pub(crate) fn check_team(game: &Game, team_id: u64) -> Result<u64, ViolationKind> {
    if game.has_team(team_id) {
        Ok(team_id)
    } else {
        Err(ViolationKind::UnknownTeam { team_id })
    }
}

fn check_location(action: &Action) -> Result<(), ViolationKind> {
    let coordinates: [(&'static str, f64, f64, fn(f64) -> bool); 4] = [
        ("start_x", action.start_x, FIELD_LENGTH, pitch::contains_x),
        ("start_y", action.start_y, FIELD_WIDTH, pitch::contains_y),
        ("end_x", action.end_x, FIELD_LENGTH, pitch::contains_x),
        ("end_y", action.end_y, FIELD_WIDTH, pitch::contains_y),
    ];
    for (field, value, max, contains) in coordinates {
        check_finite(field, value)?;
        if !contains(value) {
            return Err(ViolationKind::OutOfBounds { field, value, max });
        }
    }
    Ok(())
}

fn check_action(game: &Game, index: usize, action: &Action) -> Result<(), ViolationKind> {
    if action.game_id != game.game_id {
        return Err(ViolationKind::GameMismatch {
            expected: game.game_id,
            found: action.game_id,
        });
    }
    if action.action_id != index {
        return Err(ViolationKind::ActionIdNotDense {
            expected: index,
            found: action.action_id,
        });
    }
    check_period(action.period_id)?;
    check_time(action.time_seconds)?;
    check_team(game, action.team_id)?;
    check_location(action)
}

/// Validates an action table of one game against the SPADL schema.
///
/// Checks that every action belongs to `game`, that `action_id` is the
/// dense sequence `0..n`, that `(period_id, time_seconds)` never decreases,
/// that teams are the game's teams, and that all coordinates are finite and
/// on the standardized pitch.
///
/// # Example
///
/// ```
/// use spadl::{Action, ActionResult, ActionType, BodyPart, Game, validate_actions};
///
/// let game = Game::new(1, 10, 20);
/// let action = Action {
///     game_id: 1,
///     original_event_id: None,
///     action_id: 0,
///     period_id: 1,
///     time_seconds: 0.0,
///     team_id: 10,
///     player_id: 7,
///     start_x: 52.5,
///     start_y: 34.0,
///     end_x: 40.0,
///     end_y: 30.0,
///     action_type: ActionType::Pass,
///     result: ActionResult::Success,
///     bodypart: BodyPart::Foot,
/// };
/// assert!(validate_actions(&game, &[action]).is_ok());
/// ```
pub fn validate_actions(game: &Game, actions: &[Action]) -> Result<(), SchemaViolation> {
    let mut previous: Option<(u8, f64)> = None;
    for (index, action) in actions.iter().enumerate() {
        check_action(game, index, action)
            .map_err(|kind| SchemaViolation::new(game.game_id, index, kind))?;
        if let Some((period_id, time_seconds)) = previous {
            let ordered = period_id < action.period_id
                || (period_id == action.period_id && time_seconds <= action.time_seconds);
            if !ordered {
                return Err(SchemaViolation::new(
                    game.game_id,
                    index,
                    ViolationKind::OutOfOrder {
                        period_id: action.period_id,
                        time_seconds: action.time_seconds,
                    },
                ));
            }
        }
        previous = Some((action.period_id, action.time_seconds));
    }
    Ok(())
}
