use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    pitch::{self, PERIOD_SECONDS},
    validate::{SchemaViolation, ViolationKind},
    vocab::{ActionResult, ActionType, BodyPart},
};

/// Match metadata needed to interpret an action table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: u64,
    pub home_team_id: u64,
    pub away_team_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<NaiveDate>,
}

impl Game {
    #[must_use]
    pub fn new(game_id: u64, home_team_id: u64, away_team_id: u64) -> Self {
        Self {
            game_id,
            home_team_id,
            away_team_id,
            competition_id: None,
            season_id: None,
            game_date: None,
        }
    }

    #[must_use]
    pub fn is_home(&self, team_id: u64) -> bool {
        self.home_team_id == team_id
    }

    #[must_use]
    pub fn has_team(&self, team_id: u64) -> bool {
        team_id == self.home_team_id || team_id == self.away_team_id
    }
}

/// One on-the-ball action in the canonical SPADL representation.
///
/// Coordinates are expressed on the standardized pitch (see [`crate::pitch`])
/// with the home team attacking left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub game_id: u64,
    #[serde(default)]
    pub original_event_id: Option<String>,
    pub action_id: usize,
    pub period_id: u8,
    pub time_seconds: f64,
    pub team_id: u64,
    pub player_id: u64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    #[serde(rename = "type_id")]
    pub action_type: ActionType,
    #[serde(rename = "result_id")]
    pub result: ActionResult,
    #[serde(rename = "bodypart_id")]
    pub bodypart: BodyPart,
}

impl Action {
    /// A shot of any kind that found the net.
    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.action_type.is_shot() && self.result == ActionResult::Success
    }

    /// An action that put the ball in the actor's own net.
    #[must_use]
    pub fn is_own_goal(&self) -> bool {
        self.result == ActionResult::OwnGoal
    }

    #[must_use]
    pub fn dx(&self) -> f64 {
        self.end_x - self.start_x
    }

    #[must_use]
    pub fn dy(&self) -> f64 {
        self.end_y - self.start_y
    }

    /// Time on a single game clock, assuming regular-length periods.
    #[must_use]
    pub fn time_seconds_overall(&self) -> f64 {
        f64::from(self.period_id.saturating_sub(1)) * PERIOD_SECONDS + self.time_seconds
    }

    /// The same action seen from the other side of the pitch.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            start_x: pitch::mirror_x(self.start_x),
            start_y: pitch::mirror_y(self.start_y),
            end_x: pitch::mirror_x(self.end_x),
            end_y: pitch::mirror_y(self.end_y),
            ..self.clone()
        }
    }

    /// Attaches the readable vocabulary names of the action's codes.
    #[must_use]
    pub fn named(&self) -> NamedAction {
        NamedAction {
            game_id: self.game_id,
            original_event_id: self.original_event_id.clone(),
            action_id: self.action_id,
            period_id: self.period_id,
            time_seconds: self.time_seconds,
            team_id: self.team_id,
            player_id: self.player_id,
            start_x: self.start_x,
            start_y: self.start_y,
            end_x: self.end_x,
            end_y: self.end_y,
            type_id: self.action_type,
            result_id: self.result,
            bodypart_id: self.bodypart,
            type_name: self.action_type.name().to_owned(),
            result_name: self.result.name().to_owned(),
            bodypart_name: self.bodypart.name().to_owned(),
        }
    }
}

/// An action together with the names of its type, result and body part.
///
/// This is the persisted row format. The struct is kept flat so that it maps
/// one-to-one onto table columns; the names are redundant with the codes and
/// are checked against them when a row is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAction {
    pub game_id: u64,
    #[serde(default)]
    pub original_event_id: Option<String>,
    pub action_id: usize,
    pub period_id: u8,
    pub time_seconds: f64,
    pub team_id: u64,
    pub player_id: u64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub type_id: ActionType,
    pub result_id: ActionResult,
    pub bodypart_id: BodyPart,
    pub type_name: String,
    pub result_name: String,
    pub bodypart_name: String,
}

impl NamedAction {
    pub fn into_action(self) -> Result<Action, ViolationKind> {
        let checks = [
            ("type_name", self.type_id.id(), self.type_id.name(), &self.type_name),
            ("result_name", self.result_id.id(), self.result_id.name(), &self.result_name),
            (
                "bodypart_name",
                self.bodypart_id.id(),
                self.bodypart_id.name(),
                &self.bodypart_name,
            ),
        ];
        for (field, code, expected, name) in checks {
            if expected != name {
                return Err(ViolationKind::NameMismatch {
                    field,
                    code,
                    name: name.clone(),
                });
            }
        }
        Ok(Action {
            game_id: self.game_id,
            original_event_id: self.original_event_id,
            action_id: self.action_id,
            period_id: self.period_id,
            time_seconds: self.time_seconds,
            team_id: self.team_id,
            player_id: self.player_id,
            start_x: self.start_x,
            start_y: self.start_y,
            end_x: self.end_x,
            end_y: self.end_y,
            action_type: self.type_id,
            result: self.result_id,
            bodypart: self.bodypart_id,
        })
    }
}

/// Attaches vocabulary names to every action of a table.
#[must_use]
pub fn add_names(actions: &[Action]) -> Vec<NamedAction> {
    actions.iter().map(Action::named).collect()
}

/// Strips and checks the vocabulary names of a persisted table.
pub fn strip_names(game_id: u64, rows: Vec<NamedAction>) -> Result<Vec<Action>, SchemaViolation> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.into_action()
                .map_err(|kind| SchemaViolation::new(game_id, index, kind))
        })
        .collect()
}

/// Mirrors the actions of the away team so that every actor attacks left to
/// right.
///
/// Applies to canonical tables only, where the home team already attacks
/// left to right.
#[must_use]
pub fn play_left_to_right(actions: &[Action], home_team_id: u64) -> Vec<Action> {
    actions
        .iter()
        .map(|action| {
            if action.team_id == home_team_id {
                action.clone()
            } else {
                action.mirrored()
            }
        })
        .collect()
}
