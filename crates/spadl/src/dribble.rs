//! Synthetic dribble actions.
//!
//! Event providers record touches, not carries: when a player receives the
//! ball and later passes it from somewhere else, the movement in between is
//! missing. A dribble is inserted for such gaps so that consecutive actions
//! of a possession connect.

use serde::{Deserialize, Serialize};

use crate::{
    action::Action,
    vocab::{ActionResult, ActionType, BodyPart},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DribbleConfig {
    /// Shorter gaps are treated as the same spot.
    pub min_length: f64,
    /// Longer gaps are not a plausible carry.
    pub max_length: f64,
    /// Gaps lasting this long or longer are not a carry.
    pub max_duration: f64,
}

impl Default for DribbleConfig {
    fn default() -> Self {
        Self {
            min_length: 3.0,
            max_length: 60.0,
            max_duration: 10.0,
        }
    }
}

impl DribbleConfig {
    fn connects(&self, prev: &Action, next: &Action) -> bool {
        if prev.team_id != next.team_id || prev.period_id != next.period_id {
            return false;
        }
        let dx = prev.end_x - next.start_x;
        let dy = prev.end_y - next.start_y;
        let distance_squared = dx * dx + dy * dy;
        let far_enough = distance_squared >= self.min_length * self.min_length;
        let not_too_far = distance_squared <= self.max_length * self.max_length;
        let duration = next.time_seconds - prev.time_seconds;
        far_enough && not_too_far && duration < self.max_duration
    }
}

fn dribble_between(prev: &Action, next: &Action) -> Action {
    Action {
        game_id: next.game_id,
        original_event_id: None,
        action_id: 0,
        period_id: next.period_id,
        time_seconds: (prev.time_seconds + next.time_seconds) / 2.0,
        team_id: next.team_id,
        player_id: next.player_id,
        start_x: prev.end_x,
        start_y: prev.end_y,
        end_x: next.start_x,
        end_y: next.start_y,
        action_type: ActionType::Dribble,
        result: ActionResult::Success,
        bodypart: BodyPart::Foot,
    }
}

/// Inserts dribbles into a chronologically ordered action table and
/// reassigns dense action ids.
///
/// Returns the new table and the number of inserted dribbles.
#[must_use]
pub fn add_dribbles(actions: Vec<Action>, config: &DribbleConfig) -> (Vec<Action>, usize) {
    let mut out = Vec::with_capacity(actions.len());
    let mut inserted = 0;
    let mut prev: Option<Action> = None;
    for action in actions {
        if let Some(prev) = &prev
            && config.connects(prev, &action)
        {
            out.push(dribble_between(prev, &action));
            inserted += 1;
        }
        prev = Some(action.clone());
        out.push(action);
    }
    for (action_id, action) in out.iter_mut().enumerate() {
        action.action_id = action_id;
    }
    (out, inserted)
}
