use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use spadl::Action;

/// Scope inside which missing history is padded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingScope {
    /// History never reaches into a previous period; the first action of the
    /// period stands in for missing actions.
    #[default]
    Period,
    /// History runs across periods; only the first action of the game pads.
    Game,
}

/// The gamestates of all actions of one game, stored frame by frame.
///
/// Frame `k` holds, for every action `i`, the action `k` steps before it
/// (frame 0 is the action table itself). Missing history is filled with the
/// first action of the padding scope, so every frame has exactly one row per
/// action.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStates {
    frames: Vec<Vec<Action>>,
}

/// The window of one action: itself followed by its predecessors.
#[derive(Debug, Clone, Copy)]
pub struct GameState<'a> {
    states: &'a GameStates,
    index: usize,
}

impl<'a> GameState<'a> {
    /// The action `k` steps back; `action(0)` is the current action.
    #[must_use]
    pub fn action(&self, k: usize) -> &'a Action {
        &self.states.frames[k][self.index]
    }

    #[must_use]
    pub fn current(&self) -> &'a Action {
        self.action(0)
    }

    pub fn actions(self) -> impl Iterator<Item = &'a Action> {
        let index = self.index;
        self.states.frames.iter().map(move |frame| &frame[index])
    }
}

/// Builds the gamestates of every action of a game.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use spadl_vaep::{PaddingScope, gamestates};
///
/// let states = gamestates(&[], NonZeroUsize::new(3).unwrap(), PaddingScope::Period);
/// assert_eq!(states.nb_prev_actions(), 3);
/// assert!(states.is_empty());
/// ```
#[must_use]
pub fn gamestates(actions: &[Action], nb_prev_actions: NonZeroUsize, padding: PaddingScope) -> GameStates {
    let mut scope_start = Vec::with_capacity(actions.len());
    let mut start = 0;
    for (i, action) in actions.iter().enumerate() {
        if padding == PaddingScope::Period && i > 0 && actions[i - 1].period_id != action.period_id {
            start = i;
        }
        scope_start.push(start);
    }

    let frames = (0..nb_prev_actions.get())
        .map(|k| {
            scope_start
                .iter()
                .enumerate()
                .map(|(i, &start)| actions[i.saturating_sub(k).max(start)].clone())
                .collect()
        })
        .collect();
    GameStates { frames }
}

impl GameStates {
    /// Window size K, the number of frames.
    #[must_use]
    pub fn nb_prev_actions(&self) -> usize {
        self.frames.len()
    }

    /// Number of actions (rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn frame(&self, k: usize) -> &[Action] {
        &self.frames[k]
    }

    /// The unpadded action table.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        self.frame(0)
    }

    /// The state of the action at `index`, if there is one.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<GameState<'_>> {
        (index < self.len()).then_some(GameState {
            states: self,
            index,
        })
    }

    pub fn states(&self) -> impl Iterator<Item = GameState<'_>> {
        (0..self.len()).map(|index| GameState {
            states: self,
            index,
        })
    }

    /// Mirrors whole states so that the actor of the current action attacks
    /// left to right.
    ///
    /// Every action of a state whose current action belongs to the away team
    /// is mirrored, predecessors included, so relative geometry inside the
    /// window is preserved.
    #[must_use]
    pub fn play_left_to_right(&self, home_team_id: u64) -> Self {
        let away: Vec<bool> = self
            .actions()
            .iter()
            .map(|action| action.team_id != home_team_id)
            .collect();
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .zip(&away)
                    .map(|(action, &away)| {
                        if away {
                            action.mirrored()
                        } else {
                            action.clone()
                        }
                    })
                    .collect()
            })
            .collect();
        Self { frames }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use spadl::{ActionResult, ActionType, BodyPart};

    use super::*;

    pub(crate) fn k(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    pub(crate) fn action(
        action_id: usize,
        period_id: u8,
        time_seconds: f64,
        team_id: u64,
        start: (f64, f64),
        end: (f64, f64),
    ) -> Action {
        Action {
            game_id: 1,
            original_event_id: None,
            action_id,
            period_id,
            time_seconds,
            team_id,
            player_id: team_id * 10,
            start_x: start.0,
            start_y: start.1,
            end_x: end.0,
            end_y: end.1,
            action_type: ActionType::Pass,
            result: ActionResult::Success,
            bodypart: BodyPart::Foot,
        }
    }

    fn ids(frame: &[Action]) -> Vec<usize> {
        frame.iter().map(|a| a.action_id).collect()
    }

    #[test]
    fn test_frames_are_shifted_and_padded() {
        let actions: Vec<_> = (0..5)
            .map(|i| action(i, 1, i as f64, 1, (0.0, 0.0), (1.0, 1.0)))
            .collect();
        let states = gamestates(&actions, k(3), PaddingScope::Period);
        assert_eq!(states.len(), 5);
        assert_eq!(ids(states.frame(0)), [0, 1, 2, 3, 4]);
        assert_eq!(ids(states.frame(1)), [0, 0, 1, 2, 3]);
        assert_eq!(ids(states.frame(2)), [0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_fewer_actions_than_window() {
        let actions = vec![
            action(0, 1, 0.0, 1, (0.0, 0.0), (1.0, 1.0)),
            action(1, 1, 2.0, 2, (1.0, 1.0), (2.0, 2.0)),
        ];
        let states = gamestates(&actions, k(3), PaddingScope::Period);
        assert_eq!(states.len(), 2);
        assert_eq!(states.nb_prev_actions(), 3);
        let last: Vec<_> = states.state(1).unwrap().actions().map(|a| a.action_id).collect();
        assert_eq!(last, [1, 0, 0]);
        let first: Vec<_> = states.state(0).unwrap().actions().map(|a| a.action_id).collect();
        assert_eq!(first, [0, 0, 0]);
        assert!(states.state(2).is_none());
    }

    #[test]
    fn test_padding_scope() {
        let actions = vec![
            action(0, 1, 0.0, 1, (0.0, 0.0), (1.0, 1.0)),
            action(1, 1, 5.0, 1, (0.0, 0.0), (1.0, 1.0)),
            action(2, 2, 0.0, 1, (0.0, 0.0), (1.0, 1.0)),
            action(3, 2, 3.0, 1, (0.0, 0.0), (1.0, 1.0)),
        ];
        let period = gamestates(&actions, k(3), PaddingScope::Period);
        assert_eq!(ids(period.frame(1)), [0, 0, 2, 2]);
        assert_eq!(ids(period.frame(2)), [0, 0, 2, 2]);

        let game = gamestates(&actions, k(3), PaddingScope::Game);
        assert_eq!(ids(game.frame(1)), [0, 0, 1, 2]);
        assert_eq!(ids(game.frame(2)), [0, 0, 0, 1]);
    }

    #[test]
    fn test_play_left_to_right_follows_current_actor() {
        let actions = vec![
            action(0, 1, 0.0, 1, (10.0, 10.0), (20.0, 20.0)),
            action(1, 1, 1.0, 2, (30.0, 40.0), (50.0, 60.0)),
        ];
        let states = gamestates(&actions, k(2), PaddingScope::Period).play_left_to_right(1);
        let home = states.state(0).unwrap();
        assert!((home.current().start_x - 10.0).abs() < 1e-9);
        let away = states.state(1).unwrap();
        assert!((away.current().start_x - 75.0).abs() < 1e-9);
        assert!((away.current().end_y - 8.0).abs() < 1e-9);
        // the home predecessor is seen from the away team's perspective
        assert!((away.action(1).end_x - 85.0).abs() < 1e-9);
        assert!((away.action(1).end_y - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_play_left_to_right_twice_restores_coordinates() {
        let actions = vec![
            action(0, 1, 0.0, 1, (10.0, 10.0), (20.0, 20.0)),
            action(1, 1, 1.0, 2, (30.0, 40.0), (50.0, 60.0)),
            action(2, 2, 0.0, 2, (70.0, 40.0), (80.0, 20.0)),
            action(3, 2, 1.0, 1, (5.0, 4.0), (3.0, 2.0)),
        ];
        let states = gamestates(&actions, k(3), PaddingScope::Period);
        let twice = states.play_left_to_right(1).play_left_to_right(1);
        assert_eq!(twice, states);
    }
}
