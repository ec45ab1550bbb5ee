//! Label functions: forward-looking outcomes of every action of a game.

use std::{fmt, num::NonZeroUsize};

use serde::{Deserialize, Serialize};
use spadl::Action;

/// Default number of actions in the lookahead window.
pub const DEFAULT_NR_ACTIONS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(9);

/// How far [`Scores`] and [`Concedes`] look ahead.
///
/// The window holds the current action and the next `nr_actions - 1`
/// actions of the same game. With `max_seconds`, actions more than that many
/// seconds (on the game clock) after the current action are cut off too.
/// The window always stops at the last action of the game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookaheadWindow {
    pub nr_actions: NonZeroUsize,
    pub max_seconds: Option<f64>,
}

impl Default for LookaheadWindow {
    fn default() -> Self {
        Self {
            nr_actions: DEFAULT_NR_ACTIONS,
            max_seconds: None,
        }
    }
}

impl LookaheadWindow {
    #[must_use]
    pub fn new(nr_actions: NonZeroUsize) -> Self {
        Self {
            nr_actions,
            max_seconds: None,
        }
    }

    #[must_use]
    pub fn with_max_seconds(self, max_seconds: Option<f64>) -> Self {
        Self {
            max_seconds,
            ..self
        }
    }

    /// Actions after `index` that fall inside the window.
    fn future<'a>(&self, actions: &'a [Action], index: usize) -> impl Iterator<Item = &'a Action> {
        let end = index.saturating_add(self.nr_actions.get()).min(actions.len());
        let horizon = self
            .max_seconds
            .map(|seconds| actions[index].time_seconds_overall() + seconds);
        actions[index + 1..end]
            .iter()
            .take_while(move |action| horizon.is_none_or(|h| action.time_seconds_overall() <= h))
    }
}

pub trait LabelFunction: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &str;
    #[must_use]
    fn clone_boxed(&self) -> BoxedLabelFunction;
    /// One label per action, aligned with `actions`.
    #[must_use]
    fn compute(&self, actions: &[Action]) -> Vec<bool>;
}

pub type BoxedLabelFunction = Box<dyn LabelFunction>;

impl Clone for BoxedLabelFunction {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl LabelFunction for BoxedLabelFunction {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn clone_boxed(&self) -> BoxedLabelFunction {
        self.as_ref().clone_boxed()
    }

    fn compute(&self, actions: &[Action]) -> Vec<bool> {
        self.as_ref().compute(actions)
    }
}

#[must_use]
pub fn all_label_functions(window: LookaheadWindow) -> Vec<BoxedLabelFunction> {
    vec![
        Box::new(Scores(window)),
        Box::new(Concedes(window)),
        Box::new(GoalFromShot),
    ]
}

/// Whether the acting team scores within the lookahead window.
///
/// True when the current action is a goal, when a later action of the same
/// team is a goal, or when the opponent puts the ball in its own net.
#[derive(Debug, Clone)]
pub struct Scores(pub LookaheadWindow);

impl LabelFunction for Scores {
    fn id(&self) -> &'static str {
        "scores"
    }

    fn clone_boxed(&self) -> BoxedLabelFunction {
        Box::new(self.clone())
    }

    fn compute(&self, actions: &[Action]) -> Vec<bool> {
        actions
            .iter()
            .enumerate()
            .map(|(i, current)| {
                current.is_goal()
                    || self.0.future(actions, i).any(|later| {
                        let same_team = later.team_id == current.team_id;
                        (later.is_goal() && same_team) || (later.is_own_goal() && !same_team)
                    })
            })
            .collect()
    }
}

/// Whether the acting team concedes within the lookahead window.
///
/// True when the current action is an own goal, when a later action of the
/// opponent is a goal, or when the acting team puts the ball in its own net
/// later on.
#[derive(Debug, Clone)]
pub struct Concedes(pub LookaheadWindow);

impl LabelFunction for Concedes {
    fn id(&self) -> &'static str {
        "concedes"
    }

    fn clone_boxed(&self) -> BoxedLabelFunction {
        Box::new(self.clone())
    }

    fn compute(&self, actions: &[Action]) -> Vec<bool> {
        actions
            .iter()
            .enumerate()
            .map(|(i, current)| {
                current.is_own_goal()
                    || self.0.future(actions, i).any(|later| {
                        let same_team = later.team_id == current.team_id;
                        (later.is_goal() && !same_team) || (later.is_own_goal() && same_team)
                    })
            })
            .collect()
    }
}

/// Whether the action itself is a shot that resulted in a goal.
#[derive(Debug, Clone)]
pub struct GoalFromShot;

impl LabelFunction for GoalFromShot {
    fn id(&self) -> &'static str {
        "goal_from_shot"
    }

    fn clone_boxed(&self) -> BoxedLabelFunction {
        Box::new(self.clone())
    }

    fn compute(&self, actions: &[Action]) -> Vec<bool> {
        actions.iter().map(Action::is_goal).collect()
    }
}
