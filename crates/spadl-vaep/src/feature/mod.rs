//! Feature functions over gamestates.
//!
//! Every feature function maps the gamestates of a whole game to one or more
//! named numeric columns. Values for action `i` depend only on the state of
//! action `i` (and, for [`GoalScore`], on the actions before it); functions
//! never read each other's output.
//!
//! # Function families
//!
//! **Action features** ([`ActionFeature`] wrapped in [`Simple`]) look at a
//! single action and are repeated for every frame of the window, with the
//! suffix `_a<k>` naming the frame:
//! - categorical: [`ActionTypeCode`], [`ActionTypeOnehot`], [`ResultCode`],
//!   [`ResultOnehot`], [`ActionTypeResultOnehot`], [`BodyPartCode`],
//!   [`BodyPartOnehot`], [`BodyPartDetailedCode`], [`BodyPartDetailedOnehot`]
//! - temporal: [`Time`]
//! - spatial: [`StartLocation`], [`EndLocation`], [`StartPolar`],
//!   [`EndPolar`], [`Movement`], [`MovementPolar`], [`Direction`]
//!
//! **Window features** relate the current action to its predecessors:
//! [`Team`], [`TimeDelta`], [`SpaceDelta`], [`Speed`].
//!
//! **Game features** need the whole action table: [`GoalScore`].
//!
//! Column names are fixed by the closed SPADL vocabularies and the window
//! size, so the schema is known before anything is computed (see
//! [`feature_column_names`]).

use std::{collections::BTreeSet, fmt};

use spadl::Action;

use crate::gamestate::GameStates;

pub use self::{categorical::*, context::*, spatial::*, temporal::*};

mod categorical;
mod context;
mod spatial;
mod temporal;

/// Ids of the standard VAEP feature set, in column order.
pub const DEFAULT_FEATURE_IDS: [&str; 14] = [
    "actiontype_onehot",
    "result_onehot",
    "actiontype_result_onehot",
    "bodypart_onehot",
    "time",
    "startlocation",
    "endlocation",
    "startpolar",
    "endpolar",
    "movement",
    "team",
    "time_delta",
    "space_delta",
    "goalscore",
];

#[must_use]
pub fn all_feature_functions() -> Vec<BoxedFeatureFunction> {
    vec![
        // categorical
        Box::new(Simple(ActionTypeCode)),
        Box::new(Simple(ActionTypeOnehot)),
        Box::new(Simple(ResultCode)),
        Box::new(Simple(ResultOnehot)),
        Box::new(Simple(ActionTypeResultOnehot)),
        Box::new(Simple(BodyPartCode)),
        Box::new(Simple(BodyPartOnehot)),
        Box::new(Simple(BodyPartDetailedCode)),
        Box::new(Simple(BodyPartDetailedOnehot)),
        // temporal
        Box::new(Simple(Time)),
        Box::new(TimeDelta),
        // spatial
        Box::new(Simple(StartLocation)),
        Box::new(Simple(EndLocation)),
        Box::new(Simple(StartPolar)),
        Box::new(Simple(EndPolar)),
        Box::new(Simple(Movement)),
        Box::new(Simple(MovementPolar)),
        Box::new(Simple(Direction)),
        Box::new(SpaceDelta),
        Box::new(Speed),
        // context
        Box::new(Team),
        Box::new(GoalScore),
    ]
}

#[must_use]
pub fn feature_function(id: &str) -> Option<BoxedFeatureFunction> {
    all_feature_functions().into_iter().find(|f| f.id() == id)
}

#[must_use]
pub fn default_feature_functions() -> Vec<BoxedFeatureFunction> {
    DEFAULT_FEATURE_IDS
        .iter()
        .filter_map(|id| feature_function(id))
        .collect()
}

/// Concatenated column names of `functions` for window size
/// `nb_prev_actions`.
#[must_use]
pub fn feature_column_names(functions: &[BoxedFeatureFunction], nb_prev_actions: usize) -> Vec<String> {
    functions
        .iter()
        .flat_map(|f| f.column_names(nb_prev_actions))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FeatureSetError {
    #[display("no feature functions selected")]
    Empty,
    #[display("unknown feature function '{id}'")]
    UnknownFeature { id: String },
    #[display("column '{column}' is produced by more than one feature function")]
    DuplicateColumn { column: String },
}

/// Looks up feature functions by id and checks that at least one is
/// selected and that their columns do not collide.
pub fn select_feature_functions<S>(
    ids: &[S],
    nb_prev_actions: usize,
) -> Result<Vec<BoxedFeatureFunction>, FeatureSetError>
where
    S: AsRef<str>,
{
    if ids.is_empty() {
        return Err(FeatureSetError::Empty);
    }
    let functions = ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            feature_function(id).ok_or_else(|| FeatureSetError::UnknownFeature { id: id.to_owned() })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut seen = BTreeSet::new();
    for column in feature_column_names(&functions, nb_prev_actions) {
        if !seen.insert(column.clone()) {
            return Err(FeatureSetError::DuplicateColumn { column });
        }
    }
    Ok(functions)
}

pub trait FeatureFunction: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &str;
    #[must_use]
    fn name(&self) -> &str;
    #[must_use]
    fn clone_boxed(&self) -> BoxedFeatureFunction;

    /// Output columns for a window of `nb_prev_actions` frames.
    #[must_use]
    fn column_names(&self, nb_prev_actions: usize) -> Vec<String>;

    /// Appends this function's values to the row of every action.
    ///
    /// `rows` has one entry per action of `states`; exactly
    /// `column_names(states.nb_prev_actions()).len()` values are appended to
    /// each.
    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]);
}

pub type BoxedFeatureFunction = Box<dyn FeatureFunction>;

impl Clone for BoxedFeatureFunction {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl FeatureFunction for BoxedFeatureFunction {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        self.as_ref().clone_boxed()
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        self.as_ref().column_names(nb_prev_actions)
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        self.as_ref().compute(states, rows);
    }
}

/// A feature of a single action.
pub trait ActionFeature: fmt::Debug + Clone + Send + Sync + 'static {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    /// Column names without the frame suffix.
    fn base_columns(&self) -> Vec<String>;
    fn extract(&self, action: &Action, out: &mut Vec<f64>);
}

/// Applies an [`ActionFeature`] to every frame of the window.
///
/// Columns of the current action come first (`_a0`), then those of the
/// previous action (`_a1`), and so on.
#[derive(Debug, Clone)]
pub struct Simple<F>(pub F);

impl<F> FeatureFunction for Simple<F>
where
    F: ActionFeature,
{
    fn id(&self) -> &str {
        self.0.id()
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        let base = self.0.base_columns();
        (0..nb_prev_actions)
            .flat_map(|k| base.iter().map(move |column| format!("{column}_a{k}")))
            .collect()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        for (state, row) in states.states().zip(rows) {
            for action in state.actions() {
                self.0.extract(action, row);
            }
        }
    }
}

pub(crate) fn flag(value: bool) -> f64 {
    f64::from(u8::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamestate::{
        PaddingScope, gamestates,
        tests::{action, k},
    };

    #[test]
    fn test_feature_ids_are_unique() {
        let ids: BTreeSet<_> = all_feature_functions()
            .iter()
            .map(|f| f.id().to_owned())
            .collect();
        assert_eq!(ids.len(), all_feature_functions().len());
    }

    #[test]
    fn test_default_set() {
        let defaults = default_feature_functions();
        let ids: Vec<_> = defaults.iter().map(|f| f.id()).collect();
        assert_eq!(ids, DEFAULT_FEATURE_IDS);
    }

    #[test]
    fn test_simple_column_suffixes() {
        let columns = Simple(StartLocation).column_names(2);
        assert_eq!(columns, ["start_x_a0", "start_y_a0", "start_x_a1", "start_y_a1"]);
    }

    #[test]
    fn test_every_function_fills_its_columns() {
        let actions = vec![
            action(0, 1, 0.0, 1, (52.5, 34.0), (60.0, 30.0)),
            action(1, 1, 3.0, 2, (45.0, 38.0), (45.0, 38.0)),
            action(2, 2, 1.0, 1, (105.0, 34.0), (100.0, 34.0)),
        ];
        for nb in [1, 3] {
            let states = gamestates(&actions, k(nb), PaddingScope::Period);
            for function in all_feature_functions() {
                let mut rows = vec![Vec::new(); states.len()];
                function.compute(&states, &mut rows);
                let width = function.column_names(nb).len();
                for row in &rows {
                    assert_eq!(row.len(), width, "{}", function.id());
                    assert!(row.iter().all(|v| v.is_finite()), "{}", function.id());
                }
            }
        }
    }

    #[test]
    fn test_default_columns() {
        let columns = feature_column_names(&default_feature_functions(), 3);
        assert!(columns.contains(&"actiontype_pass_a0".to_owned()));
        assert!(columns.contains(&"actiontype_shot_result_success_a2".to_owned()));
        assert!(columns.contains(&"bodypart_head/other_a1".to_owned()));
        assert!(columns.contains(&"team_1".to_owned()));
        assert!(columns.contains(&"time_delta_2".to_owned()));
        assert!(columns.contains(&"mov_a02".to_owned()));
        assert_eq!(columns.last().map(String::as_str), Some("goalscore_diff"));
        let unique: BTreeSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
    }

    #[test]
    fn test_select_feature_functions() {
        let functions = select_feature_functions(&["time", "goalscore"], 3).unwrap();
        assert_eq!(functions.len(), 2);

        let err = select_feature_functions(&["time", "xg"], 3).unwrap_err();
        assert_eq!(err, FeatureSetError::UnknownFeature { id: "xg".to_owned() });

        let err = select_feature_functions(&["movement", "direction"], 1).unwrap_err();
        assert_eq!(
            err,
            FeatureSetError::DuplicateColumn {
                column: "dx_a0".to_owned()
            }
        );
    }

    #[test]
    fn test_empty_feature_set_is_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(select_feature_functions(&none, 3).unwrap_err(), FeatureSetError::Empty);
    }
}
