//! Row-aligned feature and label tables of one game.

use spadl::Action;

use crate::{
    feature::{BoxedFeatureFunction, FeatureFunction as _, feature_column_names},
    gamestate::GameStates,
    label::{BoxedLabelFunction, LabelFunction as _},
};

/// A feature or label function broke its output contract.
///
/// Feature and label functions are total over validated actions, so this
/// always points at a defect; matrices with such rows are never built.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ComputationError {
    #[display("non-finite value {value} in feature column '{column}' at row {row} of game {game_id}")]
    NonFinite {
        game_id: u64,
        row: usize,
        column: String,
        value: f64,
    },
    #[display("{found} feature values for {expected} columns at row {row} of game {game_id}")]
    RowWidth {
        game_id: u64,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("label '{label}' has {found} rows for {expected} actions")]
    LabelRows {
        label: String,
        expected: usize,
        found: usize,
    },
}

/// Feature values with one row per action, in action order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` for the action at `row`.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|values| values[index])
    }
}

/// Applies `functions` to the gamestates of one game.
pub fn compute_features(
    states: &GameStates,
    functions: &[BoxedFeatureFunction],
) -> Result<FeatureMatrix, ComputationError> {
    let columns = feature_column_names(functions, states.nb_prev_actions());
    let mut rows = vec![Vec::with_capacity(columns.len()); states.len()];
    for function in functions {
        function.compute(states, &mut rows);
    }

    for (row, (values, action)) in rows.iter().zip(states.actions()).enumerate() {
        if values.len() != columns.len() {
            return Err(ComputationError::RowWidth {
                game_id: action.game_id,
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ComputationError::NonFinite {
                game_id: action.game_id,
                row,
                column: columns[index].clone(),
                value,
            });
        }
    }
    Ok(FeatureMatrix { columns, rows })
}

/// Label values with one row per action, in action order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl LabelMatrix {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column(&self, column: &str) -> Option<Vec<bool>> {
        let index = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|values| values[index]).collect())
    }
}

/// Applies `functions` to the action table of one game.
pub fn compute_labels(
    actions: &[Action],
    functions: &[BoxedLabelFunction],
) -> Result<LabelMatrix, ComputationError> {
    let columns = functions.iter().map(|f| f.id().to_owned()).collect();
    let mut rows = vec![Vec::with_capacity(functions.len()); actions.len()];
    for function in functions {
        let labels = function.compute(actions);
        if labels.len() != actions.len() {
            return Err(ComputationError::LabelRows {
                label: function.id().to_owned(),
                expected: actions.len(),
                found: labels.len(),
            });
        }
        for (row, label) in rows.iter_mut().zip(labels) {
            row.push(label);
        }
    }
    Ok(LabelMatrix { columns, rows })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        feature::{FeatureFunction, default_feature_functions},
        gamestate::{
            PaddingScope, gamestates,
            tests::{action, k},
        },
        label::{LabelFunction, LookaheadWindow, all_label_functions},
    };

    #[derive(Debug, Clone)]
    struct Broken;

    impl FeatureFunction for Broken {
        fn id(&self) -> &'static str {
            "broken"
        }
        fn name(&self) -> &'static str {
            "Broken"
        }
        fn clone_boxed(&self) -> BoxedFeatureFunction {
            Box::new(self.clone())
        }
        fn column_names(&self, _nb_prev_actions: usize) -> Vec<String> {
            vec!["ratio".to_owned()]
        }
        fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
            for (action, row) in states.actions().iter().zip(rows) {
                row.push(action.time_seconds / 0.0);
            }
        }
    }

    /// Declares two columns but writes one.
    #[derive(Debug, Clone)]
    struct Narrow;

    impl FeatureFunction for Narrow {
        fn id(&self) -> &'static str {
            "narrow"
        }
        fn name(&self) -> &'static str {
            "Narrow"
        }
        fn clone_boxed(&self) -> BoxedFeatureFunction {
            Box::new(self.clone())
        }
        fn column_names(&self, _nb_prev_actions: usize) -> Vec<String> {
            vec!["x".to_owned(), "y".to_owned()]
        }
        fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
            for (action, row) in states.actions().iter().zip(rows) {
                row.push(action.start_x);
            }
        }
    }

    #[derive(Debug, Clone)]
    struct Truncated;

    impl LabelFunction for Truncated {
        fn id(&self) -> &'static str {
            "truncated"
        }
        fn clone_boxed(&self) -> BoxedLabelFunction {
            Box::new(self.clone())
        }
        fn compute(&self, actions: &[Action]) -> Vec<bool> {
            vec![false; actions.len().saturating_sub(1)]
        }
    }

    fn game(len: usize) -> Vec<Action> {
        (0..len)
            .map(|i| {
                let x = (i * 7 % 105) as f64;
                let y = (i * 3 % 68) as f64;
                action(i, 1 + u8::from(i >= len / 2), i as f64, 1 + (i % 2) as u64, (x, y), (y, x.min(68.0)))
            })
            .collect()
    }

    #[test]
    fn test_non_finite_values_fail_loudly() {
        let actions = game(3);
        let states = gamestates(&actions, k(1), PaddingScope::Period);
        let functions: Vec<BoxedFeatureFunction> = vec![Box::new(Broken)];
        let err = compute_features(&states, &functions).unwrap_err();
        let (game_id, row, column, value) = match err {
            ComputationError::NonFinite {
                game_id,
                row,
                column,
                value,
            } => (game_id, row, column, value),
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(game_id, 1);
        assert_eq!(row, 0);
        assert_eq!(column, "ratio");
        assert!(value.is_nan());
    }

    #[test]
    fn test_short_rows_are_errors() {
        let actions = game(3);
        let states = gamestates(&actions, k(1), PaddingScope::Period);
        let functions: Vec<BoxedFeatureFunction> = vec![Box::new(Narrow)];
        let err = compute_features(&states, &functions).unwrap_err();
        assert_eq!(
            err,
            ComputationError::RowWidth {
                game_id: 1,
                row: 0,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_misaligned_labels_are_errors() {
        let actions = game(4);
        let functions: Vec<BoxedLabelFunction> = vec![Box::new(Truncated)];
        let err = compute_labels(&actions, &functions).unwrap_err();
        assert_eq!(
            err,
            ComputationError::LabelRows {
                label: "truncated".to_owned(),
                expected: 4,
                found: 3,
            }
        );
        assert_eq!(err.to_string(), "label 'truncated' has 3 rows for 4 actions");
    }

    #[test]
    fn test_feature_lookup() {
        let actions = game(4);
        let states = gamestates(&actions, k(3), PaddingScope::Period);
        let matrix = compute_features(&states, &default_feature_functions()).unwrap();
        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix.get(1, "time_seconds_a0"), Some(1.0));
        assert_eq!(matrix.get(1, "time_seconds_a1"), Some(0.0));
        assert_eq!(matrix.get(4, "time_seconds_a0"), None);
        assert_eq!(matrix.get(0, "unknown"), None);
    }

    #[test]
    fn test_label_matrix() {
        let actions = game(5);
        let labels = compute_labels(&actions, &all_label_functions(LookaheadWindow::default())).unwrap();
        assert_eq!(labels.columns(), ["scores", "concedes", "goal_from_shot"]);
        assert_eq!(labels.len(), 5);
        assert_eq!(labels.column("scores"), Some(vec![false; 5]));
        assert_eq!(labels.column("xg"), None);
    }

    proptest! {
        #[test]
        fn prop_features_are_idempotent_and_aligned(len in 0usize..40, nb in 1usize..5) {
            let actions = game(len);
            let states = gamestates(&actions, k(nb), PaddingScope::Period);
            let first = compute_features(&states, &default_feature_functions()).unwrap();
            let again = compute_features(
                &gamestates(&actions, k(nb), PaddingScope::Period),
                &default_feature_functions(),
            )
            .unwrap();
            prop_assert_eq!(first.len(), len);
            prop_assert_eq!(
                first.columns().len(),
                feature_column_names(&default_feature_functions(), nb).len()
            );
            let bits = |m: &FeatureMatrix| -> Vec<u64> {
                m.rows().iter().flatten().map(|v| v.to_bits()).collect()
            };
            prop_assert_eq!(bits(&first), bits(&again));

            let labels = compute_labels(&actions, &all_label_functions(LookaheadWindow::default())).unwrap();
            prop_assert_eq!(labels.len(), first.len());
        }
    }
}
