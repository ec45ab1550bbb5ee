//! VAEP gamestates, features and labels over SPADL action tables.
//!
//! The pipeline for one game is:
//!
//! 1. [`gamestates`] builds the window of the K most recent actions for
//!    every action, padding missing history;
//! 2. [`GameStates::play_left_to_right`] mirrors states so that the acting
//!    team attacks left to right;
//! 3. [`compute_features`] applies feature functions to the states;
//! 4. [`compute_labels`] applies label functions to the unpadded actions.
//!
//! Feature and label matrices have exactly one row per action, in action
//! order. Nothing here performs I/O, and the same action table always yields
//! bit-identical matrices.

pub use self::{
    feature::{
        ActionFeature, BoxedFeatureFunction, DEFAULT_FEATURE_IDS, FeatureFunction, FeatureSetError,
        Simple, all_feature_functions, default_feature_functions, feature_column_names,
        feature_function, select_feature_functions,
    },
    gamestate::{GameState, GameStates, PaddingScope, gamestates},
    label::{
        BoxedLabelFunction, Concedes, DEFAULT_NR_ACTIONS, GoalFromShot, LabelFunction,
        LookaheadWindow, Scores, all_label_functions,
    },
    matrix::{ComputationError, FeatureMatrix, LabelMatrix, compute_features, compute_labels},
};

pub mod feature;
mod gamestate;
mod label;
mod matrix;
