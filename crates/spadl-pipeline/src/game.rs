use serde::{Deserialize, Serialize};
use spadl::{
    Action, BoxedEventVocabulary, ConvertConfig, Game, RawEvent, SchemaViolation, convert,
    validate_actions,
};
use spadl_vaep::{
    BoxedFeatureFunction, BoxedLabelFunction, ComputationError, FeatureMatrix, LabelMatrix,
    PaddingScope, all_label_functions, compute_features, compute_labels, feature_column_names,
    gamestates,
};

use crate::{
    config::{ConfigError, PipelineConfig},
    store::StoreError,
};

/// Raw events of one game together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvents {
    pub game: Game,
    pub events: Vec<RawEvent>,
}

/// The input document of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchCollection {
    pub games: Vec<MatchEvents>,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum GameError {
    #[display("{_0}")]
    Schema(SchemaViolation),
    #[display("{_0}")]
    Computation(ComputationError),
    #[display(
        "tables of game {game_id} are not row-aligned: {actions} actions, {features} feature rows, {labels} label rows"
    )]
    #[from(skip)]
    RowMismatch {
        game_id: u64,
        actions: usize,
        features: usize,
        labels: usize,
    },
    #[display("game {game_id} appears more than once in the batch")]
    #[from(skip)]
    DuplicateGame { game_id: u64 },
    #[display("{_0}")]
    Store(StoreError),
}

/// Actions, features and labels of one game, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct GameTables {
    pub game: Game,
    pub actions: Vec<Action>,
    pub features: FeatureMatrix,
    pub labels: LabelMatrix,
}

/// Per-game conversion and feature/label computation.
///
/// A pipeline holds no per-game state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    convert: ConvertConfig,
    vocabulary: BoxedEventVocabulary,
    nb_prev_actions: std::num::NonZeroUsize,
    padding: PaddingScope,
    play_left_to_right: bool,
    features: Vec<BoxedFeatureFunction>,
    labels: Vec<BoxedLabelFunction>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            convert: config.convert_config(),
            vocabulary: config.load_vocabulary()?,
            nb_prev_actions: config.nb_prev_actions,
            padding: config.padding,
            play_left_to_right: config.play_left_to_right,
            features: config.feature_functions()?,
            labels: all_label_functions(config.labels),
        })
    }

    #[must_use]
    pub fn feature_columns(&self) -> Vec<String> {
        feature_column_names(&self.features, self.nb_prev_actions.get())
    }

    pub fn convert_game(&self, game: &Game, events: &[RawEvent]) -> Result<Vec<Action>, GameError> {
        Ok(convert(game, events, self.vocabulary.as_ref(), &self.convert)?)
    }

    /// Computes features and labels of an already converted action table.
    ///
    /// The table is revalidated first, so a table read back from storage is
    /// held to the same schema as a freshly converted one.
    pub fn compute_tables(&self, game: &Game, actions: Vec<Action>) -> Result<GameTables, GameError> {
        validate_actions(game, &actions)?;
        let mut states = gamestates(&actions, self.nb_prev_actions, self.padding);
        if self.play_left_to_right {
            states = states.play_left_to_right(game.home_team_id);
        }
        let features = compute_features(&states, &self.features)?;
        let labels = compute_labels(&actions, &self.labels)?;

        if features.len() != actions.len() || labels.len() != actions.len() {
            return Err(GameError::RowMismatch {
                game_id: game.game_id,
                actions: actions.len(),
                features: features.len(),
                labels: labels.len(),
            });
        }
        Ok(GameTables {
            game: game.clone(),
            actions,
            features,
            labels,
        })
    }

    /// Converts one game and computes its features and labels.
    pub fn process_game(&self, game: &Game, events: &[RawEvent]) -> Result<GameTables, GameError> {
        let actions = self.convert_game(game, events)?;
        self.compute_tables(game, actions)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use spadl::{ActionType, ViolationKind};

    use super::*;

    pub(crate) fn event(team_id: u64, time_seconds: f64, x: f64, action_type: &str, result: &str) -> RawEvent {
        RawEvent {
            original_event_id: None,
            period_id: Some(1),
            time_seconds: Some(time_seconds),
            team_id: Some(team_id),
            player_id: Some(team_id * 10 + 1),
            start_x: Some(x),
            start_y: Some(34.0),
            end_x: Some(x + 1.0),
            end_y: Some(34.0),
            action_type: Some(action_type.to_owned()),
            result: Some(result.to_owned()),
            bodypart: Some("foot".to_owned()),
        }
    }

    pub(crate) fn sample_match(game_id: u64) -> MatchEvents {
        MatchEvents {
            game: Game::new(game_id, 1, 2),
            events: vec![
                event(1, 0.0, 50.0, "pass", "success"),
                event(1, 2.0, 51.0, "pass", "success"),
                event(2, 4.0, 30.0, "tackle", "success"),
                event(1, 6.0, 90.0, "shot", "success"),
                event(2, 8.0, 52.5, "pass", "fail"),
            ],
        }
    }

    #[test]
    fn test_process_game() {
        let pipeline = Pipeline::new(&PipelineConfig::default()).unwrap();
        let input = sample_match(3);
        let tables = pipeline.process_game(&input.game, &input.events).unwrap();
        assert_eq!(tables.actions.len(), 5);
        assert_eq!(tables.features.len(), 5);
        assert_eq!(tables.labels.len(), 5);
        assert_eq!(tables.features.columns(), pipeline.feature_columns());
        assert_eq!(tables.actions[3].action_type, ActionType::Shot);

        let scores = tables.labels.column("scores").unwrap();
        assert_eq!(scores, [true, true, false, true, false]);
        let concedes = tables.labels.column("concedes").unwrap();
        assert_eq!(concedes, [false, false, true, false, false]);
    }

    #[test]
    fn test_features_are_left_to_right() {
        let pipeline = Pipeline::new(&PipelineConfig::default()).unwrap();
        let input = sample_match(3);
        let tables = pipeline.process_game(&input.game, &input.events).unwrap();
        // The away tackle at raw x = 30 is stored mirrored and seen
        // unmirrored again from the away team's perspective.
        assert!((tables.actions[2].start_x - 75.0).abs() < 1e-9);
        assert_eq!(tables.features.get(2, "start_x_a0"), Some(30.0));
    }

    #[test]
    fn test_compute_tables_is_idempotent() {
        let pipeline = Pipeline::new(&PipelineConfig::default()).unwrap();
        let input = sample_match(3);
        let first = pipeline.process_game(&input.game, &input.events).unwrap();
        let again = pipeline
            .compute_tables(&input.game, first.actions.clone())
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_schema_violation_aborts_game() {
        let pipeline = Pipeline::new(&PipelineConfig::default()).unwrap();
        let mut input = sample_match(3);
        input.events[1].action_type = Some("header".to_owned());
        let err = pipeline
            .process_game(&input.game, &input.events)
            .unwrap_err();
        let violation = match err {
            GameError::Schema(violation) => violation,
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(violation.game_id, 3);
        assert_eq!(violation.index, 1);
        assert!(matches!(violation.kind, ViolationKind::UnknownActionType { .. }));
    }

    #[test]
    fn test_compute_tables_revalidates() {
        let pipeline = Pipeline::new(&PipelineConfig::default()).unwrap();
        let input = sample_match(3);
        let mut actions = pipeline.convert_game(&input.game, &input.events).unwrap();
        actions.swap(0, 1);
        let err = pipeline.compute_tables(&input.game, actions).unwrap_err();
        assert!(matches!(err, GameError::Schema(_)));
    }
}
