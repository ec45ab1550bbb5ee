//! Conversion of provider events into canonical SPADL actions.

use serde::{Deserialize, Serialize};

use crate::{
    action::{Action, Game},
    dribble::{self, DribbleConfig},
    pitch::{self, FIELD_LENGTH, FIELD_WIDTH},
    provider::EventVocabulary,
    validate::{self, SchemaViolation, ViolationKind},
};

/// One provider event, already decoded into loosely typed fields.
///
/// Terms (`type`, `result`, `bodypart`) are resolved through an
/// [`EventVocabulary`]; coordinates are in the provider's frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub original_event_id: Option<String>,
    pub period_id: Option<u8>,
    pub time_seconds: Option<f64>,
    pub team_id: Option<u64>,
    pub player_id: Option<u64>,
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    /// Defaults to `start_x` when absent.
    pub end_x: Option<f64>,
    /// Defaults to `start_y` when absent.
    pub end_y: Option<f64>,
    #[serde(rename = "type")]
    pub action_type: Option<String>,
    pub result: Option<String>,
    pub bodypart: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    /// y grows towards the top touchline.
    #[default]
    Up,
    /// y grows towards the bottom touchline (screen coordinates).
    Down,
}

/// Attacking direction convention of a provider's coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Every event is recorded from the acting team's perspective.
    #[default]
    ActorAttacksRight,
    /// Fixed frame; the home team attacks right in odd periods.
    HomeAttacksRightFirstPeriod,
    /// Fixed frame; the home team attacks left in odd periods.
    HomeAttacksLeftFirstPeriod,
}

impl Orientation {
    /// Whether the actor attacks towards increasing x in the raw frame.
    #[must_use]
    pub fn actor_attacks_right(self, period_id: u8, actor_is_home: bool) -> bool {
        let odd_period = period_id % 2 == 1;
        match self {
            Self::ActorAttacksRight => true,
            Self::HomeAttacksRightFirstPeriod => actor_is_home == odd_period,
            Self::HomeAttacksLeftFirstPeriod => actor_is_home != odd_period,
        }
    }
}

/// Coordinate frame of raw provider events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFrame {
    pub length: f64,
    pub width: f64,
    pub y_axis: YAxis,
    pub orientation: Orientation,
}

impl Default for ProviderFrame {
    fn default() -> Self {
        Self {
            length: FIELD_LENGTH,
            width: FIELD_WIDTH,
            y_axis: YAxis::Up,
            orientation: Orientation::ActorAttacksRight,
        }
    }
}

impl ProviderFrame {
    /// Whether both dimensions are finite and positive.
    #[must_use]
    pub fn has_valid_dimensions(&self) -> bool {
        [self.length, self.width]
            .iter()
            .all(|d| d.is_finite() && *d > 0.0)
    }

    fn scale(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x * FIELD_LENGTH / self.length;
        let y = y * FIELD_WIDTH / self.width;
        match self.y_axis {
            YAxis::Up => (x, y),
            YAxis::Down => (x, pitch::mirror_y(y)),
        }
    }
}

/// What to do with coordinates outside the standardized pitch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatePolicy {
    /// Move them onto the nearest touchline or goal line.
    #[default]
    Clip,
    /// Fail the conversion with a schema violation.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub frame: ProviderFrame,
    pub coordinates: CoordinatePolicy,
    /// `None` disables dribble insertion.
    pub dribbles: Option<DribbleConfig>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            frame: ProviderFrame::default(),
            coordinates: CoordinatePolicy::default(),
            dribbles: Some(DribbleConfig::default()),
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ViolationKind> {
    value.ok_or(ViolationKind::MissingField { field })
}

fn required_term<'a>(value: Option<&'a String>, field: &'static str) -> Result<&'a str, ViolationKind> {
    value
        .map(String::as_str)
        .ok_or(ViolationKind::MissingField { field })
}

struct Converter<'a> {
    game: &'a Game,
    vocabulary: &'a dyn EventVocabulary,
    config: &'a ConvertConfig,
    clipped: usize,
}

impl Converter<'_> {
    fn coordinate(&mut self, field: &'static str, value: f64, max: f64) -> Result<f64, ViolationKind> {
        validate::check_finite(field, value)?;
        if (0.0..=max).contains(&value) {
            return Ok(value);
        }
        match self.config.coordinates {
            CoordinatePolicy::Clip => {
                self.clipped += 1;
                Ok(value.clamp(0.0, max))
            }
            CoordinatePolicy::Reject => Err(ViolationKind::OutOfBounds { field, value, max }),
        }
    }

    fn action(&mut self, event: &RawEvent) -> Result<Action, ViolationKind> {
        let type_term = required_term(event.action_type.as_ref(), "type")?;
        let action_type = self
            .vocabulary
            .action_type(type_term)
            .ok_or_else(|| ViolationKind::UnknownActionType {
                value: type_term.to_owned(),
            })?;
        let result_term = required_term(event.result.as_ref(), "result")?;
        let result = self
            .vocabulary
            .result(result_term)
            .ok_or_else(|| ViolationKind::UnknownResult {
                value: result_term.to_owned(),
            })?;
        let bodypart_term = required_term(event.bodypart.as_ref(), "bodypart")?;
        let bodypart = self
            .vocabulary
            .bodypart(bodypart_term)
            .ok_or_else(|| ViolationKind::UnknownBodyPart {
                value: bodypart_term.to_owned(),
            })?;

        let period_id = validate::check_period(required(event.period_id, "period_id")?)?;
        let time_seconds = validate::check_time(required(event.time_seconds, "time_seconds")?)?;
        let team_id = validate::check_team(self.game, required(event.team_id, "team_id")?)?;
        let player_id = required(event.player_id, "player_id")?;

        let raw_start_x = validate::check_finite("start_x", required(event.start_x, "start_x")?)?;
        let raw_start_y = validate::check_finite("start_y", required(event.start_y, "start_y")?)?;
        let raw_end_x = validate::check_finite("end_x", event.end_x.unwrap_or(raw_start_x))?;
        let raw_end_y = validate::check_finite("end_y", event.end_y.unwrap_or(raw_start_y))?;

        let frame = &self.config.frame;
        let (start_x, start_y) = frame.scale(raw_start_x, raw_start_y);
        let (end_x, end_y) = frame.scale(raw_end_x, raw_end_y);
        let action = Action {
            game_id: self.game.game_id,
            original_event_id: event.original_event_id.clone(),
            action_id: 0,
            period_id,
            time_seconds,
            team_id,
            player_id,
            start_x: self.coordinate("start_x", start_x, FIELD_LENGTH)?,
            start_y: self.coordinate("start_y", start_y, FIELD_WIDTH)?,
            end_x: self.coordinate("end_x", end_x, FIELD_LENGTH)?,
            end_y: self.coordinate("end_y", end_y, FIELD_WIDTH)?,
            action_type,
            result,
            bodypart,
        };

        // Canonical frame: home attacks right, away attacks left.
        let is_home = self.game.is_home(team_id);
        let attacks_right = frame.orientation.actor_attacks_right(period_id, is_home);
        Ok(if attacks_right == is_home {
            action
        } else {
            action.mirrored()
        })
    }
}

/// Converts the raw events of one game into a canonical action table.
///
/// Every event yields exactly one action (plus inserted dribbles); the table
/// is sorted by `(period_id, time_seconds)` with ties kept in input order,
/// receives dense `action_id`s and is validated before it is returned. On
/// failure nothing is returned and the violation names the raw event index.
pub fn convert(
    game: &Game,
    events: &[RawEvent],
    vocabulary: &dyn EventVocabulary,
    config: &ConvertConfig,
) -> Result<Vec<Action>, SchemaViolation> {
    let mut converter = Converter {
        game,
        vocabulary,
        config,
        clipped: 0,
    };
    let mut actions = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            converter
                .action(event)
                .map_err(|kind| SchemaViolation::new(game.game_id, index, kind))
        })
        .collect::<Result<Vec<_>, _>>()?;

    actions.sort_by(|a, b| {
        a.period_id
            .cmp(&b.period_id)
            .then(a.time_seconds.total_cmp(&b.time_seconds))
    });
    for (action_id, action) in actions.iter_mut().enumerate() {
        action.action_id = action_id;
    }

    let mut dribbles = 0;
    if let Some(dribble_config) = &config.dribbles {
        (actions, dribbles) = dribble::add_dribbles(actions, dribble_config);
    }

    validate::validate_actions(game, &actions)?;
    tracing::debug!(
        game_id = game.game_id,
        vocabulary = vocabulary.name(),
        events = events.len(),
        actions = actions.len(),
        clipped = converter.clipped,
        dribbles,
        "converted game"
    );
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{ActionResult, ActionType, BodyPart, SpadlVocabulary};

    fn game() -> Game {
        Game::new(7, 10, 20)
    }

    fn event(team_id: u64, period_id: u8, time_seconds: f64, x: f64, y: f64) -> RawEvent {
        RawEvent {
            original_event_id: Some(format!("e{time_seconds}")),
            period_id: Some(period_id),
            time_seconds: Some(time_seconds),
            team_id: Some(team_id),
            player_id: Some(team_id * 10),
            start_x: Some(x),
            start_y: Some(y),
            end_x: Some(x),
            end_y: Some(y),
            action_type: Some("pass".to_owned()),
            result: Some("success".to_owned()),
            bodypart: Some("foot".to_owned()),
        }
    }

    fn no_dribbles() -> ConvertConfig {
        ConvertConfig {
            dribbles: None,
            ..ConvertConfig::default()
        }
    }

    #[test]
    fn test_sorts_and_assigns_dense_ids() {
        let events = vec![
            event(10, 2, 5.0, 50.0, 30.0),
            event(10, 1, 30.0, 50.0, 30.0),
            event(20, 1, 10.0, 50.0, 30.0),
            event(10, 1, 10.0, 50.0, 30.0),
        ];
        let actions = convert(&game(), &events, &SpadlVocabulary, &no_dribbles()).unwrap();
        let order: Vec<_> = actions
            .iter()
            .map(|a| (a.action_id, a.period_id, a.team_id))
            .collect();
        assert_eq!(order, [(0, 1, 20), (1, 1, 10), (2, 1, 10), (3, 2, 10)]);
        assert_eq!(actions[0].original_event_id.as_deref(), Some("e10"));
    }

    #[test]
    fn test_away_actions_are_mirrored() {
        let events = vec![event(10, 1, 0.0, 20.0, 10.0), event(20, 1, 1.0, 20.0, 10.0)];
        let actions = convert(&game(), &events, &SpadlVocabulary, &no_dribbles()).unwrap();
        assert!((actions[0].start_x - 20.0).abs() < 1e-9);
        assert!((actions[1].start_x - 85.0).abs() < 1e-9);
        assert!((actions[1].start_y - 58.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_orientation_flips_at_half_time() {
        let config = ConvertConfig {
            frame: ProviderFrame {
                orientation: Orientation::HomeAttacksRightFirstPeriod,
                ..ProviderFrame::default()
            },
            dribbles: None,
            ..ConvertConfig::default()
        };
        let events = vec![
            event(10, 1, 0.0, 20.0, 10.0),
            event(20, 1, 1.0, 20.0, 10.0),
            event(10, 2, 0.0, 20.0, 10.0),
            event(20, 2, 1.0, 20.0, 10.0),
        ];
        let actions = convert(&game(), &events, &SpadlVocabulary, &config).unwrap();
        let xs: Vec<_> = actions.iter().map(|a| a.start_x).collect();
        assert_eq!(xs, [20.0, 20.0, 85.0, 85.0]);
    }

    #[test]
    fn test_provider_frame_scaling() {
        let config = ConvertConfig {
            frame: ProviderFrame {
                length: 100.0,
                width: 100.0,
                y_axis: YAxis::Down,
                orientation: Orientation::ActorAttacksRight,
            },
            dribbles: None,
            ..ConvertConfig::default()
        };
        let actions = convert(
            &game(),
            &[event(10, 1, 0.0, 50.0, 25.0)],
            &SpadlVocabulary,
            &config,
        )
        .unwrap();
        assert!((actions[0].start_x - 52.5).abs() < 1e-9);
        assert!((actions[0].start_y - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_end_defaults_to_start() {
        let mut raw = event(10, 1, 0.0, 30.0, 40.0);
        raw.end_x = None;
        raw.end_y = None;
        let actions = convert(&game(), &[raw], &SpadlVocabulary, &no_dribbles()).unwrap();
        assert!((actions[0].end_x - 30.0).abs() < 1e-9);
        assert!((actions[0].end_y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_policy() {
        let events = vec![event(10, 1, 0.0, 110.0, -2.0)];
        let actions = convert(&game(), &events, &SpadlVocabulary, &no_dribbles()).unwrap();
        assert!((actions[0].start_x - FIELD_LENGTH).abs() < 1e-9);
        assert!(actions[0].start_y.abs() < 1e-9);

        let reject = ConvertConfig {
            coordinates: CoordinatePolicy::Reject,
            ..no_dribbles()
        };
        let err = convert(&game(), &events, &SpadlVocabulary, &reject).unwrap_err();
        assert_eq!(err.game_id, 7);
        assert_eq!(err.index, 0);
        assert!(matches!(
            err.kind,
            ViolationKind::OutOfBounds {
                field: "start_x",
                ..
            }
        ));
    }

    #[test]
    fn test_unmapped_terms_are_violations() {
        let mut raw = event(10, 1, 0.0, 30.0, 40.0);
        raw.action_type = Some("Pass".to_owned());
        let events = vec![event(10, 1, 0.0, 30.0, 40.0), raw];
        let err = convert(&game(), &events, &SpadlVocabulary, &no_dribbles()).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(
            err.kind,
            ViolationKind::UnknownActionType {
                value: "Pass".to_owned()
            }
        );

        let mut raw = event(10, 1, 0.0, 30.0, 40.0);
        raw.bodypart = Some("knee".to_owned());
        let err = convert(&game(), &[raw], &SpadlVocabulary, &no_dribbles()).unwrap_err();
        assert!(matches!(err.kind, ViolationKind::UnknownBodyPart { .. }));

        let mut raw = event(10, 1, 0.0, 30.0, 40.0);
        raw.team_id = None;
        let err = convert(&game(), &[raw], &SpadlVocabulary, &no_dribbles()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::MissingField { field: "team_id" });

        let mut raw = event(30, 1, 0.0, 30.0, 40.0);
        raw.result = Some("fail".to_owned());
        let err = convert(&game(), &[raw], &SpadlVocabulary, &no_dribbles()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::UnknownTeam { team_id: 30 });
    }

    #[test]
    fn test_dribbles_are_inserted_by_default() {
        let mut first = event(10, 1, 0.0, 20.0, 30.0);
        first.end_x = Some(30.0);
        let second = event(10, 1, 4.0, 40.0, 30.0);
        let actions = convert(
            &game(),
            &[first, second],
            &SpadlVocabulary,
            &ConvertConfig::default(),
        )
        .unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[1].action_type, ActionType::Dribble);
        assert_eq!(actions[1].result, ActionResult::Success);
        assert_eq!(actions[1].bodypart, BodyPart::Foot);
        assert_eq!(actions[2].action_id, 2);
    }

    #[test]
    fn test_config_from_json() {
        let config: ConvertConfig = serde_json::from_str(
            r#"{ "frame": { "length": 120, "orientation": "home_attacks_left_first_period" },
                 "coordinates": "reject" }"#,
        )
        .unwrap();
        assert!((config.frame.length - 120.0).abs() < 1e-9);
        assert!((config.frame.width - FIELD_WIDTH).abs() < 1e-9);
        assert_eq!(
            config.frame.orientation,
            Orientation::HomeAttacksLeftFirstPeriod
        );
        assert_eq!(config.coordinates, CoordinatePolicy::Reject);
        assert!(config.dribbles.is_some());
    }

    proptest! {
        #[test]
        fn prop_action_ids_are_dense_and_chronological(
            raw in prop::collection::vec((1u8..=4, 0.0..3000.0f64, any::<bool>(), 0.0..105.0f64, 0.0..68.0f64), 0..60)
        ) {
            let events: Vec<_> = raw
                .iter()
                .map(|&(period_id, time, home, x, y)| event(if home { 10 } else { 20 }, period_id, time, x, y))
                .collect();
            let actions = convert(&game(), &events, &SpadlVocabulary, &ConvertConfig::default()).unwrap();
            prop_assert!(actions.len() >= events.len());
            for (index, action) in actions.iter().enumerate() {
                prop_assert_eq!(action.action_id, index);
            }
            for pair in actions.windows(2) {
                let ordered = (pair[0].period_id, pair[0].time_seconds) <= (pair[1].period_id, pair[1].time_seconds);
                prop_assert!(ordered);
            }
        }
    }
}
