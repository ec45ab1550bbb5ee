//! SPADL: a provider-independent representation of on-the-ball soccer actions.
//!
//! This crate defines the canonical action schema and its closed
//! vocabularies, validates action tables, and converts provider event logs
//! into canonical tables on a standardized pitch.
//!
//! # Example
//!
//! ```
//! use spadl::{ActionType, ConvertConfig, Game, RawEvent, SpadlVocabulary, convert};
//!
//! let game = Game::new(1, 100, 200);
//! let kick_off = RawEvent {
//!     period_id: Some(1),
//!     time_seconds: Some(0.0),
//!     team_id: Some(100),
//!     player_id: Some(9),
//!     start_x: Some(52.5),
//!     start_y: Some(34.0),
//!     end_x: Some(40.0),
//!     end_y: Some(30.0),
//!     action_type: Some("pass".to_owned()),
//!     result: Some("success".to_owned()),
//!     bodypart: Some("foot".to_owned()),
//!     ..RawEvent::default()
//! };
//! let actions = convert(&game, &[kick_off], &SpadlVocabulary, &ConvertConfig::default())?;
//! assert_eq!(actions[0].action_type, ActionType::Pass);
//! assert_eq!(actions[0].action_id, 0);
//! # Ok::<(), spadl::SchemaViolation>(())
//! ```

pub use self::{
    action::{Action, Game, NamedAction, add_names, play_left_to_right, strip_names},
    convert::{
        ConvertConfig, CoordinatePolicy, Orientation, ProviderFrame, RawEvent, YAxis, convert,
    },
    dribble::{DribbleConfig, add_dribbles},
    provider::{
        BoxedEventVocabulary, EventVocabulary, MappedVocabulary, SpadlVocabulary,
        VocabularyError, VocabularyTables,
    },
    validate::{SchemaViolation, ViolationKind, validate_actions},
    vocab::{ActionResult, ActionType, BodyPart, UnknownCode},
};

mod action;
mod convert;
mod dribble;
pub mod pitch;
mod provider;
mod validate;
mod vocab;
