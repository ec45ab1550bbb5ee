use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric code outside of a closed SPADL vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown {vocabulary} code {code}")]
pub struct UnknownCode {
    pub vocabulary: &'static str,
    pub code: u8,
}

/// Type of an on-the-ball action.
///
/// Codes are stable and dense (`0..ActionType::LEN`); they are the values
/// persisted in the `type_id` column.
///
/// # Example
///
/// ```
/// use spadl::ActionType;
///
/// assert_eq!(ActionType::Shot.id(), 11);
/// assert_eq!(ActionType::from_name("shot"), Some(ActionType::Shot));
/// assert!(ActionType::ShotPenalty.is_shot());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ActionType {
    Pass = 0,
    Cross = 1,
    ThrowIn = 2,
    FreekickCrossed = 3,
    FreekickShort = 4,
    CornerCrossed = 5,
    CornerShort = 6,
    TakeOn = 7,
    Foul = 8,
    Tackle = 9,
    Interception = 10,
    Shot = 11,
    ShotPenalty = 12,
    ShotFreekick = 13,
    KeeperSave = 14,
    KeeperClaim = 15,
    KeeperPunch = 16,
    KeeperPickUp = 17,
    Clearance = 18,
    BadTouch = 19,
    NonAction = 20,
    Dribble = 21,
    Goalkick = 22,
}

impl ActionType {
    /// Number of action types (23).
    pub const LEN: usize = 23;

    /// All action types ordered by code.
    pub const ALL: [Self; Self::LEN] = [
        Self::Pass,
        Self::Cross,
        Self::ThrowIn,
        Self::FreekickCrossed,
        Self::FreekickShort,
        Self::CornerCrossed,
        Self::CornerShort,
        Self::TakeOn,
        Self::Foul,
        Self::Tackle,
        Self::Interception,
        Self::Shot,
        Self::ShotPenalty,
        Self::ShotFreekick,
        Self::KeeperSave,
        Self::KeeperClaim,
        Self::KeeperPunch,
        Self::KeeperPickUp,
        Self::Clearance,
        Self::BadTouch,
        Self::NonAction,
        Self::Dribble,
        Self::Goalkick,
    ];

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Cross => "cross",
            Self::ThrowIn => "throw_in",
            Self::FreekickCrossed => "freekick_crossed",
            Self::FreekickShort => "freekick_short",
            Self::CornerCrossed => "corner_crossed",
            Self::CornerShort => "corner_short",
            Self::TakeOn => "take_on",
            Self::Foul => "foul",
            Self::Tackle => "tackle",
            Self::Interception => "interception",
            Self::Shot => "shot",
            Self::ShotPenalty => "shot_penalty",
            Self::ShotFreekick => "shot_freekick",
            Self::KeeperSave => "keeper_save",
            Self::KeeperClaim => "keeper_claim",
            Self::KeeperPunch => "keeper_punch",
            Self::KeeperPickUp => "keeper_pick_up",
            Self::Clearance => "clearance",
            Self::BadTouch => "bad_touch",
            Self::NonAction => "non_action",
            Self::Dribble => "dribble",
            Self::Goalkick => "goalkick",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether this is one of the shot types (open play, penalty, free kick).
    #[must_use]
    pub const fn is_shot(self) -> bool {
        matches!(self, Self::Shot | Self::ShotPenalty | Self::ShotFreekick)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ActionType> for u8 {
    fn from(kind: ActionType) -> Self {
        kind.id()
    }
}

impl TryFrom<u8> for ActionType {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_id(code).ok_or(UnknownCode {
            vocabulary: "action type",
            code,
        })
    }
}

/// Outcome of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ActionResult {
    Fail = 0,
    Success = 1,
    Offside = 2,
    OwnGoal = 3,
    YellowCard = 4,
    RedCard = 5,
}

impl ActionResult {
    /// Number of results (6).
    pub const LEN: usize = 6;

    /// All results ordered by code.
    pub const ALL: [Self; Self::LEN] = [
        Self::Fail,
        Self::Success,
        Self::Offside,
        Self::OwnGoal,
        Self::YellowCard,
        Self::RedCard,
    ];

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Success => "success",
            Self::Offside => "offside",
            Self::OwnGoal => "owngoal",
            Self::YellowCard => "yellow_card",
            Self::RedCard => "red_card",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|result| result.name() == name)
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ActionResult> for u8 {
    fn from(result: ActionResult) -> Self {
        result.id()
    }
}

impl TryFrom<u8> for ActionResult {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_id(code).ok_or(UnknownCode {
            vocabulary: "result",
            code,
        })
    }
}

/// Body part used to perform an action.
///
/// `HeadOther` is used by providers that do not distinguish between a
/// header and other body parts; `FootLeft`/`FootRight` by providers that
/// record the preferred foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum BodyPart {
    Foot = 0,
    Head = 1,
    Other = 2,
    HeadOther = 3,
    FootLeft = 4,
    FootRight = 5,
}

impl BodyPart {
    /// Number of body parts (6).
    pub const LEN: usize = 6;

    /// All body parts ordered by code.
    pub const ALL: [Self; Self::LEN] = [
        Self::Foot,
        Self::Head,
        Self::Other,
        Self::HeadOther,
        Self::FootLeft,
        Self::FootRight,
    ];

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Foot => "foot",
            Self::Head => "head",
            Self::Other => "other",
            Self::HeadOther => "head/other",
            Self::FootLeft => "foot_left",
            Self::FootRight => "foot_right",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.name() == name)
    }

    /// Folds the left and right foot into [`BodyPart::Foot`].
    #[must_use]
    pub const fn without_foot_side(self) -> Self {
        match self {
            Self::FootLeft | Self::FootRight => Self::Foot,
            other => other,
        }
    }

    #[must_use]
    pub const fn is_foot(self) -> bool {
        matches!(self, Self::Foot | Self::FootLeft | Self::FootRight)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<BodyPart> for u8 {
    fn from(part: BodyPart) -> Self {
        part.id()
    }
}

impl TryFrom<u8> for BodyPart {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_id(code).ok_or(UnknownCode {
            vocabulary: "body part",
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense() {
        for (index, kind) in ActionType::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(kind.id()), index);
        }
        for (index, result) in ActionResult::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(result.id()), index);
        }
        for (index, part) in BodyPart::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(part.id()), index);
        }
    }

    #[test]
    fn test_name_code_bijection() {
        for kind in ActionType::ALL {
            assert_eq!(ActionType::from_name(kind.name()), Some(kind));
            assert_eq!(ActionType::from_id(kind.id()), Some(kind));
        }
        for result in ActionResult::ALL {
            assert_eq!(ActionResult::from_name(result.name()), Some(result));
            assert_eq!(ActionResult::from_id(result.id()), Some(result));
        }
        for part in BodyPart::ALL {
            assert_eq!(BodyPart::from_name(part.name()), Some(part));
            assert_eq!(BodyPart::from_id(part.id()), Some(part));
        }
    }

    #[test]
    fn test_unknown_codes_and_names() {
        assert_eq!(ActionType::from_id(23), None);
        assert_eq!(ActionResult::from_id(6), None);
        assert_eq!(BodyPart::from_id(6), None);
        assert_eq!(ActionType::from_name("Pass"), None);
        assert_eq!(ActionResult::from_name("goal"), None);

        let err = ActionType::try_from(200).unwrap_err();
        assert_eq!(err.to_string(), "unknown action type code 200");
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&ActionType::Dribble).unwrap();
        assert_eq!(json, "21");
        let part: BodyPart = serde_json::from_str("3").unwrap();
        assert_eq!(part, BodyPart::HeadOther);
        assert!(serde_json::from_str::<ActionResult>("9").is_err());
    }

    #[test]
    fn test_shot_types() {
        let shots: Vec<_> = ActionType::ALL.into_iter().filter(|t| t.is_shot()).collect();
        assert_eq!(
            shots,
            [
                ActionType::Shot,
                ActionType::ShotPenalty,
                ActionType::ShotFreekick
            ]
        );
    }

    #[test]
    fn test_foot_side_folding() {
        assert_eq!(BodyPart::FootLeft.without_foot_side(), BodyPart::Foot);
        assert_eq!(BodyPart::FootRight.without_foot_side(), BodyPart::Foot);
        assert_eq!(BodyPart::HeadOther.without_foot_side(), BodyPart::HeadOther);
        assert!(BodyPart::FootRight.is_foot());
        assert!(!BodyPart::Head.is_foot());
    }
}
