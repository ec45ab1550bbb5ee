use spadl::{Action, ActionResult, ActionType, BodyPart};

use super::{ActionFeature, flag};

/// Raw action type code.
#[derive(Debug, Clone)]
pub struct ActionTypeCode;

impl ActionFeature for ActionTypeCode {
    fn id(&self) -> &'static str {
        "actiontype"
    }
    fn name(&self) -> &'static str {
        "Action Type"
    }
    fn base_columns(&self) -> Vec<String> {
        vec!["type_id".to_owned()]
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.push(f64::from(action.action_type.id()));
    }
}

/// One column per action type.
#[derive(Debug, Clone)]
pub struct ActionTypeOnehot;

impl ActionFeature for ActionTypeOnehot {
    fn id(&self) -> &'static str {
        "actiontype_onehot"
    }
    fn name(&self) -> &'static str {
        "Action Type (one-hot)"
    }
    fn base_columns(&self) -> Vec<String> {
        ActionType::ALL
            .iter()
            .map(|kind| format!("actiontype_{kind}"))
            .collect()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend(ActionType::ALL.iter().map(|&kind| flag(action.action_type == kind)));
    }
}

#[derive(Debug, Clone)]
pub struct ResultCode;

impl ActionFeature for ResultCode {
    fn id(&self) -> &'static str {
        "result"
    }
    fn name(&self) -> &'static str {
        "Result"
    }
    fn base_columns(&self) -> Vec<String> {
        vec!["result_id".to_owned()]
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.push(f64::from(action.result.id()));
    }
}

#[derive(Debug, Clone)]
pub struct ResultOnehot;

impl ActionFeature for ResultOnehot {
    fn id(&self) -> &'static str {
        "result_onehot"
    }
    fn name(&self) -> &'static str {
        "Result (one-hot)"
    }
    fn base_columns(&self) -> Vec<String> {
        ActionResult::ALL
            .iter()
            .map(|result| format!("result_{result}"))
            .collect()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend(ActionResult::ALL.iter().map(|&result| flag(action.result == result)));
    }
}

/// One column per (action type, result) combination.
///
/// Lets a model learn, for example, that a failed take-on is worse than a
/// failed pass.
#[derive(Debug, Clone)]
pub struct ActionTypeResultOnehot;

impl ActionFeature for ActionTypeResultOnehot {
    fn id(&self) -> &'static str {
        "actiontype_result_onehot"
    }
    fn name(&self) -> &'static str {
        "Action Type and Result (one-hot)"
    }
    fn base_columns(&self) -> Vec<String> {
        ActionType::ALL
            .iter()
            .flat_map(|kind| {
                ActionResult::ALL
                    .iter()
                    .map(move |result| format!("actiontype_{kind}_result_{result}"))
            })
            .collect()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        for kind in ActionType::ALL {
            for result in ActionResult::ALL {
                out.push(flag(action.action_type == kind && action.result == result));
            }
        }
    }
}

/// Body part code with the foot side folded into `foot`.
#[derive(Debug, Clone)]
pub struct BodyPartCode;

impl ActionFeature for BodyPartCode {
    fn id(&self) -> &'static str {
        "bodypart"
    }
    fn name(&self) -> &'static str {
        "Body Part"
    }
    fn base_columns(&self) -> Vec<String> {
        vec!["bodypart_id".to_owned()]
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.push(f64::from(action.bodypart.without_foot_side().id()));
    }
}

const BODYPART_GROUPS: [BodyPart; 4] = [BodyPart::Foot, BodyPart::Head, BodyPart::Other, BodyPart::HeadOther];

/// One column per body part group.
///
/// `foot` is set for any foot; `head/other` is set for heads and other body
/// parts too, so it is meaningful across providers that do or do not split
/// the two.
#[derive(Debug, Clone)]
pub struct BodyPartOnehot;

impl ActionFeature for BodyPartOnehot {
    fn id(&self) -> &'static str {
        "bodypart_onehot"
    }
    fn name(&self) -> &'static str {
        "Body Part (one-hot)"
    }
    fn base_columns(&self) -> Vec<String> {
        BODYPART_GROUPS
            .iter()
            .map(|part| format!("bodypart_{part}"))
            .collect()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let part = action.bodypart;
        for group in BODYPART_GROUPS {
            let member = match group {
                BodyPart::Foot => part.is_foot(),
                BodyPart::HeadOther => {
                    matches!(part, BodyPart::Head | BodyPart::Other | BodyPart::HeadOther)
                }
                _ => part == group,
            };
            out.push(flag(member));
        }
    }
}

#[derive(Debug, Clone)]
pub struct BodyPartDetailedCode;

impl ActionFeature for BodyPartDetailedCode {
    fn id(&self) -> &'static str {
        "bodypart_detailed"
    }
    fn name(&self) -> &'static str {
        "Body Part (detailed)"
    }
    fn base_columns(&self) -> Vec<String> {
        vec!["bodypart_id".to_owned()]
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.push(f64::from(action.bodypart.id()));
    }
}

#[derive(Debug, Clone)]
pub struct BodyPartDetailedOnehot;

impl ActionFeature for BodyPartDetailedOnehot {
    fn id(&self) -> &'static str {
        "bodypart_detailed_onehot"
    }
    fn name(&self) -> &'static str {
        "Body Part (detailed, one-hot)"
    }
    fn base_columns(&self) -> Vec<String> {
        BodyPart::ALL
            .iter()
            .map(|part| format!("bodypart_{part}"))
            .collect()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend(BodyPart::ALL.iter().map(|&part| flag(action.bodypart == part)));
    }
}
