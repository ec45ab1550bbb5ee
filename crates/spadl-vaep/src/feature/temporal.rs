use spadl::Action;

use super::{ActionFeature, BoxedFeatureFunction, FeatureFunction};
use crate::gamestate::GameStates;

/// Period, time in the period and time on the game clock.
#[derive(Debug, Clone)]
pub struct Time;

impl ActionFeature for Time {
    fn id(&self) -> &'static str {
        "time"
    }
    fn name(&self) -> &'static str {
        "Time"
    }
    fn base_columns(&self) -> Vec<String> {
        ["period_id", "time_seconds", "time_seconds_overall"]
            .map(str::to_owned)
            .to_vec()
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend([
            f64::from(action.period_id),
            action.time_seconds,
            action.time_seconds_overall(),
        ]);
    }
}

/// Seconds elapsed since each previous action.
///
/// Measured on the game clock when the window reaches into an earlier
/// period, and clamped at zero because stoppage time can push the end of a
/// period past the regular start of the next one. A padded frame repeats the
/// first action of its padding scope and yields the time elapsed since it.
#[derive(Debug, Clone)]
pub struct TimeDelta;

impl FeatureFunction for TimeDelta {
    fn id(&self) -> &'static str {
        "time_delta"
    }

    fn name(&self) -> &'static str {
        "Time Delta"
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        (1..nb_prev_actions).map(|k| format!("time_delta_{k}")).collect()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        for (state, row) in states.states().zip(rows) {
            let now = state.current().time_seconds_overall();
            row.extend(
                state
                    .actions()
                    .skip(1)
                    .map(|previous| (now - previous.time_seconds_overall()).max(0.0)),
            );
        }
    }
}
