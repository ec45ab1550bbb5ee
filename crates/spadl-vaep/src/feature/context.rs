use super::{BoxedFeatureFunction, FeatureFunction, flag};
use crate::gamestate::GameStates;

/// Whether each previous action was performed by the current action's team.
#[derive(Debug, Clone)]
pub struct Team;

impl FeatureFunction for Team {
    fn id(&self) -> &'static str {
        "team"
    }

    fn name(&self) -> &'static str {
        "Team"
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        (1..nb_prev_actions).map(|k| format!("team_{k}")).collect()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        for (state, row) in states.states().zip(rows) {
            let team_id = state.current().team_id;
            row.extend(
                state
                    .actions()
                    .skip(1)
                    .map(|previous| flag(previous.team_id == team_id)),
            );
        }
    }
}

/// Goals scored and conceded by the acting team before the current action.
///
/// Own goals count for the opponent of the team that made them. The score
/// is taken from the unpadded action table, so it covers the whole game up
/// to (not including) the current action regardless of the window size.
#[derive(Debug, Clone)]
pub struct GoalScore;

impl FeatureFunction for GoalScore {
    fn id(&self) -> &'static str {
        "goalscore"
    }

    fn name(&self) -> &'static str {
        "Goal Score"
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, _nb_prev_actions: usize) -> Vec<String> {
        ["goalscore_team", "goalscore_opponent", "goalscore_diff"]
            .map(str::to_owned)
            .to_vec()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        let actions = states.actions();
        let Some(first) = actions.first() else {
            return;
        };
        // Reference team: the first actor. Any other team id is its opponent.
        let team_a = first.team_id;
        let mut goals_a = 0_u32;
        let mut goals_b = 0_u32;
        for (action, row) in actions.iter().zip(rows) {
            let (team, opponent) = if action.team_id == team_a {
                (goals_a, goals_b)
            } else {
                (goals_b, goals_a)
            };
            row.extend([
                f64::from(team),
                f64::from(opponent),
                f64::from(team) - f64::from(opponent),
            ]);

            let for_a = if action.is_goal() {
                Some(action.team_id == team_a)
            } else if action.is_own_goal() {
                Some(action.team_id != team_a)
            } else {
                None
            };
            match for_a {
                Some(true) => goals_a += 1,
                Some(false) => goals_b += 1,
                None => {}
            }
        }
    }
}
