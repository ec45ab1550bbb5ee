use spadl::{
    Action,
    pitch::{GOAL_X, GOAL_Y},
};

use super::{ActionFeature, BoxedFeatureFunction, FeatureFunction};
use crate::gamestate::GameStates;

/// Smallest time difference used as a divisor.
const MIN_TIME_DELTA: f64 = 1e-6;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|&name| name.to_owned()).collect()
}

/// Distance and angle from `(x, y)` to the centre of the attacked goal.
///
/// The angle is measured against the goal line normal and lies in
/// `[0, π/2]`.
fn polar(x: f64, y: f64) -> (f64, f64) {
    let dx = (GOAL_X - x).abs();
    let dy = (GOAL_Y - y).abs();
    (dx.hypot(dy), dy.atan2(dx))
}

#[derive(Debug, Clone)]
pub struct StartLocation;

impl ActionFeature for StartLocation {
    fn id(&self) -> &'static str {
        "startlocation"
    }
    fn name(&self) -> &'static str {
        "Start Location"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["start_x", "start_y"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend([action.start_x, action.start_y]);
    }
}

#[derive(Debug, Clone)]
pub struct EndLocation;

impl ActionFeature for EndLocation {
    fn id(&self) -> &'static str {
        "endlocation"
    }
    fn name(&self) -> &'static str {
        "End Location"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["end_x", "end_y"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        out.extend([action.end_x, action.end_y]);
    }
}

#[derive(Debug, Clone)]
pub struct StartPolar;

impl ActionFeature for StartPolar {
    fn id(&self) -> &'static str {
        "startpolar"
    }
    fn name(&self) -> &'static str {
        "Start Location (polar)"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["start_dist_to_goal", "start_angle_to_goal"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let (dist, angle) = polar(action.start_x, action.start_y);
        out.extend([dist, angle]);
    }
}

#[derive(Debug, Clone)]
pub struct EndPolar;

impl ActionFeature for EndPolar {
    fn id(&self) -> &'static str {
        "endpolar"
    }
    fn name(&self) -> &'static str {
        "End Location (polar)"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["end_dist_to_goal", "end_angle_to_goal"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let (dist, angle) = polar(action.end_x, action.end_y);
        out.extend([dist, angle]);
    }
}

/// Movement vector of the ball during the action and its length.
#[derive(Debug, Clone)]
pub struct Movement;

impl ActionFeature for Movement {
    fn id(&self) -> &'static str {
        "movement"
    }
    fn name(&self) -> &'static str {
        "Movement"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["dx", "dy", "movement"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let (dx, dy) = (action.dx(), action.dy());
        out.extend([dx, dy, dx.hypot(dy)]);
    }
}

#[derive(Debug, Clone)]
pub struct MovementPolar;

impl ActionFeature for MovementPolar {
    fn id(&self) -> &'static str {
        "movement_polar"
    }
    fn name(&self) -> &'static str {
        "Movement (polar)"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["mov_d", "mov_angle"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let (dx, dy) = (action.dx(), action.dy());
        // purely horizontal movement has angle 0 in both directions
        let angle = if dy == 0.0 { 0.0 } else { dy.atan2(dx) };
        out.extend([dx.hypot(dy), angle]);
    }
}

/// Unit vector of the movement.
#[derive(Debug, Clone)]
pub struct Direction;

impl ActionFeature for Direction {
    fn id(&self) -> &'static str {
        "direction"
    }
    fn name(&self) -> &'static str {
        "Direction"
    }
    fn base_columns(&self) -> Vec<String> {
        columns(&["dx", "dy"])
    }
    fn extract(&self, action: &Action, out: &mut Vec<f64>) {
        let (dx, dy) = (action.dx(), action.dy());
        let length = dx.hypot(dy);
        if length > 0.0 {
            out.extend([dx / length, dy / length]);
        } else {
            out.extend([dx, dy]);
        }
    }
}

/// Ball travel between the end of a previous action and the start of the
/// current one, for every previous frame.
#[derive(Debug, Clone)]
pub struct SpaceDelta;

impl FeatureFunction for SpaceDelta {
    fn id(&self) -> &'static str {
        "space_delta"
    }

    fn name(&self) -> &'static str {
        "Space Delta"
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        (1..nb_prev_actions)
            .flat_map(|k| {
                [
                    format!("dx_a0{k}"),
                    format!("dy_a0{k}"),
                    format!("mov_a0{k}"),
                    format!("angle_a0{k}"),
                ]
            })
            .collect()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        for (state, row) in states.states().zip(rows) {
            let current = state.current();
            for previous in state.actions().skip(1) {
                let dx = previous.end_x - current.start_x;
                let dy = previous.end_y - current.start_y;
                row.extend([dx, dy, dx.hypot(dy), dy.atan2(dx)]);
            }
        }
    }
}

/// Ball speed between the end of a previous action and the start of the
/// current one.
#[derive(Debug, Clone)]
pub struct Speed;

impl FeatureFunction for Speed {
    fn id(&self) -> &'static str {
        "speed"
    }

    fn name(&self) -> &'static str {
        "Speed"
    }

    fn clone_boxed(&self) -> BoxedFeatureFunction {
        Box::new(self.clone())
    }

    fn column_names(&self, nb_prev_actions: usize) -> Vec<String> {
        (1..nb_prev_actions)
            .flat_map(|k| {
                [
                    format!("speedx_a0{k}"),
                    format!("speedy_a0{k}"),
                    format!("speed_a0{k}"),
                ]
            })
            .collect()
    }

    fn compute(&self, states: &GameStates, rows: &mut [Vec<f64>]) {
        for (state, row) in states.states().zip(rows) {
            let current = state.current();
            for previous in state.actions().skip(1) {
                let dt = current.time_seconds_overall() - previous.time_seconds_overall();
                let dt = if dt <= 0.0 { MIN_TIME_DELTA } else { dt };
                let dx = previous.end_x - current.start_x;
                let dy = previous.end_y - current.start_y;
                row.extend([dx.abs() / dt, dy.abs() / dt, dx.hypot(dy) / dt]);
            }
        }
    }
}
