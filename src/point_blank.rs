//! Maximum point-blank range.
//!
//! The range window over which the trajectory stays inside a vital zone of a
//! given diameter is widest when the vertex sits exactly half the zone above the
//! line of sight. The solver searches the bore angle for that vertex height and
//! reads the crossings off the final trial.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::info;
use crate::constants::{
    FEET_PER_YARD, INCHES_PER_FOOT, PBR_SEARCH_INITIAL_STEP_DEG, PBR_SEARCH_TOLERANCE_MOA, SIGHT_IN_DISTANCE_FT,
};
use crate::error::{require_positive, BallisticsError};
use crate::inputs::Projectile;
use crate::integrator::{Flow, Integrator, ProjectileState, RunSummary, Termination};
use crate::search::{AngleSearch, Convergence, SearchLimits, Steer};
use crate::units::{deg_to_rad, moa_to_rad, rad_to_deg};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBlankRangeResult {
    /// Yards to where the rising trajectory crosses the line of sight
    pub near_zero: f64,
    /// Yards to where the falling trajectory crosses back below it
    pub far_zero: f64,
    /// Yards to where the trajectory first enters the vital zone
    pub min_point_blank_range: f64,
    /// Yards to where it leaves the vital zone again
    pub max_point_blank_range: f64,
    /// Height above the line of sight at 100 yards, inches
    pub sight_in_height: f64,
    /// Bore angle of the trajectory the ranges were read from, degrees
    pub zero_angle_deg: f64,
    pub convergence: Convergence,
    pub trials: usize,
}

impl PointBlankRangeResult {
    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }

    pub fn into_converged(self) -> Result<Self, BallisticsError> {
        if self.is_converged() {
            Ok(self)
        } else {
            Err(BallisticsError::NotConverged { best_angle_deg: self.zero_angle_deg, trials: self.trials })
        }
    }
}

/// First occurrence of each event along one trial, distances in feet
#[derive(Debug, Clone, Copy, Default)]
struct Crossings {
    near_zero: Option<f64>,
    far_zero: Option<f64>,
    min_pbr: Option<f64>,
    max_pbr: Option<f64>,
    sight_in: Option<f64>,
    vertex: Option<Vector2<f64>>,
}

impl Crossings {
    fn record(&mut self, state: &ProjectileState, half_zone_ft: f64) {
        let (x, y, vy) = (state.x(), state.y(), state.vy());

        if self.near_zero.is_none() && y > 0.0 && vy >= 0.0 {
            self.near_zero = Some(x);
        }
        if self.far_zero.is_none() && y < 0.0 && vy <= 0.0 {
            self.far_zero = Some(x);
        }
        if self.min_pbr.is_none() && y > -half_zone_ft {
            self.min_pbr = Some(x);
        } else if self.min_pbr.is_some() && self.max_pbr.is_none() && y < -half_zone_ft {
            self.max_pbr = Some(x);
        }
        if self.sight_in.is_none() && x >= SIGHT_IN_DISTANCE_FT {
            self.sight_in = Some(y * INCHES_PER_FOOT);
        }
        if self.vertex.is_none() && vy < 0.0 {
            self.vertex = Some(state.position);
        }
    }

    fn is_complete(&self) -> bool {
        self.near_zero.is_some()
            && self.far_zero.is_some()
            && self.min_pbr.is_some()
            && self.max_pbr.is_some()
            && self.sight_in.is_some()
            && self.vertex.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct Trial {
    angle_rad: f64,
    crossings: Crossings,
    summary: RunSummary,
}

/// Solve the point-blank range for a vital zone `vital_zone_inches` across
pub fn solve_point_blank_range(
    projectile: &Projectile,
    vital_zone_inches: f64,
) -> Result<PointBlankRangeResult, BallisticsError> {
    solve_point_blank_range_with(projectile, vital_zone_inches, &SearchLimits::default(), &|| false)
}

pub fn solve_point_blank_range_with(
    projectile: &Projectile,
    vital_zone_inches: f64,
    limits: &SearchLimits,
    cancel: &dyn Fn() -> bool,
) -> Result<PointBlankRangeResult, BallisticsError> {
    projectile.validate()?;
    require_positive("vital zone size", vital_zone_inches)?;
    limits.validate()?;

    let half_zone_ft = vital_zone_inches / 2.0 / INCHES_PER_FOOT;

    let search = AngleSearch {
        initial_step_rad: deg_to_rad(PBR_SEARCH_INITIAL_STEP_DEG),
        tolerance_rad: moa_to_rad(PBR_SEARCH_TOLERANCE_MOA),
        max_angle_rad: None,
    };

    let outcome = search.run(limits, cancel, |angle| {
        let trial = fire(projectile, angle, half_zone_ft, limits.max_steps_per_trial)?;
        let vertex = trial.crossings.vertex.ok_or_else(|| incomplete(&trial.summary))?;

        // Vertex above half the zone shoots over it; at or below, raise
        let steer = if vertex.y > half_zone_ft { Steer::Lower } else { Steer::Raise };
        Ok((steer, trial))
    })?;

    let trial = outcome.last_trial;
    let c = trial.crossings;
    let (Some(near), Some(far), Some(min), Some(max), Some(sight_in)) =
        (c.near_zero, c.far_zero, c.min_pbr, c.max_pbr, c.sight_in)
    else {
        return Err(incomplete(&trial.summary));
    };

    let result = PointBlankRangeResult {
        near_zero: near / FEET_PER_YARD,
        far_zero: far / FEET_PER_YARD,
        min_point_blank_range: min / FEET_PER_YARD,
        max_point_blank_range: max / FEET_PER_YARD,
        sight_in_height: sight_in,
        zero_angle_deg: rad_to_deg(trial.angle_rad),
        convergence: outcome.convergence,
        trials: outcome.trials,
    };
    info!(
        near_zero = result.near_zero,
        far_zero = result.far_zero,
        max_pbr = result.max_point_blank_range,
        trials = result.trials,
        "point blank range solved"
    );
    Ok(result)
}

/// One trial: integrate until every crossing has been seen
fn fire(
    projectile: &Projectile,
    angle_rad: f64,
    half_zone_ft: f64,
    max_steps: usize,
) -> Result<Trial, BallisticsError> {
    let integrator = Integrator::new(projectile.drag_model, projectile.ballistic_coefficient, angle_rad);
    let muzzle = ProjectileState::at_muzzle(projectile.muzzle_velocity, angle_rad, projectile.sight_height);

    let mut crossings = Crossings::default();
    let summary = integrator.run(muzzle, max_steps, |_, next| {
        crossings.record(next, half_zone_ft);
        if crossings.is_complete() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    })?;

    if summary.termination.is_degenerate() || summary.termination == Termination::StepLimit {
        return Err(BallisticsError::NumericalDegeneracy(format!(
            "point blank trial ended with {:?} after {} steps",
            summary.termination, summary.steps
        )));
    }

    Ok(Trial { angle_rad, crossings, summary })
}

fn incomplete(summary: &RunSummary) -> BallisticsError {
    let state = summary.final_state;
    match summary.termination {
        Termination::Divergent | Termination::VelocityCollapsed => {
            BallisticsError::DivergentTrajectory { range_ft: state.x(), vx: state.vx(), vy: state.vy() }
        }
        other => BallisticsError::NumericalDegeneracy(format!(
            "point blank trial ended with {other:?} before every crossing was found"
        )),
    }
}
