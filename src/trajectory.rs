//! Ballistic solution table in one-yard increments.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::constants::{FEET_PER_YARD, INCHES_PER_FOOT, MAX_RANGE_YARDS};
use crate::error::BallisticsError;
use crate::inputs::{Projectile, ShotConditions};
use crate::integrator::{Flow, Integrator, ProjectileState, Termination};
use crate::search::SearchLimits;
use crate::units::{deg_to_rad, rad_to_moa};
use crate::wind::windage;

/// One sampled row of a trajectory table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Downrange distance, yards
    pub range: usize,
    /// Height relative to the line of sight, inches (negative below)
    pub drop: f64,
    /// Sight correction to hit this range, MOA
    pub correction: f64,
    /// Time of flight, seconds
    pub time: f64,
    pub windage_inches: f64,
    pub windage_moa: f64,
    /// Projectile speed, ft/s
    pub velocity: f64,
    pub horizontal_velocity: f64,
    pub vertical_velocity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryTable {
    pub points: Vec<TrajectoryPoint>,
    /// Why integration stopped; every reason is a normal end of table
    pub termination: Termination,
    pub steps: usize,
}

impl TrajectoryTable {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter()
    }

    /// Row for `yards` downrange, if the trajectory got that far
    pub fn at_yard(&self, yards: usize) -> Option<&TrajectoryPoint> {
        self.points.get(yards)
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Furthest yard in the table
    pub fn max_range(&self) -> usize {
        self.last().map_or(0, |p| p.range)
    }
}

/// Generate a trajectory table up to the maximum range
pub fn generate_table(projectile: &Projectile, conditions: &ShotConditions) -> Result<TrajectoryTable, BallisticsError> {
    generate_table_with(projectile, conditions, &SearchLimits::default())
}

/// Generate a trajectory table, bounding integration by `limits.max_steps_per_trial`
pub fn generate_table_with(
    projectile: &Projectile,
    conditions: &ShotConditions,
    limits: &SearchLimits,
) -> Result<TrajectoryTable, BallisticsError> {
    projectile.validate()?;
    conditions.validate()?;
    limits.validate()?;

    let crosswind = conditions.wind.crosswind();
    let gravity_angle = deg_to_rad(conditions.shooting_angle_deg + conditions.zero_angle_deg);
    let integrator = Integrator::new(projectile.drag_model, projectile.ballistic_coefficient, gravity_angle)
        .with_headwind(conditions.wind.headwind_fps());

    let muzzle = ProjectileState::at_muzzle(
        projectile.muzzle_velocity,
        deg_to_rad(conditions.zero_angle_deg),
        projectile.sight_height,
    );

    debug!(
        drag_model = %projectile.drag_model,
        bc = projectile.ballistic_coefficient,
        mv = projectile.muzzle_velocity,
        gravity_x = integrator.gravity().x,
        gravity_y = integrator.gravity().y,
        "generating trajectory table"
    );

    let mut points = Vec::new();
    let summary = integrator.run(muzzle, limits.max_steps_per_trial, |prev, next| {
        let yard = points.len();
        if prev.x() / FEET_PER_YARD >= yard as f64 {
            points.push(sample(yard, prev, next, crosswind, projectile.muzzle_velocity));
        }
        if points.len() > MAX_RANGE_YARDS {
            Flow::Stop
        } else {
            Flow::Continue
        }
    })?;

    info!(
        points = points.len(),
        steps = summary.steps,
        termination = ?summary.termination,
        "trajectory table complete"
    );

    Ok(TrajectoryTable { points, termination: summary.termination, steps: summary.steps })
}

// Position is read before the step, time and velocity after it.
fn sample(
    yard: usize,
    prev: &ProjectileState,
    next: &ProjectileState,
    crosswind_mph: f64,
    muzzle_velocity: f64,
) -> TrajectoryPoint {
    let (x, y) = (prev.x(), prev.y());
    let windage_inches = windage(crosswind_mph, muzzle_velocity, x, next.time);

    let (correction, windage_moa) = if x > 0.0 {
        (
            -rad_to_moa((y / x).atan()),
            rad_to_moa((windage_inches / (INCHES_PER_FOOT * x)).atan()),
        )
    } else {
        (0.0, 0.0)
    };

    TrajectoryPoint {
        range: yard,
        drop: y * INCHES_PER_FOOT,
        correction,
        time: next.time,
        windage_inches,
        windage_moa,
        velocity: prev.speed(),
        horizontal_velocity: next.vx(),
        vertical_velocity: next.vy(),
    }
}
