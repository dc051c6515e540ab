//! A named trajectory table together with the inputs that produced it.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::constants::KINETIC_ENERGY_DIVISOR;
use crate::error::{require_positive, BallisticsError};
use crate::inputs::{Projectile, ShotConditions};
use crate::search::SearchLimits;
use crate::trajectory::{generate_table_with, TrajectoryPoint, TrajectoryTable};
use crate::wind::WindConditions;
use crate::zero::solve_zero_angle_with;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    pub projectile: Projectile,
    pub conditions: ShotConditions,
    pub weight_grains: f64,
    /// Range the bore angle was solved for, when it was solved rather than given
    pub zero_range_yards: Option<f64>,
    pub table: TrajectoryTable,
}

impl Solution {
    /// Generate the table for explicitly given conditions
    pub fn compute(
        name: impl Into<String>,
        projectile: &Projectile,
        conditions: &ShotConditions,
        weight_grains: f64,
    ) -> Result<Self, BallisticsError> {
        Self::compute_with(name, projectile, conditions, weight_grains, &SearchLimits::default())
    }

    pub fn compute_with(
        name: impl Into<String>,
        projectile: &Projectile,
        conditions: &ShotConditions,
        weight_grains: f64,
        limits: &SearchLimits,
    ) -> Result<Self, BallisticsError> {
        require_positive("bullet weight", weight_grains)?;
        let table = generate_table_with(projectile, conditions, limits)?;

        Ok(Self {
            name: name.into(),
            projectile: *projectile,
            conditions: *conditions,
            weight_grains,
            zero_range_yards: None,
            table,
        })
    }

    /// Solve the bore angle for a level zero at `zero_range_yards`, then generate
    /// the table for the given shooting angle and wind.
    pub fn zeroed(
        name: impl Into<String>,
        projectile: &Projectile,
        weight_grains: f64,
        zero_range_yards: f64,
        shooting_angle_deg: f64,
        wind: WindConditions,
    ) -> Result<Self, BallisticsError> {
        Self::zeroed_with(
            name,
            projectile,
            weight_grains,
            zero_range_yards,
            shooting_angle_deg,
            wind,
            &SearchLimits::default(),
        )
    }

    /// [`Solution::zeroed`] with `limits` bounding both the zero search and the table
    pub fn zeroed_with(
        name: impl Into<String>,
        projectile: &Projectile,
        weight_grains: f64,
        zero_range_yards: f64,
        shooting_angle_deg: f64,
        wind: WindConditions,
        limits: &SearchLimits,
    ) -> Result<Self, BallisticsError> {
        let zero_angle_deg =
            solve_zero_angle_with(projectile, zero_range_yards, 0.0, limits, &|| false)?.into_converged()?;
        debug!(zero_range_yards, zero_angle_deg, "zeroed solution");

        let conditions = ShotConditions::new(shooting_angle_deg, zero_angle_deg, wind);
        let mut solution = Self::compute_with(name, projectile, &conditions, weight_grains, limits)?;
        solution.zero_range_yards = Some(zero_range_yards);
        Ok(solution)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Row at `yard`, or the last row when the trajectory ended before it
    pub fn point(&self, yard: usize) -> Option<&TrajectoryPoint> {
        self.table.at_yard(yard).or_else(|| self.table.last())
    }

    pub fn drop(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.drop)
    }

    pub fn correction(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.correction)
    }

    pub fn time(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.time)
    }

    pub fn windage(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.windage_inches)
    }

    pub fn windage_moa(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.windage_moa)
    }

    pub fn velocity(&self, yard: usize) -> Option<f64> {
        self.point(yard).map(|p| p.velocity)
    }

    /// Kinetic energy in ft·lbf
    pub fn kinetic_energy(&self, yard: usize) -> Option<f64> {
        self.velocity(yard).map(|v| self.weight_grains * v * v / KINETIC_ENERGY_DIVISOR)
    }
}
