use serde::{Deserialize, Serialize};
use crate::DragModel;
use crate::constants::MAX_DRAG_VELOCITY_FPS;
use crate::drag::has_drag_table;
use crate::error::{require_finite, require_positive, BallisticsError};
use crate::wind::WindConditions;

/// Projectile and sighting system, in imperial units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projectile {
    pub drag_model: DragModel,
    pub ballistic_coefficient: f64,
    pub muzzle_velocity: f64,       // ft/s
    pub sight_height: f64,          // inches above bore centerline
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            drag_model: DragModel::G1,
            ballistic_coefficient: 0.5,
            muzzle_velocity: 2800.0,
            sight_height: 1.5,
        }
    }
}

impl Projectile {
    pub fn new(drag_model: DragModel, ballistic_coefficient: f64, muzzle_velocity: f64, sight_height: f64) -> Self {
        Self { drag_model, ballistic_coefficient, muzzle_velocity, sight_height }
    }

    /// Check the inputs every solver relies on before integrating
    pub fn validate(&self) -> Result<(), BallisticsError> {
        require_positive("ballistic coefficient", self.ballistic_coefficient)?;
        require_positive("muzzle velocity", self.muzzle_velocity)?;
        require_finite("sight height", self.sight_height)?;

        if !has_drag_table(self.drag_model) || self.muzzle_velocity >= MAX_DRAG_VELOCITY_FPS {
            return Err(BallisticsError::InvalidDragLookup {
                model: self.drag_model,
                velocity: self.muzzle_velocity,
            });
        }
        Ok(())
    }
}

/// Shot geometry and wind for a trajectory table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConditions {
    pub shooting_angle_deg: f64,    // uphill positive
    pub zero_angle_deg: f64,        // bore relative to sight line
    pub wind: WindConditions,
}

impl ShotConditions {
    pub fn new(shooting_angle_deg: f64, zero_angle_deg: f64, wind: WindConditions) -> Self {
        Self { shooting_angle_deg, zero_angle_deg, wind }
    }

    pub fn level(zero_angle_deg: f64) -> Self {
        Self { zero_angle_deg, ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        require_finite("shooting angle", self.shooting_angle_deg)?;
        require_finite("zero angle", self.zero_angle_deg)?;
        require_finite("wind speed", self.wind.speed_mph)?;
        require_finite("wind angle", self.wind.angle_deg)?;
        Ok(())
    }
}
