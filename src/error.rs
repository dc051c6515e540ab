//! Error type shared by every solver.

use crate::DragModel;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BallisticsError {
    /// No drag table for the model, or velocity outside (0, 10000) ft/s
    #[error("no drag retardation for {model} at {velocity} ft/s")]
    InvalidDragLookup { model: DragModel, velocity: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vertical velocity exceeded three times horizontal velocity
    #[error("trajectory diverged at {range_ft:.1} ft (vx = {vx:.3} ft/s, vy = {vy:.3} ft/s)")]
    DivergentTrajectory { range_ft: f64, vx: f64, vy: f64 },

    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("angle search did not converge after {trials} trials (best angle {best_angle_deg:.6} deg)")]
    NotConverged { best_angle_deg: f64, trials: usize },

    #[error("computation cancelled")]
    Cancelled,

    #[error("computation timed out")]
    TimedOut,
}

impl BallisticsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BallisticsError::InvalidInput(msg.into())
    }
}

/// Reject NaN, infinities and non-positive values for a named parameter
pub(crate) fn require_positive(name: &str, value: f64) -> Result<(), BallisticsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BallisticsError::invalid(format!("{name} must be positive and finite, got {value}")));
    }
    Ok(())
}

pub(crate) fn require_finite(name: &str, value: f64) -> Result<(), BallisticsError> {
    if !value.is_finite() {
        return Err(BallisticsError::invalid(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}
