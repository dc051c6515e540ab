//! Bore angle that puts the trajectory through a height at a range.

use serde::{Deserialize, Serialize};
use tracing::info;
use crate::constants::{
    FEET_PER_YARD, INCHES_PER_FOOT, ZERO_SEARCH_INITIAL_STEP_DEG, ZERO_SEARCH_MAX_ANGLE_DEG,
    ZERO_SEARCH_TOLERANCE_MOA,
};
use crate::error::{require_finite, require_positive, BallisticsError};
use crate::inputs::Projectile;
use crate::integrator::{Flow, Integrator, ProjectileState, RunSummary, Termination, ZERO_STEP_SCALE};
use crate::search::{AngleSearch, Convergence, SearchLimits, Steer};
use crate::units::{deg_to_rad, moa_to_rad, rad_to_deg};

/// Bore angle relative to the line of sight, with how the search ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroSolution {
    pub angle_deg: f64,
    pub convergence: Convergence,
    pub trials: usize,
}

impl ZeroSolution {
    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }

    /// The angle if the search converged, `NotConverged` otherwise
    pub fn into_converged(self) -> Result<f64, BallisticsError> {
        if self.is_converged() {
            Ok(self.angle_deg)
        } else {
            Err(BallisticsError::NotConverged { best_angle_deg: self.angle_deg, trials: self.trials })
        }
    }
}

/// Solve for the bore angle (degrees) that crosses `y_intercept_inches` above
/// the line of sight at `zero_range_yards`, on level ground in still air.
pub fn solve_zero_angle(
    projectile: &Projectile,
    zero_range_yards: f64,
    y_intercept_inches: f64,
) -> Result<ZeroSolution, BallisticsError> {
    solve_zero_angle_with(projectile, zero_range_yards, y_intercept_inches, &SearchLimits::default(), &|| false)
}

pub fn solve_zero_angle_with(
    projectile: &Projectile,
    zero_range_yards: f64,
    y_intercept_inches: f64,
    limits: &SearchLimits,
    cancel: &dyn Fn() -> bool,
) -> Result<ZeroSolution, BallisticsError> {
    projectile.validate()?;
    require_positive("zero range", zero_range_yards)?;
    require_finite("y intercept", y_intercept_inches)?;
    limits.validate()?;

    let range_ft = zero_range_yards * FEET_PER_YARD;
    let target_ft = y_intercept_inches / INCHES_PER_FOOT;

    let search = AngleSearch {
        initial_step_rad: deg_to_rad(ZERO_SEARCH_INITIAL_STEP_DEG),
        tolerance_rad: moa_to_rad(ZERO_SEARCH_TOLERANCE_MOA),
        max_angle_rad: Some(deg_to_rad(ZERO_SEARCH_MAX_ANGLE_DEG)),
    };

    let outcome = search.run(limits, cancel, |angle| {
        let summary = fire(projectile, angle, range_ft, target_ft, limits.max_steps_per_trial)?;
        Ok((steer(&summary, target_ft)?, summary))
    })?;

    check_final_trial(outcome.convergence, &outcome.last_trial)?;

    let solution = ZeroSolution {
        angle_deg: rad_to_deg(outcome.angle_rad),
        convergence: outcome.convergence,
        trials: outcome.trials,
    };
    info!(
        zero_range_yards,
        angle_deg = solution.angle_deg,
        trials = solution.trials,
        convergence = ?solution.convergence,
        "zero angle solved"
    );
    Ok(solution)
}

/// One trial: integrate until past the zero range, or until the projectile is
/// falling below the target height and can no longer reach it.
fn fire(
    projectile: &Projectile,
    angle_rad: f64,
    range_ft: f64,
    target_ft: f64,
    max_steps: usize,
) -> Result<RunSummary, BallisticsError> {
    let integrator = Integrator::new(projectile.drag_model, projectile.ballistic_coefficient, angle_rad)
        .with_step_scale(ZERO_STEP_SCALE);
    let muzzle = ProjectileState::at_muzzle(projectile.muzzle_velocity, angle_rad, projectile.sight_height);

    integrator.run(muzzle, max_steps, |_, next| {
        if next.x() > range_ft || (next.vy() < 0.0 && next.y() < target_ft) {
            Flow::Stop
        } else {
            Flow::Continue
        }
    })
}

/// A best-effort angle is already flagged; a converged one must rest on a trial
/// that did not diverge.
fn check_final_trial(convergence: Convergence, last: &RunSummary) -> Result<(), BallisticsError> {
    if convergence.is_converged()
        && matches!(last.termination, Termination::Divergent | Termination::VelocityCollapsed)
    {
        let state = last.final_state;
        return Err(BallisticsError::DivergentTrajectory { range_ft: state.x(), vx: state.vx(), vy: state.vy() });
    }
    Ok(())
}

fn steer(summary: &RunSummary, target_ft: f64) -> Result<Steer, BallisticsError> {
    match summary.termination {
        // A diverged run steers on the height it reached, like an early stop
        Termination::Stopped | Termination::Divergent | Termination::VelocityCollapsed => {
            let y = summary.final_state.y();
            Ok(if y > target_ft {
                Steer::Lower
            } else if y < target_ft {
                Steer::Raise
            } else {
                Steer::Hold
            })
        }
        Termination::NonFinite | Termination::TimeStepCollapsed | Termination::StepLimit => {
            Err(BallisticsError::NumericalDegeneracy(format!(
                "zero trial ended with {:?} after {} steps",
                summary.termination, summary.steps
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DragModel;
    use nalgebra::Vector2;

    fn rifle() -> Projectile {
        Projectile::new(DragModel::G1, 0.465, 2650.0, 1.6)
    }

    #[test]
    fn test_reference_zero() {
        let solution = solve_zero_angle(&rifle(), 200.0, 0.0).unwrap();
        assert!(solution.is_converged());
        assert!((solution.angle_deg - 0.0998687744140625).abs() < 1e-6, "zero angle: {}", solution.angle_deg);
    }

    #[test]
    fn test_diverged_trial_above_target_lowers_angle() {
        // Steep trials fall nearly straight down while still above the sight line
        let draggy = Projectile::new(DragModel::G1, 0.05, 400.0, 1.5);
        let solution = solve_zero_angle(&draggy, 360.0, 0.0).unwrap();

        assert_eq!(solution.convergence, Convergence::Converged);
        assert!((solution.angle_deg - 16.2857).abs() < 1e-3, "zero angle: {}", solution.angle_deg);
    }

    #[test]
    fn test_steer_on_diverged_state() {
        let mut state = ProjectileState::at_muzzle(400.0, 0.0, 0.0);
        state.position = Vector2::new(900.0, 2.0);
        state.velocity = Vector2::new(10.0, -40.0);
        let mut summary = RunSummary { final_state: state, steps: 100, termination: Termination::Divergent };

        assert_eq!(steer(&summary, 0.0).unwrap(), Steer::Lower);
        assert_eq!(steer(&summary, 3.0).unwrap(), Steer::Raise);

        summary.termination = Termination::VelocityCollapsed;
        assert_eq!(steer(&summary, 0.0).unwrap(), Steer::Lower);

        summary.termination = Termination::StepLimit;
        assert!(matches!(steer(&summary, 0.0), Err(BallisticsError::NumericalDegeneracy(_))));
    }

    #[test]
    fn test_converged_on_diverged_trial_is_an_error() {
        let mut state = ProjectileState::at_muzzle(400.0, 0.0, 0.0);
        state.position = Vector2::new(900.0, 0.0);
        state.velocity = Vector2::new(10.0, -40.0);
        let diverged = RunSummary { final_state: state, steps: 100, termination: Termination::Divergent };

        match check_final_trial(Convergence::Converged, &diverged) {
            Err(BallisticsError::DivergentTrajectory { range_ft, vx, vy }) => {
                assert_eq!((range_ft, vx, vy), (900.0, 10.0, -40.0));
            }
            other => panic!("{other:?}"),
        }

        // Best-effort results keep their flag instead
        assert!(check_final_trial(Convergence::AngleLimitExceeded, &diverged).is_ok());

        let stopped = RunSummary { termination: Termination::Stopped, ..diverged };
        assert!(check_final_trial(Convergence::Converged, &stopped).is_ok());
    }

    #[test]
    fn test_longer_zero_needs_more_elevation() {
        let angles: Vec<f64> = [100.0, 200.0, 300.0, 500.0, 800.0]
            .iter()
            .map(|&range| solve_zero_angle(&rifle(), range, 0.0).unwrap().into_converged().unwrap())
            .collect();

        for pair in angles.windows(2) {
            assert!(pair[1] > pair[0], "{angles:?}");
        }
        assert!(angles.iter().all(|a| (0.0..=45.0).contains(a)));
    }

    #[test]
    fn test_positive_intercept_raises_angle() {
        let level = solve_zero_angle(&rifle(), 100.0, 0.0).unwrap().angle_deg;
        let high = solve_zero_angle(&rifle(), 100.0, 3.0).unwrap().angle_deg;
        assert!(high > level);
    }

    #[test]
    fn test_unreachable_height_is_best_effort() {
        // 10000 in above the sight line at 100 yd needs far more than 45 degrees
        let solution = solve_zero_angle(&rifle(), 100.0, 10_000.0).unwrap();

        assert_eq!(solution.convergence, Convergence::AngleLimitExceeded);
        assert_eq!(solution.trials, 5);
        assert!(solution.angle_deg > 45.0);
        assert!(matches!(solution.into_converged(), Err(BallisticsError::NotConverged { .. })));
    }

    #[test]
    fn test_cancelled_search() {
        let err = solve_zero_angle_with(&rifle(), 200.0, 0.0, &SearchLimits::default(), &|| true).unwrap_err();
        assert_eq!(err, BallisticsError::Cancelled);
    }

    #[test]
    fn test_step_limit_is_degenerate() {
        let limits = SearchLimits { max_steps_per_trial: 10, ..Default::default() };
        let err = solve_zero_angle_with(&rifle(), 200.0, 0.0, &limits, &|| false).unwrap_err();
        assert!(matches!(err, BallisticsError::NumericalDegeneracy(_)));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(solve_zero_angle(&rifle(), 0.0, 0.0), Err(BallisticsError::InvalidInput(_))));
        assert!(matches!(solve_zero_angle(&rifle(), 100.0, f64::NAN), Err(BallisticsError::InvalidInput(_))));

        let g4 = Projectile { drag_model: DragModel::G4, ..rifle() };
        assert!(matches!(solve_zero_angle(&g4, 100.0, 0.0), Err(BallisticsError::InvalidDragLookup { .. })));
    }

    #[test]
    fn test_repeatable() {
        let a = solve_zero_angle(&rifle(), 200.0, 0.0).unwrap();
        let b = solve_zero_angle(&rifle(), 200.0, 0.0).unwrap();
        assert_eq!(a.angle_deg.to_bits(), b.angle_deg.to_bits());
    }
}
