//! Projectile state integrator.
//!
//! One step advances a 2D state (downrange `x`, bore-normal `y`) under drag and
//! angle-resolved gravity. Velocity is updated with explicit Euler and position
//! with the trapezoidal rule on the old and new velocities. The timestep is
//! adaptive: `scale / speed`, so every step covers roughly `scale` feet of path.
//!
//! All three solvers drive trajectories through [`Integrator::run`], which owns
//! the termination checks and defers the solver-specific stop predicate to a
//! closure.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::trace;
use crate::DragModel;
use crate::constants::{
    DIVERGENCE_RATIO, GRAVITY_FPS2, INCHES_PER_FOOT, MIN_HORIZONTAL_VELOCITY_FPS, MIN_TIME_STEP_S,
};
use crate::drag::retardation;
use crate::error::BallisticsError;

/// Step scale (feet of path per step) used by the table and point-blank-range solvers
pub const TABLE_STEP_SCALE: f64 = 0.5;

/// Step scale used by the zero-angle search
pub const ZERO_STEP_SCALE: f64 = 1.0;

/// Position (ft) and velocity (ft/s) of the projectile at `time` seconds.
///
/// `y` is measured from the line of sight: a projectile leaving a bore that sits
/// `sight_height` inches below the sight starts at `y = -sight_height / 12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileState {
    pub time: f64,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
}

impl ProjectileState {
    /// State at the muzzle for a bore elevated `launch_angle_rad` above the sight line
    pub fn at_muzzle(muzzle_velocity: f64, launch_angle_rad: f64, sight_height_in: f64) -> Self {
        Self {
            time: 0.0,
            position: Vector2::new(0.0, -sight_height_in / INCHES_PER_FOOT),
            velocity: Vector2::new(
                muzzle_velocity * launch_angle_rad.cos(),
                muzzle_velocity * launch_angle_rad.sin(),
            ),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    #[inline]
    pub fn vx(&self) -> f64 {
        self.velocity.x
    }

    #[inline]
    pub fn vy(&self) -> f64 {
        self.velocity.y
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Falling (or climbing) nearly straight: |vy| > 3 |vx|
    pub fn is_divergent(&self) -> bool {
        self.vy().abs() > (DIVERGENCE_RATIO * self.vx()).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite())
    }
}

/// Why an integration run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The caller's predicate asked to stop
    Stopped,
    /// Vertical velocity dominated horizontal velocity
    Divergent,
    /// Horizontal velocity fell below the stop threshold
    VelocityCollapsed,
    /// A state component became NaN or infinite
    NonFinite,
    /// The adaptive timestep fell below its floor
    TimeStepCollapsed,
    /// The step budget ran out
    StepLimit,
}

impl Termination {
    /// Conditions that indicate a broken simulation rather than a finished one
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Termination::NonFinite | Termination::TimeStepCollapsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub final_state: ProjectileState,
    pub steps: usize,
    pub termination: Termination,
}

/// Fixed environment for one trajectory: drag, resolved gravity and headwind
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    drag_model: DragModel,
    ballistic_coefficient: f64,
    gravity: Vector2<f64>,
    headwind_fps: f64,
    step_scale: f64,
}

impl Integrator {
    /// `gravity_angle_rad` is the angle between the line of sight frame and
    /// horizontal: shooting angle plus bore angle for tables, the trial angle
    /// for the angle searches.
    pub fn new(drag_model: DragModel, ballistic_coefficient: f64, gravity_angle_rad: f64) -> Self {
        Self {
            drag_model,
            ballistic_coefficient,
            gravity: Vector2::new(
                GRAVITY_FPS2 * gravity_angle_rad.sin(),
                GRAVITY_FPS2 * gravity_angle_rad.cos(),
            ),
            headwind_fps: 0.0,
            step_scale: TABLE_STEP_SCALE,
        }
    }

    pub fn with_headwind(mut self, headwind_fps: f64) -> Self {
        self.headwind_fps = headwind_fps;
        self
    }

    pub fn with_step_scale(mut self, step_scale: f64) -> Self {
        self.step_scale = step_scale;
        self
    }

    pub fn gravity(&self) -> Vector2<f64> {
        self.gravity
    }

    pub fn time_step(&self, state: &ProjectileState) -> f64 {
        self.step_scale / state.speed()
    }

    /// Advance one adaptive step
    pub fn step(&self, state: &ProjectileState) -> Result<ProjectileState, BallisticsError> {
        self.step_with(state, self.time_step(state))
    }

    fn step_with(&self, state: &ProjectileState, dt: f64) -> Result<ProjectileState, BallisticsError> {
        let speed = state.speed();
        let dv = retardation(self.drag_model, self.ballistic_coefficient, speed + self.headwind_fps)?;

        let drag = -(state.velocity / speed) * dv;
        let velocity = state.velocity + (drag + self.gravity) * dt;
        let position = state.position + (velocity + state.velocity) * (dt / 2.0);

        Ok(ProjectileState { time: state.time + dt, position, velocity })
    }

    /// Integrate from `initial` until `observe` returns [`Flow::Stop`] or a
    /// termination condition fires.
    ///
    /// `observe` receives the state before and after every step. Termination
    /// conditions are normal outcomes reported in the summary; only a failed
    /// drag lookup is an error.
    pub fn run<F>(
        &self,
        initial: ProjectileState,
        max_steps: usize,
        mut observe: F,
    ) -> Result<RunSummary, BallisticsError>
    where
        F: FnMut(&ProjectileState, &ProjectileState) -> Flow,
    {
        let mut state = initial;

        for steps in 0..max_steps {
            let finish = move |termination| RunSummary { final_state: state, steps, termination };

            if !state.is_finite() {
                return Ok(finish(Termination::NonFinite));
            }
            if state.vx() < MIN_HORIZONTAL_VELOCITY_FPS {
                return Ok(finish(Termination::VelocityCollapsed));
            }

            let dt = self.time_step(&state);
            if !dt.is_finite() || dt < MIN_TIME_STEP_S {
                return Ok(finish(Termination::TimeStepCollapsed));
            }

            let next = self.step_with(&state, dt)?;
            let flow = observe(&state, &next);
            state = next;

            let finish = move |termination| RunSummary { final_state: state, steps: steps + 1, termination };
            if flow == Flow::Stop {
                return Ok(finish(Termination::Stopped));
            }
            if state.is_divergent() {
                trace!(x = state.x(), vx = state.vx(), vy = state.vy(), "trajectory diverged");
                return Ok(finish(Termination::Divergent));
            }
        }

        Ok(RunSummary { final_state: state, steps: max_steps, termination: Termination::StepLimit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_fire() -> (Integrator, ProjectileState) {
        let integrator = Integrator::new(DragModel::G1, 0.5, 0.0);
        let state = ProjectileState::at_muzzle(2800.0, 0.0, 1.5);
        (integrator, state)
    }

    #[test]
    fn test_muzzle_state() {
        let state = ProjectileState::at_muzzle(2800.0, 0.0, 1.5);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.x(), 0.0);
        assert!((state.y() + 0.125).abs() < 1e-12);
        assert_eq!(state.vx(), 2800.0);
        assert_eq!(state.vy(), 0.0);
    }

    #[test]
    fn test_gravity_resolution() {
        let level = Integrator::new(DragModel::G1, 0.5, 0.0);
        assert_eq!(level.gravity().x, 0.0);
        assert_eq!(level.gravity().y, GRAVITY_FPS2);

        let uphill = Integrator::new(DragModel::G1, 0.5, std::f64::consts::FRAC_PI_6);
        assert!((uphill.gravity().x - GRAVITY_FPS2 * 0.5).abs() < 1e-12);
        assert!((uphill.gravity().norm() - GRAVITY_FPS2.abs()).abs() < 1e-12);
    }

    #[test]
    fn test_single_step_matches_hand_calculation() {
        let (integrator, state) = flat_fire();
        let next = integrator.step(&state).unwrap();

        let dt = 0.5 / 2800.0;
        let dv = retardation(DragModel::G1, 0.5, 2800.0).unwrap();
        let vx = 2800.0 - dt * dv;
        let vy = dt * GRAVITY_FPS2;

        assert!((next.time - dt).abs() < 1e-15);
        assert!((next.vx() - vx).abs() < 1e-9);
        assert!((next.vy() - vy).abs() < 1e-12);
        assert!((next.x() - dt * (vx + 2800.0) / 2.0).abs() < 1e-12);
        assert!((next.y() - (-0.125 + dt * vy / 2.0)).abs() < 1e-15);
    }

    #[test]
    fn test_headwind_increases_drag() {
        let (calm, state) = flat_fire();
        let windy = calm.with_headwind(20.0);

        let a = calm.step(&state).unwrap();
        let b = windy.step(&state).unwrap();
        assert!(b.vx() < a.vx());
    }

    #[test]
    fn test_step_scale_controls_distance_per_step() {
        let (integrator, state) = flat_fire();
        let coarse = integrator.with_step_scale(ZERO_STEP_SCALE).step(&state).unwrap();
        let fine = integrator.step(&state).unwrap();
        assert!((coarse.time - 2.0 * fine.time).abs() < 1e-15);
        assert!(coarse.x() > 0.99 && coarse.x() < 1.0);
    }

    #[test]
    fn test_run_stops_on_predicate() {
        let (integrator, state) = flat_fire();
        let summary = integrator
            .run(state, 1_000_000, |_, next| if next.x() >= 300.0 { Flow::Stop } else { Flow::Continue })
            .unwrap();

        assert_eq!(summary.termination, Termination::Stopped);
        assert!(summary.final_state.x() >= 300.0);
        assert!(summary.final_state.x() < 301.0);
        assert!(summary.steps > 500);
    }

    #[test]
    fn test_run_terminates_on_divergence() {
        let integrator = Integrator::new(DragModel::G1, 0.5, 0.0);
        let state = ProjectileState::at_muzzle(300.0, 0.0, 1.5);
        let summary = integrator.run(state, 10_000_000, |_, _| Flow::Continue).unwrap();

        assert_eq!(summary.termination, Termination::Divergent);
        assert!(summary.final_state.is_divergent());
        assert!(summary.final_state.vy() < 0.0);
    }

    #[test]
    fn test_run_step_limit() {
        let (integrator, state) = flat_fire();
        let summary = integrator.run(state, 10, |_, _| Flow::Continue).unwrap();
        assert_eq!(summary.termination, Termination::StepLimit);
        assert_eq!(summary.steps, 10);
    }

    #[test]
    fn test_run_reports_collapsed_velocity() {
        let integrator = Integrator::new(DragModel::G1, 0.5, 0.0);
        let mut state = ProjectileState::at_muzzle(100.0, 0.0, 0.0);
        state.velocity.x = 0.0;
        state.velocity.y = -100.0;
        let summary = integrator.run(state, 100, |_, _| Flow::Continue).unwrap();
        assert_eq!(summary.termination, Termination::VelocityCollapsed);
        assert_eq!(summary.steps, 0);
    }

    #[test]
    fn test_run_reports_non_finite_state() {
        let (integrator, mut state) = flat_fire();
        state.position.y = f64::NAN;
        let summary = integrator.run(state, 100, |_, _| Flow::Continue).unwrap();
        assert_eq!(summary.termination, Termination::NonFinite);
        assert!(summary.termination.is_degenerate());
    }

    #[test]
    fn test_run_propagates_invalid_drag() {
        let integrator = Integrator::new(DragModel::G4, 0.5, 0.0);
        let state = ProjectileState::at_muzzle(2800.0, 0.0, 1.5);
        let err = integrator.run(state, 100, |_, _| Flow::Continue).unwrap_err();
        assert!(matches!(err, BallisticsError::InvalidDragLookup { model: DragModel::G4, .. }));
    }
}
