//! Successive approximation over launch angle.
//!
//! Both angle solvers share the same outer loop: start at 0 with a positive
//! step, run one trajectory per trial angle, and whenever the trial overshoots
//! in the current direction flip the step and halve it. The loop ends when the
//! step drops below a tolerance, the angle passes an optional ceiling, or the
//! trial budget runs out.

use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::constants::{DEFAULT_MAX_STEPS_PER_TRIAL, DEFAULT_MAX_TRIALS};
use crate::error::BallisticsError;
use crate::units::rad_to_deg;

/// Bounds on a single solver invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Outer trials before the search gives up with a best-effort angle
    pub max_trials: usize,
    /// Integration steps per trajectory before it is abandoned
    pub max_steps_per_trial: usize,
    /// Wall-clock budget, checked between trials
    pub timeout: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_trials: DEFAULT_MAX_TRIALS,
            max_steps_per_trial: DEFAULT_MAX_STEPS_PER_TRIAL,
            timeout: None,
        }
    }
}

impl SearchLimits {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        if self.max_trials == 0 || self.max_steps_per_trial == 0 {
            return Err(BallisticsError::invalid("search limits must allow at least one trial and one step"));
        }
        Ok(())
    }
}

/// How an angle search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// Step fell below the tolerance
    Converged,
    /// Trial angle passed the solver's ceiling; the angle is a best effort
    AngleLimitExceeded,
    /// Trial budget exhausted; the angle is a best effort
    TrialLimitExceeded,
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged)
    }
}

/// Verdict of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Steer {
    /// Trial angle too low
    Raise,
    /// Trial angle too high
    Lower,
    /// Exactly on target
    Hold,
}

#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome<T> {
    /// Last trial angle advanced by the final step
    pub angle_rad: f64,
    pub trials: usize,
    pub convergence: Convergence,
    /// Evaluation of the last trial run
    pub last_trial: T,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AngleSearch {
    pub initial_step_rad: f64,
    pub tolerance_rad: f64,
    pub max_angle_rad: Option<f64>,
}

impl AngleSearch {
    pub(crate) fn run<T, F>(
        &self,
        limits: &SearchLimits,
        cancel: &dyn Fn() -> bool,
        mut trial: F,
    ) -> Result<SearchOutcome<T>, BallisticsError>
    where
        F: FnMut(f64) -> Result<(Steer, T), BallisticsError>,
    {
        let started = Instant::now();
        let mut angle = 0.0_f64;
        let mut step = self.initial_step_rad;
        let mut trials = 0;

        loop {
            if cancel() {
                return Err(BallisticsError::Cancelled);
            }
            if limits.timeout.is_some_and(|timeout| started.elapsed() > timeout) {
                return Err(BallisticsError::TimedOut);
            }

            let (steer, evaluation) = trial(angle)?;
            trials += 1;

            match steer {
                Steer::Lower if step > 0.0 => step = -step / 2.0,
                Steer::Raise if step < 0.0 => step = -step / 2.0,
                _ => {}
            }

            debug!(
                trial = trials,
                angle_deg = rad_to_deg(angle),
                next_step_deg = rad_to_deg(step),
                ?steer,
                "angle search trial"
            );

            let converged = step.abs() < self.tolerance_rad;
            let over_ceiling = self.max_angle_rad.is_some_and(|max| angle > max);
            angle += step;

            let convergence = if converged {
                Convergence::Converged
            } else if over_ceiling {
                Convergence::AngleLimitExceeded
            } else if trials >= limits.max_trials {
                Convergence::TrialLimitExceeded
            } else {
                continue;
            };

            if !convergence.is_converged() {
                warn!(?convergence, trials, angle_deg = rad_to_deg(angle), "angle search stopped without converging");
            }

            return Ok(SearchOutcome { angle_rad: angle, trials, convergence, last_trial: evaluation });
        }
    }
}
