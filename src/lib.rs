//! # Exterior Ballistics
//!
//! Trajectory tables, zero angles and point-blank ranges for small-arms
//! projectiles, driven by the standard G-series drag functions.

// Re-export the main types and functions
pub use drag_model::DragModel;
pub use error::BallisticsError;
pub use inputs::{Projectile, ShotConditions};
pub use wind::WindConditions;
pub use integrator::{Integrator, ProjectileState, Termination};
pub use trajectory::{generate_table, generate_table_with, TrajectoryPoint, TrajectoryTable};
pub use search::{Convergence, SearchLimits};
pub use zero::{solve_zero_angle, solve_zero_angle_with, ZeroSolution};
pub use point_blank::{solve_point_blank_range, solve_point_blank_range_with, PointBlankRangeResult};
pub use solution::Solution;
pub use batch::{compare_drag_models, generate_tables, ModelComparison};
pub use units::{AngleUnit, MassUnit, UnitConverter};

// Module declarations
mod drag_model;
pub mod constants;
pub mod drag;
pub mod units;
pub mod wind;
mod error;
mod inputs;
pub mod integrator;
mod trajectory;
mod search;
mod zero;
mod point_blank;
mod solution;
pub mod batch;
