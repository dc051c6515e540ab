//! Physical constants and numerical limits used in trajectory calculations.
//!
//! All engine quantities are imperial: feet, seconds, grains, miles per hour.

/// Gravitational acceleration in ft/s² (negative: points down the bore-normal axis)
pub const GRAVITY_FPS2: f64 = -32.1609;

/// Maximum range in yards a trajectory table is computed to
pub const MAX_RANGE_YARDS: usize = 50001;

/// Feet per yard
pub const FEET_PER_YARD: f64 = 3.0;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Conversion factor: miles per hour to feet per second (5280 / 3600)
pub const MPH_TO_FPS: f64 = 5280.0 / 3600.0;

/// Conversion factor: miles per hour to inches per second, as used by the windage formula
pub const MPH_TO_INCHES_PER_SEC: f64 = 17.60;

/// Grains per pound (avoirdupois)
pub const GRAINS_PER_POUND: f64 = 7000.0;

/// Kinetic energy divisor: 2 × 7000 gr/lb × 32.174 ft/s²
///
/// `energy_ftlbs = weight_grains * v_fps² / KINETIC_ENERGY_DIVISOR`
pub const KINETIC_ENERGY_DIVISOR: f64 = 450436.0;

/// Drag tables are defined for velocities strictly inside (0, MAX_DRAG_VELOCITY_FPS)
pub const MAX_DRAG_VELOCITY_FPS: f64 = 10000.0;

// Numerical stability constants

/// Horizontal velocity (ft/s) below which the projectile is considered stopped
pub const MIN_HORIZONTAL_VELOCITY_FPS: f64 = 1e-6;

/// Adaptive timestep floor in seconds
pub const MIN_TIME_STEP_S: f64 = 1e-9;

/// Ratio of vertical to horizontal speed beyond which a trajectory is degenerate
pub const DIVERGENCE_RATIO: f64 = 3.0;

// Angle search constants

/// First trial step of the zero-angle search, degrees
pub const ZERO_SEARCH_INITIAL_STEP_DEG: f64 = 14.0;

/// Zero-angle search terminates once the step falls below this many MOA
pub const ZERO_SEARCH_TOLERANCE_MOA: f64 = 0.01;

/// Launch angle (degrees) above which no zero is assumed reachable
pub const ZERO_SEARCH_MAX_ANGLE_DEG: f64 = 45.0;

/// First trial step of the point-blank-range search, degrees
pub const PBR_SEARCH_INITIAL_STEP_DEG: f64 = 10.0;

/// Point-blank-range search terminates once the step falls below this many arcminutes
pub const PBR_SEARCH_TOLERANCE_MOA: f64 = 0.01;

/// Downrange distance (ft) at which the sight-in height is read: 100 yards
pub const SIGHT_IN_DISTANCE_FT: f64 = 300.0;

/// Default bound on outer search trials
pub const DEFAULT_MAX_TRIALS: usize = 500;

/// Default bound on integration steps within one trial or one table
pub const DEFAULT_MAX_STEPS_PER_TRIAL: usize = 10_000_000;
