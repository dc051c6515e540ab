use serde::{Deserialize, Serialize};
use tracing::trace;
use crate::constants::{MPH_TO_FPS, MPH_TO_INCHES_PER_SEC};
use crate::units::deg_to_rad;

/// Wind relative to the line of fire.
///
/// `angle_deg` is the direction the wind comes FROM: 0° is a pure headwind,
/// 90° blows from the shooter's right to left, 180° is a tailwind.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindConditions {
    pub speed_mph: f64,
    pub angle_deg: f64,
}

impl WindConditions {
    pub fn new(speed_mph: f64, angle_deg: f64) -> Self {
        Self { speed_mph, angle_deg }
    }

    pub fn calm() -> Self {
        Self::default()
    }

    /// Headwind component in mph (positive into the shooter's face)
    pub fn headwind(&self) -> f64 {
        headwind(self.speed_mph, self.angle_deg)
    }

    /// Crosswind component in mph (positive from right to left)
    pub fn crosswind(&self) -> f64 {
        crosswind(self.speed_mph, self.angle_deg)
    }

    /// Headwind component in ft/s, added to airspeed for drag lookup
    pub fn headwind_fps(&self) -> f64 {
        self.headwind() * MPH_TO_FPS
    }
}

pub fn headwind(speed: f64, angle_deg: f64) -> f64 {
    let hw = deg_to_rad(angle_deg).cos() * speed;
    trace!(headwind = hw, "wind decomposition");
    hw
}

pub fn crosswind(speed: f64, angle_deg: f64) -> f64 {
    let cw = deg_to_rad(angle_deg).sin() * speed;
    trace!(crosswind = cw, "wind decomposition");
    cw
}

/// Windage deflection in inches.
///
/// The crosswind (mph) is converted to in/s and multiplied by the lag between
/// the actual time to range and the vacuum time `range_ft / initial_velocity`.
pub fn windage(crosswind_mph: f64, initial_velocity: f64, range_ft: f64, time_to_range: f64) -> f64 {
    let vw = crosswind_mph * MPH_TO_INCHES_PER_SEC;
    vw * (time_to_range - range_ft / initial_velocity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_headwind() {
        let wind = WindConditions::new(10.0, 0.0);
        assert!((wind.headwind() - 10.0).abs() < 1e-12);
        assert!(wind.crosswind().abs() < 1e-12);
        assert!((wind.headwind_fps() - 14.666666666666666).abs() < 1e-9);
    }

    #[test]
    fn test_full_value_crosswind() {
        let wind = WindConditions::new(10.0, 90.0);
        assert!(wind.headwind().abs() < 1e-9);
        assert!((wind.crosswind() - 10.0).abs() < 1e-12);

        let from_left = WindConditions::new(10.0, 270.0);
        assert!((from_left.crosswind() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_tailwind_is_negative_headwind() {
        assert!((headwind(5.0, 180.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_calm() {
        let wind = WindConditions::calm();
        assert_eq!(wind.headwind(), 0.0);
        assert_eq!(wind.crosswind(), 0.0);
    }

    #[test]
    fn test_windage_lag_time() {
        // 10 mph, 0.1 s flight against a 0.09 s vacuum time over 270 ft at 3000 ft/s
        let w = windage(10.0, 3000.0, 270.0, 0.1);
        assert!((w - 176.0 * 0.01).abs() < 1e-9, "windage: {w}");

        assert_eq!(windage(0.0, 3000.0, 270.0, 0.1), 0.0);
    }
}
