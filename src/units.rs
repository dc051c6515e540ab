//! Angle and mass unit conversions.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use crate::constants::GRAINS_PER_POUND;

const DEGREES_TO_RADIANS: f64 = PI / 180.0;
const RADIANS_TO_DEGREES: f64 = 180.0 / PI;
const MOA_PER_DEGREE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Degree,
    Radian,
    /// Minute of angle, 1/60 degree
    Moa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    Grain,
    Pound,
}

pub struct UnitConverter;

impl UnitConverter {
    pub fn angle(value: f64, from: AngleUnit, to: AngleUnit) -> f64 {
        let degrees = match from {
            AngleUnit::Degree => value,
            AngleUnit::Radian => value * RADIANS_TO_DEGREES,
            AngleUnit::Moa => value / MOA_PER_DEGREE,
        };
        match to {
            AngleUnit::Degree => degrees,
            AngleUnit::Radian => degrees * DEGREES_TO_RADIANS,
            AngleUnit::Moa => degrees * MOA_PER_DEGREE,
        }
    }

    pub fn mass(value: f64, from: MassUnit, to: MassUnit) -> f64 {
        match (from, to) {
            (MassUnit::Grain, MassUnit::Pound) => value / GRAINS_PER_POUND,
            (MassUnit::Pound, MassUnit::Grain) => value * GRAINS_PER_POUND,
            _ => value,
        }
    }
}

#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * DEGREES_TO_RADIANS
}

#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * RADIANS_TO_DEGREES
}

#[inline]
pub fn moa_to_rad(moa: f64) -> f64 {
    moa / MOA_PER_DEGREE * DEGREES_TO_RADIANS
}

#[inline]
pub fn rad_to_moa(radians: f64) -> f64 {
    radians * RADIANS_TO_DEGREES * MOA_PER_DEGREE
}

#[inline]
pub fn deg_to_moa(degrees: f64) -> f64 {
    degrees * MOA_PER_DEGREE
}

#[inline]
pub fn moa_to_deg(moa: f64) -> f64 {
    moa / MOA_PER_DEGREE
}

#[inline]
pub fn grains_to_pounds(grains: f64) -> f64 {
    grains / GRAINS_PER_POUND
}
