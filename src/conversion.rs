// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Angle helpers, dB and radiometric conversions.
//!
//! The radiometric quantities are related by
//!
//! - BSC = BRDF * cos(vza) * 4π
//! - BRF = π * BRDF
//!
//! where vza is the viewing zenith angle. The backscatter direction is
//! vza == iza with raa == 0.

use std::f64::consts::PI;
use std::str::FromStr;

use log::debug;
use ndarray::{prelude::*, Zip};
use thiserror::Error;

use crate::{
    constants::{DEG_TO_RAD, RAD_TO_DEG},
    math::broadcast_pair,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("'{received}' is not a valid angle unit. Valid options are: DEG, deg, degree, degrees, RAD, rad, radian, radians")]
    InvalidAngleUnit { received: String },

    #[error("'{received}' is not a valid value unit. Valid options are: BRDF, BRF, BSC, BSCdB")]
    InvalidValueUnit { received: String },

    #[error("bad array shape supplied to argument {argument} of function {function}. expected {expected}, received {received}")]
    /// Error for bad array shape in provided argument
    BadArrayShape {
        /// The argument name within the function
        argument: String,
        /// The function name
        function: String,
        /// The expected shape
        expected: String,
        /// The shape that was received instead
        received: String,
    },
}

/// Degrees to radians.
#[inline]
pub fn rad(angle: f64) -> f64 {
    angle * DEG_TO_RAD
}

/// Radians to degrees.
#[inline]
pub fn deg(angle: f64) -> f64 {
    angle * RAD_TO_DEG
}

/// Secant.
#[inline]
pub fn sec(x: f64) -> f64 {
    1.0 / x.cos()
}

/// Cotangent.
#[inline]
pub fn cot(x: f64) -> f64 {
    1.0 / x.tan()
}

/// The unit of input angles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AngleUnit {
    Degrees,
    #[default]
    Radians,
}

impl AngleUnit {
    /// Convert an angle in this unit to radians.
    #[inline]
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => rad(angle),
            AngleUnit::Radians => angle,
        }
    }

    /// Convert an angle in radians to this unit.
    #[inline]
    pub fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => deg(angle),
            AngleUnit::Radians => angle,
        }
    }
}

impl FromStr for AngleUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<AngleUnit, ConversionError> {
        match s {
            "DEG" | "deg" | "degree" | "degrees" => Ok(AngleUnit::Degrees),
            "RAD" | "rad" | "radian" | "radians" => Ok(AngleUnit::Radians),
            _ => Err(ConversionError::InvalidAngleUnit {
                received: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AngleUnit::Degrees => write!(f, "DEG"),
            AngleUnit::Radians => write!(f, "RAD"),
        }
    }
}

/// Convert a linear value to dB. Non-positive input gives 0 rather than NaN
/// or -inf.
pub fn db(x: f64) -> f64 {
    let value = 10.0 * x.log10();
    if value.is_nan() || value == f64::NEG_INFINITY {
        debug!("Cannot take the dB of {x}; using 0");
        0.0
    } else if value == f64::INFINITY {
        f64::MAX
    } else {
        value
    }
}

/// Convert a dB value to linear.
pub fn linear(x: f64) -> f64 {
    10_f64.powf(x / 10.0)
}

/// Apply `f(value, vza in radians)` elementwise, broadcasting a single value
/// or angle.
fn with_vza(
    function: &str,
    values: ArrayView1<f64>,
    vza: ArrayView1<f64>,
    angle_unit: AngleUnit,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Array1<f64>, ConversionError> {
    let (v, a) =
        broadcast_pair(&values, &vza).ok_or_else(|| ConversionError::BadArrayShape {
            argument: "vza".to_string(),
            function: function.to_string(),
            expected: format!("length {} or 1", values.len()),
            received: format!("length {}", vza.len()),
        })?;
    Ok(Zip::from(&v)
        .and(&a)
        .map_collect(|&x, &angle| f(x, angle_unit.to_radians(angle))))
}

/// Convert a BRDF into a backscatter coefficient (BSC).
pub fn bsc(
    brdf: ArrayView1<f64>,
    vza: ArrayView1<f64>,
    angle_unit: AngleUnit,
) -> Result<Array1<f64>, ConversionError> {
    with_vza("bsc", brdf, vza, angle_unit, |x, vza| {
        x * vza.cos() * 4.0 * PI
    })
}

/// Convert a backscatter coefficient (BSC) into a BRDF.
pub fn brdf(
    bsc: ArrayView1<f64>,
    vza: ArrayView1<f64>,
    angle_unit: AngleUnit,
) -> Result<Array1<f64>, ConversionError> {
    with_vza("brdf", bsc, vza, angle_unit, |x, vza| {
        x / (vza.cos() * 4.0 * PI)
    })
}

/// Convert a BRDF into a BRF.
pub fn brf(brdf: ArrayView1<f64>) -> Array1<f64> {
    brdf.mapv(|x| PI * x)
}

/// Convert a BRF into a BRDF.
pub fn brdf_from_brf(brf: ArrayView1<f64>) -> Array1<f64> {
    brf.mapv(|x| x / PI)
}

/// The kind of value given to [`Radiometry::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueUnit {
    /// Bidirectional reflectance distribution function.
    #[default]
    Brdf,
    /// Bidirectional reflectance factor.
    Brf,
    /// Backscatter coefficient (linear).
    Bsc,
    /// Backscatter coefficient in dB.
    BscDb,
}

impl FromStr for ValueUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<ValueUnit, ConversionError> {
        match s {
            "BRDF" => Ok(ValueUnit::Brdf),
            "BRF" => Ok(ValueUnit::Brf),
            "BSC" => Ok(ValueUnit::Bsc),
            "BSCdB" => Ok(ValueUnit::BscDb),
            _ => Err(ConversionError::InvalidValueUnit {
                received: s.to_string(),
            }),
        }
    }
}

/// A value expressed as BRDF, BRF, BSC and BSC in dB.
#[derive(Clone, Debug, PartialEq)]
pub struct Radiometry {
    pub brdf: Array1<f64>,
    pub brf: Array1<f64>,
    pub bsc: Array1<f64>,
    pub bsc_db: Array1<f64>,
}

impl Radiometry {
    /// Derive all radiometric forms of `value`, which is in `value_unit`.
    /// `vza` is the viewing zenith angle in `angle_unit`; it may have one
    /// element or as many as `value`.
    pub fn new(
        value: ArrayView1<f64>,
        vza: ArrayView1<f64>,
        value_unit: ValueUnit,
        angle_unit: AngleUnit,
    ) -> Result<Radiometry, ConversionError> {
        let brdf_values = match value_unit {
            ValueUnit::Brdf => value.to_owned(),
            ValueUnit::Brf => brdf_from_brf(value),
            ValueUnit::Bsc => brdf(value, vza, angle_unit)?,
            ValueUnit::BscDb => brdf(value.mapv(linear).view(), vza, angle_unit)?,
        };
        let bsc_values = match value_unit {
            ValueUnit::Bsc => value.to_owned(),
            ValueUnit::BscDb => value.mapv(linear),
            _ => bsc(brdf_values.view(), vza, angle_unit)?,
        };
        let bsc_db = match value_unit {
            ValueUnit::BscDb => value.to_owned(),
            _ => bsc_values.mapv(db),
        };
        let brf_values = match value_unit {
            ValueUnit::Brf => value.to_owned(),
            _ => brf(brdf_values.view()),
        };

        Ok(Radiometry {
            brdf: brdf_values,
            brf: brf_values,
            bsc: bsc_values,
            bsc_db,
        })
    }
}
