// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Useful constants.

use std::f64::consts::PI;

use lazy_static::lazy_static;
use ndarray::array;

use crate::{
    units::{Unit, JOULE, KELVIN, METER, SECOND},
    Quantity,
};

/// Speed of light \[metres/second\]
pub const VEL_C: f64 = 299_792_458.0;
/// Boltzmann constant \[joules/kelvin\]
pub const BOLTZMANN_K: f64 = 1.38064852e-23;
/// Planck constant \[joule seconds\]
pub const PLANCK_H: f64 = 6.62606957e-34;

/// Radians to degrees (180 / PI).
pub const RAD_TO_DEG: f64 = 180.0 / PI;
/// Degrees to radians (PI / 180).
pub const DEG_TO_RAD: f64 = PI / 180.0;

fn named_constant(value: f64, unit: Unit, name: &str) -> Quantity {
    Quantity::from_parts(array![value], unit)
        .with_name(name)
        .with_constant(true)
}

lazy_static! {
    /// The speed of light as a constant [`Quantity`] in m / s.
    pub static ref SPEED_OF_LIGHT: Quantity = named_constant(
        VEL_C,
        Unit::from_factors(&[(METER, 1), (SECOND, -1)]),
        "Speed of light",
    );

    /// The Boltzmann constant as a constant [`Quantity`] in J / K.
    pub static ref BOLTZMANN: Quantity = named_constant(
        BOLTZMANN_K,
        Unit::from_factors(&[(JOULE, 1), (KELVIN, -1)]),
        "Boltzmann constant",
    );

    /// The Planck constant as a constant [`Quantity`] in J * s.
    pub static ref PLANCK: Quantity = named_constant(
        PLANCK_H,
        Unit::from_factors(&[(JOULE, 1), (SECOND, 1)]),
        "Planck constant",
    );
}
