// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical dimensions.
//!
//! A [`Dimension`] is a product of base dimensions raised to integer powers.
//! Derived dimensions (frequency, energy, power) are expressed through the
//! base ones, so e.g. `Hz` and `1 / s` are commensurate.

use itertools::Itertools;

/// The number of base dimensions.
pub const NUM_BASE_DIMENSIONS: usize = 6;

/// Names of the base dimensions, in storage order.
pub const BASE_DIMENSION_NAMES: [&str; NUM_BASE_DIMENSIONS] =
    ["length", "mass", "time", "current", "temperature", "angle"];

/// The physical kind of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Powers of length, mass, time, current, temperature and angle.
    powers: [i32; NUM_BASE_DIMENSIONS],
}

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension::new([0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Dimension = Dimension::new([1, 0, 0, 0, 0, 0]);
    pub const MASS: Dimension = Dimension::new([0, 1, 0, 0, 0, 0]);
    pub const TIME: Dimension = Dimension::new([0, 0, 1, 0, 0, 0]);
    pub const CURRENT: Dimension = Dimension::new([0, 0, 0, 1, 0, 0]);
    pub const TEMPERATURE: Dimension = Dimension::new([0, 0, 0, 0, 1, 0]);
    pub const ANGLE: Dimension = Dimension::new([0, 0, 0, 0, 0, 1]);
    pub const FREQUENCY: Dimension = Dimension::new([0, 0, -1, 0, 0, 0]);
    pub const ENERGY: Dimension = Dimension::new([2, 1, -2, 0, 0, 0]);
    pub const POWER: Dimension = Dimension::new([2, 1, -3, 0, 0, 0]);
    pub const VELOCITY: Dimension = Dimension::new([1, 0, -1, 0, 0, 0]);

    /// Make a new [`Dimension`] from the powers of length, mass, time,
    /// current, temperature and angle.
    pub const fn new(powers: [i32; NUM_BASE_DIMENSIONS]) -> Dimension {
        Dimension { powers }
    }

    /// The powers of each base dimension.
    pub fn powers(&self) -> [i32; NUM_BASE_DIMENSIONS] {
        self.powers
    }

    pub fn is_dimensionless(&self) -> bool {
        self.powers.iter().all(|&p| p == 0)
    }

    /// This dimension raised to an integer power, or `None` if a power
    /// overflows.
    pub fn powi(self, n: i32) -> Option<Dimension> {
        let mut powers = self.powers;
        for p in powers.iter_mut() {
            *p = p.checked_mul(n)?;
        }
        Some(Dimension { powers })
    }

    /// The `n`-th root of this dimension, if every power is divisible by `n`.
    pub fn root(self, n: i32) -> Option<Dimension> {
        let mut powers = self.powers;
        for p in powers.iter_mut() {
            if p.checked_rem(n)? != 0 {
                return None;
            }
            *p = p.checked_div(n)?;
        }
        Some(Dimension { powers })
    }

    /// The product of two dimensions, or `None` if a power overflows.
    pub fn checked_mul(self, rhs: Dimension) -> Option<Dimension> {
        let mut powers = self.powers;
        for (p, o) in powers.iter_mut().zip(rhs.powers) {
            *p = p.checked_add(o)?;
        }
        Some(Dimension { powers })
    }

    /// The quotient of two dimensions, or `None` if a power overflows.
    pub fn checked_div(self, rhs: Dimension) -> Option<Dimension> {
        self.checked_mul(rhs.powi(-1)?)
    }

    /// The conventional name of this dimension, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Dimension::DIMENSIONLESS => "dimensionless",
            Dimension::LENGTH => "length",
            Dimension::MASS => "mass",
            Dimension::TIME => "time",
            Dimension::CURRENT => "current",
            Dimension::TEMPERATURE => "temperature",
            Dimension::ANGLE => "angle",
            Dimension::FREQUENCY => "frequency",
            Dimension::ENERGY => "energy",
            Dimension::POWER => "power",
            Dimension::VELOCITY => "velocity",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{name}");
        }

        let render = |p: i32, name: &str| {
            if p.abs() == 1 {
                name.to_string()
            } else {
                format!("{name}**{}", p.abs())
            }
        };
        let numerator = BASE_DIMENSION_NAMES
            .iter()
            .zip(self.powers)
            .filter(|(_, p)| *p > 0)
            .map(|(name, p)| render(p, *name))
            .join("*");
        let denominator = BASE_DIMENSION_NAMES
            .iter()
            .zip(self.powers)
            .filter(|(_, p)| *p < 0)
            .map(|(name, p)| render(p, *name))
            .join("*");

        match (numerator.is_empty(), denominator.is_empty()) {
            (_, true) => write!(f, "{numerator}"),
            (true, false) => write!(f, "1/{denominator}"),
            (false, false) => write!(f, "{numerator}/{denominator}"),
        }
    }
}
