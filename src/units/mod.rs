// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Units of measurement.
//!
//! A [`Unit`] is one of:
//! - "no unit" (written "-"), attached to plain numbers;
//! - a product of catalog units raised to integer powers, times a numeric
//!   coefficient (e.g. "kg * m**2 / s**2" or "1 / cm");
//! - an opaque expression that has no dimension, produced when unlike units
//!   are added in a unit expression (e.g. "m + s").
//!
//! The empty product ("1") is dimensionless and is distinct from "no unit".

mod catalog;
mod dimension;
mod parse;

pub use catalog::*;
pub use dimension::{Dimension, BASE_DIMENSION_NAMES, NUM_BASE_DIMENSIONS};

use itertools::Itertools;
use thiserror::Error;

/// A catalog unit raised to a non-zero integer power.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Factor {
    pub def: UnitDef,
    pub power: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Repr {
    #[default]
    None,
    /// Factors are sorted by symbol and never have a zero power. The
    /// dimension is fixed when the product is built.
    Product {
        coefficient: f64,
        factors: Vec<Factor>,
        dimension: Dimension,
    },
    Opaque(String),
}

/// A unit of measurement. See the module documentation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Unit {
    repr: Repr,
}

impl Unit {
    /// The "no unit" sentinel.
    pub fn none() -> Unit {
        Unit { repr: Repr::None }
    }

    /// The dimensionless unit "1".
    pub fn dimensionless() -> Unit {
        Unit::scalar(1.0)
    }

    /// A pure number acting as a unit, e.g. the "1" in "1 / cm".
    pub fn scalar(coefficient: f64) -> Unit {
        Unit {
            repr: Repr::Product {
                coefficient,
                factors: vec![],
                dimension: Dimension::DIMENSIONLESS,
            },
        }
    }

    /// A product of factors, or `None` if a power of its dimension
    /// overflows.
    fn product(coefficient: f64, mut factors: Vec<Factor>) -> Option<Unit> {
        factors.retain(|f| f.power != 0);
        factors.sort_by(|a, b| a.def.symbol.cmp(b.def.symbol));
        let dimension = factors
            .iter()
            .try_fold(Dimension::DIMENSIONLESS, |acc, f| {
                acc.checked_mul(f.def.dimension.powi(f.power)?)
            })?;
        Some(Unit {
            repr: Repr::Product {
                coefficient,
                factors,
                dimension,
            },
        })
    }

    /// A product of distinct catalog units with small powers, e.g.
    /// `[(JOULE, 1), (KELVIN, -1)]`.
    pub(crate) fn from_factors(factors: &[(UnitDef, i8)]) -> Unit {
        let factors = factors
            .iter()
            .map(|&(def, power)| Factor {
                def,
                power: power.into(),
            })
            .collect();
        // i8 powers can't overflow a dimension.
        Unit::product(1.0, factors).unwrap_or_default()
    }

    fn opaque(expr: String) -> Unit {
        Unit {
            repr: Repr::Opaque(expr),
        }
    }

    /// Parse a unit expression with the global catalog.
    pub fn parse(expr: &str) -> Result<Unit, UnitError> {
        catalog().parse(expr)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.repr, Repr::None)
    }

    /// Is this unit "no unit" or a pure number? Such units may be used in
    /// exponents.
    pub fn is_unitless(&self) -> bool {
        match &self.repr {
            Repr::None => true,
            Repr::Product { factors, .. } => factors.is_empty(),
            Repr::Opaque(_) => false,
        }
    }

    /// The dimension of this unit. `None` for "no unit" and opaque
    /// expressions.
    pub fn dimension(&self) -> Option<Dimension> {
        match &self.repr {
            Repr::Product { dimension, .. } => Some(*dimension),
            Repr::None | Repr::Opaque(_) => None,
        }
    }

    /// Can values in these two units be converted into one another?
    pub fn is_commensurate(&self, other: &Unit) -> bool {
        match (self.dimension(), other.dimension()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// How many base units (Hz, m, s, K, ...) one of this unit is.
    pub fn scale_factor(&self) -> f64 {
        match &self.repr {
            Repr::Product {
                coefficient,
                factors,
                ..
            } => factors
                .iter()
                .fold(*coefficient, |acc, f| acc * f.def.scale.powi(f.power)),
            Repr::None | Repr::Opaque(_) => 1.0,
        }
    }

    /// The catalog factors of this unit. Empty unless this is a product.
    pub fn factors(&self) -> &[Factor] {
        match &self.repr {
            Repr::Product { factors, .. } => factors,
            Repr::None | Repr::Opaque(_) => &[],
        }
    }

    /// This unit raised to an integer power. "No unit" stays "no unit".
    ///
    /// Fails with [`UnitError::InvalidExponent`] if a resulting power
    /// doesn't fit in an `i32`.
    pub fn powi(&self, n: i32) -> Result<Unit, UnitError> {
        let overflow = || UnitError::InvalidExponent {
            token: n.to_string(),
            expr: format!("({self})**{n}"),
        };
        match &self.repr {
            Repr::None => Ok(Unit::none()),
            Repr::Product {
                coefficient,
                factors,
                ..
            } => {
                let factors = factors
                    .iter()
                    .map(|f| {
                        f.power
                            .checked_mul(n)
                            .map(|power| Factor { def: f.def, power })
                    })
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(overflow)?;
                Unit::product(coefficient.powi(n), factors).ok_or_else(overflow)
            }
            Repr::Opaque(s) => Ok(match n {
                0 => Unit::dimensionless(),
                1 => self.clone(),
                _ => Unit::opaque(format!("({s})**{n}")),
            }),
        }
    }

    /// The `n`-th root of this unit, if every factor's power is divisible by
    /// `n`.
    pub fn root(&self, n: i32) -> Option<Unit> {
        match &self.repr {
            Repr::None if n != 0 => Some(Unit::none()),
            Repr::Product {
                coefficient,
                factors,
                dimension,
            } => {
                let factors = factors
                    .iter()
                    .map(|f| match f.power.checked_rem(n) {
                        Some(0) => f
                            .power
                            .checked_div(n)
                            .map(|power| Factor { def: f.def, power }),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(Unit {
                    repr: Repr::Product {
                        coefficient: coefficient.powf(1.0 / n as f64),
                        factors,
                        dimension: dimension.root(n)?,
                    },
                })
            }
            Repr::None | Repr::Opaque(_) => None,
        }
    }

    /// The reciprocal of this unit.
    pub fn inverse(&self) -> Result<Unit, UnitError> {
        self.powi(-1)
    }

    /// Combine two units with `+` or `-` inside a unit expression. Equal
    /// units give the same unit and "no unit" is absorbed; anything else
    /// becomes an opaque expression.
    pub(crate) fn sum(&self, other: &Unit, operator: &str) -> Unit {
        if self == other || other.is_none() {
            self.clone()
        } else if self.is_none() {
            other.clone()
        } else {
            Unit::opaque(format!("{self} {operator} {other}"))
        }
    }

    /// The unit rendered for typesetting, e.g. "$m^2 / s$". "No unit" is
    /// "-".
    pub fn mathstr(&self) -> String {
        if self.is_none() {
            return "-".to_string();
        }
        format!("${}$", self.to_string().replace("**", "^"))
    }
}

impl From<UnitDef> for Unit {
    fn from(def: UnitDef) -> Unit {
        Unit {
            repr: Repr::Product {
                coefficient: 1.0,
                factors: vec![Factor { def, power: 1 }],
                dimension: def.dimension,
            },
        }
    }
}

impl From<&UnitDef> for Unit {
    fn from(def: &UnitDef) -> Unit {
        Unit::from(*def)
    }
}

impl std::ops::Mul<&Unit> for &Unit {
    type Output = Result<Unit, UnitError>;

    fn mul(self, rhs: &Unit) -> Self::Output {
        match (&self.repr, &rhs.repr) {
            (Repr::None, _) => Ok(rhs.clone()),
            (_, Repr::None) => Ok(self.clone()),
            (
                Repr::Product {
                    coefficient: c1,
                    factors: f1,
                    ..
                },
                Repr::Product {
                    coefficient: c2,
                    factors: f2,
                    ..
                },
            ) => {
                let overflow = || UnitError::InvalidExponent {
                    token: rhs.to_string(),
                    expr: format!("{self} * {rhs}"),
                };
                let mut factors = f1.clone();
                for f in f2 {
                    match factors.iter_mut().find(|g| g.def == f.def) {
                        Some(g) => {
                            g.power = g.power.checked_add(f.power).ok_or_else(overflow)?;
                        }
                        None => factors.push(*f),
                    }
                }
                Unit::product(c1 * c2, factors).ok_or_else(overflow)
            }
            _ => Ok(Unit::opaque(format!(
                "{} * {}",
                parenthesise(self),
                parenthesise(rhs)
            ))),
        }
    }
}

impl std::ops::Div<&Unit> for &Unit {
    type Output = Result<Unit, UnitError>;

    fn div(self, rhs: &Unit) -> Self::Output {
        match (&self.repr, &rhs.repr) {
            (_, Repr::None) => Ok(self.clone()),
            (Repr::None, _) => rhs.inverse(),
            (_, Repr::Opaque(_)) | (Repr::Opaque(_), _) => Ok(Unit::opaque(format!(
                "{} / {}",
                parenthesise(self),
                parenthesise(rhs)
            ))),
            _ => self * &rhs.inverse()?,
        }
    }
}

impl std::ops::Mul for Unit {
    type Output = Result<Unit, UnitError>;

    fn mul(self, rhs: Unit) -> Self::Output {
        &self * &rhs
    }
}

impl std::ops::Div for Unit {
    type Output = Result<Unit, UnitError>;

    fn div(self, rhs: Unit) -> Self::Output {
        &self / &rhs
    }
}

fn parenthesise(unit: &Unit) -> String {
    match &unit.repr {
        Repr::Opaque(s) => format!("({s})"),
        _ => unit.to_string(),
    }
}

fn render_factor(f: &Factor) -> String {
    match f.power.abs() {
        1 => f.def.symbol.to_string(),
        p => format!("{}**{p}", f.def.symbol),
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.repr {
            Repr::None => write!(f, "-"),
            Repr::Opaque(s) => write!(f, "{s}"),
            Repr::Product {
                coefficient,
                factors,
                ..
            } => {
                let mut numerator = factors
                    .iter()
                    .filter(|g| g.power > 0)
                    .map(render_factor)
                    .collect::<Vec<_>>();
                if *coefficient != 1.0 || numerator.is_empty() {
                    numerator.insert(0, coefficient.to_string());
                }
                let denominator = factors
                    .iter()
                    .filter(|g| g.power < 0)
                    .map(render_factor)
                    .collect::<Vec<_>>();

                write!(f, "{}", numerator.iter().join(" * "))?;
                match denominator.len() {
                    0 => Ok(()),
                    1 => write!(f, " / {}", denominator[0]),
                    _ => write!(f, " / ({})", denominator.iter().join(" * ")),
                }
            }
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Unit, UnitError> {
        Unit::parse(s)
    }
}

/// Render an optional dimension for error messages.
pub(crate) fn dimension_str(dim: Option<Dimension>) -> String {
    match dim {
        Some(d) => d.to_string(),
        None => "none".to_string(),
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("'{token}' is not a valid unit. Valid units are: {valid}")]
    NotAUnit { token: String, valid: String },

    #[error("Empty unit expression; use '-' for a value without a unit")]
    EmptyExpression,

    #[error("Malformed unit expression '{expr}': {reason}")]
    Malformed { expr: String, reason: String },

    #[error("Exponent '{token}' in unit expression '{expr}' must be an integer that keeps every power within i32")]
    InvalidExponent { token: String, expr: String },

    #[error("Cannot convert incompatible units: [{from}] ({from_dim}) to [{to}] ({to_dim})")]
    Incompatible {
        from: String,
        to: String,
        from_dim: String,
        to_dim: String,
    },

    #[error("{operation} require the same unit, got [{left}] and [{right}]")]
    NotSameUnit {
        operation: &'static str,
        left: String,
        right: String,
    },

    #[error("An exponent with a unit is not possible, got an exponent in [{unit}]")]
    ExponentWithUnit { unit: String },

    #[error("The unit spelling '{symbol}' is already registered")]
    AlreadyRegistered { symbol: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_none_and_dimensionless_differ() {
        let none = Unit::none();
        let one = Unit::dimensionless();
        assert_ne!(none, one);
        assert_eq!(none.dimension(), None);
        assert_eq!(one.dimension(), Some(Dimension::DIMENSIONLESS));
        assert_eq!(none.to_string(), "-");
        assert_eq!(one.to_string(), "1");
        assert!(none.is_unitless());
        assert!(one.is_unitless());
    }

    #[test]
    fn test_algebra() {
        let m = Unit::from(METER);
        let s = Unit::from(SECOND);
        let velocity = (&m / &s).unwrap();
        assert_eq!(velocity.dimension(), Some(Dimension::VELOCITY));
        assert_eq!(velocity.to_string(), "m / s");

        let area = (&m * &m).unwrap();
        assert_eq!(area, m.powi(2).unwrap());
        assert_eq!(area.to_string(), "m**2");
        assert_eq!(area.root(2), Some(m.clone()));
        assert_eq!(m.root(2), None);

        // Factor order doesn't matter.
        assert_eq!((&m * &s).unwrap(), (&s * &m).unwrap());

        // Cancelling gives the dimensionless unit.
        assert_eq!((&m / &m).unwrap(), Unit::dimensionless());

        // "No unit" is the identity.
        assert_eq!((&Unit::none() * &m).unwrap(), m);
        assert_eq!((&m / &Unit::none()).unwrap(), m);
        assert_eq!((&Unit::none() / &s).unwrap(), s.inverse().unwrap());
        assert_eq!(s.inverse().unwrap().to_string(), "1 / s");
    }

    #[test]
    fn test_display_energy() {
        let kg_m2 = (&Unit::from(KILOGRAM) * &Unit::from(METER).powi(2).unwrap()).unwrap();
        let joule_like = (&kg_m2 / &Unit::from(SECOND).powi(2).unwrap()).unwrap();
        assert_eq!(joule_like.to_string(), "kg * m**2 / s**2");
        assert_eq!(joule_like.dimension(), Some(Dimension::ENERGY));
        assert_eq!(joule_like.mathstr(), "$kg * m^2 / s^2$");

        let kelvin_second = (&Unit::from(KELVIN) * &Unit::from(SECOND)).unwrap();
        let per = (&Unit::from(JOULE) / &kelvin_second).unwrap();
        assert_eq!(per.to_string(), "J / (K * s)");
    }

    #[test]
    fn test_scale_factor() {
        let per_cm = (&Unit::scalar(1.0) / &Unit::from(CENTIMETER)).unwrap();
        assert_abs_diff_eq!(per_cm.scale_factor(), 100.0, epsilon = 1e-10);
        let km_per_h = (&Unit::from(KILOMETER) / &Unit::from(HOUR)).unwrap();
        assert_abs_diff_eq!(km_per_h.scale_factor(), 1000.0 / 3600.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Unit::none().scale_factor(), 1.0);
    }

    #[test]
    fn test_commensurate() {
        let ghz = Unit::from(GIGAHERTZ);
        let per_s = Unit::from(SECOND).inverse().unwrap();
        assert!(ghz.is_commensurate(&per_s));
        assert!(!ghz.is_commensurate(&Unit::from(METER)));
        assert!(!Unit::none().is_commensurate(&Unit::none()));
    }

    #[test]
    fn test_power_overflow() {
        let m = Unit::from(METER);
        let big = m.powi(1 << 16).unwrap();
        let result = big.powi(1 << 16);
        assert!(
            matches!(result, Err(UnitError::InvalidExponent { .. })),
            "Expected InvalidExponent, got {result:?}"
        );

        // The factor power fits but the dimension of joules doesn't.
        let result = Unit::from(JOULE).powi(i32::MAX / 2 + 1);
        assert!(
            matches!(result, Err(UnitError::InvalidExponent { .. })),
            "Expected InvalidExponent, got {result:?}"
        );

        let max = m.powi(i32::MAX).unwrap();
        let result = &max * &m;
        assert!(
            matches!(result, Err(UnitError::InvalidExponent { .. })),
            "Expected InvalidExponent, got {result:?}"
        );
        assert_eq!(max.root(-1).map(|u| u.to_string()), Some("1 / m**2147483647".to_string()));
        assert_eq!(m.powi(i32::MIN).unwrap().root(-1), None);
    }

    #[test]
    fn test_sum() {
        let m = Unit::from(METER);
        let s = Unit::from(SECOND);
        assert_eq!(m.sum(&m, "+"), m);
        assert_eq!(m.sum(&Unit::none(), "-"), m);
        let odd = m.sum(&s, "+");
        assert_eq!(odd.to_string(), "m + s");
        assert_eq!(odd.dimension(), None);
        assert_eq!((&odd * &m).unwrap().to_string(), "(m + s) * m");
    }
}
