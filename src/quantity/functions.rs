// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Elementwise math functions on [`Quantity`].
//!
//! What happens to the unit depends on the function; see [`UnitBehaviour`].

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use ndarray::Array1;

use super::Quantity;
use crate::units::{Dimension, Unit};

/// What a math function does to the unit of its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitBehaviour {
    /// The unit (and name) are kept.
    Preserved,
    /// The result has no unit.
    Lost,
    /// The unit becomes its `n`-th root, or is lost if that isn't a unit.
    Root(i32),
    /// The result is a boolean mask, not a quantity.
    Predicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathFunction {
    Abs,
    Negative,
    Positive,
    Rint,
    Floor,
    Ceil,
    Trunc,
    NanToNum,
    Exp,
    Exp2,
    Ln,
    Log2,
    Log10,
    Expm1,
    Ln1p,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Signum,
    Deg2Rad,
    Rad2Deg,
    Sqrt,
    Cbrt,
    IsNan,
    IsFinite,
    IsInf,
}

const BEHAVIOURS: &[(MathFunction, UnitBehaviour)] = {
    use MathFunction::*;
    use UnitBehaviour::*;
    &[
        (Abs, Preserved),
        (Negative, Preserved),
        (Positive, Preserved),
        (Rint, Preserved),
        (Floor, Preserved),
        (Ceil, Preserved),
        (Trunc, Preserved),
        (NanToNum, Preserved),
        (Exp, Lost),
        (Exp2, Lost),
        (Ln, Lost),
        (Log2, Lost),
        (Log10, Lost),
        (Expm1, Lost),
        (Ln1p, Lost),
        (Sin, Lost),
        (Cos, Lost),
        (Tan, Lost),
        (Asin, Lost),
        (Acos, Lost),
        (Atan, Lost),
        (Sinh, Lost),
        (Cosh, Lost),
        (Tanh, Lost),
        (Asinh, Lost),
        (Acosh, Lost),
        (Atanh, Lost),
        (Signum, Lost),
        (Deg2Rad, Lost),
        (Rad2Deg, Lost),
        (Sqrt, Root(2)),
        (Cbrt, Root(3)),
        (IsNan, Predicate),
        (IsFinite, Predicate),
        (IsInf, Predicate),
    ]
};

lazy_static! {
    static ref UNIT_BEHAVIOURS: HashMap<MathFunction, UnitBehaviour> =
        BEHAVIOURS.iter().copied().collect();
}

/// Round half to even.
fn rint(x: f64) -> f64 {
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        x.round()
    }
}

fn nan_to_num(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else if x == f64::INFINITY {
        f64::MAX
    } else if x == f64::NEG_INFINITY {
        f64::MIN
    } else {
        x
    }
}

impl MathFunction {
    pub fn behaviour(self) -> UnitBehaviour {
        UNIT_BEHAVIOURS
            .get(&self)
            .copied()
            .unwrap_or(UnitBehaviour::Lost)
    }

    fn is_trigonometric(self) -> bool {
        matches!(self, MathFunction::Sin | MathFunction::Cos | MathFunction::Tan)
    }

    /// The function on a single number. Predicates give 1 or 0.
    pub fn eval(self, x: f64) -> f64 {
        use MathFunction::*;
        match self {
            Abs => x.abs(),
            Negative => -x,
            Positive => x,
            Rint => rint(x),
            Floor => x.floor(),
            Ceil => x.ceil(),
            Trunc => x.trunc(),
            NanToNum => nan_to_num(x),
            Exp => x.exp(),
            Exp2 => x.exp2(),
            Ln => x.ln(),
            Log2 => x.log2(),
            Log10 => x.log10(),
            Expm1 => x.exp_m1(),
            Ln1p => x.ln_1p(),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Asin => x.asin(),
            Acos => x.acos(),
            Atan => x.atan(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Asinh => x.asinh(),
            Acosh => x.acosh(),
            Atanh => x.atanh(),
            Signum => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Deg2Rad => x.to_radians(),
            Rad2Deg => x.to_degrees(),
            Sqrt => x.sqrt(),
            Cbrt => x.cbrt(),
            IsNan => f64::from(u8::from(x.is_nan())),
            IsFinite => f64::from(u8::from(x.is_finite())),
            IsInf => f64::from(u8::from(x.is_infinite())),
        }
    }

    fn test(self, x: f64) -> bool {
        match self {
            MathFunction::IsNan => x.is_nan(),
            MathFunction::IsFinite => x.is_finite(),
            MathFunction::IsInf => x.is_infinite(),
            _ => self.eval(x) != 0.0,
        }
    }
}

/// The result of [`Quantity::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum MathOutput {
    Quantity(Quantity),
    Mask(Array1<bool>),
}

impl MathOutput {
    pub fn into_quantity(self) -> Option<Quantity> {
        match self {
            MathOutput::Quantity(q) => Some(q),
            MathOutput::Mask(_) => None,
        }
    }

    pub fn into_mask(self) -> Option<Array1<bool>> {
        match self {
            MathOutput::Quantity(_) => None,
            MathOutput::Mask(m) => Some(m),
        }
    }
}

impl Quantity {
    /// Apply a math function elementwise. Trigonometric functions on an
    /// angle are evaluated in radians.
    pub fn apply(&self, function: MathFunction) -> MathOutput {
        match function.behaviour() {
            UnitBehaviour::Preserved => MathOutput::Quantity(self.map_values(|x| function.eval(x))),
            UnitBehaviour::Predicate => {
                MathOutput::Mask(self.value.mapv(|x| function.test(x)))
            }
            UnitBehaviour::Lost => {
                let to_radians = if function.is_trigonometric()
                    && self.dimension() == Some(Dimension::ANGLE)
                {
                    self.unit.scale_factor()
                } else {
                    1.0
                };
                self.with_unit(
                    self.value.mapv(|x| function.eval(x * to_radians)),
                    Unit::none(),
                )
            }
            UnitBehaviour::Root(n) => {
                let unit = self.unit.root(n).unwrap_or_else(|| {
                    debug!("[{}] has no {n}-th root; the result has no unit", self.unit);
                    Unit::none()
                });
                self.with_unit(self.value.mapv(|x| function.eval(x)), unit)
            }
        }
    }

    fn with_unit(&self, value: Array1<f64>, unit: Unit) -> MathOutput {
        MathOutput::Quantity(Quantity {
            value,
            unit,
            name: self.name.clone(),
            constant: false,
        })
    }

    fn apply_quantity(&self, function: MathFunction) -> Quantity {
        match self.apply(function) {
            MathOutput::Quantity(q) => q,
            // Only predicates give masks.
            MathOutput::Mask(m) => Quantity::unitless(m.mapv(u8::from)),
        }
    }

    fn apply_mask(&self, function: MathFunction) -> Array1<bool> {
        self.value.mapv(|x| function.test(x))
    }

    pub fn abs(&self) -> Quantity {
        self.apply_quantity(MathFunction::Abs)
    }

    pub fn rint(&self) -> Quantity {
        self.apply_quantity(MathFunction::Rint)
    }

    pub fn floor(&self) -> Quantity {
        self.apply_quantity(MathFunction::Floor)
    }

    pub fn ceil(&self) -> Quantity {
        self.apply_quantity(MathFunction::Ceil)
    }

    pub fn nan_to_num(&self) -> Quantity {
        self.apply_quantity(MathFunction::NanToNum)
    }

    pub fn sqrt(&self) -> Quantity {
        self.apply_quantity(MathFunction::Sqrt)
    }

    pub fn cbrt(&self) -> Quantity {
        self.apply_quantity(MathFunction::Cbrt)
    }

    pub fn exp(&self) -> Quantity {
        self.apply_quantity(MathFunction::Exp)
    }

    pub fn ln(&self) -> Quantity {
        self.apply_quantity(MathFunction::Ln)
    }

    pub fn log10(&self) -> Quantity {
        self.apply_quantity(MathFunction::Log10)
    }

    pub fn sin(&self) -> Quantity {
        self.apply_quantity(MathFunction::Sin)
    }

    pub fn cos(&self) -> Quantity {
        self.apply_quantity(MathFunction::Cos)
    }

    pub fn tan(&self) -> Quantity {
        self.apply_quantity(MathFunction::Tan)
    }

    pub fn is_nan(&self) -> Array1<bool> {
        self.apply_mask(MathFunction::IsNan)
    }

    pub fn is_finite(&self) -> Array1<bool> {
        self.apply_mask(MathFunction::IsFinite)
    }

    pub fn is_inf(&self) -> Array1<bool> {
        self.apply_mask(MathFunction::IsInf)
    }
}
