// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Unit-aware numeric arrays.
//!
//! A [`Quantity`] is a 1-D array of `f64` values with a [`Unit`], an optional
//! name and a "constant" flag. Arithmetic never mutates its operands; every
//! operator returns a new [`Quantity`] (see [`ops`]).
//!
//! Names are bookkeeping for labels. A constant's name (e.g. "Speed of
//! light") never propagates into a derived expression; see
//! [`Quantity::binary`] for the full rule.

mod functions;
mod ops;

pub use functions::{MathFunction, MathOutput, UnitBehaviour};
pub use ops::{AsOperand, BinaryOp, CompareOp, Operand};

use itertools::Itertools;
use log::trace;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::units::{dimension_str, Dimension, Unit, UnitDef, UnitError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantityError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("bad array shape supplied to argument {argument} of function {function}. expected {expected}, received {received}")]
    /// Error for operands whose lengths can't be broadcast together
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

/// Things that can become the values of a [`Quantity`]. Input of any
/// dimensionality is flattened; integers are promoted to `f64`.
pub trait IntoValues {
    fn into_values(self) -> Array1<f64>;
}

macro_rules! impl_into_values_for_primitive {
    ($($t:ty),*) => {
        $(
            impl IntoValues for $t {
                fn into_values(self) -> Array1<f64> {
                    array![self as f64]
                }
            }
        )*
    };
}

impl_into_values_for_primitive!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn to_f64<T: ToPrimitive>(x: &T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

impl<T: ToPrimitive> IntoValues for Vec<T> {
    fn into_values(self) -> Array1<f64> {
        self.iter().map(to_f64).collect()
    }
}

impl<T: ToPrimitive> IntoValues for &[T] {
    fn into_values(self) -> Array1<f64> {
        self.iter().map(to_f64).collect()
    }
}

impl<T: ToPrimitive, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Array1<f64> {
        self.iter().map(to_f64).collect()
    }
}

impl<T: ToPrimitive, D: ndarray::Dimension> IntoValues for Array<T, D> {
    fn into_values(self) -> Array1<f64> {
        self.iter().map(to_f64).collect()
    }
}

impl<T: ToPrimitive, D: ndarray::Dimension> IntoValues for ArrayView<'_, T, D> {
    fn into_values(self) -> Array1<f64> {
        self.iter().map(to_f64).collect()
    }
}

/// Things that can be interpreted as a [`Unit`]: unit expressions, units and
/// catalog entries. `None` means "no unit".
pub trait ToUnit {
    fn to_unit(self) -> Result<Unit, UnitError>;
}

impl ToUnit for &str {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Unit::parse(self)
    }
}

impl ToUnit for String {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Unit::parse(&self)
    }
}

impl ToUnit for &String {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Unit::parse(self)
    }
}

impl ToUnit for Unit {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Ok(self)
    }
}

impl ToUnit for &Unit {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Ok(self.clone())
    }
}

impl ToUnit for UnitDef {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Ok(Unit::from(self))
    }
}

impl ToUnit for &UnitDef {
    fn to_unit(self) -> Result<Unit, UnitError> {
        Ok(Unit::from(self))
    }
}

impl ToUnit for Option<&str> {
    fn to_unit(self) -> Result<Unit, UnitError> {
        match self {
            Some(s) => Unit::parse(s),
            None => Ok(Unit::none()),
        }
    }
}

/// A 1-D array of values with a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    value: Array1<f64>,
    unit: Unit,
    name: Option<String>,
    constant: bool,
}

impl Quantity {
    /// Make a new [`Quantity`]. Fails if `unit` is an expression that can't
    /// be parsed.
    ///
    /// ```
    /// # use remsens::Quantity;
    /// let q = Quantity::new([1.26, 10.0], "GHz")?;
    /// assert_eq!(q.unit_str(), "GHz");
    /// # Ok::<(), remsens::QuantityError>(())
    /// ```
    pub fn new<V: IntoValues, U: ToUnit>(value: V, unit: U) -> Result<Quantity, QuantityError> {
        Ok(Quantity::from_parts(value.into_values(), unit.to_unit()?))
    }

    /// A [`Quantity`] without a unit.
    pub fn unitless<V: IntoValues>(value: V) -> Quantity {
        Quantity::from_parts(value.into_values(), Unit::none())
    }

    /// A [`Quantity`] from already-built parts. Never fails.
    pub fn from_parts(value: Array1<f64>, unit: Unit) -> Quantity {
        Quantity {
            value,
            unit,
            name: None,
            constant: false,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Quantity {
        self.name = Some(name.into());
        self
    }

    pub fn with_constant(mut self, constant: bool) -> Quantity {
        self.constant = constant;
        self
    }

    pub fn value(&self) -> &Array1<f64> {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// The dimension of the unit. Always derived from the unit, never stored.
    pub fn dimension(&self) -> Option<Dimension> {
        self.unit.dimension()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn set_name<S: Into<String>>(&mut self, name: Option<S>) {
        self.name = name.map(Into::into);
    }

    pub fn set_constant(&mut self, constant: bool) {
        self.constant = constant;
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The element at `index` as a single-element [`Quantity`] with the same
    /// unit and metadata.
    pub fn get(&self, index: usize) -> Option<Quantity> {
        self.value.get(index).map(|&v| self.single(v))
    }

    /// Iterate over the elements as single-element quantities.
    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.value.iter().map(|&v| self.single(v))
    }

    fn single(&self, v: f64) -> Quantity {
        Quantity {
            value: array![v],
            unit: self.unit.clone(),
            name: self.name.clone(),
            constant: self.constant,
        }
    }

    /// Split into values and unit.
    pub fn decompose(self) -> (Array1<f64>, Unit) {
        (self.value, self.unit)
    }

    /// The unit as a string; "-" when there is no unit.
    pub fn unit_str(&self) -> String {
        self.unit.to_string()
    }

    /// The unit as math text, e.g. "$m^2$"; "-" when there is no unit.
    pub fn unit_mathstr(&self) -> String {
        self.unit.mathstr()
    }

    /// A plot label: the name and the unit as math text.
    pub fn label(&self) -> String {
        format!(
            "{} \n in [{}]",
            self.name.as_deref().unwrap_or_default(),
            self.unit_mathstr()
        )
    }

    /// The same values expressed in a commensurate unit. Fails with
    /// [`UnitError::Incompatible`] otherwise; no physical law (e.g.
    /// frequency to wavelength) is applied here.
    pub fn convert_to<U: ToUnit>(&self, target: U) -> Result<Quantity, QuantityError> {
        let target = target.to_unit()?;
        let value = self.converted_values(&target)?;
        Ok(Quantity {
            value,
            unit: target,
            name: self.name.clone(),
            constant: self.constant,
        })
    }

    /// As [`Quantity::convert_to`], but rescale this quantity in place.
    pub fn convert_to_inplace<U: ToUnit>(&mut self, target: U) -> Result<(), QuantityError> {
        let target = target.to_unit()?;
        self.value = self.converted_values(&target)?;
        self.unit = target;
        Ok(())
    }

    fn converted_values(&self, target: &Unit) -> Result<Array1<f64>, UnitError> {
        if &self.unit == target {
            return Ok(self.value.clone());
        }
        if !self.unit.is_commensurate(target) {
            return Err(UnitError::Incompatible {
                from: self.unit.to_string(),
                to: target.to_string(),
                from_dim: dimension_str(self.unit.dimension()),
                to_dim: dimension_str(target.dimension()),
            });
        }
        let src = self.unit.scale_factor();
        let dst = target.scale_factor();
        trace!("Converting [{}] to [{target}] (x {src} / {dst})", self.unit);
        Ok(self.value.mapv(|v| v * src / dst))
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}]", self.value.iter().join(", "))?;
        match &self.name {
            Some(name) => write!(f, " {name} in [{}]", self.unit),
            None => write!(f, " [{}]", self.unit),
        }
    }
}

#[cfg(any(test, feature = "approx"))]
impl approx::AbsDiffEq for Quantity {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.unit == other.unit
            && self.len() == other.len()
            && self
                .value
                .iter()
                .zip(other.value.iter())
                .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

#[cfg(any(test, feature = "approx"))]
impl approx::RelativeEq for Quantity {
    #[inline]
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    #[inline]
    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.unit == other.unit
            && self.len() == other.len()
            && self
                .value
                .iter()
                .zip(other.value.iter())
                .all(|(a, b)| f64::relative_eq(a, b, epsilon, max_relative))
    }

    #[inline]
    fn relative_ne(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        !Self::relative_eq(self, other, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CENTIMETER, GIGAHERTZ, METER};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_construction() {
        let q = Quantity::new(vec![1, 2, 3], "m").unwrap();
        assert_eq!(q.value(), &array![1.0, 2.0, 3.0]);
        assert_eq!(q.dimension(), Some(Dimension::LENGTH));
        assert_eq!(q.name(), None);
        assert!(!q.is_constant());

        let q = Quantity::new(array![[1.0, 2.0], [3.0, 4.0]], "s").unwrap();
        assert_eq!(q.len(), 4);

        let q = Quantity::new(5_u8, None).unwrap();
        assert!(q.unit().is_none());
        assert_eq!(q.unit_str(), "-");
        assert_eq!(q.unit_mathstr(), "-");

        let result = Quantity::new(1.0, "parsec");
        assert!(
            matches!(result, Err(QuantityError::Unit(UnitError::NotAUnit { .. }))),
            "Expected NotAUnit, got {result:?}"
        );
    }

    #[test]
    fn test_display() {
        let q = Quantity::new(23, "GHz").unwrap().with_name("Test Case");
        assert_eq!(q.to_string(), "[23] Test Case in [GHz]");
        let q = Quantity::new([1.5, 2.0], "m / s").unwrap();
        assert_eq!(q.to_string(), "[1.5, 2] [m / s]");
        assert_eq!(q.unit_mathstr(), "$m / s$");
    }

    #[test]
    fn test_label() {
        let q = Quantity::new(1.0, "m ** 2").unwrap().with_name("Area");
        assert_eq!(q.label(), "Area \n in [$m^2$]");
    }

    #[test]
    fn test_convert_to() {
        let q = Quantity::new([1.0, 2.5], "m").unwrap().with_name("Height");
        let cm = q.convert_to("cm").unwrap();
        assert_abs_diff_eq!(cm.value(), &array![100.0, 250.0], epsilon = 1e-10);
        assert_eq!(cm.unit(), &Unit::from(CENTIMETER));
        assert_eq!(cm.name(), Some("Height"));
        // The original is untouched.
        assert_eq!(q.unit(), &Unit::from(METER));

        let back = cm.convert_to(METER).unwrap();
        assert_relative_eq!(back, q.clone().with_name("Height"), max_relative = 1e-12);

        let result = q.convert_to("GHz");
        assert!(
            matches!(
                result,
                Err(QuantityError::Unit(UnitError::Incompatible { .. }))
            ),
            "Expected Incompatible, got {result:?}"
        );

        let hz = Quantity::new(2.0, "1 / s").unwrap().convert_to("kHz").unwrap();
        assert_abs_diff_eq!(hz.value()[0], 0.002, epsilon = 1e-15);
    }

    #[test]
    fn test_convert_to_inplace() {
        let mut q = Quantity::new(1.5, GIGAHERTZ).unwrap();
        q.convert_to_inplace("MHz").unwrap();
        assert_abs_diff_eq!(q.value()[0], 1500.0, epsilon = 1e-9);
        assert_eq!(q.unit_str(), "MHz");

        assert!(q.convert_to_inplace("nm").is_err());
        // A failed conversion leaves the quantity alone.
        assert_eq!(q.unit_str(), "MHz");
    }

    #[test]
    fn test_get_and_iter() {
        let q = Quantity::new([1.0, 2.0, 3.0], "K")
            .unwrap()
            .with_name("Temperature");
        let second = q.get(1).unwrap();
        assert_eq!(second.value(), &array![2.0]);
        assert_eq!(second.unit_str(), "K");
        assert_eq!(second.name(), Some("Temperature"));
        assert!(q.get(3).is_none());

        let elements: Vec<Quantity> = q.iter().collect();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[2].value()[0], 3.0);

        let (values, unit) = q.decompose();
        assert_eq!(values, array![1.0, 2.0, 3.0]);
        assert_eq!(unit.to_string(), "K");
    }

    #[test]
    fn test_setters() {
        let mut q = Quantity::unitless(1.0);
        q.set_name(Some("x"));
        q.set_constant(true);
        assert_eq!(q.name(), Some("x"));
        assert!(q.is_constant());
        q.set_name(None::<String>);
        assert_eq!(q.name(), None);
    }
}
