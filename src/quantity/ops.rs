// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arithmetic, bitwise and comparison operators on [`Quantity`].
//!
//! The other operand may be a [`Quantity`], a bare number or array (no unit,
//! no name) or a [`Unit`] (acting as the value 1 in that unit). Operands are
//! broadcast when one of them has a single element.
//!
//! Unit rules:
//! - `+`, `-`, bitwise operators and comparisons need the same unit on both
//!   sides; a side without a unit takes the other side's unit.
//! - `*`, `/`, floor division and `%` multiply or divide the units.
//! - `**` needs a unitless exponent. An integral exponent raises the unit to
//!   that power, `1/n` takes a root when possible, anything else drops the
//!   unit.
//!
//! All fallible operators return `Result<Quantity, QuantityError>`.

use std::borrow::Cow;

use log::debug;
use ndarray::{prelude::*, CowArray, Zip};

use super::{Quantity, QuantityError};
use crate::{math::broadcast_pair, units::Unit, units::UnitError};

/// A borrowed view of one side of an operator.
#[derive(Debug)]
pub struct Operand<'a> {
    value: CowArray<'a, f64, Ix1>,
    unit: Cow<'a, Unit>,
    name: Option<&'a str>,
    constant: bool,
}

/// Things that can take part in an operation with a [`Quantity`].
pub trait AsOperand {
    fn as_operand(&self) -> Operand<'_>;
}

impl AsOperand for Quantity {
    fn as_operand(&self) -> Operand<'_> {
        Operand {
            value: CowArray::from(self.value.view()),
            unit: Cow::Borrowed(&self.unit),
            name: self.name.as_deref(),
            constant: self.constant,
        }
    }
}

impl AsOperand for f64 {
    fn as_operand(&self) -> Operand<'_> {
        Operand {
            value: CowArray::from(array![*self]),
            unit: Cow::Owned(Unit::none()),
            name: None,
            constant: false,
        }
    }
}

impl AsOperand for Array1<f64> {
    fn as_operand(&self) -> Operand<'_> {
        Operand {
            value: CowArray::from(self.view()),
            unit: Cow::Owned(Unit::none()),
            name: None,
            constant: false,
        }
    }
}

impl AsOperand for Unit {
    fn as_operand(&self) -> Operand<'_> {
        Operand {
            value: CowArray::from(array![1.0]),
            unit: Cow::Borrowed(self),
            name: None,
            constant: false,
        }
    }
}

/// Binary operators producing a [`Quantity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
            BinaryOp::FloorDiv => (x / y).floor(),
            BinaryOp::Rem => {
                // The result takes the sign of the divisor.
                let r = x % y;
                if r != 0.0 && (r < 0.0) != (y < 0.0) {
                    r + y
                } else {
                    r
                }
            }
            BinaryOp::Pow => x.powf(y),
            BinaryOp::BitAnd => ((x as i64) & (y as i64)) as f64,
            BinaryOp::BitOr => ((x as i64) | (y as i64)) as f64,
            BinaryOp::BitXor => ((x as i64) ^ (y as i64)) as f64,
            BinaryOp::Shl | BinaryOp::Shr if y < 0.0 => f64::NAN,
            BinaryOp::Shl => (x as i64) as f64 * 2_f64.powi(y as i32),
            BinaryOp::Shr => ((x as i64) as f64 / 2_f64.powi(y as i32)).floor(),
        }
    }

    fn needs_same_unit(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add | BinaryOp::Sub => Some("Addition and subtraction"),
            BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::Shl
            | BinaryOp::Shr => Some("Bitwise operations"),
            _ => None,
        }
    }
}

/// Elementwise comparisons. These return plain boolean arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn apply(self, x: f64, y: f64) -> bool {
        match self {
            CompareOp::Eq => x == y,
            CompareOp::Ne => x != y,
            CompareOp::Lt => x < y,
            CompareOp::Le => x <= y,
            CompareOp::Gt => x > y,
            CompareOp::Ge => x >= y,
        }
    }
}

/// The unit shared by both sides. A side without a unit takes the other's.
fn shared_unit(operation: &'static str, left: &Unit, right: &Unit) -> Result<Unit, UnitError> {
    if right.is_none() || left == right {
        Ok(left.clone())
    } else if left.is_none() {
        Ok(right.clone())
    } else {
        Err(UnitError::NotSameUnit {
            operation,
            left: left.to_string(),
            right: right.to_string(),
        })
    }
}

/// The unit of `base ** exponent`.
fn power_unit(base: &Unit, exponent: &Operand) -> Result<Unit, UnitError> {
    if !exponent.unit.is_unitless() {
        return Err(UnitError::ExponentWithUnit {
            unit: exponent.unit.to_string(),
        });
    }
    if base.is_unitless() {
        return Ok(base.clone());
    }

    let first = match exponent.value.first() {
        Some(&e) if exponent.value.iter().all(|&x| x == e) => e,
        _ => {
            debug!("Varying exponents on [{base}]; the result has no unit");
            return Ok(Unit::none());
        }
    };
    if first.fract() == 0.0 && first.abs() <= i32::MAX as f64 {
        return base.powi(first as i32);
    }
    let inverse = 1.0 / first;
    if (inverse - inverse.round()).abs() < 1e-9 && inverse.abs() <= i32::MAX as f64 {
        if let Some(root) = base.root(inverse.round() as i32) {
            return Ok(root);
        }
    }
    debug!("[{base}] ** {first} is not a unit; the result has no unit");
    Ok(Unit::none())
}

/// The name of a result built from two operands. A constant never lends its
/// name; two different names cancel.
fn merged_name(left: &Operand, right: &Operand) -> Option<String> {
    let name = match (left.constant, right.constant) {
        (true, true) => None,
        (true, false) => right.name,
        (false, true) => left.name,
        (false, false) => match (left.name, right.name) {
            (Some(l), Some(r)) if l != r => None,
            (l, r) => l.or(r),
        },
    };
    name.map(str::to_string)
}

fn combine_values(
    function: &str,
    left: &Operand,
    right: &Operand,
    op: impl Fn(f64, f64) -> f64,
) -> Result<Array1<f64>, QuantityError> {
    let (l, r) = broadcast_pair(&left.value, &right.value).ok_or_else(|| {
        QuantityError::BadArrayShape {
            argument: "other".to_string(),
            function: function.to_string(),
            expected: format!("length {} or 1", left.value.len()),
            received: format!("length {}", right.value.len()),
        }
    })?;
    Ok(Zip::from(&l).and(&r).map_collect(|&x, &y| op(x, y)))
}

fn combine(op: BinaryOp, left: &Operand, right: &Operand) -> Result<Quantity, QuantityError> {
    let unit = match op {
        BinaryOp::Mul => (&*left.unit * &*right.unit)?,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Rem => (&*left.unit / &*right.unit)?,
        BinaryOp::Pow => power_unit(&left.unit, right)?,
        _ => {
            // Only the same-unit operators are left.
            let operation = op.needs_same_unit().unwrap_or("This operation");
            shared_unit(operation, &left.unit, &right.unit)?
        }
    };
    let value = combine_values(&format!("Quantity::{op:?}"), left, right, |x, y| {
        op.apply(x, y)
    })?;
    Ok(Quantity {
        value,
        unit,
        name: merged_name(left, right),
        constant: false,
    })
}

impl Quantity {
    /// `self <op> other`.
    ///
    /// The result's name follows these rules: if one operand is a constant,
    /// the result takes the other operand's name (no name if both are
    /// constants); otherwise two different names give no name, and a name
    /// combined with no name is kept. Results are never constants.
    pub fn binary<O: AsOperand + ?Sized>(
        &self,
        op: BinaryOp,
        other: &O,
    ) -> Result<Quantity, QuantityError> {
        combine(op, &self.as_operand(), &other.as_operand())
    }

    /// `other <op> self`, e.g. `2 - q` or `2 ** q`.
    pub fn reflected<O: AsOperand + ?Sized>(
        &self,
        op: BinaryOp,
        other: &O,
    ) -> Result<Quantity, QuantityError> {
        combine(op, &other.as_operand(), &self.as_operand())
    }

    /// Elementwise `self <op> other`. Both sides need the same unit, unless
    /// one of them has none.
    pub fn compare<O: AsOperand + ?Sized>(
        &self,
        op: CompareOp,
        other: &O,
    ) -> Result<Array1<bool>, QuantityError> {
        let left = self.as_operand();
        let right = other.as_operand();
        shared_unit("Comparisons", &left.unit, &right.unit)?;
        let (l, r) = broadcast_pair(&left.value, &right.value).ok_or_else(|| {
            QuantityError::BadArrayShape {
                argument: "other".to_string(),
                function: format!("Quantity::compare({op:?})"),
                expected: format!("length {} or 1", left.value.len()),
                received: format!("length {}", right.value.len()),
            }
        })?;
        Ok(Zip::from(&l).and(&r).map_collect(|&x, &y| op.apply(x, y)))
    }

    pub fn pow<O: AsOperand + ?Sized>(&self, exponent: &O) -> Result<Quantity, QuantityError> {
        self.binary(BinaryOp::Pow, exponent)
    }

    pub fn floor_div<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Quantity, QuantityError> {
        self.binary(BinaryOp::FloorDiv, other)
    }

    pub fn cmp_eq<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Eq, other)
    }

    pub fn cmp_ne<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Ne, other)
    }

    pub fn cmp_lt<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Lt, other)
    }

    pub fn cmp_le<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Le, other)
    }

    pub fn cmp_gt<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Gt, other)
    }

    pub fn cmp_ge<O: AsOperand + ?Sized>(&self, other: &O) -> Result<Array1<bool>, QuantityError> {
        self.compare(CompareOp::Ge, other)
    }

    /// A copy with the values transformed and everything else kept.
    pub(crate) fn map_values(&self, f: impl Fn(f64) -> f64) -> Quantity {
        Quantity {
            value: self.value.mapv(f),
            unit: self.unit.clone(),
            name: self.name.clone(),
            constant: self.constant,
        }
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&Quantity> for &Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: &Quantity) -> Self::Output {
                self.binary($op, rhs)
            }
        }

        impl std::ops::$trait<Quantity> for Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: Quantity) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl std::ops::$trait<&Quantity> for Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: &Quantity) -> Self::Output {
                self.binary($op, rhs)
            }
        }

        impl std::ops::$trait<Quantity> for &Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: Quantity) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl std::ops::$trait<f64> for &Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: f64) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl std::ops::$trait<f64> for Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: f64) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl std::ops::$trait<&Quantity> for f64 {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: &Quantity) -> Self::Output {
                rhs.reflected($op, &self)
            }
        }

        impl std::ops::$trait<Quantity> for f64 {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: Quantity) -> Self::Output {
                rhs.reflected($op, &self)
            }
        }

        impl std::ops::$trait<&Unit> for &Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: &Unit) -> Self::Output {
                self.binary($op, rhs)
            }
        }

        impl std::ops::$trait<Unit> for Quantity {
            type Output = Result<Quantity, QuantityError>;

            fn $method(self, rhs: Unit) -> Self::Output {
                self.binary($op, &rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Sub);
impl_binary_operator!(Mul, mul, BinaryOp::Mul);
impl_binary_operator!(Div, div, BinaryOp::Div);
impl_binary_operator!(Rem, rem, BinaryOp::Rem);
impl_binary_operator!(BitAnd, bitand, BinaryOp::BitAnd);
impl_binary_operator!(BitOr, bitor, BinaryOp::BitOr);
impl_binary_operator!(BitXor, bitxor, BinaryOp::BitXor);
impl_binary_operator!(Shl, shl, BinaryOp::Shl);
impl_binary_operator!(Shr, shr, BinaryOp::Shr);

impl std::ops::Neg for &Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.map_values(|x| -x)
    }
}

impl std::ops::Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        -&self
    }
}

/// Bitwise inversion of the integer part.
impl std::ops::Not for &Quantity {
    type Output = Quantity;

    fn not(self) -> Quantity {
        self.map_values(|x| !(x as i64) as f64)
    }
}

impl std::ops::Not for Quantity {
    type Output = Quantity;

    fn not(self) -> Quantity {
        !&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Dimension;
    use approx::assert_abs_diff_eq;

    fn q(value: &[f64], unit: &str) -> Quantity {
        Quantity::new(value, unit).unwrap()
    }

    #[test]
    fn test_add_same_unit() {
        let a = q(&[1.0, 2.0], "m");
        let b = q(&[3.0, 4.0], "m");
        let c = (&a + &b).unwrap();
        assert_eq!(c.value(), &array![4.0, 6.0]);
        assert_eq!(c.unit_str(), "m");
        let d = (&a - &b).unwrap();
        assert_eq!(d.value(), &array![-2.0, -2.0]);
    }

    #[test]
    fn test_add_commensurate_units_fails() {
        let a = q(&[1.0], "m");
        let b = q(&[1.0], "cm");
        let result = &a + &b;
        match result {
            Err(QuantityError::Unit(e @ UnitError::NotSameUnit { .. })) => {
                assert!(
                    e.to_string()
                        .starts_with("Addition and subtraction require the same unit"),
                    "{e}"
                );
            }
            other => panic!("Expected NotSameUnit, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_numbers() {
        let a = q(&[1.0, 2.0], "GHz");
        let b = (&a + 1.0).unwrap();
        assert_eq!(b.value(), &array![2.0, 3.0]);
        assert_eq!(b.unit_str(), "GHz");

        let c = (10.0 - &a).unwrap();
        assert_eq!(c.value(), &array![9.0, 8.0]);
        assert_eq!(c.unit_str(), "GHz");

        let d = (2.0 / &a).unwrap();
        assert_eq!(d.value(), &array![2.0, 1.0]);
        assert_eq!(d.unit_str(), "1 / GHz");

        let e = (&a * 3.0).unwrap();
        assert_eq!(e.unit_str(), "GHz");
    }

    #[test]
    fn test_mul_div_units() {
        let a = q(&[2.0], "m");
        let b = q(&[3.0], "s");
        let c = (&a * &b).unwrap();
        assert_eq!(c.value(), &array![6.0]);
        assert_eq!(c.dimension(), Some(Dimension::new([1, 0, 1, 0, 0, 0])));

        let v = (&a / &b).unwrap();
        assert_eq!(v.dimension(), Some(Dimension::VELOCITY));
        assert_abs_diff_eq!(v.value()[0], 2.0 / 3.0);

        let per = (&a / &a).unwrap();
        assert_eq!(per.unit(), &Unit::dimensionless());
    }

    #[test]
    fn test_unit_operand() {
        let a = q(&[2.0, 4.0], "m");
        let b = (&a / &Unit::parse("s").unwrap()).unwrap();
        assert_eq!(b.value(), &array![2.0, 4.0]);
        assert_eq!(b.unit_str(), "m / s");
    }

    #[test]
    fn test_floor_div_and_rem() {
        let a = q(&[7.0, -7.0], "m");
        let b = q(&[2.0], "s");
        let c = a.floor_div(&b).unwrap();
        assert_eq!(c.value(), &array![3.0, -4.0]);
        assert_eq!(c.unit_str(), "m / s");
        let r = (&a % &b).unwrap();
        assert_eq!(r.value(), &array![1.0, 1.0]);
        assert_eq!(r.unit_str(), "m / s");
        let r = (&a % -2.0).unwrap();
        assert_eq!(r.value(), &array![-1.0, -1.0]);
    }

    #[test]
    fn test_pow() {
        let a = q(&[2.0, 3.0], "m");
        let sq = a.pow(&2.0).unwrap();
        assert_eq!(sq.value(), &array![4.0, 9.0]);
        assert_eq!(sq.unit(), &Unit::parse("m ** 2").unwrap());

        let root = sq.pow(&0.5).unwrap();
        assert_abs_diff_eq!(root.value(), &array![2.0, 3.0], epsilon = 1e-12);
        assert_eq!(root.unit_str(), "m");

        let odd = a.pow(&0.3).unwrap();
        assert!(odd.unit().is_none());

        let exponent = q(&[2.0], "s");
        let result = a.pow(&exponent);
        assert!(
            matches!(
                result,
                Err(QuantityError::Unit(UnitError::ExponentWithUnit { .. }))
            ),
            "Expected ExponentWithUnit, got {result:?}"
        );

        let exponent = Quantity::unitless(2.0);
        let by_quantity = a.pow(&exponent).unwrap();
        assert_eq!(by_quantity, sq);

        // Reflected: 2 ** q needs a unitless q.
        let base = Quantity::unitless([1.0, 3.0]);
        let r = base.reflected(BinaryOp::Pow, &2.0).unwrap();
        assert_eq!(r.value(), &array![2.0, 8.0]);
        assert!(a.reflected(BinaryOp::Pow, &2.0).is_err());
    }

    #[test]
    fn test_pow_out_of_range() {
        let area = q(&[1.0], "m ** 2");
        let result = area.pow(&1073741824.0);
        assert!(
            matches!(
                result,
                Err(QuantityError::Unit(UnitError::InvalidExponent { .. }))
            ),
            "Expected InvalidExponent, got {result:?}"
        );

        let big = area.pow(&536870912.0).unwrap();
        assert_eq!(big.unit_str(), "m**1073741824");
        let result = &big * &big;
        assert!(
            matches!(
                result,
                Err(QuantityError::Unit(UnitError::InvalidExponent { .. }))
            ),
            "Expected InvalidExponent, got {result:?}"
        );
    }

    #[test]
    fn test_bitwise() {
        let a = q(&[6.0, 5.0], "dB");
        let b = q(&[3.0, 1.0], "dB");
        assert_eq!((&a & &b).unwrap().value(), &array![2.0, 1.0]);
        assert_eq!((&a | &b).unwrap().value(), &array![7.0, 5.0]);
        assert_eq!((&a ^ &b).unwrap().value(), &array![5.0, 4.0]);
        assert_eq!((&a << 2.0).unwrap().value(), &array![24.0, 20.0]);
        assert_eq!((&a >> 1.0).unwrap().value(), &array![3.0, 2.0]);
        assert_eq!((&a & &b).unwrap().unit_str(), "dB");

        let c = q(&[1.0, 1.0], "linear");
        let result = &a & &c;
        assert!(
            matches!(
                result,
                Err(QuantityError::Unit(UnitError::NotSameUnit { .. }))
            ),
            "Expected NotSameUnit, got {result:?}"
        );
    }

    #[test]
    fn test_comparisons() {
        let a = q(&[1.0, 2.0, 3.0], "K");
        let b = q(&[2.0], "K");
        assert_eq!(a.cmp_lt(&b).unwrap(), array![true, false, false]);
        assert_eq!(a.cmp_eq(&b).unwrap(), array![false, true, false]);
        assert_eq!(a.cmp_ge(&2.0).unwrap(), array![false, true, true]);
        assert_eq!(a.cmp_ne(&2.0).unwrap(), array![true, false, true]);

        let c = q(&[2.0], "J");
        assert!(a.cmp_eq(&c).is_err());
        assert!(a.cmp_lt(&c).is_err());
    }

    #[test]
    fn test_broadcast_mismatch() {
        let a = q(&[1.0, 2.0, 3.0], "m");
        let b = q(&[1.0, 2.0], "m");
        let result = &a + &b;
        assert!(
            matches!(result, Err(QuantityError::BadArrayShape { .. })),
            "Expected BadArrayShape, got {result:?}"
        );
    }

    #[test]
    fn test_name_propagation() {
        let a = q(&[1.0], "m").with_name("a");
        let b = q(&[2.0], "m").with_name("b");
        let unnamed = q(&[3.0], "m");
        let c = q(&[4.0], "m").with_name("c").with_constant(true);

        assert_eq!((&a + &b).unwrap().name(), None);
        assert_eq!((&a + &a).unwrap().name(), Some("a"));
        assert_eq!((&a + &unnamed).unwrap().name(), Some("a"));
        assert_eq!((&unnamed + &b).unwrap().name(), Some("b"));
        assert_eq!((&c * &a).unwrap().name(), Some("a"));
        assert_eq!((&a * &c).unwrap().name(), Some("a"));
        assert_eq!((&c * &unnamed).unwrap().name(), None);
        assert_eq!((&c * &c).unwrap().name(), None);
        assert!(!(&c * &a).unwrap().is_constant());
        assert_eq!((&a * 2.0).unwrap().name(), Some("a"));
    }

    #[test]
    fn test_unary() {
        let a = q(&[1.5, -2.0], "m")
            .with_name("x")
            .with_constant(true);
        let n = -&a;
        assert_eq!(n.value(), &array![-1.5, 2.0]);
        assert_eq!(n.unit_str(), "m");
        assert_eq!(n.name(), Some("x"));
        assert!(n.is_constant());

        let inverted = !&q(&[5.0], "m");
        assert_eq!(inverted.value(), &array![-6.0]);
        assert_eq!(inverted.unit_str(), "m");
    }

    #[test]
    fn test_operands_untouched() {
        let a = q(&[1.0, 2.0], "m").with_name("a");
        let before = a.clone();
        let _ = (&a * &a).unwrap();
        let _ = (&a + 1.0).unwrap();
        let _ = -&a;
        assert_eq!(a, before);
    }
}
