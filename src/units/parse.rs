// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Unit expression parsing.
//!
//! Expressions are whitespace-separated tokens. Operands are unit spellings
//! or numeric literals; operators are `*`, `/`, `+`, `-` and `**`. There is
//! no precedence: "m / s * K" is "(m / s) * K".

use log::trace;

use super::{UnitCatalog, UnitError, Unit};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Mul,
    Div,
    Add,
    Sub,
    Pow,
}

impl Operator {
    fn from_token(token: &str) -> Option<Operator> {
        let op = match token {
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "**" => Operator::Pow,
            _ => return None,
        };
        Some(op)
    }
}

enum Operand {
    Unit(Unit),
    Literal(f64),
}

impl Operand {
    fn into_unit(self) -> Unit {
        match self {
            Operand::Unit(u) => u,
            Operand::Literal(x) => Unit::scalar(x),
        }
    }
}

fn operand(catalog: &UnitCatalog, token: &str) -> Result<Operand, UnitError> {
    if let Some(def) = catalog.get(token) {
        return Ok(Operand::Unit(Unit::from(def)));
    }
    match token.parse::<f64>() {
        Ok(x) => Ok(Operand::Literal(x)),
        Err(_) => Err(UnitError::NotAUnit {
            token: token.to_string(),
            valid: catalog.symbols(),
        }),
    }
}

pub(super) fn parse_expression(catalog: &UnitCatalog, expr: &str) -> Result<Unit, UnitError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(UnitError::EmptyExpression);
    }
    if trimmed == "-" {
        return Ok(Unit::none());
    }

    let malformed = |reason: String| UnitError::Malformed {
        expr: expr.to_string(),
        reason,
    };

    let mut acc: Option<Unit> = None;
    let mut pending: Option<Operator> = None;
    for token in trimmed.split_whitespace() {
        if let Some(op) = Operator::from_token(token) {
            if acc.is_none() || pending.is_some() {
                return Err(malformed(format!("unexpected operator '{token}'")));
            }
            pending = Some(op);
            continue;
        }

        let rhs = operand(catalog, token)?;
        acc = match (acc.take(), pending.take()) {
            (None, _) => Some(rhs.into_unit()),
            (Some(_), None) => {
                return Err(malformed(format!("missing operator before '{token}'")));
            }
            (Some(lhs), Some(op)) => {
                let invalid_exponent = || UnitError::InvalidExponent {
                    token: token.to_string(),
                    expr: expr.to_string(),
                };
                let next = match op {
                    Operator::Mul => (&lhs * &rhs.into_unit()).map_err(|_| invalid_exponent())?,
                    Operator::Div => (&lhs / &rhs.into_unit()).map_err(|_| invalid_exponent())?,
                    Operator::Add => lhs.sum(&rhs.into_unit(), "+"),
                    Operator::Sub => lhs.sum(&rhs.into_unit(), "-"),
                    Operator::Pow => {
                        let n = match rhs {
                            Operand::Literal(n) if n.fract() == 0.0 => {
                                i32::try_from(n as i64).map_err(|_| invalid_exponent())?
                            }
                            _ => return Err(invalid_exponent()),
                        };
                        lhs.powi(n).map_err(|_| invalid_exponent())?
                    }
                };
                Some(next)
            }
        };
    }

    if let Some(op) = pending {
        return Err(malformed(format!("dangling operator {op:?}")));
    }
    // The loop saw at least one token, and a lone operator fails above.
    let unit = acc.ok_or_else(|| malformed("no operands".to_string()))?;
    trace!("Parsed unit expression '{expr}' as [{unit}]");
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{catalog, Dimension, CENTIMETER, GIGAHERTZ, KELVIN, METER, SECOND};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_units() {
        let unit = catalog().parse("GHz").unwrap();
        assert_eq!(unit, Unit::from(GIGAHERTZ));
        let unit = catalog().parse("  centimeters ").unwrap();
        assert_eq!(unit, Unit::from(CENTIMETER));
    }

    #[test]
    fn test_no_unit() {
        let unit = catalog().parse("-").unwrap();
        assert!(unit.is_none());
        assert_eq!(unit.dimension(), None);
    }

    #[test]
    fn test_left_to_right() {
        let unit = catalog().parse("m / s * K").unwrap();
        let velocity = (&Unit::from(METER) / &Unit::from(SECOND)).unwrap();
        let expected = (&velocity * &Unit::from(KELVIN)).unwrap();
        assert_eq!(unit, expected);

        // Not "m / (s * K)".
        let unit = catalog().parse("m / s / K").unwrap();
        assert_eq!(unit.to_string(), "m / (K * s)");
    }

    #[test]
    fn test_literals() {
        let unit = catalog().parse("1 / cm").unwrap();
        assert_eq!(unit.dimension(), Dimension::LENGTH.powi(-1));
        assert_abs_diff_eq!(unit.scale_factor(), 100.0, epsilon = 1e-10);

        let unit = catalog().parse("m ** 2").unwrap();
        assert_eq!(unit, Unit::from(METER).powi(2).unwrap());

        let unit = catalog().parse("1 / s ** 2").unwrap();
        assert_eq!(unit.dimension(), Dimension::TIME.powi(-2));
    }

    #[test]
    fn test_addition() {
        assert_eq!(catalog().parse("m + m").unwrap(), Unit::from(METER));
        let unit = catalog().parse("m + s").unwrap();
        assert_eq!(unit.dimension(), None);
        assert!(!unit.is_none());
    }

    #[test]
    fn test_errors() {
        let result = catalog().parse("furlong");
        match result {
            Err(UnitError::NotAUnit { token, valid }) => {
                assert_eq!(token, "furlong");
                assert!(valid.contains("GHz"), "Expected GHz in '{valid}'");
            }
            other => panic!("Expected NotAUnit, got {other:?}"),
        }

        assert_eq!(catalog().parse("   "), Err(UnitError::EmptyExpression));
        assert!(matches!(
            catalog().parse("* m"),
            Err(UnitError::Malformed { .. })
        ));
        assert!(matches!(
            catalog().parse("m /"),
            Err(UnitError::Malformed { .. })
        ));
        assert!(matches!(
            catalog().parse("m s"),
            Err(UnitError::Malformed { .. })
        ));
        assert!(matches!(
            catalog().parse("m / / s"),
            Err(UnitError::Malformed { .. })
        ));
        assert!(matches!(
            catalog().parse("m ** s"),
            Err(UnitError::InvalidExponent { .. })
        ));
        assert!(matches!(
            catalog().parse("m ** 1.5"),
            Err(UnitError::InvalidExponent { .. })
        ));
    }

    #[test]
    fn test_exponent_out_of_range() {
        let result = catalog().parse("m ** 65536 ** 65536");
        match result {
            Err(UnitError::InvalidExponent { token, expr }) => {
                assert_eq!(token, "65536");
                assert_eq!(expr, "m ** 65536 ** 65536");
            }
            other => panic!("Expected InvalidExponent, got {other:?}"),
        }

        let result = catalog().parse("m ** 1e12");
        assert!(
            matches!(result, Err(UnitError::InvalidExponent { .. })),
            "Expected InvalidExponent, got {result:?}"
        );
        let result = catalog().parse("m ** 2147483647 * m");
        assert!(
            matches!(result, Err(UnitError::InvalidExponent { .. })),
            "Expected InvalidExponent, got {result:?}"
        );

        // Large but representable powers are fine.
        let unit = catalog().parse("m ** 65536 / m").unwrap();
        assert_eq!(unit.dimension(), Some(Dimension::new([65535, 0, 0, 0, 0, 0])));
    }
}
