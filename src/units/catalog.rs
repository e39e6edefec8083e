// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The registry of known units.
//!
//! Every unit is tagged with a [`Dimension`] and a scale factor relative to
//! the base unit of that dimension (Hz, m, s, K, J, W, kg, A, rad). A value
//! `v` in unit `a` is `v * a.scale / b.scale` in a commensurate unit `b`.

use std::collections::HashMap;

use itertools::Itertools;
use lazy_static::lazy_static;

use super::{parse::parse_expression, Dimension, Unit, UnitError};

/// A single named unit.
#[derive(Clone, Copy, Debug)]
pub struct UnitDef {
    /// Canonical symbol, e.g. "GHz".
    pub symbol: &'static str,
    /// Long name, e.g. "gigahertz".
    pub name: &'static str,
    /// Other spellings accepted by the parser. The symbol and the name are
    /// always accepted.
    pub aliases: &'static [&'static str],
    pub dimension: Dimension,
    /// How many base units of `dimension` one of this unit is.
    pub scale: f64,
}

// Units are identified by their symbol.
impl PartialEq for UnitDef {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

macro_rules! unit_def {
    ($ident:ident, $symbol:literal, $name:literal, [$($alias:literal),*], $dim:expr, $scale:expr) => {
        pub const $ident: UnitDef = UnitDef {
            symbol: $symbol,
            name: $name,
            aliases: &[$($alias),*],
            dimension: $dim,
            scale: $scale,
        };
    };
}

// Frequency.
unit_def!(MILLIHERTZ, "mHz", "millihertz", ["mhz"], Dimension::FREQUENCY, 1e-3);
unit_def!(CENTIHERTZ, "cHz", "centihertz", ["chz"], Dimension::FREQUENCY, 1e-2);
unit_def!(DECIHERTZ, "dHz", "decihertz", ["dhz"], Dimension::FREQUENCY, 1e-1);
unit_def!(HERTZ, "Hz", "hertz", ["hz"], Dimension::FREQUENCY, 1.0);
unit_def!(DECAHERTZ, "daHz", "decahertz", ["dahz"], Dimension::FREQUENCY, 1e1);
unit_def!(HECTOHERTZ, "hHz", "hectohertz", ["hhz"], Dimension::FREQUENCY, 1e2);
unit_def!(KILOHERTZ, "kHz", "kilohertz", ["khz"], Dimension::FREQUENCY, 1e3);
unit_def!(MEGAHERTZ, "MHz", "megahertz", [], Dimension::FREQUENCY, 1e6);
unit_def!(GIGAHERTZ, "GHz", "gigahertz", ["ghz"], Dimension::FREQUENCY, 1e9);
unit_def!(TERAHERTZ, "THz", "terahertz", ["thz"], Dimension::FREQUENCY, 1e12);
unit_def!(PETAHERTZ, "PHz", "petahertz", ["phz"], Dimension::FREQUENCY, 1e15);

// Length.
unit_def!(NANOMETER, "nm", "nanometer", ["nanometers"], Dimension::LENGTH, 1e-9);
unit_def!(MICROMETER, "um", "micrometer", ["micrometers"], Dimension::LENGTH, 1e-6);
unit_def!(MILLIMETER, "mm", "millimeter", ["millimeters"], Dimension::LENGTH, 1e-3);
unit_def!(CENTIMETER, "cm", "centimeter", ["centimeters"], Dimension::LENGTH, 1e-2);
unit_def!(DECIMETER, "dm", "decimeter", ["decimeters"], Dimension::LENGTH, 1e-1);
unit_def!(METER, "m", "meter", ["meters"], Dimension::LENGTH, 1.0);
unit_def!(KILOMETER, "km", "kilometer", ["kilometers"], Dimension::LENGTH, 1e3);

// Time.
unit_def!(SECOND, "s", "second", ["seconds"], Dimension::TIME, 1.0);
unit_def!(MINUTE, "min", "minute", ["minutes"], Dimension::TIME, 60.0);
unit_def!(HOUR, "h", "hour", ["hours"], Dimension::TIME, 3600.0);

// Temperature.
unit_def!(KELVIN, "K", "kelvin", ["kelvins"], Dimension::TEMPERATURE, 1.0);

// Energy and power.
unit_def!(JOULE, "J", "joule", ["joules"], Dimension::ENERGY, 1.0);
unit_def!(WATT, "W", "watt", ["watts"], Dimension::POWER, 1.0);

// Mass.
unit_def!(MICROGRAM, "ug", "microgram", ["micrograms"], Dimension::MASS, 1e-9);
unit_def!(MILLIGRAM, "mg", "milligram", ["milligrams"], Dimension::MASS, 1e-6);
unit_def!(GRAM, "g", "gram", ["grams"], Dimension::MASS, 1e-3);
unit_def!(KILOGRAM, "kg", "kilogram", ["kilograms"], Dimension::MASS, 1.0);

// Current.
unit_def!(AMPERE, "A", "ampere", ["amperes"], Dimension::CURRENT, 1.0);

// Angle.
unit_def!(RADIAN, "rad", "radian", ["radians"], Dimension::ANGLE, 1.0);
unit_def!(
    DEGREE,
    "deg",
    "degree",
    ["degrees"],
    Dimension::ANGLE,
    std::f64::consts::PI / 180.0
);

// Dimensionless.
unit_def!(DECIBEL, "dB", "decibel", [], Dimension::DIMENSIONLESS, 1.0);
unit_def!(LINEAR, "linear", "linear", [], Dimension::DIMENSIONLESS, 1.0);

/// All units known to the default catalog.
pub const BUILTIN_UNITS: &[UnitDef] = &[
    MILLIHERTZ, CENTIHERTZ, DECIHERTZ, HERTZ, DECAHERTZ, HECTOHERTZ, KILOHERTZ, MEGAHERTZ,
    GIGAHERTZ, TERAHERTZ, PETAHERTZ, NANOMETER, MICROMETER, MILLIMETER, CENTIMETER, DECIMETER,
    METER, KILOMETER, SECOND, MINUTE, HOUR, KELVIN, JOULE, WATT, MICROGRAM, MILLIGRAM, GRAM,
    KILOGRAM, AMPERE, RADIAN, DEGREE, DECIBEL, LINEAR,
];

lazy_static! {
    static ref CATALOG: UnitCatalog = UnitCatalog::default();
}

/// The process-wide catalog of built-in units. It is built on first use and
/// never mutated.
pub fn catalog() -> &'static UnitCatalog {
    &CATALOG
}

/// A table of units, searchable by symbol, name or alias.
#[derive(Clone, Debug)]
pub struct UnitCatalog {
    units: Vec<UnitDef>,
    lookup: HashMap<&'static str, usize>,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        let mut catalog = UnitCatalog::empty();
        for def in BUILTIN_UNITS {
            catalog.insert(*def);
        }
        catalog
    }
}

impl UnitCatalog {
    /// A catalog without any units.
    pub fn empty() -> UnitCatalog {
        UnitCatalog {
            units: vec![],
            lookup: HashMap::new(),
        }
    }

    /// Add a new unit. Fails if the symbol, name or any alias is already
    /// known.
    pub fn register(&mut self, def: UnitDef) -> Result<(), UnitError> {
        if let Some(taken) = spellings(&def).find(|s| self.lookup.contains_key(s)) {
            return Err(UnitError::AlreadyRegistered {
                symbol: taken.to_string(),
            });
        }
        self.insert(def);
        Ok(())
    }

    fn insert(&mut self, def: UnitDef) {
        let index = self.units.len();
        for spelling in spellings(&def) {
            self.lookup.insert(spelling, index);
        }
        self.units.push(def);
    }

    /// Look up a single unit token. Tokens are case sensitive.
    pub fn get(&self, token: &str) -> Option<&UnitDef> {
        self.lookup.get(token).map(|&i| &self.units[i])
    }

    /// All units in registration order.
    pub fn units(&self) -> &[UnitDef] {
        &self.units
    }

    /// All units of the given dimension.
    pub fn units_with_dimension(&self, dimension: Dimension) -> impl Iterator<Item = &UnitDef> {
        self.units.iter().filter(move |u| u.dimension == dimension)
    }

    /// The canonical symbols of all units, comma separated. Used in error
    /// messages.
    pub fn symbols(&self) -> String {
        self.units.iter().map(|u| u.symbol).join(", ")
    }

    /// Parse a whitespace-separated unit expression, e.g. "m / s" or
    /// "1 / cm". The operators `*`, `/`, `+`, `-` and `**` are applied
    /// strictly left to right. The single token "-" means "no unit".
    pub fn parse(&self, expr: &str) -> Result<Unit, UnitError> {
        parse_expression(self, expr)
    }

    /// The dimension of a unit; `None` for "no unit" or for expressions that
    /// can't be reduced to a product of units.
    pub fn dimension_of(&self, unit: &Unit) -> Option<Dimension> {
        unit.dimension()
    }

    /// Are two units commensurate? Units without a dimension never are.
    pub fn same_dimension(&self, a: &Unit, b: &Unit) -> bool {
        a.is_commensurate(b)
    }

    /// The multiplier taking a value in `unit` to the base units of its
    /// dimension.
    pub fn scale_factor(&self, unit: &Unit) -> f64 {
        unit.scale_factor()
    }
}

fn spellings(def: &UnitDef) -> impl Iterator<Item = &'static str> {
    let symbol = def.symbol;
    let name = def.name;
    let aliases = def.aliases;
    [symbol, name]
        .into_iter()
        .chain(aliases.iter().copied())
        .unique()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lookup_aliases() {
        let catalog = catalog();
        for token in ["GHz", "gigahertz", "ghz"] {
            assert_eq!(catalog.get(token), Some(&GIGAHERTZ), "{token}");
        }
        // Case matters.
        assert_eq!(catalog.get("mhz"), Some(&MILLIHERTZ));
        assert_eq!(catalog.get("MHz"), Some(&MEGAHERTZ));
        assert!(catalog.get("Ghz").is_none());
    }

    #[test]
    fn test_scale_factors() {
        let catalog = catalog();
        let khz = catalog.parse("kHz").unwrap();
        assert_abs_diff_eq!(catalog.scale_factor(&khz), 1000.0);
        let cm = catalog.parse("cm").unwrap();
        assert_abs_diff_eq!(catalog.scale_factor(&cm), 0.01);
        let mhz = catalog.parse("MHz").unwrap();
        assert_abs_diff_eq!(catalog.scale_factor(&mhz), 1e6);
    }

    #[test]
    fn test_same_dimension() {
        let catalog = catalog();
        let cm = catalog.parse("cm").unwrap();
        let km = catalog.parse("km").unwrap();
        let ghz = catalog.parse("GHz").unwrap();
        let per_second = catalog.parse("1 / s").unwrap();
        assert!(catalog.same_dimension(&cm, &km));
        assert!(!catalog.same_dimension(&cm, &ghz));
        assert!(catalog.same_dimension(&ghz, &per_second));
        assert_eq!(catalog.dimension_of(&ghz), Some(Dimension::FREQUENCY));

        let none = Unit::none();
        let odd = catalog.parse("m + s").unwrap();
        assert!(!catalog.same_dimension(&none, &none));
        assert!(!catalog.same_dimension(&none, &odd));
        assert!(!catalog.same_dimension(&odd, &odd));
    }

    #[test]
    fn test_units_with_dimension() {
        let lengths: Vec<_> = catalog()
            .units_with_dimension(Dimension::LENGTH)
            .map(|u| u.symbol)
            .collect();
        assert_eq!(lengths, ["nm", "um", "mm", "cm", "dm", "m", "km"]);
    }

    #[test]
    fn test_register() {
        let mut catalog = UnitCatalog::default();
        let furlong = UnitDef {
            symbol: "fur",
            name: "furlong",
            aliases: &["furlongs"],
            dimension: Dimension::LENGTH,
            scale: 201.168,
        };
        catalog.register(furlong).unwrap();
        let unit = catalog.parse("furlongs").unwrap();
        assert_eq!(unit.dimension(), Some(Dimension::LENGTH));
        assert!(crate::units::catalog().get("fur").is_none());

        let result = catalog.register(UnitDef {
            symbol: "m",
            ..furlong
        });
        assert!(matches!(result, Err(UnitError::AlreadyRegistered { .. })));
    }
}
