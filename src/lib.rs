// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core code for remote sensing: unit-aware quantities, electromagnetic wave
//! conversions, spectral bands, radiometric conversions, scattering geometry
//! and sensors that pair the two.

pub mod angles;
pub mod constants;
pub mod conversion;
pub mod em;
pub mod math;
pub mod quantity;
pub mod sensor;
pub mod units;

// Re-exports.
pub use angles::{AngleInputs, Angles, StandardGeometry};
pub use conversion::{AngleUnit, Radiometry, ValueUnit};
pub use em::{Band, EmWave, Region};
pub use quantity::{Quantity, QuantityError};
pub use sensor::Sensor;
pub use units::{Dimension, Unit, UnitCatalog, UnitDef, UnitError};

pub use ndarray;
