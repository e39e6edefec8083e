// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Electromagnetic waves: frequency, wavelength and wavenumber.
//!
//! Frequency and wavelength are related through the speed of light,
//! `wavelength = c / frequency`. The free-space wavenumber is
//! `2π / wavelength`.

mod bands;

pub use bands::*;

use std::f64::consts::TAU;

use itertools::Itertools;
use log::trace;
use ndarray::prelude::*;
use thiserror::Error;

use crate::{
    constants::SPEED_OF_LIGHT,
    math::align_all,
    quantity::{IntoValues, QuantityError, ToUnit},
    units::{dimension_str, Dimension, Unit, UnitError, METER, RADIAN, SECOND},
    Quantity,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    #[error("The unit [{unit}] ({dimension}) must have a dimension of frequency or length")]
    NotSpectral { unit: String, dimension: String },

    #[error("Expected a unit of {expected}, got [{unit}] ({received})")]
    Unexpected {
        expected: &'static str,
        unit: String,
        received: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error("'{received}' is not a valid band. Valid bands are: {valid}")]
    UnknownBand { received: String, valid: String },

    #[error("'{received}' is not a valid region. Valid regions are: {valid}")]
    UnknownRegion { received: String, valid: String },
}

fn expect_dimension(
    unit: &Unit,
    dimension: Dimension,
    expected: &'static str,
) -> Result<(), DimensionError> {
    if unit.dimension() == Some(dimension) {
        Ok(())
    } else {
        Err(DimensionError::Unexpected {
            expected,
            unit: unit.to_string(),
            received: dimension_str(unit.dimension()),
        })
    }
}

/// Wavelengths of a frequency quantity, in `output`.
fn wavelength_of(frequency: &Quantity, output: &Unit) -> Result<Quantity, EmError> {
    expect_dimension(frequency.unit(), Dimension::FREQUENCY, "frequency")?;
    expect_dimension(output, Dimension::LENGTH, "length")?;
    let per_second = frequency.convert_to(Unit::from(SECOND).inverse()?)?;
    let wavelength = (&*SPEED_OF_LIGHT / &per_second)?;
    Ok(wavelength.convert_to(output)?)
}

/// Frequencies of a wavelength quantity, in `output`.
fn frequency_of(wavelength: &Quantity, output: &Unit) -> Result<Quantity, EmError> {
    expect_dimension(wavelength.unit(), Dimension::LENGTH, "length")?;
    expect_dimension(output, Dimension::FREQUENCY, "frequency")?;
    let meters = wavelength.convert_to(METER)?;
    let frequency = (&*SPEED_OF_LIGHT / &meters)?;
    Ok(frequency.convert_to(output)?)
}

/// Free-space wavenumbers of a wavelength quantity.
fn wavenumber_of(wavelength: &Quantity) -> Result<Quantity, EmError> {
    Ok((TAU / wavelength)?)
}

/// Express a frequency or wavelength quantity in `output`, which may be of
/// the other spectral dimension.
pub(crate) fn spectral_convert(value: &Quantity, output: &Unit) -> Result<Quantity, EmError> {
    if value.unit().is_commensurate(output) {
        return Ok(value.convert_to(output)?);
    }
    match value.dimension() {
        Some(Dimension::FREQUENCY) => wavelength_of(value, output),
        Some(Dimension::LENGTH) => frequency_of(value, output),
        dim => Err(DimensionError::NotSpectral {
            unit: value.unit_str(),
            dimension: dimension_str(dim),
        }
        .into()),
    }
}

/// Wavelengths of frequencies given in `unit`, expressed in `output`.
///
/// ```
/// # use remsens::em::compute_wavelength;
/// let wavelength = compute_wavelength(1.0, "GHz", "cm")?;
/// assert!((wavelength.value()[0] - 29.9792458).abs() < 1e-9);
/// # Ok::<(), remsens::em::EmError>(())
/// ```
pub fn compute_wavelength<V: IntoValues, U: ToUnit, O: ToUnit>(
    frequency: V,
    unit: U,
    output: O,
) -> Result<Quantity, EmError> {
    let frequency = Quantity::new(frequency, unit)?;
    let output = output.to_unit()?;
    trace!("Computing wavelengths in [{output}] from [{}]", frequency.unit());
    wavelength_of(&frequency, &output)
}

/// Frequencies of wavelengths given in `unit`, expressed in `output`.
pub fn compute_frequency<V: IntoValues, U: ToUnit, O: ToUnit>(
    wavelength: V,
    unit: U,
    output: O,
) -> Result<Quantity, EmError> {
    let wavelength = Quantity::new(wavelength, unit)?;
    let output = output.to_unit()?;
    trace!("Computing frequencies in [{output}] from [{}]", wavelength.unit());
    frequency_of(&wavelength, &output)
}

/// Free-space wavenumbers of frequencies given in `unit`. `output` is the
/// length unit of the intermediate wavelength, so the result is in
/// `1 / output`.
pub fn compute_wavenumber<V: IntoValues, U: ToUnit, O: ToUnit>(
    frequency: V,
    unit: U,
    output: O,
) -> Result<Quantity, EmError> {
    let wavelength = compute_wavelength(frequency, unit, output)?;
    wavenumber_of(&wavelength)
}

/// Rescale frequencies from `unit` to `output`. Both must be frequency
/// units.
pub fn convert_frequency<V: IntoValues, U: ToUnit, O: ToUnit>(
    frequency: V,
    unit: U,
    output: O,
) -> Result<Quantity, EmError> {
    let frequency = Quantity::new(frequency, unit)?;
    let output = output.to_unit()?;
    expect_dimension(frequency.unit(), Dimension::FREQUENCY, "frequency")?;
    expect_dimension(&output, Dimension::FREQUENCY, "frequency")?;
    Ok(frequency.convert_to(output)?)
}

/// Rescale wavelengths from `unit` to `output`. Both must be length units.
pub fn convert_wavelength<V: IntoValues, U: ToUnit, O: ToUnit>(
    wavelength: V,
    unit: U,
    output: O,
) -> Result<Quantity, EmError> {
    let wavelength = Quantity::new(wavelength, unit)?;
    let output = output.to_unit()?;
    expect_dimension(wavelength.unit(), Dimension::LENGTH, "length")?;
    expect_dimension(&output, Dimension::LENGTH, "length")?;
    Ok(wavelength.convert_to(output)?)
}

/// A transverse wave in free space, described by its frequency, wavelength
/// and wavenumber, with the band and region of each element.
#[derive(Clone, Debug, PartialEq)]
pub struct EmWave {
    frequency: Quantity,
    wavelength: Quantity,
    wavenumber: Quantity,
    band: Vec<Option<Band>>,
    region: Vec<Option<Region>>,
}

impl EmWave {
    /// Make a new [`EmWave`]. `input` is in `unit`, which is either a
    /// frequency unit (then `output` must be a length unit) or a length unit
    /// (then `output` must be a frequency unit).
    ///
    /// ```
    /// # use remsens::em::{Band, EmWave};
    /// let wave = EmWave::new([1.26, 10.0], "GHz", "cm")?;
    /// assert_eq!(wave.band(), &[Some(Band::L), Some(Band::X)]);
    /// # Ok::<(), remsens::em::EmError>(())
    /// ```
    pub fn new<V: IntoValues, U: ToUnit, O: ToUnit>(
        input: V,
        unit: U,
        output: O,
    ) -> Result<EmWave, EmError> {
        EmWave::from_quantity(&Quantity::new(input, unit)?, output)
    }

    /// Make a new [`EmWave`] from a frequency or wavelength [`Quantity`].
    pub fn from_quantity<O: ToUnit>(input: &Quantity, output: O) -> Result<EmWave, EmError> {
        let output = output.to_unit()?;
        let (frequency, wavelength) = match (input.dimension(), output.dimension()) {
            (Some(Dimension::FREQUENCY), Some(Dimension::LENGTH)) => {
                let wavelength = wavelength_of(input, &output)?;
                (input.clone(), wavelength)
            }
            (Some(Dimension::LENGTH), Some(Dimension::FREQUENCY)) => {
                let frequency = frequency_of(input, &output)?;
                (frequency, input.clone())
            }
            (Some(Dimension::FREQUENCY), _) => {
                return Err(DimensionError::Unexpected {
                    expected: "length",
                    unit: output.to_string(),
                    received: dimension_str(output.dimension()),
                }
                .into())
            }
            (Some(Dimension::LENGTH), _) => {
                return Err(DimensionError::Unexpected {
                    expected: "frequency",
                    unit: output.to_string(),
                    received: dimension_str(output.dimension()),
                }
                .into())
            }
            (dim, _) => {
                return Err(DimensionError::NotSpectral {
                    unit: input.unit_str(),
                    dimension: dimension_str(dim),
                }
                .into())
            }
        };
        EmWave::from_parts(frequency, wavelength)
    }

    fn from_parts(frequency: Quantity, wavelength: Quantity) -> Result<EmWave, EmError> {
        let wavenumber = wavenumber_of(&wavelength)?;
        let mut band = Vec::with_capacity(frequency.len());
        let mut region = Vec::with_capacity(frequency.len());
        for &f in frequency.value() {
            band.push(which_band(f, frequency.unit())?);
            region.push(which_region(f, frequency.unit())?);
        }
        Ok(EmWave {
            frequency: frequency.with_name("Frequency"),
            wavelength: wavelength.with_name("Wavelength"),
            wavenumber: wavenumber.with_name("Wavenumber in free space"),
            band,
            region,
        })
    }

    pub fn frequency(&self) -> &Quantity {
        &self.frequency
    }

    pub fn wavelength(&self) -> &Quantity {
        &self.wavelength
    }

    pub fn wavenumber(&self) -> &Quantity {
        &self.wavenumber
    }

    /// The band of each element.
    pub fn band(&self) -> &[Option<Band>] {
        &self.band
    }

    /// The region of each element.
    pub fn region(&self) -> &[Option<Region>] {
        &self.region
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// The propagation speed (wavelength times frequency) in m / s.
    pub fn speed(&self) -> Result<Quantity, EmError> {
        let per_second = self.frequency.convert_to(Unit::from(SECOND).inverse()?)?;
        let meters = self.wavelength.convert_to(METER)?;
        let speed = (&meters * &per_second)?;
        Ok(speed.with_name("Speed"))
    }

    /// The angular speed (2π times frequency) in rad / s.
    pub fn angular_speed(&self) -> Result<Quantity, EmError> {
        let per_second = self.frequency.convert_to(Unit::from(SECOND).inverse()?)?;
        let two_pi = Quantity::new(TAU, RADIAN)?;
        let speed = (&two_pi * &per_second)?;
        Ok(speed.with_name("Angular speed"))
    }

    /// Bring this wave and the given arrays to a common length by repeating
    /// the last element of the shorter ones. Returns the aligned arrays.
    pub fn align_with(&mut self, values: &[ArrayView1<f64>]) -> Result<Vec<Array1<f64>>, EmError> {
        let mut all: Vec<ArrayView1<f64>> = values.iter().map(|v| v.view()).collect();
        all.push(self.frequency.value().view());
        all.push(self.wavelength.value().view());
        let mut aligned = align_all(&all);
        let wavelength = aligned.pop().unwrap_or_default();
        let frequency = aligned.pop().unwrap_or_default();
        let wave = EmWave::from_parts(
            Quantity::from_parts(frequency, self.frequency.unit().clone()),
            Quantity::from_parts(wavelength, self.wavelength.unit().clone()),
        )?;
        *self = wave;
        Ok(aligned)
    }
}

fn describe(
    f: &mut std::fmt::Formatter,
    quantity: &Quantity,
    band: &[Option<Band>],
    region: &[Option<Region>],
) -> std::fmt::Result {
    let regions = region
        .iter()
        .map(|r| r.map_or("-", Region::name))
        .join(", ");
    let bands = band.iter().map(|b| b.map_or("-", Band::name)).join(", ");
    writeln!(
        f,
        "[{}] {} in region [{regions}] ([{bands}]-Band) in [{}]",
        quantity.value().iter().join(", "),
        quantity.name().unwrap_or_default(),
        quantity.unit_str()
    )
}

impl std::fmt::Display for EmWave {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        describe(f, &self.frequency, &self.band, &self.region)?;
        describe(f, &self.wavelength, &self.band, &self.region)?;
        write!(f, "{}", self.wavenumber)
    }
}

/// Band and region of each element of a frequency or wavelength quantity.
pub fn classify(value: &Quantity) -> Result<Vec<(Option<Band>, Option<Region>)>, EmError> {
    let unit = value.unit();
    value
        .value()
        .iter()
        .map(|&v| Ok((which_band(v, unit)?, which_region(v, unit)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VEL_C;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_compute_wavelength() {
        let w = compute_wavelength([1.0, 10.0], "GHz", "cm").unwrap();
        assert_abs_diff_eq!(w.value(), &array![29.9792458, 2.99792458], epsilon = 1e-9);
        assert_eq!(w.unit_str(), "cm");
        assert_eq!(w.dimension(), Some(Dimension::LENGTH));
        assert_eq!(w.name(), None);

        let w = compute_wavelength(VEL_C, "Hz", "m").unwrap();
        assert_abs_diff_eq!(w.value()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_frequency() {
        let f = compute_frequency(21.0, "cm", "MHz").unwrap();
        assert_abs_diff_eq!(f.value()[0], 1427.5831333, epsilon = 1e-6);
        assert_eq!(f.unit_str(), "MHz");
    }

    #[test]
    fn test_round_trip() {
        for (unit, output) in [("GHz", "cm"), ("MHz", "m"), ("THz", "nm"), ("Hz", "km")] {
            let f = array![0.5, 1.26, 10.0, 300.0];
            let w = compute_wavelength(f.clone(), unit, output).unwrap();
            let back = compute_frequency(w.value().clone(), output, unit).unwrap();
            assert_relative_eq!(back.value(), &f, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_compute_wavenumber() {
        let k = compute_wavenumber(1.0, "GHz", "cm").unwrap();
        assert_abs_diff_eq!(k.value()[0], TAU / 29.9792458, epsilon = 1e-12);
        assert_eq!(k.unit_str(), "1 / cm");
    }

    #[test]
    fn test_wrong_dimensions() {
        let result = compute_wavelength(1.0, "cm", "cm");
        assert!(
            matches!(
                result,
                Err(EmError::Dimension(DimensionError::Unexpected {
                    expected: "frequency",
                    ..
                }))
            ),
            "Expected Unexpected, got {result:?}"
        );
        assert!(compute_frequency(1.0, "cm", "m").is_err());
        assert!(convert_frequency(1.0, "GHz", "cm").is_err());
        assert!(convert_wavelength(1.0, "GHz", "cm").is_err());
    }

    #[test]
    fn test_convert() {
        let f = convert_frequency([1.0, 2.5], "GHz", "MHz").unwrap();
        assert_abs_diff_eq!(f.value(), &array![1000.0, 2500.0], epsilon = 1e-9);
        let w = convert_wavelength(3.0, "cm", "mm").unwrap();
        assert_abs_diff_eq!(w.value()[0], 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_em_wave_from_frequency() {
        let wave = EmWave::new([1.26, 10.0], "GHz", "cm").unwrap();
        assert_eq!(wave.len(), 2);
        assert_eq!(wave.frequency().unit_str(), "GHz");
        assert_eq!(wave.wavelength().unit_str(), "cm");
        assert_eq!(wave.wavenumber().unit_str(), "1 / cm");
        assert_eq!(wave.band(), &[Some(Band::L), Some(Band::X)]);
        assert_eq!(
            wave.region(),
            &[Some(Region::Microwave), Some(Region::Microwave)]
        );
        assert_eq!(wave.frequency().name(), Some("Frequency"));
    }

    #[test]
    fn test_em_wave_from_wavelength() {
        let wave = EmWave::new(500.0, "nm", "THz").unwrap();
        assert_abs_diff_eq!(wave.frequency().value()[0], 599.584916, epsilon = 1e-6);
        assert_eq!(wave.band(), &[Some(Band::Vis)]);
        assert_eq!(wave.region(), &[Some(Region::Optic)]);

        assert!(EmWave::new(1.0, "GHz", "MHz").is_err());
        assert!(EmWave::new(1.0, "K", "cm").is_err());
    }

    #[test]
    fn test_speeds() {
        let wave = EmWave::new([1.0, 5.4], "GHz", "cm").unwrap();
        let speed = wave.speed().unwrap();
        assert_eq!(speed.dimension(), Some(Dimension::VELOCITY));
        assert_relative_eq!(speed.value(), &array![VEL_C, VEL_C], max_relative = 1e-12);

        let omega = wave.angular_speed().unwrap();
        assert_eq!(omega.unit_str(), "rad / s");
        assert_abs_diff_eq!(omega.value()[0], TAU * 1e9, epsilon = 1e-3);
    }

    #[test]
    fn test_align_with() {
        let mut wave = EmWave::new(1.26, "GHz", "cm").unwrap();
        let other = array![1.0, 2.0, 3.0];
        let aligned = wave.align_with(&[other.view()]).unwrap();
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0], other);
        assert_eq!(wave.len(), 3);
        assert_eq!(wave.frequency().value(), &array![1.26, 1.26, 1.26]);
        assert_eq!(wave.band(), &[Some(Band::L); 3]);
    }

    #[test]
    fn test_classify() {
        let q = Quantity::new([1.26, 500.0], "GHz").unwrap();
        let classes = classify(&q).unwrap();
        assert_eq!(classes[0], (Some(Band::L), Some(Region::Microwave)));
        assert_eq!(classes[1], (None, Some(Region::Thf)));
    }

    #[test]
    fn test_display() {
        let wave = EmWave::new(1.26, "GHz", "cm").unwrap();
        let s = wave.to_string();
        assert!(
            s.starts_with("[1.26] Frequency in region [MICROWAVE] ([L]-Band) in [GHz]"),
            "{s}"
        );
        assert!(s.contains("Wavenumber in free space in [1 / cm]"), "{s}");
    }
}
