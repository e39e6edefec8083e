// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A sensor: scattering geometry observed at one or more frequencies.
//!
//! Building a [`Sensor`] aligns its [`Angles`] and [`EmWave`], so geometry
//! `i` is always observed at frequency `i`.

use log::debug;
use ndarray::Array1;
use thiserror::Error;

use crate::{
    angles::{AngleError, AngleInputs, Angles},
    em::{EmError, EmWave},
    quantity::{IntoValues, ToUnit},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error(transparent)]
    Angle(#[from] AngleError),

    #[error(transparent)]
    Em(#[from] EmError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sensor {
    angles: Angles,
    wave: EmWave,
    name: Option<String>,
}

impl Sensor {
    /// Make a new [`Sensor`] from angle inputs and a frequency or wavelength
    /// in `unit`, converted to `output`.
    ///
    /// ```
    /// # use remsens::{angles::AngleInputs, sensor::Sensor};
    /// let sensor = Sensor::new(AngleInputs::with_raa([30.0, 40.0], 20.0, 0.0), 1.26, "GHz", "cm")?;
    /// assert_eq!(sensor.len(), 2);
    /// assert_eq!(sensor.wave().frequency().value().len(), 2);
    /// # Ok::<(), remsens::sensor::SensorError>(())
    /// ```
    pub fn new<V: IntoValues, U: ToUnit, O: ToUnit>(
        angles: AngleInputs,
        input: V,
        unit: U,
        output: O,
    ) -> Result<Sensor, SensorError> {
        let angles = Angles::new(angles)?;
        let wave = EmWave::new(input, unit, output)?;
        Sensor::from_parts(angles, wave)
    }

    /// Make a new [`Sensor`] from existing angles and a wave. The shorter of
    /// the two is extended by repeating its last element.
    pub fn from_parts(mut angles: Angles, mut wave: EmWave) -> Result<Sensor, SensorError> {
        let aligned = angles.align_with(&[wave.frequency().value().view()]);
        let n = aligned.first().map_or(0, |a| a.len());
        if n != wave.len() {
            debug!("Extending {} frequencies to {n} geometries", wave.len());
            wave.align_with(&[Array1::<f64>::zeros(n).view()])?;
        }
        Ok(Sensor {
            angles,
            wave,
            name: None,
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Sensor {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn angles(&self) -> &Angles {
        &self.angles
    }

    pub fn angles_mut(&mut self) -> &mut Angles {
        &mut self.angles
    }

    pub fn wave(&self) -> &EmWave {
        &self.wave
    }

    /// The number of observed geometries. A nadir sample added for
    /// normalisation is not counted.
    pub fn len(&self) -> usize {
        self.wave.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wave.is_empty()
    }

    pub fn into_parts(self) -> (Angles, EmWave) {
        (self.angles, self.wave)
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "{:<40} : {name}", "Sensor")?;
        }
        writeln!(f, "{}", self.angles)?;
        write!(f, "{}", self.wave)
    }
}
