// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scattering geometry: incidence and viewing zenith angles, azimuth angles
//! and the Euler angles of particle orientation.
//!
//! All angles are stored in radians as the rows of a 7 x n array, in the
//! order iza, vza, raa, iaa, vaa, alpha, beta. The hot spot direction is
//! vza == iza with raa == 0.

use std::f64::consts::{PI, TAU};
use std::str::FromStr;

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use thiserror::Error;

use crate::{
    conversion::{deg, rad, sec, AngleUnit},
    math::align_all,
    quantity::IntoValues,
};

/// The number of angle rows.
pub const NUM_ANGLES: usize = 7;

const ANGLE_NAMES: [&str; NUM_ANGLES] = ["iza", "vza", "raa", "iaa", "vaa", "alpha", "beta"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AngleError {
    #[error("If raa is not defined, iaa and vaa must both be defined")]
    MissingAzimuth,

    #[error("raa, iaa and vaa are all defined. Either raa or iaa and vaa must be defined")]
    ConflictingAzimuth,

    #[error("Input dimensions must agree. The actual dimensions are {lengths}")]
    LengthMismatch { lengths: String },

    #[error("'{received}' is not a valid geometry. Valid geometries are: HB, HF, VB, VF")]
    UnknownGeometry { received: String },
}

/// Inputs to [`Angles::new`]. Either `raa` or both `iaa` and `vaa` must be
/// given.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleInputs {
    /// Incidence zenith angle.
    pub iza: Array1<f64>,
    /// Viewing zenith angle.
    pub vza: Array1<f64>,
    /// Relative azimuth angle.
    pub raa: Option<Array1<f64>>,
    /// Incidence azimuth angle.
    pub iaa: Option<Array1<f64>>,
    /// Viewing azimuth angle.
    pub vaa: Option<Array1<f64>>,
    /// Euler angle alpha of the particle orientation.
    pub alpha: Array1<f64>,
    /// Euler angle beta of the particle orientation.
    pub beta: Array1<f64>,
    /// Append a nadir sample so that kernels can be normalised to vanish at
    /// nadir.
    pub normalize: bool,
    /// The incidence zenith angle of the nadir sample, in `angle_unit`.
    pub nbar: f64,
    pub angle_unit: AngleUnit,
    /// Extend all inputs to a common length by repeating their last element.
    /// When false, inputs of different lengths are an error.
    pub align: bool,
}

impl Default for AngleInputs {
    fn default() -> Self {
        AngleInputs {
            iza: array![0.0],
            vza: array![0.0],
            raa: None,
            iaa: None,
            vaa: None,
            alpha: array![0.0],
            beta: array![0.0],
            normalize: false,
            nbar: 0.0,
            angle_unit: AngleUnit::Degrees,
            align: true,
        }
    }
}

impl AngleInputs {
    /// Inputs with a relative azimuth angle, in degrees.
    pub fn with_raa<A: IntoValues, B: IntoValues, C: IntoValues>(
        iza: A,
        vza: B,
        raa: C,
    ) -> AngleInputs {
        AngleInputs {
            iza: iza.into_values(),
            vza: vza.into_values(),
            raa: Some(raa.into_values()),
            ..Default::default()
        }
    }

    /// Inputs with incidence and viewing azimuth angles, in degrees.
    pub fn with_azimuths<A: IntoValues, B: IntoValues, C: IntoValues, D: IntoValues>(
        iza: A,
        vza: B,
        iaa: C,
        vaa: D,
    ) -> AngleInputs {
        AngleInputs {
            iza: iza.into_values(),
            vza: vza.into_values(),
            iaa: Some(iaa.into_values()),
            vaa: Some(vaa.into_values()),
            ..Default::default()
        }
    }
}

/// Typical acquisition geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandardGeometry {
    /// Horizontal backscattering.
    HB,
    /// Horizontal forward scattering.
    HF,
    /// Vertical backscattering.
    VB,
    /// Vertical forward scattering.
    VF,
}

impl StandardGeometry {
    /// (iza, vza, iaa, vaa, alpha, beta) in degrees.
    pub fn values(self) -> [f64; 6] {
        match self {
            StandardGeometry::HB => [90.0, 90.0, 0.0, 180.0, 0.0, 0.0],
            StandardGeometry::HF => [90.0, 90.0, 0.0, 0.0, 0.0, 0.0],
            StandardGeometry::VB => [0.0, 180.0, 0.0, 0.0, 0.0, 0.0],
            StandardGeometry::VF => [180.0, 180.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    /// [`AngleInputs`] describing this geometry.
    pub fn inputs(self) -> AngleInputs {
        let [iza, vza, iaa, vaa, alpha, beta] = self.values();
        AngleInputs {
            alpha: array![alpha],
            beta: array![beta],
            ..AngleInputs::with_azimuths(iza, vza, iaa, vaa)
        }
    }
}

impl FromStr for StandardGeometry {
    type Err = AngleError;

    fn from_str(s: &str) -> Result<StandardGeometry, AngleError> {
        match s {
            "HB" => Ok(StandardGeometry::HB),
            "HF" => Ok(StandardGeometry::HF),
            "VB" => Ok(StandardGeometry::VB),
            "VF" => Ok(StandardGeometry::VF),
            _ => Err(AngleError::UnknownGeometry {
                received: s.to_string(),
            }),
        }
    }
}

/// A set of scattering geometries.
#[derive(Clone, Debug, PartialEq)]
pub struct Angles {
    /// iza, vza, raa, iaa, vaa, alpha, beta in radians, one column per
    /// geometry. With `normalize`, the last column is the nadir sample.
    array: Array2<f64>,
    nbar: f64,
    normalize: bool,
}

impl Angles {
    /// Make a new [`Angles`].
    ///
    /// If `raa` is not given it is `iaa - vaa`. If it is given, `iaa` and
    /// `vaa` are zero. Negative zenith angles are made positive and π is
    /// added to the azimuth angles of that geometry once per negative
    /// zenith, so two negative zeniths add 2π.
    ///
    /// ```
    /// # use remsens::angles::{AngleInputs, Angles};
    /// let angles = Angles::new(AngleInputs::with_raa([30.0, 40.0], -20.0, 0.0))?;
    /// assert_eq!(angles.len(), 2);
    /// assert!((angles.vza_deg()[1] - 20.0).abs() < 1e-12);
    /// assert!((angles.raa_deg()[1] - 180.0).abs() < 1e-12);
    /// # Ok::<(), remsens::angles::AngleError>(())
    /// ```
    pub fn new(inputs: AngleInputs) -> Result<Angles, AngleError> {
        let AngleInputs {
            iza,
            vza,
            raa,
            iaa,
            vaa,
            alpha,
            beta,
            normalize,
            nbar,
            angle_unit,
            align,
        } = inputs;

        let (raa, iaa, vaa) = match (raa, iaa, vaa) {
            (Some(_), Some(_), Some(_)) => return Err(AngleError::ConflictingAzimuth),
            (None, Some(iaa), Some(vaa)) => {
                // Unaligned lengths are checked with the other rows below.
                let aligned = align_all(&[iaa.view(), vaa.view()]);
                (&aligned[0] - &aligned[1], iaa, vaa)
            }
            (None, _, _) => return Err(AngleError::MissingAzimuth),
            (Some(raa), _, _) => {
                let zeros = Array1::zeros(raa.len());
                (raa, zeros.clone(), zeros)
            }
        };

        let inputs = [
            iza.view(),
            vza.view(),
            raa.view(),
            iaa.view(),
            vaa.view(),
            alpha.view(),
            beta.view(),
        ];
        let rows = if align {
            align_all(&inputs)
        } else {
            inputs.iter().map(|a| a.to_owned()).collect()
        };
        if !rows.iter().map(|r| r.len()).all_equal() || rows[0].is_empty() {
            let lengths = ANGLE_NAMES
                .iter()
                .zip(rows.iter())
                .map(|(name, row)| format!("{name}: {}", row.len()))
                .join(", ");
            return Err(AngleError::LengthMismatch { lengths });
        }

        let n = rows[0].len();
        let mut array =
            Array2::from_shape_fn((NUM_ANGLES, n), |(r, c)| angle_unit.to_radians(rows[r][c]));

        for c in 0..n {
            for r in 0..2 {
                if array[[r, c]] < 0.0 {
                    debug!(
                        "Negative {} in geometry {c}; adding π to the azimuth angles",
                        ANGLE_NAMES[r]
                    );
                    array[[r, c]] = -array[[r, c]];
                    for a in 2..5 {
                        array[[a, c]] += PI;
                    }
                }
            }
        }

        let mut angles = Angles {
            array,
            nbar: angle_unit.to_radians(nbar),
            normalize: false,
        };
        angles.set_normalize(normalize);
        Ok(angles)
    }

    /// Make a new [`Angles`] from a [`StandardGeometry`].
    pub fn standard(geometry: StandardGeometry) -> Result<Angles, AngleError> {
        Angles::new(geometry.inputs())
    }

    /// The number of geometries, including the nadir sample.
    pub fn len(&self) -> usize {
        self.array.len_of(Axis(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All angles in radians, one row per angle.
    pub fn array(&self) -> ArrayView2<f64> {
        self.array.view()
    }

    /// All angles in degrees, one row per angle.
    pub fn array_deg(&self) -> Array2<f64> {
        self.array.mapv(deg)
    }

    fn row(&self, index: usize) -> ArrayView1<f64> {
        self.array.row(index)
    }

    fn row_deg(&self, index: usize) -> Array1<f64> {
        self.array.row(index).mapv(deg)
    }

    /// Incidence zenith angle in radians.
    pub fn iza(&self) -> ArrayView1<f64> {
        self.row(0)
    }

    pub fn iza_deg(&self) -> Array1<f64> {
        self.row_deg(0)
    }

    /// Viewing zenith angle in radians.
    pub fn vza(&self) -> ArrayView1<f64> {
        self.row(1)
    }

    pub fn vza_deg(&self) -> Array1<f64> {
        self.row_deg(1)
    }

    /// Relative azimuth angle in radians.
    pub fn raa(&self) -> ArrayView1<f64> {
        self.row(2)
    }

    pub fn raa_deg(&self) -> Array1<f64> {
        self.row_deg(2)
    }

    /// Incidence azimuth angle in radians. Zero when built from `raa`.
    pub fn iaa(&self) -> ArrayView1<f64> {
        self.row(3)
    }

    pub fn iaa_deg(&self) -> Array1<f64> {
        self.row_deg(3)
    }

    /// Viewing azimuth angle in radians. Zero when built from `raa`.
    pub fn vaa(&self) -> ArrayView1<f64> {
        self.row(4)
    }

    pub fn vaa_deg(&self) -> Array1<f64> {
        self.row_deg(4)
    }

    pub fn alpha(&self) -> ArrayView1<f64> {
        self.row(5)
    }

    pub fn alpha_deg(&self) -> Array1<f64> {
        self.row_deg(5)
    }

    pub fn beta(&self) -> ArrayView1<f64> {
        self.row(6)
    }

    pub fn beta_deg(&self) -> Array1<f64> {
        self.row_deg(6)
    }

    /// sec(iza) + sec(vza).
    pub fn b(&self) -> Array1<f64> {
        self.iza().mapv(sec) + self.vza().mapv(sec)
    }

    /// Cosine of the incidence zenith angle.
    pub fn mui(&self) -> Array1<f64> {
        self.iza().mapv(f64::cos)
    }

    /// Cosine of the viewing zenith angle.
    pub fn muv(&self) -> Array1<f64> {
        self.vza().mapv(f64::cos)
    }

    /// Relative azimuth angle wrapped into [0, 2π).
    pub fn phi(&self) -> Array1<f64> {
        self.raa().mapv(|a| a.rem_euclid(TAU))
    }

    /// One (iza, vza, raa, iaa, vaa, alpha, beta) tuple per geometry, in
    /// radians.
    pub fn geometries(&self) -> Vec<[f64; NUM_ANGLES]> {
        self.array
            .columns()
            .into_iter()
            .map(|c| std::array::from_fn(|i| c[i]))
            .collect()
    }

    /// Like [`Angles::geometries`], in degrees.
    pub fn geometries_deg(&self) -> Vec<[f64; NUM_ANGLES]> {
        self.geometries()
            .into_iter()
            .map(|g| g.map(deg))
            .collect()
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Append or remove the nadir sample.
    pub fn set_normalize(&mut self, normalize: bool) {
        match (self.normalize, normalize) {
            (false, true) => {
                let n = self.len();
                let nbar = self.nbar;
                let array = &self.array;
                self.array = Array2::from_shape_fn((NUM_ANGLES, n + 1), |(r, c)| match (r, c) {
                    (_, c) if c < n => array[[r, c]],
                    (0, _) => nbar,
                    _ => 0.0,
                });
            }
            (true, false) => {
                let n = self.len();
                self.array = self.array.slice(s![.., ..n - 1]).to_owned();
            }
            _ => (),
        }
        self.normalize = normalize;
    }

    /// The incidence zenith angle of the nadir sample, in radians.
    pub fn nbar(&self) -> f64 {
        self.nbar
    }

    pub fn nbar_deg(&self) -> f64 {
        deg(self.nbar)
    }

    /// Set the incidence zenith angle of the nadir sample, in radians.
    pub fn set_nbar(&mut self, nbar: f64) {
        self.nbar = nbar;
        if self.normalize {
            let last = self.len() - 1;
            self.array[[0, last]] = nbar;
        }
    }

    /// Set the incidence zenith angle of the nadir sample, in degrees.
    pub fn set_nbar_deg(&mut self, nbar: f64) {
        self.set_nbar(rad(nbar));
    }

    /// Bring the angles and the given arrays to a common length by repeating
    /// the last element of the shorter ones. Returns the aligned arrays.
    pub fn align_with(&mut self, values: &[ArrayView1<f64>]) -> Vec<Array1<f64>> {
        let normalize = self.normalize;
        self.set_normalize(false);
        let mut all: Vec<ArrayView1<f64>> = values.iter().map(|v| v.view()).collect();
        all.extend(self.array.rows());
        let mut aligned = align_all(&all);
        let rows = aligned.split_off(values.len());
        let n = rows.first().map_or(0, |r| r.len());
        self.array = Array2::from_shape_fn((NUM_ANGLES, n), |(r, c)| rows[r][c]);
        self.set_normalize(normalize);
        aligned
    }

    /// Columns that are real geometries, i.e. without the nadir sample.
    fn observed(&self) -> ArrayView2<f64> {
        if self.normalize {
            self.array.slice(s![.., ..self.len() - 1])
        } else {
            self.array.view()
        }
    }
}

impl std::fmt::Display for Angles {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let observed = self.observed();
        let labels = [
            "incidence zenith angle",
            "viewing zenith angle",
            "relative azimuth angle",
            "incidence azimuth angle",
            "viewing azimuth angle",
            "alpha angle",
            "beta angle",
        ];
        writeln!(f, "{:<40} : Angles", "Class")?;
        for (label, row) in labels.iter().zip(observed.rows()) {
            let mean = row.mean().unwrap_or(f64::NAN);
            writeln!(
                f,
                "{:<40} : {}, {}",
                format!("Mean {label} [RAD, DEG]"),
                mean,
                deg(mean)
            )?;
        }
        let b = observed.row(0).mapv(sec) + observed.row(1).mapv(sec);
        write!(
            f,
            "{:<40} : {}",
            "Mean B",
            b.mean().unwrap_or(f64::NAN)
        )
    }
}
