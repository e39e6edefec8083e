// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spectral bands and regions of the electromagnetic spectrum.

use std::str::FromStr;

use itertools::Itertools;
use log::{trace, warn};
use ndarray::Array1;

use super::{spectral_convert, DimensionError, EmError};
use crate::{
    quantity::ToUnit,
    units::{
        Dimension, Unit, UnitDef, GIGAHERTZ, HERTZ, KILOHERTZ, MEGAHERTZ, NANOMETER, TERAHERTZ,
    },
    Quantity,
};

/// A named spectral band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Band {
    Gamma,
    Xray,
    Uv,
    Vis,
    Nir,
    Swir,
    Mwir,
    Lwir,
    L,
    S,
    C,
    X,
    Ku,
    K,
    Ka,
    V,
    W,
    D,
    Elf,
    Slf,
    Ulf,
    Vlf,
    Lf,
    Mf,
    Hf,
    Vhf,
}

/// A named region of the spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    Gamma,
    Xray,
    Uv,
    Optic,
    Tir,
    Microwave,
    Radio,
    Uhf,
    Ehf,
    Thf,
}

impl Band {
    /// All bands, in lookup order.
    pub const ALL: [Band; 26] = [
        Band::Gamma,
        Band::Xray,
        Band::Uv,
        Band::Vis,
        Band::Nir,
        Band::Swir,
        Band::Mwir,
        Band::Lwir,
        Band::L,
        Band::S,
        Band::C,
        Band::X,
        Band::Ku,
        Band::K,
        Band::Ka,
        Band::V,
        Band::W,
        Band::D,
        Band::Elf,
        Band::Slf,
        Band::Ulf,
        Band::Vlf,
        Band::Lf,
        Band::Mf,
        Band::Hf,
        Band::Vhf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Band::Gamma => "GAMMA",
            Band::Xray => "XRAY",
            Band::Uv => "UV",
            Band::Vis => "VIS",
            Band::Nir => "NIR",
            Band::Swir => "SWIR",
            Band::Mwir => "MWIR",
            Band::Lwir => "LWIR",
            Band::L => "L",
            Band::S => "S",
            Band::C => "C",
            Band::X => "X",
            Band::Ku => "Ku",
            Band::K => "K",
            Band::Ka => "Ka",
            Band::V => "V",
            Band::W => "W",
            Band::D => "D",
            Band::Elf => "ELF",
            Band::Slf => "SLF",
            Band::Ulf => "ULF",
            Band::Vlf => "VLF",
            Band::Lf => "LF",
            Band::Mf => "MF",
            Band::Hf => "HF",
            Band::Vhf => "VHF",
        }
    }

    /// The lower and upper edges of the band, in the returned unit.
    pub fn range(self) -> (f64, f64, UnitDef) {
        match self {
            Band::Gamma => (0.0, 1.0, NANOMETER),
            Band::Xray => (1.1, 10.0, NANOMETER),
            Band::Uv => (10.1, 400.0, NANOMETER),
            Band::Vis => (400.0, 750.0, NANOMETER),
            Band::Nir => (751.0, 1000.0, NANOMETER),
            Band::Swir => (1001.0, 2500.0, NANOMETER),
            Band::Mwir => (3000.0, 5000.0, NANOMETER),
            Band::Lwir => (8000.0, 12000.0, NANOMETER),
            Band::L => (1.0, 2.0, GIGAHERTZ),
            Band::S => (2.1, 4.0, GIGAHERTZ),
            Band::C => (4.1, 8.0, GIGAHERTZ),
            Band::X => (8.1, 12.0, GIGAHERTZ),
            Band::Ku => (12.1, 18.0, GIGAHERTZ),
            Band::K => (18.1, 26.5, GIGAHERTZ),
            Band::Ka => (26.6, 40.0, GIGAHERTZ),
            Band::V => (50.1, 75.0, GIGAHERTZ),
            Band::W => (75.1, 110.0, GIGAHERTZ),
            Band::D => (110.1, 170.0, GIGAHERTZ),
            Band::Elf => (3.0, 30.0, HERTZ),
            Band::Slf => (30.1, 300.0, HERTZ),
            Band::Ulf => (300.1, 3000.0, HERTZ),
            Band::Vlf => (3.1, 30.0, KILOHERTZ),
            Band::Lf => (30.1, 300.0, KILOHERTZ),
            Band::Mf => (0.31, 3.0, MEGAHERTZ),
            Band::Hf => (3.1, 30.0, MEGAHERTZ),
            Band::Vhf => (30.1, 300.0, MEGAHERTZ),
        }
    }

    /// The region this band belongs to.
    pub fn region(self) -> Region {
        match self {
            Band::Gamma => Region::Gamma,
            Band::Xray => Region::Xray,
            Band::Uv => Region::Uv,
            Band::Vis | Band::Nir | Band::Swir => Region::Optic,
            Band::Mwir | Band::Lwir => Region::Tir,
            Band::L
            | Band::S
            | Band::C
            | Band::X
            | Band::Ku
            | Band::K
            | Band::Ka
            | Band::V
            | Band::W
            | Band::D => Region::Microwave,
            Band::Elf
            | Band::Slf
            | Band::Ulf
            | Band::Vlf
            | Band::Lf
            | Band::Mf
            | Band::Hf
            | Band::Vhf => Region::Radio,
        }
    }

    /// The spacing of the samples drawn from this band by [`select_band`], in
    /// the band's own unit.
    fn sample_step(self) -> f64 {
        if self.range().2 == NANOMETER {
            1.0
        } else {
            0.1
        }
    }

    /// Evenly spaced samples from the lower to the upper edge, inclusive.
    fn samples(self) -> Quantity {
        let (lo, hi, unit) = self.range();
        let step = self.sample_step();
        let n = ((hi - lo) / step).round() as usize;
        let values: Array1<f64> = (0..=n).map(|i| lo + i as f64 * step).collect();
        Quantity::from_parts(values, Unit::from(unit))
    }
}

impl Region {
    /// All regions, in lookup order.
    pub const ALL: [Region; 10] = [
        Region::Gamma,
        Region::Xray,
        Region::Uv,
        Region::Optic,
        Region::Tir,
        Region::Microwave,
        Region::Radio,
        Region::Uhf,
        Region::Ehf,
        Region::Thf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Gamma => "GAMMA",
            Region::Xray => "XRAY",
            Region::Uv => "UV",
            Region::Optic => "OPTIC",
            Region::Tir => "TIR",
            Region::Microwave => "MICROWAVE",
            Region::Radio => "RADIO",
            Region::Uhf => "UHF",
            Region::Ehf => "EHF",
            Region::Thf => "THF",
        }
    }

    /// The lower and upper edges of the region, in the returned unit.
    pub fn range(self) -> (f64, f64, UnitDef) {
        match self {
            Region::Gamma => (0.0, 1.0, NANOMETER),
            Region::Xray => (1.1, 10.0, NANOMETER),
            Region::Uv => (10.1, 400.0, NANOMETER),
            Region::Optic => (400.0, 2500.0, NANOMETER),
            Region::Tir => (3000.0, 12000.0, NANOMETER),
            Region::Microwave => (1.0, 170.0, GIGAHERTZ),
            Region::Radio => (3.0, 300_000_000.0, HERTZ),
            Region::Uhf => (0.31, 0.9, GIGAHERTZ),
            Region::Ehf => (170.1, 300.0, GIGAHERTZ),
            Region::Thf => (0.31, 3.0, TERAHERTZ),
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Band {
    type Err = EmError;

    fn from_str(s: &str) -> Result<Band, EmError> {
        Band::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| EmError::UnknownBand {
                received: s.to_string(),
                valid: Band::ALL.iter().join(", "),
            })
    }
}

/// The valid names for [`select_region`].
const REGION_NAMES: &str = "RADAR, OPTIC, OPTICS, THERMAL, TIR, RADIO (upper or lower case)";

/// The bands making up an aggregate region name.
fn region_bands(name: &str) -> Option<&'static str> {
    let bands = match name {
        "RADAR" | "radar" => "L S C X",
        "OPTIC" | "optic" | "OPTICS" | "optics" => "VIS NIR SWIR",
        "THERMAL" | "thermal" | "TIR" | "tir" => "MWIR LWIR",
        "RADIO" | "radio" => "ELF SLF ULF VLF LF MF HF VHF",
        _ => return None,
    };
    Some(bands)
}

/// Is `value` within `[lo, hi]` once the edges (in `edge_unit`) are expressed
/// in `unit`? Edges in the other spectral dimension are converted through the
/// speed of light.
fn contains(lo: f64, hi: f64, edge_unit: UnitDef, value: f64, unit: &Unit) -> Result<bool, EmError> {
    let edges = Quantity::from_parts(ndarray::array![lo, hi], Unit::from(edge_unit));
    let edges = spectral_convert(&edges, unit)?;
    let (a, b) = (edges.value()[0], edges.value()[1]);
    Ok(a.min(b) <= value && value <= a.max(b))
}

fn spectral_unit<U: ToUnit>(unit: U) -> Result<Unit, EmError> {
    let unit = unit.to_unit()?;
    match unit.dimension() {
        Some(Dimension::FREQUENCY) | Some(Dimension::LENGTH) => Ok(unit),
        dim => Err(DimensionError::NotSpectral {
            unit: unit.to_string(),
            dimension: crate::units::dimension_str(dim),
        }
        .into()),
    }
}

/// The band containing a frequency or wavelength, or `None` if it isn't in
/// any band.
///
/// ```
/// # use remsens::em::{which_band, Band};
/// assert_eq!(which_band(1.26, "GHz")?, Some(Band::L));
/// assert_eq!(which_band(500.0, "nm")?, Some(Band::Vis));
/// assert_eq!(which_band(15000.0, "GHz")?, None);
/// # Ok::<(), remsens::em::EmError>(())
/// ```
pub fn which_band<U: ToUnit>(value: f64, unit: U) -> Result<Option<Band>, EmError> {
    let unit = spectral_unit(unit)?;
    for band in Band::ALL {
        let (lo, hi, edge_unit) = band.range();
        if contains(lo, hi, edge_unit, value, &unit)? {
            trace!("{value} [{unit}] is in the {band} band");
            return Ok(Some(band));
        }
    }
    warn!("{value} [{unit}] is not within any known band");
    Ok(None)
}

/// The region containing a frequency or wavelength, or `None` if it isn't in
/// any region.
pub fn which_region<U: ToUnit>(value: f64, unit: U) -> Result<Option<Region>, EmError> {
    let unit = spectral_unit(unit)?;
    for region in Region::ALL {
        let (lo, hi, edge_unit) = region.range();
        if contains(lo, hi, edge_unit, value, &unit)? {
            trace!("{value} [{unit}] is in the {region} region");
            return Ok(Some(region));
        }
    }
    warn!("{value} [{unit}] is not within any known region");
    Ok(None)
}

/// Sampled values of one or more whitespace-separated bands (e.g. "L S C X"),
/// sorted and expressed in `output`, which must be a frequency or length
/// unit.
pub fn select_band<U: ToUnit>(bands: &str, output: U) -> Result<Quantity, EmError> {
    let output = spectral_unit(output)?;
    let mut values = vec![];
    for name in bands.split_whitespace() {
        let band: Band = name.parse()?;
        let samples = spectral_convert(&band.samples(), &output)?;
        values.extend(samples.value().iter().copied());
    }
    values.sort_by(|a, b| a.total_cmp(b));
    Ok(Quantity::from_parts(Array1::from(values), output))
}

/// Sampled values of all bands of a region: "RADAR", "OPTIC" (or "OPTICS"),
/// "THERMAL" (or "TIR") or "RADIO", in upper or lower case.
pub fn select_region<U: ToUnit>(region: &str, output: U) -> Result<Quantity, EmError> {
    let bands = region_bands(region).ok_or_else(|| EmError::UnknownRegion {
        received: region.to_string(),
        valid: REGION_NAMES.to_string(),
    })?;
    select_band(bands, output)
}
