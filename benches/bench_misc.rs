// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Misc Benchmarks

use criterion::*;
use remsens::{
    angles::{AngleInputs, Angles},
    conversion::{db, AngleUnit, Radiometry, ValueUnit},
    em::{compute_wavelength, EmWave},
    ndarray::Array1,
    Quantity, Unit,
};

// /////////////////////// //
// Miscelaneous Benchmarks //
// /////////////////////// //

fn misc(c: &mut Criterion) {
    c.bench_function("parse simple unit", |b| {
        b.iter(|| black_box(Unit::parse(black_box("GHz"))))
    });

    c.bench_function("parse compound unit", |b| {
        b.iter(|| black_box(Unit::parse(black_box("kg * m ** 2 / s ** 2"))))
    });

    // Quantity arithmetic should be close to plain ndarray arithmetic.
    c.bench_function("multiply Quantity", |b| {
        let q1 = Quantity::new(Array1::linspace(1.0, 2.0, 100000), "m").unwrap();
        let q2 = Quantity::new(Array1::linspace(3.0, 4.0, 100000), "s").unwrap();
        b.iter(|| {
            let _q3 = black_box(&q1 * &q2);
        })
    });

    c.bench_function("multiply Array1<f64>", |b| {
        let a1 = Array1::linspace(1.0, 2.0, 100000);
        let a2 = Array1::linspace(3.0, 4.0, 100000);
        b.iter(|| {
            let _a3 = black_box(&a1 * &a2);
        })
    });

    c.bench_function("convert Quantity", |b| {
        let q = Quantity::new(Array1::linspace(1.0, 2.0, 100000), "GHz").unwrap();
        b.iter(|| black_box(q.convert_to("kHz")))
    });

    c.bench_function("compute_wavelength", |b| {
        let f = Array1::linspace(1.0, 40.0, 100000);
        b.iter(|| black_box(compute_wavelength(f.view(), "GHz", "cm")))
    });

    // Every element needs a band and region lookup.
    c.bench_function("EmWave::new", |b| {
        let f = Array1::linspace(1.0, 40.0, 1000);
        b.iter(|| black_box(EmWave::new(f.view(), "GHz", "cm")))
    });

    c.bench_function("Radiometry::new", |b| {
        let brdf = Array1::linspace(0.01, 0.5, 100000);
        let vza = Array1::linspace(0.0, 60.0, 100000);
        b.iter(|| {
            black_box(Radiometry::new(
                brdf.view(),
                vza.view(),
                ValueUnit::Brdf,
                AngleUnit::Degrees,
            ))
        })
    });

    c.bench_function("db", |b| {
        let a = Array1::linspace(-1.0, 10.0, 100000);
        b.iter(|| black_box(a.mapv(db)))
    });

    c.bench_function("Angles::new", |b| {
        let iza = Array1::linspace(-60.0, 60.0, 100000);
        b.iter(|| {
            black_box(Angles::new(AngleInputs::with_raa(
                iza.clone(),
                35.0,
                0.0,
            )))
        })
    });
}

criterion_group!(benches, misc);
criterion_main!(benches);
