// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

use ndarray::{prelude::*, Data};

/// The length of the longest array.
pub fn max_length<A>(arrays: &[ArrayView1<A>]) -> usize {
    arrays.iter().map(|a| a.len()).max().unwrap_or(0)
}

/// Extend every array to the length of the longest one by repeating its last
/// element. Empty arrays stay empty.
pub fn align_all<A: Clone>(arrays: &[ArrayView1<A>]) -> Vec<Array1<A>> {
    let n = max_length(arrays);
    arrays
        .iter()
        .map(|a| match a.last() {
            Some(last) if a.len() < n => a
                .iter()
                .cloned()
                .chain(std::iter::repeat(last.clone()).take(n - a.len()))
                .collect(),
            _ => a.to_owned(),
        })
        .collect()
}

/// Views of two arrays broadcast to a common length. Arrays of equal length
/// are returned as they are and a single-element array is stretched to the
/// other's length; any other combination gives `None`.
pub fn broadcast_pair<'a, A, S1, S2>(
    a: &'a ArrayBase<S1, Ix1>,
    b: &'a ArrayBase<S2, Ix1>,
) -> Option<(ArrayView1<'a, A>, ArrayView1<'a, A>)>
where
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    let n = match (a.len(), b.len()) {
        (x, y) if x == y => x,
        (1, y) => y,
        (x, 1) => x,
        _ => return None,
    };
    Some((a.broadcast(n)?, b.broadcast(n)?))
}
