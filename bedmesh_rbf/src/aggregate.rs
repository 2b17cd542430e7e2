/////////////////////////////////////////////////////////////////////////////////////////////
//
// Collapses repeated probes of the same coordinate into one averaged sample per location.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use std::collections::HashMap;

/// A single probed observation of the bed surface.
///
/// Raw probe logs may contain several samples at the same `(x, y)` location
/// with differing `z` readings; those are repeated measurements of one
/// physical point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ProbeSample {
    /// Creates a new probe sample from raw coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The reduced probe dataset: one entry per distinct `(x, y)` location.
///
/// The three sequences have equal length and `zs[i]` holds the arithmetic
/// mean of every raw `z` observed at `(xs[i], ys[i])`. Entries appear in the
/// first-seen order of their coordinates, which keeps downstream results
/// deterministic. Constructed once by [`aggregate`] and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbePointSet {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
}

impl ProbePointSet {
    /// Number of distinct probed locations.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns `true` when no probes were recorded.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// The distinct x coordinates, in first-seen order.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// The distinct y coordinates, in first-seen order.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// The averaged height at each distinct location.
    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    /// Returns the probed locations as an `(n, 2)` coordinate matrix.
    pub fn coords(&self) -> Mat<f64> {
        Mat::from_fn(self.len(), 2, |i, j| match j {
            0 => self.xs[i],
            _ => self.ys[i],
        })
    }

    /// Returns the averaged heights as an `(n, 1)` column matrix.
    pub fn heights(&self) -> Mat<f64> {
        Mat::from_fn(self.len(), 1, |i, _| self.zs[i])
    }
}

/// Key for grouping coordinates by exact float equality.
///
/// Grouping uses the raw parsed values with no tolerance, so the bit pattern
/// is the natural hash key. `+0.0` and `-0.0` compare equal as floats but
/// differ in bits, so both are collapsed onto the positive zero pattern.
#[inline]
fn coordinate_key(value: f64) -> u64 {
    match value == 0.0 {
        true => 0.0f64.to_bits(),
        false => value.to_bits(),
    }
}

/// Groups samples by exact `(x, y)` equality and averages each group's heights.
///
/// Pure data reduction with no side effects: an empty input yields an empty
/// [`ProbePointSet`], and a group of one passes its height through unchanged.
///
/// # Examples
///
/// ```
/// use bedmesh_rbf::{aggregate, ProbeSample};
///
/// let samples = [
///     ProbeSample::new(0.0, 0.0, 1.0),
///     ProbeSample::new(0.0, 0.0, 3.0),
///     ProbeSample::new(1.0, 0.0, 2.0),
/// ];
///
/// let points = aggregate(&samples);
///
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.zs(), &[2.0, 2.0]);
/// ```
pub fn aggregate(samples: &[ProbeSample]) -> ProbePointSet {
    let mut group_of: HashMap<(u64, u64), usize> = HashMap::new();

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut z_sums: Vec<f64> = Vec::new();
    let mut z_counts: Vec<usize> = Vec::new();

    for sample in samples {
        let key = (coordinate_key(sample.x), coordinate_key(sample.y));

        let group = *group_of.entry(key).or_insert_with(|| {
            xs.push(sample.x);
            ys.push(sample.y);
            z_sums.push(0.0);
            z_counts.push(0);
            xs.len() - 1
        });

        z_sums[group] += sample.z;
        z_counts[group] += 1;
    }

    let zs = z_sums
        .iter()
        .zip(z_counts.iter())
        .map(|(sum, count)| sum / *count as f64)
        .collect();

    ProbePointSet { xs, ys, zs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_repeated_probes_of_one_location() {
        let samples = [
            ProbeSample::new(0.0, 0.0, 1.0),
            ProbeSample::new(0.0, 0.0, 3.0),
            ProbeSample::new(1.0, 0.0, 2.0),
        ];

        let points = aggregate(&samples);

        assert_eq!(points.len(), 2);
        assert_eq!(points.xs(), &[0.0, 1.0]);
        assert_eq!(points.ys(), &[0.0, 0.0]);
        assert_eq!(points.zs(), &[2.0, 2.0]);
    }

    #[test]
    fn keeps_first_seen_order_of_distinct_coordinates() {
        let samples = [
            ProbeSample::new(5.0, 5.0, 0.3),
            ProbeSample::new(-2.0, 1.0, 0.1),
            ProbeSample::new(5.0, 5.0, 0.5),
            ProbeSample::new(0.0, 0.0, 0.2),
        ];

        let points = aggregate(&samples);

        assert_eq!(points.xs(), &[5.0, -2.0, 0.0]);
        assert_eq!(points.ys(), &[5.0, 1.0, 0.0]);
        assert_eq!(points.zs(), &[0.4, 0.1, 0.2]);
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let points = aggregate(&[]);

        assert!(points.is_empty());
        assert_eq!(points.coords().nrows(), 0);
        assert_eq!(points.heights().nrows(), 0);
    }

    #[test]
    fn single_sample_passes_through_unchanged() {
        let points = aggregate(&[ProbeSample::new(1.5, -2.5, 0.025)]);

        assert_eq!(points.len(), 1);
        assert_eq!(points.zs(), &[0.025]);
    }

    #[test]
    fn signed_zero_coordinates_group_together() {
        let samples = [
            ProbeSample::new(0.0, 1.0, 2.0),
            ProbeSample::new(-0.0, 1.0, 4.0),
        ];

        let points = aggregate(&samples);

        assert_eq!(points.len(), 1);
        assert_eq!(points.zs(), &[3.0]);
    }

    #[test]
    fn coordinate_matrices_match_sequences() {
        let samples = [
            ProbeSample::new(1.0, 2.0, 0.1),
            ProbeSample::new(3.0, 4.0, 0.2),
        ];

        let points = aggregate(&samples);
        let coords = points.coords();
        let heights = points.heights();

        assert_eq!(coords[(0, 0)], 1.0);
        assert_eq!(coords[(0, 1)], 2.0);
        assert_eq!(coords[(1, 0)], 3.0);
        assert_eq!(coords[(1, 1)], 4.0);
        assert_eq!(heights[(0, 0)], 0.1);
        assert_eq!(heights[(1, 0)], 0.2);
    }
}
