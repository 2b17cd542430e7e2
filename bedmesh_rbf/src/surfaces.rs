/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides random probe layouts and synthetic bed deviation surfaces for tests and demos.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a matrix of random probe locations within the given bed extents.
///
/// # Parameters
/// - `n`: Number of probe locations to generate (rows in the output matrix).
/// - `extents`: Bed extents as `[x_min, x_max, y_min, y_max]`.
/// - `seed`: Optional random seed. If `Some(seed)` is provided, the same
///   layout is generated deterministically across runs (useful for
///   reproducible tests). If `None`, the generator is seeded from the
///   operating system's randomness source.
///
/// # Returns
/// A `Mat<f64>` of shape `(n, 2)` with one `(x, y)` location per row.
pub fn generate_random_points(n: usize, extents: [f64; 4], seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let [x_min, x_max, y_min, y_max] = extents;

    Mat::from_fn(n, 2, |_, j| match j {
        0 => rng.random_range(x_min..x_max),
        _ => rng.random_range(y_min..y_max),
    })
}

/// Implements smooth synthetic bed deviation surfaces for exercising the
/// interpolator against known shapes.
pub struct BedSurfaces;

impl BedSurfaces {
    /// A shallow bowl: `depth` below nominal at the bed centre, back to the
    /// nominal plane at the edge midpoints, and `depth` above in the corners.
    pub fn bowl_2d(points: &Mat<f64>, extents: [f64; 4], depth: f64) -> Mat<f64> {
        assert_eq!(points.ncols(), 2);

        let [x_min, x_max, y_min, y_max] = extents;
        let x_centre = (x_min + x_max) / 2.0;
        let y_centre = (y_min + y_max) / 2.0;
        let x_radius = (x_max - x_min) / 2.0;
        let y_radius = (y_max - y_min) / 2.0;

        Mat::from_fn(points.nrows(), 1, |i, _| {
            let u = (points[(i, 0)] - x_centre) / x_radius;
            let v = (points[(i, 1)] - y_centre) / y_radius;

            depth * (u * u + v * v - 1.0)
        })
    }

    /// A corner-to-corner twist: `+amplitude` in two opposite corners,
    /// `-amplitude` in the other two, flat along the centre lines.
    pub fn saddle_2d(points: &Mat<f64>, extents: [f64; 4], amplitude: f64) -> Mat<f64> {
        assert_eq!(points.ncols(), 2);

        let [x_min, x_max, y_min, y_max] = extents;
        let x_centre = (x_min + x_max) / 2.0;
        let y_centre = (y_min + y_max) / 2.0;
        let x_radius = (x_max - x_min) / 2.0;
        let y_radius = (y_max - y_min) / 2.0;

        Mat::from_fn(points.nrows(), 1, |i, _| {
            let u = (points[(i, 0)] - x_centre) / x_radius;
            let v = (points[(i, 1)] - y_centre) / y_radius;

            amplitude * u * v
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn random_points_are_reproducible_with_a_seed() {
        let extents = [0.0, 200.0, 0.0, 150.0];

        let first = generate_random_points(10, extents, Some(42));
        let second = generate_random_points(10, extents, Some(42));

        assert_eq!(first, second);
    }

    #[test]
    fn random_points_stay_within_the_extents() {
        let extents = [-10.0, 200.0, 3.0, 305.0];

        let points = generate_random_points(50, extents, Some(1));

        for i in 0..points.nrows() {
            assert!(points[(i, 0)] >= -10.0 && points[(i, 0)] < 200.0);
            assert!(points[(i, 1)] >= 3.0 && points[(i, 1)] < 305.0);
        }
    }

    #[test]
    fn bowl_is_deepest_at_the_centre() {
        let extents = [0.0, 100.0, 0.0, 100.0];
        let points = mat![[50.0, 50.0], [0.0, 50.0], [0.0, 0.0f64]];

        let values = BedSurfaces::bowl_2d(&points, extents, 0.3);

        assert!((values[(0, 0)] + 0.3).abs() < 1E-12); // centre
        assert!(values[(1, 0)].abs() < 1E-12); // edge midpoint
        assert!((values[(2, 0)] - 0.3).abs() < 1E-12); // corner
    }

    #[test]
    fn saddle_signs_alternate_between_corners() {
        let extents = [0.0, 100.0, 0.0, 100.0];
        let points = mat![[0.0, 0.0], [100.0, 0.0], [0.0, 100.0], [100.0, 100.0f64]];

        let values = BedSurfaces::saddle_2d(&points, extents, 0.2);

        assert!((values[(0, 0)] - 0.2).abs() < 1E-12);
        assert!((values[(1, 0)] + 0.2).abs() < 1E-12);
        assert!((values[(2, 0)] + 0.2).abs() < 1E-12);
        assert!((values[(3, 0)] - 0.2).abs() < 1E-12);
    }
}
