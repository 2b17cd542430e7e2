/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the radial kernel functions, shape parameter selection, and kernel matrices.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Radial kernel functions and the dense collocation matrices built from them.

use faer::{Mat, RowRef};
use serde::{Deserialize, Serialize};

/// The implemented radial kernel functions.
///
/// [`RbfKernelType::Multiquadric`] is the default used for bed meshes: it is
/// smooth, defined everywhere, and strictly positive at `r = 0`, which keeps
/// the collocation matrix well behaved for distinct probe points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RbfKernelType {
    /// `phi(r) = sqrt(r^2 + epsilon^2)`
    Multiquadric,

    /// `phi(r) = 1 / sqrt(r^2 + epsilon^2)`
    InverseMultiquadric,

    /// `phi(r) = exp(-(r / epsilon)^2)`
    Gaussian,

    /// `phi(r) = r`
    Linear,

    /// `phi(r) = r^3`
    Cubic,

    /// `phi(r) = r^2 log r`, taken as `0` at `r = 0`
    ThinPlateSpline,
}

/// Kernel selection together with the shape parameter used to evaluate it.
///
/// The shape parameter `epsilon` controls the width of the kernel and is only
/// consulted by the multiquadric, inverse multiquadric, and gaussian kernels.
/// When the caller does not supply one, the fit derives it from the data as
/// [`mean_pairwise_distance`] over the input points. That default is part of
/// the interpolation contract, so it is computed explicitly here rather than
/// hidden behind the solver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KernelParams {
    /// The radial kernel to evaluate.
    pub kernel_type: RbfKernelType,

    /// Shape parameter. Must be positive for the kernels that consult it.
    pub epsilon: f64,
}

impl KernelParams {
    /// Creates kernel parameters for the given kernel type and shape parameter.
    pub fn new(kernel_type: RbfKernelType, epsilon: f64) -> Self {
        Self {
            kernel_type,
            epsilon,
        }
    }

    /// Evaluates the kernel at distance `r`.
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        let epsilon = self.epsilon;

        match self.kernel_type {
            RbfKernelType::Multiquadric => (r * r + epsilon * epsilon).sqrt(),
            RbfKernelType::InverseMultiquadric => 1.0 / (r * r + epsilon * epsilon).sqrt(),
            RbfKernelType::Gaussian => {
                let scaled = r / epsilon;
                (-(scaled * scaled)).exp()
            }
            RbfKernelType::Linear => r,
            RbfKernelType::Cubic => r.powi(3),
            RbfKernelType::ThinPlateSpline => match r.abs() < f64::EPSILON {
                true => 0.0,
                false => r.powi(2) * r.ln(),
            },
        }
    }
}

/// Calculates the euclidean distance between two points.
#[inline(always)]
pub fn euclidean_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Returns the arithmetic mean of the pairwise distances between all points.
///
/// This is the default shape parameter for the kernels that take one: with no
/// explicit `epsilon`, the kernel width tracks the typical spacing of the
/// probed locations.
///
/// # Panics
/// Panics if `points` has fewer than two rows, since no pair exists.
pub fn mean_pairwise_distance(points: &Mat<f64>) -> f64 {
    let num_points = points.nrows();

    assert!(
        num_points >= 2,
        "mean pairwise distance requires at least 2 points, got {}",
        num_points
    );

    let mut total = 0.0;
    let mut num_pairs = 0usize;

    for i in 0..num_points {
        for j in (i + 1)..num_points {
            total += euclidean_distance(points.row(i), points.row(j));
            num_pairs += 1;
        }
    }

    total / num_pairs as f64
}

/// Builds the dense kernel matrix `A[i][j] = phi(|target_i - source_j|)`.
///
/// Used for evaluating a fitted surface: one row per target point, one column
/// per source (probe) point.
pub fn kernel_matrix(
    target_points: &Mat<f64>,
    source_points: &Mat<f64>,
    kernel: &KernelParams,
) -> Mat<f64> {
    let m = target_points.nrows();
    let n = source_points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(m, n);

    for j in 0..n {
        let source = source_points.row(j);

        for i in 0..m {
            let target = target_points.row(i);

            a_matrix[(i, j)] = kernel.phi(euclidean_distance(target, source));
        }
    }

    a_matrix
}

/// Builds the symmetric collocation matrix over a single point set.
///
/// Only the lower triangle is evaluated; each value is mirrored to its
/// symmetric entry. The diagonal is `phi(0)`, which for the multiquadric
/// kernel equals `epsilon` rather than zero.
pub fn kernel_matrix_symmetric(points: &Mat<f64>, kernel: &KernelParams) -> Mat<f64> {
    let n = points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source = points.row(j);

        for i in j..n {
            let target = points.row(i);
            let k_val = kernel.phi(euclidean_distance(target, source));

            // Write both symmetric entries
            a_matrix[(i, j)] = k_val;
            a_matrix[(j, i)] = k_val;
        }
    }

    a_matrix
}
