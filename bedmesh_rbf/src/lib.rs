/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for bed probe RBF interpolation.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Scattered bed-probe interpolation using Radial Basis Functions (RBF).
//!
//! Probing a printer bed at irregular locations (for example, to keep the probe
//! away from bed magnets) yields a sparse scatter of `(x, y, z)` samples, while
//! firmware expects heights on a dense regular grid. This crate fits an RBF
//! surface through the probed points and samples that surface at every node of
//! a caller-specified grid.
//!
//! The fit is exact interpolation, not regression: evaluating the fitted
//! surface at a probed location reproduces the probed height. Repeated probes
//! of the same coordinate are first collapsed to their mean height by
//! [`aggregate`], so the collocation system sees one sample per location.
//!
//! The default kernel is the multiquadric `phi(r) = sqrt(r^2 + epsilon^2)`,
//! with the shape parameter `epsilon` derived from the data as the mean
//! pairwise distance between the input points. See [`kernels`] for the full
//! kernel family and [`rbf::RbfInterpolator`] for solver details.
//!
//! Input sizes are expected to be small (tens to low hundreds of probes), so
//! the system is assembled densely and solved directly.
//!
//! # Examples
//!
//! ```
//! use bedmesh_rbf::{aggregate, interpolate, GridSpec, ProbeSample};
//!
//! // Four probes at the corners of a 10 x 10 bed.
//! let samples = vec![
//!     ProbeSample::new(0.0, 0.0, 0.10),
//!     ProbeSample::new(10.0, 0.0, 0.20),
//!     ProbeSample::new(0.0, 10.0, 0.15),
//!     ProbeSample::new(10.0, 10.0, 0.25),
//! ];
//!
//! let points = aggregate(&samples);
//!
//! // A 2 x 2 grid whose nodes coincide with the probed corners.
//! let grid = GridSpec::new(0.0, 10.0, 0.0, 10.0, 2, 2)?;
//! let heights = interpolate(&points, &grid)?;
//!
//! // Interpolation is exact at the probed locations.
//! assert!((heights.values()[(0, 0)] - 0.10).abs() < 1E-6);
//! assert!((heights.values()[(1, 1)] - 0.25).abs() < 1E-6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod kernels;

pub mod progress;

mod aggregate;

mod grid;

mod rbf;

mod surfaces;

pub use {
    aggregate::{aggregate, ProbePointSet, ProbeSample},
    grid::{select_resolution, GridSpec, GridSpecError, HeightGrid},
    rbf::{
        interpolate, InterpolationError, ModelIOError, RbfInterpolator, RbfInterpolatorBuilder,
    },
    surfaces::{generate_random_points, BedSurfaces},
};
