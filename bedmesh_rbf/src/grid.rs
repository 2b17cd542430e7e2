/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the regular query grid, its resolution selection policy, and the height grid output.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, RowRef};
use std::{error::Error, fmt};

/// Errors produced while constructing a [`GridSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSpecError {
    /// A grid needs at least 2 nodes per axis to define an edge.
    InvalidCount { axis: char, count: usize },
}

impl fmt::Display for GridSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSpecError::InvalidCount { axis, count } => write!(
                f,
                "{} axis needs at least 2 grid points, got {}",
                axis, count
            ),
        }
    }
}

impl Error for GridSpecError {}

/// A regular lattice of `x_count * y_count` query nodes.
///
/// Node x values are evenly spaced over `[x_min, x_max]` inclusive, and
/// likewise for y. Constructed once from the requested extents and counts,
/// immutable thereafter; both lattice generation and heightmap serialization
/// read the same spec, so their axis orders cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    x_count: usize,
    y_count: usize,
}

impl GridSpec {
    /// Creates a grid spec, requiring at least 2 nodes per axis.
    ///
    /// The extents are not validated against the probed area: an RBF surface
    /// is defined everywhere, and nodes outside the probed region are simply
    /// extrapolated.
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        x_count: usize,
        y_count: usize,
    ) -> Result<Self, GridSpecError> {
        if x_count < 2 {
            return Err(GridSpecError::InvalidCount {
                axis: 'x',
                count: x_count,
            });
        }

        if y_count < 2 {
            return Err(GridSpecError::InvalidCount {
                axis: 'y',
                count: y_count,
            });
        }

        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            x_count,
            y_count,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn x_count(&self) -> usize {
        self.x_count
    }

    pub fn y_count(&self) -> usize {
        self.y_count
    }

    /// Node spacing along x: `(x_max - x_min) / (x_count - 1)`.
    pub fn x_spacing(&self) -> f64 {
        (self.x_max - self.x_min) / (self.x_count - 1) as f64
    }

    /// Node spacing along y: `(y_max - y_min) / (y_count - 1)`.
    pub fn y_spacing(&self) -> f64 {
        (self.y_max - self.y_min) / (self.y_count - 1) as f64
    }

    /// Total number of lattice nodes.
    pub fn num_nodes(&self) -> usize {
        self.x_count * self.y_count
    }

    /// Returns the lattice as an `(x_count * y_count, 2)` matrix of query
    /// points, y-major: row `i * x_count + j` holds the node at column `j` of
    /// grid row `i`. The same ordering is used when reshaping interpolated
    /// values into a [`HeightGrid`].
    pub fn lattice(&self) -> Mat<f64> {
        let x_spacing = self.x_spacing();
        let y_spacing = self.y_spacing();

        Mat::from_fn(self.num_nodes(), 2, |node, coord| {
            let i = node / self.x_count;
            let j = node % self.x_count;

            match coord {
                0 => self.x_min + x_spacing * j as f64,
                _ => self.y_min + y_spacing * i as f64,
            }
        })
    }
}

/// Interpolated heights over a [`GridSpec`] lattice.
///
/// Values are stored as a `(y_count, x_count)` matrix: each matrix row is one
/// grid row at a fixed y, with x increasing along the columns. Produced once
/// by the interpolator and never mutated.
#[derive(Debug, Clone)]
pub struct HeightGrid {
    spec: GridSpec,
    values: Mat<f64>,
}

impl HeightGrid {
    pub(crate) fn new(spec: GridSpec, values: Mat<f64>) -> Self {
        assert_eq!(values.nrows(), spec.y_count());
        assert_eq!(values.ncols(), spec.x_count());

        Self { spec, values }
    }

    /// The grid spec the heights were sampled over.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// The interpolated heights, one matrix row per grid row.
    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    /// Iterates the grid rows in increasing y order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_, f64>> {
        self.values.row_iter()
    }
}

/// Selects grid counts for the given extents under a total point budget.
///
/// Both axes start at the minimum of 2 nodes. Nodes are then added one at a
/// time to whichever axis currently has the wider per-interval spacing, until
/// another node would push the total past `max_points`. When the spacings tie,
/// the y axis grows first; only a strictly wider x spacing grows x.
///
/// The returned counts never drop below 2 per axis, so a budget below 4 still
/// yields `(2, 2)`.
pub fn select_resolution(x_extent: f64, y_extent: f64, max_points: usize) -> (usize, usize) {
    let mut u = 2usize;
    let mut v = 2usize;
    let mut x = 2usize;
    let mut y = 2usize;

    while u * v <= max_points {
        x = u;
        y = v;

        if x_extent / x as f64 > y_extent / y as f64 {
            u += 1;
        } else {
            v += 1;
        }
    }

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_floor_is_two_by_two() {
        assert_eq!(select_resolution(100.0, 100.0, 0), (2, 2));
        assert_eq!(select_resolution(100.0, 100.0, 3), (2, 2));
    }

    #[test]
    fn resolution_tie_break_grows_y_first() {
        // Square extents tie on spacing at every step, so y gains the first
        // extra node: (2, 2) -> (2, 3), and (3, 3) would exceed the budget.
        assert_eq!(select_resolution(100.0, 100.0, 6), (2, 3));
    }

    #[test]
    fn resolution_square_budget_saturates_square_grid() {
        assert_eq!(select_resolution(100.0, 100.0, 441), (21, 21));
    }

    #[test]
    fn resolution_favours_the_longer_axis() {
        let (x_count, y_count) = select_resolution(300.0, 100.0, 24);

        assert!(x_count > y_count);
        assert!(x_count * y_count <= 24);
    }

    #[test]
    fn resolution_product_never_exceeds_budget() {
        for max_points in 4..200 {
            let (x_count, y_count) = select_resolution(220.0, 180.0, max_points);

            assert!(x_count >= 2);
            assert!(y_count >= 2);
            assert!(x_count * y_count <= max_points);
        }
    }

    #[test]
    fn grid_spec_rejects_counts_below_two() {
        let result = GridSpec::new(0.0, 10.0, 0.0, 10.0, 1, 5);

        assert_eq!(
            result,
            Err(GridSpecError::InvalidCount {
                axis: 'x',
                count: 1
            })
        );

        let result = GridSpec::new(0.0, 10.0, 0.0, 10.0, 5, 0);

        assert_eq!(
            result,
            Err(GridSpecError::InvalidCount {
                axis: 'y',
                count: 0
            })
        );
    }

    #[test]
    fn spacing_spans_extents_inclusively() {
        let spec = GridSpec::new(0.0, 10.0, -5.0, 5.0, 5, 3).unwrap();

        assert_eq!(spec.x_spacing(), 2.5);
        assert_eq!(spec.y_spacing(), 5.0);
    }

    #[test]
    fn lattice_is_y_major_with_x_inner() {
        let spec = GridSpec::new(0.0, 10.0, 0.0, 20.0, 3, 2).unwrap();
        let lattice = spec.lattice();

        assert_eq!(lattice.nrows(), 6);

        // Grid row 0 (y = 0): x sweeps 0, 5, 10.
        assert_eq!((lattice[(0, 0)], lattice[(0, 1)]), (0.0, 0.0));
        assert_eq!((lattice[(1, 0)], lattice[(1, 1)]), (5.0, 0.0));
        assert_eq!((lattice[(2, 0)], lattice[(2, 1)]), (10.0, 0.0));

        // Grid row 1 (y = 20): x sweeps again.
        assert_eq!((lattice[(3, 0)], lattice[(3, 1)]), (0.0, 20.0));
        assert_eq!((lattice[(4, 0)], lattice[(4, 1)]), (5.0, 20.0));
        assert_eq!((lattice[(5, 0)], lattice[(5, 1)]), (10.0, 20.0));
    }
}
