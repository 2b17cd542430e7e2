/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the RBF surface fit, grid evaluation, and fitted model persistence.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    aggregate::ProbePointSet,
    grid::{GridSpec, HeightGrid},
    kernels::{self, KernelParams, RbfKernelType},
    progress::{ProgressMsg, ProgressSink},
};

use faer::linalg::solvers::SolveLstsq;
use faer::Mat;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

/// Relative threshold under which a diagonal entry of the R factor is treated
/// as zero when estimating the numerical rank of the collocation matrix.
const RANK_TOLERANCE: f64 = 1E-10;

/// Errors produced while fitting an RBF surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationError {
    /// Fewer than two distinct probed coordinates were supplied. A surface
    /// needs at least two non-coincident points, so the fit is rejected
    /// before any matrix is built.
    DegenerateInput { num_points: usize },
}

impl fmt::Display for InterpolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationError::DegenerateInput { num_points } => write!(
                f,
                "cannot fit a surface through {} distinct probe point(s); at least 2 are required",
                num_points
            ),
        }
    }
}

impl Error for InterpolationError {}

/// Convenience builder for constructing an [`RbfInterpolator`].
///
/// Created via [`RbfInterpolator::builder`]. Supplies the default kernel
/// (multiquadric with a data-derived shape parameter) and allows incremental
/// configuration before fitting.
pub struct RbfInterpolatorBuilder {
    points: Mat<f64>,
    point_values: Mat<f64>,
    kernel_type: RbfKernelType,
    epsilon: Option<f64>,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl RbfInterpolatorBuilder {
    fn new(points: Mat<f64>, point_values: Mat<f64>) -> Self {
        Self {
            points,
            point_values,
            kernel_type: RbfKernelType::Multiquadric,
            epsilon: None,
            progress_callback: None,
        }
    }

    /// Selects the radial kernel. Defaults to [`RbfKernelType::Multiquadric`].
    pub fn kernel_type(mut self, kernel_type: RbfKernelType) -> Self {
        self.kernel_type = kernel_type;
        self
    }

    /// Sets an explicit shape parameter.
    ///
    /// When omitted, the fit uses the mean pairwise distance between the
    /// input points ([`kernels::mean_pairwise_distance`]).
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Optional callback for reporting warnings raised during the fit.
    ///
    /// Skipped during serialization.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Fits and returns the configured [`RbfInterpolator`].
    pub fn build(self) -> Result<RbfInterpolator, InterpolationError> {
        RbfInterpolator::new(
            self.points,
            self.point_values,
            self.kernel_type,
            self.epsilon,
            self.progress_callback,
        )
    }
}

/// An RBF surface fitted through a set of probed bed points.
///
/// The surface is the weighted kernel sum
/// `z(q) = sum_i w_i * phi(|q - p_i|)`, with the weights solved so the
/// surface passes exactly through every input sample. Evaluation is defined
/// everywhere; grid nodes outside the probed region are extrapolated by the
/// same formula with no clamping.
#[derive(Serialize, Deserialize, Debug)]
pub struct RbfInterpolator {
    /// Coordinates of the fitted probe points, one `(x, y)` row per point.
    pub points: Mat<f64>,

    /// Probed height at each point.
    pub point_values: Mat<f64>,

    /// Solved kernel weights, one per probe point.
    pub weights: Mat<f64>,

    /// Kernel selection and shape parameter used by the fit.
    kernel: KernelParams,

    /// Optional callback for reporting warnings.
    /// Skipped during serialization.
    #[serde(skip, default)]
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl RbfInterpolator {
    /// Creates a new [`RbfInterpolatorBuilder`] for the given probe
    /// coordinates (an `(n, 2)` matrix) and heights (an `(n, 1)` matrix).
    ///
    /// This is the way to construct an interpolator.
    pub fn builder(points: Mat<f64>, point_values: Mat<f64>) -> RbfInterpolatorBuilder {
        RbfInterpolatorBuilder::new(points, point_values)
    }

    fn new(
        points: Mat<f64>,
        point_values: Mat<f64>,
        kernel_type: RbfKernelType,
        epsilon: Option<f64>,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, InterpolationError> {
        let num_points = points.nrows();

        if num_points < 2 {
            return Err(InterpolationError::DegenerateInput { num_points });
        }

        assert_eq!(points.ncols(), 2, "expected one (x, y) row per probe point");
        assert_eq!(
            point_values.nrows(),
            num_points,
            "each probe point needs exactly one height value"
        );

        let epsilon = epsilon.unwrap_or_else(|| kernels::mean_pairwise_distance(&points));
        let kernel = KernelParams::new(kernel_type, epsilon);

        let a_matrix = kernels::kernel_matrix_symmetric(&points, &kernel);

        // Rank-revealing QR with column pivoting. Solving in the least-squares
        // sense always returns an answer, even when near-duplicate or
        // collinear probes make the system rank deficient; that case is
        // surfaced as a warning instead of failing or going unnoticed.
        let qr = a_matrix.col_piv_qr();

        let r = qr.thin_R();
        let threshold = RANK_TOLERANCE * r.get(0, 0).abs();
        let rank = r
            .diagonal()
            .column_vector()
            .iter()
            .filter(|val| val.abs() > threshold)
            .count();

        if rank < num_points {
            if let Some(sink) = &progress_callback {
                sink.emit(ProgressMsg::IllConditionedSystem {
                    rank,
                    size: num_points,
                });
            }
        }

        let weights = qr.solve_lstsq(&point_values);

        Ok(Self {
            points,
            point_values,
            weights,
            kernel,
            progress_callback,
        })
    }

    /// The kernel parameters the surface was fitted with, including the
    /// resolved shape parameter.
    pub fn kernel(&self) -> &KernelParams {
        &self.kernel
    }

    /// Evaluates the fitted surface at arbitrary target points.
    ///
    /// `target_points` is an `(m, 2)` matrix of query coordinates; the result
    /// is an `(m, 1)` matrix of interpolated heights.
    pub fn evaluate(&self, target_points: &Mat<f64>) -> Mat<f64> {
        let eval_matrix = kernels::kernel_matrix(target_points, &self.points, &self.kernel);

        eval_matrix * &self.weights
    }

    /// Evaluates the fitted surface at the original probe points.
    ///
    /// Useful as an interpolation-exactness diagnostic: the result should
    /// match [`RbfInterpolator::point_values`] to within the solve tolerance.
    pub fn evaluate_at_source(&self) -> Mat<f64> {
        self.evaluate(&self.points)
    }

    /// Evaluates the fitted surface at every node of `grid`'s lattice.
    ///
    /// The returned [`HeightGrid`] is `(y_count, x_count)` with rows in
    /// increasing y order, matching the lattice generation order of
    /// [`GridSpec::lattice`].
    pub fn evaluate_grid(&self, grid: &GridSpec) -> HeightGrid {
        let flat = self.evaluate(&grid.lattice());

        let x_count = grid.x_count();
        let values = Mat::from_fn(grid.y_count(), x_count, |i, j| flat[(i * x_count + j, 0)]);

        HeightGrid::new(*grid, values)
    }

    /// Saves this fitted surface to a JSON envelope `{ format, version, model }`.
    ///
    /// Files produced here are read back with [`RbfInterpolator::load_model`].
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelIOError> {
        let path_ref = path.as_ref();

        let file = File::create(path_ref).map_err(|e| ModelIOError::Io {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        let envelope = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            model: self,
        };

        serde_json::to_writer_pretty(&mut writer, &envelope).map_err(|e| ModelIOError::Json {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        writer.flush().map_err(|e| ModelIOError::Io {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Loads a fitted surface from a JSON envelope, validating format and
    /// version.
    ///
    /// If `progress` is `Some`, the sink is installed on the returned model so
    /// later operations can report warnings.
    pub fn load_model<P: AsRef<Path>>(
        path: P,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, ModelIOError> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| ModelIOError::Io {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let envelope: JsonEnvelopeOwned<Self> =
            serde_json::from_reader(reader).map_err(|e| ModelIOError::Json {
                path: path_ref.to_path_buf(),
                source: e,
            })?;

        if envelope.format != JSON_FORMAT_NAME {
            return Err(ModelIOError::FormatMismatch {
                path: path_ref.to_path_buf(),
                found: envelope.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if envelope.version != JSON_VERSION {
            return Err(ModelIOError::VersionMismatch {
                path: path_ref.to_path_buf(),
                found: envelope.version,
                expected: JSON_VERSION,
            });
        }

        let mut model = envelope.model;
        if let Some(sink) = progress {
            model.progress_callback = Some(sink);
        }

        Ok(model)
    }
}

/// Fits an RBF surface through the aggregated probe points and samples it at
/// every node of `grid`.
///
/// This is the one-shot entry point for the probe-log pipeline; use
/// [`RbfInterpolator::builder`] directly for kernel control or repeated
/// evaluations of one fitted surface.
pub fn interpolate(
    points: &ProbePointSet,
    grid: &GridSpec,
) -> Result<HeightGrid, InterpolationError> {
    let surface = RbfInterpolator::builder(points.coords(), points.heights()).build()?;

    Ok(surface.evaluate_grid(grid))
}

const JSON_FORMAT_NAME: &str = "bedmesh_rbf.json";
const JSON_VERSION: u32 = 1;

/// Borrowing envelope for save (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for load.
#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

/// Errors that can occur when saving or loading a fitted [`RbfInterpolator`].
#[derive(Debug)]
pub enum ModelIOError {
    /// Low-level I/O failure while reading or writing the model file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialization or parse failure.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The JSON `format` field does not match the expected model format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for ModelIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIOError::Io { path, source } => {
                write!(f, "accessing {}: {}", path.display(), source)
            }
            ModelIOError::Json { path, source } => {
                write!(f, "JSON model in {}: {}", path.display(), source)
            }
            ModelIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
        }
    }
}

impl Error for ModelIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelIOError::Io { source, .. } => Some(source),
            ModelIOError::Json { source, .. } => Some(source),
            ModelIOError::FormatMismatch { .. } | ModelIOError::VersionMismatch { .. } => None,
        }
    }
}
