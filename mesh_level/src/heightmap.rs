/////////////////////////////////////////////////////////////////////////////////////////////
//
// Renders and writes RepRapFirmware v2 heightmap files from interpolated grids.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use bedmesh_rbf::HeightGrid;
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// RRF refuses heightmap files that do not open with this exact string.
const FILE_HEADER: &str = "RepRapFirmware height map file v2 generated at ";

/// Column header line RRF's parser expects verbatim.
const COLUMN_HEADER: &str = "xmin,xmax,ymin,ymax,radius,xspacing,yspacing,xnum,ynum";

/// Written in place of a probing radius; the grids produced here are
/// rectangular, not radial.
const RADIUS_SENTINEL: &str = "-1.00";

/// Renders a complete RRF v2 heightmap file as a single string.
///
/// The settings line carries the grid extents, spacings rounded to 2 decimal
/// places, and the integer node counts. Grid rows follow in increasing y
/// order with each z value rounded to 3 decimal places and joined by `", "`.
/// RRF itself writes rows with a stray leading space; it also accepts rows
/// without one, so a single convention (no leading space) is used here.
pub fn render(grid: &HeightGrid, generated_at: NaiveDateTime) -> String {
    let spec = grid.spec();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{FILE_HEADER}{}",
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "{COLUMN_HEADER}");
    let _ = writeln!(
        out,
        "{},{},{},{},{RADIUS_SENTINEL},{:.2},{:.2},{},{}",
        spec.x_min(),
        spec.x_max(),
        spec.y_min(),
        spec.y_max(),
        spec.x_spacing(),
        spec.y_spacing(),
        spec.x_count(),
        spec.y_count(),
    );

    for row in grid.rows() {
        let line = row
            .iter()
            .map(|z| format!("{z:.3}"))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(out, "{line}");
    }

    out
}

/// Writes the fully rendered heightmap in one operation, then opens up the
/// file's permission bits so DSF can access it.
///
/// Rendering before writing means a failed write never leaves a partially
/// formatted heightmap behind for the firmware to trip over.
pub fn write_heightmap<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<()> {
    let path = path.as_ref();

    fs::write(path, contents)?;

    // Allow all users to read/write/execute the file, so DSF can have access.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o777))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedmesh_rbf::{aggregate, interpolate, GridSpec, ProbeSample};
    use chrono::NaiveDate;

    fn corner_grid() -> HeightGrid {
        let samples = [
            ProbeSample::new(0.0, 0.0, 0.10),
            ProbeSample::new(10.0, 0.0, 0.20),
            ProbeSample::new(0.0, 10.0, 0.15),
            ProbeSample::new(10.0, 10.0, 0.25),
        ];

        let points = aggregate(&samples);
        let grid = GridSpec::new(0.0, 10.0, 0.0, 10.0, 2, 2).unwrap();

        interpolate(&points, &grid).unwrap()
    }

    fn fixed_timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 22)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn header_lines_match_the_rrf_format() {
        let rendered = render(&corner_grid(), fixed_timestamp());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines[0],
            "RepRapFirmware height map file v2 generated at 2025-11-22 10:30"
        );
        assert_eq!(lines[1], "xmin,xmax,ymin,ymax,radius,xspacing,yspacing,xnum,ynum");
        assert_eq!(lines[2], "0,10,0,10,-1.00,10.00,10.00,2,2");
    }

    #[test]
    fn one_row_per_grid_row_with_three_decimal_values() {
        let rendered = render(&corner_grid(), fixed_timestamp());
        let lines: Vec<&str> = rendered.lines().collect();

        // Header, columns, settings, then y_count grid rows.
        assert_eq!(lines.len(), 3 + 2);
        assert_eq!(lines[3], "0.100, 0.200");
        assert_eq!(lines[4], "0.150, 0.250");
    }

    #[test]
    fn spacing_is_extent_over_intervals_rounded_to_two_decimals() {
        let samples = [
            ProbeSample::new(0.0, 0.0, 0.0),
            ProbeSample::new(200.0, 100.0, 0.1),
            ProbeSample::new(0.0, 100.0, 0.05),
        ];

        let points = aggregate(&samples);
        let grid = GridSpec::new(0.0, 200.0, 0.0, 100.0, 7, 4).unwrap();
        let heights = interpolate(&points, &grid).unwrap();

        let rendered = render(&heights, fixed_timestamp());
        let settings: Vec<&str> = rendered.lines().nth(2).unwrap().split(',').collect();

        // 200 / 6 = 33.33..., 100 / 3 = 33.33...
        assert_eq!(settings[5], "33.33");
        assert_eq!(settings[6], "33.33");
        assert_eq!(settings[7], "7");
        assert_eq!(settings[8], "4");
    }

    #[test]
    fn written_files_contain_the_rendered_text() {
        let rendered = render(&corner_grid(), fixed_timestamp());
        let path =
            std::env::temp_dir().join(format!("mesh_level_heightmap_{}.csv", std::process::id()));

        write_heightmap(&path, &rendered).unwrap();
        let read_back = fs::read_to_string(&path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o777);
        }

        let _ = fs::remove_file(&path);

        assert_eq!(read_back, rendered);
    }

    #[test]
    fn unwritable_destinations_error_out() {
        let rendered = render(&corner_grid(), fixed_timestamp());

        let result = write_heightmap("/nonexistent/heightmap.csv", &rendered);

        assert!(result.is_err());
    }
}
