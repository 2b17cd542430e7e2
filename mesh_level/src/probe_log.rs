/////////////////////////////////////////////////////////////////////////////////////////////
//
// Extracts probed coordinates from bed probing logs by pattern matching.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use bedmesh_rbf::ProbeSample;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Matches: Mesh Point: X20.485 Y-13 Z0.025
const PROBE_POINT_PATTERN: &str = r"Mesh Point: X(-?\d*\.?\d*) Y(-?\d*\.?\d*) Z(-?\d*\.?\d*)";

/// Reads a probe log file and extracts every probed coordinate.
///
/// See [`parse_probe_lines`] for the extraction rules.
pub fn read_probe_log<P: AsRef<Path>>(path: P) -> io::Result<Vec<ProbeSample>> {
    let file = File::open(path)?;

    parse_probe_lines(BufReader::new(file))
}

/// Extracts probe samples from the lines of a probing log.
///
/// Lines are scanned for the `Mesh Point:` pattern; lines without a match are
/// ignored, as is a match whose captured fields do not parse as numbers.
/// Samples are returned in log order, which later fixes the first-seen order
/// of aggregated coordinates.
pub fn parse_probe_lines<R: BufRead>(reader: R) -> io::Result<Vec<ProbeSample>> {
    let pattern = Regex::new(PROBE_POINT_PATTERN).expect("probe point pattern is valid");

    let mut samples = Vec::new();

    for line in reader.lines() {
        let line = line?;

        let Some(captured) = pattern.captures(&line) else {
            continue;
        };

        let (Ok(x), Ok(y), Ok(z)) = (
            captured[1].parse::<f64>(),
            captured[2].parse::<f64>(),
            captured[3].parse::<f64>(),
        ) else {
            continue;
        };

        samples.push(ProbeSample::new(x, y, z));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_decimal_and_negative_coordinates() {
        let log = "Mesh Point: X20.485 Y-13 Z0.025\n";

        let samples = parse_probe_lines(log.as_bytes()).unwrap();

        assert_eq!(samples, vec![ProbeSample::new(20.485, -13.0, 0.025)]);
    }

    #[test]
    fn ignores_lines_without_the_probe_pattern() {
        let log = "G32 bed probe\n\
                   Mesh Point: X0 Y0 Z0.1\n\
                   Error: probe triggered before move\n\
                   Mesh Point: X10 Y5 Z-0.02\n\
                   Done probing\n";

        let samples = parse_probe_lines(log.as_bytes()).unwrap();

        assert_eq!(
            samples,
            vec![
                ProbeSample::new(0.0, 0.0, 0.1),
                ProbeSample::new(10.0, 5.0, -0.02),
            ]
        );
    }

    #[test]
    fn finds_the_pattern_anywhere_in_a_line() {
        let log = "recv: Mesh Point: X1.5 Y2.5 Z0.075 (probe 3)\n";

        let samples = parse_probe_lines(log.as_bytes()).unwrap();

        assert_eq!(samples, vec![ProbeSample::new(1.5, 2.5, 0.075)]);
    }

    #[test]
    fn skips_matches_with_unparseable_fields() {
        // The pattern's optional digit groups can capture an empty field;
        // such a line carries no usable coordinate.
        let log = "Mesh Point: X Y0 Z0.1\n";

        let samples = parse_probe_lines(log.as_bytes()).unwrap();

        assert!(samples.is_empty());
    }

    #[test]
    fn empty_logs_yield_no_samples() {
        let samples = parse_probe_lines("".as_bytes()).unwrap();

        assert!(samples.is_empty());
    }

    #[test]
    fn missing_log_files_error_out() {
        let result = read_probe_log("/nonexistent/meshbedprobe.log");

        assert!(result.is_err());
    }
}
