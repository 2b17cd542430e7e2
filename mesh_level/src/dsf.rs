/////////////////////////////////////////////////////////////////////////////////////////////
//
// Translates file paths into their Duet Software Framework virtual SD card equivalents.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Converts a raw path to its DSF equivalent path as required.
///
/// When compatibility mode is off the path passes through untouched. When on,
/// paths are treated as M98 would treat them in RRF, with the working
/// directory assumed to be the root of the virtual SD card:
///
/// - a leading `0:` or `1:` drive designation is sliced off,
/// - absolute paths become paths relative to the virtual SD card root,
/// - relative paths are relative to the `/sys/` directory on the card.
pub fn dsf_path(raw_path: &str, dsf_mode: bool) -> String {
    if !dsf_mode {
        return raw_path.to_string();
    }

    let stripped = raw_path
        .strip_prefix("0:")
        .or_else(|| raw_path.strip_prefix("1:"))
        .unwrap_or(raw_path);

    match stripped.starts_with('/') {
        true => format!(".{stripped}"),
        false => format!("./sys/{stripped}"),
    }
}
