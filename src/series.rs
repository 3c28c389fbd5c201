// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::OverlayError;

/// Parses one observed value per line. Blank lines are skipped.
pub fn parse_series(text: &str, path: &Path) -> Result<Vec<i32>, OverlayError> {
    let mut series = Vec::<i32>::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<i32>().map_err(|_| OverlayError::SeriesParse{
            path: path.to_path_buf(), line: index + 1, text: trimmed.to_string()})?;
        series.push(value);
    }
    Ok(series)
}

/// Reads an observed series, one integer per line, from `path`.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<Vec<i32>, OverlayError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| OverlayError::Io{
        path: path.to_path_buf(), source})?;
    let series = parse_series(&text, path)?;
    debug!("Read {} values from {:?}", series.len(), path);
    Ok(series)
}
