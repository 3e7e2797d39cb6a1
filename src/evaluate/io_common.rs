use std::path::Path;

use crate::evaluate::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Splits a cell into the candidates tied at that rank. Blank names are dropped.
pub fn split_ties(cell: &str, tie_delimiter: &str) -> Vec<String> {
    cell.split(tie_delimiter)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn parse_count(cell: &str, lineno: usize) -> RunResult<u64> {
    cell.trim().parse::<u64>().ok().context(ParsingCountSnafu {
        lineno,
        value: cell.to_string(),
    })
}
