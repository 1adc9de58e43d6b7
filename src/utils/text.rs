//! Normalization of the free text GNSS loggers and field crews type in.

use super::constants::{BRANCH_OFFICE_SUFFIXES, LOCAL_AREA_SUFFIXES, OFFICE_SUFFIXES};

/// Fold full-width ASCII variants (U+FF01..U+FF5E) and the ideographic space
/// to their half-width forms. Other characters are kept as they are.
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Pull the number out of text such as `"No.１２"` or `"A1.1"`: digits and
/// dots are kept, everything else dropped. `None` when what remains is not a
/// number.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let numeric: String = to_half_width(text)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().ok()
}

pub fn clean_office_name(name: &str) -> String {
    strip_all(name, &OFFICE_SUFFIXES)
}

pub fn clean_branch_office_name(name: &str) -> String {
    strip_all(name, &BRANCH_OFFICE_SUFFIXES)
}

pub fn clean_local_area_name(name: &str) -> String {
    strip_all(name, &LOCAL_AREA_SUFFIXES)
}

fn strip_all(name: &str, words: &[&str]) -> String {
    let stripped = words
        .iter()
        .fold(to_half_width(name), |acc, word| acc.replace(word, ""));
    stripped.trim().to_string()
}
