//! Raw counselor name normalization
//!
//! Reduces free-text names to a canonical comparison form before any
//! scoring: lowercased, parentheticals stripped, honorifics removed,
//! whitespace collapsed. Normalization is idempotent, so already-clean
//! input passes through unchanged.

/// Honorific prefixes and suffixes removed as whole tokens only.
/// Trailing periods are tolerated ("Mr." matches "mr").
const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "rev", "prof", "sir", "jr", "sr", "ii", "iii", "iv", "md",
    "phd", "esq",
];

/// Normalize a raw counselor name for comparison
///
/// Returns an empty string when nothing comparable remains (blank
/// input, or input consisting only of honorifics and punctuation).
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = strip_parentheticals(&lowered);

    stripped
        .split_whitespace()
        .filter(|token| !is_honorific(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove parenthetical content; a parenthetical is an alias, not part
/// of the comparable name. An unterminated "(" drops the rest of the
/// string.
fn strip_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;

    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }

    out
}

fn is_honorific(token: &str) -> bool {
    let trimmed = token.trim_end_matches('.');
    HONORIFICS.contains(&trimmed)
}
