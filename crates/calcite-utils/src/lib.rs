mod strings;
pub use strings::{lower_superscript, raise_superscript};

/// Collapses all whitespace inside a string, keeping everything else.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
