use itertools::Itertools;

const SUPER: &str = "⁰¹²³⁴⁵⁶⁷⁸⁹⁺⁻⁽⁾";
const NORMAL: &str = "0123456789+-()";

pub fn lower_superscript(s: &str) -> String {
    let mut new = s.to_owned();
    for (sd, d) in SUPER.chars().zip_eq(NORMAL.chars()) {
        new = new.replace(sd, &d.to_string());
    }
    new
}

pub fn raise_superscript(s: &str) -> String {
    let mut new = s.to_owned();
    for (sd, d) in SUPER.chars().zip_eq(NORMAL.chars()) {
        new = new.replace(d, &sd.to_string());
    }
    new
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superscripts_round_trip() {
        assert_eq!(lower_superscript("x²⁺³"), "x2+3");
        assert_eq!(raise_superscript("-12"), "⁻¹²");
    }

    #[test]
    fn strip_whitespace_keeps_signs() {
        assert_eq!(crate::strip_whitespace("- 2"), "-2");
        assert_eq!(crate::strip_whitespace(" +  3.5 "), "+3.5");
    }
}
