use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// First maximal run of ASCII digits in `text`, scanning left to right.
pub fn first_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_run() {
        assert_eq!(first_digit_run("The code is 4821 approx"), Some("4821"));
        assert_eq!(first_digit_run("12 then 345"), Some("12"));
    }

    #[test]
    fn no_digits() {
        assert_eq!(first_digit_run("no numbers here"), None);
        assert_eq!(first_digit_run(""), None);
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(first_digit_run("٣٤ and 56"), Some("56"));
    }
}
