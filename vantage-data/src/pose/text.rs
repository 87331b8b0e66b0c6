//! Whitespace-delimited numeric text.

/// Parse every whitespace-separated token as a decimal.
///
/// Tokens that are not numbers become `NaN` so callers can decide whether a
/// record containing them is skipped or rejects the whole file.
pub fn parse_numbers(text: &str) -> Vec<f32> {
    text.split_whitespace()
        .map(|token| token.parse::<f32>().unwrap_or(f32::NAN))
        .collect()
}

/// True for printable text with at least one token that parses as a number.
///
/// Stray words are allowed; control bytes other than whitespace are not.
pub(crate) fn is_plain_text(text: &str) -> bool {
    text.chars().all(|c| !c.is_control() || c.is_whitespace())
        && text
            .split_whitespace()
            .any(|token| token.parse::<f32>().is_ok_and(f32::is_finite))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_whitespace() {
        let values = parse_numbers(" 1 2.5\t-3e2\n\n4 ");
        assert_eq!(values, vec![1.0, 2.5, -300.0, 4.0]);
    }

    #[test]
    fn test_bad_tokens_become_nan() {
        let values = parse_numbers("1 abc 3");
        assert_eq!(values.len(), 3);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_plain_text_detection() {
        assert!(is_plain_text("0 1 2\n3"));
        assert!(is_plain_text("0 1 x\nend\n"));
        assert!(is_plain_text("# frame poses\r\n0 1 0 0 5"));
        assert!(!is_plain_text("   "));
        assert!(!is_plain_text("end"));
        assert!(!is_plain_text("1 2\u{0}\u{0}3"));
    }
}
