//! National Drug Code normalization.

/// Strip every character that is not an ASCII decimal digit.
///
/// `"12-345-6789"` and `"12 345 6789"` both normalize to `"123456789"`.
/// Input without digits normalizes to the empty string.
pub fn normalize_ndc(ndc: &str) -> String {
    ndc.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compare two NDCs ignoring formatting.
///
/// Empty normalized codes never match, so two codes made only of separators
/// are not considered equal.
pub fn ndc_matches(a: &str, b: &str) -> bool {
    let a = normalize_ndc(a);
    !a.is_empty() && a == normalize_ndc(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        assert_eq!(normalize_ndc("12-345-6789"), "123456789");
        assert_eq!(normalize_ndc(" 0002 3228 01 "), "0002322801");
        assert_eq!(normalize_ndc("NDC: 50580-0488-01"), "50580048801");
    }

    #[test]
    fn test_non_digit_input_is_empty() {
        assert_eq!(normalize_ndc(""), "");
        assert_eq!(normalize_ndc("amlodipine"), "");
        assert_eq!(normalize_ndc("--"), "");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_ndc("0093-7146-56");
        assert_eq!(normalize_ndc(&once), once);
    }

    #[test]
    fn test_ndc_matches() {
        assert!(ndc_matches("0093-7146-56", "0093714656"));
        assert!(!ndc_matches("0093-7146-56", "0093-7146-57"));
        assert!(!ndc_matches("--", ""));
    }
}
