use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented admin key against the configured one.
///
/// No configured key means admin routes are open (local development).
pub fn is_authorized(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (None, _) => true,
        (Some(expected), Some(provided)) => constant_time_compare(expected, provided),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_is_authorized() {
        assert!(is_authorized(None, None));
        assert!(is_authorized(None, Some("anything")));
        assert!(is_authorized(Some("key"), Some("key")));
        assert!(!is_authorized(Some("key"), Some("nope")));
        assert!(!is_authorized(Some("key"), None));
    }
}
