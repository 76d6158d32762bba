use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Outcome of checking an admin request's API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    Granted,
    /// Key missing or wrong
    Denied,
    /// No key configured, admin endpoints are off
    Disabled,
}

/// Check the `x-api-key` value of an admin request against the configured key.
pub fn verify_api_key(expected: Option<&str>, provided: Option<&str>) -> AdminAccess {
    let Some(expected) = expected.filter(|key| !key.is_empty()) else {
        return AdminAccess::Disabled;
    };
    match provided {
        Some(provided) if constant_time_compare(expected, provided) => AdminAccess::Granted,
        _ => AdminAccess::Denied,
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
    fn test_verify_api_key() {
        assert_eq!(verify_api_key(Some("k3y"), Some("k3y")), AdminAccess::Granted);
        assert_eq!(verify_api_key(Some("k3y"), Some("nope")), AdminAccess::Denied);
        assert_eq!(verify_api_key(Some("k3y"), None), AdminAccess::Denied);
        assert_eq!(verify_api_key(None, Some("k3y")), AdminAccess::Disabled);
        assert_eq!(verify_api_key(Some(""), Some("")), AdminAccess::Disabled);
    }
}
