use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E0001.to_string(), "E0001");
    assert_eq!(ErrorCode::E1003.as_str(), "E1003");
}

#[test]
fn test_all_variants_described() {
    for code in ErrorCode::ALL {
        assert!(!code.description().is_empty(), "{code} has no description");
        assert_eq!(
            ErrorCode::ALL.iter().filter(|c| c.as_str() == code.as_str()).count(),
            1
        );
    }
}

#[test]
fn test_warning_prefix() {
    assert!(ErrorCode::W0001.is_warning());
    assert!(!ErrorCode::E0001.is_warning());
}
