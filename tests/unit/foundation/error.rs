use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TimewaveError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TimewaveError::invalid_easing("steps(4)")
            .to_string()
            .contains("invalid easing format: steps(4)")
    );
    assert!(
        TimewaveError::sampling("x")
            .to_string()
            .contains("sampling error:")
    );
    assert!(TimewaveError::render("x").to_string().contains("render error:"));
    assert!(
        TimewaveError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TimewaveError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
