use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EngineError::not_found("x")
            .to_string()
            .contains("resource not found:")
    );
    assert!(
        EngineError::size_mismatch("x")
            .to_string()
            .contains("format size mismatch:")
    );
    assert!(
        EngineError::checksum("x")
            .to_string()
            .contains("checksum failure:")
    );
    assert!(
        EngineError::allocation("x")
            .to_string()
            .contains("allocation failure:")
    );
    assert!(
        EngineError::unsupported("x")
            .to_string()
            .contains("unsupported category:")
    );
    assert!(
        EngineError::stale("x")
            .to_string()
            .contains("stale bank handle:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EngineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
