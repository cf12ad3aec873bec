use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        SceneError::registry("x")
            .to_string()
            .contains("registry error:")
    );
    assert!(
        SceneError::cyclic_move("a", "b")
            .to_string()
            .starts_with("cyclic move:")
    );
    assert!(
        SceneError::cyclic_scene("a", "b")
            .to_string()
            .starts_with("cyclic scene:")
    );
}

#[test]
fn not_found_names_the_missing_thing() {
    let err = SceneError::not_found("node", "n42");
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "not found: node 'n42'");
    assert!(!SceneError::NotAFolder("n1".into()).is_not_found());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
