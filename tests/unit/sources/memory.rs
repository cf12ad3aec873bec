use super::*;

fn image() -> SourceSpec {
    SourceSpec::new("image_source", "Image")
        .with_settings(serde_json::json!({"file": "logo.png"}))
        .with_size(320.0, 180.0)
}

#[test]
fn create_resolves_and_keeps_names_unique() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg.create_source(image()).unwrap();
    let b = reg.create_source(image()).unwrap();
    assert_ne!(a, b);
    assert_eq!(reg.resolve(&a).unwrap().name, "Image");
    assert_eq!(reg.resolve(&b).unwrap().name, "Image 2");
    assert_eq!(reg.source_ids(), vec![a, b]);
}

#[test]
fn empty_type_is_rejected() {
    let mut reg = InMemorySourceRegistry::new();
    let err = reg.create_source(SourceSpec::new(" ", "x")).unwrap_err();
    assert!(matches!(err, SceneError::Registry(_)));
    assert!(reg.is_empty());
}

#[test]
fn duplicate_copies_content_under_fresh_id() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg
        .create_source(image().with_filter(FilterDef::new("Blur", "blur_filter")))
        .unwrap();
    let b = reg.duplicate_source(&a).unwrap();
    let (da, db) = (reg.resolve(&a).unwrap(), reg.resolve(&b).unwrap());
    assert_eq!(da.type_id, db.type_id);
    assert_eq!(da.settings, db.settings);
    assert_eq!(da.filters, db.filters);
    assert_eq!(db.name, "Image 2");

    let missing = SourceId::from("nope");
    assert!(matches!(
        reg.duplicate_source(&missing),
        Err(SceneError::InvalidSource(_))
    ));
}

#[test]
fn release_is_idempotent() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg.create_source(image()).unwrap();
    reg.release_source(&a);
    reg.release_source(&a);
    assert!(reg.resolve(&a).is_none());
    assert_eq!(reg.len(), 0);
}

#[test]
fn appended_filters_get_unique_names() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg
        .create_source(image().with_filter(FilterDef::new("Blur", "blur_filter")))
        .unwrap();
    reg.append_filters(
        &a,
        &[
            FilterDef::new("Blur", "blur_filter"),
            FilterDef::new("Blur", "blur_filter"),
        ],
    )
    .unwrap();
    let names: Vec<String> = reg
        .resolve(&a)
        .unwrap()
        .filters
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Blur", "Blur 2", "Blur 3"]);
}

#[test]
fn settings_edits_are_visible_on_next_resolve() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg.create_source(image()).unwrap();
    let before = reg.resolve(&a).unwrap();
    reg.update_settings(&a, serde_json::json!({"file": "other.png"}))
        .unwrap();
    assert_ne!(before.settings, reg.resolve(&a).unwrap().settings);
}

#[test]
fn restore_rejects_duplicate_ids() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg.create_source(image()).unwrap();
    let desc = reg.resolve(&a).unwrap();
    assert!(reg.restore_source(desc).is_err());
}

#[test]
fn set_filters_replaces_the_stack() {
    let mut reg = InMemorySourceRegistry::new();
    let a = reg
        .create_source(image().with_filter(FilterDef::new("Blur", "blur")))
        .unwrap();
    reg.set_filters(&a, vec![FilterDef::new("Crop", "crop")])
        .unwrap();
    let names: Vec<String> = reg
        .resolve(&a)
        .unwrap()
        .filters
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Crop"]);
    assert!(reg.set_filters(&SourceId::from("ghost"), Vec::new()).is_err());
}
