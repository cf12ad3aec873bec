use super::*;
use crate::foundation::core::Canvas;
use crate::scene::graph::AddItemOptions;
use crate::sources::memory::InMemorySourceRegistry;
use crate::sources::registry::{FilterDef, SourceSpec};

fn graph() -> (SceneGraph, SceneId) {
    let mut g = SceneGraph::new(
        "Copy",
        Canvas::default(),
        Box::new(InMemorySourceRegistry::new()),
    );
    let main = g.add_scene("Main").unwrap();
    (g, main)
}

fn image(g: &mut SceneGraph, scene: &SceneId, name: &str) -> NodeId {
    g.add_source_item(
        scene,
        SourceSpec::new("image_source", name)
            .with_filter(FilterDef::new("Sharpen", "sharpness_filter")),
        AddItemOptions::default(),
    )
    .unwrap()
}

#[test]
fn folder_brings_subtree_once() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "F").unwrap();
    let a = image(&mut g, &main, "a");
    g.set_parent(&main, &a, Some(&folder)).unwrap();
    let b = image(&mut g, &main, "b");

    let snap = ClipboardSnapshot::capture(&g, &main, &[a.clone(), folder, b]).unwrap();
    assert_eq!(snap.nodes.len(), 3);
    assert_eq!(snap.nodes[0].parent, None);
    assert_eq!(snap.nodes[1].parent, Some(0));
    assert_eq!(snap.nodes[2].parent, None);
    assert_eq!(snap.sources.len(), 2);
    assert_eq!(snap.sources[0].filters[0].name, "Sharpen");
    assert_eq!(snap.origin_collection, *g.collection_id());
    snap.validate().unwrap();
}

#[test]
fn shared_source_is_listed_once() {
    let (mut g, main) = graph();
    let a = image(&mut g, &main, "a");
    let src = g.scene(&main).unwrap().item(&a).unwrap().source_id.clone();
    let b = g.add_item(&main, &src, AddItemOptions::default()).unwrap();

    let snap = ClipboardSnapshot::capture(&g, &main, &[a, b]).unwrap();
    assert_eq!(snap.sources.len(), 1);
    assert_eq!(snap.sources[0].origin_id, src);
}

#[test]
fn nested_scenes_are_captured_dependencies_first() {
    let (mut g, main) = graph();
    let inner = g.add_scene("Inner").unwrap();
    let middle = g.add_scene("Middle").unwrap();
    image(&mut g, &inner, "deep");
    g.add_nested_scene(&middle, &inner, AddItemOptions::default())
        .unwrap();
    g.add_nested_scene(&middle, &inner, AddItemOptions::default())
        .unwrap();
    let top = g
        .add_nested_scene(&main, &middle, AddItemOptions::default())
        .unwrap();

    let snap = ClipboardSnapshot::capture(&g, &main, &[top]).unwrap();
    let order: Vec<&SceneId> = snap.scenes.iter().map(|s| &s.origin_id).collect();
    assert_eq!(order, vec![&inner, &middle]);
    assert_eq!(snap.scenes[1].nodes.len(), 2);
    assert_eq!(snap.sources.len(), 1);
    assert!(matches!(
        snap.nodes[0].kind,
        SnapshotNodeKind::Item {
            source: SourceRef::Scene(1),
            ..
        }
    ));
}

#[test]
fn unknown_ids_are_ignored() {
    let (g, main) = graph();
    let snap = ClipboardSnapshot::capture(&g, &main, &[NodeId::from("gone")]).unwrap();
    assert!(snap.is_empty());
    assert!(ClipboardSnapshot::capture(&g, &SceneId::from("nope"), &[]).is_err());
}

#[test]
fn filter_capture_includes_folder_items() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "F").unwrap();
    let a = image(&mut g, &main, "a");
    g.set_parent(&main, &a, Some(&folder)).unwrap();
    image(&mut g, &main, "outside");

    let fs = FilterSnapshot::capture(&g, &main, &[folder]).unwrap();
    assert_eq!(fs.stacks.len(), 1);
    assert_eq!(fs.stacks[0][0].type_id, "sharpness_filter");
}
