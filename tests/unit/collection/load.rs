use super::*;
use crate::foundation::core::{Canvas, Vec2};
use crate::foundation::ids::{NodeId, SourceId};
use crate::scene::graph::AddItemOptions;
use crate::scene::node::ItemPatch;
use crate::sources::memory::InMemorySourceRegistry;
use crate::sources::registry::{FilterDef, SourceSpec};

fn populated() -> (SceneGraph, SceneId, SceneId) {
    let mut g = SceneGraph::new(
        "Show",
        Canvas::default(),
        Box::new(InMemorySourceRegistry::new()),
    );
    let live = g.add_scene("Live").unwrap();
    let brb = g.add_scene("BRB").unwrap();
    let folder = g.add_folder(&live, "Overlay").unwrap();
    g.add_source_item(
        &live,
        SourceSpec::new("image_source", "Logo").with_size(200.0, 100.0),
        AddItemOptions {
            placement: ItemPatch::position(Vec2::new(4.0, 8.0)),
            parent: Some(folder),
        },
    )
    .unwrap();
    g.add_source_item(
        &live,
        SourceSpec::new("browser_source", "Chat").with_filter(FilterDef::new("Key", "chroma_key")),
        AddItemOptions::default(),
    )
    .unwrap();
    g.add_nested_scene(&live, &brb, AddItemOptions::default())
        .unwrap();
    g.set_active_scene(&brb).unwrap();
    g.take_changes();
    (g, live, brb)
}

#[test]
fn save_then_load_preserves_structure() {
    let (g, live, brb) = populated();
    let def = g.to_def();
    def.validate().unwrap();
    assert_eq!(def.sources.len(), 2);
    assert!(def.sources.iter().all(|s| !s.is_scene()));

    let mut loaded = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new())).unwrap();
    assert_eq!(loaded.collection_id(), g.collection_id());
    assert_eq!(loaded.scene_ids(), &[live.clone(), brb.clone()]);
    assert_eq!(loaded.active_scene_id(), Some(&brb));

    let before = g.scene(&live).unwrap();
    let after = loaded.scene(&live).unwrap();
    assert_eq!(after.tree_order(), before.tree_order());
    assert_eq!(after.draw_order(), before.draw_order());
    for item in before.items() {
        assert_eq!(after.item(&item.id).unwrap().placement, item.placement);
    }
    assert!(loaded.is_scene_source(&brb.as_source()));

    let changes = loaded.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].events,
        vec![SceneEvent::CollectionLoaded {
            collection: g.collection_id().clone()
        }]
    );
}

#[test]
fn invalid_record_is_rejected_without_touching_the_registry() {
    let (g, _, _) = populated();
    let mut def = g.to_def();
    def.sources.clear();
    let err = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new())).unwrap_err();
    assert!(err.to_string().contains("missing source"));
}

#[test]
fn rotation_is_normalized_on_load() {
    let (g, live, _) = populated();
    let mut def = g.to_def();
    let target = def.scenes[0]
        .nodes
        .iter_mut()
        .find_map(|n| match &mut n.kind {
            NodeDefKind::Item { placement, .. } => Some((n.id.clone(), placement)),
            NodeDefKind::Folder { .. } => None,
        })
        .unwrap();
    target.1.rotation = -90.0;
    let id = target.0;

    let loaded = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new())).unwrap();
    let item = loaded.scene(&live).unwrap().item(&id).unwrap();
    assert_eq!(item.placement.rotation, 270.0);
}

#[test]
fn live_paste_origins_survive_a_round_trip() {
    let (mut g, live, _) = populated();
    let target = g.scene(&live).unwrap().items()[0].source_id.clone();
    g.paste_origins
        .insert("snap/origin".to_owned(), target.clone());
    g.paste_origins
        .insert("snap/gone".to_owned(), SourceId::from("somewhere"));
    let def = g.to_def();
    assert_eq!(def.paste_origins.len(), 1);
    let loaded = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new())).unwrap();
    assert_eq!(loaded.paste_origins.get("snap/origin"), Some(&target));
    assert!(!loaded.paste_origins.contains_key("snap/gone"));
}

#[test]
fn missing_active_scene_defaults_to_first() {
    let (g, live, _) = populated();
    let mut def = g.to_def();
    def.active_scene = None;
    def.scene_order.clear();
    let loaded = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new())).unwrap();
    assert_eq!(loaded.active_scene_id(), Some(&live));
    assert!(loaded.find_node(&NodeId::from("nope")).is_none());
}
