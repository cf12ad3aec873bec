use super::*;
use crate::foundation::core::Vec2;
use crate::sources::memory::InMemorySourceRegistry;

fn graph() -> (SceneGraph, SceneId) {
    let mut g = SceneGraph::new(
        "Test",
        Canvas::default(),
        Box::new(InMemorySourceRegistry::new()),
    );
    let main = g.add_scene("Main").unwrap();
    g.take_changes();
    (g, main)
}

fn image(g: &mut SceneGraph, scene: &SceneId, name: &str) -> NodeId {
    g.add_source_item(
        scene,
        SourceSpec::new("image_source", name).with_size(100.0, 50.0),
        AddItemOptions::default(),
    )
    .unwrap()
}

#[test]
fn first_scene_becomes_active() {
    let mut g = SceneGraph::new(
        "Test",
        Canvas::default(),
        Box::new(InMemorySourceRegistry::new()),
    );
    let a = g.add_scene("A").unwrap();
    let b = g.add_scene("B").unwrap();
    assert_eq!(g.active_scene_id(), Some(&a));
    assert_eq!(g.scene_ids(), &[a.clone(), b.clone()]);
    assert!(g.source(&a.as_source()).unwrap().is_scene());

    let changes = g.take_changes();
    assert_eq!(changes.len(), 2);
    assert!(
        changes[0]
            .events
            .iter()
            .any(|e| matches!(e, SceneEvent::SceneSwitched { from: None, .. }))
    );
    assert!(g.take_changes().is_empty());
}

#[test]
fn add_item_rejects_unknown_source() {
    let (mut g, main) = graph();
    let err = g
        .add_item(&main, &SourceId::from("ghost"), AddItemOptions::default())
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidSource(_)));
    assert!(g.scene(&main).unwrap().is_empty());
    assert!(g.take_changes().is_empty());
}

#[test]
fn add_item_applies_placement_and_parent() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "Group").unwrap();
    let src = g
        .registry_mut()
        .create_source(SourceSpec::new("color_source", "Red"))
        .unwrap();
    let opts = AddItemOptions {
        placement: ItemPatch::position(Vec2::new(5.0, 6.0)),
        parent: Some(folder.clone()),
    };
    let item = g.add_item(&main, &src, opts).unwrap();
    let scene = g.scene(&main).unwrap();
    assert_eq!(scene.item(&item).unwrap().placement.position, Vec2::new(5.0, 6.0));
    assert_eq!(scene.folder(&folder).unwrap().children, vec![item]);
}

#[test]
fn nesting_a_scene_that_contains_the_target_is_cyclic() {
    let (mut g, a) = graph();
    let b = g.add_scene("B").unwrap();
    let c = g.add_scene("C").unwrap();
    g.add_nested_scene(&a, &b, AddItemOptions::default()).unwrap();
    g.add_nested_scene(&b, &c, AddItemOptions::default()).unwrap();
    g.take_changes();

    let err = g
        .add_nested_scene(&c, &a, AddItemOptions::default())
        .unwrap_err();
    assert!(matches!(err, SceneError::CyclicScene { .. }));
    let err = g
        .add_nested_scene(&a, &a, AddItemOptions::default())
        .unwrap_err();
    assert!(matches!(err, SceneError::CyclicScene { .. }));
    assert!(g.scene(&c).unwrap().is_empty());
    assert!(g.take_changes().is_empty());

    assert!(g.scene_contains(&a, &c));
    assert!(!g.scene_contains(&c, &a));
}

#[test]
fn nested_items_visit_each_scene_once() {
    let (mut g, a) = graph();
    let b = g.add_scene("B").unwrap();
    let inner = image(&mut g, &b, "Logo");
    let first = g.add_nested_scene(&a, &b, AddItemOptions::default()).unwrap();
    let second = g.add_nested_scene(&a, &b, AddItemOptions::default()).unwrap();

    let found: Vec<NodeId> = g
        .nested_items(&a)
        .unwrap()
        .into_iter()
        .map(|n| n.item)
        .collect();
    assert_eq!(found, vec![first, inner, second]);
}

#[test]
fn remove_node_releases_unreferenced_sources() {
    let (mut g, main) = graph();
    let item = image(&mut g, &main, "Logo");
    let src = g.scene(&main).unwrap().item(&item).unwrap().source_id.clone();
    let again = g.add_item(&main, &src, AddItemOptions::default()).unwrap();
    g.take_changes();

    g.remove_node(&main, &item).unwrap();
    assert!(g.source(&src).is_some());
    g.remove_node(&main, &again).unwrap();
    assert!(g.source(&src).is_none());

    let changes = g.take_changes();
    assert_eq!(changes.len(), 2);
    assert!(
        changes[1]
            .events
            .contains(&SceneEvent::SourceRemoved { source: src })
    );
}

#[test]
fn removing_unknown_node_is_silent() {
    let (mut g, main) = graph();
    g.remove_node(&main, &NodeId::from("nope")).unwrap();
    g.ungroup_folder(&main, &NodeId::from("nope")).unwrap();
    assert!(g.take_changes().is_empty());
}

#[test]
fn remove_scene_drops_nesting_items_and_switches_active() {
    let (mut g, a) = graph();
    let b = g.add_scene("B").unwrap();
    let nest = g.add_nested_scene(&b, &a, AddItemOptions::default()).unwrap();
    g.take_changes();

    g.remove_scene(&a).unwrap();
    assert!(g.scene(&a).is_none());
    assert!(!g.scene(&b).unwrap().contains(&nest));
    assert_eq!(g.active_scene_id(), Some(&b));
    assert!(g.source(&a.as_source()).is_none());
    assert_eq!(g.take_changes().len(), 1);

    let err = g.remove_scene(&b).unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
}

#[test]
fn duplicate_scene_copies_structure_with_fresh_ids() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "Group").unwrap();
    let item = image(&mut g, &main, "Logo");
    g.set_parent(&main, &item, Some(&folder)).unwrap();

    let copy = g.duplicate_scene(&main, "Main copy").unwrap();
    let original = g.scene(&main).unwrap();
    let dup = g.scene(&copy).unwrap();
    assert_eq!(dup.len(), 2);
    let dup_folder = dup.folders()[0];
    assert_ne!(dup_folder.id, folder);
    assert_eq!(dup_folder.name, "Group");
    let dup_item = dup.items()[0];
    assert_eq!(dup_item.parent_id.as_ref(), Some(&dup_folder.id));
    assert_eq!(
        dup_item.source_id,
        original.item(&item).unwrap().source_id
    );
}

#[test]
fn bulk_place_after_preserves_relative_order() {
    let (mut g, main) = graph();
    let a = image(&mut g, &main, "a");
    let b = image(&mut g, &main, "b");
    let c = image(&mut g, &main, "c");
    let d = image(&mut g, &main, "d");
    g.take_changes();

    g.move_nodes(&main, &[b.clone(), a.clone()], MoveTarget::After(d.clone()))
        .unwrap();
    assert_eq!(g.scene(&main).unwrap().tree_order(), vec![c.clone(), d.clone(), a.clone(), b.clone()]);

    g.move_nodes(&main, &[a.clone(), b.clone()], MoveTarget::Before(c.clone()))
        .unwrap();
    assert_eq!(g.scene(&main).unwrap().tree_order(), vec![a, b, c, d]);
    assert_eq!(g.take_changes().len(), 2);
}

#[test]
fn bulk_move_validates_everything_first() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "F").unwrap();
    let inner = g.add_folder_in(&main, "Inner", Some(&folder)).unwrap();
    let loose = image(&mut g, &main, "loose");
    let before = g.scene(&main).unwrap().tree_order();
    g.take_changes();

    let err = g
        .move_nodes(
            &main,
            &[loose.clone(), folder.clone()],
            MoveTarget::Parent(Some(inner)),
        )
        .unwrap_err();
    assert!(matches!(err, SceneError::CyclicMove { .. }));
    assert_eq!(g.scene(&main).unwrap().tree_order(), before);
    assert!(g.take_changes().is_empty());
}

#[test]
fn update_item_rejects_folders_and_reports_no_op() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "F").unwrap();
    let item = image(&mut g, &main, "x");
    g.take_changes();

    assert!(matches!(
        g.update_item(&main, &folder, ItemPatch::visible(false)),
        Err(SceneError::NotAnItem(_))
    ));
    g.update_item(&main, &item, ItemPatch::visible(true)).unwrap();
    assert!(g.take_changes().is_empty());
    g.update_item(&main, &item, ItemPatch::visible(false)).unwrap();
    assert_eq!(g.take_changes().len(), 1);
}

#[test]
fn nested_scene_items_are_canvas_sized() {
    let (mut g, a) = graph();
    let b = g.add_scene("B").unwrap();
    let nest = g.add_nested_scene(&a, &b, AddItemOptions::default()).unwrap();
    let item = g.scene(&a).unwrap().item(&nest).unwrap().clone();
    assert_eq!(g.item_source_size(&item), Size::new(1920.0, 1080.0));
}

#[test]
fn rename_folder_and_scene() {
    let (mut g, main) = graph();
    let folder = g.add_folder(&main, "F").unwrap();
    let item = image(&mut g, &main, "x");
    g.rename_folder(&main, &folder, "Renamed").unwrap();
    assert_eq!(g.scene(&main).unwrap().folder(&folder).unwrap().name, "Renamed");
    assert!(matches!(
        g.rename_folder(&main, &item, "nope"),
        Err(SceneError::NotAFolder(_))
    ));
    g.rename_scene(&main, "Stage").unwrap();
    assert_eq!(g.scene(&main).unwrap().name(), "Stage");
}

#[test]
fn group_nodes_takes_the_first_node_slot() {
    let (mut g, main) = graph();
    let a = image(&mut g, &main, "a");
    let b = image(&mut g, &main, "b");
    let c = image(&mut g, &main, "c");
    g.take_changes();

    let folder = g.group_nodes(&main, &[c.clone(), b.clone()], "Group").unwrap();
    let scene = g.scene(&main).unwrap();
    assert_eq!(scene.tree_order(), vec![a, folder.clone(), b.clone(), c.clone()]);
    assert_eq!(scene.folder(&folder).unwrap().children, vec![b, c]);
    assert_eq!(g.take_changes().len(), 1);

    let err = g.group_nodes(&main, &[NodeId::from("ghost")], "Empty").unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
}
