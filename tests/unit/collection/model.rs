use super::*;

fn sample() -> CollectionDef {
    CollectionDef::from_reader(
        r#"{
          "id": "col",
          "name": "Show",
          "canvas": { "width": 1280, "height": 720 },
          "active_scene": "live",
          "scenes": [
            {
              "id": "live",
              "name": "Live",
              "nodes": [
                { "id": "grp", "kind": "folder", "name": "Overlay", "children": ["logo"] },
                { "id": "logo", "parent_id": "grp", "kind": "item", "source_id": "img",
                  "placement": { "position": { "x": 10.0, "y": 20.0 } } },
                { "id": "nest", "kind": "item", "source_id": "brb" }
              ]
            },
            { "id": "brb", "name": "Be right back" }
          ],
          "sources": [
            { "id": "img", "type_id": "image_source", "name": "Logo" }
          ]
        }"#
        .as_bytes(),
    )
    .unwrap()
}

fn live_nodes(def: &mut CollectionDef) -> &mut Vec<NodeDef> {
    &mut def.scenes[0].nodes
}

#[test]
fn sample_is_valid() {
    let def = sample();
    def.validate().unwrap();
    assert_eq!(def.ordered_scene_ids(), vec![SceneId::from("live"), SceneId::from("brb")]);
    let NodeDefKind::Item { placement, .. } = &def.scenes[0].nodes[1].kind else {
        panic!("expected item");
    };
    assert_eq!(placement.scale.x, 1.0);
    assert!(placement.visible);
}

#[test]
fn json_round_trip_is_stable() {
    let def = sample();
    let mut buf = Vec::new();
    def.to_writer(&mut buf).unwrap();
    let back = CollectionDef::from_reader(buf.as_slice()).unwrap();
    assert_eq!(back, def);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = CollectionDef::from_reader("{ \"id\": ".as_bytes()).unwrap_err();
    assert!(matches!(err, SceneError::Serde(_)));
}

#[test]
fn missing_source_is_rejected() {
    let mut def = sample();
    def.sources.clear();
    let err = def.validate().unwrap_err();
    assert!(err.to_string().contains("missing source 'img'"));
}

#[test]
fn scene_typed_source_entry_is_rejected() {
    let mut def = sample();
    def.sources[0].type_id = SCENE_SOURCE_TYPE.to_owned();
    assert!(matches!(def.validate(), Err(SceneError::Validation(_))));
}

#[test]
fn mismatched_children_are_rejected() {
    let mut def = sample();
    if let NodeDefKind::Folder { children, .. } = &mut live_nodes(&mut def)[0].kind {
        children.push(NodeId::from("nest"));
    }
    let err = def.validate().unwrap_err();
    assert!(err.to_string().contains("whose parent differs"));
}

#[test]
fn item_parent_is_not_a_folder() {
    let mut def = sample();
    live_nodes(&mut def)[2].parent_id = Some(NodeId::from("logo"));
    assert!(matches!(def.validate(), Err(SceneError::NotAFolder(_))));
}

#[test]
fn folder_cycle_is_rejected() {
    let mut def = sample();
    let nodes = live_nodes(&mut def);
    nodes.push(NodeDef {
        id: NodeId::from("a"),
        parent_id: Some(NodeId::from("b")),
        kind: NodeDefKind::Folder {
            name: "A".into(),
            children: vec![NodeId::from("b")],
        },
    });
    nodes.push(NodeDef {
        id: NodeId::from("b"),
        parent_id: Some(NodeId::from("a")),
        kind: NodeDefKind::Folder {
            name: "B".into(),
            children: vec![NodeId::from("a")],
        },
    });
    let err = def.validate().unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn nested_scene_cycle_is_rejected() {
    let mut def = sample();
    def.scenes[1].nodes.push(NodeDef {
        id: NodeId::from("back"),
        parent_id: None,
        kind: NodeDefKind::Item {
            source_id: SourceId::from("live"),
            placement: ItemPlacement::default(),
        },
    });
    assert!(matches!(def.validate(), Err(SceneError::CyclicScene { .. })));
}

#[test]
fn unknown_active_scene_and_bad_order_are_rejected() {
    let mut def = sample();
    def.active_scene = Some(SceneId::from("gone"));
    assert!(def.validate().unwrap_err().to_string().contains("active scene"));

    let mut def = sample();
    def.scene_order = vec![SceneId::from("live"), SceneId::from("live")];
    assert!(def.validate().unwrap_err().to_string().contains("scene_order"));
}

#[test]
fn duplicate_node_ids_across_scenes_are_rejected() {
    let mut def = sample();
    def.scenes[1].nodes.push(NodeDef {
        id: NodeId::from("logo"),
        parent_id: None,
        kind: NodeDefKind::Item {
            source_id: SourceId::from("img"),
            placement: ItemPlacement::default(),
        },
    });
    assert!(def.validate().unwrap_err().to_string().contains("duplicate node id"));
}

#[test]
fn empty_collection_and_zero_canvas_are_rejected() {
    let mut def = sample();
    def.canvas.width = 0;
    assert!(def.validate().is_err());

    let mut def = sample();
    def.scenes.clear();
    def.active_scene = None;
    assert!(def.validate().is_err());
}
