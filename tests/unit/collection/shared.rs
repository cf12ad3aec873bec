use super::*;
use crate::collection::config::StudioConfig;
use crate::scene::graph::AddItemOptions;
use crate::sources::registry::SourceSpec;

#[test]
fn concurrent_callers_are_serialized() {
    let handle = StudioHandle::new(Studio::new(StudioConfig::default()).unwrap());
    handle.with(|s| s.take_changes());

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for i in 0..5 {
                    handle.with(|s| {
                        let scene = s.graph().active_scene_id().unwrap().clone();
                        s.graph_mut()
                            .add_source_item(
                                &scene,
                                SourceSpec::new("color_source", format!("c{n}-{i}")),
                                AddItemOptions::default(),
                            )
                            .unwrap();
                    });
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let (items, change_sets) = handle.with(|s| {
        let items = s.graph().active_scene().unwrap().items().len();
        (items, s.take_changes().len())
    });
    assert_eq!(items, 20);
    assert_eq!(change_sets, 20);
}
