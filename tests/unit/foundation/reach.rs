use super::*;
use std::collections::HashMap;

fn graph(edges: &[(u32, &[u32])]) -> HashMap<u32, Vec<u32>> {
    edges.iter().map(|(k, v)| (*k, v.to_vec())).collect()
}

#[test]
fn walk_is_preorder_and_visits_diamonds_once() {
    // 1 -> 2 -> 4, 1 -> 3 -> 4
    let g = graph(&[(1, &[2, 3]), (2, &[4]), (3, &[4]), (4, &[])]);
    let order = walk_depth_first(1, |k| g.get(k).cloned().unwrap_or_default());
    assert_eq!(order, vec![1, 2, 4, 3]);
}

#[test]
fn walk_terminates_on_cycles() {
    let g = graph(&[(1, &[2]), (2, &[1, 3]), (3, &[])]);
    let order = walk_depth_first(1, |k| g.get(k).cloned().unwrap_or_default());
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn reaches_follows_transitive_edges() {
    let g = graph(&[(1, &[2]), (2, &[3]), (3, &[]), (4, &[1])]);
    let next = |k: &u32| g.get(k).cloned().unwrap_or_default();
    assert!(reaches(&1, &3, next));
    assert!(reaches(&4, &3, next));
    assert!(!reaches(&3, &1, next));
    assert!(reaches(&2, &2, next));
}
