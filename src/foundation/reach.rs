//! Reachability over implicit graphs.
//!
//! Folder nesting and nested-scene references are both checked for cycles the same way: walk
//! everything reachable from a start key through a child accessor, then ask whether the
//! candidate is in that set. The accessor is the only thing that differs between the two.

use std::collections::HashSet;
use std::hash::Hash;

/// Depth-first pre-order walk from `start`, visiting each key at most once.
///
/// `start` is the first element of the result. Children are visited in the order `next`
/// yields them, so the output is a stable discovery order even on diamond-shaped graphs.
pub(crate) fn walk_depth_first<K, I, F>(start: K, mut next: F) -> Vec<K>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = K>,
    F: FnMut(&K) -> I,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    // Stack of pending siblings; reversed on push so the first child pops first.
    let mut stack = vec![start];
    while let Some(k) = stack.pop() {
        if !seen.insert(k.clone()) {
            continue;
        }
        let mut children: Vec<K> = next(&k).into_iter().collect();
        children.reverse();
        out.push(k);
        stack.extend(children.into_iter().filter(|c| !seen.contains(c)));
    }
    out
}

/// Return `true` when `target` is reachable from `start` in one or more steps, or equals it.
pub(crate) fn reaches<K, I, F>(start: &K, target: &K, mut next: F) -> bool
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = K>,
    F: FnMut(&K) -> I,
{
    if start == target {
        return true;
    }
    let mut seen = HashSet::new();
    let mut stack = vec![start.clone()];
    while let Some(k) = stack.pop() {
        if !seen.insert(k.clone()) {
            continue;
        }
        for child in next(&k) {
            if &child == target {
                return true;
            }
            if !seen.contains(&child) {
                stack.push(child);
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/reach.rs"]
mod tests;
