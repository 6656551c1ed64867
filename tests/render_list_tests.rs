//! Render list construction tests
//!
//! Tests for:
//! - Depth-first traversal order of singleton entries
//! - Batch-key grouping into instanced entries (first-seen key order)
//! - Single-member groups degrading to singleton entries
//! - skip_draw / skip_subtree acting independently
//! - Buffer reuse across builds

use std::collections::HashMap;

use glam::Vec3;
use trellis::renderer::render_list::{
    NoCulling, RenderEntry, RenderList, Visibility, VisibilityPolicy, build_render_list,
};
use trellis::resources::GeometryBatch;
use trellis::scene::{NodeKey, Scene};
use trellis::utils::interner;

// ============================================================================
// Helpers
// ============================================================================

fn triangle() -> GeometryBatch {
    GeometryBatch::new(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        vec![Vec3::Z, Vec3::Z, Vec3::Z],
        vec![glam::Vec2::ZERO, glam::Vec2::X, glam::Vec2::Y],
    )
}

fn add_drawable(scene: &mut Scene, parent: Option<NodeKey>) -> NodeKey {
    let geometry = scene.add_geometry(triangle());
    let mut builder = scene.build_node().with_geometry(geometry);
    if let Some(parent) = parent {
        builder = builder.with_parent(parent);
    }
    builder.build()
}

fn add_keyed_drawable(scene: &mut Scene, batch_key: &str) -> NodeKey {
    let geometry = scene.add_geometry(triangle().with_batch_key(batch_key));
    scene.build_node().with_geometry(geometry).build()
}

fn build(scene: &mut Scene) -> RenderList {
    let mut list = RenderList::new();
    build_render_list(scene, &mut NoCulling, &mut list);
    list
}

/// Records every visit and serves per-node scripted verdicts.
#[derive(Default)]
struct ScriptedPolicy {
    visited: Vec<NodeKey>,
    verdicts: HashMap<NodeKey, Visibility>,
}

impl VisibilityPolicy for ScriptedPolicy {
    fn visit(&mut self, _scene: &mut Scene, key: NodeKey) -> Visibility {
        self.visited.push(key);
        self.verdicts.get(&key).copied().unwrap_or(Visibility::VISIBLE)
    }
}

// ============================================================================
// Traversal Order
// ============================================================================

#[test]
fn empty_scene_builds_empty_list() {
    let mut scene = Scene::new();
    let list = build(&mut scene);
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

#[test]
fn singletons_appear_in_depth_first_order() {
    let mut scene = Scene::new();
    let root = add_drawable(&mut scene, None);
    let a = add_drawable(&mut scene, Some(root));
    let a_child = add_drawable(&mut scene, Some(a));
    let b = add_drawable(&mut scene, Some(root));

    let list = build(&mut scene);

    let expected: Vec<RenderEntry> = [root, a, a_child, b].iter().map(|&k| RenderEntry::Single(k)).collect();
    assert_eq!(list.entries, expected);
}

#[test]
fn geometryless_nodes_are_traversed_but_not_listed() {
    let mut scene = Scene::new();
    let group = scene.build_node().build();
    let geometry = scene.add_geometry(triangle());
    let child = scene.build_node().with_geometry(geometry).with_parent(group).build();

    let list = build(&mut scene);
    assert_eq!(list.entries, vec![RenderEntry::Single(child)]);
}

// ============================================================================
// Batch Grouping
// ============================================================================

#[test]
fn shared_batch_key_becomes_instanced_entry() {
    let mut scene = Scene::new();
    let a = add_keyed_drawable(&mut scene, "crate");
    let b = add_keyed_drawable(&mut scene, "crate");
    let c = add_keyed_drawable(&mut scene, "crate");

    let list = build(&mut scene);

    assert_eq!(list.len(), 1);
    match &list.entries[0] {
        RenderEntry::Instanced { key, nodes } => {
            assert_eq!(*key, interner::intern("crate"));
            // Members keep traversal order
            assert_eq!(nodes.as_slice(), &[a, b, c]);
        }
        other => panic!("expected instanced entry, got {other:?}"),
    }
}

#[test]
fn lone_member_group_degrades_to_singleton() {
    let mut scene = Scene::new();
    let only = add_keyed_drawable(&mut scene, "barrel");

    let list = build(&mut scene);
    assert_eq!(list.entries, vec![RenderEntry::Single(only)]);
}

#[test]
fn groups_follow_singletons_in_first_seen_order() {
    let mut scene = Scene::new();
    let plain_a = add_drawable(&mut scene, None);
    let crate_a = add_keyed_drawable(&mut scene, "crate");
    let plain_b = add_drawable(&mut scene, None);
    let barrel = add_keyed_drawable(&mut scene, "barrel");
    let crate_b = add_keyed_drawable(&mut scene, "crate");

    let list = build(&mut scene);

    // Keyless singletons first (traversal order), then grouped output in
    // first-seen key order: "crate" before "barrel"
    assert_eq!(list.len(), 4);
    assert_eq!(list.entries[0], RenderEntry::Single(plain_a));
    assert_eq!(list.entries[1], RenderEntry::Single(plain_b));
    match &list.entries[2] {
        RenderEntry::Instanced { key, nodes } => {
            assert_eq!(*key, interner::intern("crate"));
            assert_eq!(nodes.as_slice(), &[crate_a, crate_b]);
        }
        other => panic!("expected crate group, got {other:?}"),
    }
    assert_eq!(list.entries[3], RenderEntry::Single(barrel));
}

#[test]
fn distinct_keys_stay_separate_groups() {
    let mut scene = Scene::new();
    let a1 = add_keyed_drawable(&mut scene, "a");
    let b1 = add_keyed_drawable(&mut scene, "b");
    let a2 = add_keyed_drawable(&mut scene, "a");
    let b2 = add_keyed_drawable(&mut scene, "b");

    let list = build(&mut scene);

    assert_eq!(list.len(), 2);
    match (&list.entries[0], &list.entries[1]) {
        (RenderEntry::Instanced { nodes: first, .. }, RenderEntry::Instanced { nodes: second, .. }) => {
            assert_eq!(first.as_slice(), &[a1, a2]);
            assert_eq!(second.as_slice(), &[b1, b2]);
        }
        other => panic!("expected two groups, got {other:?}"),
    }
}

// ============================================================================
// Policy Bits
// ============================================================================

#[test]
fn skip_draw_excludes_node_but_visits_children() {
    let mut scene = Scene::new();
    let root = add_drawable(&mut scene, None);
    let child = add_drawable(&mut scene, Some(root));

    let mut policy = ScriptedPolicy::default();
    policy.verdicts.insert(root, Visibility::SKIP_DRAW);

    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut policy, &mut list);

    assert_eq!(list.entries, vec![RenderEntry::Single(child)]);
    assert_eq!(policy.visited, vec![root, child]);
}

#[test]
fn skip_subtree_alone_still_draws_node() {
    let mut scene = Scene::new();
    let root = add_drawable(&mut scene, None);
    let _child = add_drawable(&mut scene, Some(root));

    let mut policy = ScriptedPolicy::default();
    policy.verdicts.insert(
        root,
        Visibility {
            skip_draw: false,
            skip_subtree: true,
        },
    );

    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut policy, &mut list);

    // Root drawn, child never reached
    assert_eq!(list.entries, vec![RenderEntry::Single(root)]);
    assert_eq!(policy.visited, vec![root]);
}

#[test]
fn skip_all_prunes_draw_and_children() {
    let mut scene = Scene::new();
    let root = add_drawable(&mut scene, None);
    let _child = add_drawable(&mut scene, Some(root));
    let sibling = add_drawable(&mut scene, None);

    let mut policy = ScriptedPolicy::default();
    policy.verdicts.insert(root, Visibility::SKIP_ALL);

    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut policy, &mut list);

    assert_eq!(list.entries, vec![RenderEntry::Single(sibling)]);
    assert_eq!(policy.visited, vec![root, sibling]);
}

#[test]
fn every_reached_node_is_visited_exactly_once() {
    let mut scene = Scene::new();
    let root = add_drawable(&mut scene, None);
    let a = add_drawable(&mut scene, Some(root));
    let b = add_drawable(&mut scene, Some(root));
    let c = add_drawable(&mut scene, Some(b));

    let mut policy = ScriptedPolicy::default();
    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut policy, &mut list);

    assert_eq!(policy.visited, vec![root, a, b, c]);
}

// ============================================================================
// Buffer Reuse
// ============================================================================

#[test]
fn rebuild_replaces_previous_entries() {
    let mut scene = Scene::new();
    let first = add_drawable(&mut scene, None);
    let second = add_drawable(&mut scene, None);

    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut NoCulling, &mut list);
    assert_eq!(list.len(), 2);

    // Hide one node and rebuild into the same list
    scene.get_node_mut(first).unwrap().visible = false;
    build_render_list(&mut scene, &mut NoCulling, &mut list);

    assert_eq!(list.entries, vec![RenderEntry::Single(second)]);
}

#[test]
fn identical_builds_are_deterministic() {
    let mut scene = Scene::new();
    for _ in 0..3 {
        add_keyed_drawable(&mut scene, "crate");
        add_drawable(&mut scene, None);
    }

    let first = build(&mut scene);
    let second = build(&mut scene);
    assert_eq!(first.entries, second.entries);
}
