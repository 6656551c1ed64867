//! Bounding sphere and frustum culling tests
//!
//! Tests for:
//! - Lazy bounding radius: computation, caching, explicit invalidation
//! - Radius accounting for rotation and non-uniform scale, not translation
//! - FrustumCulling policy verdicts (cone test, distance cutoff, visibility)
//! - Subtree pruning during render list construction

use glam::{Affine3A, Quat, Vec3};
use trellis::create_box;
use trellis::renderer::render_list::{
    FrustumCulling, NoCulling, RenderEntry, RenderList, Visibility, VisibilityPolicy, build_render_list,
};
use trellis::resources::GeometryBatch;
use trellis::scene::{NodeKey, Scene};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Unit cube corner distance from center.
const CUBE_RADIUS: f32 = 0.866_025_4;

fn add_cube(scene: &mut Scene, position: Vec3) -> NodeKey {
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    scene
        .build_node()
        .with_position(position.x, position.y, position.z)
        .with_geometry(geometry)
        .build()
}

/// Identity view: camera at origin looking down -Z.
fn camera_policy(fov: f32) -> FrustumCulling {
    FrustumCulling::new(Affine3A::IDENTITY, fov)
}

fn single_keys(list: &RenderList) -> Vec<NodeKey> {
    list.iter()
        .filter_map(|e| match e {
            RenderEntry::Single(k) => Some(*k),
            RenderEntry::Instanced { .. } => None,
        })
        .collect()
}

// ============================================================================
// Bounding Radius
// ============================================================================

#[test]
fn bounding_radius_of_unit_cube() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::ZERO);
    scene.update_matrix_world();

    let radius = scene.ensure_bounding_radius(key);
    assert!(approx_eq(radius, CUBE_RADIUS), "got {radius}");
}

#[test]
fn bounding_radius_ignores_translation() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::new(500.0, -300.0, 42.0));
    scene.update_matrix_world();

    // The sphere is centered at the node's world position; the radius must
    // come out the same as for a cube at the origin
    let radius = scene.ensure_bounding_radius(key);
    assert!(approx_eq(radius, CUBE_RADIUS), "got {radius}");
}

#[test]
fn bounding_radius_scales_with_node() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let key = scene.build_node().with_geometry(geometry).with_scale(2.0).build();
    scene.update_matrix_world();

    let radius = scene.ensure_bounding_radius(key);
    assert!(approx_eq(radius, 2.0 * CUBE_RADIUS), "got {radius}");
}

#[test]
fn bounding_radius_survives_rotation() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let key = scene
        .build_node()
        .with_geometry(geometry)
        .with_rotation(Quat::from_rotation_y(0.7))
        .build();
    scene.update_matrix_world();

    // A rotated cube still fits the same sphere
    let radius = scene.ensure_bounding_radius(key);
    assert!(approx_eq(radius, CUBE_RADIUS), "got {radius}");
}

#[test]
fn bounding_radius_is_cached_until_invalidated() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::ZERO);
    scene.update_matrix_world();

    assert!(scene.get_node(key).unwrap().bounding_radius().is_none());
    let first = scene.ensure_bounding_radius(key);
    assert_eq!(scene.get_node(key).unwrap().bounding_radius(), Some(first));

    // Scaling without invalidation keeps serving the stale cache
    scene.get_node_mut(key).unwrap().transform.scale = Vec3::splat(4.0);
    scene.update_matrix_world();
    assert!(approx_eq(scene.ensure_bounding_radius(key), first));

    // Explicit invalidation forces a recompute against the new world matrix
    scene.invalidate_bounds(key);
    assert!(scene.get_node(key).unwrap().bounding_radius().is_none());
    let recomputed = scene.ensure_bounding_radius(key);
    assert!(approx_eq(recomputed, 4.0 * CUBE_RADIUS), "got {recomputed}");
}

#[test]
fn bounding_radius_of_geometryless_node_is_zero() {
    let mut scene = Scene::new();
    let key = scene.build_node().build();
    scene.update_matrix_world();

    assert_eq!(scene.ensure_bounding_radius(key), 0.0);
    // Nothing to cache without geometry
    assert!(scene.get_node(key).unwrap().bounding_radius().is_none());
}

#[test]
fn bounding_radius_of_empty_geometry_is_zero() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(GeometryBatch::new(Vec::new(), Vec::new(), Vec::new()));
    let key = scene.build_node().with_geometry(geometry).build();
    scene.update_matrix_world();

    assert_eq!(scene.ensure_bounding_radius(key), 0.0);
}

#[test]
fn world_rotation_scale_leaves_cache_untouched() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::new(7.0, 8.0, 9.0));
    scene.update_matrix_world();

    let stripped = scene.world_rotation_scale(key).unwrap();
    assert_eq!(stripped.w_axis.truncate(), Vec3::ZERO);

    // The call returns a copy; the cached world matrix keeps its translation
    let world: Vec3 = scene.get_node(key).unwrap().transform.world_matrix().translation.into();
    assert_eq!(world, Vec3::new(7.0, 8.0, 9.0));
}

// ============================================================================
// FrustumCulling Policy Verdicts
// ============================================================================

#[test]
fn policy_keeps_node_ahead_of_camera() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::new(0.0, 0.0, -10.0));
    scene.update_matrix_world();

    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, key), Visibility::VISIBLE);
}

#[test]
fn policy_prunes_node_behind_camera() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::new(0.0, 0.0, 10.0));
    scene.update_matrix_world();

    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, key), Visibility::SKIP_ALL);
}

#[test]
fn policy_boundary_sphere_on_axis_never_culled() {
    // Sphere centered on the forward axis at depth < r must never be
    // culled, regardless of fov
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(create_box(4.0, 4.0, 4.0));
    let key = scene
        .build_node()
        .with_position(0.0, 0.0, -0.5)
        .with_geometry(geometry)
        .build();
    scene.update_matrix_world();

    for fov in [0.1, 0.5, 1.0, 2.5] {
        let mut policy = camera_policy(fov);
        assert_eq!(policy.visit(&mut scene, key), Visibility::VISIBLE, "fov {fov}");
    }
}

#[test]
fn policy_skips_draw_beyond_max_distance() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::new(0.0, 0.0, -2000.0));
    scene.update_matrix_world();

    // On-axis, so the cone keeps it; distance cutoff only skips the draw
    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, key), Visibility::SKIP_DRAW);

    let mut generous = camera_policy(1.0).with_max_distance(5000.0);
    assert_eq!(generous.visit(&mut scene, key), Visibility::VISIBLE);
}

#[test]
fn policy_prunes_invisible_node() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let key = scene
        .build_node()
        .with_position(0.0, 0.0, -5.0)
        .with_geometry(geometry)
        .invisible()
        .build();
    scene.update_matrix_world();

    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, key), Visibility::SKIP_ALL);
}

#[test]
fn policy_passes_geometryless_group_node() {
    let mut scene = Scene::new();
    // Group node far off-axis; it has no geometry so it cannot be culled
    let key = scene.build_node().with_position(9000.0, 0.0, 9000.0).build();
    scene.update_matrix_world();

    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, key), Visibility::VISIBLE);
}

#[test]
fn policy_culls_off_axis_unless_radius_reaches() {
    let mut scene = Scene::new();
    let small = add_cube(&mut scene, Vec3::new(200.0, 0.0, -1.0));

    let big_geometry = scene.add_geometry(create_box(600.0, 600.0, 600.0));
    let big = scene
        .build_node()
        .with_position(200.0, 0.0, -1.0)
        .with_geometry(big_geometry)
        .build();
    scene.update_matrix_world();

    let mut policy = camera_policy(1.0);
    assert_eq!(policy.visit(&mut scene, small), Visibility::SKIP_ALL);
    // Same center, but the huge radius pokes into the cone
    assert_eq!(policy.visit(&mut scene, big), Visibility::VISIBLE);
}

// ============================================================================
// Pruning During List Construction
// ============================================================================

#[test]
fn culled_parent_prunes_whole_subtree() {
    let mut scene = Scene::new();
    let behind = add_cube(&mut scene, Vec3::new(0.0, 0.0, 50.0));
    // Child would land in front of the camera, but its parent is pruned
    let child_geo = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let _child = scene
        .build_node()
        .with_position(0.0, 0.0, -60.0)
        .with_geometry(child_geo)
        .with_parent(behind)
        .build();
    let front = add_cube(&mut scene, Vec3::new(0.0, 0.0, -10.0));
    scene.update_matrix_world();

    let mut list = RenderList::new();
    let mut policy = camera_policy(1.0);
    build_render_list(&mut scene, &mut policy, &mut list);

    assert_eq!(single_keys(&list), vec![front]);
}

#[test]
fn distance_skipped_parent_keeps_children() {
    let mut scene = Scene::new();
    let far = add_cube(&mut scene, Vec3::new(0.0, 0.0, -2000.0));
    // Child's local offset brings it back inside the cutoff
    let child_geo = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let child = scene
        .build_node()
        .with_position(0.0, 0.0, 1500.0)
        .with_geometry(child_geo)
        .with_parent(far)
        .build();
    scene.update_matrix_world();

    let mut list = RenderList::new();
    let mut policy = camera_policy(1.0);
    build_render_list(&mut scene, &mut policy, &mut list);

    // Parent skipped (too far), child drawn at world z = -500
    assert_eq!(single_keys(&list), vec![child]);
}

#[test]
fn invisible_node_hides_subtree_without_culling() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let hidden = scene.build_node().invisible().build();
    let _child = scene
        .build_node()
        .with_geometry(geometry)
        .with_parent(hidden)
        .build();
    let shown = scene.build_node().with_geometry(geometry).build();
    scene.update_matrix_world();

    let mut list = RenderList::new();
    build_render_list(&mut scene, &mut NoCulling, &mut list);

    assert_eq!(single_keys(&list), vec![shown]);
}
