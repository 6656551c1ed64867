use glam::{Vec2, Vec3};

use crate::resources::geometry::GeometryBatch;

#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> GeometryBatch {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 24 vertices (4 per face)
    let positions = vec![
        // Front face (+Z)
        Vec3::new(-w, -h, d),
        Vec3::new(w, -h, d),
        Vec3::new(w, h, d),
        Vec3::new(-w, h, d),
        // Back face (-Z)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, -h, -d),
        // Top face (+Y)
        Vec3::new(-w, h, -d),
        Vec3::new(-w, h, d),
        Vec3::new(w, h, d),
        Vec3::new(w, h, -d),
        // Bottom face (-Y)
        Vec3::new(-w, -h, -d),
        Vec3::new(w, -h, -d),
        Vec3::new(w, -h, d),
        Vec3::new(-w, -h, d),
        // Right face (+X)
        Vec3::new(w, -h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, h, d),
        Vec3::new(w, -h, d),
        // Left face (-X)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, -h, d),
        Vec3::new(-w, h, d),
        Vec3::new(-w, h, -d),
    ];

    // Normals (all 4 vertices of each face share the same normal)
    let face_normals = [
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::X,
        Vec3::NEG_X,
    ];
    let normals: Vec<Vec3> = face_normals
        .iter()
        .flat_map(|&n| std::iter::repeat_n(n, 4))
        .collect();

    // UV coordinates (standard 0–1 range)
    let face_uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];
    let uvs: Vec<Vec2> = (0..6).flat_map(|_| face_uvs).collect();

    // Indices (2 triangles per face, counter-clockwise winding order CCW)
    // 0, 1, 2,  0, 2, 3
    let indices: Vec<u32> = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    GeometryBatch::new(positions, normals, uvs).with_indices(indices)
}
