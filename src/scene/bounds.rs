//! 包围球计算
//!
//! 节点的包围球在"去平移的世界空间"里求取：把只含旋转缩放的
//! 世界矩阵套到几何体所有顶点上，取离原点最远的距离作半径。
//! 这样剔除时只需再把世界平移变换到视图空间做球心。
//!
//! 半径是懒计算的，由 Scene 以负值哨兵缓存在节点上。

use glam::{Affine3A, Mat4, Vec3A};

use crate::resources::geometry::GeometryBatch;

/// 返回去除平移分量的世界矩阵副本 (Mat4)
///
/// 不会修改传入的矩阵，调用方拿到的是只含旋转和缩放的拷贝。
#[must_use]
pub fn rotation_scale_matrix(world: &Affine3A) -> Mat4 {
    let mut m = *world;
    m.translation = Vec3A::ZERO;
    Mat4::from(m)
}

/// 计算包围球半径：所有顶点经旋转缩放后到原点的最大距离
///
/// 空几何体返回 0.0。
#[must_use]
pub fn compute_bounding_radius(world: &Affine3A, geometry: &GeometryBatch) -> f32 {
    let mut m = *world;
    m.translation = Vec3A::ZERO;

    let mut max_sq = 0.0_f32;
    for &p in &geometry.positions {
        let v = m.transform_point3(p);
        max_sq = max_sq.max(v.length_squared());
    }
    max_sq.sqrt()
}
