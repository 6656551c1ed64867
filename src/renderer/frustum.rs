//! 圆锥视锥剔除
//!
//! 用一个以相机为顶点、沿视线方向展开的圆锥来近似视锥体，
//! 对包围球做快速的锥体相交测试。比平面视锥测试少很多分支，
//! 代价是锥体比真实视锥略宽（对角 fov），会放过四个角落附近的球。
//! 剔除是保守的：返回 true 的球一定完全在锥体外。

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

/// 包围球与视锥圆锥的相交测试
///
/// `view_center` 是包围球心的视空间坐标（相机看向 -Z），
/// `radius` 是球半径，`fov` 是圆锥全角（对角方向，弧度）。
/// 返回 true 表示球完全在锥体外，可以剔除。
#[must_use]
pub fn cone_cull(view_center: Vec3, radius: f32, fov: f32) -> bool {
    // 球体完全在相机背后
    if view_center.z >= radius {
        return true;
    }

    let center_len = view_center.length();
    if center_len <= f32::EPSILON {
        // 球心就在锥顶上，必然相交
        return false;
    }

    // 球心方向与视线轴 (-Z) 的夹角，减去半锥角得到出锥角度
    let cos_axis = (-view_center.z / center_len).clamp(-1.0, 1.0);
    let angle = cos_axis.acos() - fov * 0.5;

    if angle < FRAC_PI_2 {
        // 球心到锥面的最近距离是 sin(angle) * center_len
        angle.sin() * center_len >= radius
    } else {
        // 球心在锥顶后方的侧面区域，最近点退化为锥顶
        center_len >= radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOV: f32 = 1.0; // 弧度

    #[test]
    fn sphere_ahead_on_axis_is_kept() {
        assert!(!cone_cull(Vec3::new(0.0, 0.0, -10.0), 1.0, FOV));
    }

    #[test]
    fn sphere_behind_camera_is_culled() {
        assert!(cone_cull(Vec3::new(0.0, 0.0, 10.0), 1.0, FOV));
    }

    #[test]
    fn sphere_straddling_camera_plane_is_kept() {
        // z < radius，球体有一部分伸到相机前面
        assert!(!cone_cull(Vec3::new(0.0, 0.0, 0.5), 1.0, FOV));
    }

    #[test]
    fn behind_boundary_is_inclusive() {
        // z == radius 恰好整球贴在相机平面后，按剔除处理
        assert!(cone_cull(Vec3::new(0.0, 0.0, 1.0), 1.0, FOV));
    }

    #[test]
    fn sphere_at_apex_is_kept() {
        assert!(!cone_cull(Vec3::ZERO, 0.01, FOV));
    }

    #[test]
    fn sphere_far_off_axis_is_culled() {
        assert!(cone_cull(Vec3::new(100.0, 0.0, -1.0), 1.0, FOV));
    }

    #[test]
    fn big_radius_saves_off_axis_sphere() {
        assert!(!cone_cull(Vec3::new(100.0, 0.0, -1.0), 200.0, FOV));
    }

    #[test]
    fn wider_fov_keeps_more() {
        let center = Vec3::new(5.0, 0.0, -5.0);
        assert!(cone_cull(center, 0.5, 0.8));
        assert!(!cone_cull(center, 0.5, 2.0));
    }
}
