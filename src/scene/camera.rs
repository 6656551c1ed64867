use std::borrow::Cow;

use glam::{Affine3A, Mat4};
use uuid::Uuid;

/// 透视相机组件
///
/// 相机只描述投影参数并缓存派生矩阵，位置与朝向来自所挂载
/// 节点的世界矩阵（相机沿自身 -Z 看）。
///
/// 注意 fov 是对角线视场角（弧度）：锥体剔除直接拿它当锥角用，
/// 投影矩阵也用同一个角度，保证剔除结果与成像一致偏保守。
#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,

    // === 投影属性 (Projection Only) ===
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    // 缓存的矩阵 renderer只读
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Affine3A,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl Camera {
    /// 默认对角线视场角（度）
    pub const DEFAULT_FOV: f32 = 125.0;
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 5000.0;

    /// 新建透视相机，fov 以度传入
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed("Camera"),
            fov: fov.to_radians(),
            aspect,
            near,
            far,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Affine3A::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };

        cam.update_projection_matrix();
        cam
    }

    /// 以默认参数创建相机 (fov 125°, near 0.1, far 5000)
    #[must_use]
    pub fn with_aspect(aspect: f32) -> Self {
        Self::new_perspective(Self::DEFAULT_FOV, aspect, Self::DEFAULT_NEAR, Self::DEFAULT_FAR)
    }

    /// 投影参数变化后重建投影矩阵
    pub fn update_projection_matrix(&mut self) {
        // glam 的 perspective_rh 为 WGPU/Vulkan 的 [0,1] 深度范围设计
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * Mat4::from(self.view_matrix);
    }

    /// 根据节点世界矩阵刷新视图与 VP 矩阵
    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;

        // 1. View Matrix = World Inverse（保持仿射形式，剔除在该空间进行）
        self.view_matrix = world_transform.inverse();

        // 2. VP
        self.view_projection_matrix = self.projection_matrix * Mat4::from(self.view_matrix);
    }

    /// 纯视图矩阵（无投影），锥体剔除用
    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> &Affine3A {
        &self.view_matrix
    }

    /// 视图投影矩阵，绘制用
    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection(&self) -> &Mat4 {
        &self.projection_matrix
    }
}
