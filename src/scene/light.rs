use glam::{Affine3A, Mat4};
use uuid::Uuid;

use crate::resources::texture::{RenderTargetHandle, TextureHandle};

/// 阴影投射光源
///
/// 复用相机的成像模型：光源持有自己的透视投影参数和矩阵缓存，
/// 位置与朝向来自所挂载的节点。阴影 pass 以光源视角把场景深度
/// 渲染进 shadow_map，主相机 pass 再绑定光源矩阵与该深度纹理。
#[derive(Debug, Clone)]
pub struct ShadowLight {
    pub uuid: Uuid,

    // === 投影属性 ===
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    // === 阴影资源（后端分配）===
    /// 深度纹理，主 pass 作为阴影贴图采样
    pub shadow_map: Option<TextureHandle>,
    /// 阴影 pass 的离屏目标
    pub shadow_target: Option<RenderTargetHandle>,
    /// 阴影贴图边长（正方形）
    pub shadow_map_size: u32,

    // 缓存的矩阵 renderer只读
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Affine3A,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl ShadowLight {
    pub const DEFAULT_MAP_SIZE: u32 = 1024;

    /// 新建光源，fov 以度传入
    #[must_use]
    pub fn new(fov: f32, near: f32, far: f32) -> Self {
        let mut light = Self {
            uuid: Uuid::new_v4(),
            fov: fov.to_radians(),
            near,
            far,

            shadow_map: None,
            shadow_target: None,
            shadow_map_size: Self::DEFAULT_MAP_SIZE,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Affine3A::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };

        light.update_projection_matrix();
        light
    }

    /// 绑定后端分配的阴影贴图与离屏目标
    #[must_use]
    pub fn with_shadow_target(mut self, map: TextureHandle, target: RenderTargetHandle) -> Self {
        self.shadow_map = Some(map);
        self.shadow_target = Some(target);
        self
    }

    /// 投影参数变化后重建投影矩阵（阴影贴图为正方形，aspect 固定 1）
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, 1.0, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * Mat4::from(self.view_matrix);
    }

    /// 根据节点世界矩阵刷新视图与 VP 矩阵（阴影 pass 每次调用）
    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = world_transform.inverse();
        self.view_projection_matrix = self.projection_matrix * Mat4::from(self.view_matrix);
    }

    /// 纯视图矩阵（无投影），光源视角剔除用
    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> &Affine3A {
        &self.view_matrix
    }

    /// 光源 VP，主 pass 绑定为 light matrix
    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection_matrix
    }
}
