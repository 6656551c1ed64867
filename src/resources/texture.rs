//! 纹理与渲染目标句柄
//!
//! 引擎核心不持有 GPU 纹理对象，只通过句柄引用后端创建的资源。
//! 句柄由 RenderBackend 在资源创建时分配，数据层仅做路由，
//! 同一句柄可以被任意多个几何体批次引用。

/// GPU 纹理句柄
///
/// 绑定到绘制时经 [`RenderBackend::bind_texture`] 传递，
/// 阴影 pass 产出的深度纹理也用它在主 pass 里回绑。
///
/// [`RenderBackend::bind_texture`]: crate::renderer::RenderBackend::bind_texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// 离屏渲染目标句柄
///
/// 颜色与深度附件的组合由后端管理，引擎侧只负责把 pass
/// 导向正确的目标（阴影贴图、ID 位图等）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u32);

impl RenderTargetHandle {
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
