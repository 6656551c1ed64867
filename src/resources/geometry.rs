//! 几何数据批次
//!
//! 渲染所需的 CPU 端顶点数据，不依赖 GPU 实现。
//! 平面布局（positions / normals / uvs 各自独立），索引可选。
//!
//! batch_key 是实例化合批的依据：构建渲染列表时，持有相同
//! batch_key 几何体的节点会被聚成一次实例化绘制。键为 None
//! 的几何体永远走独立绘制。

use glam::{Vec2, Vec3};
use wgpu::PrimitiveTopology;

use crate::resources::texture::TextureHandle;
use crate::utils::interner::{self, Symbol};

/// 实例化合批所用的键
///
/// 驻留后的字符串 Symbol，比较与哈希都是整数操作。
pub type BatchKey = Symbol;

/// 一份可绘制的几何数据
#[derive(Debug, Clone)]
pub struct GeometryBatch {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// 索引缓冲，None 时按顶点顺序绘制
    pub indices: Option<Vec<u32>>,
    pub topology: PrimitiveTopology,
    /// 绑定的纹理（句柄由后端分配）
    pub texture: Option<TextureHandle>,
    /// 合批键，None 表示不参与实例化合并
    pub batch_key: Option<BatchKey>,
}

impl GeometryBatch {
    #[must_use]
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>) -> Self {
        Self {
            positions,
            normals,
            uvs,
            indices: None,
            topology: PrimitiveTopology::TriangleList,
            texture: None,
            batch_key: None,
        }
    }

    // === 链式配置方法 ===

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    #[must_use]
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// 设置合批键（字符串会被驻留为 Symbol）
    #[must_use]
    pub fn with_batch_key(mut self, key: &str) -> Self {
        self.batch_key = Some(interner::intern(key));
        self
    }

    #[must_use]
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    // === 查询 ===

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> Option<usize> {
        self.indices.as_ref().map(Vec::len)
    }

    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// 实际提交给管线的元素个数（有索引取索引数，否则取顶点数）
    #[inline]
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.index_count().unwrap_or_else(|| self.vertex_count())
    }
}
