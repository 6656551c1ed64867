//! 核心资源定义模块
//!
//! 包含渲染所需的核心数据结构，不依赖于 GPU 实现：
//! - GeometryBatch: 几何数据批次（顶点、索引、合批键）
//! - TextureHandle / RenderTargetHandle: 后端资源句柄
//! - primitives: 内置几何体（盒、平面）

pub mod geometry;
pub mod primitives;
pub mod texture;

// 重新导出常用类型
pub use geometry::{BatchKey, GeometryBatch};
pub use texture::{RenderTargetHandle, TextureHandle};
