//! 实例化数据打包
//!
//! 实例化绘制把同一几何体的所有成员的世界矩阵打成一条连续的
//! 逐实例顶点流，一次提交。矩阵按列主序排列，每个实例 16 个
//! f32，顺序与渲染条目里的成员顺序一致。

use glam::Mat4;

/// 逐实例世界矩阵的暂存缓冲，跨条目复用分配。
#[derive(Default)]
pub struct InstanceData {
    matrices: Vec<Mat4>,
}

impl InstanceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.matrices.clear();
    }

    pub fn push(&mut self, world: Mat4) {
        self.matrices.push(world);
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.matrices.len() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// 以裸 f32 切片视图交给后端上传（无拷贝）
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.matrices)
    }
}
