//! 节点 id 位图（拾取）
//!
//! id 通道把每个节点的稳定 id 编码成一种纯色画到离屏目标上，
//! 回读后查任意像素就能得到命中的节点。id 的四个字节按小端序
//! 依次放进 RGBA 四个通道（每通道除以 255 归一化），背景清成
//! 全零，对应保留 id 0（无命中）。
//!
//! 位图分辨率与离屏目标一致，通常低于主画面以省回读带宽。

use rustc_hash::FxHashSet;

use crate::resources::texture::RenderTargetHandle;
use crate::scene::NodeId;

/// id 位图的默认分辨率（主画面的一半左右就够拾取用）
pub const DEFAULT_ID_MAP_SIZE: (u32, u32) = (960, 540);

/// 把节点 id 编码为 id 管线的输出颜色
///
/// 小端字节序：R 放最低字节，A 放最高字节。
#[must_use]
pub fn encode_id(id: NodeId) -> [f32; 4] {
    let b = id.to_raw().to_le_bytes();
    [
        f32::from(b[0]) / 255.0,
        f32::from(b[1]) / 255.0,
        f32::from(b[2]) / 255.0,
        f32::from(b[3]) / 255.0,
    ]
}

/// 从回读像素还原节点 id（[`encode_id`] 的逆变换）
#[must_use]
pub fn decode_id(pixel: [u8; 4]) -> NodeId {
    NodeId::from_raw(u32::from_le_bytes(pixel))
}

/// 一张可查询的 id 位图
///
/// 持有离屏目标句柄和最近一次回读的像素。像素在 id 通道
/// 重绘前是旧的，查询结果相应滞后。
pub struct IdMap {
    /// id 通道绘制到的离屏目标（宿主创建，尺寸须与位图一致）
    pub target: RenderTargetHandle,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IdMap {
    /// 以默认分辨率创建
    #[must_use]
    pub fn new(target: RenderTargetHandle) -> Self {
        let (width, height) = DEFAULT_ID_MAP_SIZE;
        Self::with_size(target, width, height)
    }

    #[must_use]
    pub fn with_size(target: RenderTargetHandle, width: u32, height: u32) -> Self {
        Self {
            target,
            width,
            height,
            pixels: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// 存入一次回读结果（紧凑 RGBA8，按行从左上角开始）
    pub fn store_pixels(&mut self, pixels: Vec<u8>) {
        self.pixels = pixels;
    }

    /// 查询某个像素命中的节点
    ///
    /// 越界或命中背景返回 None。
    #[must_use]
    pub fn id_at(&self, x: u32, y: u32) -> Option<NodeId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let p = self.pixels.get(offset..offset + 4)?;
        let id = decode_id([p[0], p[1], p[2], p[3]]);
        (!id.is_unassigned()).then_some(id)
    }

    /// 收集位图里出现的全部节点 id（背景除外）
    #[must_use]
    pub fn visible_ids(&self) -> FxHashSet<NodeId> {
        let mut ids = FxHashSet::default();
        for p in self.pixels.chunks_exact(4) {
            let id = decode_id([p[0], p[1], p[2], p[3]]);
            if !id.is_unassigned() {
                ids.insert(id);
            }
        }
        ids
    }
}
