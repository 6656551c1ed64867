//! 位姿平滑
//!
//! 物理步进频率通常低于渲染帧率，直接回写会让节点一跳一跳地走。
//! 平滑层把入站更新存成目标位姿，每帧让节点向目标推进一个固定
//! 比例：位置线性插值，旋转球面插值，两者用同一个系数。
//!
//! 目标不会因为"到达"而消失，后续更新直接覆盖旧目标；只有节点
//! 本身被移除时才清掉对应目标。

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::scene::{NodeId, Scene};

/// 每帧向目标推进的比例，0.25 在 60fps 下约 90ms 收敛过半
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.25;

/// 一个节点的目标位姿
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothTarget {
    pub position: Vec3,
    pub rotation: Quat,
}

/// 按节点 id 索引的平滑目标集
pub struct Smoothing {
    targets: FxHashMap<NodeId, SmoothTarget>,
    /// 每帧推进比例，(0, 1]，1.0 等价于直接回写
    pub factor: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self::new()
    }
}

impl Smoothing {
    #[must_use]
    pub fn new() -> Self {
        Self::with_factor(DEFAULT_SMOOTHING_FACTOR)
    }

    #[must_use]
    pub fn with_factor(factor: f32) -> Self {
        Self {
            targets: FxHashMap::default(),
            factor,
        }
    }

    /// 登记（或覆盖）一个节点的目标位姿
    pub fn push_target(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        self.targets.insert(id, SmoothTarget { position, rotation });
    }

    #[must_use]
    pub fn target(&self, id: NodeId) -> Option<&SmoothTarget> {
        self.targets.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 每帧调用：所有被跟踪的节点向各自目标推进一步
    ///
    /// 直接写 transform 字段，影子状态脏检查会捕捉到改动。
    /// 已移除节点的目标顺手清理。
    pub fn tick(&mut self, scene: &mut Scene) {
        let factor = self.factor;
        self.targets.retain(|&id, target| {
            let Some(key) = scene.node_by_id(id) else {
                return false;
            };
            let Some(node) = scene.get_node_mut(key) else {
                return false;
            };

            let transform = &mut node.transform;
            transform.position = transform.position.lerp(target.position, factor);
            transform.rotation = transform.rotation.slerp(target.rotation, factor);
            true
        });
    }
}
