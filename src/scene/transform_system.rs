//! 变换系统 (Transform System)
//!
//! 负责场景图的矩阵层级更新，与 Scene 解耦以避免借用冲突。
//! 只借用 nodes SlotMap 和根节点列表。
//!
//! 核心规则：节点世界矩阵 = 父世界矩阵 × 自身局部矩阵。
//! 父节点的世界矩阵发生变化时，即使子节点自身不脏，
//! 子节点的世界矩阵也会被强制重算。

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeKey;
use crate::scene::node::Node;

/// 更新整个场景层级的世界矩阵
///
/// 使用显式栈替代递归调用，避免深层级场景的栈溢出风险，
/// 同时减少重复借用开销。每帧渲染前调用一次。
pub fn update_hierarchy(nodes: &mut SlotMap<NodeKey, Node>, roots: &[NodeKey]) {
    // 工作栈：(节点, 父世界矩阵, 父是否变化)
    let mut stack: Vec<(NodeKey, Affine3A, bool)> = Vec::with_capacity(64);

    // 初始化：所有根节点入栈（逆序保持处理顺序）
    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    propagate(nodes, &mut stack);
}

/// 从指定节点开始向下强制刷新子树
///
/// 以父节点当前缓存的世界矩阵为基准，常用于 attach 之后的局部刷新。
pub fn update_subtree(nodes: &mut SlotMap<NodeKey, Node>, root: NodeKey) {
    // 获取父节点的世界矩阵（如果有的话）
    let parent_world = if let Some(node) = nodes.get(root) {
        if let Some(parent) = node.parent {
            nodes
                .get(parent)
                .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix)
        } else {
            Affine3A::IDENTITY
        }
    } else {
        return;
    };

    // 子树根强制重算（parent_changed = true）
    let mut stack = vec![(root, parent_world, true)];
    propagate(nodes, &mut stack);
}

/// 栈驱动的世界矩阵传播
fn propagate(nodes: &mut SlotMap<NodeKey, Node>, stack: &mut Vec<(NodeKey, Affine3A, bool)>) {
    while let Some((key, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(key) else {
            continue;
        };

        // 1. 更新局部矩阵
        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        // 2. 更新世界矩阵
        if world_needs_update {
            let new_world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        // 3. 收集子节点信息（避免二次借用）
        let current_world = node.transform.world_matrix;
        let children_count = node.children.len();

        // 4. 将子节点压入栈（逆序以保持处理顺序）
        for i in (0..children_count).rev() {
            if let Some(node) = nodes.get(key)
                && let Some(&child) = node.children.get(i)
            {
                stack.push((child, current_world, world_needs_update));
            }
        }
    }
}
