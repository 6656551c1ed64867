//! 遮挡剔除（时间域 GPU 查询）
//!
//! 每个几何体批次挂一个查询状态机 Idle → Querying → Idle。
//! 本帧返回的判定是上一次查询解析出的缓存值（至多落后一帧），
//! 同时推进状态机：收割已完成的查询，空闲下来就立刻补发新的，
//! 让查询始终在流水线里。共享同一批次的所有节点共享同一判定。
//!
//! 探针绘制关闭颜色和深度写入。test 过程会改写后端的写掩码、
//! 管线和帧 uniform，调用方画正式内容前必须恢复它们。
//! 想让判定有意义，调用方应按近到远的顺序送入节点。

use slotmap::SecondaryMap;

use crate::renderer::backend::{FrameUniforms, PipelineKind, QueryHandle, RenderBackend, WriteMask};
use crate::scene::{GeometryKey, NodeKey, Scene};

/// 单个批次的查询状态
#[derive(Debug, Clone, Copy, Default)]
struct QueryState {
    /// 后端查询槽，首次使用时创建，之后复用
    query: Option<QueryHandle>,
    in_flight: bool,
    /// 上一次解析出的判定
    occluded: bool,
}

/// 基于 GPU 可见性查询的遮挡估计器
#[derive(Default)]
pub struct OcclusionCuller {
    states: SecondaryMap<GeometryKey, QueryState>,
}

impl OcclusionCuller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 丢弃全部查询状态（场景几何大换血时调用）
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// 只读当前缓存判定，不推进状态机
    #[must_use]
    pub fn is_occluded(&self, geometry: GeometryKey) -> bool {
        self.states.get(geometry).is_some_and(|s| s.occluded)
    }

    /// 推进节点所属批次的查询状态机并返回缓存判定
    ///
    /// 返回 true 表示按上一次查询该批次被完全遮挡。没有几何体的
    /// 节点永远返回 false。
    pub fn test<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        scene: &Scene,
        key: NodeKey,
        uniforms: &FrameUniforms,
    ) -> bool {
        let Some(node) = scene.get_node(key) else {
            return false;
        };
        let Some(geometry_key) = node.geometry else {
            return false;
        };
        let Some(geometry) = scene.geometries.get(geometry_key) else {
            return false;
        };
        let Some(entry) = self.states.entry(geometry_key) else {
            return false;
        };
        let state = entry.or_default();

        // 探针不写任何通道
        backend.set_write_mask(WriteMask::empty());
        backend.bind_pipeline(PipelineKind::OcclusionProxy);
        backend.apply_frame_uniforms(uniforms);
        backend.set_world_matrix(node.transform.world_matrix_as_mat4());

        // 收割已完成的查询
        if state.in_flight
            && let Some(query) = state.query
            && let Some(passed) = backend.poll_query(query)
        {
            state.occluded = !passed;
            state.in_flight = false;
        }

        // 空闲就立刻补发，查询槽懒创建后复用
        if !state.in_flight {
            let query = *state.query.get_or_insert_with(|| backend.create_query());
            backend.begin_query(query);
            backend.draw(geometry);
            backend.end_query(query);
            state.in_flight = true;
        }

        state.occluded
    }
}
