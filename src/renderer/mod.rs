//! 渲染器
//!
//! 后端无关的绘制编排层。一次 pass 的流水线固定为：
//! 刷新场景矩阵 → 刷新相机（或光源）的 VP 缓存 → 以锥体剔除
//! 策略压平渲染列表 → 逐条目下发绘制。三种 pass 共用这套骨架：
//!
//! - `render_camera`：主相机画到表面，可选逐几何体遮挡探针
//! - `render_shadow`：光源视角的深度 pass，画进阴影贴图
//! - `render_id_map`：拾取用 id 位图，实例化组退化为逐成员纯色直绘
//!
//! 所有 GPU 操作都经由 [`RenderBackend`] trait 下发，渲染器本身
//! 不持有设备对象，便于在测试里换成录制后端。

pub mod backend;
pub mod frustum;
pub mod id_map;
pub mod instancing;
pub mod occlusion;
pub mod render_list;
pub mod settings;

pub use backend::{FrameUniforms, PipelineKind, QueryHandle, RenderBackend, RenderTarget, WriteMask};
pub use frustum::cone_cull;
pub use id_map::{DEFAULT_ID_MAP_SIZE, IdMap, decode_id, encode_id};
pub use instancing::InstanceData;
pub use occlusion::OcclusionCuller;
pub use render_list::{
    FrustumCulling, NoCulling, RenderEntry, RenderList, Visibility, VisibilityPolicy, build_render_list,
};
pub use settings::{DEFAULT_MAX_DRAW_DISTANCE, RendererSettings};

use glam::{Affine3A, Vec4};

use crate::errors::{Result, TrellisError};
use crate::scene::{NodeKey, Scene};

/// 绘制编排器
///
/// 持有后端和跨帧复用的工作缓冲（渲染列表、实例矩阵、
/// 遮挡查询状态）。场景数据不归它管，每次调用传入。
pub struct Renderer<B: RenderBackend> {
    pub backend: B,
    pub settings: RendererSettings,

    occlusion: OcclusionCuller,
    list: RenderList,
    instances: InstanceData,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(backend: B, settings: RendererSettings) -> Self {
        Self {
            backend,
            settings,
            occlusion: OcclusionCuller::new(),
            list: RenderList::new(),
            instances: InstanceData::new(),
        }
    }

    /// 最近一次 pass 压平出的渲染列表
    #[must_use]
    pub fn render_list(&self) -> &RenderList {
        &self.list
    }

    pub fn occlusion_mut(&mut self) -> &mut OcclusionCuller {
        &mut self.occlusion
    }

    /// 以场景的主相机渲染一帧
    pub fn render(&mut self, scene: &mut Scene) -> Result<()> {
        let camera_node = scene.active_camera.ok_or(TrellisError::NodeNotFound {
            context: "active camera",
        })?;
        self.render_camera(scene, camera_node)
    }

    // ========================================================================
    // 主相机 Pass
    // ========================================================================

    /// 以指定相机节点渲染一帧到表面
    pub fn render_camera(&mut self, scene: &mut Scene, camera_node: NodeKey) -> Result<()> {
        scene.update_matrix_world();

        let (uniforms, view, fov) = prepare_camera_frame(scene, camera_node)?;
        let mut policy = FrustumCulling::new(view, fov).with_max_distance(self.settings.max_draw_distance);
        render_list::build_render_list(scene, &mut policy, &mut self.list);

        self.backend.begin_frame(RenderTarget::Surface, self.settings.clear_color);
        self.backend.bind_pipeline(PipelineKind::Single);
        self.backend.set_write_mask(WriteMask::all());
        self.backend.apply_frame_uniforms(&uniforms);

        let use_occlusion = self.settings.occlusion_culling;
        self.draw_list(scene, &uniforms, PipelineKind::Single, WriteMask::all(), use_occlusion);

        self.backend.end_frame();
        Ok(())
    }

    // ========================================================================
    // 阴影 Pass
    // ========================================================================

    /// 以光源视角渲染深度到其阴影贴图
    ///
    /// 顺带刷新光源的 VP 缓存，主 pass 绑定的 light matrix
    /// 就来自这里。遮挡探针在深度 pass 无意义，始终关闭。
    pub fn render_shadow(&mut self, scene: &mut Scene, light_node: NodeKey) -> Result<()> {
        scene.update_matrix_world();

        let node = scene.get_node(light_node).ok_or(TrellisError::NodeNotFound {
            context: "shadow pass light node",
        })?;
        let light_key = node.light.ok_or(TrellisError::ComponentMissing {
            component: "ShadowLight",
        })?;
        let world = node.transform.world_matrix;

        let light = scene.lights.get_mut(light_key).ok_or(TrellisError::ComponentMissing {
            component: "ShadowLight",
        })?;
        let target = light
            .shadow_target
            .ok_or(TrellisError::TargetMissing("shadow map target"))?;
        light.update_view_projection(&world);

        let uniforms = FrameUniforms::new(*light.view_projection(), world.translation.into());
        let view = *light.view_matrix();
        let fov = light.fov;
        let far = light.far;

        let mut policy = FrustumCulling::new(view, fov).with_max_distance(far);
        render_list::build_render_list(scene, &mut policy, &mut self.list);

        // 深度清到 1.0（最远），颜色通道对深度目标无意义
        self.backend.begin_frame(RenderTarget::Offscreen(target), Vec4::ONE);
        self.backend.bind_pipeline(PipelineKind::Depth);
        self.backend.set_write_mask(WriteMask::DEPTH);
        self.backend.apply_frame_uniforms(&uniforms);

        self.draw_list(scene, &uniforms, PipelineKind::Depth, WriteMask::DEPTH, false);

        self.backend.end_frame();
        Ok(())
    }

    // ========================================================================
    // Id 位图 Pass（拾取）
    // ========================================================================

    /// 把每个可见节点的 id 画成纯色，回读进 `id_map`
    ///
    /// 背景清成全零（id 0，无命中）。实例化组无法给成员单独的
    /// 输出颜色，这个 pass 里逐成员直绘。
    pub fn render_id_map(&mut self, scene: &mut Scene, camera_node: NodeKey, id_map: &mut IdMap) -> Result<()> {
        scene.update_matrix_world();

        let (uniforms, view, fov) = prepare_camera_frame(scene, camera_node)?;
        let mut policy = FrustumCulling::new(view, fov).with_max_distance(self.settings.max_draw_distance);
        render_list::build_render_list(scene, &mut policy, &mut self.list);

        self.backend
            .begin_frame(RenderTarget::Offscreen(id_map.target), Vec4::ZERO);
        self.backend.bind_pipeline(PipelineKind::Id);
        self.backend.set_write_mask(WriteMask::all());
        self.backend.apply_frame_uniforms(&uniforms);

        let Self { backend, list, .. } = self;
        for entry in list.iter() {
            match entry {
                RenderEntry::Single(key) => draw_id_node(backend, scene, *key),
                RenderEntry::Instanced { nodes, .. } => {
                    for &member in nodes {
                        draw_id_node(backend, scene, member);
                    }
                }
            }
        }

        self.backend.end_frame();
        id_map.store_pixels(self.backend.read_pixels(id_map.target));
        Ok(())
    }

    // ========================================================================
    // 绘制循环
    // ========================================================================

    /// 下发当前渲染列表
    ///
    /// `base` 是本 pass 的基础管线，实例化条目和遮挡探针切走后
    /// 都会切回它并重放 uniform。`mask` 是本 pass 的写掩码。
    fn draw_list(
        &mut self,
        scene: &Scene,
        uniforms: &FrameUniforms,
        base: PipelineKind,
        mask: WriteMask,
        use_occlusion: bool,
    ) {
        let Self {
            backend,
            occlusion,
            list,
            instances,
            ..
        } = self;
        let bind_textures = matches!(base, PipelineKind::Single);

        for entry in list.iter() {
            match entry {
                RenderEntry::Single(key) => {
                    let Some(node) = scene.get_node(*key) else {
                        continue;
                    };
                    let Some(geometry_key) = node.geometry else {
                        continue;
                    };
                    let Some(geometry) = scene.geometries.get(geometry_key) else {
                        log::warn!("Node {:?} refers to missing Geometry {geometry_key:?}", node.id());
                        continue;
                    };

                    if use_occlusion {
                        let occluded = occlusion.test(backend, scene, *key, uniforms);
                        // 探针动过管线、掩码和 uniform，先恢复
                        backend.bind_pipeline(base);
                        backend.set_write_mask(mask);
                        backend.apply_frame_uniforms(uniforms);
                        if occluded {
                            continue;
                        }
                    }

                    backend.set_world_matrix(node.transform.world_matrix_as_mat4());
                    if bind_textures && let Some(texture) = geometry.texture {
                        backend.bind_texture(texture);
                    }
                    backend.draw(geometry);
                }

                RenderEntry::Instanced { nodes, .. } => {
                    // 组员共享同一几何体，取第一个活着的成员的
                    let Some(geometry) = nodes
                        .iter()
                        .find_map(|&k| scene.get_node(k))
                        .and_then(|n| n.geometry)
                        .and_then(|k| scene.geometries.get(k))
                    else {
                        continue;
                    };

                    instances.clear();
                    for &member in nodes {
                        if let Some(node) = scene.get_node(member) {
                            instances.push(node.transform.world_matrix_as_mat4());
                        }
                    }
                    if instances.is_empty() {
                        continue;
                    }

                    backend.bind_pipeline(PipelineKind::Instanced);
                    backend.set_write_mask(mask);
                    backend.apply_frame_uniforms(uniforms);
                    if bind_textures && let Some(texture) = geometry.texture {
                        backend.bind_texture(texture);
                    }
                    backend.draw_instanced(geometry, instances.as_floats(), instances.count());

                    // 切回基础管线
                    backend.bind_pipeline(base);
                    backend.apply_frame_uniforms(uniforms);
                }
            }
        }
    }
}

/// 刷新相机 VP 缓存并组装本帧 uniform
///
/// 返回 (uniform, 视图矩阵, 对角 fov)，后两者喂给剔除策略。
/// 场景里第一个带阴影贴图的光源会被绑定进 uniform。
fn prepare_camera_frame(scene: &mut Scene, camera_node: NodeKey) -> Result<(FrameUniforms, Affine3A, f32)> {
    let node = scene.get_node(camera_node).ok_or(TrellisError::NodeNotFound {
        context: "camera pass node",
    })?;
    let camera_key = node.camera.ok_or(TrellisError::ComponentMissing { component: "Camera" })?;
    let world = node.transform.world_matrix;

    // 阴影绑定：取第一个配好阴影贴图的光源
    let light_binding = scene
        .lights
        .values()
        .find_map(|l| l.shadow_map.map(|map| (*l.view_projection(), map)));

    let camera = scene
        .cameras
        .get_mut(camera_key)
        .ok_or(TrellisError::ComponentMissing { component: "Camera" })?;
    camera.update_view_projection(&world);

    let mut uniforms = FrameUniforms::new(*camera.view_projection(), world.translation.into());
    if let Some((light_matrix, shadow_map)) = light_binding {
        uniforms = uniforms.with_shadow(light_matrix, shadow_map);
    }

    Ok((uniforms, *camera.view_matrix(), camera.fov))
}

/// id pass 里画一个节点：先设 id 颜色再下发
fn draw_id_node<B: RenderBackend>(backend: &mut B, scene: &Scene, key: NodeKey) {
    let Some(node) = scene.get_node(key) else {
        return;
    };
    let Some(geometry) = node.geometry.and_then(|k| scene.geometries.get(k)) else {
        return;
    };

    backend.set_id_color(id_map::encode_id(node.id()));
    backend.set_world_matrix(node.transform.world_matrix_as_mat4());
    backend.draw(geometry);
}
