use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, SparseSecondaryMap};

use crate::resources::geometry::GeometryBatch;
use crate::scene::bounds;
use crate::scene::camera::Camera;
use crate::scene::light::ShadowLight;
use crate::scene::node::{Node, NodeId, NodeIdAllocator};
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, GeometryKey, LightKey, NodeKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// 节点变换回调
///
/// 通过 [`Scene::set_position`] / [`Scene::set_rotation`] 修改节点时触发，
/// 参数是节点 id 与修改后的完整位姿。直接写 transform 字段不会触发，
/// 物理桥接正是靠这一点把 worker 回写与出站通知区分开。
pub type TransformCallback = Box<dyn FnMut(NodeId, Vec3, Quat) + Send>;

/// 场景图结构
///
/// Scene 是纯数据层，存储场景图逻辑和组件数据。
/// 节点放在 SlotMap 里，另外维护两套稳定索引：
/// - NodeId（单调分配，永不复用）→ NodeKey，跨引擎边界的路由
/// - 字符串名字 → NodeKey，场景局部的命名查询
///
/// NodeKey 槽位会被 SlotMap 复用，NodeId 不会。
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeKey, Node>,
    pub root_nodes: Vec<NodeKey>,

    // ====组件/资源池====
    pub geometries: SlotMap<GeometryKey, GeometryBatch>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, ShadowLight>,

    pub active_camera: Option<NodeKey>,

    // ====稳定索引====
    ids: FxHashMap<NodeId, NodeKey>,
    names: FxHashMap<String, NodeKey>,
    id_allocator: NodeIdAllocator,

    // 变换回调（仅 setter 触发）
    transform_callbacks: SparseSecondaryMap<NodeKey, TransformCallback>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(NodeIdAllocator::new())
    }

    /// 用已有的 id 分配器建场景
    ///
    /// 把上一个场景的分配器传进来，id 空间就能跨场景延续，
    /// 旧场景发出的 id 不会在新场景里被复用。
    #[must_use]
    pub fn with_allocator(id_allocator: NodeIdAllocator) -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),

            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            geometries: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),

            active_camera: None,

            ids: FxHashMap::default(),
            names: FxHashMap::default(),
            id_allocator,

            transform_callbacks: SparseSecondaryMap::new(),
        }
    }

    /// 交出 id 分配器（场景销毁时移交给后继场景）
    #[must_use]
    pub fn into_allocator(self) -> NodeIdAllocator {
        self.id_allocator
    }

    /// 开始构建一个节点
    pub fn build_node(&mut self) -> NodeBuilder<'_> {
        NodeBuilder::new(self)
    }

    // ========================================================================
    // 节点增删 (Insert & Remove)
    // ========================================================================

    /// 添加一个节点到场景 (默认放在根节点)
    pub fn add_node(&mut self, node: Node) -> NodeKey {
        let key = self.insert_node(node);
        self.root_nodes.push(key);
        key
    }

    /// 添加一个节点并挂到指定父节点下
    pub fn add_to_parent(&mut self, child: Node, parent_key: NodeKey) -> NodeKey {
        let key = self.insert_node(child);

        // 建立父子关系
        if let Some(p) = self.nodes.get_mut(parent_key) {
            p.children.push(key);
        }
        if let Some(c) = self.nodes.get_mut(key) {
            c.parent = Some(parent_key);
        }

        key
    }

    /// 插入节点并登记稳定索引（id 在此分配）
    fn insert_node(&mut self, mut node: Node) -> NodeKey {
        if node.id.is_unassigned() {
            node.id = self.id_allocator.allocate();
        }
        let id = node.id;
        let name = node.name.clone();

        let key = self.nodes.insert(node);
        self.ids.insert(id, key);
        if let Some(name) = name {
            self.names.insert(name, key);
        }
        key
    }

    /// 移除节点 (递归移除所有子节点)
    ///
    /// 节点独占的组件（相机、光源）随之清理；几何体批次可能被
    /// 其他节点共享，保留在资源池里。NodeId 永久退役。
    pub fn remove_node(&mut self, key: NodeKey) {
        // 1. 先把它的 children 列表拿出来，避免借用冲突
        let children = if let Some(node) = self.nodes.get(key) {
            node.children.clone()
        } else {
            return;
        };

        // 2. 递归移除子节点
        for child in children {
            self.remove_node(child);
        }

        // 3. 处理父节点关系
        let parent_opt = self.nodes.get(key).and_then(|n| n.parent);

        if let Some(parent_key) = parent_opt {
            // 从父节点的 children 列表中移除自己
            if let Some(parent) = self.nodes.get_mut(parent_key)
                && let Some(pos) = parent.children.iter().position(|&x| x == key)
            {
                parent.children.remove(pos);
            }
        } else if let Some(pos) = self.root_nodes.iter().position(|&x| x == key) {
            // 如果是根节点，从 root_nodes 移除
            self.root_nodes.remove(pos);
        }

        // 4. 彻底删除数据并清理组件与索引
        if let Some(node) = self.nodes.remove(key) {
            if let Some(cam_key) = node.camera {
                self.cameras.remove(cam_key);
            }
            if let Some(light_key) = node.light {
                self.lights.remove(light_key);
            }
            self.ids.remove(&node.id);
            if let Some(name) = &node.name
                && self.names.get(name) == Some(&key)
            {
                self.names.remove(name);
            }
        }
        self.transform_callbacks.remove(key);
        if self.active_camera == Some(key) {
            self.active_camera = None;
        }
    }

    /// 核心逻辑：建立父子关系 (Attach)
    ///
    /// 先从旧父节点（或根列表）摘下，再挂到新父节点下。
    /// 子节点会被强制标记脏，下一次层级更新以新父矩阵重算世界矩阵。
    /// 节点的 NodeId 不受换父影响。
    pub fn attach(&mut self, child_key: NodeKey, parent_key: NodeKey) {
        if child_key == parent_key {
            log::warn!("Cannot attach node to itself!");
            return;
        }

        // 1. Detach from old
        let old_parent = self.nodes.get(child_key).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child_key)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child_key) {
            self.root_nodes.remove(i);
        }

        // 2. Attach to new
        if let Some(p) = self.nodes.get_mut(parent_key) {
            p.children.push(child_key);
        } else {
            log::error!("Parent node not found during attach!");
            // 恢复 child 到 root_nodes 防止数据丢失
            self.root_nodes.push(child_key);
            if let Some(c) = self.nodes.get_mut(child_key) {
                c.parent = None;
                c.transform.mark_dirty();
            }
            return;
        }

        // 3. Update child
        if let Some(c) = self.nodes.get_mut(child_key) {
            c.parent = Some(parent_key);
            c.transform.mark_dirty(); // 强制标记脏，确保矩阵更新
        }
    }

    // ========================================================================
    // 节点访问 (Access)
    // ========================================================================

    /// 获取只读引用
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// 获取可变引用 (用于修改 TRS)
    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// 由 NodeId 路由到当前 NodeKey
    ///
    /// 节点移除后返回 None，晚到的路由请求由调用方自行丢弃。
    #[must_use]
    pub fn node_by_id(&self, id: NodeId) -> Option<NodeKey> {
        self.ids.get(&id).copied()
    }

    /// 场景局部名字查询
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<NodeKey> {
        self.names.get(name).copied()
    }

    /// 注册（或覆盖）节点名字
    ///
    /// 同名重复注册时新节点胜出，旧节点失去名字索引。
    pub fn set_name(&mut self, key: NodeKey, name: impl Into<String>) {
        let name = name.into();
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        if let Some(old) = node.name.take()
            && self.names.get(&old) == Some(&key)
        {
            self.names.remove(&old);
        }
        node.name = Some(name.clone());
        self.names.insert(name, key);
    }

    // ========================================================================
    // 变换写入 (带回调通知)
    // ========================================================================

    /// 设置节点位置并触发变换回调
    pub fn set_position(&mut self, key: NodeKey, position: Vec3) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.transform.position = position;
        let id = node.id;
        let rotation = node.transform.rotation;
        if let Some(cb) = self.transform_callbacks.get_mut(key) {
            cb(id, position, rotation);
        }
    }

    /// 设置节点旋转并触发变换回调
    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.transform.rotation = rotation;
        let id = node.id;
        let position = node.transform.position;
        if let Some(cb) = self.transform_callbacks.get_mut(key) {
            cb(id, position, rotation);
        }
    }

    /// 设置节点缩放（缩放不参与变换回调）
    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.transform.scale = scale;
        }
    }

    /// 安装变换回调（同一节点重复安装会覆盖）
    pub fn set_transform_callback(&mut self, key: NodeKey, callback: TransformCallback) {
        self.transform_callbacks.insert(key, callback);
    }

    /// 移除变换回调
    pub fn clear_transform_callback(&mut self, key: NodeKey) {
        self.transform_callbacks.remove(key);
    }

    // ========================================================================
    // 矩阵更新流水线
    // ========================================================================

    /// 更新整个场景的世界矩阵
    /// 这是每帧渲染前必须调用的
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    /// 更新指定子树的世界矩阵
    /// 用于局部更新场景图的一部分
    pub fn update_subtree(&mut self, root_key: NodeKey) {
        transform_system::update_subtree(&mut self.nodes, root_key);
    }

    // ========================================================================
    // 包围球 (Lazy Bounding Sphere)
    // ========================================================================

    /// 取包围球半径，未缓存时计算并写入缓存
    ///
    /// 半径依赖当前缓存的世界矩阵，应在 update_matrix_world 之后调用。
    /// 没有几何体的节点返回 0.0（不缓存）。
    pub fn ensure_bounding_radius(&mut self, key: NodeKey) -> f32 {
        let Some(node) = self.nodes.get(key) else {
            return 0.0;
        };
        if node.bounding_radius >= 0.0 {
            return node.bounding_radius;
        }
        let Some(geometry) = node.geometry.and_then(|k| self.geometries.get(k)) else {
            return 0.0;
        };

        let radius = bounds::compute_bounding_radius(&node.transform.world_matrix, geometry);
        if let Some(node) = self.nodes.get_mut(key) {
            node.bounding_radius = radius;
        }
        radius
    }

    /// 使包围球缓存失效
    ///
    /// 几何体顶点或节点缩放变化不会自动失效缓存，由调用方
    /// 在合适的时机显式调用。
    pub fn invalidate_bounds(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.bounding_radius = -1.0;
        }
    }

    /// 世界空间位置（世界矩阵的平移分量），应在 update_matrix_world 之后读取
    #[must_use]
    pub fn world_position(&self, key: NodeKey) -> Option<Vec3> {
        self.nodes
            .get(key)
            .map(|n| n.transform.world_matrix.translation.into())
    }

    /// 去除平移的世界矩阵副本（包围球所在的空间）
    #[must_use]
    pub fn world_rotation_scale(&self, key: NodeKey) -> Option<Mat4> {
        self.nodes
            .get(key)
            .map(|n| bounds::rotation_scale_matrix(&n.transform.world_matrix))
    }

    // ========================================================================
    // 组件管理 API
    // ========================================================================

    /// 登记一份几何数据，返回可被多个节点共享的键
    pub fn add_geometry(&mut self, geometry: GeometryBatch) -> GeometryKey {
        self.geometries.insert(geometry)
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeKey {
        let mut node = Node::new();
        node.camera = Some(self.cameras.insert(camera));
        let key = self.add_node(node);
        if self.active_camera.is_none() {
            self.active_camera = Some(key);
        }
        key
    }

    pub fn add_camera_to_parent(&mut self, camera: Camera, parent: NodeKey) -> NodeKey {
        let mut node = Node::new();
        node.camera = Some(self.cameras.insert(camera));
        let key = self.add_to_parent(node, parent);
        if self.active_camera.is_none() {
            self.active_camera = Some(key);
        }
        key
    }

    pub fn add_light(&mut self, light: ShadowLight) -> NodeKey {
        let mut node = Node::new();
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    pub fn add_light_to_parent(&mut self, light: ShadowLight, parent: NodeKey) -> NodeKey {
        let mut node = Node::new();
        node.light = Some(self.lights.insert(light));
        self.add_to_parent(node, parent)
    }

    // ========================================================================
    // 组件查询 API (Component Query)
    // ========================================================================

    /// 获取主相机的 (Transform, Camera) 组合
    pub fn query_main_camera_bundle(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let node_key = self.active_camera?;
        self.query_camera_bundle(node_key)
    }

    pub fn query_camera_bundle(&mut self, node_key: NodeKey) -> Option<(&mut Transform, &mut Camera)> {
        let camera_key = self.nodes.get(node_key)?.camera?;
        let camera = self.cameras.get_mut(camera_key)?;
        let transform = &mut self.nodes.get_mut(node_key)?.transform;

        Some((transform, camera))
    }

    /// 查询指定节点的 Transform 和 ShadowLight
    pub fn query_light_bundle(&mut self, node_key: NodeKey) -> Option<(&mut Transform, &mut ShadowLight)> {
        let light_key = self.nodes.get(node_key)?.light?;
        let light = self.lights.get_mut(light_key)?;
        let transform = &mut self.nodes.get_mut(node_key)?.transform;
        Some((transform, light))
    }
}

/// 链式构建并插入节点
pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node, // 暂存正在构建的 Node 数据
    parent: Option<NodeKey>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            node: Node::new(),
            parent: None,
        }
    }

    // === 链式配置方法 ===

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.position = Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.node.transform.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.node.transform.scale = Vec3::splat(s);
        self
    }

    /// 设置父节点
    #[must_use]
    pub fn with_parent(mut self, parent: NodeKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 关联几何体 (传入共享的几何体键)
    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryKey) -> Self {
        self.node.geometry = Some(geometry);
        self
    }

    /// 注册场景局部名字
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.node.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn invisible(mut self) -> Self {
        self.node.visible = false;
        self
    }

    // === 终结方法 ===

    /// 完成构建，将 Node 插入 Scene，返回 NodeKey
    pub fn build(self) -> NodeKey {
        let NodeBuilder { scene, node, parent } = self;
        match parent {
            Some(parent_key) => scene.add_to_parent(node, parent_key),
            None => scene.add_node(node),
        }
    }
}
