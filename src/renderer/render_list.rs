//! 渲染列表构建
//!
//! 把场景树压平成一串有序的绘制条目。深度优先遍历，每个节点
//! 先问可见性策略要一个两位判定（跳过绘制 / 跳过子树），
//! 带批次键的几何体先按键聚集，遍历结束后再按首见顺序落入列表：
//! 只有一个成员的键退化成单体条目，两个以上合成一个实例化条目。
//!
//! 列表不做距离排序。遮挡剔除需要的近到远顺序由调用方通过
//! 场景组织或自定义策略保证。

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::renderer::frustum;
use crate::renderer::settings::DEFAULT_MAX_DRAW_DISTANCE;
use crate::resources::geometry::BatchKey;
use crate::scene::{NodeKey, Scene};

// ============================================================================
// 可见性判定
// ============================================================================

/// 单个节点的遍历判定，两个标志位各自独立。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// 本节点的几何体不进入渲染列表
    pub skip_draw: bool,
    /// 不再深入本节点的子树
    pub skip_subtree: bool,
}

impl Visibility {
    /// 正常绘制并继续遍历
    pub const VISIBLE: Self = Self {
        skip_draw: false,
        skip_subtree: false,
    };

    /// 本节点不画，子树照常遍历
    pub const SKIP_DRAW: Self = Self {
        skip_draw: true,
        skip_subtree: false,
    };

    /// 整棵子树剪掉
    pub const SKIP_ALL: Self = Self {
        skip_draw: true,
        skip_subtree: true,
    };
}

/// 遍历期间逐节点咨询的可见性策略
///
/// 策略可以读写场景（比如按需计算包围球缓存），
/// 每次 [`build_render_list`] 调用对每个到达的节点恰好咨询一次。
pub trait VisibilityPolicy {
    fn visit(&mut self, scene: &mut Scene, key: NodeKey) -> Visibility;
}

/// 不剔除，只遵守节点的可见标志。
pub struct NoCulling;

impl VisibilityPolicy for NoCulling {
    fn visit(&mut self, scene: &mut Scene, key: NodeKey) -> Visibility {
        match scene.get_node(key) {
            Some(node) if node.visible => Visibility::VISIBLE,
            _ => Visibility::SKIP_ALL,
        }
    }
}

/// 相机剔除策略：圆锥测试在前，距离截断在后。
///
/// 圆锥测试失败的节点连同子树一起剪掉（原始内容里子级几何
/// 都在父级包围球附近，这是便宜且足够的近似）；超出
/// `max_distance` 的节点只是不画，子树继续。没有几何体的
/// 节点直接放行，留给子级自己判定。
pub struct FrustumCulling {
    /// 相机的视图矩阵（世界 → 视空间）
    pub view: Affine3A,
    /// 对角视场角，弧度
    pub fov: f32,
    /// 视空间距离截断
    pub max_distance: f32,
}

impl FrustumCulling {
    #[must_use]
    pub fn new(view: Affine3A, fov: f32) -> Self {
        Self {
            view,
            fov,
            max_distance: DEFAULT_MAX_DRAW_DISTANCE,
        }
    }

    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }
}

impl VisibilityPolicy for FrustumCulling {
    fn visit(&mut self, scene: &mut Scene, key: NodeKey) -> Visibility {
        let Some(node) = scene.get_node(key) else {
            return Visibility::SKIP_ALL;
        };
        if !node.visible {
            return Visibility::SKIP_ALL;
        }
        if node.geometry.is_none() {
            return Visibility::VISIBLE;
        }

        let world_center: Vec3 = node.transform.world_matrix.translation.into();
        let radius = scene.ensure_bounding_radius(key);
        let view_center = self.view.transform_point3(world_center);

        if frustum::cone_cull(view_center, radius, self.fov) {
            return Visibility::SKIP_ALL;
        }
        if view_center.length() > self.max_distance {
            return Visibility::SKIP_DRAW;
        }
        Visibility::VISIBLE
    }
}

// ============================================================================
// 渲染列表
// ============================================================================

/// 列表里的一个绘制条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEntry {
    /// 单独一次绘制
    Single(NodeKey),
    /// 同一批次键下的成员合成一次实例化绘制
    Instanced {
        key: BatchKey,
        nodes: SmallVec<[NodeKey; 8]>,
    },
}

/// 压平后的绘制序列，内部缓冲可跨帧复用
///
/// 先是遍历顺序的无键单体，然后按批次键首见顺序排列的
/// 分组条目（单成员的组已退化成单体）。
#[derive(Default)]
pub struct RenderList {
    pub entries: Vec<RenderEntry>,

    // ====跨帧复用的工作缓冲====
    groups: Vec<(BatchKey, SmallVec<[NodeKey; 8]>)>,
    group_index: FxHashMap<BatchKey, usize>,
    stack: Vec<NodeKey>,
}

impl RenderList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.groups.clear();
        self.group_index.clear();
        self.stack.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderEntry> {
        self.entries.iter()
    }

    /// 按批次键聚集一个成员，首见的键分配新组
    fn push_grouped(&mut self, batch_key: BatchKey, node: NodeKey) {
        let groups = &mut self.groups;
        let idx = *self.group_index.entry(batch_key).or_insert_with(|| {
            groups.push((batch_key, SmallVec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(node);
    }

    /// 遍历结束后把聚集的组落入条目列表
    fn flush_groups(&mut self) {
        for (key, nodes) in self.groups.drain(..) {
            if nodes.len() == 1 {
                // 单成员退化为普通绘制
                self.entries.push(RenderEntry::Single(nodes[0]));
            } else {
                self.entries.push(RenderEntry::Instanced { key, nodes });
            }
        }
        self.group_index.clear();
    }
}

impl<'a> IntoIterator for &'a RenderList {
    type Item = &'a RenderEntry;
    type IntoIter = std::slice::Iter<'a, RenderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// 深度优先压平场景树
///
/// `out` 作为输出参数传入，便于调用方跨帧复用其内部分配。
/// 节点的世界矩阵必须已经刷新（见
/// [`Scene::update_matrix_world`]），策略按需读取矩阵和包围球。
pub fn build_render_list<P: VisibilityPolicy>(scene: &mut Scene, policy: &mut P, out: &mut RenderList) {
    out.clear();

    // 栈借出来用，结束后归还
    let mut stack = std::mem::take(&mut out.stack);
    stack.extend(scene.root_nodes.iter().rev().copied());

    while let Some(key) = stack.pop() {
        let visit = policy.visit(scene, key);
        if visit.skip_draw && visit.skip_subtree {
            continue;
        }

        let Some(node) = scene.get_node(key) else {
            continue;
        };

        if !visit.skip_subtree {
            stack.extend(node.children().iter().rev().copied());
        }

        if visit.skip_draw {
            continue;
        }
        let Some(geometry_key) = node.geometry else {
            continue;
        };

        let batch_key = scene.geometries.get(geometry_key).and_then(|g| g.batch_key);
        match batch_key {
            Some(batch_key) => out.push_grouped(batch_key, key),
            None => out.entries.push(RenderEntry::Single(key)),
        }
    }

    out.flush_groups();
    out.stack = stack;
}
