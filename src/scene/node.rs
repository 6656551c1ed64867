use std::fmt;

use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, GeometryKey, LightKey, NodeKey};

/// Stable numeric identity of a node.
///
/// Unlike [`NodeKey`] (the arena slot, which is recycled after removal), a
/// `NodeId` is allocated once and never reused. It is the identity that
/// crosses engine boundaries: the picking bitmap encodes it into pixel
/// colors, and physics workers address nodes by it.
///
/// Ids start at 1; the raw value 0 is reserved and doubles as the background
/// value in id bitmaps ("no hit").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Reserved id meaning "not yet registered in a scene".
    pub const UNASSIGNED: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source.
///
/// Ids are handed out in increasing order starting at 1 and are never
/// reused, even after the node they were assigned to is removed. A scene
/// owns one allocator; passing an existing allocator to
/// [`Scene::with_allocator`](crate::scene::Scene::with_allocator) lets a
/// successor scene continue the same id space.
#[derive(Debug, Default)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next id, starting at 1.
    pub fn allocate(&mut self) -> NodeId {
        self.next += 1;
        NodeId(self.next)
    }
}

/// A minimal scene node containing only essential hot data.
///
/// # Design Principles
///
/// - Only keeps data that must be traversed every frame (hierarchy and transform)
/// - Heavy resources (geometry batches, cameras, lights) live in the Scene's
///   component maps; the node stores keys into them
/// - Improves CPU cache hit rate by keeping nodes small and contiguous
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional key of the parent node (None for root nodes)
/// - `children`: List of child node keys
///
/// # Identity
///
/// A node's [`NodeId`] is assigned when the node is inserted into a
/// [`Scene`](crate::scene::Scene) and stays with it for its whole life,
/// reparenting included.
#[derive(Debug, Clone)]
pub struct Node {
    // === Core Hierarchy ===
    /// Parent node key (None for root nodes)
    pub(crate) parent: Option<NodeKey>,
    /// Child node keys
    pub(crate) children: Vec<NodeKey>,

    // === Core Spatial Data ===
    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    // === Core State ===
    /// Visibility flag; an invisible node hides its whole subtree
    pub visible: bool,

    // === Identity ===
    pub(crate) id: NodeId,
    pub(crate) name: Option<String>,

    // === Components ===
    /// Drawable geometry (shared between nodes for instancing)
    pub geometry: Option<GeometryKey>,
    pub camera: Option<CameraKey>,
    pub light: Option<LightKey>,

    // === Cached Bounds ===
    /// Bounding sphere radius; negative means not computed yet
    pub(crate) bounding_radius: f32,
}

impl Node {
    /// Creates a new node with default transform and visibility.
    ///
    /// The node starts dirty, so the first hierarchy update always computes
    /// its matrices. Its id stays [`NodeId::UNASSIGNED`] until a scene
    /// inserts it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            id: NodeId::UNASSIGNED,
            name: None,
            geometry: None,
            camera: None,
            light: None,
            bounding_radius: -1.0,
        }
    }

    /// Returns the parent node key, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Returns a read-only slice of child node keys.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Returns the stable id assigned at scene insertion.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the scene-local name, if one was registered.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the cached bounding sphere radius, or None if it has not
    /// been computed since the last invalidation.
    #[inline]
    #[must_use]
    pub fn bounding_radius(&self) -> Option<f32> {
        (self.bounding_radius >= 0.0).then_some(self.bounding_radius)
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// This matrix transforms local coordinates to world coordinates.
    /// It is refreshed by the transform system during hierarchy updates.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
