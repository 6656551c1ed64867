//! 场景图系统模块
//!
//! 管理场景层级结构和组件：
//! - Node: 场景节点（支持父子关系和变换）
//! - Transform: 变换组件（位置、旋转、缩放 + 脏检查）
//! - Scene: 场景容器（节点 Arena + 稳定索引）
//! - Camera: 相机组件
//! - ShadowLight: 阴影投射光源组件
//! - TransformSystem: 解耦的变换更新系统
//! - Bounds: 包围球计算

pub mod bounds;
pub mod camera;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

// 重新导出常用类型
pub use camera::Camera;
pub use light::ShadowLight;
pub use node::{Node, NodeId, NodeIdAllocator};
pub use scene::{NodeBuilder, Scene, TransformCallback};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeKey;
    pub struct GeometryKey;
    pub struct CameraKey;
    pub struct LightKey;
}
