#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod physics;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use errors::TrellisError;
pub use physics::{PhysicsBridge, PhysicsCommand, PhysicsEndpoint, Smoothing, TransformUpdate};
pub use renderer::{
    FrameUniforms, FrustumCulling, IdMap, NoCulling, RenderBackend, RenderEntry, RenderList, Renderer,
    RendererSettings, Visibility, VisibilityPolicy,
};
pub use resources::{BatchKey, GeometryBatch, RenderTargetHandle, TextureHandle};
pub use resources::primitives::*;
pub use scene::{Camera, Node, NodeBuilder, NodeId, NodeKey, Scene, ShadowLight, Transform};
pub use utils::interner;
