//! Render backend abstraction.
//!
//! The renderer core is backend-agnostic: every pass issues its work through
//! the [`RenderBackend`] trait and never touches the GPU directly. A host
//! embeds the engine by implementing this trait on top of its own device
//! layer; the test suite drives the same passes with recording fakes.
//!
//! State carried between calls (current pipeline, write mask, frame
//! uniforms) lives in the backend. The renderer re-applies whatever it
//! changed mid-pass, so backends may treat each setter as "latch until
//! overwritten".

use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};

use crate::resources::geometry::GeometryBatch;
use crate::resources::texture::{RenderTargetHandle, TextureHandle};

bitflags! {
    /// Which output channels a draw is allowed to write.
    ///
    /// Occlusion probes run with an empty mask so they affect neither color
    /// nor depth; ordinary draws run with both bits set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct WriteMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// Handle to a backend-owned occlusion query slot.
///
/// Created once per geometry via [`RenderBackend::create_query`] and reused
/// across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryHandle(pub u32);

/// Destination of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The presentation surface (swapchain image).
    Surface,
    /// A host-created offscreen target, e.g. a shadow map or an id bitmap.
    Offscreen(RenderTargetHandle),
}

/// The fixed set of pipelines the render passes switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Base forward pipeline, one world matrix per draw.
    Single,
    /// Forward pipeline reading per-instance world matrices from a buffer.
    Instanced,
    /// Depth-only pipeline for shadow map rendering.
    Depth,
    /// Flat-color pipeline for id bitmap rendering.
    Id,
    /// Cheap proxy pipeline used for occlusion probes.
    OcclusionProxy,
}

/// Per-pass uniforms applied once per [`RenderBackend::apply_frame_uniforms`]
/// and shared by every draw until the next application.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    /// Combined view-projection matrix of the pass camera (or light).
    pub view_projection: Mat4,
    /// World-space position of the viewpoint.
    pub view_position: Vec3,
    /// View-projection of the shadow-casting light, when shadows are bound.
    pub light_matrix: Option<Mat4>,
    /// Depth texture produced by the shadow pass, when shadows are bound.
    pub shadow_map: Option<TextureHandle>,
}

impl FrameUniforms {
    #[must_use]
    pub fn new(view_projection: Mat4, view_position: Vec3) -> Self {
        Self {
            view_projection,
            view_position,
            light_matrix: None,
            shadow_map: None,
        }
    }

    /// Binds shadow data so the base pipeline can sample the shadow map.
    #[must_use]
    pub fn with_shadow(mut self, light_matrix: Mat4, shadow_map: TextureHandle) -> Self {
        self.light_matrix = Some(light_matrix);
        self.shadow_map = Some(shadow_map);
        self
    }
}

/// The contract between the renderer core and a concrete device layer.
///
/// Call order per pass: `begin_frame`, then any number of pipeline binds,
/// uniform applications and draws, then `end_frame`. Queries follow
/// `create_query` → (`begin_query` … `end_query`) per probe, with
/// `poll_query` harvested on a later frame.
pub trait RenderBackend {
    /// Starts a pass on `target`, clearing it to `clear_color`.
    fn begin_frame(&mut self, target: RenderTarget, clear_color: Vec4);

    /// Finishes the current pass and submits its work.
    fn end_frame(&mut self);

    fn bind_pipeline(&mut self, kind: PipelineKind);

    fn set_write_mask(&mut self, mask: WriteMask);

    fn apply_frame_uniforms(&mut self, uniforms: &FrameUniforms);

    /// Sets the world matrix for the next non-instanced draw.
    fn set_world_matrix(&mut self, world: Mat4);

    /// Sets the flat output color of the id pipeline.
    fn set_id_color(&mut self, color: [f32; 4]);

    fn bind_texture(&mut self, texture: TextureHandle);

    /// Draws one geometry batch with the current pipeline state.
    fn draw(&mut self, geometry: &GeometryBatch);

    /// Draws `count` instances of `geometry`; `instance_data` packs one
    /// column-major world matrix (16 floats) per instance.
    fn draw_instanced(&mut self, geometry: &GeometryBatch, instance_data: &[f32], count: u32);

    // ====遮挡查询====

    fn create_query(&mut self) -> QueryHandle;

    fn begin_query(&mut self, query: QueryHandle);

    fn end_query(&mut self, query: QueryHandle);

    /// Non-blocking result fetch: `None` while the query is still in
    /// flight, otherwise whether any samples passed the depth test.
    fn poll_query(&mut self, query: QueryHandle) -> Option<bool>;

    /// Reads an offscreen target back as tightly packed RGBA8, row-major
    /// from the top-left pixel.
    fn read_pixels(&mut self, target: RenderTargetHandle) -> Vec<u8>;
}
