//! Headless demo: a ring of crates spinning in front of the camera, with a
//! shadow pass, rendered through a backend that only counts what it is
//! asked to draw.
//!
//! Run with `RUST_LOG=debug cargo run --example spinning_crates` to see the
//! per-frame pass traffic.

use glam::{Mat4, Quat, Vec4};
use trellis::renderer::{
    FrameUniforms, PipelineKind, QueryHandle, RenderBackend, RenderTarget, WriteMask,
};
use trellis::resources::{GeometryBatch, RenderTargetHandle, TextureHandle};
use trellis::scene::ShadowLight;
use trellis::{Camera, Renderer, RendererSettings, Scene, create_box};

/// Counts draw calls instead of talking to a GPU.
#[derive(Default)]
struct CountingBackend {
    draws: usize,
    instanced_draws: usize,
    instances: u32,
}

impl RenderBackend for CountingBackend {
    fn begin_frame(&mut self, target: RenderTarget, _clear_color: Vec4) {
        log::debug!("begin frame on {target:?}");
    }

    fn end_frame(&mut self) {}
    fn bind_pipeline(&mut self, _kind: PipelineKind) {}
    fn set_write_mask(&mut self, _mask: WriteMask) {}
    fn apply_frame_uniforms(&mut self, _uniforms: &FrameUniforms) {}
    fn set_world_matrix(&mut self, _world: Mat4) {}
    fn set_id_color(&mut self, _color: [f32; 4]) {}
    fn bind_texture(&mut self, _texture: TextureHandle) {}

    fn draw(&mut self, _geometry: &GeometryBatch) {
        self.draws += 1;
    }

    fn draw_instanced(&mut self, _geometry: &GeometryBatch, _instance_data: &[f32], count: u32) {
        self.instanced_draws += 1;
        self.instances += count;
    }

    fn create_query(&mut self) -> QueryHandle {
        QueryHandle(0)
    }

    fn begin_query(&mut self, _query: QueryHandle) {}
    fn end_query(&mut self, _query: QueryHandle) {}

    fn poll_query(&mut self, _query: QueryHandle) -> Option<bool> {
        Some(true)
    }

    fn read_pixels(&mut self, _target: RenderTargetHandle) -> Vec<u8> {
        Vec::new()
    }
}

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    scene.add_camera(Camera::with_aspect(16.0 / 9.0));
    let light = ShadowLight::new(90.0, 0.1, 200.0)
        .with_shadow_target(TextureHandle(1), RenderTargetHandle(1));
    let light_node = scene.add_light(light);

    // A hub node spun each frame; the crates orbit as its children and
    // share one batch key, so each pass draws them as a single instanced
    // call.
    let hub = scene.build_node().with_position(0.0, 0.0, -12.0).build();
    let geometry = scene.add_geometry(create_box(1.0, 1.0, 1.0).with_batch_key("crate"));
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        scene
            .build_node()
            .with_position(angle.cos() * 6.0, 0.0, angle.sin() * 6.0)
            .with_parent(hub)
            .with_geometry(geometry)
            .build();
    }

    let mut renderer = Renderer::new(CountingBackend::default(), RendererSettings::default());

    for frame in 0..120u32 {
        scene.set_rotation(hub, Quat::from_rotation_y(frame as f32 * 0.02));

        renderer.render_shadow(&mut scene, light_node).expect("shadow pass");
        renderer.render(&mut scene).expect("camera pass");
    }

    let backend = &renderer.backend;
    println!(
        "120 frames: {} plain draws, {} instanced draws covering {} instances",
        backend.draws, backend.instanced_draws, backend.instances
    );
}
