//! Renderer Settings
//!
//! Per-renderer configuration knobs. Settings are plain data: they can be
//! built up front, tweaked between frames, and carry no GPU state.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use glam::Vec4;
//! use trellis::renderer::{Renderer, RendererSettings};
//!
//! // Default: black clear color, occlusion culling off
//! let renderer = Renderer::new(backend, RendererSettings::default());
//!
//! // Sky-blue background with occlusion culling enabled
//! let settings = RendererSettings {
//!     clear_color: Vec4::new(0.53, 0.81, 0.92, 1.0),
//!     occlusion_culling: true,
//!     ..Default::default()
//! };
//! ```

use glam::Vec4;

/// Default far cutoff for the camera distance policy, in world units.
pub const DEFAULT_MAX_DRAW_DISTANCE: f32 = 1000.0;

/// Configuration of the render passes.
///
/// | Field               | Default   | Effect                                      |
/// |---------------------|-----------|---------------------------------------------|
/// | `clear_color`       | black     | Main pass clear color                       |
/// | `occlusion_culling` | off       | GPU occlusion probes for non-instanced draws|
/// | `max_draw_distance` | 1000.0    | View-space distance cutoff for camera culling|
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Clear color of the main camera pass (RGBA, linear).
    pub clear_color: Vec4,

    /// Enables per-draw GPU occlusion queries in the main pass.
    ///
    /// Probes add one draw per tested geometry and report with one frame of
    /// latency; worth it only for scenes with heavy overdraw. Instanced
    /// groups are never probed.
    pub occlusion_culling: bool,

    /// Nodes whose bounding sphere center is farther than this from the
    /// camera (view space) are skipped by the camera culling policy.
    pub max_draw_distance: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            occlusion_culling: false,
            max_draw_distance: DEFAULT_MAX_DRAW_DISTANCE,
        }
    }
}
