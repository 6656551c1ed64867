//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`TrellisError`] covers all failure modes including:
//! - Scene graph lookup failures
//! - Render pass configuration errors
//! - Physics worker channel errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, TrellisError>`.
//!
//! ```rust,ignore
//! use trellis::errors::{TrellisError, Result};
//!
//! fn render_frame() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Trellis engine.
///
/// This enum covers all possible error conditions that can occur
/// during engine operation. Each variant provides specific context
/// about what went wrong.
#[derive(Error, Debug)]
pub enum TrellisError {
    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// The referenced node is not (or no longer) in the scene.
    #[error("Node not found: {context}")]
    NodeNotFound {
        /// Description of what was being looked up
        context: &'static str,
    },

    /// A pass needed a component the node does not carry.
    #[error("Node has no {component} component")]
    ComponentMissing {
        /// Name of the missing component type
        component: &'static str,
    },

    // ========================================================================
    // Render Pass Errors
    // ========================================================================
    /// An offscreen pass was started without its target resource.
    #[error("Render target not configured: {0}")]
    TargetMissing(&'static str),

    // ========================================================================
    // Physics Bridge Errors
    // ========================================================================
    /// The physics worker endpoint was dropped while messages were pending.
    #[error("Physics worker disconnected")]
    PhysicsDisconnected,
}

/// Alias for `Result<T, TrellisError>`.
pub type Result<T> = std::result::Result<T, TrellisError>;
