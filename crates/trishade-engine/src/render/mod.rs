//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (buffers, pipelines) and record into a
//! [`RenderTarget`] supplied by the frame loop.
//!
//! Convention: vertex positions are given directly in normalized device
//! coordinates (x, y in [-1, 1], +Y up).

mod ctx;
pub mod geometry;

pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::TriangleGeometry;
