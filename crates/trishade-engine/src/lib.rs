//! Trishade engine crate.
//!
//! Window and GPU runtime, GLSL shader programs built on naga and wgpu, and the
//! small pieces the triangle demo draws with.

pub mod anim;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod shader;
pub mod window;
