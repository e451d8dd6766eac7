//! GLSL shader programs on top of wgpu.
//!
//! A program is built in steps: compile each stage to a naga module, link the
//! stages (interface and uniform matching), validate against the render target
//! and device limits, then resolve uniform names to buffer locations.

mod compile;
mod diagnostic;
mod link;
mod program;
mod reflect;
mod stage;
mod validate;

pub use diagnostic::{BuildDiagnostic, BuildStep};
pub use program::{build_program, BuildPolicy, ProgramSource, ProgramState, ShaderProgram};
pub use reflect::{UniformBlock, UniformKind, UniformLocation, UniformMember};
pub use stage::ShaderStage;
pub use validate::PipelineTarget;

/// Horizontal offset uniform of the triangle program.
pub const X_MOVE: &str = "xMove";
/// Colour modulation uniform of the triangle program.
pub const CHANGE_COLOUR: &str = "changeColour";

/// Uniforms the triangle program resolves, in lookup order.
pub const TRIANGLE_UNIFORMS: [&str; 2] = [X_MOVE, CHANGE_COLOUR];

/// The scaled, colour-modulated triangle.
pub const TRIANGLE: ProgramSource<'static> = ProgramSource {
    label: "triangle",
    vertex: include_str!("shaders/triangle.vert"),
    fragment: include_str!("shaders/triangle.frag"),
};
