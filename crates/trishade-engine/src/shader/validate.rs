use naga::ScalarKind;

use super::link::LinkedProgram;
use super::reflect::{entry_inputs, entry_outputs, scalar_kind};

/// Context state a program is validated against: the vertex buffers that will
/// be bound and the color target it will render into.
#[derive(Debug, Clone)]
pub struct PipelineTarget<'a> {
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub color_format: wgpu::TextureFormat,
}

/// Checks a linked program against `target` and the device `limits`.
///
/// Returns every problem found, one per line.
pub(crate) fn check(
    linked: &LinkedProgram,
    target: &PipelineTarget<'_>,
    limits: &wgpu::Limits,
) -> Result<(), String> {
    let mut problems = Vec::new();

    // Vertex inputs must be fed by an attribute of a compatible kind.
    let inputs = entry_inputs(&linked.vertex.module, naga::ShaderStage::Vertex).unwrap_or_default();
    for input in &inputs {
        let attr = target
            .vertex_buffers
            .iter()
            .flat_map(|layout| layout.attributes.iter())
            .find(|a| a.shader_location == input.location);

        match attr {
            None => problems.push(format!(
                "vertex input at location {} has no vertex attribute",
                input.location
            )),
            Some(attr) => {
                let expected = scalar_kind(&input.ty);
                if expected.is_some() && expected != Some(format_kind(attr.format)) {
                    problems.push(format!(
                        "vertex attribute {:?} at location {} does not match the shader input type",
                        attr.format, input.location
                    ));
                }
            }
        }
    }

    // Color output at location 0 into a renderable color format.
    if target.color_format.is_depth_stencil_format() || target.color_format.is_compressed() {
        problems.push(format!(
            "{:?} is not a renderable color format",
            target.color_format
        ));
    }
    let outputs =
        entry_outputs(&linked.fragment.module, naga::ShaderStage::Fragment).unwrap_or_default();
    match outputs.iter().find(|o| o.location == 0) {
        None => problems.push("fragment shader writes no color output at location 0".to_string()),
        Some(output) => {
            let written = scalar_kind(&output.ty);
            let accepted = target_kind(target.color_format);
            if let (Some(written), Some(accepted)) = (written, accepted) {
                if written != accepted {
                    problems.push(format!(
                        "fragment output at location 0 is {written:?} but {:?} stores {accepted:?} values",
                        target.color_format
                    ));
                }
            }
        }
    }

    // Resource limits.
    if target.vertex_buffers.len() as u64 > u64::from(limits.max_vertex_buffers) {
        problems.push(format!(
            "{} vertex buffers exceed the device limit of {}",
            target.vertex_buffers.len(),
            limits.max_vertex_buffers
        ));
    }
    let attr_count: usize = target.vertex_buffers.iter().map(|l| l.attributes.len()).sum();
    if attr_count as u64 > u64::from(limits.max_vertex_attributes) {
        problems.push(format!(
            "{attr_count} vertex attributes exceed the device limit of {}",
            limits.max_vertex_attributes
        ));
    }
    for block in &linked.uniforms {
        if block.group != 0 {
            problems.push(format!(
                "uniform binding {} uses bind group {}; only group 0 is supported",
                block.binding, block.group
            ));
        }
        if u64::from(block.size) > u64::from(limits.max_uniform_buffer_binding_size) {
            problems.push(format!(
                "uniform binding {} is {} bytes, over the device limit of {}",
                block.binding, block.size, limits.max_uniform_buffer_binding_size
            ));
        }
    }
    for stage in [wgpu::ShaderStages::VERTEX, wgpu::ShaderStages::FRAGMENT] {
        let count = linked
            .uniforms
            .iter()
            .filter(|b| b.visibility.contains(stage))
            .count();
        if count as u64 > u64::from(limits.max_uniform_buffers_per_shader_stage) {
            problems.push(format!(
                "{count} uniform buffers in the {stage:?} stage exceed the device limit of {}",
                limits.max_uniform_buffers_per_shader_stage
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}

/// Scalar kind a color target stores; `None` for formats that are not color.
fn target_kind(format: wgpu::TextureFormat) -> Option<ScalarKind> {
    match format.sample_type(None, None)? {
        wgpu::TextureSampleType::Float { .. } => Some(ScalarKind::Float),
        wgpu::TextureSampleType::Sint => Some(ScalarKind::Sint),
        wgpu::TextureSampleType::Uint => Some(ScalarKind::Uint),
        wgpu::TextureSampleType::Depth => None,
    }
}

fn format_kind(format: wgpu::VertexFormat) -> ScalarKind {
    use wgpu::VertexFormat as F;
    match format {
        F::Uint8x2
        | F::Uint8x4
        | F::Uint16x2
        | F::Uint16x4
        | F::Uint32
        | F::Uint32x2
        | F::Uint32x3
        | F::Uint32x4 => ScalarKind::Uint,
        F::Sint8x2
        | F::Sint8x4
        | F::Sint16x2
        | F::Sint16x4
        | F::Sint32
        | F::Sint32x2
        | F::Sint32x3
        | F::Sint32x4 => ScalarKind::Sint,
        _ => ScalarKind::Float,
    }
}
