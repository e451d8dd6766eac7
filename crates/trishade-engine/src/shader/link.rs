use super::compile::CompiledStage;
use super::reflect::{entry_inputs, entry_outputs, uniform_blocks, UniformBlock, UniformLocation};
use super::ShaderStage;

/// Vertex + fragment stages whose interfaces agree, plus the merged uniform layout.
#[derive(Debug, Clone)]
pub(crate) struct LinkedProgram {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
    pub uniforms: Vec<UniformBlock>,
}

impl LinkedProgram {
    pub(crate) fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.iter().find_map(|block| {
            block.member(name).map(|m| UniformLocation {
                group: block.group,
                binding: block.binding,
                offset: m.offset,
            })
        })
    }

    pub(crate) fn uniform_block(&self, group: u32, binding: u32) -> Option<&UniformBlock> {
        self.uniforms
            .iter()
            .find(|b| b.group == group && b.binding == binding)
    }
}

/// Links the attached stages into one program.
///
/// Requirements:
/// - exactly one vertex and one fragment stage, each with an entry point of its kind
/// - every fragment input location is written by the vertex stage with the same type
/// - a uniform binding used by both stages has the same layout in both
pub(crate) fn link(stages: &[CompiledStage]) -> Result<LinkedProgram, String> {
    let vertex = find_stage(stages, ShaderStage::Vertex)?;
    let fragment = find_stage(stages, ShaderStage::Fragment)?;

    let vs_outputs = entry_outputs(&vertex.module, naga::ShaderStage::Vertex)
        .ok_or("vertex shader has no vertex entry point")?;
    let fs_inputs = entry_inputs(&fragment.module, naga::ShaderStage::Fragment)
        .ok_or("fragment shader has no fragment entry point")?;

    let mut problems = Vec::new();
    for input in &fs_inputs {
        match vs_outputs.iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "fragment input at location {} is not written by the vertex shader",
                input.location
            )),
            Some(output) if output.ty != input.ty => problems.push(format!(
                "type mismatch at location {}: vertex writes {:?}, fragment reads {:?}",
                input.location, output.ty, input.ty
            )),
            Some(_) => {}
        }
    }

    let mut uniforms = uniform_blocks(&vertex.module, ShaderStage::Vertex.to_wgpu());
    for block in uniform_blocks(&fragment.module, ShaderStage::Fragment.to_wgpu()) {
        match uniforms
            .iter_mut()
            .find(|b| b.group == block.group && b.binding == block.binding)
        {
            Some(existing) if existing.same_layout(&block) => {
                existing.visibility |= block.visibility;
            }
            Some(_) => problems.push(format!(
                "uniform binding (group {}, binding {}) is declared differently in the vertex and fragment shaders",
                block.group, block.binding
            )),
            None => uniforms.push(block),
        }
    }

    if !problems.is_empty() {
        return Err(problems.join("\n"));
    }

    uniforms.sort_by_key(|b| (b.group, b.binding));

    Ok(LinkedProgram {
        vertex: vertex.clone(),
        fragment: fragment.clone(),
        uniforms,
    })
}

fn find_stage(stages: &[CompiledStage], stage: ShaderStage) -> Result<&CompiledStage, String> {
    let mut matching = stages.iter().filter(|s| s.stage == stage);
    let first = matching
        .next()
        .ok_or_else(|| format!("no {stage} shader attached"))?;
    if matching.next().is_some() {
        return Err(format!("more than one {stage} shader attached"));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile::compile;

    const VERT_UV: &str = r"#version 450
layout(location = 0) in vec3 pos;
layout(location = 0) out vec2 uv;
layout(set = 0, binding = 0) uniform Shared { float scale; } shared_block;
void main() {
    uv = pos.xy;
    gl_Position = vec4(pos * shared_block.scale, 1.0);
}
";

    const FRAG_UV: &str = r"#version 450
layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 colour;
layout(set = 0, binding = 0) uniform Shared { float scale; } shared_block;
void main() {
    colour = vec4(uv * shared_block.scale, 0.0, 1.0);
}
";

    fn stage(stage: ShaderStage, src: &str) -> CompiledStage {
        compile(stage, src).expect("compiles")
    }

    #[test]
    fn matching_varyings_link() {
        let stages = [
            stage(ShaderStage::Vertex, VERT_UV),
            stage(ShaderStage::Fragment, FRAG_UV),
        ];
        let linked = link(&stages).expect("links");

        // The shared block is merged and visible to both stages.
        assert_eq!(linked.uniforms.len(), 1);
        assert_eq!(
            linked.uniforms[0].visibility,
            wgpu::ShaderStages::VERTEX_FRAGMENT
        );
        assert_eq!(
            linked.uniform_location("scale"),
            Some(UniformLocation {
                group: 0,
                binding: 0,
                offset: 0
            })
        );
    }

    #[test]
    fn unwritten_fragment_input_fails() {
        let vert = "#version 450\nlayout(location = 0) in vec3 pos;\nvoid main() { gl_Position = vec4(pos, 1.0); }\n";
        let stages = [
            stage(ShaderStage::Vertex, vert),
            stage(ShaderStage::Fragment, FRAG_UV),
        ];
        let log = link(&stages).unwrap_err();
        assert!(log.contains("location 0"), "{log}");
    }

    #[test]
    fn varying_type_mismatch_fails() {
        let frag = "#version 450\nlayout(location = 0) in vec3 uv;\nlayout(location = 0) out vec4 colour;\nlayout(set = 0, binding = 0) uniform Shared { float scale; } shared_block;\nvoid main() { colour = vec4(uv * shared_block.scale, 1.0); }\n";
        let stages = [
            stage(ShaderStage::Vertex, VERT_UV),
            stage(ShaderStage::Fragment, frag),
        ];
        let log = link(&stages).unwrap_err();
        assert!(log.contains("type mismatch"), "{log}");
    }

    #[test]
    fn missing_stage_fails() {
        let stages = [stage(ShaderStage::Fragment, FRAG_UV)];
        let log = link(&stages).unwrap_err();
        assert_eq!(log, "no vertex shader attached");
    }

    #[test]
    fn conflicting_uniform_binding_fails() {
        let frag = "#version 450\nlayout(location = 0) in vec2 uv;\nlayout(location = 0) out vec4 colour;\nlayout(set = 0, binding = 0) uniform Other { vec4 tint; } other;\nvoid main() { colour = other.tint * uv.x; }\n";
        let stages = [
            stage(ShaderStage::Vertex, VERT_UV),
            stage(ShaderStage::Fragment, frag),
        ];
        let log = link(&stages).unwrap_err();
        assert!(log.contains("declared differently"), "{log}");
    }
}
