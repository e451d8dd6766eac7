use naga::{AddressSpace, Binding, Module, ScalarKind, TypeInner};

/// Resolved position of a uniform value: which buffer binding and where in it.
///
/// Produced by name lookup on a linked program; an unresolved name yields
/// `None` instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub offset: u32,
}

/// Value type of a uniform member, as far as the program needs to know it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    F32,
    Other,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// One uniform buffer binding and the named values inside it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
    pub visibility: wgpu::ShaderStages,
    pub members: Vec<UniformMember>,
}

impl UniformBlock {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Same binding with the same layout (visibility aside).
    pub(crate) fn same_layout(&self, other: &UniformBlock) -> bool {
        self.size == other.size && self.members == other.members
    }
}

/// Collects the uniform blocks declared in `module`, visible to `visibility`.
pub(crate) fn uniform_blocks(module: &Module, visibility: wgpu::ShaderStages) -> Vec<UniformBlock> {
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let Some(res) = &var.binding else { continue };

        let inner = &module.types[var.ty].inner;
        let (members, size) = match inner {
            TypeInner::Struct { members, span } => {
                let members = members
                    .iter()
                    .filter_map(|m| {
                        Some(UniformMember {
                            name: m.name.clone()?,
                            offset: m.offset,
                            kind: kind_of(&module.types[m.ty].inner),
                        })
                    })
                    .collect();
                (members, *span)
            }
            other => {
                let members = var
                    .name
                    .iter()
                    .map(|name| UniformMember {
                        name: name.clone(),
                        offset: 0,
                        kind: kind_of(other),
                    })
                    .collect();
                (members, other.size(module.to_ctx()))
            }
        };

        blocks.push(UniformBlock {
            group: res.group,
            binding: res.binding,
            size,
            visibility,
            members,
        });
    }

    blocks
}

fn kind_of(inner: &TypeInner) -> UniformKind {
    match inner {
        TypeInner::Scalar(s) if *s == naga::Scalar::F32 => UniformKind::F32,
        _ => UniformKind::Other,
    }
}

/// A location-bound value crossing a stage boundary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InterfaceVar {
    pub location: u32,
    pub ty: TypeInner,
}

/// Inputs of the module's entry point for `stage`, or `None` without one.
pub(crate) fn entry_inputs(module: &Module, stage: naga::ShaderStage) -> Option<Vec<InterfaceVar>> {
    let ep = module.entry_points.iter().find(|ep| ep.stage == stage)?;

    let mut vars = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.binding.as_ref(), arg.ty, &mut vars);
    }
    Some(vars)
}

/// Outputs of the module's entry point for `stage`, or `None` without one.
pub(crate) fn entry_outputs(module: &Module, stage: naga::ShaderStage) -> Option<Vec<InterfaceVar>> {
    let ep = module.entry_points.iter().find(|ep| ep.stage == stage)?;

    let mut vars = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_locations(module, result.binding.as_ref(), result.ty, &mut vars);
    }
    Some(vars)
}

fn collect_locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<InterfaceVar>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            location: *location,
            ty: inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_locations(module, m.binding.as_ref(), m.ty, out);
                }
            }
        }
    }
}

/// Scalar kind of a scalar or vector type.
pub(crate) fn scalar_kind(inner: &TypeInner) -> Option<ScalarKind> {
    match inner {
        TypeInner::Scalar(s) => Some(s.kind),
        TypeInner::Vector { scalar, .. } => Some(scalar.kind),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile::compile;
    use crate::shader::ShaderStage;

    const FRAG: &str = r"#version 450
layout(location = 0) out vec4 colour;
layout(set = 0, binding = 3) uniform Params {
    float gain;
    float bias;
} params;
void main() {
    colour = vec4(params.gain, params.bias, 0.0, 1.0);
}
";

    #[test]
    fn uniform_block_members_and_offsets() {
        let compiled = compile(ShaderStage::Fragment, FRAG).expect("compiles");
        let blocks = uniform_blocks(&compiled.module, wgpu::ShaderStages::FRAGMENT);
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!((block.group, block.binding), (0, 3));
        assert!(block.size >= 8);

        let gain = block.member("gain").expect("gain");
        let bias = block.member("bias").expect("bias");
        assert_eq!(gain.offset, 0);
        assert_eq!(bias.offset, 4);
        assert_eq!(gain.kind, UniformKind::F32);
        assert!(block.member("missing").is_none());
    }

    #[test]
    fn fragment_output_at_location_zero() {
        let compiled = compile(ShaderStage::Fragment, FRAG).expect("compiles");
        let outputs = entry_outputs(&compiled.module, naga::ShaderStage::Fragment).expect("entry");
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].location, 0);
        assert_eq!(scalar_kind(&outputs[0].ty), Some(ScalarKind::Float));
    }

    #[test]
    fn missing_entry_point_kind_is_none() {
        let compiled = compile(ShaderStage::Fragment, FRAG).expect("compiles");
        assert!(entry_inputs(&compiled.module, naga::ShaderStage::Vertex).is_none());
    }
}
