use std::fmt;

/// Programmable stage of a shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Numeric stage identifier printed in diagnostics.
    ///
    /// These are the GL enum values (`GL_VERTEX_SHADER`, `GL_FRAGMENT_SHADER`)
    /// so logs line up with GL tooling output.
    pub const fn type_id(self) -> u32 {
        match self {
            Self::Vertex => 0x8B31,
            Self::Fragment => 0x8B30,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }

    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::ShaderStages {
        match self {
            Self::Vertex => wgpu::ShaderStages::VERTEX,
            Self::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_match_gl_enums() {
        assert_eq!(ShaderStage::Vertex.type_id(), 35633);
        assert_eq!(ShaderStage::Fragment.type_id(), 35632);
    }
}
