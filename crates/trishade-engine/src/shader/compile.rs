use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::diagnostic::error_chain;
use super::ShaderStage;

/// One successfully compiled stage: the validated IR module.
#[derive(Debug, Clone)]
pub(crate) struct CompiledStage {
    pub stage: ShaderStage,
    pub module: naga::Module,
}

/// Compiles GLSL source for `stage`.
///
/// Parsing and IR validation both count as compilation; the error string is the
/// info log, one line per problem.
pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, String> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.to_naga()), source)
        .map_err(|errors| format_parse_errors(&errors, source))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| error_chain(&err))?;

    log::debug!(
        "compiled {stage} shader: {} globals, {} entry points",
        module.global_variables.len(),
        module.entry_points.len()
    );

    Ok(CompiledStage { stage, module })
}

fn format_parse_errors(errors: &glsl::ParseErrors, source: &str) -> String {
    errors
        .errors
        .iter()
        .map(|err| {
            let loc = err.meta.location(source);
            format!("{}:{}: {}", loc.line_number, loc.line_position, err.kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = r"#version 450
layout(location = 0) in vec3 pos;
void main() {
    gl_Position = vec4(pos, 1.0);
}
";

    #[test]
    fn valid_vertex_source_compiles() {
        let compiled = compile(ShaderStage::Vertex, VERT).expect("compiles");
        assert_eq!(compiled.stage, ShaderStage::Vertex);
        assert_eq!(compiled.module.entry_points.len(), 1);
        assert_eq!(compiled.module.entry_points[0].stage, naga::ShaderStage::Vertex);
    }

    #[test]
    fn syntax_error_reports_line() {
        let broken = "#version 450\nvoid main() {\n    gl_Position = vec4(1.0\n}\n";
        let log = compile(ShaderStage::Vertex, broken).unwrap_err();
        assert!(!log.is_empty());
        assert!(log.contains(':'), "log should carry a location: {log}");
    }

    #[test]
    fn undeclared_identifier_is_a_compile_error() {
        let broken = "#version 450\nlayout(location = 0) out vec4 colour;\nvoid main() {\n    colour = vec4(missing, 0.0, 0.0, 1.0);\n}\n";
        assert!(compile(ShaderStage::Fragment, broken).is_err());
    }
}
