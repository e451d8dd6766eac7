use std::fmt;

use super::ShaderStage;

/// Build step that produced a diagnostic.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BuildStep {
    Compile,
    Link,
    Validate,
}

/// Failure report from one step of a program build.
///
/// `log` is the backend's message, possibly multi-line.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildDiagnostic {
    pub step: BuildStep,
    pub stage: Option<ShaderStage>,
    pub log: String,
}

impl BuildDiagnostic {
    pub(crate) fn compile(stage: ShaderStage, log: impl Into<String>) -> Self {
        Self {
            step: BuildStep::Compile,
            stage: Some(stage),
            log: log.into(),
        }
    }

    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self {
            step: BuildStep::Link,
            stage: None,
            log: log.into(),
        }
    }

    pub(crate) fn validate(log: impl Into<String>) -> Self {
        Self {
            step: BuildStep::Validate,
            stage: None,
            log: log.into(),
        }
    }
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.step, self.stage) {
            (BuildStep::Compile, Some(stage)) => {
                write!(f, "error compiling the {} shader: '{}'", stage.type_id(), self.log)
            }
            (BuildStep::Compile, None) => write!(f, "error compiling shader: '{}'", self.log),
            (BuildStep::Link, _) => write!(f, "error linking program: '{}'", self.log),
            (BuildStep::Validate, _) => write!(f, "error validating program: '{}'", self.log),
        }
    }
}

impl std::error::Error for BuildDiagnostic {}

/// Flattens an error and its sources into one line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
