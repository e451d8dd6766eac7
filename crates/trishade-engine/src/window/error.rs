use std::fmt;

use winit::error::{EventLoopError, OsError};

/// Fatal failure while bringing up or running the window runtime.
///
/// Every variant is terminal; nothing is retried.
#[derive(Debug)]
pub enum RuntimeError {
    /// The windowing subsystem (event loop) could not be created.
    EventLoop(EventLoopError),
    /// The OS refused to create the window.
    Window(OsError),
    /// No usable adapter/device for the window's surface.
    Gpu(anyhow::Error),
    /// The application's start hook failed.
    Start(anyhow::Error),
    /// The event loop exited with an error after startup.
    EventLoopRun(EventLoopError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventLoop(e) => write!(f, "windowing subsystem initialization failed: {e}"),
            Self::Window(e) => write!(f, "window creation failed: {e}"),
            Self::Gpu(e) => write!(f, "GPU initialization failed: {e:#}"),
            Self::Start(e) => write!(f, "application start failed: {e:#}"),
            Self::EventLoopRun(e) => write!(f, "event loop terminated with error: {e}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EventLoop(e) | Self::EventLoopRun(e) => Some(e),
            Self::Window(e) => Some(e),
            Self::Gpu(e) | Self::Start(e) => Some(e.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_error_display_keeps_context_chain() {
        let err = RuntimeError::Gpu(
            anyhow::anyhow!("no adapter").context("failed to find a suitable GPU adapter"),
        );
        let text = err.to_string();
        assert!(text.starts_with("GPU initialization failed"));
        assert!(text.contains("no adapter"));
    }

    #[test]
    fn start_error_exposes_source() {
        use std::error::Error as _;
        let err = RuntimeError::Start(anyhow::anyhow!("shader program failed"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("shader program failed"));
    }
}
