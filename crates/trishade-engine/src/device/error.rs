/// What the frame loop should do after a failed surface acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again at its current size; draw next frame.
    Reconfigured,
    /// Timeout or other transient failure; drop this frame only.
    SkipFrame,
    /// Out of memory or an unknown failure. The loop should stop.
    Fatal,
}
