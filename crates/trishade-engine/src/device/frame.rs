/// Surface texture, its view and a fresh encoder for one frame.
///
/// Hand it back to [`Gpu::submit`](super::Gpu::submit) before starting the next
/// frame; acquiring again while one is held blocks or fails.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
