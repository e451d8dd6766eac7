use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::adapter::{request_device, DeviceParts};
use super::surface::SurfaceState;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Device, queue and the configured window surface.
///
/// `'w` is the borrow of the window the surface draws into.
pub struct Gpu<'w> {
    surface: SurfaceState<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl<'w> Gpu<'w> {
    /// Requests an adapter compatible with `window`'s surface, opens the device
    /// and configures the surface at the window's inner size.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let DeviceParts {
            adapter,
            device,
            queue,
        } = request_device(&instance, Some(&surface), &init, "trishade device").await?;

        let surface = SurfaceState::configure(surface, &adapter, &device, size, &init)?;

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
        })
    }

    /// Format the surface was configured with.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Surface size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// A zero size (minimized window) is recorded but leaves the surface as is.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, new_size);
    }

    /// Acquires the next surface texture.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trishade frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits `frame`'s commands, then presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Reconfigures the surface when the error calls for it.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        self.surface.recover(&self.device, err)
    }
}
