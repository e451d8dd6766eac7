use anyhow::{Context, Result};

use super::adapter::{request_device, DeviceParts};
use super::GpuInit;

/// Device + queue without a window or surface.
///
/// Used for offscreen work: buffer read-back, pipeline validation in tests.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl HeadlessGpu {
    pub async fn new(init: GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let DeviceParts { device, queue, .. } =
            request_device(&instance, None, &init, "trishade headless device")
                .await
                .context("headless GPU unavailable")?;

        Ok(Self { device, queue })
    }

    /// Blocking variant of [`HeadlessGpu::new`].
    pub fn block_on(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Copies `size` bytes of `source` into a mappable buffer and reads them back.
    ///
    /// `source` needs `COPY_SRC` usage.
    pub fn read_buffer(&self, source: &wgpu::Buffer, size: u64) -> Result<Vec<u8>> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trishade readback staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trishade readback encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        // poll is a no-op on some backends; spin until the callback fires.
        let mapped = loop {
            let _ = self.device.poll(wgpu::PollType::Poll);
            match rx.try_recv() {
                Ok(result) => break result,
                Err(std::sync::mpsc::TryRecvError::Empty) => std::hint::spin_loop(),
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    anyhow::bail!("buffer mapping callback dropped")
                }
            }
        };
        mapped.context("failed to map readback buffer")?;

        let bytes = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(bytes)
    }
}
