use anyhow::{Context, Result};

use super::GpuInit;

/// Adapter + logical device pair produced by [`request_device`].
pub(crate) struct DeviceParts {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Picks an adapter (optionally compatible with `surface`) and opens a device on it.
///
/// This is the point where the backend's entry points become usable; failure
/// here is fatal for the caller.
pub(crate) async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    init: &GpuInit,
    label: &str,
) -> Result<DeviceParts> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let info = adapter.get_info();
    if init.require_webgpu_compliant {
        anyhow::ensure!(
            adapter.get_downlevel_capabilities().is_webgpu_compliant(),
            "adapter {} ({:?}) is not WebGPU compliant",
            info.name,
            info.backend
        );
    }

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    log::info!("using adapter {} ({:?})", info.name, info.backend);

    Ok(DeviceParts {
        adapter,
        device,
        queue,
    })
}
