//! Process-wide GPU context.

use once_cell::sync::OnceCell;

use crate::error::{PipelineError, PipelineResult};

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

static CTX: OnceCell<GpuContext> = OnceCell::new();

/// Acquire the shared GPU context, initializing it on first use. Adapter or
/// device acquisition failure surfaces as [`PipelineError::Device`]; once
/// acquired, the context lives for the process lifetime.
pub fn try_ctx() -> PipelineResult<&'static GpuContext> {
    CTX.get_or_try_init(|| {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| PipelineError::device("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                label: Some("tileshade-device"),
            },
            None,
        ))
        .map_err(|e| PipelineError::device(e.to_string()))?;

        log::info!("GPU context ready: {}", adapter.get_info().name);

        Ok(GpuContext {
            device,
            queue,
            adapter,
        })
    })
}

/// Align to WebGPU's required bytes-per-row for copies.
#[inline]
pub fn align_copy_bpr(unpadded: u32) -> u32 {
    let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + a - 1) / a) * a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_row_alignment() {
        let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        assert_eq!(align_copy_bpr(1), a);
        assert_eq!(align_copy_bpr(a), a);
        assert_eq!(align_copy_bpr(a + 1), 2 * a);
    }

    #[test]
    fn acquisition_failures_are_device_errors() {
        let err = PipelineError::device("no suitable GPU adapter");
        assert!(matches!(err, PipelineError::Device(_)));
        assert!(err.to_string().contains("no suitable GPU adapter"));
    }
}
