//! Convolution smoothing over a full canonical target. Box average with an
//! odd kernel size, clamped-to-edge sampling, and nodata-aware averaging.

use bytemuck::{Pod, Zeroable};

use crate::bounds::TextureBounds;
use crate::config::CommonDrawConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::texture::{TileTextureRef, TILE_FORMAT};

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, uint_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, FULL_TARGET_POSITIONS, SHADER_COMMON,
};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SmoothParamsRaw {
    kernel_size: u32,
    _pad: [u32; 3],
}

fn checked_kernel(kernel_size: u32) -> PipelineResult<SmoothParamsRaw> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(PipelineError::configuration(format!(
            "smoothing kernel size must be odd and positive, got {kernel_size}"
        )));
    }
    Ok(SmoothParamsRaw {
        kernel_size,
        _pad: [0; 3],
    })
}

/// Properties for one smoothing pass. The pass covers the whole target; a
/// kernel size of 1 copies the input through unchanged.
pub struct SmoothProps<'a> {
    pub texture: TileTextureRef<'a>,
    pub kernel_size: u32,
}

/// Colorization-agnostic smoothing: canonical in, canonical out, so the
/// result feeds any draw variant or chains into another smoothing pass.
pub struct ConvolutionSmoothPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl ConvolutionSmoothPipeline {
    pub fn create(device: &wgpu::Device) -> Self {
        let shader = create_shader(
            device,
            "tileshade.smooth.shader",
            &[SHADER_COMMON, include_str!("../shaders/smooth.wgsl")],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.smooth.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.smooth.bgl.textures"),
            entries: &[uint_texture_entry(0)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.smooth.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            TILE_FORMAT,
        );
        Self {
            pipeline,
            bgl_uniforms,
            bgl_textures,
        }
    }

    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &SmoothProps<'_>,
    ) -> PipelineResult<()> {
        let params = checked_kernel(props.kernel_size)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.smooth.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf = uniform_buffer(device, "tileshade.smooth.params", &params);
        let vbuf = vertex_buffer(
            device,
            "tileshade.smooth.vertices",
            &build_quad(
                FULL_TARGET_POSITIONS,
                &[TextureBounds::full().tex_coord_vertices()],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.smooth.bg.uniforms"),
            layout: &self.bgl_uniforms,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buf.as_entire_binding(),
                },
            ],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.smooth.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(props.texture.view),
            }],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.smooth.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_size_must_be_odd_and_positive() {
        assert!(checked_kernel(0).is_err());
        assert!(checked_kernel(2).is_err());
        assert!(checked_kernel(4).is_err());
        assert!(checked_kernel(1).is_ok());
        assert!(checked_kernel(3).is_ok());
        assert!(checked_kernel(5).is_ok());
    }
}
