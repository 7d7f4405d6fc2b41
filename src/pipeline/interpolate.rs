//! Crossfade variants used for animated transitions: value interpolation,
//! color interpolation between two inputs, and scale interpolation over a
//! single input.

use bytemuck::{Pod, Zeroable};

use crate::bounds::TextureBounds;
use crate::color::ColorBinding;
use crate::config::CommonDrawConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::texture::TileTextureRef;

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, uint_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, SHADER_COLORSCALE, SHADER_COMMON,
};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct InterpolateParamsRaw {
    fraction: f32,
    _pad: [f32; 3],
}

fn checked_fraction(fraction: f32) -> PipelineResult<InterpolateParamsRaw> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(PipelineError::configuration(format!(
            "interpolation fraction must be within [0, 1], got {fraction}"
        )));
    }
    Ok(InterpolateParamsRaw {
        fraction,
        _pad: [0.0; 3],
    })
}

/// One input slot of a two-tile crossfade.
pub struct InterpolateInput<'a> {
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
}

/// Properties for the value crossfade: both inputs share one color binding.
pub struct InterpolateValueProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub input_a: InterpolateInput<'a>,
    pub input_b: InterpolateInput<'a>,
    pub colors: &'a ColorBinding,
    pub fraction: f32,
}

/// Blend the decoded scalars of two inputs, then colorize the blend once.
/// At fraction 0 this matches drawing A alone, at 1 drawing B alone.
pub struct InterpolateValuePipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl InterpolateValuePipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.interp_value.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/interpolate_value.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_value.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_value.bgl.textures"),
            entries: &[uint_texture_entry(0), uint_texture_entry(1)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.interp_value.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            target_format,
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
        props: &InterpolateValueProps<'_>,
    ) -> PipelineResult<()> {
        let params = checked_fraction(props.fraction)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.interp_value.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf = uniform_buffer(device, "tileshade.interp_value.params", &params);
        let colors_buf = uniform_buffer(
            device,
            "tileshade.interp_value.colors",
            &props.colors.to_raw(),
        );
        let vbuf = vertex_buffer(
            device,
            "tileshade.interp_value.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[
                    props.input_a.texture_bounds.tex_coord_vertices(),
                    props.input_b.texture_bounds.tex_coord_vertices(),
                ],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_value.bg.uniforms"),
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors_buf.as_entire_binding(),
                },
            ],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_value.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(props.input_a.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(props.input_b.texture.view),
                },
            ],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.interp_value.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

/// Properties for the color crossfade: each input carries its own binding.
pub struct InterpolateColorProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub input_a: InterpolateInput<'a>,
    pub input_b: InterpolateInput<'a>,
    pub colors_a: &'a ColorBinding,
    pub colors_b: &'a ColorBinding,
    pub fraction: f32,
}

/// Colorize each input under its own binding, then blend the two colors.
pub struct InterpolateColorPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl InterpolateColorPipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.interp_color.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/interpolate_color.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_color.bgl.uniforms"),
            entries: &[
                uniform_entry(0),
                uniform_entry(1),
                uniform_entry(2),
                uniform_entry(3),
            ],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_color.bgl.textures"),
            entries: &[uint_texture_entry(0), uint_texture_entry(1)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.interp_color.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            target_format,
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
        props: &InterpolateColorProps<'_>,
    ) -> PipelineResult<()> {
        let params = checked_fraction(props.fraction)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.interp_color.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf = uniform_buffer(device, "tileshade.interp_color.params", &params);
        let colors_a_buf = uniform_buffer(
            device,
            "tileshade.interp_color.colors_a",
            &props.colors_a.to_raw(),
        );
        let colors_b_buf = uniform_buffer(
            device,
            "tileshade.interp_color.colors_b",
            &props.colors_b.to_raw(),
        );
        let vbuf = vertex_buffer(
            device,
            "tileshade.interp_color.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[
                    props.input_a.texture_bounds.tex_coord_vertices(),
                    props.input_b.texture_bounds.tex_coord_vertices(),
                ],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_color.bg.uniforms"),
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors_a_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: colors_b_buf.as_entire_binding(),
                },
            ],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_color.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(props.input_a.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(props.input_b.texture.view),
                },
            ],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.interp_color.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

/// Properties for the scale crossfade: one input, two color bindings.
pub struct InterpolateColorOnlyProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
    pub colors_a: &'a ColorBinding,
    pub colors_b: &'a ColorBinding,
    pub fraction: f32,
}

/// Colorize a single input twice under two bindings and blend the results.
/// Animates a scale change without re-uploading data.
pub struct InterpolateColorOnlyPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl InterpolateColorOnlyPipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.interp_color_only.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/interpolate_color_only.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_color_only.bgl.uniforms"),
            entries: &[
                uniform_entry(0),
                uniform_entry(1),
                uniform_entry(2),
                uniform_entry(3),
            ],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.interp_color_only.bgl.textures"),
            entries: &[uint_texture_entry(0)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.interp_color_only.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            target_format,
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
        props: &InterpolateColorOnlyProps<'_>,
    ) -> PipelineResult<()> {
        let params = checked_fraction(props.fraction)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.interp_color_only.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf = uniform_buffer(device, "tileshade.interp_color_only.params", &params);
        let colors_a_buf = uniform_buffer(
            device,
            "tileshade.interp_color_only.colors_a",
            &props.colors_a.to_raw(),
        );
        let colors_b_buf = uniform_buffer(
            device,
            "tileshade.interp_color_only.colors_b",
            &props.colors_b.to_raw(),
        );
        let vbuf = vertex_buffer(
            device,
            "tileshade.interp_color_only.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[props.texture_bounds.tex_coord_vertices()],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_color_only.bg.uniforms"),
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors_a_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: colors_b_buf.as_entire_binding(),
                },
            ],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.interp_color_only.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(props.texture.view),
            }],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.interp_color_only.pass");
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
    fn fraction_outside_unit_interval_is_rejected() {
        assert!(checked_fraction(-0.1).is_err());
        assert!(checked_fraction(1.5).is_err());
        assert!(checked_fraction(f32::NAN).is_err());
        assert!(checked_fraction(0.0).is_ok());
        assert!(checked_fraction(1.0).is_ok());
    }
}
