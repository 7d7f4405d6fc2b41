//! Pairwise difference variants. The difference is `B - A` everywhere:
//! Calc writes it to a canonical intermediate, Draw colorizes it directly.
//! Nodata in either input propagates.

use crate::bounds::TextureBounds;
use crate::color::ColorBinding;
use crate::config::CommonDrawConfig;
use crate::error::PipelineResult;
use crate::texture::{TileTextureRef, TILE_FORMAT};

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, uint_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, SHADER_COLORSCALE, SHADER_COMMON,
};

/// One side of the difference.
pub struct DiffInput<'a> {
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
}

/// Properties for the Calc stage.
pub struct DiffCalcProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub input_a: DiffInput<'a>,
    pub input_b: DiffInput<'a>,
}

/// Properties for the Draw stage.
pub struct DiffDrawProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub input_a: DiffInput<'a>,
    pub input_b: DiffInput<'a>,
    pub colors: &'a ColorBinding,
}

/// Calc stage: `B - A` into a canonical intermediate target.
pub struct DiffCalcPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl DiffCalcPipeline {
    pub fn create(device: &wgpu::Device) -> Self {
        let shader = create_shader(
            device,
            "tileshade.diff_calc.shader",
            &[SHADER_COMMON, include_str!("../shaders/diff_calc.wgsl")],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.diff_calc.bgl.uniforms"),
            entries: &[uniform_entry(0)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.diff_calc.bgl.textures"),
            entries: &[uint_texture_entry(0), uint_texture_entry(1)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.diff_calc.pipeline",
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
        props: &DiffCalcProps<'_>,
    ) -> PipelineResult<()> {
        let globals_buf = uniform_buffer(
            device,
            "tileshade.diff_calc.globals",
            &config.globals(target.canvas_size),
        );
        let vbuf = vertex_buffer(
            device,
            "tileshade.diff_calc.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[
                    props.input_a.texture_bounds.tex_coord_vertices(),
                    props.input_b.texture_bounds.tex_coord_vertices(),
                ],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.diff_calc.bg.uniforms"),
            layout: &self.bgl_uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.diff_calc.bg.textures"),
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

        let mut rpass = begin_pass(encoder, target, "tileshade.diff_calc.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

/// Draw stage: colorizes `B - A` without an intermediate target.
pub struct DiffDrawPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl DiffDrawPipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.diff_draw.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/diff_draw.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.diff_draw.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.diff_draw.bgl.textures"),
            entries: &[uint_texture_entry(0), uint_texture_entry(1)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.diff_draw.pipeline",
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
        props: &DiffDrawProps<'_>,
    ) -> PipelineResult<()> {
        let globals_buf = uniform_buffer(
            device,
            "tileshade.diff_draw.globals",
            &config.globals(target.canvas_size),
        );
        let colors_buf =
            uniform_buffer(device, "tileshade.diff_draw.colors", &props.colors.to_raw());
        let vbuf = vertex_buffer(
            device,
            "tileshade.diff_draw.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[
                    props.input_a.texture_bounds.tex_coord_vertices(),
                    props.input_b.texture_bounds.tex_coord_vertices(),
                ],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.diff_draw.bg.uniforms"),
            layout: &self.bgl_uniforms,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: colors_buf.as_entire_binding(),
                },
            ],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.diff_draw.bg.textures"),
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

        let mut rpass = begin_pass(encoder, target, "tileshade.diff_draw.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}
