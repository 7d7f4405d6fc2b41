//! Single-tile draw variants: plain colorization, simple hillshading, and
//! pregenerated hillshading.

use bytemuck::{Pod, Zeroable};

use crate::bounds::TextureBounds;
use crate::color::ColorBinding;
use crate::config::CommonDrawConfig;
use crate::error::PipelineResult;
use crate::texture::TileTextureRef;

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, uint_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, SHADER_COLORSCALE, SHADER_COMMON,
};

/// Lighting parameters for the on-the-fly hillshade. Degree-to-radian
/// conversion and the slope factor are shared kernel constants, not
/// per-call state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleHillshade {
    pub azimuth: f32,
    pub altitude: f32,
    pub slopescale: f32,
}

/// Per-invocation property bundle for the single-tile variants. Built fresh
/// from current visualization settings for every draw; treated as a
/// snapshot, never retained.
pub struct SingleTileProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
    pub colors: &'a ColorBinding,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SingleParamsRaw {
    texture_bounds: [f32; 4],
    azimuth: f32,
    altitude: f32,
    slopescale: f32,
    enable_hillshade: u32,
}

/// Decode + colorize one tile, optionally with on-the-fly hillshading.
/// The two entry points are distinct variants sharing one compiled kernel.
pub struct SingleTilePipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl SingleTilePipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.single.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/single.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.single.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.single.bgl.textures"),
            entries: &[uint_texture_entry(0)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.single.pipeline",
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

    /// Plain colorization.
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &SingleTileProps<'_>,
    ) -> PipelineResult<()> {
        self.record_inner(device, encoder, config, target, props, None)
    }

    /// Colorization modulated by lighting approximated from the tile's own
    /// decoded neighborhood.
    pub fn record_hillshaded(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &SingleTileProps<'_>,
        hillshade: SimpleHillshade,
    ) -> PipelineResult<()> {
        self.record_inner(device, encoder, config, target, props, Some(hillshade))
    }

    fn record_inner(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &SingleTileProps<'_>,
        hillshade: Option<SimpleHillshade>,
    ) -> PipelineResult<()> {
        let hs = hillshade.unwrap_or(SimpleHillshade {
            azimuth: 0.0,
            altitude: 0.0,
            slopescale: 0.0,
        });
        let globals_buf = uniform_buffer(
            device,
            "tileshade.single.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf = uniform_buffer(
            device,
            "tileshade.single.params",
            &SingleParamsRaw {
                texture_bounds: props.texture_bounds.as_vec4(),
                azimuth: hs.azimuth,
                altitude: hs.altitude,
                slopescale: hs.slopescale,
                enable_hillshade: hillshade.is_some() as u32,
            },
        );
        let colors_buf = uniform_buffer(device, "tileshade.single.colors", &props.colors.to_raw());
        let vbuf = vertex_buffer(
            device,
            "tileshade.single.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[props.texture_bounds.tex_coord_vertices()],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.single.bg.uniforms"),
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
            label: Some("tileshade.single.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(props.texture.view),
            }],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.single.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

/// Per-invocation property bundle for the pregenerated-hillshade variant.
/// The shade surface is sampled through its own independent bounds.
pub struct HsPregenProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
    pub shade_texture: TileTextureRef<'a>,
    pub shade_bounds: TextureBounds,
    pub colors: &'a ColorBinding,
}

/// Colorization modulated by a precomputed shade factor sampled from a
/// second, independently addressed surface.
pub struct HsPregenPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl HsPregenPipeline {
    pub fn create(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_shader(
            device,
            "tileshade.hs_pregen.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                include_str!("../shaders/hs_pregen.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.hs_pregen.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.hs_pregen.bgl.textures"),
            entries: &[uint_texture_entry(0), uint_texture_entry(1)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.hs_pregen.pipeline",
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
        props: &HsPregenProps<'_>,
    ) -> PipelineResult<()> {
        let globals_buf = uniform_buffer(
            device,
            "tileshade.hs_pregen.globals",
            &config.globals(target.canvas_size),
        );
        let colors_buf =
            uniform_buffer(device, "tileshade.hs_pregen.colors", &props.colors.to_raw());
        let vbuf = vertex_buffer(
            device,
            "tileshade.hs_pregen.vertices",
            &build_quad(
                config.quad_positions(props.canvas_coordinates),
                &[
                    props.texture_bounds.tex_coord_vertices(),
                    props.shade_bounds.tex_coord_vertices(),
                ],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.hs_pregen.bg.uniforms"),
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
            label: Some("tileshade.hs_pregen.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(props.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(props.shade_texture.view),
                },
            ],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.hs_pregen.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}
