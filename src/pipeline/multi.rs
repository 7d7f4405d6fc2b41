//! Multi-band analyze variants: a per-pixel aggregate over 1..=6 gated
//! inputs, either written to an intermediate canonical target (Calc) or
//! colorized directly (Draw).
//!
//! One compiled kernel covers every band count. The bind group always
//! carries six texture slots; slots past the active count bind a 1x1
//! placeholder the kernel never samples.

use crate::bounds::TextureBounds;
use crate::color::ColorBinding;
use crate::config::CommonDrawConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::filter::{BandSet, MAX_BANDS};
use crate::texture::{TileTexture, TileTextureRef, TILE_FORMAT};
use crate::util;

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, uint_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, SHADER_COLORSCALE, SHADER_COMMON,
    SHADER_MULTIBAND, TileVertex,
};

/// One active input slot: a canonical texture plus the bounds addressing the
/// tile inside it.
pub struct MultiBandInput<'a> {
    pub texture: TileTextureRef<'a>,
    pub texture_bounds: TextureBounds,
}

/// Properties for the Calc stage.
pub struct MultiAnalyzeCalcProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub inputs: &'a [MultiBandInput<'a>],
    pub bands: BandSet,
}

/// Properties for the Draw stage.
pub struct MultiAnalyzeDrawProps<'a> {
    pub canvas_coordinates: [f32; 2],
    pub inputs: &'a [MultiBandInput<'a>],
    pub bands: BandSet,
    pub colors: &'a ColorBinding,
}

fn check_cardinality(inputs: usize, bands: &BandSet) -> PipelineResult<()> {
    if inputs != bands.count() {
        return Err(PipelineError::configuration(format!(
            "band set declares {} bands but {} input textures were supplied",
            bands.count(),
            inputs
        )));
    }
    Ok(())
}

fn band_quad(config: &CommonDrawConfig, props_coords: [f32; 2], inputs: &[MultiBandInput<'_>]) -> [TileVertex; 4] {
    let uv_sets: Vec<[[f32; 2]; 4]> = inputs
        .iter()
        .map(|i| i.texture_bounds.tex_coord_vertices())
        .collect();
    build_quad(config.quad_positions(props_coords), &uv_sets)
}

fn band_texture_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    inputs: &[MultiBandInput<'_>],
    dummy: &TileTexture,
    label: &str,
) -> wgpu::BindGroup {
    let mut entries = Vec::with_capacity(MAX_BANDS);
    for slot in 0..MAX_BANDS {
        let view = inputs
            .get(slot)
            .map(|i| i.texture.view)
            .unwrap_or(&dummy.view);
        entries.push(wgpu::BindGroupEntry {
            binding: slot as u32,
            resource: wgpu::BindingResource::TextureView(view),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

fn band_texture_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    let entries: Vec<_> = (0..MAX_BANDS as u32).map(uint_texture_entry).collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

/// Calc stage: writes the raw aggregate to a canonical intermediate target
/// for later colorization or chaining.
pub struct MultiAnalyzeCalcPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
    dummy: TileTexture,
}

impl MultiAnalyzeCalcPipeline {
    pub fn create(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = create_shader(
            device,
            "tileshade.multi_calc.shader",
            &[
                SHADER_COMMON,
                SHADER_MULTIBAND,
                include_str!("../shaders/multi_calc.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.multi_calc.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bgl_textures = band_texture_layout(device, "tileshade.multi_calc.bgl.textures");
        let pipeline = create_render_pipeline(
            device,
            "tileshade.multi_calc.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            TILE_FORMAT,
        );
        Self {
            pipeline,
            bgl_uniforms,
            bgl_textures,
            dummy: TileTexture::dummy(device, queue, util::machine_is_little_endian()),
        }
    }

    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &MultiAnalyzeCalcProps<'_>,
    ) -> PipelineResult<()> {
        check_cardinality(props.inputs.len(), &props.bands)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.multi_calc.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf =
            uniform_buffer(device, "tileshade.multi_calc.params", &props.bands.to_raw());
        let vbuf = vertex_buffer(
            device,
            "tileshade.multi_calc.vertices",
            &band_quad(config, props.canvas_coordinates, props.inputs),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.multi_calc.bg.uniforms"),
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
        let bg_textures = band_texture_group(
            device,
            &self.bgl_textures,
            props.inputs,
            &self.dummy,
            "tileshade.multi_calc.bg.textures",
        );

        let mut rpass = begin_pass(encoder, target, "tileshade.multi_calc.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}

/// Draw stage: colorizes the aggregate directly onto the caller's surface.
pub struct MultiAnalyzeDrawPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
    dummy: TileTexture,
}

impl MultiAnalyzeDrawPipeline {
    pub fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = create_shader(
            device,
            "tileshade.multi_draw.shader",
            &[
                SHADER_COMMON,
                SHADER_COLORSCALE,
                SHADER_MULTIBAND,
                include_str!("../shaders/multi_draw.wgsl"),
            ],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.multi_draw.bgl.uniforms"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });
        let bgl_textures = band_texture_layout(device, "tileshade.multi_draw.bgl.textures");
        let pipeline = create_render_pipeline(
            device,
            "tileshade.multi_draw.pipeline",
            &shader,
            &[&bgl_uniforms, &bgl_textures],
            target_format,
        );
        Self {
            pipeline,
            bgl_uniforms,
            bgl_textures,
            dummy: TileTexture::dummy(device, queue, util::machine_is_little_endian()),
        }
    }

    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        config: &CommonDrawConfig,
        target: &DrawTarget<'_>,
        props: &MultiAnalyzeDrawProps<'_>,
    ) -> PipelineResult<()> {
        check_cardinality(props.inputs.len(), &props.bands)?;
        let globals_buf = uniform_buffer(
            device,
            "tileshade.multi_draw.globals",
            &config.globals(target.canvas_size),
        );
        let params_buf =
            uniform_buffer(device, "tileshade.multi_draw.params", &props.bands.to_raw());
        let colors_buf =
            uniform_buffer(device, "tileshade.multi_draw.colors", &props.colors.to_raw());
        let vbuf = vertex_buffer(
            device,
            "tileshade.multi_draw.vertices",
            &band_quad(config, props.canvas_coordinates, props.inputs),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.multi_draw.bg.uniforms"),
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
        let bg_textures = band_texture_group(
            device,
            &self.bgl_textures,
            props.inputs,
            &self.dummy,
            "tileshade.multi_draw.bg.textures",
        );

        let mut rpass = begin_pass(encoder, target, "tileshade.multi_draw.pass");
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
    use crate::filter::BandFilter;

    #[test]
    fn input_count_must_match_band_count() {
        let bands = BandSet::new(&[BandFilter::open(); 3]).unwrap();
        assert!(check_cardinality(3, &bands).is_ok());
        assert!(matches!(
            check_cardinality(2, &bands),
            Err(PipelineError::Configuration(_))
        ));
        assert!(check_cardinality(4, &bands).is_err());
    }
}
