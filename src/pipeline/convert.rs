//! Ingestion pass: decode Terrain-RGB encoded DEM tiles into the canonical
//! packed representation on the GPU. The CPU decode path for the same
//! encoding lives in [`crate::convert`].

use crate::bounds::TextureBounds;
use crate::config::CommonDrawConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::texture::TILE_FORMAT;

use super::{
    begin_pass, build_quad, create_render_pipeline, create_shader, float_texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawTarget, FULL_TARGET_POSITIONS, SHADER_COMMON,
};

/// An uploaded Terrain-RGB tile, still in its encoded color form. Input to
/// the ingestion pass only; draw variants consume canonical textures.
pub struct EncodedDemTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: [u32; 2],
}

impl EncodedDemTexture {
    /// Upload raw RGBA8 pixels (row-major, 4 bytes per pixel).
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
        label: &str,
    ) -> PipelineResult<Self> {
        if pixels.len() != (width * height * 4) as usize {
            return Err(PipelineError::upload(format!(
                "expected {} bytes for a {}x{} RGBA tile, got {}",
                width * height * 4,
                width,
                height,
                pixels.len()
            )));
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            size: [width, height],
        })
    }

    /// Decode a PNG-encoded Terrain-RGB tile and upload it.
    pub fn from_png(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        png_bytes: &[u8],
        label: &str,
    ) -> PipelineResult<Self> {
        let img = image::load_from_memory(png_bytes)
            .map_err(|e| PipelineError::upload(format!("PNG decode failed: {e}")))?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(device, queue, width, height, img.as_raw(), label)
    }
}

/// Properties for one ingestion pass.
pub struct ConvertDemProps<'a> {
    pub encoded: &'a EncodedDemTexture,
}

/// GPU-side Terrain-RGB decode into a canonical intermediate target. Fully
/// transparent input pixels become the nodata value.
pub struct ConvertDemPipeline {
    pipeline: wgpu::RenderPipeline,
    bgl_uniforms: wgpu::BindGroupLayout,
    bgl_textures: wgpu::BindGroupLayout,
}

impl ConvertDemPipeline {
    pub fn create(device: &wgpu::Device) -> Self {
        let shader = create_shader(
            device,
            "tileshade.convert_dem.shader",
            &[SHADER_COMMON, include_str!("../shaders/convert_dem.wgsl")],
        );
        let bgl_uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.convert_dem.bgl.uniforms"),
            entries: &[uniform_entry(0)],
        });
        let bgl_textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tileshade.convert_dem.bgl.textures"),
            entries: &[float_texture_entry(0)],
        });
        let pipeline = create_render_pipeline(
            device,
            "tileshade.convert_dem.pipeline",
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
        props: &ConvertDemProps<'_>,
    ) -> PipelineResult<()> {
        let globals_buf = uniform_buffer(
            device,
            "tileshade.convert_dem.globals",
            &config.globals(target.canvas_size),
        );
        let vbuf = vertex_buffer(
            device,
            "tileshade.convert_dem.vertices",
            &build_quad(
                FULL_TARGET_POSITIONS,
                &[TextureBounds::full().tex_coord_vertices()],
            ),
        );

        let bg_uniforms = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.convert_dem.bg.uniforms"),
            layout: &self.bgl_uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });
        let bg_textures = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tileshade.convert_dem.bg.textures"),
            layout: &self.bgl_textures,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&props.encoded.view),
            }],
        });

        let mut rpass = begin_pass(encoder, target, "tileshade.convert_dem.pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bg_uniforms, &[]);
        rpass.set_bind_group(1, &bg_textures, &[]);
        rpass.set_vertex_buffer(0, vbuf.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }
}
