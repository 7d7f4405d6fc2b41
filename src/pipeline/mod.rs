//! Draw/calc variant pipelines.
//!
//! Every variant shares the same skeleton: a 4-vertex triangle-strip quad,
//! depth testing disabled, viewport set per invocation from the canvas
//! size, and per-invocation uniform snapshots built fresh from the caller's
//! property bundle. Calc variants write intermediate canonical targets;
//! Draw variants write the caller's surface. The pipeline performs no
//! dependency tracking between the two; callers sequence Calc before Draw.

pub mod convert;
pub mod diff;
pub mod interpolate;
pub mod multi;
pub mod single;
pub mod smooth;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::color::{SCALE_MAX_LENGTH, SENTINEL_MAX_LENGTH};
use crate::filter::MAX_BANDS;
use crate::util;

pub(crate) const SHADER_COMMON: &str = include_str!("../shaders/common.wgsl");
pub(crate) const SHADER_COLORSCALE: &str = include_str!("../shaders/colorscale.wgsl");
pub(crate) const SHADER_MULTIBAND: &str = include_str!("../shaders/multiband.wgsl");

/// Compose a variant's kernel from the shared snippets plus its own source,
/// splicing the uniform-layout bounds all kernels must agree on.
pub(crate) fn create_shader(
    device: &wgpu::Device,
    label: &str,
    parts: &[&str],
) -> wgpu::ShaderModule {
    let src = util::compose_shader(
        parts,
        &[
            ("SCALE_MAX_LENGTH", SCALE_MAX_LENGTH as u32),
            ("SENTINEL_MAX_LENGTH", SENTINEL_MAX_LENGTH as u32),
            ("MAX_BANDS", MAX_BANDS as u32),
        ],
    );
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(src.into()),
    })
}

// ---------- Vertex plumbing ----------

/// One quad vertex: screen position plus a texture coordinate per input
/// slot. Variants with fewer slots leave the rest zeroed; the vertex buffer
/// always carries all seven attributes so every pipeline shares one layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct TileVertex {
    pub position: [f32; 2],
    pub uv: [[f32; 2]; MAX_BANDS],
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
    2 => Float32x2,
    3 => Float32x2,
    4 => Float32x2,
    5 => Float32x2,
    6 => Float32x2
];

pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TileVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

pub(crate) fn build_quad(positions: [[f32; 2]; 4], uv_sets: &[[[f32; 2]; 4]]) -> [TileVertex; 4] {
    let mut verts = [TileVertex::zeroed(); 4];
    for (i, vert) in verts.iter_mut().enumerate() {
        vert.position = positions[i];
        for (slot, uvs) in uv_sets.iter().enumerate() {
            vert.uv[slot] = uvs[i];
        }
    }
    verts
}

/// NDC quad for full-target passes (smoothing, ingestion), strip order
/// matching [`crate::config::CommonDrawConfig::quad_positions`].
pub(crate) const FULL_TARGET_POSITIONS: [[f32; 2]; 4] =
    [[-1.0, 1.0], [1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

// ---------- Bind group layout helpers ----------

pub(crate) fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn uint_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Uint,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn float_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

// ---------- Shared pipeline construction ----------

pub(crate) fn create_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bgls: &[&wgpu::BindGroupLayout],
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: bgls,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        // No depth buffer for 2D tile drawing; leaving it enabled produces
        // artifacts when it is not cleared between draws.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// Where one invocation draws: a surface or intermediate view plus the
/// canvas dimensions the viewport and transform derive from.
pub struct DrawTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub canvas_size: [u32; 2],
    /// `Some` clears the target before drawing; `None` composites over
    /// whatever is already there.
    pub clear: Option<wgpu::Color>,
}

pub(crate) fn begin_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    target: &DrawTarget<'a>,
    label: &str,
) -> wgpu::RenderPass<'a> {
    let load = match target.clear {
        Some(c) => wgpu::LoadOp::Clear(c),
        None => wgpu::LoadOp::Load,
    };
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    rpass.set_viewport(
        0.0,
        0.0,
        target.canvas_size[0] as f32,
        target.canvas_size[1] as f32,
        0.0,
        1.0,
    );
    rpass
}

pub(crate) fn uniform_buffer<T: Pod>(
    device: &wgpu::Device,
    label: &str,
    value: &T,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM,
    })
}

pub(crate) fn vertex_buffer(
    device: &wgpu::Device,
    label: &str,
    verts: &[TileVertex; 4],
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(verts),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

// ---------- Umbrella ----------

/// Every variant pipeline for one surface/tile-size configuration, compiled
/// once and reused (read-only) across serially executed invocations.
pub struct TilePipelines {
    pub single: single::SingleTilePipeline,
    pub hs_pregen: single::HsPregenPipeline,
    pub interpolate_value: interpolate::InterpolateValuePipeline,
    pub interpolate_color: interpolate::InterpolateColorPipeline,
    pub interpolate_color_only: interpolate::InterpolateColorOnlyPipeline,
    pub multi_calc: multi::MultiAnalyzeCalcPipeline,
    pub multi_draw: multi::MultiAnalyzeDrawPipeline,
    pub diff_calc: diff::DiffCalcPipeline,
    pub diff_draw: diff::DiffDrawPipeline,
    pub smooth: smooth::ConvolutionSmoothPipeline,
    pub convert_dem: convert::ConvertDemPipeline,
}

impl TilePipelines {
    /// Compile all variants targeting `surface_format` for the Draw stages.
    /// Calc stages always target the canonical intermediate format.
    pub fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        log::debug!("compiling tile pipelines for {:?}", surface_format);
        Self {
            single: single::SingleTilePipeline::create(device, surface_format),
            hs_pregen: single::HsPregenPipeline::create(device, surface_format),
            interpolate_value: interpolate::InterpolateValuePipeline::create(
                device,
                surface_format,
            ),
            interpolate_color: interpolate::InterpolateColorPipeline::create(
                device,
                surface_format,
            ),
            interpolate_color_only: interpolate::InterpolateColorOnlyPipeline::create(
                device,
                surface_format,
            ),
            multi_calc: multi::MultiAnalyzeCalcPipeline::create(device, queue),
            multi_draw: multi::MultiAnalyzeDrawPipeline::create(device, queue, surface_format),
            diff_calc: diff::DiffCalcPipeline::create(device),
            diff_draw: diff::DiffDrawPipeline::create(device, surface_format),
            smooth: smooth::ConvolutionSmoothPipeline::create(device),
            convert_dem: convert::ConvertDemPipeline::create(device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_vertices_carry_per_slot_uvs() {
        let positions = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let uv_a = [[0.0, 0.0], [0.5, 0.0], [0.0, 0.5], [0.5, 0.5]];
        let uv_b = [[0.5, 0.5], [1.0, 0.5], [0.5, 1.0], [1.0, 1.0]];
        let quad = build_quad(positions, &[uv_a, uv_b]);
        assert_eq!(quad[1].position, [1.0, 0.0]);
        assert_eq!(quad[1].uv[0], [0.5, 0.0]);
        assert_eq!(quad[1].uv[1], [1.0, 0.5]);
        // unused slots stay zeroed
        assert_eq!(quad[1].uv[2], [0.0, 0.0]);
    }

    #[test]
    fn vertex_stride_covers_position_plus_six_uvs() {
        assert_eq!(std::mem::size_of::<TileVertex>(), (2 + 2 * MAX_BANDS) * 4);
    }
}
