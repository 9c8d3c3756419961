//! GPU-accelerated visualization renderer using wgpu compute shaders.
//!
//! Rendering happens in two passes: a scatter pass accumulates fixed-point
//! intensity per output pixel through atomics (digram cells or byte-triple
//! points), and a resolve pass converts the accumulation into RGBA. The
//! result is copied to a mapped buffer and read back for upload as an egui
//! texture. All failures degrade to the CPU generators.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use wgpu::util::DeviceExt;

use crate::gram::TABLE_CELLS;
use crate::viz::BlendCoeffs;

/// Visualization mode for GPU rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuViewMode {
    /// Byte-pair table scattered through the square/circle morph.
    Digram,
    /// Byte-triple point cloud (trigram and n-gram views).
    Cloud,
}

/// Per-frame parameters for a GPU render.
pub struct FrameParams {
    /// Combined perspective * model transform (identity for the digram).
    pub view_proj: Mat4,
    /// Digram square shape easing.
    pub square: f32,
    /// Digram circle shape easing.
    pub circle: f32,
    /// Point-cloud blend coefficients.
    pub coeffs: BlendCoeffs,
    /// Per-point exposure.
    pub brightness: f32,
}

/// Uniform parameters passed to the compute shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Uniforms {
    /// Column-major view-projection matrix.
    view_proj: [f32; 16],
    /// Output texture side length.
    tex_size: u32,
    /// Number of scatter items (table cells or triples).
    point_count: u32,
    /// Resolve style: 0 = phosphor cloud, 1 = hued digram.
    resolve_mode: u32,
    _pad: u32,
    c_square: f32,
    c_circle: f32,
    c_cylinder: f32,
    c_sphere: f32,
    c_flat: f32,
    c_layered_x: f32,
    c_layered_z: f32,
    brightness: f32,
}

/// GPU renderer for the visualisation textures.
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// Scatter pass for the digram table.
    digram_pipeline: wgpu::ComputePipeline,
    /// Scatter pass for the byte-triple point cloud.
    cloud_pipeline: wgpu::ComputePipeline,
    /// Accumulation -> RGBA pass.
    resolve_pipeline: wgpu::ComputePipeline,
    /// Bind group layout shared by all pipelines.
    bind_group_layout: wgpu::BindGroupLayout,
    /// Raw file bytes packed into u32 words.
    file_buffer: Option<wgpu::Buffer>,
    /// Normalised digram table (two f32 channels per cell).
    table_buffer: Option<wgpu::Buffer>,
    /// Current file size in bytes.
    file_size: u32,
}

impl GpuRenderer {
    /// Create a new GPU renderer. Returns None when no adapter or device is
    /// available; the caller falls back to CPU rendering.
    pub fn new() -> Option<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Gramscope GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .ok()?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Compute Bind Group Layout"),
            entries: &[
                // Uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Scatter input (file bytes or digram table)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Accumulation buffer (two u32 channels per pixel)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Output texture (resolve pass only)
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Compute Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let digram_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            include_str!("shaders/digram.wgsl"),
        );
        let cloud_pipeline =
            Self::create_pipeline(&device, &pipeline_layout, include_str!("shaders/cloud.wgsl"));
        let resolve_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            include_str!("shaders/resolve.wgsl"),
        );

        Some(Self {
            device,
            queue,
            digram_pipeline,
            cloud_pipeline,
            resolve_pipeline,
            bind_group_layout,
            file_buffer: None,
            table_buffer: None,
            file_size: 0,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader_source: &str,
    ) -> wgpu::ComputePipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Compute Pipeline"),
            layout: Some(layout),
            module: &shader_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        })
    }

    /// Maximum file size for GPU upload (below wgpu's default
    /// max_storage_buffer_binding_size of 128MB).
    const MAX_GPU_FILE_SIZE: usize = 120 * 1024 * 1024;

    /// Upload file bytes and the normalised digram table.
    /// Returns false if the file is too large for GPU buffers.
    pub fn upload(&mut self, data: &[u8], table_normalized: &[f32]) -> bool {
        self.file_size = data.len() as u32;

        if data.len() > Self::MAX_GPU_FILE_SIZE {
            log::info!(
                "file too large for GPU ({} MB > {} MB limit), using CPU fallback",
                data.len() / (1024 * 1024),
                Self::MAX_GPU_FILE_SIZE / (1024 * 1024)
            );
            self.file_buffer = None;
            self.table_buffer = None;
            return false;
        }

        self.file_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("File Data Buffer"),
                contents: data,
                usage: wgpu::BufferUsages::STORAGE,
            },
        ));

        self.table_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Digram Table Buffer"),
                contents: bytemuck::cast_slice(table_normalized),
                usage: wgpu::BufferUsages::STORAGE,
            },
        ));

        true
    }

    /// Render one frame to RGBA pixel data.
    pub fn render(&self, mode: GpuViewMode, tex_size: u32, params: &FrameParams) -> Vec<u8> {
        let (scatter_input, pipeline, point_count, resolve_mode) = match (mode, &self.table_buffer)
        {
            (GpuViewMode::Digram, Some(table)) => {
                (table, &self.digram_pipeline, TABLE_CELLS as u32, 1u32)
            }
            (GpuViewMode::Cloud, _) => match &self.file_buffer {
                Some(file) => (
                    file,
                    &self.cloud_pipeline,
                    self.file_size.saturating_sub(2),
                    0u32,
                ),
                None => return vec![0u8; (tex_size * tex_size * 4) as usize],
            },
            (GpuViewMode::Digram, None) => {
                return vec![0u8; (tex_size * tex_size * 4) as usize];
            }
        };

        let uniforms = Uniforms {
            view_proj: params.view_proj.to_cols_array(),
            tex_size,
            point_count,
            resolve_mode,
            _pad: 0,
            c_square: params.square,
            c_circle: params.circle,
            c_cylinder: params.coeffs.cylinder,
            c_sphere: params.coeffs.sphere,
            c_flat: params.coeffs.flat,
            c_layered_x: params.coeffs.layered_x,
            c_layered_z: params.coeffs.layered_z,
            brightness: params.brightness,
        };

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        // Zero-initialized by wgpu; two channels per pixel.
        let accum_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Accumulation Buffer"),
            size: (tex_size as u64) * (tex_size as u64) * 2 * 4,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let output_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Output Texture"),
            size: wgpu::Extent3d {
                width: tex_size,
                height: tex_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let output_view = output_texture.create_view(&Default::default());

        // bytes_per_row must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT (256)
        let unpadded_bytes_per_row = tex_size * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = (unpadded_bytes_per_row + align - 1) / align * align;
        let output_buffer_size = (padded_bytes_per_row * tex_size) as u64;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Output Buffer"),
            size: output_buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compute Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scatter_input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: accum_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&output_view),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compute Encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Scatter Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(point_count.div_ceil(256).max(1), 1, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Resolve Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.resolve_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let groups = tex_size.div_ceil(8);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &output_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(tex_size),
                },
            },
            wgpu::Extent3d {
                width: tex_size,
                height: tex_size,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        // Read back the result
        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv().unwrap().unwrap();

        let data = buffer_slice.get_mapped_range();

        // Remove row padding if present
        let result = if padded_bytes_per_row != unpadded_bytes_per_row {
            let mut unpacked = Vec::with_capacity((tex_size * tex_size * 4) as usize);
            for row in 0..tex_size {
                let start = (row * padded_bytes_per_row) as usize;
                let end = start + unpadded_bytes_per_row as usize;
                unpacked.extend_from_slice(&data[start..end]);
            }
            unpacked
        } else {
            data.to_vec()
        };

        drop(data);
        output_buffer.unmap();

        result
    }

    /// Check if the renderer has data uploaded and ready.
    pub fn is_ready(&self) -> bool {
        self.file_buffer.is_some()
    }
}
