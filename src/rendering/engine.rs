use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::backend::RenderBackend;
use super::mesh::{scene_vertices, Vertex, BOX_VERTEX_COUNT};
use super::shaders::{FS_BACKGROUND, FS_TABLE, TABLE_SHADER, VS_BACKGROUND, VS_TABLE};
use super::uniforms::FrameUniforms;
use super::{Camera, RenderError, RenderResult, Scene};
use crate::host::SurfaceId;
use crate::utils::logging::log_adapter_info;

/// The window has exactly one presentable surface.
const WINDOW_SURFACE: SurfaceId = SurfaceId(1);

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Boxes the vertex buffer holds before it has to grow.
const INITIAL_BOX_CAPACITY: usize = 32;

/// wgpu renderer for a winit window.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    uniforms: FrameUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    background_pipeline: wgpu::RenderPipeline,
    table_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    surface_live: bool,
    released: bool,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>, vsync: bool) -> RenderResult<Self> {
        info!("Initializing WGPU backend");

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreation { reason: e.to_string() })?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterUnavailable)?;
        log_adapter_info(&adapter);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Card Table Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::DeviceRequest { reason: e.to_string() })?;
        info!("WGPU device and queue created");

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| RenderError::SurfaceCreation {
                reason: "surface is not supported by the adapter".to_string(),
            })?;
        config.present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        debug!("Surface format {:?}, present mode {:?}", config.format, config.present_mode);

        let depth_view = create_depth_view(&device, config.width, config.height);

        let uniforms = FrameUniforms::new();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("frame_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Table Shader"),
            source: wgpu::ShaderSource::Wgsl(TABLE_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Card Table Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // The background is drawn first and never touches depth.
        let background_pipeline = create_pipeline(
            &device,
            &layout,
            &shader,
            config.format,
            PipelineKind::Background,
        );
        let table_pipeline =
            create_pipeline(&device, &layout, &shader, config.format, PipelineKind::Table);
        info!("Render pipelines created");

        let vertex_capacity = INITIAL_BOX_CAPACITY * BOX_VERTEX_COUNT;
        let vertex_buffer = create_vertex_buffer(&device, vertex_capacity);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            uniforms,
            uniform_buffer,
            bind_group,
            background_pipeline,
            table_pipeline,
            vertex_buffer,
            vertex_capacity,
            surface_live: false,
            released: false,
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        if vertices.len() > self.vertex_capacity {
            let capacity = vertices.len().next_power_of_two();
            debug!("Growing vertex buffer {} -> {} vertices", self.vertex_capacity, capacity);
            self.vertex_buffer = create_vertex_buffer(&self.device, capacity);
            self.vertex_capacity = capacity;
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceId> {
        if self.released {
            return Err(RenderError::SurfaceCreation {
                reason: "backend already released".to_string(),
            });
        }
        if self.surface_live {
            return Err(RenderError::SurfaceCreation {
                reason: "window surface already created".to_string(),
            });
        }
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
        }
        self.reconfigure();
        self.surface_live = true;
        info!("Window surface configured at {}x{}", self.config.width, self.config.height);
        Ok(WINDOW_SURFACE)
    }

    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32) {
        if surface != WINDOW_SURFACE || !self.surface_live {
            return;
        }
        if width == 0 || height == 0 {
            debug!("Ignoring zero-area resize to {}x{}", width, height);
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn draw(&mut self, surface: SurfaceId, scene: &Scene, camera: &Camera) -> RenderResult<()> {
        if surface != WINDOW_SURFACE || !self.surface_live {
            return Err(RenderError::SurfaceUnavailable { surface });
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring and skipping frame");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => {
                error!("Surface error: {:?}", e);
                return Err(RenderError::Frame { reason: e.to_string() });
            }
        };

        self.uniforms.update(scene, camera);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniforms]));

        let vertices = scene_vertices(scene);
        self.upload_vertices(&vertices);

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Card Table Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Card Table Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(0, &self.bind_group, &[]);

            render_pass.set_pipeline(&self.background_pipeline);
            render_pass.draw(0..3, 0..1);

            if !vertices.is_empty() {
                render_pass.set_pipeline(&self.table_pipeline);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();

        trace!("Drew {} vertices", vertices.len());
        Ok(())
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        if surface == WINDOW_SURFACE && self.surface_live {
            self.surface_live = false;
            debug!("Window surface released");
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.surface_live = false;
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
        self.released = true;
        info!("WGPU backend released");
    }
}

enum PipelineKind {
    Background,
    Table,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let (label, vs_entry, fs_entry, buffers, cull_mode, depth_write_enabled, depth_compare) =
        match kind {
            PipelineKind::Background => (
                "Background Pipeline",
                VS_BACKGROUND,
                FS_BACKGROUND,
                Vec::new(),
                None,
                false,
                wgpu::CompareFunction::Always,
            ),
            PipelineKind::Table => (
                "Table Pipeline",
                VS_TABLE,
                FS_TABLE,
                vec![Vertex::desc()],
                Some(wgpu::Face::Back),
                true,
                wgpu::CompareFunction::Less,
            ),
        };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Table Vertex Buffer"),
        size: (vertices * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
