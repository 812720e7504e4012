//! [`GraphicsContext`] implementation on top of wgpu
//!
//! The toolkit issues immediate-mode style calls (state setters, clears and
//! draws). They are recorded into a frame list together with the state that
//! was current at the time and replayed in a single render pass by
//! [`WgpuContext::finish_frame`].

use glam::Mat4;
use slotmap::SlotMap;
use trellis::{
    BlendMode, Color, GfxError, GraphicsContext, ImageData, MeshHandle, ProgramHandle,
    ProgramKind, Rect, TextureHandle, Vertex,
};

const TRANSFORM_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;
const INITIAL_TRANSFORM_CAPACITY: usize = 64;
const INITIAL_FILL_CAPACITY: usize = 6 * 4;

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
        // position: vec2<f32> at location 0
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        },
        // tex_coord: vec2<f32> at location 1
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        },
        // color: vec4<f32> at location 2
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}

fn fragment_entry(kind: ProgramKind) -> &'static str {
    match kind {
        ProgramKind::Flat => "fs_flat",
        ProgramKind::Texture => "fs_texture",
        ProgramKind::Text => "fs_text",
    }
}

struct Program {
    kind: ProgramKind,
    blended: wgpu::RenderPipeline,
    opaque: wgpu::RenderPipeline,
}

impl Program {
    fn pipeline(&self, blend: Option<BlendMode>) -> &wgpu::RenderPipeline {
        match blend {
            Some(BlendMode::Alpha) => &self.blended,
            None => &self.opaque,
        }
    }
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct GpuMesh {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

/// Viewport and scissor captured when a command was recorded
#[derive(Debug, Clone, Copy)]
struct Clip {
    viewport: Rect,
    scissor: Option<Rect>,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Draw {
        program: ProgramHandle,
        mesh: MeshHandle,
        texture: Option<TextureHandle>,
        transform: u32,
        blend: Option<BlendMode>,
        clip: Clip,
    },
    /// A clear restricted by the scissor box, drawn as a full-screen quad
    Fill { first_vertex: u32, clip: Clip },
}

#[derive(Default)]
struct Frame {
    load: Option<Color>,
    transforms: Vec<Mat4>,
    fill_vertices: Vec<Vertex>,
    commands: Vec<Command>,
}

/// Fixed-function state as set by the toolkit
#[derive(Debug, Clone, Copy)]
struct RenderState {
    viewport: Rect,
    scissor_test: bool,
    scissor_box: Rect,
    blend: Option<BlendMode>,
    depth_test: bool,
}

impl RenderState {
    fn clip(&self) -> Clip {
        Clip {
            viewport: self.viewport,
            scissor: self.scissor_test.then_some(self.scissor_box),
        }
    }
}

/// A wgpu device and queue exposed as a [`GraphicsContext`]
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    transform_layout: wgpu::BindGroupLayout,
    transform_stride: u64,
    transform_capacity: usize,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,

    fill: Program,
    fill_capacity: usize,
    fill_buffer: wgpu::Buffer,
    white: GpuTexture,

    programs: SlotMap<ProgramHandle, Program>,
    textures: SlotMap<TextureHandle, GpuTexture>,
    meshes: SlotMap<MeshHandle, GpuMesh>,

    state: RenderState,
    surface_size: (u32, u32),
    frame: Frame,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        surface_size: (u32, u32),
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Trellis UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ui.wgsl").into()),
        });

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trellis Transform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(TRANSFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trellis Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Trellis Pipeline Layout"),
            bind_group_layouts: &[&transform_layout, &texture_layout],
            immediate_size: 0,
        });

        // Pixel-exact UI textures; keep sampling nearest
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Trellis Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let transform_stride = TRANSFORM_SIZE.div_ceil(alignment) * alignment;
        let (transform_buffer, transform_bind_group) = create_transform_buffer(
            &device,
            &transform_layout,
            transform_stride,
            INITIAL_TRANSFORM_CAPACITY,
        );

        let fill = create_program(&device, &shader, &pipeline_layout, format, ProgramKind::Flat);
        let fill_buffer = create_vertex_buffer(&device, "Trellis Fill Buffer", INITIAL_FILL_CAPACITY);

        let white = create_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &ImageData::solid(1, 1, [255, 255, 255, 255]),
        );

        let full = Rect::new(0, 0, surface_size.0, surface_size.1);
        Self {
            device,
            queue,
            format,
            shader,
            pipeline_layout,
            texture_layout,
            sampler,
            transform_layout,
            transform_stride,
            transform_capacity: INITIAL_TRANSFORM_CAPACITY,
            transform_buffer,
            transform_bind_group,
            fill,
            fill_capacity: INITIAL_FILL_CAPACITY,
            fill_buffer,
            white,
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            state: RenderState {
                viewport: full,
                scissor_test: false,
                scissor_box: full,
                blend: None,
                depth_test: false,
            },
            surface_size,
            frame: Frame::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Track the size of the render target; scissor boxes are clamped to it
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
    }

    /// Replay the recorded frame into `target` and submit it
    pub fn finish_frame(&mut self, target: &wgpu::TextureView) {
        let frame = std::mem::take(&mut self.frame);
        self.write_transforms(&frame.transforms);
        self.write_fill_vertices(&frame.fill_vertices);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trellis Frame Encoder"),
            });

        {
            let load = match frame.load {
                Some(color) => wgpu::LoadOp::Clear(to_wgpu_color(color)),
                None => wgpu::LoadOp::Load,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Trellis Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for command in &frame.commands {
                match *command {
                    Command::Draw {
                        program,
                        mesh,
                        texture,
                        transform,
                        blend,
                        clip,
                    } => {
                        let (Some(program), Some(mesh)) =
                            (self.programs.get(program), self.meshes.get(mesh))
                        else {
                            log::warn!("Skipping draw of a resource deleted mid-frame");
                            continue;
                        };
                        let bind_group = match texture {
                            Some(handle) => match self.textures.get(handle) {
                                Some(texture) => &texture.bind_group,
                                None => {
                                    log::warn!("Skipping draw of a texture deleted mid-frame");
                                    continue;
                                }
                            },
                            None => &self.white.bind_group,
                        };
                        if mesh.count == 0 || !self.apply_clip(&mut render_pass, clip) {
                            continue;
                        }

                        render_pass.set_pipeline(program.pipeline(blend));
                        render_pass.set_bind_group(
                            0,
                            &self.transform_bind_group,
                            &[self.transform_offset(transform)],
                        );
                        render_pass.set_bind_group(1, bind_group, &[]);
                        render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                        render_pass.draw(0..mesh.count, 0..1);
                    }
                    Command::Fill { first_vertex, clip } => {
                        let full = Clip {
                            viewport: self.full_rect(),
                            scissor: clip.scissor,
                        };
                        if !self.apply_clip(&mut render_pass, full) {
                            continue;
                        }

                        render_pass.set_pipeline(&self.fill.opaque);
                        render_pass.set_bind_group(
                            0,
                            &self.transform_bind_group,
                            &[self.transform_offset(0)],
                        );
                        render_pass.set_bind_group(1, &self.white.bind_group, &[]);
                        render_pass.set_vertex_buffer(0, self.fill_buffer.slice(..));
                        render_pass.draw(first_vertex..first_vertex + 6, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Drop everything recorded since the last [`finish_frame`](Self::finish_frame)
    pub fn discard_frame(&mut self) {
        self.frame = Frame::default();
    }

    fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.surface_size.0, self.surface_size.1)
    }

    fn transform_offset(&self, index: u32) -> wgpu::DynamicOffset {
        (u64::from(index) * self.transform_stride) as wgpu::DynamicOffset
    }

    /// Set viewport and scissor on the pass; `false` if nothing would be visible
    fn apply_clip(&self, render_pass: &mut wgpu::RenderPass<'_>, clip: Clip) -> bool {
        let full = self.full_rect();
        let viewport = clip.viewport.intersect(&full);
        let scissor = clip.scissor.unwrap_or(full).intersect(&full);
        if viewport.size.is_empty() || scissor.size.is_empty() {
            return false;
        }

        render_pass.set_viewport(
            viewport.x() as f32,
            viewport.y() as f32,
            viewport.width() as f32,
            viewport.height() as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            scissor.x() as u32,
            scissor.y() as u32,
            scissor.width(),
            scissor.height(),
        );
        true
    }

    fn write_transforms(&mut self, transforms: &[Mat4]) {
        if transforms.is_empty() {
            return;
        }

        if transforms.len() > self.transform_capacity {
            self.transform_capacity = transforms.len().next_power_of_two();
            let (buffer, bind_group) = create_transform_buffer(
                &self.device,
                &self.transform_layout,
                self.transform_stride,
                self.transform_capacity,
            );
            self.transform_buffer = buffer;
            self.transform_bind_group = bind_group;
        }

        let stride = self.transform_stride as usize;
        let mut bytes = vec![0u8; transforms.len() * stride];
        for (chunk, transform) in bytes.chunks_exact_mut(stride).zip(transforms) {
            let columns = transform.to_cols_array();
            chunk[..TRANSFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&columns));
        }
        self.queue.write_buffer(&self.transform_buffer, 0, &bytes);
    }

    fn write_fill_vertices(&mut self, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }

        if vertices.len() > self.fill_capacity {
            self.fill_capacity = vertices.len().next_power_of_two();
            self.fill_buffer =
                create_vertex_buffer(&self.device, "Trellis Fill Buffer", self.fill_capacity);
        }
        self.queue
            .write_buffer(&self.fill_buffer, 0, bytemuck::cast_slice(vertices));
    }

    fn push_transform(&mut self, transform: Mat4) -> u32 {
        // Index 0 is reserved for the identity used by scissored clears
        if self.frame.transforms.is_empty() {
            self.frame.transforms.push(Mat4::IDENTITY);
        }
        self.frame.transforms.push(transform);
        (self.frame.transforms.len() - 1) as u32
    }
}

impl GraphicsContext for WgpuContext {
    fn set_viewport(&mut self, rect: Rect) {
        self.state.viewport = rect;
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.state.scissor_test = enabled;
    }

    fn set_scissor_box(&mut self, rect: Rect) {
        self.state.scissor_box = rect;
    }

    fn set_blend(&mut self, blend: Option<BlendMode>) {
        self.state.blend = blend;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        // No depth attachment; draws land in submission order
        if enabled && !self.state.depth_test {
            log::debug!("Depth test requested but the surface has no depth buffer");
        }
        self.state.depth_test = enabled;
    }

    fn clear(&mut self, color: Color) {
        let clip = self.state.clip();
        match clip.scissor {
            None => {
                self.frame = Frame {
                    load: Some(color),
                    ..Frame::default()
                };
            }
            Some(_) => {
                if self.frame.transforms.is_empty() {
                    self.frame.transforms.push(Mat4::IDENTITY);
                }
                let first_vertex = self.frame.fill_vertices.len() as u32;
                self.frame.fill_vertices.extend(ndc_quad(color));
                self.frame.commands.push(Command::Fill { first_vertex, clip });
            }
        }
    }

    fn compile_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GfxError> {
        let program = create_program(
            &self.device,
            &self.shader,
            &self.pipeline_layout,
            self.format,
            kind,
        );
        log::debug!("Created {} program", kind.name());
        Ok(self.programs.insert(program))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        match self.programs.remove(program) {
            Some(program) => log::debug!("Deleted {} program", program.kind.name()),
            None => log::warn!("Deleting unknown program handle"),
        }
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, GfxError> {
        if image.width == 0 || image.height == 0 {
            return Err(GfxError::TextureUpload(format!(
                "empty texture {}x{}",
                image.width, image.height
            )));
        }
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() != expected {
            return Err(GfxError::TextureUpload(format!(
                "expected {expected} bytes of RGBA8 for {}x{}, got {}",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }
        let limit = self.device.limits().max_texture_dimension_2d;
        if image.width > limit || image.height > limit {
            return Err(GfxError::TextureUpload(format!(
                "{}x{} exceeds the device limit of {limit}",
                image.width, image.height
            )));
        }

        let texture = create_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            image,
        );
        Ok(self.textures.insert(texture))
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(texture).is_none() {
            log::warn!("Deleting unknown texture handle");
        }
    }

    fn create_mesh(&mut self, vertices: &[Vertex]) -> Result<MeshHandle, GfxError> {
        let capacity = vertices.len().max(1);
        let buffer = create_vertex_buffer(&self.device, "Trellis Mesh Buffer", capacity);
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&buffer, 0, bytemuck::cast_slice(vertices));
        }
        Ok(self.meshes.insert(GpuMesh {
            buffer,
            capacity,
            count: vertices.len() as u32,
        }))
    }

    fn update_mesh(&mut self, mesh: MeshHandle, vertices: &[Vertex]) -> Result<(), GfxError> {
        let entry = self
            .meshes
            .get_mut(mesh)
            .ok_or(GfxError::UnknownHandle("mesh"))?;

        if vertices.len() > entry.capacity {
            entry.capacity = vertices.len().next_power_of_two();
            entry.buffer = create_vertex_buffer(&self.device, "Trellis Mesh Buffer", entry.capacity);
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&entry.buffer, 0, bytemuck::cast_slice(vertices));
        }
        entry.count = vertices.len() as u32;
        Ok(())
    }

    fn delete_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(mesh).is_none() {
            log::warn!("Deleting unknown mesh handle");
        }
    }

    fn draw(
        &mut self,
        mesh: MeshHandle,
        program: ProgramHandle,
        texture: Option<TextureHandle>,
        transform: &Mat4,
    ) -> Result<(), GfxError> {
        if !self.meshes.contains_key(mesh) {
            return Err(GfxError::UnknownHandle("mesh"));
        }
        if !self.programs.contains_key(program) {
            return Err(GfxError::UnknownHandle("program"));
        }
        if let Some(texture) = texture {
            if !self.textures.contains_key(texture) {
                return Err(GfxError::UnknownHandle("texture"));
            }
        }

        let transform = self.push_transform(*transform);
        let clip = self.state.clip();
        self.frame.commands.push(Command::Draw {
            program,
            mesh,
            texture,
            transform,
            blend: self.state.blend,
            clip,
        });
        Ok(())
    }
}

fn to_wgpu_color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(color.r),
        g: f64::from(color.g),
        b: f64::from(color.b),
        a: f64::from(color.a),
    }
}

/// Two triangles covering all of clip space
fn ndc_quad(color: Color) -> [Vertex; 6] {
    let color = color.to_array();
    let top_left = Vertex::new([-1.0, 1.0], [0.0, 0.0], color);
    let top_right = Vertex::new([1.0, 1.0], [1.0, 0.0], color);
    let bottom_left = Vertex::new([-1.0, -1.0], [0.0, 1.0], color);
    let bottom_right = Vertex::new([1.0, -1.0], [1.0, 1.0], color);
    [
        top_left,
        bottom_left,
        bottom_right,
        top_left,
        bottom_right,
        top_right,
    ]
}

fn create_program(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    kind: ProgramKind,
) -> Program {
    let create = |blend: Option<wgpu::BlendState>, label: &str| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry(kind)),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    };

    Program {
        kind,
        blended: create(
            Some(wgpu::BlendState::ALPHA_BLENDING),
            &format!("Trellis {} Pipeline (blended)", kind.name()),
        ),
        opaque: create(None, &format!("Trellis {} Pipeline", kind.name())),
    }
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity * std::mem::size_of::<Vertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_transform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Trellis Transform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Trellis Transform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(TRANSFORM_SIZE),
            }),
        }],
    });

    (buffer, bind_group)
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &ImageData,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Trellis Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Trellis Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}
