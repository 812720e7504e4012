//! The graphics-context boundary
//!
//! The toolkit never talks to a rendering API directly. Everything it needs
//! (state setters, clearing, programs, textures, vertex buffers and draw
//! calls) goes through [`GraphicsContext`], which backends such as
//! `trellis-wgpu` implement. Resources are referred to by opaque handles; the
//! backend owns the real objects.
//!
//! All methods must be called on the thread that owns the context.

use crate::assets::ImageData;
use crate::color::Color;
use crate::error::GfxError;
use crate::geometry::Rect;
use glam::Mat4;

slotmap::new_key_type! {
    /// Handle to a compiled program owned by the backend
    pub struct ProgramHandle;
    /// Handle to an uploaded 2D texture owned by the backend
    pub struct TextureHandle;
    /// Handle to a vertex buffer owned by the backend
    pub struct MeshHandle;
}

/// The stock programs every backend provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Vertex colors only
    Flat,
    /// Texture sampled and tinted by the vertex color
    Texture,
    /// Texture red channel used as coverage for the vertex color
    Text,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 3] = [ProgramKind::Flat, ProgramKind::Texture, ProgramKind::Text];

    pub const fn name(&self) -> &'static str {
        match self {
            ProgramKind::Flat => "flat",
            ProgramKind::Texture => "texture",
            ProgramKind::Text => "text",
        }
    }
}

/// Blend equation applied to subsequent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`
    Alpha,
}

/// A vertex of a triangle-list mesh, in pixel coordinates
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 2], tex_coord: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            tex_coord,
            color,
        }
    }
}

/// Two triangles covering `rect`, texture coordinates spanning [0, 1]
pub fn quad(rect: Rect, color: Color) -> [Vertex; 6] {
    let [left, top, right, bottom] = rect.to_f32();
    let color = color.to_array();
    let top_left = Vertex::new([left, top], [0.0, 0.0], color);
    let top_right = Vertex::new([right, top], [1.0, 0.0], color);
    let bottom_left = Vertex::new([left, bottom], [0.0, 1.0], color);
    let bottom_right = Vertex::new([right, bottom], [1.0, 1.0], color);
    [
        top_left,
        bottom_left,
        bottom_right,
        top_left,
        bottom_right,
        top_right,
    ]
}

/// A live graphics context
pub trait GraphicsContext {
    /// Set the viewport in window pixels
    fn set_viewport(&mut self, rect: Rect);

    fn set_scissor_test(&mut self, enabled: bool);

    /// Set the scissor box in window pixels, origin top-left
    fn set_scissor_box(&mut self, rect: Rect);

    /// Set the blend mode; `None` disables blending
    fn set_blend(&mut self, blend: Option<BlendMode>);

    fn set_depth_test(&mut self, enabled: bool);

    /// Clear the color buffer (honours the scissor test)
    fn clear(&mut self, color: Color);

    fn compile_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GfxError>;

    fn delete_program(&mut self, program: ProgramHandle);

    /// Upload RGBA8 pixels as a 2D texture
    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, GfxError>;

    fn delete_texture(&mut self, texture: TextureHandle);

    fn create_mesh(&mut self, vertices: &[Vertex]) -> Result<MeshHandle, GfxError>;

    /// Replace the vertices of an existing mesh
    fn update_mesh(&mut self, mesh: MeshHandle, vertices: &[Vertex]) -> Result<(), GfxError>;

    fn delete_mesh(&mut self, mesh: MeshHandle);

    /// Draw a mesh with a program, an optional texture and a PMV transform
    fn draw(
        &mut self,
        mesh: MeshHandle,
        program: ProgramHandle,
        texture: Option<TextureHandle>,
        transform: &Mat4,
    ) -> Result<(), GfxError>;
}
