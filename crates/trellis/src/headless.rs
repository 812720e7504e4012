//! A graphics context that records calls instead of rendering
//!
//! Used by the test suites of both crates to assert the exact sequence of
//! state changes and draws, and to catch leaked or double-freed handles.

use crate::assets::ImageData;
use crate::color::Color;
use crate::error::GfxError;
use crate::geometry::Rect;
use crate::gfx::{
    BlendMode, GraphicsContext, MeshHandle, ProgramHandle, ProgramKind, TextureHandle, Vertex,
};
use glam::Mat4;
use slotmap::SlotMap;

/// A recorded graphics call
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    Viewport(Rect),
    ScissorTest(bool),
    ScissorBox(Rect),
    Blend(Option<BlendMode>),
    DepthTest(bool),
    Clear(Color),
    CompileProgram(ProgramKind),
    DeleteProgram(ProgramHandle),
    UploadTexture { width: u32, height: u32 },
    DeleteTexture(TextureHandle),
    CreateMesh(MeshHandle),
    UpdateMesh(MeshHandle),
    DeleteMesh(MeshHandle),
    Draw {
        mesh: MeshHandle,
        program: ProgramHandle,
        texture: Option<TextureHandle>,
        transform: Mat4,
    },
}

/// Headless [`GraphicsContext`]
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<GfxCall>,
    programs: SlotMap<ProgramHandle, ProgramKind>,
    textures: SlotMap<TextureHandle, (u32, u32)>,
    meshes: SlotMap<MeshHandle, Vec<Vertex>>,
    failing_programs: Vec<ProgramKind>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `compile_program` fail for `kind`
    pub fn fail_program(&mut self, kind: ProgramKind) {
        self.failing_programs.push(kind);
    }

    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<GfxCall> {
        std::mem::take(&mut self.calls)
    }

    /// Recorded draw calls only
    pub fn draws(&self) -> Vec<&GfxCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, GfxCall::Draw { .. }))
            .collect()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh_vertices(&self, mesh: MeshHandle) -> Option<&[Vertex]> {
        self.meshes.get(mesh).map(Vec::as_slice)
    }

    pub fn program_kind(&self, program: ProgramHandle) -> Option<ProgramKind> {
        self.programs.get(program).copied()
    }
}

impl GraphicsContext for RecordingContext {
    fn set_viewport(&mut self, rect: Rect) {
        self.calls.push(GfxCall::Viewport(rect));
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.calls.push(GfxCall::ScissorTest(enabled));
    }

    fn set_scissor_box(&mut self, rect: Rect) {
        self.calls.push(GfxCall::ScissorBox(rect));
    }

    fn set_blend(&mut self, blend: Option<BlendMode>) {
        self.calls.push(GfxCall::Blend(blend));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(GfxCall::DepthTest(enabled));
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(GfxCall::Clear(color));
    }

    fn compile_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GfxError> {
        self.calls.push(GfxCall::CompileProgram(kind));
        if self.failing_programs.contains(&kind) {
            return Err(GfxError::ProgramCompile {
                name: kind.name().to_string(),
                reason: "rejected by recording context".to_string(),
            });
        }
        Ok(self.programs.insert(kind))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        assert!(
            self.programs.remove(program).is_some(),
            "program deleted twice or never created"
        );
        self.calls.push(GfxCall::DeleteProgram(program));
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, GfxError> {
        self.calls.push(GfxCall::UploadTexture {
            width: image.width,
            height: image.height,
        });
        Ok(self.textures.insert((image.width, image.height)))
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        assert!(
            self.textures.remove(texture).is_some(),
            "texture deleted twice or never created"
        );
        self.calls.push(GfxCall::DeleteTexture(texture));
    }

    fn create_mesh(&mut self, vertices: &[Vertex]) -> Result<MeshHandle, GfxError> {
        let mesh = self.meshes.insert(vertices.to_vec());
        self.calls.push(GfxCall::CreateMesh(mesh));
        Ok(mesh)
    }

    fn update_mesh(&mut self, mesh: MeshHandle, vertices: &[Vertex]) -> Result<(), GfxError> {
        let stored = self
            .meshes
            .get_mut(mesh)
            .ok_or(GfxError::UnknownHandle("mesh"))?;
        stored.clear();
        stored.extend_from_slice(vertices);
        self.calls.push(GfxCall::UpdateMesh(mesh));
        Ok(())
    }

    fn delete_mesh(&mut self, mesh: MeshHandle) {
        assert!(
            self.meshes.remove(mesh).is_some(),
            "mesh deleted twice or never created"
        );
        self.calls.push(GfxCall::DeleteMesh(mesh));
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
        self.calls.push(GfxCall::Draw {
            mesh,
            program,
            texture,
            transform: *transform,
        });
        Ok(())
    }
}
