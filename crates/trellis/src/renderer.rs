//! Quad renderers owned by widgets
//!
//! A renderer wraps one backend mesh. Widgets create renderers in
//! `init_draw`, adjust them in `update_draw`, draw them in `do_draw` and
//! hand them back in `release`.

use crate::color::Color;
use crate::error::ResourceError;
use crate::geometry::Rect;
use crate::gfx::{quad, GraphicsContext, MeshHandle, ProgramKind};
use crate::pmv::PmvMatrix;
use crate::resource::TextureId;
use crate::widget::DrawContext;

/// A solid colored rectangle
#[derive(Debug)]
pub struct FlatRenderer {
    mesh: MeshHandle,
    rect: Rect,
    color: Color,
}

impl FlatRenderer {
    pub fn new(ctx: &mut DrawContext<'_>, rect: Rect, color: Color) -> Result<Self, ResourceError> {
        let mesh = ctx.gfx.create_mesh(&quad(rect, color))?;
        Ok(Self { mesh, rect, color })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Move/resize the rectangle; vertices are only re-uploaded on change
    pub fn set_rect(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) -> Result<(), ResourceError> {
        if self.rect == rect {
            return Ok(());
        }
        self.rect = rect;
        self.upload(ctx)
    }

    pub fn set_color(&mut self, ctx: &mut DrawContext<'_>, color: Color) -> Result<(), ResourceError> {
        if self.color == color {
            return Ok(());
        }
        self.color = color;
        self.upload(ctx)
    }

    pub fn draw(&self, ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError> {
        let program = ctx.resources.program(ProgramKind::Flat)?;
        ctx.gfx.draw(self.mesh, program, None, &pmv.pmv())?;
        Ok(())
    }

    pub fn remove(self, gfx: &mut dyn GraphicsContext) {
        gfx.delete_mesh(self.mesh);
    }

    fn upload(&self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        ctx.gfx.update_mesh(self.mesh, &quad(self.rect, self.color))?;
        Ok(())
    }
}

/// A textured rectangle, tinted by a color
#[derive(Debug)]
pub struct TextureRenderer {
    mesh: MeshHandle,
    texture: TextureId,
    rect: Rect,
    tint: Color,
}

impl TextureRenderer {
    pub fn new(
        ctx: &mut DrawContext<'_>,
        texture: TextureId,
        rect: Rect,
    ) -> Result<Self, ResourceError> {
        // Fail early rather than on the first draw
        ctx.resources.texture(texture)?;
        let tint = Color::WHITE;
        let mesh = ctx.gfx.create_mesh(&quad(rect, tint))?;
        Ok(Self {
            mesh,
            texture,
            rect,
            tint,
        })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn set_rect(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) -> Result<(), ResourceError> {
        if self.rect == rect {
            return Ok(());
        }
        self.rect = rect;
        self.upload(ctx)
    }

    pub fn set_tint(&mut self, ctx: &mut DrawContext<'_>, tint: Color) -> Result<(), ResourceError> {
        if self.tint == tint {
            return Ok(());
        }
        self.tint = tint;
        self.upload(ctx)
    }

    pub fn draw(&self, ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError> {
        let program = ctx.resources.program(ProgramKind::Texture)?;
        let texture = ctx.resources.texture(self.texture)?;
        ctx.gfx.draw(self.mesh, program, Some(texture), &pmv.pmv())?;
        Ok(())
    }

    pub fn remove(self, gfx: &mut dyn GraphicsContext) {
        gfx.delete_mesh(self.mesh);
    }

    fn upload(&self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        ctx.gfx.update_mesh(self.mesh, &quad(self.rect, self.tint))?;
        Ok(())
    }
}
