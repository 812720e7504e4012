//! Registries of graphics-context-bound resources
//!
//! The [`ResourceManager`] owns the programs, textures and palette colors of
//! one graphics context. Identifiers map to exactly one resource for the
//! lifetime of the context: registering an identifier twice is rejected with
//! [`ResourceError::Duplicate`] and the existing entry is kept. Looking up an
//! unknown identifier fails with [`ResourceError::NotFound`].
//!
//! Registration and disposal must happen on the thread that owns the context.

use crate::assets::{AssetLoader, ImageData};
use crate::color::Color;
use crate::error::{ResourceError, ResourceKind};
use crate::gfx::{GraphicsContext, ProgramHandle, ProgramKind, TextureHandle};
use std::collections::HashMap;
use std::path::Path;

/// Identifier of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub &'static str);

/// Identifier of a palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(pub &'static str);

/// Maps color identifiers to their key in a palette file
pub type ColorTable = [(ColorId, &'static str)];

/// Textures the toolkit loads itself
pub struct UiTextures;

impl UiTextures {
    pub const FONT: TextureId = TextureId("font");
}

/// Colors the toolkit reads from the palette
pub struct UiColors;

impl UiColors {
    pub const PANE_BACKGROUND: ColorId = ColorId("pane_background");
    pub const WIDGET_BACKGROUND: ColorId = ColorId("widget_background");
    pub const BORDER: ColorId = ColorId("border");
    pub const TEXT: ColorId = ColorId("text");
    pub const HIGHLIGHT: ColorId = ColorId("highlight");
    pub const DISABLED: ColorId = ColorId("disabled");

    pub const TABLE: &'static ColorTable = &[
        (Self::PANE_BACKGROUND, "pane.background"),
        (Self::WIDGET_BACKGROUND, "widget.background"),
        (Self::BORDER, "border"),
        (Self::TEXT, "text"),
        (Self::HIGHLIGHT, "highlight"),
        (Self::DISABLED, "disabled"),
    ];
}

/// Owner of every graphics resource registered against one context
#[derive(Debug, Default)]
pub struct ResourceManager {
    programs: HashMap<ProgramKind, ProgramHandle>,
    textures: HashMap<TextureId, TextureHandle>,
    colors: HashMap<ColorId, Color>,
    disposed: bool,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a stock program and register it under its kind
    pub fn add_program(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        kind: ProgramKind,
    ) -> Result<ProgramHandle, ResourceError> {
        self.ensure_live()?;
        if self.programs.contains_key(&kind) {
            return Err(duplicate(ResourceKind::Program, kind.name()));
        }

        let program = gfx.compile_program(kind)?;
        log::debug!("Registered program '{}'", kind.name());
        self.programs.insert(kind, program);
        Ok(program)
    }

    /// Decode the image at `path` and upload it under `id`
    pub fn load_texture(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        assets: &dyn AssetLoader,
        id: TextureId,
        path: &Path,
    ) -> Result<TextureHandle, ResourceError> {
        self.ensure_vacant_texture(id)?;
        let image = assets.load_image(path)?;
        self.add_texture(gfx, id, &image)
    }

    /// Upload already-decoded pixels under `id`
    pub fn add_texture(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        id: TextureId,
        image: &ImageData,
    ) -> Result<TextureHandle, ResourceError> {
        self.ensure_vacant_texture(id)?;
        let texture = gfx.upload_texture(image)?;
        log::debug!(
            "Registered texture '{}' ({}x{})",
            id.0,
            image.width,
            image.height
        );
        self.textures.insert(id, texture);
        Ok(texture)
    }

    /// Load every color named by `table` from the palette file at `path`.
    ///
    /// Either all colors of the table are registered or none are.
    pub fn load_colors(
        &mut self,
        assets: &dyn AssetLoader,
        table: &ColorTable,
        path: &Path,
    ) -> Result<(), ResourceError> {
        self.ensure_live()?;
        if let Some((id, _)) = table.iter().find(|(id, _)| self.colors.contains_key(id)) {
            return Err(duplicate(ResourceKind::Color, id.0));
        }

        let source = assets.read_to_string(path)?;
        let palette: HashMap<String, Color> =
            ron::from_str(&source).map_err(|e| ResourceError::Palette {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut resolved = Vec::with_capacity(table.len());
        for &(id, key) in table {
            let color = palette
                .get(key)
                .copied()
                .ok_or_else(|| ResourceError::MissingColor {
                    path: path.to_path_buf(),
                    key: key.to_string(),
                })?;
            resolved.push((id, color));
        }

        log::debug!("Loaded {} colors from {:?}", resolved.len(), path);
        self.colors.extend(resolved);
        Ok(())
    }

    /// Register a single color
    pub fn add_color(&mut self, id: ColorId, color: Color) -> Result<(), ResourceError> {
        self.ensure_live()?;
        if self.colors.contains_key(&id) {
            return Err(duplicate(ResourceKind::Color, id.0));
        }
        self.colors.insert(id, color);
        Ok(())
    }

    pub fn program(&self, kind: ProgramKind) -> Result<ProgramHandle, ResourceError> {
        self.programs
            .get(&kind)
            .copied()
            .ok_or_else(|| not_found(ResourceKind::Program, kind.name()))
    }

    pub fn texture(&self, id: TextureId) -> Result<TextureHandle, ResourceError> {
        self.textures
            .get(&id)
            .copied()
            .ok_or_else(|| not_found(ResourceKind::Texture, id.0))
    }

    pub fn color(&self, id: ColorId) -> Result<Color, ResourceError> {
        self.colors
            .get(&id)
            .copied()
            .ok_or_else(|| not_found(ResourceKind::Color, id.0))
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every owned graphics resource, textures before programs.
    ///
    /// Must run before the context is torn down. A second call is a no-op.
    pub fn dispose(&mut self, gfx: &mut dyn GraphicsContext) {
        if self.disposed {
            log::warn!("Resource manager disposed twice; ignoring");
            return;
        }

        log::debug!(
            "Disposing {} textures and {} programs",
            self.textures.len(),
            self.programs.len()
        );
        for (_, texture) in self.textures.drain() {
            gfx.delete_texture(texture);
        }
        for (_, program) in self.programs.drain() {
            gfx.delete_program(program);
        }
        self.colors.clear();
        self.disposed = true;
    }

    fn ensure_live(&self) -> Result<(), ResourceError> {
        if self.disposed {
            Err(ResourceError::Disposed)
        } else {
            Ok(())
        }
    }

    fn ensure_vacant_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.ensure_live()?;
        if self.textures.contains_key(&id) {
            return Err(duplicate(ResourceKind::Texture, id.0));
        }
        Ok(())
    }
}

fn not_found(kind: ResourceKind, id: &str) -> ResourceError {
    ResourceError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn duplicate(kind: ResourceKind, id: &str) -> ResourceError {
    ResourceError::Duplicate {
        kind,
        id: id.to_string(),
    }
}
