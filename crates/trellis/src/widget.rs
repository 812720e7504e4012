//! Widget capabilities
//!
//! A widget is anything that is [`Sizable`], [`Positionable`], [`Drawable`]
//! and an [`InputTarget`]. The lifecycle bookkeeping lives in a
//! [`WidgetBase`] every widget embeds; the draw state machine that drives the
//! `Drawable` hooks is implemented once, generically, in [`crate::draw`].

use crate::error::ResourceError;
use crate::geometry::{Point, Rect, Size};
use crate::gfx::GraphicsContext;
use crate::input::{KeyEvent, MouseButton};
use crate::pmv::PmvMatrix;
use crate::resource::ResourceManager;

/// Where a widget is in its draw lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    /// No graphics resources allocated yet
    Uninitialized,
    /// `init_draw` has run for the current context
    Initialized,
    /// Resources released; the widget can no longer be drawn
    Disposed,
}

/// Name, geometry and lifecycle state shared by every widget
#[derive(Debug, Clone)]
pub struct WidgetBase {
    name: Option<String>,
    position: Point,
    size: Size,
    phase: DrawPhase,
    dirty: bool,
}

impl WidgetBase {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_owned),
            position: Point::ZERO,
            size: Size::ZERO,
            phase: DrawPhase::Uninitialized,
            dirty: false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The widget's own area in local coordinates
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.size)
    }

    /// The widget's area in its parent's coordinates
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn set_size(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.dirty = true;
        }
    }

    pub fn set_position(&mut self, position: Point) {
        debug_assert!(
            position.x >= 0 && position.y >= 0,
            "widget positions are never negative"
        );
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Request an `update_draw` before the next frame's `do_draw`
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_phase(&mut self, phase: DrawPhase) {
        self.phase = phase;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Everything a widget needs to create, update and issue draws
pub struct DrawContext<'a> {
    pub gfx: &'a mut dyn GraphicsContext,
    pub resources: &'a ResourceManager,
}

impl<'a> DrawContext<'a> {
    pub fn new(gfx: &'a mut dyn GraphicsContext, resources: &'a ResourceManager) -> Self {
        Self { gfx, resources }
    }
}

pub trait Sizable {
    /// The size this widget would choose if unconstrained.
    ///
    /// Containers may provisionally size their children while answering.
    fn preferred_size(&mut self) -> Size;

    fn size(&self) -> Size;

    /// Impose the widget's size; only the parent (or the window, for the root) calls this
    fn set_size(&mut self, size: Size);
}

pub trait Positionable {
    fn position(&self) -> Point;

    /// Impose the widget's position within its parent
    fn set_position(&mut self, position: Point);
}

/// Hooks of the four-phase draw lifecycle.
///
/// Never call these directly; use [`crate::draw::draw`] and
/// [`crate::draw::remove`], which enforce the phase ordering.
pub trait Drawable {
    /// Allocate graphics resources sized to the current bounds
    fn init_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError>;

    /// Bring resources in line with changed geometry or visual state
    fn update_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError>;

    /// Issue draw calls; must not change widget state
    fn do_draw(&self, ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError>;

    /// Release the widget's own resources (children are handled by `remove_children`)
    fn release(&mut self, gfx: &mut dyn GraphicsContext);

    /// Visual state changed outside of `WidgetBase` since the last frame
    fn needs_update(&self) -> bool {
        false
    }

    /// Draw child widgets after this widget's own `do_draw`
    fn draw_children(
        &mut self,
        _ctx: &mut DrawContext<'_>,
        _pmv: &mut PmvMatrix,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Remove child widgets after this widget released its own resources
    fn remove_children(&mut self, _gfx: &mut dyn GraphicsContext) {}
}

/// Input handlers invoked by the event router. The default for every handler is a no-op.
pub trait InputTarget {
    fn mouse_clicked(&mut self, _button: MouseButton, _position: Point) {}

    fn mouse_pressed(&mut self, _button: MouseButton, _position: Point) {}

    fn mouse_released(&mut self, _button: MouseButton, _position: Point) {}

    fn mouse_moved(&mut self, _position: Point) {}

    fn mouse_dragged(&mut self, _position: Point) {}

    fn mouse_entered(&mut self) {}

    fn mouse_exited(&mut self) {}

    fn mouse_wheel_moved(&mut self, _rotation: f32, _position: Point) {}

    fn key_pressed(&mut self, _event: &KeyEvent) {}

    fn key_released(&mut self, _event: &KeyEvent) {}
}

/// A node of the retained widget tree
pub trait Widget: Sizable + Positionable + Drawable + InputTarget + Send {
    fn base(&self) -> &WidgetBase;

    fn base_mut(&mut self) -> &mut WidgetBase;

    fn name(&self) -> Option<&str> {
        self.base().name()
    }

    /// Area in the parent's coordinates
    fn bounds(&self) -> Rect {
        self.base().bounds()
    }
}

impl std::fmt::Debug for dyn Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name())
            .field("bounds", &self.bounds())
            .field("phase", &self.base().phase())
            .finish()
    }
}
