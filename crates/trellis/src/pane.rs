//! Vertical layout container
//!
//! ```text
//! +----------+---+
//! | Widget 1 |   |
//! +----------+   |
//! | Widget 2 |   |
//! +----------+---+
//! | Widget 3     |
//! +--------------+
//! ```
//!
//! Children keep their preferred height and are stretched to the pane's
//! interior width. The preferred width is that of the widest child, the
//! preferred height the sum of the children's heights plus the padding between
//! them. A bordered pane adds the border on every side and paints a
//! background behind its children.

use crate::color::Color;
use crate::draw;
use crate::error::ResourceError;
use crate::geometry::{Point, Size};
use crate::gfx::GraphicsContext;
use crate::input::{KeyEvent, MouseButton};
use crate::pmv::PmvMatrix;
use crate::renderer::FlatRenderer;
use crate::resource::ColorId;
use crate::widget::{
    DrawContext, Drawable, InputTarget, Positionable, Sizable, Widget, WidgetBase,
};

/// Vertical gap between children
pub const PADDING: u32 = 5;

/// Width of the border around the children
pub const BORDER: u32 = 5;

/// Background used when no palette color was chosen
pub const BACKGROUND_COLOR: Color = Color::rgb(0.235, 0.247, 0.254);

/// Lays child widgets out in a single column
pub struct VerticalPane {
    base: WidgetBase,
    widgets: Vec<Box<dyn Widget>>,
    /// Removed children whose resources are released on the next frame
    retired: Vec<Box<dyn Widget>>,
    border: bool,
    padding: u32,
    border_width: u32,
    background_color: Option<ColorId>,
    background: Option<FlatRenderer>,
    hovered: Option<usize>,
    focused: Option<usize>,
    pressed: Option<usize>,
}

impl VerticalPane {
    pub fn new(name: Option<&str>, border: bool) -> Self {
        Self {
            base: WidgetBase::new(name),
            widgets: Vec::new(),
            retired: Vec::new(),
            border,
            padding: PADDING,
            border_width: BORDER,
            background_color: None,
            background: None,
            hovered: None,
            focused: None,
            pressed: None,
        }
    }

    /// Override the default padding and border widths
    pub fn with_spacing(mut self, padding: u32, border: u32) -> Self {
        self.padding = padding;
        self.border_width = border;
        self.update_layout();
        self
    }

    /// Paint the background with a palette color instead of [`BACKGROUND_COLOR`]
    pub fn with_background_color(mut self, color: ColorId) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Append a widget and re-run the layout
    pub fn add(&mut self, widget: impl Widget + 'static) {
        self.add_boxed(Box::new(widget));
    }

    pub fn add_boxed(&mut self, widget: Box<dyn Widget>) {
        self.widgets.push(widget);
        self.update_layout();
    }

    /// Take the widget at `index` out of the pane.
    ///
    /// Its graphics resources are released during the pane's next draw.
    pub fn remove_widget(&mut self, index: usize) {
        if index >= self.widgets.len() {
            log::warn!(
                "Pane {:?} has no widget at index {}",
                self.base.name(),
                index
            );
            return;
        }

        let widget = self.widgets.remove(index);
        self.retired.push(widget);
        self.hovered = None;
        self.focused = None;
        self.pressed = None;
        self.update_layout();
    }

    pub fn widgets(&self) -> &[Box<dyn Widget>] {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut self.widgets
    }

    pub fn has_border(&self) -> bool {
        self.border
    }

    fn inset(&self) -> u32 {
        if self.border {
            self.border_width
        } else {
            0
        }
    }

    /// Position every child for the pane's current size
    fn update_layout(&mut self) {
        let inset = self.inset();
        let x = inset as i32;
        let mut y = inset as i32;
        let width = self.base.size().width.saturating_sub(inset * 2);

        for widget in &mut self.widgets {
            let height = widget.preferred_size().height;
            widget.set_size(Size::new(width, height));
            widget.set_position(Point::new(x, y));
            y += (height + self.padding) as i32;
        }
    }

    fn child_at(&self, position: Point) -> Option<usize> {
        self.widgets
            .iter()
            .position(|widget| widget.bounds().contains(position))
    }

    fn to_child(&self, index: usize, position: Point) -> Point {
        position.relative_to(self.widgets[index].position())
    }

    fn resolve_background(&self, ctx: &DrawContext<'_>) -> Result<Color, ResourceError> {
        match self.background_color {
            Some(id) => ctx.resources.color(id),
            None => Ok(BACKGROUND_COLOR),
        }
    }
}

impl Sizable for VerticalPane {
    fn preferred_size(&mut self) -> Size {
        if self.widgets.is_empty() {
            return Size::ZERO;
        }

        let mut width = 0;
        let mut height = 0;
        for widget in &mut self.widgets {
            let preferred = widget.preferred_size();
            widget.set_size(preferred);
            width = width.max(preferred.width);
            height += preferred.height;
        }
        height += self.padding * (self.widgets.len() as u32 - 1);

        let inset = self.inset();
        Size::new(width + inset * 2, height + inset * 2)
    }

    fn size(&self) -> Size {
        self.base.size()
    }

    fn set_size(&mut self, size: Size) {
        self.base.set_size(size);
        self.update_layout();
    }
}

impl Positionable for VerticalPane {
    fn position(&self) -> Point {
        self.base.position()
    }

    fn set_position(&mut self, position: Point) {
        self.base.set_position(position);
    }
}

impl Drawable for VerticalPane {
    fn init_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        if self.border {
            let color = self.resolve_background(ctx)?;
            self.background = Some(FlatRenderer::new(ctx, self.base.rect(), color)?);
        }
        Ok(())
    }

    fn update_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        let rect = self.base.rect();
        if let Some(background) = &mut self.background {
            background.set_rect(ctx, rect)?;
        }
        Ok(())
    }

    fn do_draw(&self, ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError> {
        if let Some(background) = &self.background {
            background.draw(ctx, pmv)?;
        }
        Ok(())
    }

    fn release(&mut self, gfx: &mut dyn GraphicsContext) {
        if let Some(background) = self.background.take() {
            background.remove(gfx);
        }
    }

    fn draw_children(
        &mut self,
        ctx: &mut DrawContext<'_>,
        pmv: &mut PmvMatrix,
    ) -> Result<(), ResourceError> {
        for mut widget in self.retired.drain(..) {
            draw::remove(widget.as_mut(), &mut *ctx.gfx);
        }

        for widget in &mut self.widgets {
            pmv.push(widget.bounds());
            ctx.gfx.set_scissor_box(pmv.scissor_box());
            let result = draw::draw(widget.as_mut(), ctx, pmv);
            pmv.pop();
            ctx.gfx.set_scissor_box(pmv.scissor_box());
            result?;
        }
        Ok(())
    }

    fn remove_children(&mut self, gfx: &mut dyn GraphicsContext) {
        for mut widget in self.retired.drain(..) {
            draw::remove(widget.as_mut(), gfx);
        }
        for widget in &mut self.widgets {
            draw::remove(widget.as_mut(), gfx);
        }
    }
}

impl InputTarget for VerticalPane {
    fn mouse_clicked(&mut self, button: MouseButton, position: Point) {
        if let Some(index) = self.child_at(position) {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_clicked(button, local);
        }
    }

    fn mouse_pressed(&mut self, button: MouseButton, position: Point) {
        let target = self.child_at(position);
        self.pressed = target;
        self.focused = target;
        if let Some(index) = target {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_pressed(button, local);
        }
    }

    fn mouse_released(&mut self, button: MouseButton, position: Point) {
        // The child that saw the press also sees the release
        if let Some(index) = self.pressed.take().or_else(|| self.child_at(position)) {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_released(button, local);
        }
    }

    fn mouse_moved(&mut self, position: Point) {
        let target = self.child_at(position);
        if target != self.hovered {
            if let Some(previous) = self.hovered {
                self.widgets[previous].mouse_exited();
            }
            if let Some(next) = target {
                self.widgets[next].mouse_entered();
            }
            self.hovered = target;
        }

        if let Some(index) = target {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_moved(local);
        }
    }

    fn mouse_dragged(&mut self, position: Point) {
        if let Some(index) = self.pressed.or_else(|| self.child_at(position)) {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_dragged(local);
        }
    }

    fn mouse_exited(&mut self) {
        if let Some(previous) = self.hovered.take() {
            self.widgets[previous].mouse_exited();
        }
    }

    fn mouse_wheel_moved(&mut self, rotation: f32, position: Point) {
        if let Some(index) = self.child_at(position) {
            let local = self.to_child(index, position);
            self.widgets[index].mouse_wheel_moved(rotation, local);
        }
    }

    fn key_pressed(&mut self, event: &KeyEvent) {
        if let Some(index) = self.focused {
            self.widgets[index].key_pressed(event);
        }
    }

    fn key_released(&mut self, event: &KeyEvent) {
        if let Some(index) = self.focused {
            self.widgets[index].key_released(event);
        }
    }
}

impl Widget for VerticalPane {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }
}
