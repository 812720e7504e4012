//! A solid block of palette color, optionally acting as a button

use crate::action::Action;
use crate::color::Color;
use crate::error::ResourceError;
use crate::geometry::{Point, Size};
use crate::gfx::GraphicsContext;
use crate::input::MouseButton;
use crate::pmv::PmvMatrix;
use crate::renderer::FlatRenderer;
use crate::resource::{ColorId, UiColors};
use crate::widget::{
    DrawContext, Drawable, InputTarget, Positionable, Sizable, Widget, WidgetBase,
};
use std::sync::Arc;

/// Leaf widget with a fixed preferred size.
///
/// Highlighted while hovered. When bound to an [`Action`] a left click
/// triggers it, and the box is greyed out while the action is disabled.
pub struct ColorBox {
    base: WidgetBase,
    preferred: Size,
    color: ColorId,
    action: Option<Arc<Action>>,
    hovered: bool,
    /// Enabled state the renderer was last updated for
    shown_enabled: bool,
    renderer: Option<FlatRenderer>,
}

impl ColorBox {
    pub fn new(name: Option<&str>, preferred: Size, color: ColorId) -> Self {
        Self {
            base: WidgetBase::new(name),
            preferred,
            color,
            action: None,
            hovered: false,
            shown_enabled: true,
            renderer: None,
        }
    }

    pub fn with_action(mut self, action: Arc<Action>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn set_color(&mut self, color: ColorId) {
        if self.color != color {
            self.color = color;
            self.base.mark_dirty();
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    fn is_enabled(&self) -> bool {
        self.action.as_ref().map_or(true, |action| action.is_enabled())
    }

    fn current_color(&self, ctx: &DrawContext<'_>) -> Result<Color, ResourceError> {
        let id = if !self.is_enabled() {
            UiColors::DISABLED
        } else if self.hovered {
            UiColors::HIGHLIGHT
        } else {
            self.color
        };
        ctx.resources.color(id)
    }
}

impl Sizable for ColorBox {
    fn preferred_size(&mut self) -> Size {
        self.preferred
    }

    fn size(&self) -> Size {
        self.base.size()
    }

    fn set_size(&mut self, size: Size) {
        self.base.set_size(size);
    }
}

impl Positionable for ColorBox {
    fn position(&self) -> Point {
        self.base.position()
    }

    fn set_position(&mut self, position: Point) {
        self.base.set_position(position);
    }
}

impl Drawable for ColorBox {
    fn init_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        let color = self.current_color(ctx)?;
        self.renderer = Some(FlatRenderer::new(ctx, self.base.rect(), color)?);
        self.shown_enabled = self.is_enabled();
        Ok(())
    }

    fn update_draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
        let color = self.current_color(ctx)?;
        let rect = self.base.rect();
        if let Some(renderer) = &mut self.renderer {
            renderer.set_rect(ctx, rect)?;
            renderer.set_color(ctx, color)?;
        }
        self.shown_enabled = self.is_enabled();
        Ok(())
    }

    fn do_draw(&self, ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError> {
        if let Some(renderer) = &self.renderer {
            renderer.draw(ctx, pmv)?;
        }
        Ok(())
    }

    fn release(&mut self, gfx: &mut dyn GraphicsContext) {
        if let Some(renderer) = self.renderer.take() {
            renderer.remove(gfx);
        }
    }

    fn needs_update(&self) -> bool {
        self.shown_enabled != self.is_enabled()
    }
}

impl InputTarget for ColorBox {
    fn mouse_clicked(&mut self, button: MouseButton, _position: Point) {
        if button != MouseButton::Left {
            return;
        }
        if let Some(action) = &self.action {
            action.trigger();
        }
    }

    fn mouse_entered(&mut self) {
        self.hovered = true;
        self.base.mark_dirty();
    }

    fn mouse_exited(&mut self) {
        self.hovered = false;
        self.base.mark_dirty();
    }
}

impl Widget for ColorBox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw;
    use crate::gfx::ProgramKind;
    use crate::headless::RecordingContext;
    use crate::resource::ResourceManager;
    use crate::rule::RuleGraph;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
    const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    fn resources(gfx: &mut RecordingContext) -> ResourceManager {
        let mut resources = ResourceManager::new();
        resources.add_program(gfx, ProgramKind::Flat).unwrap();
        resources.add_color(UiColors::WIDGET_BACKGROUND, RED).unwrap();
        resources.add_color(UiColors::DISABLED, GREY).unwrap();
        resources.add_color(UiColors::HIGHLIGHT, BLUE).unwrap();
        resources
    }

    fn shown_color(color_box: &ColorBox) -> Color {
        color_box.renderer.as_ref().unwrap().color()
    }

    #[test]
    fn test_click_triggers_enabled_action() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let action = Action::new("go", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut color_box = ColorBox::new(None, Size::new(20, 20), UiColors::WIDGET_BACKGROUND)
            .with_action(action);

        color_box.mouse_clicked(MouseButton::Right, Point::ZERO);
        color_box.mouse_clicked(MouseButton::Left, Point::ZERO);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_action_greys_out_on_next_frame() {
        let mut rules = RuleGraph::new();
        let enabled = rules.leaf(true);
        let action = Action::new("go", || {});
        action.bind(&mut rules, enabled);

        let mut color_box = ColorBox::new(None, Size::new(20, 20), UiColors::WIDGET_BACKGROUND)
            .with_action(action);
        color_box.set_size(Size::new(20, 20));

        let mut gfx = RecordingContext::new();
        let resources = resources(&mut gfx);
        let mut pmv = PmvMatrix::new();

        draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        assert_eq!(shown_color(&color_box), RED);
        assert!(!color_box.needs_update());

        rules.set(enabled, false);
        assert!(color_box.needs_update());
        draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        assert_eq!(shown_color(&color_box), GREY);
        assert!(!color_box.needs_update());
    }

    #[test]
    fn test_hover_highlights() {
        let mut color_box = ColorBox::new(None, Size::new(20, 20), UiColors::WIDGET_BACKGROUND);
        let mut gfx = RecordingContext::new();
        let resources = resources(&mut gfx);
        let mut pmv = PmvMatrix::new();

        draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        color_box.mouse_entered();
        draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        assert_eq!(shown_color(&color_box), BLUE);

        color_box.mouse_exited();
        draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        assert_eq!(shown_color(&color_box), RED);
    }

    #[test]
    fn test_missing_palette_color_fails_init() {
        let mut color_box = ColorBox::new(None, Size::new(20, 20), UiColors::BORDER);
        let mut gfx = RecordingContext::new();
        let resources = resources(&mut gfx);
        let mut pmv = PmvMatrix::new();

        let err = draw::draw(
            &mut color_box,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
    }
}
