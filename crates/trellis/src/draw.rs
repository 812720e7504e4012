//! The four-phase draw state machine
//!
//! ```text
//! Uninitialized --init_draw--> Initialized --(update_draw?)--> do_draw --> Initialized
//! Initialized --remove--> Disposed
//! ```
//!
//! These functions are the only place the [`Drawable`](crate::Drawable) hooks
//! are invoked from. They are generic over any [`Widget`], so concrete widgets
//! implement the hooks and never track their own phase. Violating the order
//! (updating or drawing before initialization, drawing a disposed widget) is
//! a lifecycle bug and panics.

use crate::error::ResourceError;
use crate::gfx::GraphicsContext;
use crate::pmv::PmvMatrix;
use crate::widget::{DrawContext, DrawPhase, Widget};

/// Run one frame of the lifecycle for `widget` and its children.
///
/// Initializes lazily on the first call, updates when geometry or visual
/// state changed since the previous frame, then draws.
pub fn draw<W: Widget + ?Sized>(
    widget: &mut W,
    ctx: &mut DrawContext<'_>,
    pmv: &mut PmvMatrix,
) -> Result<(), ResourceError> {
    match widget.base().phase() {
        DrawPhase::Disposed => panic!(
            "draw called on disposed widget {:?}",
            widget.name().unwrap_or("<unnamed>")
        ),
        DrawPhase::Uninitialized => init_draw(widget, ctx)?,
        DrawPhase::Initialized => {
            if widget.base().is_dirty() || widget.needs_update() {
                update_draw(widget, ctx)?;
            }
        }
    }

    do_draw(widget, ctx, pmv)?;
    widget.draw_children(ctx, pmv)
}

/// Allocate the widget's resources. Runs once per widget per context.
pub fn init_draw<W: Widget + ?Sized>(
    widget: &mut W,
    ctx: &mut DrawContext<'_>,
) -> Result<(), ResourceError> {
    assert_eq!(
        widget.base().phase(),
        DrawPhase::Uninitialized,
        "init_draw called twice on widget {:?}",
        widget.name()
    );

    widget.init_draw(ctx)?;
    let base = widget.base_mut();
    base.set_phase(DrawPhase::Initialized);
    base.clear_dirty();
    Ok(())
}

/// Bring resources in line with the widget's current state
pub fn update_draw<W: Widget + ?Sized>(
    widget: &mut W,
    ctx: &mut DrawContext<'_>,
) -> Result<(), ResourceError> {
    assert_initialized(widget, "update_draw");

    widget.update_draw(ctx)?;
    widget.base_mut().clear_dirty();
    Ok(())
}

/// Issue the widget's own draw calls (children excluded)
pub fn do_draw<W: Widget + ?Sized>(
    widget: &W,
    ctx: &mut DrawContext<'_>,
    pmv: &PmvMatrix,
) -> Result<(), ResourceError> {
    assert_initialized(widget, "do_draw");
    widget.do_draw(ctx, pmv)
}

/// Release the widget's resources, then its children's.
///
/// Safe on a widget that was never initialized or was already removed.
pub fn remove<W: Widget + ?Sized>(widget: &mut W, gfx: &mut dyn GraphicsContext) {
    match widget.base().phase() {
        DrawPhase::Disposed => return,
        DrawPhase::Initialized => widget.release(gfx),
        DrawPhase::Uninitialized => {}
    }

    widget.remove_children(gfx);
    widget.base_mut().set_phase(DrawPhase::Disposed);
}

fn assert_initialized<W: Widget + ?Sized>(widget: &W, operation: &str) {
    assert!(
        widget.base().phase() == DrawPhase::Initialized,
        "{} called on widget {:?} in phase {:?}; init_draw must run first",
        operation,
        widget.name(),
        widget.base().phase()
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::headless::RecordingContext;
    use crate::resource::ResourceManager;
    use crate::widget::{Drawable, InputTarget, Positionable, Sizable, WidgetBase};
    use std::sync::{Arc, Mutex};

    /// Records the lifecycle hooks it receives
    pub(crate) struct Probe {
        base: WidgetBase,
        preferred: Size,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Probe {
        pub(crate) fn new(name: &str, preferred: Size, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                base: WidgetBase::new(Some(name)),
                preferred,
                log,
            }
        }

        fn record(&self, hook: &str) {
            let name = self.base.name().unwrap_or_default();
            self.log.lock().unwrap().push(format!("{name}:{hook}"));
        }
    }

    impl Sizable for Probe {
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

    impl Positionable for Probe {
        fn position(&self) -> Point {
            self.base.position()
        }

        fn set_position(&mut self, position: Point) {
            self.base.set_position(position);
        }
    }

    impl Drawable for Probe {
        fn init_draw(&mut self, _ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
            self.record("init");
            Ok(())
        }

        fn update_draw(&mut self, _ctx: &mut DrawContext<'_>) -> Result<(), ResourceError> {
            self.record("update");
            Ok(())
        }

        fn do_draw(&self, _ctx: &mut DrawContext<'_>, pmv: &PmvMatrix) -> Result<(), ResourceError> {
            let offset = pmv.offset();
            self.record(&format!("draw@{},{}", offset.x, offset.y));
            Ok(())
        }

        fn release(&mut self, _gfx: &mut dyn GraphicsContext) {
            self.record("release");
        }
    }

    impl InputTarget for Probe {
        fn mouse_clicked(&mut self, button: crate::MouseButton, position: Point) {
            self.record(&format!("click {:?} {},{}", button, position.x, position.y));
        }

        fn mouse_pressed(&mut self, _button: crate::MouseButton, position: Point) {
            self.record(&format!("press {},{}", position.x, position.y));
        }

        fn mouse_moved(&mut self, position: Point) {
            self.record(&format!("move {},{}", position.x, position.y));
        }

        fn mouse_entered(&mut self) {
            self.record("enter");
        }

        fn mouse_exited(&mut self) {
            self.record("exit");
        }

        fn mouse_wheel_moved(&mut self, rotation: f32, _position: Point) {
            self.record(&format!("wheel {rotation}"));
        }

        fn key_pressed(&mut self, _event: &crate::KeyEvent) {
            self.record("key");
        }
    }

    impl Widget for Probe {
        fn base(&self) -> &WidgetBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut WidgetBase {
            &mut self.base
        }
    }

    fn probe() -> (Probe, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Probe::new("p", Size::new(10, 10), log.clone()), log)
    }

    #[test]
    fn test_first_draw_initializes_then_draws() {
        let (mut widget, log) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut pmv = PmvMatrix::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        draw(&mut widget, &mut ctx, &mut pmv).unwrap();
        draw(&mut widget, &mut ctx, &mut pmv).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["p:init", "p:draw@0,0", "p:draw@0,0"]
        );
        assert_eq!(widget.base().phase(), DrawPhase::Initialized);
    }

    #[test]
    fn test_geometry_change_triggers_single_update() {
        let (mut widget, log) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut pmv = PmvMatrix::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        draw(&mut widget, &mut ctx, &mut pmv).unwrap();
        widget.set_size(Size::new(40, 40));
        draw(&mut widget, &mut ctx, &mut pmv).unwrap();
        draw(&mut widget, &mut ctx, &mut pmv).unwrap();

        let updates = log.lock().unwrap().iter().filter(|e| *e == "p:update").count();
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_size_set_before_init_needs_no_update() {
        let (mut widget, log) = probe();
        widget.set_size(Size::new(40, 40));
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut pmv = PmvMatrix::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        draw(&mut widget, &mut ctx, &mut pmv).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["p:init", "p:draw@0,0"]);
    }

    #[test]
    #[should_panic(expected = "init_draw must run first")]
    fn test_update_before_init_panics() {
        let (mut widget, _) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        let _ = update_draw(&mut widget, &mut ctx);
    }

    #[test]
    #[should_panic(expected = "init_draw must run first")]
    fn test_do_draw_before_init_panics() {
        let (widget, _) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let pmv = PmvMatrix::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        let _ = do_draw(&widget, &mut ctx, &pmv);
    }

    #[test]
    fn test_init_then_do_draw_succeeds() {
        let (mut widget, _) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let pmv = PmvMatrix::new();
        let mut ctx = DrawContext::new(&mut gfx, &resources);

        init_draw(&mut widget, &mut ctx).unwrap();
        assert!(do_draw(&widget, &mut ctx, &pmv).is_ok());
    }

    #[test]
    fn test_remove_before_init_is_noop() {
        let (mut widget, log) = probe();
        let mut gfx = RecordingContext::new();

        remove(&mut widget, &mut gfx);
        assert!(log.lock().unwrap().is_empty());
        assert!(gfx.calls().is_empty());
    }

    #[test]
    fn test_remove_releases_once() {
        let (mut widget, log) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut pmv = PmvMatrix::new();

        draw(
            &mut widget,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        )
        .unwrap();
        remove(&mut widget, &mut gfx);
        remove(&mut widget, &mut gfx);

        let releases = log.lock().unwrap().iter().filter(|e| *e == "p:release").count();
        assert_eq!(releases, 1);
        assert_eq!(widget.base().phase(), DrawPhase::Disposed);
    }

    #[test]
    #[should_panic(expected = "disposed widget")]
    fn test_draw_after_remove_panics() {
        let (mut widget, _) = probe();
        let mut gfx = RecordingContext::new();
        let resources = ResourceManager::new();
        let mut pmv = PmvMatrix::new();

        remove(&mut widget, &mut gfx);
        let _ = draw(
            &mut widget,
            &mut DrawContext::new(&mut gfx, &resources),
            &mut pmv,
        );
    }
}
