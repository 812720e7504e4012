//! The window: root widget, resources and the frame driver
//!
//! [`UiWindow`] is owned by the thread that owns the graphics context. The
//! windowing backend calls its [`SurfaceListener`] methods at the documented
//! points of the surface lifecycle and feeds it input through the
//! [`MouseListener`] and [`KeyListener`] implementations.
//!
//! Other threads never touch the widget tree directly. They hold a
//! [`WindowHandle`] and submit work items or input events, which the window
//! drains at the start of every frame, in submission order.

use crate::assets::AssetLoader;
use crate::config::WindowConfig;
use crate::draw;
use crate::error::ResourceError;
use crate::geometry::{Point, Rect, Size};
use crate::gfx::{BlendMode, GraphicsContext, ProgramKind};
use crate::input::{KeyEvent, RawMouseEvent};
use crate::pmv::PmvMatrix;
use crate::resource::{ResourceManager, UiColors, UiTextures};
use crate::router::{EventRouter, KeyEventKind, KeyListener, MouseEventKind, MouseListener};
use crate::widget::{DrawContext, Widget};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A unit of work run on the frame thread
pub type WorkItem = Box<dyn FnOnce(&mut UiWindow) + Send>;

enum Message {
    Invoke(WorkItem),
    Mouse(MouseEventKind, RawMouseEvent),
    Key(KeyEventKind, KeyEvent),
}

/// Lifecycle callbacks of a drawable surface
pub trait SurfaceListener {
    /// The graphics context was created
    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), ResourceError>;

    /// The graphics context is about to be destroyed
    fn dispose(&mut self, gfx: &mut dyn GraphicsContext);

    /// Render one frame
    fn display(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), ResourceError>;

    /// The surface moved to `(x, y)` and now measures `width` x `height`
    fn reshape(&mut self, gfx: &mut dyn GraphicsContext, x: i32, y: i32, width: u32, height: u32);
}

/// Thread-safe access to a [`UiWindow`] from outside the frame thread
#[derive(Clone)]
pub struct WindowHandle {
    sender: Sender<Message>,
    stopped: Arc<AtomicBool>,
}

impl WindowHandle {
    /// Run `work` on the frame thread before the next frame is drawn
    pub fn invoke(&self, work: impl FnOnce(&mut UiWindow) + Send + 'static) {
        self.send(Message::Invoke(Box::new(work)));
    }

    pub fn post_mouse(&self, kind: MouseEventKind, event: RawMouseEvent) {
        self.send(Message::Mouse(kind, event));
    }

    pub fn post_key(&self, kind: KeyEventKind, event: KeyEvent) {
        self.send(Message::Key(kind, event));
    }

    /// Ask the window to shut down
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            log::info!("Window stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn send(&self, message: Message) {
        if self.sender.send(message).is_err() {
            log::warn!("Window is gone; message dropped");
        }
    }
}

impl std::fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Root of a widget tree bound to one graphics context
pub struct UiWindow {
    config: WindowConfig,
    assets: Box<dyn AssetLoader + Send>,
    resources: ResourceManager,
    pmv: PmvMatrix,
    root: Option<Box<dyn Widget>>,
    /// Replaced roots whose resources are released on the next frame
    retired: Vec<Box<dyn Widget>>,
    size: Size,
    position: Point,
    focus_requested: bool,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    stopped: Arc<AtomicBool>,
}

impl UiWindow {
    pub fn new(config: WindowConfig, assets: impl AssetLoader + Send + 'static) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let size = Size::new(config.width, config.height);
        Self {
            config,
            assets: Box::new(assets),
            resources: ResourceManager::new(),
            pmv: PmvMatrix::new(),
            root: None,
            retired: Vec::new(),
            size,
            position: Point::ZERO,
            focus_requested: false,
            sender,
            receiver,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> WindowHandle {
        WindowHandle {
            sender: self.sender.clone(),
            stopped: self.stopped.clone(),
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Replace the root widget. The new root is sized to the window; the old
    /// one releases its resources during the next frame.
    pub fn set_root_widget(&mut self, root: Option<Box<dyn Widget>>) {
        let previous = std::mem::replace(&mut self.root, root);
        if let Some(previous) = previous {
            self.retired.push(previous);
        }
        if let Some(root) = &mut self.root {
            root.set_size(self.size);
        }
    }

    pub fn root_widget(&self) -> Option<&dyn Widget> {
        match &self.root {
            Some(root) => Some(root.as_ref()),
            None => None,
        }
    }

    pub fn root_widget_mut(&mut self) -> Option<&mut dyn Widget> {
        match &mut self.root {
            Some(root) => Some(root.as_mut()),
            None => None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Position of the window on screen
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Ask the windowing layer to give this window keyboard focus
    pub fn request_focus(&mut self) {
        self.focus_requested = true;
    }

    /// Consume a pending focus request
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn pmv(&self) -> &PmvMatrix {
        &self.pmv
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Ask the window to shut down. Safe to call more than once.
    pub fn stop(&self) {
        self.handle().stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Run queued work items and input events, in submission order
    pub fn process_pending(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                Message::Invoke(work) => work(self),
                Message::Mouse(kind, event) => kind.dispatch(self, &event),
                Message::Key(kind, event) => kind.dispatch(self, &event),
            }
        }
    }

    fn router(&mut self) -> EventRouter<'_> {
        EventRouter::new(match &mut self.root {
            Some(root) => Some(root.as_mut()),
            None => None,
        })
    }

    fn release_retired(&mut self, gfx: &mut dyn GraphicsContext) {
        for mut widget in self.retired.drain(..) {
            draw::remove(widget.as_mut(), gfx);
        }
    }
}

impl SurfaceListener for UiWindow {
    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), ResourceError> {
        log::info!("Initialising the window");

        if let Some(path) = &self.config.font_texture {
            self.resources
                .load_texture(gfx, self.assets.as_ref(), UiTextures::FONT, path)?;
        }

        for kind in ProgramKind::ALL {
            self.resources.add_program(gfx, kind)?;
        }

        if let Some(path) = &self.config.palette {
            self.resources
                .load_colors(self.assets.as_ref(), UiColors::TABLE, path)?;
        }
        Ok(())
    }

    fn dispose(&mut self, gfx: &mut dyn GraphicsContext) {
        log::info!("Disposing the window");
        self.release_retired(gfx);
        if let Some(root) = &mut self.root {
            draw::remove(root.as_mut(), gfx);
        }
        self.resources.dispose(gfx);
    }

    fn display(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), ResourceError> {
        self.process_pending();
        self.release_retired(gfx);

        gfx.set_scissor_test(false);
        gfx.clear(self.config.clear_color);
        gfx.set_scissor_test(true);

        gfx.set_blend(Some(BlendMode::Alpha));
        gfx.set_depth_test(false);

        if let Some(root) = &mut self.root {
            gfx.set_scissor_box(self.pmv.scissor_box());
            let mut ctx = DrawContext::new(gfx, &self.resources);
            draw::draw(root.as_mut(), &mut ctx, &mut self.pmv)?;
        }
        Ok(())
    }

    fn reshape(&mut self, gfx: &mut dyn GraphicsContext, x: i32, y: i32, width: u32, height: u32) {
        log::info!("Reshaping the window - {}x{} at ({}, {})", width, height, x, y);
        let full = Rect::new(0, 0, width, height);
        gfx.set_viewport(full);

        self.pmv.identity();
        self.pmv.orthographic(full);
        self.pmv.set_screen_size(full.size);
        self.pmv.set_scissor_box(full);

        self.size = full.size;
        if let Some(root) = &mut self.root {
            root.set_size(full.size);
        }
    }
}

impl MouseListener for UiWindow {
    fn mouse_clicked(&mut self, event: &RawMouseEvent) {
        self.router().mouse_clicked(event);
    }

    fn mouse_pressed(&mut self, event: &RawMouseEvent) {
        self.router().mouse_pressed(event);
    }

    fn mouse_released(&mut self, event: &RawMouseEvent) {
        self.router().mouse_released(event);
    }

    fn mouse_entered(&mut self, event: &RawMouseEvent) {
        self.router().mouse_entered(event);
    }

    fn mouse_exited(&mut self, event: &RawMouseEvent) {
        self.router().mouse_exited(event);
    }

    fn mouse_dragged(&mut self, event: &RawMouseEvent) {
        self.router().mouse_dragged(event);
    }

    fn mouse_moved(&mut self, event: &RawMouseEvent) {
        self.router().mouse_moved(event);
    }

    fn mouse_wheel_moved(&mut self, event: &RawMouseEvent) {
        self.router().mouse_wheel_moved(event);
    }
}

impl KeyListener for UiWindow {
    fn key_pressed(&mut self, event: &KeyEvent) {
        self.router().key_pressed(event);
    }

    fn key_released(&mut self, event: &KeyEvent) {
        self.router().key_released(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, MemoryAssets};
    use crate::color::Color;
    use crate::draw::tests::Probe;
    use crate::headless::{GfxCall, RecordingContext};
    use crate::input::device;
    use crate::pane::VerticalPane;
    use crate::widget::DrawPhase;
    use glam::Vec2;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const PALETTE: &str = r#"{
        "pane.background": (r: 0.235, g: 0.247, b: 0.254),
        "widget.background": (r: 0.3, g: 0.3, b: 0.3),
        "border": (r: 0.1, g: 0.1, b: 0.1),
        "text": (r: 1.0, g: 1.0, b: 1.0),
        "highlight": (r: 0.2, g: 0.4, b: 0.8),
        "disabled": (r: 0.5, g: 0.5, b: 0.5),
    }"#;

    type Log = Arc<Mutex<Vec<String>>>;

    fn window() -> UiWindow {
        let config = WindowConfig {
            font_texture: Some(PathBuf::from("font.png")),
            ..Default::default()
        };
        let assets = MemoryAssets::new()
            .with_file("colors.ron", PALETTE)
            .with_image("font.png", ImageData::solid(8, 8, [255; 4]));
        UiWindow::new(config, assets)
    }

    fn probe(name: &str, log: &Log) -> Box<dyn Widget> {
        Box::new(Probe::new(name, Size::new(10, 10), log.clone()))
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_init_registers_ui_resources() {
        let mut window = window();
        let mut gfx = RecordingContext::new();

        window.init(&mut gfx).unwrap();

        assert_eq!(gfx.live_programs(), 3);
        assert_eq!(gfx.live_textures(), 1);
        assert!(window.resources().texture(UiTextures::FONT).is_ok());
        assert_eq!(
            window.resources().color(UiColors::PANE_BACKGROUND).unwrap(),
            Color::rgb(0.235, 0.247, 0.254)
        );
    }

    #[test]
    fn test_init_fails_without_palette() {
        let mut window = UiWindow::new(WindowConfig::default(), MemoryAssets::new());
        let mut gfx = RecordingContext::new();

        let err = window.init(&mut gfx).unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
    }

    #[test]
    fn test_reshape_updates_projection_scissor_and_root() {
        let log = Log::default();
        let mut window = window();
        let mut gfx = RecordingContext::new();
        window.set_root_widget(Some(probe("root", &log)));

        window.reshape(&mut gfx, 0, 0, 800, 600);

        assert_eq!(gfx.calls(), &[GfxCall::Viewport(Rect::new(0, 0, 800, 600))]);
        assert_eq!(window.size(), Size::new(800, 600));
        assert_eq!(window.pmv().screen_size(), Size::new(800, 600));
        assert_eq!(window.pmv().scissor_box(), Rect::new(0, 0, 800, 600));
        assert_eq!(window.root_widget().unwrap().size(), Size::new(800, 600));

        let corner = window.pmv().project(Vec2::new(800.0, 600.0));
        assert!((corner - Vec2::new(1.0, -1.0)).length() < 1e-5);
        let origin = window.pmv().project(Vec2::ZERO);
        assert!((origin - Vec2::new(-1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_empty_window_renders_cleared_frame() {
        let mut window = window();
        let mut gfx = RecordingContext::new();
        window.reshape(&mut gfx, 0, 0, 800, 600);
        gfx.take_calls();

        window.display(&mut gfx).unwrap();

        assert_eq!(
            gfx.calls(),
            &[
                GfxCall::ScissorTest(false),
                GfxCall::Clear(Color::BLACK),
                GfxCall::ScissorTest(true),
                GfxCall::Blend(Some(BlendMode::Alpha)),
                GfxCall::DepthTest(false),
            ]
        );
    }

    #[test]
    fn test_frame_draws_root_after_state_setup() {
        let mut window = window();
        let mut gfx = RecordingContext::new();
        window.init(&mut gfx).unwrap();
        window.reshape(&mut gfx, 0, 0, 200, 100);
        window.set_root_widget(Some(Box::new(VerticalPane::new(Some("root"), true))));
        gfx.take_calls();

        window.display(&mut gfx).unwrap();

        let calls = gfx.take_calls();
        let depth = calls
            .iter()
            .position(|c| *c == GfxCall::DepthTest(false))
            .unwrap();
        let draw = calls
            .iter()
            .position(|c| matches!(c, GfxCall::Draw { .. }))
            .unwrap();
        assert!(depth < draw);
        assert!(calls.contains(&GfxCall::ScissorBox(Rect::new(0, 0, 200, 100))));
        assert_eq!(
            window.root_widget().unwrap().base().phase(),
            DrawPhase::Initialized
        );
    }

    #[test]
    fn test_replaced_root_released_on_next_frame() {
        let log = Log::default();
        let mut window = window();
        let mut gfx = RecordingContext::new();
        window.set_root_widget(Some(probe("old", &log)));
        window.display(&mut gfx).unwrap();

        window.set_root_widget(Some(probe("new", &log)));
        take(&log);
        window.display(&mut gfx).unwrap();

        assert_eq!(take(&log), vec!["old:release", "new:init", "new:draw@0,0"]);
    }

    #[test]
    fn test_dispose_releases_widgets_and_resources() {
        let mut window = window();
        let mut gfx = RecordingContext::new();
        window.init(&mut gfx).unwrap();
        window.reshape(&mut gfx, 0, 0, 100, 100);
        window.set_root_widget(Some(Box::new(VerticalPane::new(None, true))));
        window.display(&mut gfx).unwrap();
        assert_eq!(gfx.live_meshes(), 1);

        window.dispose(&mut gfx);
        assert_eq!(gfx.live_meshes(), 0);
        assert_eq!(gfx.live_programs(), 0);
        assert_eq!(gfx.live_textures(), 0);

        window.dispose(&mut gfx);
        assert!(window.resources().is_disposed());
    }

    #[test]
    fn test_invoke_runs_on_frame_thread_in_order() {
        let log = Log::default();
        let mut window = window();
        let mut gfx = RecordingContext::new();
        let handle = window.handle();

        let worker_log = log.clone();
        std::thread::spawn(move || {
            let first = worker_log.clone();
            handle.invoke(move |window| {
                first.lock().unwrap().push("first".to_string());
                window.set_root_widget(Some(Box::new(Probe::new(
                    "root",
                    Size::new(1, 1),
                    first.clone(),
                ))));
            });
            let second = worker_log;
            handle.invoke(move |_| second.lock().unwrap().push("second".to_string()));
        })
        .join()
        .unwrap();

        assert!(take(&log).is_empty());
        window.display(&mut gfx).unwrap();
        assert_eq!(
            take(&log),
            vec!["first", "second", "root:init", "root:draw@0,0"]
        );
    }

    #[test]
    fn test_posted_input_reaches_root() {
        let log = Log::default();
        let mut window = window();
        window.set_root_widget(Some(probe("root", &log)));
        let handle = window.handle();

        handle.post_mouse(
            MouseEventKind::Clicked,
            RawMouseEvent::new(device::BUTTON2, 12, 34),
        );
        handle.post_mouse(MouseEventKind::Clicked, RawMouseEvent::new(42, 1, 1));
        handle.post_mouse(MouseEventKind::Moved, RawMouseEvent::new(42, 1, 1));
        handle.post_key(KeyEventKind::Pressed, KeyEvent::new(crate::Key::Unknown));
        window.process_pending();

        assert_eq!(
            take(&log),
            vec!["root:click Middle 12,34", "root:move 1,1", "root:key"]
        );
    }

    #[test]
    fn test_direct_input_without_root_is_discarded() {
        let mut window = window();
        window.mouse_clicked(&RawMouseEvent::new(device::BUTTON1, 0, 0));
        window.key_pressed(&KeyEvent::new(crate::Key::Unknown));
        assert!(window.root_widget().is_none());
    }

    #[test]
    fn test_focus_request_is_consumed_once() {
        let mut window = window();
        assert!(!window.take_focus_request());

        window.handle().invoke(|window| window.request_focus());
        window.process_pending();
        assert!(window.take_focus_request());
        assert!(!window.take_focus_request());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let window = window();
        let handle = window.handle();
        assert!(!handle.is_stopped());

        window.stop();
        handle.stop();
        assert!(window.is_stopped());
        assert!(handle.is_stopped());
    }
}
