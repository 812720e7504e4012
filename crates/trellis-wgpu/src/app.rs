//! Window, surface and frame pacing for a [`UiWindow`]

use crate::context::WgpuContext;
use crate::input::InputAdapter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use trellis::{GfxError, Point, SurfaceListener, UiWindow};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Fixed-rate frame clock
///
/// Fires at most once per interval. After a stall it resynchronises to the
/// current time instead of firing a burst of catch-up frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Option<Instant>,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking; the first frame is due immediately
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Whether a frame is due at `now`; consumes the tick if so
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }

        let following = next + self.interval;
        self.next = Some(if following <= now {
            now + self.interval
        } else {
            following
        });
        true
    }

    /// When the next frame is due, if running
    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }
}

/// Surface plus the graphics context drawing into it
pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub context: WgpuContext,
}

impl GpuState {
    /// Create GPU state with AutoVsync present mode
    pub async fn new(window: Arc<Window>) -> Result<Self, GfxError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| GfxError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GfxError::Surface(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Trellis Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| GfxError::Surface(e.to_string()))?;

        // Palette colors are authored as display values; keep them out of sRGB conversion
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| GfxError::Surface("surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        log::info!(
            "Using {} ({:?}) with {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format
        );

        let context = WgpuContext::new(device, queue, surface_format, (size.width, size.height));
        Ok(Self {
            surface,
            config,
            context,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(self.context.device(), &self.config);
            self.context.resize(new_size.width, new_size.height);
        }
    }

    fn reconfigure(&mut self) {
        self.surface.configure(self.context.device(), &self.config);
    }

    fn has_area(&self) -> bool {
        self.config.width > 0 && self.config.height > 0
    }
}

/// Drives a [`UiWindow`] from the winit event loop
pub struct AppRunner {
    ui: UiWindow,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    input: InputAdapter,
    clock: FrameClock,
}

impl AppRunner {
    pub fn new(ui: UiWindow) -> Self {
        let clock = FrameClock::new(ui.config().frame_interval());
        Self {
            ui,
            window: None,
            gpu: None,
            input: InputAdapter::new(),
            clock,
        }
    }

    fn render(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if !gpu.has_area() {
            return;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                self.ui.stop();
                return;
            }
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                return;
            }
        };

        match self.ui.display(&mut gpu.context) {
            Ok(()) => {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                gpu.context.finish_frame(&view);
                output.present();
            }
            Err(e) => {
                log::error!("Frame aborted: {}", e);
                gpu.context.discard_frame();
            }
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.ui.stop();
        self.clock.stop();
        if let Some(mut gpu) = self.gpu.take() {
            self.ui.dispose(&mut gpu.context);
        }
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.ui.config();
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let mut gpu = match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("Failed to initialise the graphics context: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window.clone());
        if let Err(e) = self.ui.init(&mut gpu.context) {
            log::error!("Failed to initialise the window: {}", e);
            self.gpu = Some(gpu);
            self.shutdown(event_loop);
            return;
        }

        let size = window.inner_size();
        let position = window.outer_position().unwrap_or_default();
        self.ui
            .reshape(&mut gpu.context, position.x, position.y, size.width, size.height);
        self.ui.set_position(Point::new(position.x, position.y));
        self.gpu = Some(gpu);

        self.clock.start(Instant::now());
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.ui.stop();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                    self.ui
                        .reshape(&mut gpu.context, 0, 0, physical_size.width, physical_size.height);
                }
            }

            WindowEvent::Moved(position) => {
                self.ui.set_position(Point::new(position.x, position.y));
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {
                self.input.handle_event(&event, &mut self.ui);
            }
        }

        if self.ui.take_focus_request() {
            if let Some(window) = &self.window {
                window.focus_window();
            }
        }

        if self.ui.is_stopped() {
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Stop requests may arrive from other threads between events
        if self.ui.is_stopped() {
            if self.gpu.is_some() {
                self.shutdown(event_loop);
            }
            return;
        }

        if self.clock.tick(Instant::now()) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        if let Some(deadline) = self.clock.deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }
}

/// Open a native window for `ui` and run until it is stopped
pub fn run(ui: UiWindow) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut runner = AppRunner::new(ui);
    event_loop.run_app(&mut runner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(20);

    #[test]
    fn test_clock_idle_until_started() {
        let mut clock = FrameClock::new(FRAME);
        assert!(!clock.is_running());
        assert!(!clock.tick(Instant::now()));
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn test_clock_fires_once_per_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::new(FRAME);
        clock.start(start);

        assert!(clock.tick(start));
        assert!(!clock.tick(start + Duration::from_millis(5)));
        assert_eq!(clock.deadline(), Some(start + FRAME));
        assert!(clock.tick(start + FRAME));
        assert_eq!(clock.deadline(), Some(start + FRAME * 2));
    }

    #[test]
    fn test_clock_resyncs_after_stall() {
        let start = Instant::now();
        let mut clock = FrameClock::new(FRAME);
        clock.start(start);
        assert!(clock.tick(start));

        let late = start + Duration::from_millis(95);
        assert!(clock.tick(late));
        assert_eq!(clock.deadline(), Some(late + FRAME));
        assert!(!clock.tick(late + Duration::from_millis(1)));
    }

    #[test]
    fn test_clock_stop() {
        let start = Instant::now();
        let mut clock = FrameClock::new(FRAME);
        clock.start(start);
        clock.stop();
        assert!(!clock.tick(start + FRAME));
        assert!(!clock.is_running());
    }
}
