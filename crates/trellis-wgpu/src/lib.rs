//! # trellis-wgpu
//!
//! WGPU rendering and winit windowing backend for trellis.
//!
//! - [`WgpuContext`] - [`trellis::GraphicsContext`] recorded per frame and replayed in one render pass
//! - [`InputAdapter`] - Converts winit events into trellis raw device events
//! - [`run`] - Opens a native window for a [`trellis::UiWindow`] and drives its frames

mod app;
mod context;
mod input;

pub use app::*;
pub use context::*;
pub use input::*;
