//! # trellis
//!
//! Graphics backend agnostic retained-mode UI toolkit.
//!
//! A tree of widgets negotiates its size, lays itself out, and acquires and
//! releases graphics resources in step with the lifecycle of the graphics
//! context it is drawn into. Rendering goes through the [`GraphicsContext`]
//! trait; windowing and GPU access live in backend crates like
//! `trellis-wgpu`.
//!
//! ## Widgets & Layout
//!
//! - [`Widget`] - A node of the retained tree (`Sizable + Positionable + Drawable + InputTarget`)
//! - [`draw`] - The four-phase draw state machine, generic over any widget
//! - [`VerticalPane`] - Column layout container
//! - [`ColorBox`] - Leaf widget painting a palette color
//!
//! ## Window & Frame Driver
//!
//! - [`UiWindow`] - Root widget, resources and the per-frame sequence
//! - [`WindowHandle`] - Work items and input from other threads
//! - [`EventRouter`] - Maps raw device input onto the widget tree
//!
//! ## Resources
//!
//! - [`ResourceManager`] - Programs, textures and palette colors of one context
//! - [`FlatRenderer`] / [`TextureRenderer`] - Quads owned by widgets
//!
//! ## Rules
//!
//! - [`RuleGraph`] - Composable boolean conditions with change notification
//! - [`Action`] - A command enabled and disabled by a rule

mod action;
mod assets;
mod color;
mod color_box;
mod config;
pub mod draw;
mod error;
mod geometry;
mod gfx;
pub mod headless;
mod input;
pub mod pane;
mod pmv;
mod renderer;
mod resource;
mod router;
mod rule;
mod widget;
mod window;

// Geometry & graphics boundary
pub use color::*;
pub use geometry::*;
pub use gfx::*;
pub use pmv::*;

// Resources
pub use assets::*;
pub use error::*;
pub use renderer::*;
pub use resource::*;

// Widgets
pub use color_box::*;
pub use pane::VerticalPane;
pub use widget::*;

// Input & window
pub use config::*;
pub use input::*;
pub use router::*;
pub use window::*;

// Rules
pub use action::*;
pub use rule::*;
