//! A bordered vertical pane of color boxes.
//!
//! - The top box toggles whether the middle box is enabled
//! - The middle box logs a greeting while enabled
//! - The bottom box closes the window
//!
//! Run with `RUST_LOG=debug` to follow the lifecycle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use trellis::{
    Action, ColorBox, FsAssets, RuleGraph, Size, UiColors, UiWindow, VerticalPane, WindowConfig,
};

fn main() {
    env_logger::init();

    let asset_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    let config = match WindowConfig::load(asset_root.join("window.ron")) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using the default window config: {}", e);
            WindowConfig::default()
        }
    };

    let mut window = UiWindow::new(config, FsAssets::new(&asset_root));
    let handle = window.handle();

    let rules = Arc::new(Mutex::new(RuleGraph::new()));
    let greeting_enabled = rules.lock().unwrap().leaf(true);

    let greet = Action::new("greet", || log::info!("Hello from the middle box"));
    greet.bind(&mut rules.lock().unwrap(), greeting_enabled);

    let toggle = {
        let rules = rules.clone();
        Action::new("toggle greeting", move || {
            let mut rules = rules.lock().unwrap();
            let enabled = rules.is_valid(greeting_enabled);
            rules.set(greeting_enabled, !enabled);
        })
    };

    let quit = Action::new("quit", move || handle.stop());

    let mut pane = VerticalPane::new(Some("main"), true);
    pane.add(
        ColorBox::new(Some("toggle"), Size::new(200, 40), UiColors::WIDGET_BACKGROUND)
            .with_action(toggle),
    );
    pane.add(
        ColorBox::new(Some("greet"), Size::new(200, 80), UiColors::TEXT).with_action(greet),
    );
    pane.add(
        ColorBox::new(Some("quit"), Size::new(200, 30), UiColors::BORDER).with_action(quit),
    );
    window.set_root_widget(Some(Box::new(pane)));

    if let Err(e) = trellis_wgpu::run(window) {
        log::error!("Event loop failed: {}", e);
    }
}
