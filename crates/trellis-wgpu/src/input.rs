//! Winit input adapter for trellis
//!
//! Converts winit window events into the toolkit's raw device events and
//! synthesizes what winit does not report directly: clicks (a press and
//! release without motion in between) and drags (motion with a button held).

use std::collections::BTreeSet;
use trellis::{
    device, Key, KeyEvent, KeyListener, Modifiers, MouseListener, NamedKey, Point, RawMouseEvent,
};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, ModifiersState};

/// Pixels per wheel line when the platform reports pixel deltas
const PIXELS_PER_LINE: f64 = 20.0;

/// Stateful translation of winit input into listener calls
#[derive(Debug, Default)]
pub struct InputAdapter {
    cursor: Point,
    held: BTreeSet<u16>,
    dragged: bool,
    modifiers: Modifiers,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Process a winit WindowEvent, forwarding the resulting input to `listener`
    pub fn handle_event<L>(&mut self, event: &WindowEvent, listener: &mut L)
    where
        L: MouseListener + KeyListener + ?Sized,
    {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = Point::new(position.x as i32, position.y as i32);
                self.cursor_moved(position, listener);
            }
            WindowEvent::CursorEntered { .. } => self.cursor_entered(listener),
            WindowEvent::CursorLeft { .. } => self.cursor_left(listener),
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(*state == ElementState::Pressed, button_code(*button), listener);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.wheel(lines, listener);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = convert_modifiers(modifiers.state());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key_event = KeyEvent {
                    key: convert_key(&event.logical_key),
                    repeat: event.repeat,
                    modifiers: self.modifiers,
                };
                self.key(event.state == ElementState::Pressed, &key_event, listener);
            }
            _ => {
                // Ignore other events
            }
        }
    }

    pub fn cursor_moved<L: MouseListener + ?Sized>(&mut self, position: Point, listener: &mut L) {
        self.cursor = position;
        let event = RawMouseEvent::motion(position.x, position.y);
        if self.held.is_empty() {
            listener.mouse_moved(&event);
        } else {
            self.dragged = true;
            let button = self.held.first().copied().unwrap_or(device::NO_BUTTON);
            listener.mouse_dragged(&RawMouseEvent { button, ..event });
        }
    }

    pub fn cursor_entered<L: MouseListener + ?Sized>(&mut self, listener: &mut L) {
        listener.mouse_entered(&RawMouseEvent::motion(self.cursor.x, self.cursor.y));
    }

    pub fn cursor_left<L: MouseListener + ?Sized>(&mut self, listener: &mut L) {
        listener.mouse_exited(&RawMouseEvent::motion(self.cursor.x, self.cursor.y));
    }

    /// A button changed state. Releasing without motion since the press also
    /// produces a click.
    pub fn button<L: MouseListener + ?Sized>(&mut self, pressed: bool, code: u16, listener: &mut L) {
        let event = RawMouseEvent::new(code, self.cursor.x, self.cursor.y);
        if pressed {
            if self.held.is_empty() {
                self.dragged = false;
            }
            self.held.insert(code);
            listener.mouse_pressed(&event);
        } else {
            let was_held = self.held.remove(&code);
            listener.mouse_released(&event);
            if was_held && !self.dragged {
                listener.mouse_clicked(&event);
            }
            if self.held.is_empty() {
                self.dragged = false;
            }
        }
    }

    pub fn wheel<L: MouseListener + ?Sized>(&mut self, lines: f32, listener: &mut L) {
        if lines == 0.0 {
            return;
        }
        listener.mouse_wheel_moved(&RawMouseEvent::wheel(lines, self.cursor.x, self.cursor.y));
    }

    pub fn key<L: KeyListener + ?Sized>(&mut self, pressed: bool, event: &KeyEvent, listener: &mut L) {
        if pressed {
            listener.key_pressed(event);
        } else {
            listener.key_released(event);
        }
    }
}

/// Device code of a winit mouse button, see [`trellis::device`]
pub fn button_code(button: winit::event::MouseButton) -> u16 {
    match button {
        winit::event::MouseButton::Left => device::BUTTON1,
        winit::event::MouseButton::Middle => device::BUTTON2,
        winit::event::MouseButton::Right => device::BUTTON3,
        winit::event::MouseButton::Back => 4,
        winit::event::MouseButton::Forward => 5,
        winit::event::MouseButton::Other(n) => n.saturating_add(6),
    }
}

/// Convert winit Key to trellis Key
pub fn convert_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => convert_named_key(named).map_or(Key::Unknown, Key::Named),
        WinitKey::Character(s) => Key::Character(s.to_string()),
        _ => Key::Unknown,
    }
}

/// Convert winit NamedKey to trellis NamedKey; keys the toolkit has no name for yield `None`
pub fn convert_named_key(key: &winit::keyboard::NamedKey) -> Option<NamedKey> {
    use winit::keyboard::NamedKey as WN;

    let named = match key {
        WN::Enter => NamedKey::Enter,
        WN::Escape => NamedKey::Escape,
        WN::Backspace => NamedKey::Backspace,
        WN::Delete => NamedKey::Delete,
        WN::Tab => NamedKey::Tab,
        WN::Space => NamedKey::Space,
        WN::ArrowLeft => NamedKey::ArrowLeft,
        WN::ArrowRight => NamedKey::ArrowRight,
        WN::ArrowUp => NamedKey::ArrowUp,
        WN::ArrowDown => NamedKey::ArrowDown,
        WN::Home => NamedKey::Home,
        WN::End => NamedKey::End,
        WN::PageUp => NamedKey::PageUp,
        WN::PageDown => NamedKey::PageDown,
        WN::Shift => NamedKey::Shift,
        WN::Control => NamedKey::Control,
        WN::Alt => NamedKey::Alt,
        WN::Super => NamedKey::Super,
        WN::CapsLock => NamedKey::CapsLock,
        WN::F1 => NamedKey::F(1),
        WN::F2 => NamedKey::F(2),
        WN::F3 => NamedKey::F(3),
        WN::F4 => NamedKey::F(4),
        WN::F5 => NamedKey::F(5),
        WN::F6 => NamedKey::F(6),
        WN::F7 => NamedKey::F(7),
        WN::F8 => NamedKey::F(8),
        WN::F9 => NamedKey::F(9),
        WN::F10 => NamedKey::F(10),
        WN::F11 => NamedKey::F(11),
        WN::F12 => NamedKey::F(12),
        WN::Insert => NamedKey::Insert,
        _ => return None,
    };
    Some(named)
}

pub fn convert_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        super_key: state.super_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl MouseListener for Recorder {
        fn mouse_clicked(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("click {} {},{}", e.button, e.position.x, e.position.y));
        }
        fn mouse_pressed(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("press {}", e.button));
        }
        fn mouse_released(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("release {}", e.button));
        }
        fn mouse_entered(&mut self, _e: &RawMouseEvent) {
            self.events.push("enter".into());
        }
        fn mouse_exited(&mut self, _e: &RawMouseEvent) {
            self.events.push("exit".into());
        }
        fn mouse_dragged(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("drag {} {},{}", e.button, e.position.x, e.position.y));
        }
        fn mouse_moved(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("move {},{}", e.position.x, e.position.y));
        }
        fn mouse_wheel_moved(&mut self, e: &RawMouseEvent) {
            self.events.push(format!("wheel {}", e.wheel_rotation));
        }
    }

    impl KeyListener for Recorder {
        fn key_pressed(&mut self, e: &KeyEvent) {
            self.events.push(format!("key down {:?}", e.key));
        }
        fn key_released(&mut self, e: &KeyEvent) {
            self.events.push(format!("key up {:?}", e.key));
        }
    }

    #[test]
    fn test_press_release_without_motion_clicks() {
        let mut adapter = InputAdapter::new();
        let mut recorder = Recorder::default();

        adapter.cursor_moved(Point::new(12, 30), &mut recorder);
        adapter.button(true, device::BUTTON1, &mut recorder);
        adapter.button(false, device::BUTTON1, &mut recorder);

        assert_eq!(
            recorder.events,
            vec!["move 12,30", "press 1", "release 1", "click 1 12,30"]
        );
    }

    #[test]
    fn test_motion_with_button_held_drags_and_suppresses_click() {
        let mut adapter = InputAdapter::new();
        let mut recorder = Recorder::default();

        adapter.button(true, device::BUTTON3, &mut recorder);
        adapter.cursor_moved(Point::new(4, 5), &mut recorder);
        adapter.button(false, device::BUTTON3, &mut recorder);
        adapter.cursor_moved(Point::new(6, 7), &mut recorder);

        assert_eq!(
            recorder.events,
            vec!["press 3", "drag 3 4,5", "release 3", "move 6,7"]
        );
    }

    #[test]
    fn test_release_without_press_does_not_click() {
        let mut adapter = InputAdapter::new();
        let mut recorder = Recorder::default();

        adapter.button(false, device::BUTTON1, &mut recorder);
        assert_eq!(recorder.events, vec!["release 1"]);
    }

    #[test]
    fn test_wheel_and_crossing() {
        let mut adapter = InputAdapter::new();
        let mut recorder = Recorder::default();

        adapter.cursor_entered(&mut recorder);
        adapter.wheel(0.0, &mut recorder);
        adapter.wheel(-2.0, &mut recorder);
        adapter.cursor_left(&mut recorder);

        assert_eq!(recorder.events, vec!["enter", "wheel -2", "exit"]);
    }

    #[test]
    fn test_keys_forwarded() {
        let mut adapter = InputAdapter::new();
        let mut recorder = Recorder::default();
        let event = KeyEvent::new(Key::Named(NamedKey::Escape));

        adapter.key(true, &event, &mut recorder);
        adapter.key(false, &event, &mut recorder);

        assert_eq!(
            recorder.events,
            vec!["key down Named(Escape)", "key up Named(Escape)"]
        );
    }

    #[test]
    fn test_button_codes() {
        use winit::event::MouseButton as WB;

        assert_eq!(button_code(WB::Left), device::BUTTON1);
        assert_eq!(button_code(WB::Middle), device::BUTTON2);
        assert_eq!(button_code(WB::Right), device::BUTTON3);
        assert_eq!(button_code(WB::Other(2)), 8);
        assert!(trellis::map_button(button_code(WB::Back)).is_none());
    }

    #[test]
    fn test_key_conversion() {
        use winit::keyboard::NamedKey as WN;

        assert_eq!(
            convert_key(&WinitKey::Named(WN::F5)),
            Key::Named(NamedKey::F(5))
        );
        assert_eq!(
            convert_key(&WinitKey::Character("q".into())),
            Key::Character("q".to_string())
        );
        assert_eq!(convert_key(&WinitKey::Named(WN::MediaPlay)), Key::Unknown);
    }

    #[test]
    fn test_modifier_conversion() {
        let modifiers = convert_modifiers(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert!(modifiers.shift);
        assert!(modifiers.ctrl);
        assert!(!modifiers.alt);
        assert!(!modifiers.super_key);
    }
}
