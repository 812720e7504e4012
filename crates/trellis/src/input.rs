//! Toolkit-neutral input types
//!
//! Windowing backends convert their device events into these types before
//! handing them to the [`EventRouter`](crate::EventRouter).

use crate::geometry::Point;

/// Mouse button as seen by widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// Right mouse button
    Right,
}

/// Backend-agnostic named key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    /// Super/Meta/Windows/Command key
    Super,
    CapsLock,
    /// Function keys F1-F12
    F(u8),
    Insert,
}

/// Backend-agnostic key representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named key (Enter, Escape, arrows, etc.)
    Named(NamedKey),
    /// A character key (letters, numbers, symbols)
    Character(String),
    /// Unknown/unhandled key
    Unknown,
}

/// Modifier keys held while a key event was generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    /// Check if any modifier key is held (Ctrl, Alt, Super, but not Shift)
    pub fn any_command(&self) -> bool {
        self.ctrl || self.alt || self.super_key
    }
}

/// A key press or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Whether this is an auto-repeat of a held key
    pub repeat: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            repeat: false,
            modifiers: Modifiers::default(),
        }
    }

    pub fn is_named(&self, named: NamedKey) -> bool {
        self.key == Key::Named(named)
    }
}

/// Device button codes as delivered by the windowing layer
pub mod device {
    /// No button involved (motion, wheel, enter/exit)
    pub const NO_BUTTON: u16 = 0;
    /// Primary (left) button
    pub const BUTTON1: u16 = 1;
    /// Middle button
    pub const BUTTON2: u16 = 2;
    /// Secondary (right) button
    pub const BUTTON3: u16 = 3;
}

/// A pointer event as delivered by the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMouseEvent {
    /// Device button code, see [`device`]
    pub button: u16,
    /// Pointer position in window pixels
    pub position: Point,
    /// Vertical wheel rotation in lines; zero for non-wheel events
    pub wheel_rotation: f32,
}

impl RawMouseEvent {
    pub const fn new(button: u16, x: i32, y: i32) -> Self {
        Self {
            button,
            position: Point::new(x, y),
            wheel_rotation: 0.0,
        }
    }

    /// A buttonless motion/enter/exit event
    pub const fn motion(x: i32, y: i32) -> Self {
        Self::new(device::NO_BUTTON, x, y)
    }

    pub const fn wheel(rotation: f32, x: i32, y: i32) -> Self {
        Self {
            button: device::NO_BUTTON,
            position: Point::new(x, y),
            wheel_rotation: rotation,
        }
    }
}

/// Map a device button code to a toolkit button; unknown codes map to `None`
pub fn map_button(code: u16) -> Option<MouseButton> {
    match code {
        device::BUTTON1 => Some(MouseButton::Left),
        device::BUTTON2 => Some(MouseButton::Middle),
        device::BUTTON3 => Some(MouseButton::Right),
        _ => None,
    }
}
