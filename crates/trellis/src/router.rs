//! Routing of raw windowing input into the widget tree

use crate::input::{map_button, KeyEvent, RawMouseEvent};
use crate::widget::Widget;

/// Receiver of raw pointer events from the windowing layer
pub trait MouseListener {
    fn mouse_clicked(&mut self, event: &RawMouseEvent);

    fn mouse_pressed(&mut self, event: &RawMouseEvent);

    fn mouse_released(&mut self, event: &RawMouseEvent);

    fn mouse_entered(&mut self, event: &RawMouseEvent);

    fn mouse_exited(&mut self, event: &RawMouseEvent);

    fn mouse_dragged(&mut self, event: &RawMouseEvent);

    fn mouse_moved(&mut self, event: &RawMouseEvent);

    fn mouse_wheel_moved(&mut self, event: &RawMouseEvent);
}

/// Receiver of key events from the windowing layer
pub trait KeyListener {
    fn key_pressed(&mut self, event: &KeyEvent);

    fn key_released(&mut self, event: &KeyEvent);
}

/// Which [`MouseListener`] method a pointer event is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Clicked,
    Pressed,
    Released,
    Entered,
    Exited,
    Dragged,
    Moved,
    WheelMoved,
}

impl MouseEventKind {
    pub fn dispatch<L: MouseListener + ?Sized>(self, listener: &mut L, event: &RawMouseEvent) {
        match self {
            MouseEventKind::Clicked => listener.mouse_clicked(event),
            MouseEventKind::Pressed => listener.mouse_pressed(event),
            MouseEventKind::Released => listener.mouse_released(event),
            MouseEventKind::Entered => listener.mouse_entered(event),
            MouseEventKind::Exited => listener.mouse_exited(event),
            MouseEventKind::Dragged => listener.mouse_dragged(event),
            MouseEventKind::Moved => listener.mouse_moved(event),
            MouseEventKind::WheelMoved => listener.mouse_wheel_moved(event),
        }
    }
}

/// Which [`KeyListener`] method a key event is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

impl KeyEventKind {
    pub fn dispatch<L: KeyListener + ?Sized>(self, listener: &mut L, event: &KeyEvent) {
        match self {
            KeyEventKind::Pressed => listener.key_pressed(event),
            KeyEventKind::Released => listener.key_released(event),
        }
    }
}

/// Forwards input to the root widget, synchronously and in arrival order.
///
/// Button events whose device code has no toolkit button are dropped.
/// Motion, wheel and enter/exit events carry no button and are always
/// forwarded. Without a root widget every event is discarded.
pub struct EventRouter<'a> {
    root: Option<&'a mut dyn Widget>,
}

impl<'a> EventRouter<'a> {
    pub fn new(root: Option<&'a mut dyn Widget>) -> Self {
        Self { root }
    }

    fn root(&mut self) -> Option<&mut (dyn Widget + 'a)> {
        let root = self.root.as_deref_mut();
        if root.is_none() {
            log::trace!("No root widget; input discarded");
        }
        root
    }
}

impl MouseListener for EventRouter<'_> {
    fn mouse_clicked(&mut self, event: &RawMouseEvent) {
        let Some(button) = map_button(event.button) else {
            log::trace!("Ignoring click with unknown button code {}", event.button);
            return;
        };
        if let Some(root) = self.root() {
            root.mouse_clicked(button, event.position);
        }
    }

    fn mouse_pressed(&mut self, event: &RawMouseEvent) {
        let Some(button) = map_button(event.button) else {
            log::trace!("Ignoring press with unknown button code {}", event.button);
            return;
        };
        if let Some(root) = self.root() {
            root.mouse_pressed(button, event.position);
        }
    }

    fn mouse_released(&mut self, event: &RawMouseEvent) {
        let Some(button) = map_button(event.button) else {
            log::trace!("Ignoring release with unknown button code {}", event.button);
            return;
        };
        if let Some(root) = self.root() {
            root.mouse_released(button, event.position);
        }
    }

    fn mouse_entered(&mut self, _event: &RawMouseEvent) {
        if let Some(root) = self.root() {
            root.mouse_entered();
        }
    }

    fn mouse_exited(&mut self, _event: &RawMouseEvent) {
        if let Some(root) = self.root() {
            root.mouse_exited();
        }
    }

    fn mouse_dragged(&mut self, event: &RawMouseEvent) {
        if let Some(root) = self.root() {
            root.mouse_dragged(event.position);
        }
    }

    fn mouse_moved(&mut self, event: &RawMouseEvent) {
        if let Some(root) = self.root() {
            root.mouse_moved(event.position);
        }
    }

    fn mouse_wheel_moved(&mut self, event: &RawMouseEvent) {
        if let Some(root) = self.root() {
            root.mouse_wheel_moved(event.wheel_rotation, event.position);
        }
    }
}

impl KeyListener for EventRouter<'_> {
    fn key_pressed(&mut self, event: &KeyEvent) {
        if let Some(root) = self.root() {
            root.key_pressed(event);
        }
    }

    fn key_released(&mut self, event: &KeyEvent) {
        if let Some(root) = self.root() {
            root.key_released(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::tests::Probe;
    use crate::geometry::Size;
    use crate::input::{device, Key};
    use std::sync::{Arc, Mutex};

    fn probe() -> (Probe, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Probe::new("root", Size::new(10, 10), log.clone()), log)
    }

    #[test]
    fn test_button2_click_is_middle_click() {
        let (mut root, log) = probe();
        let mut router = EventRouter::new(Some(&mut root));

        router.mouse_clicked(&RawMouseEvent::new(device::BUTTON2, 120, 45));
        assert_eq!(*log.lock().unwrap(), vec!["root:click Middle 120,45"]);
    }

    #[test]
    fn test_unknown_button_drops_click_but_forwards_motion() {
        let (mut root, log) = probe();
        let mut router = EventRouter::new(Some(&mut root));

        router.mouse_clicked(&RawMouseEvent::new(7, 3, 4));
        router.mouse_pressed(&RawMouseEvent::new(7, 3, 4));
        router.mouse_moved(&RawMouseEvent::new(7, 3, 4));
        router.mouse_wheel_moved(&RawMouseEvent::wheel(-1.0, 3, 4));

        assert_eq!(*log.lock().unwrap(), vec!["root:move 3,4", "root:wheel -1"]);
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (mut root, log) = probe();
        let mut router = EventRouter::new(Some(&mut root));

        router.mouse_entered(&RawMouseEvent::motion(0, 0));
        router.mouse_pressed(&RawMouseEvent::new(device::BUTTON1, 1, 1));
        router.key_pressed(&KeyEvent::new(Key::Character("a".into())));
        router.mouse_exited(&RawMouseEvent::motion(0, 0));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["root:enter", "root:press 1,1", "root:key", "root:exit"]
        );
    }

    #[test]
    fn test_no_root_discards_input() {
        let mut router = EventRouter::new(None);
        router.mouse_clicked(&RawMouseEvent::new(device::BUTTON1, 0, 0));
        router.mouse_moved(&RawMouseEvent::motion(0, 0));
        router.key_released(&KeyEvent::new(Key::Unknown));
    }
}
