//! Window input events.
//!
//! The OS window lives outside this crate. Whatever owns it translates its
//! native callbacks into [`WindowEvent`] values and sends them to a
//! [`WindowProducer`](crate::producers::window::WindowProducer), which feeds
//! them into the engine's external dispatcher.
//!
//! Key codes are passed through untouched; this crate does not interpret them
//! beyond the helpers in [`keys`].

use serde::Serialize;

pub const KEY: &str = "window.key";
pub const MOUSE_MOVE: &str = "window.mouse.move";
pub const BUTTON_CLICK: &str = "window.button.click";
pub const FOCUS: &str = "window.focus";
pub const CLOSE: &str = "window.close";

/// Press or release. Key repeats are reported as presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input event sourced from the OS window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WindowEvent {
    Key { key: i32, action: Action },
    MouseMove { x: f64, y: f64 },
    ButtonClick { button: MouseButton, action: Action },
    Focus { focused: bool },
    /// The user asked to close the window.
    Close,
}

impl WindowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WindowEvent::Key { .. } => KEY,
            WindowEvent::MouseMove { .. } => MOUSE_MOVE,
            WindowEvent::ButtonClick { .. } => BUTTON_CLICK,
            WindowEvent::Focus { .. } => FOCUS,
            WindowEvent::Close => CLOSE,
        }
    }

    /// `true` when this is a press of `key`.
    pub fn is_key_press(&self, key: i32) -> bool {
        matches!(self, WindowEvent::Key { key: k, action: Action::Press } if *k == key)
    }
}

/// Printable key codes share their ASCII upper-case value.
pub mod keys {
    pub const C: i32 = 'C' as i32;
    pub const Q: i32 = 'Q' as i32;
    pub const SPACE: i32 = ' ' as i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_names() {
        assert_eq!(WindowEvent::Close.name(), CLOSE);
        assert_eq!(WindowEvent::Focus { focused: true }.name(), FOCUS);
        assert_eq!(WindowEvent::MouseMove { x: 1.0, y: 2.0 }.name(), MOUSE_MOVE);
        let click = WindowEvent::ButtonClick {
            button: MouseButton::Left,
            action: Action::Press,
        };
        assert_eq!(click.name(), BUTTON_CLICK);
    }

    #[test]
    fn test_is_key_press() {
        let press = WindowEvent::Key {
            key: keys::C,
            action: Action::Press,
        };
        let release = WindowEvent::Key {
            key: keys::C,
            action: Action::Release,
        };
        assert!(press.is_key_press(keys::C));
        assert!(!press.is_key_press(keys::Q));
        assert!(!release.is_key_press(keys::C));
    }
}
