//! Customizable keybindings for the annotation engine.
//!
//! The surrounding application translates its native key events into
//! [`KeyCode`] and hands them to the session; [`KeyBindings`] decides what, if
//! anything, the key does.

use serde::{Deserialize, Serialize};

use crate::interaction::ToolMode;

/// Keys the engine can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Delete,
    Backspace,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Space,
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Switch the active tool
    Tool(ToolMode),
    /// Delete the selected shape
    DeleteSelected,
    /// Go to the previous image
    PrevImage,
    /// Go to the next image
    NextImage,
}

/// Keybinding configuration for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Hotkey for the box drawing tool
    #[serde(default = "default_tool_box")]
    pub tool_box: KeyCode,
    /// Hotkey for the hand (pan) tool
    #[serde(default = "default_tool_pan")]
    pub tool_pan: KeyCode,
    /// Hotkey for the mask pen
    #[serde(default = "default_tool_pen")]
    pub tool_pen: KeyCode,
    /// Hotkey for the mask eraser
    #[serde(default = "default_tool_erase")]
    pub tool_erase: KeyCode,
    /// Hotkey for the mask rectangle fill
    #[serde(default = "default_tool_rect")]
    pub tool_rect: KeyCode,

    /// Keys that delete the selected shape
    #[serde(default = "default_delete_keys")]
    pub delete: Vec<KeyCode>,

    #[serde(default = "default_prev_image")]
    pub prev_image: KeyCode,
    #[serde(default = "default_next_image")]
    pub next_image: KeyCode,
}

fn default_tool_box() -> KeyCode {
    KeyCode::B
}

fn default_tool_pan() -> KeyCode {
    KeyCode::H
}

fn default_tool_pen() -> KeyCode {
    KeyCode::P
}

fn default_tool_erase() -> KeyCode {
    KeyCode::E
}

fn default_tool_rect() -> KeyCode {
    KeyCode::R
}

fn default_delete_keys() -> Vec<KeyCode> {
    vec![KeyCode::Delete, KeyCode::Backspace]
}

fn default_prev_image() -> KeyCode {
    KeyCode::Left
}

fn default_next_image() -> KeyCode {
    KeyCode::Right
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_box: default_tool_box(),
            tool_pan: default_tool_pan(),
            tool_pen: default_tool_pen(),
            tool_erase: default_tool_erase(),
            tool_rect: default_tool_rect(),
            delete: default_delete_keys(),
            prev_image: default_prev_image(),
            next_image: default_next_image(),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: KeyCode) -> Option<ToolMode> {
        if key == self.tool_box {
            Some(ToolMode::Box)
        } else if key == self.tool_pan {
            Some(ToolMode::Pan)
        } else if key == self.tool_pen {
            Some(ToolMode::Pen)
        } else if key == self.tool_erase {
            Some(ToolMode::Erase)
        } else if key == self.tool_rect {
            Some(ToolMode::Rect)
        } else {
            None
        }
    }

    /// Resolve a key press. Unbound keys yield `None`.
    pub fn action_for_key(&self, key: KeyCode) -> Option<KeyAction> {
        if self.delete.contains(&key) {
            return Some(KeyAction::DeleteSelected);
        }
        if key == self.prev_image {
            return Some(KeyAction::PrevImage);
        }
        if key == self.next_image {
            return Some(KeyAction::NextImage);
        }
        self.tool_for_key(key).map(KeyAction::Tool)
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: ToolMode) -> KeyCode {
        match tool {
            ToolMode::Box => self.tool_box,
            ToolMode::Pan => self.tool_pan,
            ToolMode::Pen => self.tool_pen,
            ToolMode::Erase => self.tool_erase,
            ToolMode::Rect => self.tool_rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actions() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for_key(KeyCode::Delete), Some(KeyAction::DeleteSelected));
        assert_eq!(bindings.action_for_key(KeyCode::Backspace), Some(KeyAction::DeleteSelected));
        assert_eq!(bindings.action_for_key(KeyCode::H), Some(KeyAction::Tool(ToolMode::Pan)));
        assert_eq!(bindings.action_for_key(KeyCode::Right), Some(KeyAction::NextImage));
        assert_eq!(bindings.action_for_key(KeyCode::Z), None);
    }

    #[test]
    fn test_key_for_tool_matches_lookup() {
        let bindings = KeyBindings::default();
        for tool in [ToolMode::Box, ToolMode::Pan, ToolMode::Pen, ToolMode::Erase, ToolMode::Rect] {
            assert_eq!(bindings.tool_for_key(bindings.key_for_tool(tool)), Some(tool));
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let bindings: KeyBindings = serde_json::from_str(r#"{"tool_pan": "Space"}"#).unwrap();
        assert_eq!(bindings.tool_pan, KeyCode::Space);
        assert_eq!(bindings.tool_box, KeyCode::B);
        assert_eq!(bindings.delete, vec![KeyCode::Delete, KeyCode::Backspace]);
    }
}
