//! Input vocabulary of the editor.
//!
//! The view layer translates real pointer/keyboard input into
//! [`EditorEvent`]s and feeds them to
//! [`EditorSession::handle_event`](crate::project::EditorSession::handle_event);
//! it gets back a [`Dispatch`] describing what to show and which host-side
//! effects to run.

use image::Rgba;

use crate::canvas::Cell;
use crate::components::tools::Tool;
use crate::notice::Notice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    PointerDown(Cell),
    PointerMove(Cell),
    PointerUp(Cell),
    Command(Command),
}

/// Everything a toolbar button or keyboard shortcut can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SetTool(Tool),
    SetColor(Rgba<u8>),
    Copy,
    Paste,
    DeleteSelection,
    Clear,
    Undo,
    /// Place the floating block where it is (Enter).
    Finalize,
    /// Throw the floating block away and restore the pre-float state (Escape).
    Cancel,
    ResizeCanvas(u32),
    SetGridSpacing(u32),
}

impl Command {
    /// Keyboard binding for `key` (case-insensitive key name).
    pub fn from_shortcut(key: &str, ctrl: bool) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        if ctrl {
            return match key.as_str() {
                "c" => Some(Command::Copy),
                "v" => Some(Command::Paste),
                "z" => Some(Command::Undo),
                _ => None,
            };
        }
        match key.as_str() {
            "delete" | "backspace" => Some(Command::DeleteSelection),
            "enter" | "return" => Some(Command::Finalize),
            "escape" | "esc" => Some(Command::Cancel),
            "b" | "p" => Some(Command::SetTool(Tool::Pencil)),
            "e" => Some(Command::SetTool(Tool::Eraser)),
            "f" | "g" => Some(Command::SetTool(Tool::Fill)),
            "s" | "m" => Some(Command::SetTool(Tool::Select)),
            _ => None,
        }
    }

    /// Parse a combo such as `ctrl+z`, `Cmd+V` or `escape`.
    pub fn from_combo(combo: &str) -> Option<Self> {
        let mut ctrl = false;
        let mut key = None;
        for part in combo.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" => ctrl = true,
                "" => return None,
                _ if key.is_none() => key = Some(part),
                _ => return None,
            }
        }
        Self::from_shortcut(key?, ctrl)
    }
}

/// Work the host must do on the core's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Observable state (pixels, selection, tool) changed.
    Redraw,
    /// Put a PNG on the OS clipboard.
    WriteClipboard { data_url: String },
}

/// Result of handling one event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub notice: Option<Notice>,
    pub effects: Vec<Effect>,
}

impl Dispatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            notice: None,
            effects: vec![Effect::Redraw],
        }
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            effects: Vec::new(),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn needs_redraw(&self) -> bool {
        self.effects.contains(&Effect::Redraw)
    }
}
