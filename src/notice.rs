//! Transient status signals.
//!
//! Nothing in the editing core fails loudly: an operation either changes the
//! document or leaves it untouched and reports why through a [`Notice`]. The
//! view shows these as toasts; the CLI prints them.

use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Copied { width: u32, height: u32 },
    Pasted { x: i32, y: i32, width: u32, height: u32 },
    PasteOutOfBounds,
    ClipboardEmpty,
    NoSelection,
    SelectionDeleted,
    Cleared,
    Undone { remaining: usize },
    NothingToUndo,
    /// Fill pressed outside the selection mask.
    FillNoTarget,
    /// Fill region already has the target colour.
    FillUnchanged,
    FloatCommitted,
    FloatCanceled,
    NothingFloating,
    CanvasResized { size: u32 },
    Saved { path: PathBuf },
    SaveCanceled,
    SaveFailed { reason: String },
    Opened { path: PathBuf, size: u32 },
    OpenCanceled,
    FileNotFound { path: PathBuf },
    ReadFailed { reason: String },
    DecodeFailed { reason: String },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        use Notice::*;
        match self {
            Copied { .. } | Pasted { .. } | SelectionDeleted | Cleared | Undone { .. } | FloatCommitted
            | CanvasResized { .. } | Saved { .. } | Opened { .. } => Severity::Success,
            FloatCanceled | NothingFloating | SaveCanceled | OpenCanceled | FillUnchanged | NothingToUndo => {
                Severity::Info
            }
            PasteOutOfBounds | ClipboardEmpty | NoSelection | FillNoTarget | FileNotFound { .. } => Severity::Warning,
            SaveFailed { .. } | ReadFailed { .. } | DecodeFailed { .. } => Severity::Error,
        }
    }

    /// Mirror the notice into the session log at the matching level.
    pub fn log(&self) {
        match self.severity() {
            Severity::Success | Severity::Info => log::info!("{}", self),
            Severity::Warning => log::warn!("{}", self),
            Severity::Error => log::error!("{}", self),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Copied { width, height } => write!(f, "Copied {}×{} pixels", width, height),
            Notice::Pasted { x, y, width, height } => {
                write!(f, "Pasted {}×{} at ({}, {}). Enter to place, Esc to cancel", width, height, x, y)
            }
            Notice::PasteOutOfBounds => write!(f, "Paste target is outside the canvas"),
            Notice::ClipboardEmpty => write!(f, "Clipboard is empty"),
            Notice::NoSelection => write!(f, "No selection"),
            Notice::SelectionDeleted => write!(f, "Selection deleted"),
            Notice::Cleared => write!(f, "Cleared"),
            Notice::Undone { remaining } => write!(f, "Undo ({} left)", remaining),
            Notice::NothingToUndo => write!(f, "Nothing to undo"),
            Notice::FillNoTarget => write!(f, "Fill target is outside the selection"),
            Notice::FillUnchanged => write!(f, "Area already has that color"),
            Notice::FloatCommitted => write!(f, "Placed"),
            Notice::FloatCanceled => write!(f, "Move canceled"),
            Notice::NothingFloating => write!(f, "Nothing to place"),
            Notice::CanvasResized { size } => write!(f, "Canvas resized to {}×{}", size, size),
            Notice::Saved { path } => write!(f, "Saved {}", path.display()),
            Notice::SaveCanceled => write!(f, "Save canceled"),
            Notice::SaveFailed { reason } => write!(f, "Save failed: {}", reason),
            Notice::Opened { path, size } => write!(f, "Opened {} ({}×{})", path.display(), size, size),
            Notice::OpenCanceled => write!(f, "Open canceled"),
            Notice::FileNotFound { path } => write!(f, "File not found: {}", path.display()),
            Notice::ReadFailed { reason } => write!(f, "Could not read file: {}", reason),
            Notice::DecodeFailed { reason } => write!(f, "Not a readable PNG: {}", reason),
        }
    }
}
