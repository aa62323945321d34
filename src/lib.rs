//! TilePaint: a square pixel-art canvas editing engine.
//!
//! [`project::EditorSession`] owns one document and turns pointer/keyboard
//! [`events::EditorEvent`]s into pixel, selection and floating-block changes
//! with bounded undo. File and clipboard access go through the
//! [`shell::HostShell`] trait; PNG encoding and metadata chunks live in [`io`].

pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod events;
pub mod io;
pub mod logger;
pub mod notice;
pub mod ops;
pub mod project;
pub mod selection;
pub mod settings;
pub mod shell;

pub use canvas::{Cell, PixelBuffer};
pub use events::{Command, Dispatch, Effect, EditorEvent};
pub use notice::{Notice, Severity};
pub use project::EditorSession;
