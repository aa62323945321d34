pub mod canvas_ops;
pub mod clipboard;
pub mod scripting;
