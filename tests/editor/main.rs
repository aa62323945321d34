//! Tests for the editing session
//!
//! These drive `EditorSession` only through the events a view would send and
//! verify that every action:
//! 1. Changes exactly the pixels and selection it should
//! 2. Pushes at most one undo snapshot
//! 3. Reports the right notice when it does nothing

mod file_tests;
mod tool_tests;

use image::Rgba;
use tilepaint::{Cell, Command, Dispatch, EditorEvent, EditorSession};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Helper to create a session with a given canvas size and 4px grid
pub fn create_session(size: u32) -> EditorSession {
    EditorSession::new(size, 4)
}

pub fn down(s: &mut EditorSession, x: i32, y: i32) -> Dispatch {
    s.handle_event(EditorEvent::PointerDown(Cell::new(x, y)))
}

pub fn move_to(s: &mut EditorSession, x: i32, y: i32) -> Dispatch {
    s.handle_event(EditorEvent::PointerMove(Cell::new(x, y)))
}

pub fn up(s: &mut EditorSession, x: i32, y: i32) -> Dispatch {
    s.handle_event(EditorEvent::PointerUp(Cell::new(x, y)))
}

pub fn drag(s: &mut EditorSession, x0: i32, y0: i32, x1: i32, y1: i32) -> Dispatch {
    down(s, x0, y0);
    move_to(s, x1, y1);
    up(s, x1, y1)
}

pub fn click(s: &mut EditorSession, x: i32, y: i32) -> Dispatch {
    down(s, x, y);
    up(s, x, y)
}

pub fn cmd(s: &mut EditorSession, command: Command) -> Dispatch {
    s.handle_event(EditorEvent::Command(command))
}

/// Helper to get the pixel at a position
pub fn pixel_at(s: &EditorSession, x: i32, y: i32) -> Rgba<u8> {
    s.canvas.pixels.pixel(Cell::new(x, y)).expect("pixel inside canvas")
}

pub fn count_color(s: &EditorSession, color: Rgba<u8>) -> usize {
    s.canvas.pixels.as_raw().chunks_exact(4).filter(|p| *p == color.0).count()
}
