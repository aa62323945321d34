//! Tests for pencil, eraser, fill and select gestures

use image::Rgba;
use pretty_assertions::assert_eq;
use tilepaint::components::tools::Tool;
use tilepaint::ops::scripting::parse_script;
use tilepaint::selection::Selection;
use tilepaint::{Command, Dispatch, EditorSession, Notice};

use crate::*;

// ============================================================================
// Pencil / Eraser
// ============================================================================

#[test]
fn test_pencil_drag_paints_diagonal() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(RED));

    drag(&mut s, 0, 0, 7, 7);

    for i in 0..8 {
        assert_eq!(pixel_at(&s, i, i), RED, "diagonal cell {}", i);
    }
    assert_eq!(count_color(&s, RED), 8);
    assert_eq!(count_color(&s, CLEAR), 64 - 8);
}

#[test]
fn test_stroke_pushes_one_undo() {
    let mut s = create_session(8);
    down(&mut s, 0, 0);
    move_to(&mut s, 3, 0);
    move_to(&mut s, 5, 2);
    up(&mut s, 5, 2);

    assert_eq!(s.history.undo_count(), 1);
    assert!(s.is_dirty);

    cmd(&mut s, Command::Undo);
    assert_eq!(count_color(&s, CLEAR), 64);
}

#[test]
fn test_fast_move_leaves_no_gaps() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetColor(RED));
    down(&mut s, 0, 5);
    move_to(&mut s, 15, 5);
    up(&mut s, 15, 5);
    assert_eq!(count_color(&s, RED), 16);
}

#[test]
fn test_eraser_clears_pixels() {
    let mut s = create_session(8);
    drag(&mut s, 0, 0, 7, 0);
    cmd(&mut s, Command::SetTool(Tool::Eraser));
    drag(&mut s, 2, 0, 4, 0);

    assert_eq!(pixel_at(&s, 1, 0), Rgba([0, 0, 0, 255]));
    assert_eq!(pixel_at(&s, 3, 0), CLEAR);
    assert_eq!(pixel_at(&s, 5, 0), Rgba([0, 0, 0, 255]));
    assert_eq!(s.history.undo_count(), 2);
}

#[test]
fn test_painting_respects_selection() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 2, 2, 4, 4);
    assert_eq!(s.canvas.mask(), Some(Selection::new(2, 2, 3, 3)));

    cmd(&mut s, Command::SetTool(Tool::Pencil));
    cmd(&mut s, Command::SetColor(RED));
    drag(&mut s, 0, 3, 7, 3);

    for x in 0..8 {
        let expected = if (2..=4).contains(&x) { RED } else { CLEAR };
        assert_eq!(pixel_at(&s, x, 3), expected, "x = {}", x);
    }
}

#[test]
fn test_press_outside_canvas_is_ignored() {
    let mut s = create_session(8);
    let dispatch = down(&mut s, -1, 3);
    assert_eq!(dispatch, Dispatch::default());
    move_to(&mut s, 3, 3);
    up(&mut s, 3, 3);
    assert_eq!(s.history.undo_count(), 0);
    assert_eq!(count_color(&s, CLEAR), 64);
}

// ============================================================================
// Fill
// ============================================================================

#[test]
fn test_fill_inside_selection_changes_only_selection() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 2, 2, 4, 4);

    cmd(&mut s, Command::SetTool(Tool::Fill));
    cmd(&mut s, Command::SetColor(BLUE));
    down(&mut s, 3, 3);
    up(&mut s, 3, 3);

    assert_eq!(count_color(&s, BLUE), 9);
    assert_eq!(pixel_at(&s, 1, 2), CLEAR);
    assert_eq!(pixel_at(&s, 5, 4), CLEAR);
    assert_eq!(s.history.undo_count(), 1);
}

#[test]
fn test_fill_outside_selection_reports_no_target() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 2, 2, 4, 4);
    cmd(&mut s, Command::SetTool(Tool::Fill));

    let dispatch = down(&mut s, 10, 10);

    assert_eq!(dispatch.notice, Some(Notice::FillNoTarget));
    assert_eq!(s.history.undo_count(), 0);
    assert_eq!(count_color(&s, CLEAR), 256);
}

#[test]
fn test_fill_with_same_color_pushes_nothing() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetTool(Tool::Fill));
    cmd(&mut s, Command::SetColor(RED));
    click(&mut s, 0, 0);
    assert_eq!(count_color(&s, RED), 64);
    assert_eq!(s.history.undo_count(), 1);

    let dispatch = down(&mut s, 5, 5);

    assert_eq!(dispatch.notice, Some(Notice::FillUnchanged));
    assert_eq!(s.history.undo_count(), 1);
}

#[test]
fn test_fill_stops_at_walls() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(BLUE));
    drag(&mut s, 4, 0, 4, 7);

    cmd(&mut s, Command::SetTool(Tool::Fill));
    cmd(&mut s, Command::SetColor(RED));
    click(&mut s, 0, 0);

    assert_eq!(count_color(&s, RED), 4 * 8);
    assert_eq!(pixel_at(&s, 6, 6), CLEAR);
}

// ============================================================================
// Select
// ============================================================================

#[test]
fn test_click_selects_grid_tile() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    click(&mut s, 5, 6);
    assert_eq!(s.canvas.mask(), Some(Selection::new(4, 4, 4, 4)));
}

#[test]
fn test_click_at_far_edge_clips_tile() {
    let mut s = EditorSession::new(10, 4);
    cmd(&mut s, Command::SetTool(Tool::Select));
    click(&mut s, 9, 9);
    assert_eq!(s.canvas.mask(), Some(Selection::new(8, 8, 2, 2)));
}

#[test]
fn test_click_outside_selection_deselects() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    click(&mut s, 5, 6);

    click(&mut s, 0, 0);

    assert_eq!(s.canvas.mask(), None);
    assert_eq!(s.canvas.selection.last_preview(), Some(Selection::new(4, 4, 4, 4)));
}

#[test]
fn test_drag_from_outside_selection_starts_new_rect() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    click(&mut s, 5, 6);

    drag(&mut s, 0, 0, 1, 1);

    assert_eq!(s.canvas.mask(), Some(Selection::new(0, 0, 2, 2)));
}

#[test]
fn test_drag_select_any_direction() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 9, 9, 3, 5);
    assert_eq!(s.canvas.mask(), Some(Selection::new(3, 5, 7, 5)));
}

#[test]
fn test_drag_select_clamps_to_canvas() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 2, 2, 20, -5);
    assert_eq!(s.canvas.mask(), Some(Selection::new(2, 0, 6, 3)));
}

#[test]
fn test_tool_switch_keeps_selection() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    click(&mut s, 1, 1);
    cmd(&mut s, Command::SetTool(Tool::Eraser));
    cmd(&mut s, Command::SetTool(Tool::Fill));
    assert_eq!(s.canvas.mask(), Some(Selection::new(0, 0, 4, 4)));
}

#[test]
fn test_moving_selection_lifts_pixels() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(RED));
    click(&mut s, 1, 1);

    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 0, 0, 1, 1);
    assert_eq!(s.canvas.mask(), Some(Selection::new(0, 0, 2, 2)));

    down(&mut s, 1, 1);
    assert!(s.canvas.floating.is_none());
    assert_eq!(s.history.undo_count(), 1);

    move_to(&mut s, 4, 4);
    assert!(s.canvas.floating.is_some());
    assert_eq!(s.history.undo_count(), 2);
    assert_eq!(pixel_at(&s, 1, 1), CLEAR);
    assert_eq!(pixel_at(&s, 4, 4), RED);
    assert_eq!(s.canvas.mask(), Some(Selection::new(3, 3, 2, 2)));

    up(&mut s, 4, 4);
    assert!(s.canvas.floating.is_none());
    assert_eq!(s.history.undo_count(), 2);

    cmd(&mut s, Command::Undo);
    assert_eq!(pixel_at(&s, 1, 1), RED);
    assert_eq!(pixel_at(&s, 4, 4), CLEAR);
}

#[test]
fn test_click_inside_selection_changes_nothing() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(RED));
    click(&mut s, 1, 1);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 0, 0, 3, 3);
    s.mark_clean();
    let before = s.canvas.pixels.clone();

    click(&mut s, 1, 1);

    assert_eq!(s.history.undo_count(), 1);
    assert!(!s.is_dirty);
    assert!(s.canvas.floating.is_none());
    assert_eq!(s.canvas.pixels, before);
    assert_eq!(s.canvas.mask(), Some(Selection::new(0, 0, 4, 4)));
}

#[test]
fn test_release_elsewhere_moves_selection_without_move_events() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(RED));
    click(&mut s, 0, 0);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 0, 0, 1, 1);

    down(&mut s, 0, 0);
    up(&mut s, 2, 3);

    assert!(s.canvas.floating.is_none());
    assert_eq!(s.canvas.mask(), Some(Selection::new(2, 3, 2, 2)));
    assert_eq!(pixel_at(&s, 2, 3), RED);
    assert_eq!(pixel_at(&s, 0, 0), CLEAR);
}

#[test]
fn test_far_off_canvas_move_is_clipped() {
    let mut s = create_session(8);
    cmd(&mut s, Command::SetColor(RED));
    let script = "down 0 3\nmove 1100000000 3\nmove -2000000000 -2000000000\nup 2000000000 2000000000\n";
    for event in parse_script(script).unwrap() {
        s.handle_event(event);
    }

    for x in 0..8 {
        assert_eq!(pixel_at(&s, x, 3), RED, "x = {}", x);
    }
    // The way back crosses the canvas on the diagonal y = x.
    assert_eq!(pixel_at(&s, 5, 5), RED);
    assert_eq!(pixel_at(&s, 0, 0), RED);
    assert_eq!(s.history.undo_count(), 1);
}

#[test]
fn test_shortcuts_drive_the_same_commands() {
    let mut s = create_session(8);
    drag(&mut s, 0, 0, 3, 0);
    let undo = Command::from_combo("ctrl+z").unwrap();
    let dispatch = cmd(&mut s, undo);
    assert_eq!(dispatch.notice, Some(Notice::Undone { remaining: 0 }));

    cmd(&mut s, Command::from_shortcut("g", false).unwrap());
    assert_eq!(s.tools.tool(), Tool::Fill);
}
