//! Tests for save/open through the host shell and embedded metadata

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tilepaint::components::tools::Tool;
use tilepaint::io::{self, METADATA_KEYWORD};
use tilepaint::shell::{UnsavedChoice, read_metadata};
use tilepaint::{Command, EditorSession, Notice};

use crate::mock_shell::MockShell;
use crate::*;

fn png_of(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    io::encode_png(&RgbaImage::from_pixel(width, height, color)).unwrap()
}

/// A 16×16 session with a few red pixels, unsaved.
fn dirty_session() -> EditorSession {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetColor(RED));
    drag(&mut s, 0, 0, 5, 0);
    assert!(s.is_dirty);
    s
}

// ============================================================================
// Save
// ============================================================================

#[test]
fn test_save_untitled_without_path_is_canceled() {
    let mut s = dirty_session();
    let mut shell = MockShell::default();

    assert_eq!(s.save(&mut shell, false), Notice::SaveCanceled);
    assert!(s.is_dirty);
    assert!(s.path.is_none());
    assert!(shell.files.is_empty());
}

#[test]
fn test_save_records_path_and_metadata() {
    let mut s = dirty_session();
    let mut shell = MockShell {
        prompt_path: Some(PathBuf::from("/art/hero.png")),
        ..Default::default()
    };

    let notice = s.save(&mut shell, false);

    assert_eq!(
        notice,
        Notice::Saved {
            path: PathBuf::from("/art/hero.png")
        }
    );
    assert!(!s.is_dirty);
    assert_eq!(s.name, "hero.png");
    assert_eq!(s.recent_file, Some(PathBuf::from("/art/hero.png")));

    let bytes = &shell.files[Path::new("/art/hero.png")];
    let meta = read_metadata(bytes).unwrap();
    assert_eq!(meta.canvas_size, Some(16));
    assert_eq!(meta.grid_spacing, Some(4));
    assert_eq!(meta.last_tool, Tool::Pencil);
    assert_eq!(io::decode_png(bytes).unwrap().dimensions(), (16, 16));
}

#[test]
fn test_second_save_reuses_path() {
    let mut s = dirty_session();
    let mut shell = MockShell {
        prompt_path: Some(PathBuf::from("/a.png")),
        ..Default::default()
    };
    s.save(&mut shell, false);

    shell.prompt_path = Some(PathBuf::from("/b.png"));
    drag(&mut s, 0, 1, 5, 1);
    assert_eq!(s.save(&mut shell, false), Notice::Saved { path: "/a.png".into() });
    assert_eq!(s.save(&mut shell, true), Notice::Saved { path: "/b.png".into() });
    assert_eq!(s.path, Some(PathBuf::from("/b.png")));
}

#[test]
fn test_save_failure_keeps_document_dirty() {
    let mut s = dirty_session();
    let mut shell = MockShell {
        prompt_path: Some(PathBuf::from("/locked/hero.png")),
        fail_writes: true,
        ..Default::default()
    };

    let notice = s.save(&mut shell, false);

    assert!(matches!(notice, Notice::SaveFailed { .. }), "got {:?}", notice);
    assert!(s.is_dirty);
    assert!(s.path.is_none());
    assert!(s.recent_file.is_none());
}

// ============================================================================
// Open
// ============================================================================

#[test]
fn test_save_then_open_restores_document() {
    let mut a = dirty_session();
    cmd(&mut a, Command::SetGridSpacing(8));
    cmd(&mut a, Command::SetTool(Tool::Fill));
    let mut shell = MockShell {
        prompt_path: Some(PathBuf::from("/tiles.png")),
        ..Default::default()
    };
    a.save(&mut shell, false);

    let mut b = EditorSession::new(32, 4);
    let notice = b.open(&mut shell, Some(Path::new("/tiles.png")));

    assert_eq!(
        notice,
        Notice::Opened {
            path: PathBuf::from("/tiles.png"),
            size: 16
        }
    );
    assert_eq!(b.canvas.pixels, a.canvas.pixels);
    assert_eq!(b.canvas.grid_spacing, 8);
    assert_eq!(b.tools.tool(), Tool::Fill);
    assert_eq!(b.display_title(), "tiles.png");
    assert_eq!(cmd(&mut b, Command::Undo).notice, Some(Notice::NothingToUndo));
}

#[test]
fn test_open_clean_document_does_not_prompt() {
    let mut s = create_session(8);
    let mut shell = MockShell::default();
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    s.open(&mut shell, Some(Path::new("/x.png")));

    assert_eq!(shell.confirm_calls, 0);
    assert_eq!(count_color(&s, BLUE), 64);
}

#[test]
fn test_open_with_dialog_cancel() {
    let mut s = create_session(8);
    let mut shell = MockShell::default();
    assert_eq!(s.open(&mut shell, None), Notice::OpenCanceled);
}

#[test]
fn test_missing_recent_file_is_forgotten() {
    let mut s = create_session(8);
    s.recent_file = Some(PathBuf::from("/gone.png"));
    let mut shell = MockShell::default();

    let notice = s.open_recent(&mut shell);

    assert_eq!(
        notice,
        Some(Notice::FileNotFound {
            path: PathBuf::from("/gone.png")
        })
    );
    assert!(s.recent_file.is_none());
    assert_eq!(s.open_recent(&mut shell), None);
}

#[test]
fn test_undecodable_file_leaves_document_untouched() {
    let mut s = dirty_session();
    let before = s.canvas.pixels.clone();
    let mut shell = MockShell {
        unsaved_answer: UnsavedChoice::DiscardAndOpen,
        ..Default::default()
    };
    shell.files.insert("/bad.png".into(), b"definitely not a png".to_vec());

    let notice = s.open(&mut shell, Some(Path::new("/bad.png")));

    assert!(matches!(notice, Notice::DecodeFailed { .. }), "got {:?}", notice);
    assert_eq!(s.canvas.pixels, before);
    assert!(s.path.is_none());
    assert!(s.history.can_undo());
}

// ============================================================================
// Unsaved changes
// ============================================================================

#[test]
fn test_unsaved_cancel_keeps_document() {
    let mut s = dirty_session();
    let before = s.canvas.pixels.clone();
    let mut shell = MockShell::default();
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    let notice = s.open(&mut shell, Some(Path::new("/x.png")));

    assert_eq!(notice, Notice::OpenCanceled);
    assert_eq!(shell.confirm_calls, 1);
    assert_eq!(shell.open_calls, 0);
    assert_eq!(s.canvas.pixels, before);
}

#[test]
fn test_unsaved_save_then_open_aborts_when_save_canceled() {
    let mut s = dirty_session();
    let mut shell = MockShell {
        unsaved_answer: UnsavedChoice::SaveThenOpen,
        ..Default::default()
    };
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    let notice = s.open(&mut shell, Some(Path::new("/x.png")));

    assert_eq!(notice, Notice::SaveCanceled);
    assert_eq!(shell.open_calls, 0);
    assert!(s.is_dirty);
}

#[test]
fn test_unsaved_save_then_open_writes_first() {
    let mut s = dirty_session();
    s.path = Some(PathBuf::from("/mine.png"));
    let mut shell = MockShell {
        unsaved_answer: UnsavedChoice::SaveThenOpen,
        ..Default::default()
    };
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    let notice = s.open(&mut shell, Some(Path::new("/x.png")));

    assert_eq!(
        notice,
        Notice::Opened {
            path: PathBuf::from("/x.png"),
            size: 8
        }
    );
    assert!(shell.files.contains_key(Path::new("/mine.png")));
    assert_eq!(s.path, Some(PathBuf::from("/x.png")));
    assert!(!s.is_dirty);
}

#[test]
fn test_unsaved_discard_replaces_document() {
    let mut s = dirty_session();
    let mut shell = MockShell {
        unsaved_answer: UnsavedChoice::DiscardAndOpen,
        ..Default::default()
    };
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    s.open(&mut shell, Some(Path::new("/x.png")));

    assert_eq!(s.canvas.size, 8);
    assert_eq!(count_color(&s, BLUE), 64);
    assert_eq!(shell.files.len(), 1);
}

// ============================================================================
// Load squaring and legacy metadata
// ============================================================================

#[test]
fn test_legacy_size_key_scales_image() {
    let mut image = RgbaImage::from_pixel(16, 16, CLEAR);
    for y in 0..16 {
        for x in 0..8 {
            image.put_pixel(x, y, RED);
        }
    }
    let png = io::encode_png(&image).unwrap();
    let png = io::embed_metadata(&png, METADATA_KEYWORD, r#"{"version":1,"size":128}"#).unwrap();

    let mut s = create_session(16);
    let mut shell = MockShell::default();
    shell.files.insert("/old.png".into(), png);

    let notice = s.open(&mut shell, Some(Path::new("/old.png")));

    assert_eq!(
        notice,
        Notice::Opened {
            path: PathBuf::from("/old.png"),
            size: 128
        }
    );
    assert_eq!(s.canvas.size, 128);
    assert_eq!(pixel_at(&s, 0, 0), RED);
    assert_eq!(pixel_at(&s, 60, 100), RED);
    assert_eq!(pixel_at(&s, 70, 10), CLEAR);
    assert_eq!(pixel_at(&s, 127, 127), CLEAR);
}

#[test]
fn test_non_square_image_without_metadata_uses_default_size() {
    let mut s = create_session(16);
    let mut shell = MockShell::default();
    shell.files.insert("/wide.png".into(), png_of(20, 10, RED));

    s.open(&mut shell, Some(Path::new("/wide.png")));

    assert_eq!(s.canvas.size, 256);
    assert_eq!(count_color(&s, RED), 256 * 256);
}

#[test]
fn test_open_clears_selection_and_float() {
    let mut s = create_session(16);
    cmd(&mut s, Command::SetTool(Tool::Select));
    drag(&mut s, 0, 0, 3, 3);
    cmd(&mut s, Command::Copy);
    cmd(&mut s, Command::Paste);
    let mut shell = MockShell {
        unsaved_answer: UnsavedChoice::DiscardAndOpen,
        ..Default::default()
    };
    shell.files.insert("/x.png".into(), png_of(8, 8, BLUE));

    s.open(&mut shell, Some(Path::new("/x.png")));

    assert!(s.canvas.floating.is_none());
    assert_eq!(s.canvas.mask(), None);
    assert_eq!(cmd(&mut s, Command::Cancel).notice, Some(Notice::NothingFloating));
}
