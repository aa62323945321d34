use image::Rgba;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::canvas::{CanvasState, DEFAULT_CANVAS_SIZE, DEFAULT_GRID_SPACING, clamp_grid_spacing};
use crate::components::colors::{default_palette, palette_from_hex, palette_to_hex};
use crate::components::history::UndoHistory;
use crate::components::tools::ToolController;
use crate::error::CodecError;
use crate::events::{Command, Dispatch, EditorEvent, Effect};
use crate::io::{self, EditorMetadata, METADATA_KEYWORD, METADATA_VERSION};
use crate::notice::Notice;
use crate::ops::clipboard::ClipboardBuffer;
use crate::settings::AppSettings;
use crate::shell::{HostShell, OpenResponse, SaveResponse, UnsavedChoice};

/// The single open document and everything editing it: pixels, selection,
/// floating block, clipboard, undo history and tool state.
pub struct EditorSession {
    pub id: Uuid,
    pub canvas: CanvasState,
    pub history: UndoHistory,
    pub clipboard: Option<ClipboardBuffer>,
    pub tools: ToolController,
    pub palette: Vec<Rgba<u8>>,
    /// `None` for unsaved/untitled documents.
    pub path: Option<PathBuf>,
    /// Display name (derived from path or "Untitled")
    pub name: String,
    pub is_dirty: bool,
    /// Most recently opened or saved file; forgotten when it goes missing.
    pub recent_file: Option<PathBuf>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_GRID_SPACING)
    }
}

impl EditorSession {
    pub fn new(size: u32, grid_spacing: u32) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            canvas: CanvasState::new(size, grid_spacing),
            history: UndoHistory::default(),
            clipboard: None,
            tools: ToolController::default(),
            palette: default_palette(),
            path: None,
            name: "Untitled".to_string(),
            is_dirty: false,
            recent_file: None,
        };
        log::debug!(
            "{}: new {}×{} canvas, grid {}",
            session.log_tag(),
            session.canvas.size,
            session.canvas.size,
            session.canvas.grid_spacing
        );
        session
    }

    /// Short tag naming this session in log lines.
    pub fn log_tag(&self) -> String {
        let short: String = self.id.simple().to_string().chars().take(8).collect();
        format!("session {}", short)
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let mut session = Self::new(settings.default_canvas_size, settings.grid_spacing);
        let palette = settings.palette_colors();
        if !palette.is_empty() {
            session.palette = palette;
        }
        session.recent_file = settings.last_file.clone();
        session
    }

    // ========================================================================
    // EVENT DISPATCH
    // ========================================================================

    /// Route one input event. Every notice produced is also logged.
    pub fn handle_event(&mut self, event: EditorEvent) -> Dispatch {
        let dispatch = match event {
            EditorEvent::PointerDown(cell) => self.pointer_down(cell),
            EditorEvent::PointerMove(cell) => self.pointer_move(cell),
            EditorEvent::PointerUp(cell) => self.pointer_up(cell),
            EditorEvent::Command(cmd) => self.execute(cmd),
        };
        if let Some(notice) = &dispatch.notice {
            notice.log();
        }
        dispatch
    }

    pub fn execute(&mut self, cmd: Command) -> Dispatch {
        match cmd {
            Command::SetTool(tool) => {
                self.tools.set_tool(tool);
                Dispatch::redraw()
            }
            Command::SetColor(color) => {
                self.tools.set_color(color);
                Dispatch::redraw()
            }
            Command::Copy => self.copy_selection(),
            Command::Paste => self.paste(),
            Command::DeleteSelection => self.delete_selection(),
            Command::Clear => self.clear_canvas(),
            Command::Undo => self.undo(),
            Command::Finalize => self.finalize_floating(),
            Command::Cancel => self.cancel_floating(),
            Command::ResizeCanvas(size) => self.resize_canvas(size),
            Command::SetGridSpacing(spacing) => self.set_grid_spacing(spacing),
        }
    }

    /// Run the host-side effects of a dispatch. Clipboard failures are logged
    /// and otherwise ignored; the internal clipboard already holds the data.
    pub fn apply_effects(&self, shell: &mut dyn HostShell, effects: &[Effect]) {
        for effect in effects {
            if let Effect::WriteClipboard { data_url } = effect
                && let Err(e) = shell.copy_image_data_url(data_url)
            {
                log::warn!("OS clipboard write failed: {}", e);
            }
        }
    }

    // ========================================================================
    // SAVE / OPEN
    // ========================================================================

    /// Editor state written next to the pixels.
    pub fn metadata(&self) -> EditorMetadata {
        EditorMetadata {
            version: METADATA_VERSION,
            canvas_size: Some(self.canvas.size),
            size: None,
            grid_spacing: Some(self.canvas.grid_spacing),
            palette: palette_to_hex(&self.palette),
            last_tool: self.tools.tool(),
        }
    }

    /// The document as PNG bytes with metadata embedded.
    pub fn encode_document(&self) -> Result<(Vec<u8>, EditorMetadata), CodecError> {
        let metadata = self.metadata();
        let png = io::encode_png(self.canvas.pixels.as_image())?;
        let png = io::embed_metadata(&png, METADATA_KEYWORD, &metadata.to_json()?)?;
        Ok((png, metadata))
    }

    pub fn save(&mut self, shell: &mut dyn HostShell, save_as: bool) -> Notice {
        let notice = self.save_inner(shell, save_as);
        notice.log();
        notice
    }

    fn save_inner(&mut self, shell: &mut dyn HostShell, save_as: bool) -> Notice {
        let (png, metadata) = match self.encode_document() {
            Ok(encoded) => encoded,
            Err(e) => return Notice::SaveFailed { reason: e.to_string() },
        };
        match shell.save_png(&png, &metadata, self.path.as_deref(), save_as) {
            Ok(SaveResponse::Saved { path }) => {
                log::info!("{}: saved {}", self.log_tag(), path.display());
                self.path = Some(path.clone());
                self.recent_file = Some(path.clone());
                self.update_name_from_path();
                self.mark_clean();
                Notice::Saved { path }
            }
            Ok(SaveResponse::Canceled) => Notice::SaveCanceled,
            Err(e) => Notice::SaveFailed { reason: e.to_string() },
        }
    }

    /// Replace the document with a PNG from the shell. `path = None` lets
    /// the shell prompt. Unsaved changes are confirmed first.
    pub fn open(&mut self, shell: &mut dyn HostShell, path: Option<&Path>) -> Notice {
        let notice = self.open_inner(shell, path);
        notice.log();
        notice
    }

    /// Re-open the most recent file, if one is remembered.
    pub fn open_recent(&mut self, shell: &mut dyn HostShell) -> Option<Notice> {
        let path = self.recent_file.clone()?;
        Some(self.open(shell, Some(&path)))
    }

    fn open_inner(&mut self, shell: &mut dyn HostShell, path: Option<&Path>) -> Notice {
        if self.is_dirty {
            match shell.confirm_discard_unsaved() {
                UnsavedChoice::Cancel => return Notice::OpenCanceled,
                UnsavedChoice::SaveThenOpen => {
                    let saved = self.save(shell, false);
                    if !matches!(saved, Notice::Saved { .. }) {
                        return saved;
                    }
                }
                UnsavedChoice::DiscardAndOpen => {}
            }
        }

        match shell.open_png(path) {
            OpenResponse::Canceled => Notice::OpenCanceled,
            OpenResponse::NotFound { path } => {
                if self.recent_file.as_deref() == Some(path.as_path()) {
                    log::info!("forgetting missing recent file {}", path.display());
                    self.recent_file = None;
                }
                Notice::FileNotFound { path }
            }
            OpenResponse::ReadFailed { path, reason } => Notice::ReadFailed {
                reason: format!("{}: {}", path.display(), reason),
            },
            OpenResponse::Opened {
                path,
                png_bytes,
                metadata,
            } => match self.load_png(&png_bytes, metadata.as_ref()) {
                Ok(size) => {
                    self.path = Some(path.clone());
                    self.recent_file = Some(path.clone());
                    self.update_name_from_path();
                    self.mark_clean();
                    Notice::Opened { path, size }
                }
                Err(e) => Notice::DecodeFailed { reason: e.to_string() },
            },
        }
    }

    /// Decode `png_bytes` and make it the document. Nothing changes unless
    /// decoding succeeds. Returns the resulting canvas size.
    pub fn load_png(&mut self, png_bytes: &[u8], metadata: Option<&EditorMetadata>) -> Result<u32, CodecError> {
        let image = io::decode_png(png_bytes)?;
        let size = io::resolve_canvas_size(metadata, image.width(), image.height());
        let pixels = io::fit_to_canvas(image, size)?;

        self.canvas.reset(pixels);
        self.history.clear();
        self.tools.reset_gesture();
        if let Some(meta) = metadata {
            if let Some(spacing) = meta.grid_spacing {
                self.canvas.grid_spacing = clamp_grid_spacing(spacing, size);
            }
            let palette = palette_from_hex(&meta.palette);
            if !palette.is_empty() {
                self.palette = palette;
            }
            self.tools.set_tool(meta.last_tool);
        }
        log::info!("{}: loaded {}×{} canvas", self.log_tag(), size, size);
        Ok(size)
    }

    // ========================================================================
    // DOCUMENT STATE
    // ========================================================================

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn update_name_from_path(&mut self) {
        if let Some(ref path) = self.path {
            self.name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
        }
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}
