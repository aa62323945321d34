// ============================================================================
// HOST SHELL — file system, dialogs and OS clipboard
// ============================================================================

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ShellError;
use crate::io::{self, EditorMetadata, METADATA_KEYWORD};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveResponse {
    Canceled,
    Saved { path: PathBuf },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpenResponse {
    Canceled,
    Opened {
        path: PathBuf,
        png_bytes: Vec<u8>,
        metadata: Option<EditorMetadata>,
    },
    NotFound { path: PathBuf },
    ReadFailed { path: PathBuf, reason: String },
}

/// Answer to "the document has unsaved changes".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnsavedChoice {
    SaveThenOpen,
    DiscardAndOpen,
    #[default]
    Cancel,
}

/// Everything the editing session needs from its host.
pub trait HostShell {
    /// Write `png_bytes`, prompting for a path when `path` is `None` or
    /// `save_as` is set. `png_bytes` already carries `metadata`.
    fn save_png(
        &mut self,
        png_bytes: &[u8],
        metadata: &EditorMetadata,
        path: Option<&Path>,
        save_as: bool,
    ) -> Result<SaveResponse, ShellError>;

    /// Read a PNG, prompting for a path when `path` is `None`.
    fn open_png(&mut self, path: Option<&Path>) -> OpenResponse;

    /// Put a `data:image/png;base64,` image on the OS clipboard.
    fn copy_image_data_url(&mut self, data_url: &str) -> Result<(), ShellError>;

    fn confirm_discard_unsaved(&mut self) -> UnsavedChoice;
}

// ============================================================================
// FILE HANDLER — desktop implementation
// ============================================================================

/// Desktop shell: `std::fs` for I/O, native dialogs when built with the
/// `dialogs` feature, `arboard` for the clipboard.
pub struct FileHandler {
    /// Used instead of a dialog when none can be shown.
    pub headless_unsaved: UnsavedChoice,
    clipboard: Option<arboard::Clipboard>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            headless_unsaved: UnsavedChoice::default(),
            clipboard: None,
        }
    }

    /// Handler for unattended runs: the unsaved-changes prompt always gets `answer`.
    pub fn headless(answer: UnsavedChoice) -> Self {
        Self {
            headless_unsaved: answer,
            clipboard: None,
        }
    }

    #[cfg(feature = "dialogs")]
    fn pick_save_path(&self, suggested: Option<&Path>) -> Option<PathBuf> {
        let name = suggested
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled.png".to_string());
        let mut dialog = rfd::FileDialog::new().add_filter("PNG Image", &["png"]).set_file_name(&name);
        if let Some(dir) = suggested.and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }

    #[cfg(not(feature = "dialogs"))]
    fn pick_save_path(&self, _suggested: Option<&Path>) -> Option<PathBuf> {
        log::info!("save: no dialog available, treating as canceled");
        None
    }

    #[cfg(feature = "dialogs")]
    fn pick_open_path(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .add_filter("All Files", &["*"])
            .pick_file()
    }

    #[cfg(not(feature = "dialogs"))]
    fn pick_open_path(&self) -> Option<PathBuf> {
        log::info!("open: no dialog available, treating as canceled");
        None
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, ShellError> {
        if self.clipboard.is_none() {
            let clip = arboard::Clipboard::new().map_err(|e| ShellError::Clipboard(e.to_string()))?;
            self.clipboard = Some(clip);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| ShellError::Clipboard("not initialised".into()))
    }
}

impl HostShell for FileHandler {
    fn save_png(
        &mut self,
        png_bytes: &[u8],
        metadata: &EditorMetadata,
        path: Option<&Path>,
        save_as: bool,
    ) -> Result<SaveResponse, ShellError> {
        let target = match path {
            Some(p) if !save_as => Some(p.to_path_buf()),
            _ => self.pick_save_path(path),
        };
        let Some(target) = target else {
            return Ok(SaveResponse::Canceled);
        };
        fs::write(&target, png_bytes).map_err(|source| ShellError::Write {
            path: target.clone(),
            source,
        })?;
        log::info!(
            "wrote {} ({} bytes, canvas {:?}, metadata v{})",
            target.display(),
            png_bytes.len(),
            metadata.canvas_size(),
            metadata.version
        );
        Ok(SaveResponse::Saved { path: target })
    }

    fn open_png(&mut self, path: Option<&Path>) -> OpenResponse {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match self.pick_open_path() {
                Some(p) => p,
                None => return OpenResponse::Canceled,
            },
        };
        let png_bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return OpenResponse::NotFound { path },
            Err(e) => {
                return OpenResponse::ReadFailed {
                    path,
                    reason: e.to_string(),
                };
            }
        };
        let metadata = read_metadata(&png_bytes);
        OpenResponse::Opened {
            path,
            png_bytes,
            metadata,
        }
    }

    fn copy_image_data_url(&mut self, data_url: &str) -> Result<(), ShellError> {
        let png_bytes = io::from_data_url(data_url).ok_or(ShellError::DataUrl)?;
        let image = io::decode_png(&png_bytes).map_err(|e| ShellError::Clipboard(e.to_string()))?;
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };
        self.clipboard()?
            .set_image(data)
            .map_err(|e| ShellError::Clipboard(e.to_string()))
    }

    #[cfg(feature = "dialogs")]
    fn confirm_discard_unsaved(&mut self) -> UnsavedChoice {
        use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Unsaved changes")
            .set_description("Save changes before opening another file?")
            .set_buttons(MessageButtons::YesNoCancel)
            .show();
        match answer {
            MessageDialogResult::Yes => UnsavedChoice::SaveThenOpen,
            MessageDialogResult::No => UnsavedChoice::DiscardAndOpen,
            _ => UnsavedChoice::Cancel,
        }
    }

    #[cfg(not(feature = "dialogs"))]
    fn confirm_discard_unsaved(&mut self) -> UnsavedChoice {
        self.headless_unsaved
    }
}

/// Editor metadata embedded in `png_bytes`, if present and readable.
pub fn read_metadata(png_bytes: &[u8]) -> Option<EditorMetadata> {
    let text = match io::extract_metadata(png_bytes, METADATA_KEYWORD) {
        Ok(text) => text?,
        Err(e) => {
            log::debug!("metadata: chunk scan failed: {}", e);
            return None;
        }
    };
    match EditorMetadata::from_json(&text) {
        Ok(meta) => Some(meta),
        Err(e) => {
            log::warn!("metadata: ignoring malformed editor data: {}", e);
            None
        }
    }
}
