// ============================================================================
// CLIPBOARD OPERATIONS — copy, paste and the floating block they produce
// ============================================================================

use image::{RgbaImage, imageops};

use crate::canvas::{Cell, PixelBuffer};
use crate::components::tools::{Gesture, Tool};
use crate::events::{Dispatch, Effect};
use crate::io;
use crate::notice::Notice;
use crate::project::EditorSession;
use crate::selection::Selection;

// ---------------------------------------------------------------------------
//  Internal clipboard
// ---------------------------------------------------------------------------

/// Pixels copied from the canvas plus where they were copied from. Lives as
/// long as the session and can be pasted any number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardBuffer {
    pub pixels: RgbaImage,
    pub source_x: i32,
    pub source_y: i32,
}

impl ClipboardBuffer {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

// ---------------------------------------------------------------------------
//  Floating block
// ---------------------------------------------------------------------------

/// A rectangle of pixels lifted off the canvas (or pasted) that is still
/// movable. The visible canvas is always `base` with `pixels` blitted at
/// `(x, y)`; the `restore_*` fields describe the state before the float
/// began so that a cancel can roll everything back.
#[derive(Clone, Debug)]
pub struct FloatingBlock {
    pub x: i32,
    pub y: i32,
    pub pixels: RgbaImage,
    /// Canvas underneath the block: the source footprint erased for a lift,
    /// the untouched canvas for a paste.
    pub base: PixelBuffer,
    pub restore_pixels: PixelBuffer,
    pub restore_selection: Option<Selection>,
    pub restore_tool: Tool,
}

impl FloatingBlock {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The rectangle the block currently covers.
    pub fn footprint(&self) -> Selection {
        Selection::new(self.x, self.y, self.width() as i32, self.height() as i32)
    }

    /// What the canvas shows while the block floats.
    pub fn composite(&self) -> PixelBuffer {
        self.base.blit(&self.pixels, self.x, self.y)
    }

    /// Keep the whole block on a `canvas_size` canvas.
    pub fn clamp_origin(&self, x: i32, y: i32, canvas_size: u32) -> Cell {
        let n = canvas_size as i32;
        let max_x = (n - self.width() as i32).max(0);
        let max_y = (n - self.height() as i32).max(0);
        Cell::new(x.clamp(0, max_x), y.clamp(0, max_y))
    }
}

impl EditorSession {
    /// Copy the selected rectangle into the internal clipboard and hand a PNG
    /// of it to the OS clipboard.
    pub fn copy_selection(&mut self) -> Dispatch {
        let Some(sel) = self.canvas.mask() else {
            return Dispatch::notice(Notice::NoSelection);
        };
        let pixels = self.canvas.pixels.extract(&sel);
        let (width, height) = pixels.dimensions();

        let mut dispatch = Dispatch::notice(Notice::Copied { width, height });
        match io::encode_png(&pixels) {
            Ok(png) => {
                dispatch = dispatch.with_effect(Effect::WriteClipboard {
                    data_url: io::to_data_url(&png),
                });
            }
            Err(e) => log::warn!("copy: OS clipboard skipped, PNG encode failed: {}", e),
        }

        self.clipboard = Some(ClipboardBuffer {
            pixels,
            source_x: sel.x,
            source_y: sel.y,
        });
        dispatch
    }

    /// Paste the clipboard as a new floating block.
    ///
    /// Lands on the selection origin when there is one, otherwise one pixel
    /// right and down from where the pixels were copied. The block is
    /// truncated to fit the canvas.
    pub fn paste(&mut self) -> Dispatch {
        let n = self.canvas.size as i32;
        let (block, x, y) = {
            let Some(clip) = self.clipboard.as_ref() else {
                return Dispatch::notice(Notice::ClipboardEmpty);
            };
            let (x, y) = match self.canvas.mask() {
                Some(sel) => (sel.x, sel.y),
                None => (clip.source_x + 1, clip.source_y + 1),
            };
            let x = x.clamp(0, n - 1);
            let y = y.clamp(0, n - 1);
            let w = (clip.width() as i32).min(n - x);
            let h = (clip.height() as i32).min(n - y);
            if w <= 0 || h <= 0 {
                return Dispatch::notice(Notice::PasteOutOfBounds);
            }
            let block = if w as u32 == clip.width() && h as u32 == clip.height() {
                clip.pixels.clone()
            } else {
                imageops::crop_imm(&clip.pixels, 0, 0, w as u32, h as u32).to_image()
            };
            (block, x, y)
        };

        self.commit_floating();
        self.history.push(&self.canvas.pixels);

        let float = FloatingBlock {
            x,
            y,
            pixels: block,
            base: self.canvas.pixels.clone(),
            restore_pixels: self.canvas.pixels.clone(),
            restore_selection: self.canvas.mask(),
            restore_tool: self.tools.tool(),
        };
        let footprint = float.footprint();
        self.canvas.pixels = float.composite();
        self.canvas.selection.set(Some(footprint));
        self.canvas.floating = Some(float);
        self.tools.set_tool(Tool::Select);

        Dispatch::redraw().with_notice(Notice::Pasted {
            x,
            y,
            width: footprint.w as u32,
            height: footprint.h as u32,
        })
    }

    /// Start moving the selected pixels once a press inside the selection
    /// turns into a drag. The block is cut out of the canvas (its footprint
    /// becomes transparent underneath) and floats in place.
    pub(crate) fn lift_selection(&mut self, sel: Selection, press: Cell) -> Dispatch {
        self.history.push(&self.canvas.pixels);
        let float = FloatingBlock {
            x: sel.x,
            y: sel.y,
            pixels: self.canvas.pixels.extract(&sel),
            base: self.canvas.pixels.clear_region(&sel),
            restore_pixels: self.canvas.pixels.clone(),
            restore_selection: Some(sel),
            restore_tool: self.tools.tool(),
        };
        self.canvas.pixels = float.composite();
        self.canvas.floating = Some(float);
        self.tools.set_gesture(Gesture::MovingFloat {
            press,
            origin: sel.origin(),
        });
        Dispatch::redraw()
    }

    /// Drop the floating state, keeping the block where it is shown.
    /// Returns whether a block was floating.
    pub(crate) fn commit_floating(&mut self) -> bool {
        if !self.canvas.drop_floating() {
            return false;
        }
        if matches!(self.tools.gesture(), Gesture::MovingFloat { .. }) {
            self.tools.reset_gesture();
        }
        self.mark_dirty();
        true
    }

    /// Enter: place the floating block.
    pub fn finalize_floating(&mut self) -> Dispatch {
        if self.commit_floating() {
            Dispatch::redraw().with_notice(Notice::FloatCommitted)
        } else {
            Dispatch::notice(Notice::NothingFloating)
        }
    }

    /// Escape: undo everything since the block started floating, including
    /// the selection and any tool switch.
    pub fn cancel_floating(&mut self) -> Dispatch {
        let Some(float) = self.canvas.floating.take() else {
            return Dispatch::notice(Notice::NothingFloating);
        };
        self.canvas.pixels = float.restore_pixels;
        self.canvas.selection.set(float.restore_selection);
        self.tools.set_tool(float.restore_tool);
        Dispatch::redraw().with_notice(Notice::FloatCanceled)
    }
}
