// ============================================================================
// CANVAS-LEVEL OPERATIONS — delete / clear / undo / resize
// ============================================================================

use crate::canvas::{PixelBuffer, clamp_canvas_size, clamp_grid_spacing};
use crate::events::Dispatch;
use crate::notice::Notice;
use crate::project::EditorSession;

impl EditorSession {
    /// Erase the selected pixels and drop the selection.
    pub fn delete_selection(&mut self) -> Dispatch {
        let Some(sel) = self.canvas.mask() else {
            return Dispatch::notice(Notice::NoSelection);
        };
        self.history.push(&self.canvas.pixels);
        self.canvas.drop_floating();
        self.tools.reset_gesture();
        self.canvas.pixels = self.canvas.pixels.clear_region(&sel);
        self.canvas.selection.clear();
        self.mark_dirty();
        log::info!("deleted {}×{} at ({}, {})", sel.w, sel.h, sel.x, sel.y);
        Dispatch::redraw().with_notice(Notice::SelectionDeleted)
    }

    /// Erase the selection if there is one (keeping the rectangle), otherwise
    /// the whole canvas.
    pub fn clear_canvas(&mut self) -> Dispatch {
        self.history.push(&self.canvas.pixels);
        self.canvas.drop_floating();
        self.tools.reset_gesture();
        match self.canvas.mask() {
            Some(sel) => {
                self.canvas.pixels = self.canvas.pixels.clear_region(&sel);
            }
            None => {
                self.canvas.pixels = PixelBuffer::new(self.canvas.size);
                self.canvas.selection.clear();
            }
        }
        self.mark_dirty();
        Dispatch::redraw().with_notice(Notice::Cleared)
    }

    /// Restore the most recent snapshot. A floating block is abandoned; the
    /// selection is left as it is.
    pub fn undo(&mut self) -> Dispatch {
        let Some(previous) = self.history.pop() else {
            return Dispatch::notice(Notice::NothingToUndo);
        };
        self.canvas.drop_floating();
        self.tools.reset_gesture();
        self.canvas.pixels = previous;
        self.mark_dirty();
        Dispatch::redraw().with_notice(Notice::Undone {
            remaining: self.history.undo_count(),
        })
    }

    /// Start over on an empty canvas of side `size` (clamped). Not undoable.
    pub fn resize_canvas(&mut self, size: u32) -> Dispatch {
        let size = clamp_canvas_size(size);
        self.canvas.reset(PixelBuffer::new(size));
        self.history.clear();
        self.tools.reset_gesture();
        self.mark_dirty();
        log::info!("canvas resized to {}×{}", size, size);
        Dispatch::redraw().with_notice(Notice::CanvasResized { size })
    }

    /// Change the overlay grid interval. Pixels are unaffected.
    pub fn set_grid_spacing(&mut self, spacing: u32) -> Dispatch {
        let spacing = clamp_grid_spacing(spacing, self.canvas.size);
        if spacing == self.canvas.grid_spacing {
            return Dispatch::none();
        }
        self.canvas.grid_spacing = spacing;
        Dispatch::redraw()
    }
}
