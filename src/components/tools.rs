use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::canvas::{Cell, PixelBuffer, Stroke, clip_segment, raster_line};
use crate::events::Dispatch;
use crate::notice::Notice;
use crate::project::EditorSession;
use crate::selection::Selection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Select,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Fill => "fill",
            Tool::Select => "select",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Pencil, Tool::Eraser, Tool::Fill, Tool::Select]
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tool '{}'", s.trim()))
    }
}

// ============================================================================
// GESTURE — private pointer bookkeeping
// ============================================================================

/// Phase of the pointer gesture in progress. This is control state only; the
/// renderable result of a gesture lives in [`crate::canvas::CanvasState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pencil/eraser stroke; `last` is the most recently painted cell.
    Drawing { last: Cell, stroke: Stroke },
    /// Select-tool press that becomes either a click or a drag rectangle.
    Selecting {
        anchor: Cell,
        /// Press landed outside an existing selection: deselect on a plain click.
        clear_on_release: bool,
        moved: bool,
    },
    /// Press inside the selection. The pixels are only lifted once the
    /// pointer leaves `press`, so a plain click changes nothing.
    Grabbing { press: Cell, selection: Selection },
    /// Dragging the floating block. `origin` is where the block sat at press.
    MovingFloat { press: Cell, origin: Cell },
}

/// Active tool, colour and gesture phase.
#[derive(Clone, Debug)]
pub struct ToolController {
    active_tool: Tool,
    color: Rgba<u8>,
    gesture: Gesture,
}

impl Default for ToolController {
    fn default() -> Self {
        Self {
            active_tool: Tool::default(),
            color: Rgba([0, 0, 0, 255]),
            gesture: Gesture::Idle,
        }
    }
}

impl ToolController {
    pub fn tool(&self) -> Tool {
        self.active_tool
    }

    /// Switch tools. Any half-finished gesture is dropped; the selection and
    /// a floating block are left alone.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.active_tool {
            log::debug!("tool: {} -> {}", self.active_tool, tool);
        }
        self.active_tool = tool;
        self.gesture = Gesture::Idle;
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    /// Paint is always opaque.
    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = Rgba([color[0], color[1], color[2], 255]);
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn reset_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub(crate) fn set_gesture(&mut self, gesture: Gesture) {
        self.gesture = gesture;
    }
}

// ============================================================================
// POINTER HANDLING
// ============================================================================

impl EditorSession {
    pub fn pointer_down(&mut self, cell: Cell) -> Dispatch {
        if !self.canvas.pixels.in_bounds(cell) {
            return Dispatch::none();
        }
        self.tools.reset_gesture();
        match self.tools.tool() {
            Tool::Pencil => self.begin_stroke(cell, Stroke::Paint(self.tools.color())),
            Tool::Eraser => self.begin_stroke(cell, Stroke::Erase),
            Tool::Fill => self.fill_at(cell),
            Tool::Select => self.select_press(cell),
        }
    }

    pub fn pointer_move(&mut self, cell: Cell) -> Dispatch {
        match self.tools.gesture() {
            Gesture::Idle => Dispatch::none(),
            Gesture::Drawing { last, stroke } => self.continue_stroke(last, cell, stroke),
            Gesture::Selecting {
                anchor,
                clear_on_release,
                moved,
            } => self.drag_select(anchor, clear_on_release, moved, cell),
            Gesture::Grabbing { press, selection } => self.drag_grabbed(press, selection, cell),
            Gesture::MovingFloat { press, origin } => self.drag_floating(press, origin, cell),
        }
    }

    pub fn pointer_up(&mut self, cell: Cell) -> Dispatch {
        match self.tools.gesture() {
            Gesture::Idle => Dispatch::none(),
            Gesture::Drawing { last, stroke } => {
                let dispatch = self.continue_stroke(last, cell, stroke);
                self.tools.reset_gesture();
                dispatch
            }
            Gesture::Selecting {
                anchor,
                clear_on_release,
                moved,
            } => self.finish_select(anchor, clear_on_release, moved, cell),
            Gesture::Grabbing { press, selection } => {
                let dispatch = self.drag_grabbed(press, selection, cell);
                self.commit_floating();
                self.tools.reset_gesture();
                dispatch
            }
            Gesture::MovingFloat { press, origin } => {
                self.drag_floating(press, origin, cell);
                self.commit_floating();
                self.tools.reset_gesture();
                Dispatch::redraw()
            }
        }
    }

    // ------------------------------------------------------------------------
    //  Pencil / eraser
    // ------------------------------------------------------------------------

    fn begin_stroke(&mut self, cell: Cell, stroke: Stroke) -> Dispatch {
        // Painting over a floating block places it first.
        self.commit_floating();
        self.history.push(&self.canvas.pixels);
        let mask = self.canvas.mask();
        let next = self.canvas.pixels.paint_cells(&[cell], stroke, mask.as_ref());
        self.tools.set_gesture(Gesture::Drawing { last: cell, stroke });
        if self.replace_pixels(next) {
            Dispatch::redraw()
        } else {
            Dispatch::none()
        }
    }

    fn continue_stroke(&mut self, last: Cell, cell: Cell, stroke: Stroke) -> Dispatch {
        if cell == last {
            return Dispatch::none();
        }
        // Interpolate so fast drags leave no gaps between move events. Only
        // the on-canvas part of the segment is walked.
        let edge = self.canvas.size as i32 - 1;
        let cells = match clip_segment(last, cell, 0, edge) {
            Some((a, b)) => raster_line(a.x, a.y, b.x, b.y),
            None => Vec::new(),
        };
        let mask = self.canvas.mask();
        let next = self.canvas.pixels.paint_cells(&cells, stroke, mask.as_ref());
        self.tools.set_gesture(Gesture::Drawing { last: cell, stroke });
        if self.replace_pixels(next) {
            Dispatch::redraw()
        } else {
            Dispatch::none()
        }
    }

    // ------------------------------------------------------------------------
    //  Fill
    // ------------------------------------------------------------------------

    fn fill_at(&mut self, cell: Cell) -> Dispatch {
        self.commit_floating();
        let mask = self.canvas.mask();
        if let Some(sel) = mask {
            if !sel.contains(cell) {
                return Dispatch::notice(Notice::FillNoTarget);
            }
        }
        match self.canvas.pixels.flood_fill(cell, self.tools.color(), mask.as_ref()) {
            Some(next) => {
                // Snapshot the pre-fill pixels only now that the fill is known to change something.
                self.history.push(&self.canvas.pixels);
                self.replace_pixels(next);
                log::debug!("fill at ({}, {})", cell.x, cell.y);
                Dispatch::redraw()
            }
            None => Dispatch::notice(Notice::FillUnchanged),
        }
    }

    // ------------------------------------------------------------------------
    //  Select
    // ------------------------------------------------------------------------

    fn select_press(&mut self, cell: Cell) -> Dispatch {
        if let Some(float) = &self.canvas.floating {
            if float.footprint().contains(cell) {
                let origin = Cell::new(float.x, float.y);
                self.tools.set_gesture(Gesture::MovingFloat { press: cell, origin });
                return Dispatch::none();
            }
            self.commit_floating();
        }

        let selection = self.canvas.mask();
        match selection {
            Some(sel) if sel.contains(cell) => {
                self.tools.set_gesture(Gesture::Grabbing {
                    press: cell,
                    selection: sel,
                });
                Dispatch::none()
            }
            _ => {
                self.tools.set_gesture(Gesture::Selecting {
                    anchor: cell,
                    clear_on_release: selection.is_some(),
                    moved: false,
                });
                Dispatch::none()
            }
        }
    }

    fn drag_select(&mut self, anchor: Cell, clear_on_release: bool, moved: bool, cell: Cell) -> Dispatch {
        let cell = cell.clamped(self.canvas.size);
        if !moved && cell == anchor {
            self.tools.set_gesture(Gesture::Selecting {
                anchor,
                clear_on_release,
                moved,
            });
            return Dispatch::none();
        }
        // Leaving the press cell turns a pending deselect into a drag.
        self.tools.set_gesture(Gesture::Selecting {
            anchor,
            clear_on_release: false,
            moved: true,
        });
        let rect = Selection::normalize_drag(anchor, cell).clamp_to_canvas(self.canvas.size);
        self.canvas.selection.set(rect);
        Dispatch::redraw()
    }

    fn finish_select(&mut self, anchor: Cell, clear_on_release: bool, moved: bool, cell: Cell) -> Dispatch {
        let size = self.canvas.size;
        let cell = cell.clamped(size);
        let next = if moved || cell != anchor {
            Selection::normalize_drag(anchor, cell).clamp_to_canvas(size)
        } else if clear_on_release {
            None
        } else {
            Some(Selection::resolve_single_tile(anchor, self.canvas.grid_spacing, size))
        };
        self.canvas.selection.set(next);
        self.tools.reset_gesture();
        Dispatch::redraw()
    }

    fn drag_grabbed(&mut self, press: Cell, sel: Selection, cell: Cell) -> Dispatch {
        if cell == press {
            return Dispatch::none();
        }
        self.lift_selection(sel, press);
        self.drag_floating(press, sel.origin(), cell);
        Dispatch::redraw()
    }

    fn drag_floating(&mut self, press: Cell, origin: Cell, cell: Cell) -> Dispatch {
        let size = self.canvas.size;
        let Some(float) = self.canvas.floating.as_mut() else {
            self.tools.reset_gesture();
            return Dispatch::none();
        };
        let target = float.clamp_origin(
            origin.x.saturating_add(cell.x.saturating_sub(press.x)),
            origin.y.saturating_add(cell.y.saturating_sub(press.y)),
            size,
        );
        if target == Cell::new(float.x, float.y) {
            return Dispatch::none();
        }
        float.x = target.x;
        float.y = target.y;
        let composite = float.composite();
        let footprint = float.footprint();
        self.canvas.pixels = composite;
        self.canvas.selection.set(Some(footprint));
        Dispatch::redraw()
    }

    /// Swap in `next` and mark the document dirty if it differs from the
    /// current pixels. Returns whether anything changed.
    pub(crate) fn replace_pixels(&mut self, next: PixelBuffer) -> bool {
        if PixelBuffer::ptr_eq(&self.canvas.pixels, &next) {
            return false;
        }
        self.canvas.pixels = next;
        self.mark_dirty();
        true
    }
}
