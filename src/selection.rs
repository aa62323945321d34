// ============================================================================
// RECTANGULAR SELECTION
// ============================================================================

use crate::canvas::Cell;

/// An axis-aligned pixel rectangle. Once accepted by [`SelectionModel`] it
/// always satisfies `0 ≤ x`, `0 ≤ y`, `x + w ≤ N`, `y + h ≤ N`, `w, h > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Selection {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    /// Rectangle spanned by a drag, inclusive of both the press and the
    /// release cell, whichever direction the drag went.
    pub fn normalize_drag(start: Cell, end: Cell) -> Self {
        Self {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            w: (end.x - start.x).abs() + 1,
            h: (end.y - start.y).abs() + 1,
        }
    }

    /// The grid tile containing `cell`. Tiles on the far edge are clipped to
    /// the canvas rather than padded.
    pub fn resolve_single_tile(cell: Cell, grid_spacing: u32, canvas_size: u32) -> Self {
        let g = grid_spacing.max(1) as i32;
        let n = canvas_size as i32;
        let x = cell.x.div_euclid(g) * g;
        let y = cell.y.div_euclid(g) * g;
        Self {
            x,
            y,
            w: g.min(n - x),
            h: g.min(n - y),
        }
    }

    /// Intersect with the canvas. `None` when the origin lies past the far
    /// edge or nothing of the rectangle remains.
    pub fn clamp_to_canvas(&self, canvas_size: u32) -> Option<Self> {
        let n = canvas_size as i32;
        if self.x >= n || self.y >= n {
            return None;
        }
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(n);
        let y1 = self.bottom().min(n);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Half-open containment: `x ≤ px < x + w`, same for y.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x && cell.x < self.right() && cell.y >= self.y && cell.y < self.bottom()
    }
}

/// The live selection plus the last non-empty selection, which the tile
/// preview keeps showing after a deselect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionModel {
    current: Option<Selection>,
    last_preview: Option<Selection>,
}

impl SelectionModel {
    pub fn current(&self) -> Option<Selection> {
        self.current
    }

    pub fn last_preview(&self) -> Option<Selection> {
        self.last_preview
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn set(&mut self, selection: Option<Selection>) {
        if let Some(sel) = selection {
            self.last_preview = Some(sel);
        }
        self.current = selection;
    }

    /// Drop the live selection; the preview rectangle stays.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// After a canvas resize, clip (or forget) a preview that no longer fits.
    pub fn retain_preview_within(&mut self, canvas_size: u32) {
        self.last_preview = self.last_preview.and_then(|s| s.clamp_to_canvas(canvas_size));
    }
}
