use image::{Rgba, RgbaImage, imageops};
use std::sync::Arc;

use crate::ops::clipboard::FloatingBlock;
use crate::selection::{Selection, SelectionModel};

/// Smallest canvas side in pixels.
pub const MIN_CANVAS_SIZE: u32 = 8;
/// Largest canvas side in pixels.
pub const MAX_CANVAS_SIZE: u32 = 1024;
pub const DEFAULT_CANVAS_SIZE: u32 = 256;
pub const DEFAULT_GRID_SPACING: u32 = 16;

/// Fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Clamp a requested canvas side into `[MIN_CANVAS_SIZE, MAX_CANVAS_SIZE]`.
pub fn clamp_canvas_size(size: u32) -> u32 {
    size.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE)
}

/// Clamp a grid interval so it always fits the canvas.
pub fn clamp_grid_spacing(spacing: u32, canvas_size: u32) -> u32 {
    spacing.clamp(1, canvas_size.max(1))
}

/// A pixel coordinate as reported by the pointer. May lie outside the canvas
/// while a drag leaves the drawing area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Pull the cell onto the nearest pixel of an `size × size` canvas.
    pub fn clamped(self, size: u32) -> Self {
        let max = size as i32 - 1;
        Self {
            x: self.x.clamp(0, max),
            y: self.y.clamp(0, max),
        }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// What a paint pass writes into each visited cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    /// Opaque paint; the colour's alpha is forced to 255.
    Paint(Rgba<u8>),
    Erase,
}

impl Stroke {
    fn pixel(self) -> Rgba<u8> {
        match self {
            Stroke::Paint(c) => Rgba([c[0], c[1], c[2], 255]),
            Stroke::Erase => TRANSPARENT,
        }
    }
}

// ============================================================================
// RASTER LINE
// ============================================================================

/// Every cell on the Bresenham line from `(x0, y0)` to `(x1, y1)`, both
/// endpoints included, in walk order.
///
/// The walk is as long as the line; callers painting pointer input clip the
/// segment with [`clip_segment`] first.
pub fn raster_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Cell> {
    let dx = (i64::from(x1) - i64::from(x0)).abs();
    let dy = (i64::from(y1) - i64::from(y0)).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;
    let len = dx.max(dy) + 1;
    let mut cells = Vec::with_capacity(len.min(MAX_CANVAS_SIZE as i64 * 2) as usize);

    loop {
        cells.push(Cell::new(x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    cells
}

/// Cut the segment `a → b` down to the part inside the square `[lo, hi]²`
/// (Liang-Barsky). `None` when the segment misses the square. Endpoints
/// already inside come back unchanged.
pub fn clip_segment(a: Cell, b: Cell, lo: i32, hi: i32) -> Option<(Cell, Cell)> {
    let (x0, y0) = (f64::from(a.x), f64::from(a.y));
    let dx = f64::from(b.x) - x0;
    let dy = f64::from(b.y) - y0;
    let (lo_f, hi_f) = (f64::from(lo), f64::from(hi));

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - lo_f), (dx, hi_f - x0), (-dy, y0 - lo_f), (dy, hi_f - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        Cell::new(
            ((x0 + t * dx).round() as i32).clamp(lo, hi),
            ((y0 + t * dy).round() as i32).clamp(lo, hi),
        )
    };
    Some((at(t0), at(t1)))
}

// ============================================================================
// PIXEL BUFFER — square RGBA canvas with copy-on-write sharing
// ============================================================================

/// The canvas pixels: `size × size` RGBA, row-major, top-left origin.
///
/// Buffers are logically immutable. Cloning shares the underlying image, and
/// every mutator hands back a new buffer (or the same one when nothing
/// changed), so a snapshot pushed onto the undo stack can never be altered
/// by later edits.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    image: Arc<RgbaImage>,
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image) || self.image.as_raw() == other.image.as_raw()
    }
}

impl Eq for PixelBuffer {}

impl PixelBuffer {
    /// All-transparent buffer of side `size`.
    pub fn new(size: u32) -> Self {
        Self {
            image: Arc::new(RgbaImage::from_pixel(size, size, TRANSPARENT)),
        }
    }

    /// Wrap a square image. Returns `None` for non-square input.
    pub fn from_image(image: RgbaImage) -> Option<Self> {
        if image.width() != image.height() {
            return None;
        }
        Some(Self {
            image: Arc::new(image),
        })
    }

    /// Build from raw RGBA bytes; `None` if the length isn't `size*size*4`.
    pub fn from_raw(size: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(size, size, data).map(|image| Self {
            image: Arc::new(image),
        })
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// True when both handles point at the very same pixel storage.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.image, &b.image)
    }

    /// Deep copy that shares nothing with `self`.
    pub fn detached(&self) -> Self {
        Self {
            image: Arc::new((*self.image).clone()),
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        let n = self.size() as i32;
        cell.x >= 0 && cell.y >= 0 && cell.x < n && cell.y < n
    }

    pub fn pixel(&self, cell: Cell) -> Option<Rgba<u8>> {
        if self.in_bounds(cell) {
            Some(*self.image.get_pixel(cell.x as u32, cell.y as u32))
        } else {
            None
        }
    }

    /// Paint or erase every cell in `cells`.
    ///
    /// Cells outside the canvas, or outside `mask` when one is given, are
    /// skipped. The result is the same buffer (pointer-equal) when no pixel
    /// actually changed.
    pub fn paint_cells(&self, cells: &[Cell], stroke: Stroke, mask: Option<&Selection>) -> Self {
        let value = stroke.pixel();
        let mut out = self.clone();
        for &cell in cells {
            if !self.in_bounds(cell) {
                continue;
            }
            if let Some(sel) = mask {
                if !sel.contains(cell) {
                    continue;
                }
            }
            let (x, y) = (cell.x as u32, cell.y as u32);
            if *out.image.get_pixel(x, y) == value {
                continue;
            }
            // First real write detaches from any snapshot holding the old pixels.
            Arc::make_mut(&mut out.image).put_pixel(x, y, value);
        }
        out
    }

    /// 4-connected flood fill of the region whose colour exactly matches the
    /// pixel under `start`, bounded by the canvas and by `mask` if present.
    ///
    /// Returns `None` when there is nothing to do: `start` lies outside the
    /// canvas or the mask, or the region already has the replacement colour.
    pub fn flood_fill(&self, start: Cell, color: Rgba<u8>, mask: Option<&Selection>) -> Option<Self> {
        let target = self.pixel(start)?;
        if let Some(sel) = mask {
            if !sel.contains(start) {
                return None;
            }
        }
        if target == color {
            return None;
        }

        let n = self.size() as usize;
        let (min_x, min_y, max_x, max_y) = match mask {
            Some(sel) => (
                sel.x.max(0) as usize,
                sel.y.max(0) as usize,
                (sel.right() as usize).min(n),
                (sel.bottom() as usize).min(n),
            ),
            None => (0, 0, n, n),
        };

        let src = self.image.as_raw();
        let matches = |idx: usize| {
            let o = idx * 4;
            src[o..o + 4] == target.0
        };

        let mut out = (*self.image).clone();
        let dst = &mut *out;
        let mut visited = vec![false; n * n];
        // Explicit DFS stack of flat indices; recursion would blow up on 1024².
        let mut stack: Vec<usize> = Vec::with_capacity(4096);
        let seed = start.y as usize * n + start.x as usize;
        visited[seed] = true;
        stack.push(seed);

        while let Some(idx) = stack.pop() {
            let o = idx * 4;
            dst[o..o + 4].copy_from_slice(&color.0);

            let x = idx % n;
            let y = idx / n;
            let mut visit = |ni: usize| {
                if !visited[ni] && matches(ni) {
                    visited[ni] = true;
                    stack.push(ni);
                }
            };
            if x > min_x {
                visit(idx - 1);
            }
            if x + 1 < max_x {
                visit(idx + 1);
            }
            if y > min_y {
                visit(idx - n);
            }
            if y + 1 < max_y {
                visit(idx + n);
            }
        }

        Some(Self {
            image: Arc::new(out),
        })
    }

    /// Copy `block` onto a copy of this buffer with its top-left at
    /// `(dest_x, dest_y)`. Destination pixels are overwritten, not blended;
    /// parts of the block that fall off the canvas are dropped.
    pub fn blit(&self, block: &RgbaImage, dest_x: i32, dest_y: i32) -> Self {
        let mut out = (*self.image).clone();
        imageops::replace(&mut out, block, i64::from(dest_x), i64::from(dest_y));
        Self {
            image: Arc::new(out),
        }
    }

    /// Copy out the pixels under `sel` (clipped to the canvas).
    pub fn extract(&self, sel: &Selection) -> RgbaImage {
        match sel.clamp_to_canvas(self.size()) {
            Some(r) => imageops::crop_imm(&*self.image, r.x as u32, r.y as u32, r.w as u32, r.h as u32)
                .to_image(),
            None => RgbaImage::new(0, 0),
        }
    }

    /// Set every pixel under `sel` to transparent.
    pub fn clear_region(&self, sel: &Selection) -> Self {
        let Some(r) = sel.clamp_to_canvas(self.size()) else {
            return self.clone();
        };
        let mut out = (*self.image).clone();
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                out.put_pixel(x as u32, y as u32, TRANSPARENT);
            }
        }
        Self {
            image: Arc::new(out),
        }
    }
}

// ============================================================================
// CANVAS STATE — observable document state
// ============================================================================

/// Everything the view renders: the pixels, the selection and any block that
/// is currently floating above the canvas.
pub struct CanvasState {
    pub size: u32,
    /// Overlay line interval; independent of the pixel resolution.
    pub grid_spacing: u32,
    pub pixels: PixelBuffer,
    pub selection: SelectionModel,
    pub floating: Option<FloatingBlock>,
}

impl CanvasState {
    pub fn new(size: u32, grid_spacing: u32) -> Self {
        let size = clamp_canvas_size(size);
        Self {
            size,
            grid_spacing: clamp_grid_spacing(grid_spacing, size),
            pixels: PixelBuffer::new(size),
            selection: SelectionModel::default(),
            floating: None,
        }
    }

    /// The active selection mask, if any.
    pub fn mask(&self) -> Option<Selection> {
        self.selection.current()
    }

    /// Abandon a floating block without restoring anything. Whatever the
    /// last recomposite put on screen stays.
    pub fn drop_floating(&mut self) -> bool {
        self.floating.take().is_some()
    }

    /// Replace the whole document with fresh pixels of a (possibly) new size.
    pub fn reset(&mut self, pixels: PixelBuffer) {
        self.size = pixels.size();
        self.grid_spacing = clamp_grid_spacing(self.grid_spacing, self.size);
        self.pixels = pixels;
        self.floating = None;
        self.selection.clear();
        self.selection.retain_preview_within(self.size);
    }
}
