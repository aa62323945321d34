use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

/// Number of snapshots kept before the oldest is evicted.
pub const MAX_UNDO: usize = 40;

// ============================================================================
// UNDO HISTORY - bounded stack of full-canvas snapshots
// ============================================================================

/// Undo history. Every entry is the canvas exactly as it was right before a
/// mutating action; popping one restores that state.
///
/// Snapshots are cheap to take: [`PixelBuffer`] is copy-on-write, so pushing
/// shares storage with the live canvas until the next edit detaches it.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: VecDeque<PixelBuffer>,
    max_history_size: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(MAX_UNDO)
    }
}

impl UndoHistory {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_history_size + 1),
            max_history_size: max_history_size.max(1),
        }
    }

    pub fn push(&mut self, snapshot: &PixelBuffer) {
        self.undo_stack.push_back(snapshot.clone());
        // Prune by count, oldest first
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }
    }

    /// Most recent snapshot, or `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<PixelBuffer> {
        self.undo_stack.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.max_history_size
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}
