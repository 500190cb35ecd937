use std::collections::VecDeque;

use crate::canvas::PixelBuffer;
use crate::{log_info, log_warn};

// ============================================================================
// HISTORY MANAGER - full-buffer snapshot undo/redo
// ============================================================================

/// Undo/redo history made of complete pixel buffer copies.
///
/// The top of each stack is its back element. A snapshot costs one full copy
/// of the image, so memory grows with `depth × image size`.
pub struct HistoryManager {
    undo_stack: VecDeque<PixelBuffer>,
    redo_stack: VecDeque<PixelBuffer>,
    /// 0 keeps every snapshot.
    max_history_size: usize,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size,
            total_memory: 0,
        }
    }

    /// Record `buffer` as the state to return to, before it gets modified.
    /// Any pending redo states are dropped.
    pub fn snapshot(&mut self, buffer: &PixelBuffer) {
        for dropped in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(dropped.memory_bytes());
        }

        self.total_memory += buffer.memory_bytes();
        self.undo_stack.push_back(buffer.clone());
        self.prune();

        log_info!("Undo state saved. Stack size: {}", self.undo_stack.len());
    }

    /// Step back. `current` is copied onto the redo stack and the previous
    /// state is handed back for the caller to install.
    pub fn undo(&mut self, current: &PixelBuffer) -> Option<PixelBuffer> {
        let Some(previous) = self.undo_stack.pop_back() else {
            log_warn!("Undo stack is empty.");
            return None;
        };
        self.total_memory = self.total_memory.saturating_sub(previous.memory_bytes());
        self.total_memory += current.memory_bytes();
        self.redo_stack.push_back(current.clone());

        log_info!("Undo applied. Remaining stack size: {}", self.undo_stack.len());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &PixelBuffer) -> Option<PixelBuffer> {
        let Some(next) = self.redo_stack.pop_back() else {
            log_warn!("Redo stack is empty.");
            return None;
        };
        self.total_memory = self.total_memory.saturating_sub(next.memory_bytes());
        self.total_memory += current.memory_bytes();
        self.undo_stack.push_back(current.clone());
        self.prune();

        log_info!("Redo applied. Remaining redo stack size: {}", self.redo_stack.len());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Bytes held by snapshots on both stacks.
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    /// Drop the oldest undo states beyond the configured depth.
    fn prune(&mut self) {
        if self.max_history_size == 0 {
            return;
        }
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_bytes());
            }
        }
    }

    /// Forget everything. Only used when a different image replaces the
    /// session's buffer.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }
}
