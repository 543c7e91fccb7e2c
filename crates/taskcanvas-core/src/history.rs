//! Bounded undo/redo stacks of document snapshots.

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Undo and redo stacks of snapshots of type `T`.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    limit: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` undo states.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a checkpoint (call before making changes).
    ///
    /// Clears the redo stack and drops the oldest entry beyond the limit.
    pub fn checkpoint(&mut self, snapshot: T) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    /// Step back: `current` goes to the redo stack and the previous
    /// checkpoint is returned for the caller to restore.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Step forward: `current` goes back to the undo stack and the most
    /// recently undone state is returned.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo states held.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
