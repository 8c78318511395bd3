//! Deferred work for the UI-affine context.

use std::collections::VecDeque;

/// Work that touches the panel and must run on the UI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTask {
    /// Show (or raise) the floating panel.
    ShowPanel,
    /// First sync of a freshly created panel.
    InitializePanel,
    /// Pull controller state into the panel controls.
    RefreshPanel,
}

/// FIFO of posted tasks.
///
/// `take_batch` hands out only what is queued at that moment, so a task that
/// reposts itself waits for the next drain instead of spinning.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<UiTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire-and-forget.
    pub fn post(&mut self, task: UiTask) {
        self.pending.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn take_batch(&mut self) -> Vec<UiTask> {
        self.pending.drain(..).collect()
    }
}
