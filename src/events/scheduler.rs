use std::collections::VecDeque;

/// Deferred work a workspace performs when it is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Deliver queued events to listeners.
    FireEvents,
    /// Recompute content bounds and re-clamp the scroll position.
    ResizeContents,
    /// Raise a viewport event if scale or scroll moved since the last one.
    ViewportCheck,
}

/// FIFO of pending tasks. Scheduling a task that is already pending is a no-op,
/// which is what coalesces several mutations into one observable effect.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the task was already pending.
    pub fn schedule(&mut self, task: Task) -> bool {
        if self.tasks.contains(&task) {
            return false;
        }
        self.tasks.push_back(task);
        true
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.tasks.contains(&task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
