use super::{filter, Event};
use tracing::trace;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Listener = Box<dyn FnMut(&Event)>;

/// Ordered broadcaster owned by one workspace.
///
/// Events are queued as mutations happen and handed to listeners only when the
/// queue is delivered, after merging and dropping null events.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerHandle, Listener)>,
    next_handle: u64,
    queue: Vec<Event>,
    disabled: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queue.len())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle);
        self.next_handle += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Returns false when the handle was not subscribed.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Queues an event unless recording is disabled. Returns whether it was queued.
    pub fn push(&mut self, event: Event) -> bool {
        if self.disabled > 0 {
            return false;
        }
        trace!(kind = %event.kind(), "queued event");
        self.queue.push(event);
        true
    }

    pub fn pending(&self) -> &[Event] {
        &self.queue
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled == 0
    }

    /// Suspends recording. Calls nest and must be balanced with [`EventBus::enable`].
    pub fn disable(&mut self) {
        self.disabled += 1;
    }

    pub fn enable(&mut self) {
        self.disabled = self.disabled.saturating_sub(1);
    }

    /// Filters the queue and delivers it to every listener in subscription order.
    /// Returns the delivered events.
    pub fn deliver(&mut self) -> Vec<Event> {
        if self.queue.is_empty() {
            return Vec::new();
        }
        let events = filter::filter(std::mem::take(&mut self.queue));
        for event in &events {
            for (_, listener) in self.listeners.iter_mut() {
                listener(event);
            }
        }
        events
    }

    /// Drops every listener and any undelivered events.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.queue.clear();
    }
}
