//! In-memory host used for headless runs and tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use tracing::debug;

use super::{FrameHandle, FrameScheduler, HostContainer, ListenerId, SurfaceId, TextDisplay};

/// A text display that stores its content and counts writes.
#[derive(Debug, Default)]
pub struct TextCell {
    text: RefCell<String>,
    writes: Cell<usize>,
}

impl TextCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_text` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl TextDisplay for TextCell {
    fn set_text(&self, text: &str) {
        let mut current = self.text.borrow_mut();
        current.clear();
        current.push_str(text);
        self.writes.set(self.writes.get() + 1);
    }

    fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

/// A container with a settable client size.
#[derive(Debug)]
pub struct MemoryContainer {
    width: u32,
    height: u32,
    children: Vec<SurfaceId>,
    listeners: BTreeSet<u64>,
    next_listener: u64,
}

impl MemoryContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            children: Vec::new(),
            listeners: BTreeSet::new(),
            next_listener: 1,
        }
    }

    /// Change the client size. Callers deliver the resize notification
    /// themselves, the way a host would after layout.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn children(&self) -> &[SurfaceId] {
        &self.children
    }

    pub fn resize_listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl HostContainer for MemoryContainer {
    fn client_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn append_child(&mut self, surface: SurfaceId) {
        if !self.children.contains(&surface) {
            self.children.push(surface);
        }
    }

    fn remove_child(&mut self, surface: SurfaceId) {
        self.children.retain(|child| *child != surface);
    }

    fn has_child(&self, surface: SurfaceId) -> bool {
        self.children.contains(&surface)
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(id);
        ListenerId(id)
    }

    fn remove_resize_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener.0);
    }
}

/// Frame scheduler fired by hand.
///
/// Requests queue up until the driver calls [`ManualFrameScheduler::take_pending`],
/// which plays the part of the host's "next paint".
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    pending: Vec<FrameHandle>,
    next_handle: u64,
    requested: u64,
    cancelled: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have neither fired nor been cancelled.
    pub fn active_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn total_requested(&self) -> u64 {
        self.requested
    }

    pub fn total_cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Fire the oldest pending request.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|pending| *pending != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        } else {
            debug!("Cancel ignored for unknown frame {:?}", handle);
        }
    }
}
