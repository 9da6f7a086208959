//! winit-backed host: the window is the container, redraw requests are the
//! frame scheduler and the title bar carries the text displays.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, trace};
use winit::window::Window;

use super::{FrameHandle, FrameScheduler, HostContainer, ListenerId, SurfaceId, TextDisplay};

/// Window title made of a fixed base plus labelled segments,
/// e.g. `Card Table | FPS 60 | 16.67 ms`.
pub struct TitleBar {
    window: Arc<Window>,
    base: String,
    segments: RefCell<Vec<(String, String, String)>>,
}

impl TitleBar {
    pub fn new(window: Arc<Window>, base: impl Into<String>) -> Rc<Self> {
        let bar = Rc::new(Self {
            window,
            base: base.into(),
            segments: RefCell::new(Vec::new()),
        });
        bar.refresh();
        bar
    }

    /// Append a segment rendered as `{prefix}{value}{suffix}`.
    pub fn segment(self: &Rc<Self>, prefix: &str, suffix: &str) -> TitleSegment {
        let index = {
            let mut segments = self.segments.borrow_mut();
            segments.push((prefix.to_string(), String::new(), suffix.to_string()));
            segments.len() - 1
        };
        TitleSegment {
            bar: Rc::clone(self),
            index,
        }
    }

    pub fn title(&self) -> String {
        let segments = self.segments.borrow();
        let mut title = self.base.clone();
        for (prefix, value, suffix) in segments.iter().filter(|(_, value, _)| !value.is_empty()) {
            title.push_str(" | ");
            title.push_str(prefix);
            title.push_str(value);
            title.push_str(suffix);
        }
        title
    }

    fn refresh(&self) {
        let title = self.title();
        trace!("Window title -> {}", title);
        self.window.set_title(&title);
    }
}

/// One slot of a [`TitleBar`], usable as a text display.
pub struct TitleSegment {
    bar: Rc<TitleBar>,
    index: usize,
}

impl TextDisplay for TitleSegment {
    fn set_text(&self, text: &str) {
        {
            let mut segments = self.bar.segments.borrow_mut();
            if let Some(segment) = segments.get_mut(self.index) {
                segment.1 = text.to_string();
            }
        }
        self.bar.refresh();
    }

    fn text(&self) -> String {
        self.bar
            .segments
            .borrow()
            .get(self.index)
            .map(|segment| segment.1.clone())
            .unwrap_or_default()
    }
}

/// The window's client area as a surface container.
pub struct WindowContainer {
    window: Arc<Window>,
    children: Vec<SurfaceId>,
    listeners: BTreeSet<u64>,
    next_listener: u64,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            children: Vec::new(),
            listeners: BTreeSet::new(),
            next_listener: 1,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Whether resize events should be forwarded to the render loop.
    pub fn has_resize_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl HostContainer for WindowContainer {
    fn client_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn append_child(&mut self, surface: SurfaceId) {
        if !self.children.contains(&surface) {
            debug!("Mounting surface {:?} in window {:?}", surface, self.window.id());
            self.children.push(surface);
        }
    }

    fn remove_child(&mut self, surface: SurfaceId) {
        debug!("Unmounting surface {:?}", surface);
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

/// Frame scheduler backed by `Window::request_redraw`.
///
/// winit cannot take a redraw request back, so cancelling only forgets the
/// handle; the host asks [`RedrawScheduler::take_pending`] on every
/// `RedrawRequested` and skips the frame when nothing is pending.
pub struct RedrawScheduler {
    window: Arc<Window>,
    pending: Option<FrameHandle>,
    next_handle: u64,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
