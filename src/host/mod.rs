//! Host environment boundary
//!
//! Everything the viewer needs from the surrounding platform goes through
//! the types in this module: text displays looked up by identifier, the
//! container the render surface is mounted in, and the frame scheduler that
//! drives the render loop. `window` implements them on top of winit,
//! `headless` implements them in memory.

pub mod headless;
pub mod window;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub use headless::{ManualFrameScheduler, MemoryContainer, TextCell};
pub use window::{RedrawScheduler, TitleBar, TitleSegment, WindowContainer};

/// A text-bearing element owned by the host.
///
/// Writes go through `&self`; implementations keep their text behind
/// interior mutability because handles are shared with the host.
pub trait TextDisplay {
    fn set_text(&self, text: &str);
    fn text(&self) -> String;
}

/// Lookup table from display identifier to host text display.
#[derive(Default)]
pub struct DisplayRegistry {
    displays: HashMap<String, Rc<dyn TextDisplay>>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display under `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, display: Rc<dyn TextDisplay>) {
        self.displays.insert(id.into(), display);
    }

    /// Resolve a display handle by identifier.
    pub fn resolve(&self, id: &str) -> Option<Rc<dyn TextDisplay>> {
        self.displays.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.displays.contains_key(id)
    }
}

impl fmt::Debug for DisplayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.displays.keys().collect();
        ids.sort();
        f.debug_struct("DisplayRegistry").field("ids", &ids).finish()
    }
}

/// Identifier of a render surface created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Identifier of a registered resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Identifier of a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The element a render surface is mounted in.
pub trait HostContainer {
    /// Current client area as `(width, height)` in pixels.
    fn client_size(&self) -> (u32, u32);

    fn append_child(&mut self, surface: SurfaceId);

    fn remove_child(&mut self, surface: SurfaceId);

    fn has_child(&self, surface: SurfaceId) -> bool;

    /// Subscribe to resize notifications. The host routes them to
    /// `RenderLoop::handle_resize` while the listener is registered.
    fn add_resize_listener(&mut self) -> ListenerId;

    fn remove_resize_listener(&mut self, listener: ListenerId);
}

/// "Call me back before the next paint."
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_registered_ids() {
        let mut registry = DisplayRegistry::new();
        let cell = Rc::new(TextCell::new());
        registry.register("fps", cell.clone());

        assert!(registry.contains("fps"));
        assert!(!registry.contains("frame-time"));
        assert!(registry.resolve("frame-time").is_none());

        let display = registry.resolve("fps").unwrap();
        display.set_text("42");
        assert_eq!(cell.text(), "42");
    }

    #[test]
    fn test_registry_register_replaces() {
        let mut registry = DisplayRegistry::new();
        let first = Rc::new(TextCell::new());
        let second = Rc::new(TextCell::new());
        registry.register("fps", first.clone());
        registry.register("fps", second.clone());

        registry.resolve("fps").unwrap().set_text("7");
        assert_eq!(first.text(), "");
        assert_eq!(second.text(), "7");
    }
}
