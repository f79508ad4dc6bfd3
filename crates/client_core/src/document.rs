use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, PoisonError, RwLock,
    },
};

pub const FETCH_BUTTON_ID: &str = "fetchButton";
pub const MESSAGE_DISPLAY_ID: &str = "backendMessage";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBinding {
    pub trigger: ElementId,
    pub display: ElementId,
}

impl Default for ElementBinding {
    fn default() -> Self {
        Self {
            trigger: ElementId::new(FETCH_BUTTON_ID),
            display: ElementId::new(MESSAGE_DISPLAY_ID),
        }
    }
}

pub trait DisplaySurface: Send + Sync {
    fn set_text(&self, text: &str);
}

pub trait Document: Send + Sync {
    fn display_surface(&self, id: &ElementId) -> Option<Arc<dyn DisplaySurface>>;
    fn has_trigger(&self, id: &ElementId) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryDisplay {
    text: RwLock<String>,
    writes: AtomicUsize,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DisplaySurface for MemoryDisplay {
    fn set_text(&self, text: &str) {
        let mut guard = self.text.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(text);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryDocument {
    displays: HashMap<ElementId, Arc<dyn DisplaySurface>>,
    triggers: HashSet<ElementId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(
        mut self,
        id: impl Into<ElementId>,
        surface: Arc<dyn DisplaySurface>,
    ) -> Self {
        self.displays.insert(id.into(), surface);
        self
    }

    pub fn with_trigger(mut self, id: impl Into<ElementId>) -> Self {
        self.triggers.insert(id.into());
        self
    }
}

impl Document for MemoryDocument {
    fn display_surface(&self, id: &ElementId) -> Option<Arc<dyn DisplaySurface>> {
        self.displays.get(id).cloned()
    }

    fn has_trigger(&self, id: &ElementId) -> bool {
        self.triggers.contains(id)
    }
}
