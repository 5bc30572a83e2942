//! Region registry
//!
//! The controller never reaches into a document by itself. Whoever hosts the
//! diagram hands it a [`RegionRegistry`] once the diagram is ready, and every
//! element the rules mention is looked up through it.
//!
//! Lookups never fail loudly: diagrams are allowed to omit optional regions,
//! so an unknown id simply resolves to `None` and callers skip it.

mod memory;
mod svg;

use std::borrow::Borrow;
use std::fmt;

pub use memory::{DiagramElement, MemoryDiagram};
pub use svg::DiagramError;

/// Stable identifier of a graphic element inside the loaded diagram
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(String);

/// Triggers are ordinary diagram elements addressed by the same ids
pub type TriggerId = ElementId;

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque handle to a live element, minted by a registry
///
/// Only meaningful to the registry that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u32);

impl ElementHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Access to the elements of a loaded diagram
pub trait RegionRegistry {
    /// Look up a live element. Unknown ids yield `None`, never an error.
    fn resolve(&self, id: &ElementId) -> Option<ElementHandle>;

    /// Write one inline style property on an element
    fn set_property(&mut self, handle: ElementHandle, property: &str, value: &str);

    /// Current inline value of a property, if the host can report it
    fn get_property(&self, handle: ElementHandle, property: &str) -> Option<String> {
        let _ = (handle, property);
        None
    }

    /// Drop an inline property. An empty inline value clears it for hosts
    /// without a dedicated removal call.
    fn remove_property(&mut self, handle: ElementHandle, property: &str) {
        self.set_property(handle, property, "");
    }

    fn add_class(&mut self, handle: ElementHandle, class: &str) {
        let _ = (handle, class);
    }

    fn remove_class(&mut self, handle: ElementHandle, class: &str) {
        let _ = (handle, class);
    }

    /// Every text-bearing element (used for font normalisation)
    fn text_elements(&self) -> Vec<ElementHandle> {
        Vec::new()
    }
}
