//! In-memory diagram: a registry that records every style write.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::{ElementHandle, ElementId, RegionRegistry};

/// One element of a [`MemoryDiagram`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramElement {
    /// `None` for anonymous elements (e.g. text without an id)
    pub id: Option<ElementId>,
    /// Tag name (`g`, `rect`, `text`, ...)
    pub tag: String,
    /// Inline style properties
    pub properties: BTreeMap<String, String>,
    pub classes: Vec<String>,
}

impl DiagramElement {
    pub fn is_text(&self) -> bool {
        matches!(self.tag.as_str(), "text" | "tspan")
    }
}

/// Diagram held entirely in memory
///
/// Backs the CLI (after parsing an SVG) and the tests. Style writes land in
/// per-element property maps that can be read back with [`property`].
///
/// [`property`]: MemoryDiagram::property
#[derive(Debug, Clone, Default)]
pub struct MemoryDiagram {
    elements: Vec<DiagramElement>,
    index: HashMap<ElementId, ElementHandle>,
}

impl MemoryDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagram containing one `g` element per id
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        let mut diagram = Self::new();
        for id in ids {
            diagram.insert(id, "g");
        }
        diagram
    }

    /// Register an element, returning the existing handle if the id is taken
    pub fn insert(&mut self, id: impl Into<ElementId>, tag: &str) -> ElementHandle {
        let id = id.into();
        if let Some(handle) = self.index.get(&id) {
            return *handle;
        }
        let handle = self.push(DiagramElement {
            id: Some(id.clone()),
            tag: tag.to_string(),
            ..Default::default()
        });
        self.index.insert(id, handle);
        handle
    }

    /// Register an element that has no id
    pub fn insert_anonymous(&mut self, tag: &str) -> ElementHandle {
        self.push(DiagramElement {
            id: None,
            tag: tag.to_string(),
            ..Default::default()
        })
    }

    fn push(&mut self, element: DiagramElement) -> ElementHandle {
        let handle = ElementHandle::new(self.elements.len() as u32);
        self.elements.push(element);
        handle
    }

    pub fn element(&self, handle: ElementHandle) -> Option<&DiagramElement> {
        self.elements.get(handle.raw() as usize)
    }

    pub(crate) fn element_mut(&mut self, handle: ElementHandle) -> Option<&mut DiagramElement> {
        self.elements.get_mut(handle.raw() as usize)
    }

    /// Current value of an inline property on an element
    pub fn property(&self, id: &str, property: &str) -> Option<&str> {
        let handle = self.index.get(id)?;
        self.element(*handle)?
            .properties
            .get(property)
            .map(String::as_str)
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.index
            .get(id)
            .and_then(|h| self.element(*h))
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of every addressable element, sorted
    pub fn element_ids(&self) -> Vec<&ElementId> {
        let mut ids: Vec<_> = self.index.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl RegionRegistry for MemoryDiagram {
    fn resolve(&self, id: &ElementId) -> Option<ElementHandle> {
        self.index.get(id).copied()
    }

    fn set_property(&mut self, handle: ElementHandle, property: &str, value: &str) {
        if let Some(el) = self.element_mut(handle) {
            el.properties.insert(property.to_string(), value.to_string());
        }
    }

    fn get_property(&self, handle: ElementHandle, property: &str) -> Option<String> {
        self.element(handle)?.properties.get(property).cloned()
    }

    fn remove_property(&mut self, handle: ElementHandle, property: &str) {
        if let Some(el) = self.element_mut(handle) {
            el.properties.remove(property);
        }
    }

    fn add_class(&mut self, handle: ElementHandle, class: &str) {
        if let Some(el) = self.element_mut(handle)
            && !el.classes.iter().any(|c| c == class)
        {
            el.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, handle: ElementHandle, class: &str) {
        if let Some(el) = self.element_mut(handle) {
            el.classes.retain(|c| c != class);
        }
    }

    fn text_elements(&self) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.is_text())
            .map(|(idx, _)| ElementHandle::new(idx as u32))
            .collect()
    }
}
