//! Ordered class registry with name <-> index lookup.
//!
//! A class's index is its position in the registry. The registry only grows:
//! there is no removal, so indices written into label files stay valid for
//! the lifetime of a project.

use std::collections::HashMap;

use crate::color_utils::class_color;
use crate::constants::DEFAULT_CLASS_COLOR;
use crate::model::Category;

/// Ordered list of classes plus a name index, kept in step on every insert.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    entries: Vec<Category>,
    by_name: HashMap<String, usize>,
    /// Set when entries are appended; cleared once persisted.
    dirty: bool,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from entries in file order. Later duplicates of a
    /// name are ignored. The result starts clean.
    pub fn from_entries(entries: impl IntoIterator<Item = Category>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            if registry.by_name.contains_key(&entry.name) {
                log::warn!("Duplicate class '{}' ignored", entry.name);
                continue;
            }
            registry.push(entry);
        }
        registry.dirty = false;
        registry
    }

    fn push(&mut self, entry: Category) -> usize {
        let index = self.entries.len();
        self.by_name.insert(entry.name.clone(), index);
        self.entries.push(entry);
        self.dirty = true;
        index
    }

    /// Append a class with an explicit colour, or return the existing index.
    pub fn insert(&mut self, name: &str, color: [u8; 3]) -> usize {
        match self.by_name.get(name) {
            Some(&index) => index,
            None => {
                let index = self.push(Category::new(name, color));
                log::debug!("Registered class '{}' at index {}", name, index);
                index
            }
        }
    }

    /// Append a class with a generated colour, or return the existing index.
    pub fn add(&mut self, name: &str) -> usize {
        let color = class_color(self.entries.len());
        self.insert(name, color)
    }

    /// Index for `name`, registering it with the default colour if unknown.
    pub fn ensure(&mut self, name: &str) -> usize {
        self.insert(name, DEFAULT_CLASS_COLOR)
    }

    /// Name for a label-file index. Indices outside the registry, negative
    /// ones included, get a `class_<index>` placeholder that is registered on
    /// the spot.
    pub fn resolve_index(&mut self, index: i64) -> String {
        let entry = usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i));
        if let Some(entry) = entry {
            return entry.name.clone();
        }
        let name = format!("class_{}", index);
        if !self.by_name.contains_key(&name) {
            log::warn!(
                "Label references class index {} outside registry ({} classes); using '{}'",
                index,
                self.entries.len(),
                name
            );
            self.ensure(&name);
        }
        name
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.entries.get(index)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|c| c.name.as_str())
    }

    pub fn color_of(&self, name: &str) -> Option<[u8; 3]> {
        self.index_of(name).map(|i| self.entries[i].color)
    }

    /// 1-based grid value used for `name` in mask labels.
    pub fn mask_value(&self, name: &str) -> Option<u32> {
        self.index_of(name).map(|i| i as u32 + 1)
    }

    pub fn first(&self) -> Option<&Category> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_persisted(&mut self) {
        self.dirty = false;
    }
}
