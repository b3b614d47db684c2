//! Class registry entry.

/// A label class with a name and display colour.
///
/// The index is the entry's position in the [`ClassRegistry`](crate::registry::ClassRegistry)
/// and is not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name of the class, unique within a registry
    pub name: String,
    /// RGB color for the class
    pub color: [u8; 3],
}

impl Category {
    /// Create a new class with the given name and color.
    pub fn new(name: &str, color: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            color,
        }
    }
}
