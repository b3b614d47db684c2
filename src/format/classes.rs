//! Project class list persistence (`classes.txt`).
//!
//! One class per line: `index name r g b`. The index column is informative
//! only; registry order is file order. Names may contain spaces.

use std::path::Path;

use crate::format::error::FormatError;
use crate::format::traits::{Decoded, FormatWarning, WarningKind};
use crate::model::Category;
use crate::registry::ClassRegistry;

/// Parse class list text into a registry. Unparsable lines are skipped with
/// a warning.
pub fn parse_classes(text: &str) -> Decoded<ClassRegistry> {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        if line.is_empty() {
            continue;
        }
        match parse_class_line(line) {
            Ok(entry) => entries.push(entry),
            Err(message) => warnings.push(
                FormatWarning::new(WarningKind::MalformedClassLine, message).at_line(line_no),
            ),
        }
    }

    Decoded {
        labels: ClassRegistry::from_entries(entries),
        warnings,
    }
}

fn parse_class_line(line: &str) -> Result<Category, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(format!("expected 'index name r g b', found {} fields", parts.len()));
    }

    let name = parts[1..parts.len() - 3].join(" ");
    let mut color = [0u8; 3];
    for (channel, part) in color.iter_mut().zip(&parts[parts.len() - 3..]) {
        *channel = part
            .parse()
            .map_err(|_| format!("invalid colour component '{}'", part))?;
    }

    Ok(Category::new(&name, color))
}

/// Serialize a registry in class list form.
pub fn encode_classes(registry: &ClassRegistry) -> String {
    let mut text = String::new();
    for (index, class) in registry.iter().enumerate() {
        let [r, g, b] = class.color;
        text.push_str(&format!("{} {} {} {} {}\n", index, class.name, r, g, b));
    }
    text
}

/// Load a class list. A missing file yields an empty registry.
pub fn load_classes(path: &Path) -> Result<Decoded<ClassRegistry>, FormatError> {
    if !path.exists() {
        log::info!("No class list at {:?}, starting with no classes", path);
        return Ok(Decoded::clean(ClassRegistry::new()));
    }

    let text = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let mut decoded = parse_classes(&text);
    for warning in &mut decoded.warnings {
        warning.path = Some(path.to_path_buf());
        log::warn!("{}", warning);
    }
    log::info!("Loaded {} classes from {:?}", decoded.labels.len(), path);
    Ok(decoded)
}

/// Write the class list and mark the registry persisted.
pub fn save_classes(registry: &mut ClassRegistry, path: &Path) -> Result<(), FormatError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FormatError::io(parent, e))?;
    }
    std::fs::write(path, encode_classes(registry)).map_err(|e| FormatError::io(path, e))?;
    registry.mark_persisted();
    log::debug!("Saved {} classes to {:?}", registry.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_with_spaces() {
        let decoded = parse_classes("0 traffic light 255 0 0\n1 car 0 255 0\n");
        assert!(decoded.warnings.is_empty());
        let registry = decoded.labels;
        assert_eq!(registry.name(0), Some("traffic light"));
        assert_eq!(registry.color_of("car"), Some([0, 255, 0]));
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_parse_skips_bad_lines() {
        let decoded = parse_classes("0 a 1 2 3\nbroken\n2 c 1 2 999\n3 d 4 5 6\n");
        assert_eq!(decoded.labels.len(), 2);
        assert_eq!(decoded.labels.name(1), Some("d"));
        assert_eq!(decoded.warnings.len(), 2);
        assert_eq!(decoded.warnings[0].line, Some(2));
        assert_eq!(decoded.warnings[1].kind, WarningKind::MalformedClassLine);
    }

    #[test]
    fn test_encode_then_parse_keeps_order() {
        let mut registry = ClassRegistry::new();
        registry.insert("b", [1, 2, 3]);
        registry.insert("a b", [4, 5, 6]);
        let text = encode_classes(&registry);
        assert_eq!(text, "0 b 1 2 3\n1 a b 4 5 6\n");

        let parsed = parse_classes(&text).labels;
        assert_eq!(parsed.index_of("a b"), Some(1));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("labelforge_classes_{}", std::process::id()));
        let path = dir.join("classes.txt");

        let mut registry = ClassRegistry::new();
        registry.add("cat");
        assert!(registry.is_dirty());
        save_classes(&mut registry, &path).unwrap();
        assert!(!registry.is_dirty());

        let loaded = load_classes(&path).unwrap().labels;
        assert_eq!(loaded.name(0), Some("cat"));
        assert_eq!(loaded.color_of("cat"), registry.color_of("cat"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = std::env::temp_dir().join("labelforge_no_such_dir/classes.txt");
        let decoded = load_classes(&path).unwrap();
        assert!(decoded.labels.is_empty());
    }
}
