//! Labelling mode of a project session.

use std::fmt;
use std::str::FromStr;

use crate::constants::layout;

/// What kind of labels a session edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LabelMode {
    /// Axis-aligned boxes saved as normalized records
    #[default]
    Box,
    /// Dense per-pixel class grid
    Mask,
}

impl LabelMode {
    /// Folder (relative to the project root) that label files are written to.
    pub fn labels_dir(&self) -> &'static str {
        match self {
            LabelMode::Box => layout::BOX_LABELS_DIR,
            LabelMode::Mask => layout::MASK_LABELS_DIR,
        }
    }

    /// Folders searched when loading, in priority order.
    pub fn load_dirs(&self) -> &'static [&'static str] {
        match self {
            LabelMode::Box => &[layout::BOX_LABELS_DIR],
            LabelMode::Mask => &[layout::MASK_LABELS_DIR, layout::LEGACY_MASK_LABELS_DIR],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LabelMode::Box => "box",
            LabelMode::Mask => "mask",
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "box" | "bbox" => Ok(LabelMode::Box),
            "mask" | "segment" => Ok(LabelMode::Mask),
            other => Err(format!("unknown label mode '{}'", other)),
        }
    }
}
