//! Global constants for the annotation engine

/// Zoom step constants.
pub mod zoom {
    /// Per-notch wheel factor in box mode
    pub const BOX_STEP: f32 = 1.15;
    /// Per-notch wheel factor in mask mode
    pub const MASK_STEP: f32 = 1.1;
    /// Smallest scale a zoom may reach
    pub const MIN_SCALE: f32 = 0.01;
    /// Largest scale a zoom may reach
    pub const MAX_SCALE: f32 = 100.0;
}

/// Interaction thresholds (image pixels unless noted).
pub mod threshold {
    /// Corner grab distance for box resize handles
    pub const CORNER: i32 = 1;
    /// A drawn box must exceed this extent on both axes to be committed
    pub const MIN_BOX_SIZE: i32 = 5;
    /// Grayscale cutoff for rectangle fill; values at or below are labelled
    pub const MASK_BINARIZE: u8 = 128;
}

/// Mask painting constants.
pub mod mask {
    /// Stroke diameter for pen and erase
    pub const PEN_THICKNESS: u32 = 2;
    /// Grid value meaning "no class"
    pub const UNLABELED: u32 = 0;
}

/// Project folder layout.
pub mod layout {
    /// Source images
    pub const IMAGES_DIR: &str = "images";
    /// Normalized box label files
    pub const BOX_LABELS_DIR: &str = "Box_labels";
    /// Dense mask label files
    pub const MASK_LABELS_DIR: &str = "Segment_labels";
    /// Older mask label folder, still read when present
    pub const LEGACY_MASK_LABELS_DIR: &str = "labels";
    /// Class registry file
    pub const CLASSES_FILE: &str = "classes.txt";
    /// Project-local configuration override
    pub const PROJECT_CONFIG_FILE: &str = "labelforge.json";
    /// Extension of every label file
    pub const LABEL_EXTENSION: &str = "txt";
}

/// Colour given to classes registered without one
pub const DEFAULT_CLASS_COLOR: [u8; 3] = [0, 255, 0];
