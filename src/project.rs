//! Project folder layout and image navigation.
//!
//! ```text
//! <project>/
//!   images/            source images (read only)
//!   Box_labels/        <stem>.txt box records
//!   Segment_labels/    <stem>.txt mask grids (labels/ is read as a fallback)
//!   classes.txt        class registry
//!   labelforge.json    optional project config
//! ```

use std::path::{Path, PathBuf};

use crate::constants::layout;
use crate::error::EngineError;
use crate::model::LabelMode;

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Check if a path has a supported image extension
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A project folder with its sorted image list and current position.
#[derive(Clone, Debug)]
pub struct ProjectLayout {
    root: PathBuf,
    /// Image files, sorted by path
    images: Vec<PathBuf>,
    current_index: usize,
}

impl ProjectLayout {
    /// Discover images in `<root>/images`, non-recursively.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let root = root.into();
        let images_dir = root.join(layout::IMAGES_DIR);
        if !images_dir.is_dir() {
            return Err(EngineError::NoImages(images_dir));
        }

        let mut images: Vec<PathBuf> = std::fs::read_dir(&images_dir)
            .map_err(|e| EngineError::io(&images_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();

        if images.is_empty() {
            return Err(EngineError::NoImages(images_dir));
        }

        // Sort by filename for consistent ordering
        images.sort();

        log::info!("📂 Opened project {:?}: {} images", root, images.len());

        Ok(Self {
            root,
            images,
            current_index: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn image_path(&self, index: usize) -> Option<&Path> {
        self.images.get(index).map(PathBuf::as_path)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.root.join(layout::CLASSES_FILE)
    }

    fn label_file_name(&self, index: usize) -> Option<String> {
        let stem = self.images.get(index)?.file_stem()?.to_string_lossy();
        Some(format!("{}.{}", stem, layout::LABEL_EXTENSION))
    }

    /// Where labels for image `index` are written.
    pub fn label_path(&self, index: usize, mode: LabelMode) -> Option<PathBuf> {
        let name = self.label_file_name(index)?;
        Some(self.root.join(mode.labels_dir()).join(name))
    }

    /// Existing label file for image `index`, searching the fallback folders.
    pub fn existing_label_path(&self, index: usize, mode: LabelMode) -> Option<PathBuf> {
        let name = self.label_file_name(index)?;
        mode.load_dirs()
            .iter()
            .map(|dir| self.root.join(dir).join(&name))
            .find(|path| path.is_file())
    }

    /// Whether image `index` has a non-empty label file.
    pub fn is_labeled(&self, index: usize, mode: LabelMode) -> bool {
        self.existing_label_path(index, mode)
            .and_then(|path| std::fs::metadata(path).ok())
            .is_some_and(|meta| meta.len() > 0)
    }

    /// Number of images with a non-empty label file.
    pub fn labeled_count(&self, mode: LabelMode) -> usize {
        (0..self.images.len())
            .filter(|&i| self.is_labeled(i, mode))
            .count()
    }

    /// Make `index` the current image.
    pub fn navigate(&mut self, index: usize) -> Result<(), EngineError> {
        if index >= self.images.len() {
            return Err(EngineError::ImageIndexOutOfRange {
                index,
                count: self.images.len(),
            });
        }
        self.current_index = index;
        Ok(())
    }

    /// Index after the current one, if any. No wrap-around.
    pub fn next_index(&self) -> Option<usize> {
        let next = self.current_index + 1;
        (next < self.images.len()).then_some(next)
    }

    /// Index before the current one, if any. No wrap-around.
    pub fn prev_index(&self) -> Option<usize> {
        self.current_index.checked_sub(1)
    }
}
