//! Labelling session: one project, one label mode, one image at a time.
//!
//! [`AnnotationSession`] is the surface the surrounding application talks
//! to. It owns the class registry and the labels of the displayed image,
//! routes pointer and key input through the [`InteractionController`], and
//! persists every committed edit straight away. Anything the UI should react
//! to is queued as an [`EngineEvent`] and drained with
//! [`AnnotationSession::take_events`].

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};

use crate::color_utils::luma_bt601;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::format::formats::{MaskGridFormat, YoloFormat};
use crate::format::{
    ExportResult, FormatError, FormatWarning, LabelContext, LabelFormat, load_classes,
    save_classes,
};
use crate::interaction::{
    ActiveClass, Effect, InteractionController, Labels, PointerEvent, ToolMode,
};
use crate::keybindings::{KeyAction, KeyCode};
use crate::mask::MaskGrid;
use crate::model::{ImageBounds, LabelMode, PixelPoint};
use crate::project::ProjectLayout;
use crate::registry::ClassRegistry;
use crate::store::ShapeStore;
use crate::view::ViewTransform;

/// Notifications for the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A new image session started
    ImageLoaded { index: usize, path: PathBuf },
    /// Boxes (or the box being drawn) changed; re-render
    ShapesChanged,
    /// Mask cells (or the fill rectangle) changed; re-render
    MaskChanged,
    SelectionChanged,
    ViewChanged,
    /// Classes were added
    ClassesChanged,
    LabeledCountChanged { labeled: usize, total: usize },
    SaveCompleted { path: PathBuf },
    SaveFailed { path: PathBuf, message: String },
    /// Tolerated data problem worth showing to the user
    Warning(String),
}

/// Labels of the displayed image.
#[derive(Debug, Clone)]
pub enum ImageLabels {
    Boxes(ShapeStore),
    Mask(MaskGrid),
}

impl ImageLabels {
    pub fn is_dirty(&self) -> bool {
        match self {
            ImageLabels::Boxes(store) => store.is_dirty(),
            ImageLabels::Mask(grid) => grid.is_dirty(),
        }
    }

    fn mark_persisted(&mut self) {
        match self {
            ImageLabels::Boxes(store) => store.mark_persisted(),
            ImageLabels::Mask(grid) => grid.mark_persisted(),
        }
    }
}

/// The displayed image and its labels.
///
/// The source pixels are never modified; overlays are the renderer's job.
struct ImageSession {
    index: usize,
    path: PathBuf,
    image: RgbImage,
    gray: GrayImage,
    bounds: ImageBounds,
    view: ViewTransform,
    labels: ImageLabels,
}

impl ImageSession {
    fn labels_mut(&mut self) -> Labels<'_> {
        match &mut self.labels {
            ImageLabels::Boxes(store) => Labels::Boxes(store),
            ImageLabels::Mask(grid) => Labels::Mask {
                grid,
                gray: &self.gray,
            },
        }
    }
}

/// Interactive labelling session over a project folder.
pub struct AnnotationSession {
    project: ProjectLayout,
    mode: LabelMode,
    config: EngineConfig,
    registry: ClassRegistry,
    active_class: Option<String>,
    controller: InteractionController,
    current: Option<ImageSession>,
    events: Vec<EngineEvent>,
}

impl AnnotationSession {
    /// Open a project using the configuration found for it, and load the
    /// first image.
    pub fn open(root: impl Into<PathBuf>, mode: LabelMode) -> Result<Self, EngineError> {
        let root = root.into();
        let config = EngineConfig::resolve(&root);
        Self::open_with_config(root, mode, config)
    }

    /// Open a project with an explicit configuration.
    ///
    /// Fails if the project has no images or its class list cannot be read.
    /// A first image that cannot be decoded is reported as a warning and
    /// leaves the session without an image.
    pub fn open_with_config(
        root: impl Into<PathBuf>,
        mode: LabelMode,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let project = ProjectLayout::open(root)?;
        let decoded = load_classes(&project.classes_path())?;

        let mut session = Self {
            controller: InteractionController::new(mode, &config.preferences),
            project,
            mode,
            config,
            registry: decoded.labels,
            active_class: None,
            current: None,
            events: Vec::new(),
        };
        session.report_warnings(&decoded.warnings);
        session.events.push(EngineEvent::ClassesChanged);
        session.push_labeled_count();

        if let Err(e) = session.navigate(0) {
            log::error!("Failed to load first image: {}", e);
            session.events.push(EngineEvent::Warning(e.to_string()));
        }

        Ok(session)
    }

    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    pub fn project(&self) -> &ProjectLayout {
        &self.project
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn tool(&self) -> ToolMode {
        self.controller.tool()
    }

    /// Index of the displayed image, if one is loaded.
    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(|s| s.index)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|s| s.path.as_path())
    }

    /// Source pixels of the displayed image.
    pub fn image(&self) -> Option<&RgbImage> {
        self.current.as_ref().map(|s| &s.image)
    }

    pub fn view(&self) -> Option<ViewTransform> {
        self.current.as_ref().map(|s| s.view)
    }

    pub fn labels(&self) -> Option<&ImageLabels> {
        self.current.as_ref().map(|s| &s.labels)
    }

    pub fn shapes(&self) -> Option<&ShapeStore> {
        match self.labels()? {
            ImageLabels::Boxes(store) => Some(store),
            ImageLabels::Mask(_) => None,
        }
    }

    pub fn mask(&self) -> Option<&MaskGrid> {
        match self.labels()? {
            ImageLabels::Mask(grid) => Some(grid),
            ImageLabels::Boxes(_) => None,
        }
    }

    /// Rubber band of the gesture in progress, for rendering.
    pub fn preview(&self) -> Option<(PixelPoint, PixelPoint)> {
        self.controller.preview()
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- navigation ----

    /// Show image `index`.
    ///
    /// Pending edits are saved first; if that fails the current image stays
    /// and [`EngineError::UnsavedChanges`] is returned. An image that cannot
    /// be decoded also leaves the current image in place.
    pub fn navigate(&mut self, index: usize) -> Result<(), EngineError> {
        let path = self
            .project
            .image_path(index)
            .ok_or(EngineError::ImageIndexOutOfRange {
                index,
                count: self.project.len(),
            })?
            .to_path_buf();

        let image = image::open(&path).map_err(|source| EngineError::ImageDecode {
            path: path.clone(),
            source,
        })?;

        self.load_image_buffer(index, image)
    }

    /// Go to the next image. Returns `false` at the end of the list.
    pub fn next_image(&mut self) -> Result<bool, EngineError> {
        match self.project.next_index() {
            Some(index) => self.navigate(index).map(|()| true),
            None => Ok(false),
        }
    }

    /// Go to the previous image. Returns `false` at the start of the list.
    pub fn prev_image(&mut self) -> Result<bool, EngineError> {
        match self.project.prev_index() {
            Some(index) => self.navigate(index).map(|()| true),
            None => Ok(false),
        }
    }

    /// Start a session for image `index` from pixels the caller already
    /// decoded. Labels are loaded from the project; the view is reset.
    pub fn load_image_buffer(&mut self, index: usize, image: DynamicImage) -> Result<(), EngineError> {
        let path = self
            .project
            .image_path(index)
            .ok_or(EngineError::ImageIndexOutOfRange {
                index,
                count: self.project.len(),
            })?
            .to_path_buf();
        self.persist_pending()?;

        let image = image.to_rgb8();
        let gray = luma_bt601(&image);
        let bounds = ImageBounds::new(image.width(), image.height());

        let labels = self.load_labels(index, bounds)?;

        self.project.navigate(index)?;
        self.controller.reset();
        self.current = Some(ImageSession {
            index,
            path: path.clone(),
            image,
            gray,
            bounds,
            view: ViewTransform::for_image(bounds).with_limits(self.config.preferences.scale_limits()),
            labels,
        });

        log::info!(
            "🖼️ Loaded image {}/{} {:?} ({}x{})",
            index + 1,
            self.project.len(),
            path,
            bounds.width,
            bounds.height
        );
        self.events.push(EngineEvent::ImageLoaded { index, path });
        self.push_labels_changed();
        self.events.push(EngineEvent::SelectionChanged);
        self.events.push(EngineEvent::ViewChanged);
        Ok(())
    }

    fn load_labels(&mut self, index: usize, bounds: ImageBounds) -> Result<ImageLabels, EngineError> {
        let classes_before = self.registry.len();
        let path = self.project.existing_label_path(index, self.mode);
        let mut ctx = LabelContext::new(bounds, &mut self.registry);

        let (labels, warnings) = match (self.mode, path) {
            (LabelMode::Box, Some(path)) => {
                let decoded = YoloFormat.load(&path, &mut ctx)?;
                (ImageLabels::Boxes(decoded.labels), decoded.warnings)
            }
            (LabelMode::Mask, Some(path)) => {
                let decoded = MaskGridFormat.load(&path, &mut ctx)?;
                (ImageLabels::Mask(decoded.labels), decoded.warnings)
            }
            (LabelMode::Box, None) => (ImageLabels::Boxes(YoloFormat.empty(bounds)), Vec::new()),
            (LabelMode::Mask, None) => (ImageLabels::Mask(MaskGridFormat.empty(bounds)), Vec::new()),
        };

        self.report_warnings(&warnings);
        if self.registry.len() != classes_before {
            self.persist_classes()?;
        }
        Ok(labels)
    }

    // ---- classes ----

    /// Class new labels get: the active class, else the first registered one.
    pub fn active_class(&self) -> Option<&str> {
        self.active_class
            .as_deref()
            .or_else(|| self.registry.first().map(|c| c.name.as_str()))
    }

    /// Register `name` (if new) and make it the active class. New classes get
    /// a generated colour and are written to the class list immediately.
    pub fn add_class(&mut self, name: &str) -> Result<usize, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyClassName);
        }

        let existed = self.registry.contains(name);
        let index = self.registry.add(name);
        self.active_class = Some(name.to_string());

        if !existed {
            log::info!("🏷️ Added class '{}' (index {})", name, index);
            self.persist_classes()?;
        } else {
            log::debug!("🏷️ Class: {}", name);
        }
        Ok(index)
    }

    /// Make `name` the active class. If a box is selected it is reclassified.
    pub fn select_class(&mut self, name: &str) -> Result<(), EngineError> {
        self.add_class(name)?;
        self.reassign_selected(name).map(|_| ())
    }

    // ---- input ----

    /// Feed one pointer event. The returned effect tells the caller whether
    /// to show the context menu.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<Effect, EngineError> {
        let class_name = self.active_class().map(str::to_owned);
        let class = class_name.as_deref().and_then(|name| {
            self.registry.mask_value(name).map(|mask_value| ActiveClass { name, mask_value })
        });

        let session = self.current.as_mut().ok_or(EngineError::NoImageLoaded)?;
        let view = session.view;
        let mut labels = session.labels_mut();
        let step = self.controller.pointer(event, view, &mut labels, class)?;
        session.view = step.view;

        self.apply_effect(step.effect);
        Ok(step.effect)
    }

    /// Wheel zoom around a viewport point. Positive `notches` zoom in.
    pub fn wheel(&mut self, vx: f32, vy: f32, notches: f32) -> Result<(), EngineError> {
        let session = self.current.as_mut().ok_or(EngineError::NoImageLoaded)?;
        let next = self.controller.wheel(session.view, vx, vy, notches);
        if next != session.view {
            session.view = next;
            self.events.push(EngineEvent::ViewChanged);
        }
        Ok(())
    }

    /// Switch tools, finishing any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolMode) -> Result<(), EngineError> {
        let Some(session) = self.current.as_mut() else {
            // Nothing to finish; just remember the tool
            let view = ViewTransform::identity();
            let mut store = ShapeStore::new(ImageBounds::new(0, 0));
            self.controller.set_tool(tool, view, &mut Labels::Boxes(&mut store));
            return Ok(());
        };
        let view = session.view;
        let mut labels = session.labels_mut();
        let step = self.controller.set_tool(tool, view, &mut labels);
        session.view = step.view;
        self.apply_effect(step.effect);
        Ok(())
    }

    /// Handle a key press. Unbound keys are ignored.
    pub fn key(&mut self, key: KeyCode) -> Result<(), EngineError> {
        let Some(action) = self.config.keybindings.action_for_key(key) else {
            log::trace!("Unbound key {:?}", key);
            return Ok(());
        };
        match action {
            KeyAction::Tool(tool) => self.set_tool(tool),
            KeyAction::DeleteSelected => self.delete_selected().map(|_| ()),
            KeyAction::PrevImage => self.prev_image().map(|_| ()),
            KeyAction::NextImage => self.next_image().map(|_| ()),
        }
    }

    // ---- box edits ----

    /// Change the class of the selected box. Without a selection this does
    /// nothing and returns `false`.
    pub fn reassign_selected(&mut self, name: &str) -> Result<bool, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyClassName);
        }
        let Some(ImageSession {
            labels: ImageLabels::Boxes(store),
            ..
        }) = self.current.as_mut()
        else {
            return Ok(false);
        };
        let Some(index) = store.selected() else {
            return Ok(false);
        };
        if store.get(index).class_name == name {
            return Ok(false);
        }

        store.set_class(index, name);
        log::info!("🏷️ Box {} reclassified as '{}'", index, name);
        if !self.registry.contains(name) {
            self.registry.add(name);
            self.persist_classes()?;
        }
        self.events.push(EngineEvent::ShapesChanged);
        self.commit();
        Ok(true)
    }

    /// Delete the selected box. Without a selection this does nothing and
    /// returns `false`.
    pub fn delete_selected(&mut self) -> Result<bool, EngineError> {
        let Some(ImageSession {
            labels: ImageLabels::Boxes(store),
            ..
        }) = self.current.as_mut()
        else {
            return Ok(false);
        };
        let Some(index) = store.selected() else {
            return Ok(false);
        };

        let removed = store.remove(index);
        // A drag or resize in progress refers to the removed index
        self.controller.reset();
        log::info!("🗑️ Deleted box {} ({})", index, removed.class_name);
        self.events.push(EngineEvent::ShapesChanged);
        self.events.push(EngineEvent::SelectionChanged);
        self.commit();
        Ok(true)
    }

    // ---- persistence ----

    /// Write the labels of the displayed image.
    pub fn save(&mut self) -> Result<ExportResult, EngineError> {
        let session = self.current.as_mut().ok_or(EngineError::NoImageLoaded)?;
        let path = self
            .project
            .label_path(session.index, self.mode)
            .ok_or(EngineError::NoImageLoaded)?;

        let mut ctx = LabelContext::new(session.bounds, &mut self.registry);
        let result = match &session.labels {
            ImageLabels::Boxes(store) => YoloFormat.save(store, &path, &mut ctx),
            ImageLabels::Mask(grid) => MaskGridFormat.save(grid, &path, &mut ctx),
        };

        match result {
            Ok(result) => {
                session.labels.mark_persisted();
                if self.registry.is_dirty() {
                    self.persist_classes()?;
                }
                self.events.push(EngineEvent::SaveCompleted { path });
                self.push_labeled_count();
                Ok(result)
            }
            Err(e) => {
                log::error!("Failed to save labels: {}", e);
                self.events.push(EngineEvent::SaveFailed {
                    path,
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Number of images with a non-empty label file in this mode.
    pub fn labeled_count(&self) -> usize {
        self.project.labeled_count(self.mode)
    }

    /// Save after a committed edit. A failure is already reported as
    /// [`EngineEvent::SaveFailed`] and whatever was not written stays dirty,
    /// so the next navigation retries.
    fn commit(&mut self) {
        let _ = self.save();
    }

    /// Save dirty labels and classes before the labels are replaced.
    fn persist_pending(&mut self) -> Result<(), EngineError> {
        let labels_dirty = self.current.as_ref().is_some_and(|s| s.labels.is_dirty());
        let result = if labels_dirty {
            self.save().map(|_| ())
        } else if self.registry.is_dirty() {
            self.persist_classes().map_err(EngineError::from)
        } else {
            Ok(())
        };
        result.map_err(|e| match e {
            EngineError::Format(source) => EngineError::UnsavedChanges(source),
            other => other,
        })
    }

    /// Write `classes.txt`. A failure is reported as
    /// [`EngineEvent::SaveFailed`] and the registry stays dirty.
    fn persist_classes(&mut self) -> Result<(), FormatError> {
        let path = self.project.classes_path();
        match save_classes(&mut self.registry, &path) {
            Ok(()) => {
                self.events.push(EngineEvent::ClassesChanged);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save classes: {}", e);
                self.events.push(EngineEvent::SaveFailed {
                    path,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::View => self.events.push(EngineEvent::ViewChanged),
            Effect::Preview | Effect::Edited => self.push_labels_changed(),
            Effect::Selection | Effect::ContextMenu { .. } => {
                self.events.push(EngineEvent::SelectionChanged)
            }
            Effect::Commit => {
                self.push_labels_changed();
                self.events.push(EngineEvent::SelectionChanged);
                self.commit();
            }
        }
    }

    fn push_labels_changed(&mut self) {
        let event = match self.mode {
            LabelMode::Box => EngineEvent::ShapesChanged,
            LabelMode::Mask => EngineEvent::MaskChanged,
        };
        self.events.push(event);
    }

    fn push_labeled_count(&mut self) {
        self.events.push(EngineEvent::LabeledCountChanged {
            labeled: self.labeled_count(),
            total: self.project.len(),
        });
    }

    fn report_warnings(&mut self, warnings: &[FormatWarning]) {
        self.events
            .extend(warnings.iter().map(|w| EngineEvent::Warning(w.to_string())));
    }
}
