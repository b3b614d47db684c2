//! Pointer-driven editing state machine.
//!
//! One [`InteractionController`] drives every gesture on the current image.
//! It never owns labels or the view: each event borrows the labels being
//! edited, takes the current [`ViewTransform`] by value and hands back the
//! transform to use from then on together with an [`Effect`] telling the
//! caller what changed.
//!
//! Button assignment:
//! - middle always pans
//! - secondary opens the shape context menu in box mode and pans in mask mode
//! - primary runs the active [`ToolMode`]

use image::GrayImage;

use crate::config::Preferences;
use crate::error::EngineError;
use crate::hit_test::HitTester;
use crate::mask::MaskGrid;
use crate::model::{BoxShape, Corner, LabelMode, PixelPoint};
use crate::store::ShapeStore;
use crate::view::ViewTransform;

/// Active tool for the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMode {
    /// Draw, select, move and resize boxes
    Box,
    /// Drag the view
    Pan,
    /// Paint the active class into the mask
    Pen,
    /// Clear mask cells
    Erase,
    /// Label dark pixels inside a dragged rectangle
    Rect,
}

impl ToolMode {
    /// Whether the tool can be used while editing `mode` labels.
    pub fn allowed_in(&self, mode: LabelMode) -> bool {
        match self {
            ToolMode::Pan => true,
            ToolMode::Box => mode == LabelMode::Box,
            ToolMode::Pen | ToolMode::Erase | ToolMode::Rect => mode == LabelMode::Mask,
        }
    }

    /// Tool selected when a session starts.
    pub fn default_for(mode: LabelMode) -> ToolMode {
        match mode {
            LabelMode::Box => ToolMode::Box,
            LabelMode::Mask => ToolMode::Pen,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Box => "Box",
            ToolMode::Pan => "Pan",
            ToolMode::Pen => "Pen",
            ToolMode::Erase => "Erase",
            ToolMode::Rect => "Rect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Pointer input in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub button: PointerButton,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn down(button: PointerButton, x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Down,
            button,
            x,
            y,
        }
    }

    /// Motion event. The button is informational only.
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            button: PointerButton::Primary,
            x,
            y,
        }
    }

    pub fn up(button: PointerButton, x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Up,
            button,
            x,
            y,
        }
    }
}

/// In-progress drawing gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawGesture {
    /// Provisional box from `anchor` to `current`, not yet in the store
    Box {
        anchor: PixelPoint,
        current: PixelPoint,
        class_name: String,
    },
    /// Rectangle fill between the pixel edges `anchor` and `current`
    Rect {
        anchor: PixelPoint,
        current: PixelPoint,
        value: u32,
    },
    /// Pen or eraser stroke; `value` is 0 when erasing
    Stroke {
        last: PixelPoint,
        value: u32,
        painted: bool,
    },
}

/// Controller state. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing(DrawGesture),
    /// Moving a box; `last` is the previous pointer position in image pixels
    Dragging { index: usize, last: PixelPoint },
    /// Dragging `corner` of a box while `anchor` stays put
    Resizing {
        index: usize,
        corner: Corner,
        anchor: PixelPoint,
    },
    /// Dragging the view; last pointer position in viewport pixels
    Panning { last_x: f32, last_y: f32 },
}

/// What an event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Pan or zoom
    View,
    /// Provisional geometry (rubber band) changed
    Preview,
    /// Selection changed without touching labels
    Selection,
    /// Labels changed mid-gesture; persisted when the gesture ends
    Edited,
    /// Gesture finished with label changes that should be persisted
    Commit,
    /// Secondary click on a box: offer reclassify/delete for `index`
    ContextMenu { index: usize },
}

/// Result of one interaction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub view: ViewTransform,
    pub effect: Effect,
}

impl Step {
    fn new(view: ViewTransform, effect: Effect) -> Self {
        Self { view, effect }
    }

    fn unchanged(view: ViewTransform) -> Self {
        Self::new(view, Effect::None)
    }
}

/// Labels of the current image, borrowed for one event.
pub enum Labels<'a> {
    Boxes(&'a mut ShapeStore),
    Mask {
        grid: &'a mut MaskGrid,
        /// Grayscale copy of the source image, read by rectangle fill
        gray: &'a GrayImage,
    },
}

/// Class new labels are created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveClass<'a> {
    pub name: &'a str,
    /// 1-based grid value for mask labels
    pub mask_value: u32,
}

/// Pointer state machine for one labelling session.
#[derive(Debug, Clone)]
pub struct InteractionController {
    label_mode: LabelMode,
    tool: ToolMode,
    state: InteractionState,
    hit_tester: HitTester,
    min_box_size: i32,
    pen_thickness: u32,
    mask_threshold: u8,
    zoom_step: f32,
    /// Last pointer position seen, in viewport pixels
    last_pointer: (f32, f32),
}

impl InteractionController {
    pub fn new(label_mode: LabelMode, prefs: &Preferences) -> Self {
        let zoom_step = match label_mode {
            LabelMode::Box => prefs.box_zoom_step,
            LabelMode::Mask => prefs.mask_zoom_step,
        };
        Self {
            label_mode,
            tool: ToolMode::default_for(label_mode),
            state: InteractionState::Idle,
            hit_tester: prefs.hit_tester(),
            min_box_size: prefs.min_box_size,
            pen_thickness: prefs.pen_thickness,
            mask_threshold: prefs.mask_threshold,
            zoom_step,
            last_pointer: (0.0, 0.0),
        }
    }

    pub fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Corners of the rubber band being drawn, if any.
    pub fn preview(&self) -> Option<(PixelPoint, PixelPoint)> {
        match &self.state {
            InteractionState::Drawing(
                DrawGesture::Box {
                    anchor, current, ..
                }
                | DrawGesture::Rect {
                    anchor, current, ..
                },
            ) => Some((*anchor, *current)),
            _ => None,
        }
    }

    /// Drop any gesture without applying it. Used when the labels it refers
    /// to are replaced.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            log::debug!("Abandoning gesture {:?}", self.state);
        }
        self.state = InteractionState::Idle;
    }

    /// Switch tools. A gesture in progress is finished as if released at the
    /// last pointer position. Tools that do not apply to the session's label
    /// mode are refused.
    pub fn set_tool(&mut self, tool: ToolMode, view: ViewTransform, labels: &mut Labels<'_>) -> Step {
        if !tool.allowed_in(self.label_mode) {
            log::warn!("{} tool is not available in {} mode", tool.name(), self.label_mode);
            return Step::unchanged(view);
        }
        if tool == self.tool {
            return Step::unchanged(view);
        }

        let step = if self.is_idle() {
            Step::unchanged(view)
        } else {
            let (x, y) = self.last_pointer;
            self.pointer_up(x, y, view, labels)
        };

        log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        step
    }

    /// Wheel zoom around `(vx, vy)`. Positive `notches` zoom in.
    pub fn wheel(&self, view: ViewTransform, vx: f32, vy: f32, notches: f32) -> ViewTransform {
        if notches == 0.0 || !notches.is_finite() {
            return view;
        }
        let next = view.zoom_at(vx, vy, self.zoom_step.powf(notches));
        log::trace!("Zoom {:.3} -> {:.3}", view.scale, next.scale);
        next
    }

    /// Feed one pointer event.
    ///
    /// Only a press can fail, and only with [`EngineError::NoClassSelected`];
    /// the controller then stays idle and nothing is modified.
    pub fn pointer(
        &mut self,
        event: PointerEvent,
        view: ViewTransform,
        labels: &mut Labels<'_>,
        class: Option<ActiveClass<'_>>,
    ) -> Result<Step, EngineError> {
        self.last_pointer = (event.x, event.y);
        match event.kind {
            PointerKind::Down => self.pointer_down(event.button, event.x, event.y, view, labels, class),
            PointerKind::Move => Ok(self.pointer_move(event.x, event.y, view, labels)),
            PointerKind::Up => Ok(self.pointer_up(event.x, event.y, view, labels)),
        }
    }

    fn pointer_down(
        &mut self,
        button: PointerButton,
        vx: f32,
        vy: f32,
        view: ViewTransform,
        labels: &mut Labels<'_>,
        class: Option<ActiveClass<'_>>,
    ) -> Result<Step, EngineError> {
        if !self.is_idle() {
            log::trace!("Ignoring {:?} press during {:?}", button, self.state);
            return Ok(Step::unchanged(view));
        }

        let pans = match button {
            PointerButton::Middle => true,
            PointerButton::Secondary => matches!(labels, Labels::Mask { .. }),
            PointerButton::Primary => self.tool == ToolMode::Pan,
        };
        if pans {
            log::debug!("Pan started at ({:.1}, {:.1})", vx, vy);
            self.state = InteractionState::Panning {
                last_x: vx,
                last_y: vy,
            };
            return Ok(Step::unchanged(view));
        }

        let point = view.to_image(vx, vy);
        let effect = match labels {
            Labels::Boxes(store) if button == PointerButton::Secondary => {
                self.context_press(store, point)
            }
            Labels::Boxes(store) if self.tool == ToolMode::Box => self.box_press(store, point, class)?,
            Labels::Mask { .. } => self.mask_press(point, view.to_image_edge(vx, vy), class)?,
            Labels::Boxes(_) => Effect::None,
        };
        Ok(Step::new(view, effect))
    }

    fn context_press(&mut self, store: &mut ShapeStore, point: PixelPoint) -> Effect {
        match self.hit_tester.locate(store.as_slice(), point) {
            Some(hit) => {
                store.select(Some(hit.index));
                log::debug!("Context menu for box {}", hit.index);
                Effect::ContextMenu { index: hit.index }
            }
            None if store.selected().is_some() => {
                store.select(None);
                Effect::Selection
            }
            None => Effect::None,
        }
    }

    fn box_press(
        &mut self,
        store: &mut ShapeStore,
        point: PixelPoint,
        class: Option<ActiveClass<'_>>,
    ) -> Result<Effect, EngineError> {
        if let Some(hit) = self.hit_tester.locate(store.as_slice(), point) {
            store.select(Some(hit.index));
            self.state = match hit.corner {
                Some(corner) => {
                    let anchor = store.get(hit.index).corner(corner.opposite());
                    log::debug!("Resizing box {} by its {} corner", hit.index, corner.name());
                    InteractionState::Resizing {
                        index: hit.index,
                        corner,
                        anchor,
                    }
                }
                None => {
                    log::debug!("Dragging box {}", hit.index);
                    InteractionState::Dragging {
                        index: hit.index,
                        last: point,
                    }
                }
            };
            return Ok(Effect::Selection);
        }

        let class = class.ok_or(EngineError::NoClassSelected)?;
        let had_selection = store.selected().is_some();
        store.select(None);
        log::debug!("Drawing '{}' box from ({}, {})", class.name, point.x, point.y);
        self.state = InteractionState::Drawing(DrawGesture::Box {
            anchor: point,
            current: point,
            class_name: class.name.to_string(),
        });
        Ok(if had_selection {
            Effect::Selection
        } else {
            Effect::Preview
        })
    }

    /// `edge` is the press position as a pixel edge, used by rectangle fill.
    fn mask_press(
        &mut self,
        point: PixelPoint,
        edge: PixelPoint,
        class: Option<ActiveClass<'_>>,
    ) -> Result<Effect, EngineError> {
        let gesture = match self.tool {
            ToolMode::Erase => DrawGesture::Stroke {
                last: point,
                value: 0,
                painted: false,
            },
            ToolMode::Pen => DrawGesture::Stroke {
                last: point,
                value: class.ok_or(EngineError::NoClassSelected)?.mask_value,
                painted: false,
            },
            ToolMode::Rect => DrawGesture::Rect {
                anchor: edge,
                current: edge,
                value: class.ok_or(EngineError::NoClassSelected)?.mask_value,
            },
            ToolMode::Box | ToolMode::Pan => return Ok(Effect::None),
        };
        log::debug!("{} started at ({}, {})", self.tool.name(), point.x, point.y);
        self.state = InteractionState::Drawing(gesture);
        Ok(Effect::None)
    }

    fn pointer_move(&mut self, vx: f32, vy: f32, view: ViewTransform, labels: &mut Labels<'_>) -> Step {
        let point = view.to_image(vx, vy);

        match (&mut self.state, labels) {
            (InteractionState::Panning { last_x, last_y }, _) => {
                let (dx, dy) = (vx - *last_x, vy - *last_y);
                *last_x = vx;
                *last_y = vy;
                if dx == 0.0 && dy == 0.0 {
                    return Step::unchanged(view);
                }
                log::trace!("Pan by ({:.1}, {:.1})", dx, dy);
                Step::new(view.pan_by(dx, dy), Effect::View)
            }
            (InteractionState::Drawing(DrawGesture::Box { current, .. }), _) => {
                if *current == point {
                    return Step::unchanged(view);
                }
                *current = point;
                Step::new(view, Effect::Preview)
            }
            (InteractionState::Drawing(DrawGesture::Rect { current, .. }), _) => {
                let edge = view.to_image_edge(vx, vy);
                if *current == edge {
                    return Step::unchanged(view);
                }
                *current = edge;
                Step::new(view, Effect::Preview)
            }
            (
                InteractionState::Drawing(DrawGesture::Stroke {
                    last,
                    value,
                    painted,
                }),
                Labels::Mask { grid, .. },
            ) => {
                let changed = grid.stroke_segment(*last, point, self.pen_thickness, *value);
                *last = point;
                if changed == 0 {
                    return Step::unchanged(view);
                }
                *painted = true;
                log::trace!("Stroke changed {} cells", changed);
                Step::new(view, Effect::Edited)
            }
            (InteractionState::Dragging { index, last }, Labels::Boxes(store)) => {
                let (dx, dy) = (point.x - last.x, point.y - last.y);
                if dx == 0 && dy == 0 {
                    return Step::unchanged(view);
                }
                store.move_by(*index, dx, dy);
                *last = point;
                Step::new(view, Effect::Edited)
            }
            (
                InteractionState::Resizing {
                    index,
                    corner,
                    anchor,
                },
                Labels::Boxes(store),
            ) => {
                store.resize_from_anchor(*index, *anchor, point);
                // Normalization may have flipped the box; follow the handle
                *corner = tracked_corner(*corner, *anchor, point);
                Step::new(view, Effect::Edited)
            }
            _ => Step::unchanged(view),
        }
    }

    /// Finish whatever gesture is active. Releases are honoured wherever they
    /// happen, including outside the image.
    fn pointer_up(&mut self, vx: f32, vy: f32, view: ViewTransform, labels: &mut Labels<'_>) -> Step {
        let moved = self.pointer_move(vx, vy, view, labels);
        let point = moved.view.to_image(vx, vy);
        let state = std::mem::take(&mut self.state);

        let effect = match (state, labels) {
            (InteractionState::Idle, _) => moved.effect,
            (InteractionState::Panning { .. }, _) => {
                log::debug!("Pan ended");
                moved.effect
            }
            (
                InteractionState::Drawing(DrawGesture::Box {
                    anchor, class_name, ..
                }),
                Labels::Boxes(store),
            ) => {
                let shape = BoxShape::from_corners(class_name, anchor, point);
                if shape.width() > self.min_box_size && shape.height() > self.min_box_size {
                    let index = store.add(shape);
                    log::info!("✅ Created box {} ({:?})", index, store.get(index));
                    Effect::Commit
                } else {
                    log::debug!(
                        "Discarded {}x{} box below minimum size",
                        shape.width(),
                        shape.height()
                    );
                    Effect::Preview
                }
            }
            (
                InteractionState::Drawing(DrawGesture::Rect { anchor, value, .. }),
                Labels::Mask { grid, gray },
            ) => {
                let edge = moved.view.to_image_edge(vx, vy);
                let changed = grid.fill_dark_in_rect(gray, anchor, edge, self.mask_threshold, value);
                log::info!("Rectangle fill labelled {} cells with {}", changed, value);
                if changed > 0 {
                    Effect::Commit
                } else {
                    Effect::Preview
                }
            }
            (InteractionState::Drawing(DrawGesture::Stroke { painted, .. }), _) => {
                if painted {
                    Effect::Commit
                } else {
                    Effect::None
                }
            }
            (InteractionState::Dragging { index, .. }, _)
            | (InteractionState::Resizing { index, .. }, _) => {
                log::debug!("Finished editing box {}", index);
                Effect::Commit
            }
            (state, _) => {
                log::warn!("Released {:?} against mismatched labels", state);
                Effect::None
            }
        };

        Step::new(moved.view, effect)
    }
}

/// Handle being dragged after a resize step, given the fixed `anchor`.
fn tracked_corner(corner: Corner, anchor: PixelPoint, point: PixelPoint) -> Corner {
    let was_right = matches!(corner, Corner::TopRight | Corner::BottomRight);
    let was_bottom = matches!(corner, Corner::BottomLeft | Corner::BottomRight);
    let right = match point.x.cmp(&anchor.x) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => was_right,
    };
    let bottom = match point.y.cmp(&anchor.y) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => was_bottom,
    };
    Corner::from_sides(right, bottom)
}
