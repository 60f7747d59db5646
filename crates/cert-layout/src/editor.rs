//! Editor interaction model
//!
//! Pointer handling for the single editable slot. The caller feeds
//! pointer events in screen pixels together with the scene they were
//! delivered to; moves return an updated template which the caller
//! installs (the template itself is never mutated in place).

use crate::constants::DRAG_THRESHOLD_PX;
use crate::render::ScreenScene;
use crate::template::Template;
use crate::transform::Point;

/// Pointer gesture in progress
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down on an element but has not moved far enough to drag
    Pressed {
        id: String,
        start: Point,
        origin: (f32, f32),
        was_selected: bool,
    },
    Dragging {
        id: String,
        start: Point,
        origin: (f32, f32),
    },
}

/// Selection and drag state for the editor canvas
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    selected: Option<String>,
    drag: DragState,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.drag = DragState::Idle;
    }

    /// Pointer pressed at `pos`. Selects the topmost interactive element,
    /// or clears the selection when the press lands on empty canvas.
    pub fn pointer_down(&mut self, scene: &ScreenScene, template: &Template, pos: Point) {
        let hit = scene
            .hit_test(pos)
            .and_then(|id| template.element(id))
            .map(|element| (element.id().to_string(), element.position()));

        match hit {
            Some((id, origin)) => {
                let was_selected = self.selected.as_deref() == Some(id.as_str());
                self.selected = Some(id.clone());
                self.drag = DragState::Pressed {
                    id,
                    start: pos,
                    origin,
                    was_selected,
                };
            }
            None => self.clear_selection(),
        }
    }

    /// Pointer moved to `pos`. Returns the template with the pressed
    /// element moved once the gesture has become a drag.
    pub fn pointer_move(&mut self, scene: &ScreenScene, template: &Template, pos: Point) -> Option<Template> {
        let (id, start, origin) = match &self.drag {
            DragState::Idle => return None,
            DragState::Pressed { id, start, origin, .. } => {
                let distance = (pos.x - start.x).hypot(pos.y - start.y);
                if distance <= DRAG_THRESHOLD_PX {
                    return None;
                }
                log::debug!("Dragging '{}'", id);
                (id.clone(), *start, *origin)
            }
            DragState::Dragging { id, start, origin } => (id.clone(), *start, *origin),
        };
        self.drag = DragState::Dragging {
            id: id.clone(),
            start,
            origin,
        };

        // Template Y is compressed inside the slot, so screen Y maps back
        // through both the view scale and the slot scale
        let s = scene.viewport.effective_scale();
        let dx = (pos.x - start.x) / s;
        let dy = (pos.y - start.y) / (s * scene.edit_scale_y());
        Some(template.with_element_moved(&id, origin.0 + dx, origin.1 + dy))
    }

    /// Pointer released. A click on an already selected element that
    /// never turned into a drag deselects it.
    pub fn pointer_up(&mut self) {
        if let DragState::Pressed {
            was_selected: true, ..
        } = self.drag
        {
            self.selected = None;
        }
        self.drag = DragState::Idle;
    }
}
