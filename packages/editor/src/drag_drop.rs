//! # Drag and Drop
//!
//! Turns canvas drag gestures into tree mutations.
//!
//! ```text
//!              palette down                    drop / cancel
//!   Idle ───────────────────▶ DraggingNew ───────────────────▶ Idle
//!     │                                                          ▲
//!     │ handle down                                              │
//!     └────────────────────▶ DraggingExisting ───────────────────┘
//! ```
//!
//! A drop always ends the gesture: state and drop zone are cleared before
//! the mutation runs, so a rejected or failing mutation cannot leave the
//! controller mid-drag.

use std::fmt;

use easel_model::{ElementId, KindRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Document, EditorError, Mutation};

/// Id used by the canvas background when it is the hovered drop target
pub const CANVAS_DROP_ZONE: &str = "canvas";

/// Gesture state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingNewFromPalette {
        kind: String,
    },
    DraggingExistingElement {
        element_id: ElementId,
    },
}

/// Candidate drop target under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropZone {
    /// The canvas root
    Canvas,
    Container(ElementId),
}

impl DropZone {
    /// Parse a hovered target id, mapping the canvas sentinel to the root
    pub fn from_target(target: &str) -> Self {
        if target == CANVAS_DROP_ZONE {
            DropZone::Canvas
        } else {
            DropZone::Container(ElementId::from(target))
        }
    }
}

impl fmt::Display for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropZone::Canvas => f.write_str(CANVAS_DROP_ZONE),
            DropZone::Container(id) => write!(f, "{}", id),
        }
    }
}

/// Whether the pointer-down should keep bubbling to ancestor containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// What a drop did to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A palette element was created with this id
    Inserted(ElementId),
    /// An existing element was relocated
    Moved(ElementId),
    /// Nothing to do (no gesture or no drop zone)
    Ignored,
}

/// Drag state machine for one editing session
#[derive(Debug, Default)]
pub struct DragDropController {
    state: DragState,
    drop_zone: Option<DropZone>,
}

impl DragDropController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn drop_zone(&self) -> Option<&DropZone> {
        self.drop_zone.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Whether `id` should be highlighted as the current drop target
    pub fn is_drop_target(&self, id: &str) -> bool {
        match &self.drop_zone {
            Some(DropZone::Container(zone)) => zone == id,
            Some(DropZone::Canvas) => id == CANVAS_DROP_ZONE,
            None => false,
        }
    }

    /// Pointer-down on a palette entry
    pub fn begin_palette_drag(&mut self, kind: impl Into<String>) {
        if self.is_dragging() {
            return;
        }
        let kind = kind.into();
        debug!(kind = %kind, "Palette drag started");
        self.state = DragState::DraggingNewFromPalette { kind };
        self.drop_zone = None;
    }

    /// Pointer-down on an element's drag handle
    ///
    /// The innermost handle captures the gesture; the returned
    /// [`Propagation::Stop`] tells the caller not to offer it to ancestors.
    /// While a gesture is already in progress the pointer-down is not
    /// captured and [`Propagation::Continue`] is returned.
    pub fn begin_element_drag(&mut self, element_id: ElementId) -> Propagation {
        if self.is_dragging() {
            return Propagation::Continue;
        }
        debug!(element_id = %element_id, "Element drag started");
        self.state = DragState::DraggingExistingElement { element_id };
        self.drop_zone = None;
        Propagation::Stop
    }

    /// Pointer moved over a container or the canvas
    pub fn drag_over(&mut self, zone: DropZone) {
        match (&self.state, &zone) {
            (DragState::Idle, _) => {}
            (DragState::DraggingExistingElement { element_id }, DropZone::Container(target))
                if element_id == target =>
            {
                self.drop_zone = None;
            }
            _ => self.drop_zone = Some(zone),
        }
    }

    /// Pointer left the current candidate
    pub fn drag_leave(&mut self, zone: &DropZone) {
        if self.drop_zone.as_ref() == Some(zone) {
            self.drop_zone = None;
        }
    }

    /// Abort the gesture
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Finish the gesture at the recorded drop zone
    pub fn drop(
        &mut self,
        document: &mut Document,
        registry: &KindRegistry,
    ) -> Result<DropOutcome, EditorError> {
        let (state, zone) = self.reset();
        let Some(zone) = zone else {
            return Ok(DropOutcome::Ignored);
        };

        match state {
            DragState::Idle => Ok(DropOutcome::Ignored),

            DragState::DraggingNewFromPalette { kind } => {
                let element = registry.create(&kind, document.next_id())?;
                let id = element.id.clone();
                let mutation = match zone {
                    DropZone::Canvas => Mutation::InsertRoot { element },
                    DropZone::Container(container_id) => Mutation::InsertIntoContainer {
                        container_id,
                        element,
                    },
                };
                document.apply(mutation)?;
                Ok(DropOutcome::Inserted(id))
            }

            DragState::DraggingExistingElement { element_id } => {
                let mutation = match zone {
                    DropZone::Canvas => Mutation::MoveToRoot {
                        element_id: element_id.clone(),
                    },
                    DropZone::Container(container_id) => Mutation::MoveIntoContainer {
                        element_id: element_id.clone(),
                        container_id,
                    },
                };
                document.apply(mutation)?;
                Ok(DropOutcome::Moved(element_id))
            }
        }
    }

    fn reset(&mut self) -> (DragState, Option<DropZone>) {
        (
            std::mem::take(&mut self.state),
            self.drop_zone.take(),
        )
    }
}
