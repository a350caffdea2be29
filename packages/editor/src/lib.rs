//! # Easel Editor
//!
//! Document editing engine for Easel canvases.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: App → Screen → Element forest        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load/save app files                      │
//! │  - Apply mutations with validation          │
//! │  - Drag/drop gestures → mutations           │
//! │  - Condition overlay editing                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: resolve properties, run CALC     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: rendered trees are derived views
//! 2. **All-or-nothing mutations**: a rejected mutation changes nothing
//! 3. **No cycles**: an element never ends up inside its own subtree
//! 4. **Gestures never stick**: every drag ends in `Idle`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use easel_editor::{Document, DragDropController, DropZone};
//! use easel_model::KindRegistry;
//!
//! let registry = KindRegistry::with_builtins();
//! let mut doc = Document::load("app.json")?;
//!
//! let mut dnd = DragDropController::new();
//! dnd.begin_palette_drag("text");
//! dnd.drag_over(DropZone::Canvas);
//! dnd.drop(&mut doc, &registry)?;
//!
//! doc.save()?;
//! ```

mod condition_edit;
mod document;
mod drag_drop;
mod errors;
mod mutations;
mod session;

pub use condition_edit::ConditionEditor;
pub use document::{Document, DocumentStorage};
pub use drag_drop::{
    DragDropController, DragState, DropOutcome, DropZone, Propagation, CANVAS_DROP_ZONE,
};
pub use errors::EditorError;
pub use mutations::{
    insert_into_container, insert_root, move_into_container, move_to_root, remove_element,
    update_element, ElementUpdate, Mutation, MutationError, MutationResult,
};
pub use session::EditSession;
