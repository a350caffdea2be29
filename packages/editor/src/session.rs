//! # Edit Session Management
//!
//! Tracks editing state for one user on one document.
//!
//! An EditSession bundles the document with the transient state of the
//! canvas: the drag gesture in progress, the selected element, and the
//! condition cursor on that element. Structural changes that remove the
//! selection also clear it.

use easel_model::{traverse, ElementId, KindRegistry, Parent, PropertyValue};
use tracing::debug;

use crate::{
    ConditionEditor, Document, DragDropController, DropOutcome, EditorError, Mutation,
    MutationResult,
};

/// Single-user edit session
#[derive(Debug)]
pub struct EditSession {
    /// Document being edited
    pub document: Document,

    pub registry: KindRegistry,

    pub drag: DragDropController,

    selected: Option<ElementId>,
    conditions: ConditionEditor,
}

impl EditSession {
    pub fn new(document: Document, registry: KindRegistry) -> Self {
        Self {
            document,
            registry,
            drag: DragDropController::new(),
            selected: None,
            conditions: ConditionEditor::new(),
        }
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Select an element on the current screen (or clear with `None`)
    pub fn select(&mut self, element_id: Option<ElementId>) -> Result<(), EditorError> {
        if let Some(id) = &element_id {
            if self.document.find(id.as_str()).is_none() {
                return Err(EditorError::ElementNotFound(id.to_string()));
            }
        }
        if self.selected != element_id {
            self.conditions.clear();
        }
        self.selected = element_id;
        Ok(())
    }

    /// Move the selection to the selected element's container; a root
    /// element's selection is cleared
    pub fn select_parent(&mut self) -> Result<(), EditorError> {
        let id = self.require_selection()?;
        let parent = traverse::find_parent(self.document.elements(), id.as_str())
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        match parent {
            Parent::Root => self.select(None),
            Parent::Element(parent_id) => self.select(Some(parent_id)),
        }
    }

    pub fn editing_condition(&self) -> Option<usize> {
        self.conditions.editing()
    }

    /// Start editing one of the selected element's conditions
    pub fn edit_condition(&mut self, index: Option<usize>) -> Result<(), EditorError> {
        let id = self.require_selection()?;
        let element = self
            .document
            .find(id.as_str())
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        self.conditions.select(element, index)
    }

    /// Edit a property of the selected element
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<MutationResult, EditorError> {
        let id = self.require_selection()?;
        self.conditions
            .set_property(&mut self.document, &self.registry, &id, key, value)
    }

    pub fn add_condition(&mut self, expression: serde_json::Value) -> Result<usize, EditorError> {
        let id = self.require_selection()?;
        self.conditions
            .add_condition(&mut self.document, &self.registry, &id, expression)
    }

    pub fn remove_condition(&mut self, index: usize) -> Result<MutationResult, EditorError> {
        let id = self.require_selection()?;
        self.conditions
            .remove_condition(&mut self.document, &id, index)
    }

    /// Apply a mutation and drop any selection it removed
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = self.document.apply(mutation)?;
        self.prune_selection();
        Ok(result)
    }

    /// Finish the drag gesture in progress
    pub fn drop(&mut self) -> Result<DropOutcome, EditorError> {
        let outcome = self.drag.drop(&mut self.document, &self.registry)?;
        if let DropOutcome::Inserted(id) = &outcome {
            self.selected = Some(id.clone());
            self.conditions.clear();
        }
        Ok(outcome)
    }

    /// Change the current screen; selection and gesture do not carry over
    pub fn switch_screen(&mut self, screen_id: &str) -> Result<(), EditorError> {
        self.document.set_current_screen(screen_id)?;
        self.drag.cancel();
        self.selected = None;
        self.conditions.clear();
        Ok(())
    }

    fn require_selection(&self) -> Result<ElementId, EditorError> {
        self.selected
            .clone()
            .ok_or_else(|| EditorError::ElementNotFound("<no selection>".to_string()))
    }

    fn prune_selection(&mut self) {
        let Some(id) = &self.selected else {
            return;
        };
        if !traverse::contains_id(self.document.elements(), id.as_str()) {
            debug!(element_id = %id, "Selected element removed");
            self.selected = None;
            self.conditions.clear();
            return;
        }
        let in_range = match (self.conditions.editing(), self.document.find(id.as_str())) {
            (Some(index), Some(element)) => index < element.conditions().len(),
            _ => true,
        };
        if !in_range {
            self.conditions.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DropZone;
    use easel_model::{App, Element, Screen};
    use serde_json::json;

    fn session() -> EditSession {
        let mut app = App::new("shop", "Shop");
        let mut home = Screen::new("home", "Home");
        home.elements.push(
            Element::container("page", "container").with_child(Element::new("title", "text")),
        );
        app.screens.push(home);
        app.screens.push(Screen::new("cart", "Cart"));
        EditSession::new(Document::new(app).unwrap(), KindRegistry::with_builtins())
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert!(session.selected().is_none());
        assert_eq!(session.editing_condition(), None);
        assert!(!session.drag.is_dragging());
    }

    #[test]
    fn test_select_unknown_element() {
        let mut session = session();
        assert!(matches!(
            session.select(Some("ghost".into())),
            Err(EditorError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_removal_clears_selection() {
        let mut session = session();
        session.select(Some("title".into())).unwrap();
        session.add_condition(json!({"when": "vip"})).unwrap();

        session
            .apply(Mutation::RemoveElement {
                target_id: "page".into(),
            })
            .unwrap();

        assert!(session.selected().is_none());
        assert_eq!(session.editing_condition(), None);
    }

    #[test]
    fn test_select_parent_walks_up() {
        let mut session = session();
        session.select(Some("title".into())).unwrap();
        session.add_condition(json!({"when": "vip"})).unwrap();

        session.select_parent().unwrap();
        assert_eq!(session.selected(), Some(&ElementId::from("page")));
        assert_eq!(session.editing_condition(), None);

        session.select_parent().unwrap();
        assert!(session.selected().is_none());
        assert!(matches!(
            session.select_parent(),
            Err(EditorError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_drop_selects_new_element() {
        let mut session = session();
        session.drag.begin_palette_drag("text");
        session.drag.drag_over(DropZone::Container("page".into()));

        let outcome = session.drop().unwrap();
        let DropOutcome::Inserted(id) = outcome else {
            panic!("expected insert");
        };
        assert_eq!(session.selected(), Some(&id));
    }

    #[test]
    fn test_switch_screen_resets_state() {
        let mut session = session();
        session.select(Some("title".into())).unwrap();
        session.drag.begin_palette_drag("button");

        session.switch_screen("cart").unwrap();

        assert!(session.selected().is_none());
        assert!(!session.drag.is_dragging());
        assert_eq!(session.document.current_screen_id(), "cart");
    }

    #[test]
    fn test_property_edit_follows_condition_cursor() {
        let mut session = session();
        session.select(Some("title".into())).unwrap();
        session.set_property("color", "blue").unwrap();
        session.add_condition(json!({"when": "vip"})).unwrap();
        session.set_property("color", "red").unwrap();

        let title = session.document.find("title").unwrap();
        assert_eq!(title.property("color"), Some(&PropertyValue::from("blue")));
        assert_eq!(
            title.conditions()[0]
                .properties
                .as_ref()
                .and_then(|p| p.get("color")),
            Some(&PropertyValue::from("red"))
        );

        session.edit_condition(None).unwrap();
        session.set_property("color", "green").unwrap();
        let title = session.document.find("title").unwrap();
        assert_eq!(title.property("color"), Some(&PropertyValue::from("green")));
    }
}
