//! # Condition Editing
//!
//! Cursor over the condition being edited on the selected element.
//!
//! Property writes are redirected: with a condition selected on a
//! conditional element they land in that condition's overlay, otherwise in
//! the element's base properties. Every write is a single
//! [`Mutation::UpdateElement`], so the tree mutator's validation applies.

use easel_evaluator::{ActiveStateFlags, ConditionResolver};
use easel_model::{Condition, Element, ElementId, KindRegistry, PropertyValue, RenderType};
use tracing::debug;

use crate::{Document, EditorError, ElementUpdate, Mutation, MutationResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConditionEditor {
    editing: Option<usize>,
}

impl ConditionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the condition being edited, if any
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    /// Point the cursor at a condition of `element`, or clear it with `None`
    pub fn select(&mut self, element: &Element, index: Option<usize>) -> Result<(), EditorError> {
        if let Some(index) = index {
            check_index(element, index)?;
        }
        self.editing = index;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.editing = None;
    }

    /// Properties the canvas shows for `element` while editing
    pub fn preview(&self, element: &Element, registry: &KindRegistry) -> easel_model::Properties {
        ConditionResolver::new(registry).resolve(element, self.editing, ActiveStateFlags::default())
    }

    /// Write one property, into the edited condition's overlay when there is one
    pub fn set_property(
        &self,
        document: &mut Document,
        registry: &KindRegistry,
        element_id: &ElementId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<MutationResult, EditorError> {
        let element = lookup(document, element_id)?;
        let (key, value) = (key.into(), value.into());

        let update = match self.editing.filter(|_| element.is_conditional()) {
            Some(index) => {
                check_index(element, index)?;
                let mut conditions = element.conditions().to_vec();
                // Seed from what is on screen so untouched keys keep their values.
                let mut overlay = conditions[index].properties.take().unwrap_or_else(|| {
                    ConditionResolver::new(registry).resolve(
                        element,
                        Some(index),
                        ActiveStateFlags::default(),
                    )
                });
                overlay.insert(key.clone(), value);
                conditions[index].properties = Some(overlay);
                debug!(element_id = %element_id, index, key = %key, "Writing condition overlay");
                ElementUpdate::conditions(RenderType::Conditional, Some(conditions))
            }
            None => {
                let mut properties = element.properties.clone();
                properties.insert(key.clone(), value);
                debug!(element_id = %element_id, key = %key, "Writing base property");
                ElementUpdate::properties(properties)
            }
        };

        document.apply(Mutation::UpdateElement {
            target_id: element_id.clone(),
            update,
        })
    }

    /// Append a condition and start editing it; returns its index
    ///
    /// While another condition is being edited, the new one starts with a copy
    /// of the currently resolved properties instead of an empty overlay.
    pub fn add_condition(
        &mut self,
        document: &mut Document,
        registry: &KindRegistry,
        element_id: &ElementId,
        expression: serde_json::Value,
    ) -> Result<usize, EditorError> {
        let element = lookup(document, element_id)?;

        let mut condition = Condition::new(expression);
        if element.is_conditional() && self.editing.is_some() {
            condition.properties = Some(self.preview(element, registry));
        }

        let mut conditions = element.conditions().to_vec();
        conditions.push(condition);
        let index = conditions.len() - 1;

        document.apply(Mutation::UpdateElement {
            target_id: element_id.clone(),
            update: ElementUpdate::conditions(RenderType::Conditional, Some(conditions)),
        })?;

        self.editing = Some(index);
        Ok(index)
    }

    /// Drop a condition; removing the last one makes the element static again
    pub fn remove_condition(
        &mut self,
        document: &mut Document,
        element_id: &ElementId,
        index: usize,
    ) -> Result<MutationResult, EditorError> {
        let element = lookup(document, element_id)?;
        check_index(element, index)?;

        let mut conditions = element.conditions().to_vec();
        conditions.remove(index);

        let update = if conditions.is_empty() {
            ElementUpdate::conditions(RenderType::Static, None)
        } else {
            ElementUpdate::conditions(RenderType::Conditional, Some(conditions))
        };
        let remaining = match &update.conditions {
            Some(Some(c)) => c.len(),
            _ => 0,
        };

        let result = document.apply(Mutation::UpdateElement {
            target_id: element_id.clone(),
            update,
        })?;

        self.editing = match self.editing {
            _ if remaining == 0 => None,
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Ok(result)
    }
}

fn lookup<'a>(document: &'a Document, element_id: &ElementId) -> Result<&'a Element, EditorError> {
    document
        .find(element_id.as_str())
        .ok_or_else(|| EditorError::ElementNotFound(element_id.to_string()))
}

fn check_index(element: &Element, index: usize) -> Result<(), EditorError> {
    if index < element.conditions().len() {
        Ok(())
    } else {
        Err(EditorError::ConditionOutOfRange {
            element_id: element.id.to_string(),
            index,
        })
    }
}
