//! # Tree Mutations
//!
//! Structural operations on a screen's element forest.
//!
//! ## Design Principles
//!
//! 1. **Validated**: every mutation is checked against the forest before any
//!    change is made, so a rejected mutation leaves the forest untouched
//! 2. **Intent-preserving**: each variant names one editor operation
//! 3. **Pre-order**: lookups walk depth-first, children in array order
//!
//! ## Mutation Semantics
//!
//! ### Move
//! - Remove-then-insert inside a single call
//! - Fails if the container is the element itself or one of its descendants
//! - Fails if the element or the container is missing
//!
//! ### Update
//! - Shallow merge: each field present in the update replaces the element's
//! - Children are only touched when the update replaces them
//!
//! ### Remove
//! - Drops the element together with its whole subtree

use std::collections::HashSet;

use easel_model::{traverse, Condition, Element, ElementId, Properties, RenderType};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

/// Partial element used by [`Mutation::UpdateElement`]
///
/// `conditions` and `children` distinguish "leave alone" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdate {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_type: Option<RenderType>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub conditions: Option<Option<Vec<Condition>>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<Option<Vec<Element>>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ElementUpdate {
    pub fn properties(properties: Properties) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    pub fn conditions(render_type: RenderType, conditions: Option<Vec<Condition>>) -> Self {
        Self {
            render_type: Some(render_type),
            conditions: Some(conditions),
            ..Self::default()
        }
    }

    fn merge_into(&self, element: &mut Element) {
        if let Some(kind) = &self.kind {
            element.kind = kind.clone();
        }
        if let Some(properties) = &self.properties {
            element.properties = properties.clone();
        }
        if let Some(render_type) = self.render_type {
            element.render_type = render_type;
        }
        if let Some(conditions) = &self.conditions {
            element.conditions = conditions.clone();
        }
        if let Some(children) = &self.children {
            element.children = children.clone();
        }
    }
}

/// Structural edits on the current screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Append a new root element
    InsertRoot { element: Element },

    /// Append a new element to a container's children
    #[serde(rename_all = "camelCase")]
    InsertIntoContainer {
        container_id: ElementId,
        element: Element,
    },

    /// Shallow-merge a partial update onto an element
    #[serde(rename_all = "camelCase")]
    UpdateElement {
        target_id: ElementId,
        update: ElementUpdate,
    },

    /// Remove an element and its subtree
    #[serde(rename_all = "camelCase")]
    RemoveElement { target_id: ElementId },

    /// Detach an element and append it as the last root
    #[serde(rename_all = "camelCase")]
    MoveToRoot { element_id: ElementId },

    /// Detach an element and append it to a container
    #[serde(rename_all = "camelCase")]
    MoveIntoContainer {
        element_id: ElementId,
        container_id: ElementId,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    #[error("Target not found: {0}")]
    TargetNotFound(ElementId),

    #[error("Moving {element_id} into {container_id} would create a cycle")]
    CycleDetected {
        element_id: ElementId,
        container_id: ElementId,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl Mutation {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertRoot { .. } => "insert_root",
            Mutation::InsertIntoContainer { .. } => "insert_into_container",
            Mutation::UpdateElement { .. } => "update_element",
            Mutation::RemoveElement { .. } => "remove_element",
            Mutation::MoveToRoot { .. } => "move_to_root",
            Mutation::MoveIntoContainer { .. } => "move_into_container",
        }
    }

    /// Apply to a forest. Either the whole mutation applies or nothing does.
    pub fn apply(&self, forest: &mut Vec<Element>) -> Result<(), MutationError> {
        match self {
            Mutation::InsertRoot { element } => insert_root(forest, element.clone()),
            Mutation::InsertIntoContainer {
                container_id,
                element,
            } => insert_into_container(forest, container_id, element.clone()),
            Mutation::UpdateElement { target_id, update } => {
                update_element(forest, target_id, update)
            }
            Mutation::RemoveElement { target_id } => remove_element(forest, target_id).map(|_| ()),
            Mutation::MoveToRoot { element_id } => move_to_root(forest, element_id),
            Mutation::MoveIntoContainer {
                element_id,
                container_id,
            } => move_into_container(forest, element_id, container_id),
        }
    }

    /// Ids this mutation adds to the forest
    pub fn incoming_ids(&self) -> Vec<ElementId> {
        match self {
            Mutation::InsertRoot { element } | Mutation::InsertIntoContainer { element, .. } => {
                traverse::collect_ids(std::slice::from_ref(element))
            }
            Mutation::UpdateElement { update, .. } => match &update.children {
                Some(Some(children)) => traverse::collect_ids(children),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Validate without applying
    pub fn validate(&self, forest: &[Element]) -> Result<(), MutationError> {
        match self {
            Mutation::InsertRoot { element } => validate_new_subtree(forest, element),
            Mutation::InsertIntoContainer {
                container_id,
                element,
            } => {
                validate_container(forest, container_id)?;
                validate_new_subtree(forest, element)
            }
            Mutation::UpdateElement { target_id, update } => {
                validate_update(forest, target_id, update)
            }
            Mutation::RemoveElement { target_id } | Mutation::MoveToRoot { element_id: target_id } => {
                require(forest, target_id)
            }
            Mutation::MoveIntoContainer {
                element_id,
                container_id,
            } => validate_move(forest, element_id, container_id),
        }
    }
}

/// Result of applying a mutation through a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,
}

/// Append `element` as a new root
pub fn insert_root(forest: &mut Vec<Element>, element: Element) -> Result<(), MutationError> {
    validate_new_subtree(forest, &element)?;
    debug!(element_id = %element.id, "Inserting root element");
    forest.push(element);
    Ok(())
}

/// Append `element` to the children of `container_id`
pub fn insert_into_container(
    forest: &mut Vec<Element>,
    container_id: &ElementId,
    element: Element,
) -> Result<(), MutationError> {
    validate_container(forest, container_id)?;
    validate_new_subtree(forest, &element)?;

    let children = traverse::find_mut(forest, container_id.as_str())
        .and_then(|c| c.children_mut())
        .ok_or_else(|| MutationError::TargetNotFound(container_id.clone()))?;

    debug!(element_id = %element.id, container_id = %container_id, "Inserting into container");
    children.push(element);
    Ok(())
}

/// Shallow-merge `update` onto `target_id`
pub fn update_element(
    forest: &mut [Element],
    target_id: &ElementId,
    update: &ElementUpdate,
) -> Result<(), MutationError> {
    validate_update(forest, target_id, update)?;

    let target = traverse::find_mut(forest, target_id.as_str())
        .ok_or_else(|| MutationError::TargetNotFound(target_id.clone()))?;
    update.merge_into(target);
    debug!(element_id = %target_id, "Updated element");
    Ok(())
}

/// Remove `target_id` and its subtree, returning the detached element
pub fn remove_element(
    forest: &mut Vec<Element>,
    target_id: &ElementId,
) -> Result<Element, MutationError> {
    let removed = detach(forest, target_id.as_str())
        .ok_or_else(|| MutationError::TargetNotFound(target_id.clone()))?;
    debug!(element_id = %target_id, "Removed element");
    Ok(removed)
}

/// Detach `element_id` and append it as the last root
pub fn move_to_root(forest: &mut Vec<Element>, element_id: &ElementId) -> Result<(), MutationError> {
    require(forest, element_id)?;

    let element = remove_element(forest, element_id)?;
    forest.push(element);
    Ok(())
}

/// Detach `element_id` and append it to `container_id`'s children
pub fn move_into_container(
    forest: &mut Vec<Element>,
    element_id: &ElementId,
    container_id: &ElementId,
) -> Result<(), MutationError> {
    validate_move(forest, element_id, container_id)?;

    let element = remove_element(forest, element_id)?;
    match traverse::find_mut(forest, container_id.as_str()).and_then(|c| c.children_mut()) {
        Some(children) => {
            children.push(element);
            Ok(())
        }
        // Validated above; keep the element rather than lose it.
        None => {
            forest.push(element);
            Err(MutationError::TargetNotFound(container_id.clone()))
        }
    }
}

fn require(forest: &[Element], id: &ElementId) -> Result<(), MutationError> {
    if traverse::contains_id(forest, id.as_str()) {
        Ok(())
    } else {
        Err(MutationError::TargetNotFound(id.clone()))
    }
}

fn validate_container(forest: &[Element], container_id: &ElementId) -> Result<(), MutationError> {
    let container = traverse::find(forest, container_id.as_str())
        .ok_or_else(|| MutationError::TargetNotFound(container_id.clone()))?;
    if container.is_container() {
        Ok(())
    } else {
        Err(MutationError::InvalidStructure(format!(
            "{} ({}) cannot have children",
            container.id, container.kind
        )))
    }
}

/// A new subtree may not reuse any id, neither internally nor from the forest
fn validate_new_subtree(forest: &[Element], element: &Element) -> Result<(), MutationError> {
    let incoming = traverse::collect_ids(std::slice::from_ref(element));
    let mut seen = HashSet::new();
    for id in incoming {
        if !seen.insert(id.clone()) || traverse::contains_id(forest, id.as_str()) {
            return Err(MutationError::DuplicateId(id));
        }
    }
    Ok(())
}

fn validate_update(
    forest: &[Element],
    target_id: &ElementId,
    update: &ElementUpdate,
) -> Result<(), MutationError> {
    let target = traverse::find(forest, target_id.as_str())
        .ok_or_else(|| MutationError::TargetNotFound(target_id.clone()))?;

    if let Some(Some(children)) = &update.children {
        // Ids currently below the target are being replaced, so they may reappear.
        let replaced: HashSet<ElementId> = traverse::collect_ids(target.children())
            .into_iter()
            .collect();
        let mut seen = HashSet::new();
        for id in traverse::collect_ids(children) {
            let clashes_outside = !replaced.contains(&id) && traverse::contains_id(forest, id.as_str());
            if id == *target_id || !seen.insert(id.clone()) || clashes_outside {
                return Err(MutationError::DuplicateId(id));
            }
        }
    }
    Ok(())
}

fn validate_move(
    forest: &[Element],
    element_id: &ElementId,
    container_id: &ElementId,
) -> Result<(), MutationError> {
    if element_id == container_id
        || traverse::is_descendant(forest, element_id.as_str(), container_id.as_str())
    {
        return Err(MutationError::CycleDetected {
            element_id: element_id.clone(),
            container_id: container_id.clone(),
        });
    }
    require(forest, element_id)?;
    validate_container(forest, container_id)
}

/// Remove `target_id` from whichever level holds it
fn detach(level: &mut Vec<Element>, target_id: &str) -> Option<Element> {
    if let Some(pos) = level.iter().position(|e| e.id == target_id) {
        return Some(level.remove(pos));
    }

    for element in level.iter_mut() {
        if let Some(children) = element.children_mut() {
            if let Some(removed) = detach(children, target_id) {
                return Some(removed);
            }
        }
    }

    None
}
