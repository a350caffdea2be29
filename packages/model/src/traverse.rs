//! Pre-order traversal over element forests.
//!
//! Every helper here visits a node before its children and children in
//! array order. "First match wins" lookups and the flattened element list
//! used by calculations both depend on that order.

use std::collections::HashSet;

use crate::element::{Element, ElementId};

/// Visitor over an element forest
///
/// The default implementation walks the entire tree. Override
/// `visit_element` to act on nodes; call `walk_element` to keep descending.
pub trait Visitor: Sized {
    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }
}

pub fn walk_forest<V: Visitor>(visitor: &mut V, elements: &[Element]) {
    for element in elements {
        visitor.visit_element(element);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for child in element.children() {
        visitor.visit_element(child);
    }
}

/// Flatten a forest into pre-order
pub fn flatten(elements: &[Element]) -> Vec<&Element> {
    fn push<'a>(out: &mut Vec<&'a Element>, element: &'a Element) {
        out.push(element);
        for child in element.children() {
            push(out, child);
        }
    }

    let mut out = Vec::new();
    for element in elements {
        push(&mut out, element);
    }
    out
}

/// All ids in pre-order
pub fn collect_ids(elements: &[Element]) -> Vec<ElementId> {
    struct Ids(Vec<ElementId>);

    impl Visitor for Ids {
        fn visit_element(&mut self, element: &Element) {
            self.0.push(element.id.clone());
            walk_element(self, element);
        }
    }

    let mut ids = Ids(Vec::new());
    walk_forest(&mut ids, elements);
    ids.0
}

/// First element with `id`, pre-order
pub fn find<'a>(elements: &'a [Element], id: &str) -> Option<&'a Element> {
    for element in elements {
        if element.id == id {
            return Some(element);
        }
        if let Some(found) = find(element.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Mutable lookup, pre-order
pub fn find_mut<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for element in elements {
        if element.id == id {
            return Some(element);
        }
        if let Some(children) = element.children.as_deref_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn contains_id(elements: &[Element], id: &str) -> bool {
    find(elements, id).is_some()
}

/// Where an element is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    Root,
    Element(ElementId),
}

/// Parent of `id`, or `None` when the id is not in the forest
pub fn find_parent(elements: &[Element], id: &str) -> Option<Parent> {
    fn search(parent: &Element, id: &str) -> Option<ElementId> {
        for child in parent.children() {
            if child.id == id {
                return Some(parent.id.clone());
            }
            if let Some(found) = search(child, id) {
                return Some(found);
            }
        }
        None
    }

    if elements.iter().any(|e| e.id == id) {
        return Some(Parent::Root);
    }
    elements
        .iter()
        .find_map(|root| search(root, id))
        .map(Parent::Element)
}

/// Whether `candidate` sits strictly below `ancestor`
pub fn is_descendant(elements: &[Element], ancestor: &str, candidate: &str) -> bool {
    find(elements, ancestor)
        .map(|a| contains_id(a.children(), candidate))
        .unwrap_or(false)
}

/// Ids that occur more than once, in pre-order of their second occurrence
pub fn duplicate_ids(elements: &[Element]) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for id in collect_ids(elements) {
        if !seen.insert(id.clone()) {
            dupes.push(id);
        }
    }
    dupes
}
