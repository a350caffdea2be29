//! Active slide/tab context
//!
//! Slides and tabs containers show one child at a time. Which child is
//! showing is ambient state owned by the caller; this module turns it into
//! per-element flags once per render pass and hands them down explicitly.

use std::collections::{HashMap, HashSet};

use easel_model::{Element, ElementId, KindRegistry};

/// Whether an element currently sits inside an active slide or tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveStateFlags {
    pub active: bool,
}

impl ActiveStateFlags {
    pub const ACTIVE: Self = Self { active: true };
    pub const INACTIVE: Self = Self { active: false };

    pub fn is_active(self) -> bool {
        self.active
    }
}

/// Active flags for every element of one screen
#[derive(Debug, Clone, Default)]
pub struct ActiveContext {
    active: HashSet<ElementId>,
}

impl ActiveContext {
    /// Walk the screen once.
    ///
    /// `active_children` maps an activatable container to the index of its
    /// showing child; containers missing from the map show their first child.
    /// An element is active when it has at least one activatable ancestor
    /// and every such ancestor is showing the branch that leads to it.
    pub fn compute(
        elements: &[Element],
        registry: &KindRegistry,
        active_children: &HashMap<ElementId, usize>,
    ) -> Self {
        let mut context = Self::default();
        for element in elements {
            context.visit(element, None, registry, active_children);
        }
        context
    }

    /// `state`: `None` outside any slides/tabs, otherwise whether every
    /// enclosing one is on the active branch
    fn visit(
        &mut self,
        element: &Element,
        state: Option<bool>,
        registry: &KindRegistry,
        active_children: &HashMap<ElementId, usize>,
    ) {
        if state == Some(true) {
            self.active.insert(element.id.clone());
        }

        let activatable = registry.is_activatable_container(&element.kind);
        let showing = active_children.get(&element.id).copied().unwrap_or(0);

        for (index, child) in element.children().iter().enumerate() {
            let child_state = if activatable {
                Some(state.unwrap_or(true) && index == showing)
            } else {
                state
            };
            self.visit(child, child_state, registry, active_children);
        }
    }

    pub fn flags(&self, id: &ElementId) -> ActiveStateFlags {
        ActiveStateFlags {
            active: self.active.contains(id),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// deck (slides)
    /// ├── s0 → t0
    /// └── s1 → tabs (tabs) → [a → ta, b → tb]
    /// loose
    fn screen() -> Vec<Element> {
        vec![
            Element::container("deck", "slides")
                .with_child(Element::container("s0", "container").with_child(Element::new("t0", "text")))
                .with_child(
                    Element::container("s1", "container").with_child(
                        Element::container("tabs", "tabs")
                            .with_child(
                                Element::container("a", "container")
                                    .with_child(Element::new("ta", "text")),
                            )
                            .with_child(
                                Element::container("b", "container")
                                    .with_child(Element::new("tb", "text")),
                            ),
                    ),
                ),
            Element::new("loose", "text"),
        ]
    }

    fn is_active(ctx: &ActiveContext, id: &str) -> bool {
        ctx.flags(&ElementId::from(id)).is_active()
    }

    #[test]
    fn test_first_child_active_by_default() {
        let registry = KindRegistry::with_builtins();
        let ctx = ActiveContext::compute(&screen(), &registry, &HashMap::new());

        assert!(is_active(&ctx, "s0"));
        assert!(is_active(&ctx, "t0"));
        assert!(!is_active(&ctx, "s1"));
        assert!(!is_active(&ctx, "ta"));
        assert!(!is_active(&ctx, "deck"));
        assert!(!is_active(&ctx, "loose"));
    }

    #[test]
    fn test_nested_containers_require_every_level() {
        let registry = KindRegistry::with_builtins();
        let mut showing = HashMap::new();
        showing.insert(ElementId::from("deck"), 1);
        showing.insert(ElementId::from("tabs"), 1);
        let ctx = ActiveContext::compute(&screen(), &registry, &showing);

        assert!(is_active(&ctx, "s1"));
        assert!(is_active(&ctx, "tabs"));
        assert!(is_active(&ctx, "tb"));
        assert!(!is_active(&ctx, "ta"));
        assert!(!is_active(&ctx, "t0"));
    }

    #[test]
    fn test_inactive_outer_slide_hides_inner_tab() {
        let registry = KindRegistry::with_builtins();
        let mut showing = HashMap::new();
        showing.insert(ElementId::from("tabs"), 0);
        let ctx = ActiveContext::compute(&screen(), &registry, &showing);

        // deck still shows s0, so nothing under s1 is active
        assert!(!is_active(&ctx, "a"));
        assert!(!is_active(&ctx, "ta"));
        assert_eq!(ctx.active_count(), 2);
    }
}
