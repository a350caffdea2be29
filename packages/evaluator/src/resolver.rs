//! Condition Resolution
//!
//! Computes the flat property set an element renders with:
//!
//! ```text
//! base properties
//!     ↓  (conditional only) overlay of the matched condition, condition wins
//!     ↓  (active only) base key ← active key, per the kind's static table
//! effective properties
//! ```
//!
//! Results are never written back to the element.

use std::collections::HashMap;

use easel_model::{Element, ElementId, KindRegistry, Properties};
use thiserror::Error;

use crate::ActiveStateFlags;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Element {0} is conditional but no condition matched")]
    MissingMatch(ElementId),

    #[error("Element {element_id} has no condition at index {index}")]
    ConditionOutOfRange { element_id: ElementId, index: usize },
}

/// Rule engine deciding which condition of an element applies
pub trait ConditionMatcher {
    fn matched_index(&self, element: &Element) -> Option<usize>;
}

/// Editor canvas: no rule engine, every conditional element previews its
/// first condition
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorPreview;

impl ConditionMatcher for EditorPreview {
    fn matched_index(&self, _element: &Element) -> Option<usize> {
        None
    }
}

/// Precomputed matches, keyed by element id
impl ConditionMatcher for HashMap<ElementId, usize> {
    fn matched_index(&self, element: &Element) -> Option<usize> {
        self.get(&element.id).copied()
    }
}

pub struct ConditionResolver<'a> {
    registry: &'a KindRegistry,
}

impl<'a> ConditionResolver<'a> {
    pub fn new(registry: &'a KindRegistry) -> Self {
        Self { registry }
    }

    /// Editor and preview resolution. A missing or out-of-range match falls
    /// back to the first condition.
    pub fn resolve(
        &self,
        element: &Element,
        matched: Option<usize>,
        flags: ActiveStateFlags,
    ) -> Properties {
        let conditions = element.conditions();
        let index = matched.filter(|i| *i < conditions.len()).unwrap_or(0);
        self.resolve_at(element, index, flags)
    }

    /// Live resolution. Conditional elements need a real match.
    pub fn resolve_live(
        &self,
        element: &Element,
        matched: Option<usize>,
        flags: ActiveStateFlags,
    ) -> Result<Properties, ResolveError> {
        if element.is_conditional() && !element.conditions().is_empty() {
            let index = matched.ok_or_else(|| ResolveError::MissingMatch(element.id.clone()))?;
            if index >= element.conditions().len() {
                return Err(ResolveError::ConditionOutOfRange {
                    element_id: element.id.clone(),
                    index,
                });
            }
            return Ok(self.resolve_at(element, index, flags));
        }
        Ok(self.resolve_at(element, 0, flags))
    }

    fn resolve_at(&self, element: &Element, index: usize, flags: ActiveStateFlags) -> Properties {
        let overlay = if element.is_conditional() {
            element
                .conditions()
                .get(index)
                .and_then(|c| c.properties.as_ref())
        } else {
            None
        };

        let mut properties = element.properties.clone();
        if let Some(overlay) = overlay {
            for (key, value) in overlay {
                properties.insert(key.clone(), value.clone());
            }
        }

        if flags.is_active() {
            self.apply_active_overlay(&element.kind, &mut properties);
        }
        properties
    }

    fn apply_active_overlay(&self, kind: &str, properties: &mut Properties) {
        for pair in self.registry.active_keys(kind) {
            if !properties.contains_key(pair.base) {
                continue;
            }
            if let Some(value) = properties.get(pair.active).cloned() {
                properties.insert(pair.base.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_model::{Condition, PropertyValue};
    use serde_json::json;

    fn props(entries: &[(&str, PropertyValue)]) -> Properties {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn conditional_button() -> Element {
        let mut el = Element::new("b", "button");
        el.properties = props(&[("color", "blue".into()), ("size", 10.into())]);
        el.with_conditions(vec![Condition::new(json!({"when": "sale"}))
            .with_properties(props(&[("color", "red".into())]))])
    }

    #[test]
    fn test_condition_overlay_wins() {
        let registry = KindRegistry::with_builtins();
        let resolved = ConditionResolver::new(&registry).resolve(
            &conditional_button(),
            Some(0),
            ActiveStateFlags::default(),
        );
        assert_eq!(
            resolved,
            props(&[("color", "red".into()), ("size", 10.into())])
        );
    }

    #[test]
    fn test_static_element_ignores_conditions() {
        let registry = KindRegistry::with_builtins();
        let mut el = conditional_button();
        el.render_type = easel_model::RenderType::Static;
        let resolved = ConditionResolver::new(&registry).resolve(&el, Some(0), ActiveStateFlags::default());
        assert_eq!(resolved.get("color"), Some(&PropertyValue::from("blue")));
    }

    #[test]
    fn test_unedited_condition_falls_back_to_base() {
        let registry = KindRegistry::with_builtins();
        let mut el = conditional_button();
        el.conditions = Some(vec![Condition::new(json!({"when": "sale"}))]);
        let resolved = ConditionResolver::new(&registry).resolve(&el, Some(0), ActiveStateFlags::default());
        assert_eq!(resolved, el.properties);
    }

    #[test]
    fn test_editor_falls_back_to_first_condition() {
        let registry = KindRegistry::with_builtins();
        let resolver = ConditionResolver::new(&registry);
        let el = conditional_button();

        for matched in [None, Some(7)] {
            let resolved = resolver.resolve(&el, matched, ActiveStateFlags::default());
            assert_eq!(resolved.get("color"), Some(&PropertyValue::from("red")));
        }
    }

    #[test]
    fn test_live_requires_real_match() {
        let registry = KindRegistry::with_builtins();
        let resolver = ConditionResolver::new(&registry);
        let el = conditional_button();

        assert_eq!(
            resolver.resolve_live(&el, None, ActiveStateFlags::default()),
            Err(ResolveError::MissingMatch("b".into()))
        );
        assert!(matches!(
            resolver.resolve_live(&el, Some(1), ActiveStateFlags::default()),
            Err(ResolveError::ConditionOutOfRange { index: 1, .. })
        ));
        assert!(resolver
            .resolve_live(&el, Some(0), ActiveStateFlags::default())
            .is_ok());
        // Static elements need no match
        let plain = Element::new("t", "text");
        assert!(resolver
            .resolve_live(&plain, None, ActiveStateFlags::default())
            .is_ok());
    }

    #[test]
    fn test_active_overlay_swaps_paired_keys() {
        let registry = KindRegistry::with_builtins();
        let resolver = ConditionResolver::new(&registry);
        let mut el = Element::new("t", "text");
        el.properties = props(&[("fontSize", 16.into()), ("activeFontSize", 24.into())]);

        let active = resolver.resolve(&el, None, ActiveStateFlags::ACTIVE);
        assert_eq!(active.get("fontSize"), Some(&PropertyValue::from(24)));

        let resting = resolver.resolve(&el, None, ActiveStateFlags::INACTIVE);
        assert_eq!(resting.get("fontSize"), Some(&PropertyValue::from(16)));
    }

    #[test]
    fn test_active_overlay_applies_after_condition() {
        let registry = KindRegistry::with_builtins();
        let mut el = Element::new("t", "text");
        el.properties = props(&[("color", "black".into()), ("activeColor", "white".into())]);
        let el = el.with_conditions(vec![Condition::new(json!(true))
            .with_properties(props(&[("activeColor", "gold".into())]))]);

        let resolved = ConditionResolver::new(&registry).resolve(&el, Some(0), ActiveStateFlags::ACTIVE);
        assert_eq!(resolved.get("color"), Some(&PropertyValue::from("gold")));
    }

    #[test]
    fn test_unknown_kind_has_no_active_overlay() {
        let registry = KindRegistry::with_builtins();
        let mut el = Element::new("x", "widget");
        el.properties = props(&[("color", "black".into()), ("activeColor", "white".into())]);
        let resolved = ConditionResolver::new(&registry).resolve(&el, None, ActiveStateFlags::ACTIVE);
        assert_eq!(resolved.get("color"), Some(&PropertyValue::from("black")));
    }

    #[test]
    fn test_precomputed_matcher() {
        let mut matches = HashMap::new();
        matches.insert(ElementId::from("b"), 2);
        assert_eq!(matches.matched_index(&conditional_button()), Some(2));
        assert_eq!(EditorPreview.matched_index(&conditional_button()), None);
    }
}
