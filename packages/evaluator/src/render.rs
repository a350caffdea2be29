//! Render pass: screen → tree of effective properties
//!
//! Per element, in pre-order:
//! 1. Active flags from the slide/tab context of this pass
//! 2. Condition resolution with the caller's matcher
//! 3. Calculation tokens in the kind's content property
//!
//! The output is what a painter consumes; nothing is written back to the
//! document.

use std::collections::HashMap;

use easel_model::{traverse, Element, ElementId, KindRegistry, Properties, PropertyValue, Screen};
use futures::future;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::calc::{contains_tokens, CalcEngine, ValueSource};
use crate::{ActiveContext, ConditionMatcher, ConditionResolver};

/// Rendered element with its effective properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: ElementId,

    #[serde(rename = "type")]
    pub kind: String,

    pub properties: Properties,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

pub struct RenderPass<'a, S> {
    registry: &'a KindRegistry,
    engine: &'a CalcEngine<S>,
}

impl<'a, S: ValueSource> RenderPass<'a, S> {
    pub fn new(registry: &'a KindRegistry, engine: &'a CalcEngine<S>) -> Self {
        Self { registry, engine }
    }

    #[instrument(skip_all, fields(screen = %screen.id))]
    pub async fn render(
        &self,
        screen: &Screen,
        matcher: &dyn ConditionMatcher,
        active_children: &HashMap<ElementId, usize>,
    ) -> Vec<RenderNode> {
        let context = ActiveContext::compute(&screen.elements, self.registry, active_children);
        let resolver = ConditionResolver::new(self.registry);
        let available = traverse::flatten(&screen.elements);

        let mut resolved: HashMap<&ElementId, Properties> = available
            .iter()
            .map(|element| {
                let properties = resolver.resolve(
                    element,
                    matcher.matched_index(element),
                    context.flags(&element.id),
                );
                (&element.id, properties)
            })
            .collect();

        // Content holding tokens, evaluated concurrently across the screen
        let pending: Vec<(&ElementId, &'static str, String)> = available
            .iter()
            .filter_map(|element| {
                let key = self.registry.content_key(&element.kind)?;
                let text = resolved.get(&element.id)?.get(key)?.as_str()?;
                contains_tokens(text).then(|| (&element.id, key, text.to_string()))
            })
            .collect();

        let available = &available;
        let evaluated = future::join_all(pending.into_iter().map(|(id, key, text)| async move {
            let value = self.engine.evaluate(&text, available, Some(id)).await;
            (id, key, value)
        }))
        .await;

        for (id, key, value) in evaluated {
            if let Some(properties) = resolved.get_mut(id) {
                properties.insert(key.to_string(), PropertyValue::Text(value));
            }
        }

        let nodes = build(&screen.elements, &mut resolved, &context);
        debug!(elements = available.len(), active = context.active_count(), "Render complete");
        nodes
    }
}

fn build(
    elements: &[Element],
    resolved: &mut HashMap<&ElementId, Properties>,
    context: &ActiveContext,
) -> Vec<RenderNode> {
    elements
        .iter()
        .map(|element| RenderNode {
            id: element.id.clone(),
            kind: element.kind.clone(),
            properties: resolved.remove(&element.id).unwrap_or_default(),
            active: context.flags(&element.id).is_active(),
            children: build(element.children(), resolved, context),
        })
        .collect()
}
