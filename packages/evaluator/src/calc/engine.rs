use std::collections::HashMap;

use easel_model::{Element, ElementId, KindRegistry, PropertyValue};
use futures::future::{self, BoxFuture, Either, FutureExt};
use tracing::debug;

use super::payload::Calculation;
use super::tokenizer::{self, TextPart};
use super::CalcError;

/// Supplies the current value of a referenced element, possibly remotely
pub trait ValueSource: Send + Sync {
    fn value<'a>(&'a self, element: &'a Element) -> BoxFuture<'a, Result<PropertyValue, CalcError>>;
}

/// Reads the value straight from the element's content property
#[derive(Debug, Clone, Copy)]
pub struct LocalValueSource<'r> {
    registry: &'r KindRegistry,
}

impl<'r> LocalValueSource<'r> {
    pub fn new(registry: &'r KindRegistry) -> Self {
        Self { registry }
    }
}

impl ValueSource for LocalValueSource<'_> {
    fn value<'a>(&'a self, element: &'a Element) -> BoxFuture<'a, Result<PropertyValue, CalcError>> {
        let value = self
            .registry
            .content_key(&element.kind)
            .and_then(|key| element.property(key))
            .cloned()
            .ok_or_else(|| CalcError::Evaluation(format!("{} has no value", element.id)));
        future::ready(value).boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalcConfig {
    /// Longest chain of tokens referring to elements whose text holds tokens
    pub max_depth: usize,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

/// Piece of an evaluated text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Value(String),
    /// Failed token, rendered as an error capsule
    Error(CalcError),
}

impl Segment {
    pub fn render(&self) -> String {
        match self {
            Segment::Literal(text) | Segment::Value(text) => text.clone(),
            Segment::Error(e) => e.marker(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Segment::Error(_))
    }

    fn from_outcome(outcome: Result<String, CalcError>) -> Self {
        match outcome {
            Ok(value) => Segment::Value(value),
            Err(e) => Segment::Error(e),
        }
    }
}

/// Pre-order index of the elements a token may refer to. The first
/// occurrence of an id wins.
struct ElementIndex<'e> {
    by_id: HashMap<&'e str, &'e Element>,
}

impl<'e> ElementIndex<'e> {
    fn new(available: &[&'e Element]) -> Self {
        let mut by_id = HashMap::with_capacity(available.len());
        for element in available {
            by_id.entry(element.id.as_str()).or_insert(*element);
        }
        Self { by_id }
    }

    fn get(&self, id: &ElementId) -> Result<&'e Element, CalcError> {
        self.by_id
            .get(id.as_str())
            .copied()
            .ok_or_else(|| CalcError::ReferenceMissing(id.clone()))
    }
}

pub struct CalcEngine<S> {
    source: S,
    config: CalcConfig,
}

impl<S: ValueSource> CalcEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, CalcConfig::default())
    }

    pub fn with_config(source: S, config: CalcConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    /// Evaluate every token of `text` against `available` (the screen,
    /// flattened in pre-order). `current` is the element owning the text;
    /// tokens leading back to it fail as circular.
    pub async fn evaluate(
        &self,
        text: &str,
        available: &[&Element],
        current: Option<&ElementId>,
    ) -> String {
        self.evaluate_segments(text, available, current)
            .await
            .iter()
            .map(Segment::render)
            .collect()
    }

    /// Like [`evaluate`](Self::evaluate), keeping literal runs, values and
    /// failures apart
    pub async fn evaluate_segments(
        &self,
        text: &str,
        available: &[&Element],
        current: Option<&ElementId>,
    ) -> Vec<Segment> {
        let parts = tokenizer::tokenize(text);
        let index = ElementIndex::new(available);
        let stack: Vec<ElementId> = current.cloned().into_iter().collect();

        let pending = parts.iter().map(|part| match *part {
            TextPart::Literal(literal) => {
                Either::Left(future::ready(Segment::Literal(literal.to_string())))
            }
            TextPart::Token(payload) => Either::Right(
                self.eval_token(payload, &index, &stack)
                    .map(Segment::from_outcome),
            ),
        });

        future::join_all(pending).await
    }

    fn eval_token<'a>(
        &'a self,
        payload: &'a str,
        index: &'a ElementIndex<'a>,
        stack: &'a [ElementId],
    ) -> BoxFuture<'a, Result<String, CalcError>> {
        async move {
            let outcome = self.run_calculation(payload, index, stack).await;
            match &outcome {
                Ok(value) => debug!(payload, value = %value, "Calculation resolved"),
                Err(e) => debug!(payload, error = %e, "Calculation failed"),
            }
            outcome
        }
        .boxed()
    }

    async fn run_calculation(
        &self,
        payload: &str,
        index: &ElementIndex<'_>,
        stack: &[ElementId],
    ) -> Result<String, CalcError> {
        let calculation = Calculation::parse(payload)?;

        if !calculation.op.reads_values() {
            for id in &calculation.ids {
                if stack.contains(id) {
                    return Err(CalcError::CircularReference(id.clone()));
                }
                index.get(id)?;
            }
            // Values are unused, but chains through the referents still count
            // as cycles
            let chains = future::join_all(
                calculation
                    .ids
                    .iter()
                    .map(|id| self.resolve_value(id, index, stack)),
            )
            .await;
            if let Some(cycle) = chains.into_iter().find_map(|outcome| match outcome {
                Err(e @ CalcError::CircularReference(_)) => Some(e),
                _ => None,
            }) {
                return Err(cycle);
            }
            return calculation.apply(&[]);
        }

        let values = future::join_all(
            calculation
                .ids
                .iter()
                .map(|id| self.resolve_value(id, index, stack)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        calculation.apply(&values)
    }

    /// Value of `id`; text that itself holds tokens is evaluated first
    fn resolve_value<'a>(
        &'a self,
        id: &'a ElementId,
        index: &'a ElementIndex<'a>,
        stack: &'a [ElementId],
    ) -> BoxFuture<'a, Result<PropertyValue, CalcError>> {
        async move {
            if stack.contains(id) {
                return Err(CalcError::CircularReference(id.clone()));
            }
            let element = index.get(id)?;
            let raw = self.source.value(element).await?;

            let text = match &raw {
                PropertyValue::Text(text) if tokenizer::contains_tokens(text) => text,
                _ => return Ok(raw),
            };
            if stack.len() >= self.config.max_depth {
                return Err(CalcError::Evaluation(format!(
                    "calculation chain deeper than {}",
                    self.config.max_depth
                )));
            }

            let mut chain = stack.to_vec();
            chain.push(id.clone());
            let resolved = self.resolve_chained(text, index, &chain).await?;
            Ok(PropertyValue::Text(resolved))
        }
        .boxed()
    }

    /// Chained text: the first failing token fails the whole reference
    fn resolve_chained<'a>(
        &'a self,
        text: &'a str,
        index: &'a ElementIndex<'a>,
        stack: &'a [ElementId],
    ) -> BoxFuture<'a, Result<String, CalcError>> {
        async move {
            let parts = tokenizer::tokenize(text);
            let outcomes = future::join_all(parts.iter().map(|part| match *part {
                TextPart::Literal(literal) => Either::Left(future::ready(Ok(literal.to_string()))),
                TextPart::Token(payload) => Either::Right(self.eval_token(payload, index, stack)),
            }))
            .await;

            outcomes.into_iter().collect::<Result<String, _>>()
        }
        .boxed()
    }
}
