//! Last-started-wins publication of screen evaluations
//!
//! Every evaluation of a screen takes a ticket carrying the screen's
//! generation at start. Starting another evaluation, or navigating away,
//! bumps the generation; results are only published for a ticket that is
//! still the newest for a screen that is still current.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use easel_model::{traverse, ElementId, KindRegistry, Screen};
use futures::future;
use tracing::{debug, instrument, warn};

use super::engine::{CalcEngine, ValueSource};
use super::tokenizer;

/// Resolved text per element id
pub type ScreenResults = BTreeMap<ElementId, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTicket {
    screen_id: String,
    generation: u64,
}

impl EvaluationTicket {
    pub fn screen_id(&self) -> &str {
        &self.screen_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    current_screen: Option<String>,
    generations: HashMap<String, u64>,
    published: HashMap<String, ScreenResults>,
}

impl SchedulerState {
    fn bump(&mut self, screen_id: &str) -> u64 {
        let generation = self.generations.entry(screen_id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[derive(Debug, Default)]
pub struct CalcScheduler {
    state: Mutex<SchedulerState>,
}

impl CalcScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // State stays consistent between statements, so a poisoned lock is usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start an evaluation of `screen_id`, superseding any in flight
    pub fn begin(&self, screen_id: &str) -> EvaluationTicket {
        let generation = self.lock().bump(screen_id);
        debug!(screen = screen_id, generation, "Evaluation started");
        EvaluationTicket {
            screen_id: screen_id.to_string(),
            generation,
        }
    }

    /// Whether results for `ticket` would still be accepted
    pub fn is_current(&self, ticket: &EvaluationTicket) -> bool {
        let state = self.lock();
        Self::accepts(&state, ticket)
    }

    fn accepts(state: &SchedulerState, ticket: &EvaluationTicket) -> bool {
        let latest = state.generations.get(&ticket.screen_id).copied();
        let on_screen = state
            .current_screen
            .as_deref()
            .map_or(true, |current| current == ticket.screen_id);
        latest == Some(ticket.generation) && on_screen
    }

    /// Store results unless a newer evaluation started or the screen was
    /// left; returns whether they were stored
    pub fn publish(&self, ticket: &EvaluationTicket, results: ScreenResults) -> bool {
        let mut state = self.lock();
        if !Self::accepts(&state, ticket) {
            warn!(
                screen = %ticket.screen_id,
                generation = ticket.generation,
                "Discarding stale evaluation"
            );
            return false;
        }
        state.published.insert(ticket.screen_id.clone(), results);
        true
    }

    /// Make `screen_id` current; in-flight work for the previous screen is
    /// discarded when it completes
    pub fn navigate(&self, screen_id: &str) {
        let mut state = self.lock();
        if let Some(previous) = state.current_screen.take() {
            if previous != screen_id {
                state.bump(&previous);
            }
        }
        state.current_screen = Some(screen_id.to_string());
    }

    pub fn current_screen(&self) -> Option<String> {
        self.lock().current_screen.clone()
    }

    /// Last accepted results for `screen_id`
    pub fn published(&self, screen_id: &str) -> Option<ScreenResults> {
        self.lock().published.get(screen_id).cloned()
    }

    /// Evaluate every text holding tokens on `screen` concurrently and
    /// publish on join. Returns the results if they were published.
    #[instrument(skip_all, fields(screen = %screen.id))]
    pub async fn evaluate_screen<S: ValueSource>(
        &self,
        engine: &CalcEngine<S>,
        registry: &KindRegistry,
        screen: &Screen,
    ) -> Option<ScreenResults> {
        let ticket = self.begin(&screen.id);
        let available = traverse::flatten(&screen.elements);

        let targets: Vec<_> = available
            .iter()
            .filter_map(|element| {
                let key = registry.content_key(&element.kind)?;
                let text = element.property(key)?.as_str()?;
                tokenizer::contains_tokens(text).then_some((*element, text))
            })
            .collect();

        let available = &available;
        let results: ScreenResults = future::join_all(targets.into_iter().map(
            |(element, text)| async move {
                let value = engine.evaluate(text, available, Some(&element.id)).await;
                (element.id.clone(), value)
            },
        ))
        .await
        .into_iter()
        .collect();

        debug!(texts = results.len(), "Screen evaluation joined");
        self.publish(&ticket, results.clone()).then_some(results)
    }
}
