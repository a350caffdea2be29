//! # Calculations
//!
//! Text values may embed `{{CALC:<op>:<ids>[:<decimals>]}}` tokens that
//! refer to other elements on the same screen.
//!
//! ## Pipeline
//!
//! ```text
//! text ──tokenize──▶ [literal | token]*
//!                         │ each token is its own future
//!                         ▼
//!              parse payload → resolve ids → read values → apply op
//!                         │ join_all, lexical order
//!                         ▼
//!              literal + value + [Error: ...] capsules
//! ```
//!
//! A failing token renders as an inline error marker and never affects the
//! other tokens of the same text.

mod engine;
mod payload;
mod scheduler;
mod tokenizer;

use easel_model::ElementId;
use thiserror::Error;

pub use engine::{CalcConfig, CalcEngine, LocalValueSource, Segment, ValueSource};
pub use payload::{Calculation, Operation, MAX_DECIMALS};
pub use scheduler::{CalcScheduler, EvaluationTicket, ScreenResults};
pub use tokenizer::{contains_tokens, tokenize, TextPart};

/// Per-token failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Circular reference through {0}")]
    CircularReference(ElementId),

    #[error("Reference not found: {0}")]
    ReferenceMissing(ElementId),

    #[error("{0}")]
    Evaluation(String),

    #[error("Invalid calculation: {0}")]
    Parse(String),
}

impl CalcError {
    /// Inline marker substituted for the failed token
    pub fn marker(&self) -> String {
        match self {
            CalcError::CircularReference(_) => "[Error: circular reference]".to_string(),
            CalcError::ReferenceMissing(_) => "[Error: reference not found]".to_string(),
            CalcError::Evaluation(message) => format!("[Error: {}]", message),
            CalcError::Parse(_) => format!("[Error: {}]", self),
        }
    }
}
