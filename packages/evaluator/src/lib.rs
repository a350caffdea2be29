//! # Easel Evaluator
//!
//! Turns an element tree into what the canvas shows.
//!
//! ## Purpose
//!
//! The evaluator resolves each element's effective properties (base,
//! condition overlay, active slide/tab overlay) and expands calculation
//! tokens embedded in text content.
//!
//! ## Determinism Contract
//!
//! For a given screen, matcher and active-children map, `RenderPass::render`
//! produces the same tree on every call:
//!
//! - Traversal is pre-order, children in array order
//! - Token results are placed by lexical position, not completion order
//! - Nothing is cached on or written back to the elements
//!
//! ## Recursion Protection
//!
//! A token may refer to an element whose own text holds tokens. Such chains
//! are evaluated recursively with a stack of the elements being evaluated:
//! a reference back into the stack is a circular reference, and chains are
//! bounded by `CalcConfig::max_depth`.
//!
//! ## Error Recovery Boundaries
//!
//! Calculation failures are recovered **per token**: the token renders as an
//! `[Error: ...]` capsule and the rest of the text is unaffected. Condition
//! resolution in preview never fails; live resolution reports a missing or
//! out-of-range match as a [`ResolveError`].

pub mod active;
pub mod calc;
pub mod render;
pub mod resolver;

pub use active::{ActiveContext, ActiveStateFlags};
pub use calc::{
    CalcConfig, CalcEngine, CalcError, CalcScheduler, EvaluationTicket, LocalValueSource,
    ScreenResults, Segment, ValueSource,
};
pub use render::{RenderNode, RenderPass};
pub use resolver::{ConditionMatcher, ConditionResolver, EditorPreview, ResolveError};
