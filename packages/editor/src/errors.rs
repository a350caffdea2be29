//! Error types for the editor

use easel_model::{ModelError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,

    #[error("App has no screens")]
    NoScreens,

    #[error("Screen not found: {0}")]
    ScreenNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element {element_id} has no condition at index {index}")]
    ConditionOutOfRange { element_id: String, index: usize },
}

impl EditorError {
    /// Structural rejections that a gesture handler may silently ignore
    pub fn is_rejected_mutation(&self) -> bool {
        matches!(self, EditorError::Mutation(_))
    }
}
