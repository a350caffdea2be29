use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid app JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate element id {id} in screen '{screen}'")]
    DuplicateId { screen: String, id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Element kind '{0}' is already registered")]
    DuplicateKind(String),

    #[error("Element kind '{0}' is not registered")]
    UnknownKind(String),

    #[error("Element kind '{kind}' declares active pair {base} -> {active} but is missing default '{missing}'")]
    MissingActivePair {
        kind: String,
        base: String,
        active: String,
        missing: String,
    },
}
