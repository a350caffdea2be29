//! # Easel Model
//!
//! Data model for canvas documents: apps own screens, screens own a forest
//! of elements. Element kinds are registered in a [`KindRegistry`] that
//! supplies defaults and the static active-key tables.

pub mod element;
pub mod error;
pub mod id_generator;
pub mod kind;
pub mod serializer;
pub mod traverse;

pub use element::{
    format_number, App, Condition, Element, ElementId, Properties, PropertyValue, RenderType,
    Screen,
};
pub use error::{ModelError, ModelResult, RegistryError};
pub use id_generator::{get_document_seed, IdGenerator};
pub use kind::{ActiveKey, ElementKind, KindRegistry};
pub use serializer::{from_json, load_app, save_app, to_json, to_json_pretty};
pub use traverse::{Parent, Visitor};
