//! JSON (de)serialization of apps and screens.
//!
//! The on-disk shape is the one consumed by the external store:
//! `{ id, type, properties, renderType, conditions?, children? }` per element.
//! Absent `conditions` / `children` stay absent on the way back out, and
//! empty ones stay empty.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::element::App;
use crate::error::{ModelError, ModelResult};
use crate::traverse;

pub fn to_json(app: &App) -> ModelResult<String> {
    Ok(serde_json::to_string(app)?)
}

pub fn to_json_pretty(app: &App) -> ModelResult<String> {
    Ok(serde_json::to_string_pretty(app)?)
}

/// Parse an app, rejecting screens whose element ids collide
pub fn from_json(source: &str) -> ModelResult<App> {
    let app: App = serde_json::from_str(source)?;
    validate_ids(&app)?;
    Ok(app)
}

pub fn load_app(path: &Path) -> ModelResult<App> {
    let source = fs::read_to_string(path)?;
    from_json(&source)
}

pub fn save_app(path: &Path, app: &App) -> ModelResult<()> {
    fs::write(path, to_json_pretty(app)?)?;
    Ok(())
}

/// Ids are unique across the whole app, not only within a screen
fn validate_ids(app: &App) -> ModelResult<()> {
    let mut seen = HashSet::new();
    for screen in &app.screens {
        for id in traverse::collect_ids(&screen.elements) {
            if !seen.insert(id.clone()) {
                return Err(ModelError::DuplicateId {
                    screen: screen.name.clone(),
                    id: id.to_string(),
                });
            }
        }
    }
    Ok(())
}
