//! # Document Handle
//!
//! The element store for one app being edited.
//!
//! A Document owns the app, tracks which screen is current, and is the only
//! place screen elements are mutated. Documents can be:
//! - **Memory-backed**: temporary, for tests or previews
//! - **File-backed**: loaded from and saved to an app JSON file
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Select screen → Mutate → Render → Save
//!   ↓          ↓            ↓        ↓       ↓
//! File      current     Mutation  evaluator  File
//! ```

use std::path::{Path, PathBuf};

use easel_model::{serializer, traverse, App, Element, ElementId, IdGenerator, Screen};
use tracing::{debug, info, instrument, warn};

use crate::{EditorError, Mutation, MutationError, MutationResult};

/// Editable app document
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each applied mutation)
    pub version: u64,

    current_screen: String,
    ids: IdGenerator,
    storage: DocumentStorage,
}

/// Storage backend for a document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { app: App },

    /// Backed by an app JSON file
    File {
        path: PathBuf,
        app: App,
        dirty: bool,
    },
}

impl Document {
    /// Memory-backed document; the first screen becomes current
    pub fn new(app: App) -> Result<Self, EditorError> {
        Self::with_storage(DocumentStorage::Memory { app })
    }

    /// Memory-backed document from app JSON
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        Self::new(serializer::from_json(source)?)
    }

    /// File-backed document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let app = serializer::load_app(&path)?;
        info!(path = %path.display(), screens = app.screens.len(), "Loaded app");
        Self::with_storage(DocumentStorage::File {
            path,
            app,
            dirty: false,
        })
    }

    fn with_storage(storage: DocumentStorage) -> Result<Self, EditorError> {
        let app = match &storage {
            DocumentStorage::Memory { app } | DocumentStorage::File { app, .. } => app,
        };
        let current_screen = app
            .screens
            .first()
            .map(|s| s.id.clone())
            .ok_or(EditorError::NoScreens)?;
        let ids = IdGenerator::resume(app);

        Ok(Self {
            version: 0,
            current_screen,
            ids,
            storage,
        })
    }

    pub fn app(&self) -> &App {
        match &self.storage {
            DocumentStorage::Memory { app } | DocumentStorage::File { app, .. } => app,
        }
    }

    fn app_mut(&mut self) -> &mut App {
        match &mut self.storage {
            DocumentStorage::Memory { app } => app,
            DocumentStorage::File { app, dirty, .. } => {
                *dirty = true;
                app
            }
        }
    }

    pub fn current_screen_id(&self) -> &str {
        &self.current_screen
    }

    pub fn current_screen(&self) -> &Screen {
        // `current_screen` always names an existing screen; screens are never
        // removed through the document.
        self.app()
            .screen(&self.current_screen)
            .unwrap_or(&self.app().screens[0])
    }

    /// Switch the screen being edited
    pub fn set_current_screen(&mut self, screen_id: &str) -> Result<(), EditorError> {
        if self.app().screen(screen_id).is_none() {
            return Err(EditorError::ScreenNotFound(screen_id.to_string()));
        }
        debug!(from = %self.current_screen, to = %screen_id, "Switching screen");
        self.current_screen = screen_id.to_string();
        Ok(())
    }

    /// Root elements of the current screen
    pub fn elements(&self) -> &[Element] {
        &self.current_screen().elements
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        traverse::find(self.elements(), id)
    }

    /// Fresh id, never handed out before in this document
    pub fn next_id(&mut self) -> ElementId {
        let id = self.ids.new_id();
        // Recorded on the app so a reload never reissues a deleted id
        let counter = self.ids.counter();
        self.app_mut().id_counter = Some(counter);
        id
    }

    /// Apply a mutation to the current screen
    #[instrument(skip(self, mutation), fields(op = mutation.name(), screen = %self.current_screen))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        // Validate against a shared borrow first so a rejection never marks
        // the file dirty.
        let validated = mutation
            .validate(self.elements())
            .and_then(|()| self.check_other_screens(&mutation));
        if let Err(e) = validated {
            warn!(error = %e, "Mutation rejected");
            return Err(e.into());
        }

        let screen_id = self.current_screen.clone();
        let screen = self
            .app_mut()
            .screen_mut(&screen_id)
            .ok_or_else(|| EditorError::ScreenNotFound(screen_id.clone()))?;
        mutation.apply(&mut screen.elements)?;

        self.version += 1;
        debug!(version = self.version, "Mutation applied");

        Ok(MutationResult {
            version: self.version,
        })
    }

    /// Ids are unique across the app, so new ids may not exist on any other
    /// screen either
    fn check_other_screens(&self, mutation: &Mutation) -> Result<(), MutationError> {
        let incoming = mutation.incoming_ids();
        if incoming.is_empty() {
            return Ok(());
        }

        let others = self
            .app()
            .screens
            .iter()
            .filter(|screen| screen.id != self.current_screen);
        for screen in others {
            if let Some(id) = incoming
                .iter()
                .find(|id| traverse::contains_id(&screen.elements, id.as_str()))
            {
                return Err(MutationError::DuplicateId(id.clone()));
            }
        }
        Ok(())
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { path, app, dirty } => {
                serializer::save_app(path, app)?;
                *dirty = false;
                info!(path = %path.display(), "Saved app");
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }

    /// Serialized app
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serializer::to_json_pretty(self.app())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new("shop", "Shop");
        let mut home = Screen::new("home", "Home");
        home.elements.push(Element::container("page", "container"));
        app.screens.push(home);
        app.screens.push(Screen::new("cart", "Cart"));
        app
    }

    #[test]
    fn test_create_memory_document() {
        let doc = Document::new(app()).unwrap();
        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
        assert_eq!(doc.current_screen_id(), "home");
        assert_eq!(doc.elements().len(), 1);
    }

    #[test]
    fn test_empty_app_rejected() {
        let err = Document::new(App::new("x", "X")).unwrap_err();
        assert!(matches!(err, EditorError::NoScreens));
    }

    #[test]
    fn test_version_increments_only_on_success() {
        let mut doc = Document::new(app()).unwrap();

        let bad = Mutation::RemoveElement {
            target_id: "ghost".into(),
        };
        assert!(doc.apply(bad).is_err());
        assert_eq!(doc.version, 0);

        let good = Mutation::InsertIntoContainer {
            container_id: "page".into(),
            element: Element::new("t", "text"),
        };
        assert_eq!(doc.apply(good).unwrap().version, 1);
    }

    #[test]
    fn test_ids_unique_across_screens() {
        let mut doc = Document::new(app()).unwrap();
        doc.set_current_screen("cart").unwrap();

        let clash = Mutation::InsertRoot {
            element: Element::new("page", "container"),
        };
        assert!(matches!(
            doc.apply(clash),
            Err(EditorError::Mutation(MutationError::DuplicateId(ref id))) if id == "page"
        ));
        assert!(doc.elements().is_empty());
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_switch_screen() {
        let mut doc = Document::new(app()).unwrap();
        doc.set_current_screen("cart").unwrap();
        assert!(doc.elements().is_empty());
        assert!(matches!(
            doc.set_current_screen("nope"),
            Err(EditorError::ScreenNotFound(_))
        ));
        assert_eq!(doc.current_screen_id(), "cart");
    }

    #[test]
    fn test_memory_document_cannot_save() {
        let mut doc = Document::new(app()).unwrap();
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }

    #[test]
    fn test_file_document_dirty_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        serializer::save_app(&path, &app()).unwrap();

        let mut doc = Document::load(&path).unwrap();
        assert!(!doc.is_dirty());

        doc.apply(Mutation::InsertRoot {
            element: Element::new("new", "text"),
        })
        .unwrap();
        assert!(doc.is_dirty());

        doc.save().unwrap();
        assert!(!doc.is_dirty());

        let reloaded = Document::load(&path).unwrap();
        assert!(reloaded.find("new").is_some());
    }

    #[test]
    fn test_deleted_id_not_reissued_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        serializer::save_app(&path, &app()).unwrap();

        let mut doc = Document::load(&path).unwrap();
        let newest = doc.next_id();
        doc.apply(Mutation::InsertIntoContainer {
            container_id: "page".into(),
            element: Element::new(newest.clone(), "text"),
        })
        .unwrap();
        doc.apply(Mutation::RemoveElement {
            target_id: newest.clone(),
        })
        .unwrap();
        doc.save().unwrap();

        let mut reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.app().id_counter, doc.app().id_counter);
        assert_ne!(reloaded.next_id(), newest);
    }

    #[test]
    fn test_next_id_skips_existing() {
        let mut doc = Document::new(app()).unwrap();
        let a = doc.next_id();
        let b = doc.next_id();
        assert_ne!(a, b);
    }
}
