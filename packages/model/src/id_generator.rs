use crc32fast::Hasher;

use crate::element::ElementId;
use crate::traverse;
use crate::App;

/// Derive a stable document seed from an app identifier using CRC32
pub fn get_document_seed(app_id: &str) -> String {
    let mut buff = String::from(app_id);
    if !app_id.starts_with("app://") {
        buff = format!("app://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential element id generator for one app.
///
/// Ids are `<seed>-<n>`. The counter only moves forward, so an id handed
/// out once is never produced again even after its element is deleted.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(app_id: &str) -> Self {
        Self {
            seed: get_document_seed(app_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Resume numbering after the app's recorded counter or the highest id
    /// present in it, whichever is larger
    pub fn resume(app: &App) -> Self {
        let mut generator = Self::new(&app.id);
        generator.count = app.id_counter.unwrap_or(0);
        let prefix = format!("{}-", generator.seed);

        for screen in &app.screens {
            for id in traverse::collect_ids(&screen.elements) {
                if let Some(n) = id
                    .as_str()
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.parse::<u32>().ok())
                {
                    generator.count = generator.count.max(n);
                }
            }
        }

        generator
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> ElementId {
        self.count += 1;
        ElementId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of the last id handed out
    pub fn counter(&self) -> u32 {
        self.count
    }
}
