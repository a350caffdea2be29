//! # Element Kinds
//!
//! Each element kind contributes default properties, an optional children
//! slot, and a static table pairing base property keys with the keys used
//! while the element sits inside an active slide or tab.
//!
//! Kinds are looked up by tag through [`KindRegistry`]. New kinds register
//! into the table instead of being special-cased by the resolver or the
//! calculation engine.

use std::collections::HashMap;
use std::fmt;

use crate::element::{Element, ElementId, Properties, PropertyValue};
use crate::error::RegistryError;

/// Pairing of a base property key with its active-state overlay key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveKey {
    pub base: &'static str,
    pub active: &'static str,
}

impl ActiveKey {
    pub const fn new(base: &'static str, active: &'static str) -> Self {
        Self { base, active }
    }
}

/// Behavior shared by every element kind
pub trait ElementKind: fmt::Debug + Send + Sync {
    fn tag(&self) -> &'static str;

    fn default_properties(&self) -> Properties;

    /// `Some` for kinds that accept children
    fn default_children(&self) -> Option<Vec<Element>> {
        None
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        &[]
    }

    /// Property holding the element's value for calculations
    fn content_key(&self) -> Option<&'static str> {
        None
    }

    /// Slides and tabs: exactly one child is active at a time
    fn is_activatable_container(&self) -> bool {
        false
    }
}

fn props<const N: usize>(entries: [(&str, PropertyValue); N]) -> Properties {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

const TEXT_ACTIVE_KEYS: &[ActiveKey] = &[
    ActiveKey::new("color", "activeColor"),
    ActiveKey::new("fontSize", "activeFontSize"),
    ActiveKey::new("fontWeight", "activeFontWeight"),
];

const BUTTON_ACTIVE_KEYS: &[ActiveKey] = &[
    ActiveKey::new("backgroundColor", "activeBackgroundColor"),
    ActiveKey::new("borderRadius", "activeBorderRadius"),
    ActiveKey::new("color", "activeColor"),
];

const IMAGE_ACTIVE_KEYS: &[ActiveKey] = &[ActiveKey::new("opacity", "activeOpacity")];

const INPUT_ACTIVE_KEYS: &[ActiveKey] = &[
    ActiveKey::new("borderColor", "activeBorderColor"),
    ActiveKey::new("fontSize", "activeFontSize"),
];

const CONTAINER_ACTIVE_KEYS: &[ActiveKey] = &[
    ActiveKey::new("backgroundColor", "activeBackgroundColor"),
    ActiveKey::new("borderColor", "activeBorderColor"),
];

#[derive(Debug)]
pub struct TextKind;

impl ElementKind for TextKind {
    fn tag(&self) -> &'static str {
        "text"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("text", "Text".into()),
            ("textAlign", "left".into()),
            ("color", "#1f2937".into()),
            ("activeColor", "#1f2937".into()),
            ("fontSize", 16.into()),
            ("activeFontSize", 16.into()),
            ("fontWeight", "normal".into()),
            ("activeFontWeight", "normal".into()),
        ])
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        TEXT_ACTIVE_KEYS
    }

    fn content_key(&self) -> Option<&'static str> {
        Some("text")
    }
}

#[derive(Debug)]
pub struct ButtonKind;

impl ElementKind for ButtonKind {
    fn tag(&self) -> &'static str {
        "button"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("label", "Button".into()),
            ("backgroundColor", "#2563eb".into()),
            ("activeBackgroundColor", "#2563eb".into()),
            ("borderRadius", 6.into()),
            ("activeBorderRadius", 6.into()),
            ("color", "#ffffff".into()),
            ("activeColor", "#ffffff".into()),
        ])
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        BUTTON_ACTIVE_KEYS
    }

    fn content_key(&self) -> Option<&'static str> {
        Some("label")
    }
}

#[derive(Debug)]
pub struct ImageKind;

impl ElementKind for ImageKind {
    fn tag(&self) -> &'static str {
        "image"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("src", "".into()),
            ("fit", "cover".into()),
            ("borderRadius", 0.into()),
            ("opacity", 1.into()),
            ("activeOpacity", 1.into()),
        ])
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        IMAGE_ACTIVE_KEYS
    }
}

#[derive(Debug)]
pub struct InputKind;

impl ElementKind for InputKind {
    fn tag(&self) -> &'static str {
        "input"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("value", "".into()),
            ("placeholder", "".into()),
            ("fontSize", 14.into()),
            ("activeFontSize", 14.into()),
            ("borderColor", "#d1d5db".into()),
            ("activeBorderColor", "#d1d5db".into()),
        ])
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        INPUT_ACTIVE_KEYS
    }

    fn content_key(&self) -> Option<&'static str> {
        Some("value")
    }
}

#[derive(Debug)]
pub struct ContainerKind;

impl ElementKind for ContainerKind {
    fn tag(&self) -> &'static str {
        "container"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("direction", "column".into()),
            ("gap", 8.into()),
            ("padding", 8.into()),
            ("backgroundColor", "transparent".into()),
            ("activeBackgroundColor", "transparent".into()),
            ("borderColor", "transparent".into()),
            ("activeBorderColor", "transparent".into()),
        ])
    }

    fn default_children(&self) -> Option<Vec<Element>> {
        Some(Vec::new())
    }

    fn active_keys(&self) -> &'static [ActiveKey] {
        CONTAINER_ACTIVE_KEYS
    }
}

#[derive(Debug)]
pub struct SlidesKind;

impl ElementKind for SlidesKind {
    fn tag(&self) -> &'static str {
        "slides"
    }

    fn default_properties(&self) -> Properties {
        props([
            ("autoplay", false.into()),
            ("interval", 5000.into()),
            ("showIndicators", true.into()),
        ])
    }

    fn default_children(&self) -> Option<Vec<Element>> {
        Some(Vec::new())
    }

    fn is_activatable_container(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct TabsKind;

impl ElementKind for TabsKind {
    fn tag(&self) -> &'static str {
        "tabs"
    }

    fn default_properties(&self) -> Properties {
        props([("position", "top".into()), ("variant", "underline".into())])
    }

    fn default_children(&self) -> Option<Vec<Element>> {
        Some(Vec::new())
    }

    fn is_activatable_container(&self) -> bool {
        true
    }
}

/// Lookup table from kind tag to kind behavior
#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: HashMap<&'static str, Box<dyn ElementKind>>,
}

impl KindRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registry with every built-in kind
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: Vec<Box<dyn ElementKind>> = vec![
            Box::new(TextKind),
            Box::new(ButtonKind),
            Box::new(ImageKind),
            Box::new(InputKind),
            Box::new(ContainerKind),
            Box::new(SlidesKind),
            Box::new(TabsKind),
        ];
        for kind in builtins {
            registry.kinds.insert(kind.tag(), kind);
        }
        registry
    }

    /// Register a kind, checking its active-key table against its defaults
    pub fn register(&mut self, kind: impl ElementKind + 'static) -> Result<(), RegistryError> {
        self.register_boxed(Box::new(kind))
    }

    fn register_boxed(&mut self, kind: Box<dyn ElementKind>) -> Result<(), RegistryError> {
        let tag = kind.tag();
        if self.kinds.contains_key(tag) {
            return Err(RegistryError::DuplicateKind(tag.to_string()));
        }

        let defaults = kind.default_properties();
        for pair in kind.active_keys() {
            for key in [pair.base, pair.active] {
                if !defaults.contains_key(key) {
                    return Err(RegistryError::MissingActivePair {
                        kind: tag.to_string(),
                        base: pair.base.to_string(),
                        active: pair.active.to_string(),
                        missing: key.to_string(),
                    });
                }
            }
        }

        self.kinds.insert(tag, kind);
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<&dyn ElementKind> {
        self.kinds.get(tag).map(|k| k.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.kinds.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Fresh element of `tag` with kind defaults
    pub fn create(&self, tag: &str, id: ElementId) -> Result<Element, RegistryError> {
        let kind = self
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownKind(tag.to_string()))?;

        let mut element = Element::new(id, tag);
        element.properties = kind.default_properties();
        element.children = kind.default_children();
        Ok(element)
    }

    /// Active-key table for `tag`; empty for unknown kinds
    pub fn active_keys(&self, tag: &str) -> &'static [ActiveKey] {
        self.get(tag).map(|k| k.active_keys()).unwrap_or(&[])
    }

    pub fn content_key(&self, tag: &str) -> Option<&'static str> {
        self.get(tag).and_then(|k| k.content_key())
    }

    pub fn is_activatable_container(&self, tag: &str) -> bool {
        self.get(tag)
            .map(|k| k.is_activatable_container())
            .unwrap_or(false)
    }
}
