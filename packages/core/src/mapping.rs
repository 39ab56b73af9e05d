//! Mapping configuration: which document path fills which form field.
//!
//! A [`MappingConfig`] is an ordered table of `path → rule`. Scalar rules
//! name one field; array rules describe a repeated section whose containers
//! are located (or created) per item. The JSON form uses the same keys the
//! employer-side integration snippets have always used:
//!
//! ```json
//! {
//!   "applicant_info.name.first_name": { "selector": "#first-name" },
//!   "applicant_info.willing_to_relocate": { "selector": "#relocate", "fieldType": "checkbox" },
//!   "work_experience": {
//!     "type": "array",
//!     "itemContainerPattern": "#job-{index}",
//!     "addButtonSelector": "#add-job",
//!     "itemMapping": {
//!       "title": { "selector": ".job-title" },
//!       "responsibilities": { "selector": ".duties", "fieldType": "textarea" }
//!     }
//!   }
//! }
//! ```
//!
//! Entry order is significant and is kept exactly as written.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::MappingError;
use crate::form::FieldKind;

/// The placeholder replaced by an item's 0-based index in
/// [`ArrayRule::item_container_pattern`].
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// A rule that writes one resolved value into one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarRule {
    pub selector: String,
    /// Overrides the element's own type when choosing how to write.
    pub field_type: Option<FieldKind>,
}

impl ScalarRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            field_type: None,
        }
    }

    pub fn typed(selector: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            selector: selector.into(),
            field_type: Some(kind),
        }
    }
}

/// A repeated section: one container per array item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayRule {
    /// Written as a scalar when the document value is not an array.
    pub selector: Option<String>,
    /// Container selector with an `{index}` placeholder.
    pub item_container_pattern: String,
    pub add_button_selector: Option<String>,
    /// Fallback for a statically rendered first item.
    pub first_item_container_selector: Option<String>,
    /// Item-relative path → field rule, looked up inside the container.
    pub item_mapping: Vec<(String, ScalarRule)>,
}

impl ArrayRule {
    pub fn new(item_container_pattern: impl Into<String>) -> Self {
        Self {
            selector: None,
            item_container_pattern: item_container_pattern.into(),
            add_button_selector: None,
            first_item_container_selector: None,
            item_mapping: Vec::new(),
        }
    }

    pub fn add_button(mut self, selector: impl Into<String>) -> Self {
        self.add_button_selector = Some(selector.into());
        self
    }

    pub fn first_item(mut self, selector: impl Into<String>) -> Self {
        self.first_item_container_selector = Some(selector.into());
        self
    }

    pub fn item(mut self, path: impl Into<String>, rule: ScalarRule) -> Self {
        self.item_mapping.push((path.into(), rule));
        self
    }

    /// The container selector for the item at `index`.
    pub fn container_selector(&self, index: usize) -> String {
        self.item_container_pattern
            .replace(INDEX_PLACEHOLDER, &index.to_string())
    }
}

/// One mapping entry: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    Scalar(ScalarRule),
    Array(ArrayRule),
}

impl FieldRule {
    /// The selector of the single element this rule writes to, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            FieldRule::Scalar(rule) => Some(&rule.selector),
            FieldRule::Array(rule) => rule.selector.as_deref(),
        }
    }
}

/// Ordered `path → rule` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingConfig {
    entries: Vec<(String, FieldRule)>,
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON form shown in the module docs.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let raw: RawMapping =
            serde_json::from_str(json).map_err(|e| MappingError::Parse(e.to_string()))?;
        raw.0
            .into_iter()
            .map(|(path, rule)| {
                let rule = rule.into_rule(&path)?;
                Ok((path, rule))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Self { entries })
    }

    /// Map `path` to the element at `selector`, written according to its own type.
    pub fn scalar(self, path: impl Into<String>, selector: impl Into<String>) -> Self {
        self.rule(path, FieldRule::Scalar(ScalarRule::new(selector)))
    }

    /// Map `path` to the element at `selector`, written as `kind`.
    pub fn typed(
        self,
        path: impl Into<String>,
        selector: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        self.rule(path, FieldRule::Scalar(ScalarRule::typed(selector, kind)))
    }

    pub fn array(self, path: impl Into<String>, rule: ArrayRule) -> Self {
        self.rule(path, FieldRule::Array(rule))
    }

    /// Append an entry. A path that is already present is replaced in place.
    pub fn rule(mut self, path: impl Into<String>, rule: FieldRule) -> Self {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = rule,
            None => self.entries.push((path, rule)),
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&FieldRule> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for MappingConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMapping::deserialize(deserializer)?;
        let mut entries = Vec::with_capacity(raw.0.len());
        for (path, rule) in raw.0 {
            let rule = rule.into_rule(&path).map_err(serde::de::Error::custom)?;
            entries.push((path, rule));
        }
        Ok(Self { entries })
    }
}

// --- wire format -------------------------------------------------------------

/// JSON object kept as an ordered list of entries.
struct RawMapping(Vec<(String, RawRule)>);

impl<'de> Deserialize<'de> for RawMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = RawMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping document paths to field rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawMapping, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((path, rule)) = map.next_entry::<String, RawRule>()? {
                    match entries.iter_mut().find(|(p, _)| *p == path) {
                        Some(entry) => entry.1 = rule,
                        None => entries.push((path, rule)),
                    }
                }
                Ok(RawMapping(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(rename = "type")]
    rule_type: Option<String>,
    selector: Option<String>,
    field_type: Option<FieldKind>,
    item_container_pattern: Option<String>,
    add_button_selector: Option<String>,
    first_item_container_selector: Option<String>,
    item_mapping: Option<RawMapping>,
}

impl RawRule {
    fn is_array(&self) -> bool {
        self.rule_type.as_deref() == Some("array")
            || self.item_container_pattern.is_some()
            || self.item_mapping.is_some()
    }

    fn into_rule(self, path: &str) -> Result<FieldRule, MappingError> {
        if !self.is_array() {
            let selector = self
                .selector
                .ok_or_else(|| MappingError::MissingSelector(path.to_string()))?;
            return Ok(FieldRule::Scalar(ScalarRule {
                selector,
                field_type: self.field_type,
            }));
        }

        let pattern = self.item_container_pattern.ok_or_else(|| {
            MappingError::IncompleteArrayRule(path.to_string(), "itemContainerPattern")
        })?;
        if !pattern.contains(INDEX_PLACEHOLDER) {
            return Err(MappingError::MissingIndexPlaceholder(pattern));
        }
        let items = self
            .item_mapping
            .ok_or_else(|| MappingError::IncompleteArrayRule(path.to_string(), "itemMapping"))?;

        let mut item_mapping = Vec::with_capacity(items.0.len());
        for (key, raw) in items.0 {
            match raw.into_rule(&key)? {
                FieldRule::Scalar(rule) => item_mapping.push((key, rule)),
                FieldRule::Array(_) => return Err(MappingError::NestedArrayRule(key)),
            }
        }

        Ok(FieldRule::Array(ArrayRule {
            selector: self.selector,
            item_container_pattern: pattern,
            add_button_selector: self.add_button_selector,
            first_item_container_selector: self.first_item_container_selector,
            item_mapping,
        }))
    }
}

// --- tests -------------------------------------------------------------------
