//! The target-form capability.
//!
//! The engine never touches a live page directly. Everything it needs from
//! the host (finding elements by selector, reading and writing their state,
//! clicking an add-item button) goes through the [`Form`] trait, so the same
//! population logic runs against a browser DOM (via `sjafill-wasm`) and
//! against [`MemoryForm`](crate::memory::MemoryForm) in tests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `<option>` of a single-choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The option's underlying `value` attribute.
    pub value: String,
    /// The option's display text.
    pub text: String,
    /// The option's `label` attribute; hosts without one repeat `text`.
    #[serde(default)]
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: value.into(),
            label: text.clone(),
            text,
        }
    }
}

/// How a value is written into a field.
///
/// Parsed from the DOM `type` strings; anything the writer has no special
/// case for (text, email, tel, date, hidden…) is kept verbatim in
/// [`FieldKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    SelectOne,
    Radio,
    Checkbox,
    Textarea,
    Other(String),
}

impl FieldKind {
    pub fn text() -> Self {
        FieldKind::Other("text".into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::SelectOne => "select-one",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Textarea => "textarea",
            FieldKind::Other(s) => s,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        match s {
            "select-one" => FieldKind::SelectOne,
            "radio" => FieldKind::Radio,
            "checkbox" => FieldKind::Checkbox,
            "textarea" => FieldKind::Textarea,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        FieldKind::from(s.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host capability for locating and mutating form elements.
///
/// `Element` is an opaque handle owned by the host. Handles returned by
/// [`query`](Form::query) stay valid for the rest of the load.
pub trait Form {
    type Element: Clone + fmt::Debug;

    /// First element matching `selector`, searched inside `scope` when given
    /// and in the whole document otherwise.
    fn query(&self, scope: Option<&Self::Element>, selector: &str) -> Option<Self::Element>;

    /// Every radio control in the document whose `name` is `name`.
    fn radio_group(&self, name: &str) -> Vec<Self::Element>;

    /// The element's `name` attribute.
    fn name(&self, el: &Self::Element) -> Option<String>;

    /// The element's own type (`"text"`, `"select-one"`, `"checkbox"`…).
    fn input_type(&self, el: &Self::Element) -> Option<String>;

    fn value(&self, el: &Self::Element) -> String;

    fn set_value(&mut self, el: &Self::Element, value: &str);

    fn checked(&self, el: &Self::Element) -> bool;

    fn set_checked(&mut self, el: &Self::Element, checked: bool);

    fn options(&self, el: &Self::Element) -> Vec<SelectOption>;

    fn select_index(&mut self, el: &Self::Element, index: usize);

    /// Replace the element's content with `html` markup.
    fn set_notice(&mut self, el: &Self::Element, html: &str);

    /// Activate the element, e.g. an "add another" button.
    fn click(&mut self, el: &Self::Element);

    /// Give the host a chance to finish work scheduled by a previous
    /// [`click`](Form::click) before a container is looked up again.
    fn settle(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_from_dom_type() {
        assert_eq!(FieldKind::from("select-one"), FieldKind::SelectOne);
        assert_eq!(FieldKind::from("radio"), FieldKind::Radio);
        assert_eq!(FieldKind::from("email"), FieldKind::Other("email".into()));
        assert_eq!(FieldKind::Other("date".into()).to_string(), "date");
    }

    #[test]
    fn field_kind_serde_uses_dom_strings() {
        let kind: FieldKind = serde_json::from_str(r#""checkbox""#).unwrap();
        assert_eq!(kind, FieldKind::Checkbox);
        assert_eq!(
            serde_json::to_string(&FieldKind::Textarea).unwrap(),
            r#""textarea""#
        );
    }
}
