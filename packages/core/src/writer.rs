//! Writing one resolved value into one field.

use serde_json::Value;

use crate::document::{is_truthy, text_of};
use crate::form::{FieldKind, Form};

/// The kind to write `el` as: the rule's declared kind, else the element's
/// own type, else plain text.
pub fn resolve_kind<F: Form>(form: &F, el: &F::Element, declared: Option<&FieldKind>) -> FieldKind {
    match declared {
        Some(kind) => kind.clone(),
        None => form
            .input_type(el)
            .map(FieldKind::from)
            .unwrap_or_else(FieldKind::text),
    }
}

/// Write `value` into `el` according to `kind`.
///
/// Never fails: a select with no matching option keeps its previous
/// selection, and a radio group with no matching member ends fully
/// unchecked.
pub fn write_field<F: Form>(form: &mut F, el: &F::Element, value: &Value, kind: &FieldKind) {
    match kind {
        FieldKind::SelectOne => write_select(form, el, &text_of(value)),
        FieldKind::Radio => write_radio(form, el, value),
        FieldKind::Checkbox => form.set_checked(el, is_truthy(value)),
        FieldKind::Textarea => {
            let text = match value {
                Value::Array(lines) => lines.iter().map(text_of).collect::<Vec<_>>().join("\n"),
                other => text_of(other),
            };
            form.set_value(el, &text);
        }
        FieldKind::Other(_) => form.set_value(el, &text_of(value)),
    }
}

fn write_select<F: Form>(form: &mut F, el: &F::Element, wanted: &str) {
    let options = form.options(el);
    let index = options
        .iter()
        .position(|o| o.value == wanted)
        .or_else(|| {
            options
                .iter()
                .position(|o| o.text == wanted || o.label == wanted)
        });
    if let Some(i) = index {
        form.select_index(el, i);
    }
}

/// Only a JSON string can match a radio value; `5` does not select `"5"`.
/// At most one member ends checked: the first whose value matches.
fn write_radio<F: Form>(form: &mut F, el: &F::Element, value: &Value) {
    let group = match form.name(el) {
        Some(name) if !name.is_empty() => form.radio_group(&name),
        _ => vec![el.clone()],
    };
    let wanted = value.as_str();
    let mut matched = false;
    for radio in &group {
        let checked = !matched && wanted.is_some_and(|w| form.value(radio) == w);
        matched |= checked;
        form.set_checked(radio, checked);
    }
}

// --- tests -------------------------------------------------------------------
