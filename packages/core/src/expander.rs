//! Repeated sections: one form container per document array item.
//!
//! For the item at `index` the container selector is the rule's pattern
//! with `{index}` substituted. When no such container exists yet and
//! `index > 0`, the section's add button is clicked once and the container
//! is looked up again. Index 0 may instead fall back to a statically
//! rendered first-item container.
//!
//! The add button is assumed to build the new container before `click`
//! returns. Hosts that render it later can implement
//! [`Form::settle`] and raise
//! [`FillConfig::container_retries`]; otherwise the item is reported as
//! [`Diagnostic::ContainerUnavailable`] and skipped.

use serde_json::Value;

use crate::config::FillConfig;
use crate::document::{resolve_or, EMPTY};
use crate::error::{record, Diagnostic};
use crate::form::Form;
use crate::mapping::ArrayRule;
use crate::writer::{resolve_kind, write_field};

/// Populate one container per item of `items`, in order.
///
/// Item fields are resolved against the item record itself and located
/// inside the item's container. Returns the number of fields written.
pub fn expand_section<F: Form>(
    form: &mut F,
    path: &str,
    items: &[Value],
    rule: &ArrayRule,
    config: &FillConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> usize {
    let mut written = 0;
    for (index, item) in items.iter().enumerate() {
        let selector = rule.container_selector(index);
        let Some(container) = find_container(form, path, index, &selector, rule, config, diagnostics)
        else {
            record(
                diagnostics,
                Diagnostic::ContainerUnavailable {
                    path: path.to_string(),
                    index,
                    selector,
                },
            );
            continue;
        };

        for (key, field) in &rule.item_mapping {
            let Some(el) = form.query(Some(&container), &field.selector) else {
                record(
                    diagnostics,
                    Diagnostic::TargetNotFound {
                        path: format!("{path}.{index}.{key}"),
                        selector: field.selector.clone(),
                        container: Some(selector.clone()),
                    },
                );
                continue;
            };
            let value = resolve_or(item, key, &EMPTY);
            let kind = resolve_kind(form, &el, field.field_type.as_ref());
            write_field(form, &el, value, &kind);
            written += 1;
        }
    }
    written
}

fn find_container<F: Form>(
    form: &mut F,
    path: &str,
    index: usize,
    selector: &str,
    rule: &ArrayRule,
    config: &FillConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<F::Element> {
    if let Some(found) = form.query(None, selector) {
        return Some(found);
    }

    if index > 0 {
        if let Some(add_selector) = &rule.add_button_selector {
            match form.query(None, add_selector) {
                Some(button) => {
                    tracing::debug!("clicking {add_selector:?} for item {index} of {path:?}");
                    form.click(&button);
                    if let Some(found) = form.query(None, selector) {
                        return Some(found);
                    }
                    for _ in 0..config.container_retries {
                        form.settle();
                        if let Some(found) = form.query(None, selector) {
                            return Some(found);
                        }
                    }
                }
                None => record(
                    diagnostics,
                    Diagnostic::TargetNotFound {
                        path: path.to_string(),
                        selector: add_selector.clone(),
                        container: None,
                    },
                ),
            }
        }
    }

    if index == 0 {
        if let Some(first) = &rule.first_item_container_selector {
            return form.query(None, first);
        }
    }
    None
}

// --- tests -------------------------------------------------------------------
