//! WebAssembly bindings for the `sjafill` form-population engine.
//!
//! Compile with `wasm-pack build` to produce an npm-ready package. The
//! engine never touches the DOM itself: JavaScript passes a *form host*
//! object implementing [`FormHost`], usually a thin wrapper over
//! `document.querySelector` and friends. Reading the application file (a
//! `FileReader` on an `<input type="file">`) also stays on the JS side.
//!
//! ## Filling a form — [`fill_form`]
//!
//! ```js
//! import init, { fillForm } from './sjafill_wasm.js';
//! await init();
//!
//! const host = {
//!   query: (scope, sel) => (scope ?? document).querySelector(sel),
//!   radioGroup: (name) => [...document.querySelectorAll(`input[type="radio"][name="${name}"]`)],
//!   name: (el) => el.name ?? null,
//!   inputType: (el) => el.type ?? null,
//!   value: (el) => el.value,
//!   setValue: (el, v) => { el.value = v; },
//!   checked: (el) => el.checked,
//!   setChecked: (el, c) => { el.checked = c; },
//!   options: (el) => JSON.stringify([...el.options].map(o => ({ value: o.value, text: o.text, label: o.label }))),
//!   selectIndex: (el, i) => { el.selectedIndex = i; },
//!   setNotice: (el, html) => { el.innerHTML = html; },
//!   click: (el) => el.click(),
//!   // optional: settle: () => flushPendingRender(),
//! };
//!
//! const text = await file.text();
//! try {
//!   const report = JSON.parse(fillForm(text, JSON.stringify(mapping), host));
//!   // report: { diagnostics: [...], fieldsWritten: 17 }
//! } catch (err) {
//!   // "parse error: …" — nothing was written
//! }
//! ```
//!
//! ## Helpers — [`resolve_path`], [`resume_file_name`], [`validate_mapping`], [`expected_version`]

use sjafill::{FillConfig, Form, Loader, MappingConfig, SelectOption};
use wasm_bindgen::prelude::*;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
extern "C" {
    /// The JavaScript object that performs element lookups and writes.
    ///
    /// Element handles are whatever the host returns from `query` (normally
    /// DOM elements); `null` or `undefined` means "not found".
    pub type FormHost;

    #[wasm_bindgen(method)]
    fn query(this: &FormHost, scope: &JsValue, selector: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = radioGroup)]
    fn radio_group(this: &FormHost, name: &str) -> Box<[JsValue]>;

    #[wasm_bindgen(method)]
    fn name(this: &FormHost, el: &JsValue) -> Option<String>;

    #[wasm_bindgen(method, js_name = inputType)]
    fn input_type(this: &FormHost, el: &JsValue) -> Option<String>;

    #[wasm_bindgen(method)]
    fn value(this: &FormHost, el: &JsValue) -> String;

    #[wasm_bindgen(method, js_name = setValue)]
    fn set_value(this: &FormHost, el: &JsValue, value: &str);

    #[wasm_bindgen(method)]
    fn checked(this: &FormHost, el: &JsValue) -> bool;

    #[wasm_bindgen(method, js_name = setChecked)]
    fn set_checked(this: &FormHost, el: &JsValue, checked: bool);

    /// JSON array of `{ value, text, label }`.
    #[wasm_bindgen(method)]
    fn options(this: &FormHost, el: &JsValue) -> String;

    #[wasm_bindgen(method, js_name = selectIndex)]
    fn select_index(this: &FormHost, el: &JsValue, index: u32);

    #[wasm_bindgen(method, js_name = setNotice)]
    fn set_notice(this: &FormHost, el: &JsValue, html: &str);

    #[wasm_bindgen(method)]
    fn click(this: &FormHost, el: &JsValue);

    /// Optional. Called before each extra container lookup that
    /// `containerRetries` allows after an add button was clicked; a host
    /// that renders new containers later flushes that rendering here. A
    /// missing or throwing `settle` is treated as a no-op.
    #[wasm_bindgen(method, catch)]
    fn settle(this: &FormHost) -> Result<(), JsValue>;
}

/// [`Form`] over a JS [`FormHost`].
struct HostForm<'a>(&'a FormHost);

fn present(v: JsValue) -> Option<JsValue> {
    if v.is_null() || v.is_undefined() {
        None
    } else {
        Some(v)
    }
}

impl Form for HostForm<'_> {
    type Element = JsValue;

    fn query(&self, scope: Option<&JsValue>, selector: &str) -> Option<JsValue> {
        let scope = scope.cloned().unwrap_or(JsValue::NULL);
        present(self.0.query(&scope, selector))
    }

    fn radio_group(&self, name: &str) -> Vec<JsValue> {
        self.0.radio_group(name).into_vec()
    }

    fn name(&self, el: &JsValue) -> Option<String> {
        self.0.name(el)
    }

    fn input_type(&self, el: &JsValue) -> Option<String> {
        self.0.input_type(el)
    }

    fn value(&self, el: &JsValue) -> String {
        self.0.value(el)
    }

    fn set_value(&mut self, el: &JsValue, value: &str) {
        self.0.set_value(el, value);
    }

    fn checked(&self, el: &JsValue) -> bool {
        self.0.checked(el)
    }

    fn set_checked(&mut self, el: &JsValue, checked: bool) {
        self.0.set_checked(el, checked);
    }

    fn options(&self, el: &JsValue) -> Vec<SelectOption> {
        serde_json::from_str(&self.0.options(el)).unwrap_or_default()
    }

    fn select_index(&mut self, el: &JsValue, index: usize) {
        self.0.select_index(el, index as u32);
    }

    fn set_notice(&mut self, el: &JsValue, html: &str) {
        self.0.set_notice(el, html);
    }

    fn click(&mut self, el: &JsValue) {
        self.0.click(el);
    }

    fn settle(&mut self) {
        // Hosts without a `settle` method throw a TypeError here.
        let _ = self.0.settle();
    }
}

/// Fill the host's form from an application document.
///
/// `mapping_json` is the employer's mapping configuration. `options` is an
/// optional JSON object overriding [`FillConfig`] fields (camelCase, e.g.
/// `{"expectedVersion": "1.3", "containerRetries": 0}`). `containerRetries`
/// only helps hosts that implement the optional `settle` method.
///
/// Returns the report as a JSON string:
///
/// ```json
/// { "diagnostics": [{ "kind": "target_not_found", "path": "…", "selector": "…", "container": null }],
///   "fieldsWritten": 17 }
/// ```
///
/// Throws a descriptive string when the document, the mapping or the options
/// cannot be parsed. Nothing is written to the form in that case.
#[wasm_bindgen(js_name = fillForm)]
pub fn fill_form(
    json: &str,
    mapping_json: &str,
    host: &FormHost,
    options: Option<String>,
) -> Result<String, JsValue> {
    setup();

    let mapping =
        MappingConfig::from_json(mapping_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = match options {
        Some(opts) => FillConfig::from_json(&opts)
            .map_err(|e| JsValue::from_str(&format!("options parse error: {e}")))?,
        None => FillConfig::default(),
    };

    let mut form = HostForm(host);
    let report = Loader::new(config)
        .fill_from_text(&mut form, json, &mapping)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resolve a dotted `path` in a document and return the value as JSON text.
///
/// Absent paths give `""` (the JSON empty string), matching what
/// [`fill_form`] writes for them.
///
/// ```js
/// resolvePath(doc, 'applicant_info.name.first_name'); // '"Ada"'
/// ```
#[wasm_bindgen(js_name = resolvePath)]
pub fn resolve_path(json: &str, path: &str) -> Result<String, JsValue> {
    setup();
    let document =
        sjafill::Document::parse(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let value = sjafill::resolve_or(document.root(), path, &sjafill::document::EMPTY);
    Ok(value.to_string())
}

/// The file name at the end of a `/`- or `\`-separated path.
#[wasm_bindgen(js_name = resumeFileName)]
pub fn resume_file_name(path: &str) -> String {
    sjafill::resume_file_name(path).to_string()
}

/// Check a mapping configuration without filling anything.
///
/// Returns `undefined` on success. Throws a descriptive string on failure.
#[wasm_bindgen(js_name = validateMapping)]
pub fn validate_mapping(mapping_json: &str) -> Result<(), JsValue> {
    setup();
    MappingConfig::from_json(mapping_json)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The format version [`fill_form`] expects unless `options` override it.
#[wasm_bindgen(js_name = expectedVersion)]
pub fn expected_version() -> String {
    sjafill::DEFAULT_EXPECTED_VERSION.to_string()
}
