//! In-memory form implementation.
//!
//! [`MemoryForm`] is a small element tree that implements [`Form`] without a
//! browser. Use it for tests and for headless hosts that build a form model
//! themselves.
//!
//! Selectors cover what mapping configurations use in practice: a type
//! selector (`input`, `div`, `*`), `#id`, `.class`, `[attr]`, `[attr=value]`
//! (value bare, single- or double-quoted), any compound of those, and the
//! descendant combinator. Anything else matches nothing.
//!
//! Add-item buttons are modelled with click handlers: closures that receive
//! the form and grow it. A handler registered with
//! [`on_click_deferred`](MemoryForm::on_click_deferred) only runs on the
//! next [`settle`](Form::settle), which mimics a page that renders the new
//! container asynchronously.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::form::{Form, SelectOption};

/// Handle to an element of a [`MemoryForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// Observable state of one element, as returned by [`MemoryForm::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub element: ElementId,
    pub value: String,
    pub checked: bool,
    pub notice: Option<String>,
}

type ClickHandler = Box<dyn FnMut(&mut MemoryForm)>;

struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    value: String,
    checked: bool,
    options: Vec<SelectOption>,
    selected: Option<usize>,
    notice: Option<String>,
}

impl Node {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            parent,
            children: Vec::new(),
            value: String::new(),
            checked: false,
            options: Vec::new(),
            selected: None,
            notice: None,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match name {
            "value" if self.tag == "input" => Some(self.value.as_str()),
            _ => self.attrs.get(name).map(String::as_str),
        }
    }
}

/// A mutable element tree implementing [`Form`].
pub struct MemoryForm {
    nodes: Vec<Node>,
    handlers: HashMap<ElementId, ClickHandler>,
    deferred: HashMap<ElementId, bool>,
    pending: Vec<ElementId>,
    clicks: HashMap<ElementId, usize>,
}

impl Default for MemoryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryForm {
    /// An empty document with a single `<body>` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("body", None)],
            handlers: HashMap::new(),
            deferred: HashMap::new(),
            pending: Vec::new(),
            clicks: HashMap::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    // --- building ------------------------------------------------------------

    /// Append a `<tag>` under `parent`. An empty `id` leaves the element
    /// without an `id` attribute.
    pub fn element(&mut self, parent: ElementId, tag: &str, id: &str) -> ElementId {
        let el = ElementId(self.nodes.len());
        let mut node = Node::new(tag, Some(parent));
        if !id.is_empty() {
            node.attrs.insert("id".into(), id.into());
        }
        self.nodes.push(node);
        self.nodes[parent.0].children.push(el);
        el
    }

    /// Append an `<input type="…">`.
    pub fn input(&mut self, parent: ElementId, input_type: &str, id: &str) -> ElementId {
        let el = self.element(parent, "input", id);
        self.set_attr(el, "type", input_type);
        el
    }

    pub fn textarea(&mut self, parent: ElementId, id: &str) -> ElementId {
        self.element(parent, "textarea", id)
    }

    /// Append a `<select>` with `options`; nothing is selected initially.
    pub fn select(&mut self, parent: ElementId, id: &str, options: Vec<SelectOption>) -> ElementId {
        let el = self.element(parent, "select", id);
        self.nodes[el.0].options = options;
        el
    }

    /// Set an attribute. `value` on an `<input>` sets its current value.
    pub fn set_attr(&mut self, el: ElementId, name: &str, value: &str) {
        let node = &mut self.nodes[el.0];
        if name == "value" && node.tag == "input" {
            node.value = value.to_string();
        } else {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Run `handler` every time `el` is clicked.
    pub fn on_click(&mut self, el: ElementId, handler: impl FnMut(&mut MemoryForm) + 'static) {
        self.handlers.insert(el, Box::new(handler));
        self.deferred.insert(el, false);
    }

    /// Like [`on_click`](Self::on_click), but the handler only runs on the
    /// next [`settle`](Form::settle).
    pub fn on_click_deferred(
        &mut self,
        el: ElementId,
        handler: impl FnMut(&mut MemoryForm) + 'static,
    ) {
        self.handlers.insert(el, Box::new(handler));
        self.deferred.insert(el, true);
    }

    // --- inspecting ----------------------------------------------------------

    /// How many times `el` has been clicked.
    pub fn clicks(&self, el: ElementId) -> usize {
        self.clicks.get(&el).copied().unwrap_or(0)
    }

    /// Current value of the first element matching `selector`, or `""`.
    pub fn value_of(&self, selector: &str) -> String {
        self.query(None, selector)
            .map(|el| self.value(&el))
            .unwrap_or_default()
    }

    /// Checked state of the first element matching `selector`.
    pub fn checked_of(&self, selector: &str) -> bool {
        self.query(None, selector)
            .is_some_and(|el| self.checked(&el))
    }

    /// Notice markup of the first element matching `selector`.
    pub fn notice_of(&self, selector: &str) -> Option<String> {
        self.query(None, selector)
            .and_then(|el| self.nodes[el.0].notice.clone())
    }

    /// State of every element, in creation order.
    pub fn snapshot(&self) -> Vec<FieldState> {
        (0..self.nodes.len())
            .map(ElementId)
            .map(|el| FieldState {
                element: el,
                value: self.value(&el),
                checked: self.nodes[el.0].checked,
                notice: self.nodes[el.0].notice.clone(),
            })
            .collect()
    }

    // --- traversal -----------------------------------------------------------

    /// Descendants of `scope` in document order, excluding `scope` itself.
    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.nodes[el.0].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, el: ElementId, selector: &[Compound]) -> bool {
        let Some((last, ancestors)) = selector.split_last() else {
            return false;
        };
        if !last.matches(&self.nodes[el.0]) {
            return false;
        }
        let mut remaining = ancestors;
        let mut current = self.nodes[el.0].parent;
        while let Some((next, rest)) = remaining.split_last() {
            loop {
                let Some(p) = current else {
                    return false;
                };
                current = self.nodes[p.0].parent;
                if next.matches(&self.nodes[p.0]) {
                    break;
                }
            }
            remaining = rest;
        }
        true
    }

    fn run_handler(&mut self, el: ElementId) {
        if let Some(mut handler) = self.handlers.remove(&el) {
            handler(self);
            self.handlers.entry(el).or_insert(handler);
        }
    }
}

impl Form for MemoryForm {
    type Element = ElementId;

    fn query(&self, scope: Option<&ElementId>, selector: &str) -> Option<ElementId> {
        let Some(parsed) = parse_selector(selector) else {
            tracing::debug!("memory form: unsupported selector {selector:?}");
            return None;
        };
        let scope = scope.copied().unwrap_or(self.root());
        self.descendants(scope)
            .into_iter()
            .find(|el| self.matches(*el, &parsed))
    }

    fn radio_group(&self, name: &str) -> Vec<ElementId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|el| {
                let node = &self.nodes[el.0];
                node.tag == "input" && node.attr("type") == Some("radio") && node.attr("name") == Some(name)
            })
            .collect()
    }

    fn name(&self, el: &ElementId) -> Option<String> {
        self.nodes[el.0].attr("name").map(str::to_string)
    }

    fn input_type(&self, el: &ElementId) -> Option<String> {
        let node = &self.nodes[el.0];
        match node.tag.as_str() {
            "input" => Some(node.attr("type").unwrap_or("text").to_string()),
            "select" => Some("select-one".into()),
            "textarea" => Some("textarea".into()),
            _ => None,
        }
    }

    fn value(&self, el: &ElementId) -> String {
        let node = &self.nodes[el.0];
        match node.tag.as_str() {
            "select" => node
                .selected
                .and_then(|i| node.options.get(i))
                .map(|o| o.value.clone())
                .unwrap_or_default(),
            _ => node.value.clone(),
        }
    }

    fn set_value(&mut self, el: &ElementId, value: &str) {
        let node = &mut self.nodes[el.0];
        if node.tag == "select" {
            node.selected = node.options.iter().position(|o| o.value == value);
        } else {
            node.value = value.to_string();
        }
    }

    fn checked(&self, el: &ElementId) -> bool {
        self.nodes[el.0].checked
    }

    fn set_checked(&mut self, el: &ElementId, checked: bool) {
        self.nodes[el.0].checked = checked;
    }

    fn options(&self, el: &ElementId) -> Vec<SelectOption> {
        self.nodes[el.0].options.clone()
    }

    fn select_index(&mut self, el: &ElementId, index: usize) {
        let node = &mut self.nodes[el.0];
        if index < node.options.len() {
            node.selected = Some(index);
        }
    }

    fn set_notice(&mut self, el: &ElementId, html: &str) {
        self.nodes[el.0].notice = Some(html.to_string());
    }

    fn click(&mut self, el: &ElementId) {
        *self.clicks.entry(*el).or_insert(0) += 1;
        if self.deferred.get(el).copied().unwrap_or(false) {
            self.pending.push(*el);
        } else {
            self.run_handler(*el);
        }
    }

    fn settle(&mut self) {
        for el in std::mem::take(&mut self.pending) {
            self.run_handler(el);
        }
    }
}

// --- selectors ---------------------------------------------------------------

/// One compound selector, e.g. `input.title[name="x"]`.
#[derive(Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != node.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| node.attr("id") != Some(id)) {
            return false;
        }
        let classes = node.attr("class").unwrap_or("");
        if !self
            .classes
            .iter()
            .all(|c| classes.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        self.attrs.iter().all(|(name, wanted)| match (node.attr(name), wanted) {
            (Some(have), Some(wanted)) => have == wanted,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|[a-zA-Z][\w-]*)").expect("invalid tag regex"));

static PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:#([\w-]+)|\.([\w-]+)|\[\s*([\w-]+)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+))\s*)?\])"#,
    )
    .expect("invalid selector part regex")
});

/// Split on whitespace outside `[...]` and quotes.
fn split_descendants(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (i, c) in selector.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&selector[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        parts.push(&selector[s..]);
    }
    parts
}

fn parse_compound(text: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = text;
    if let Some(m) = TAG_RE.find(rest) {
        if m.as_str() != "*" {
            compound.tag = Some(m.as_str().to_ascii_lowercase());
        }
        rest = &rest[m.end()..];
    }
    while !rest.is_empty() {
        let caps = PART_RE.captures(rest)?;
        if let Some(id) = caps.get(1) {
            compound.id = Some(id.as_str().to_string());
        } else if let Some(class) = caps.get(2) {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(name) = caps.get(3) {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .or_else(|| caps.get(6))
                .map(|m| m.as_str().to_string());
            compound.attrs.push((name.as_str().to_string(), value));
        }
        rest = &rest[caps.get(0)?.end()..];
    }
    Some(compound)
}

fn parse_selector(selector: &str) -> Option<Vec<Compound>> {
    let parts = split_descendants(selector);
    if parts.is_empty() {
        return None;
    }
    parts.into_iter().map(parse_compound).collect()
}

// --- tests -------------------------------------------------------------------
