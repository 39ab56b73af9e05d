//! Populate web forms from Standard Job Application documents.
//!
//! An applicant keeps their application data in one JSON document; an
//! employer publishes a mapping from document paths to the fields of their
//! own form. This crate reads the document and fills the form: plain
//! fields, selects, radio groups, checkboxes, multi-line text, and repeated
//! sections (work history, education…) whose containers are added on
//! demand.
//!
//! It has no I/O of its own. The host supplies the document text (or a
//! [`DocumentSource`]) and a [`Form`] implementation that performs the
//! actual element lookups and writes; `sjafill-wasm` provides one backed by
//! the browser DOM.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`document`] | [`Document`] and dotted-path resolution via [`resolve`] |
//! | [`mapping`] | [`MappingConfig`], [`FieldRule`] and its scalar / array shapes |
//! | [`form`] | The [`Form`] capability trait and [`FieldKind`] |
//! | [`writer`] | Writing one value into one field |
//! | [`expander`] | Repeated sections with on-demand containers |
//! | [`loader`] | [`Loader`]: parse, version check, mapping walk, resume notice |
//! | [`memory`] | [`MemoryForm`], an in-memory [`Form`] |
//! | [`config`] | [`FillConfig`] |
//!
//! # Quick start
//!
//! ```rust
//! use sjafill::{FillConfig, Loader, MappingConfig, MemoryForm};
//!
//! let mut form = MemoryForm::new();
//! let root = form.root();
//! form.input(root, "text", "first-name");
//!
//! let mapping = MappingConfig::new().scalar("applicant_info.name.first_name", "#first-name");
//! let report = Loader::new(FillConfig::default())
//!     .fill_from_text(
//!         &mut form,
//!         r#"{ "format_version": "1.3", "applicant_info": { "name": { "first_name": "Ada" } } }"#,
//!         &mapping,
//!     )
//!     .expect("document should parse");
//!
//! assert!(report.diagnostics.is_empty());
//! assert_eq!(form.value_of("#first-name"), "Ada");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod expander;
pub mod form;
pub mod loader;
pub mod mapping;
pub mod memory;
pub mod writer;

pub use config::{FillConfig, DEFAULT_EXPECTED_VERSION};
pub use document::{resolve, resolve_or, Document};
pub use error::{Diagnostic, LoadError, MappingError};
pub use form::{FieldKind, Form, SelectOption};
pub use loader::{
    resume_file_name, resume_notice, DocumentSource, LoadReport, Loader, SourceError, TextSource,
};
pub use mapping::{ArrayRule, FieldRule, MappingConfig, ScalarRule};
pub use memory::MemoryForm;
