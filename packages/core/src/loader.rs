//! Loading an application document and filling a form from it.
//!
//! [`Loader::fill_from_text`] is the whole pipeline for text already in
//! hand: parse, check the declared version, walk the mapping in order, then
//! write the resume notice. [`Loader::load_and_fill_form`] puts an
//! asynchronous [`DocumentSource`] (a file picker, a fetch…) in front of it.
//!
//! Only a missing input, a failed read, or unparseable text fail the load.
//! Everything else is collected in [`LoadReport::diagnostics`] and the load
//! carries on, since a mostly filled form beats an empty one.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::FillConfig;
use crate::document::{is_truthy, resolve, resolve_or, text_of, Document, EMPTY};
use crate::error::{record, Diagnostic, LoadError};
use crate::expander::expand_section;
use crate::form::Form;
use crate::mapping::{FieldRule, MappingConfig};
use crate::writer::{resolve_kind, write_field};

/// Errors a [`DocumentSource`] can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Nothing was selected to read from.
    #[error("no input selected")]
    NoInput,

    #[error("read failed: {0}")]
    Read(String),
}

impl From<SourceError> for LoadError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NoInput => LoadError::InputMissing,
            SourceError::Read(detail) => LoadError::ReadFailure(detail),
        }
    }
}

/// Where the document text comes from.
///
/// Reads are single-threaded and may complete later (a browser `FileReader`
/// for instance), hence `?Send`.
#[async_trait(?Send)]
pub trait DocumentSource {
    async fn read_text(&self) -> Result<String, SourceError>;
}

/// A source whose text is already in memory; `None` models "nothing
/// selected".
#[derive(Debug, Clone, Default)]
pub struct TextSource(pub Option<String>);

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Some(text.into()))
    }
}

#[async_trait(?Send)]
impl DocumentSource for TextSource {
    async fn read_text(&self) -> Result<String, SourceError> {
        self.0.clone().ok_or(SourceError::NoInput)
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    #[serde(skip)]
    pub document: Document,
    /// Problems that were reported and skipped, in the order they happened.
    pub diagnostics: Vec<Diagnostic>,
    pub fields_written: usize,
}

/// Fills forms from application documents.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: FillConfig,
}

impl Loader {
    pub fn new(config: FillConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Read the document from `source`, then [`fill_from_text`](Self::fill_from_text).
    ///
    /// Taking the form by `&mut` rules out a second load into the same form
    /// while this one is still waiting on its read.
    pub async fn load_and_fill_form<F: Form>(
        &self,
        source: &dyn DocumentSource,
        form: &mut F,
        mapping: &MappingConfig,
    ) -> Result<LoadReport, LoadError> {
        let text = source.read_text().await.map_err(|e| {
            tracing::error!("failed to read application file: {e}");
            LoadError::from(e)
        })?;
        self.fill_from_text(form, &text, mapping)
    }

    /// Parse `text` and populate `form` according to `mapping`.
    ///
    /// A parse failure returns before any field is touched.
    pub fn fill_from_text<F: Form>(
        &self,
        form: &mut F,
        text: &str,
        mapping: &MappingConfig,
    ) -> Result<LoadReport, LoadError> {
        let document = Document::parse(text).inspect_err(|e| tracing::error!("{e}"))?;
        tracing::info!("application document loaded; applying {} mapping entries", mapping.len());

        let mut diagnostics = Vec::new();
        self.check_version(&document, &mut diagnostics);

        let mut written = 0;
        for (path, rule) in mapping.iter() {
            if path == self.config.resume_display_key {
                continue;
            }
            written += self.apply_rule(form, &document, path, rule, &mut diagnostics);
        }

        self.show_resume_notice(form, &document, mapping, &mut diagnostics);

        tracing::info!(
            "form populated: {written} fields written, {} problems reported",
            diagnostics.len()
        );
        Ok(LoadReport {
            document,
            diagnostics,
            fields_written: written,
        })
    }

    fn check_version(&self, document: &Document, diagnostics: &mut Vec<Diagnostic>) {
        let found = document.version(&self.config.version_key);
        if found != Some(self.config.expected_version.as_str()) {
            record(
                diagnostics,
                Diagnostic::VersionMismatch {
                    expected: self.config.expected_version.clone(),
                    found: found.map(str::to_string),
                },
            );
        }
    }

    fn apply_rule<F: Form>(
        &self,
        form: &mut F,
        document: &Document,
        path: &str,
        rule: &FieldRule,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> usize {
        let value = resolve_or(document.root(), path, &EMPTY);

        if let FieldRule::Array(array) = rule {
            if let Value::Array(items) = value {
                return expand_section(form, path, items, array, &self.config, diagnostics);
            }
        }

        let (selector, declared) = match rule {
            FieldRule::Scalar(scalar) => (scalar.selector.as_str(), scalar.field_type.as_ref()),
            FieldRule::Array(array) => match &array.selector {
                Some(selector) => (selector.as_str(), None),
                None => {
                    tracing::debug!("no repeated items at {path:?}; section left as is");
                    return 0;
                }
            },
        };

        let Some(el) = form.query(None, selector) else {
            record(
                diagnostics,
                Diagnostic::TargetNotFound {
                    path: path.to_string(),
                    selector: selector.to_string(),
                    container: None,
                },
            );
            return 0;
        };
        let kind = resolve_kind(form, &el, declared);
        write_field(form, &el, value, &kind);
        1
    }

    fn show_resume_notice<F: Form>(
        &self,
        form: &mut F,
        document: &Document,
        mapping: &MappingConfig,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(resume) = resolve(document.root(), &self.config.resume_path_key)
            .filter(|v| is_truthy(v))
            .map(text_of)
        else {
            return;
        };
        let Some(selector) = mapping
            .get(&self.config.resume_display_key)
            .and_then(FieldRule::selector)
        else {
            return;
        };
        let Some(el) = form.query(None, selector) else {
            record(
                diagnostics,
                Diagnostic::TargetNotFound {
                    path: self.config.resume_display_key.clone(),
                    selector: selector.to_string(),
                    container: None,
                },
            );
            return;
        };
        form.set_notice(&el, &resume_notice(resume_file_name(&resume)));
    }
}

/// The last `/`- or `\`-separated segment of `path`.
///
/// ```
/// assert_eq!(sjafill::resume_file_name(r"C:\Users\a\My Resume.pdf"), "My Resume.pdf");
/// assert_eq!(sjafill::resume_file_name("/home/a/cv.pdf"), "cv.pdf");
/// ```
pub fn resume_file_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Markup shown in the resume display target. An empty name shows `N/A`.
pub fn resume_notice(file_name: &str) -> String {
    let name = if file_name.is_empty() { "N/A" } else { file_name };
    format!(
        "Your application file indicates your resume is: <strong>{}</strong>. \
         Please select it for upload.",
        escape_html(name)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryForm;

    fn form() -> MemoryForm {
        let mut form = MemoryForm::new();
        let root = form.root();
        form.input(root, "text", "first-name");
        form.input(root, "email", "email");
        form.element(root, "p", "resume-info");
        form
    }

    fn mapping() -> MappingConfig {
        MappingConfig::new()
            .scalar("applicant_info.name.first_name", "#first-name")
            .scalar("applicant_info.contact.email", "#email")
            .scalar("resume_path_info_display", "#resume-info")
    }

    #[test]
    fn file_name_extraction() {
        assert_eq!(resume_file_name(r"C:\Users\a\My Resume.pdf"), "My Resume.pdf");
        assert_eq!(resume_file_name("/home/a/cv.pdf"), "cv.pdf");
        assert_eq!(resume_file_name("mixed/dir\\cv.docx"), "cv.docx");
        assert_eq!(resume_file_name("cv.pdf"), "cv.pdf");
        assert_eq!(resume_file_name("/home/a/"), "");
    }

    #[test]
    fn notice_escapes_and_defaults() {
        assert!(resume_notice("").contains("<strong>N/A</strong>"));
        assert!(resume_notice("a<b>.pdf").contains("<strong>a&lt;b&gt;.pdf</strong>"));
    }

    #[test]
    fn fills_scalars_and_notice() {
        let mut f = form();
        let report = Loader::default()
            .fill_from_text(
                &mut f,
                r#"{
                    "format_version": "1.3",
                    "applicant_info": {
                        "name": { "first_name": "Grace" },
                        "contact": { "email": "grace@example.com" }
                    },
                    "resume_path": "/home/grace/cv.pdf"
                }"#,
                &mapping(),
            )
            .unwrap();
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.fields_written, 2);
        assert_eq!(f.value_of("#first-name"), "Grace");
        assert_eq!(f.value_of("#email"), "grace@example.com");
        assert!(f.notice_of("#resume-info").unwrap().contains("<strong>cv.pdf</strong>"));
        assert_eq!(f.value_of("#resume-info"), "");
    }

    #[test]
    fn absent_value_writes_empty_string() {
        let mut f = form();
        let first = f.query(None, "#first-name").unwrap();
        f.set_value(&first, "stale");
        Loader::default()
            .fill_from_text(&mut f, r#"{ "format_version": "1.3" }"#, &mapping())
            .unwrap();
        assert_eq!(f.value_of("#first-name"), "");
        assert_eq!(f.notice_of("#resume-info"), None);
    }

    #[test]
    fn missing_version_is_reported() {
        let mut f = form();
        let report = Loader::default()
            .fill_from_text(&mut f, "{}", &mapping())
            .unwrap();
        assert_eq!(
            report.diagnostics,
            [Diagnostic::VersionMismatch {
                expected: "1.3".into(),
                found: None,
            }]
        );
    }

    #[test]
    fn configured_version_key() {
        let mut f = form();
        let loader = Loader::new(FillConfig {
            version_key: "sja_version".into(),
            ..FillConfig::default()
        });
        let report = loader
            .fill_from_text(&mut f, r#"{ "sja_version": "1.3" }"#, &mapping())
            .unwrap();
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn missing_target_is_reported_and_skipped() {
        let mut f = form();
        let mapping = MappingConfig::new()
            .scalar("applicant_info.phone", "#phone")
            .scalar("applicant_info.name.first_name", "#first-name");
        let report = Loader::default()
            .fill_from_text(
                &mut f,
                r#"{ "format_version": "1.3", "applicant_info": { "name": { "first_name": "Linus" } } }"#,
                &mapping,
            )
            .unwrap();
        assert_eq!(f.value_of("#first-name"), "Linus");
        assert_eq!(
            report.diagnostics,
            [Diagnostic::TargetNotFound {
                path: "applicant_info.phone".into(),
                selector: "#phone".into(),
                container: None,
            }]
        );
    }

    #[test]
    fn array_rule_with_scalar_value_uses_selector() {
        let mut f = form();
        let mut rule = crate::mapping::ArrayRule::new("#skill-{index}");
        rule.selector = Some("#first-name".into());
        let mapping = MappingConfig::new().array("skills", rule);
        Loader::default()
            .fill_from_text(&mut f, r#"{ "format_version": "1.3", "skills": "many" }"#, &mapping)
            .unwrap();
        assert_eq!(f.value_of("#first-name"), "many");
    }

    #[test]
    fn array_rule_without_items_is_skipped_quietly() {
        let mut f = form();
        let mapping = MappingConfig::new().array(
            "education",
            crate::mapping::ArrayRule::new("#edu-{index}"),
        );
        let report = Loader::default()
            .fill_from_text(&mut f, r#"{ "format_version": "1.3" }"#, &mapping)
            .unwrap();
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.fields_written, 0);
    }

    #[test]
    fn missing_notice_target_is_reported() {
        let mut f = MemoryForm::new();
        let mapping = MappingConfig::new().scalar("resume_path_info_display", "#nowhere");
        let report = Loader::default()
            .fill_from_text(
                &mut f,
                r#"{ "format_version": "1.3", "resume_path": "cv.pdf" }"#,
                &mapping,
            )
            .unwrap();
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::TargetNotFound { selector, .. }] if selector == "#nowhere"
        ));
    }

    #[test]
    fn falsy_resume_path_shows_no_notice() {
        for resume in ["false", "0", "null", r#""""#] {
            let mut f = form();
            let text = format!(r#"{{ "format_version": "1.3", "resume_path": {resume} }}"#);
            Loader::default().fill_from_text(&mut f, &text, &mapping()).unwrap();
            assert_eq!(f.notice_of("#resume-info"), None, "{resume}");
        }
    }

    #[tokio::test]
    async fn source_errors_map_to_load_errors() {
        let mut f = form();
        let loader = Loader::default();
        let missing = loader
            .load_and_fill_form(&TextSource::default(), &mut f, &mapping())
            .await;
        assert_eq!(missing, Err(LoadError::InputMissing));

        struct Broken;
        #[async_trait(?Send)]
        impl DocumentSource for Broken {
            async fn read_text(&self) -> Result<String, SourceError> {
                Err(SourceError::Read("device removed".into()))
            }
        }
        let broken = loader.load_and_fill_form(&Broken, &mut f, &mapping()).await;
        assert_eq!(broken, Err(LoadError::ReadFailure("device removed".into())));
    }

    #[tokio::test]
    async fn text_source_fills_form() {
        let mut f = form();
        let source = TextSource::new(
            r#"{ "format_version": "1.3", "applicant_info": { "name": { "first_name": "Ada" } } }"#,
        );
        let report = Loader::default()
            .load_and_fill_form(&source, &mut f, &mapping())
            .await
            .unwrap();
        assert_eq!(report.document.version("format_version"), Some("1.3"));
        assert_eq!(f.value_of("#first-name"), "Ada");
    }
}
