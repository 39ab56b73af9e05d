//! End-to-end tests: a realistic application document and mapping applied
//! to an in-memory employer form.

use sjafill::memory::ElementId;
use sjafill::{
    resolve, resolve_or, Diagnostic, FillConfig, Form, LoadError, Loader, MappingConfig,
    MemoryForm, SelectOption, TextSource,
};

const DOCUMENT: &str = r#"{
    "format_version": "1.3",
    "applicant_info": {
        "name": { "first_name": "Ada", "last_name": "Lovelace" },
        "contact": { "email": "ada@example.com", "phone": "+44 20 7946 0000" },
        "country": "United Kingdom",
        "employment_type": "full-time",
        "willing_to_relocate": true,
        "has_drivers_license": 0
    },
    "summary": ["Mathematician.", "First programmer."],
    "work_experience": [
        { "title": "Analyst", "company": "Babbage & Co", "responsibilities": ["Notes", "Algorithms"] },
        { "title": "Translator", "company": "Taylor's Scientific Memoirs" },
        { "title": "Correspondent", "company": "Royal Society", "current": true }
    ],
    "resume_path": "C:\\Users\\ada\\My Resume.pdf"
}"#;

const MAPPING: &str = r##"{
    "applicant_info.name.first_name": { "selector": "#first-name" },
    "applicant_info.name.last_name": { "selector": "#last-name" },
    "applicant_info.contact.email": { "selector": "#email" },
    "applicant_info.country": { "selector": "#country" },
    "applicant_info.employment_type": { "selector": "input[name=employment]", "fieldType": "radio" },
    "applicant_info.willing_to_relocate": { "selector": "#relocate" },
    "applicant_info.has_drivers_license": { "selector": "#license" },
    "summary": { "selector": "#summary", "fieldType": "textarea" },
    "work_experience": {
        "type": "array",
        "itemContainerPattern": "#job-{index}",
        "addButtonSelector": "#add-job",
        "itemMapping": {
            "title": { "selector": ".title" },
            "company": { "selector": ".company" },
            "responsibilities": { "selector": ".duties", "fieldType": "textarea" },
            "current": { "selector": ".current" }
        }
    },
    "resume_path_info_display": { "selector": "#resume-info" }
}"##;

struct Page {
    form: MemoryForm,
    add_job: ElementId,
}

fn job(form: &mut MemoryForm, parent: ElementId, id: &str) {
    let job = form.element(parent, "div", id);
    for (tag, class) in [("text", "title"), ("text", "company"), ("checkbox", "current")] {
        let el = form.input(job, tag, "");
        form.set_attr(el, "class", class);
    }
    let duties = form.textarea(job, "");
    form.set_attr(duties, "class", "duties");
}

fn page() -> Page {
    let mut form = MemoryForm::new();
    let root = form.root();
    for id in ["first-name", "last-name"] {
        form.input(root, "text", id);
    }
    form.input(root, "email", "email");
    form.select(
        root,
        "country",
        vec![
            SelectOption::new("", "Choose…"),
            SelectOption::new("fr", "France"),
            SelectOption::new("gb", "United Kingdom"),
        ],
    );
    for value in ["full-time", "part-time"] {
        let radio = form.input(root, "radio", &format!("employment-{value}"));
        form.set_attr(radio, "name", "employment");
        form.set_attr(radio, "value", value);
    }
    form.input(root, "checkbox", "relocate");
    form.input(root, "checkbox", "license");
    form.textarea(root, "summary");
    form.element(root, "p", "resume-info");

    let jobs = form.element(root, "div", "jobs");
    job(&mut form, jobs, "job-0");
    let add_job = form.element(root, "button", "add-job");
    let mut next = 1;
    form.on_click(add_job, move |f| {
        let jobs = f.query(None, "#jobs").expect("jobs list");
        job(f, jobs, &format!("job-{next}"));
        next += 1;
    });

    Page { form, add_job }
}

fn mapping() -> MappingConfig {
    MappingConfig::from_json(MAPPING).expect("mapping should parse")
}

#[test]
fn populates_every_field_kind() {
    let Page { mut form, add_job } = page();
    let report = Loader::default()
        .fill_from_text(&mut form, DOCUMENT, &mapping())
        .unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(form.value_of("#first-name"), "Ada");
    assert_eq!(form.value_of("#last-name"), "Lovelace");
    assert_eq!(form.value_of("#email"), "ada@example.com");
    assert_eq!(form.value_of("#country"), "gb");
    assert!(form.checked_of("#employment-full-time"));
    assert!(!form.checked_of("#employment-part-time"));
    assert!(form.checked_of("#relocate"));
    assert!(!form.checked_of("#license"));
    assert_eq!(form.value_of("#summary"), "Mathematician.\nFirst programmer.");

    assert_eq!(form.clicks(add_job), 2);
    assert_eq!(form.value_of("#job-0 .title"), "Analyst");
    assert_eq!(form.value_of("#job-0 .duties"), "Notes\nAlgorithms");
    assert_eq!(form.value_of("#job-1 .company"), "Taylor's Scientific Memoirs");
    assert_eq!(form.value_of("#job-2 .title"), "Correspondent");
    assert!(form.checked_of("#job-2 .current"));
    assert!(!form.checked_of("#job-1 .current"));

    let notice = form.notice_of("#resume-info").expect("resume notice");
    assert!(notice.contains("<strong>My Resume.pdf</strong>"), "{notice}");
}

#[test]
fn repeated_load_is_idempotent() {
    let mut first = page().form;
    let mut second = page().form;
    Loader::default().fill_from_text(&mut first, DOCUMENT, &mapping()).unwrap();
    Loader::default().fill_from_text(&mut second, DOCUMENT, &mapping()).unwrap();
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn version_mismatch_still_populates() {
    let Page { mut form, .. } = page();
    let document = DOCUMENT.replace(r#""format_version": "1.3""#, r#""format_version": "2.0""#);
    let report = Loader::new(FillConfig::expecting("1.3"))
        .fill_from_text(&mut form, &document, &mapping())
        .unwrap();

    assert_eq!(
        report.diagnostics,
        [Diagnostic::VersionMismatch {
            expected: "1.3".into(),
            found: Some("2.0".into()),
        }]
    );
    assert_eq!(report.fields_written, 20);
    assert_eq!(form.value_of("#first-name"), "Ada");
    assert_eq!(form.value_of("#job-2 .title"), "Correspondent");
}

#[test]
fn injected_version_allows_other_formats() {
    let Page { mut form, .. } = page();
    let document = DOCUMENT.replace(r#""format_version": "1.3""#, r#""format_version": "2.0""#);
    let report = Loader::new(FillConfig::expecting("2.0"))
        .fill_from_text(&mut form, &document, &mapping())
        .unwrap();
    assert!(report.diagnostics.is_empty());
}

#[test]
fn parse_failure_leaves_form_untouched() {
    let Page { mut form, add_job } = page();
    let before = form.snapshot();
    let err = Loader::default()
        .fill_from_text(&mut form, r#"{ "format_version": "1.3", "#, &mapping())
        .unwrap_err();

    assert!(matches!(err, LoadError::ParseFailure(_)));
    assert!(err.to_string().starts_with("parse error: "));
    assert_eq!(form.snapshot(), before);
    assert_eq!(form.clicks(add_job), 0);
}

#[test]
fn unix_resume_path() {
    let Page { mut form, .. } = page();
    let document = DOCUMENT.replace(r#"C:\\Users\\ada\\My Resume.pdf"#, "/home/a/cv.pdf");
    Loader::default().fill_from_text(&mut form, &document, &mapping()).unwrap();
    let notice = form.notice_of("#resume-info").unwrap();
    assert!(notice.contains("<strong>cv.pdf</strong>"), "{notice}");
}

#[test]
fn resolve_properties() {
    let doc: serde_json::Value = serde_json::from_str(DOCUMENT).unwrap();
    let default = serde_json::json!("default");

    assert_eq!(
        resolve(&doc, "applicant_info.willing_to_relocate"),
        Some(&serde_json::json!(true))
    );
    assert_eq!(
        resolve(&doc, "applicant_info.has_drivers_license"),
        Some(&serde_json::json!(0))
    );
    assert!(resolve(&doc, "work_experience").is_some_and(|v| v.is_array()));
    assert!(resolve(&doc, "applicant_info.contact").is_some_and(|v| v.is_object()));

    for absent in [
        "applicant_info.middle_name",
        "applicant_info.name.first_name.initial",
        "summary.text",
        "",
    ] {
        assert_eq!(resolve_or(&doc, absent, &default), &default, "{absent}");
    }
}

#[tokio::test]
async fn async_load_reports_missing_input() {
    let Page { mut form, .. } = page();
    let before = form.snapshot();
    let result = Loader::default()
        .load_and_fill_form(&TextSource::default(), &mut form, &mapping())
        .await;
    assert_eq!(result, Err(LoadError::InputMissing));
    assert_eq!(form.snapshot(), before);
}

#[tokio::test]
async fn async_load_fills_form() {
    let Page { mut form, .. } = page();
    let report = Loader::default()
        .load_and_fill_form(&TextSource::new(DOCUMENT), &mut form, &mapping())
        .await
        .unwrap();
    assert_eq!(report.fields_written, 20);
    assert_eq!(form.value_of("#job-1 .title"), "Translator");
}
