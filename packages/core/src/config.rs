//! Loader configuration.

use serde::{Deserialize, Serialize};

/// The format version mappings are written against unless told otherwise.
pub const DEFAULT_EXPECTED_VERSION: &str = "1.3";

/// Settings for one [`Loader`](crate::Loader).
///
/// Every field has a default, so `FillConfig::default()` (or `{}` in JSON)
/// is a complete configuration.
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `expected_version` | `1.3` | Format version the mapping was written for |
/// | `version_key` | `format_version` | Top-level document key carrying the version |
/// | `resume_path_key` | `resume_path` | Document path of the resume file reference |
/// | `resume_display_key` | `resume_path_info_display` | Mapping key naming the notice target |
/// | `container_retries` | `0` | Extra container lookups after an add-item click |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillConfig {
    /// A document declaring another version is still loaded; the mismatch is
    /// reported as a warning.
    pub expected_version: String,

    pub version_key: String,

    pub resume_path_key: String,

    /// This mapping entry names the element that receives the resume notice.
    /// It is not a document path and is skipped by the main mapping pass.
    pub resume_display_key: String,

    /// How many more times to look for a repeated-section container after
    /// clicking its add button, calling [`Form::settle`](crate::Form::settle)
    /// before each lookup. `0` means a single immediate re-check.
    pub container_retries: u32,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            expected_version: DEFAULT_EXPECTED_VERSION.into(),
            version_key: "format_version".into(),
            resume_path_key: "resume_path".into(),
            resume_display_key: "resume_path_info_display".into(),
            container_retries: 0,
        }
    }
}

impl FillConfig {
    /// Default settings expecting `version` instead of
    /// [`DEFAULT_EXPECTED_VERSION`].
    pub fn expecting(version: impl Into<String>) -> Self {
        Self {
            expected_version: version.into(),
            ..Self::default()
        }
    }

    /// Parse options from JSON, filling gaps with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
