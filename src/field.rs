use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a field is rendered, which picks the fill strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Dropdown,
    Radio,
    Checkbox,
    Searchable,
    Textarea,
}

/// A primitive target value as it arrives from the record mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Collapse the value to a yes/no key.
    ///
    /// `yes`, `y`, `true`, `1` and `on` (any case, trimmed) are truthy;
    /// everything else is `no`.
    pub fn yes_no(&self) -> YesNo {
        let truthy = match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64() == Some(1.0),
            FieldValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "yes" | "y" | "true" | "1" | "on"
            ),
        };
        if truthy {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn key(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

fn fuzzy_by_default() -> bool {
    true
}

/// One field to fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub selector: String,
    pub value: FieldValue,
    pub field_type: FieldType,
    /// When off, only a case-insensitive exact label is accepted.
    #[serde(default = "fuzzy_by_default")]
    pub fuzzy_match: bool,
    #[serde(default)]
    pub pause_for_selection: bool,
    /// For radio pairs rendered as separate elements: `yes`/`no` to the
    /// selector of each option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
}

impl FieldSpec {
    pub fn new(selector: impl Into<String>, field_type: FieldType, value: impl Into<FieldValue>) -> Self {
        Self {
            selector: selector.into(),
            value: value.into(),
            field_type,
            fuzzy_match: true,
            pause_for_selection: false,
            options: None,
        }
    }

    pub fn text(selector: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(selector, FieldType::Text, value)
    }

    pub fn dropdown(selector: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(selector, FieldType::Dropdown, value)
    }

    pub fn radio(selector: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(selector, FieldType::Radio, value)
    }

    /// Attach the per-option selectors of a radio pair.
    pub fn with_options(mut self, yes: impl Into<String>, no: impl Into<String>) -> Self {
        let mut options = BTreeMap::new();
        options.insert("yes".to_string(), yes.into());
        options.insert("no".to_string(), no.into());
        self.options = Some(options);
        self
    }

    pub fn exact(mut self) -> Self {
        self.fuzzy_match = false;
        self
    }

    pub fn pause_for_selection(mut self, pause: bool) -> Self {
        self.pause_for_selection = pause;
        self
    }
}

/// Why a field was not filled.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("element not found")]
    ElementNotFound,

    #[error("not interactable")]
    NotInteractable,

    #[error("dropdown did not open")]
    DropdownDidNotOpen,

    #[error("no matching option")]
    NoMatchingOption,

    #[error("no matching radio option")]
    NoMatchingRadioOption,

    #[error("radio options must have exactly the keys yes and no")]
    InvalidRadioOptions,

    #[error("element went stale")]
    StaleElement,

    #[error("selection abandoned by operator")]
    SelectionAbandoned,

    #[error("driver error: {message}")]
    Driver { message: String },
}

impl From<crate::error::Error> for FailureReason {
    fn from(err: crate::error::Error) -> Self {
        match err {
            crate::error::Error::StaleElement => FailureReason::StaleElement,
            crate::error::Error::ElementNotFound(_) => FailureReason::ElementNotFound,
            other => FailureReason::Driver {
                message: other.to_string(),
            },
        }
    }
}

/// The result of one field fill. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub field: FieldSpec,
    pub success: bool,
    pub matched_label: Option<String>,
    pub attempts: u32,
    pub error: Option<FailureReason>,
    /// `error` as a human-readable string, for callers that only log it.
    pub error_reason: Option<String>,
    /// Labels that were on screen when no option matched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_labels: Vec<String>,
}

impl FillOutcome {
    pub(crate) fn succeeded(field: FieldSpec, matched_label: Option<String>, attempts: u32) -> Self {
        Self {
            field,
            success: true,
            matched_label,
            attempts,
            error: None,
            error_reason: None,
            attempted_labels: Vec::new(),
        }
    }

    pub(crate) fn failed(field: FieldSpec, reason: FailureReason, attempts: u32) -> Self {
        Self {
            field,
            success: false,
            matched_label: None,
            attempts,
            error_reason: Some(reason.to_string()),
            error: Some(reason),
            attempted_labels: Vec::new(),
        }
    }
}
