//! Per-field dispatch and the stale-element retry envelope.

mod checkbox;
mod dropdown;
mod radio;
mod text;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::FillConfig;
use crate::dom::Document;
use crate::error::Error;
use crate::field::{FailureReason, FieldSpec, FieldType, FillOutcome};
use crate::input::InputDriver;

pub use dropdown::DropdownState;

/// What an operator decided when asked to confirm a dropdown selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Commit the proposed label.
    Proceed,
    /// Commit this label instead; it must be one of the rendered labels.
    Choose(String),
    /// Leave the field untouched.
    Abandon,
}

/// Consulted before a dropdown commits, for fields with
/// `pause_for_selection` set.
#[async_trait]
pub trait SelectionHook: Send + Sync {
    async fn review(&self, field: &FieldSpec, labels: &[String], proposed: Option<&str>)
        -> Selection;
}

/// A strategy failure plus whatever diagnostics it gathered.
#[derive(Debug)]
pub(crate) struct Failure {
    pub reason: FailureReason,
    pub attempted_labels: Vec<String>,
}

impl From<FailureReason> for Failure {
    fn from(reason: FailureReason) -> Self {
        Self {
            reason,
            attempted_labels: Vec::new(),
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        FailureReason::from(err).into()
    }
}

pub(crate) type StepResult = std::result::Result<Option<String>, Failure>;

/// Fills fields one at a time against a live document.
pub struct FormFiller<D: Document> {
    doc: D,
    config: FillConfig,
    hook: Option<Box<dyn SelectionHook>>,
}

impl<D: Document> FormFiller<D> {
    pub fn new(doc: D) -> Self {
        Self::with_config(doc, FillConfig::default())
    }

    pub fn with_config(doc: D, config: FillConfig) -> Self {
        Self {
            doc,
            config,
            hook: None,
        }
    }

    /// Install the operator hook used by `pause_for_selection` fields.
    pub fn selection_hook(mut self, hook: impl SelectionHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fill one field. Never fails: every problem lands in the outcome.
    ///
    /// The element is looked up again on each attempt; only a stale element
    /// earns another attempt, up to `stale_retries`.
    #[instrument(skip_all, fields(selector = %spec.selector, field_type = ?spec.field_type))]
    pub async fn fill(&self, spec: FieldSpec) -> FillOutcome {
        let max_attempts = 1 + self.config.stale_retries;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(&spec).await {
                Ok(matched_label) => {
                    info!(attempts, matched = ?matched_label, "field filled");
                    return FillOutcome::succeeded(spec, matched_label, attempts);
                }
                Err(failure)
                    if failure.reason == FailureReason::StaleElement
                        && attempts < max_attempts =>
                {
                    warn!(attempts, "element went stale, retrying");
                }
                Err(failure) => {
                    warn!(attempts, reason = %failure.reason, "field not filled");
                    let mut outcome = FillOutcome::failed(spec, failure.reason, attempts);
                    outcome.attempted_labels = failure.attempted_labels;
                    return outcome;
                }
            }
        }
    }

    /// Fill `specs` in order, one at a time. Stops early once
    /// `stop_after_failures` fields have failed; skipped fields get no outcome.
    /// A budget of zero stops at the first failure.
    pub async fn fill_all<I>(&self, specs: I, stop_after_failures: Option<usize>) -> Vec<FillOutcome>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut outcomes = Vec::new();
        let mut failures = 0;
        for spec in specs {
            let outcome = self.fill(spec).await;
            if !outcome.success {
                failures += 1;
            }
            outcomes.push(outcome);
            if failures > 0 && stop_after_failures.is_some_and(|limit| failures >= limit) {
                warn!(failures, "stopping batch");
                break;
            }
        }
        outcomes
    }

    async fn attempt(&self, spec: &FieldSpec) -> StepResult {
        let driver = InputDriver::new(&self.doc, self.config.keystroke_delay);

        if spec.field_type == FieldType::Radio {
            if let Some(options) = &spec.options {
                return radio::fill_with_options(&self.doc, &driver, &spec.value, options).await;
            }
        }

        if self.doc.query(&spec.selector).await?.is_none() {
            return Err(FailureReason::ElementNotFound.into());
        }

        match spec.field_type {
            FieldType::Text | FieldType::Number | FieldType::Date | FieldType::Textarea => {
                text::fill(&self.doc, &driver, &spec.selector, &spec.value.to_string()).await
            }
            FieldType::Dropdown | FieldType::Searchable => {
                dropdown::DropdownFill::new(&self.doc, driver, &self.config, self.hook.as_deref(), spec)
                    .run()
                    .await
            }
            FieldType::Radio => radio::fill_by_value(&self.doc, &driver, &spec.selector, &spec.value).await,
            FieldType::Checkbox => checkbox::fill(&self.doc, &driver, &spec.selector, &spec.value).await,
        }
    }
}
