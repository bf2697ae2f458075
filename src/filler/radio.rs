//! Yes/no radio pairs.

use std::collections::BTreeMap;

use tracing::debug;

use super::StepResult;
use crate::dom::Document;
use crate::field::{FailureReason, FieldValue};
use crate::input::InputDriver;

/// Click the option element named in `options` for the value's yes/no key.
/// The field's own selector is not consulted.
pub(crate) async fn fill_with_options<D: Document>(
    doc: &D,
    driver: &InputDriver<'_, D>,
    value: &FieldValue,
    options: &BTreeMap<String, String>,
) -> StepResult {
    if options.len() != 2 || !options.contains_key("yes") || !options.contains_key("no") {
        return Err(FailureReason::InvalidRadioOptions.into());
    }
    let key = value.yes_no().key();
    let selector = &options[key];
    debug!(key, %selector, "radio option");

    let Some(node) = doc.query(selector).await? else {
        return Err(FailureReason::NoMatchingRadioOption.into());
    };
    if !doc.state(&node).await?.is_interactable() {
        return Err(FailureReason::NoMatchingRadioOption.into());
    }
    driver.click(&node).await?;
    Ok(Some(key.to_string()))
}

/// Click the element under `selector` whose `value` attribute is the
/// value's yes/no key.
pub(crate) async fn fill_by_value<D: Document>(
    doc: &D,
    driver: &InputDriver<'_, D>,
    selector: &str,
    value: &FieldValue,
) -> StepResult {
    let key = value.yes_no().key();
    for node in doc.query_all(selector).await? {
        let matches = doc
            .attribute(&node, "value")
            .await?
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(key));
        if matches && doc.state(&node).await?.is_interactable() {
            driver.click(&node).await?;
            return Ok(Some(key.to_string()));
        }
    }
    Err(FailureReason::NoMatchingRadioOption.into())
}

#[cfg(test)]
mod tests {
    use crate::dom::DomEvent;
    use crate::field::{FailureReason, FieldSpec};
    use crate::memory::{MemoryDocument, MemoryNode};
    use crate::{FillConfig, FormFiller};

    fn clicked(doc: &MemoryDocument, target: &str) -> bool {
        doc.events()
            .iter()
            .any(|r| r.target == target && r.event == DomEvent::Click)
    }

    fn pair(doc: &MemoryDocument) {
        doc.add(MemoryNode::new("#AYes").attr("type", "radio").attr("name", "a"));
        doc.add(MemoryNode::new("#ANo").attr("type", "radio").attr("name", "a"));
    }

    #[tokio::test]
    async fn options_path_clicks_only_the_no_element() {
        let doc = MemoryDocument::new();
        pair(&doc);
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let spec = FieldSpec::radio("#unused", "No").with_options("#AYes", "#ANo");
        let outcome = filler.fill(spec).await;
        assert!(outcome.success);
        assert_eq!(outcome.matched_label.as_deref(), Some("no"));
        assert!(clicked(filler.document(), "#ANo"));
        assert!(!clicked(filler.document(), "#AYes"));
        assert!(filler.document().is_checked("#ANo"));
    }

    #[tokio::test]
    async fn truthy_synonyms_pick_yes() {
        let doc = MemoryDocument::new();
        pair(&doc);
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let outcome = filler
            .fill(FieldSpec::radio("#a", true).with_options("#AYes", "#ANo"))
            .await;
        assert_eq!(outcome.matched_label.as_deref(), Some("yes"));
        assert!(filler.document().is_checked("#AYes"));
    }

    #[tokio::test]
    async fn extra_option_keys_are_rejected() {
        let doc = MemoryDocument::new();
        pair(&doc);
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let mut spec = FieldSpec::radio("#a", "yes").with_options("#AYes", "#ANo");
        if let Some(options) = spec.options.as_mut() {
            options.insert("unknown".into(), "#AUnknown".into());
        }
        let outcome = filler.fill(spec).await;
        assert_eq!(outcome.error, Some(FailureReason::InvalidRadioOptions));
        assert!(filler.document().events().is_empty());
    }

    #[tokio::test]
    async fn missing_option_element_is_no_matching_radio_option() {
        let doc = MemoryDocument::new();
        doc.add(MemoryNode::new("#AYes").attr("type", "radio"));
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let outcome = filler
            .fill(FieldSpec::radio("#a", "no").with_options("#AYes", "#ANo"))
            .await;
        assert_eq!(outcome.error, Some(FailureReason::NoMatchingRadioOption));
        assert_eq!(
            outcome.error_reason.as_deref(),
            Some("no matching radio option")
        );
    }

    #[tokio::test]
    async fn group_path_matches_value_attribute() {
        let doc = MemoryDocument::new();
        doc.add(
            MemoryNode::new("input[name='pregnant']")
                .also("#pregnant-yes")
                .attr("type", "radio")
                .attr("name", "pregnant")
                .attr("value", "Yes"),
        );
        doc.add(
            MemoryNode::new("input[name='pregnant']")
                .also("#pregnant-no")
                .attr("type", "radio")
                .attr("name", "pregnant")
                .attr("value", "No"),
        );
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let outcome = filler
            .fill(FieldSpec::radio("input[name='pregnant']", "n"))
            .await;
        assert!(outcome.success);
        assert!(filler.document().is_checked("#pregnant-no"));
        assert!(!filler.document().is_checked("#pregnant-yes"));
    }

    #[tokio::test]
    async fn group_path_skips_disabled_match() {
        let doc = MemoryDocument::new();
        doc.add(
            MemoryNode::new("input[name='q']")
                .attr("type", "radio")
                .attr("value", "yes")
                .disabled(),
        );
        let filler = FormFiller::with_config(doc, FillConfig::instant());

        let outcome = filler.fill(FieldSpec::radio("input[name='q']", "yes")).await;
        assert_eq!(outcome.error, Some(FailureReason::NoMatchingRadioOption));
    }
}
