use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agentic_form_filler::config::DEFAULT_OPTION_SELECTOR;
use agentic_form_filler::memory::{MemoryNode, PanelTrigger};
use agentic_form_filler::{
    DomEvent, FailureReason, FieldSpec, FieldType, FillConfig, FormFiller, Key, MemoryDocument,
};

fn rerender_once_on(doc: &MemoryDocument, selector: &'static str, event: DomEvent) {
    let fired = Arc::new(AtomicBool::new(false));
    doc.on_event(move |scene, record| {
        if record.target == selector && record.event == event && !fired.swap(true, Ordering::SeqCst)
        {
            scene.rerender(record.node);
        }
    });
}

fn consent_box(doc: &MemoryDocument) {
    doc.add(MemoryNode::new("#consent").attr("type", "checkbox"));
}

fn tick_consent() -> FieldSpec {
    FieldSpec::new("#consent", FieldType::Checkbox, "yes")
}

#[tokio::test]
async fn element_swapped_mid_click_is_retried_once_and_succeeds() {
    let doc = MemoryDocument::new();
    consent_box(&doc);
    rerender_once_on(&doc, "#consent", DomEvent::PointerDown);
    let filler = FormFiller::with_config(doc, FillConfig::instant());

    let outcome = filler.fill(tick_consent()).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.attempts, 2);
    assert!(filler.document().is_checked("#consent"));
}

#[tokio::test]
async fn persistent_staleness_surfaces_after_the_retry() {
    let doc = MemoryDocument::new();
    consent_box(&doc);
    doc.on_event(|scene, record| {
        if record.event == DomEvent::PointerDown {
            scene.rerender(record.node);
        }
    });
    let filler = FormFiller::with_config(doc, FillConfig::instant());

    let outcome = filler.fill(tick_consent()).await;
    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.error, Some(FailureReason::StaleElement));
}

#[tokio::test]
async fn retries_can_be_disabled() {
    let doc = MemoryDocument::new();
    consent_box(&doc);
    rerender_once_on(&doc, "#consent", DomEvent::PointerDown);
    let config = FillConfig::builder().stale_retries(0).build();
    let filler = FormFiller::with_config(doc, config);

    let outcome = filler.fill(tick_consent()).await;
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.error, Some(FailureReason::StaleElement));
}

#[tokio::test(start_paused = true)]
async fn dropdown_input_swapped_on_open_is_typed_into_fresh_copy() {
    let doc = MemoryDocument::new();
    doc.add_dropdown(
        "#village",
        DEFAULT_OPTION_SELECTOR,
        &["Bukoto", "Bugolobi", "Ntinda"],
        PanelTrigger::Click,
    );
    rerender_once_on(&doc, "#village", DomEvent::Click);
    let filler = FormFiller::new(doc);

    let outcome = filler.fill(FieldSpec::dropdown("#village", "bugo")).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.matched_label.as_deref(), Some("Bugolobi"));
    assert_eq!(filler.document().value_of("#village").as_deref(), Some("Bugolobi"));
}

#[tokio::test(start_paused = true)]
async fn dropdown_rerendered_on_every_keystroke_still_selects() {
    let doc = MemoryDocument::new();
    doc.add_dropdown(
        "#village",
        DEFAULT_OPTION_SELECTOR,
        &["Bukoto", "Bugolobi", "Ntinda"],
        PanelTrigger::Click,
    );
    doc.on_event(|scene, record| {
        if record.target == "#village" && matches!(record.event, DomEvent::Input { .. }) {
            scene.rerender(record.node);
        }
    });
    let filler = FormFiller::new(doc);

    let outcome = filler.fill(FieldSpec::dropdown("#village", "bugo")).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.matched_label.as_deref(), Some("Bugolobi"));
    assert_eq!(filler.document().value_of("#village").as_deref(), Some("Bugolobi"));
}

#[tokio::test(start_paused = true)]
async fn input_swapped_by_arrow_down_fallback_is_retried() {
    let doc = MemoryDocument::new();
    doc.add_dropdown("#sex", DEFAULT_OPTION_SELECTOR, &["Male", "Female"], PanelTrigger::ArrowDown);
    rerender_once_on(&doc, "#sex", DomEvent::KeyDown(Key::ArrowDown));
    let filler = FormFiller::new(doc);

    let outcome = filler.fill(FieldSpec::dropdown("#sex", "male")).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.matched_label.as_deref(), Some("Male"));
    let escapes = filler
        .document()
        .events()
        .iter()
        .filter(|r| r.event == DomEvent::KeyDown(Key::Escape))
        .count();
    assert_eq!(escapes, 2);
}

#[tokio::test(start_paused = true)]
async fn no_match_is_not_retried() {
    let doc = MemoryDocument::new();
    doc.add_dropdown("#sex", DEFAULT_OPTION_SELECTOR, &["Male", "Female"], PanelTrigger::Click);
    let filler = FormFiller::new(doc);

    let outcome = filler.fill(FieldSpec::dropdown("#sex", "Unknown")).await;
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.error, Some(FailureReason::NoMatchingOption));
    assert_eq!(outcome.attempted_labels, ["Male", "Female"]);
}

#[tokio::test(start_paused = true)]
async fn batch_is_sequential_and_isolates_failures() {
    let doc = MemoryDocument::new();
    doc.add(MemoryNode::new("#firstName"));
    doc.add_dropdown("#sex", DEFAULT_OPTION_SELECTOR, &["Male", "Female"], PanelTrigger::Click);
    doc.add(MemoryNode::new("#AYes").attr("type", "radio").attr("name", "cough"));
    doc.add(MemoryNode::new("#ANo").attr("type", "radio").attr("name", "cough"));
    let filler = FormFiller::new(doc);

    let specs = vec![
        FieldSpec::text("#firstName", "Amina"),
        FieldSpec::text("#missing", "x"),
        FieldSpec::dropdown("#sex", "female"),
        FieldSpec::radio("#cough", "No").with_options("#AYes", "#ANo"),
    ];
    let outcomes = filler.fill_all(specs, None).await;

    let ok: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
    assert_eq!(ok, [true, false, true, true]);
    assert_eq!(outcomes[1].error, Some(FailureReason::ElementNotFound));
    assert_eq!(outcomes[2].matched_label.as_deref(), Some("Female"));

    let doc = filler.document();
    assert_eq!(doc.value_of("#firstName").as_deref(), Some("Amina"));
    assert_eq!(doc.value_of("#sex").as_deref(), Some("Female"));
    assert!(doc.is_checked("#ANo"));
}

#[tokio::test]
async fn batch_stops_after_failure_budget() {
    let doc = MemoryDocument::new();
    doc.add(MemoryNode::new("#a"));
    let filler = FormFiller::with_config(doc, FillConfig::instant());

    let specs = vec![
        FieldSpec::text("#gone1", "x"),
        FieldSpec::text("#gone2", "x"),
        FieldSpec::text("#a", "never typed"),
    ];
    let outcomes = filler.fill_all(specs, Some(2)).await;
    assert_eq!(outcomes.len(), 2);
    assert!(filler.document().events().is_empty());
}

#[tokio::test]
async fn zero_budget_stops_at_the_first_failure_only() {
    let doc = MemoryDocument::new();
    doc.add(MemoryNode::new("#a"));
    doc.add(MemoryNode::new("#b"));
    let filler = FormFiller::with_config(doc, FillConfig::instant());

    let specs = vec![
        FieldSpec::text("#a", "x"),
        FieldSpec::text("#gone", "x"),
        FieldSpec::text("#b", "never typed"),
    ];
    let outcomes = filler.fill_all(specs, Some(0)).await;
    let ok: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
    assert_eq!(ok, [true, false]);
    assert_eq!(filler.document().value_of("#b").as_deref(), Some(""));
}

#[tokio::test(start_paused = true)]
async fn refilling_correct_values_succeeds_every_time() {
    let doc = MemoryDocument::new();
    doc.add(MemoryNode::new("#phone").value("0772000000"));
    doc.add(MemoryNode::new("#consent").attr("type", "checkbox").checked(true));
    let filler = FormFiller::new(doc);

    let specs = || {
        vec![
            FieldSpec::text("#phone", "0772000000"),
            FieldSpec::new("#consent", FieldType::Checkbox, "yes"),
        ]
    };
    for _ in 0..2 {
        let outcomes = filler.fill_all(specs(), None).await;
        assert!(outcomes.iter().all(|o| o.success));
    }
    assert_eq!(filler.document().value_of("#phone").as_deref(), Some("0772000000"));
    assert!(filler.document().is_checked("#consent"));
}

#[tokio::test]
async fn outcomes_serialize_for_the_caller() {
    let filler = FormFiller::with_config(MemoryDocument::new(), FillConfig::instant());
    let outcome = filler.fill(FieldSpec::text("#gone", "x")).await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["attempts"], 1);
    assert_eq!(json["error"]["kind"], "element_not_found");
    assert_eq!(json["errorReason"], "element not found");
    assert_eq!(json["matchedLabel"], serde_json::Value::Null);
    assert_eq!(json["field"]["fieldType"], "text");
}
