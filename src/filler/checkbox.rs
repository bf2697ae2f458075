use tracing::debug;

use super::StepResult;
use crate::dom::Document;
use crate::field::{FailureReason, FieldValue, YesNo};
use crate::input::InputDriver;

/// Bring the checkbox to the value's yes/no state, clicking only if it
/// differs.
pub(crate) async fn fill<D: Document>(
    doc: &D,
    driver: &InputDriver<'_, D>,
    selector: &str,
    value: &FieldValue,
) -> StepResult {
    let state = doc.state(&driver.locate(selector).await?).await?;
    if !state.is_interactable() {
        return Err(FailureReason::NotInteractable.into());
    }
    let want = value.yes_no();
    if state.checked != (want == YesNo::Yes) {
        driver.click(&driver.locate(selector).await?).await?;
    } else {
        debug!("checkbox already in place");
    }
    Ok(Some(want.key().to_string()))
}
