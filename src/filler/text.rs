use tracing::debug;

use super::StepResult;
use crate::dom::Document;
use crate::field::FailureReason;
use crate::input::InputDriver;

/// Replace the field's value by typing `value`, then commit with blur.
///
/// The element is resolved from `selector` before every interaction.
pub(crate) async fn fill<D: Document>(
    doc: &D,
    driver: &InputDriver<'_, D>,
    selector: &str,
    value: &str,
) -> StepResult {
    let node = driver.locate(selector).await?;
    if !doc.state(&node).await?.is_interactable() {
        return Err(FailureReason::NotInteractable.into());
    }
    driver.focus(&node).await?;
    driver.clear(&driver.locate(selector).await?).await?;
    driver.type_text(selector, value).await?;
    driver.commit(&driver.locate(selector).await?).await?;
    driver.blur(&driver.locate(selector).await?).await?;
    debug!(chars = value.chars().count(), "typed value");
    Ok(None)
}
