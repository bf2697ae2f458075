//! Synthetic input: raw value writes announced through DOM events.
//!
//! Reactive frameworks keep their own copy of a field's value and drop bulk
//! assignments, so text goes in one character per `input` event. Hosts may
//! also swap the element after any event, so selector-based operations look
//! the element up again right before each interaction.

use std::time::Duration;

use tracing::trace;

use crate::dom::{Document, DomEvent, Key};
use crate::error::{Error, Result};
use crate::wait::wait;

/// Stateless event driver over a [`Document`].
pub struct InputDriver<'a, D: Document> {
    doc: &'a D,
    keystroke_delay: Duration,
}

impl<'a, D: Document> InputDriver<'a, D> {
    pub fn new(doc: &'a D, keystroke_delay: Duration) -> Self {
        Self {
            doc,
            keystroke_delay,
        }
    }

    /// Resolve `selector` again for the next interaction. An element that
    /// was found earlier and is gone now counts as stale.
    pub async fn locate(&self, selector: &str) -> Result<D::Node> {
        self.doc.query(selector).await?.ok_or(Error::StaleElement)
    }

    pub async fn focus(&self, node: &D::Node) -> Result<()> {
        self.doc.dispatch(node, &DomEvent::Focus).await
    }

    pub async fn blur(&self, node: &D::Node) -> Result<()> {
        self.doc.dispatch(node, &DomEvent::Blur).await
    }

    /// Append one character to the current value and announce it.
    pub async fn type_char(&self, node: &D::Node, ch: char) -> Result<()> {
        let mut value = self.doc.state(node).await?.value;
        value.push(ch);
        self.doc.set_value(node, &value).await?;
        self.doc
            .dispatch(
                node,
                &DomEvent::Input {
                    data: Some(ch.to_string()),
                },
            )
            .await
    }

    /// Type `text` left to right into whatever `selector` resolves to at
    /// each keystroke, pausing between keystrokes.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        trace!(chars = text.chars().count(), "typing");
        for (i, ch) in text.chars().enumerate() {
            if i > 0 {
                wait(self.keystroke_delay).await;
            }
            let node = self.locate(selector).await?;
            self.type_char(&node, ch).await?;
        }
        Ok(())
    }

    /// Empty the raw value. No event is sent; the next keystroke carries
    /// the new value to the framework.
    pub async fn clear(&self, node: &D::Node) -> Result<()> {
        self.doc.set_value(node, "").await
    }

    pub async fn press_key(&self, node: &D::Node, key: Key) -> Result<()> {
        self.doc.dispatch(node, &DomEvent::KeyDown(key)).await?;
        self.doc.dispatch(node, &DomEvent::KeyUp(key)).await
    }

    pub async fn click(&self, node: &D::Node) -> Result<()> {
        for event in [
            DomEvent::PointerDown,
            DomEvent::MouseDown,
            DomEvent::PointerUp,
            DomEvent::MouseUp,
            DomEvent::Click,
        ] {
            self.doc.dispatch(node, &event).await?;
        }
        Ok(())
    }

    /// Announce a committed value.
    pub async fn commit(&self, node: &D::Node) -> Result<()> {
        self.doc.dispatch(node, &DomEvent::Change).await
    }
}
