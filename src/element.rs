use std::sync::Arc;

use chromiumoxide::element::Element as CrElement;
use serde::Deserialize;

use crate::dom::{DomEvent, NodeState};
use crate::error::{Error, Result};

/// Builds and dispatches one synthetic event on `this`. `__EVENT__` is
/// replaced by a JSON description of the event.
const DISPATCH_JS: &str = r#"
function() {
    if (!this.isConnected) return JSON.stringify({ stale: true });
    const ev = __EVENT__;
    const init = { bubbles: true, cancelable: true, composed: true };
    let event;
    switch (ev.type) {
        case 'focus':
            this.focus();
            event = new FocusEvent('focusin', init);
            break;
        case 'blur':
            this.blur();
            event = new FocusEvent('focusout', init);
            break;
        case 'input':
            event = new InputEvent('input', { ...init, data: ev.data, inputType: 'insertText' });
            break;
        case 'change':
            event = new Event('change', init);
            break;
        case 'keydown':
        case 'keyup':
            event = new KeyboardEvent(ev.type, {
                ...init, key: ev.key, code: ev.key, keyCode: ev.keyCode, which: ev.keyCode,
            });
            break;
        case 'pointerdown':
        case 'pointerup':
            event = new PointerEvent(ev.type, { ...init, view: window, isPrimary: true });
            break;
        default:
            event = new MouseEvent(ev.type, { ...init, view: window, button: 0 });
    }
    this.dispatchEvent(event);
    return JSON.stringify({ stale: false });
}
"#;

/// Writes `value` through the prototype's native setter so frameworks that
/// shadow the instance property still see the raw change on the next event.
const SET_VALUE_JS: &str = r#"
function() {
    if (!this.isConnected) return JSON.stringify({ stale: true });
    const value = __VALUE__;
    const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value');
    if (desc && desc.set) desc.set.call(this, value); else this.value = value;
    return JSON.stringify({ stale: false });
}
"#;

const STATE_JS: &str = r#"
function() {
    if (!this.isConnected) return JSON.stringify({ stale: true });
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return JSON.stringify({
        stale: false,
        value: {
            value: typeof this.value === 'string' ? this.value : '',
            checked: !!this.checked,
            disabled: !!this.disabled || this.getAttribute('aria-disabled') === 'true',
            visible: style.display !== 'none' && style.visibility !== 'hidden'
                && (rect.width > 0 || rect.height > 0),
        },
    });
}
"#;

#[derive(Deserialize)]
struct Reply<T> {
    stale: bool,
    value: Option<T>,
}

/// Cheaply clonable handle to a node in a Chromium page.
#[derive(Clone, Debug)]
pub struct Element {
    inner: Arc<CrElement>,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns a reference to the underlying chromiumoxide Element.
    pub fn inner(&self) -> &CrElement {
        &self.inner
    }

    /// Run `function` with `this` bound to the element. The function must
    /// return a JSON string shaped like [`Reply`].
    async fn call<T: for<'de> Deserialize<'de>>(&self, function: String) -> Result<Option<T>> {
        let returns = self.inner.call_js_fn(function, false).await?;
        if let Some(details) = returns.exception_details {
            return Err(Error::JsError(details.text));
        }
        let raw = returns
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| Error::JsError("element script returned no value".into()))?;
        let reply: Reply<T> =
            serde_json::from_str(&raw).map_err(|e| Error::JsError(e.to_string()))?;
        if reply.stale {
            return Err(Error::StaleElement);
        }
        Ok(reply.value)
    }

    pub async fn state(&self) -> Result<NodeState> {
        self.call::<NodeState>(STATE_JS.to_string())
            .await?
            .ok_or_else(|| Error::JsError("missing element state".into()))
    }

    /// Rendered text of this element, trimmed.
    pub async fn text(&self) -> Result<String> {
        let js = r#"function() {
            if (!this.isConnected) return JSON.stringify({ stale: true });
            return JSON.stringify({ stale: false, value: (this.innerText || this.textContent || '').trim() });
        }"#;
        Ok(self.call::<String>(js.to_string()).await?.unwrap_or_default())
    }

    /// Get the value of an attribute on this element.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let name_js = serde_json::to_string(name).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"function() {{
                if (!this.isConnected) return JSON.stringify({{ stale: true }});
                return JSON.stringify({{ stale: false, value: this.getAttribute({name_js}) }});
            }}"#,
        );
        self.call::<String>(js).await
    }

    pub async fn set_value(&self, value: &str) -> Result<()> {
        let value_js = serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))?;
        self.call::<serde_json::Value>(SET_VALUE_JS.replace("__VALUE__", &value_js))
            .await?;
        Ok(())
    }

    pub async fn dispatch(&self, event: &DomEvent) -> Result<()> {
        let (key, key_code) = match event {
            DomEvent::KeyDown(k) | DomEvent::KeyUp(k) => (Some(k.name()), Some(k.key_code())),
            _ => (None, None),
        };
        let data = match event {
            DomEvent::Input { data } => data.as_deref(),
            _ => None,
        };
        let payload = serde_json::json!({
            "type": event.event_type(),
            "data": data,
            "key": key,
            "keyCode": key_code,
        });
        self.call::<serde_json::Value>(DISPATCH_JS.replace("__EVENT__", &payload.to_string()))
            .await?;
        Ok(())
    }
}
