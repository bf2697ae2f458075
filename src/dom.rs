use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Named keys the filler presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
}

impl Key {
    /// The `KeyboardEvent.key` value.
    pub fn name(&self) -> &'static str {
        match self {
            Key::Escape => "Escape",
            Key::ArrowDown => "ArrowDown",
            Key::ArrowUp => "ArrowUp",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
        }
    }

    /// The legacy `keyCode`, still read by some select widgets.
    pub fn key_code(&self) -> u32 {
        match self {
            Key::Escape => 27,
            Key::ArrowDown => 40,
            Key::ArrowUp => 38,
            Key::Enter => 13,
            Key::Tab => 9,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single synthesized DOM event.
///
/// Reactive frameworks only reconcile on events, so every value change the
/// engine makes is announced through one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomEvent {
    Focus,
    Blur,
    /// `input` after the raw value changed; `data` is the inserted text.
    Input { data: Option<String> },
    Change,
    KeyDown(Key),
    KeyUp(Key),
    PointerDown,
    MouseDown,
    PointerUp,
    MouseUp,
    Click,
}

impl DomEvent {
    /// The DOM event type string.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomEvent::Focus => "focus",
            DomEvent::Blur => "blur",
            DomEvent::Input { .. } => "input",
            DomEvent::Change => "change",
            DomEvent::KeyDown(_) => "keydown",
            DomEvent::KeyUp(_) => "keyup",
            DomEvent::PointerDown => "pointerdown",
            DomEvent::MouseDown => "mousedown",
            DomEvent::PointerUp => "pointerup",
            DomEvent::MouseUp => "mouseup",
            DomEvent::Click => "click",
        }
    }
}

/// Snapshot of the properties the filler checks before interacting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub visible: bool,
}

impl NodeState {
    pub fn is_interactable(&self) -> bool {
        self.visible && !self.disabled
    }
}

/// A live render tree the engine can query and dispatch events into.
///
/// Node handles are only valid until the host re-renders; every method
/// taking a node returns [`Error::StaleElement`](crate::Error::StaleElement)
/// once it has been detached.
#[async_trait]
pub trait Document: Send + Sync {
    type Node: Clone + fmt::Debug + Send + Sync;

    /// First node matching `selector`, in document order.
    async fn query(&self, selector: &str) -> Result<Option<Self::Node>>;

    /// All nodes matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// The element that currently holds keyboard focus, if any.
    async fn focused(&self) -> Result<Option<Self::Node>>;

    async fn state(&self, node: &Self::Node) -> Result<NodeState>;

    /// Rendered text, whitespace-trimmed.
    async fn text(&self, node: &Self::Node) -> Result<String>;

    async fn attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    /// Assign the raw `value` property without announcing it.
    async fn set_value(&self, node: &Self::Node, value: &str) -> Result<()>;

    async fn dispatch(&self, node: &Self::Node, event: &DomEvent) -> Result<()>;
}
