//! A deterministic in-memory [`Document`].
//!
//! Nodes are registered with the exact selector strings that should find
//! them; there is no CSS engine. Host behaviour (opening a select panel,
//! re-rendering a field) is scripted with listeners that run after each
//! dispatched event, and every event is kept in a log.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::dom::{Document, DomEvent, Key, NodeState};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A node blueprint, also the stored node.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    selectors: Vec<String>,
    text: String,
    attributes: HashMap<String, String>,
    state: NodeState,
    attached: bool,
}

impl MemoryNode {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selectors: vec![selector.into()],
            text: String::new(),
            attributes: HashMap::new(),
            state: NodeState {
                visible: true,
                ..NodeState::default()
            },
            attached: true,
        }
    }

    /// Another selector that resolves to this node.
    pub fn also(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.state.value = value.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.state.checked = checked;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.state.disabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.state.visible = false;
        self
    }

    pub fn selector(&self) -> &str {
        self.selectors.first().map(String::as_str).unwrap_or_default()
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    fn matches(&self, selector: &str) -> bool {
        self.attached && self.selectors.iter().any(|s| s == selector)
    }
}

/// One dispatched event as seen by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub node: NodeId,
    /// The node's primary selector.
    pub target: String,
    pub event: DomEvent,
}

/// The mutable page contents listeners operate on.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<MemoryNode>,
    focused: Option<NodeId>,
}

impl Scene {
    pub fn add(&mut self, node: MemoryNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, selector: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.matches(selector)).map(NodeId)
    }

    pub fn find_all(&self, selector: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.matches(selector))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Drop a node from the tree; old handles to it turn stale.
    pub fn detach(&mut self, id: NodeId) {
        self.nodes[id.0].attached = false;
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Replace a node with a fresh copy under the same selectors, the way a
    /// virtual-DOM re-render swaps elements.
    pub fn rerender(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.nodes[id.0].clone();
        copy.attached = true;
        self.detach(id);
        self.add(copy)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.0].state.visible = visible;
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.nodes[id.0].state.value = value.into();
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        self.nodes[id.0].state.disabled = disabled;
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn apply_default_action(&mut self, id: NodeId, event: &DomEvent) {
        match event {
            DomEvent::Focus => self.focused = Some(id),
            DomEvent::Blur if self.focused == Some(id) => self.focused = None,
            DomEvent::Click => {
                let node = &self.nodes[id.0];
                match node.attributes.get("type").map(String::as_str) {
                    Some("checkbox") => {
                        let checked = !node.state.checked;
                        self.nodes[id.0].state.checked = checked;
                    }
                    Some("radio") => {
                        let group = node.attributes.get("name").cloned();
                        if let Some(group) = group {
                            for other in self.nodes.iter_mut() {
                                if other.attributes.get("name") == Some(&group) {
                                    other.state.checked = false;
                                }
                            }
                        }
                        self.nodes[id.0].state.checked = true;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

type Listener = Box<dyn FnMut(&mut Scene, &EventRecord) + Send>;

struct Inner {
    scene: Scene,
    listeners: Vec<Listener>,
    log: Vec<EventRecord>,
}

/// When a scripted select widget shows its option panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTrigger {
    /// Clicking the input opens it.
    Click,
    /// Only an `ArrowDown` keypress on the input opens it.
    ArrowDown,
    /// It never opens.
    Never,
}

/// Handles to a scripted select widget.
#[derive(Debug, Clone)]
pub struct DropdownNodes {
    pub input: NodeId,
    pub options: Vec<NodeId>,
}

pub struct MemoryDocument {
    inner: Mutex<Inner>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                scene: Scene::default(),
                listeners: Vec::new(),
                log: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, node: MemoryNode) -> NodeId {
        self.lock().scene.add(node)
    }

    /// Run `f` after every dispatched event, after the default action.
    pub fn on_event<F>(&self, f: F)
    where
        F: FnMut(&mut Scene, &EventRecord) + Send + 'static,
    {
        self.lock().listeners.push(Box::new(f));
    }

    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        f(&mut self.lock().scene)
    }

    pub fn node(&self, id: NodeId) -> MemoryNode {
        self.lock().scene.node(id).clone()
    }

    /// Current value of the first attached node matching `selector`.
    pub fn value_of(&self, selector: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .scene
            .find(selector)
            .map(|id| inner.scene.node(id).state.value.clone())
    }

    pub fn is_checked(&self, selector: &str) -> bool {
        let inner = self.lock();
        inner
            .scene
            .find(selector)
            .is_some_and(|id| inner.scene.node(id).state.checked)
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().log.clone()
    }

    pub fn clear_events(&self) {
        self.lock().log.clear();
    }

    /// A searchable select: an input plus hidden `option_selector` nodes.
    ///
    /// All options show while the panel is open. `Escape` anywhere closes
    /// it; clicking an option writes its label into the input and closes it.
    pub fn add_dropdown(
        &self,
        input_selector: &str,
        option_selector: &str,
        labels: &[&str],
        trigger: PanelTrigger,
    ) -> DropdownNodes {
        let mut inner = self.lock();
        let input = inner.scene.add(MemoryNode::new(input_selector));
        let options: Vec<NodeId> = labels
            .iter()
            .map(|label| {
                inner.scene.add(
                    MemoryNode::new(option_selector)
                        .text(*label)
                        .attr("role", "option")
                        .hidden(),
                )
            })
            .collect();

        let panel = options.clone();
        let mut open = false;
        let input_key = inner.scene.node(input).selector().to_string();
        inner.listeners.push(Box::new(move |scene: &mut Scene, record: &EventRecord| {
            let on_input = record.target == input_key;
            match &record.event {
                DomEvent::KeyDown(Key::Escape) => open = false,
                DomEvent::Click if on_input && trigger == PanelTrigger::Click => open = true,
                DomEvent::KeyDown(Key::ArrowDown)
                    if on_input && trigger != PanelTrigger::Never =>
                {
                    open = true
                }
                DomEvent::Click if open && panel.contains(&record.node) => {
                    let label = scene.node(record.node).text.clone();
                    if let Some(id) = scene.find(&input_key) {
                        scene.set_value(id, label);
                    }
                    open = false;
                }
                _ => {}
            }
            for &id in &panel {
                scene.set_visible(id, open);
            }
        }));

        DropdownNodes { input, options }
    }
}

impl Inner {
    fn live(&self, id: NodeId) -> Result<&MemoryNode> {
        let node = self.scene.node(id);
        if node.attached {
            Ok(node)
        } else {
            Err(Error::StaleElement)
        }
    }
}

#[async_trait]
impl Document for MemoryDocument {
    type Node = NodeId;

    async fn query(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.lock().scene.find(selector))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(self.lock().scene.find_all(selector))
    }

    async fn focused(&self) -> Result<Option<NodeId>> {
        Ok(self.lock().scene.focused)
    }

    async fn state(&self, node: &NodeId) -> Result<NodeState> {
        Ok(self.lock().live(*node)?.state.clone())
    }

    async fn text(&self, node: &NodeId) -> Result<String> {
        Ok(self.lock().live(*node)?.text.trim().to_string())
    }

    async fn attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.lock().live(*node)?.attributes.get(name).cloned())
    }

    async fn set_value(&self, node: &NodeId, value: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.live(*node)?;
        inner.scene.set_value(*node, value);
        Ok(())
    }

    async fn dispatch(&self, node: &NodeId, event: &DomEvent) -> Result<()> {
        let mut guard = self.lock();
        let target = guard.live(*node)?.selector().to_string();
        let record = EventRecord {
            node: *node,
            target,
            event: event.clone(),
        };
        let Inner {
            scene,
            listeners,
            log,
        } = &mut *guard;
        scene.apply_default_action(*node, event);
        log.push(record.clone());
        for listener in listeners.iter_mut() {
            listener(scene, &record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_nodes_are_stale() {
        let doc = MemoryDocument::new();
        let id = doc.add(MemoryNode::new("#name"));
        let fresh = doc.with_scene(|scene| scene.rerender(id));
        assert!(doc.state(&id).await.unwrap_err().is_stale());
        assert_eq!(doc.query("#name").await.unwrap(), Some(fresh));
    }

    #[tokio::test]
    async fn radio_click_unchecks_group() {
        let doc = MemoryDocument::new();
        let yes = doc.add(
            MemoryNode::new("#yes")
                .attr("type", "radio")
                .attr("name", "a")
                .checked(true),
        );
        let no = doc.add(MemoryNode::new("#no").attr("type", "radio").attr("name", "a"));
        doc.dispatch(&no, &DomEvent::Click).await.unwrap();
        assert!(!doc.node(yes).state().checked);
        assert!(doc.node(no).state().checked);
    }

    #[tokio::test]
    async fn dropdown_opens_on_click_and_closes_on_escape() {
        let doc = MemoryDocument::new();
        let dd = doc.add_dropdown("#sex", "[role='option']", &["Male", "Female"], PanelTrigger::Click);
        doc.dispatch(&dd.input, &DomEvent::Click).await.unwrap();
        assert!(dd.options.iter().all(|id| doc.node(*id).state().visible));
        doc.dispatch(&dd.input, &DomEvent::KeyDown(Key::Escape))
            .await
            .unwrap();
        assert!(dd.options.iter().all(|id| !doc.node(*id).state().visible));
    }
}
