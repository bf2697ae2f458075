//! Searchable select widgets, driven as an explicit state machine.
//!
//! Every run starts by pressing `Escape` so a panel left open by the
//! previous field is closed before this one opens; the host allows only one
//! open panel and stacked opens break keyboard focus.

use std::time::Duration;

use tracing::{debug, warn};

use super::{Failure, Selection, SelectionHook, StepResult};
use crate::config::FillConfig;
use crate::dom::{Document, Key, NodeState};
use crate::error::Error;
use crate::field::{FailureReason, FieldSpec};
use crate::input::InputDriver;
use crate::matcher::{best_match, MatchTier};
use crate::wait::{try_wait_until, wait};

/// Phases of one dropdown fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownState<N> {
    Idle,
    Opening,
    Typing,
    AwaitingOptions,
    /// Options rendered, in document order, with their labels.
    Selecting(Vec<(N, String)>),
    Done(String),
    FailedNoMatch(Vec<String>),
    FailedNoOptions,
}

pub(crate) struct DropdownFill<'a, D: Document> {
    doc: &'a D,
    driver: InputDriver<'a, D>,
    config: &'a FillConfig,
    hook: Option<&'a dyn SelectionHook>,
    spec: &'a FieldSpec,
    query: String,
}

impl<'a, D: Document> DropdownFill<'a, D> {
    pub(crate) fn new(
        doc: &'a D,
        driver: InputDriver<'a, D>,
        config: &'a FillConfig,
        hook: Option<&'a dyn SelectionHook>,
        spec: &'a FieldSpec,
    ) -> Self {
        Self {
            doc,
            driver,
            config,
            hook,
            spec,
            query: spec.value.to_string(),
        }
    }

    pub(crate) async fn run(self) -> StepResult {
        let mut state = DropdownState::Idle;
        loop {
            debug!(state = state_name(&state), "dropdown");
            state = match state {
                DropdownState::Idle => self.close_stray_panel().await?,
                DropdownState::Opening => self.open().await?,
                DropdownState::Typing => self.type_query().await?,
                DropdownState::AwaitingOptions => self.await_options().await?,
                DropdownState::Selecting(options) => self.select(options).await?,
                DropdownState::Done(label) => return Ok(Some(label)),
                DropdownState::FailedNoMatch(labels) => {
                    return Err(Failure {
                        reason: FailureReason::NoMatchingOption,
                        attempted_labels: labels,
                    });
                }
                DropdownState::FailedNoOptions => {
                    return Err(FailureReason::DropdownDidNotOpen.into());
                }
            };
        }
    }

    /// The select's input as currently rendered.
    async fn input(&self) -> Result<D::Node, Error> {
        self.driver.locate(&self.spec.selector).await
    }

    async fn close_stray_panel(&self) -> Result<DropdownState<D::Node>, Failure> {
        let target = match self.doc.focused().await? {
            Some(node) => node,
            None => self.input().await?,
        };
        self.driver.press_key(&target, Key::Escape).await?;
        wait(self.config.escape_settle).await;
        Ok(DropdownState::Opening)
    }

    async fn open(&self) -> Result<DropdownState<D::Node>, Failure> {
        let input = self.input().await?;
        if !self.doc.state(&input).await?.is_interactable() {
            return Err(FailureReason::NotInteractable.into());
        }
        self.driver.focus(&input).await?;
        self.driver.click(&self.input().await?).await?;
        wait(self.config.open_settle).await;
        Ok(DropdownState::Typing)
    }

    async fn type_query(&self) -> Result<DropdownState<D::Node>, Failure> {
        self.driver.clear(&self.input().await?).await?;
        self.driver.type_text(&self.spec.selector, &self.query).await?;
        wait(self.config.search_settle).await;
        Ok(DropdownState::AwaitingOptions)
    }

    async fn await_options(&self) -> Result<DropdownState<D::Node>, Failure> {
        if self.poll_options(self.config.options_timeout).await? {
            return Ok(DropdownState::Selecting(self.rendered_options().await?));
        }
        debug!("no options rendered, pressing ArrowDown");
        self.driver.press_key(&self.input().await?, Key::ArrowDown).await?;
        if self.poll_options(self.config.fallback_timeout).await? {
            Ok(DropdownState::Selecting(self.rendered_options().await?))
        } else {
            warn!(query = %self.query, "option panel never rendered");
            Ok(DropdownState::FailedNoOptions)
        }
    }

    async fn select(
        &self,
        options: Vec<(D::Node, String)>,
    ) -> Result<DropdownState<D::Node>, Failure> {
        if options.is_empty() {
            return Ok(DropdownState::FailedNoOptions);
        }
        let labels: Vec<String> = options.iter().map(|(_, label)| label.clone()).collect();
        let mut pick = best_match(&self.query, &labels)
            .filter(|m| self.spec.fuzzy_match || m.tier == MatchTier::Exact)
            .map(|m| m.index);
        debug!(?labels, ?pick, "matched options");

        if self.spec.pause_for_selection {
            if let Some(hook) = self.hook {
                let proposed = pick.map(|i| labels[i].as_str());
                match hook.review(self.spec, &labels, proposed).await {
                    Selection::Proceed => {}
                    Selection::Choose(label) => {
                        pick = labels.iter().position(|l| *l == label);
                    }
                    Selection::Abandon => {
                        return Err(FailureReason::SelectionAbandoned.into());
                    }
                }
            }
        }

        let Some(index) = pick else {
            return Ok(DropdownState::FailedNoMatch(labels));
        };
        let (node, label) = &options[index];
        self.driver.click(node).await?;
        Ok(DropdownState::Done(label.clone()))
    }

    async fn poll_options(&self, timeout: Duration) -> Result<bool, Error> {
        try_wait_until(
            move || self.has_visible_option(),
            timeout,
            self.config.poll_interval,
        )
        .await
    }

    /// Whether an option is showing. Options that vanish mid-check are
    /// skipped; any other driver fault ends the fill.
    async fn has_visible_option(&self) -> Result<bool, Error> {
        for node in self.doc.query_all(&self.config.option_selector).await? {
            if self.option_state(&node).await?.is_some_and(|state| state.visible) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Visible options and their labels, read from the live page now.
    async fn rendered_options(&self) -> Result<Vec<(D::Node, String)>, Error> {
        let nodes = self.doc.query_all(&self.config.option_selector).await?;
        let mut options = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !self.option_state(&node).await?.is_some_and(|state| state.visible) {
                continue;
            }
            match self.doc.text(&node).await {
                Ok(label) => options.push((node, label)),
                Err(err) if err.is_stale() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(options)
    }

    /// `None` when the option was swapped out while being read.
    async fn option_state(&self, node: &D::Node) -> Result<Option<NodeState>, Error> {
        match self.doc.state(node).await {
            Ok(state) => Ok(Some(state)),
            Err(err) if err.is_stale() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn state_name<N>(state: &DropdownState<N>) -> &'static str {
    match state {
        DropdownState::Idle => "idle",
        DropdownState::Opening => "opening",
        DropdownState::Typing => "typing",
        DropdownState::AwaitingOptions => "awaiting_options",
        DropdownState::Selecting(_) => "selecting",
        DropdownState::Done(_) => "done",
        DropdownState::FailedNoMatch(_) => "failed_no_match",
        DropdownState::FailedNoOptions => "failed_no_options",
    }
}
