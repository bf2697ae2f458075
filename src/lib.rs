//! Fill reactive web forms one field at a time through synthetic DOM events.
//!
//! [`FormFiller`] takes [`FieldSpec`]s and drives any [`Document`]: a
//! Chromium [`Page`] for real forms, or a [`MemoryDocument`] for dry runs
//! and tests. Each field yields a [`FillOutcome`]; nothing a single field
//! does can fail the batch.

pub mod browser;
pub mod config;
pub mod dom;
pub mod element;
pub mod error;
pub mod field;
pub mod filler;
pub mod input;
pub mod matcher;
pub mod memory;
pub mod page;
pub mod wait;

pub use browser::FormBrowser;
pub use config::{BrowserConfig, FillConfig};
pub use dom::{Document, DomEvent, Key, NodeState};
pub use error::{Error, Result};
pub use field::{FailureReason, FieldSpec, FieldType, FieldValue, FillOutcome};
pub use filler::{FormFiller, Selection, SelectionHook};
pub use memory::MemoryDocument;
pub use page::Page;
