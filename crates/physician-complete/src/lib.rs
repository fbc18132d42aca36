//! Physician name autocomplete.
//!
//! A [`Widget`] owns the state behind one text input: the typed text, the
//! debounced search against the NPI directory, the suggestion list with its
//! highlighted row, and the "selected" notifications. The host feeds it key
//! and mouse events plus a clock, and renders what it exposes.
//!
//! ```text
//! keystroke ─▶ SearchQuery ─▶ DebounceTimer ─▶ worker thread ─▶ SuggestionStore ─▶ render
//! key/mouse ─▶ navigation ─▶ SuggestionStore ─▶ SelectionNotifier ─▶ "selected"
//! ```

mod client;
pub mod config;
mod error;
pub mod fetcher;
mod input;
mod navigation;
mod notifier;
mod query;
mod store;
mod types;
mod widget;

pub use client::{BloomClient, SearchBackend, SEARCH_PATH};
pub use config::{MouseLeave, WidgetConfig};
pub use error::{Error, Result};
pub use fetcher::DebounceTimer;
pub use input::{Edit, TextInput};
pub use navigation::{MouseEvent, Outcome};
pub use notifier::SelectionNotifier;
pub use query::{Field, Filter, Operator, SearchQuery};
pub use store::SuggestionStore;
pub use types::{Address, SearchResponse, SuggestionResult};
pub use widget::{ElementId, PollEvent, SearchAction, Widget, WidgetRegistry};
