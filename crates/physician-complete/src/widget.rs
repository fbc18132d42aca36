//! Per-input widget state and the element registry

use crate::fetcher::{Delivery, Fetcher};
use crate::{
    BloomClient, Result, SearchBackend, SearchQuery, SelectionNotifier, SuggestionResult,
    SuggestionStore, TextInput, WidgetConfig,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Something that happened while polling the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A debounced query was sent to the worker
    RequestSent { id: u64, query: String },
    /// The suggestion list was replaced (`count` may be zero: list hidden)
    ResultsUpdated { id: u64, count: usize },
    /// An outcome was dropped because a newer request was already sent
    StaleDropped { id: u64 },
    /// The fetch failed; the list was left as it was
    FetchFailed { id: u64, message: String },
}

/// Effect of a keystroke on the debounced search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchAction {
    #[default]
    Unchanged,
    /// A fetch was (re)scheduled
    Scheduled,
    /// The input was blank: pending fetch cancelled and list cleared
    Cleared,
}

/// Autocomplete state for one input: text, suggestions, selection, fetcher.
pub struct Widget {
    pub(crate) config: WidgetConfig,
    pub(crate) input: TextInput,
    pub(crate) store: SuggestionStore,
    pub(crate) notifier: SelectionNotifier,
    pub(crate) fetcher: Fetcher,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("input", &self.input.text())
            .field("results", &self.store.len())
            .field("highlight", &self.store.highlight_index())
            .field("pending", &self.fetcher.timer().is_pending())
            .finish()
    }
}

impl Widget {
    /// Widget backed by the HTTP search API
    pub fn new(config: WidgetConfig) -> Result<Self> {
        config.validate()?;
        let client_config = config.clone();
        Ok(Self::with_backend(config, move || {
            BloomClient::new(&client_config)
        }))
    }

    /// Widget backed by any search implementation. The backend is built on
    /// the worker thread.
    pub fn with_backend<B, F>(config: WidgetConfig, make_backend: F) -> Self
    where
        B: SearchBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let fetcher = Fetcher::new(
            config.quiet_period(),
            config.discard_stale_responses,
            make_backend,
        );
        Self {
            config,
            input: TextInput::new(),
            store: SuggestionStore::new(),
            notifier: SelectionNotifier::new(),
            fetcher,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn store(&self) -> &SuggestionStore {
        &self.store
    }

    pub fn last_selected(&self) -> Option<&SuggestionResult> {
        self.notifier.last_selected()
    }

    /// Listen for "selected" events
    pub fn subscribe(&mut self) -> Receiver<SuggestionResult> {
        self.notifier.subscribe()
    }

    pub fn is_search_pending(&self) -> bool {
        self.fetcher.timer().is_pending()
    }

    /// When the pending search will fire, if one is scheduled
    pub fn search_deadline(&self) -> Option<Instant> {
        self.fetcher.timer().deadline()
    }

    pub fn requests_in_flight(&self) -> usize {
        self.fetcher.in_flight()
    }

    /// Replace the input text as if the user typed it
    pub fn set_text(&mut self, text: &str, now: Instant) -> SearchAction {
        self.input.set(text);
        self.search(now)
    }

    /// Build a query from the current text and (re)schedule it. Blank text
    /// cancels any pending fetch and clears the list.
    pub(crate) fn search(&mut self, now: Instant) -> SearchAction {
        let query = SearchQuery::build(
            self.input.text(),
            self.config.zip_filter(),
            self.config.limit,
        );
        match query {
            Some(query) => {
                self.fetcher.schedule(query, now);
                SearchAction::Scheduled
            }
            None => {
                self.fetcher.cancel();
                self.store.clear();
                SearchAction::Cleared
            }
        }
    }

    /// Fire a due search and apply any outcomes that have arrived
    pub fn poll(&mut self, now: Instant) -> Vec<PollEvent> {
        let mut events = Vec::new();

        match self.fetcher.fire_due(now) {
            Ok(Some(request)) => {
                log::debug!("search {} sent: {}", request.id, request.query);
                events.push(PollEvent::RequestSent {
                    id: request.id,
                    query: request.query.to_string(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("{e}");
                events.push(PollEvent::FetchFailed {
                    id: 0,
                    message: e.to_string(),
                });
            }
        }

        for (id, delivery) in self.fetcher.try_deliveries() {
            events.push(self.apply(id, delivery));
        }
        events
    }

    /// Block until every in-flight request has an outcome (or `timeout`
    /// passes waiting for one), applying them as they arrive
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Some((id, delivery)) = self.fetcher.wait_delivery(timeout) {
            events.push(self.apply(id, delivery));
        }
        events
    }

    fn apply(&mut self, id: u64, delivery: Delivery) -> PollEvent {
        match delivery {
            Delivery::Apply(results) => {
                let count = results.len();
                self.store.replace(results, self.notifier.last_selected());
                PollEvent::ResultsUpdated { id, count }
            }
            Delivery::Failed(e) => {
                log::error!("search {id} failed: {e}");
                PollEvent::FetchFailed {
                    id,
                    message: e.to_string(),
                }
            }
            Delivery::Stale => {
                log::debug!("dropped stale response for search {id}");
                PollEvent::StaleDropped { id }
            }
        }
    }
}

/// Identity of the input element a widget is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// At most one widget per element
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<ElementId, Widget>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an HTTP-backed widget to `element`. An element that already has
    /// a widget keeps it, and `config` is ignored.
    pub fn attach(&mut self, element: ElementId, config: WidgetConfig) -> Result<&mut Widget> {
        self.attach_with(element, || Widget::new(config))
    }

    /// Like [`attach`](Self::attach), building the widget with `make` only
    /// when the element has none
    pub fn attach_with<F>(&mut self, element: ElementId, make: F) -> Result<&mut Widget>
    where
        F: FnOnce() -> Result<Widget>,
    {
        use std::collections::hash_map::Entry;

        match self.widgets.entry(element) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                log::debug!("attaching widget to {}", entry.key());
                Ok(entry.insert(make()?))
            }
        }
    }

    pub fn get(&self, element: &ElementId) -> Option<&Widget> {
        self.widgets.get(element)
    }

    pub fn get_mut(&mut self, element: &ElementId) -> Option<&mut Widget> {
        self.widgets.get_mut(element)
    }

    pub fn contains(&self, element: &ElementId) -> bool {
        self.widgets.contains_key(element)
    }

    /// Unbind and drop the widget; its worker thread stops
    pub fn detach(&mut self, element: &ElementId) -> Option<Widget> {
        self.widgets.remove(element)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
