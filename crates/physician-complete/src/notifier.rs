use crate::SuggestionResult;
use std::sync::mpsc::{self, Receiver, Sender};

/// Emits "selected" once per distinct result, deduplicated by npi against
/// the last emitted one.
#[derive(Debug, Default)]
pub struct SelectionNotifier {
    last: Option<SuggestionResult>,
    listeners: Vec<Sender<SuggestionResult>>,
}

impl SelectionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for "selected" events
    pub fn subscribe(&mut self) -> Receiver<SuggestionResult> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    /// Returns true if an event was emitted
    pub fn notify(&mut self, result: &SuggestionResult) -> bool {
        if self.last.as_ref().is_some_and(|last| last.same_identity(result)) {
            return false;
        }

        self.last = Some(result.clone());
        log::debug!("selected npi {}", result.npi);
        // Listeners that hung up are dropped
        self.listeners.retain(|tx| tx.send(result.clone()).is_ok());
        true
    }

    pub fn last_selected(&self) -> Option<&SuggestionResult> {
        self.last.as_ref()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
