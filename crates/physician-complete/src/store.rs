//! Current suggestions and the highlighted entry

use crate::SuggestionResult;

/// Result list for the current query plus the highlighted index.
///
/// `highlight` is always `None` or a valid index into `results`. `active` is
/// the row carrying the visual "active" marking; every highlight change moves
/// it too, but it can be cleared on its own (mouse leaving the dropdown).
#[derive(Debug, Default, Clone)]
pub struct SuggestionStore {
    results: Vec<SuggestionResult>,
    highlight: Option<usize>,
    active: Option<usize>,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh result list. The highlight follows `last_selected` by
    /// npi when it is still present, otherwise it is reset.
    pub fn replace(
        &mut self,
        results: Vec<SuggestionResult>,
        last_selected: Option<&SuggestionResult>,
    ) {
        if results.is_empty() {
            self.clear();
            return;
        }

        let index = last_selected.and_then(|last| results.iter().position(|r| r.same_identity(last)));
        self.results = results;
        self.highlight = index;
        self.active = index;
    }

    /// Empty the list; the dropdown hides when `is_open()` turns false
    pub fn clear(&mut self) {
        self.results.clear();
        self.highlight = None;
        self.active = None;
    }

    /// Highlight `index`. Returns false (and changes nothing) if out of bounds.
    pub fn highlight(&mut self, index: usize) -> bool {
        if index >= self.results.len() {
            return false;
        }
        self.highlight = Some(index);
        self.active = Some(index);
        true
    }

    /// Move the highlight by `delta`, clamped to the list without wrapping.
    /// From no highlight, a positive step lands on the first entry and a
    /// negative one does nothing. Returns whether the highlight changed.
    pub fn move_highlight(&mut self, delta: isize) -> bool {
        if self.results.is_empty() || delta == 0 {
            return false;
        }
        let last = self.results.len() - 1;

        let target = match self.highlight {
            None if delta < 0 => return false,
            None => (delta.unsigned_abs() - 1).min(last),
            Some(current) if delta < 0 => current.saturating_sub(delta.unsigned_abs()),
            Some(current) => current.saturating_add(delta.unsigned_abs()).min(last),
        };

        if self.highlight == Some(target) {
            return false;
        }
        self.highlight = Some(target);
        self.active = Some(target);
        true
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Drop the highlight without touching the list
    pub fn reset_highlight(&mut self) {
        self.highlight = None;
        self.active = None;
    }

    pub fn is_open(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn results(&self) -> &[SuggestionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SuggestionResult> {
        self.results.get(index)
    }

    pub fn highlight_index(&self) -> Option<usize> {
        self.highlight
    }

    pub fn highlighted(&self) -> Option<&SuggestionResult> {
        self.highlight.and_then(|i| self.results.get(i))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }
}
