//! Keyboard and mouse handling for a widget
//!
//! | Key   | Effect |
//! |-------|--------|
//! | Down  | highlight next, notify it |
//! | Up    | highlight previous, notify it |
//! | Enter | fill input with highlighted result, close list; always suppresses default |
//! | Tab   | fill input with highlighted (or first) result, notify, search again |
//! | other | edit the input; edits that change the text search again |
//!
//! Hovering a row highlights it without notifying; clicking commits it.

use crate::widget::SearchAction;
use crate::{Edit, MouseLeave, SuggestionResult, Widget};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

/// Mouse events on the rendered dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Pointer entered the row at this index
    Enter(usize),
    /// Row at this index was clicked
    Click(usize),
    /// Pointer left the dropdown container
    Leave,
}

/// What an input event asks of the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The host must not run its own default handling for this event
    pub suppress_default: bool,
    /// Text written into the input
    pub filled: Option<String>,
    /// Result passed to the selection notifier (whether or not it emitted)
    pub selected: Option<SuggestionResult>,
    pub search: SearchAction,
}

impl Outcome {
    fn suppressed() -> Self {
        Self {
            suppress_default: true,
            ..Default::default()
        }
    }
}

impl Widget {
    /// Handle a key pressed while the input has focus
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> Outcome {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Down => self.step_highlight(1),
            KeyCode::Char('n') if ctrl => self.step_highlight(1),
            KeyCode::Up => self.step_highlight(-1),
            KeyCode::Char('p') if ctrl => self.step_highlight(-1),
            KeyCode::Enter => self.commit_highlighted(),
            KeyCode::Tab => self.commit_for_tab(now),
            _ => match self.input.handle_key(code, modifiers) {
                Edit::Changed => Outcome {
                    suppress_default: true,
                    search: self.search(now),
                    ..Default::default()
                },
                Edit::Moved => Outcome::suppressed(),
                Edit::Ignored => Outcome::default(),
            },
        }
    }

    /// Handle a mouse event on the dropdown
    pub fn handle_mouse(&mut self, event: MouseEvent) -> Outcome {
        match event {
            MouseEvent::Enter(index) => {
                // Hover only moves the highlight; it never notifies
                self.store.clear_active();
                self.store.highlight(index);
                Outcome::default()
            }
            MouseEvent::Click(index) => {
                let Some(result) = self.store.get(index).cloned() else {
                    return Outcome::default();
                };
                let filled = self.fill(&result);
                self.notifier.notify(&result);
                self.store.clear();
                Outcome {
                    suppress_default: true,
                    filled: Some(filled),
                    selected: Some(result),
                    search: SearchAction::Unchanged,
                }
            }
            MouseEvent::Leave => {
                match self.config.mouse_leave {
                    MouseLeave::ClearMarker => self.store.clear_active(),
                    MouseLeave::ClearHighlight => self.store.reset_highlight(),
                }
                Outcome::default()
            }
        }
    }

    fn step_highlight(&mut self, delta: isize) -> Outcome {
        let mut outcome = Outcome::suppressed();
        if self.store.move_highlight(delta) {
            if let Some(result) = self.store.highlighted().cloned() {
                self.notifier.notify(&result);
                outcome.selected = Some(result);
            }
        }
        outcome
    }

    fn commit_highlighted(&mut self) -> Outcome {
        let mut outcome = Outcome::suppressed();
        if let Some(result) = self.store.highlighted().cloned() {
            outcome.filled = Some(self.fill(&result));
        }
        self.store.clear();
        outcome
    }

    fn commit_for_tab(&mut self, now: Instant) -> Outcome {
        let index = self.store.highlight_index().unwrap_or(0);
        let Some(result) = self.store.get(index).cloned() else {
            // Nothing to commit: let the host move focus
            return Outcome::default();
        };

        let filled = self.fill(&result);
        self.notifier.notify(&result);
        let search = self.search(now);
        Outcome {
            suppress_default: true,
            filled: Some(filled),
            selected: Some(result),
            search,
        }
    }

    fn fill(&mut self, result: &SuggestionResult) -> String {
        let name = result.display_name();
        self.input.set(name.clone());
        name
    }
}
