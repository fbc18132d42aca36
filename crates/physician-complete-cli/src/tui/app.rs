//! Application state and event loop

use super::ui;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use physician_complete::{
    ElementId, MouseEvent, PollEvent, SuggestionResult, Widget, WidgetConfig, WidgetRegistry,
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Element the single input line is registered under
pub const NAME_INPUT: &str = "physician-name";

/// One-line notification under the status line
#[derive(Debug)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
    pub is_error: bool,
}

impl Toast {
    pub fn info(message: impl Into<String>, shown_for: Duration, now: Instant) -> Self {
        Self {
            message: message.into(),
            expires_at: now + shown_for,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>, shown_for: Duration, now: Instant) -> Self {
        Self {
            is_error: true,
            ..Self::info(message, shown_for, now)
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Whether keys go to the name input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Away,
}

pub struct App {
    registry: WidgetRegistry,
    element: ElementId,
    selected: Receiver<SuggestionResult>,
    /// Most recent "selected" event
    pub last_selected: Option<SuggestionResult>,
    pub focus: Focus,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    /// Where the dropdown was last drawn, for mouse hit testing
    pub dropdown_area: Option<Rect>,
    hovered: Option<usize>,
}

impl App {
    pub fn new(config: WidgetConfig) -> Result<Self> {
        Self::with_widget(move || Widget::new(config))
    }

    pub fn with_widget<F>(make: F) -> Result<Self>
    where
        F: FnOnce() -> physician_complete::Result<Widget>,
    {
        let element = ElementId::new(NAME_INPUT);
        let mut registry = WidgetRegistry::new();
        let selected = registry.attach_with(element.clone(), make)?.subscribe();
        Ok(Self {
            registry,
            element,
            selected,
            last_selected: None,
            focus: Focus::Input,
            toast: None,
            should_quit: false,
            dropdown_area: None,
            hovered: None,
        })
    }

    pub fn widget(&self) -> Option<&Widget> {
        self.registry.get(&self.element)
    }

    pub fn widget_mut(&mut self) -> Option<&mut Widget> {
        self.registry.get_mut(&self.element)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved => self.handle_hover(mouse.column, mouse.row),
                MouseEventKind::Down(MouseButton::Left) => {
                    self.handle_click(mouse.column, mouse.row)
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if self.focus == Focus::Away {
            if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
                self.focus = Focus::Input;
            }
            return;
        }

        let Some(widget) = self.widget_mut() else {
            return;
        };
        let outcome = widget.handle_key(key.code, key.modifiers, Instant::now());
        // Default Tab handling: move focus off the input
        if !outcome.suppress_default && matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.focus = Focus::Away;
        }
    }

    fn handle_hover(&mut self, column: u16, row: u16) {
        let Some(area) = self.dropdown_area else {
            return;
        };
        let event = if contains(area, column, row) {
            match row_at(area, column, row) {
                Some(index) if self.hovered != Some(index) => {
                    self.hovered = Some(index);
                    MouseEvent::Enter(index)
                }
                _ => return,
            }
        } else if self.hovered.take().is_some() {
            MouseEvent::Leave
        } else {
            return;
        };

        if let Some(widget) = self.widget_mut() {
            widget.handle_mouse(event);
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let Some(index) = self.dropdown_area.and_then(|area| row_at(area, column, row)) else {
            return;
        };
        self.hovered = None;
        self.focus = Focus::Input;
        if let Some(widget) = self.widget_mut() {
            widget.handle_mouse(MouseEvent::Click(index));
        }
    }

    /// Fire due searches, apply arrived results and collect "selected" events
    fn poll_widget(&mut self, now: Instant) {
        let events = match self.widget_mut() {
            Some(widget) => widget.poll(now),
            None => return,
        };
        for event in events {
            match event {
                PollEvent::FetchFailed { message, .. } => {
                    self.toast = Some(Toast::error(message, Duration::from_secs(5), now));
                }
                PollEvent::ResultsUpdated { count: 0, .. } => {
                    self.toast = Some(Toast::info(
                        "No matching physicians",
                        Duration::from_secs(2),
                        now,
                    ));
                }
                _ => {}
            }
        }

        if let Some(result) = self.selected.try_iter().last() {
            self.last_selected = Some(result);
        }
        if self.widget().is_some_and(|w| !w.store().is_open()) {
            self.hovered = None;
        }
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

/// Result row under the pointer; rows start inside the dropdown border
pub fn row_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    contains(inner, column, row).then(|| (row - inner.y) as usize)
}

/// Run the TUI application
pub fn run(config: WidgetConfig) -> Result<()> {
    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(selected) = &app.last_selected {
        println!("{} ({})", selected.display_name(), selected.npi);
    }
    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // ~60Hz is plenty for a text box
    const FRAME_TIME: Duration = Duration::from_micros(16_667);

    loop {
        let frame_start = Instant::now();

        let mut events_processed = 0usize;
        while event::poll(Duration::from_millis(0))? && events_processed < 100 {
            app.handle_event(event::read()?);
            events_processed += 1;
            if app.should_quit {
                break;
            }
        }

        if app.should_quit {
            break;
        }

        let now = Instant::now();
        app.expire_toast(now);
        app.poll_widget(now);

        terminal.draw(|f| ui::render(f, app))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - elapsed);
        }
    }

    Ok(())
}
