use crossterm::event::{KeyCode, KeyModifiers};
use physician_complete::{
    Address, Error, Field, MouseEvent, Operator, PollEvent, Result, SearchAction, SearchBackend,
    SearchQuery, SuggestionResult, Widget, WidgetConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

/// Records every query and answers from a fixed table keyed on the last filter value
#[derive(Clone, Default)]
struct Directory {
    queries: Arc<Mutex<Vec<SearchQuery>>>,
    offline: Arc<AtomicBool>,
}

impl Directory {
    fn people(prefix: &str) -> Vec<SuggestionResult> {
        let all = [
            ("1111111111", "JOHN", "SMITH", "BOSTON", "MA", "021154321"),
            ("2222222222", "JOHN", "SMALLS", "AUSTIN", "TX", "78701"),
            ("3333333333", "JOHANNA", "SMYTHE", "DENVER", "CO", "80202"),
            ("4444444444", "MARY", "LEE", "OMAHA", "NE", "68102"),
        ];
        all.iter()
            .filter(|p| {
                p.1.to_lowercase().starts_with(prefix) || p.2.to_lowercase().starts_with(prefix)
            })
            .map(|p| SuggestionResult {
                npi: p.0.to_string(),
                first_name: p.1.to_string(),
                last_name: p.2.to_string(),
                address: Address {
                    city: p.3.to_string(),
                    state: p.4.to_string(),
                    zip: p.5.to_string(),
                },
            })
            .collect()
    }
}

impl SearchBackend for Directory {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SuggestionResult>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Backend("directory offline".to_string()));
        }
        let value = query.filters().last().map(|f| f.value.as_str()).unwrap_or("");
        Ok(Self::people(value))
    }
}

fn widget(config: WidgetConfig, directory: &Directory) -> Widget {
    let backend = directory.clone();
    Widget::with_backend(config, move || Ok(backend))
}

fn type_text(w: &mut Widget, text: &str, start: Instant, gap: Duration) -> Instant {
    let mut now = start;
    for c in text.chars() {
        w.handle_key(KeyCode::Char(c), KeyModifiers::NONE, now);
        now += gap;
    }
    now - gap
}

#[test]
fn keystrokes_within_quiet_period_fetch_only_the_last_query() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let start = Instant::now();

    let last = type_text(&mut w, "John Sm", start, Duration::from_millis(120));
    // Polling between keystrokes never fires anything
    assert!(w.poll(last + Duration::from_millis(499)).is_empty());

    let events = w.poll(last + Duration::from_millis(500));
    assert!(matches!(events.first(), Some(PollEvent::RequestSent { id: 1, .. })));
    w.wait_idle(WAIT);

    let queries = directory.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    let filters: Vec<_> = queries[0]
        .filters()
        .iter()
        .map(|f| (f.field, f.op, f.value.clone()))
        .collect();
    assert_eq!(
        filters,
        vec![
            (Field::FirstName, Operator::Fuzzy, "john".to_string()),
            (Field::LastName, Operator::Prefix, "sm".to_string()),
        ]
    );
    assert_eq!(w.store().len(), 3);
    assert_eq!(w.store().highlight_index(), None);
}

#[test]
fn clearing_the_input_cancels_the_pending_fetch() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let now = Instant::now();

    w.handle_key(KeyCode::Char('j'), KeyModifiers::NONE, now);
    let outcome = w.handle_key(KeyCode::Backspace, KeyModifiers::NONE, now);
    assert_eq!(outcome.search, SearchAction::Cleared);

    assert!(w.poll(now + Duration::from_secs(2)).is_empty());
    assert!(w.wait_idle(Duration::from_millis(50)).is_empty());
    assert!(directory.queries.lock().unwrap().is_empty());
    assert!(!w.store().is_open());
}

#[test]
fn empty_results_close_the_list() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let now = Instant::now();

    w.set_text("jo", now);
    w.poll(now + Duration::from_millis(500));
    w.wait_idle(WAIT);
    assert!(w.store().is_open());
    w.handle_key(KeyCode::Down, KeyModifiers::NONE, now);
    assert_eq!(w.store().highlight_index(), Some(0));

    let later = now + Duration::from_secs(1);
    w.set_text("zz", later);
    let mut events = w.poll(later + Duration::from_millis(500));
    events.extend(w.wait_idle(WAIT));
    assert!(events.contains(&PollEvent::ResultsUpdated { id: 2, count: 0 }));
    assert!(!w.store().is_open());
    assert_eq!(w.store().highlight_index(), None);
}

#[test]
fn failed_fetch_keeps_previous_list() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let now = Instant::now();
    w.set_text("mary", now);
    w.poll(now + Duration::from_millis(500));
    w.wait_idle(WAIT);
    assert_eq!(w.store().len(), 1);

    directory.offline.store(true, Ordering::SeqCst);
    let later = now + Duration::from_secs(1);
    w.set_text("john", later);
    let mut events = w.poll(later + Duration::from_millis(500));
    events.extend(w.wait_idle(WAIT));

    assert!(events.iter().any(|e| matches!(
        e,
        PollEvent::FetchFailed { id: 2, message } if message.contains("directory offline")
    )));
    assert_eq!(w.store().len(), 1);
    assert_eq!(w.store().get(0).map(|r| r.last_name.as_str()), Some("LEE"));
}

#[test]
fn zip_filter_is_sent_first() {
    let directory = Directory::default();
    let config = WidgetConfig::default().with_zip_code("021");
    let mut w = widget(config, &directory);
    let now = Instant::now();

    w.set_text("john smith", now);
    w.poll(now + Duration::from_millis(500));
    w.wait_idle(WAIT);

    let queries = directory.queries.lock().unwrap().clone();
    assert_eq!(queries[0].filters().len(), 3);
    assert_eq!(queries[0].filters()[0].field, Field::PracticeZip);
    assert_eq!(queries[0].filters()[0].value, "021");
}

#[test]
fn keyboard_selection_then_new_query_rehighlights_by_npi() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let selected = w.subscribe();
    let now = Instant::now();

    w.set_text("jo", now);
    w.poll(now + Duration::from_millis(500));
    w.wait_idle(WAIT);
    w.handle_key(KeyCode::Down, KeyModifiers::NONE, now);
    w.handle_key(KeyCode::Down, KeyModifiers::NONE, now);
    assert_eq!(w.last_selected().map(|r| r.npi.as_str()), Some("2222222222"));

    // "smalls" only matches the selected physician, which stays highlighted
    let later = now + Duration::from_secs(1);
    w.set_text("smalls", later);
    w.poll(later + Duration::from_millis(500));
    w.wait_idle(WAIT);
    assert_eq!(w.store().len(), 1);
    assert_eq!(w.store().highlight_index(), Some(0));

    let npis: Vec<_> = selected.try_iter().map(|r| r.npi).collect();
    assert_eq!(npis, vec!["1111111111", "2222222222"]);
}

#[test]
fn hover_then_click_fills_and_notifies_once() {
    let directory = Directory::default();
    let mut w = widget(WidgetConfig::default(), &directory);
    let selected = w.subscribe();
    let now = Instant::now();

    w.set_text("jo", now);
    w.poll(now + Duration::from_millis(500));
    w.wait_idle(WAIT);

    w.handle_mouse(MouseEvent::Enter(2));
    w.handle_mouse(MouseEvent::Enter(1));
    assert_eq!(selected.try_iter().count(), 0);

    let outcome = w.handle_mouse(MouseEvent::Click(1));
    assert_eq!(outcome.filled.as_deref(), Some("JOHN SMALLS"));
    assert_eq!(w.text(), "JOHN SMALLS");
    assert!(!w.store().is_open());
    assert_eq!(selected.try_iter().count(), 1);
}

struct Broken;

impl SearchBackend for Broken {
    fn search(&self, _query: &SearchQuery) -> Result<Vec<SuggestionResult>> {
        panic!("directory exploded");
    }
}

#[test]
fn panicking_backend_fails_the_fetch_without_wedging_the_widget() {
    let mut w = Widget::with_backend(WidgetConfig::default(), || Ok(Broken));
    let now = Instant::now();

    for (i, text) in ["jo", "john"].into_iter().enumerate() {
        let at = now + Duration::from_secs(i as u64);
        w.set_text(text, at);
        let mut events = w.poll(at + Duration::from_millis(500));
        events.extend(w.wait_idle(WAIT));

        let id = i as u64 + 1;
        assert!(events.iter().any(|e| matches!(
            e,
            PollEvent::FetchFailed { id: failed, message }
                if *failed == id && message.contains("directory exploded")
        )));
        assert_eq!(w.requests_in_flight(), 0);
        assert!(!w.is_search_pending());
    }
}
