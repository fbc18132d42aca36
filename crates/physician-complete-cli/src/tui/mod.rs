//! Interactive terminal host for one autocomplete widget
//!
//! The widget's worker thread runs the HTTP searches; this loop only feeds
//! it key and mouse events, polls it once per frame and draws its state.
//!
//! Layout:
//! ```text
//! ┌ Physician ─────────────────────────────────────────────┐
//! │ john sm█                                               │
//! ├────────────────────────────────────────────────────────┤
//! │ JOHN SMITH        1234567890  BOSTON, MA 02115         │
//! │ JOHN SMALLS       1987654321  AUSTIN, TX 78701         │
//! └────────────────────────────────────────────────────────┘
//!
//!  Selected: JOHN SMITH (1234567890) │ searching…
//!   [toast]
//! ```

mod app;
mod ui;

pub use app::run;
