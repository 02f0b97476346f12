//! Terminal output (impure shell).
//!
//! Renderers turn domain values into plain text for stdout; the
//! [`TerminalReporter`] prints live session progress to stderr.

mod dashboard;
mod reporter;
mod text;
mod verdict;

pub use dashboard::{
    render_analytics, render_balance, render_health, render_history, render_report_receipt,
    render_transactions,
};
pub use reporter::TerminalReporter;
pub use text::{format_amount, key_value_line};
pub use verdict::render_verdict;
