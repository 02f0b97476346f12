//! Verdict rendering.

use super::text::{format_amount, key_value_line};
use crate::model::{AnalysisResult, InvoiceStatus};

/// Render a verdict as a multi-line block, without trailing newline.
pub fn render_verdict(result: &AnalysisResult) -> String {
    let mut lines = vec![format!(
        "Invoice {}: {}",
        result.invoice_id,
        headline(result.status)
    )];

    lines.push(key_value_line("Vendor", &result.vendor));
    lines.push(key_value_line(
        "Amount",
        format_amount(result.amount, &result.currency),
    ));
    lines.push(key_value_line(
        "Fraud score",
        format!("{}/100", result.fraud_score),
    ));
    lines.push(key_value_line("Confidence", format!("{}%", result.confidence)));
    if let Some(wallet) = &result.wallet_address {
        lines.push(key_value_line("Wallet", wallet));
    }

    if !result.local_checks.is_empty() {
        lines.push(String::new());
        lines.push("Local checks".to_string());
        for check in &result.local_checks {
            lines.push(format!(
                "  {:<9} {}: {}",
                format!("[{}]", check.status.as_str()),
                check.name,
                check.detail
            ));
        }
    }

    if !result.network_signals.is_empty() {
        lines.push(String::new());
        lines.push("Network signals".to_string());
        for signal in &result.network_signals {
            lines.push(format!(
                "  {:<9} {}",
                format!("[{}]", signal.kind.as_str()),
                signal.description
            ));
        }
    }

    lines.push(String::new());
    lines.push(result.explanation.trim().to_string());

    lines.join("\n")
}

fn headline(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Approved => "APPROVED - safe to pay",
        InvoiceStatus::Hold => "ON HOLD - needs manual review",
        InvoiceStatus::Blocked => "BLOCKED - do not pay",
    }
}
