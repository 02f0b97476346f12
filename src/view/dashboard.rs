//! Dashboard views: threat analytics, treasury ledger, history, health.

use super::text::{format_amount, key_value_line, truncate};
use crate::model::{
    AnalysisResult, HealthStatus, ThreatAnalytics, ThreatReportReceipt, Transaction, WalletBalance,
};

const VENDOR_WIDTH: usize = 20;

/// Threat network totals followed by the recorded threats.
pub fn render_analytics(analytics: &ThreatAnalytics, currency: &str) -> String {
    let mut lines = vec![
        "Threat network".to_string(),
        key_value_line(
            "Blocked amount",
            format_amount(analytics.total_blocked_amount, currency),
        ),
        key_value_line("Blocked invoices", analytics.total_blocked_invoices),
        key_value_line("Threats detected", analytics.total_threats_detected),
        key_value_line(
            "Rewards earned",
            format_amount(analytics.rewards_earned, currency),
        ),
        String::new(),
    ];

    if analytics.threats.is_empty() {
        lines.push("No threats recorded.".to_string());
        return lines.join("\n");
    }

    lines.push("Recent threats".to_string());
    for threat in &analytics.threats {
        lines.push(format!(
            "  {:<8} {:<width$} score {:>3}  seen {}x  first {}  blocked {}",
            threat.id,
            truncate(&threat.vendor, VENDOR_WIDTH),
            threat.fraud_score,
            threat.times_seen,
            threat.first_seen.to_string(),
            format_amount(threat.amount_blocked, currency),
            width = VENDOR_WIDTH
        ));
        lines.push(format!("      {}", threat.reason));
    }

    lines.join("\n")
}

/// Ledger table; entries with a hold or block reason get it on the next line.
pub fn render_transactions(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions.".to_string();
    }

    let mut lines = vec![transaction_row("DATE", "STATUS", "VENDOR", "AMOUNT", "INVOICE")];
    for tx in transactions {
        lines.push(transaction_row(
            &tx.date.to_string(),
            tx.status.as_str(),
            &truncate(&tx.vendor, VENDOR_WIDTH),
            &format_amount(tx.amount, &tx.currency),
            &tx.invoice_id,
        ));
        if let Some(reason) = tx.reason.as_deref().filter(|r| !r.is_empty()) {
            lines.push(format!("    {}", reason));
        }
    }

    lines.join("\n")
}

fn transaction_row(date: &str, status: &str, vendor: &str, amount: &str, invoice: &str) -> String {
    format!(
        "{:<10}  {:<7}  {:<width$}  {:>16}  {}",
        date,
        status,
        vendor,
        amount,
        invoice,
        width = VENDOR_WIDTH
    )
}

pub fn render_balance(balance: &WalletBalance) -> String {
    [
        "Treasury wallet".to_string(),
        key_value_line("Balance", format_amount(balance.balance, &balance.currency)),
        key_value_line(
            "Auto-paid / month",
            format_amount(balance.auto_paid_this_month, &balance.currency),
        ),
        key_value_line(
            "Blocked / month",
            format_amount(balance.blocked_this_month, &balance.currency),
        ),
    ]
    .join("\n")
}

/// One row per previously analyzed invoice.
pub fn render_history(history: &[AnalysisResult]) -> String {
    if history.is_empty() {
        return "No invoices analyzed yet.".to_string();
    }

    let mut lines = vec![history_row("INVOICE", "STATUS", "VENDOR", "AMOUNT", "SCORE")];
    for result in history {
        lines.push(history_row(
            &result.invoice_id,
            result.status.as_str(),
            &truncate(&result.vendor, VENDOR_WIDTH),
            &format_amount(result.amount, &result.currency),
            &result.fraud_score.to_string(),
        ));
    }

    lines.join("\n")
}

fn history_row(invoice: &str, status: &str, vendor: &str, amount: &str, score: &str) -> String {
    format!(
        "{:<12}  {:<8}  {:<width$}  {:>16}  {}",
        invoice,
        status,
        vendor,
        amount,
        score,
        width = VENDOR_WIDTH
    )
}

pub fn render_health(health: &HealthStatus) -> String {
    format!(
        "Backend {}: API key {}",
        health.status,
        if health.api_key_configured {
            "configured"
        } else {
            "missing"
        }
    )
}

pub fn render_report_receipt(receipt: &ThreatReportReceipt) -> String {
    if receipt.success {
        format!("Reported to threat network as {}", receipt.threat_id)
    } else {
        "Threat network did not accept the report".to_string()
    }
}
