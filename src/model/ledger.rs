//! Treasury ledger and threat analytics data.
//!
//! These are the read-only dashboard views served by the companion endpoints.
//! Plain request/response JSON, no streaming.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fraud pattern recorded in the shared threat network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatRecord {
    pub id: String,
    pub vendor: String,
    pub fraud_score: u8,
    pub first_seen: NaiveDate,
    pub times_seen: u32,
    pub reason: String,
    pub amount_blocked: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_hash: Option<String>,
}

/// Aggregated threat intelligence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAnalytics {
    pub total_blocked_amount: f64,
    pub total_blocked_invoices: u64,
    pub total_threats_detected: u64,
    pub rewards_earned: f64,
    pub threats: Vec<ThreatRecord>,
}

/// Payment state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Paid,
    Held,
    Blocked,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Paid => "paid",
            TransactionStatus::Held => "held",
            TransactionStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized transaction status strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction status '{0}': expected paid, held or blocked")]
pub struct InvalidTransactionStatus(String);

impl FromStr for TransactionStatus {
    type Err = InvalidTransactionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paid" => Ok(TransactionStatus::Paid),
            "held" => Ok(TransactionStatus::Held),
            "blocked" => Ok(TransactionStatus::Blocked),
            _ => Err(InvalidTransactionStatus(s.to_string())),
        }
    }
}

/// One entry of the treasury ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub status: TransactionStatus,
    pub vendor: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub invoice_id: String,
}

/// Treasury wallet summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub balance: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub auto_paid_this_month: f64,
    pub blocked_this_month: f64,
}

/// Report of a blocked invoice to the threat network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatReport {
    pub invoice_id: String,
    pub vendor: String,
    pub fraud_score: u8,
    pub reason: String,
    pub amount: f64,
}

impl ThreatReport {
    /// Build the report filed for a blocked verdict.
    pub fn from_result(result: &crate::model::AnalysisResult) -> Self {
        Self {
            invoice_id: result.invoice_id.clone(),
            vendor: result.vendor.clone(),
            fraud_score: result.fraud_score,
            reason: result.explanation.clone(),
            amount: result.amount,
        }
    }
}

/// Acknowledgement of a [`ThreatReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatReportReceipt {
    pub success: bool,
    pub threat_id: String,
}

/// Backend health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub api_key_configured: bool,
}

/// Filters for the ledger listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub status: Option<TransactionStatus>,
}

impl TransactionQuery {
    /// Query-string pairs, omitting unset filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

fn default_currency() -> String {
    crate::model::analysis::DEFAULT_CURRENCY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_parses_iso_date_and_optional_reason() {
        let json = r#"{"id":"TXN-1","status":"held","vendor":"Acme","amount":250.0,
            "currency":"USDC","date":"2025-01-15","invoiceId":"INV-1"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.status, TransactionStatus::Held);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(tx.reason, None);
    }

    #[test]
    fn threat_analytics_parses_nested_records() {
        let json = r#"{"totalBlockedAmount":5000.0,"totalBlockedInvoices":2,
            "totalThreatsDetected":1,"rewardsEarned":25.0,
            "threats":[{"id":"THR-1","vendor":"Shady LLC","fraudScore":97,
            "firstSeen":"2025-02-01","timesSeen":1,"reason":"Spoofed bank",
            "amountBlocked":5000.0,"templateHash":null}]}"#;
        let analytics: ThreatAnalytics = serde_json::from_str(json).unwrap();
        assert_eq!(analytics.threats.len(), 1);
        assert_eq!(analytics.threats[0].template_hash, None);
        assert_eq!(analytics.total_blocked_invoices, 2);
    }

    #[test]
    fn transaction_status_from_str_is_case_insensitive() {
        assert_eq!("PAID".parse::<TransactionStatus>(), Ok(TransactionStatus::Paid));
        assert_eq!(
            "blocked".parse::<TransactionStatus>(),
            Ok(TransactionStatus::Blocked)
        );
        assert!("refunded".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn query_pairs_skip_unset_filters() {
        let query = TransactionQuery {
            limit: Some(10),
            offset: None,
            status: Some(TransactionStatus::Blocked),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("limit", "10".to_string()), ("status", "blocked".to_string())]
        );
        assert!(TransactionQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn threat_report_serializes_camel_case() {
        let report = ThreatReport {
            invoice_id: "INV-9".to_string(),
            vendor: "Shady LLC".to_string(),
            fraud_score: 91,
            reason: "Spoofed".to_string(),
            amount: 10.0,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["invoiceId"], "INV-9");
        assert_eq!(value["fraudScore"], 91);
    }

    #[test]
    fn health_status_ignores_extra_fields() {
        let json = r#"{"status":"healthy","api_key_configured":true,"api_key_prefix":"sk-ant..."}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(health.api_key_configured);
        assert_eq!(health.status, "healthy");
    }
}
