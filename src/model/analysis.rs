//! Invoice verdict types.
//!
//! An [`AnalysisResult`] is the payload of the terminal `complete` frame and the
//! return value of a successful streaming session. Field names follow the
//! service's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest value accepted for `confidence` and `fraudScore`.
pub const MAX_SCORE: u8 = 100;

/// Currency assumed when the service omits one.
pub const DEFAULT_CURRENCY: &str = "USDC";

/// Decision reached for an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Safe to pay.
    Approved,
    /// Needs manual review before payment.
    Hold,
    /// Fraudulent; payment refused.
    Blocked,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Hold => "hold",
            InvoiceStatus::Blocked => "blocked",
        }
    }

    /// Human wording used in notifications ("on hold" rather than "hold").
    pub fn describe(&self) -> &'static str {
        match self {
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Hold => "on hold",
            InvoiceStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single local check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Warning => "warning",
        }
    }
}

/// One line-item check performed on the invoice itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCheck {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

/// Kind of signal contributed by the shared threat network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Another tenant reported this vendor or template as fraudulent.
    Flagged,
    /// Seen before without incident.
    Seen,
    /// Nothing known.
    Clean,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Flagged => "flagged",
            SignalKind::Seen => "seen",
            SignalKind::Clean => "clean",
        }
    }
}

/// One signal from the threat network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSignal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub description: String,
}

/// Structured verdict for an analyzed invoice.
///
/// Immutable once received. Use [`AnalysisResult::validate`] to check the score
/// ranges, which serde alone cannot express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub invoice_id: String,
    pub status: InvoiceStatus,
    /// Model confidence, 0-100.
    pub confidence: u8,
    /// Fraud likelihood, 0-100.
    pub fraud_score: u8,
    pub local_checks: Vec<LocalCheck>,
    pub network_signals: Vec<NetworkSignal>,
    pub explanation: String,
    pub vendor: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Payout address extracted from the invoice, when the service found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl AnalysisResult {
    /// Check invariants not enforced by deserialization.
    ///
    /// Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.confidence > MAX_SCORE {
            return Err(format!(
                "confidence {} exceeds {}",
                self.confidence, MAX_SCORE
            ));
        }
        if self.fraud_score > MAX_SCORE {
            return Err(format!(
                "fraudScore {} exceeds {}",
                self.fraud_score, MAX_SCORE
            ));
        }
        if !self.amount.is_finite() {
            return Err(format!("amount {} is not a finite number", self.amount));
        }
        Ok(())
    }

    /// Local checks that did not pass.
    pub fn failed_checks(&self) -> impl Iterator<Item = &LocalCheck> {
        self.local_checks
            .iter()
            .filter(|check| check.status == CheckStatus::Fail)
    }

    /// Whether any network signal flags this invoice.
    pub fn is_flagged_by_network(&self) -> bool {
        self.network_signals
            .iter()
            .any(|signal| signal.kind == SignalKind::Flagged)
    }
}
