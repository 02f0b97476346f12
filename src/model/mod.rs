//! Domain model types (pure).
//!
//! All types in this module are plain data; I/O lives in `client` and `stream`.

pub mod analysis;
pub mod error;
pub mod event;
pub mod ledger;
pub mod malformed_frame;
pub mod upload;

// Re-export for convenience
pub use analysis::{AnalysisResult, CheckStatus, InvoiceStatus, LocalCheck, NetworkSignal, SignalKind};
pub use error::{ApiError, AppError, DecodeError, SessionError, TransportError, UploadError};
pub use event::UpdateEvent;
pub use ledger::{
    HealthStatus, ThreatAnalytics, ThreatRecord, ThreatReport, ThreatReportReceipt, Transaction,
    TransactionQuery, TransactionStatus, WalletBalance,
};
pub use malformed_frame::MalformedFrame;
pub use upload::UploadRequest;
