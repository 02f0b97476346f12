//! ShieldNet client library.
//!
//! Uploads invoices to the ShieldNet fraud detection backend and consumes the
//! streamed analysis: progress steps, incremental model output, and a final
//! verdict. Also wraps the dashboard endpoints (threat analytics, treasury
//! ledger, wallet balance, threat reports, history, health).
//!
//! Layout follows a pure core / impure shell split:
//! - [`model`], [`parser`]: plain data and pure decoding
//! - [`stream`]: the decoder, dispatcher and session state machine
//! - [`client`], [`view`], [`logging`], [`config`]: I/O at the edges

pub mod client;
pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod refresh;
pub mod stream;
pub mod view;
