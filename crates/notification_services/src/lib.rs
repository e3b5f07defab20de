//! # Notification Services
//!
//! SMS and email transports for availability alerts, plus the dedup
//! bookkeeping that keeps a watch from re-announcing the same find and the
//! escalation counter for recurring fetch errors.

/// Error, fingerprint, and message types
mod types;
pub use types::*;

/// Transport traits and AWS implementations
mod service;
pub use service::*;

/// Dedup-tracking notifier and its bounded state
mod notifier;
pub use notifier::*;

/// Recurring-error escalation bookkeeping
mod escalation;
pub use escalation::*;
