use availability::AvailableCampsite;
use chrono::NaiveDate;

/// Errors from notification transports.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),

    /// Simple notification service (SNS) errors.
    #[error("AWS SNS error: {0}")]
    SnsError(String),

    /// Missing or invalid transport configuration.
    #[error("notification configuration error: {0}")]
    ConfigError(String),
}

/// Dedup key deciding whether an availability has already been announced
/// for a campground query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// Notify at most once per calendar day
    Day(NaiveDate),

    /// Notify at most once per unique availability record
    Slot(AvailableCampsite),
}

/// Rendered notification content.
///
/// SMS carriers cap message length, so the short body carries only the
/// first rows of the availability table; email gets the full table.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// Email subject line
    pub subject: String,

    /// Full-length body for email
    pub body: String,

    /// Truncated body for SMS
    pub sms_body: String,
}

/// Outcome of a notify call, making the dedup decision observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The message went out through every configured transport
    Sent,

    /// The fingerprint was already announced; nothing was sent
    Suppressed,
}
