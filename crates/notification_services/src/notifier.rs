use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::service::{EmailService, SmsService};
use crate::types::{Fingerprint, NotificationError, NotificationMessage, NotifyOutcome};

/// Per-campground-query record of what has already been announced.
///
/// Fingerprints are timestamped and evicted by [`NotificationState::prune`]
/// once they fall out of the retention window, so the map stays bounded
/// over a long-running watch.
pub struct NotificationState {
    retention: Duration,
    sent: HashMap<String, HashMap<Fingerprint, DateTime<Utc>>>,
}

impl NotificationState {
    /// State with the default 24 hour retention window.
    pub fn new() -> Self {
        Self::with_retention(Duration::hours(24))
    }

    /// State with a custom retention window.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            retention,
            sent: HashMap::new(),
        }
    }

    /// Whether `fingerprint` was already announced for `query`.
    pub fn contains(&self, query: &str, fingerprint: &Fingerprint) -> bool {
        self.sent
            .get(query)
            .is_some_and(|sent| sent.contains_key(fingerprint))
    }

    /// Record that `fingerprint` was announced for `query` at `now`.
    pub fn record(&mut self, query: &str, fingerprint: Fingerprint, now: DateTime<Utc>) {
        self.sent
            .entry(query.to_string())
            .or_default()
            .insert(fingerprint, now);
    }

    /// Evict fingerprints recorded longer than the retention window ago.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        for sent in self.sent.values_mut() {
            sent.retain(|_, recorded| now - *recorded < self.retention);
        }
        self.sent.retain(|_, sent| !sent.is_empty());
    }

    /// Total number of fingerprints currently held.
    pub fn len(&self) -> usize {
        self.sent.values().map(HashMap::len).sum()
    }

    /// Whether no fingerprint is currently held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Subject line used for availability emails.
pub const EMAIL_SUBJECT: &str = "Campsite availability found";

/// Dedup-tracking wrapper around the configured transports.
///
/// A transport failure propagates to the caller and leaves every
/// fingerprint unrecorded, so the same availability is retried on the next
/// cycle.
pub struct Notifier {
    sms: Option<(Arc<dyn SmsService>, String)>,
    email: Option<(Arc<dyn EmailService>, String)>,
    state: NotificationState,
}

impl Notifier {
    /// Build a notifier over transport/destination pairs; either transport
    /// may be absent.
    pub fn new(
        sms: Option<(Arc<dyn SmsService>, String)>,
        email: Option<(Arc<dyn EmailService>, String)>,
    ) -> Self {
        Self {
            sms,
            email,
            state: NotificationState::new(),
        }
    }

    /// Send `message` for `query` unless every fingerprint was already
    /// announced.
    ///
    /// Once-per-day callers pass a single [`Fingerprint::Day`];
    /// once-per-availability callers pass one [`Fingerprint::Slot`] per
    /// record, and any unseen slot triggers a send.
    pub async fn notify(
        &mut self,
        query: &str,
        fingerprints: &[Fingerprint],
        message: &NotificationMessage,
    ) -> Result<NotifyOutcome, NotificationError> {
        let unseen: Vec<&Fingerprint> = fingerprints
            .iter()
            .filter(|fingerprint| !self.state.contains(query, fingerprint))
            .collect();

        if unseen.is_empty() {
            log::debug!("already notified for {}, suppressing", query);
            return Ok(NotifyOutcome::Suppressed);
        }

        self.send(message).await?;

        let now = Utc::now();
        for fingerprint in unseen {
            self.state.record(query, fingerprint.clone(), now);
        }
        Ok(NotifyOutcome::Sent)
    }

    /// Send without dedup bookkeeping; used for escalated error alerts.
    pub async fn alert(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        self.send(message).await
    }

    /// Evict expired fingerprints; called once per poll cycle.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.state.prune(now);
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        if let Some((sms, to)) = &self.sms {
            sms.send_sms(to, &message.sms_body).await?;
        }
        if let Some((email, to)) = &self.email {
            email
                .send_email(to, &message.subject, &message.body)
                .await?;
        }
        Ok(())
    }
}
