use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

/// Decision for one recorded error occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    /// Seen fewer times than the threshold today
    BelowThreshold,

    /// The threshold was just crossed; an alert should go out
    Escalate,

    /// The threshold was crossed earlier today and already alerted
    AlreadyEscalated,
}

/// Counts recurring errors per (exact message, day) and flags when the
/// same error keeps happening within one day.
pub struct ErrorEscalator {
    threshold: u32,
    counts: HashMap<(String, NaiveDate), u32>,
    escalated: HashSet<(String, NaiveDate)>,
}

/// Occurrences of the same error within a day before an alert goes out.
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;

impl ErrorEscalator {
    /// Escalator with the default threshold.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_ESCALATION_THRESHOLD)
    }

    /// Escalator alerting after `threshold` occurrences in one day.
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold,
            counts: HashMap::new(),
            escalated: HashSet::new(),
        }
    }

    /// Record one occurrence of `error_message` on `today` and decide
    /// whether it warrants an alert.
    pub fn record(&mut self, error_message: &str, today: NaiveDate) -> EscalationDecision {
        let key = (error_message.to_string(), today);
        let count = self.counts.entry(key.clone()).or_insert(0);
        *count += 1;

        if *count < self.threshold {
            return EscalationDecision::BelowThreshold;
        }
        if !self.escalated.insert(key) {
            return EscalationDecision::AlreadyEscalated;
        }
        EscalationDecision::Escalate
    }

    /// Drop counters from days before `today`.
    pub fn prune(&mut self, today: NaiveDate) {
        self.counts.retain(|(_, day), _| *day >= today);
        self.escalated.retain(|(_, day)| *day >= today);
    }
}
