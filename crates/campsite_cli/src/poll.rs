use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use availability::{AvailabilityRow, AvailableCampsite, Criteria, filter_to_criteria, render_table, table_rows};
use chrono::{Local, NaiveDate, Utc};
use notification_services::{
    AwsSesEmailService, AwsSnsSmsService, EMAIL_SUBJECT, EmailService, ErrorEscalator,
    EscalationDecision, Fingerprint, NotificationMessage, Notifier, NotifyOutcome, SmsService,
};
use providers::{AvailabilityProvider, FetchError, RecGovClient, ReserveCaliforniaClient};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::args::{Api, Args};

// Short pause between campgrounds within a cycle, so multiple watches do
// not hammer the API back to back.
const INTER_CAMPGROUND_DELAY: Duration = Duration::from_millis(100);

/// Rows included in the SMS body; carriers cap message length at 1600
/// characters.
const SMS_TABLE_ROWS: usize = 2;

/// One campground being watched: the user's query string plus the resolved
/// provider id.
struct Watch {
    query: String,
    campground_id: String,
}

/// Facility row shown for a ReserveCalifornia park lookup.
#[derive(Tabled)]
struct FacilityRow {
    campground: String,
    facility_id: String,
}

/// Resolve the campground arguments and run the poll loop forever.
pub async fn run(args: Args) -> Result<()> {
    let notifier = build_notifier(&args).await?;

    match args.api {
        Api::RecreationGov => {
            let client = RecGovClient::new()?;

            let mut watches = Vec::new();
            for campground in &args.campground {
                let campground_id = client
                    .resolve_campground(campground)
                    .await
                    .with_context(|| format!("could not resolve campground: {campground}"))?;
                watches.push(Watch {
                    query: campground.clone(),
                    campground_id,
                });
            }

            poll_forever(&client, &watches, &args, notifier).await
        }
        Api::ReserveCalifornia => {
            let client = ReserveCaliforniaClient::new()?;

            // The grid endpoint is keyed by facility id. A non-numeric
            // argument is a park name: list its facilities and exit so the
            // user can rerun with an id.
            let park_names: Vec<&String> = args
                .campground
                .iter()
                .filter(|campground| !campground.chars().all(|c| c.is_ascii_digit()))
                .collect();
            if !park_names.is_empty() {
                let today = Local::now().date_naive();
                for park in park_names {
                    let rows: Vec<FacilityRow> = client
                        .list_facilities(park, today)
                        .await
                        .with_context(|| format!("could not list facilities in: {park}"))?
                        .into_iter()
                        .map(|facility| FacilityRow {
                            campground: facility.campground,
                            facility_id: facility.facility_id,
                        })
                        .collect();
                    let table = Table::new(rows).with(Style::blank()).to_string();
                    info!("Found facilities in {}:\n\n{}\n", park, table);
                }
                info!("Rerun with -c <facility_id> to watch one of these campgrounds");
                return Ok(());
            }

            let watches: Vec<Watch> = args
                .campground
                .iter()
                .map(|campground| Watch {
                    query: campground.clone(),
                    campground_id: campground.clone(),
                })
                .collect();

            poll_forever(&client, &watches, &args, notifier).await
        }
    }
}

/// Build the notifier from the `--notify` flag and transport environment.
async fn build_notifier(args: &Args) -> Result<Notifier> {
    if !args.notify {
        return Ok(Notifier::new(None, None));
    }

    let sms = match std::env::var("NOTIFY_SMS_TO") {
        Ok(to) => {
            let service: Arc<dyn SmsService> = Arc::new(AwsSnsSmsService::new().await?);
            Some((service, to))
        }
        Err(_) => None,
    };
    let email = match std::env::var("NOTIFY_EMAIL_TO") {
        Ok(to) => {
            let service: Arc<dyn EmailService> = Arc::new(AwsSesEmailService::new().await?);
            Some((service, to))
        }
        Err(_) => None,
    };

    if sms.is_none() && email.is_none() {
        bail!("--notify requires NOTIFY_SMS_TO or NOTIFY_EMAIL_TO to be set");
    }
    Ok(Notifier::new(sms, email))
}

/// The poll cycle: check every watch, notify on matches, sleep, repeat.
///
/// A fetch failure is contained to its campground and cycle; the loop
/// moves on and retries the campground next time around.
async fn poll_forever(
    provider: &dyn AvailabilityProvider,
    watches: &[Watch],
    args: &Args,
    mut notifier: Notifier,
) -> Result<()> {
    let criteria = args.criteria();
    let mut escalator = ErrorEscalator::new();

    info!(
        watches = watches.len(),
        nights = criteria.nights,
        check_every = args.check_every,
        "starting availability watch"
    );

    loop {
        let today = Local::now().date_naive();

        for watch in watches {
            match check_watch(provider, watch, &criteria, args.months).await {
                Ok(available) if !available.is_empty() => {
                    let rows = table_rows(&available);
                    let url = provider.campground_url(&watch.campground_id);
                    let message = availability_message(&rows, &url);
                    info!("{}", message.body);

                    if args.notify {
                        let fingerprints = fingerprints(args, today, &available);
                        match notifier.notify(&watch.query, &fingerprints, &message).await {
                            Ok(NotifyOutcome::Sent) => {
                                info!(campground = %watch.query, "notification sent");
                            }
                            Ok(NotifyOutcome::Suppressed) => {
                                debug!(campground = %watch.query, "already notified");
                            }
                            Err(e) => {
                                error!(campground = %watch.query, error = %e, "notification failed");
                                escalate(&mut escalator, &notifier, &e.to_string(), today).await;
                            }
                        }
                    }
                }
                Ok(_) => {
                    info!(
                        campground = %watch.query,
                        "no availability found, trying again in {} minutes",
                        args.check_every
                    );
                }
                Err(e) => {
                    error!(campground = %watch.query, error = %e, "availability check failed");
                    escalate(&mut escalator, &notifier, &e.to_string(), today).await;
                }
            }

            sleep(INTER_CAMPGROUND_DELAY).await;
        }

        notifier.prune(Utc::now());
        escalator.prune(today);

        sleep(Duration::from_secs(args.check_every * 60)).await;
    }
}

/// Fetch one campground and filter to the criteria.
async fn check_watch(
    provider: &dyn AvailabilityProvider,
    watch: &Watch,
    criteria: &Criteria,
    months: u32,
) -> Result<HashSet<AvailableCampsite>, FetchError> {
    let start_date = Local::now().date_naive();
    let all_available = provider
        .fetch_availability(&watch.campground_id, start_date, months)
        .await?;
    Ok(filter_to_criteria(&all_available, criteria))
}

/// Dedup keys for a match set: one per day by default, one per record in
/// per-availability mode.
fn fingerprints(
    args: &Args,
    today: NaiveDate,
    available: &HashSet<AvailableCampsite>,
) -> Vec<Fingerprint> {
    if args.notify_per_availability {
        available
            .iter()
            .cloned()
            .map(Fingerprint::Slot)
            .collect()
    } else {
        vec![Fingerprint::Day(today)]
    }
}

/// Build the notification copy: full table for log and email, first rows
/// only for SMS.
fn availability_message(rows: &[AvailabilityRow], url: &str) -> NotificationMessage {
    let table = render_table(rows);
    let short_table = render_table(&rows[..rows.len().min(SMS_TABLE_ROWS)]);

    NotificationMessage {
        subject: EMAIL_SUBJECT.to_string(),
        body: format!("Found availability:\n\n{table}\nReserve a spot here: {url}"),
        sms_body: format!("Found availability:\n\n{short_table}\nReserve a spot here: {url}"),
    }
}

/// Count a recurring error and alert once it keeps happening.
async fn escalate(
    escalator: &mut ErrorEscalator,
    notifier: &Notifier,
    error_message: &str,
    today: NaiveDate,
) {
    match escalator.record(error_message, today) {
        EscalationDecision::BelowThreshold => {}
        EscalationDecision::AlreadyEscalated => {
            debug!("recurring error already alerted today");
        }
        EscalationDecision::Escalate => {
            let message = NotificationMessage {
                subject: "Campsite watch keeps failing".to_string(),
                body: format!("Repeated errors while checking availability:\n\n{error_message}"),
                sms_body: format!("Campsite watch hitting repeated errors: {error_message}"),
            };
            if let Err(e) = notifier.alert(&message).await {
                error!(error = %e, "failed to send error alert");
            }
        }
    }
}
