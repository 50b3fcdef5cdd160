//! Reconciliation of identities and traffic into per-user statistics

use crate::observer::{ReportEvent, ReportObserver};
use crate::types::{Identity, ReportPeriod, ReportSummary, SummaryTotals, TrafficRecord, UserStat};
use crate::utils::math::delivery_rate;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Join `identities` and `traffic` into a report for `period`
///
/// - duplicate usernames in `identities`: the last entry wins
/// - traffic for an unknown username keeps the username as display name and
///   an empty email
/// - users are ordered by `sent` descending; ties keep their traffic order
/// - an empty `traffic` slice yields zero totals and no users
pub fn reconcile(
    identities: &[Identity],
    traffic: &[TrafficRecord],
    period: ReportPeriod,
    generated_at: DateTime<FixedOffset>,
    observer: &dyn ReportObserver,
) -> ReportSummary {
    let mut by_username: HashMap<&str, &Identity> = HashMap::with_capacity(identities.len());
    for identity in identities {
        if by_username
            .insert(identity.username.as_str(), identity)
            .is_some()
        {
            observer.observe(ReportEvent::DuplicateIdentity {
                username: identity.username.clone(),
            });
        }
    }

    let mut users: Vec<UserStat> = traffic
        .iter()
        .map(|record| {
            let identity = by_username.get(record.username.as_str()).copied();
            if identity.is_none() {
                observer.observe(ReportEvent::OrphanTraffic {
                    username: record.username.clone(),
                });
            }
            user_stat(record, identity, observer)
        })
        .collect();

    // sort_by is stable: equal `sent` keeps traffic order
    users.sort_by(|a, b| b.sent.cmp(&a.sent));

    // saturating: counters decoded from oversized JSON numbers sit at u64::MAX
    let total_sent = saturating_total(users.iter().map(|u| u.sent));
    let total_delivered = saturating_total(users.iter().map(|u| u.delivered));
    let total_failed = saturating_total(users.iter().map(|u| u.failed));

    observer.observe(ReportEvent::TotalsComputed {
        users: users.len(),
        sent: total_sent,
        delivered: total_delivered,
        failed: total_failed,
    });

    ReportSummary {
        period,
        period_formatted: period.formatted(),
        summary: SummaryTotals {
            total_sent,
            total_delivered,
            total_failed,
            delivery_rate: delivery_rate(total_delivered, total_sent),
            total_users: users.len(),
        },
        users,
        generated_at,
    }
}

fn saturating_total(counters: impl Iterator<Item = u64>) -> u64 {
    counters.fold(0u64, u64::saturating_add)
}

/// Derive one user's statistics from its traffic counters
///
/// Failures are capped at `sent` so `sent == delivered + failed` holds even
/// when the provider over-reports bounces and rejects.
pub fn user_stat(
    record: &TrafficRecord,
    identity: Option<&Identity>,
    observer: &dyn ReportObserver,
) -> UserStat {
    let reported_failed = record.bounced.saturating_add(record.rejected);
    if reported_failed > record.sent {
        observer.observe(ReportEvent::CountersClamped {
            username: record.username.clone(),
            sent: record.sent,
            reported_failed,
        });
    }
    let failed = reported_failed.min(record.sent);
    let delivered = record.sent - failed;

    let (display_name, email) = match identity {
        Some(identity) => (identity.display_name.clone(), identity.email.clone()),
        None => (record.username.clone(), String::new()),
    };

    UserStat {
        username: record.username.clone(),
        display_name,
        email,
        sent: record.sent,
        delivered,
        failed,
        delivery_rate: delivery_rate(delivered, record.sent),
    }
}
