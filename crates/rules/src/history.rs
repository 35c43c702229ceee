//! Payment history ordering and aggregation.
//!
//! The backend sends `created_date` as free-form text. Dates that cannot be
//! parsed sort after every dated entry and never fall inside a time window.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use tribute_protocol::Payment;

/// Window used by [`recent`] when the caller has no preference.
pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare date.
pub fn parse_payment_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Returns the payments ordered newest first.
pub fn newest_first(payments: &[Payment]) -> Vec<Payment> {
    let mut sorted = payments.to_vec();
    // `None` compares lower than `Some`, so reversing puts undated entries last.
    sorted.sort_by_key(|p| std::cmp::Reverse(parse_payment_date(&p.created_date)));
    sorted
}

/// Payments created at or after `now - days`.
///
/// Negative windows are treated as zero; a window reaching past the
/// earliest representable date covers the whole history.
pub fn recent(payments: &[Payment], now: DateTime<Utc>, days: i64) -> Vec<&Payment> {
    let cutoff = Duration::try_days(days.max(0))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    since(payments, cutoff)
}

pub fn total_earnings<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> f64 {
    payments.into_iter().map(Payment::amount_or_zero).sum()
}

/// Earnings from the same calendar day one month ago until `now`.
pub fn monthly_earnings(payments: &[Payment], now: DateTime<Utc>) -> f64 {
    let cutoff = now
        .checked_sub_months(Months::new(1))
        .unwrap_or(now - Duration::days(DEFAULT_RECENT_DAYS));
    total_earnings(since(payments, cutoff))
}

/// Aggregate figures for the payment history screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentStats {
    pub total: f64,
    pub recent: f64,
    pub average: f64,
    pub count: usize,
}

pub fn stats(payments: &[Payment], now: DateTime<Utc>) -> PaymentStats {
    let total = total_earnings(payments);
    let recent = total_earnings(recent(payments, now, DEFAULT_RECENT_DAYS));
    let count = payments.len();
    let average = if count > 0 { total / count as f64 } else { 0.0 };
    PaymentStats {
        total,
        recent,
        average,
        count,
    }
}

fn since(payments: &[Payment], cutoff: DateTime<Utc>) -> Vec<&Payment> {
    payments
        .iter()
        .filter(|p| parse_payment_date(&p.created_date).is_some_and(|d| d >= cutoff))
        .collect()
}
