//! Lease-field inference.
//!
//! Fills gaps in a lease field set by rule, in a fixed order where later
//! steps see earlier results:
//!
//! 1. blank values become `None`
//! 2. `oneTimePaymentDue` defaults to `effectiveFrom`
//! 3. `endDate` is `effectiveFrom` plus the payment period
//! 4. `leaseTerm` is derived from the payment period
//!
//! Populated fields are never overwritten, so inference is idempotent.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::LeaseFields;

static TIME_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[0-9]{2}:[0-9]{2}:[0-9]{2}$").unwrap());

/// `DD-Mon-YYYY` / `DD/Mon/YYYY` with a textual month.
static DAY_MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]{1,2})[/-]([A-Za-z0-9_]{3,})[/-]([0-9]{4})").unwrap());

/// Numeric and textual shapes tried before the manual `DD-Mon-YYYY` parse.
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Run the inference pipeline over `raw`.
pub fn infer_lease_fields(raw: LeaseFields) -> LeaseFields {
    let mut fields = raw;
    clear_blanks(&mut fields);

    if fields.one_time_payment_due.is_none() {
        fields.one_time_payment_due = fields.effective_from.clone();
    }

    if fields.end_date.is_none() {
        if let (Some(from), Some(period)) = (&fields.effective_from, &fields.payment_period) {
            fields.end_date = infer_end_date(from, period);
        }
    }

    if fields.lease_term.is_none() {
        fields.lease_term = fields
            .payment_period
            .as_deref()
            .and_then(lease_term_for_period)
            .map(str::to_string);
    }

    fields
}

/// `effective_from` advanced by the payment period, formatted `DD-Mon-YYYY`.
///
/// Returns `None` when the start date cannot be parsed in any known shape.
pub fn infer_end_date(effective_from: &str, payment_period: &str) -> Option<String> {
    let cleaned = TIME_SUFFIX_RE.replace(effective_from, "");
    let cleaned = cleaned.trim();

    let Some(start) = parse_generic_date(cleaned).or_else(|| parse_day_month_year(cleaned)) else {
        debug!(effective_from, "Unparseable lease start date; leaving end date empty");
        return None;
    };

    let end = start.checked_add_months(Months::new(months_for_period(payment_period)))?;
    Some(end.format("%d-%b-%Y").to_string())
}

/// Months added per payment period. Unrecognized periods count as one month.
pub fn months_for_period(period: &str) -> u32 {
    match period.trim().to_lowercase().as_str() {
        "quarterly" => 3,
        "semi-annual" => 6,
        "annual" => 12,
        _ => 1,
    }
}

/// Lease term text for a payment period; `None` for one-time and unknown periods.
pub fn lease_term_for_period(period: &str) -> Option<&'static str> {
    match period.trim().to_lowercase().as_str() {
        "monthly" => Some("1 month"),
        "quarterly" => Some("3 months"),
        "semi-annual" => Some("6 months"),
        "annual" => Some("12 months"),
        _ => None,
    }
}

fn parse_generic_date(s: &str) -> Option<NaiveDate> {
    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// English and Spanish three-letter month prefixes, 1-based.
fn month_from_prefix(token: &str) -> Option<u32> {
    let prefix: String = token.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" | "ene" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" | "abr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" | "ago" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_day_month_year(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_prefix(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn clear_blanks(fields: &mut LeaseFields) {
    let slots = [
        &mut fields.id,
        &mut fields.lease_id,
        &mut fields.payment_type,
        &mut fields.one_time_payment_amount,
        &mut fields.one_time_payment_due,
        &mut fields.tax_code,
        &mut fields.effective_from,
        &mut fields.end_date,
        &mut fields.previous_meter_reading,
        &mut fields.current_meter_reading,
        &mut fields.payment_period,
        &mut fields.cost_center,
        &mut fields.landlord,
        &mut fields.tenant,
        &mut fields.property_address,
        &mut fields.monthly_rent,
        &mut fields.security_deposit,
        &mut fields.lease_term,
        &mut fields.currency,
    ];
    for slot in slots {
        if slot.as_deref().is_some_and(|v| v.trim().is_empty()) {
            *slot = None;
        }
    }
}
