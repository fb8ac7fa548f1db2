//! Regex entity extraction over eight fixed categories.
//!
//! Digit, word and boundary classes are ASCII-only.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::types::Entities;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\(?[0-9]{3}\)?[-.\s]?)?[0-9]{3}[-.\s]?[0-9]{4}").unwrap()
});

// Leading currency symbol, or a trailing currency code / word.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$[0-9,]+(?:\.[0-9]{2})?|[0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?\s*(?:USD|EUR|GBP|dollars?)")
        .unwrap()
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?-u:\b)(?:",
        r"[0-9]{1,2}[-/][0-9]{1,2}[-/][0-9]{2,4}",
        r"|[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}",
        r"|(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?",
        r"|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)",
        r"\s+[0-9]{1,2}(?:st|nd|rd|th)?,?\s*[0-9]{4}",
        r")",
    ))
    .unwrap()
});

static ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:INV|PO|REF|ID|ORDER|TICKET|CASE)[-#]?\s*[0-9]+[A-Za-z0-9_-]*").unwrap()
});

static ORG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:[A-Z][a-z]+ )+(?:Inc\.?|LLC|Corp\.?|Ltd\.?|Company|Co\.?|Corporation|Group|Partners|Associates)",
    )
    .unwrap()
});

static PERSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Mr\.?|Mrs\.?|Ms\.?|Dr\.?|Prof\.?)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?").unwrap()
});

static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?-u:\b)(?:[0-9]+\s+)?[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,?\s*",
        r"(?:CA|NY|TX|FL|WA|IL|PA|OH|GA|NC|MI|NJ|VA|AZ|MA|TN|IN|MO|MD|WI|CO|MN|SC|AL|LA|KY|OR|OK",
        r"|CT|IA|UT|NV|AR|MS|KS|NM|NE|WV|ID|HI|NH|ME|RI|MT|DE|SD|ND|AK|VT|WY|DC)(?-u:\b)",
    ))
    .unwrap()
});

/// Extract all eight entity categories from `text`.
///
/// Each category is an independent pass. Matches are deduplicated within a
/// category, keeping first-seen order; nothing is deduplicated across categories.
pub fn extract_entities(text: &str) -> Entities {
    Entities {
        people: unique_matches(&PERSON_RE, text),
        organizations: unique_matches(&ORG_RE, text),
        dates: unique_matches(&DATE_RE, text),
        amounts: unique_matches(&AMOUNT_RE, text),
        ids: unique_matches(&ID_RE, text),
        locations: unique_matches(&LOCATION_RE, text),
        emails: unique_matches(&EMAIL_RE, text),
        phones: unique_matches(&PHONE_RE, text),
    }
}

fn unique_matches(re: &Regex, text: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    re.find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| seen.insert(s))
        .map(str::to_string)
        .collect()
}
