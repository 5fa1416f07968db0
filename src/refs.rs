//! Free-text remark parsing into typed activation references.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tables::ja_zone;

/// References extracted from one remark string.
///
/// `loc` and `sat` carry the `%QTH%`/`%QRA%`/`%SAT%` decorated forms used
/// by the HAMLOG QSL conventions; the `*_raw` fields keep the bare text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefBundle {
    /// SOTA summit reference, empty when absent.
    pub sota: String,
    /// JA call-area zone for the summit region, `P` when unmapped.
    pub zone: String,
    /// WWFF references in order of appearance.
    pub wwff: Vec<String>,
    /// POTA references in order of appearance.
    pub pota: Vec<String>,
    /// Decorated locator (grid or coordinate pair).
    pub loc: String,
    /// Bare grid locator.
    pub loc_raw: String,
    /// Decorated satellite descriptor.
    pub sat: String,
    /// Satellite OSCAR designator.
    pub sat_name: String,
    /// Full satellite token as typed.
    pub sat_raw: String,
    /// Satellite downlink band.
    pub sat_down: String,
    /// Residual text that matched no category.
    pub other: String,
}

static COORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?\d+(\.\d+)?[nsNS]?\s*,\s*-?\d+(\.\d+)?[ewEW]?)").unwrap()
});
static WWFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([A-Z0-9]+FF-\d+)").unwrap());
static POTA: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z0-9]+-\d{4})").unwrap());
static SOTA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(([a-zA-Z0-9]+/[a-zA-Z0-9]+)-\d+)").unwrap());
static GRID: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z]{2}\d{2}[a-zA-Z]{2})").unwrap());
static SAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(([a-zA-Z]+-\d+)/([a-zA-Z]+/(\w+)))").unwrap());

/// Classifies every whitespace/comma separated token of `text`; first
/// matching category wins. A latitude/longitude pair is matched against
/// the whole string and overrides any grid locator token.
pub fn extract_refs(text: &str) -> RefBundle {
    let mut r = RefBundle::default();

    for token in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if let Some(m) = WWFF.captures(token) {
            r.wwff.push(m[1].to_uppercase());
            continue;
        }
        if let Some(m) = POTA.captures(token) {
            r.pota.push(m[1].to_uppercase());
            continue;
        }
        if let Some(m) = SOTA.captures(token) {
            r.sota = m[1].to_uppercase();
            let region = m[2].to_uppercase();
            r.zone = ja_zone(&region).unwrap_or("P").to_string();
            continue;
        }
        if let Some(m) = GRID.captures(token) {
            r.loc = format!("%QRA%{}% ", &m[1]);
            r.loc_raw = m[1].to_string();
            continue;
        }
        if let Some(m) = SAT.captures(token) {
            r.sat = format!("%SAT%{}%,{}", m[2].to_uppercase(), &m[3]);
            r.sat_name = m[2].to_uppercase();
            r.sat_raw = m[1].to_string();
            r.sat_down = m[4].to_string();
            continue;
        }
        r.other.push_str(token);
        r.other.push(' ');
    }
    r.other = r.other.trim().to_string();

    if let Some(m) = COORD.captures(text) {
        r.loc = format!("%QTH%{}% ", &m[1]);
    }

    r
}
