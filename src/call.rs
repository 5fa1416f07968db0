//! Callsign splitting and the strict FLE callsign-shape parser.

use once_cell::sync::Lazy;
use regex::Regex;

static THREE_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)/(\w+)").unwrap());
static TWO_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)").unwrap());

/// Splits a compound callsign into `(operator, portable)`.
///
/// A suffix beginning with a digit is a numeric area designator, `QRP`
/// marks power class; otherwise the longer token is taken as the base
/// callsign regardless of order.
pub fn split_callsign(call: &str) -> (String, String) {
    let call = call.to_uppercase();

    if let Some(c) = THREE_PART.captures(&call) {
        let (g1, g2, g3) = (&c[1], &c[2], &c[3]);
        if g2.starts_with(|ch: char| ch.is_ascii_digit()) {
            return (g1.to_string(), format!("{g2}/{g3}"));
        }
        return (g2.to_string(), g1.to_string());
    }

    if let Some(c) = TWO_PART.captures(&call) {
        let (g1, g2) = (&c[1], &c[2]);
        if g2.starts_with(|ch: char| ch.is_ascii_digit()) || g2 == "QRP" {
            return (g1.to_string(), g2.to_string());
        }
        if g2.len() > g1.len() {
            return (g2.to_string(), g1.to_string());
        }
        return (g1.to_string(), g2.to_string());
    }

    (call.trim().to_string(), String::new())
}

/// Callsign accepted by the FLE lexer, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    /// Full upper-cased callsign as typed.
    pub full: String,
    /// Base station callsign.
    pub base: String,
    /// Portable designator, empty when absent.
    pub portable: String,
    /// True when a `/QRP` power-class suffix was present.
    pub qrp: bool,
}

static CALL_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w{1,3}[0-9]\w{0,5}[A-Z]$").unwrap());
static CALL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w{1,3}[0-9]$").unwrap());
static P_AREA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\d)$").unwrap());
static P_TWO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)$").unwrap());
static P_PORTABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)/P$").unwrap());
static P_QRP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)/(\w+)/QRP$").unwrap());

fn parsed(full: &str, base: &str, portable: &str, qrp: bool) -> Option<ParsedCall> {
    Some(ParsedCall {
        full: full.to_string(),
        base: base.to_string(),
        portable: portable.to_string(),
        qrp,
    })
}

/// Parses a token against the callsign shapes the FLE language accepts.
///
/// Returns `None` for anything that is not a plausible callsign; the
/// lexer then falls through to the remaining token categories.
pub fn parse_callsign(token: &str) -> Option<ParsedCall> {
    let c = token.to_uppercase();

    if CALL_BODY.is_match(&c) {
        return parsed(&c, &c, "", false);
    }

    if let Some(p) = P_AREA.captures(&c) {
        if CALL_BODY.is_match(&p[1]) {
            let (base, area) = (p[1].to_string(), p[2].to_string());
            return parsed(&c, &base, &area, false);
        }
        return None;
    }

    if let Some(p) = P_TWO.captures(&c) {
        let (g1, g2) = (p[1].to_string(), p[2].to_string());
        if CALL_BODY.is_match(&g1) {
            if CALL_PREFIX.is_match(&g2) {
                return parsed(&c, &g1, &g2, false);
            }
            if g2 == "QRP" {
                return parsed(&c, &g1, "", true);
            }
            if g2 == "P" {
                return parsed(&c, &g1, "P", false);
            }
            return None;
        }
        if CALL_BODY.is_match(&g2) {
            if CALL_PREFIX.is_match(&g1) {
                return parsed(&c, &g2, &g1, false);
            }
            if g1 == "QRP" {
                return parsed(&c, &g2, "", true);
            }
        }
        return None;
    }

    if let Some(p) = P_PORTABLE.captures(&c) {
        if CALL_PREFIX.is_match(&p[1]) && CALL_BODY.is_match(&p[2]) {
            let (prefix, base) = (p[1].to_string(), p[2].to_string());
            return parsed(&c, &base, &prefix, false);
        }
        return None;
    }

    if let Some(p) = P_QRP.captures(&c) {
        let (g1, g2) = (p[1].to_string(), p[2].to_string());
        if CALL_BODY.is_match(&g1) {
            if CALL_PREFIX.is_match(&g2) || g2.starts_with(|ch: char| ch.is_ascii_digit()) {
                return parsed(&c, &g1, &g2, true);
            }
        } else if CALL_PREFIX.is_match(&g1) && CALL_BODY.is_match(&g2) {
            return parsed(&c, &g2, &g1, true);
        }
        return None;
    }

    None
}
