//! Input decoders: HAMLOG CSV, ADIF, and HAMLOG for iOS CSV.
//!
//! Every decoder maps one raw row to a [`QsoRecord`]. Field-level
//! failures taint the record instead of dropping it; only a row whose
//! shape is unusable fails with [`FormatError`].

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use crate::qso::QsoRecord;

/// ADIF record reader and decoder.
pub mod adif;
/// HAMLOG CSV decoder.
pub mod hamlog;
/// HAMLOG for iOS CSV decoder.
pub mod ios;

pub use adif::{decode_adif, read_adif};
pub use hamlog::decode_hamlog;
pub use ios::decode_ios;

/// Row shape mismatch; fatal for that single record only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormatError(pub String);

/// Decoder outcome. A tainted record keeps best-effort values in every
/// field alongside its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Every field decoded cleanly.
    Clean(QsoRecord),
    /// Some fields failed; the record is still exportable.
    Tainted(QsoRecord, Vec<String>),
}

impl Decoded {
    /// Wraps `rec`, choosing the variant from the collected messages.
    pub fn from_parts(rec: QsoRecord, msgs: Vec<String>) -> Self {
        if msgs.is_empty() {
            Decoded::Clean(rec)
        } else {
            Decoded::Tainted(rec, msgs)
        }
    }

    /// Borrows the record regardless of taint.
    pub fn record(&self) -> &QsoRecord {
        match self {
            Decoded::Clean(r) | Decoded::Tainted(r, _) => r,
        }
    }

    /// Consumes self into the record.
    pub fn into_record(self) -> QsoRecord {
        match self {
            Decoded::Clean(r) | Decoded::Tainted(r, _) => r,
        }
    }

    /// True for the tainted variant.
    pub fn is_tainted(&self) -> bool {
        matches!(self, Decoded::Tainted(..))
    }
}

/// Result of decoding one raw row.
pub type DecodeResult = Result<Decoded, FormatError>;

/// Converts local wall-clock fields at `offset` to UTC, returning the
/// UTC instant and the RFC 3339 local rendering. `None` when the fields
/// do not name a real instant.
pub(crate) fn local_to_utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    offset: FixedOffset,
) -> Option<(DateTime<Utc>, String)> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    let local = naive.and_local_timezone(offset).single()?;
    Some((local.with_timezone(&Utc), local.to_rfc3339()))
}

/// Sentinel instant substituted for unparseable timestamps.
pub(crate) fn epoch_sentinel() -> (DateTime<Utc>, String) {
    let offset = FixedOffset::east_opt(0).expect("zero offset");
    local_to_utc(1900, 1, 1, 0, 0, offset).expect("sentinel epoch")
}

/// Parses a `+HHMM`/`-HHMM` timezone string into an offset.
pub(crate) fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => (1, tz),
    };
    if rest.len() != 4 {
        return None;
    }
    let hours: i32 = rest[..2].parse().ok()?;
    let minutes: i32 = rest[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
