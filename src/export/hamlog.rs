//! HAMLOG CSV back-export for compiled sessions.

use crate::fle::compose_qsl_msg;
use crate::qso::QsoRecord;
use crate::types::MAX_INPUT_LINES;

use super::{CsvBuf, ExportError};

/// Renders compiled QSOs in the HAMLOG import layout. Every field is
/// quoted, dates use two-digit years, times are UTC with a `U` flag, and
/// the QSL columns come from the session QSL message.
pub fn fle_hamlog(qsos: &[QsoRecord]) -> Result<String, ExportError> {
    let mut buf = CsvBuf::with(b',', true);

    for rec in qsos.iter().take(MAX_INPUT_LINES) {
        let parts = compose_qsl_msg(rec);
        buf.row(&[
            rec.callsign.clone(),
            format!("{:02}/{:02}/{:02}", rec.year % 100, rec.month, rec.day),
            format!("{:02}:{:02}U", rec.hour, rec.minute),
            rec.rst_sent.clone(),
            rec.rst_rcvd.clone(),
            parts.freq.clone(),
            rec.mode_raw.clone(),
            String::new(),
            parts.refs.loc_raw.clone(),
            String::new(),
            rec.name.clone(),
            parts.qth.clone(),
            String::new(),
            parts.qsl.clone(),
            "0".to_string(),
        ])?;
    }
    buf.take()
}
